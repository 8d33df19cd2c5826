use derived_state::{
    lift::{Identified, Sequence},
    DerivedAccessor, DerivedState, DerivedStateError, ElementAccessor, Fields, Identifiable,
    IdentifiedVec, Identity, LiftedState, MisusePolicy, PropertyBinding, PropertyBindingExt,
};
use std::collections::{BTreeMap, HashMap};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Fields)]
struct Row {
    id: u32,
    label: String,
    scale: i32,
    internal: i32,
}

impl Row {
    fn with_id(id: u32) -> Row {
        Row {
            id,
            label: "Row".to_string(),
            scale: 3,
            internal: -1,
        }
    }
}

impl Identifiable for Row {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }
}

#[derive(Clone, Debug, PartialEq, Fields)]
struct Table {
    label: String,
    scale: i32,
    rows: Vec<Row>,
    by_name: HashMap<String, Row>,
    sorted: BTreeMap<u32, Row>,
    identified: IdentifiedVec<Row>,
    maybe: Option<IdentifiedVec<Row>>,
}

impl Default for Table {
    fn default() -> Self {
        Table {
            label: "Root".to_string(),
            scale: 1,
            rows: vec![Row::with_id(1), Row::with_id(2)],
            by_name: HashMap::from([
                ("first".to_string(), Row::with_id(1)),
                ("second".to_string(), Row::with_id(2)),
            ]),
            sorted: BTreeMap::from([(1, Row::with_id(1)), (2, Row::with_id(2))]),
            identified: [Row::with_id(1), Row::with_id(2)].into_iter().collect(),
            maybe: Some([Row::with_id(1), Row::with_id(2)].into_iter().collect()),
        }
    }
}

#[test]
fn sequence_lifting() {
    init_logging();
    let rows = DerivedState::from_field(Table::rows)
        .for_each()
        .ro(Table::label, Row::label)
        .ro(Table::scale, Row::scale);
    let mut table = Table::default();

    let derived = rows.get(&table);
    assert_eq!(derived.len(), 2);
    assert!(derived.iter().all(|row| row.label == "Root" && row.scale == 1));
    assert_eq!(derived.iter().map(|row| row.id).collect::<Vec<_>>(), vec![1, 2]);

    table.label = "Updated".to_string();
    table.scale += 1;
    assert!(rows.get(&table).iter().all(|row| row.label == "Updated" && row.scale == 2));
}

#[test]
fn set_through_lifted_accessor() {
    let rows = DerivedState::from_field(Table::rows)
        .for_each()
        .ro(Table::label, Row::label);
    let mut table = Table::default();
    rows.modify(&mut table, |rows| {
        rows[0].internal = 10;
        rows[1].label = "not written back".to_string();
        rows.push(Row::with_id(3));
    });
    assert_eq!(table.label, "Root");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0].internal, 10);
    assert_eq!(rows.get(&table)[1].label, "Root");
}

#[test]
fn map_lifting() {
    let by_name = DerivedState::from_field(Table::by_name)
        .for_each_value()
        .ro(Table::label, Row::label);
    let sorted = DerivedState::from_field(Table::sorted)
        .for_each_value()
        .on(|table: &Table, row: &mut Row| row.scale = table.scale * 100);
    let table = Table::default();

    let derived = by_name.get(&table);
    assert_eq!(derived.len(), 2);
    assert!(derived.values().all(|row| row.label == "Root"));
    assert_eq!(derived["second"].id, 2);

    let derived = sorted.get(&table);
    assert_eq!(derived.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert!(derived.values().all(|row| row.scale == 100));
}

#[test]
fn identified_lifting() {
    let identified = DerivedState::from_field(Table::identified)
        .for_each_identified()
        .ro(Table::label, Row::label)
        .ro(Table::scale, Row::scale)
        .erase();
    let mut table = Table::default();
    assert_eq!(identified.get(&table)[0].label, "Root");
    assert_eq!(identified.get(&table)[1].scale, 1);

    table.label = "Updated".to_string();
    table.scale += 1;
    let derived = identified.get(&table);
    assert!(derived.iter().all(|row| row.label == "Updated" && row.scale == 2));
    assert_eq!(derived.ids().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn optional_identified_lifting() {
    let maybe = DerivedState::from_field(Table::maybe)
        .optional()
        .for_each_identified()
        .ro(Table::label, Row::label)
        .ro(Table::scale, Row::scale);
    let mut table = Table::default();
    let derived = maybe.get(&table);
    assert_eq!(derived.as_ref().map(|rows| rows[0].label.as_str()), Some("Root"));
    assert_eq!(derived.as_ref().map(|rows| rows[1].scale), Some(1));

    table.label = "Updated".to_string();
    let derived = maybe.get(&table);
    assert_eq!(derived.as_ref().map(|rows| rows[1].label.as_str()), Some("Updated"));

    table.maybe = None;
    assert_eq!(maybe.get(&table), None);
    maybe.set(&mut table, None);
    assert_eq!(table.maybe, None);
}

#[test]
fn element_access_by_identity() {
    let identified = DerivedState::from_field(Table::identified)
        .for_each_identified()
        .ro(Table::label, Row::label);
    let mut table = Table::default();

    let row = identified.element(&table, &2).expect("row 2 exists");
    assert_eq!((row.id, row.label.as_str()), (2, "Root"));

    let mut row = row;
    row.internal = 12;
    identified.set_element(&mut table, &2, row).expect("row 2 exists");
    assert_eq!(table.identified.get(&2).map(|row| row.internal), Some(12));
}

#[test]
fn missing_identity_reports_absence() {
    let identified = DerivedState::from_field(Table::identified)
        .for_each_identified()
        .ro(Table::label, Row::label);
    let mut table = Table::default();
    let before = table.clone();

    assert_eq!(identified.element(&table, &3), None);
    let result = identified.set_element(&mut table, &3, Row::with_id(3));
    assert!(matches!(
        result,
        Err(DerivedStateError::MissingIdentity { ref id, .. }) if id == "3"
    ));
    assert_eq!(table, before);
}

#[test]
fn element_keeps_its_identity() {
    let identified = DerivedState::from_field(Table::identified)
        .for_each_identified()
        .ro(Table::label, Row::label);
    let mut table = Table::default();
    let before = table.clone();

    let result = identified.set_element(&mut table, &2, Row::with_id(1));
    assert!(matches!(
        result,
        Err(DerivedStateError::IdentityChanged { ref id, ref found, .. })
            if id == "2" && found == "1"
    ));
    assert_eq!(table, before);
    assert_eq!(table.identified.iter().map(|row| row.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "sequence-lifted binding"))]
fn direct_push_on_lifted_binding_panics_in_debug() {
    let binding = LiftedState::new(
        DerivedState::from_field(Table::rows).into_parts().0,
        Sequence::on_misuse(MisusePolicy::Panic),
        Identity::<Table, Row>::new(),
    )
    .ro(Table::label, Row::label)
    .finish()
    .into_parts()
    .1;
    let mut table = Table::default();
    let rows = table.rows.clone();
    binding.push(&mut table, &rows);
}

#[test]
fn ignored_push_leaves_source_untouched() {
    let binding = derived_state::FieldReadBinding::new(Table::label, Row::label)
        .for_each_identified::<IdentifiedVec<Row>>()
        .on_misuse(MisusePolicy::Ignore);
    let mut table = Table::default();
    let mut rows = table.identified.clone();
    binding.pull(&table, &mut rows);
    rows.insert(Row::with_id(9));
    binding.push(&mut table, &rows);
    assert_eq!(table, Table::default());
    assert!(matches!(
        binding.try_push(&mut table, &rows),
        Err(DerivedStateError::LiftedPush { .. })
    ));
}

#[test]
fn per_accessor_misuse_policy() {
    let accessor = LiftedState::new(
        DerivedState::from_field(Table::identified).into_parts().0,
        Identified::<IdentifiedVec<Row>>::on_misuse(MisusePolicy::Ignore),
        Identity::new(),
    )
    .ro(Table::scale, Row::scale);
    let mut table = Table::default();
    let rows = accessor.get(&table);
    accessor.binding().push(&mut table, &rows);
    assert_eq!(table, Table::default());
}
