//! What happens when a collection-lifted binding is pushed directly.
//!
//! Pushing through a binding lifted over a sequence, a map or an identified collection is a
//! programming error: the container belongs to the storage, and only a whole-accessor `set` can
//! write it back. The reaction is configurable per binding, or process-wide through the
//! `DERIVED_STATE_MISUSE` environment variable and [`set_default_misuse_policy`].
use crate::error::DerivedStateError;
use once_cell::sync::Lazy;
use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU8, Ordering},
};

/// Environment variable read on first use to select the default misuse policy.
pub const MISUSE_POLICY_ENV: &str = "DERIVED_STATE_MISUSE";

/// Reaction to the misuse of a collection-lifted binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MisusePolicy {
    /// Panic with a diagnostic. Only in builds with debug assertions: release builds log an
    /// error instead.
    Panic,
    /// Log a warning and do nothing.
    Warn,
    /// Do nothing.
    Ignore,
}

impl MisusePolicy {
    /// The default in absence of configuration: `Panic` in debug builds, `Warn` otherwise.
    pub const fn build_default() -> MisusePolicy {
        if cfg!(debug_assertions) {
            MisusePolicy::Panic
        } else {
            MisusePolicy::Warn
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            MisusePolicy::Panic => 0,
            MisusePolicy::Warn => 1,
            MisusePolicy::Ignore => 2,
        }
    }

    fn from_u8(value: u8) -> MisusePolicy {
        match value {
            0 => MisusePolicy::Panic,
            1 => MisusePolicy::Warn,
            _ => MisusePolicy::Ignore,
        }
    }
}

impl Default for MisusePolicy {
    fn default() -> Self {
        MisusePolicy::build_default()
    }
}

impl fmt::Display for MisusePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MisusePolicy::Panic => f.write_str("panic"),
            MisusePolicy::Warn => f.write_str("warn"),
            MisusePolicy::Ignore => f.write_str("ignore"),
        }
    }
}

impl FromStr for MisusePolicy {
    type Err = DerivedStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(MisusePolicy::Panic),
            "warn" => Ok(MisusePolicy::Warn),
            "ignore" => Ok(MisusePolicy::Ignore),
            _ => Err(DerivedStateError::UnknownPolicy { value: s.to_string() }),
        }
    }
}

static DEFAULT_POLICY: Lazy<AtomicU8> = Lazy::new(|| AtomicU8::new(policy_from_env().to_u8()));

fn policy_from_env() -> MisusePolicy {
    policy_from_var(std::env::var(MISUSE_POLICY_ENV))
}

fn policy_from_var(var: Result<String, std::env::VarError>) -> MisusePolicy {
    match var {
        Ok(value) => match value.parse() {
            Ok(policy) => policy,
            Err(err) => {
                tracing::warn!("{}: {}, keeping the default", MISUSE_POLICY_ENV, err);
                MisusePolicy::build_default()
            }
        },
        Err(_) => MisusePolicy::build_default(),
    }
}

/// Returns the policy used by lifted bindings that don't specify their own.
pub fn default_misuse_policy() -> MisusePolicy {
    MisusePolicy::from_u8(DEFAULT_POLICY.load(Ordering::Relaxed))
}

/// Overrides the process-wide default policy, including the one read from the environment.
pub fn set_default_misuse_policy(policy: MisusePolicy) {
    DEFAULT_POLICY.store(policy.to_u8(), Ordering::Relaxed);
}

/// Container shape of a collection-lifted binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiftShape {
    Sequence,
    Map,
    Identified,
}

impl fmt::Display for LiftShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LiftShape::Sequence => f.write_str("sequence"),
            LiftShape::Map => f.write_str("map"),
            LiftShape::Identified => f.write_str("identified collection"),
        }
    }
}

pub(crate) fn lifted_push_error<S, D>(shape: LiftShape) -> DerivedStateError {
    DerivedStateError::LiftedPush {
        shape,
        source_type: std::any::type_name::<S>(),
        destination_type: std::any::type_name::<D>(),
    }
}

/// Applies `policy` (or the default) to a push through a lifted binding.
pub(crate) fn report_lifted_push<S, D>(shape: LiftShape, policy: Option<MisusePolicy>) {
    match policy.unwrap_or_else(default_misuse_policy) {
        MisusePolicy::Panic if cfg!(debug_assertions) => {
            panic!("{}", lifted_push_error::<S, D>(shape))
        }
        MisusePolicy::Panic => tracing::error!("{}", lifted_push_error::<S, D>(shape)),
        MisusePolicy::Warn => tracing::warn!("{}", lifted_push_error::<S, D>(shape)),
        MisusePolicy::Ignore => {}
    }
}
