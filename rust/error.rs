//! Error types shared by every kernel entry point.

use thiserror::Error;

/// Arithmetic capability an element type may or may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Binary `+`.
    Add,
    /// Binary `*`.
    Multiply,
    /// Strict `>` comparison.
    Ordering,
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Capability::Add => write!(f, "addition"),
            Capability::Multiply => write!(f, "multiplication"),
            Capability::Ordering => write!(f, "ordering"),
        }
    }
}

/// Why an offset/length window was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeViolation {
    #[error("length {0} is negative")]
    NegativeLength(isize),
    #[error("offset {0} is negative")]
    NegativeOffset(isize),
    #[error("window of {length} elements at offset {offset} exceeds bound {bound}")]
    ExceedsBound {
        offset: usize,
        length: usize,
        bound: usize,
    },
}

/// Error type for kernel operations.
///
/// Every variant is a contract violation reported before any element is
/// written, except [`KernelError::ParallelTaskFailed`], which is reported once
/// all sibling tasks of a parallel call have finished.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// The element type lacks an operator the kernel needs.
    #[error("{type_name} does not support {capability}")]
    UnsupportedOperation {
        type_name: &'static str,
        capability: Capability,
    },
    /// A required array argument is absent.
    #[error("argument `{argument}` is null")]
    NullArgument { argument: &'static str },
    /// Operands (or a matrix row) disagree in length.
    #[error("inputs must have the same length: `{argument}` has {got} elements, expected {expected}")]
    LengthMismatch {
        argument: &'static str,
        expected: usize,
        got: usize,
    },
    /// A length or offset is negative, or a window runs past its array.
    #[error("invalid range for `{argument}`: {violation}")]
    InvalidRange {
        argument: &'static str,
        violation: RangeViolation,
    },
    /// Two arguments that must be distinct share storage.
    #[error("parameters must reference different arrays: `{argument}` aliases `{aliased}`")]
    AliasingViolation {
        argument: &'static str,
        aliased: &'static str,
    },
    /// One or more parallel tasks panicked.
    #[error("{} parallel task(s) failed: {}", .failures.len(), .failures.join("; "))]
    ParallelTaskFailed { failures: Vec<String> },
    /// The worker pool could not be spawned.
    #[error("worker pool unavailable: {reason}")]
    PoolUnavailable { reason: String },
}

impl KernelError {
    pub(crate) fn unsupported<T>(capability: Capability) -> Self {
        KernelError::UnsupportedOperation {
            type_name: core::any::type_name::<T>(),
            capability,
        }
    }

    pub(crate) fn null(argument: &'static str) -> Self {
        KernelError::NullArgument { argument }
    }

    pub(crate) fn mismatch(argument: &'static str, expected: usize, got: usize) -> Self {
        KernelError::LengthMismatch {
            argument,
            expected,
            got,
        }
    }

    pub(crate) fn range(argument: &'static str, violation: RangeViolation) -> Self {
        KernelError::InvalidRange {
            argument,
            violation,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T, E = KernelError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_names_type() {
        let error = KernelError::unsupported::<()>(Capability::Multiply);
        assert_eq!(error.to_string(), "() does not support multiplication");
    }

    #[test]
    fn range_message() {
        let error = KernelError::range(
            "rhs",
            RangeViolation::ExceedsBound {
                offset: 1,
                length: 3,
                bound: 3,
            },
        );
        assert_eq!(
            error.to_string(),
            "invalid range for `rhs`: window of 3 elements at offset 1 exceeds bound 3"
        );
    }

    #[test]
    fn task_failures_are_joined() {
        let error = KernelError::ParallelTaskFailed {
            failures: vec!["first".into(), "second".into()],
        };
        assert_eq!(
            error.to_string(),
            "2 parallel task(s) failed: first; second"
        );
    }
}
