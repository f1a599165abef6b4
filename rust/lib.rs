//! # SimdMath - Generic SIMD-Chunked Numeric Kernels
//!
//! * Sum, Add, Multiply, Dot, Max and matrix-vector multiplication over slices.
//! * Generic over any [`Element`]: all primitive integers and floats, plus `f16` / `bf16` behind the `half` feature.
//! * Full 256-bit chunks go through fixed-width lane loops, the remainder through scalar operators.
//! * Sequential and parallel forms, the latter running on an explicitly passed `rayon` pool.
//! * Contract violations are reported as [`KernelError`] before any element is written.
//!
//! ## Example
//!
//! ```rust
//! use simdmath::{add, dot, matrix_multiply, multiply, sum};
//!
//! let a = [1.0_f32, 2.0, 3.0];
//!
//! assert_eq!(add(&a, &a), Ok(vec![2.0, 4.0, 6.0]));
//! assert_eq!(multiply(&a, &a), Ok(vec![1.0, 4.0, 9.0]));
//! assert_eq!(dot(&a, &a), Ok(14.0));
//! assert_eq!(sum(&a), Ok(6.0));
//!
//! let rows = [[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
//! assert_eq!(matrix_multiply(&a, &rows), Ok(vec![14.0, 32.0]));
//! ```
//!
//! ## Call Shapes
//!
//! Elementwise operations come in several shapes sharing one worker:
//!
//! - `add(lhs, rhs)`: allocates and returns the result.
//! - `add_into(lhs, rhs, ans)`: writes into a caller-provided slice.
//! - `add_range(lhs, lhs_offset, rhs, rhs_offset, ans, ans_offset, length)`: windowed.
//! - `add_assign(lhs, rhs)`: in place, the output is the left operand.
//!
//! Each has a `_par` counterpart taking a `&rayon::ThreadPool` as its last
//! argument, see [`PoolConfig`].
//!
//! ## Absent Arguments
//!
//! Array arguments accept `Option`s, so an absent array is distinct from an
//! empty one:
//!
//! ```rust
//! use simdmath::{dot, KernelError};
//!
//! assert_eq!(dot(&[] as &[f64], &[]), Ok(0.0));
//! assert_eq!(
//!     dot(None::<&[f64]>, &[1.0]),
//!     Err(KernelError::NullArgument { argument: "lhs" })
//! );
//! ```
//!

pub mod capabilities;
mod config;
mod error;
pub mod lanes;
mod matrix;
mod operand;
mod parallel;
mod sequential;

// Re-export the element model
pub use capabilities::{supports_add, supports_multiply, supports_ordering, BinaryOp, Comparison, Element};
pub use lanes::chunk_width;

// Re-export errors
pub use error::{Capability, KernelError, RangeViolation, Result};

// Re-export argument traits
pub use operand::{Operand, OperandMut, Row};

// Re-export kernels
pub use matrix::{matrix_multiply, matrix_multiply_into, matrix_multiply_par, matrix_multiply_par_into};
pub use parallel::{
    add_assign_par, add_par, add_par_into, add_par_range, dot_par, multiply_assign_par, multiply_par,
    multiply_par_into, multiply_par_range,
};
pub use sequential::{
    add, add_assign, add_into, add_range, dot, max, max_into, max_scalar, max_scalar_into, multiply, multiply_assign,
    multiply_into, multiply_range, sum,
};

// Re-export pool configuration
pub use config::PoolConfig;

// region: Tests


// endregion: Tests
