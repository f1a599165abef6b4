//! Element types and the capability gate.
//!
//! Every kernel is generic over an [`Element`]. Instead of probing operators at
//! runtime, an element type declares the operators it supports as associated
//! constants. The gate functions below read those constants, so the answer is
//! fixed per monomorphized type and costs nothing at runtime.
//!
//! # Example
//!
//! ```rust
//! use simdmath::{supports_add, supports_multiply, supports_ordering};
//!
//! assert!(supports_add::<f32>());
//! assert!(supports_multiply::<i64>());
//! assert!(!supports_add::<bool>());
//! assert!(supports_ordering::<char>());
//! ```

use crate::error::{Capability, KernelError, Result};
use crate::lanes;

/// Scalar binary operator, e.g. `+` or `*`.
pub type BinaryOp<T> = fn(T, T) -> T;

/// Scalar strict comparison, `a > b`.
pub type Comparison<T> = fn(T, T) -> bool;

/// A value the kernels can load, store and (optionally) compute with.
///
/// Capabilities default to `None`; an element type opts into each one by
/// overriding the matching constant. The kernels never call through those
/// constants directly: they call [`plus`](Element::plus),
/// [`times`](Element::times) and [`greater_than`](Element::greater_than),
/// which are monomorphized into the chunk loops. The default method bodies
/// forward to the constants; overriding them with a plain expression keeps
/// the chunk loops free of calls.
///
/// The kernels only call an operator after the gate confirmed the matching
/// constant is `Some`.
///
/// For types implementing `Add + Mul + PartialOrd`, the
/// [`arithmetic_element!`](crate::arithmetic_element) macro does all of that in
/// one line.
pub trait Element: Copy + Default + Send + Sync + 'static {
    /// Elements per SIMD chunk.
    const LANES: usize = lanes::width_of::<Self>();

    /// Scalar `+`, if defined.
    const ADD: Option<BinaryOp<Self>> = None;

    /// Scalar `*`, if defined.
    const MULTIPLY: Option<BinaryOp<Self>> = None;

    /// Scalar `>`, if defined.
    const GREATER: Option<Comparison<Self>> = None;

    /// `self + rhs` as computed by the kernels.
    #[inline(always)]
    fn plus(self, rhs: Self) -> Self {
        match Self::ADD {
            Some(add) => add(self, rhs),
            None => self,
        }
    }

    /// `self * rhs` as computed by the kernels.
    #[inline(always)]
    fn times(self, rhs: Self) -> Self {
        match Self::MULTIPLY {
            Some(multiply) => multiply(self, rhs),
            None => self,
        }
    }

    /// `self > rhs` as computed by the kernels.
    #[inline(always)]
    fn greater_than(self, rhs: Self) -> bool {
        match Self::GREATER {
            Some(greater) => greater(self, rhs),
            None => false,
        }
    }
}

#[doc(hidden)]
#[inline]
pub fn greater<T: PartialOrd>(a: T, b: T) -> bool {
    a > b
}

/// Implements [`Element`] with addition, multiplication and ordering for types
/// that implement `Add<Output = Self> + Mul<Output = Self> + PartialOrd`.
///
/// The `wrapping:` form is for primitive integers: their `+` and `*` wrap on
/// overflow instead of panicking.
///
/// ```rust
/// use core::ops::{Add, Mul};
///
/// #[derive(Clone, Copy, Default, Debug, PartialEq, PartialOrd)]
/// struct Meters(f64);
///
/// impl Add for Meters {
///     type Output = Self;
///     fn add(self, rhs: Self) -> Self { Meters(self.0 + rhs.0) }
/// }
///
/// impl Mul for Meters {
///     type Output = Self;
///     fn mul(self, rhs: Self) -> Self { Meters(self.0 * rhs.0) }
/// }
///
/// simdmath::arithmetic_element!(Meters);
///
/// let total = simdmath::sum(&[Meters(1.0), Meters(2.5)]).unwrap();
/// assert_eq!(total, Meters(3.5));
/// ```
#[macro_export]
macro_rules! arithmetic_element {
    (wrapping: $($t:ty),* $(,)?) => {$(
        impl $crate::Element for $t {
            const ADD: Option<$crate::BinaryOp<Self>> = Some(<$t>::wrapping_add);
            const MULTIPLY: Option<$crate::BinaryOp<Self>> = Some(<$t>::wrapping_mul);
            const GREATER: Option<$crate::Comparison<Self>> = Some($crate::capabilities::greater::<$t>);

            #[inline(always)]
            fn plus(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            #[inline(always)]
            fn times(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            #[inline(always)]
            fn greater_than(self, rhs: Self) -> bool {
                self > rhs
            }
        }
    )*};
    ($($t:ty),* $(,)?) => {$(
        impl $crate::Element for $t {
            const ADD: Option<$crate::BinaryOp<Self>> = Some(<$t as core::ops::Add>::add);
            const MULTIPLY: Option<$crate::BinaryOp<Self>> = Some(<$t as core::ops::Mul>::mul);
            const GREATER: Option<$crate::Comparison<Self>> = Some($crate::capabilities::greater::<$t>);

            #[inline(always)]
            fn plus(self, rhs: Self) -> Self {
                <$t as core::ops::Add>::add(self, rhs)
            }

            #[inline(always)]
            fn times(self, rhs: Self) -> Self {
                <$t as core::ops::Mul>::mul(self, rhs)
            }

            #[inline(always)]
            fn greater_than(self, rhs: Self) -> bool {
                self > rhs
            }
        }
    )*};
}

arithmetic_element!(f32, f64);
arithmetic_element!(wrapping: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

#[cfg(feature = "half")]
arithmetic_element!(half::f16, half::bf16);

// Ordered, but with no arithmetic.
impl Element for bool {
    const GREATER: Option<Comparison<Self>> = Some(greater::<bool>);

    #[inline(always)]
    fn greater_than(self, rhs: Self) -> bool {
        self > rhs
    }
}

impl Element for char {
    const GREATER: Option<Comparison<Self>> = Some(greater::<char>);

    #[inline(always)]
    fn greater_than(self, rhs: Self) -> bool {
        self > rhs
    }
}

impl Element for () {}

/// Returns `true` if `T` defines addition.
pub fn supports_add<T: Element>() -> bool {
    T::ADD.is_some()
}

/// Returns `true` if `T` defines multiplication.
pub fn supports_multiply<T: Element>() -> bool {
    T::MULTIPLY.is_some()
}

/// Returns `true` if `T` defines a strict `>` comparison.
pub fn supports_ordering<T: Element>() -> bool {
    T::GREATER.is_some()
}

pub(crate) fn require_add<T: Element>() -> Result<()> {
    require(supports_add::<T>(), || KernelError::unsupported::<T>(Capability::Add))
}

pub(crate) fn require_multiply<T: Element>() -> Result<()> {
    require(supports_multiply::<T>(), || KernelError::unsupported::<T>(Capability::Multiply))
}

pub(crate) fn require_ordering<T: Element>() -> Result<()> {
    require(supports_ordering::<T>(), || KernelError::unsupported::<T>(Capability::Ordering))
}

/// Addition, then multiplication.
pub(crate) fn require_arithmetic<T: Element>() -> Result<()> {
    require_add::<T>()?;
    require_multiply::<T>()
}

fn require(supported: bool, error: impl FnOnce() -> KernelError) -> Result<()> {
    if supported {
        Ok(())
    } else {
        Err(error())
    }
}
