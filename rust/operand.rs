//! Array arguments and their validation.
//!
//! Rust slices are never null, but the kernel contract distinguishes an absent
//! array from an empty one. Checked entry points therefore accept anything
//! implementing [`Operand`] / [`OperandMut`]: plain slices, vectors and arrays
//! are always present, `Option` wrappers may be absent. An absent argument is
//! reported as [`KernelError::NullArgument`] naming the parameter.
//!
//! ```rust
//! use simdmath::{add, KernelError};
//!
//! let a = vec![1.0f32, 2.0, 3.0];
//! assert!(add(&a, &a).is_ok());
//! assert_eq!(
//!     add(None::<&[f32]>, &a),
//!     Err(KernelError::NullArgument { argument: "lhs" })
//! );
//! ```

use crate::error::{KernelError, RangeViolation, Result};

/// A possibly absent, read-only array argument.
pub trait Operand<'a, T: 'a> {
    /// Returns the slice, or `None` for an absent argument.
    fn operand(self) -> Option<&'a [T]>;
}

/// A possibly absent, writable array argument.
pub trait OperandMut<'a, T: 'a> {
    /// Returns the slice, or `None` for an absent argument.
    fn operand_mut(self) -> Option<&'a mut [T]>;
}

/// One row of a matrix given as a sequence of rows.
pub trait Row<T> {
    /// Returns the row, or `None` for an absent row.
    fn row(&self) -> Option<&[T]>;
}

impl<'a, T: 'a> Operand<'a, T> for &'a [T] {
    fn operand(self) -> Option<&'a [T]> {
        Some(self)
    }
}

impl<'a, T: 'a> Operand<'a, T> for &'a Vec<T> {
    fn operand(self) -> Option<&'a [T]> {
        Some(self.as_slice())
    }
}

impl<'a, T: 'a, const N: usize> Operand<'a, T> for &'a [T; N] {
    fn operand(self) -> Option<&'a [T]> {
        Some(self.as_slice())
    }
}

impl<'a, T: 'a, O: Operand<'a, T>> Operand<'a, T> for Option<O> {
    fn operand(self) -> Option<&'a [T]> {
        self.and_then(Operand::operand)
    }
}

impl<'a, T: 'a> OperandMut<'a, T> for &'a mut [T] {
    fn operand_mut(self) -> Option<&'a mut [T]> {
        Some(self)
    }
}

impl<'a, T: 'a> OperandMut<'a, T> for &'a mut Vec<T> {
    fn operand_mut(self) -> Option<&'a mut [T]> {
        Some(self.as_mut_slice())
    }
}

impl<'a, T: 'a, const N: usize> OperandMut<'a, T> for &'a mut [T; N] {
    fn operand_mut(self) -> Option<&'a mut [T]> {
        Some(self.as_mut_slice())
    }
}

impl<'a, T: 'a, O: OperandMut<'a, T>> OperandMut<'a, T> for Option<O> {
    fn operand_mut(self) -> Option<&'a mut [T]> {
        self.and_then(OperandMut::operand_mut)
    }
}

impl<T> Row<T> for [T] {
    fn row(&self) -> Option<&[T]> {
        Some(self)
    }
}

impl<T> Row<T> for Vec<T> {
    fn row(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }
}

impl<T, const N: usize> Row<T> for [T; N] {
    fn row(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }
}

impl<T, R: Row<T> + ?Sized> Row<T> for &R {
    fn row(&self) -> Option<&[T]> {
        (**self).row()
    }
}

impl<T, R: Row<T>> Row<T> for Option<R> {
    fn row(&self) -> Option<&[T]> {
        self.as_ref().and_then(Row::row)
    }
}

pub(crate) fn present<'a, T: 'a>(operand: impl Operand<'a, T>, argument: &'static str) -> Result<&'a [T]> {
    operand.operand().ok_or_else(|| KernelError::null(argument))
}

pub(crate) fn present_mut<'a, T: 'a>(
    operand: impl OperandMut<'a, T>,
    argument: &'static str,
) -> Result<&'a mut [T]> {
    operand.operand_mut().ok_or_else(|| KernelError::null(argument))
}

pub(crate) fn same_length(argument: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(KernelError::mismatch(argument, expected, got));
    }
    Ok(())
}

/// Two present operands of equal length.
pub(crate) fn pair<'a, T: 'a>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
) -> Result<(&'a [T], &'a [T])> {
    let lhs = present(lhs, "lhs")?;
    let rhs = present(rhs, "rhs")?;
    same_length("rhs", lhs.len(), rhs.len())?;
    Ok((lhs, rhs))
}

/// Two present operands and a present output, all of equal length.
pub(crate) fn triple<'a, 'b, T: 'a + 'b>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    ans: impl OperandMut<'b, T>,
) -> Result<(&'a [T], &'a [T], &'b mut [T])> {
    let lhs = present(lhs, "lhs")?;
    let rhs = present(rhs, "rhs")?;
    let ans = present_mut(ans, "ans")?;
    same_length("rhs", lhs.len(), rhs.len())?;
    same_length("ans", lhs.len(), ans.len())?;
    Ok((lhs, rhs, ans))
}

/// Present operands cut down to a validated offset/length window.
pub(crate) fn windowed<'a, 'b, T: 'a + 'b>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    ans: impl OperandMut<'b, T>,
    window: Window,
) -> Result<(&'a [T], &'a [T], &'b mut [T])> {
    let lhs = present(lhs, "lhs")?;
    let rhs = present(rhs, "rhs")?;
    let ans = present_mut(ans, "ans")?;
    window.apply(lhs, rhs, ans)
}

/// A present output that doubles as the left operand, and a right operand of
/// the same length.
pub(crate) fn in_place<'a, 'b, T: 'a + 'b>(
    lhs: impl OperandMut<'b, T>,
    rhs: impl Operand<'a, T>,
) -> Result<(&'b mut [T], &'a [T])> {
    let lhs = present_mut(lhs, "lhs")?;
    let rhs = present(rhs, "rhs")?;
    same_length("rhs", lhs.len(), rhs.len())?;
    Ok((lhs, rhs))
}

/// `true` if both slices are non-empty and share at least one element of storage.
pub(crate) fn overlaps<T>(a: &[T], b: &[T]) -> bool {
    if a.is_empty() || b.is_empty() || core::mem::size_of::<T>() == 0 {
        return false;
    }
    let a_range = a.as_ptr_range();
    let b_range = b.as_ptr_range();
    a_range.start < b_range.end && b_range.start < a_range.end
}

/// A signed offset/length window over three operands, before validation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Window {
    pub(crate) lhs_offset: isize,
    pub(crate) rhs_offset: isize,
    pub(crate) ans_offset: isize,
    pub(crate) length: isize,
}

impl Window {
    /// Validates the window and returns the three sub-slices it covers.
    ///
    /// Checks run in order: negative length, negative offsets (`lhs`, `rhs`,
    /// `ans`), then bounds (`lhs`, `rhs`, `ans`).
    pub(crate) fn apply<'l, 'r, 'o, T>(
        self,
        lhs: &'l [T],
        rhs: &'r [T],
        ans: &'o mut [T],
    ) -> Result<(&'l [T], &'r [T], &'o mut [T])> {
        let length = usize::try_from(self.length)
            .map_err(|_| KernelError::range("length", RangeViolation::NegativeLength(self.length)))?;
        let lhs_offset = non_negative("lhs", self.lhs_offset)?;
        let rhs_offset = non_negative("rhs", self.rhs_offset)?;
        let ans_offset = non_negative("ans", self.ans_offset)?;

        let lhs_end = within("lhs", lhs_offset, length, lhs.len())?;
        let rhs_end = within("rhs", rhs_offset, length, rhs.len())?;
        let ans_end = within("ans", ans_offset, length, ans.len())?;

        Ok((
            &lhs[lhs_offset..lhs_end],
            &rhs[rhs_offset..rhs_end],
            &mut ans[ans_offset..ans_end],
        ))
    }
}

fn non_negative(argument: &'static str, offset: isize) -> Result<usize> {
    usize::try_from(offset).map_err(|_| KernelError::range(argument, RangeViolation::NegativeOffset(offset)))
}

fn within(argument: &'static str, offset: usize, length: usize, bound: usize) -> Result<usize> {
    match offset.checked_add(length) {
        Some(end) if end <= bound => Ok(end),
        _ => Err(KernelError::range(
            argument,
            RangeViolation::ExceedsBound {
                offset,
                length,
                bound,
            },
        )),
    }
}
