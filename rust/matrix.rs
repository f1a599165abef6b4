//! Matrix-vector multiplication over a sequence of rows.
//!
//! `result[i] = dot(lhs, rhs[i])`. The matrix is any sequence of [`Row`]s, so
//! `&[Vec<T>]`, `&[[T; N]]`, `&[&[T]]` and `&[Option<Vec<T>>]` all work; an
//! absent row is reported as a null `rhs`.
//!
//! ```rust
//! let v = [1.0f32, 2.0, 3.0];
//! let rows = [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
//! assert_eq!(simdmath::matrix_multiply(&v, &rows), Ok(vec![14.0, 32.0]));
//! ```
//!
//! The output can never share storage with an input; the borrow checker
//! rejects it:
//!
//! ```rust,compile_fail
//! let mut v = vec![1.0f32, 2.0];
//! let rows = [vec![1.0f32, 2.0]];
//! simdmath::matrix_multiply_into(&v, &rows, &mut v).unwrap();
//! ```

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::capabilities::{require_arithmetic, Element};
use crate::error::{KernelError, Result};
use crate::operand::{overlaps, present, present_mut, same_length, Operand, OperandMut, Row};
use crate::parallel::{dispatched, guarded, settle};
use crate::sequential::dot_unchecked;

/// Multiplies the row matrix `rhs` by the vector `lhs`, one output per row.
pub fn matrix_multiply<'a, 'r, T, R>(lhs: impl Operand<'a, T>, rhs: impl Operand<'r, R>) -> Result<Vec<T>>
where
    T: Element,
    R: Row<T> + 'r,
{
    require_arithmetic::<T>()?;
    let lhs = present(lhs, "lhs")?;
    let rows = present(rhs, "rhs")?;
    let rows = collect_rows(lhs, rows, false)?;

    let mut ans = vec![T::default(); rows.len()];
    multiply_rows(lhs, &rows, &mut ans);
    Ok(ans)
}

/// Like [`matrix_multiply`], writing into `ans`.
///
/// `ans` must hold one slot per row, and no row may share storage with `lhs`.
pub fn matrix_multiply_into<'a, 'r, 'b, T, R>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'r, R>,
    ans: impl OperandMut<'b, T>,
) -> Result<()>
where
    T: Element,
    R: Row<T> + 'r,
{
    require_arithmetic::<T>()?;
    let (lhs, rows, ans) = validate_into(lhs, rhs, ans)?;
    multiply_rows(lhs, &rows, ans);
    Ok(())
}

/// Like [`matrix_multiply`], with one task per row on `pool`.
pub fn matrix_multiply_par<'a, 'r, T, R>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'r, R>,
    pool: &ThreadPool,
) -> Result<Vec<T>>
where
    T: Element,
    R: Row<T> + 'r,
{
    require_arithmetic::<T>()?;
    let lhs = present(lhs, "lhs")?;
    let rows = present(rhs, "rhs")?;
    let rows = collect_rows(lhs, rows, false)?;

    let mut ans = vec![T::default(); rows.len()];
    multiply_rows_par(lhs, &rows, &mut ans, pool)?;
    Ok(ans)
}

/// Like [`matrix_multiply_into`], with one task per row on `pool`.
pub fn matrix_multiply_par_into<'a, 'r, 'b, T, R>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'r, R>,
    ans: impl OperandMut<'b, T>,
    pool: &ThreadPool,
) -> Result<()>
where
    T: Element,
    R: Row<T> + 'r,
{
    require_arithmetic::<T>()?;
    let (lhs, rows, ans) = validate_into(lhs, rhs, ans)?;
    multiply_rows_par(lhs, &rows, ans, pool)
}

fn validate_into<'a, 'r, 'b, T, R>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'r, R>,
    ans: impl OperandMut<'b, T>,
) -> Result<(&'a [T], Vec<&'r [T]>, &'b mut [T])>
where
    T: Element,
    R: Row<T> + 'r,
{
    let lhs = present(lhs, "lhs")?;
    let rows = present(rhs, "rhs")?;
    let ans = present_mut(ans, "ans")?;
    same_length("ans", rows.len(), ans.len())?;
    let rows = collect_rows(lhs, rows, true)?;
    Ok((lhs, rows, ans))
}

/// Resolves every row, checking presence, length and, if asked, aliasing with `lhs`.
fn collect_rows<'r, T, R>(lhs: &[T], rows: &'r [R], distinct: bool) -> Result<Vec<&'r [T]>>
where
    T: Element,
    R: Row<T>,
{
    rows.iter()
        .map(|row| {
            let row = row.row().ok_or_else(|| KernelError::null("rhs"))?;
            same_length("rhs", lhs.len(), row.len())?;
            if distinct && overlaps(row, lhs) {
                return Err(KernelError::AliasingViolation {
                    argument: "rhs",
                    aliased: "lhs",
                });
            }
            Ok(row)
        })
        .collect()
}

fn multiply_rows<T: Element>(lhs: &[T], rows: &[&[T]], ans: &mut [T]) {
    for (out, row) in ans.iter_mut().zip(rows) {
        *out = dot_unchecked(lhs, row);
    }
}

fn multiply_rows_par<T: Element>(
    lhs: &[T],
    rows: &[&[T]],
    ans: &mut [T],
    pool: &ThreadPool,
) -> Result<()> {
    dispatched::<T>("matrix", rows.len(), pool);
    let failures: Vec<String> = pool.install(|| {
        ans.par_iter_mut()
            .zip(rows.par_iter())
            .filter_map(|(out, row)| guarded(|| *out = dot_unchecked(lhs, row)).err())
            .collect()
    });
    settle(failures)
}
