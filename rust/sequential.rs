//! Single-threaded SIMD-chunked kernels: sum, add, multiply, dot and max.
//!
//! Every public function validates its arguments, then hands the validated
//! slices to an unchecked worker. All call shapes of an operation share one
//! worker, so a result never depends on the shape it was requested through.

use crate::capabilities::{require_add, require_arithmetic, require_multiply, require_ordering};
use crate::capabilities::Element;
use crate::error::Result;
use crate::lanes;
use crate::operand::{in_place, pair, present, present_mut, same_length, triple, windowed, Window};
use crate::operand::{Operand, OperandMut};

// region: Sum

/// Sums the elements of `values`.
///
/// Returns `T::default()` for an empty slice and the single element for a
/// one-element slice. Summation is naive: chunk sums are accumulated left to
/// right, then the remainder.
///
/// ```rust
/// assert_eq!(simdmath::sum(&[1, 2, 3, 4]), Ok(10));
/// assert_eq!(simdmath::sum(&[] as &[f64]), Ok(0.0));
/// ```
pub fn sum<'a, T: Element>(values: impl Operand<'a, T>) -> Result<T> {
    require_add::<T>()?;
    let values = present(values, "values")?;
    Ok(match values {
        [] => T::default(),
        [single] => *single,
        _ => sum_unchecked(values),
    })
}

pub(crate) fn sum_unchecked<T: Element>(values: &[T]) -> T {
    let width = lanes::chunk_width::<T>();
    let (body, tail) = values.split_at(lanes::body_len(values.len(), width));

    let mut total = T::default();
    for chunk in body.chunks_exact(width) {
        total = total.plus(lanes::reduce_add(chunk));
    }
    for &value in tail {
        total = total.plus(value);
    }
    total
}

// endregion: Sum

// region: Add

/// Adds two slices elementwise into a new vector.
///
/// ```rust
/// assert_eq!(simdmath::add(&[1, 2, 3], &[1, 2, 3]), Ok(vec![2, 4, 6]));
/// ```
pub fn add<'a, T: Element>(lhs: impl Operand<'a, T>, rhs: impl Operand<'a, T>) -> Result<Vec<T>> {
    require_add::<T>()?;
    let (lhs, rhs) = pair(lhs, rhs)?;
    let mut ans = vec![T::default(); lhs.len()];
    zip_with(lhs, rhs, &mut ans, T::plus);
    Ok(ans)
}

/// Adds two slices elementwise, writing into `ans`.
pub fn add_into<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    ans: impl OperandMut<'b, T>,
) -> Result<()> {
    require_add::<T>()?;
    let (lhs, rhs, ans) = triple(lhs, rhs, ans)?;
    zip_with(lhs, rhs, ans, T::plus);
    Ok(())
}

/// Adds `length` elements of `lhs` and `rhs`, starting at the given offsets,
/// writing into `ans` starting at `ans_offset`. Elements of `ans` outside the
/// window are left untouched.
///
/// ```rust
/// let data = [1.0f32, 2.0, 3.0];
/// let mut ans = [0.0f32; 3];
/// simdmath::add_range(&data, 0, &data, 1, &mut ans, 0, 2).unwrap();
/// assert_eq!(ans, [3.0, 5.0, 0.0]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn add_range<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    lhs_offset: isize,
    rhs: impl Operand<'a, T>,
    rhs_offset: isize,
    ans: impl OperandMut<'b, T>,
    ans_offset: isize,
    length: isize,
) -> Result<()> {
    require_add::<T>()?;
    let window = Window {
        lhs_offset,
        rhs_offset,
        ans_offset,
        length,
    };
    let (lhs, rhs, ans) = windowed(lhs, rhs, ans, window)?;
    zip_with(lhs, rhs, ans, T::plus);
    Ok(())
}

/// Adds `rhs` into `lhs` in place: the output is the left operand.
///
/// There is no form writing into `rhs`. For the built-in element types `+` is
/// commutative, so swapping the arguments gives the same result. A custom
/// element with a non-commutative [`plus`](Element::plus) can only be updated
/// through its left operand.
///
/// ```rust
/// let lhs = [1, 2, 3];
/// let mut rhs = [10, 20, 30];
/// simdmath::add_assign(&mut rhs, &lhs).unwrap();
/// assert_eq!(rhs, [11, 22, 33]);
/// ```
pub fn add_assign<'a, 'b, T: Element>(lhs: impl OperandMut<'b, T>, rhs: impl Operand<'a, T>) -> Result<()> {
    require_add::<T>()?;
    let (lhs, rhs) = in_place(lhs, rhs)?;
    zip_with_assign(lhs, rhs, T::plus);
    Ok(())
}

// endregion: Add

// region: Multiply

/// Multiplies two slices elementwise into a new vector.
pub fn multiply<'a, T: Element>(lhs: impl Operand<'a, T>, rhs: impl Operand<'a, T>) -> Result<Vec<T>> {
    require_multiply::<T>()?;
    let (lhs, rhs) = pair(lhs, rhs)?;
    let mut ans = vec![T::default(); lhs.len()];
    zip_with(lhs, rhs, &mut ans, T::times);
    Ok(ans)
}

/// Multiplies two slices elementwise, writing into `ans`.
pub fn multiply_into<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    ans: impl OperandMut<'b, T>,
) -> Result<()> {
    require_multiply::<T>()?;
    let (lhs, rhs, ans) = triple(lhs, rhs, ans)?;
    zip_with(lhs, rhs, ans, T::times);
    Ok(())
}

/// Multiplies `length` elements of `lhs` and `rhs`, starting at the given
/// offsets, writing into `ans` starting at `ans_offset`.
#[allow(clippy::too_many_arguments)]
pub fn multiply_range<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    lhs_offset: isize,
    rhs: impl Operand<'a, T>,
    rhs_offset: isize,
    ans: impl OperandMut<'b, T>,
    ans_offset: isize,
    length: isize,
) -> Result<()> {
    require_multiply::<T>()?;
    let window = Window {
        lhs_offset,
        rhs_offset,
        ans_offset,
        length,
    };
    let (lhs, rhs, ans) = windowed(lhs, rhs, ans, window)?;
    zip_with(lhs, rhs, ans, T::times);
    Ok(())
}

/// Multiplies `lhs` by `rhs` in place.
///
/// As with [`add_assign`], the output is always the left operand; swap the
/// arguments to update the right one when `*` is commutative.
///
/// ```rust
/// let lhs = [2.0_f32, 3.0];
/// let mut rhs = [4.0_f32, 5.0];
/// simdmath::multiply_assign(&mut rhs, &lhs).unwrap();
/// assert_eq!(rhs, [8.0, 15.0]);
/// ```
pub fn multiply_assign<'a, 'b, T: Element>(lhs: impl OperandMut<'b, T>, rhs: impl Operand<'a, T>) -> Result<()> {
    require_multiply::<T>()?;
    let (lhs, rhs) = in_place(lhs, rhs)?;
    zip_with_assign(lhs, rhs, T::times);
    Ok(())
}

// endregion: Multiply

// region: Elementwise workers

/// `ans[i] = op(lhs[i], rhs[i])`; all three slices have the same length.
///
/// `op` is a concrete operator such as `T::plus`, so it inlines into the chunk loop.
pub(crate) fn zip_with<T: Element>(lhs: &[T], rhs: &[T], ans: &mut [T], op: impl Fn(T, T) -> T + Copy) {
    let width = lanes::chunk_width::<T>();
    let body = lanes::body_len(ans.len(), width);
    let (lhs_body, lhs_tail) = lhs.split_at(body);
    let (rhs_body, rhs_tail) = rhs.split_at(body);
    let (ans_body, ans_tail) = ans.split_at_mut(body);

    for ((out, a), b) in ans_body
        .chunks_exact_mut(width)
        .zip(lhs_body.chunks_exact(width))
        .zip(rhs_body.chunks_exact(width))
    {
        lanes::map(a, b, out, op);
    }
    for ((out, &a), &b) in ans_tail.iter_mut().zip(lhs_tail).zip(rhs_tail) {
        *out = op(a, b);
    }
}

/// `lhs[i] = op(lhs[i], rhs[i])`.
pub(crate) fn zip_with_assign<T: Element>(lhs: &mut [T], rhs: &[T], op: impl Fn(T, T) -> T + Copy) {
    let width = lanes::chunk_width::<T>();
    let body = lanes::body_len(lhs.len(), width);
    let (lhs_body, lhs_tail) = lhs.split_at_mut(body);
    let (rhs_body, rhs_tail) = rhs.split_at(body);

    for (acc, b) in lhs_body.chunks_exact_mut(width).zip(rhs_body.chunks_exact(width)) {
        lanes::map_assign(acc, b, op);
    }
    for (acc, &b) in lhs_tail.iter_mut().zip(rhs_tail) {
        *acc = op(*acc, b);
    }
}

// endregion: Elementwise workers

// region: Dot

/// Computes the **dot product** `Σ lhs[i] * rhs[i]`.
///
/// Returns `T::default()` for empty inputs.
///
/// ```rust
/// assert_eq!(simdmath::dot(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), Ok(14.0));
/// ```
pub fn dot<'a, T: Element>(lhs: impl Operand<'a, T>, rhs: impl Operand<'a, T>) -> Result<T> {
    require_arithmetic::<T>()?;
    let (lhs, rhs) = pair(lhs, rhs)?;
    Ok(dot_unchecked(lhs, rhs))
}

pub(crate) fn dot_unchecked<T: Element>(lhs: &[T], rhs: &[T]) -> T {
    let width = lanes::chunk_width::<T>();
    let body = lanes::body_len(lhs.len(), width);
    let (lhs_body, lhs_tail) = lhs.split_at(body);
    let (rhs_body, rhs_tail) = rhs.split_at(body);

    let mut total = T::default();
    for (a, b) in lhs_body.chunks_exact(width).zip(rhs_body.chunks_exact(width)) {
        total = total.plus(lanes::dot(a, b));
    }
    for (&a, &b) in lhs_tail.iter().zip(rhs_tail) {
        total = total.plus(a.times(b));
    }
    total
}

// endregion: Dot

// region: Max

/// Piecewise maximum of two slices into a new vector.
///
/// Requires the ordering capability. For each position the result is
/// `lhs[i]` if `lhs[i] > rhs[i]`, otherwise `rhs[i]`.
pub fn max<'a, T: Element>(lhs: impl Operand<'a, T>, rhs: impl Operand<'a, T>) -> Result<Vec<T>> {
    require_ordering::<T>()?;
    let (lhs, rhs) = pair(lhs, rhs)?;
    let mut ans = vec![T::default(); lhs.len()];
    max_unchecked(lhs, rhs, &mut ans);
    Ok(ans)
}

/// Piecewise maximum of two slices, writing into `ans`.
pub fn max_into<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    ans: impl OperandMut<'b, T>,
) -> Result<()> {
    require_ordering::<T>()?;
    let (lhs, rhs, ans) = triple(lhs, rhs, ans)?;
    max_unchecked(lhs, rhs, ans);
    Ok(())
}

/// Piecewise maximum of a slice and a single value into a new vector.
///
/// ```rust
/// assert_eq!(simdmath::max_scalar(&[1, 5, 2], 3), Ok(vec![3, 5, 3]));
/// ```
pub fn max_scalar<'a, T: Element>(lhs: impl Operand<'a, T>, value: T) -> Result<Vec<T>> {
    require_ordering::<T>()?;
    let lhs = present(lhs, "lhs")?;
    let mut ans = vec![T::default(); lhs.len()];
    max_scalar_unchecked(lhs, value, &mut ans);
    Ok(ans)
}

/// Piecewise maximum of a slice and a single value, writing into `ans`.
pub fn max_scalar_into<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    value: T,
    ans: impl OperandMut<'b, T>,
) -> Result<()> {
    require_ordering::<T>()?;
    let lhs = present(lhs, "lhs")?;
    let ans = present_mut(ans, "ans")?;
    same_length("ans", lhs.len(), ans.len())?;
    max_scalar_unchecked(lhs, value, ans);
    Ok(())
}

fn max_unchecked<T: Element>(lhs: &[T], rhs: &[T], ans: &mut [T]) {
    let width = lanes::chunk_width::<T>();
    let body = lanes::body_len(ans.len(), width);
    let (lhs_body, lhs_tail) = lhs.split_at(body);
    let (rhs_body, rhs_tail) = rhs.split_at(body);
    let (ans_body, ans_tail) = ans.split_at_mut(body);

    for ((out, a), b) in ans_body
        .chunks_exact_mut(width)
        .zip(lhs_body.chunks_exact(width))
        .zip(rhs_body.chunks_exact(width))
    {
        lanes::max(a, b, out);
    }
    for ((out, &a), &b) in ans_tail.iter_mut().zip(lhs_tail).zip(rhs_tail) {
        *out = if a.greater_than(b) { a } else { b };
    }
}

fn max_scalar_unchecked<T: Element>(lhs: &[T], value: T, ans: &mut [T]) {
    let width = lanes::chunk_width::<T>();
    let body = lanes::body_len(ans.len(), width);
    let (lhs_body, lhs_tail) = lhs.split_at(body);
    let (ans_body, ans_tail) = ans.split_at_mut(body);

    for (out, a) in ans_body.chunks_exact_mut(width).zip(lhs_body.chunks_exact(width)) {
        lanes::max_broadcast(a, value, out);
    }
    for (out, &a) in ans_tail.iter_mut().zip(lhs_tail) {
        *out = if a.greater_than(value) { a } else { value };
    }
}

// endregion: Max
