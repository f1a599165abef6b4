//! SIMD chunk width and the per-chunk vector operations.
//!
//! A window of `n` elements is split into `n / LANES` full chunks and a scalar
//! remainder of `n % LANES` elements. Chunk operations below take exactly one
//! chunk per operand and run a fixed-trip-count loop the compiler lowers to
//! vector instructions; the remainder is always handled by the scalar operator
//! in the caller, never by these functions.

use crate::capabilities::Element;

/// Register width the chunking targets: 256-bit (AVX2, two NEON registers).
pub const VECTOR_BYTES: usize = 32;

/// Elements of `T` per vector register, at least one.
pub const fn width_of<T>() -> usize {
    let size = core::mem::size_of::<T>();
    if size == 0 || size >= VECTOR_BYTES {
        1
    } else {
        VECTOR_BYTES / size
    }
}

/// Chunk width used for `T`: its `LANES`, at least one.
#[inline]
pub fn chunk_width<T: Element>() -> usize {
    T::LANES.max(1)
}

/// Number of leading elements covered by full chunks.
#[inline]
pub(crate) fn body_len(length: usize, lanes: usize) -> usize {
    length - length % lanes
}

#[inline(always)]
pub(crate) fn map<T: Copy>(a: &[T], b: &[T], out: &mut [T], op: impl Fn(T, T) -> T) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = op(x, y);
    }
}

#[inline(always)]
pub(crate) fn map_assign<T: Copy>(acc: &mut [T], b: &[T], op: impl Fn(T, T) -> T) {
    for (o, &y) in acc.iter_mut().zip(b) {
        *o = op(*o, y);
    }
}

#[inline(always)]
pub(crate) fn max<T: Element>(a: &[T], b: &[T], out: &mut [T]) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = if x.greater_than(y) { x } else { y };
    }
}

#[inline(always)]
pub(crate) fn max_broadcast<T: Element>(a: &[T], value: T, out: &mut [T]) {
    for (o, &x) in out.iter_mut().zip(a) {
        *o = if x.greater_than(value) { x } else { value };
    }
}

/// Horizontal sum of one chunk, lanes folded in order.
#[inline(always)]
pub(crate) fn reduce_add<T: Element>(a: &[T]) -> T {
    a.iter().fold(T::default(), |acc, &x| acc.plus(x))
}

/// Dot product of one chunk pair, lanes folded in order.
#[inline(always)]
pub(crate) fn dot<T: Element>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b).fold(T::default(), |acc, (&x, &y)| acc.plus(x.times(y)))
}
