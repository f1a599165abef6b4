//! Parallel forms of the elementwise kernels and the dot product.
//!
//! Validation is identical to the sequential forms. Full chunks are spread
//! over the given [`rayon::ThreadPool`], each chunk task writing its own
//! disjoint output chunk. The scalar remainder runs on the calling thread once
//! every chunk task has finished.
//!
//! A panicking chunk task does not abort its siblings. Every panic message is
//! collected and reported as a single [`KernelError::ParallelTaskFailed`].
//!
//! ```rust
//! use simdmath::{add_par, PoolConfig};
//!
//! let pool = PoolConfig::default().num_threads(2).try_spawn().unwrap();
//! let a: Vec<f32> = (0..100).map(|i| i as f32).collect();
//! let sum = add_par(&a, &a, &pool).unwrap();
//! assert_eq!(sum[99], 198.0);
//! ```

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::capabilities::{require_add, require_arithmetic, require_multiply};
use crate::capabilities::Element;
use crate::error::{KernelError, Result};
use crate::lanes;
use crate::operand::{in_place, pair, triple, windowed, Operand, OperandMut, Window};
use crate::sequential;

// region: Add

/// Adds two slices elementwise into a new vector, spreading chunks over `pool`.
pub fn add_par<'a, T: Element>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    pool: &ThreadPool,
) -> Result<Vec<T>> {
    require_add::<T>()?;
    let (lhs, rhs) = pair(lhs, rhs)?;
    let mut ans = vec![T::default(); lhs.len()];
    zip_with_par(lhs, rhs, &mut ans, T::plus, pool)?;
    Ok(ans)
}

/// Adds two slices elementwise into `ans`, spreading chunks over `pool`.
pub fn add_par_into<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    ans: impl OperandMut<'b, T>,
    pool: &ThreadPool,
) -> Result<()> {
    require_add::<T>()?;
    let (lhs, rhs, ans) = triple(lhs, rhs, ans)?;
    zip_with_par(lhs, rhs, ans, T::plus, pool)
}

/// Windowed addition, see [`add_range`](crate::add_range).
#[allow(clippy::too_many_arguments)]
pub fn add_par_range<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    lhs_offset: isize,
    rhs: impl Operand<'a, T>,
    rhs_offset: isize,
    ans: impl OperandMut<'b, T>,
    ans_offset: isize,
    length: isize,
    pool: &ThreadPool,
) -> Result<()> {
    require_add::<T>()?;
    let window = Window {
        lhs_offset,
        rhs_offset,
        ans_offset,
        length,
    };
    let (lhs, rhs, ans) = windowed(lhs, rhs, ans, window)?;
    zip_with_par(lhs, rhs, ans, T::plus, pool)
}

/// Adds `rhs` into `lhs` in place, spreading chunks over `pool`.
pub fn add_assign_par<'a, 'b, T: Element>(
    lhs: impl OperandMut<'b, T>,
    rhs: impl Operand<'a, T>,
    pool: &ThreadPool,
) -> Result<()> {
    require_add::<T>()?;
    let (lhs, rhs) = in_place(lhs, rhs)?;
    zip_with_assign_par(lhs, rhs, T::plus, pool)
}

// endregion: Add

// region: Multiply

/// Multiplies two slices elementwise into a new vector, spreading chunks over `pool`.
pub fn multiply_par<'a, T: Element>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    pool: &ThreadPool,
) -> Result<Vec<T>> {
    require_multiply::<T>()?;
    let (lhs, rhs) = pair(lhs, rhs)?;
    let mut ans = vec![T::default(); lhs.len()];
    zip_with_par(lhs, rhs, &mut ans, T::times, pool)?;
    Ok(ans)
}

/// Multiplies two slices elementwise into `ans`, spreading chunks over `pool`.
pub fn multiply_par_into<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    rhs: impl Operand<'a, T>,
    ans: impl OperandMut<'b, T>,
    pool: &ThreadPool,
) -> Result<()> {
    require_multiply::<T>()?;
    let (lhs, rhs, ans) = triple(lhs, rhs, ans)?;
    zip_with_par(lhs, rhs, ans, T::times, pool)
}

/// Windowed multiplication, see [`multiply_range`](crate::multiply_range).
#[allow(clippy::too_many_arguments)]
pub fn multiply_par_range<'a, 'b, T: Element>(
    lhs: impl Operand<'a, T>,
    lhs_offset: isize,
    rhs: impl Operand<'a, T>,
    rhs_offset: isize,
    ans: impl OperandMut<'b, T>,
    ans_offset: isize,
    length: isize,
    pool: &ThreadPool,
) -> Result<()> {
    require_multiply::<T>()?;
    let window = Window {
        lhs_offset,
        rhs_offset,
        ans_offset,
        length,
    };
    let (lhs, rhs, ans) = windowed(lhs, rhs, ans, window)?;
    zip_with_par(lhs, rhs, ans, T::times, pool)
}

/// Multiplies `lhs` by `rhs` in place, spreading chunks over `pool`.
pub fn multiply_assign_par<'a, 'b, T: Element>(
    lhs: impl OperandMut<'b, T>,
    rhs: impl Operand<'a, T>,
    pool: &ThreadPool,
) -> Result<()> {
    require_multiply::<T>()?;
    let (lhs, rhs) = in_place(lhs, rhs)?;
    zip_with_assign_par(lhs, rhs, T::times, pool)
}

// endregion: Multiply

// region: Dot

/// Dot product with chunk partials computed on `pool`.
///
/// Partials are folded on the calling thread in chunk order, followed by the
/// remainder, so integer results equal [`dot`](crate::dot).
pub fn dot_par<'a, T: Element>(lhs: impl Operand<'a, T>, rhs: impl Operand<'a, T>, pool: &ThreadPool) -> Result<T> {
    require_arithmetic::<T>()?;
    let (lhs, rhs) = pair(lhs, rhs)?;
    dot_par_unchecked(lhs, rhs, pool)
}

fn dot_par_unchecked<T: Element>(lhs: &[T], rhs: &[T], pool: &ThreadPool) -> Result<T> {
    let width = lanes::chunk_width::<T>();
    let body = lanes::body_len(lhs.len(), width);
    let (lhs_body, lhs_tail) = lhs.split_at(body);
    let (rhs_body, rhs_tail) = rhs.split_at(body);

    dispatched::<T>("dot", body / width, pool);
    let partials: Vec<Result<T, String>> = pool.install(|| {
        lhs_body
            .par_chunks_exact(width)
            .zip(rhs_body.par_chunks_exact(width))
            .map(|(a, b)| guarded(|| lanes::dot(a, b)))
            .collect()
    });

    let mut failures = Vec::new();
    let mut total = T::default();
    for partial in partials {
        match partial.and_then(|value| guarded(|| total.plus(value))) {
            Ok(sum) => total = sum,
            Err(failure) => failures.push(failure),
        }
    }
    let remainder = guarded(|| {
        lhs_tail
            .iter()
            .zip(rhs_tail)
            .fold(total, |acc, (&a, &b)| acc.plus(a.times(b)))
    });
    match remainder {
        Ok(value) => total = value,
        Err(failure) => failures.push(failure),
    }
    settle(failures)?;
    Ok(total)
}

// endregion: Dot

// region: Workers

pub(crate) fn zip_with_par<T: Element>(
    lhs: &[T],
    rhs: &[T],
    ans: &mut [T],
    op: impl Fn(T, T) -> T + Copy + Send + Sync,
    pool: &ThreadPool,
) -> Result<()> {
    let width = lanes::chunk_width::<T>();
    let body = lanes::body_len(ans.len(), width);
    let (lhs_body, lhs_tail) = lhs.split_at(body);
    let (rhs_body, rhs_tail) = rhs.split_at(body);
    let (ans_body, ans_tail) = ans.split_at_mut(body);

    dispatched::<T>("elementwise", body / width, pool);
    let mut failures: Vec<String> = pool.install(|| {
        ans_body
            .par_chunks_exact_mut(width)
            .zip(lhs_body.par_chunks_exact(width))
            .zip(rhs_body.par_chunks_exact(width))
            .filter_map(|((out, a), b)| guarded(|| lanes::map(a, b, out, op)).err())
            .collect()
    });

    if let Err(failure) = guarded(|| sequential::zip_with(lhs_tail, rhs_tail, ans_tail, op)) {
        failures.push(failure);
    }
    settle(failures)
}

pub(crate) fn zip_with_assign_par<T: Element>(
    lhs: &mut [T],
    rhs: &[T],
    op: impl Fn(T, T) -> T + Copy + Send + Sync,
    pool: &ThreadPool,
) -> Result<()> {
    let width = lanes::chunk_width::<T>();
    let body = lanes::body_len(lhs.len(), width);
    let (lhs_body, lhs_tail) = lhs.split_at_mut(body);
    let (rhs_body, rhs_tail) = rhs.split_at(body);

    dispatched::<T>("in-place", body / width, pool);
    let mut failures: Vec<String> = pool.install(|| {
        lhs_body
            .par_chunks_exact_mut(width)
            .zip(rhs_body.par_chunks_exact(width))
            .filter_map(|(acc, b)| guarded(|| lanes::map_assign(acc, b, op)).err())
            .collect()
    });

    if let Err(failure) = guarded(|| sequential::zip_with_assign(lhs_tail, rhs_tail, op)) {
        failures.push(failure);
    }
    settle(failures)
}

/// Runs `task`, turning a panic into its message.
pub(crate) fn guarded<R>(task: impl FnOnce() -> R) -> Result<R, String> {
    catch_unwind(AssertUnwindSafe(task)).map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked with a non-string payload".to_owned()
    }
}

/// Maps collected task failures to the call's outcome.
pub(crate) fn settle(failures: Vec<String>) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    log::warn!("{} parallel task(s) failed", failures.len());
    Err(KernelError::ParallelTaskFailed { failures })
}

pub(crate) fn dispatched<T: Element>(kernel: &str, tasks: usize, pool: &ThreadPool) {
    log::trace!(
        "{} kernel: {} task(s) of {} lanes of {} on {} worker(s)",
        kernel,
        tasks,
        lanes::chunk_width::<T>(),
        core::any::type_name::<T>(),
        pool.current_num_threads()
    );
}

// endregion: Workers

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{BinaryOp, Comparison};
    use crate::config::PoolConfig;
    use crate::error::{Capability, RangeViolation};
    use crate::sequential::{add, add_range, dot, multiply};
    use proptest::prelude::*;

    /// Integer element whose addition rejects negative right operands.
    #[derive(Clone, Copy, Default, Debug, PartialEq)]
    struct Fragile(i32);

    fn fragile_add(a: Fragile, b: Fragile) -> Fragile {
        assert!(b.0 >= 0, "negative operand {}", b.0);
        Fragile(a.0 + b.0)
    }

    fn fragile_multiply(a: Fragile, b: Fragile) -> Fragile {
        Fragile(a.0 * b.0)
    }

    fn fragile_greater(a: Fragile, b: Fragile) -> bool {
        a.0 > b.0
    }

    impl Element for Fragile {
        const ADD: Option<BinaryOp<Self>> = Some(fragile_add);
        const MULTIPLY: Option<BinaryOp<Self>> = Some(fragile_multiply);
        const GREATER: Option<Comparison<Self>> = Some(fragile_greater);
    }

    fn pool() -> ThreadPool {
        PoolConfig::default().num_threads(4).try_spawn().unwrap()
    }

    fn fragile(values: impl IntoIterator<Item = i32>) -> Vec<Fragile> {
        values.into_iter().map(Fragile).collect()
    }

    fn failures(result: Result<impl core::fmt::Debug>) -> Vec<String> {
        match result {
            Err(KernelError::ParallelTaskFailed { failures }) => failures,
            other => panic!("expected parallel task failures, got {:?}", other),
        }
    }

    #[test]
    fn parallel_shapes_match_scenarios() {
        let pool = pool();
        let data = [1.0f32, 2.0, 3.0];
        assert_eq!(add_par(&data, &data, &pool), Ok(vec![2.0, 4.0, 6.0]));
        assert_eq!(multiply_par(&data, &data, &pool), Ok(vec![1.0, 4.0, 9.0]));
        assert_eq!(dot_par(&data, &data, &pool), Ok(14.0));

        let mut ans = [0.0f32; 3];
        add_par_range(&data, 0, &data, 1, &mut ans, 0, 2, &pool).unwrap();
        assert_eq!(ans, [3.0, 5.0, 0.0]);

        let mut ans = [0.0f32; 3];
        multiply_par_range(&data, 0, &data, 1, &mut ans, 0, 2, &pool).unwrap();
        assert_eq!(ans, [2.0, 6.0, 0.0]);
    }

    #[test]
    fn parallel_into_and_in_place() {
        let pool = pool();
        let a: Vec<i32> = (0..1000).collect();
        let b: Vec<i32> = (0..1000).map(|x| 3 - x).collect();

        let mut ans = vec![0; 1000];
        add_par_into(&a, &b, &mut ans, &pool).unwrap();
        assert!(ans.iter().all(|&x| x == 3));

        multiply_par_into(&a, &b, &mut ans, &pool).unwrap();
        assert_eq!(ans, multiply(&a, &b).unwrap());

        let mut acc = a.clone();
        add_assign_par(&mut acc, &b, &pool).unwrap();
        assert!(acc.iter().all(|&x| x == 3));

        let mut acc = a.clone();
        multiply_assign_par(&mut acc, &b, &pool).unwrap();
        assert_eq!(acc, multiply(&a, &b).unwrap());
    }

    #[test]
    fn parallel_validation_matches_sequential() {
        let pool = pool();
        let empty: &[f32] = &[];
        let one = [1.0f32];
        let mut out = [0.0f32];

        assert_eq!(
            add_par(None::<&[f32]>, empty, &pool),
            Err(KernelError::NullArgument { argument: "lhs" })
        );
        assert_eq!(
            multiply_par_into(empty, empty, None::<&mut [f32]>, &pool),
            Err(KernelError::NullArgument { argument: "ans" })
        );
        assert_eq!(
            dot_par(empty, None::<&[f32]>, &pool),
            Err(KernelError::NullArgument { argument: "rhs" })
        );
        assert!(matches!(
            add_par(empty, &one, &pool),
            Err(KernelError::LengthMismatch { .. })
        ));
        assert!(matches!(
            add_assign_par(&mut out, empty, &pool),
            Err(KernelError::LengthMismatch { .. })
        ));
        assert_eq!(
            add_par_range(&one, 0, &one, -3, &mut out, 0, 1, &pool),
            Err(KernelError::InvalidRange {
                argument: "rhs",
                violation: RangeViolation::NegativeOffset(-3),
            })
        );
        assert!(matches!(
            multiply_par(&[true], &[false], &pool),
            Err(KernelError::UnsupportedOperation {
                capability: Capability::Multiply,
                ..
            })
        ));
    }

    #[test]
    fn integer_overflow_wraps_like_sequential() {
        let pool = pool();
        assert_eq!(add_par(&[i32::MAX], &[1], &pool), Ok(vec![i32::MIN]));
        assert_eq!(add_par(&[i32::MAX], &[1], &pool), add(&[i32::MAX], &[1]));

        let big = vec![i32::MAX; 70];
        let ones = vec![1; 70];
        assert_eq!(add_par(&big, &ones, &pool), add(&big, &ones));
        assert_eq!(multiply_par(&big, &big, &pool), multiply(&big, &big));

        let bytes = vec![200_u8; 75];
        let twos = vec![2_u8; 75];
        assert_eq!(dot_par(&bytes, &twos, &pool), dot(&bytes, &twos));
        assert_eq!(dot_par(&[200_u8, 200], &[2, 1], &pool), Ok(88));
    }

    fn unsupported<R>(capability: Capability) -> Result<R> {
        Err(KernelError::UnsupportedOperation {
            type_name: "()",
            capability,
        })
    }

    #[test]
    fn unsupported_types_are_rejected() {
        let pool = pool();
        let unit = [(); 3];
        let mut out = [(); 3];

        assert_eq!(add_par(&unit, &unit, &pool), unsupported(Capability::Add));
        assert_eq!(add_par_into(&unit, &unit, &mut out, &pool), unsupported(Capability::Add));
        assert_eq!(
            add_par_range(&unit, 0, &unit, 0, &mut out, 0, 3, &pool),
            unsupported(Capability::Add)
        );
        assert_eq!(add_assign_par(&mut out, &unit, &pool), unsupported(Capability::Add));
        assert_eq!(multiply_par_into(&unit, &unit, &mut out, &pool), unsupported(Capability::Multiply));
        assert_eq!(multiply_assign_par(&mut out, &unit, &pool), unsupported(Capability::Multiply));
        assert_eq!(dot_par(&unit, &unit, &pool), unsupported(Capability::Add));
    }

    #[test]
    fn sibling_failures_are_aggregated() {
        let pool = pool();
        // 8 lanes for a 4-byte element: four full chunks, no remainder.
        let lhs = fragile(0..32);
        let rhs = fragile((0..32).map(|i| if i == 3 || i == 20 { -1 } else { i }));

        let failures = failures(add_par(&lhs, &rhs, &pool));
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|message| message.contains("negative operand")));
    }

    #[test]
    fn remainder_failures_are_included() {
        let pool = pool();
        let mut lhs = fragile(0..35);
        let rhs = fragile((0..35).map(|i| if i == 0 || i == 33 { -1 } else { 1 }));

        // One failing chunk, one failing remainder.
        assert_eq!(failures(dot_par(&fragile(1..36), &rhs, &pool)).len(), 2);
        assert_eq!(failures(add_assign_par(&mut lhs, &rhs, &pool)).len(), 2);
    }

    #[test]
    fn healthy_chunks_are_written_despite_failures() {
        let pool = pool();
        let lhs = fragile(0..16);
        let rhs = fragile((0..16).map(|i| if i == 0 { -1 } else { 1 }));
        let mut ans = vec![Fragile(-7); 16];

        assert_eq!(failures(add_par_into(&lhs, &rhs, &mut ans, &pool)).len(), 1);
        assert_eq!(&ans[8..], &fragile(9..17)[..]);
    }

    #[test]
    fn dot_par_matches_dot_for_integers() {
        let pool = pool();
        let a: Vec<i64> = (0..1003).map(|x| x % 17 - 8).collect();
        let b: Vec<i64> = (0..1003).map(|x| x % 5).collect();
        assert_eq!(dot_par(&a, &b, &pool), dot(&a, &b));
        assert_eq!(dot_par(&[] as &[i64], &[], &pool), Ok(0));
    }

    #[test]
    fn single_worker_pool_is_deterministic() {
        let pool = PoolConfig::single_worker().try_spawn().unwrap();
        let a: Vec<f64> = (0..77).map(|x| x as f64 * 0.1).collect();
        assert_eq!(add_par(&a, &a, &pool), add(&a, &a));
        assert_eq!(dot_par(&a, &a, &pool), dot(&a, &a));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn add_par_equals_add(
            (a, b) in (0usize..300).prop_flat_map(|len| (
                proptest::collection::vec(-1.0e3f32..1.0e3, len),
                proptest::collection::vec(-1.0e3f32..1.0e3, len),
            ))
        ) {
            let pool = pool();
            prop_assert_eq!(add_par(&a, &b, &pool), add(&a, &b));
            prop_assert_eq!(multiply_par(&a, &b, &pool), multiply(&a, &b));
        }

        #[test]
        fn add_par_range_equals_add_range(
            data in proptest::collection::vec(-100i32..100, 1..200),
            offset in 0usize..50,
        ) {
            let pool = pool();
            let offset = offset.min(data.len() - 1);
            let length = (data.len() - offset) as isize;
            let mut sequential = vec![0; data.len()];
            let mut parallel = vec![0; data.len()];
            add_range(&data, offset as isize, &data, 0, &mut sequential, 0, length).unwrap();
            add_par_range(&data, offset as isize, &data, 0, &mut parallel, 0, length, &pool).unwrap();
            prop_assert_eq!(sequential, parallel);
        }
    }
}
