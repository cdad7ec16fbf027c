//! Order-preserving parallel/sequential execution helpers.
//!
//! Parallel iterators collect results in input order, so work merged through
//! these helpers lands by structural position regardless of scheduling. The
//! `force_sequential` flag switches to plain iterators at runtime for
//! profiling and for single-threaded replays.

use rayon::prelude::*;

/// Map a function over a slice. Output order matches input order.
#[inline]
pub fn map_slice<T, F, R>(slice: &[T], f: F, force_sequential: bool) -> Vec<R>
where
    T: Sync,
    F: Fn(&T) -> R + Sync + Send,
    R: Send,
{
    if force_sequential {
        slice.iter().map(f).collect()
    } else {
        slice.par_iter().map(f).collect()
    }
}

/// Map a function over a mutable slice. Output order matches input order.
///
/// Each closure call gets exclusive access to one element, so elements can be
/// updated concurrently without shared state.
#[inline]
pub fn map_slice_mut<T, F, R>(slice: &mut [T], f: F, force_sequential: bool) -> Vec<R>
where
    T: Send,
    F: Fn(&mut T) -> R + Sync + Send,
    R: Send,
{
    if force_sequential {
        slice.iter_mut().map(f).collect()
    } else {
        slice.par_iter_mut().map(f).collect()
    }
}

/// Map a function over `0..count`. Output order matches index order.
#[inline]
pub fn map_indices<F, R>(count: u32, f: F, force_sequential: bool) -> Vec<R>
where
    F: Fn(u32) -> R + Sync + Send,
    R: Send,
{
    if force_sequential {
        (0..count).map(f).collect()
    } else {
        (0..count).into_par_iter().map(f).collect()
    }
}
