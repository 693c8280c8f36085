//! Hermite size reduction of H
//!
//! Both passes bring every sub-diagonal entry to at most half of its
//! column's diagonal entry, using only integer row operations so A and B
//! stay unimodular.

use crate::real::Real;
use crate::state::PslqState;

/// Full reduction before the main loop
///
/// Rows 1..n, each against columns i-1 down to 0.
///
/// # Returns
/// Number of nonzero updates applied
pub fn initial_reduction<R: Real>(state: &mut PslqState<R>) -> usize {
    let n = state.n();
    let mut applied = 0;
    for i in 1..n {
        for j in (0..i).rev() {
            if state.reduce_entry(i, j) {
                applied += 1;
            }
        }
    }
    applied
}

/// Partial reduction after swapping pivot m
///
/// Only rows below m are disturbed by a swap and corner removal, and within
/// them only columns up to m+1. The last row of H is included: for n = 2 it
/// is the only row the pivot can disturb.
///
/// # Returns
/// Number of nonzero updates applied
pub fn reduce_after_swap<R: Real>(state: &mut PslqState<R>, m: usize) -> usize {
    let n = state.n();
    let mut applied = 0;
    for i in m + 1..n {
        let top = (i - 1).min(m + 1);
        for j in (0..=top).rev() {
            if state.reduce_entry(i, j) {
                applied += 1;
            }
        }
    }
    applied
}
