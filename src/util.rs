//! Small helpers shared by the coloring heuristics: the smallest-missing-color
//! search and the two sorts that build vertex orderings.

/// Returns the smallest positive integer absent from `values`.
///
/// Zeros (the "uncolored" sentinel) and values larger than the buffer are
/// treated as absent. The buffer is scrambled in the process; callers reuse a
/// scratch vector and refill it per vertex. Runs in O(n) time with no extra
/// allocation, and the result is always in `[1, values.len() + 1]`.
pub fn smallest_missing_positive(values: &mut [usize]) -> usize {
    let n = values.len();

    // Place every value v in [1, n] at slot v - 1. Each swap homes at least
    // one element, so the inner loop runs O(n) times over the whole pass.
    for i in 0..n {
        loop {
            let v = values[i];
            if v >= 1 && v <= n && values[v - 1] != v {
                values.swap(i, v - 1);
            } else {
                break;
            }
        }
    }

    for (i, &v) in values.iter().enumerate() {
        if v != i + 1 {
            return i + 1;
        }
    }
    n + 1
}

/// Returns the permutation that sorts `keys` ascending.
///
/// The sort is stable: equal keys keep ascending original-index order, so the
/// permutation is a total order on vertices. LDF+ relies on this agreeing
/// with its `(degree, index)` spin priority.
pub fn stable_permutation_by_key(keys: &[usize]) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..keys.len()).collect();
    perm.sort_by_key(|&i| keys[i]);
    perm
}

/// Sorts `keys` ascending and permutes `values` in lockstep.
///
/// Unstable; the relative order of values under equal keys is unspecified.
pub fn sort_pairs_by_key(keys: &mut [usize], values: &mut [usize]) {
    debug_assert_eq!(keys.len(), values.len());

    let mut pairs: Vec<(usize, usize)> = keys
        .iter()
        .copied()
        .zip(values.iter().copied())
        .collect();
    pairs.sort_unstable_by_key(|&(k, _)| k);

    for (i, (k, v)) in pairs.into_iter().enumerate() {
        keys[i] = k;
        values[i] = v;
    }
}
