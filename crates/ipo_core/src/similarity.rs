//! Gestalt (Ratcliff/Obershelp) string similarity.
//!
//! The ratio is `2 * M / T` where `T` is the combined character count and `M` the
//! number of characters covered by the recursively found longest common blocks.
//! The longest block search prefers the earliest start in the first string, then
//! the earliest start in the second, so the result is deterministic but not
//! guaranteed to be symmetric.

/// Minimum score granted to a candidate whose name contains the query.
pub const SUBSTRING_FLOOR: f64 = 0.6;

/// Case-insensitive similarity of `query` against `candidate`, in `[0, 1]`.
///
/// A candidate containing the query as a contiguous substring never scores below
/// [`SUBSTRING_FLOOR`].
pub fn score(query: &str, candidate: &str) -> f64 {
    let query = query.to_lowercase();
    let candidate = candidate.to_lowercase();
    let base = lowercase_ratio(&query, &candidate);
    if candidate.contains(&query) {
        base.max(SUBSTRING_FLOOR)
    } else {
        base
    }
}

/// Case-insensitive Ratcliff/Obershelp ratio. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    lowercase_ratio(&a.to_lowercase(), &b.to_lowercase())
}

fn lowercase_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

#[derive(Debug, Clone, Copy)]
struct Window {
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut pending = vec![Window {
        a_lo: 0,
        a_hi: a.len(),
        b_lo: 0,
        b_hi: b.len(),
    }];
    let mut matched = 0;

    while let Some(window) = pending.pop() {
        let (i, j, len) = longest_block(a, b, window);
        if len == 0 {
            continue;
        }
        matched += len;
        if window.a_lo < i && window.b_lo < j {
            pending.push(Window {
                a_hi: i,
                b_hi: j,
                ..window
            });
        }
        if i + len < window.a_hi && j + len < window.b_hi {
            pending.push(Window {
                a_lo: i + len,
                b_lo: j + len,
                ..window
            });
        }
    }
    matched
}

/// Longest common block inside `window` as `(start_in_a, start_in_b, len)`.
fn longest_block(a: &[char], b: &[char], window: Window) -> (usize, usize, usize) {
    let width = window.b_hi - window.b_lo;
    let (mut best_i, mut best_j, mut best_len) = (window.a_lo, window.b_lo, 0);
    // run[k + 1] holds the length of the common run ending at a[i - 1], b[b_lo + k].
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];

    for i in window.a_lo..window.a_hi {
        for (k, &ch) in b[window.b_lo..window.b_hi].iter().enumerate() {
            if ch != a[i] {
                current[k + 1] = 0;
                continue;
            }
            let len = previous[k] + 1;
            current[k + 1] = len;
            if len > best_len {
                best_i = i + 1 - len;
                best_j = window.b_lo + k + 1 - len;
                best_len = len;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }
    (best_i, best_j, best_len)
}
