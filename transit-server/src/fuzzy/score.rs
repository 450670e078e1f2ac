//! String similarity scorers on a 0–100 scale.
//!
//! All scorers compare trimmed, lower-cased input. `ratio` is the indel
//! similarity `200 * LCS / (|a| + |b|)`; the others are built on top of it.

use std::{cmp, mem::swap};

fn normalize(s: &str) -> Vec<char> {
    s.trim().to_lowercase().chars().collect()
}

fn tokens(s: &str) -> Vec<Vec<char>> {
    s.trim()
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.chars().collect())
        .collect()
}

/// Length of the longest common subsequence.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];

    for &ac in a {
        for (j, &bc) in b.iter().enumerate() {
            row[j + 1] = if ac == bc {
                prev[j] + 1
            } else {
                cmp::max(prev[j + 1], row[j])
            };
        }
        swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

fn partial_ratio_chars(a: &[char], b: &[char]) -> f64 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let mut best: f64 = 0.0;
    for window in long.windows(short.len()) {
        best = best.max(ratio_chars(short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Levenshtein edit distance, counted in chars.
pub fn distance(s1_in: &str, s2_in: &str) -> usize {
    if s1_in == s2_in {
        return 0;
    }

    let mut s1: Vec<char> = s1_in.chars().collect();
    let mut s2: Vec<char> = s2_in.chars().collect();
    if s2.len() > s1.len() {
        swap(&mut s1, &mut s2);
    }

    let mut prev: Vec<usize> = (0..=s2.len()).collect();
    let mut row = vec![0usize; s2.len() + 1];

    for (i, ic) in s1.iter().enumerate() {
        row[0] = i + 1;
        for (j, jc) in s2.iter().enumerate() {
            let sub_cost = usize::from(ic != jc);
            row[j + 1] = cmp::min(
                cmp::min(prev[j + 1] + 1, row[j] + 1),
                prev[j] + sub_cost,
            );
        }
        swap(&mut prev, &mut row);
    }
    prev[s2.len()]
}

/// Indel similarity of the whole strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    ratio_chars(&normalize(a), &normalize(b))
}

/// Best `ratio` of the shorter string against every equal-length window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    partial_ratio_chars(&normalize(a), &normalize(b))
}

/// `ratio` after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let sorted = |s: &str| {
        let mut tokens = tokens(s);
        tokens.sort();
        tokens.join(&' ')
    };
    ratio_chars(&sorted(a), &sorted(b))
}

/// Mean over query tokens of the best `ratio` against any candidate token.
pub fn best_token_ratio(query: &str, candidate: &str) -> f64 {
    let query_tokens = tokens(query);
    let candidate_tokens = tokens(candidate);
    if query_tokens.is_empty() || candidate_tokens.is_empty() {
        return 0.0;
    }

    let total: f64 = query_tokens
        .iter()
        .map(|q| {
            candidate_tokens
                .iter()
                .map(|c| ratio_chars(q, c))
                .fold(0.0, f64::max)
        })
        .sum();
    total / query_tokens.len() as f64
}

/// Blend of the scorers above, favouring substring and token matches when
/// the lengths differ a lot.
pub fn weighted_ratio(query: &str, candidate: &str) -> f64 {
    let (q, c) = (normalize(query), normalize(candidate));
    if q.is_empty() || c.is_empty() {
        return 0.0;
    }

    let mut best = ratio_chars(&q, &c).max(token_sort_ratio(query, candidate) * 0.95);

    let length_ratio = cmp::max(q.len(), c.len()) as f64 / cmp::min(q.len(), c.len()) as f64;
    if length_ratio >= 1.5 {
        let scale = if length_ratio >= 8.0 { 0.6 } else { 0.9 };
        best = best
            .max(partial_ratio_chars(&q, &c) * scale)
            .max(best_token_ratio(query, candidate) * scale * 0.95);
    }
    best
}
