//! Emission diffing
//!
//! Computes what a plan emits from the previous and current result bags.
//! Bags are unordered multisets of result maps; difference is structural,
//! with each element's output multiplicity being
//! `max(0, mult_cur(e) − mult_prev(e))` (and vice versa for DSTREAM).
//!
//! The canonical `Eq`/`Hash` on [`Value`] (maps are key-ordered) lets the
//! maps themselves serve as hash keys, so the difference is one counting
//! pass over each bag instead of a quadratic scan.

use std::collections::HashMap;

use beck_core::Map;

use super::plan::EmissionMode;

/// Returns the records a plan emits for the given mode. Emitted maps are
/// clones; the caller owns them. Output order is unspecified.
pub(crate) fn emitted_records(mode: EmissionMode, prev: &[Map], cur: &[Map]) -> Vec<Map> {
    match mode {
        EmissionMode::Rstream => cur.to_vec(),
        EmissionMode::Istream => multiset_difference(cur, prev),
        EmissionMode::Dstream => multiset_difference(prev, cur),
    }
}

/// `a − b` as multisets.
fn multiset_difference(a: &[Map], b: &[Map]) -> Vec<Map> {
    let mut remaining: HashMap<&Map, usize> = HashMap::new();
    for m in b {
        *remaining.entry(m).or_insert(0) += 1;
    }
    let mut out = Vec::new();
    for m in a {
        match remaining.get_mut(m) {
            Some(count) if *count > 0 => *count -= 1,
            _ => out.push(m.clone()),
        }
    }
    out
}
