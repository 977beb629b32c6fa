//! Collision-free output column names
//!
//! A candidate that clashes with an existing name, or that is proposed more
//! than once, gets a numeric suffix `"name (k)"`. Numbering continues after
//! the largest suffix already used for that name, so `"x"` next to an
//! existing `"x (2)"` becomes `"x (3)"`. Candidates without a clash keep
//! their spelling.

use std::collections::{HashMap, HashSet};

/// Suffix index of `existing` as a variant of `base`: 0 for the bare name,
/// k for `"base (k)"`
fn suffix_index(existing: &str, base: &str) -> Option<usize> {
    if existing == base {
        return Some(0);
    }
    existing
        .strip_prefix(base)?
        .strip_prefix(" (")?
        .strip_suffix(')')
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
}

/// Names equal in length and order to `candidates`, distinct from each
/// other and from every name in `existing`
pub fn allocate<S: AsRef<str>, E: AsRef<str>>(candidates: &[S], existing: &[E]) -> Vec<String> {
    let mut proposed_count: HashMap<&str, usize> = HashMap::new();
    for name in candidates {
        *proposed_count.entry(name.as_ref()).or_default() += 1;
    }

    // Next suffix for every candidate that needs one
    let mut next_index: HashMap<&str, usize> = HashMap::new();
    for name in candidates {
        let name = name.as_ref();
        let used = existing
            .iter()
            .filter_map(|e| suffix_index(e.as_ref(), name))
            .max();
        match used {
            Some(max) => {
                next_index.insert(name, max + 1);
            }
            None if proposed_count[name] > 1 => {
                next_index.insert(name, 1);
            }
            None => {}
        }
    }

    let mut taken: HashSet<String> = existing.iter().map(|e| e.as_ref().to_string()).collect();
    taken.extend(
        candidates
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| !next_index.contains_key(c))
            .map(str::to_string),
    );

    candidates
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let Some(index) = next_index.get_mut(name) else {
                return name.to_string();
            };
            loop {
                let unique = format!("{} ({})", name, index);
                *index += 1;
                if taken.insert(unique.clone()) {
                    return unique;
                }
            }
        })
        .collect()
}

/// [`allocate`] against an empty namespace
pub fn allocate_unique<S: AsRef<str>>(candidates: &[S]) -> Vec<String> {
    allocate::<S, &str>(candidates, &[])
}
