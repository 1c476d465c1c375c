//! Fuzzy matching primitives
//!
//! - [`edit_distance`]: Levenshtein distance over chars
//! - [`get_fuzzy_matches`]: fair "did you mean" ranking for SET values
//! - [`fuzzy_starts_with`] / [`fuzzy_ends_with`] / [`fuzzy_contains`]:
//!   length-scaled tolerant versions of the MATCH predicates

use std::collections::{HashMap, HashSet};

/// Default SET suggestion distance
pub const DEFAULT_MAX_DISTANCE: usize = 3;

/// Default number of suggestions per filter
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Upper bound on the per-pattern MATCH tolerance
const MAX_PATTERN_TOLERANCE: usize = 2;

/// Minimum number of single-char edits turning `a` into `b`.
///
/// Case-sensitive; callers fold case first when they want it.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

struct Candidate<'a> {
    invalid: &'a str,
    existing: &'a str,
    distance: usize,
}

/// Rank existing values as corrections for a set of invalid values.
///
/// Each existing value is scored by its distance to the closest invalid
/// value (case-insensitive) and dropped beyond `max_distance`. Picks go in
/// ascending distance, at most `ceil(max_suggestions / invalid.len())` per
/// invalid value; leftover capacity is then filled ignoring that cap.
/// Never returns duplicates or more than `max_suggestions` values.
pub fn get_fuzzy_matches<I, E>(
    invalid: &[I],
    existing: &[E],
    max_distance: usize,
    max_suggestions: usize,
) -> Vec<String>
where
    I: AsRef<str>,
    E: AsRef<str>,
{
    if invalid.is_empty() || max_suggestions == 0 {
        return Vec::new();
    }

    let folded_invalid: Vec<(&str, String)> = invalid
        .iter()
        .map(|v| (v.as_ref(), v.as_ref().to_lowercase()))
        .collect();

    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for value in existing {
        let value = value.as_ref();
        let folded = value.to_lowercase();
        let closest = folded_invalid
            .iter()
            .map(|(original, lower)| (*original, edit_distance(lower, &folded)))
            .fold(None, |best: Option<(&str, usize)>, (original, distance)| match best {
                Some((_, d)) if d <= distance => best,
                _ => Some((original, distance)),
            });
        if let Some((invalid, distance)) = closest {
            if distance <= max_distance {
                candidates.push(Candidate {
                    invalid,
                    existing: value,
                    distance,
                });
            }
        }
    }

    // Stable: equal distances keep the order the remote returned them in
    candidates.sort_by_key(|c| c.distance);

    let per_value_cap = max_suggestions.div_ceil(invalid.len());
    let mut picked: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut per_value: HashMap<&str, usize> = HashMap::new();

    for candidate in &candidates {
        if picked.len() >= max_suggestions {
            break;
        }
        if seen.contains(candidate.existing) {
            continue;
        }
        let count = per_value.entry(candidate.invalid).or_insert(0);
        if *count >= per_value_cap {
            continue;
        }
        *count += 1;
        seen.insert(candidate.existing);
        picked.push(candidate.existing.to_string());
    }

    for candidate in &candidates {
        if picked.len() >= max_suggestions {
            break;
        }
        if seen.insert(candidate.existing) {
            picked.push(candidate.existing.to_string());
        }
    }

    picked
}

/// Tolerance for a MATCH pattern: `min(2, floor(len / 2))`
pub fn pattern_tolerance(pattern: &str) -> usize {
    MAX_PATTERN_TOLERANCE.min(pattern.chars().count() / 2)
}

/// `value` approximately starts with `pattern`
pub fn fuzzy_starts_with(value: &str, pattern: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let len = pattern.chars().count();
    let head: String = value.to_lowercase().chars().take(len).collect();
    edit_distance(&head, &pattern) <= pattern_tolerance(&pattern)
}

/// `value` approximately ends with `pattern`
pub fn fuzzy_ends_with(value: &str, pattern: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let len = pattern.chars().count();
    let chars: Vec<char> = value.to_lowercase().chars().collect();
    let tail: String = chars[chars.len().saturating_sub(len)..].iter().collect();
    edit_distance(&tail, &pattern) <= pattern_tolerance(&pattern)
}

/// `value` approximately contains `pattern` somewhere
pub fn fuzzy_contains(value: &str, pattern: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let len = pattern.chars().count();
    if len == 0 {
        return true;
    }
    let chars: Vec<char> = value.to_lowercase().chars().collect();

    let best = if chars.len() < len {
        edit_distance(&chars.iter().collect::<String>(), &pattern)
    } else {
        chars
            .windows(len)
            .map(|w| edit_distance(&w.iter().collect::<String>(), &pattern))
            .min()
            .unwrap_or(0)
    };

    best <= pattern_tolerance(&pattern)
}

// ============================================================================
// TESTS
// ============================================================================
