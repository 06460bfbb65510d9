//! Comparator and sorter.
//!
//! Order: normalized group key, then sub key, then tie break. All three are
//! compared with their natural (lexicographic / numeric) order, so the
//! comparator is a total order as long as the keys themselves are.

use std::cmp::Ordering;

use crate::{Element, SortKey};

/// Prefixes stripped from group labels when no configuration overrides them.
pub const DEFAULT_STRIP_PREFIXES: &[&str] = &["the "];

/// Builds normalized [`SortKey`]s.
///
/// Normalization trims and lower-cases the raw label, then removes the first
/// recognized prefix (matched against the lower-cased label).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalizer {
    prefixes: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_STRIP_PREFIXES.iter().copied())
    }
}

impl Normalizer {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn normalize(&self, raw: &str) -> String {
        let folded = raw.trim().to_lowercase();
        for p in &self.prefixes {
            if let Some(rest) = folded.strip_prefix(p.as_str()) {
                return rest.to_string();
            }
        }
        folded
    }

    pub fn key(&self, group: &str, sub_key: impl Into<String>, tie_break: i64) -> SortKey {
        SortKey {
            group_key: self.normalize(group),
            sub_key: sub_key.into(),
            tie_break,
        }
    }
}

/// Total order over element metadata. Identity is ignored.
pub fn compare<I>(a: &Element<I>, b: &Element<I>) -> Ordering {
    compare_keys(&a.key, &b.key)
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    a.group_key
        .cmp(&b.group_key)
        .then_with(|| a.sub_key.cmp(&b.sub_key))
        .then_with(|| a.tie_break.cmp(&b.tie_break))
}

/// Returns a sorted copy of `input`. The input is left untouched: callers
/// compare the original order against this result by identity.
pub fn sort_elements<I: Clone>(input: &[Element<I>]) -> Vec<Element<I>> {
    let mut out = input.to_vec();
    out.sort_by(compare);
    out
}

/// `true` when every adjacent pair is non-decreasing under [`compare`].
pub fn is_sorted<I>(elements: &[Element<I>]) -> bool {
    elements
        .windows(2)
        .all(|w| compare(&w[0], &w[1]) != Ordering::Greater)
}
