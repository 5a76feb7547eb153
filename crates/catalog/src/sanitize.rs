//! Item identifiers derived from layer names.

use std::collections::{HashMap, HashSet};

/// Identifier used when nothing of the layer name survives sanitization.
pub const PLACEHOLDER_ID: &str = "item";

const FILLER: char = 'x';

/// Turn a display name into an identifier matching `^[a-z0-9][a-z0-9_-]*$`.
///
/// Idempotent; never fails.
pub fn sanitize_id(name: &str) -> String {
    let mut id: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect();

    if id.is_empty() {
        return PLACEHOLDER_ID.to_string();
    }
    if !id.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        id.insert(0, FILLER);
    }
    id
}

/// Hands out unique identifiers within one export run.
///
/// The first claim of a name returns its sanitized id; the n-th repeat
/// returns `{id}-{n}`. Only claimed ids count as repeats, so
/// [`next_id`](Self::next_id) can be used to name work that may still fail.
#[derive(Debug, Default)]
pub struct IdRegistry {
    uses: HashMap<String, usize>,
    claimed: HashSet<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next [`claim`](Self::claim) of `name` would return.
    pub fn next_id(&self, name: &str) -> String {
        self.resolve(&sanitize_id(name)).1
    }

    pub fn claim(&mut self, name: &str) -> String {
        let base = sanitize_id(name);
        let (n, id) = self.resolve(&base);
        self.uses.insert(base, n + 1);
        self.claimed.insert(id.clone());
        id
    }

    fn resolve(&self, base: &str) -> (usize, String) {
        let mut n = self.uses.get(base).copied().unwrap_or(0);
        let mut id = suffixed(base, n);
        // A suffixed id may already belong to a layer literally named that way.
        while self.claimed.contains(&id) {
            n += 1;
            id = suffixed(base, n);
        }
        (n, id)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

fn suffixed(base: &str, n: usize) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid(id: &str) -> bool {
        let mut chars = id.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit())
            && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    }

    #[test]
    fn sanitize_examples() {
        assert_eq!(sanitize_id("Roads"), "roads");
        assert_eq!(sanitize_id("Flood Extent 2024"), "floodextent2024");
        assert_eq!(sanitize_id("my_layer-v2"), "my_layer-v2");
        assert_eq!(sanitize_id("_hidden"), "x_hidden");
        assert_eq!(sanitize_id("--"), "x--");
        assert_eq!(sanitize_id("!!!"), PLACEHOLDER_ID);
        assert_eq!(sanitize_id(""), PLACEHOLDER_ID);
        assert_eq!(sanitize_id("Höhenmodell"), "hhenmodell");
    }

    #[test]
    fn sanitize_grammar_and_idempotence() {
        let inputs = [
            "Roads", "roads!", " leading space", "_x", "-", "日本", "Ünïcödé", "a/b\\c", "42",
            "UPPER_lower-Mixed", "tab\tname", "",
        ];
        for input in inputs {
            let once = sanitize_id(input);
            assert!(is_valid(&once), "{:?} -> {:?}", input, once);
            assert_eq!(sanitize_id(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn registry_suffixes_collisions() {
        let mut ids = IdRegistry::new();
        assert_eq!(ids.claim("Roads"), "roads");
        assert_eq!(ids.claim("roads!"), "roads-1");
        assert_eq!(ids.claim("ROADS"), "roads-2");
        assert_eq!(ids.claim("rivers"), "rivers");
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn next_id_does_not_reserve() {
        let mut ids = IdRegistry::new();
        assert_eq!(ids.next_id("Roads"), "roads");
        assert_eq!(ids.next_id("Roads"), "roads");
        assert!(ids.is_empty());
        assert_eq!(ids.claim("Roads"), "roads");
        assert_eq!(ids.next_id("roads!"), "roads-1");
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn registry_skips_literal_suffixed_names() {
        let mut ids = IdRegistry::new();
        assert_eq!(ids.claim("roads-1"), "roads-1");
        assert_eq!(ids.claim("roads"), "roads");
        assert_eq!(ids.claim("roads"), "roads-2");
        assert_eq!(ids.claim("roads-1"), "roads-1-1");
    }
}
