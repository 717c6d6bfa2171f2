#![forbid(unsafe_code)]

//! Booth identifier generation.
//!
//! Ids are one uppercase prefix letter followed by a sequence number padded
//! to at least three digits (`A001`, `L042`, `X1000`). The prefix is the
//! uppercased first letter of the owning floor's label, or `A` when the
//! label does not start with an ASCII letter. Floors whose labels share a
//! first character share one counter, so ids stay unique across the whole
//! exhibition.
//!
//! # Invariants
//!
//! - Per prefix, generated numbers are strictly increasing.
//! - [`BoothIdGenerator::sync_from`] only ever raises counters; restoring
//!   an older tree can never make the generator hand out an id it already
//!   issued.

use ahash::AHashMap;

use crate::floor::Floor;

const DEFAULT_PREFIX: char = 'A';

#[derive(Debug, Clone, Default)]
pub struct BoothIdGenerator {
    counters: AHashMap<char, u32>,
}

impl BoothIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix letter for a floor label.
    ///
    /// Labels that do not start with an ASCII letter (`"1F"`, `"一层"`) map
    /// to the default prefix, so every issued id parses back in
    /// [`sync_from`](Self::sync_from).
    #[must_use]
    pub fn prefix_for(label: &str) -> char {
        label
            .chars()
            .next()
            .filter(char::is_ascii_alphabetic)
            .map_or(DEFAULT_PREFIX, |c| c.to_ascii_uppercase())
    }

    /// Allocates the next id for a floor labelled `label`.
    pub fn next(&mut self, label: &str) -> String {
        let prefix = Self::prefix_for(label);
        let counter = self.counters.entry(prefix).or_insert(0);
        *counter = counter.saturating_add(1);
        format!("{prefix}{:03}", *counter)
    }

    /// Last number issued for `prefix` (0 when none).
    #[must_use]
    pub fn current(&self, prefix: char) -> u32 {
        self.counters.get(&prefix).copied().unwrap_or(0)
    }

    /// Forces the counter for `prefix`.
    pub fn set(&mut self, prefix: char, value: u32) {
        self.counters.insert(prefix, value);
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }

    /// Raises counters so that every booth id present on `floors` is below
    /// the next id handed out for its prefix.
    ///
    /// Ids not shaped like `<A-Z><digits>` are ignored.
    pub fn sync_from<'a>(&mut self, floors: impl IntoIterator<Item = &'a Floor>) {
        for floor in floors {
            for booth in &floor.booths {
                let Some((prefix, number)) = parse_booth_id(&booth.id) else {
                    continue;
                };
                let counter = self.counters.entry(prefix).or_insert(0);
                if number > *counter {
                    *counter = number;
                }
            }
        }
    }
}

fn parse_booth_id(id: &str) -> Option<(char, u32)> {
    let mut chars = id.chars();
    let prefix = chars.next().filter(char::is_ascii_uppercase)?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(|n| (prefix, n))
}
