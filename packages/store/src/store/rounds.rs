// packages/store/src/store/rounds.rs
//! Round keys for repeated inserts under one URL
//!
//! Each URL owns a [`Rounds`] log. The n-th insert is stored as `round_n`,
//! starting at 1. Entries are only ever appended, so the next key is the log
//! length plus one and numbering stays gapless without scanning.
//!
//! Allocation is not synchronized here: callers allocate and commit inside
//! the store's write lock.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ROUND_PREFIX: &str = "round_";

/// Ordinal of a record under its URL (`round_1`, `round_2`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundKey(u32);

impl RoundKey {
    pub const FIRST: RoundKey = RoundKey(1);

    /// Returns `None` for round 0
    pub fn new(round: u32) -> Option<Self> {
        (round >= 1).then_some(RoundKey(round))
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    fn next(&self) -> RoundKey {
        RoundKey(self.0 + 1)
    }
}

impl fmt::Display for RoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ROUND_PREFIX, self.0)
    }
}

impl FromStr for RoundKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(ROUND_PREFIX)
            .and_then(|n| n.parse::<u32>().ok())
            .and_then(RoundKey::new)
            .ok_or_else(|| format!("invalid round key: {:?}", s))
    }
}

impl Serialize for RoundKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Append-only per-URL log of stored values
#[derive(Debug, Clone)]
pub struct Rounds<T> {
    entries: Vec<T>,
}

impl<T> Rounds<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Key the next `push` will receive
    pub fn next_key(&self) -> RoundKey {
        self.last_key().map(|key| key.next()).unwrap_or(RoundKey::FIRST)
    }

    pub fn last_key(&self) -> Option<RoundKey> {
        RoundKey::new(self.entries.len() as u32)
    }

    /// Append a value and return the round it was stored under
    pub fn push(&mut self, value: T) -> RoundKey {
        let key = self.next_key();
        self.entries.push(value);
        key
    }

    pub fn get(&self, key: RoundKey) -> Option<&T> {
        self.entries.get(key.0 as usize - 1)
    }

    /// Entries in round order
    pub fn iter(&self) -> impl Iterator<Item = (RoundKey, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, value)| (RoundKey(index as u32 + 1), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Rounds<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_round() {
        let rounds: Rounds<&str> = Rounds::new();
        assert_eq!(rounds.next_key(), RoundKey::FIRST);
        assert!(rounds.last_key().is_none());
        assert!(rounds.is_empty());
    }

    #[test]
    fn test_rounds_are_contiguous() {
        let mut rounds = Rounds::new();
        for expected in 1..=5u32 {
            let key = rounds.push(expected * 10);
            assert_eq!(key.number(), expected);
        }

        let keys: Vec<u32> = rounds.iter().map(|(key, _)| key.number()).collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5]);
        assert_eq!(rounds.get(RoundKey::new(3).unwrap()), Some(&30));
        assert_eq!(rounds.get(RoundKey::new(6).unwrap()), None);
    }

    #[test]
    fn test_round_key_text_form() {
        let key = RoundKey::new(2).unwrap();
        assert_eq!(key.to_string(), "round_2");
        assert_eq!("round_2".parse::<RoundKey>().unwrap(), key);
        assert!("round_0".parse::<RoundKey>().is_err());
        assert!("round_x".parse::<RoundKey>().is_err());
        assert!("2".parse::<RoundKey>().is_err());
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"round_2\"");
    }

    #[test]
    fn test_round_key_ordering() {
        let a = RoundKey::new(2).unwrap();
        let b = RoundKey::new(10).unwrap();
        assert!(a < b);
        assert!(RoundKey::new(0).is_none());
    }
}
