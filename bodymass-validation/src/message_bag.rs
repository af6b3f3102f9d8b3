// Per-field message collection

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Messages grouped by field key, in insertion order per key.
///
/// ```
/// use bodymass_validation::MessageBag;
///
/// let mut bag = MessageBag::new();
/// bag.add("weight", "The weight is required.")
///     .add("weight", "Weight should be a number.");
///
/// assert_eq!(bag.first("weight"), "The weight is required.");
/// assert_eq!(bag.first("height"), "");
/// assert_eq!(bag.keys(), ["weight"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBag {
    messages: BTreeMap<String, Vec<String>>,
}

impl MessageBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` to `key`'s messages.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.messages
            .entry(key.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Union this bag with `others`.
    ///
    /// Each key's messages end up sorted and de-duplicated, so the result
    /// does not depend on merge order.
    pub fn merge<'a, I>(&mut self, others: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a MessageBag>,
    {
        let mut merged: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for (key, messages) in &self.messages {
            merged.entry(key.clone()).or_default().extend(messages.iter().cloned());
        }
        for bag in others {
            for (key, messages) in &bag.messages {
                merged.entry(key.clone()).or_default().extend(messages.iter().cloned());
            }
        }

        self.messages = merged
            .into_iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(key, messages)| (key, messages.into_iter().collect()))
            .collect();
        self
    }

    /// Merge a raw key → messages map.
    pub fn merge_map(&mut self, messages: BTreeMap<String, Vec<String>>) -> &mut Self {
        let other = MessageBag { messages };
        self.merge([&other])
    }

    /// Build one bag out of bags produced elsewhere, e.g. on other threads.
    pub fn merged<I>(bags: I) -> MessageBag
    where
        I: IntoIterator<Item = MessageBag>,
    {
        let bags: Vec<MessageBag> = bags.into_iter().collect();
        let mut bag = MessageBag::new();
        bag.merge(&bags);
        bag
    }

    /// First message for `key`, or `""`.
    pub fn first(&self, key: &str) -> &str {
        self.messages
            .get(key)
            .and_then(|messages| messages.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.messages.get(key).map(Vec::as_slice)
    }

    /// The `index`th message for `key`.
    pub fn get_at(&self, key: &str, index: usize) -> Result<&str> {
        let messages = self
            .messages
            .get(key)
            .ok_or_else(|| Error::MissingKey(key.to_string()))?;

        messages
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::IndexOutOfRange {
                key: key.to_string(),
                index,
                len: messages.len(),
            })
    }

    /// Keys holding at least one message, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn has(&self, key: &str) -> bool {
        self.messages.get(key).is_some_and(|m| !m.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Number of keys holding messages.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn messages(&self) -> &BTreeMap<String, Vec<String>> {
        &self.messages
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self.messages })
    }
}

impl From<BTreeMap<String, Vec<String>>> for MessageBag {
    fn from(messages: BTreeMap<String, Vec<String>>) -> Self {
        Self { messages }
    }
}

impl fmt::Display for MessageBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, messages) in &self.messages {
            for message in messages {
                writeln!(f, "{}: {}", key, message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(entries: &[(&str, &[&str])]) -> MessageBag {
        let mut bag = MessageBag::new();
        for (key, messages) in entries {
            for message in *messages {
                bag.add(*key, *message);
            }
        }
        bag
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let bag = bag(&[("x", &["b", "a"])]);
        assert_eq!(bag.get("x").unwrap(), ["b", "a"]);
        assert_eq!(bag.first("x"), "b");
    }

    #[test]
    fn test_merge_sorts_and_dedups() {
        let mut a = bag(&[("x", &["a"])]);
        let b = bag(&[("x", &["b", "a"]), ("y", &["c"])]);

        a.merge([&b]);
        assert_eq!(a.get("x").unwrap(), ["a", "b"]);
        assert_eq!(a.get("y").unwrap(), ["c"]);
    }

    #[test]
    fn test_merge_is_commutative() {
        let a = bag(&[("x", &["a"])]);
        let b = bag(&[("x", &["b", "a"])]);

        let mut ab = a.clone();
        ab.merge([&b]);
        let mut ba = b.clone();
        ba.merge([&a]);

        assert_eq!(ab, ba);
        assert_eq!(ab.get("x").unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut a = bag(&[("x", &["b", "a"])]);
        a.merge(std::iter::empty::<&MessageBag>());
        let once = a.clone();
        a.merge([&once]);
        assert_eq!(a, once);
    }

    #[test]
    fn test_merge_map() {
        let mut a = bag(&[("x", &["a"])]);
        let mut raw = BTreeMap::new();
        raw.insert("x".to_string(), vec!["z".to_string()]);
        raw.insert("empty".to_string(), Vec::new());

        a.merge_map(raw);
        assert_eq!(a.get("x").unwrap(), ["a", "z"]);
        assert!(a.get("empty").is_none());
    }

    #[test]
    fn test_merged_across_threads() {
        let handles: Vec<_> = ["weight", "height"]
            .into_iter()
            .map(|key| {
                std::thread::spawn(move || {
                    let mut bag = MessageBag::new();
                    bag.add(key, format!("The {} is required.", key));
                    bag
                })
            })
            .collect();

        let bags = handles.into_iter().map(|h| h.join().unwrap());
        let merged = MessageBag::merged(bags);
        assert_eq!(merged.keys(), ["height", "weight"]);
    }

    #[test]
    fn test_get_at() {
        let bag = bag(&[("x", &["a", "b"])]);
        assert_eq!(bag.get_at("x", 1).unwrap(), "b");
        assert_eq!(
            bag.get_at("x", 2).unwrap_err(),
            Error::IndexOutOfRange {
                key: "x".to_string(),
                index: 2,
                len: 2
            }
        );
        assert_eq!(
            bag.get_at("y", 0).unwrap_err(),
            Error::MissingKey("y".to_string())
        );
    }

    #[test]
    fn test_empty_bag() {
        let bag = MessageBag::new();
        assert!(bag.is_empty());
        assert_eq!(bag.len(), 0);
        assert_eq!(bag.first("x"), "");
        assert!(bag.get("x").is_none());
        assert!(!bag.has("x"));
    }

    #[test]
    fn test_to_json() {
        let bag = bag(&[("weight", &["The weight is required."])]);
        assert_eq!(
            bag.to_json(),
            serde_json::json!({ "errors": { "weight": ["The weight is required."] } })
        );
    }

    #[test]
    fn test_display() {
        let bag = bag(&[("a", &["one"]), ("b", &["two"])]);
        assert_eq!(bag.to_string(), "a: one\nb: two\n");
    }
}
