//! Command set diffing.

use crate::definition_hash;
use serde_json::Value;
use std::collections::BTreeMap;

/// Name-to-hash map of a deployed command set, the unit the snapshot
/// store persists and diffs compare.
pub type CommandHashes = BTreeMap<String, String>;

/// What changed between two deployments.
///
/// Names in each bucket are sorted, so reports and logs are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandDiff {
    /// Commands present now but not before.
    pub added: Vec<String>,
    /// Commands whose definition hash changed.
    pub updated: Vec<String>,
    /// Commands present before but not now.
    pub removed: Vec<String>,
}

impl CommandDiff {
    /// Returns `true` when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    /// Total number of changed commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }
}

/// Hashes a full set of definitions into a name-to-hash map.
///
/// Definitions without a string `name` field are skipped; the registry
/// rejects those before they get here.
#[must_use]
pub fn hash_definitions(definitions: &[Value]) -> CommandHashes {
    definitions
        .iter()
        .filter_map(|definition| {
            let name = definition.get("name")?.as_str()?;
            Some((name.to_owned(), definition_hash(definition)))
        })
        .collect()
}

/// Diffs the current command hashes against the previous deployment's.
#[must_use]
pub fn diff(current: &CommandHashes, previous: &CommandHashes) -> CommandDiff {
    let mut out = CommandDiff::default();

    for (name, hash) in current {
        match previous.get(name) {
            None => out.added.push(name.clone()),
            Some(prev) if prev != hash => out.updated.push(name.clone()),
            Some(_) => {}
        }
    }
    for name in previous.keys() {
        if !current.contains_key(name) {
            out.removed.push(name.clone());
        }
    }

    // BTreeMap iteration already yields sorted names per bucket.
    out
}
