//! Module identity.

use serde::{Deserialize, Serialize};

/// Identifier for an independently loadable feature module.
///
/// A module owns commands, component bindings, event listeners and a
/// lifecycle. Everything a module registers is tagged with its
/// [`ModuleId`] so that unloading the module can remove every trace of
/// it from the routing tables.
///
/// Module names are plain strings ("shop", "moderation", ...). Two
/// `ModuleId`s compare equal when their names are equal; loading the
/// same module twice produces the same identity, which is what lets a
/// reloaded module re-register after [`dispose_all`] cleared its
/// predecessor's bindings.
///
/// [`dispose_all`]: https://docs.rs/swb-registry
///
/// # Example
///
/// ```
/// use swb_types::ModuleId;
///
/// let shop = ModuleId::new("shop");
/// assert_eq!(shop.as_str(), "shop");
/// assert_eq!(shop, ModuleId::new("shop"));
/// assert_ne!(shop, ModuleId::new("levels"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates a module identifier from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the module name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ModuleId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_by_name() {
        assert_eq!(ModuleId::new("shop"), ModuleId::from("shop"));
        assert_ne!(ModuleId::new("shop"), ModuleId::new("bank"));
    }

    #[test]
    fn display_is_name() {
        assert_eq!(ModuleId::new("shop").to_string(), "shop");
    }

    #[test]
    fn serde_transparent() {
        let id = ModuleId::new("shop");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""shop""#);
        let back: ModuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
