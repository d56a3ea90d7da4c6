//! Ability definitions and the read-only ability catalog
//!
//! The catalog is owned by the host's data layer; the reconciler only ever
//! reads it. `StaticCatalog` is the in-memory implementation used by the CLI
//! and by tests.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::{AbilityId, Result};

/// Skill rank below which a primary ability counts as first-level
pub const FIRST_LEVEL_SKILL_CAP: u32 = 8;

/// Read-only description of one ability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityDef {
    pub id: AbilityId,
    /// Consumes one of a pilot's scarce primary trait slots
    #[serde(default)]
    pub is_primary: bool,
    /// Minimum skill rank at which the ability unlocks
    #[serde(default)]
    pub required_skill: u32,
}

impl AbilityDef {
    pub fn new(id: impl Into<AbilityId>, is_primary: bool, required_skill: u32) -> Self {
        Self {
            id: id.into(),
            is_primary,
            required_skill,
        }
    }

    /// An early-tier primary: counts against the tighter first-level budget
    pub fn is_first_level(&self) -> bool {
        self.is_primary && self.required_skill < FIRST_LEVEL_SKILL_CAP
    }
}

/// Read-only lookup into the host's ability definitions
pub trait AbilityCatalog {
    fn get(&self, id: &AbilityId) -> Option<&AbilityDef>;

    fn contains(&self, id: &AbilityId) -> bool {
        self.get(id).is_some()
    }
}

/// In-memory ability catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    defs: AHashMap<AbilityId, AbilityDef>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defs(defs: impl IntoIterator<Item = AbilityDef>) -> Self {
        let mut catalog = Self::new();
        for def in defs {
            catalog.insert(def);
        }
        catalog
    }

    pub fn insert(&mut self, def: AbilityDef) {
        self.defs.insert(def.id.clone(), def);
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Load every `*.json` ability definition file from a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut catalog = Self::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let def: AbilityDef = serde_json::from_str(&content)?;
            catalog.insert(def);
        }

        Ok(catalog)
    }
}

impl AbilityCatalog for StaticCatalog {
    fn get(&self, id: &AbilityId) -> Option<&AbilityDef> {
        self.defs.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_level_threshold() {
        let low = AbilityDef::new("AbilityDefGu3", true, 4);
        let high = AbilityDef::new("AbilityDefGu8", true, 8);
        let passive = AbilityDef::new("AbilityDefP2", false, 4);

        assert!(low.is_first_level());
        assert!(!high.is_first_level());
        assert!(!passive.is_first_level());
    }

    #[test]
    fn test_static_catalog_lookup() {
        let catalog = StaticCatalog::from_defs(vec![
            AbilityDef::new("AbilityDefGu3", true, 4),
            AbilityDef::new("AbilityDefP2", false, 4),
        ]);

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&"AbilityDefGu3".into()));
        assert!(!catalog.contains(&"AbilityDefMissing".into()));
        assert!(catalog.get(&"AbilityDefGu3".into()).unwrap().is_primary);
    }

    #[test]
    fn test_ability_def_json_shape() {
        let def: AbilityDef = serde_json::from_str(
            r#"{"id": "AbilityDefT5", "isPrimary": true, "requiredSkill": 5}"#,
        )
        .unwrap();
        assert_eq!(def.id.as_str(), "AbilityDefT5");
        assert!(def.is_primary);
        assert_eq!(def.required_skill, 5);
    }
}
