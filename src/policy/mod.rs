//! Externally supplied reconciliation policy
//!
//! Parsed once from a human-editable JSON blob at startup and read-only
//! afterwards. A parse failure never aborts startup: the loader logs the
//! error and falls back to the all-defaults policy.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::AbilityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    /// Grant abilities the progression tree says the pilot should have
    pub add_tree_abilities: bool,
    /// Strip held abilities that appear nowhere in the progression tables
    pub remove_non_tree_abilities: bool,
    /// Collapse duplicate ability entries down to a single instance
    pub remove_duplicate_abilities: bool,
    /// Ability id prefixes exempt from every add/remove rule
    pub ignore_abilities: Vec<String>,
    /// Tag prefixes that exempt a whole pilot from reconciliation
    pub ignore_pilots_with_tags: Vec<String>,
    /// Abilities granted to every pilot on a team of the given faction
    pub faction_abilities: AHashMap<String, Vec<AbilityId>>,
    /// Abilities granted to every pilot carrying the given tag
    pub tag_abilities: AHashMap<String, Vec<AbilityId>>,
    /// Ability substitutions applied to computer-controlled pilots
    #[serde(rename = "swapAIAbilities")]
    pub swap_ai_abilities: AHashMap<AbilityId, AbilityId>,
    /// Arm the administrative reconciled-template dump
    pub dump_reconciled_pilots: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            add_tree_abilities: true,
            remove_non_tree_abilities: false,
            remove_duplicate_abilities: false,
            ignore_abilities: Vec::new(),
            ignore_pilots_with_tags: Vec::new(),
            faction_abilities: AHashMap::new(),
            tag_abilities: AHashMap::new(),
            swap_ai_abilities: AHashMap::new(),
            dump_reconciled_pilots: false,
        }
    }
}

impl Policy {
    /// Parse from JSON; a failure logs and yields the default policy
    pub fn parse(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(policy) => policy,
            Err(e) => {
                tracing::warn!("Reading policy failed, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Whether the ability is exempted by an ignore prefix
    pub fn ignores_ability(&self, id: &AbilityId) -> bool {
        self.ignore_abilities.iter().any(|p| id.has_prefix(p))
    }

    /// Whether any pilot tag prefix-matches an ignore-tags entry
    pub fn ignores_pilot(&self, tags: &[String]) -> bool {
        tags.iter()
            .any(|tag| self.ignore_pilots_with_tags.iter().any(|p| tag.starts_with(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = Policy::default();
        assert!(policy.add_tree_abilities);
        assert!(!policy.remove_non_tree_abilities);
        assert!(!policy.remove_duplicate_abilities);
        assert!(!policy.dump_reconciled_pilots);
        assert!(policy.tag_abilities.is_empty());
    }

    #[test]
    fn test_parse_full_policy() {
        let json = r#"{
            "addTreeAbilities": false,
            "removeNonTreeAbilities": true,
            "removeDuplicateAbilities": true,
            "ignoreAbilities": ["AbilityDefCustom"],
            "ignorePilotsWithTags": ["pilot_nonskill"],
            "factionAbilities": {"Liao": ["AbilityDefL1"]},
            "tagAbilities": {"pilot_officer": ["AbilityDefO1", "AbilityDefO2"]},
            "swapAIAbilities": {"AbilityDefGu8": "AbilityDefGu8AI"},
            "dumpReconciledPilots": true
        }"#;
        let policy = Policy::parse(json);

        assert!(!policy.add_tree_abilities);
        assert!(policy.remove_non_tree_abilities);
        assert!(policy.remove_duplicate_abilities);
        assert!(policy.dump_reconciled_pilots);
        assert_eq!(policy.tag_abilities.get("pilot_officer").unwrap().len(), 2);
        assert_eq!(
            policy.swap_ai_abilities.get(&AbilityId::new("AbilityDefGu8")),
            Some(&AbilityId::new("AbilityDefGu8AI"))
        );
    }

    #[test]
    fn test_parse_failure_falls_back_to_defaults() {
        let policy = Policy::parse("{ not json at all");
        assert!(policy.add_tree_abilities);
        assert!(policy.faction_abilities.is_empty());
    }

    #[test]
    fn test_partial_policy_keeps_other_defaults() {
        let policy = Policy::parse(r#"{"removeNonTreeAbilities": true}"#);
        assert!(policy.remove_non_tree_abilities);
        assert!(policy.add_tree_abilities);
    }

    #[test]
    fn test_ignore_prefix_matching() {
        let policy = Policy::parse(
            r#"{"ignoreAbilities": ["AbilityDefCustom"], "ignorePilotsWithTags": ["pilot_non"]}"#,
        );

        assert!(policy.ignores_ability(&"AbilityDefCustomX".into()));
        assert!(!policy.ignores_ability(&"AbilityDefGu5".into()));
        assert!(policy.ignores_pilot(&["pilot_nonskill".to_string()]));
        assert!(!policy.ignores_pilot(&["pilot_officer".to_string()]));
    }
}
