//! Primary-ability budget gate
//!
//! A pilot has 3 primary trait slots, and at most 2 of them may hold
//! first-level abilities. The gate only refuses new additions; it never
//! repairs a loadout that already violates the budget.

use crate::catalog::AbilityCatalog;
use crate::core::AbilityId;

/// Primary trait slots per pilot
pub const MAX_PRIMARY_ABILITIES: usize = 3;
/// Of those, how many may be first-level abilities
pub const MAX_FIRST_LEVEL_ABILITIES: usize = 2;

/// Held abilities the catalog flags as primary
pub fn primary_abilities<'a>(
    catalog: &dyn AbilityCatalog,
    held: &'a [AbilityId],
) -> Vec<&'a AbilityId> {
    held.iter()
        .filter(|id| catalog.get(id).is_some_and(|def| def.is_primary))
        .collect()
}

/// Whether a pilot holding `held` may learn `candidate`
pub fn can_learn(catalog: &dyn AbilityCatalog, held: &[AbilityId], candidate: &AbilityId) -> bool {
    let Some(def) = catalog.get(candidate) else {
        tracing::warn!("cannot find ability '{candidate}'");
        return false;
    };

    // non-primary abilities never consume a slot
    if !def.is_primary {
        return true;
    }

    let primaries = primary_abilities(catalog, held);
    if primaries.len() >= MAX_PRIMARY_ABILITIES {
        return false;
    }

    let first_level = primaries
        .iter()
        .filter(|id| catalog.get(id).is_some_and(|def| def.is_first_level()))
        .count();
    first_level < MAX_FIRST_LEVEL_ABILITIES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AbilityDef, StaticCatalog};

    fn catalog() -> StaticCatalog {
        StaticCatalog::from_defs(vec![
            AbilityDef::new("FirstA", true, 4),
            AbilityDef::new("FirstB", true, 4),
            AbilityDef::new("FirstC", true, 5),
            AbilityDef::new("HighA", true, 8),
            AbilityDef::new("HighB", true, 9),
            AbilityDef::new("PassiveA", false, 4),
        ])
    }

    fn held(ids: &[&str]) -> Vec<AbilityId> {
        ids.iter().map(|id| AbilityId::new(*id)).collect()
    }

    #[test]
    fn test_unknown_ability_is_refused() {
        let catalog = catalog();
        assert!(!can_learn(&catalog, &[], &"Missing".into()));
    }

    #[test]
    fn test_non_primary_always_learnable() {
        let catalog = catalog();
        let full = held(&["FirstA", "FirstB", "HighA"]);
        assert!(can_learn(&catalog, &full, &"PassiveA".into()));
    }

    #[test]
    fn test_primary_slot_budget() {
        let catalog = catalog();
        let two = held(&["FirstA", "HighA"]);
        assert!(can_learn(&catalog, &two, &"HighB".into()));

        let three = held(&["FirstA", "HighA", "HighB"]);
        assert!(!can_learn(&catalog, &three, &"FirstB".into()));
    }

    #[test]
    fn test_first_level_budget() {
        let catalog = catalog();
        let two_first = held(&["FirstA", "FirstB"]);
        assert!(!can_learn(&catalog, &two_first, &"FirstC".into()));
        // high-tier primaries still fit in the remaining slot
        assert!(can_learn(&catalog, &two_first, &"HighA".into()));
    }

    #[test]
    fn test_unknown_held_entries_do_not_count() {
        let catalog = catalog();
        let noisy = held(&["FirstA", "Missing1", "Missing2", "Missing3"]);
        assert_eq!(primary_abilities(&catalog, &noisy).len(), 1);
        assert!(can_learn(&catalog, &noisy, &"FirstB".into()));
    }
}
