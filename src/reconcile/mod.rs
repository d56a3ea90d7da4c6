//! Ability reconciliation
//!
//! Computes and applies the delta between a pilot's held abilities and what
//! the progression tables, tag grants, faction grants, and AI substitutions
//! say they should hold. Stages run in a fixed order; later stages observe
//! the results of earlier ones. Nothing here returns an error: unknown ids
//! are skipped and logged, and reconciliation always runs to completion.

pub mod eligibility;

use std::sync::Arc;

use crate::catalog::AbilityCatalog;
use crate::core::{AbilityId, Controller, Faction, SkillTrack};
use crate::events::{LifecycleEvent, LifecycleListener};
use crate::pilot::{Pilot, PilotDef, TemplateStore};
use crate::policy::Policy;
use crate::progression::ProgressionTable;

pub use eligibility::{can_learn, primary_abilities, MAX_FIRST_LEVEL_ABILITIES, MAX_PRIMARY_ABILITIES};

/// Read-only reconciliation context, constructed once at startup
pub struct Reconciler {
    catalog: Arc<dyn AbilityCatalog>,
    progression: Arc<ProgressionTable>,
    policy: Arc<Policy>,
    templates: Arc<TemplateStore>,
}

impl Reconciler {
    pub fn new(
        catalog: Arc<dyn AbilityCatalog>,
        progression: Arc<ProgressionTable>,
        policy: Arc<Policy>,
        templates: Arc<TemplateStore>,
    ) -> Self {
        Self {
            catalog,
            progression,
            policy,
            templates,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Run every reconciliation stage against a live pilot
    ///
    /// Returns whether anything changed. A change detaches the pilot from
    /// any shared template def first and clears the resolved-ability cache
    /// afterwards so the host rebuilds it on next access.
    pub fn reconcile(&self, pilot: &mut Pilot) -> bool {
        if self.policy.ignores_pilot(&pilot.def().tags) {
            return false;
        }

        let team = pilot.team.clone();
        let def = pilot.detach_def(&self.templates);

        let mut changed = self.update_from_tree(def);
        changed |= self.update_from_tags(def);

        if let Some(team) = team {
            if let Some(faction) = &team.faction {
                changed |= self.update_from_faction(def, faction);
            }
            if team.controller == Controller::Computer {
                changed |= self.swap_ai_abilities(def);
            }
        }

        if changed {
            pilot.clear_resolved();
        }
        changed
    }

    /// Tree reconciliation alone, against an owned def
    ///
    /// This is what the administrative dump runs on private template copies.
    pub fn reconcile_def(&self, def: &mut PilotDef) -> bool {
        self.update_from_tree(def)
    }

    fn update_from_tree(&self, def: &mut PilotDef) -> bool {
        let mut matching: Vec<AbilityId> = Vec::new();
        let mut missing: Vec<AbilityId> = Vec::new();

        // lowest tier first, then table order, then track order, so scarce
        // primary slots go to lower-tier abilities
        for track in SkillTrack::ALL {
            let rank = def.skills.rank(track) as usize;
            for tier in self.progression.tiers(track).iter().take(rank) {
                for id in tier {
                    if def.abilities.contains(id) {
                        matching.push(id.clone());
                    } else {
                        missing.push(id.clone());
                    }
                }
            }
        }

        let mut changed = false;

        // a pre-existing budget violation is reported, never repaired
        if primary_abilities(&*self.catalog, &def.abilities).len() > MAX_PRIMARY_ABILITIES {
            tracing::warn!(
                "{}: has more than {} primary abilities -- not doing anything about it",
                def.id,
                MAX_PRIMARY_ABILITIES
            );
        }

        // held but not expected at current ranks
        let mut extras: Vec<AbilityId> = Vec::new();
        for id in &def.abilities {
            if !matching.contains(id) && !extras.contains(id) {
                extras.push(id.clone());
            }
        }

        // drop extras that are off-tree (when enabled) or unknown entirely
        for id in &extras {
            if self.policy.ignores_ability(id) {
                continue;
            }
            let off_tree =
                self.policy.remove_non_tree_abilities && !self.progression.contains(id);
            if off_tree || !self.catalog.contains(id) {
                tracing::debug!("{}: removing '{}'", def.id, id);
                def.abilities.retain(|held| held != id);
                changed = true;
            }
        }

        // grant what the tree says is missing, through the eligibility gate
        for id in &missing {
            if self.policy.ignores_ability(id) {
                continue;
            }
            if self.policy.add_tree_abilities && can_learn(&*self.catalog, &def.abilities, id) {
                tracing::debug!("{}: adding '{}' from tree", def.id, id);
                def.abilities.push(id.clone());
                changed = true;
            }
        }

        if self.policy.remove_duplicate_abilities {
            changed |= self.remove_duplicates(def);
        }

        changed
    }

    fn remove_duplicates(&self, def: &mut PilotDef) -> bool {
        let mut duplicates: Vec<AbilityId> = Vec::new();
        for (i, id) in def.abilities.iter().enumerate() {
            if def.abilities[..i].contains(id) && !duplicates.contains(id) {
                duplicates.push(id.clone());
            }
        }

        let mut changed = false;
        for id in &duplicates {
            if self.policy.ignores_ability(id) {
                continue;
            }
            tracing::debug!("{}: removing duplicate '{}' entries", def.id, id);
            def.abilities.retain(|held| held != id);
            def.abilities.push(id.clone());
            changed = true;
        }
        changed
    }

    /// Tag grants are add-only; nothing granted here is ever revoked
    fn update_from_tags(&self, def: &mut PilotDef) -> bool {
        let mut changed = false;

        for tag in &def.tags {
            let Some(granted) = self.policy.tag_abilities.get(tag) else {
                continue;
            };
            for id in granted {
                if !self.catalog.contains(id) {
                    tracing::warn!("tried to add {id} from tag {tag}, but ability not found");
                    continue;
                }
                if !def.abilities.contains(id) {
                    tracing::debug!("{}: adding '{}' from tag '{}'", def.id, id, tag);
                    def.abilities.push(id.clone());
                    changed = true;
                }
            }
        }

        changed
    }

    /// Faction grants mirror tag grants: add-only, unknown ids skipped
    fn update_from_faction(&self, def: &mut PilotDef, faction: &Faction) -> bool {
        let Some(granted) = self.policy.faction_abilities.get(faction.as_str()) else {
            return false;
        };

        let mut changed = false;
        for id in granted {
            if !self.catalog.contains(id) {
                tracing::warn!("tried to add {id} from faction {faction}, but ability not found");
                continue;
            }
            if !def.abilities.contains(id) {
                tracing::debug!("{}: adding '{}' from faction '{}'", def.id, id, faction);
                def.abilities.push(id.clone());
                changed = true;
            }
        }
        changed
    }

    /// Substitute abilities for computer-controlled pilots
    ///
    /// Every swap key is evaluated against the pre-swap list, then all
    /// removals and all additions apply as one batch, so a replacement is
    /// never itself re-examined as a fresh swap key in the same pass.
    fn swap_ai_abilities(&self, def: &mut PilotDef) -> bool {
        let mut removals: Vec<AbilityId> = Vec::new();
        let mut additions: Vec<AbilityId> = Vec::new();

        for id in &def.abilities {
            let Some(replacement) = self.policy.swap_ai_abilities.get(id) else {
                continue;
            };
            if !self.catalog.contains(replacement) {
                tracing::warn!("tried to swap {replacement} for {id} for AI, but ability not found");
                continue;
            }
            if def.abilities.contains(replacement) {
                continue;
            }
            tracing::debug!("{}: swapping '{}' for '{}' for AI", def.id, replacement, id);
            removals.push(id.clone());
            additions.push(replacement.clone());
        }

        let changed = !removals.is_empty() || !additions.is_empty();

        for id in &removals {
            if let Some(pos) = def.abilities.iter().position(|held| held == id) {
                def.abilities.remove(pos);
            }
        }
        def.abilities.extend(additions);

        changed
    }
}

impl LifecycleListener for Reconciler {
    fn on_event(&self, _event: LifecycleEvent, pilot: &mut Pilot) {
        self.reconcile(pilot);
    }
}
