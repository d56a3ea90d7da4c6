//! Pilot state: definitions, teams, and the template store
//!
//! A `PilotDef` is the mutable ability-holding record. Live `Pilot`s may
//! alias a shared template def owned by the `TemplateStore`; anything that
//! mutates a pilot must first detach it onto a private copy. Templates are
//! never mutated through a pilot.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::{AbilityCatalog, AbilityDef};
use crate::core::{AbilityId, Controller, Faction, PilotId, Result, SkillTrack};

/// Per-track skill ranks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRanks {
    pub gunnery: u32,
    pub piloting: u32,
    pub guts: u32,
    pub tactics: u32,
}

impl SkillRanks {
    pub fn new(gunnery: u32, piloting: u32, guts: u32, tactics: u32) -> Self {
        Self {
            gunnery,
            piloting,
            guts,
            tactics,
        }
    }

    pub fn rank(&self, track: SkillTrack) -> u32 {
        match track {
            SkillTrack::Gunnery => self.gunnery,
            SkillTrack::Piloting => self.piloting,
            SkillTrack::Guts => self.guts,
            SkillTrack::Tactics => self.tactics,
        }
    }
}

/// The persistent pilot record: skills, tags, held abilities
///
/// The ability list is order-irrelevant and may transiently hold duplicates;
/// reconciliation collapses them when the policy asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotDef {
    pub id: PilotId,
    #[serde(default)]
    pub skills: SkillRanks,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
}

impl PilotDef {
    pub fn new(id: impl Into<PilotId>) -> Self {
        Self {
            id: id.into(),
            skills: SkillRanks::default(),
            tags: Vec::new(),
            abilities: Vec::new(),
        }
    }

    pub fn has_ability(&self, id: &AbilityId) -> bool {
        self.abilities.contains(id)
    }
}

/// Team context carried by lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub faction: Option<Faction>,
    pub controller: Controller,
}

impl Team {
    pub fn new(faction: Option<Faction>, controller: Controller) -> Self {
        Self {
            faction,
            controller,
        }
    }
}

/// A live pilot instance
///
/// Holds its def behind an `Arc` because freshly spawned pilots share the
/// template store's def object until something needs to mutate them.
#[derive(Debug, Clone)]
pub struct Pilot {
    def: Arc<PilotDef>,
    pub team: Option<Team>,
    resolved: Option<Vec<AbilityDef>>,
}

impl Pilot {
    pub fn new(def: Arc<PilotDef>) -> Self {
        Self {
            def,
            team: None,
            resolved: None,
        }
    }

    pub fn from_def(def: PilotDef) -> Self {
        Self::new(Arc::new(def))
    }

    pub fn id(&self) -> &PilotId {
        &self.def.id
    }

    pub fn def(&self) -> &PilotDef {
        &self.def
    }

    pub fn assign_team(&mut self, team: Team) {
        self.team = Some(team);
    }

    /// Detach from any shared template and return the private def for mutation
    ///
    /// If this pilot still aliases the template store's def object, the
    /// reference is first replaced with a private copy so the shared template
    /// is never written through.
    pub fn detach_def(&mut self, templates: &TemplateStore) -> &mut PilotDef {
        if let Some(template) = templates.get(self.id()) {
            if Arc::ptr_eq(&self.def, template) {
                tracing::debug!("{}: detaching from shared template def", self.def.id);
                self.def = Arc::new(PilotDef::clone(&self.def));
            }
        }
        Arc::make_mut(&mut self.def)
    }

    /// Resolved ability defs, rebuilt from the catalog on first access
    ///
    /// Ids unknown to the catalog are omitted from the resolved list.
    pub fn resolved_abilities(&mut self, catalog: &dyn AbilityCatalog) -> &[AbilityDef] {
        if self.resolved.is_none() {
            let defs = self
                .def
                .abilities
                .iter()
                .filter_map(|id| catalog.get(id).cloned())
                .collect();
            self.resolved = Some(defs);
        }
        self.resolved.as_deref().unwrap_or(&[])
    }

    /// Drop the cached resolved list; it regenerates on next access
    pub fn clear_resolved(&mut self) {
        self.resolved = None;
    }

    pub fn has_resolved_cache(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Catalog-owned pilot template defs, shared with live pilots
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: AHashMap<PilotId, Arc<PilotDef>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, def: PilotDef) {
        self.templates.insert(def.id.clone(), Arc::new(def));
    }

    pub fn get(&self, id: &PilotId) -> Option<&Arc<PilotDef>> {
        self.templates.get(id)
    }

    /// Spawn a live pilot aliasing the stored template def
    pub fn spawn(&self, id: &PilotId) -> Option<Pilot> {
        self.templates.get(id).map(|def| Pilot::new(Arc::clone(def)))
    }

    /// Template ids in sorted order
    pub fn ids(&self) -> Vec<&PilotId> {
        let mut ids: Vec<&PilotId> = self.templates.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Load every `*.json` pilot template file from a directory
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let def: PilotDef = serde_json::from_str(&content)?;
            store.insert(def);
        }

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    fn template_store_with(def: PilotDef) -> TemplateStore {
        let mut store = TemplateStore::new();
        store.insert(def);
        store
    }

    #[test]
    fn test_spawn_aliases_template() {
        let mut def = PilotDef::new("pilot_alpha");
        def.abilities.push("AbilityDefGu3".into());
        let store = template_store_with(def);

        let pilot = store.spawn(&"pilot_alpha".into()).unwrap();
        let template = store.get(&"pilot_alpha".into()).unwrap();
        assert!(Arc::ptr_eq(template, &pilot.def));
    }

    #[test]
    fn test_detach_leaves_template_untouched() {
        let store = template_store_with(PilotDef::new("pilot_alpha"));
        let mut pilot = store.spawn(&"pilot_alpha".into()).unwrap();

        pilot.detach_def(&store).abilities.push("AbilityDefGu3".into());

        let template = store.get(&"pilot_alpha".into()).unwrap();
        assert!(template.abilities.is_empty());
        assert!(pilot.def().has_ability(&"AbilityDefGu3".into()));
        assert!(!Arc::ptr_eq(template, &pilot.def));
    }

    #[test]
    fn test_detach_without_template_still_mutable() {
        let store = TemplateStore::new();
        let mut pilot = Pilot::from_def(PilotDef::new("pilot_loner"));

        pilot.detach_def(&store).abilities.push("AbilityDefP2".into());
        assert!(pilot.def().has_ability(&"AbilityDefP2".into()));
    }

    #[test]
    fn test_resolved_abilities_lazy_rebuild() {
        let catalog = StaticCatalog::from_defs(vec![AbilityDef::new("AbilityDefGu3", true, 4)]);
        let mut def = PilotDef::new("pilot_alpha");
        def.abilities.push("AbilityDefGu3".into());
        def.abilities.push("AbilityDefUnknown".into());
        let mut pilot = Pilot::from_def(def);

        assert!(!pilot.has_resolved_cache());
        assert_eq!(pilot.resolved_abilities(&catalog).len(), 1);
        assert!(pilot.has_resolved_cache());

        pilot.clear_resolved();
        assert!(!pilot.has_resolved_cache());
    }

    #[test]
    fn test_pilot_def_json_shape() {
        let def: PilotDef = serde_json::from_str(
            r#"{
                "id": "pilot_beta",
                "skills": {"gunnery": 5, "piloting": 3, "guts": 1, "tactics": 8},
                "tags": ["pilot_officer"],
                "abilities": ["AbilityDefGu3"]
            }"#,
        )
        .unwrap();

        assert_eq!(def.skills.rank(SkillTrack::Tactics), 8);
        assert_eq!(def.tags.len(), 1);
        assert!(def.has_ability(&"AbilityDefGu3".into()));
    }
}
