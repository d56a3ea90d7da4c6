//! Skill progression tables
//!
//! One ordered tier table per skill track. Each tier holds the abilities a
//! pilot is expected to have once their rank on that track reaches the tier.
//! Immutable after construction.

pub mod loader;

use ahash::AHashSet;

use crate::core::{AbilityId, SkillTrack};

pub use loader::{load_progression, parse_progression};

/// The four per-track tier tables plus a flattened membership set
#[derive(Debug, Clone)]
pub struct ProgressionTable {
    tracks: [Vec<Vec<AbilityId>>; 4],
    all: AHashSet<AbilityId>,
}

impl Default for ProgressionTable {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }
}

impl ProgressionTable {
    pub fn new(
        gunnery: Vec<Vec<AbilityId>>,
        piloting: Vec<Vec<AbilityId>>,
        guts: Vec<Vec<AbilityId>>,
        tactics: Vec<Vec<AbilityId>>,
    ) -> Self {
        let tracks = [gunnery, piloting, guts, tactics];
        let mut all = AHashSet::new();
        for track in &tracks {
            for tier in track {
                for id in tier {
                    all.insert(id.clone());
                }
            }
        }
        Self { tracks, all }
    }

    /// Ordered tiers for one track
    pub fn tiers(&self, track: SkillTrack) -> &[Vec<AbilityId>] {
        &self.tracks[track_index(track)]
    }

    /// Whether the ability appears anywhere in any track
    ///
    /// Abilities absent from every table are "off-tree" and are candidates
    /// for removal when the policy asks for it.
    pub fn contains(&self, id: &AbilityId) -> bool {
        self.all.contains(id)
    }

    /// Every ability referenced by any tier of any track
    pub fn flattened(&self) -> &AHashSet<AbilityId> {
        &self.all
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

fn track_index(track: SkillTrack) -> usize {
    match track {
        SkillTrack::Gunnery => 0,
        SkillTrack::Piloting => 1,
        SkillTrack::Guts => 2,
        SkillTrack::Tactics => 3,
    }
}
