//! Core types and error handling

pub mod error;
pub mod types;

pub use error::{LoadoutError, Result};
pub use types::{AbilityId, Controller, Faction, PilotId, SkillTrack};
