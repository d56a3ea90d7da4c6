//! Load progression tables from TOML files

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::core::{AbilityId, Result};
use crate::progression::ProgressionTable;

/// On-disk shape: one array of tier arrays per track
///
/// ```toml
/// gunnery = [["AbilityDefGu1"], ["AbilityDefGu2a", "AbilityDefGu2b"]]
/// piloting = [["AbilityDefP1"]]
/// guts = []
/// tactics = [["AbilityDefT1"]]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProgressionFile {
    gunnery: Vec<Vec<AbilityId>>,
    piloting: Vec<Vec<AbilityId>>,
    guts: Vec<Vec<AbilityId>>,
    tactics: Vec<Vec<AbilityId>>,
}

pub fn parse_progression(content: &str) -> Result<ProgressionTable> {
    let file: ProgressionFile = toml::from_str(content)?;
    Ok(ProgressionTable::new(
        file.gunnery,
        file.piloting,
        file.guts,
        file.tactics,
    ))
}

pub fn load_progression(path: &Path) -> Result<ProgressionTable> {
    let content = fs::read_to_string(path)?;
    parse_progression(&content)
}
