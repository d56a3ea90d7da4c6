//! Administrative dump of reconciled pilot templates
//!
//! Offline tooling, not part of the reconciliation contract: runs the tree
//! stage against a private copy of every known template and records what
//! changed. The stored templates are never mutated.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::{AbilityId, Result};
use crate::pilot::PilotDef;
use crate::reconcile::Reconciler;

#[derive(Debug, Serialize)]
struct DumpRecord {
    abilities: Vec<AbilityId>,
}

/// Write one sorted-ability JSON record per template the tree stage changed
///
/// Records land at `<out_dir>/<pilot id>.json`. Returns how many were
/// written.
pub fn dump_reconciled_templates(reconciler: &Reconciler, out_dir: &Path) -> Result<usize> {
    fs::create_dir_all(out_dir)?;
    tracing::info!("dumping reconciled pilot templates to {}", out_dir.display());

    let templates = reconciler.templates();
    let mut written = 0;

    for id in templates.ids() {
        let Some(template) = templates.get(id) else {
            continue;
        };

        let mut copy = PilotDef::clone(template);
        if !reconciler.reconcile_def(&mut copy) {
            continue;
        }

        copy.abilities.sort();
        let record = DumpRecord {
            abilities: copy.abilities,
        };

        let path = out_dir.join(format!("{id}.json"));
        let file = fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, &record)?;
        written += 1;
    }

    tracing::info!("wrote {written} reconciled pilot records");
    Ok(written)
}
