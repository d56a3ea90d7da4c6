//! Pilot Loadout - Entry Point
//!
//! Headless administrative tool: loads the ability catalog, progression
//! tables, policy, and pilot templates from a data directory, then writes
//! the reconciled-template dump when the policy (or --dump) arms it.

use clap::Parser;
use pilot_loadout::catalog::StaticCatalog;
use pilot_loadout::core::error::Result;
use pilot_loadout::dump::dump_reconciled_templates;
use pilot_loadout::pilot::TemplateStore;
use pilot_loadout::policy::Policy;
use pilot_loadout::progression::load_progression;
use pilot_loadout::reconcile::Reconciler;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Reconcile pilot templates against progression and policy data
#[derive(Parser, Debug)]
#[command(name = "pilot-loadout")]
#[command(about = "Dump reconciled pilot ability loadouts from roster data")]
struct Args {
    /// Directory of ability definition JSON files
    #[arg(long, default_value = "data/abilities")]
    abilities: PathBuf,

    /// Progression tables TOML file
    #[arg(long, default_value = "data/progression.toml")]
    progression: PathBuf,

    /// Policy JSON file (unreadable or invalid falls back to defaults)
    #[arg(long, default_value = "data/policy.json")]
    policy: PathBuf,

    /// Directory of pilot template JSON files
    #[arg(long, default_value = "data/pilots")]
    pilots: PathBuf,

    /// Output directory for reconciled dump records
    #[arg(long, default_value = "pilot-dump")]
    out: PathBuf,

    /// Run the dump even when the policy leaves it disarmed
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("pilot_loadout=debug")
        .init();

    let args = Args::parse();

    let catalog = StaticCatalog::load_dir(&args.abilities)?;
    tracing::info!("loaded {} ability defs", catalog.len());

    let progression = load_progression(&args.progression)?;
    if progression.is_empty() {
        tracing::warn!("progression tables are empty; tree reconciliation will be a no-op");
    }

    let policy = match fs::read_to_string(&args.policy) {
        Ok(content) => Policy::parse(&content),
        Err(e) => {
            tracing::warn!("could not read policy file, using defaults: {e}");
            Policy::default()
        }
    };

    let templates = TemplateStore::load_dir(&args.pilots)?;
    tracing::info!("loaded {} pilot templates", templates.len());

    let run_dump = args.dump || policy.dump_reconciled_pilots;
    let reconciler = Reconciler::new(
        Arc::new(catalog),
        Arc::new(progression),
        Arc::new(policy),
        Arc::new(templates),
    );

    if run_dump {
        let written = dump_reconciled_templates(&reconciler, &args.out)?;
        println!(
            "wrote {} reconciled pilot records to {}",
            written,
            args.out.display()
        );
    } else {
        println!("dump disarmed; set dumpReconciledPilots in the policy or pass --dump");
    }

    Ok(())
}
