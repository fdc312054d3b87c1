//! `fileledger run`: inventory one root into a new signed store.

use crate::cli::error::HelpfulError;
use crate::cli::output::{format_count, format_duration, print_json, print_table};
use anyhow::Context;
use fileledger::{
    HostProbe, InventoryConfig, InventoryRun, ProgressReporter, RunSummary, SystemProbe,
};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Debug)]
pub struct RunArgs {
    pub root: Option<PathBuf>,
    pub sub_path: Option<PathBuf>,
    pub workers: Option<usize>,
    pub batch_size: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub require_elevated: bool,
    pub json: bool,
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// File config (or defaults) with command-line flags layered on top.
    fn resolve_config(&self) -> anyhow::Result<InventoryConfig> {
        let mut config = match &self.config {
            Some(path) => InventoryConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => InventoryConfig::default(),
        };
        if let Some(sub_path) = &self.sub_path {
            config.sub_path = Some(sub_path.clone());
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        config.require_elevated |= self.require_elevated;
        config
            .validate()
            .map_err(HelpfulError::from)?;
        Ok(config)
    }
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    let host = SystemProbe;
    let root = match &args.root {
        Some(root) => root.clone(),
        None => host
            .enumerable_roots()
            .map_err(HelpfulError::from)?
            .into_iter()
            .next()
            .ok_or_else(|| HelpfulError::new("This host exposes no enumerable roots"))?,
    };

    let interactive = !args.json && std::io::stderr().is_terminal();
    let progress = if interactive {
        ProgressReporter::with_bar()
    } else {
        ProgressReporter::hidden()
    };

    let summary = InventoryRun::new(&config, &host, &progress)
        .with_spinner(interactive)
        .execute(&root)
        .map_err(HelpfulError::from)?;
    progress.finish();

    if args.json {
        print_json(&summary)
    } else {
        print_summary(&summary);
        Ok(())
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Inventory complete");
    println!("  Root:       {}", summary.root.display());
    println!(
        "  Records:    {} ({} unreadable)",
        format_count(summary.records),
        format_count(summary.unreadable)
    );
    println!("  Workers:    {}", summary.workers);
    println!("  Elapsed:    {}", format_duration(summary.elapsed));
    println!("  Store:      {}", summary.store_path.display());
    println!("  Signature:  {}", summary.signature);

    if summary.reports.len() > 1 {
        println!();
        let rows = summary
            .reports
            .iter()
            .map(|r| {
                vec![
                    r.worker.to_string(),
                    r.range.to_string(),
                    format_count(r.processed),
                    format_count(r.unreadable),
                ]
            })
            .collect();
        print_table(&["WORKER", "IDS", "PROCESSED", "UNREADABLE"], rows);
    }
}
