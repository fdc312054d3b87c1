//! `fileledger roots`: what this host lets an inventory start from.

use crate::cli::error::HelpfulError;
use crate::cli::output::{print_json, print_table};
use fileledger::{HostProbe, SystemProbe};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug)]
pub struct RootsArgs {
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RootsReport {
    raw_volume_access: bool,
    roots: Vec<PathBuf>,
}

pub fn run(args: RootsArgs) -> anyhow::Result<()> {
    let probe = SystemProbe;
    let report = RootsReport {
        raw_volume_access: probe.has_raw_volume_access(),
        roots: probe.enumerable_roots().map_err(HelpfulError::from)?,
    };

    if args.json {
        return print_json(&report);
    }

    let rows = report
        .roots
        .iter()
        .map(|root| vec![root.display().to_string()])
        .collect();
    print_table(&["ROOT"], rows);
    println!(
        "Raw volume access: {}",
        if report.raw_volume_access { "yes" } else { "no" }
    );
    Ok(())
}
