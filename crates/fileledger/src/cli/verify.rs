//! `fileledger verify`: recompute a store's signature.

use crate::cli::error::HelpfulError;
use crate::cli::output::{format_count, print_json};
use fileledger::inventory::verify;
use fileledger::InventoryError;
use std::path::PathBuf;

#[derive(Debug)]
pub struct VerifyArgs {
    pub store: PathBuf,
    pub json: bool,
}

/// Fails with a [`HelpfulError`] on mismatch so the process exits non-zero.
pub fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let report = verify(&args.store).map_err(|err| match err {
        InventoryError::Db(fileledger_db::DbError::NotFound(_)) => {
            HelpfulError::store_not_found(&args.store)
        }
        other => HelpfulError::from(other),
    })?;

    if args.json {
        print_json(&report)?;
    } else {
        println!("Store:      {}", report.store_path.display());
        println!("Records:    {}", format_count(report.records));
        println!("Recorded:   {}", report.expected);
        println!("Recomputed: {}", report.actual);
        println!("Status:     {}", if report.matches { "OK" } else { "MISMATCH" });
    }

    if report.matches {
        Ok(())
    } else {
        Err(HelpfulError::signature_mismatch(&args.store, &report.expected, &report.actual).into())
    }
}
