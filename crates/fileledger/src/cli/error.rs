//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use fileledger::InventoryError;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Root or sub-path does not exist
    pub fn path_not_found(path: &str) -> Self {
        Self::new(format!("Root not found: {}", path))
            .with_context("The inventory root must be an existing directory")
            .with_suggestions([
                format!("TRY: Check that the path exists: ls -la {}", path),
                "TRY: List the roots this host exposes: fileledger roots".to_string(),
            ])
    }

    /// Raw volume access was required but not granted
    pub fn privilege_required(reason: &str) -> Self {
        Self::new("Insufficient privileges")
            .with_context(reason.to_string())
            .with_suggestions([
                "TRY: Rerun from an elevated shell (Administrator on Windows, root elsewhere)",
                "TRY: Drop --require-elevated to inventory only what this user can read",
            ])
    }

    /// Store file given to `verify` is missing
    pub fn store_not_found(path: &Path) -> Self {
        Self::new(format!("Store not found: {}", path.display()))
            .with_context("verify needs the .sqlite file written by a completed run")
            .with_suggestion(format!(
                "TRY: Look for stores in the output directory: ls {}",
                path.parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| ".".to_string())
            ))
    }

    /// Recomputed signature differs from the recorded one
    pub fn signature_mismatch(path: &Path, expected: &str, actual: &str) -> Self {
        Self::new(format!("Signature mismatch: {}", path.display()))
            .with_context(format!("recorded {}, recomputed {}", expected, actual))
            .with_suggestion("TRY: Treat this store as modified since the run sealed it")
    }

    /// Configuration file or flags are unusable
    pub fn invalid_config(details: &str) -> Self {
        Self::new(format!("Invalid configuration: {}", details)).with_suggestions([
            "TRY: --workers and --batch-size must be at least 1",
            "TRY: Check the TOML passed with --config",
        ])
    }
}

impl From<InventoryError> for HelpfulError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::RootNotFound(path) => Self::path_not_found(&path),
            InventoryError::Privilege(reason) => Self::privilege_required(&reason),
            InventoryError::Config(details) => Self::invalid_config(&details),
            InventoryError::Db(fileledger_db::DbError::AlreadyExists(msg)) => Self::new(msg)
                .with_context("Each run writes a new store named after its start second")
                .with_suggestion("TRY: Wait a second and rerun, or pick another --output-dir"),
            other => Self::new(other.to_string()),
        }
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

#[derive(Serialize)]
struct JsonError<'a> {
    error: String,
    context: Option<&'a str>,
    suggestions: &'a [String],
}

/// Print an error as a single JSON object on stdout.
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => JsonError {
            error: helpful.message.clone(),
            context: helpful.context.as_deref(),
            suggestions: &helpful.suggestions,
        },
        None => JsonError {
            error: format!("{:#}", err),
            context: None,
            suggestions: &[],
        },
    };
    match serde_json::to_string_pretty(&payload) {
        Ok(json) => println!("{}", json),
        Err(_) => eprintln!("{:?}", err),
    }
}
