//! Progress reporting shared by all enrichment workers.
//!
//! Workers receive a [`ProgressSink`] at construction instead of reaching for
//! a global. [`ProgressReporter`] counts with an atomic and optionally mirrors
//! the count onto an `indicatif` bar.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Sink for "total units" and "one more unit done" events.
///
/// Increments may arrive from any worker thread in any order.
pub trait ProgressSink: Send + Sync {
    fn set_total(&self, total: u64);
    fn inc(&self, delta: u64);
}

/// Atomic counter, optionally drawn as a progress bar.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    done: Arc<AtomicU64>,
    total: Arc<AtomicU64>,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Counter only, nothing drawn.
    pub fn hidden() -> Self {
        Self::default()
    }

    /// Counter drawn as a bar on stderr.
    pub fn with_bar() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        bar.set_style(
            ProgressStyle::with_template(
                "[+] Process Files {pos}/{len} [{elapsed_precise}] {wide_bar} {percent}%",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self {
            bar: Some(bar),
            ..Self::default()
        }
    }

    /// Units reported so far.
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Stop drawing and leave the final state on screen.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish();
        }
    }
}

impl ProgressSink for ProgressReporter {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        if let Some(bar) = &self.bar {
            bar.set_length(total);
        }
    }

    fn inc(&self, delta: u64) {
        self.done.fetch_add(delta, Ordering::Relaxed);
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }
}

/// Spinner shown while the tree is enumerated.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: &str, visible: bool) -> Self {
        if !visible {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    pub fn stop(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
