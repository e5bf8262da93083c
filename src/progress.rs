//! Scan progress: what the user sees while tags are read and titles grouped.
//!
//! A [`Reporter`] is carried by each scan's `ScanControl`. It either draws
//! bars on stderr, or (log-only) keeps them hidden and writes a `tracing`
//! line every [`LOG_EVERY`] anchors so output stays readable under `tail -f`.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;
use tracing::info;

/// Anchors between two progress lines in log-only mode
pub const LOG_EVERY: u64 = 250;

const GROUPING_TEMPLATE: &str = "{prefix:>9} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} titles";
const READING_TEMPLATE: &str = "{prefix:>9} {spinner:.green} {pos} files";

/// How one scan reports progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reporter {
    log_only: bool,
}

impl Reporter {
    pub fn new(log_only: bool) -> Self {
        Self { log_only }
    }

    pub fn is_log_only(&self) -> bool {
        self.log_only
    }

    /// Bar over the anchors of one grouping pass.
    pub fn grouping_bar(&self, anchors: u64) -> ProgressBar {
        let pb = ProgressBar::new(anchors);
        self.apply(&pb, ProgressStyle::with_template(GROUPING_TEMPLATE).ok());
        pb.set_prefix("Grouping");
        pb
    }

    /// Spinner counting the files looked at while reading a folder.
    pub fn reading_spinner(&self) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        self.apply(&pb, ProgressStyle::with_template(READING_TEMPLATE).ok());
        if !self.log_only {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        pb.set_prefix("Reading");
        pb
    }

    fn apply(&self, pb: &ProgressBar, style: Option<ProgressStyle>) {
        if self.log_only {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        } else if let Some(style) = style {
            pb.set_style(style);
        }
    }

    /// Report that `done` of `total` anchors have been processed.
    pub fn anchors_done(&self, done: u64, total: u64) {
        if self.log_only && is_log_step(done, total) {
            info!(done, total, "Grouping {:.1}%", 100.0 * done as f64 / total as f64);
        }
    }
}

fn is_log_step(done: u64, total: u64) -> bool {
    total > 0 && (done == total || (done > 0 && done % LOG_EVERY == 0))
}

/// Short wall-clock rendering for the end-of-scan summary.
pub fn format_elapsed(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let secs = d.as_secs();
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}
