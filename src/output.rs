use std::path::PathBuf;

use serde::Serialize;

use crate::converter::ConversionResult;

/// Most failed sources kept by name; a long-running watch only counts the rest.
pub const MAX_LISTED_FAILURES: usize = 100;

/// Counters for one run of any conversion mode.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Where the PNG files were written.
    pub output_dir: PathBuf,
    /// The first `MAX_LISTED_FAILURES` sources whose conversion failed, in
    /// processing order.
    pub failures: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            ..Default::default()
        }
    }

    pub fn record(&mut self, result: &ConversionResult) {
        self.total += 1;
        if result.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
            if self.failures.len() < MAX_LISTED_FAILURES {
                self.failures.push(result.source.clone());
            }
        }
    }
}

/// Print the end-of-run summary.
///
/// - `json = true`: a pretty-printed JSON object on stdout.
/// - `json = false`: a short human-readable block on stdout.
pub fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        match serde_json::to_string_pretty(summary) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("error serialising summary: {}", e),
        }
        return;
    }

    println!("=== Conversion summary ===");
    println!("  total:     {}", summary.total);
    println!("  succeeded: {}", summary.succeeded);
    println!("  failed:    {}", summary.failed);
    println!("  saved to:  {}", summary.output_dir.display());
    for path in &summary.failures {
        println!("  ✗ {}", path.display());
    }
    let unlisted = summary.failed.saturating_sub(summary.failures.len());
    if unlisted > 0 {
        println!("  ✗ ... and {unlisted} more");
    }
}

const UNITS: &[char] = &['K', 'M', 'G', 'T', 'P', 'E'];

/// Human-readable byte count: plain bytes below 1024, otherwise base-1024
/// with two decimals (`2048` -> `"2.00 KB"`).
pub fn format_size(size: u64) -> String {
    if size < 1024 {
        return format!("{size} B");
    }

    let mut exp = 0usize;
    let mut scaled = size;
    while scaled >= 1024 && exp < UNITS.len() {
        scaled /= 1024;
        exp += 1;
    }
    let value = size as f64 / 1024f64.powi(exp as i32);
    format!("{:.2} {}B", value, UNITS[exp - 1])
}
