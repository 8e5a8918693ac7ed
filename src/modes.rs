use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{error, info, warn};

use crate::config::ConverterConfig;
use crate::converter::{ConversionResult, check_source};
use crate::error::{ConvertError, WatchError};
use crate::file_kind::PSD_EXTENSION;
use crate::locator::Locator;
use crate::output::RunSummary;
use crate::pipeline::Pipeline;
use crate::watcher::Watcher;
use crate::watcher::settle::{SettlePolicy, Settled, wait_until_stable};

/// Mode 1: convert every PSD found in `dir`, sequentially.
pub fn batch(config: &ConverterConfig, dir: &Path, recursive: bool) -> anyhow::Result<RunSummary> {
    info!("searching {} for PSD files", dir.display());
    let sources = Locator::new(config)
        .recursive(recursive)
        .find(dir, PSD_EXTENSION)
        .with_context(|| format!("scanning {}", dir.display()))?;

    let pipeline = Pipeline::new(&config.upload_dir);
    let mut summary = RunSummary::new(config.upload_dir.clone());

    if sources.is_empty() {
        warn!("no PSD files found in {}", dir.display());
        return Ok(summary);
    }

    for source in &sources {
        info!("processing {} file {}", source.kind.display_name(), source.file_name());
        summary.record(&pipeline.process(&source.path));
    }

    Ok(summary)
}

/// Mode 3: convert one explicitly named file.
///
/// A missing file or a non-PSD is reported as a failed conversion; nothing is
/// copied in that case.
pub fn single(config: &ConverterConfig, file: &Path) -> RunSummary {
    let pipeline = Pipeline::new(&config.upload_dir);
    let mut summary = RunSummary::new(config.upload_dir.clone());

    let result = convert_named(&pipeline, file);
    if result.is_success() {
        info!("PNG file: {}", result.dest.display());
    }
    summary.record(&result);
    summary
}

fn convert_named(pipeline: &Pipeline, file: &Path) -> ConversionResult {
    match check_source(file) {
        Ok(()) => {
            info!("converting {}", file.display());
            pipeline.process(file)
        }
        Err(err) => rejected(pipeline, file, err),
    }
}

fn rejected(pipeline: &Pipeline, file: &Path, err: ConvertError) -> ConversionResult {
    error!("{err}");
    ConversionResult {
        source: file.to_path_buf(),
        dest: pipeline.png_path_for(file),
        outcome: Err(err),
    }
}

/// Mode 2: watch `dir` and convert each PSD as it is created or modified.
///
/// Each detection waits for the file to settle, then copies and converts it
/// inline on the watching thread. Returns when the directory disappears;
/// subscription failures and interrupts are errors.
pub fn monitor(config: &ConverterConfig, dir: &Path) -> anyhow::Result<RunSummary> {
    let watcher = Watcher::new(dir, PSD_EXTENSION)?;
    info!(
        "monitoring {}; new PSD files are converted automatically",
        watcher.dir().display()
    );

    let pipeline = Pipeline::new(&config.upload_dir);
    let policy = SettlePolicy {
        delay: config.settle_delay(),
        poll: config.settle_poll(),
        max_polls: config.settle_max_polls,
    };
    let mut summary = RunSummary::new(config.upload_dir.clone());

    let outcome = watcher.run(|path| {
        let result = match wait_until_stable(path, &policy) {
            Settled::Gone => rejected(&pipeline, path, ConvertError::NotFound(path.to_path_buf())),
            Settled::Stable(_) | Settled::StillChanging(_) => pipeline.process(path),
        };
        summary.record(&result);
    });

    match outcome {
        Ok(()) => Ok(summary),
        Err(err @ WatchError::Interrupted) => Err(err).context("monitor stopped"),
        Err(err) => Err(err.into()),
    }
}

/// A mode picked from the interactive menu, with the path the user entered.
#[derive(Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Batch(PathBuf),
    Watch(PathBuf),
    Convert(PathBuf),
}

/// Show the three-mode menu on `out` and read the choice and path from `input`.
///
/// Returns `None` (after printing why) on an invalid choice or an empty path.
pub fn prompt_menu<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> std::io::Result<Option<MenuChoice>> {
    writeln!(out)?;
    writeln!(out, "Select a mode:")?;
    writeln!(out, "1. Convert all PSD files in a folder")?;
    writeln!(out, "2. Watch a folder and convert new PSD files")?;
    writeln!(out, "3. Convert a single file")?;
    write!(out, "Choice (1-3): ")?;
    out.flush()?;

    let choice = read_trimmed(input)?;
    let prompt = match choice.as_str() {
        "1" => "Folder containing PSD files: ",
        "2" => "Folder to watch: ",
        "3" => "Full path of the PSD file: ",
        _ => {
            writeln!(out, "Invalid choice; enter 1, 2 or 3.")?;
            return Ok(None);
        }
    };

    write!(out, "\n{prompt}")?;
    out.flush()?;
    let path = read_trimmed(input)?;
    if path.is_empty() {
        writeln!(out, "No path entered.")?;
        return Ok(None);
    }

    let path = PathBuf::from(path);
    Ok(Some(match choice.as_str() {
        "1" => MenuChoice::Batch(path),
        "2" => MenuChoice::Watch(path),
        _ => MenuChoice::Convert(path),
    }))
}

fn read_trimmed<R: BufRead>(input: &mut R) -> std::io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
