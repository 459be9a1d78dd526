//! Runs injection over many files.
//!
//! Each file is an independent unit: its own document, id registry and
//! counters. A failure becomes that file's row in the [`BatchReport`] and
//! never stops the others.

use std::collections::HashSet;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tokio::task::JoinSet;

use crate::dictionary::TranslationDictionary;
use crate::dom::parse_bytes;
use crate::error::{SvgError, SvgResult};
use crate::inject::{InjectOutput, inject};
use crate::options::InjectOptions;
use crate::stats::{BatchReport, FileReport};

/// Read, parse and inject one SVG file. Nothing is written.
pub fn inject_file(
    path: &Path,
    dictionary: &TranslationDictionary,
    options: &InjectOptions,
) -> SvgResult<InjectOutput> {
    if !path.exists() {
        return Err(SvgError::DocumentNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| SvgError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Injecting translations into {}", path.display());
    let doc = parse_bytes(&bytes)?;
    inject(&doc, dictionary, options)
}

/// Persist a transformed document at `path`.
///
/// The XML goes to a temporary file in the destination directory which is
/// then renamed over `path`, so readers never observe a partial file.
pub fn write_output(output: &InjectOutput, path: &Path) -> SvgResult<()> {
    let write_failed = |reason: String| SvgError::WriteFailed {
        path: path.to_path_buf(),
        reason,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| write_failed(e.to_string()))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
    file.write_all(output.to_xml().as_bytes())
        .map_err(|e| write_failed(e.to_string()))?;
    file.persist(path)
        .map_err(|e| write_failed(e.error.to_string()))?;

    tracing::debug!("Saved modified SVG to {}", path.display());
    Ok(())
}

/// Inject one file and write it into `output_dir` under the same name.
///
/// Files with nothing inserted or updated are not written.
pub fn process_file(
    path: &Path,
    dictionary: &TranslationDictionary,
    options: &InjectOptions,
    output_dir: &Path,
) -> FileReport {
    let mut report = FileReport::default();

    let output = match inject_file(path, dictionary, options) {
        Ok(output) => output,
        Err(e) => {
            if e.is_structural() {
                tracing::warn!("{}: {}", path.display(), e);
            } else {
                tracing::error!("{}: {}", path.display(), e);
            }
            report.stats.nested_files_error = e.is_structural();
            report.error = Some(e.kind().to_string());
            report.message = Some(e.to_string());
            return report;
        }
    };

    report.stats = output.stats.clone();
    if !output.stats.has_changes() {
        tracing::debug!("{}: no changes, not writing", path.display());
        return report;
    }

    let target = output_dir.join(path.file_name().unwrap_or(path.as_os_str()));
    match write_output(&output, &target) {
        Ok(()) => report.output = Some(target),
        Err(e) => {
            tracing::error!("{}", e);
            report.error = Some(e.kind().to_string());
            report.message = Some(e.to_string());
        }
    }
    report
}

/// Add one file's row to the batch totals.
pub fn record(report: &mut BatchReport, name: String, file: FileReport) {
    match (&file.error, &file.output) {
        (Some(_), _) if file.stats.nested_files_error => report.nested_files += 1,
        (Some(_), _) => report.no_save += 1,
        (None, Some(_)) => report.saved_done += 1,
        (None, None) => report.no_changes += 1,
    }
    report.files.insert(name, file);
}

fn row_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Inject every file in `paths` concurrently on the blocking pool.
///
/// Output files land in `output_dir` under their original names. A path
/// listed twice is processed once. A second file whose name is already
/// taken by another path is not processed: it gets a `duplicate-name` row,
/// keyed by its full path, and counts as `no_save`.
pub async fn inject_files(
    paths: Vec<PathBuf>,
    dictionary: Arc<TranslationDictionary>,
    options: InjectOptions,
    output_dir: PathBuf,
) -> BatchReport {
    let output_dir = Arc::new(output_dir);
    let mut tasks = JoinSet::new();
    let mut report = BatchReport::default();
    let mut seen_paths = HashSet::new();
    let mut seen_names = HashSet::new();

    for path in paths {
        if !seen_paths.insert(path.clone()) {
            tracing::debug!("{} listed twice, processing once", path.display());
            continue;
        }
        let name = row_name(&path);
        if !seen_names.insert(name.clone()) {
            let e = SvgError::DuplicateName(path.clone());
            tracing::error!("{}", e);
            let file = FileReport {
                error: Some(e.kind().to_string()),
                message: Some(e.to_string()),
                ..Default::default()
            };
            record(&mut report, path.display().to_string(), file);
            continue;
        }

        let dictionary = Arc::clone(&dictionary);
        let output_dir = Arc::clone(&output_dir);
        tasks.spawn_blocking(move || {
            let file = process_file(&path, &dictionary, &options, &output_dir);
            (name, file)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, file)) => record(&mut report, name, file),
            Err(e) => {
                tracing::error!("Injection task failed: {}", e);
                report.no_save += 1;
            }
        }
    }

    tracing::info!(
        "All files: {} Saved {}, skipped {}, nested files: {}, no changes: {}",
        report.total(),
        report.saved_done,
        report.no_save,
        report.nested_files,
        report.no_changes
    );
    report
}
