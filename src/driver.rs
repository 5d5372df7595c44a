//! Whole-tree run: discover files, generate them in parallel, write the
//! artifacts that changed and assemble the aggregate in path order.

use crate::config::{Config, FileRole};
use crate::generator::{generate, Aggregate, FileOutput, GenerateError};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file selected for generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the scanned root
    pub relative: PathBuf,
    pub role: FileRole,
}

impl SourceFile {
    /// Root-relative path with `/` separators, as used in includes.
    pub fn logical_path(&self) -> String {
        logical(&self.relative)
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    /// Artifacts whose contents changed, aggregate included
    pub written: usize,
    pub diagnostics: Vec<String>,
}

fn logical(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// The output directory relative to the root, when it is inside it.
fn output_subdir(config: &Config) -> Option<PathBuf> {
    if let Ok(relative) = config.out_dir.strip_prefix(&config.root) {
        return Some(relative.to_path_buf());
    }
    if config.out_dir.is_relative() && config.root == Path::new(".") {
        return Some(config.out_dir.clone());
    }
    None
}

/// Every processable file under `config.root`, in file-name order. The
/// output directory is skipped when it lives inside the root.
pub fn discover(config: &Config) -> Result<Vec<SourceFile>, GenerateError> {
    let skipped = output_subdir(config);
    let mut files = Vec::new();
    let walker = WalkDir::new(&config.root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let relative = entry.path().strip_prefix(&config.root).ok();
            skipped.is_none() || relative != skipped.as_deref()
        });
    for entry in walker {
        let entry = entry.map_err(|err| GenerateError::Io {
            path: err.path().map_or_else(|| config.root.clone(), Path::to_path_buf),
            source: err.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(role) = FileRole::of(entry.path()) else {
            continue;
        };
        let relative = entry
            .path()
            .strip_prefix(&config.root)
            .unwrap_or(entry.path())
            .to_path_buf();
        files.push(SourceFile { relative, role });
    }
    Ok(files)
}

/// Write `contents` to `path` unless it already holds exactly that.
/// Returns whether the file was written.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool, GenerateError> {
    let io_err = |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    };
    if fs::read_to_string(path).is_ok_and(|existing| existing == contents) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)?;
    Ok(true)
}

fn generate_file(file: &SourceFile, config: &Config) -> Result<FileOutput, GenerateError> {
    let path = config.root.join(&file.relative);
    let source = fs::read_to_string(&path).map_err(|source| GenerateError::Io {
        path: path.clone(),
        source,
    })?;
    let output = generate(&file.logical_path(), &source, file.role.mode(), config)
        .inspect_err(|err| tracing::warn!(%err, "generation failed"))?;
    tracing::info!(path = %file.logical_path(), "processed");
    Ok(output)
}

/// Generate every file under the root and write the artifacts.
///
/// Any file that fails to parse fails the run; nothing is written in that
/// case.
pub fn run(config: &Config) -> Result<RunSummary, GenerateError> {
    let files = discover(config)?;
    let outputs = files
        .par_iter()
        .map(|file| generate_file(file, config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut summary = RunSummary {
        files: files.len(),
        ..RunSummary::default()
    };
    let mut aggregate = Aggregate::new();
    for (file, output) in files.iter().zip(&outputs) {
        let artifact = config.output_path(&file.relative, file.role);
        if write_if_changed(&artifact, &output.generated)? {
            summary.written += 1;
        }
        let include = artifact
            .strip_prefix(&config.out_dir)
            .map_or_else(|_| logical(&artifact), logical);
        aggregate.add(output, &include);
        summary.diagnostics.extend(output.diagnostics.iter().cloned());
    }

    if write_if_changed(&config.aggregate, &aggregate.render())? {
        summary.written += 1;
    }
    tracing::info!(
        files = summary.files,
        written = summary.written,
        diagnostics = summary.diagnostics.len(),
        "run complete"
    );
    Ok(summary)
}
