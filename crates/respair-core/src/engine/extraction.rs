use crate::core::io::arc::ArcFile;
use crate::core::models::pair::ResiduePair;
use crate::core::selection::ExtractionScript;
use crate::engine::config::PairEnergyConfig;
use crate::engine::error::EngineError;
use crate::engine::tool::ExternalTool;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, instrument, warn};

type DirSnapshot = HashMap<PathBuf, Option<SystemTime>>;

/// Runs the extraction tool for one pair and returns the normalized artifact path.
///
/// The tool writes its output next to the trajectory (or into the configured artifact
/// directory) under a name of its own choosing, so the artifact is recognised as the
/// newest file that appeared or changed during the run. It is then moved to
/// `<scratch_dir>/pair_<i>_<j>.arc` and its bond lists are stripped of padding zeros.
#[instrument(skip_all, name = "extract_pair", fields(pair = %pair))]
pub fn extract_pair(
    tool: &dyn ExternalTool,
    config: &PairEnergyConfig,
    script: &ExtractionScript,
    pair: ResiduePair,
) -> Result<PathBuf, EngineError> {
    let artifact_dir =
        artifact_dir_for(&script.trajectory, config.extraction.artifact_dir.as_deref());
    let before = snapshot(&artifact_dir)?;

    let program = &config.tools.archive_command;
    let output = tool.run(program, &script.to_string())?;
    output.warn_on_stderr(program);

    let excluded = excluded_paths(config, &script.trajectory);
    let produced = newest_new_file(&artifact_dir, &before, &excluded)?.ok_or_else(|| {
        EngineError::ArtifactNotFound {
            dir: artifact_dir.clone(),
        }
    })?;

    let target = artifact_path(&config.extraction.scratch_dir, pair);
    debug!("Moving {:?} to {:?}", produced, target);
    move_file(&produced, &target)?;
    if let Err(e) = ArcFile::normalize_connectivity_in_place(&target) {
        if let Err(remove_err) = fs::remove_file(&target) {
            warn!("Could not remove '{}': {}", target.display(), remove_err);
        }
        return Err(e.into());
    }

    Ok(target)
}

/// Location of the renamed artifact for `pair` inside `scratch_dir`.
pub fn artifact_path(scratch_dir: &Path, pair: ResiduePair) -> PathBuf {
    scratch_dir.join(format!("{}.arc", pair.artifact_stem()))
}

fn artifact_dir_for(trajectory: &Path, configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    match trajectory.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Files the run itself may write while the tool is running. Never taken as artifacts.
fn excluded_paths(config: &PairEnergyConfig, trajectory: &Path) -> Vec<PathBuf> {
    [trajectory, config.output.results_path.as_path()]
        .into_iter()
        .chain(config.output.csv_summary_path.as_deref())
        .chain(config.extraction.ignored_paths.iter().map(PathBuf::as_path))
        .filter_map(|path| fs::canonicalize(path).ok())
        .collect()
}

fn snapshot(dir: &Path) -> io::Result<DirSnapshot> {
    let mut files = HashMap::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            files.insert(entry.path(), metadata.modified().ok());
        }
    }
    Ok(files)
}

fn newest_new_file(
    dir: &Path,
    before: &DirSnapshot,
    excluded: &[PathBuf],
) -> io::Result<Option<PathBuf>> {
    let mut newest: Option<(Option<SystemTime>, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let path = entry.path();
        let modified = metadata.modified().ok();
        if before.get(&path) == Some(&modified) {
            continue;
        }
        if fs::canonicalize(&path).is_ok_and(|path| excluded.contains(&path)) {
            continue;
        }
        let stamp = metadata.created().ok().or(modified);
        if newest.as_ref().is_none_or(|(best, _)| stamp >= *best) {
            newest = Some((stamp, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}
