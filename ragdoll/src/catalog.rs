//! # Checkpoint Catalogue
//!
//! Trained policies are exported as `<behaviour>-<steps>.onnx` files, and the
//! trainer keeps a `training_status.json` describing every checkpoint it
//! wrote:
//!
//! ```json
//! { "DuckRabbit": { "checkpoints": [ { "steps": 500000,
//!   "file_path": "results/DuckRabbit/DuckRabbit-500000.onnx",
//!   "reward": 12.5, "creation_time": 1716.0,
//!   "auxillary_file_paths": [] } ], "final_checkpoint": { ... } } }
//! ```
//!
//! The catalogue is the ordered list of checkpoints that actually exist on
//! disk, sorted by the step count embedded in the file name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed training status: {0}")]
    Json(#[from] serde_json::Error),
    #[error("file name {0} does not end in -<number>.onnx")]
    MissingCheckpointNumber(String),
    #[error("behaviour {0} not found in training status")]
    UnknownBehaviour(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub steps: u64,
    pub file_path: PathBuf,
    #[serde(default)]
    pub reward: Option<f32>,
    #[serde(default)]
    pub creation_time: f64,
    #[serde(default)]
    pub auxillary_file_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRun {
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
    #[serde(default)]
    pub final_checkpoint: Option<Checkpoint>,
}

/// The whole status file, keyed by behaviour name. Entries that are not
/// training runs (the trainer also writes a `metadata` block) are kept raw.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingStatus {
    #[serde(flatten)]
    entries: BTreeMap<String, serde_json::Value>,
}

impl TrainingStatus {
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] if `json` is not an object.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Names of the entries that look like training runs.
    pub fn behaviours(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, value)| value.get("checkpoints").is_some())
            .map(|(name, _)| name.as_str())
    }

    /// # Errors
    ///
    /// Fails if `behaviour` is absent or its entry is not a training run.
    pub fn run(&self, behaviour: &str) -> Result<TrainingRun, CatalogError> {
        let value = self
            .entries
            .get(behaviour)
            .ok_or_else(|| CatalogError::UnknownBehaviour(behaviour.to_owned()))?;
        Ok(TrainingRun::deserialize(value)?)
    }
}

/// Step number embedded in a checkpoint file name, `name-<N>.onnx`.
///
/// # Errors
///
/// Returns [`CatalogError::MissingCheckpointNumber`] for any other shape.
pub fn checkpoint_number(file_name: &str) -> Result<u64, CatalogError> {
    file_name
        .strip_suffix(".onnx")
        .and_then(|stem| stem.rsplit_once('-'))
        .map(|(_, digits)| digits)
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| CatalogError::MissingCheckpointNumber(file_name.to_owned()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub number: u64,
    pub path: PathBuf,
    /// Known only when the entry came from a training status file.
    pub steps: Option<u64>,
    pub reward: Option<f32>,
}

impl CatalogEntry {
    /// # Errors
    ///
    /// Fails if the file name carries no checkpoint number.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let name = file_name(&path);
        let number = checkpoint_number(&name)?;
        Ok(Self {
            name,
            number,
            path,
            steps: None,
            reward: None,
        })
    }
}

/// A point of the reward-versus-steps plot, both axes in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    /// Catalogue index the point selects.
    pub index: usize,
    pub reward: f32,
    pub steps: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Sorts `entries` by checkpoint number.
    #[must_use]
    pub fn new(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by_key(|entry| entry.number);
        Self { entries }
    }

    /// Every `*.onnx` file directly inside `dir`.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be listed or an ONNX file name carries
    /// no checkpoint number.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let io_error = |source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut entries = Vec::new();
        for dir_entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = dir_entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "onnx") {
                entries.push(CatalogEntry::from_path(path)?);
            }
        }
        debug!(dir = %dir.display(), count = entries.len(), "discovered checkpoints");
        Ok(Self::new(entries))
    }

    /// Checkpoints of `behaviour` whose files exist. Relative paths are
    /// resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown behaviour or a checkpoint file name without a
    /// number.
    pub fn from_training_status(
        status: &TrainingStatus,
        behaviour: &str,
        base_dir: &Path,
    ) -> Result<Self, CatalogError> {
        let run = status.run(behaviour)?;
        let mut entries = Vec::with_capacity(run.checkpoints.len());
        for checkpoint in run.checkpoints {
            let path = if checkpoint.file_path.is_absolute() {
                checkpoint.file_path.clone()
            } else {
                base_dir.join(&checkpoint.file_path)
            };
            if !path.is_file() {
                warn!(path = %path.display(), "checkpoint file not found, skipping");
                continue;
            }
            let mut entry = CatalogEntry::from_path(path)?;
            entry.steps = Some(checkpoint.steps);
            entry.reward = checkpoint.reward;
            entries.push(entry);
        }
        Ok(Self::new(entries))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Normalized reward and steps of every entry that has both. A range of
    /// zero maps to the middle of the axis.
    #[must_use]
    pub fn plot_points(&self) -> Vec<PlotPoint> {
        #[allow(clippy::cast_precision_loss)]
        let known: Vec<(usize, f32, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| Some((i, e.reward?, e.steps? as f32)))
            .collect();

        let (min_reward, max_reward) = bounds(known.iter().map(|k| k.1));
        let (min_steps, max_steps) = bounds(known.iter().map(|k| k.2));
        known
            .into_iter()
            .map(|(index, reward, steps)| PlotPoint {
                index,
                reward: normalize(reward, min_reward, max_reward),
                steps: normalize(steps, min_steps, max_steps),
            })
            .collect()
    }
}

fn bounds(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn normalize(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range.abs() <= f32::EPSILON {
        0.5
    } else {
        (value - min) / range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn numbers_come_from_the_last_dash() {
        assert_eq!(checkpoint_number("DuckRabbit-499992.onnx").unwrap(), 499_992);
        assert_eq!(checkpoint_number("duck-rabbit-12.onnx").unwrap(), 12);
        for bad in ["DuckRabbit.onnx", "DuckRabbit-.onnx", "DuckRabbit-12.pt", "DuckRabbit-1a.onnx"] {
            assert!(matches!(checkpoint_number(bad), Err(CatalogError::MissingCheckpointNumber(_))), "{bad}");
        }
    }

    #[test]
    fn entries_sort_numerically() {
        let catalog = Catalog::new(vec![
            CatalogEntry::from_path("run/Chair-1000.onnx").unwrap(),
            CatalogEntry::from_path("run/Chair-200.onnx").unwrap(),
            CatalogEntry::from_path("run/Chair-30.onnx").unwrap(),
        ]);
        let numbers: Vec<u64> = catalog.iter().map(|e| e.number).collect();
        assert_eq!(numbers, [30, 200, 1000]);
    }

    #[test]
    fn plot_points_guard_zero_range() {
        let mut a = CatalogEntry::from_path("a-1.onnx").unwrap();
        a.steps = Some(100);
        a.reward = Some(2.0);
        let mut b = CatalogEntry::from_path("a-2.onnx").unwrap();
        b.steps = Some(300);
        b.reward = Some(2.0);
        let c = CatalogEntry::from_path("a-3.onnx").unwrap();

        let points = Catalog::new(vec![a, b, c]).plot_points();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].reward, 0.5);
        assert_relative_eq!(points[0].steps, 0.0);
        assert_relative_eq!(points[1].steps, 1.0);
        assert_eq!(points[1].index, 1);
    }

    #[test]
    fn metadata_is_not_a_behaviour() {
        let status = TrainingStatus::from_json(
            r#"{ "metadata": { "stats_format_version": "0.3.0" },
                 "Chair": { "checkpoints": [], "final_checkpoint": null } }"#,
        )
        .unwrap();
        assert_eq!(status.behaviours().collect::<Vec<_>>(), ["Chair"]);
        assert!(matches!(status.run("DuckRabbit"), Err(CatalogError::UnknownBehaviour(_))));
        assert!(status.run("Chair").unwrap().checkpoints.is_empty());
    }
}
