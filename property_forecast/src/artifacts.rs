//! Per-area model artifacts
//!
//! Each area has a model file in one directory and a trained-columns file
//! in another, both named `<prefix>_<area>.<extension>` where the area may
//! use spaces or underscores. Matching is case-insensitive. When several
//! files match, the lexicographically smallest file name wins.

use crate::area::Area;
use crate::columns::TrainedColumnSpec;
use crate::error::{ArtifactKind, ForecastError, Result};
use crate::models::{load_model, ModelArtifact, PriceModel};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Default file name prefix of model artifacts
pub const DEFAULT_MODEL_PREFIX: &str = "dt_model";
/// Default file name prefix of trained-column artifacts
pub const DEFAULT_COLUMNS_PREFIX: &str = "trained_columns";
/// Default artifact file extension
pub const DEFAULT_EXTENSION: &str = "json";

/// Where and under which names artifacts are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    models_dir: PathBuf,
    columns_dir: PathBuf,
    model_prefix: String,
    columns_prefix: String,
    extension: String,
}

impl ArtifactLayout {
    /// Layout with the default prefixes and extension
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(models_dir: P, columns_dir: Q) -> Self {
        Self {
            models_dir: models_dir.into(),
            columns_dir: columns_dir.into(),
            model_prefix: DEFAULT_MODEL_PREFIX.to_string(),
            columns_prefix: DEFAULT_COLUMNS_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Override the file name prefixes
    pub fn with_prefixes(mut self, model_prefix: &str, columns_prefix: &str) -> Self {
        self.model_prefix = model_prefix.to_string();
        self.columns_prefix = columns_prefix.to_string();
        self
    }

    /// Override the file extension (without the dot)
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Directory holding artifacts of `kind`
    pub fn dir(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Model => &self.models_dir,
            ArtifactKind::TrainedColumns => &self.columns_dir,
        }
    }

    /// File name prefix of artifacts of `kind`
    pub fn prefix(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Model => &self.model_prefix,
            ArtifactKind::TrainedColumns => &self.columns_prefix,
        }
    }

    /// Accepted lower-cased file names for an area, one per separator convention
    pub fn candidate_names(&self, kind: ArtifactKind, area: &Area) -> [String; 2] {
        let prefix = self.prefix(kind);
        [
            format!("{}_{}.{}", prefix, area.name(), self.extension).to_lowercase(),
            format!("{}_{}.{}", prefix, area.underscored(), self.extension).to_lowercase(),
        ]
    }

    /// Area encoded in a file name, if the name follows the layout for `kind`
    pub fn area_of(&self, kind: ArtifactKind, file_name: &str) -> Option<Area> {
        let lower = file_name.to_lowercase();
        let head = format!("{}_", self.prefix(kind)).to_lowercase();
        let tail = format!(".{}", self.extension).to_lowercase();

        if !lower.starts_with(&head) || !lower.ends_with(&tail) || lower.len() <= head.len() + tail.len() {
            return None;
        }

        // Prefix and extension are ASCII in practice; fall back to no match otherwise
        let stem = file_name.get(head.len()..file_name.len() - tail.len())?;
        let area = Area::new(stem);
        (!area.is_empty()).then_some(area)
    }
}

/// A model together with the column spec it was trained on
#[derive(Debug)]
pub struct AreaArtifacts {
    /// Area both artifacts belong to
    pub area: Area,
    /// The area's model
    pub model: Box<dyn PriceModel>,
    /// The area's trained columns
    pub columns: TrainedColumnSpec,
}

impl AreaArtifacts {
    /// Pair a model with its columns, rejecting pairs that disagree on width
    pub fn new(area: Area, model: Box<dyn PriceModel>, columns: TrainedColumnSpec) -> Result<Self> {
        if let Some(width) = model.n_features() {
            if width != columns.len() {
                return Err(ForecastError::ArtifactMismatch {
                    area: area.to_string(),
                    model_features: width,
                    columns: columns.len(),
                });
            }
        }

        Ok(Self {
            area,
            model,
            columns,
        })
    }
}

/// Anything that can provide the artifacts of an area
pub trait ArtifactSource {
    /// Load the model and trained columns of `area` as one unit
    fn load(&self, area: &Area) -> Result<AreaArtifacts>;
}

/// Resolved artifact file locations of an area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Model file
    pub model: PathBuf,
    /// Trained-columns file
    pub columns: PathBuf,
}

/// Cross-directory consistency between model and column artifacts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Areas with a model file
    pub model_areas: Vec<Area>,
    /// Areas with a model but no trained-columns file
    pub missing_columns: Vec<Area>,
    /// Areas with a trained-columns file but no model
    pub missing_models: Vec<Area>,
}

impl ConsistencyReport {
    /// Check if every model has columns and every column spec has a model
    pub fn is_consistent(&self) -> bool {
        self.missing_columns.is_empty() && self.missing_models.is_empty()
    }
}

/// Resolves artifacts from the filesystem
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    layout: ArtifactLayout,
}

impl ArtifactResolver {
    /// Create a resolver over a layout
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// The layout in use
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Locate the artifact file of `kind` for an area
    pub fn find(&self, kind: ArtifactKind, area: &Area) -> Result<PathBuf> {
        let candidates = self.layout.candidate_names(kind, area);
        let mut matches: Vec<(String, PathBuf)> = self
            .list_dir(kind)?
            .into_iter()
            .filter(|(name, _)| candidates.contains(&name.to_lowercase()))
            .collect();

        matches.sort_by(|a, b| a.0.cmp(&b.0));

        if matches.len() > 1 {
            log::warn!(
                "{} files matching area '{}': {:?}; using '{}'",
                matches.len(),
                area,
                matches.iter().map(|(name, _)| name).collect::<Vec<_>>(),
                matches[0].0
            );
        }

        matches
            .into_iter()
            .next()
            .map(|(_, path)| path)
            .ok_or_else(|| {
                log::warn!("{} file missing for area: {}", kind, area);
                ForecastError::ArtifactNotFound {
                    kind,
                    area: area.to_string(),
                }
            })
    }

    /// Locate both artifact files for an area
    pub fn resolve_paths(&self, area: &Area) -> Result<ArtifactPaths> {
        Ok(ArtifactPaths {
            columns: self.find(ArtifactKind::TrainedColumns, area)?,
            model: self.find(ArtifactKind::Model, area)?,
        })
    }

    /// Areas that have an artifact of `kind`, sorted and deduplicated
    pub fn areas(&self, kind: ArtifactKind) -> Result<Vec<Area>> {
        let areas: BTreeSet<Area> = self
            .list_dir(kind)?
            .iter()
            .filter_map(|(name, _)| self.layout.area_of(kind, name))
            .collect();
        Ok(areas.into_iter().collect())
    }

    /// Areas with a model file
    pub fn available_areas(&self) -> Result<Vec<Area>> {
        self.areas(ArtifactKind::Model)
    }

    /// Compare the areas of the model and trained-columns directories
    pub fn check_consistency(&self) -> Result<ConsistencyReport> {
        let models: BTreeSet<Area> = self.areas(ArtifactKind::Model)?.into_iter().collect();
        let columns: BTreeSet<Area> = self
            .areas(ArtifactKind::TrainedColumns)?
            .into_iter()
            .collect();

        let report = ConsistencyReport {
            model_areas: models.iter().cloned().collect(),
            missing_columns: models.difference(&columns).cloned().collect(),
            missing_models: columns.difference(&models).cloned().collect(),
        };

        if !report.is_consistent() {
            log::warn!(
                "Artifact directories disagree: {} areas without columns, {} without models",
                report.missing_columns.len(),
                report.missing_models.len()
            );
        }

        Ok(report)
    }

    /// File names and paths of regular files in the directory of `kind`.
    /// A missing directory is treated as empty.
    fn list_dir(&self, kind: ArtifactKind) -> Result<Vec<(String, PathBuf)>> {
        let dir = self.layout.dir(kind);
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("{} directory does not exist: {}", kind, dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
            }
        }
        Ok(files)
    }
}

impl ArtifactSource for ArtifactResolver {
    fn load(&self, area: &Area) -> Result<AreaArtifacts> {
        let paths = self.resolve_paths(area)?;
        log::debug!(
            "Loading artifacts for '{}': {} + {}",
            area,
            paths.model.display(),
            paths.columns.display()
        );

        let columns = TrainedColumnSpec::from_file(&paths.columns).map_err(|e| {
            ForecastError::ArtifactInvalid {
                kind: ArtifactKind::TrainedColumns,
                area: area.to_string(),
                reason: e.to_string(),
            }
        })?;
        let model = load_model(&paths.model).map_err(|e| ForecastError::ArtifactInvalid {
            kind: ArtifactKind::Model,
            area: area.to_string(),
            reason: e.to_string(),
        })?;

        AreaArtifacts::new(area.clone(), model, columns)
    }
}

/// In-memory registry of artifacts keyed by area.
///
/// Every [`ArtifactSource::load`] builds a fresh model from the stored
/// artifact, so no model instance is shared between requests.
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifacts {
    entries: HashMap<Area, (ModelArtifact, TrainedColumnSpec)>,
}

impl MemoryArtifacts {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the artifacts of an area, builder style
    pub fn with_area(mut self, area: &str, model: ModelArtifact, columns: TrainedColumnSpec) -> Self {
        self.insert(area, model, columns);
        self
    }

    /// Register the artifacts of an area, replacing any previous pair
    pub fn insert(&mut self, area: &str, model: ModelArtifact, columns: TrainedColumnSpec) {
        self.entries.insert(Area::new(area), (model, columns));
    }

    /// Registered areas, sorted
    pub fn areas(&self) -> Vec<Area> {
        let mut areas: Vec<Area> = self.entries.keys().cloned().collect();
        areas.sort();
        areas
    }
}

impl ArtifactSource for MemoryArtifacts {
    fn load(&self, area: &Area) -> Result<AreaArtifacts> {
        let (model, columns) =
            self.entries
                .get(area)
                .ok_or_else(|| ForecastError::ArtifactNotFound {
                    kind: ArtifactKind::Model,
                    area: area.to_string(),
                })?;

        let model = model.clone().into_model().map_err(|e| ForecastError::ArtifactInvalid {
            kind: ArtifactKind::Model,
            area: area.to_string(),
            reason: e.to_string(),
        })?;

        AreaArtifacts::new(area.clone(), model, columns.clone())
    }
}
