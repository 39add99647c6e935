use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::RepairOptions;
use crate::error::Result;
use crate::layer_uri::DEFAULT_CRS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    #[serde(other)]
    Unknown,
}

impl GeometryKind {
    pub fn is_areal(self) -> bool {
        matches!(self, GeometryKind::Polygon | GeometryKind::MultiPolygon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub geometry: GeometryKind,
    /// Path or URI of the backing data.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// A new layer to register with the host.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRequest {
    pub name: String,
    pub uri: String,
    pub provider: String,
    pub geometry: GeometryKind,
}

pub trait LayerCatalog {
    fn layers(&self) -> Vec<LayerInfo>;

    fn add_layer(&mut self, request: LayerRequest) -> Result<()>;

    /// Where new files go unless the user picks otherwise.
    fn home(&self) -> PathBuf;

    fn crs(&self) -> String {
        DEFAULT_CRS.to_owned()
    }

    fn layers_of(&self, accept: impl Fn(GeometryKind) -> bool) -> Vec<LayerInfo>
    where
        Self: Sized,
    {
        self.layers()
            .into_iter()
            .filter(|l| accept(l.geometry))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub home: Option<PathBuf>,
    #[serde(default = "default_crs")]
    pub crs: String,
    #[serde(default)]
    pub layers: Vec<LayerInfo>,
    #[serde(default)]
    pub repair: RepairOptions,
}

fn default_crs() -> String {
    DEFAULT_CRS.to_owned()
}

/// A project document on disk; registered layers are written back immediately.
#[derive(Debug)]
pub struct ProjectFile {
    path: PathBuf,
    project: Project,
}

impl ProjectFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let project: Project = serde_json::from_slice(&fs::read(&path)?)?;
        tracing::debug!(path = %path.display(), layers = project.layers.len(), "opened project");
        Ok(Self { path, project })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, serde_json::to_vec_pretty(&self.project)?)?;
        Ok(())
    }
}

impl LayerCatalog for ProjectFile {
    fn layers(&self) -> Vec<LayerInfo> {
        self.project.layers.clone()
    }

    fn add_layer(&mut self, request: LayerRequest) -> Result<()> {
        tracing::info!(name = %request.name, uri = %request.uri, "registering layer");
        self.project.layers.push(LayerInfo {
            name: request.name,
            geometry: request.geometry,
            source: request.uri,
            provider: Some(request.provider),
        });
        self.save()
    }

    /// The project's `home`, or the directory holding the project file.
    fn home(&self) -> PathBuf {
        self.project.home.clone().unwrap_or_else(|| {
            self.path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    fn crs(&self) -> String {
        self.project.crs.clone()
    }
}
