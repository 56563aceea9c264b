use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    error::GeometryConfigError,
    geometry::{Point, Polygon},
    models::ActivityState,
    zones::{Zone, ZoneSet},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceSettings {
    pub base_url: String,
    pub camera: String,
    pub label: String,
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".into(),
            camera: "tapo_c222".into(),
            label: "person".into(),
            limit: 5,
            timeout_secs: 3,
        }
    }
}

/// Vertices as `[[x, y], ...]` or the flat `[x1, y1, x2, y2, ...]` form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PolygonSettings {
    Pairs(Vec<[f64; 2]>),
    Flat(Vec<f64>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneSettings {
    pub name: String,
    pub state: ActivityState,
    pub polygon: PolygonSettings,
}

impl ZoneSettings {
    fn build(&self) -> Result<Zone, GeometryConfigError> {
        let polygon = match &self.polygon {
            PolygonSettings::Pairs(pairs) => Polygon::new(
                &self.name,
                pairs.iter().map(|[x, y]| Point::new(*x, *y)).collect(),
            )?,
            PolygonSettings::Flat(coords) => Polygon::from_flat(&self.name, coords)?,
        };
        Ok(Zone::new(self.name.clone(), polygon, self.state))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub poll_interval_secs: u64,
    pub database_path: PathBuf,
    pub zones: Vec<ZoneSettings>,
    /// Zone names, highest priority first.
    pub priority: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            poll_interval_secs: 5,
            database_path: PathBuf::from("tracker.db"),
            zones: vec![
                ZoneSettings {
                    name: "desk".into(),
                    state: ActivityState::Working,
                    polygon: PolygonSettings::Flat(vec![
                        0.684, 0.714, 0.894, 0.865, 0.918, 1.0, 0.58, 1.0, 0.594, 0.846,
                    ]),
                },
                ZoneSettings {
                    name: "bed".into(),
                    state: ActivityState::Resting,
                    polygon: PolygonSettings::Flat(vec![
                        0.283, 0.654, 0.501, 0.681, 0.415, 1.0, 0.03, 1.0, 0.135, 0.822,
                    ]),
                },
            ],
            priority: vec!["desk".into(), "bed".into()],
        }
    }
}

impl Settings {
    /// Reads `path` if it exists, otherwise returns defaults. A file that
    /// exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            Self::from_json(&contents)
                .with_context(|| format!("Failed to parse settings in {}", path.display()))?
        } else {
            log::info!("No settings file at {}, using defaults", path.display());
            Self::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than zero");
        }
        if self.source.timeout_secs == 0 {
            bail!("source.timeout_secs must be greater than zero");
        }
        if self.source.limit == 0 {
            bail!("source.limit must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validated zones in priority order.
    pub fn build_zones(&self) -> Result<ZoneSet, GeometryConfigError> {
        let zones = self
            .zones
            .iter()
            .map(ZoneSettings::build)
            .collect::<Result<Vec<_>, _>>()?;
        ZoneSet::new(zones, &self.priority)
    }
}
