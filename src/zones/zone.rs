use std::collections::HashSet;

use crate::{error::GeometryConfigError, geometry::Polygon, models::ActivityState};

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub polygon: Polygon,
    pub state: ActivityState,
}

impl Zone {
    pub fn new(name: impl Into<String>, polygon: Polygon, state: ActivityState) -> Self {
        Self {
            name: name.into(),
            polygon,
            state,
        }
    }
}

/// Zones sorted into evaluation priority, highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    /// Orders `zones` by `priority`. Every priority entry must name a defined
    /// zone exactly once and every defined zone must appear in `priority`.
    pub fn new(zones: Vec<Zone>, priority: &[String]) -> Result<Self, GeometryConfigError> {
        let mut seen = HashSet::new();
        for zone in &zones {
            if !seen.insert(zone.name.as_str()) {
                return Err(GeometryConfigError::DuplicateZone(zone.name.clone()));
            }
        }

        let mut listed = HashSet::new();
        for name in priority {
            if !seen.contains(name.as_str()) {
                return Err(GeometryConfigError::UnknownZone(name.clone()));
            }
            if !listed.insert(name.as_str()) {
                return Err(GeometryConfigError::DuplicateZone(name.clone()));
            }
        }

        if let Some(missing) = zones.iter().find(|z| !listed.contains(z.name.as_str())) {
            return Err(GeometryConfigError::UnprioritizedZone(missing.name.clone()));
        }

        let mut pool = zones;
        let mut ordered = Vec::with_capacity(pool.len());
        for name in priority {
            if let Some(idx) = pool.iter().position(|z| &z.name == name) {
                ordered.push(pool.swap_remove(idx));
            }
        }

        Ok(Self { zones: ordered })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.zones.iter().map(|z| z.name.as_str()).collect()
    }
}
