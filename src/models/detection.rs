use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// One tracked subject as reported by the detection source for a single poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Most recent position estimate (the last point of the track's path).
    pub position: Option<Point>,
    /// Zone names the source already attributed this track to.
    pub zones: Vec<String>,
    /// Source report time, seconds since the epoch.
    pub reported_at: Option<f64>,
}

impl Detection {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Some(Point::new(x, y)),
            ..Self::default()
        }
    }

    pub fn in_zones<I, S>(zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            zones: zones.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn malformed() -> Self {
        Self::default()
    }

    /// No position and no zone labels: nothing to classify.
    pub fn is_malformed(&self) -> bool {
        let bad_position = match self.position {
            Some(p) => !p.x.is_finite() || !p.y.is_finite(),
            None => true,
        };
        bad_position && self.zones.is_empty()
    }
}
