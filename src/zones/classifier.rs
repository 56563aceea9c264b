use log::debug;

use crate::models::{ActivityState, Detection};

use super::ZoneSet;

/// Reduces one poll's detections to a single activity state.
///
/// Detections are visited in the order received; within each detection the
/// zones are tried in priority order and the first hit wins. A detection with
/// a usable position is tested geometrically, otherwise its source-supplied
/// zone labels are matched by name. Detections with neither are skipped.
/// Nothing matching (or nothing tracked at all) means the subject is away.
pub fn classify(detections: &[Detection], zones: &ZoneSet) -> ActivityState {
    for (index, detection) in detections.iter().enumerate() {
        if detection.is_malformed() {
            debug!(
                "skipping malformed detection #{index} (reported at {:?})",
                detection.reported_at
            );
            continue;
        }

        if let Some(state) = match_detection(detection, zones) {
            return state;
        }
    }

    ActivityState::Away
}

fn match_detection(detection: &Detection, zones: &ZoneSet) -> Option<ActivityState> {
    match detection.position {
        Some(p) if p.x.is_finite() && p.y.is_finite() => zones
            .iter()
            .find(|zone| zone.polygon.contains(p.x, p.y))
            .map(|zone| zone.state),
        _ => zones
            .iter()
            .find(|zone| detection.zones.iter().any(|label| label == &zone.name))
            .map(|zone| zone.state),
    }
}
