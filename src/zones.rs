use tracing::debug;

use crate::models::{Zone, ZoneCount, ZoneSummary};

pub const QUANTILES: [f64; 4] = [0.2, 0.4, 0.6, 0.8];
pub const FALLBACK_THRESHOLDS: [f64; 4] = [20.0, 40.0, 60.0, 80.0];

/// Linear interpolation between the two nearest ranked values.
pub fn quantile(sorted: &[i32], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let base = pos.floor() as usize;
    let frac = pos - base as f64;

    match sorted.get(base + 1) {
        Some(&next) => {
            let current = sorted[base] as f64;
            current + frac * (next as f64 - current)
        }
        None => sorted[base] as f64,
    }
}

/// Population thresholds, or the fixed cut points when every quantile
/// lands on the same value. The flag reports whether the fallback was used.
/// Returns `None` for an empty population.
pub fn thresholds(scores: &[i32]) -> Option<([f64; 4], bool)> {
    if scores.is_empty() {
        return None;
    }

    let mut sorted = scores.to_vec();
    sorted.sort_unstable();
    let computed = QUANTILES.map(|q| quantile(&sorted, q));

    if computed.iter().all(|value| *value == computed[0]) {
        debug!(value = computed[0], "quantiles collapsed, using fixed thresholds");
        Some((FALLBACK_THRESHOLDS, true))
    } else {
        Some((computed, false))
    }
}

pub fn zone_for(score: i32, thresholds: &[f64; 4]) -> Zone {
    let value = score as f64;
    if value <= thresholds[0] {
        Zone::Energized
    } else if value <= thresholds[1] {
        Zone::MildStress
    } else if value <= thresholds[2] {
        Zone::WarningZone
    } else if value <= thresholds[3] {
        Zone::BurnoutZone
    } else {
        Zone::Critical
    }
}

pub fn classify_zones(scores: &[i32]) -> Option<ZoneSummary> {
    let (thresholds, fallback) = thresholds(scores)?;
    debug!(?thresholds, fallback, population = scores.len(), "classifying scores");

    let mut counts = [0usize; 5];
    for score in scores {
        counts[zone_for(*score, &thresholds).index()] += 1;
    }

    let total = scores.len();
    let zones = Zone::ALL
        .iter()
        .map(|zone| {
            let count = counts[zone.index()];
            ZoneCount {
                zone: *zone,
                count,
                percent: count as f64 / total as f64 * 100.0,
            }
        })
        .collect();

    Some(ZoneSummary {
        thresholds,
        fallback,
        total,
        zones,
    })
}
