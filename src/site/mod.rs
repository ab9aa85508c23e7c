//! Synthetic deforestation sites.

pub mod metrics;

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::map::GeoPoint;
use crate::rng::RandomSource;
use metrics::{BiodiversityImpact, CarbonImpact, RecoveryEstimate, RiskFactor};

/// Maximum jitter applied to each base coordinate, in degrees
const LOCATION_JITTER_DEG: f64 = 0.5;
/// Historical detections fall within this many days before now
const HISTORY_WINDOW_DAYS: i64 = 90;
const MIN_AREA: f64 = 100.0;
const AREA_SPREAD: f64 = 500.0;

/// A fixed hotspot that every generation round reports on
pub struct BaseLocation {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

pub const BASE_LOCATIONS: [BaseLocation; 5] = [
    BaseLocation { name: "Manaus Region", lat: -3.4653, lng: -62.2159 },
    BaseLocation { name: "Santarém Area", lat: -5.2303, lng: -55.9253 },
    BaseLocation { name: "Porto Velho Zone", lat: -8.7573, lng: -63.8889 },
    BaseLocation { name: "Iquitos Region", lat: -3.7436, lng: -73.2516 },
    BaseLocation { name: "Rio Branco Area", lat: -9.1900, lng: -67.8000 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    /// Dated at generation time
    Current,
    /// Dated somewhere in the last 90 days
    Historical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_area(area: u32) -> Self {
        if area > 300 {
            Severity::High
        } else if area > 150 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeforestationType {
    ClearCutting,
    SelectiveLogging,
    Burning,
    RoadConstruction,
}

impl DeforestationType {
    const ALL: [DeforestationType; 4] = [
        DeforestationType::ClearCutting,
        DeforestationType::SelectiveLogging,
        DeforestationType::Burning,
        DeforestationType::RoadConstruction,
    ];
}

impl fmt::Display for DeforestationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeforestationType::ClearCutting => "Clear cutting",
            DeforestationType::SelectiveLogging => "Selective logging",
            DeforestationType::Burning => "Burning",
            DeforestationType::RoadConstruction => "Road construction",
        })
    }
}

/// One synthetic detection
#[derive(Debug, Clone)]
pub struct Site {
    pub location: GeoPoint,
    /// Hectares, in [100, 600)
    pub area: u32,
    pub date: DateTime<Utc>,
    pub severity: Severity,
    pub kind: DeforestationType,
    pub description: String,
    pub region_name: &'static str,
    pub biodiversity: BiodiversityImpact,
    pub carbon: CarbonImpact,
    pub risk_factors: [RiskFactor; 4],
    pub recovery: RecoveryEstimate,
    pub previous_incidents: u32,
}

fn describe(area: u32, variant: usize) -> String {
    match variant {
        0 => format!("Large-scale deforestation detected affecting {area} hectares of primary forest."),
        1 => format!("Significant forest degradation observed with {area} hectares impacted."),
        2 => format!("Forest clearing activity detected, impacting {area} hectares of diverse ecosystem."),
        _ => format!("Illegal logging operation discovered affecting {area} hectares of protected forest."),
    }
}

/// Fabricate one site per base location.
///
/// Draw order per site is fixed: lat jitter, lng jitter, area, date offset
/// (historical only), type, description, previous incidents.
pub fn generate(timeframe: Timeframe, rng: &mut dyn RandomSource, now: DateTime<Utc>) -> Vec<Site> {
    BASE_LOCATIONS
        .iter()
        .map(|base| generate_site(base, timeframe, rng, now))
        .collect()
}

fn generate_site(
    base: &BaseLocation,
    timeframe: Timeframe,
    rng: &mut dyn RandomSource,
    now: DateTime<Utc>,
) -> Site {
    let mut jitter = || (rng.next_f64() - 0.5) * 2.0 * LOCATION_JITTER_DEG;
    let lat = base.lat + jitter();
    let lng = base.lng + jitter();

    let area = (rng.next_f64() * AREA_SPREAD + MIN_AREA).floor() as u32;

    let date = match timeframe {
        Timeframe::Current => now,
        Timeframe::Historical => {
            let window_ms = (HISTORY_WINDOW_DAYS * 24 * 60 * 60 * 1000) as f64;
            now - TimeDelta::milliseconds((rng.next_f64() * window_ms) as i64)
        }
    };

    let kind = DeforestationType::ALL[rng.next_index(DeforestationType::ALL.len())];
    let description = describe(area, rng.next_index(4));
    let previous_incidents = rng.next_index(5) as u32;

    Site {
        location: GeoPoint::new(lat, lng),
        area,
        date,
        severity: Severity::from_area(area),
        kind,
        description,
        region_name: base.name,
        biodiversity: metrics::biodiversity_impact(area),
        carbon: metrics::carbon_impact(area),
        risk_factors: metrics::risk_factors(area),
        recovery: metrics::recovery_estimate(area),
        previous_incidents,
    }
}
