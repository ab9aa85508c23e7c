//! Impact metrics derived from a site's cleared area (hectares).
//!
//! Every function here is pure and integer results are floored, so the same
//! area always yields the same numbers.

use std::fmt;

/// Average species count per hectare of primary forest
const SPECIES_PER_HECTARE: f64 = 25.0;
/// Tons of carbon stored per hectare
const CARBON_PER_HECTARE: f64 = 160.0;
/// CO2 mass per unit of carbon mass
const CO2_PER_CARBON: f64 = 3.67;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatLevel {
    Moderate,
    Significant,
    Critical,
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThreatLevel::Moderate => "Moderate",
            ThreatLevel::Significant => "Significant",
            ThreatLevel::Critical => "Critical",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiodiversityImpact {
    pub species_affected: u64,
    pub threat_level: ThreatLevel,
    pub ecosystem_impact: &'static str,
}

pub fn biodiversity_impact(area: u32) -> BiodiversityImpact {
    BiodiversityImpact {
        species_affected: (area as f64 * SPECIES_PER_HECTARE).floor() as u64,
        threat_level: if area > 300 {
            ThreatLevel::Critical
        } else if area > 150 {
            ThreatLevel::Significant
        } else {
            ThreatLevel::Moderate
        },
        ecosystem_impact: if area > 300 {
            "Severe fragmentation"
        } else {
            "Partial fragmentation"
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarbonImpact {
    /// Tons of carbon
    pub carbon_released: u64,
    /// Tons of CO2 equivalent
    pub equivalent_emissions: u64,
    /// Ongoing tons per year
    pub yearly_impact: u64,
}

/// Tons of carbon released by clearing `area` hectares. Also used for the
/// dashboard's aggregate carbon figure so both views agree.
pub fn carbon_released(area: f64) -> u64 {
    (area * CARBON_PER_HECTARE).floor() as u64
}

pub fn carbon_impact(area: u32) -> CarbonImpact {
    let released = area as f64 * CARBON_PER_HECTARE;
    CarbonImpact {
        carbon_released: released.floor() as u64,
        equivalent_emissions: (released * CO2_PER_CARBON).floor() as u64,
        yearly_impact: (released * 0.1).floor() as u64,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFactorKind {
    HabitatLoss,
    SpeciesExtinction,
    EcosystemDegradation,
    CarbonRelease,
}

impl RiskFactorKind {
    pub const ALL: [RiskFactorKind; 4] = [
        RiskFactorKind::HabitatLoss,
        RiskFactorKind::SpeciesExtinction,
        RiskFactorKind::EcosystemDegradation,
        RiskFactorKind::CarbonRelease,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RiskFactorKind::HabitatLoss => "Habitat Loss",
            RiskFactorKind::SpeciesExtinction => "Species Extinction",
            RiskFactorKind::EcosystemDegradation => "Ecosystem Degradation",
            RiskFactorKind::CarbonRelease => "Carbon Release",
        }
    }

    /// (high, low) area thresholds: above high scores 5, above low scores 3
    fn thresholds(self) -> (u32, u32) {
        match self {
            RiskFactorKind::HabitatLoss => (300, 150),
            RiskFactorKind::SpeciesExtinction => (250, 100),
            RiskFactorKind::EcosystemDegradation => (350, 200),
            RiskFactorKind::CarbonRelease => (400, 250),
        }
    }

    pub fn score(self, area: u32) -> u8 {
        let (high, low) = self.thresholds();
        if area > high {
            5
        } else if area > low {
            3
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskFactor {
    pub kind: RiskFactorKind,
    pub score: u8,
}

impl RiskFactor {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

pub fn risk_factors(area: u32) -> [RiskFactor; 4] {
    RiskFactorKind::ALL.map(|kind| RiskFactor {
        kind,
        score: kind.score(area),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryEstimate {
    pub years: u32,
    pub natural_regeneration: &'static str,
    pub intervention_needed: &'static str,
}

pub fn recovery_estimate(area: u32) -> RecoveryEstimate {
    RecoveryEstimate {
        years: (area as f64 * 0.1).floor() as u32 + 5,
        natural_regeneration: if area < 200 { "Possible" } else { "Unlikely" },
        intervention_needed: if area > 150 { "Yes" } else { "No" },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_site_metrics() {
        let bio = biodiversity_impact(350);
        assert_eq!(bio.species_affected, 8750);
        assert_eq!(bio.threat_level, ThreatLevel::Critical);
        assert_eq!(bio.ecosystem_impact, "Severe fragmentation");

        assert_eq!(carbon_impact(350).carbon_released, 56000);

        let recovery = recovery_estimate(350);
        assert_eq!(recovery.years, 40);
        assert_eq!(recovery.natural_regeneration, "Unlikely");
        assert_eq!(recovery.intervention_needed, "Yes");
    }

    #[test]
    fn test_small_site_metrics() {
        let recovery = recovery_estimate(120);
        assert_eq!(recovery.intervention_needed, "No");
        assert_eq!(recovery.natural_regeneration, "Possible");
        assert_eq!(recovery.years, 17);
        assert_eq!(biodiversity_impact(120).threat_level, ThreatLevel::Moderate);
    }

    #[test]
    fn test_carbon_floors_match_float_math() {
        for area in 100..600u32 {
            let c = carbon_impact(area);
            assert_eq!(c.carbon_released, (area as f64 * 160.0).floor() as u64);
            assert_eq!(
                c.equivalent_emissions,
                (c.carbon_released as f64 * 3.67).floor() as u64
            );
            assert_eq!(c.yearly_impact, (area as f64 * 160.0 * 0.1).floor() as u64);
        }
        assert_eq!(carbon_impact(101).equivalent_emissions, 59307);
    }

    #[test]
    fn test_threat_level_boundaries() {
        assert_eq!(biodiversity_impact(150).threat_level, ThreatLevel::Moderate);
        assert_eq!(biodiversity_impact(151).threat_level, ThreatLevel::Significant);
        assert_eq!(biodiversity_impact(300).threat_level, ThreatLevel::Significant);
        assert_eq!(biodiversity_impact(301).threat_level, ThreatLevel::Critical);
    }

    #[test]
    fn test_risk_scores_are_monotonic() {
        for kind in RiskFactorKind::ALL {
            let mut prev = 0;
            for area in 0..700u32 {
                let score = kind.score(area);
                assert!(matches!(score, 1 | 3 | 5));
                assert!(score >= prev, "{} dropped at {}", kind.name(), area);
                prev = score;
            }
        }
    }

    #[test]
    fn test_risk_thresholds() {
        let scores = |area| risk_factors(area).map(|f| f.score);
        assert_eq!(scores(100), [1, 1, 1, 1]);
        assert_eq!(scores(101), [1, 3, 1, 1]);
        assert_eq!(scores(260), [3, 5, 3, 3]);
        assert_eq!(scores(401), [5, 5, 5, 5]);
        assert_eq!(risk_factors(350)[2].name(), "Ecosystem Degradation");
    }
}
