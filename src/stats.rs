//! Synthetic country-level statistics for the dashboard.

use std::fmt;

use crate::rng::RandomSource;
use crate::site::metrics::carbon_released;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    Brazil,
    Indonesia,
    Congo,
    Peru,
    Colombia,
    /// Anything not in the list above
    Other,
}

impl Country {
    pub const ALL: [Country; 6] = [
        Country::Brazil,
        Country::Indonesia,
        Country::Congo,
        Country::Peru,
        Country::Colombia,
        Country::Other,
    ];

    /// Unrecognised keys map to [`Country::Other`]
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "brazil" => Country::Brazil,
            "indonesia" => Country::Indonesia,
            "congo" => Country::Congo,
            "peru" => Country::Peru,
            "colombia" => Country::Colombia,
            _ => Country::Other,
        }
    }

    /// Baseline hectares cleared per year
    pub fn base_value(self) -> f64 {
        match self {
            Country::Brazil => 1_000_000.0,
            Country::Indonesia => 500_000.0,
            Country::Congo => 300_000.0,
            Country::Peru => 200_000.0,
            Country::Colombia => 150_000.0,
            Country::Other => 100_000.0,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Country::Brazil => "Brazil",
            Country::Indonesia => "Indonesia",
            Country::Congo => "Congo",
            Country::Peru => "Peru",
            Country::Colombia => "Colombia",
            Country::Other => "Other",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    OneYear,
    FiveYears,
    TenYears,
}

impl TimeRange {
    /// "1year" and "5years" are recognised, everything else means ten years
    pub fn from_key(key: &str) -> Self {
        match key {
            "1year" => TimeRange::OneYear,
            "5years" => TimeRange::FiveYears,
            _ => TimeRange::TenYears,
        }
    }

    pub fn years(self) -> usize {
        match self {
            TimeRange::OneYear => 1,
            TimeRange::FiveYears => 5,
            TimeRange::TenYears => 10,
        }
    }

    pub fn next(self) -> Self {
        match self {
            TimeRange::OneYear => TimeRange::FiveYears,
            TimeRange::FiveYears => TimeRange::TenYears,
            TimeRange::TenYears => TimeRange::OneYear,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.years() {
            1 => f.write_str("1 year"),
            n => write!(f, "{n} years"),
        }
    }
}

pub const IMPACT_CATEGORIES: [&str; 4] = [
    "Biodiversity Loss",
    "Carbon Emissions",
    "Soil Erosion",
    "Water Impact",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    /// Years, oldest first
    pub time_labels: Vec<i32>,
    /// Hectares cleared per year, aligned with `time_labels`
    pub deforestation: Vec<f64>,
    /// Scores in [0, 100) per [`IMPACT_CATEGORIES`] entry
    pub impact_scores: [f64; 4],
    pub total_area: f64,
    /// Percent change from the oldest to the newest year, one decimal
    pub rate_change: f64,
    /// Tons of carbon for `total_area`, same model as per-site carbon
    pub carbon_impact: u64,
}

pub fn generate_statistics(
    country: Country,
    range: TimeRange,
    rng: &mut dyn RandomSource,
    current_year: i32,
) -> Statistics {
    let base = country.base_value();
    let years = range.years();

    let mut time_labels = Vec::with_capacity(years);
    let mut deforestation = Vec::with_capacity(years);
    for i in 0..years {
        time_labels.push(current_year - i as i32);
        deforestation.push(base * (1.0 + rng.next_f64() * 0.5));
    }

    let impact_scores = [(); 4].map(|_| rng.next_f64() * 100.0);

    time_labels.reverse();
    deforestation.reverse();

    let total_area: f64 = deforestation.iter().sum();
    let (first, last) = (deforestation[0], deforestation[years - 1]);
    let rate_change = ((last - first) / first * 100.0 * 10.0).round() / 10.0;

    Statistics {
        time_labels,
        deforestation,
        impact_scores,
        total_area,
        rate_change,
        carbon_impact: carbon_released(total_area),
    }
}

/// Format an integer with thousands separators
pub fn with_commas(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    #[test]
    fn test_series_is_chronological() {
        // newest year first in draw order: 0.0 → base, 1.0 → 1.5 * base
        let mut rng = ScriptedRandom::new(vec![1.0, 0.5, 0.0, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2]);
        let stats = generate_statistics(Country::Peru, TimeRange::FiveYears, &mut rng, 2024);

        assert_eq!(stats.time_labels, vec![2020, 2021, 2022, 2023, 2024]);
        assert_eq!(stats.deforestation[4], 300_000.0);
        assert_eq!(stats.deforestation[3], 250_000.0);
        assert_eq!(stats.deforestation[2], 200_000.0);
        // newest 300k vs oldest 220k
        assert_eq!(stats.rate_change, 36.4);
        assert_eq!(stats.impact_scores, [20.0; 4]);
    }

    #[test]
    fn test_totals_and_carbon() {
        let mut rng = ScriptedRandom::constant(0.0);
        let stats = generate_statistics(Country::Brazil, TimeRange::TenYears, &mut rng, 2024);
        assert_eq!(stats.total_area, 10_000_000.0);
        assert_eq!(stats.rate_change, 0.0);
        assert_eq!(stats.carbon_impact, 1_600_000_000);
    }

    #[test]
    fn test_unknown_country_falls_back() {
        assert_eq!(Country::from_key("atlantis"), Country::Other);
        assert_eq!(Country::from_key("Brazil"), Country::Brazil);
        let mut rng = ScriptedRandom::constant(0.0);
        let stats = generate_statistics(Country::from_key("atlantis"), TimeRange::OneYear, &mut rng, 2024);
        assert_eq!(stats.deforestation, vec![100_000.0]);
        assert_eq!(stats.time_labels, vec![2024]);
    }

    #[test]
    fn test_time_range_keys() {
        assert_eq!(TimeRange::from_key("1year").years(), 1);
        assert_eq!(TimeRange::from_key("5years").years(), 5);
        assert_eq!(TimeRange::from_key("whatever").years(), 10);
        assert_eq!(TimeRange::TenYears.next(), TimeRange::OneYear);
    }

    #[test]
    fn test_country_cycle_wraps() {
        let mut c = Country::Brazil;
        for _ in 0..Country::ALL.len() {
            c = c.next();
        }
        assert_eq!(c, Country::Brazil);
    }

    #[test]
    fn test_with_commas() {
        assert_eq!(with_commas(0), "0");
        assert_eq!(with_commas(999), "999");
        assert_eq!(with_commas(1000), "1,000");
        assert_eq!(with_commas(1234567), "1,234,567");
        assert_eq!(with_commas(-1234), "-1,234");
    }
}
