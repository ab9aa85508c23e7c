//! Statistics dashboard: stat cards, charts, and the results panels.

pub mod chart;
pub mod counter;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::rng::RandomSource;
use crate::site::Site;
use crate::stats::{Statistics, IMPACT_CATEGORIES};
use chart::{ChartKind, ChartModel, ChartSurface};
use counter::{AnimatedStat, Trend};

/// Confidence reported with every detection run
const DETECTION_CONFIDENCE: f64 = 0.95;

pub const RISK_FACTOR_NAMES: [&str; 4] = [
    "Deforestation Rate",
    "Species Diversity",
    "Habitat Fragmentation",
    "Climate Impact",
];

/// Summary shown after a detection run
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResults {
    /// Sum of site areas
    pub total_area: u32,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub sites_detected: usize,
}

impl DetectionResults {
    pub fn from_sites(sites: &[Site], timestamp: DateTime<Utc>) -> Self {
        Self {
            total_area: sites.iter().map(|s| s.area).sum(),
            confidence: DETECTION_CONFIDENCE,
            timestamp,
            sites_detected: sites.len(),
        }
    }
}

/// Summary shown after a risk-mapping run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskResults {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub factors: [&'static str; 4],
}

impl RiskResults {
    pub fn generate(rng: &mut dyn RandomSource) -> Self {
        Self {
            high: rng.next_index(5) as u32,
            medium: rng.next_index(10) as u32,
            low: rng.next_index(15) as u32,
            factors: RISK_FACTOR_NAMES,
        }
    }
}

/// Push a statistics snapshot into the two chart widgets
pub fn update_charts(stats: &Statistics, trend: &mut dyn ChartSurface, impact: &mut dyn ChartSurface) {
    trend.set_labels(stats.time_labels.iter().map(|y| y.to_string()).collect());
    trend.set_data(stats.deforestation.clone());
    trend.update();

    impact.set_data(stats.impact_scores.to_vec());
    impact.update();
}

pub struct Dashboard {
    pub total_area: AnimatedStat,
    pub rate_change: AnimatedStat,
    pub carbon_impact: AnimatedStat,
    pub trend_chart: ChartModel,
    pub impact_chart: ChartModel,
    pub detection: Option<DetectionResults>,
    pub risk: Option<RiskResults>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            total_area: AnimatedStat::new("Total Area", "hectares"),
            rate_change: AnimatedStat::new("Rate of Change", "%"),
            carbon_impact: AnimatedStat::new("Carbon Impact", "tons"),
            trend_chart: ChartModel::new(ChartKind::Line, "Deforestation Trend", "Deforested Area (hectares)"),
            impact_chart: ChartModel::bar("Environmental Impact", "Impact Score", &IMPACT_CATEGORIES),
            detection: None,
            risk: None,
        }
    }

    pub fn stat_cards(&self) -> [&AnimatedStat; 3] {
        [&self.total_area, &self.rate_change, &self.carbon_impact]
    }

    pub fn render_stats(&mut self, stats: &Statistics, now: DateTime<Utc>) {
        update_charts(stats, &mut self.trend_chart, &mut self.impact_chart);

        self.total_area.set_target(stats.total_area.round() as i64, now);
        // Card shows the integer part only
        self.rate_change.set_target(stats.rate_change.trunc() as i64, now);
        self.carbon_impact.set_target(stats.carbon_impact as i64, now);

        let trend = Trend::from_rate(stats.rate_change);
        for stat in [&mut self.total_area, &mut self.rate_change, &mut self.carbon_impact] {
            stat.set_trend(trend);
        }
        debug!(
            total_area = stats.total_area,
            rate_change = stats.rate_change,
            "dashboard stats updated"
        );
    }

    /// Step every running count-up to `now`
    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.total_area.advance(now);
        self.rate_change.advance(now);
        self.carbon_impact.advance(now);
    }

    pub fn update_detection_results(&mut self, sites: &[Site], now: DateTime<Utc>) {
        self.detection = Some(DetectionResults::from_sites(sites, now));
    }

    pub fn update_risk_results(&mut self, results: RiskResults) {
        self.risk = Some(results);
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::rng::{ScriptedRandom, SeededRandom};
    use crate::site::{generate, Timeframe};
    use crate::stats::{generate_statistics, Country, TimeRange};
    use chrono::TimeDelta;

    #[derive(Default)]
    struct RecordingChart {
        labels: Option<Vec<String>>,
        data: Option<Vec<f64>>,
        updates: usize,
    }

    impl ChartSurface for RecordingChart {
        fn set_labels(&mut self, labels: Vec<String>) {
            self.labels = Some(labels);
        }

        fn set_data(&mut self, data: Vec<f64>) {
            self.data = Some(data);
        }

        fn update(&mut self) {
            self.updates += 1;
        }
    }

    fn stats(seed: u64) -> Statistics {
        generate_statistics(Country::Brazil, TimeRange::FiveYears, &mut SeededRandom::from_seed(seed), 2024)
    }

    #[test]
    fn test_update_charts_sets_series_and_redraws() {
        let stats = stats(1);
        let (mut trend, mut impact) = (RecordingChart::default(), RecordingChart::default());
        update_charts(&stats, &mut trend, &mut impact);

        assert_eq!(
            trend.labels.as_deref(),
            Some(&["2020", "2021", "2022", "2023", "2024"].map(String::from)[..])
        );
        assert_eq!(trend.data.as_deref(), Some(&stats.deforestation[..]));
        assert_eq!(trend.updates, 1);
        assert!(impact.labels.is_none());
        assert_eq!(impact.data.as_ref().map(Vec::len), Some(4));
        assert_eq!(impact.updates, 1);
    }

    #[test]
    fn test_render_stats_animates_to_targets() {
        let clock = ManualClock::at_epoch();
        let mut dashboard = Dashboard::new();
        let stats = stats(2);
        dashboard.render_stats(&stats, clock.now());

        clock.advance(TimeDelta::seconds(2));
        dashboard.advance(clock.now());

        assert_eq!(dashboard.total_area.displayed(), stats.total_area.round() as i64);
        assert_eq!(dashboard.rate_change.displayed(), stats.rate_change.trunc() as i64);
        assert_eq!(dashboard.carbon_impact.displayed(), stats.carbon_impact as i64);
        let expected = Trend::from_rate(stats.rate_change);
        assert!(dashboard.stat_cards().iter().all(|s| s.trend() == Some(expected)));
        assert_eq!(dashboard.trend_chart.labels().len(), 5);
        assert_eq!(dashboard.impact_chart.labels()[0], "Biodiversity Loss");
    }

    #[test]
    fn test_detection_results_sum_areas() {
        let now = ManualClock::at_epoch().now();
        let sites = generate(Timeframe::Current, &mut SeededRandom::from_seed(8), now);
        let mut dashboard = Dashboard::new();
        dashboard.update_detection_results(&sites, now);

        let results = dashboard.detection.as_ref().expect("results");
        assert_eq!(results.sites_detected, 5);
        assert_eq!(results.total_area, sites.iter().map(|s| s.area).sum::<u32>());
        assert_eq!(results.confidence, 0.95);
    }

    #[test]
    fn test_risk_results_ranges() {
        let mut rng = ScriptedRandom::constant(0.999);
        let results = RiskResults::generate(&mut rng);
        assert_eq!((results.high, results.medium, results.low), (4, 9, 14));
        assert_eq!(results.factors[0], "Deforestation Rate");
    }
}
