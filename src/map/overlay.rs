use ratatui::style::Color;
use tracing::debug;

use super::surface::{CircleLayer, LayerId, MapSurface, Marker, Popup};
use crate::site::{Severity, Site};

/// Fraction of the fitted box added on each side
const FIT_PADDING: f64 = 0.1;
/// Circle radius in metres per hectare of cleared area
const METERS_PER_HECTARE: f64 = 100.0;
const FILL_OPACITY: f64 = 0.5;

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Rgb(0xff, 0x00, 0x00),
        Severity::Medium => Color::Rgb(0xff, 0xa5, 0x00),
        Severity::Low => Color::Rgb(0xff, 0xff, 0x00),
    }
}

fn severity_fill(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Rgb(0xff, 0x44, 0x44),
        Severity::Medium => Color::Rgb(0xff, 0xc0, 0x44),
        Severity::Low => Color::Rgb(0xff, 0xff, 0x44),
    }
}

pub fn site_popup(site: &Site) -> Popup {
    let mut lines = vec![
        format!("Date: {}", site.date.format("%Y-%m-%d")),
        format!("Area: {} hectares", site.area),
        format!("Type: {}", site.kind),
        "Impact Analysis".to_string(),
        format!("Species Affected: ~{}", site.biodiversity.species_affected),
        format!("Carbon Released: {} tons", site.carbon.carbon_released),
        format!("Recovery Time: {} years", site.recovery.years),
        "Risk Assessment".to_string(),
    ];
    lines.extend(
        site.risk_factors
            .iter()
            .map(|risk| format!("{}: {}/5", risk.name(), risk.score)),
    );

    Popup {
        title: format!("{} - {} Alert", site.region_name, site.severity),
        lines,
    }
}

/// Paints sites onto a map surface, owning the layers it placed so the next
/// render can take them down again.
#[derive(Default)]
pub struct SiteOverlay {
    /// `[marker, circle]` per placed site, in placement order. Sites may
    /// share a location, so nothing here is keyed by position.
    active: Vec<[LayerId; 2]>,
}

impl SiteOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sites currently drawn
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Replace whatever was drawn before with `sites`, then frame them
    pub fn render(&mut self, sites: &[Site], surface: &mut dyn MapSurface) {
        self.clear(surface);

        for site in sites {
            let color = severity_color(site.severity);
            let marker = surface.add_marker(Marker {
                position: site.location,
                color,
            });
            let circle = surface.add_circle(CircleLayer {
                center: site.location,
                radius: site.area as f64 * METERS_PER_HECTARE,
                stroke: color,
                fill: severity_fill(site.severity),
                fill_opacity: FILL_OPACITY,
            });
            surface.bind_popup(marker, site_popup(site));
            self.active.push([marker, circle]);
        }

        let ids: Vec<LayerId> = self.active.iter().flatten().copied().collect();
        if let Some(bounds) = surface.bounds_of(&ids) {
            surface.fit_bounds(bounds.pad(FIT_PADDING));
        }
        debug!(sites = sites.len(), layers = ids.len(), "overlay rendered");
    }

    /// Remove every layer from the previous render
    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        for id in self.active.drain(..).flatten() {
            surface.remove_layer(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::map::bounds::GeoBounds;
    use crate::map::surface::Control;
    use crate::rng::{ScriptedRandom, SeededRandom};
    use crate::site::{generate, Timeframe};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct RecordingSurface {
        next: u64,
        markers: BTreeMap<LayerId, Marker>,
        circles: BTreeMap<LayerId, CircleLayer>,
        popups: BTreeMap<LayerId, Popup>,
        removed: Vec<LayerId>,
        fitted: Vec<GeoBounds>,
    }

    impl MapSurface for RecordingSurface {
        fn add_marker(&mut self, marker: Marker) -> LayerId {
            self.next += 1;
            self.markers.insert(LayerId(self.next), marker);
            LayerId(self.next)
        }

        fn add_circle(&mut self, circle: CircleLayer) -> LayerId {
            self.next += 1;
            self.circles.insert(LayerId(self.next), circle);
            LayerId(self.next)
        }

        fn remove_layer(&mut self, id: LayerId) {
            self.markers.remove(&id);
            self.circles.remove(&id);
            self.popups.remove(&id);
            self.removed.push(id);
        }

        fn bind_popup(&mut self, id: LayerId, popup: Popup) {
            self.popups.insert(id, popup);
        }

        fn bounds_of(&self, ids: &[LayerId]) -> Option<GeoBounds> {
            ids.iter()
                .filter_map(|id| {
                    self.markers
                        .get(id)
                        .map(|m| GeoBounds::from_point(m.position))
                        .or_else(|| self.circles.get(id).map(|c| GeoBounds::around_circle(c.center, c.radius)))
                })
                .reduce(|a, b| a.union(&b))
        }

        fn fit_bounds(&mut self, bounds: GeoBounds) {
            self.fitted.push(bounds);
        }

        fn add_control(&mut self, _control: Control) {}
    }

    fn sites(seed: u64) -> Vec<Site> {
        let now = ManualClock::at_epoch().now();
        generate(Timeframe::Current, &mut SeededRandom::from_seed(seed), now)
    }

    #[test]
    fn test_render_places_marker_circle_and_popup_per_site() {
        let mut surface = RecordingSurface::default();
        let mut overlay = SiteOverlay::new();
        let sites = sites(3);
        overlay.render(&sites, &mut surface);

        assert_eq!(overlay.len(), 5);
        assert_eq!(surface.markers.len(), 5);
        assert_eq!(surface.circles.len(), 5);
        assert_eq!(surface.popups.len(), 5);
        for popup in surface.popups.keys() {
            assert!(surface.markers.contains_key(popup));
        }
        for (site, circle) in sites.iter().zip(surface.circles.values()) {
            assert_eq!(circle.radius, site.area as f64 * 100.0);
            assert_eq!(circle.stroke, severity_color(site.severity));
            assert_eq!(circle.fill_opacity, 0.5);
        }
    }

    #[test]
    fn test_rerender_replaces_previous_layers() {
        let mut surface = RecordingSurface::default();
        let mut overlay = SiteOverlay::new();
        overlay.render(&sites(1), &mut surface);
        overlay.render(&sites(2), &mut surface);

        assert_eq!(surface.removed.len(), 10);
        assert_eq!(surface.markers.len(), 5);
        assert_eq!(surface.circles.len(), 5);
        assert!(surface.removed.iter().all(|id| id.0 <= 10));
        assert_eq!(surface.fitted.len(), 2);
    }

    #[test]
    fn test_fit_covers_every_site_with_padding() {
        let mut surface = RecordingSurface::default();
        let mut overlay = SiteOverlay::new();
        let sites = sites(4);
        overlay.render(&sites, &mut surface);

        let fitted = surface.fitted[0];
        let raw = surface.bounds_of(&surface.markers.keys().copied().collect::<Vec<_>>());
        let raw = raw.expect("markers placed");
        let (raw_lng, raw_lat) = raw.span();
        let (fit_lng, fit_lat) = fitted.span();
        assert!(fit_lng > raw_lng * 1.19);
        assert!(fit_lat > raw_lat * 1.19);
        for site in &sites {
            assert!(fitted.contains(site.location));
        }
    }

    #[test]
    fn test_sites_sharing_a_location_are_all_removed() {
        let mut surface = RecordingSurface::default();
        let mut overlay = SiteOverlay::new();
        let site = sites(6).remove(0);
        overlay.render(&[site.clone(), site], &mut surface);
        assert_eq!(overlay.len(), 2);
        assert_eq!(surface.markers.len(), 2);
        assert_eq!(surface.circles.len(), 2);

        overlay.render(&[], &mut surface);
        assert!(overlay.is_empty());
        assert_eq!(surface.markers.len(), 0);
        assert_eq!(surface.circles.len(), 0);
        assert_eq!(surface.removed.len(), 4);
    }

    #[test]
    fn test_empty_render_does_not_fit() {
        let mut surface = RecordingSurface::default();
        let mut overlay = SiteOverlay::new();
        overlay.render(&[], &mut surface);
        assert!(surface.fitted.is_empty());
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_severity_colours() {
        // area 350 / 200 / 120 from a constant lat/lng draw
        for (u, expected) in [(0.5, Severity::High), (0.2, Severity::Medium), (0.04, Severity::Low)] {
            let now = ManualClock::at_epoch().now();
            let sites = generate(Timeframe::Current, &mut ScriptedRandom::constant(u), now);
            assert_eq!(sites[0].severity, expected);
        }
        assert_eq!(severity_color(Severity::High), Color::Rgb(255, 0, 0));
        assert_eq!(severity_color(Severity::Medium), Color::Rgb(255, 165, 0));
        assert_eq!(severity_color(Severity::Low), Color::Rgb(255, 255, 0));
    }

    #[test]
    fn test_popup_lists_risk_factors() {
        let site = &sites(5)[0];
        let popup = site_popup(site);
        assert_eq!(popup.title, format!("{} - {} Alert", site.region_name, site.severity));
        assert!(popup.lines.iter().any(|l| l.starts_with("Habitat Loss: ")));
        assert!(popup.lines.iter().any(|l| l == &format!("Area: {} hectares", site.area)));
        assert_eq!(popup.lines.iter().filter(|l| l.ends_with("/5")).count(), 4);
    }
}
