use std::rc::Rc;

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use ratatui::layout::{Position, Rect};
use tracing::info;

use crate::clock::Clock;
use crate::dashboard::{Dashboard, RiskResults};
use crate::map::{Basemap, Control, ControlAction, MapInitError, MapSurface, MapView, SiteOverlay};
use crate::monitor::{DetectionHistory, MonitoringLoop};
use crate::rng::RandomSource;
use crate::site::{self, Timeframe};
use crate::stats::{generate_statistics, Country, TimeRange};
use crate::ui::{self, AppLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Detection,
    Risk,
}

/// One map widget plus the sites currently painted on it
pub struct MapPanel {
    pub view: MapView,
    pub overlay: SiteOverlay,
}

impl MapPanel {
    fn new(title: &'static str, area: Rect) -> Self {
        let inner = ui::map_inner(area);
        Self {
            view: MapView::new(title, inner.width as usize, inner.height as usize),
            overlay: SiteOverlay::new(),
        }
    }
}

/// Application state: everything one dashboard session mutates
pub struct App {
    pub detection: MapPanel,
    pub risk: MapPanel,
    pub dashboard: Dashboard,
    pub monitor: MonitoringLoop,
    pub history: DetectionHistory,
    pub country: Country,
    pub time_range: TimeRange,
    pub focus: Focus,
    pub layout: AppLayout,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    rng: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
}

impl App {
    pub fn new(
        width: u16,
        height: u16,
        basemap: Result<Basemap, MapInitError>,
        interval: TimeDelta,
        rng: Box<dyn RandomSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let layout = ui::compute_layout(Rect::new(0, 0, width, height));
        let mut detection = MapPanel::new("Deforestation Detection", layout.detection_map);
        let mut risk = MapPanel::new("Risk Mapping", layout.risk_map);

        let basemap = basemap.map(Rc::new);
        for panel in [&mut detection, &mut risk] {
            panel.view.init(basemap.as_ref().map(Rc::clone));
        }
        detection.view.add_control(Control {
            label: "Toggle Detection",
            key: 'd',
            action: ControlAction::ToggleDetection,
        });
        risk.view.add_control(Control {
            label: "Toggle Risk",
            key: 'r',
            action: ControlAction::ToggleRisk,
        });

        let mut app = Self {
            detection,
            risk,
            dashboard: Dashboard::new(),
            monitor: MonitoringLoop::new(interval),
            history: DetectionHistory::default(),
            country: Country::Brazil,
            time_range: TimeRange::TenYears,
            focus: Focus::Detection,
            layout,
            should_quit: false,
            last_mouse: None,
            rng,
            clock,
        };
        app.update_stats();
        app
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Recompute panel geometry when the terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.layout = ui::compute_layout(Rect::new(0, 0, width, height));
        let det = ui::map_inner(self.layout.detection_map);
        let risk = ui::map_inner(self.layout.risk_map);
        self.detection.view.resize(det.width as usize, det.height as usize);
        self.risk.view.resize(risk.width as usize, risk.height as usize);
    }

    /// Generate current sites and paint them on the detection map
    pub fn toggle_detection(&mut self) {
        let now = self.now();
        let sites = site::generate(Timeframe::Current, self.rng.as_mut(), now);
        self.detection.overlay.render(&sites, &mut self.detection.view);
        self.dashboard.update_detection_results(&sites, now);
        info!(sites = sites.len(), "detection run");
    }

    /// Paint a historical site set on the risk map and refresh risk counts
    pub fn toggle_risk_mapping(&mut self) {
        let now = self.now();
        let sites = site::generate(Timeframe::Historical, self.rng.as_mut(), now);
        self.risk.overlay.render(&sites, &mut self.risk.view);
        let results = RiskResults::generate(self.rng.as_mut());
        info!(high = results.high, medium = results.medium, low = results.low, "risk mapping run");
        self.dashboard.update_risk_results(results);
    }

    pub fn start_monitoring(&mut self) {
        let now = self.now();
        if self.monitor.start(now) {
            self.perform_detection(now);
        }
    }

    pub fn stop_monitoring(&mut self) {
        self.monitor.stop();
    }

    pub fn toggle_monitoring(&mut self) {
        if self.monitor.is_monitoring() {
            self.stop_monitoring();
        } else {
            self.start_monitoring();
        }
    }

    /// One monitoring cycle: detect, paint, refresh analytics, record
    fn perform_detection(&mut self, now: DateTime<Utc>) {
        let sites = site::generate(Timeframe::Current, self.rng.as_mut(), now);
        self.detection.overlay.render(&sites, &mut self.detection.view);
        self.dashboard.update_detection_results(&sites, now);
        self.update_stats();
        self.history.record(now, sites);
        info!(cycles = self.history.len(), "monitoring cycle");
    }

    /// Regenerate statistics for the selected country and range
    pub fn update_stats(&mut self) {
        let now = self.now();
        let stats = generate_statistics(self.country, self.time_range, self.rng.as_mut(), now.year());
        self.dashboard.render_stats(&stats, now);
    }

    pub fn cycle_country(&mut self) {
        self.country = self.country.next();
        self.update_stats();
    }

    pub fn cycle_time_range(&mut self) {
        self.time_range = self.time_range.next();
        self.update_stats();
    }

    /// Advance timers: due monitoring cycles and stat animations
    pub fn tick(&mut self) {
        let now = self.now();
        if self.monitor.poll(now) {
            self.perform_detection(now);
        }
        self.dashboard.advance(now);
    }

    pub fn handle_control(&mut self, action: ControlAction) {
        match action {
            ControlAction::ToggleDetection => self.toggle_detection(),
            ControlAction::ToggleRisk => self.toggle_risk_mapping(),
        }
    }

    /// Fire the map control bound to `key`, if any
    pub fn control_key(&mut self, key: char) -> bool {
        let action = self
            .detection
            .view
            .controls()
            .iter()
            .chain(self.risk.view.controls())
            .find(|c| c.key == key)
            .map(|c| c.action);
        if let Some(action) = action {
            self.handle_control(action);
        }
        action.is_some()
    }

    pub fn focused_view_mut(&mut self) -> &mut MapView {
        match self.focus {
            Focus::Detection => &mut self.detection.view,
            Focus::Risk => &mut self.risk.view,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Detection => Focus::Risk,
            Focus::Risk => Focus::Detection,
        };
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.focused_view_mut().viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.focused_view_mut().viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.focused_view_mut().viewport.zoom_out();
    }

    pub fn cycle_popup(&mut self) {
        self.focused_view_mut().cycle_popup();
    }

    pub fn close_popup(&mut self) {
        self.focused_view_mut().close_popup();
    }

    /// Which map (if any) covers a terminal cell
    fn map_at(&self, col: u16, row: u16) -> Option<Focus> {
        let pos = Position::new(col, row);
        if self.layout.detection_map.contains(pos) {
            Some(Focus::Detection)
        } else if self.layout.risk_map.contains(pos) {
            Some(Focus::Risk)
        } else {
            None
        }
    }

    /// Terminal cell → braille pixel inside the focused map
    fn map_pixel(&self, col: u16, row: u16) -> (i32, i32) {
        let area = match self.focus {
            Focus::Detection => self.layout.detection_map,
            Focus::Risk => self.layout.risk_map,
        };
        let inner = ui::map_inner(area);
        let px = (col.saturating_sub(inner.x) as i32) * 2;
        let py = (row.saturating_sub(inner.y) as i32) * 4;
        (px, py)
    }

    /// Left click: fire a control button, otherwise focus the map and begin a drag
    pub fn click(&mut self, col: u16, row: u16) {
        let pos = Position::new(col, row);
        let hit = [
            (self.layout.detection_map, &self.detection.view),
            (self.layout.risk_map, &self.risk.view),
        ]
        .into_iter()
        .flat_map(|(area, view)| ui::control_rects(ui::map_inner(area), view.controls()))
        .find(|(rect, _)| rect.contains(pos))
        .map(|(_, action)| action);

        if let Some(action) = hit {
            self.handle_control(action);
            return;
        }

        if let Some(focus) = self.map_at(col, row) {
            self.focus = focus;
            self.last_mouse = Some((col, row));
        }
    }

    pub fn zoom_at(&mut self, col: u16, row: u16, zoom_in: bool) {
        let Some(focus) = self.map_at(col, row) else {
            return;
        };
        self.focus = focus;
        let (px, py) = self.map_pixel(col, row);
        let viewport = &mut self.focused_view_mut().viewport;
        if zoom_in {
            viewport.zoom_in_at(px, py);
        } else {
            viewport.zoom_out_at(px, py);
        }
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            self.pan(dx * 2, dy * 4);
        }
        self.last_mouse = Some((col, row));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::map::{load_basemap, MapStatus};
    use crate::monitor::MonitorState;
    use crate::rng::SeededRandom;
    use std::path::Path;

    fn app_with(clock: &ManualClock, basemap: Result<Basemap, MapInitError>) -> App {
        App::new(
            160,
            48,
            basemap,
            TimeDelta::seconds(30),
            Box::new(SeededRandom::from_seed(11)),
            Box::new(clock.clone()),
        )
    }

    fn app(clock: &ManualClock) -> App {
        app_with(clock, load_basemap(None))
    }

    #[test]
    fn test_startup_renders_stats_once() {
        let clock = ManualClock::at_epoch();
        let mut app = app(&clock);
        assert_eq!(app.dashboard.trend_chart.revision(), 1);
        assert_eq!(app.dashboard.trend_chart.labels().len(), 10);
        assert_eq!(app.detection.view.controls().len(), 1);

        clock.advance(TimeDelta::seconds(2));
        app.tick();
        assert!(app.dashboard.total_area.displayed() > 0);
    }

    #[test]
    fn test_detection_toggle_paints_map() {
        let clock = ManualClock::at_epoch();
        let mut app = app(&clock);
        assert!(app.control_key('d'));
        assert_eq!(app.detection.view.marker_count(), 5);
        assert_eq!(app.detection.view.circle_count(), 5);
        assert_eq!(app.dashboard.detection.as_ref().map(|d| d.sites_detected), Some(5));

        app.toggle_detection();
        assert_eq!(app.detection.view.marker_count(), 5);
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_popup_follows_focus() {
        let clock = ManualClock::at_epoch();
        let mut app = app(&clock);
        app.toggle_detection();
        app.cycle_popup();
        assert!(app.detection.view.open_popup().is_some());

        app.toggle_focus();
        app.cycle_popup();
        assert!(app.risk.view.open_popup().is_none());

        app.toggle_focus();
        app.close_popup();
        assert!(app.detection.view.open_popup().is_none());
    }

    #[test]
    fn test_risk_toggle_uses_risk_map() {
        let clock = ManualClock::at_epoch();
        let mut app = app(&clock);
        app.handle_control(ControlAction::ToggleRisk);
        assert_eq!(app.risk.view.marker_count(), 5);
        assert_eq!(app.detection.view.marker_count(), 0);
        assert!(app.dashboard.risk.is_some());
    }

    #[test]
    fn test_monitoring_cycles_on_virtual_clock() {
        let clock = ManualClock::at_epoch();
        let mut app = app(&clock);

        app.start_monitoring();
        assert_eq!(app.monitor.state(), MonitorState::Monitoring);
        assert_eq!(app.history.len(), 1);

        app.start_monitoring();
        assert_eq!(app.history.len(), 1);

        for _ in 0..3 {
            clock.advance(TimeDelta::seconds(30));
            app.tick();
        }
        assert_eq!(app.history.len(), 4);
        assert_eq!(app.detection.view.marker_count(), 5);

        app.toggle_monitoring();
        assert_eq!(app.monitor.state(), MonitorState::Idle);
        clock.advance(TimeDelta::minutes(10));
        app.tick();
        assert_eq!(app.history.len(), 4);

        app.stop_monitoring();
        assert_eq!(app.monitor.state(), MonitorState::Idle);
    }

    #[test]
    fn test_failed_maps_keep_dashboard_alive() {
        let clock = ManualClock::at_epoch();
        let mut app = app_with(&clock, load_basemap(Some(Path::new("/no/such/map/data"))));

        assert!(matches!(app.detection.view.status(), MapStatus::Failed(_)));
        assert!(matches!(app.risk.view.status(), MapStatus::Failed(_)));
        assert!(!app.control_key('d'));

        app.toggle_detection();
        assert_eq!(app.detection.view.marker_count(), 0);
        assert!(app.dashboard.detection.is_some());

        app.cycle_country();
        assert_eq!(app.country, Country::Indonesia);
        assert_eq!(app.dashboard.trend_chart.revision(), 2);
    }

    #[test]
    fn test_click_on_control_fires_it() {
        let clock = ManualClock::at_epoch();
        let mut app = app(&clock);
        let inner = ui::map_inner(app.layout.risk_map);
        let (rect, action) = ui::control_rects(inner, app.risk.view.controls())[0];
        assert_eq!(action, ControlAction::ToggleRisk);

        app.click(rect.x + 1, rect.y);
        assert_eq!(app.risk.view.marker_count(), 5);
        assert!(app.last_mouse.is_none());
    }

    #[test]
    fn test_click_on_map_moves_focus() {
        let clock = ManualClock::at_epoch();
        let mut app = app(&clock);
        let inner = ui::map_inner(app.layout.risk_map);
        app.click(inner.x + 1, inner.y + inner.height - 1);
        assert_eq!(app.focus, Focus::Risk);
        assert!(app.last_mouse.is_some());

        let zoom = app.risk.view.viewport.zoom;
        app.zoom_at(inner.x + 2, inner.y + 2, true);
        assert!(app.risk.view.viewport.zoom > zoom);
    }
}
