use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph,
        Widget, Wrap,
    },
    Frame,
};

use crate::app::{App, Focus};
use crate::braille::BrailleCanvas;
use crate::dashboard::chart::ChartModel;
use crate::dashboard::counter::Trend;
use crate::map::{Control, ControlAction, MapLayers, MapStatus, MapView, PopupView};
use crate::monitor::MonitorState;
use crate::stats::with_commas;

const IMPACT_COLORS: [Color; 4] = [
    Color::Rgb(255, 99, 132),
    Color::Rgb(54, 162, 235),
    Color::Rgb(255, 206, 86),
    Color::Rgb(75, 192, 192),
];

/// Screen regions for every panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppLayout {
    pub detection_map: Rect,
    pub risk_map: Rect,
    pub stat_cards: Rect,
    pub trend_chart: Rect,
    pub impact_chart: Rect,
    pub detection_results: Rect,
    pub risk_results: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect) -> AppLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    let maps = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Stat cards
            Constraint::Min(6),    // Trend chart
            Constraint::Length(9), // Impact chart
            Constraint::Length(9), // Results
        ])
        .split(columns[1]);

    let results = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(side[3]);

    AppLayout {
        detection_map: maps[0],
        risk_map: maps[1],
        stat_cards: side[0],
        trend_chart: side[1],
        impact_chart: side[2],
        detection_results: results[0],
        risk_results: results[1],
        status_bar: rows[1],
    }
}

/// Drawable area of a bordered map panel
pub fn map_inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

fn control_text(control: &Control) -> String {
    format!(" {} [{}] ", control.label, control.key)
}

/// Button rectangles stacked down the top-right corner of a map
pub fn control_rects(inner: Rect, controls: &[Control]) -> Vec<(Rect, ControlAction)> {
    controls
        .iter()
        .enumerate()
        .filter_map(|(i, control)| {
            let width = control_text(control).chars().count() as u16;
            let row = i as u16;
            if width > inner.width || row >= inner.height {
                return None;
            }
            let rect = Rect::new(inner.right() - width, inner.y + row, width, 1);
            Some((rect, control.action))
        })
        .collect()
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let layout = compute_layout(frame.area());

    render_map(frame, &app.detection.view, layout.detection_map, app.focus == Focus::Detection);
    render_map(frame, &app.risk.view, layout.risk_map, app.focus == Focus::Risk);
    render_stat_cards(frame, app, layout.stat_cards);
    render_trend_chart(frame, &app.dashboard.trend_chart, layout.trend_chart);
    render_impact_chart(frame, &app.dashboard.impact_chart, layout.impact_chart);
    render_detection_results(frame, app, layout.detection_results);
    render_risk_results(frame, app, layout.risk_results);
    render_status_bar(frame, app, layout.status_bar);
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_map(frame: &mut Frame, view: &MapView, area: Rect, focused: bool) {
    let block = panel(view.title).border_style(Style::default().fg(if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    }));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match view.status() {
        MapStatus::Ready => {
            let layers = view.render_layers(inner.width as usize, inner.height as usize);
            let controls = control_rects(inner, view.controls())
                .into_iter()
                .zip(view.controls())
                .map(|((rect, _), control)| (rect, control_text(control)))
                .collect();
            frame.render_widget(MapWidget { layers, controls }, inner);
        }
        MapStatus::Loading => {
            let loading = Paragraph::new("Loading map...").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, inner);
        }
        MapStatus::Failed(message) => {
            let error = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(error, inner);
        }
    }
}

/// Braille map layers with markers, control buttons, and the open popup on top
struct MapWidget<'a> {
    layers: MapLayers<'a>,
    controls: Vec<(Rect, String)>,
}

impl MapWidget<'_> {
    /// Paint a braille canvas, using `default` where no shape set a colour
    fn render_canvas(canvas: &BrailleCanvas, default: Color, area: Rect, buf: &mut Buffer) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                if let Some((ch, color)) = canvas.cell(col, row) {
                    let (x, y) = (area.x + col as u16, area.y + row as u16);
                    buf[(x, y)].set_char(ch).set_fg(color.unwrap_or(default));
                }
            }
        }
    }

    fn render_popup(view: &PopupView<'_>, area: Rect, buf: &mut Buffer) {
        let popup = view.popup;
        let content_width = popup
            .lines
            .iter()
            .chain(std::iter::once(&popup.title))
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u16;
        let width = (content_width + 2).min(area.width);
        let height = (popup.lines.len() as u16 + 2).min(area.height);

        let (x, y) = match view.anchor {
            Some((ax, ay)) => {
                let right = area.x + ax + 2;
                let x = if right + width <= area.right() {
                    right
                } else {
                    (area.x + ax).saturating_sub(width + 1).max(area.x)
                };
                let y = (area.y + ay).min(area.bottom().saturating_sub(height));
                (x, y)
            }
            None => (area.x, area.bottom().saturating_sub(height)),
        };
        let rect = Rect::new(x, y, width, height);

        let lines: Vec<Line> = popup
            .lines
            .iter()
            .map(|l| Line::from(Span::styled(l.as_str(), Style::default().fg(Color::White))))
            .collect();

        Clear.render(rect, buf);
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(Span::styled(
                        popup.title.as_str(),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
            )
            .render(rect, buf);
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: basemap, circles, markers, controls, popup
        Self::render_canvas(&self.layers.basemap, Color::DarkGray, area, buf);
        Self::render_canvas(&self.layers.shapes, Color::White, area, buf);

        for &(col, row, color) in &self.layers.markers {
            let (x, y) = (area.x + col, area.y + row);
            if x < area.right() && y < area.bottom() {
                buf[(x, y)]
                    .set_char('●')
                    .set_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
            }
        }

        let button = Style::default().fg(Color::White).bg(Color::DarkGray);
        for (rect, text) in &self.controls {
            buf.set_string(rect.x, rect.y, text, button);
        }

        if let Some(popup) = &self.layers.popup {
            Self::render_popup(popup, area, buf);
        }
    }
}

fn render_stat_cards(frame: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    for (stat, rect) in app.dashboard.stat_cards().into_iter().zip(cards.iter()) {
        let trend = match stat.trend() {
            Some(trend @ Trend::Increasing) => Span::styled(trend.label(), Style::default().fg(Color::Red)),
            Some(trend @ Trend::Decreasing) => Span::styled(trend.label(), Style::default().fg(Color::Green)),
            None => Span::raw(""),
        };
        let body = Paragraph::new(vec![
            Line::from(Span::styled(
                stat.text(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(trend),
        ])
        .block(panel(stat.label));
        frame.render_widget(body, *rect);
    }
}

fn render_trend_chart(frame: &mut Frame, chart: &ChartModel, area: Rect) {
    let block = panel(chart.title);
    let points: Vec<(f64, f64)> = chart
        .data()
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect();

    if points.is_empty() {
        frame.render_widget(Paragraph::new("No data").block(block), area);
        return;
    }

    let (min, max) = (chart.min_value(), chart.max_value());
    let pad = ((max - min) * 0.1).max(1.0);
    let y_bounds = [(min - pad).max(0.0), max + pad];
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let x_labels = match chart.labels() {
        [] => Vec::new(),
        [only] => vec![only.clone()],
        [first, .., last] => vec![first.clone(), last.clone()],
    };
    let y_labels = vec![
        with_commas(y_bounds[0] as i64),
        with_commas(y_bounds[1] as i64),
    ];

    let dataset = Dataset::default()
        .name(chart.dataset_label)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points);

    let axis_style = Style::default().fg(Color::DarkGray);
    let widget = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels).style(axis_style))
        .y_axis(Axis::default().bounds(y_bounds).labels(y_labels).style(axis_style));

    frame.render_widget(widget, area);
}

fn render_impact_chart(frame: &mut Frame, chart: &ChartModel, area: Rect) {
    let bars: Vec<Bar> = chart
        .labels()
        .iter()
        .zip(chart.data())
        .enumerate()
        .map(|(i, (label, value))| {
            let color = IMPACT_COLORS[i % IMPACT_COLORS.len()];
            Bar::default()
                .value(value.round() as u64)
                .text_value(format!("{value:.0}"))
                .label(Line::from(label.as_str()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width.saturating_sub(3) / 4).max(1);

    let widget = BarChart::default()
        .block(panel(chart.title))
        .data(BarGroup::default().bars(&bars))
        .max(100)
        .bar_gap(1)
        .bar_width(bar_width);

    frame.render_widget(widget, area);
}

fn label_value(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn render_detection_results(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.dashboard.detection {
        Some(results) => vec![
            label_value("Total Affected Area", format!("{} hectares", with_commas(results.total_area as i64))),
            label_value("Confidence", format!("{:.1}%", results.confidence * 100.0)),
            label_value("Timestamp", results.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            label_value("Sites Detected", results.sites_detected.to_string()),
        ],
        None => vec![Line::from(Span::styled(
            "Press d to run detection",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let widget = Paragraph::new(lines)
        .block(panel("Detection Results"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_risk_results(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.dashboard.risk {
        Some(results) => {
            let mut lines = vec![Line::from(vec![
                Span::styled(format!("High {} ", results.high), Style::default().fg(Color::Red)),
                Span::styled(format!("Medium {} ", results.medium), Style::default().fg(Color::Rgb(255, 165, 0))),
                Span::styled(format!("Low {}", results.low), Style::default().fg(Color::Yellow)),
            ])];
            lines.extend(
                results
                    .factors
                    .iter()
                    .map(|f| Line::from(Span::styled(format!("• {f}"), Style::default().fg(Color::White)))),
            );
            lines
        }
        None => vec![Line::from(Span::styled(
            "Press r to map risk",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let widget = Paragraph::new(lines)
        .block(panel("Risk Assessment"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (state, state_color) = match app.monitor.state() {
        MonitorState::Monitoring => (" MONITORING ", Color::Red),
        MonitorState::Idle => (" IDLE ", Color::DarkGray),
    };
    let focus = match app.focus {
        Focus::Detection => "detection",
        Focus::Risk => "risk",
    };

    let last_cycle = app
        .history
        .latest()
        .map(|(at, _)| format!(" (last {})", at.format("%H:%M:%S")))
        .unwrap_or_default();

    let status = Line::from(vec![
        Span::styled(state, Style::default().fg(Color::Black).bg(state_color)),
        Span::styled(" Country: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.country.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" Range: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.time_range.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" Cycles: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.history.len().to_string(), Style::default().fg(Color::Magenta)),
        Span::styled(last_cycle, Style::default().fg(Color::DarkGray)),
        Span::styled(" Focus: ", Style::default().fg(Color::DarkGray)),
        Span::styled(focus, Style::default().fg(Color::Cyan)),
        Span::styled(
            " | d:detect r:risk m:monitor u:update c:country t:range Tab:focus p/x:popup hjkl:pan +/-:zoom q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
