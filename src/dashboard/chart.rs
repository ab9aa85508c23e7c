/// The operations the dashboard needs from a chart widget.
/// Changes are staged until `update` redraws.
pub trait ChartSurface {
    fn set_labels(&mut self, labels: Vec<String>);
    fn set_data(&mut self, data: Vec<f64>);
    fn update(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

/// Chart state drawn by the UI with ratatui's `Chart` or `BarChart`
#[derive(Debug, Clone)]
pub struct ChartModel {
    pub kind: ChartKind,
    pub title: &'static str,
    pub dataset_label: &'static str,
    staged_labels: Vec<String>,
    staged_data: Vec<f64>,
    labels: Vec<String>,
    data: Vec<f64>,
    revision: u64,
}

impl ChartModel {
    pub fn new(kind: ChartKind, title: &'static str, dataset_label: &'static str) -> Self {
        Self {
            kind,
            title,
            dataset_label,
            staged_labels: Vec::new(),
            staged_data: Vec::new(),
            labels: Vec::new(),
            data: Vec::new(),
            revision: 0,
        }
    }

    /// Bar chart with fixed category labels
    pub fn bar(title: &'static str, dataset_label: &'static str, categories: &[&str]) -> Self {
        let labels: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
        Self {
            staged_labels: labels.clone(),
            labels,
            ..Self::new(ChartKind::Bar, title, dataset_label)
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Number of redraws so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Largest data value, for axis bounds
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    pub fn min_value(&self) -> f64 {
        self.data.iter().copied().reduce(f64::min).unwrap_or(0.0)
    }
}

impl ChartSurface for ChartModel {
    fn set_labels(&mut self, labels: Vec<String>) {
        self.staged_labels = labels;
    }

    fn set_data(&mut self, data: Vec<f64>) {
        self.staged_data = data;
    }

    fn update(&mut self) {
        self.labels = self.staged_labels.clone();
        self.data = self.staged_data.clone();
        self.revision += 1;
    }
}
