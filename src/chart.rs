//! Balance chart lifecycle
//!
//! A [`ChartHandle`] is the data behind the one chart on screen. The renderer
//! takes the previous handle by value and disposes it before building the
//! next one, so at most one chart is ever live.

use crate::calc::BalanceSeries;

/// Legend and tooltip label of the balance dataset
pub const DATASET_LABEL: &str = "Balance with compound interest";

/// Headroom above the largest balance on the y axis
const Y_HEADROOM: f64 = 1.05;

/// Most x labels drawn before falling back to evenly spaced ticks
const MAX_X_LABELS: usize = 11;

/// Samples of the area drawn under the line
const FILL_SAMPLES: usize = 240;

/// A rendered balance chart
#[derive(Debug)]
pub struct ChartHandle {
    id: u64,
    labels: Vec<String>,
    balances: Vec<f64>,
    points: Vec<(f64, f64)>,  // Finite balances only, (year, balance)
    fill: Vec<(f64, f64)>,
    y_max: f64,
    currency: String,
    selected: usize,
}

impl ChartHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// X labels "0" through the number of years
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Line interpolated densely enough to shade the area beneath it
    pub fn fill_points(&self) -> &[(f64, f64)] {
        &self.fill
    }

    pub fn years(&self) -> usize {
        self.balances.len().saturating_sub(1)
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, self.years().max(1) as f64]
    }

    /// The y axis always starts at zero
    pub fn y_bounds(&self) -> [f64; 2] {
        [0.0, self.y_max]
    }

    /// Evenly spaced x labels that fit on an axis
    pub fn axis_labels(&self) -> Vec<String> {
        let labels = self.labels();
        if labels.len() <= MAX_X_LABELS {
            return labels.to_vec();
        }

        let years = self.years();
        let ticks = (2..MAX_X_LABELS)
            .rev()
            .find(|t| years % t == 0)
            .unwrap_or(1);
        let step = years / ticks;
        (0..=ticks).map(|i| labels[i * step].clone()).collect()
    }

    /// Y labels at zero, the midpoint and the top of the axis
    pub fn y_labels(&self) -> Vec<String> {
        [0.0, self.y_max / 2.0, self.y_max]
            .iter()
            .map(|v| format!("{}{:.0}", self.currency, v))
            .collect()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The highlighted point as a one-element slice, empty if it overflowed
    pub fn selected_point(&self) -> &[(f64, f64)] {
        let x = self.selected() as f64;
        match self.points.iter().position(|p| p.0 == x) {
            Some(i) => &self.points[i..=i],
            None => &[],
        }
    }

    pub fn select_next(&mut self) {
        if self.selected < self.years() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.years();
    }

    /// Tooltip text for the highlighted point
    pub fn tooltip(&self) -> String {
        let balance = self.balances.get(self.selected()).copied().unwrap_or_default();
        format!("{}: {}{:.2}", DATASET_LABEL, self.currency, balance)
    }
}

/// Creates and disposes chart handles
#[derive(Debug, Default)]
pub struct ChartRenderer {
    next_id: u64,
    live: usize,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispose `previous` and build a chart for `series`
    pub fn render(
        &mut self,
        previous: Option<ChartHandle>,
        series: &BalanceSeries,
        years: u32,
        currency: &str,
    ) -> ChartHandle {
        if let Some(old) = previous {
            self.dispose(old);
        }

        let balances = series.as_slice().to_vec();
        let labels = (0..balances.len()).map(|i| i.to_string()).collect();
        let points = balances
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_finite())
            .map(|(i, b)| (i as f64, *b))
            .collect();

        let y_max = match series.max_finite() * Y_HEADROOM {
            m if m > 0.0 && m.is_finite() => m,
            _ => 1.0,
        };

        self.next_id += 1;
        self.live += 1;
        let handle = ChartHandle {
            id: self.next_id,
            labels,
            selected: balances.len().saturating_sub(1),
            fill: fill_points(&balances),
            balances,
            points,
            y_max,
            currency: currency.to_string(),
        };
        tracing::debug!(id = handle.id, years, "Chart rendered");
        handle
    }

    pub fn dispose(&mut self, handle: ChartHandle) {
        self.live = self.live.saturating_sub(1);
        tracing::debug!(id = handle.id, "Chart disposed");
    }

    /// Charts rendered and not yet disposed
    pub fn live(&self) -> usize {
        self.live
    }
}

fn fill_points(balances: &[f64]) -> Vec<(f64, f64)> {
    let years = balances.len().saturating_sub(1);
    if years == 0 {
        return Vec::new();
    }

    (0..=FILL_SAMPLES)
        .filter_map(|s| {
            let x = years as f64 * s as f64 / FILL_SAMPLES as f64;
            let lo = (x.floor() as usize).min(years);
            let hi = (lo + 1).min(years);
            let t = x - lo as f64;
            let y = balances[lo] + (balances[hi] - balances[lo]) * t;
            y.is_finite().then_some((x, y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::{balance_series, FormInputs};

    fn series(years: u32) -> BalanceSeries {
        balance_series(&FormInputs {
            initial_balance: 1000.0,
            deposit: 0.0,
            rate: 0.05,
            periods_per_year: 1,
            years,
        })
        .unwrap()
    }

    #[test]
    fn test_render_replaces_previous_chart() {
        let mut renderer = ChartRenderer::new();

        let first = renderer.render(None, &series(1), 1, "€");
        assert_eq!(renderer.live(), 1);

        let second = renderer.render(Some(first), &series(3), 3, "€");
        assert_eq!(renderer.live(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(second.years(), 3);
    }

    #[test]
    fn test_labels_and_bounds() {
        let mut renderer = ChartRenderer::new();
        let chart = renderer.render(None, &series(3), 3, "€");

        assert_eq!(chart.labels(), &["0", "1", "2", "3"]);
        assert_eq!(chart.points().len(), 4);
        assert_eq!(chart.x_bounds(), [0.0, 3.0]);
        assert_eq!(chart.y_bounds()[0], 0.0);
        assert!(chart.y_bounds()[1] > chart.points()[3].1);
    }

    #[test]
    fn test_fill_follows_line() {
        let mut renderer = ChartRenderer::new();
        let chart = renderer.render(None, &series(2), 2, "€");
        let fill = chart.fill_points();

        assert_eq!(fill.len(), FILL_SAMPLES + 1);
        assert_eq!(fill[0], (0.0, 1000.0));
        let last = fill[FILL_SAMPLES];
        assert_eq!(last.0, 2.0);
        assert!((last.1 - 1102.5).abs() < 1e-9);
        // Halfway through year one sits between both balances
        let mid = fill[FILL_SAMPLES / 4];
        assert!((mid.1 - 1025.0).abs() < 1e-9);
    }

    #[test]
    fn test_axis_labels_are_evenly_spaced() {
        let mut renderer = ChartRenderer::new();

        let chart = renderer.render(None, &series(30), 30, "€");
        assert_eq!(chart.axis_labels(), vec!["0", "3", "6", "9", "12", "15", "18", "21", "24", "27", "30"]);

        let chart = renderer.render(Some(chart), &series(37), 37, "€");
        assert_eq!(chart.axis_labels(), vec!["0", "37"]);

        let chart = renderer.render(Some(chart), &series(8), 8, "€");
        assert_eq!(chart.axis_labels().len(), 9);
    }

    #[test]
    fn test_tooltip_formats_selected_balance() {
        let mut renderer = ChartRenderer::new();
        let mut chart = renderer.render(None, &series(1), 1, "€");

        assert_eq!(chart.selected(), 1);
        assert_eq!(chart.tooltip(), "Balance with compound interest: €1050.00");

        chart.select_previous();
        assert_eq!(chart.tooltip(), "Balance with compound interest: €1000.00");
        assert_eq!(chart.selected_point(), &[(0.0, 1000.0)]);

        chart.select_previous();
        assert_eq!(chart.selected(), 0);
        chart.select_last();
        chart.select_next();
        assert_eq!(chart.selected(), 1);
    }

    #[test]
    fn test_overflowed_points_are_not_plotted() {
        let overflowing = balance_series(&FormInputs {
            initial_balance: 1000.0,
            deposit: 1.0,
            rate: 1.0e4,
            periods_per_year: 365,
            years: 2,
        })
        .unwrap();
        let mut renderer = ChartRenderer::new();
        let chart = renderer.render(None, &overflowing, 2, "$");

        assert_eq!(chart.points(), &[(0.0, 1000.0)]);
        assert!(chart.selected_point().is_empty());
        assert_eq!(chart.tooltip(), "Balance with compound interest: $inf");
    }
}
