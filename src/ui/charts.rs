use std::ops::RangeInclusive;

use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points};

use crate::data::schema::Metric;
use crate::processing::aggregate::Aggregate;
use crate::processing::pipeline::Dataset;
use crate::processing::reshape::LongSeries;
use crate::state::theme::color_for_index;

/// Horizontal room shared by one group of bars.
const GROUP_WIDTH: f64 = 0.8;

/// Position of a matrix size on the log2 x axis. Sizes of zero have no place
/// on a log scale.
pub fn log2_x(n: u64) -> Option<f64> {
    (n > 0).then(|| (n as f64).log2())
}

/// Tick label for a log2 axis: whole exponents show the size itself.
pub fn pow2_label(x: f64) -> String {
    if (x - x.round()).abs() < 1e-9 && (0.0..63.0).contains(&x) {
        format!("{}", 1u64 << (x.round() as u32))
    } else {
        String::new()
    }
}

/// (log2 n, value) points of one algorithm in one pass, ordered by n.
pub fn pass_points(series: &LongSeries, pass: u32, algorithm: &str) -> Vec<[f64; 2]> {
    let mut points: Vec<[f64; 2]> = series
        .for_pass(pass)
        .filter(|s| s.algorithm == algorithm)
        .filter_map(|s| Some([log2_x(s.n?)?, s.value]))
        .collect();
    points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    points
}

/// One bar: category slot, mean, std (NaN when undefined).
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub x: f64,
    pub mean: f64,
    pub std: f64,
}

/// Place grouped bars: one slot per key, algorithms side by side within it.
/// Returns the keys (slot order) and the bars of every algorithm.
pub fn grouped_bars(aggregate: &Aggregate, algorithms: &[String]) -> (Vec<u64>, Vec<(String, Vec<BarSpec>)>) {
    let keys: Vec<u64> = aggregate.keys().into_iter().flatten().collect();
    let count = algorithms.len().max(1) as f64;
    let bar_width = GROUP_WIDTH / count;

    let groups = algorithms
        .iter()
        .enumerate()
        .map(|(i, alg)| {
            let offset = -GROUP_WIDTH / 2.0 + bar_width * (i as f64 + 0.5);
            let bars = keys
                .iter()
                .enumerate()
                .filter_map(|(slot, &key)| {
                    aggregate.get(key, alg).map(|stat| BarSpec {
                        x: slot as f64 + offset,
                        mean: stat.mean,
                        std: stat.std,
                    })
                })
                .collect();
            (alg.clone(), bars)
        })
        .collect();
    (keys, groups)
}

fn empty_state(ui: &mut egui::Ui, text: &str) {
    ui.add_space(40.0);
    ui.vertical_centered(|ui| ui.label(egui::RichText::new(text).italics()));
}

/// Per-algorithm line chart of one metric for one pass, x on a log2 scale.
pub fn show_pass_chart(ui: &mut egui::Ui, dataset: &Dataset, metric: Metric, pass: Option<u32>) {
    let series = &dataset.metric(metric).long;
    let Some(pass) = pass else {
        empty_state(ui, &format!("No {} data to plot.", metric.title().to_lowercase()));
        return;
    };

    Plot::new(("pass_chart", metric))
        .legend(Legend::default())
        .x_axis_label("n")
        .y_axis_label(metric.axis_label())
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| pow2_label(mark.value))
        .label_formatter(|name: &str, value: &PlotPoint| {
            let n = 2f64.powf(value.x).round();
            if name.is_empty() {
                format!("n = {n}\ny = {:.6}", value.y)
            } else {
                format!("{name}\nn = {n}\ny = {:.6}", value.y)
            }
        })
        .show(ui, |plot_ui| {
            for alg in &dataset.algorithms {
                let points = pass_points(series, pass, alg);
                if points.is_empty() {
                    continue;
                }
                let color = color_for_index(dataset.algorithm_index(alg));
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(alg)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(alg)
                        .color(color)
                        .radius(3.5),
                );
            }
        });
}

/// Mean per pass as one line per algorithm.
pub fn show_by_pass_chart(ui: &mut egui::Ui, dataset: &Dataset, metric: Metric) {
    let aggregate = &dataset.metric(metric).by_pass;
    ui.heading(format!("Avg {} vs pass", metric.title()));
    if aggregate.is_empty() {
        empty_state(ui, "Nothing to average.");
        return;
    }

    Plot::new(("by_pass_chart", metric))
        .legend(Legend::default())
        .x_axis_label("pass")
        .y_axis_label(metric.axis_label())
        .show(ui, |plot_ui| {
            for alg in &dataset.algorithms {
                let points: Vec<[f64; 2]> = aggregate
                    .rows
                    .iter()
                    .filter(|r| &r.algorithm == alg)
                    .filter_map(|r| Some([r.key? as f64, r.mean]))
                    .collect();
                if points.is_empty() {
                    continue;
                }
                let color = color_for_index(dataset.algorithm_index(alg));
                plot_ui.line(Line::new(PlotPoints::from(points.clone())).name(alg).color(color));
                plot_ui.points(Points::new(PlotPoints::from(points)).name(alg).color(color).radius(3.0));
            }
        });
}

/// Grouped bars of the mean per n, with +/- one std whiskers.
pub fn show_size_bars(ui: &mut egui::Ui, dataset: &Dataset, metric: Metric) {
    let aggregate = &dataset.metric(metric).by_size;
    ui.heading(format!("Avg {} vs n", metric.title()));
    if aggregate.is_empty() {
        empty_state(ui, "Nothing to average.");
        return;
    }

    let (keys, groups) = grouped_bars(aggregate, &dataset.algorithms);
    let bar_width = GROUP_WIDTH / dataset.algorithms.len().max(1) as f64;
    let tick_keys = keys.clone();

    Plot::new(("size_bars", metric))
        .legend(Legend::default())
        .x_axis_label("n")
        .y_axis_label(metric.axis_label())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() > 1e-9 || slot < 0.0 {
                return String::new();
            }
            tick_keys
                .get(slot as usize)
                .map(|k| k.to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (alg, bars) in &groups {
                let color = color_for_index(dataset.algorithm_index(alg));
                let chart_bars: Vec<Bar> = bars
                    .iter()
                    .map(|b| Bar::new(b.x, b.mean).width(bar_width * 0.95).fill(color))
                    .collect();
                plot_ui.bar_chart(BarChart::new(chart_bars).name(alg).color(color));

                for b in bars.iter().filter(|b| b.std.is_finite()) {
                    let low = (b.mean - b.std).max(0.0);
                    let high = b.mean + b.std;
                    plot_ui.line(
                        Line::new(PlotPoints::from(vec![[b.x, low], [b.x, high]]))
                            .color(whisker_color(color))
                            .width(1.5),
                    );
                }
            }
        });
}

fn whisker_color(color: egui::Color32) -> egui::Color32 {
    color.gamma_multiply(0.6)
}
