use std::collections::BTreeMap;

use crate::processing::reshape::CorrectnessSeries;
use crate::state::theme::Theme;

/// Pass x n matrix of correctness flags. A cell is false if any run with
/// that (pass, n) disagreed with the reference.
#[derive(Debug, Default, PartialEq)]
pub struct CorrectnessGrid {
    pub passes: Vec<Option<u32>>,
    pub sizes: Vec<Option<u64>>,
    pub cells: BTreeMap<(Option<u32>, Option<u64>), bool>,
}

impl CorrectnessGrid {
    pub fn build(series: &CorrectnessSeries) -> Self {
        let mut cells: BTreeMap<(Option<u32>, Option<u64>), bool> = BTreeMap::new();
        for s in &series.rows {
            let ok = cells.entry((s.pass, s.n)).or_insert(true);
            *ok &= s.correct;
        }
        let mut passes: Vec<Option<u32>> = cells.keys().map(|(p, _)| *p).collect();
        passes.dedup();
        let mut sizes: Vec<Option<u64>> = cells.keys().map(|(_, n)| *n).collect();
        sizes.sort();
        sizes.dedup();
        Self { passes, sizes, cells }
    }
}

fn header_text<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn show_correctness(ui: &mut egui::Ui, series: &CorrectnessSeries, theme: &Theme) {
    if series.rows.is_empty() {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("No correctness data (no \"equivalent\" field).").italics())
        });
        return;
    }

    let failures = series.failures();
    let summary = format!("{} of {} runs disagree with the reference", failures, series.rows.len());
    let color = if failures == 0 { theme.pass_color() } else { theme.fail_color() };
    ui.label(egui::RichText::new(summary).strong().color(color));
    ui.add_space(6.0);

    let grid = CorrectnessGrid::build(series);
    egui::ScrollArea::both().show(ui, |ui| {
        egui::Grid::new("correctness_grid")
            .striped(true)
            .spacing(egui::vec2(18.0, 6.0))
            .show(ui, |ui| {
                ui.label(egui::RichText::new("pass \\ n").strong());
                for n in &grid.sizes {
                    ui.label(egui::RichText::new(header_text(*n)).strong());
                }
                ui.end_row();

                for pass in &grid.passes {
                    ui.label(egui::RichText::new(header_text(*pass)).strong());
                    for n in &grid.sizes {
                        match grid.cells.get(&(*pass, *n)) {
                            Some(true) => ui.colored_label(theme.pass_color(), "ok"),
                            Some(false) => ui.colored_label(theme.fail_color(), "FAIL"),
                            None => ui.label(""),
                        };
                    }
                    ui.end_row();
                }
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::reshape::CorrectnessSample;

    fn s(pass: u32, n: u64, correct: bool) -> CorrectnessSample {
        CorrectnessSample { pass: Some(pass), n: Some(n), correct }
    }

    #[test]
    fn any_failure_marks_the_cell() {
        let series = CorrectnessSeries {
            rows: vec![s(1, 4, true), s(1, 4, false), s(2, 8, true), s(1, 2, true)],
        };
        let grid = CorrectnessGrid::build(&series);
        assert_eq!(grid.passes, [Some(1), Some(2)]);
        assert_eq!(grid.sizes, [Some(2), Some(4), Some(8)]);
        assert_eq!(grid.cells[&(Some(1), Some(4))], false);
        assert_eq!(grid.cells[&(Some(2), Some(8))], true);
        assert!(!grid.cells.contains_key(&(Some(2), Some(2))));
    }
}
