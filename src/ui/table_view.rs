use crate::data::table::TableSource;
use crate::state::app_state::{AppState, SortDirection};

/// Row order for the current sort state. Non-numeric cells always go last.
pub fn sorted_rows(table: &dyn TableSource, sort: Option<(usize, SortDirection)>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..table.row_count()).collect();
    if let Some((col, dir)) = sort {
        indices.sort_by(|&a, &b| {
            let (va, vb) = (table.sort_value(a, col), table.sort_value(b, col));
            let by_value = match dir {
                SortDirection::Ascending => va.total_cmp(&vb),
                SortDirection::Descending => vb.total_cmp(&va),
            };
            va.is_nan().cmp(&vb.is_nan()).then(by_value)
        });
    }
    indices
}

/// Scrollable, sortable table for any derived series.
pub fn show_table(ui: &mut egui::Ui, table: &dyn TableSource, state: &mut AppState, empty_text: &str) {
    if table.is_empty() {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| ui.label(empty_text));
        return;
    }

    use egui_extras::{Column, TableBuilder};

    let headers = table.column_names();
    let current_sort = state.table_sort;
    let order = sorted_rows(table, current_sort);

    let clicked_col: std::cell::Cell<Option<usize>> = std::cell::Cell::new(None);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(80.0), headers.len())
        .min_scrolled_height(300.0)
        .header(20.0, |mut header| {
            for (col, name) in headers.iter().enumerate() {
                header.col(|ui| {
                    let arrow = match current_sort {
                        Some((c, SortDirection::Ascending)) if c == col => " ^",
                        Some((c, SortDirection::Descending)) if c == col => " v",
                        _ => "",
                    };
                    if ui.button(format!("{name}{arrow}")).clicked() {
                        clicked_col.set(Some(col));
                    }
                });
            }
        })
        .body(|body| {
            body.rows(18.0, order.len(), |mut row| {
                let source_row = order[row.index()];
                for col in 0..headers.len() {
                    row.col(|ui| {
                        ui.label(table.cell_text(source_row, col));
                    });
                }
            });
        });

    if let Some(col) = clicked_col.get() {
        state.cycle_sort(col);
    }
}
