use eframe::egui;

use crate::data::export;
use crate::data::schema::{BenchmarkSchema, Metric, WarmupPolicy};
use crate::data::table::TableSource;
use crate::processing::pipeline::Dataset;
use crate::state::app_state::{AppState, Tab};
use crate::ui::{charts, correctness_view, table_view};

/// The main benchmark viewer window.
pub struct BenchPlotApp {
    pub state: AppState,
    /// Loaded once per file; never mutated by the UI.
    pub dataset: Dataset,
    pub schema: BenchmarkSchema,
    /// Last error from reloading or exporting, shown until dismissed.
    pub error_message: Option<String>,
}

impl BenchPlotApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        dataset: Dataset,
        schema: BenchmarkSchema,
        zoom_factor: f32,
    ) -> Self {
        let mut state = AppState::new();
        state.sync_passes(&dataset.passes);

        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.5));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(20.0));
        style.text_styles.insert(egui::TextStyle::Monospace, egui::FontId::monospace(13.5));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        ctx.set_style(style);
        ctx.set_visuals(state.theme.visuals());
        ctx.set_zoom_factor(zoom_factor);

        Self { state, dataset, schema, error_message: None }
    }

    /// Replace the dataset with another file. On failure the current
    /// dataset stays and the error is shown.
    fn reload(&mut self, path: &std::path::Path) {
        match Dataset::load(path, &self.schema) {
            Ok(dataset) => {
                self.dataset = dataset;
                self.state.sync_passes(&self.dataset.passes);
                self.state.table_sort = None;
                self.error_message = None;
            }
            Err(e) => {
                tracing::error!("Failed to load {:?}: {e}", path);
                self.error_message = Some(format!("Failed to load {}: {e}", path.display()));
            }
        }
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Benchmark JSON", &["json"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.reload(&path);
        }
    }

    /// Table backing the active tab, used for export.
    fn active_table(&self) -> &dyn TableSource {
        let metric = self.state.table_metric;
        match self.state.active_tab {
            Tab::Time => &self.dataset.time.long,
            Tab::Memory => &self.dataset.memory.long,
            Tab::AvgByPass => &self.dataset.metric(metric).by_pass,
            Tab::AvgBySize => &self.dataset.metric(metric).by_size,
            Tab::Stats => &self.dataset.metric(metric).stats,
            Tab::Correctness => &self.dataset.correctness,
            Tab::RawData => &self.dataset.raw_view,
        }
    }

    fn export_active_table(&mut self) {
        let name = format!("{}.csv", self.state.active_tab.label().replace([' ', '(', ')'], "_"));
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&name)
            .add_filter("CSV Files", &["csv"])
            .save_file()
        else {
            return;
        };
        if let Err(e) = export::export_csv(self.active_table(), &path) {
            tracing::error!("{e}");
            self.error_message = Some(e.to_string());
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open...").clicked() {
                        ui.close_menu();
                        self.open_file_dialog();
                    }
                    if ui.button("Export table as CSV...").clicked() {
                        ui.close_menu();
                        self.export_active_table();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    let next = self.state.theme.toggle();
                    if ui.button(format!("{} theme", next.label())).clicked() {
                        self.state.theme = next;
                        ui.close_menu();
                    }
                    ui.checkbox(&mut self.state.show_warnings, "Show data warnings");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(path) = &self.dataset.source {
                        ui.weak(path.display().to_string());
                    }
                });
            });
        });
    }

    fn show_tab_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("tab_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                for tab in Tab::ALL {
                    if ui
                        .selectable_label(self.state.active_tab == tab, tab.label())
                        .clicked()
                    {
                        self.state.set_tab(tab);
                    }
                }
            });
        });
    }

    fn show_messages(&mut self, ctx: &egui::Context) {
        let theme = self.state.theme;
        let show_warnings = self.state.show_warnings && !self.dataset.warnings.is_empty();
        if self.error_message.is_none() && !show_warnings {
            return;
        }
        egui::TopBottomPanel::bottom("messages").show(ctx, |ui| {
            if let Some(err) = self.error_message.clone() {
                ui.horizontal(|ui| {
                    ui.colored_label(theme.fail_color(), err);
                    if ui.small_button("Dismiss").clicked() {
                        self.error_message = None;
                    }
                });
            }
            if show_warnings {
                egui::CollapsingHeader::new(format!("{} data warnings", self.dataset.warnings.len()))
                    .default_open(false)
                    .show(ui, |ui| {
                        for w in &self.dataset.warnings {
                            ui.colored_label(theme.warning_color(), w.to_string());
                        }
                    });
            }
        });
    }

    fn pass_selector(&mut self, ui: &mut egui::Ui, metric: Metric) {
        let passes = self.dataset.passes.clone();
        let selected = self.state.selected_pass_mut(metric);
        let text = selected.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        ui.horizontal(|ui| {
            ui.label("Pass:");
            egui::ComboBox::from_id_salt(("pass_select", metric))
                .selected_text(text)
                .show_ui(ui, |ui| {
                    for pass in passes {
                        ui.selectable_value(selected, Some(pass), pass.to_string());
                    }
                });
        });
    }

    fn metric_selector(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Table metric:");
            for metric in Metric::ALL {
                if ui
                    .selectable_label(self.state.table_metric == metric, metric.axis_label())
                    .clicked()
                    && self.state.table_metric != metric
                {
                    self.state.table_metric = metric;
                    self.state.table_sort = None;
                }
            }
        });
    }

    fn show_metric_tab(&mut self, ui: &mut egui::Ui, metric: Metric) {
        self.pass_selector(ui, metric);
        let pass = self.state.selected_pass(metric);
        let title = match pass {
            Some(p) => format!("{} vs 2^[n] Matrix Size (pass {p})", metric.title()),
            None => format!("{} vs 2^[n] Matrix Size", metric.title()),
        };
        ui.heading(title);
        charts::show_pass_chart(ui, &self.dataset, metric, pass);
    }

    fn show_side_by_side(&mut self, ui: &mut egui::Ui, draw: fn(&mut egui::Ui, &Dataset, Metric)) {
        self.metric_selector(ui);
        let dataset = &self.dataset;
        ui.columns(2, |cols| {
            draw(&mut cols[0], dataset, Metric::Time);
            draw(&mut cols[1], dataset, Metric::Memory);
        });
    }
}

impl eframe::App for BenchPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.state.theme.visuals());

        // Handle a dropped JSON file (last one wins).
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
                })
                .last()
        });
        if let Some(path) = dropped {
            self.reload(&path);
        }

        self.show_menu_bar(ctx);
        self.show_tab_bar(ctx);
        self.show_messages(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.state.active_tab {
            Tab::Time => self.show_metric_tab(ui, Metric::Time),
            Tab::Memory => self.show_metric_tab(ui, Metric::Memory),
            Tab::AvgByPass => self.show_side_by_side(ui, charts::show_by_pass_chart),
            Tab::AvgBySize => self.show_side_by_side(ui, charts::show_size_bars),
            Tab::Stats => {
                self.metric_selector(ui);
                let metric = self.state.table_metric;
                ui.heading(format!("{} by algorithm and n", metric.title()));
                table_view::show_table(
                    ui,
                    &self.dataset.metric(metric).stats,
                    &mut self.state,
                    "No samples to summarize.",
                );
            }
            Tab::Correctness => {
                correctness_view::show_correctness(ui, &self.dataset.correctness, &self.state.theme)
            }
            Tab::RawData => {
                let note = match self.schema.warmup {
                    WarmupPolicy::ExcludeWarmup => ", warm-up pass removed",
                    WarmupPolicy::IncludeAll => "",
                };
                ui.heading(format!("Raw data ({} rows{note})", self.dataset.raw_view.len()));
                table_view::show_table(ui, &self.dataset.raw_view, &mut self.state, "No rows to show.");
            }
        });
    }
}
