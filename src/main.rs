mod app;
mod cli;
mod data;
mod error;
mod processing;
mod state;
mod ui;

use std::process::ExitCode;

use app::BenchPlotApp;
use clap::Parser;
use cli::Cli;
use data::schema::BenchmarkSchema;
use eframe::egui;
use eframe::egui_wgpu;
use processing::pipeline::Dataset;

const WINDOW_TITLE: &str = "Benchmark Visualizer for Matrix Multiplication Algorithms";

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Usage errors exit through clap with status 2.
    let cli = Cli::parse();

    let schema = match &cli.schema {
        Some(path) => match BenchmarkSchema::from_file(path) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::error!("{e}");
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => BenchmarkSchema::default(),
    };

    let dataset = match Dataset::load(&cli.file, &schema) {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!("Failed to load {:?}: {e}", cli.file);
            let kind = if e.is_data_format() { "data error" } else { "error" };
            eprintln!("{kind}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        print!("{}", dataset.summary());
        return ExitCode::SUCCESS;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        wgpu_options: egui_wgpu::WgpuConfiguration {
            present_mode: eframe::wgpu::PresentMode::AutoVsync,
            ..Default::default()
        },
        ..Default::default()
    };

    let zoom = cli.zoom_factor();
    let result = eframe::run_native(
        "benchplot",
        options,
        Box::new(move |cc| Ok(Box::new(BenchPlotApp::new(cc, dataset, schema, zoom)))),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Window error: {e}");
            ExitCode::FAILURE
        }
    }
}
