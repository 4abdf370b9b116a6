use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;
use crate::summary::{ColumnSummary, UNIT};

// ---------------------------------------------------------------------------
// Left side panel – describe() tables
// ---------------------------------------------------------------------------

/// Render the statistics panel, one table per throughput column.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Statistics");
    ui.label(format!("Values in {UNIT}, missing samples excluded."));
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, summary) in state.analysis.normalized_summaries.iter().enumerate() {
                egui::CollapsingHeader::new(RichText::new(&summary.column).strong())
                    .id_salt(("stats", i))
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.push_id(i, |ui: &mut Ui| stats_table(ui, summary));
                    });
            }
        });
}

fn stats_table(ui: &mut Ui, summary: &ColumnSummary) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("");
            });
            header.col(|ui| {
                ui.strong(UNIT);
            });
        })
        .body(|mut body| {
            for (label, value) in summary.stats.rows() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(label);
                    });
                    row.col(|ui| {
                        ui.label(format_stat(label, value));
                    });
                });
            }
        });
}

fn format_stat(label: &str, value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if label == "count" {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save figure…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("{}: {} samples", state.title, state.sample_count()));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if state.status_is_error {
                Color32::RED
            } else {
                Color32::DARK_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save figure")
        .add_filter("PNG", &["png"])
        .set_file_name("throughput.png")
        .save_file();

    if let Some(path) = file {
        state.save_figure(&path);
    }
}
