use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::color::{generate_palette, DENSITY_COLOR};
use crate::figure::{Figure, Panel};
use crate::stats;

// ---------------------------------------------------------------------------
// Throughput plots (central panel)
// ---------------------------------------------------------------------------

/// Curve points `[x, y]` for plotting.
fn points(x: &[f64], y: Vec<f64>) -> PlotPoints {
    x.iter().zip(y).map(|(&xi, yi)| [xi, yi]).collect()
}

/// Render the ECDF overlay across the top half and the density panels
/// side by side underneath.
pub fn throughput_plots(ui: &mut Ui, figure: &Figure) {
    if figure.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing to plot");
        });
        return;
    }

    let top_height = ui.available_height() / 2.0;

    for panel in figure.ecdf_panels() {
        let Panel::EcdfTriplet {
            series,
            x_domain,
            unit,
        } = panel
        else {
            continue;
        };
        let palette = generate_palette(series.len());
        Plot::new("ecdf_plot")
            .legend(Legend::default().position(egui_plot::Corner::RightBottom))
            .height(top_height)
            .x_axis_label(unit.as_str())
            .y_axis_label("ECDF")
            .include_y(0.0)
            .include_y(1.0)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (s, color) in series.iter().zip(palette) {
                    let curve = stats::ecdf(&s.values, x_domain);
                    plot_ui.line(
                        Line::new(points(x_domain, curve))
                            .name(&s.label)
                            .color(color)
                            .width(1.5),
                    );
                }
            });
    }

    let densities: Vec<&Panel> = figure.density_panels().collect();
    if densities.is_empty() {
        return;
    }
    ui.columns(densities.len(), |columns: &mut [Ui]| {
        for (i, (ui, panel)) in columns.iter_mut().zip(&densities).enumerate() {
            let Panel::Density {
                series,
                x_domain,
                unit,
            } = panel
            else {
                continue;
            };
            ui.label(&series.label);
            let curve = stats::gaussian_kde(&series.values, x_domain);
            Plot::new(("density_plot", i))
                .x_axis_label(unit.as_str())
                .y_axis_label("Density")
                .include_y(0.0)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new(points(x_domain, curve))
                            .name(&series.label)
                            .color(DENSITY_COLOR)
                            .width(1.5),
                    );
                });
        }
    });
}
