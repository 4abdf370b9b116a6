//! Headless PNG export of a [`Figure`].
//!
//! Layout mirrors the interactive viewer: the ECDF overlay spans the top half,
//! the density panels share the bottom half side by side.

use std::path::Path;

use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

use crate::color::{generate_palette, DENSITY_COLOR};
use crate::figure::{Figure, Panel, Series};
use crate::stats;

/// Errors that can occur while exporting a figure
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to render: the figure has no panels")]
    EmptyFigure,

    #[error("Failed to draw figure: {0}")]
    Drawing(String),

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

type Result<T> = core::result::Result<T, RenderError>;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Pixel size of an exported figure.
pub const FIGURE_SIZE: (u32, u32) = (1800, 1200);

/// Density panels sit in a single row under the ECDF.
const DENSITY_COLUMNS: usize = 3;

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn rgb(c: eframe::egui::Color32) -> RGBColor {
    RGBColor(c.r(), c.g(), c.b())
}

/// Render `figure` and write it to `path` as PNG.
pub fn save_png(figure: &Figure, path: &Path) -> Result<()> {
    let (width, height) = FIGURE_SIZE;
    let buffer = render_rgb(figure, FIGURE_SIZE)?;
    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| RenderError::Drawing("pixel buffer does not match figure size".into()))?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    info!("Figure saved to {}", path.display());
    Ok(())
}

/// Render `figure` into a packed RGB buffer of `size` pixels.
pub fn render_rgb(figure: &Figure, size: (u32, u32)) -> Result<Vec<u8>> {
    if figure.is_empty() {
        return Err(RenderError::EmptyFigure);
    }

    let (width, height) = size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let (top, bottom) = root.split_vertically((height / 2) as i32);
        let density_areas = bottom.split_evenly((1, DENSITY_COLUMNS));
        let mut density_areas = density_areas.iter();

        for panel in &figure.panels {
            match panel {
                Panel::EcdfTriplet {
                    series,
                    x_domain,
                    unit,
                } => draw_ecdf(&top, series, x_domain, unit)?,
                Panel::Density {
                    series,
                    x_domain,
                    unit,
                } => match density_areas.next() {
                    Some(area) => draw_density(area, series, x_domain, unit)?,
                    None => warn!("No room left for density panel '{}'", series.label),
                },
            }
        }

        root.present().map_err(draw_err)?;
    }
    Ok(buffer)
}

fn x_range(x_domain: &[f64]) -> std::ops::Range<f64> {
    let min = x_domain.first().copied().unwrap_or(0.0);
    let max = x_domain.last().copied().unwrap_or(1.0);
    if max > min {
        min..max
    } else {
        min..min + 1.0
    }
}

/// Upper y bound for density curves, with headroom; never zero.
fn density_y_max(curve: &[f64]) -> f64 {
    let max = curve.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn draw_ecdf(area: &Area<'_>, series: &[Series; 3], x_domain: &[f64], unit: &str) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range(x_domain), 0.0..1.0)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc(unit)
        .y_desc("ECDF")
        .draw()
        .map_err(draw_err)?;

    let palette = generate_palette(series.len());
    for (s, color) in series.iter().zip(palette) {
        let color = rgb(color);
        let curve = stats::ecdf(&s.values, x_domain);
        chart
            .draw_series(LineSeries::new(
                x_domain.iter().copied().zip(curve),
                color.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err)?;
    Ok(())
}

fn draw_density(area: &Area<'_>, series: &Series, x_domain: &[f64], unit: &str) -> Result<()> {
    let curve = stats::gaussian_kde(&series.values, x_domain);

    let mut chart = ChartBuilder::on(area)
        .caption(&series.label, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range(x_domain), 0.0..density_y_max(&curve))
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc(unit)
        .y_desc("Density")
        .y_label_formatter(&|y| format!("{y:.3}"))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(
            x_domain.iter().copied().zip(curve),
            rgb(DENSITY_COLOR).stroke_width(2),
        ))
        .map_err(draw_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_figure_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("figure.png");
        assert!(matches!(
            save_png(&Figure::default(), &path),
            Err(RenderError::EmptyFigure)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn full_figure_saves_decodable_png() {
        use crate::figure::ThroughputPlotter;

        let x: Vec<f64> = (0..120).map(f64::from).collect();
        let full = vec![12.0, 25.5, 31.0, 47.2, 60.8];
        let narrow = vec![8.0, 14.5, 22.0];
        let wide = vec![19.0, 35.0, 52.5, 70.0];

        let mut figure = Figure::default();
        figure.plot_ecdf_triplet(
            [
                Series::new("Application th. (10 MHz)", narrow.clone()),
                Series::new("Application th.", full.clone()),
                Series::new("Application th. (15 MHz)", wide.clone()),
            ],
            &x,
            "Mbit/s",
        );
        figure.plot_density(Series::new("App. th.", full), &x, "Mbit/s");
        figure.plot_density(Series::new("App. th. 10 MHz", narrow), &x, "Mbit/s");
        figure.plot_density(Series::new("App. th. 15 MHz", wide), &x, "Mbit/s");

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("figure.png");
        save_png(&figure, &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), FIGURE_SIZE);
    }

    #[test]
    fn axis_ranges_are_never_empty() {
        assert_eq!(x_range(&[0.0, 1.0, 119.0]), 0.0..119.0);
        assert_eq!(x_range(&[]), 0.0..1.0);
        assert_eq!(x_range(&[5.0]), 5.0..6.0);
        assert_eq!(density_y_max(&[0.0, 0.0]), 1.0);
        assert!((density_y_max(&[0.1, 0.5]) - 0.55).abs() < 1e-12);
    }
}
