//! PNG rendering of chart descriptors using Plotters

use crate::charts::{ChartDescriptor, ChartKind, GroupValue, Series};
use crate::error::InsightError;
use plotters::prelude::*;
use std::error::Error;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use tracing::info;

/// Color palette cycled across series and slices
const SERIES_COLORS: [RGBColor; 6] = [
    RGBColor(135, 206, 235),
    RGBColor(144, 238, 144),
    RGBColor(255, 127, 80),
    RGBColor(255, 153, 153),
    RGBColor(102, 179, 255),
    RGBColor(153, 255, 153),
];

type DrawResult = Result<(), Box<dyn Error>>;

/// Render every chart into `output_dir`, one PNG per chart named after its title.
///
/// # Returns
/// * Paths of the written files, in chart order
pub fn render_charts(charts: &[ChartDescriptor], output_dir: &Path) -> crate::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    charts
        .iter()
        .map(|chart| {
            let path = output_dir.join(format!("{}.png", file_stem(&chart.title)));
            render_chart(chart, &path)?;
            Ok(path)
        })
        .collect()
}

/// Render one chart to a PNG at `output_path`.
pub fn render_chart(chart: &ChartDescriptor, output_path: &Path) -> crate::Result<()> {
    let drawn = match chart.kind {
        ChartKind::Histogram => draw_histograms(chart, output_path, 1.0),
        ChartKind::OverlaidHistogram { opacity } => draw_histograms(chart, output_path, opacity),
        ChartKind::Bar => draw_bars(chart, output_path),
        ChartKind::Pie => draw_pie(chart, output_path),
    };
    drawn.map_err(|e| InsightError::Render {
        title: chart.title.clone(),
        message: e.to_string(),
    })?;

    info!(title = %chart.title, path = %output_path.display(), "chart saved");
    Ok(())
}

fn draw_histograms(chart: &ChartDescriptor, output_path: &Path, opacity: f64) -> DrawResult {
    let bins = chart.series.iter().flat_map(|s| s.bins());
    let (x_min, x_max, y_max) = bins.fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0f64),
        |(lo, hi, top), b| (lo.min(b.lower), hi.max(b.upper), top.max(b.count as f64)),
    );
    let (x_min, x_max) = if x_min < x_max { (x_min, x_max) } else { (0.0, 1.0) };

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut plot = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..(y_max * 1.1).max(1.0))?;

    plot.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, series) in chart.series.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()].mix(opacity);
        plot.draw_series(series.bins().iter().map(|b| {
            Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], color.filled())
        }))?
        .label(series.name.clone())
        .legend(move |(x, y)| Rectangle::new([(x, y), (x + 10, y + 10)], color.filled()));
    }

    if chart.series.len() > 1 {
        plot.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_bars(chart: &ChartDescriptor, output_path: &Path) -> DrawResult {
    let groups: &[GroupValue] = chart.series.first().map(Series::groups).unwrap_or(&[]);
    let y_max = groups
        .iter()
        .map(|g| g.value)
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut plot = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(groups.len().max(1) as f64 - 0.5), 0f64..(y_max * 1.1).max(1.0))?;

    let key_at = |x: &f64| {
        let index = x.round();
        if (x - index).abs() < 1e-6 && index >= 0.0 {
            groups
                .get(index as usize)
                .map(|g| g.key.clone())
                .unwrap_or_default()
        } else {
            String::new()
        }
    };

    plot.configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len().max(1))
        .x_label_formatter(&key_at)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    let color = SERIES_COLORS[0];
    plot.draw_series(
        groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.value.is_finite())
            .map(|(i, g)| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, g.value)], color.filled())
            }),
    )?;

    root.present()?;
    Ok(())
}

fn draw_pie(chart: &ChartDescriptor, output_path: &Path) -> DrawResult {
    let slices: Vec<&GroupValue> = chart
        .series
        .first()
        .map(Series::groups)
        .unwrap_or(&[])
        .iter()
        .filter(|g| g.value.is_finite() && g.value > 0.0)
        .collect();
    let total: f64 = slices.iter().map(|g| g.value).sum();

    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled(&chart.title, ("sans-serif", 30))?;

    let (width, height) = area.dim_in_pixel();
    let center = (width as f64 / 2.0, height as f64 / 2.0);
    let radius = width.min(height) as f64 * 0.35;
    let at = |angle: f64, r: f64| {
        (
            (center.0 + r * angle.cos()).round() as i32,
            (center.1 + r * angle.sin()).round() as i32,
        )
    };

    let mut start = -PI / 2.0;
    for (i, slice) in slices.iter().enumerate() {
        let sweep = slice.value / total * 2.0 * PI;
        let steps = ((sweep / 0.02).ceil() as usize).max(2);

        let mut points = vec![at(0.0, 0.0)];
        points.extend((0..=steps).map(|s| at(start + sweep * s as f64 / steps as f64, radius)));
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        area.draw(&Polygon::new(points, color.filled()))?;

        let percent = slice.percent.unwrap_or(slice.value / total * 100.0);
        let label = format!("{} ({:.1}%)", slice.key, percent);
        area.draw(&Text::new(
            label,
            at(start + sweep / 2.0, radius * 1.15),
            ("sans-serif", 16).into_font(),
        ))?;

        start += sweep;
    }

    root.present()?;
    Ok(())
}

/// Lowercase file stem built from a chart title
fn file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    stem.split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
