//! SVG charts for stack-height distributions.

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use crate::analysis::CapacitySummary;
use crate::binning::BinScheme;
use crate::stats::SummaryStats;

const BOX_COLOR: RGBColor = RGBColor(70, 130, 180);
const HIST_BIN_WIDTH: f64 = 10.0;
const MAX_HIST_BINS: usize = 200;
const FONT: &str = "sans-serif";

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

fn finite_max(values: impl IntoIterator<Item = f64>) -> f64 {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max)
}

/// Histogram bin width: `preferred`, widened so that no more than
/// `MAX_HIST_BINS` bins cover the largest finite value.
pub fn histogram_width(values: &[f64], preferred: f64) -> f64 {
    let max = finite_max(values.iter().copied());
    if max / preferred > MAX_HIST_BINS as f64 {
        (max / MAX_HIST_BINS as f64).ceil()
    } else {
        preferred
    }
}

/// Counts the finite `values` into consecutive bins of `width` starting at
/// zero. The number of bins reaches one full bin past the largest value and
/// never exceeds `MAX_HIST_BINS + 1`.
pub fn histogram_counts(values: &[f64], width: f64) -> Vec<u32> {
    let max = finite_max(values.iter().copied());
    let bins = ((max / width).floor() as usize)
        .saturating_add(1)
        .min(MAX_HIST_BINS + 1);
    let mut counts = vec![0u32; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = ((v.max(0.0) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
}

/// Text block printed beside each box plot.
pub fn stats_lines(stats: &SummaryStats) -> Vec<String> {
    vec![
        format!("Max: {:.1}m", stats.max),
        format!("Min: {:.1}m", stats.min),
        format!("Mean: {:.1}m", stats.mean),
        format!("Median: {:.1}m", stats.median),
        format!("25%: {:.1}m", stats.p25),
        format!("75%: {:.1}m", stats.p75),
        match stats.std {
            Some(sd) => format!("Std: {sd:.1}m"),
            None => "Std: n/a".to_string(),
        },
    ]
}

fn box_outline(center: f64, half_width: f64, s: &SummaryStats) -> Vec<PathElement<(f64, f64)>> {
    let (l, r) = (center - half_width, center + half_width);
    let cap = half_width / 2.0;
    vec![
        PathElement::new(
            vec![(l, s.p25), (r, s.p25), (r, s.p75), (l, s.p75), (l, s.p25)],
            BLACK.stroke_width(1),
        ),
        PathElement::new(vec![(l, s.median), (r, s.median)], RED.stroke_width(2)),
        PathElement::new(vec![(center, s.min), (center, s.p25)], BLACK.stroke_width(1)),
        PathElement::new(vec![(center, s.p75), (center, s.max)], BLACK.stroke_width(1)),
        PathElement::new(
            vec![(center - cap, s.min), (center + cap, s.min)],
            BLACK.stroke_width(1),
        ),
        PathElement::new(
            vec![(center - cap, s.max), (center + cap, s.max)],
            BLACK.stroke_width(1),
        ),
    ]
}

fn box_fill(center: f64, half_width: f64, s: &SummaryStats) -> Rectangle<(f64, f64)> {
    Rectangle::new(
        [(center - half_width, s.p25), (center + half_width, s.p75)],
        BOX_COLOR.mix(0.35).filled(),
    )
}

fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(1.0);
    if pad.is_finite() {
        (min - pad, max + pad)
    } else {
        (min, max)
    }
}

/// Upper axis bound with a small margin above `max`.
fn axis_upper(max: f64) -> f64 {
    let upper = max * 1.05 + 1.0;
    if upper.is_finite() { upper } else { max }
}

fn draw_histogram(area: &Area<'_>, values: &[f64]) -> Result<()> {
    let width = histogram_width(values, HIST_BIN_WIDTH);
    let counts = histogram_counts(values, width);
    let x_max = counts.len() as f64 * width;
    let y_max = counts.iter().copied().max().unwrap_or(0) + 1;

    let mut chart = ChartBuilder::on(area)
        .caption("Distribution of All Stack Heights", (FONT, 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..x_max, 0u32..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Stack Height (m)")
        .y_desc("Count")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &c)| {
        let x0 = i as f64 * width;
        Rectangle::new(
            [(x0, 0u32), (x0 + width, c)],
            BOX_COLOR.mix(0.6).filled(),
        )
    }))?;

    Ok(())
}

fn draw_box_panel(area: &Area<'_>, title: &str, label: &str, values: &[f64]) -> Result<()> {
    let Some(stats) = SummaryStats::describe(values) else {
        area.titled(&format!("{title} (no data)"), (FONT, 18))?;
        return Ok(());
    };

    let (y0, y1) = padded_range(stats.min, stats.max);
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 18))
        .margin(15)
        .x_label_area_size(30)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..2.0, y0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc(label)
        .y_desc("Stack Height (m)")
        .draw()?;

    chart.draw_series(std::iter::once(box_fill(0.6, 0.3, &stats)))?;
    chart.draw_series(box_outline(0.6, 0.3, &stats))?;

    let style = (FONT, 13).into_font().color(&BLACK);
    let (width, _) = area.dim_in_pixel();
    let x = (f64::from(width) * 0.62) as i32;
    for (i, line) in stats_lines(&stats).iter().enumerate() {
        area.draw_text(line, &style, (x, 45 + 17 * i as i32))?;
    }

    Ok(())
}

/// Renders a histogram of all heights above four box plots: all data and
/// one per stack-height bin.
pub fn plot_stack_height_analysis(heights: &[f64], bins: &BinScheme, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1500, 1800)).into_drawing_area();
    root.fill(&WHITE)?;

    let (upper, lower) = root.split_vertically(600);
    draw_histogram(&upper, heights)?;

    let panels = lower.split_evenly((2, 2));
    draw_box_panel(&panels[0], "All Stack Heights", "All Data", heights)?;

    let buckets = bins.partition(heights, heights);
    for ((panel, label), bucket) in panels[1..].iter().zip(bins.labels()).zip(&buckets) {
        draw_box_panel(
            panel,
            &format!("Stack Heights {label}m"),
            &format!("{label}m"),
            bucket,
        )?;
    }

    root.present()?;
    info!(path = %path.display(), "Saved stack height chart");
    Ok(())
}

/// Renders stack height against design capacity beside one box plot of
/// stack heights per capacity bin.
pub fn plot_stack_height_by_capacity(summary: &CapacitySummary, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1600, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(800);

    let cap_max = finite_max(summary.records.iter().map(|r| r.design_capacity));
    let height_max = finite_max(summary.records.iter().map(|r| r.stkhgt));

    let mut scatter = ChartBuilder::on(&left)
        .caption(
            format!("Stack Height vs Design Capacity ({})", summary.unit),
            (FONT, 20),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..axis_upper(cap_max), 0.0..axis_upper(height_max))?;
    scatter
        .configure_mesh()
        .x_desc(format!("Design Capacity ({})", summary.unit))
        .y_desc("Stack Height (m)")
        .draw()?;
    scatter.draw_series(
        summary
            .records
            .iter()
            .filter(|r| r.design_capacity.is_finite() && r.stkhgt.is_finite())
            .map(|r| Circle::new((r.design_capacity, r.stkhgt), 3, BOX_COLOR.mix(0.6).filled())),
    )?;

    let labels = summary.bins.labels();
    let capacities: Vec<f64> = summary.records.iter().map(|r| r.design_capacity).collect();
    let heights: Vec<f64> = summary.records.iter().map(|r| r.stkhgt).collect();
    let buckets = summary.bins.partition(&capacities, &heights);

    let (y0, y1) = padded_range(0.0, height_max);
    let mut boxes = ChartBuilder::on(&right)
        .caption(
            format!("Stack Height by Capacity Bin ({})", summary.unit),
            (FONT, 20),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..labels.len() as f64, y0..y1)?;
    boxes
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc(format!("Design Capacity ({})", summary.unit))
        .y_desc("Stack Height (m)")
        .draw()?;

    for (i, (label, bucket)) in labels.iter().zip(&buckets).enumerate() {
        let center = i as f64 + 0.5;
        boxes.draw_series(std::iter::once(Text::new(
            format!("{label} (n={})", bucket.len()),
            (i as f64 + 0.15, y0 + (y1 - y0) * 0.02),
            (FONT, 13).into_font(),
        )))?;
        if let Some(stats) = SummaryStats::describe(bucket) {
            boxes.draw_series(std::iter::once(box_fill(center, 0.3, &stats)))?;
            boxes.draw_series(box_outline(center, 0.3, &stats))?;
        }
    }

    root.present()?;
    info!(path = %path.display(), "Saved capacity chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::stack_height_bins;

    #[test]
    fn test_histogram_counts_ten_meter_bins() {
        let counts = histogram_counts(&[0.0, 5.0, 9.9, 10.0, 25.0], 10.0);
        assert_eq!(counts, vec![3, 1, 1]);
    }

    #[test]
    fn test_histogram_ignores_infinite_values() {
        let counts = histogram_counts(&[f64::INFINITY, 20.0], 10.0);
        assert_eq!(counts, vec![0, 0, 1]);
    }

    #[test]
    fn test_histogram_widens_bins_for_huge_values() {
        let values = [20.0, 1e12];
        let width = histogram_width(&values, 10.0);
        assert!(width > 10.0);
        let counts = histogram_counts(&values, width);
        assert!(counts.len() <= MAX_HIST_BINS + 1);
        assert_eq!(counts.iter().sum::<u32>(), 2);
        assert_eq!(*counts.last().unwrap(), 1);
    }

    #[test]
    fn test_padded_range_guards_non_finite() {
        assert_eq!(padded_range(f64::NEG_INFINITY, 5.0), (0.0, 1.0));
        assert_eq!(padded_range(10.0, 20.0), (9.0, 21.0));
    }

    #[test]
    fn test_stats_lines_without_std() {
        let stats = SummaryStats::describe(&[150.0]).unwrap();
        let lines = stats_lines(&stats);
        assert_eq!(lines[0], "Max: 150.0m");
        assert_eq!(lines[6], "Std: n/a");
    }

    #[test]
    fn test_plot_stack_height_analysis_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack_height_analysis_test.svg");
        let heights = [5.0, 15.0, 150.0, 42.0, 61.5];

        plot_stack_height_analysis(&heights, &stack_height_bins(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn test_plot_handles_empty_bins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("only_mid.svg");
        plot_stack_height_analysis(&[20.0, 30.0], &stack_height_bins(), &path).unwrap();
        assert!(path.exists());
    }
}
