// Static chart rendering.
//
// All charts are mechanical views over tables the audit already computed;
// nothing here derives new numbers. Each function renders one PNG and skips
// silently (no file) when handed an empty series — the caller reports the
// empty scan itself.
use plotters::prelude::*;
use std::error::Error;

const CHART_SIZE: (u32, u32) = (1280, 720);

/// Vertical bar chart over labeled categories (e.g., rating values).
pub fn bar_chart(
    path: &str,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    data: &[(String, usize)],
) -> Result<(), Box<dyn Error>> {
    if data.is_empty() {
        return Ok(());
    }
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let y_max = data.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..data.len() as f64, 0f64..y_max * 1.1)?;
    let labels: Vec<String> = data.iter().map(|(l, _)| l.clone()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(data.len().min(20))
        .x_label_formatter(&|x: &f64| {
            let idx = x.floor() as usize;
            labels.get(idx).cloned().unwrap_or_default()
        })
        .draw()?;
    chart.draw_series(data.iter().enumerate().map(|(i, (_, count))| {
        Rectangle::new(
            [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *count as f64)],
            BLUE.filled(),
        )
    }))?;
    root.present()?;
    Ok(())
}

/// Frequency histogram from pre-computed `(lower, upper, count)` bins.
pub fn histogram_chart(
    path: &str,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    bins: &[(f64, f64, usize)],
) -> Result<(), Box<dyn Error>> {
    let (x_min, mut x_max) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.0, last.1),
        _ => return Ok(()),
    };
    if x_max <= x_min {
        // single degenerate bin; widen so the axis has extent
        x_max = x_min + 1.0;
    }
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let y_max = bins.iter().map(|(_, _, c)| *c).max().unwrap_or(1).max(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max * 1.1)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;
    chart.draw_series(bins.iter().map(|(lo, hi, count)| {
        let hi = if hi <= lo { lo + 1.0 } else { *hi };
        Rectangle::new([(*lo, 0.0), (hi, *count as f64)], BLUE.filled())
    }))?;
    root.present()?;
    Ok(())
}

/// Line chart over an ordered labeled series (e.g., reviews per month).
pub fn line_chart(
    path: &str,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(String, usize)],
) -> Result<(), Box<dyn Error>> {
    if points.is_empty() {
        return Ok(());
    }
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let y_max = points.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f64;
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max * 1.1)?;
    let labels: Vec<String> = points.iter().map(|(l, _)| l.clone()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(points.len().min(12))
        .x_label_formatter(&|x: &f64| {
            let idx = x.round() as usize;
            labels.get(idx).cloned().unwrap_or_default()
        })
        .draw()?;
    chart.draw_series(LineSeries::new(
        points
            .iter()
            .enumerate()
            .map(|(i, (_, count))| (i as f64, *count as f64)),
        &RED,
    ))?;
    root.present()?;
    Ok(())
}
