//! PNG charts for the report run: settlement dynamics, relative ratios and
//! the cycle-state timeline.

use anyhow::Result;
use osadka_core::{
    dynamics::Series,
    report::relative::{RelativeReport, RelativeRow},
    timeline::CycleStateGroup,
};
use osadka_schemas::cycle_state::StateKind;
use plotters::prelude::*;
use std::path::Path;

const MAX_RATIO_BARS: usize = 40;

fn kind_color(kind: StateKind) -> RGBColor {
    match kind {
        StateKind::Measured => RGBColor(46, 139, 87),
        StateKind::New => RGBColor(70, 130, 180),
        StateKind::NoAccess => RGBColor(255, 165, 0),
        StateKind::Destroyed => RED,
        StateKind::Text => RGBColor(147, 112, 219),
        StateKind::Missing => RGBColor(211, 211, 211),
    }
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = (hi - lo).abs().max(1.0);
    (lo - span * 0.1, hi + span * 0.1)
}

/// One line per point: total settlement against cycle number.
pub fn plot_dynamics(
    output_dir: &Path,
    object: i32,
    series: &[Series],
    size: (u32, u32),
) -> Result<()> {
    let Some((lo, hi)) = Series::total_range(series) else {
        tracing::warn!(object, "no totals to plot, skipping dynamics chart");
        return Ok(());
    };
    let cycles = series.iter().flat_map(|s| s.points.iter().map(|p| p.cycle));
    let first_cycle = cycles.clone().min().unwrap_or(0);
    let last_cycle = cycles.max().unwrap_or(0).max(first_cycle + 1);
    let (y_min, y_max) = padded(lo, hi);

    let path = output_dir.join(format!("object_{}_dynamics.png", object));
    let root = BitMapBackend::new(&path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Settlement Dynamics, Object {}", object),
            ("sans-serif", 40).into_font(),
        )
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(first_cycle..last_cycle, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Cycle")
        .y_desc("Total settlement (mm)")
        .draw()?;

    for (i, s) in series.iter().enumerate().filter(|(_, s)| !s.points.is_empty()) {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                s.points.iter().map(|p| (p.cycle, p.total)),
                color.stroke_width(2),
            ))?
            .label(s.id.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
        chart.draw_series(
            s.points
                .iter()
                .map(|p| Circle::new((p.cycle, p.total), 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Bars of |ratio| for the worst pairs, with dashed lines at both limits.
pub fn plot_relative_ratios(
    output_dir: &Path,
    object: i32,
    cycle: i32,
    report: &RelativeReport,
    limits: (f64, f64),
    size: (u32, u32),
) -> Result<()> {
    let mut rows: Vec<&RelativeRow> = report.all_rows.iter().filter(|r| r.has_ratio()).collect();
    if rows.is_empty() {
        tracing::warn!(object, cycle, "no finite ratios, skipping relative chart");
        return Ok(());
    }
    rows.sort_by(|a, b| b.ratio.abs().total_cmp(&a.ratio.abs()));
    rows.truncate(MAX_RATIO_BARS);

    let enabled = |limit: f64| limit.is_finite() && limit > 0.0;
    let top = [rows[0].ratio.abs(), limits.0, limits.1]
        .into_iter()
        .filter(|v| enabled(*v))
        .fold(0.0, f64::max)
        * 1.15;

    let path = output_dir.join(format!("object_{}_cycle_{}_relative.png", object, cycle));
    let root = BitMapBackend::new(&path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let n = rows.len() as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Relative Settlement, Object {} Cycle {}", object, cycle),
            ("sans-serif", 40).into_font(),
        )
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..n, 0f64..top.max(f64::EPSILON))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Point pairs, worst first")
        .y_desc("|Δ total / distance|")
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
        let over = enabled(limits.0) && r.ratio.abs() > limits.0;
        let color = if over { RED } else { BLUE };
        let x0 = i as f64 + 0.1;
        Rectangle::new([(x0, 0.0), (x0 + 0.8, r.ratio.abs())], color.filled())
    }))?;

    for (limit, label, color) in [(limits.0, "SP limit", BLACK), (limits.1, "Calculated limit", MAGENTA)] {
        if !enabled(limit) {
            continue;
        }
        chart
            .draw_series(DashedLineSeries::new(
                vec![(0.0, limit), (n, limit)],
                5,
                5,
                color.stroke_width(2),
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// One row per point-group, one bar per segment, colored by state kind.
/// Missing cycles show as gaps.
pub fn plot_cycle_timeline(
    output_dir: &Path,
    object: i32,
    groups: &[CycleStateGroup],
    width: u32,
) -> Result<()> {
    let cycles = groups.iter().flat_map(|g| g.states().iter().map(|s| s.cycle_number));
    let (Some(first_cycle), Some(last_cycle)) = (cycles.clone().min(), cycles.max()) else {
        tracing::warn!(object, "no cycles, skipping timeline chart");
        return Ok(());
    };

    let rows = groups.len() as i32;
    let height = 80 + 24 * groups.len() as u32;
    let path = output_dir.join(format!("object_{}_timeline.png", object));
    let root = BitMapBackend::new(&path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let names: Vec<&str> = groups.iter().map(|g| g.display_name.as_str()).collect();
    let row_label = |y: &i32| -> String {
        usize::try_from(rows - 1 - *y)
            .ok()
            .and_then(|i| names.get(i))
            .map(|n| n.to_string())
            .unwrap_or_default()
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Cycle States, Object {}", object),
            ("sans-serif", 30).into_font(),
        )
        .margin(15)
        .x_label_area_size(30)
        .y_label_area_size(80)
        .build_cartesian_2d(first_cycle..last_cycle + 1, 0..rows)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(groups.len())
        .y_label_formatter(&row_label)
        .x_desc("Cycle")
        .draw()?;

    for (i, group) in groups.iter().enumerate() {
        let y = rows - 1 - i as i32;
        chart.draw_series(group.segments().iter().map(|seg| {
            Rectangle::new(
                [(seg.cycle_from, y), (seg.cycle_to + 1, y + 1)],
                kind_color(seg.kind).filled(),
            )
        }))?;
    }

    root.present()?;
    Ok(())
}
