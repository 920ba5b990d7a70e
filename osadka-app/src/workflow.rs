use crate::config::ReportConfig;
use crate::plotting;
use anyhow::{bail, Context, Result};
use osadka_core::{
    dynamics, export, import, project,
    report::{GeneralReport, GeneralReportData, RelativeReport},
    timeline::{self, CycleStateGroup},
};
use osadka_schemas::{
    project::{ProjectFile, ReportLimits},
    units::{mm_to, Unit},
};
use serde::Serialize;
use std::{fs, path::Path, path::PathBuf};
use tracing::{info, warn};

/// Reports computed for one (object, cycle).
#[derive(Debug, Serialize)]
pub struct CycleReport {
    pub object: i32,
    pub cycle: i32,
    pub cycle_label: String,
    pub general: GeneralReportData,
    pub relative: RelativeReport,
}

/// Cycles of `object` to report: the requested ones that exist, or the last one.
fn selected_cycles(project: &ProjectFile, object: i32, requested: &[i32]) -> Vec<i32> {
    let Some(cycles) = project.cycles(object) else {
        return Vec::new();
    };
    if requested.is_empty() {
        return project.last_cycle(object).into_iter().collect();
    }
    requested
        .iter()
        .copied()
        .filter(|c| {
            let present = cycles.contains_key(c);
            if !present {
                warn!(object, cycle = *c, "cycle not in project, skipped");
            }
            present
        })
        .collect()
}

fn selected_objects(project: &ProjectFile, requested: &[i32]) -> Result<Vec<i32>> {
    if requested.is_empty() {
        return Ok(project.objects.keys().copied().collect());
    }
    for object in requested {
        if !project.objects.contains_key(object) {
            bail!("Object {} is not in the project", object);
        }
    }
    Ok(requested.to_vec())
}

/// Builds both reports for one (object, cycle).
pub fn build_cycle_report(
    project: &ProjectFile,
    limits: &ReportLimits,
    object: i32,
    cycle: i32,
) -> Result<CycleReport> {
    let (rows, coords) = project::report_input(project, object, cycle)?;
    if coords.len() != rows.len() {
        warn!(
            object,
            cycle,
            coordinates = coords.len(),
            rows = rows.len(),
            "coordinate and measurement counts differ; pairs follow row positions"
        );
    }

    Ok(CycleReport {
        object,
        cycle,
        cycle_label: project.cycle_label(cycle),
        general: GeneralReport::build(rows, limits.max_nomen, limits.max_calculated),
        relative: RelativeReport::build(coords, rows, limits.rel_nomen, limits.rel_calculated),
    })
}

/// Runs every report selected by `cfg` and writes tables and charts into a
/// fresh timestamped directory, which is returned.
pub fn run_report(cfg: &ReportConfig) -> Result<PathBuf> {
    let project = project::load(&cfg.project)
        .with_context(|| format!("Failed to load project {:?}", cfg.project))?;
    let limits = cfg.limits.apply(project.limits);

    let run_dir = cfg
        .output_dir
        .join(format!("report_{}", chrono::Local::now().format("%Y%m%d_%H%M%S")));
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", run_dir))?;
    info!(dir = ?run_dir, "writing report run");

    let mut reports = Vec::new();
    for object in selected_objects(&project, &cfg.objects)? {
        let Some(cycles) = project.cycles(object) else {
            continue;
        };

        for cycle in selected_cycles(&project, object, &cfg.cycles) {
            let report = build_cycle_report(&project, &limits, object, cycle)?;
            export::write_relative_rows(
                run_dir.join(format!("object_{}_cycle_{}_relative.csv", object, cycle)),
                &report.relative,
            )?;
            if cfg.charts {
                plotting::plot_relative_ratios(
                    &run_dir,
                    object,
                    cycle,
                    &report.relative,
                    (limits.rel_nomen, limits.rel_calculated),
                    cfg.chart_size,
                )?;
            }
            reports.push(report);
        }

        let series = dynamics::build_series(cycles);
        export::write_dynamics(run_dir.join(format!("object_{}_dynamics.csv", object)), &series)?;

        let groups = timeline::build_state_groups(cycles);
        export::write_timeline(run_dir.join(format!("object_{}_timeline.csv", object)), &groups)?;

        if cfg.charts {
            plotting::plot_dynamics(&run_dir, object, &series, cfg.chart_size)?;
            plotting::plot_cycle_timeline(&run_dir, object, &groups, cfg.chart_size.0)?;
        }
    }

    let general: Vec<(i32, i32, GeneralReportData)> = reports
        .iter()
        .map(|r| (r.object, r.cycle, r.general.clone()))
        .collect();
    export::write_general_summary(run_dir.join("general_summary.csv"), &general)?;

    let json = serde_json::to_string_pretty(&reports)?;
    fs::write(run_dir.join("reports.json"), json)?;

    print_summary(&reports, &limits, cfg.display_unit);
    Ok(run_dir)
}

/// Builds a project file from the importer's normalized CSV output.
pub fn run_import(
    measurements: &Path,
    coordinates: Option<&Path>,
    coord_unit: Unit,
    limits: ReportLimits,
    out: &Path,
) -> Result<()> {
    let mut project = ProjectFile {
        limits,
        ..Default::default()
    };
    project.objects = import::read_measurements(measurements)
        .with_context(|| format!("Failed to import measurements from {:?}", measurements))?;
    if let Some(path) = coordinates {
        project.coordinates = import::read_coordinates(path, coord_unit)
            .with_context(|| format!("Failed to import coordinates from {:?}", path))?;
    }

    for (object, cycles) in &project.objects {
        let points = project.coordinates.get(object).map_or(0, Vec::len);
        info!(object, cycles = cycles.len(), coordinates = points, "object imported");
    }

    project::save(out, &project).with_context(|| format!("Failed to save project {:?}", out))?;
    println!("Project written to {:?}", out);
    Ok(())
}

/// Prints the cycle-state timeline of one object and optionally charts it.
pub fn run_timeline(project_path: &Path, object: i32, out: Option<&Path>) -> Result<()> {
    let project = project::load(project_path)
        .with_context(|| format!("Failed to load project {:?}", project_path))?;
    let cycles = project
        .cycles(object)
        .with_context(|| format!("Object {} is not in the project", object))?;

    let groups = timeline::build_state_groups(cycles);
    print_timeline(object, &groups);

    if let Some(dir) = out {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        export::write_timeline(dir.join(format!("object_{}_timeline.csv", object)), &groups)?;
        plotting::plot_cycle_timeline(dir, object, &groups, 1024)?;
    }
    Ok(())
}

fn print_timeline(object: i32, groups: &[CycleStateGroup]) {
    println!("\n--- [Timeline] Object {} ---", object);
    for group in groups {
        let segments: Vec<String> = group
            .segments()
            .iter()
            .map(|s| {
                let cycles = if s.cycle_from == s.cycle_to {
                    s.cycle_from.to_string()
                } else {
                    format!("{}-{}", s.cycle_from, s.cycle_to)
                };
                match &s.annotation {
                    Some(note) => format!("{} [{}: {}]", cycles, s.kind.label(), note),
                    None => format!("{} [{}]", cycles, s.kind.label()),
                }
            })
            .collect();
        println!("  {:<12} {}", group.display_name, segments.join("  "));
    }
}

fn in_unit(value: f64, unit: Unit) -> String {
    if value.is_finite() {
        format!("{:.2} {}", mm_to(value, unit), unit)
    } else {
        "-".to_string()
    }
}

fn ids_or_none(ids: &[String]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.join(" ")
    }
}

fn print_summary(reports: &[CycleReport], limits: &ReportLimits, unit: Unit) {
    println!("\n\n--- [Settlement Summary] ---");
    println!("========================================");
    println!(
        "Limits: absolute SP {} / calc {}, relative SP {} / calc {}",
        in_unit(limits.max_nomen, unit),
        in_unit(limits.max_calculated, unit),
        limits.rel_nomen,
        limits.rel_calculated
    );

    for report in reports {
        let g = &report.general;
        println!("----------------------------------------");
        println!("Object {} / {}", report.object, report.cycle_label);
        println!(
            "  - Max total:   {:>14}  ({})",
            in_unit(g.max_total.value, unit),
            ids_or_none(&g.max_total.ids)
        );
        println!(
            "  - Min total:   {:>14}  ({})",
            in_unit(g.min_total.value, unit),
            ids_or_none(&g.min_total.ids)
        );
        println!(
            "  - Avg total:   {:>14}",
            in_unit(g.avg_total.unwrap_or(f64::NAN), unit)
        );
        println!(
            "  - Total extremes (mm): {}  [{}]",
            g.total_extremum_value, g.total_extremum_ids
        );
        println!(
            "  - Settlement extremes (mm): {}  [{}]",
            g.settl_extremum_value, g.settl_extremum_ids
        );
        println!("  - Exceeding SP limit:    {}", ids_or_none(&g.exceed_total_sp_ids));
        println!("  - Exceeding calc limit:  {}", ids_or_none(&g.exceed_total_calc_ids));
        println!("  - No access: {}", ids_or_none(&g.no_access_ids));
        println!("  - New:       {}", ids_or_none(&g.new_ids));
        println!("  - Destroyed: {}", ids_or_none(&g.destroyed_ids));

        let r = &report.relative;
        println!(
            "  - Max relative: {} ({})  pairs over SP: {}, over calc: {}",
            if r.max_relative.value.is_finite() {
                format!("{:.6}", r.max_relative.value)
            } else {
                "-".to_string()
            },
            ids_or_none(&r.max_relative.ids),
            r.exceeded_sp_rows.len(),
            r.exceeded_calc_rows.len()
        );
    }
    println!("========================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use osadka_schemas::measurement::{CoordRow, MeasurementRow};

    fn sample_project() -> ProjectFile {
        let mut project = ProjectFile::default();
        project.limits = ReportLimits {
            max_nomen: 2.0,
            max_calculated: f64::NAN,
            rel_nomen: 0.001,
            rel_calculated: f64::NAN,
        };
        let cycles = project.objects.entry(1).or_default();
        cycles.insert(
            1,
            vec![
                MeasurementRow::from_raw("A", 1, "100.0", "0", "0"),
                MeasurementRow::from_raw("B", 1, "101.0", "0", "0"),
            ],
        );
        cycles.insert(
            2,
            vec![
                MeasurementRow::from_raw("A", 2, "99.997", "-3", "-3"),
                MeasurementRow::from_raw("B", 2, "нет доступа", "", ""),
            ],
        );
        project
            .coordinates
            .insert(1, vec![CoordRow::new(0.0, 0.0), CoordRow::new(1000.0, 0.0)]);
        project
    }

    #[test]
    fn test_selected_cycles_default_to_last() {
        let project = sample_project();
        assert_eq!(selected_cycles(&project, 1, &[]), vec![2]);
        assert_eq!(selected_cycles(&project, 1, &[1, 7]), vec![1]);
        assert!(selected_cycles(&project, 3, &[]).is_empty());
    }

    #[test]
    fn test_selected_objects_rejects_unknown() {
        let project = sample_project();
        assert_eq!(selected_objects(&project, &[]).unwrap(), vec![1]);
        assert!(selected_objects(&project, &[4]).is_err());
    }

    #[test]
    fn test_build_cycle_report() {
        let project = sample_project();
        let report = build_cycle_report(&project, &project.limits, 1, 2).unwrap();
        assert_eq!(report.general.exceed_total_sp_ids, vec!["A"]);
        assert_eq!(report.general.no_access_ids, vec!["B"]);
        assert_eq!(report.relative.all_rows.len(), 1);
        assert!(report.relative.all_rows[0].ratio.is_nan());

        let report = build_cycle_report(&project, &project.limits, 1, 1).unwrap();
        assert_eq!(report.relative.all_rows[0].ratio, 0.0);
        assert!(report.relative.exceeded_sp_rows.is_empty());
    }

    #[test]
    fn test_run_report_writes_tables() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("project.json");
        project::save(&project_path, &sample_project()).unwrap();

        let cfg = ReportConfig {
            project: project_path,
            output_dir: dir.path().join("runs"),
            charts: false,
            ..Default::default()
        };
        let run_dir = run_report(&cfg).unwrap();

        for name in [
            "general_summary.csv",
            "reports.json",
            "object_1_cycle_2_relative.csv",
            "object_1_dynamics.csv",
            "object_1_timeline.csv",
        ] {
            assert!(run_dir.join(name).exists(), "missing {}", name);
        }
        let json = fs::read_to_string(run_dir.join("reports.json")).unwrap();
        assert!(json.contains("\"no_access_ids\""));
    }

    #[test]
    fn test_in_unit() {
        assert_eq!(in_unit(-1500.0, Unit::Meter), "-1.50 m");
        assert_eq!(in_unit(f64::NAN, Unit::Millimeter), "-");
    }
}
