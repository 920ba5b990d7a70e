use crate::error::OsadkaError;
use osadka_schemas::{measurement::CoordRow, measurement::MeasurementRow, project::ProjectFile};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn load(path: impl AsRef<Path>) -> Result<ProjectFile, OsadkaError> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| OsadkaError::FileIO(shown.clone(), e))?;
    let project: ProjectFile =
        serde_json::from_str(&content).map_err(|e| OsadkaError::JsonParsing(shown.clone(), e))?;
    info!(
        path = %shown,
        objects = project.objects.len(),
        "project loaded"
    );
    Ok(project)
}

pub fn save(path: impl AsRef<Path>, project: &ProjectFile) -> Result<(), OsadkaError> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    let json = serde_json::to_string_pretty(project)
        .map_err(|e| OsadkaError::JsonParsing(shown.clone(), e))?;
    fs::write(path, json).map_err(|e| OsadkaError::FileIO(shown.clone(), e))?;
    info!(path = %shown, "project saved");
    Ok(())
}

/// Rows and coordinates of one (object, cycle), ready for the report builders.
pub fn report_input(
    project: &ProjectFile,
    object: i32,
    cycle: i32,
) -> Result<(&[MeasurementRow], &[CoordRow]), OsadkaError> {
    let cycles = project
        .cycles(object)
        .ok_or(OsadkaError::ObjectNotFound(object))?;
    let rows = cycles
        .get(&cycle)
        .ok_or(OsadkaError::CycleNotFound { object, cycle })?;
    let coords = project
        .coordinates
        .get(&object)
        .map(Vec::as_slice)
        .unwrap_or_default();
    Ok((rows, coords))
}
