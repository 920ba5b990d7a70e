//! Status markers that surveyors type into the mark/settlement cells instead of
//! (or next to) a number.

use osadka_schemas::measurement::MeasurementRow;

const NO_ACCESS_MARKERS: &[&str] = &["нет доступа", "нет дост", "н/д", "no access"];
const NEW_MARKERS: &[&str] = &["новая", "новый", "new"];
const DESTROYED_MARKERS: &[&str] = &["уничтож", "разруш", "destroyed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    NoAccess,
    New,
    Destroyed,
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    markers.iter().any(|m| lowered.contains(m))
}

fn raw_fields(row: &MeasurementRow) -> [&str; 2] {
    [row.mark_raw.as_str(), row.settl_raw.as_str()]
}

pub fn is_no_access(row: &MeasurementRow) -> bool {
    raw_fields(row).iter().any(|t| contains_any(t, NO_ACCESS_MARKERS))
}

pub fn is_new(row: &MeasurementRow) -> bool {
    raw_fields(row).iter().any(|t| contains_any(t, NEW_MARKERS))
}

pub fn is_destroyed(row: &MeasurementRow) -> bool {
    raw_fields(row).iter().any(|t| contains_any(t, DESTROYED_MARKERS))
}

/// Highest-priority status on the row: destroyed, then no access, then new.
pub fn row_status(row: &MeasurementRow) -> Option<RowStatus> {
    if is_destroyed(row) {
        Some(RowStatus::Destroyed)
    } else if is_no_access(row) {
        Some(RowStatus::NoAccess)
    } else if is_new(row) {
        Some(RowStatus::New)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_case_insensitive() {
        let row = MeasurementRow::from_raw("1", 1, "НЕТ ДОСТУПА", "", "");
        assert!(is_no_access(&row));
        assert!(!is_new(&row));

        let row = MeasurementRow::from_raw("2", 1, "12.4", "Новая", "");
        assert!(is_new(&row));
        assert_eq!(row_status(&row), Some(RowStatus::New));
    }

    #[test]
    fn test_total_text_is_ignored() {
        let row = MeasurementRow::from_raw("3", 1, "", "", "уничтожена");
        assert_eq!(row_status(&row), None);
    }

    #[test]
    fn test_destroyed_wins() {
        let row = MeasurementRow::from_raw("4", 1, "уничтожена", "нет доступа", "");
        assert_eq!(row_status(&row), Some(RowStatus::Destroyed));
    }
}
