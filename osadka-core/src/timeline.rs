//! Per-point cycle timelines: classifies every (point, cycle) pair into a
//! [`StateKind`] and compresses runs of equal kinds into display segments.

use crate::status::{self, RowStatus};
use osadka_schemas::{
    cycle_state::{CycleState, StateKind},
    measurement::MeasurementRow,
    project::CycleIndex,
};
use std::collections::HashMap;

/// A maximal run of consecutive states of one kind. Missing runs never
/// become segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSegment {
    pub start_index: usize,
    pub span: usize,
    pub cycle_from: i32,
    pub cycle_to: i32,
    pub kind: StateKind,
    pub annotation: Option<String>,
}

/// All segments of one kind, in the order the kind first appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleMeaningGroup {
    pub kind: StateKind,
    pub meaning: String,
    pub display_order: usize,
    pub segments: Vec<CycleSegment>,
}

impl CycleMeaningGroup {
    pub fn is_alternate_row(&self) -> bool {
        self.display_order % 2 == 1
    }

    pub fn is_first_row(&self) -> bool {
        self.display_order == 0
    }
}

/// Splits ordered states into segments and groups them by kind.
///
/// States must already be sorted by cycle number.
pub fn rebuild_segments(states: &[CycleState]) -> (Vec<CycleSegment>, Vec<CycleMeaningGroup>) {
    let mut segments = Vec::new();
    let Some(first) = states.first() else {
        return (segments, Vec::new());
    };

    let mut run_start = 0;
    let mut run_kind = first.kind;
    let mut run_annotation = first.annotation.clone();

    for i in 1..=states.len() {
        let boundary = i == states.len() || states[i].kind != run_kind;
        if !boundary {
            continue;
        }
        if run_kind != StateKind::Missing {
            segments.push(CycleSegment {
                start_index: run_start,
                span: i - run_start,
                cycle_from: states[run_start].cycle_number,
                cycle_to: states[i - 1].cycle_number,
                kind: run_kind,
                annotation: run_annotation.take(),
            });
        }
        if let Some(next) = states.get(i) {
            run_start = i;
            run_kind = next.kind;
            run_annotation = next.annotation.clone();
        }
    }

    let meaning_groups = group_by_meaning(&segments);
    (segments, meaning_groups)
}

fn group_by_meaning(segments: &[CycleSegment]) -> Vec<CycleMeaningGroup> {
    let mut groups: Vec<CycleMeaningGroup> = Vec::new();
    for segment in segments {
        match groups.iter_mut().find(|g| g.kind == segment.kind) {
            Some(group) => group.segments.push(segment.clone()),
            None => {
                let display_order = groups.len();
                groups.push(CycleMeaningGroup {
                    kind: segment.kind,
                    meaning: segment.kind.label().to_string(),
                    display_order,
                    segments: vec![segment.clone()],
                });
            }
        }
    }
    groups
}

/// A named set of cycle states with its derived segments.
///
/// Segments and meaning groups are owned by the group and rebuilt wholesale
/// from `states` on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleStateGroup {
    key: String,
    pub display_name: String,
    /// Presentation metadata, never computed here.
    pub accent_color: Option<String>,
    states: Vec<CycleState>,
    segments: Vec<CycleSegment>,
    meaning_groups: Vec<CycleMeaningGroup>,
}

impl CycleStateGroup {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            accent_color: None,
            states: Vec::new(),
            segments: Vec::new(),
            meaning_groups: Vec::new(),
        }
    }

    pub fn with_states(mut self, states: Vec<CycleState>) -> Self {
        self.set_states(states);
        self
    }

    pub fn set_states(&mut self, states: Vec<CycleState>) {
        self.states = states;
        let (segments, meaning_groups) = rebuild_segments(&self.states);
        self.segments = segments;
        self.meaning_groups = meaning_groups;
    }

    pub fn rename(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn states(&self) -> &[CycleState] {
        &self.states
    }

    pub fn segments(&self) -> &[CycleSegment] {
        &self.segments
    }

    pub fn meaning_groups(&self) -> &[CycleMeaningGroup] {
        &self.meaning_groups
    }
}

/// Classifies a single reading. Status markers win over numbers so that a
/// "new" point with its first elevation still shows as new.
pub fn classify_row(row: &MeasurementRow) -> (StateKind, Option<String>) {
    if let Some(status) = status::row_status(row) {
        let kind = match status {
            RowStatus::Destroyed => StateKind::Destroyed,
            RowStatus::NoAccess => StateKind::NoAccess,
            RowStatus::New => StateKind::New,
        };
        return (kind, first_text(row));
    }
    if row.has_numeric() {
        return (StateKind::Measured, None);
    }
    match first_text(row) {
        Some(text) => (StateKind::Text, Some(text)),
        None => (StateKind::Missing, None),
    }
}

fn first_text(row: &MeasurementRow) -> Option<String> {
    [&row.mark_raw, &row.settl_raw, &row.total_raw]
        .into_iter()
        .map(|t| t.trim())
        .find(|t| !t.is_empty() && osadka_schemas::measurement::parse_number(t).is_none())
        .map(str::to_string)
}

/// One group per point id of an object, one state per cycle of that object.
/// Ids are ordered by first appearance walking the cycles in ascending order.
pub fn build_state_groups(cycles: &CycleIndex) -> Vec<CycleStateGroup> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_cycle: Vec<(i32, HashMap<&str, &MeasurementRow>)> = Vec::new();

    for (&cycle, rows) in cycles {
        let mut lookup = HashMap::new();
        for row in rows {
            if !lookup.contains_key(row.id.as_str()) {
                if !order.contains(&row.id.as_str()) {
                    order.push(row.id.as_str());
                }
                lookup.insert(row.id.as_str(), row);
            }
        }
        by_cycle.push((cycle, lookup));
    }

    order
        .into_iter()
        .map(|id| {
            let states = by_cycle
                .iter()
                .map(|(cycle, lookup)| match lookup.get(id) {
                    Some(row) => {
                        let (kind, annotation) = classify_row(row);
                        CycleState {
                            cycle_number: *cycle,
                            kind,
                            annotation,
                        }
                    }
                    None => CycleState::new(*cycle, StateKind::Missing),
                })
                .collect();
            CycleStateGroup::new(id, id).with_states(states)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(kinds: &[(i32, StateKind)]) -> Vec<CycleState> {
        kinds.iter().map(|&(c, k)| CycleState::new(c, k)).collect()
    }

    #[test]
    fn test_missing_gap_splits_segments() {
        let (segments, groups) = rebuild_segments(&states(&[
            (1, StateKind::Measured),
            (2, StateKind::Missing),
            (3, StateKind::Measured),
        ]));

        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].cycle_from, segments[0].cycle_to), (1, 1));
        assert_eq!((segments[1].cycle_from, segments[1].cycle_to), (3, 3));
        assert_eq!(segments[1].start_index, 2);
        assert!(segments.iter().all(|s| s.kind == StateKind::Measured));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].segments.len(), 2);
    }

    #[test]
    fn test_runs_are_compressed() {
        let (segments, _) = rebuild_segments(&states(&[
            (1, StateKind::New),
            (2, StateKind::Measured),
            (3, StateKind::Measured),
            (4, StateKind::Measured),
            (5, StateKind::NoAccess),
            (6, StateKind::Missing),
            (7, StateKind::Missing),
        ]));

        let summary: Vec<_> = segments
            .iter()
            .map(|s| (s.kind, s.start_index, s.span, s.cycle_from, s.cycle_to))
            .collect();
        assert_eq!(
            summary,
            vec![
                (StateKind::New, 0, 1, 1, 1),
                (StateKind::Measured, 1, 3, 2, 4),
                (StateKind::NoAccess, 4, 1, 5, 5),
            ]
        );
    }

    #[test]
    fn test_meaning_groups_keep_first_seen_order() {
        let (_, groups) = rebuild_segments(&states(&[
            (1, StateKind::NoAccess),
            (2, StateKind::Measured),
            (3, StateKind::NoAccess),
            (4, StateKind::Destroyed),
        ]));

        let kinds: Vec<_> = groups.iter().map(|g| g.kind).collect();
        assert_eq!(
            kinds,
            vec![StateKind::NoAccess, StateKind::Measured, StateKind::Destroyed]
        );
        assert_eq!(groups[0].segments.len(), 2);
        assert!(groups[0].is_first_row());
        assert!(groups[1].is_alternate_row());
        assert!(!groups[2].is_alternate_row());
        assert_eq!(groups[2].display_order, 2);
        assert_eq!(groups[2].meaning, "Destroyed");
    }

    #[test]
    fn test_annotation_comes_from_run_start() {
        let input = vec![
            CycleState::new(1, StateKind::Text).with_annotation("под снегом"),
            CycleState::new(2, StateKind::Text).with_annotation("завалена"),
        ];
        let (segments, _) = rebuild_segments(&input);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].annotation.as_deref(), Some("под снегом"));
    }

    #[test]
    fn test_empty_and_all_missing() {
        let (segments, groups) = rebuild_segments(&[]);
        assert!(segments.is_empty());
        assert!(groups.is_empty());

        let (segments, groups) =
            rebuild_segments(&states(&[(1, StateKind::Missing), (2, StateKind::Missing)]));
        assert!(segments.is_empty());
        assert!(groups.is_empty());
    }

    #[test]
    fn test_group_rebuilds_on_set_states() {
        let mut group = CycleStateGroup::new("g1", "Rp 1")
            .with_states(states(&[(1, StateKind::Measured), (2, StateKind::Measured)]));
        assert_eq!(group.segments().len(), 1);

        group.set_states(states(&[(1, StateKind::Measured), (2, StateKind::Destroyed)]));
        assert_eq!(group.segments().len(), 2);
        assert_eq!(group.meaning_groups().len(), 2);

        group.rename("Rp 1a");
        assert_eq!(group.key(), "g1");
        assert_eq!(group.display_name, "Rp 1a");
        assert_eq!(group.segments().len(), 2);
    }

    #[test]
    fn test_classify_row() {
        let measured = MeasurementRow::from_raw("1", 1, "100.5", "-0.3", "-1.2");
        assert_eq!(classify_row(&measured), (StateKind::Measured, None));

        let new = MeasurementRow::from_raw("1", 1, "100.5", "новая", "");
        assert_eq!(
            classify_row(&new),
            (StateKind::New, Some("новая".to_string()))
        );

        let blocked = MeasurementRow::from_raw("1", 1, "нет доступа", "", "");
        assert_eq!(classify_row(&blocked).0, StateKind::NoAccess);

        let text = MeasurementRow::from_raw("1", 1, "", "", "под машиной");
        assert_eq!(
            classify_row(&text),
            (StateKind::Text, Some("под машиной".to_string()))
        );

        let empty = MeasurementRow::from_raw("1", 1, "", " ", "");
        assert_eq!(classify_row(&empty), (StateKind::Missing, None));
    }

    #[test]
    fn test_build_state_groups_marks_absent_ids_missing() {
        let mut cycles = CycleIndex::new();
        cycles.insert(
            1,
            vec![
                MeasurementRow::from_raw("A", 1, "10", "0", "0"),
                MeasurementRow::from_raw("B", 1, "11", "0", "0"),
            ],
        );
        cycles.insert(2, vec![MeasurementRow::from_raw("A", 2, "9.9", "-0.1", "-0.1")]);
        cycles.insert(
            3,
            vec![
                MeasurementRow::from_raw("B", 3, "10.8", "-0.1", "-0.2"),
                MeasurementRow::from_raw("C", 3, "12", "новая", ""),
            ],
        );

        let groups = build_state_groups(&cycles);
        let keys: Vec<_> = groups.iter().map(|g| g.key()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);

        let b = &groups[1];
        let kinds: Vec<_> = b.states().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StateKind::Measured, StateKind::Missing, StateKind::Measured]
        );
        assert_eq!(b.segments().len(), 2);

        let c = &groups[2];
        assert_eq!(c.segments().len(), 1);
        assert_eq!(c.segments()[0].kind, StateKind::New);
        assert_eq!(c.segments()[0].cycle_from, 3);
    }
}
