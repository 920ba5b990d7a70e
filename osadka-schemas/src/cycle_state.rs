use serde::{Deserialize, Serialize};

/// What happened to a point in one survey cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Measured,
    New,
    NoAccess,
    Destroyed,
    /// Free-text annotation with no numeric reading.
    Text,
    Missing,
}

impl StateKind {
    pub fn label(&self) -> &'static str {
        match self {
            StateKind::Measured => "Measured",
            StateKind::New => "New point",
            StateKind::NoAccess => "No access",
            StateKind::Destroyed => "Destroyed",
            StateKind::Text => "Annotated",
            StateKind::Missing => "Missing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleState {
    pub cycle_number: i32,
    pub kind: StateKind,
    pub annotation: Option<String>,
}

impl CycleState {
    pub fn new(cycle_number: i32, kind: StateKind) -> Self {
        Self {
            cycle_number,
            kind,
            annotation: None,
        }
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn has_data(&self) -> bool {
        self.kind != StateKind::Missing
    }
}
