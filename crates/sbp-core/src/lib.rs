#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four blueprint lanes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    #[serde(rename = "C")]
    Customer,
    #[serde(rename = "F")]
    Frontstage,
    #[serde(rename = "B")]
    Backstage,
    #[serde(rename = "P")]
    Support,
}

impl Role {
    /// Lanes in display order, top to bottom.
    pub const ALL: [Self; 4] = [
        Self::Customer,
        Self::Frontstage,
        Self::Backstage,
        Self::Support,
    ];

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Customer => 'C',
            Self::Frontstage => 'F',
            Self::Backstage => 'B',
            Self::Support => 'P',
        }
    }

    /// Map a canonical one-letter code to its role. Case-sensitive.
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'C' => Some(Self::Customer),
            'F' => Some(Self::Frontstage),
            'B' => Some(Self::Backstage),
            'P' => Some(Self::Support),
            _ => None,
        }
    }

    /// Short lane label used by renderers.
    #[must_use]
    pub const fn lane_label(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Frontstage => "Front",
            Self::Backstage => "Back",
            Self::Support => "Process",
        }
    }
}

/// One role+action unit. `role` is `None` only for padded legacy slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Segment {
    pub role: Option<Role>,
    pub action: String,
}

impl Segment {
    #[must_use]
    pub fn new(role: Role, action: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            action: action.into(),
        }
    }

    /// Inline-style label: `"C Click Cart"`, `"C"` or `"Click Cart"`.
    #[must_use]
    pub fn label(&self) -> String {
        match (self.role, self.action.is_empty()) {
            (Some(role), false) => format!("{} {}", role.code(), self.action),
            (Some(role), true) => role.code().to_string(),
            (None, _) => self.action.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EdgeKind {
    /// Continuation to the next segment.
    #[default]
    Linear,
    /// Extra edge from a double slash, skipping one segment ahead.
    Branch,
}

impl EdgeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Branch => "branch",
        }
    }
}

/// Directed edge between two segment indices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub kind: EdgeKind,
}

impl Edge {
    #[must_use]
    pub const fn linear(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::Linear,
        }
    }

    #[must_use]
    pub const fn branch(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::Branch,
        }
    }

    #[must_use]
    pub const fn pair(self) -> (usize, usize) {
        (self.from, self.to)
    }
}

/// The grammar that produced a record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Grammar {
    /// `step, flow, actions`
    Legacy,
    /// `Step:C Action/F Action//B Action|P Action`
    #[default]
    Inline,
}

impl Grammar {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Inline => "inline",
        }
    }
}

/// A parsed blueprint line: step label, aligned role/action sequence, and edges.
///
/// Roles and actions live together in `segments`, so the two sequences always
/// have the same length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BlueprintStep {
    pub step: String,
    pub segments: Vec<Segment>,
    pub edges: Vec<Edge>,
}

impl BlueprintStep {
    #[must_use]
    pub fn empty(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            segments: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn roles(&self) -> Vec<Option<Role>> {
        self.segments.iter().map(|segment| segment.role).collect()
    }

    #[must_use]
    pub fn actions(&self) -> Vec<&str> {
        self.segments
            .iter()
            .map(|segment| segment.action.as_str())
            .collect()
    }

    #[must_use]
    pub fn edge_pairs(&self) -> Vec<(usize, usize)> {
        self.edges.iter().map(|edge| edge.pair()).collect()
    }

    #[must_use]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.from == from && edge.to == to)
    }

    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Branch)
            .count()
    }

    /// Role codes as a compact string, `-` for padded slots: `"CFBP"`.
    #[must_use]
    pub fn role_codes(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.role.map_or('-', Role::code))
            .collect()
    }

    /// Inline-style summary joined by `" / "`.
    #[must_use]
    pub fn recap(&self) -> String {
        self.segments
            .iter()
            .map(Segment::label)
            .collect::<Vec<_>>()
            .join(" / ")
    }

    /// Edges leaving `index`, in list order.
    pub fn outgoing(&self, index: usize) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.from == index)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BlueprintErrorCode {
    #[default]
    EmptyLine,
    MalformedLegacy,
    UnsupportedRole,
    MissingStep,
    EmptySegment,
    MissingTrailingSegment,
    InvalidRolePrefix,
    MissingBranchTarget,
}

impl BlueprintErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyLine => "sbp/error/empty-line",
            Self::MalformedLegacy => "sbp/error/malformed-legacy",
            Self::UnsupportedRole => "sbp/error/unsupported-role",
            Self::MissingStep => "sbp/error/missing-step",
            Self::EmptySegment => "sbp/error/empty-segment",
            Self::MissingTrailingSegment => "sbp/error/missing-trailing-segment",
            Self::InvalidRolePrefix => "sbp/error/invalid-role-prefix",
            Self::MissingBranchTarget => "sbp/error/missing-branch-target",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum BlueprintError {
    #[error("Empty line")]
    EmptyLine,
    #[error("Line must have 3 comma-separated fields: {line}")]
    MalformedLegacy { line: String },
    #[error("Unsupported flow code '{token}' (expected one of [B, C, F, P])")]
    UnsupportedRole { token: String },
    #[error("Inline-labeled format requires 'Step:FAction/...' or 'Step FAction/...'")]
    MissingStep,
    #[error("Missing role/action between separators in inline-labeled input (segment {index})")]
    EmptySegment { index: usize },
    #[error("Inline-labeled input must end with a role/action segment")]
    MissingTrailingSegment,
    #[error("Invalid role prefix in segment: '{segment}' (expected C/F/B/P)")]
    InvalidRolePrefix { segment: String },
    #[error(
        "Double slash '//' after segment {index} must be followed by another role/action segment"
    )]
    MissingBranchTarget { index: usize },
}

impl BlueprintError {
    #[must_use]
    pub const fn code(&self) -> BlueprintErrorCode {
        match self {
            Self::EmptyLine => BlueprintErrorCode::EmptyLine,
            Self::MalformedLegacy { .. } => BlueprintErrorCode::MalformedLegacy,
            Self::UnsupportedRole { .. } => BlueprintErrorCode::UnsupportedRole,
            Self::MissingStep => BlueprintErrorCode::MissingStep,
            Self::EmptySegment { .. } => BlueprintErrorCode::EmptySegment,
            Self::MissingTrailingSegment => BlueprintErrorCode::MissingTrailingSegment,
            Self::InvalidRolePrefix { .. } => BlueprintErrorCode::InvalidRolePrefix,
            Self::MissingBranchTarget { .. } => BlueprintErrorCode::MissingBranchTarget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlueprintError, BlueprintErrorCode, BlueprintStep, Edge, EdgeKind, Role, Segment};

    fn sample_step() -> BlueprintStep {
        BlueprintStep {
            step: "Checkout".to_string(),
            segments: vec![
                Segment::new(Role::Customer, "Pay"),
                Segment::new(Role::Frontstage, "Charge"),
                Segment::new(Role::Backstage, ""),
                Segment {
                    role: None,
                    action: "Notify".to_string(),
                },
            ],
            edges: vec![Edge::linear(0, 1), Edge::branch(0, 2), Edge::linear(1, 2)],
        }
    }

    #[test]
    fn role_codes_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_code(role.code()), Some(role));
        }
        assert_eq!(Role::from_code('c'), None);
        assert_eq!(Role::from_code('S'), None);
    }

    #[test]
    fn roles_serialize_as_single_letters() {
        let encoded = serde_json::to_string(&Role::ALL).expect("serialize roles");
        assert_eq!(encoded, r#"["C","F","B","P"]"#);
    }

    #[test]
    fn segment_labels_follow_inline_style() {
        let step = sample_step();
        let labels: Vec<String> = step.segments.iter().map(Segment::label).collect();
        assert_eq!(labels, vec!["C Pay", "F Charge", "B", "Notify"]);
        assert_eq!(step.recap(), "C Pay / F Charge / B / Notify");
    }

    #[test]
    fn step_accessors_stay_aligned() {
        let step = sample_step();
        assert_eq!(step.len(), 4);
        assert_eq!(step.roles().len(), step.actions().len());
        assert_eq!(step.role_codes(), "CFB-");
        assert_eq!(step.edge_pairs(), vec![(0, 1), (0, 2), (1, 2)]);
        assert!(step.has_edge(0, 2));
        assert!(!step.has_edge(2, 3));
        assert_eq!(step.branch_count(), 1);
        assert_eq!(step.outgoing(0).count(), 2);
    }

    #[test]
    fn edge_constructors_tag_kind() {
        assert_eq!(Edge::linear(1, 2).kind, EdgeKind::Linear);
        assert_eq!(Edge::branch(1, 3).kind, EdgeKind::Branch);
        assert_eq!(Edge::branch(1, 3).pair(), (1, 3));
    }

    #[test]
    fn error_codes_are_stable() {
        let err = BlueprintError::MissingBranchTarget { index: 0 };
        assert_eq!(err.code(), BlueprintErrorCode::MissingBranchTarget);
        assert_eq!(err.code().as_str(), "sbp/error/missing-branch-target");
        assert!(err.to_string().contains("Double slash"));
    }

    #[test]
    fn step_survives_json() {
        let step = sample_step();
        let encoded = serde_json::to_string(&step).expect("serialize step");
        let decoded: BlueprintStep = serde_json::from_str(&encoded).expect("deserialize step");
        assert_eq!(decoded, step);
    }
}
