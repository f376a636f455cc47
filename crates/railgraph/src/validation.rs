//! Snapshot validation and integrity checking.
//!
//! Detects problems that would make a projection fail to build or silently
//! drop sections: duplicate point ids, sections pointing at unknown points,
//! unusable weights, self-loops and points nothing connects to.

use crate::persistence::GraphSnapshot;
use crate::projection::GraphSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Types
// ============================================================================

/// Result of snapshot validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the snapshot is valid (no critical issues).
    pub valid: bool,
    /// Critical issues that should be fixed.
    pub errors: Vec<ValidationIssue>,
    /// Non-critical issues (warnings).
    pub warnings: Vec<ValidationIssue>,
    /// Informational findings.
    pub info: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty (valid) result.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Add an error (marks the snapshot as invalid).
    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.valid = false;
        self.errors.push(issue);
    }

    /// Add a warning.
    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Add an informational finding.
    pub fn add_info(&mut self, issue: ValidationIssue) {
        self.info.push(issue);
    }

    /// Total issue count (errors + warnings).
    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    /// Whether any issue carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .chain(&self.info)
            .any(|issue| issue.code == code)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// A validation issue found in the snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue type/code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Affected point ids.
    pub points: Vec<String>,
    /// Affected section descriptions.
    pub sections: Vec<String>,
}

impl ValidationIssue {
    /// Create a new issue.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            points: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Attach affected points.
    pub fn with_points(mut self, points: Vec<String>) -> Self {
        self.points = points;
        self
    }

    /// Attach affected sections.
    pub fn with_sections(mut self, sections: Vec<String>) -> Self {
        self.sections = sections;
        self
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate a snapshot against the schema used to project it.
///
/// Checks for:
/// - Duplicate point ids
/// - Sections referencing unknown points
/// - Negative or non-finite weights
/// - Sections without the weight property
/// - Self-loops
/// - Points without any routable section
/// - Points without a name or coordinates
pub fn validate_snapshot(snapshot: &GraphSnapshot, schema: &GraphSchema) -> ValidationResult {
    let mut result = ValidationResult::new();

    check_duplicate_points(snapshot, &mut result);
    check_dangling_sections(snapshot, schema, &mut result);
    check_weights(snapshot, schema, &mut result);
    check_self_loops(snapshot, schema, &mut result);
    check_orphans(snapshot, schema, &mut result);
    check_unnamed_points(snapshot, schema, &mut result);
    check_missing_coordinates(snapshot, schema, &mut result);

    result
}

/// Quick check if a snapshot has any validation errors.
pub fn is_valid(snapshot: &GraphSnapshot, schema: &GraphSchema) -> bool {
    validate_snapshot(snapshot, schema).valid
}

fn describe(from: &str, to: &str) -> String {
    format!("{from} - {to}")
}

fn routable<'a>(
    snapshot: &'a GraphSnapshot,
    schema: &'a GraphSchema,
) -> impl Iterator<Item = &'a crate::persistence::SectionRecord> {
    snapshot
        .sections
        .iter()
        .filter(move |s| s.relationship == schema.relationship_type)
}

fn projected_ids<'a>(snapshot: &'a GraphSnapshot, schema: &GraphSchema) -> HashSet<&'a str> {
    snapshot
        .points
        .iter()
        .filter(|p| p.kind == schema.node_label)
        .map(|p| p.id.as_str())
        .collect()
}

// ============================================================================
// Individual checks
// ============================================================================

fn check_duplicate_points(snapshot: &GraphSnapshot, result: &mut ValidationResult) {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for point in &snapshot.points {
        if !seen.insert(point.id.as_str()) && !duplicates.contains(&point.id) {
            duplicates.push(point.id.clone());
        }
    }

    if !duplicates.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DUPLICATE_POINTS",
                format!("{} point id(s) appear more than once", duplicates.len()),
            )
            .with_points(duplicates),
        );
    }
}

fn check_dangling_sections(
    snapshot: &GraphSnapshot,
    schema: &GraphSchema,
    result: &mut ValidationResult,
) {
    let ids = projected_ids(snapshot, schema);
    let dangling: Vec<String> = routable(snapshot, schema)
        .filter(|s| !ids.contains(s.from.as_str()) || !ids.contains(s.to.as_str()))
        .map(|s| describe(&s.from, &s.to))
        .collect();

    if !dangling.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DANGLING_SECTIONS",
                format!("{} section(s) reference unknown points", dangling.len()),
            )
            .with_sections(dangling),
        );
    }
}

fn check_weights(snapshot: &GraphSnapshot, schema: &GraphSchema, result: &mut ValidationResult) {
    let mut invalid: Vec<String> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for section in routable(snapshot, schema) {
        match section.weight(&schema.weight_property) {
            Some(w) if !w.is_finite() || w < 0.0 => {
                invalid.push(format!("{} ({w})", describe(&section.from, &section.to)));
            }
            Some(_) => {}
            None => missing.push(describe(&section.from, &section.to)),
        }
    }

    if !invalid.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "INVALID_WEIGHTS",
                format!(
                    "{} section(s) have a negative or non-finite {}",
                    invalid.len(),
                    schema.weight_property
                ),
            )
            .with_sections(invalid),
        );
    }
    if !missing.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "MISSING_WEIGHTS",
                format!(
                    "{} section(s) lack {} and will not be routable",
                    missing.len(),
                    schema.weight_property
                ),
            )
            .with_sections(missing),
        );
    }
}

fn check_self_loops(snapshot: &GraphSnapshot, schema: &GraphSchema, result: &mut ValidationResult) {
    let loops: Vec<String> = routable(snapshot, schema)
        .filter(|s| s.from == s.to)
        .map(|s| describe(&s.from, &s.to))
        .collect();

    if !loops.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "SELF_LOOPS",
                format!("{} section(s) are self-loops", loops.len()),
            )
            .with_sections(loops),
        );
    }
}

fn check_orphans(snapshot: &GraphSnapshot, schema: &GraphSchema, result: &mut ValidationResult) {
    let mut connected: HashSet<&str> = HashSet::new();
    for section in routable(snapshot, schema).filter(|s| s.from != s.to) {
        connected.insert(section.from.as_str());
        connected.insert(section.to.as_str());
    }

    let orphans: Vec<String> = snapshot
        .points
        .iter()
        .filter(|p| p.kind == schema.node_label && !connected.contains(p.id.as_str()))
        .map(|p| p.id.clone())
        .collect();

    if !orphans.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "ORPHAN_POINTS",
                format!("{} point(s) have no sections", orphans.len()),
            )
            .with_points(orphans),
        );
    }
}

fn check_unnamed_points(
    snapshot: &GraphSnapshot,
    schema: &GraphSchema,
    result: &mut ValidationResult,
) {
    let unnamed: Vec<String> = snapshot
        .points
        .iter()
        .filter(|p| p.kind == schema.node_label)
        .filter(|p| p.name.as_deref().is_none_or(|n| n.trim().is_empty()))
        .map(|p| p.id.clone())
        .collect();

    if !unnamed.is_empty() {
        result.add_info(
            ValidationIssue::new(
                "UNNAMED_POINTS",
                format!("{} point(s) have no name; ids are shown instead", unnamed.len()),
            )
            .with_points(unnamed),
        );
    }
}

fn check_missing_coordinates(
    snapshot: &GraphSnapshot,
    schema: &GraphSchema,
    result: &mut ValidationResult,
) {
    let mut by_country: HashMap<String, usize> = HashMap::new();
    let mut points: Vec<String> = Vec::new();
    for point in snapshot
        .points
        .iter()
        .filter(|p| p.kind == schema.node_label && (p.lat.is_none() || p.lon.is_none()))
    {
        let country = point.to_point().country;
        *by_country.entry(country).or_insert(0) += 1;
        points.push(point.id.clone());
    }

    if !points.is_empty() {
        result.add_info(
            ValidationIssue::new(
                "MISSING_COORDINATES",
                format!(
                    "{} point(s) in {} country(ies) cannot be placed on a map",
                    points.len(),
                    by_country.len()
                ),
            )
            .with_points(points),
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
