//! Input validation for exam timetabling problems.
//!
//! Checks structural integrity of exams, calendar, and constraint
//! definitions before evolution starts. Detects:
//! - Duplicate exam IDs and duplicate calendar slots
//! - Non-positive durations, negative extra time, zero slot counts
//! - Pre-fixed exams off the calendar or overlapping each other
//! - Constraints referencing unknown exams
//! - Day intervals ending before they start
//! - Exams ordered relative to themselves
//! - Cycles among hardified ordering constraints (DAG validation)
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::constraints::{ConstraintDef, ConstraintKind};
use crate::models::{Assignment, Exam, ExamCalendar, ExamId};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two exams share the same ID.
    DuplicateId,
    /// The calendar lists the same slot twice.
    DuplicateSlot,
    /// Duration, extra time or slot count out of range.
    InvalidDuration,
    /// A constraint references an exam that doesn't exist.
    InvalidExamReference,
    /// Interval end precedes its start.
    InvalidInterval,
    /// A pre-fixed exam starts at a slot the calendar doesn't offer.
    FixedOffCalendar,
    /// Two pre-fixed exams occupy overlapping time.
    FixedOverlap,
    /// An ordering constraint relates an exam to itself.
    SelfReference,
    /// Hardified ordering constraints form a cycle.
    CyclicOrder,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for an exam timetabling problem.
///
/// Checks:
/// 1. No duplicate exam IDs
/// 2. No duplicate calendar slots
/// 3. Positive durations, non-negative extra time, slot count ≥ 1
/// 4. Pre-fixed exams sit on calendar slots and don't overlap
/// 5. All constraint exam references point to existing exams
/// 6. Day intervals satisfy `start <= end`
/// 7. Ordering constraints relate two distinct exams
/// 8. No cycles among hardified ordering constraints
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_problem(
    exams: &[Exam],
    calendar: &ExamCalendar,
    constraints: &[ConstraintDef],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut exam_ids = HashSet::new();
    for exam in exams {
        if !exam_ids.insert(exam.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate exam ID: {}", exam.id),
            ));
        }
        if exam.duration_minutes <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!(
                    "Exam {} has non-positive duration {}",
                    exam.id, exam.duration_minutes
                ),
            ));
        }
        if exam.extra_minutes < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Exam {} has negative extra time {}", exam.id, exam.extra_minutes),
            ));
        }
        if exam.slot_count == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Exam {} requires zero slots", exam.id),
            ));
        }
    }

    // Slots are sorted, so duplicates are adjacent
    for pair in calendar.slots().windows(2) {
        if pair[0] == pair[1] {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSlot,
                format!("Duplicate calendar slot: {} {}", pair[0].date, pair[0].start),
            ));
        }
    }

    errors.extend(check_fixed_exams(exams, calendar));

    for (index, def) in constraints.iter().enumerate() {
        for exam in def.kind.exams() {
            if !exam_ids.contains(&exam) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidExamReference,
                    format!(
                        "Constraint #{index} ({}) references unknown exam {exam}",
                        def.kind.code()
                    ),
                ));
            }
        }
        match def.kind {
            ConstraintKind::DayInterval { exam, start, end } if end < start => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidInterval,
                    format!(
                        "Day interval for exam {exam} ends ({end}) before it starts ({start})"
                    ),
                ));
            }
            ConstraintKind::Order { first, second } if first == second => {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SelfReference,
                    format!("Exam {first} is ordered relative to itself"),
                ));
            }
            _ => {}
        }
    }

    if let Some(cycle_err) = detect_cycles(constraints) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Pre-fixed exams bypass the decoder, so their slot and overlap checks
/// happen here.
fn check_fixed_exams(exams: &[Exam], calendar: &ExamCalendar) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut sittings: Vec<(ExamId, Assignment)> = Vec::new();

    for exam in exams {
        let Some(slot) = exam.fixed else {
            continue;
        };
        if !calendar.contains(&slot) {
            errors.push(ValidationError::new(
                ValidationErrorKind::FixedOffCalendar,
                format!(
                    "Exam {} is fixed at {} {}, which is not a calendar slot",
                    exam.id, slot.date, slot.start
                ),
            ));
        }
        sittings.push((exam.id, Assignment::new(exam.id, slot, exam.window_at(&slot))));
    }

    for (i, (a_id, a)) in sittings.iter().enumerate() {
        for (b_id, b) in &sittings[i + 1..] {
            if a.collides_with(b) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::FixedOverlap,
                    format!("Fixed exams {a_id} and {b_id} overlap on {}", a.date),
                ));
            }
        }
    }

    errors
}

/// Detects cycles among hardified ordering constraints using DFS.
///
/// Weak ordering cycles are only unsatisfiable penalties; hard ones make
/// every schedule infeasible, so they are rejected up front.
///
/// # Reference
/// Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
fn detect_cycles(constraints: &[ConstraintDef]) -> Option<ValidationError> {
    // exam → exams that must come after it
    let mut adj: HashMap<ExamId, Vec<ExamId>> = HashMap::new();
    let mut nodes: Vec<ExamId> = Vec::new();

    for def in constraints.iter().filter(|d| d.hardify) {
        if let ConstraintKind::Order { first, second } = def.kind {
            adj.entry(first).or_default().push(second);
            nodes.push(first);
            nodes.push(second);
        }
    }
    nodes.sort();
    nodes.dedup();

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for &node in &nodes {
        if !visited.contains(&node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicOrder,
                format!("Circular hard ordering detected involving exam {node}"),
            ));
        }
    }

    None
}

fn has_cycle_dfs(
    node: ExamId,
    adj: &HashMap<ExamId, Vec<ExamId>>,
    visited: &mut HashSet<ExamId>,
    in_stack: &mut HashSet<ExamId>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(&node) {
        for &next in neighbors {
            if in_stack.contains(&next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(&next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(&node);
    false
}
