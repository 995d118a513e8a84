//! Exclusion and implication constraints between axis values.

use crate::row::Row;
use crate::selector::{Assignment, Selector};
use std::fmt;
use std::sync::Arc;

/// Predicate over a complete row; `true` rejects the row.
pub type RowPredicate = Arc<dyn Fn(&Row) -> bool + Send + Sync>;

/// A registered constraint.
#[derive(Clone)]
pub enum Constraint {
    /// Rows matching the selector are invalid
    Exclude(Selector),

    /// Rows for which the predicate returns true are invalid
    ExcludeRow { label: String, test: RowPredicate },

    /// Rows matching `condition` must also match `requirement`
    Imply {
        condition: Selector,
        requirement: Selector,
    },
}

impl Constraint {
    /// Three-valued violation check over a partial assignment.
    ///
    /// `Some(true)` means no completion of the assignment can satisfy the
    /// constraint. Row predicates only see complete rows, so they always
    /// report `None` here.
    pub fn violation<A: Assignment + ?Sized>(&self, assignment: &A) -> Option<bool> {
        match self {
            Constraint::Exclude(selector) => selector.evaluate(assignment),
            Constraint::ExcludeRow { .. } => None,
            Constraint::Imply {
                condition,
                requirement,
            } => match condition.evaluate(assignment) {
                Some(false) => Some(false),
                cond => match (cond, requirement.evaluate(assignment)) {
                    (_, Some(true)) => Some(false),
                    (Some(true), Some(false)) => Some(true),
                    _ => None,
                },
            },
        }
    }

    /// Definitive check over a complete row.
    pub fn is_violated_by(&self, row: &Row) -> bool {
        match self {
            Constraint::ExcludeRow { test, .. } => test(row),
            _ => self.violation(row) == Some(true),
        }
    }

    /// Selectors referenced by this constraint.
    pub fn selectors(&self) -> Vec<&Selector> {
        match self {
            Constraint::Exclude(selector) => vec![selector],
            Constraint::ExcludeRow { .. } => Vec::new(),
            Constraint::Imply {
                condition,
                requirement,
            } => vec![condition, requirement],
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Exclude(selector) => write!(f, "exclude {}", selector),
            Constraint::ExcludeRow { label, .. } => write!(f, "exclude rows where {}", label),
            Constraint::Imply {
                condition,
                requirement,
            } => write!(f, "imply {} => {}", condition, requirement),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constraint({})", self)
    }
}
