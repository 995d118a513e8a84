//! MatrixBuilder: axis registry, constraint engine and row generation.
//!
//! Rows are produced by a randomized depth-first search over the axes in
//! registration order. Each level draws a weighted value among the
//! candidates still compatible with the values fixed above it; a level that
//! runs out of candidates backtracks one level up. The search is bounded by
//! a [`SearchBudget`] so heavily constrained spaces cannot loop forever.

use crate::axis::{Axis, AxisValue};
use crate::constraint::{Constraint, RowPredicate};
use crate::error::{ConfigError, MatrixError, Result};
use crate::rng::RandomSource;
use crate::row::{display_name, Cell, Row};
use crate::selector::{Assignment, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default number of fresh search attempts per requested row.
pub const DEFAULT_MAX_ATTEMPTS: usize = 32;

/// Default number of backtrack steps allowed in one attempt.
pub const DEFAULT_MAX_BACKTRACKS: usize = 4096;

/// Bounds on the row search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBudget {
    /// Fresh attempts before giving up on a row
    pub max_attempts: usize,

    /// Backtrack steps per attempt
    pub max_backtracks: usize,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_backtracks: DEFAULT_MAX_BACKTRACKS,
        }
    }
}

/// Result of one search attempt.
#[derive(Debug)]
enum Search {
    /// New valid row (value index per axis)
    Found(Vec<usize>),

    /// Whole space explored; nothing new and valid remains
    Exhausted { saw_duplicate: bool },

    /// Backtrack budget spent before a decision
    OutOfBudget { saw_duplicate: bool },
}

/// Rows handed back by [`MatrixBuilder::finish`].
#[derive(Debug)]
pub struct FinishedMatrix {
    /// Generated rows in generation order
    pub rows: Vec<Row>,

    /// Random stream, positioned after the last generation draw
    pub rng: RandomSource,
}

/// Accumulates axes and constraints, then generates unique valid rows.
pub struct MatrixBuilder {
    /// Registered axes (order matters for naming and search)
    axes: Vec<Axis>,

    /// Axis name -> index into `axes`
    axis_index: HashMap<String, usize>,

    /// Registered constraints
    constraints: Vec<Constraint>,

    /// Axis indices used to build row names (None = all, in order)
    name_pattern: Option<Vec<usize>>,

    /// Emitted rows
    rows: Vec<Row>,

    /// Value-index tuples of emitted rows
    seen: HashSet<Vec<usize>>,

    /// Fail instead of skipping unsatisfiable forced rows
    strict: bool,

    /// Search bounds
    budget: SearchBudget,

    /// The single random stream for this run
    rng: RandomSource,
}

impl MatrixBuilder {
    /// Creates an empty builder drawing from `rng`.
    pub fn new(rng: RandomSource) -> Self {
        Self {
            axes: Vec::new(),
            axis_index: HashMap::new(),
            constraints: Vec::new(),
            name_pattern: None,
            rows: Vec::new(),
            seen: HashSet::new(),
            strict: false,
            budget: SearchBudget::default(),
            rng,
        }
    }

    /// Creates an empty builder seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(RandomSource::new(seed))
    }

    /// Sets the search budget.
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Makes unsatisfiable forced rows fatal.
    pub fn fail_on_unsatisfiable(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// The run's random stream, for ad-hoc decisions that must stay reproducible.
    pub fn rng_mut(&mut self) -> &mut RandomSource {
        &mut self.rng
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axis_index.get(name).map(|&i| &self.axes[i])
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    // ═══════════════════════════════════════════════════════════════════
    // Registration
    // ═══════════════════════════════════════════════════════════════════

    /// Registers an axis.
    pub fn add_axis(&mut self, axis: Axis) -> std::result::Result<(), ConfigError> {
        axis.validate()?;
        if self.axis_index.contains_key(axis.name()) {
            return Err(ConfigError::DuplicateAxis(axis.name().to_string()));
        }
        if !self.rows.is_empty() {
            return Err(ConfigError::AxisAfterGeneration(axis.name().to_string()));
        }
        debug!(axis = axis.name(), values = axis.values().len(), "registered axis");
        self.axis_index.insert(axis.name().to_string(), self.axes.len());
        self.axes.push(axis);
        Ok(())
    }

    /// Excludes rows matching `selector`.
    pub fn exclude(&mut self, selector: Selector) -> std::result::Result<(), ConfigError> {
        let constraint = Constraint::Exclude(selector);
        if constraint.selectors().iter().all(|s| s.is_empty()) {
            return Err(ConfigError::EmptySelector(constraint.to_string()));
        }
        self.register(constraint)
    }

    /// Excludes rows for which `test` returns true.
    pub fn exclude_row<F>(&mut self, label: impl Into<String>, test: F) -> std::result::Result<(), ConfigError>
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        let test: RowPredicate = Arc::new(test);
        self.register(Constraint::ExcludeRow {
            label: label.into(),
            test,
        })
    }

    /// Requires `requirement` on every row matching `condition`.
    pub fn imply(&mut self, condition: Selector, requirement: Selector) -> std::result::Result<(), ConfigError> {
        self.register(Constraint::Imply {
            condition,
            requirement,
        })
    }

    fn register(&mut self, constraint: Constraint) -> std::result::Result<(), ConfigError> {
        let context = constraint.to_string();
        for selector in constraint.selectors() {
            self.check_selector(selector, &context)?;
        }
        debug!(constraint = %constraint, "registered constraint");
        self.constraints.push(constraint);
        Ok(())
    }

    /// Validates axis names; unknown tokens are only warned about so that
    /// temporarily disabled values do not break the configuration.
    fn check_selector(&self, selector: &Selector, context: &str) -> std::result::Result<(), ConfigError> {
        for (name, matcher) in selector.entries() {
            let axis = self.axis(name).ok_or_else(|| ConfigError::UnknownAxis {
                axis: name.to_string(),
                context: context.to_string(),
            })?;
            for token in matcher.named_tokens() {
                if axis.value(token).is_none() {
                    warn!(axis = name, token, context, "selector names a value the axis does not have");
                }
            }
        }
        Ok(())
    }

    /// Sets the axes (in order) whose titles form each row name.
    pub fn set_name_pattern(&mut self, axes: &[&str]) -> std::result::Result<(), ConfigError> {
        let pattern = axes
            .iter()
            .map(|name| {
                self.axis_index
                    .get(*name)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownAxis {
                        axis: name.to_string(),
                        context: "name pattern".to_string(),
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.name_pattern = Some(pattern);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Generation
    // ═══════════════════════════════════════════════════════════════════

    /// Generates one row matching `selector`.
    ///
    /// Returns the new row, or `None` when an existing row already matches
    /// or (in lenient mode) when no valid row matches. An empty selector
    /// always asks for a new row.
    pub fn generate_row(&mut self, selector: &Selector) -> Result<Option<&Row>> {
        self.check_selector(selector, &format!("generate_row {}", selector))?;

        if !selector.is_empty() {
            if let Some(existing) = self.rows.iter().find(|row| selector.matches(*row)) {
                debug!(%selector, row = existing.name(), "already covered by an existing row");
                return Ok(None);
            }
        }

        let mut saw_duplicate = false;
        let mut proven = false;
        let mut found = None;

        for attempt in 0..self.budget.max_attempts.max(1) {
            match self.search(selector) {
                Search::Found(picks) => {
                    found = Some(self.push_row(picks));
                    break;
                }
                Search::Exhausted { saw_duplicate: dup } => {
                    saw_duplicate |= dup;
                    proven = true;
                    break;
                }
                Search::OutOfBudget { saw_duplicate: dup } => {
                    saw_duplicate |= dup;
                    debug!(%selector, attempt, "search budget spent, retrying");
                }
            }
        }

        if let Some(index) = found {
            let row = &self.rows[index];
            debug!(%selector, row = row.name(), "forced row");
            return Ok(Some(row));
        }
        if saw_duplicate {
            debug!(%selector, "only duplicates of existing rows match");
            return Ok(None);
        }

        let reason = if proven {
            "no combination satisfies the registered constraints"
        } else {
            "search budget exhausted"
        };
        if self.strict {
            return Err(MatrixError::unsatisfiable(selector, reason));
        }
        warn!(%selector, reason, "skipping unsatisfiable forced row");
        Ok(None)
    }

    /// Generates up to `count` additional random rows and returns all rows so far.
    ///
    /// Stops early once the search proves no unseen valid row remains.
    pub fn generate_rows(&mut self, count: usize) -> &[Row] {
        let any = Selector::new();
        let mut added = 0;

        'rows: while added < count {
            for _ in 0..self.budget.max_attempts.max(1) {
                match self.search(&any) {
                    Search::Found(picks) => {
                        self.push_row(picks);
                        added += 1;
                        continue 'rows;
                    }
                    Search::Exhausted { .. } => {
                        debug!(added, requested = count, "no unseen valid rows remain");
                        break 'rows;
                    }
                    Search::OutOfBudget { .. } => {}
                }
            }
            warn!(added, requested = count, "search budget exhausted before reaching requested row count");
            break;
        }

        info!(added, total = self.rows.len(), "generated random rows");
        &self.rows
    }

    /// Returns the generated rows; fails if there are none.
    pub fn finish(self) -> Result<FinishedMatrix> {
        if self.rows.is_empty() {
            return Err(MatrixError::EmptyResult);
        }
        Ok(FinishedMatrix {
            rows: self.rows,
            rng: self.rng,
        })
    }

    /// One bounded randomized depth-first search.
    fn search(&mut self, pinned: &Selector) -> Search {
        let depth = self.axes.len();
        if depth == 0 {
            return Search::Exhausted { saw_duplicate: false };
        }

        let mut picks: Vec<Option<usize>> = vec![None; depth];
        let mut frontier: Vec<Vec<usize>> = Vec::with_capacity(depth);
        let mut backtracks = 0usize;
        let mut saw_duplicate = false;

        frontier.push(self.candidates(0, pinned, &picks));

        loop {
            let level = frontier.len() - 1;

            if frontier[level].is_empty() {
                frontier.pop();
                picks[level] = None;
                if frontier.is_empty() {
                    return Search::Exhausted { saw_duplicate };
                }
                backtracks += 1;
                if backtracks > self.budget.max_backtracks {
                    return Search::OutOfBudget { saw_duplicate };
                }
                continue;
            }

            let weights: Vec<f64> = frontier[level]
                .iter()
                .map(|&v| self.axes[level].values()[v].weight)
                .collect();
            let slot = self.rng.pick_weighted(&weights).unwrap_or(0);
            picks[level] = Some(frontier[level].remove(slot));

            if level + 1 < depth {
                let next = self.candidates(level + 1, pinned, &picks);
                frontier.push(next);
                continue;
            }

            let complete: Vec<usize> = picks.iter().flatten().copied().collect();
            let row = self.build_row(&complete);
            let rejected = if self.constraints.iter().any(|c| c.is_violated_by(&row)) {
                true
            } else if self.seen.contains(&complete) {
                saw_duplicate = true;
                true
            } else {
                false
            };

            if !rejected {
                return Search::Found(complete);
            }
            backtracks += 1;
            if backtracks > self.budget.max_backtracks {
                return Search::OutOfBudget { saw_duplicate };
            }
        }
    }

    /// Values of axis `level` compatible with the pinned selector and with
    /// every constraint, given the picks above it.
    fn candidates(&self, level: usize, pinned: &Selector, picks: &[Option<usize>]) -> Vec<usize> {
        let axis = &self.axes[level];
        let matcher = pinned.matcher_for(axis.name());

        (0..axis.values().len())
            .filter(|&v| matcher.map_or(true, |m| m.matches(&axis.values()[v])))
            .filter(|&v| {
                let probe = Partial {
                    builder: self,
                    picks,
                    probe: (level, v),
                };
                !self
                    .constraints
                    .iter()
                    .any(|c| c.violation(&probe) == Some(true))
            })
            .collect()
    }

    fn build_row(&self, picks: &[usize]) -> Row {
        let cells: Vec<Cell> = self
            .axes
            .iter()
            .zip(picks)
            .map(|(axis, &v)| Cell {
                axis: axis.name().to_string(),
                value: axis.values()[v].clone(),
            })
            .collect();

        let name = match &self.name_pattern {
            Some(pattern) => display_name(
                pattern
                    .iter()
                    .map(|&i| self.axes[i].title_of(&self.axes[i].values()[picks[i]])),
            ),
            None => display_name(
                self.axes
                    .iter()
                    .zip(picks)
                    .map(|(axis, &v)| axis.title_of(&axis.values()[v])),
            ),
        };

        Row::new(name, cells)
    }

    fn push_row(&mut self, picks: Vec<usize>) -> usize {
        let row = self.build_row(&picks);
        debug!(row = row.name(), "emitted row");
        self.seen.insert(picks);
        self.rows.push(row);
        self.rows.len() - 1
    }
}

/// Partial assignment seen by the constraint checks during search, with one
/// extra value probed at `probe.0`.
struct Partial<'a> {
    builder: &'a MatrixBuilder,
    picks: &'a [Option<usize>],
    probe: (usize, usize),
}

impl Assignment for Partial<'_> {
    fn value_of(&self, axis: &str) -> Option<&AxisValue> {
        let index = *self.builder.axis_index.get(axis)?;
        let pick = if index == self.probe.0 {
            Some(self.probe.1)
        } else {
            self.picks[index]
        };
        pick.map(|v| &self.builder.axes[index].values()[v])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisValue;
    use crate::selector::ValueMatcher;
    use proptest::prelude::*;

    fn yes_no(name: &str, yes: f64, no: f64) -> Axis {
        let title_name = name.to_string();
        Axis::new(
            name,
            vec![
                AxisValue::new("yes").with_weight(yes),
                AxisValue::new("no").with_weight(no),
            ],
        )
        .with_title(move |v| {
            if v.is("yes") {
                title_name.clone()
            } else {
                format!("no_{}", title_name)
            }
        })
    }

    fn pg_axis() -> Axis {
        Axis::new("pg_version", ["8.4", "9.0", "9.3", "9.6", "10", "11", "14"])
            .with_title(|v| format!("PG {}", v.token))
    }

    fn scram_builder(seed: u64) -> MatrixBuilder {
        let mut builder = MatrixBuilder::seeded(seed);
        builder.add_axis(yes_no("scram", 10.0, 10.0)).unwrap();
        builder.add_axis(pg_axis()).unwrap();
        builder
            .exclude(
                Selector::new()
                    .eq("scram", "yes")
                    .with("pg_version", ValueMatcher::version_below("10")),
            )
            .unwrap();
        builder
    }

    /// Four axes with exclusions, an implication and a row predicate.
    fn constrained_builder(seed: u64) -> MatrixBuilder {
        let mut builder = MatrixBuilder::seeded(seed);
        builder
            .add_axis(Axis::new(
                "java_distribution",
                vec![
                    AxisValue::new("oracle").with_weight(1.0),
                    AxisValue::new("temurin").with_weight(3.0),
                    AxisValue::new("microsoft"),
                ],
            ))
            .unwrap();
        builder
            .add_axis(Axis::new("java_version", ["8", "11", "17", "22"]))
            .unwrap();
        builder.add_axis(pg_axis()).unwrap();
        builder.add_axis(yes_no("ssl", 10.0, 10.0)).unwrap();
        builder.add_axis(yes_no("scram", 10.0, 10.0)).unwrap();

        builder
            .imply(
                Selector::new().eq("java_version", "22"),
                Selector::new().eq("java_distribution", "oracle"),
            )
            .unwrap();
        builder
            .imply(
                Selector::new().eq("java_distribution", "oracle"),
                Selector::new().with("java_version", ValueMatcher::version_at_least("17")),
            )
            .unwrap();
        builder
            .exclude(
                Selector::new()
                    .eq("ssl", "yes")
                    .with("pg_version", ValueMatcher::version_below("9.3")),
            )
            .unwrap();
        builder
            .exclude(
                Selector::new()
                    .eq("scram", "yes")
                    .with("pg_version", ValueMatcher::version_below("10")),
            )
            .unwrap();
        builder
            .exclude_row("microsoft with java 8", |row| {
                row.token("java_distribution") == "microsoft" && row.token("java_version") == "8"
            })
            .unwrap();
        builder
    }

    fn assert_rows_valid(builder: &MatrixBuilder) {
        let mut keys = HashSet::new();
        for row in builder.rows() {
            for constraint in builder.constraints() {
                assert!(!constraint.is_violated_by(row), "{} violates {}", row.name(), constraint);
            }
            assert!(keys.insert(row.key().join("|")), "duplicate row {}", row.name());
        }
    }

    #[test]
    fn test_add_axis_rejects_duplicates() {
        let mut builder = MatrixBuilder::seeded(1);
        builder.add_axis(yes_no("ssl", 1.0, 1.0)).unwrap();
        assert_eq!(
            builder.add_axis(yes_no("ssl", 1.0, 1.0)),
            Err(ConfigError::DuplicateAxis("ssl".into()))
        );
        assert_eq!(builder.axes().len(), 1);
    }

    #[test]
    fn test_add_axis_rejects_empty() {
        let mut builder = MatrixBuilder::seeded(1);
        assert_eq!(
            builder.add_axis(Axis::new("os", Vec::<AxisValue>::new())),
            Err(ConfigError::EmptyAxis("os".into()))
        );
    }

    #[test]
    fn test_add_axis_after_generation() {
        let mut builder = scram_builder(1);
        builder.generate_rows(1);
        assert!(matches!(
            builder.add_axis(yes_no("ssl", 1.0, 1.0)),
            Err(ConfigError::AxisAfterGeneration(_))
        ));
    }

    #[test]
    fn test_constraint_unknown_axis() {
        let mut builder = scram_builder(1);
        let err = builder
            .exclude(Selector::new().eq("gss", "yes"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAxis { ref axis, .. } if axis == "gss"));

        let err = builder
            .imply(Selector::new().eq("scram", "yes"), Selector::new().eq("nope", "x"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAxis { ref axis, .. } if axis == "nope"));
        assert_eq!(builder.constraints().len(), 1);
    }

    #[test]
    fn test_exclude_empty_selector() {
        let mut builder = scram_builder(1);
        assert!(matches!(
            builder.exclude(Selector::new()),
            Err(ConfigError::EmptySelector(_))
        ));
    }

    #[test]
    fn test_unknown_token_is_not_fatal() {
        let mut builder = scram_builder(1);
        assert!(builder.exclude(Selector::new().eq("scram", "maybe")).is_ok());
    }

    #[test]
    fn test_name_pattern() {
        let mut builder = scram_builder(3);
        assert!(builder.set_name_pattern(&["pg_version", "missing"]).is_err());
        builder.set_name_pattern(&["pg_version", "scram"]).unwrap();

        let row = builder
            .generate_row(&Selector::new().eq("scram", "yes").eq("pg_version", "14"))
            .unwrap()
            .unwrap();
        assert_eq!(row.name(), "PG 14, scram");
    }

    #[test]
    fn test_default_name_uses_registration_order() {
        let mut builder = scram_builder(3);
        let row = builder
            .generate_row(&Selector::new().eq("scram", "no").eq("pg_version", "9.0"))
            .unwrap()
            .unwrap();
        assert_eq!(row.name(), "no_scram, PG 9.0");
    }

    #[test]
    fn test_forced_scram_row_never_old_pg() {
        for seed in 0..200 {
            let mut builder = scram_builder(seed);
            let row = builder
                .generate_row(&Selector::new().eq("scram", "yes"))
                .unwrap()
                .expect("scram=yes is satisfiable");
            assert_eq!(row.token("scram"), "yes");
            assert_ne!(row.token("pg_version"), "9.0");
            assert!(["10", "11", "14"].contains(&row.token("pg_version")));
        }
    }

    #[test]
    fn test_unsatisfiable_lenient_skips() {
        let mut builder = scram_builder(5);
        let outcome = builder
            .generate_row(&Selector::new().eq("scram", "yes").eq("pg_version", "9.0"))
            .unwrap();
        assert!(outcome.is_none());
        assert!(builder.rows().is_empty());
    }

    #[test]
    fn test_unsatisfiable_strict_fails() {
        let mut builder = scram_builder(5);
        builder.fail_on_unsatisfiable(true);
        let err = builder
            .generate_row(&Selector::new().eq("scram", "yes").eq("pg_version", "9.0"))
            .unwrap_err();
        match err {
            MatrixError::Unsatisfiable { selector, .. } => {
                assert_eq!(selector, "{scram=yes, pg_version=9.0}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_forced_duplicate_is_not_unsatisfiable() {
        let mut builder = scram_builder(5);
        builder.fail_on_unsatisfiable(true);
        let full = Selector::new().eq("scram", "no").eq("pg_version", "8.4");
        assert!(builder.generate_row(&full).unwrap().is_some());
        assert!(builder.generate_row(&full).unwrap().is_none());
        assert_eq!(builder.rows().len(), 1);
    }

    #[test]
    fn test_generate_row_unknown_axis() {
        let mut builder = scram_builder(5);
        assert!(matches!(
            builder.generate_row(&Selector::new().eq("gss", "yes")),
            Err(MatrixError::Config(ConfigError::UnknownAxis { .. }))
        ));
    }

    #[test]
    fn test_small_space_fully_covered() {
        let mut builder = MatrixBuilder::seeded(11);
        builder.add_axis(Axis::new("a", ["1", "2"])).unwrap();
        builder.add_axis(Axis::new("b", ["x", "y"])).unwrap();

        let rows = builder.generate_rows(10);
        assert_eq!(rows.len(), 4);

        let mut keys: Vec<String> = rows.iter().map(|r| r.key().join("")).collect();
        keys.sort();
        assert_eq!(keys, vec!["1x", "1y", "2x", "2y"]);
    }

    #[test]
    fn test_zero_rows_returns_only_forced() {
        let mut builder = constrained_builder(9);
        let requests = [
            Selector::new().eq("java_version", "22"),
            Selector::new().eq("java_version", "8"),
            // Unsatisfiable under the implications; skipped
            Selector::new().eq("java_version", "22").eq("java_distribution", "temurin"),
        ];
        let mut forced = 0;
        for selector in &requests {
            if builder.generate_row(selector).unwrap().is_some() {
                forced += 1;
            }
        }
        // The first row runs java 22, so the java 8 request needs a new row
        assert_eq!(forced, 2);
        assert_eq!(builder.generate_rows(0).len(), forced);
    }

    #[test]
    fn test_already_covered_selector_is_skipped() {
        let mut builder = scram_builder(6);
        let first = builder
            .generate_row(&Selector::new().eq("pg_version", "14"))
            .unwrap()
            .unwrap()
            .token("scram")
            .to_string();
        assert!(builder
            .generate_row(&Selector::new().eq("scram", first.as_str()))
            .unwrap()
            .is_none());
        assert_eq!(builder.rows().len(), 1);
        // An empty selector asks for a fresh row
        assert!(builder.generate_row(&Selector::new()).unwrap().is_some());
        assert_eq!(builder.rows().len(), 2);
    }

    #[test]
    fn test_implication_drives_backtracking() {
        for seed in 0..100 {
            let mut builder = constrained_builder(seed);
            let row = builder
                .generate_row(&Selector::new().eq("java_version", "22"))
                .unwrap()
                .unwrap();
            assert_eq!(row.token("java_distribution"), "oracle");
        }
    }

    #[test]
    fn test_pinned_value_drawn_among_matches() {
        let mut builder = constrained_builder(4);
        let row = builder
            .generate_row(&Selector::new().any_of("pg_version", ["8.4", "9.0"]))
            .unwrap()
            .unwrap();
        assert!(["8.4", "9.0"].contains(&row.token("pg_version")));
        assert_eq!(row.token("ssl"), "no");
        assert_eq!(row.token("scram"), "no");
    }

    #[test]
    fn test_finish_empty_is_error() {
        let builder = scram_builder(1);
        assert!(matches!(builder.finish(), Err(MatrixError::EmptyResult)));

        let mut builder = scram_builder(1);
        builder.generate_rows(2);
        let finished = builder.finish().unwrap();
        assert_eq!(finished.rows.len(), 2);
        assert_eq!(finished.rng.seed(), 1);
    }

    #[test]
    fn test_no_axes_yields_nothing() {
        let mut builder = MatrixBuilder::seeded(1);
        assert!(builder.generate_rows(5).is_empty());
        assert!(builder.generate_row(&Selector::new()).unwrap().is_none());
    }

    #[test]
    fn test_tiny_budget_gives_up() {
        let mut builder = constrained_builder(2).with_budget(SearchBudget {
            max_attempts: 1,
            max_backtracks: 0,
        });
        builder.fail_on_unsatisfiable(true);
        // With no backtracking allowed, the oracle-only EA row is usually
        // unreachable; either way the builder must not loop or panic.
        let _ = builder.generate_row(&Selector::new().eq("java_version", "22"));
        assert_rows_valid(&builder);
    }

    #[test]
    fn test_same_seed_same_rows() {
        let run = |seed| {
            let mut builder = constrained_builder(seed);
            builder.generate_row(&Selector::new().eq("scram", "yes")).unwrap();
            builder.generate_rows(8);
            builder
                .rows()
                .iter()
                .map(|r| r.name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    proptest! {
        #[test]
        fn prop_rows_satisfy_constraints_and_are_unique(seed in any::<u64>(), count in 0usize..40) {
            let mut builder = constrained_builder(seed);
            builder.generate_row(&Selector::new().eq("java_version", "22")).unwrap();
            builder.generate_row(&Selector::new().eq("pg_version", "8.4")).unwrap();
            builder.generate_rows(count);
            assert_rows_valid(&builder);
        }

        #[test]
        fn prop_generation_is_deterministic(seed in any::<u64>(), count in 0usize..20) {
            let mut a = constrained_builder(seed);
            let mut b = constrained_builder(seed);
            let ka: Vec<Vec<String>> = a.generate_rows(count).iter()
                .map(|r| r.key().into_iter().map(String::from).collect()).collect();
            let kb: Vec<Vec<String>> = b.generate_rows(count).iter()
                .map(|r| r.key().into_iter().map(String::from).collect()).collect();
            prop_assert_eq!(ka, kb);
            prop_assert_eq!(a.rng_mut().draws(), b.rng_mut().draws());
        }

        #[test]
        fn prop_generate_rows_never_exceeds_space(seed in any::<u64>(), count in 0usize..12) {
            let mut builder = MatrixBuilder::seeded(seed);
            builder.add_axis(Axis::new("a", ["1", "2"])).unwrap();
            builder.add_axis(Axis::new("b", ["x", "y"])).unwrap();
            let rows = builder.generate_rows(count);
            prop_assert_eq!(rows.len(), count.min(4));
        }
    }
}
