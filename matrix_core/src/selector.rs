//! Partial assignments: per-axis value matchers used by constraints and
//! forced rows.

use crate::axis::AxisValue;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Predicate over a single axis value.
pub type ValuePredicate = Arc<dyn Fn(&AxisValue) -> bool + Send + Sync>;

/// Read access to a (possibly partial) assignment of values to axes.
pub trait Assignment {
    /// Value currently assigned to `axis`, if any.
    fn value_of(&self, axis: &str) -> Option<&AxisValue>;
}

/// How one axis value is matched.
#[derive(Clone)]
pub enum ValueMatcher {
    /// Token equality
    Token(String),

    /// Token contained in the list
    AnyOf(Vec<String>),

    /// Arbitrary test; `label` is shown in logs and errors
    Predicate { label: String, test: ValuePredicate },
}

impl ValueMatcher {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }

    pub fn any_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyOf(tokens.into_iter().map(Into::into).collect())
    }

    pub fn predicate<F>(label: impl Into<String>, test: F) -> Self
    where
        F: Fn(&AxisValue) -> bool + Send + Sync + 'static,
    {
        Self::Predicate {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// Matches tokens whose version is strictly below `bound`.
    pub fn version_below(bound: &str) -> Self {
        let bound = bound.to_string();
        Self::predicate(format!("< {}", bound), move |v| {
            compare_versions(&v.token, &bound) == Ordering::Less
        })
    }

    /// Matches tokens whose version is at least `bound`.
    pub fn version_at_least(bound: &str) -> Self {
        let bound = bound.to_string();
        Self::predicate(format!(">= {}", bound), move |v| {
            compare_versions(&v.token, &bound) != Ordering::Less
        })
    }

    pub fn matches(&self, value: &AxisValue) -> bool {
        match self {
            Self::Token(token) => value.is(token),
            Self::AnyOf(tokens) => tokens.iter().any(|t| value.is(t)),
            Self::Predicate { test, .. } => test(value),
        }
    }

    /// Tokens named literally by this matcher (none for predicates).
    pub fn named_tokens(&self) -> Vec<&str> {
        match self {
            Self::Token(token) => vec![token.as_str()],
            Self::AnyOf(tokens) => tokens.iter().map(String::as_str).collect(),
            Self::Predicate { .. } => Vec::new(),
        }
    }
}

impl From<&str> for ValueMatcher {
    fn from(token: &str) -> Self {
        Self::token(token)
    }
}

impl From<String> for ValueMatcher {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}

impl From<&AxisValue> for ValueMatcher {
    fn from(value: &AxisValue) -> Self {
        Self::Token(value.token.clone())
    }
}

impl fmt::Display for ValueMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "{}", token),
            Self::AnyOf(tokens) => write!(f, "[{}]", tokens.join(", ")),
            Self::Predicate { label, .. } => write!(f, "({})", label),
        }
    }
}

impl fmt::Debug for ValueMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// A partial assignment: matchers for a subset of axes.
///
/// Matches a row when every named axis matches. Entries keep insertion order
/// so messages list axes the way they were written.
#[derive(Clone, Default)]
pub struct Selector {
    entries: Vec<(String, ValueMatcher)>,
}

impl Selector {
    /// Empty selector; matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the matcher for `axis`.
    pub fn with(mut self, axis: impl Into<String>, matcher: impl Into<ValueMatcher>) -> Self {
        let axis = axis.into();
        let matcher = matcher.into();
        match self.entries.iter_mut().find(|(name, _)| *name == axis) {
            Some(entry) => entry.1 = matcher,
            None => self.entries.push((axis, matcher)),
        }
        self
    }

    /// Shorthand for `with(axis, ValueMatcher::token(token))`.
    pub fn eq(self, axis: impl Into<String>, token: impl Into<String>) -> Self {
        self.with(axis, ValueMatcher::token(token))
    }

    pub fn any_of<I, S>(self, axis: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(axis, ValueMatcher::any_of(tokens))
    }

    pub fn matching<F>(self, axis: impl Into<String>, label: impl Into<String>, test: F) -> Self
    where
        F: Fn(&AxisValue) -> bool + Send + Sync + 'static,
    {
        self.with(axis, ValueMatcher::predicate(label, test))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ValueMatcher)> {
        self.entries.iter().map(|(axis, m)| (axis.as_str(), m))
    }

    pub fn matcher_for(&self, axis: &str) -> Option<&ValueMatcher> {
        self.entries
            .iter()
            .find(|(name, _)| name == axis)
            .map(|(_, m)| m)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Three-valued evaluation over a partial assignment.
    ///
    /// `Some(false)` as soon as one assigned axis fails, `Some(true)` when every
    /// named axis is assigned and matches, `None` otherwise.
    pub fn evaluate<A: Assignment + ?Sized>(&self, assignment: &A) -> Option<bool> {
        let mut undetermined = false;
        for (axis, matcher) in &self.entries {
            match assignment.value_of(axis) {
                Some(value) if !matcher.matches(value) => return Some(false),
                Some(_) => {}
                None => undetermined = true,
            }
        }
        if undetermined {
            None
        } else {
            Some(true)
        }
    }

    /// Full match; unassigned axes count as non-matching.
    pub fn matches<A: Assignment + ?Sized>(&self, assignment: &A) -> bool {
        self.evaluate(assignment) == Some(true)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (axis, matcher)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", axis, matcher)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector{}", self)
    }
}

/// Compares dotted version strings numerically (`"9.6" < "10"`).
///
/// Each component contributes its leading digits; anything after them
/// (`-ea`, `rc1`) is ignored. Missing components count as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| -> Vec<u64> {
        s.split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    };
    let (xs, ys) = (parse(a), parse(b));
    let len = xs.len().max(ys.len());
    for i in 0..len {
        let x = xs.get(i).copied().unwrap_or(0);
        let y = ys.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapAssignment(HashMap<&'static str, AxisValue>);

    impl Assignment for MapAssignment {
        fn value_of(&self, axis: &str) -> Option<&AxisValue> {
            self.0.get(axis)
        }
    }

    fn assignment(pairs: &[(&'static str, &str)]) -> MapAssignment {
        MapAssignment(pairs.iter().map(|(k, v)| (*k, AxisValue::new(*v))).collect())
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("9.6", "10"), Ordering::Less);
        assert_eq!(compare_versions("9.3", "9.3"), Ordering::Equal);
        assert_eq!(compare_versions("8.4", "9.1"), Ordering::Less);
        assert_eq!(compare_versions("22", "17"), Ordering::Greater);
        assert_eq!(compare_versions("18-ea", "18"), Ordering::Equal);
        assert_eq!(compare_versions("10", "10.0"), Ordering::Equal);
    }

    #[test]
    fn test_version_matchers() {
        let below = ValueMatcher::version_below("9.3");
        assert!(below.matches(&AxisValue::new("9.2")));
        assert!(!below.matches(&AxisValue::new("9.3")));
        assert!(!below.matches(&AxisValue::new("14")));

        let at_least = ValueMatcher::version_at_least("11");
        assert!(at_least.matches(&AxisValue::new("17")));
        assert!(!at_least.matches(&AxisValue::new("8")));
    }

    #[test]
    fn test_three_valued_evaluation() {
        let selector = Selector::new().eq("ssl", "yes").with("pg_version", ValueMatcher::version_below("9.3"));

        assert_eq!(selector.evaluate(&assignment(&[("ssl", "no")])), Some(false));
        assert_eq!(selector.evaluate(&assignment(&[("ssl", "yes")])), None);
        assert_eq!(
            selector.evaluate(&assignment(&[("ssl", "yes"), ("pg_version", "9.0")])),
            Some(true)
        );
        assert_eq!(
            selector.evaluate(&assignment(&[("ssl", "yes"), ("pg_version", "12")])),
            Some(false)
        );
    }

    #[test]
    fn test_any_of() {
        let selector = Selector::new().any_of("os", ["windows-latest", "macos-latest"]);
        assert!(selector.matches(&assignment(&[("os", "macos-latest")])));
        assert!(!selector.matches(&assignment(&[("os", "ubuntu-latest")])));
    }

    #[test]
    fn test_with_replaces_existing_entry() {
        let selector = Selector::new().eq("a", "1").eq("a", "2");
        assert_eq!(selector.entries().count(), 1);
        assert_eq!(selector.to_string(), "{a=2}");
    }

    #[test]
    fn test_display() {
        let selector = Selector::new()
            .eq("scram", "yes")
            .with("pg_version", ValueMatcher::version_below("10"));
        assert_eq!(selector.to_string(), "{scram=yes, pg_version=(< 10)}");
    }
}
