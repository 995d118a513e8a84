//! Generated rows and their display names.

use crate::axis::AxisValue;
use crate::selector::Assignment;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// One axis/value pair of a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub axis: String,
    pub value: AxisValue,
}

/// One complete test configuration: a value for every axis, in axis
/// registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    name: String,
    cells: Vec<Cell>,
}

impl Row {
    pub(crate) fn new(name: String, cells: Vec<Cell>) -> Self {
        Self { name, cells }
    }

    /// Display name built from the configured name pattern.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, axis: &str) -> Option<&AxisValue> {
        self.cells.iter().find(|c| c.axis == axis).map(|c| &c.value)
    }

    /// Token for `axis`, or `""` if the axis is unknown.
    pub fn token(&self, axis: &str) -> &str {
        self.get(axis).map(|v| v.token.as_str()).unwrap_or("")
    }

    /// Tokens in axis order; two rows are duplicates iff their keys are equal.
    pub fn key(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.value.token.as_str()).collect()
    }

    /// Flat JSON object: `name` plus one string field per axis.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.clone()));
        for cell in &self.cells {
            map.insert(cell.axis.clone(), Value::String(cell.value.token.clone()));
        }
        map
    }
}

impl Assignment for Row {
    fn value_of(&self, axis: &str) -> Option<&AxisValue> {
        self.get(axis)
    }
}

/// Joins titles with `", "`, skipping empty ones.
pub fn display_name<I, S>(titles: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut name = String::new();
    for title in titles {
        let title = title.as_ref();
        if title.is_empty() {
            continue;
        }
        if !name.is_empty() {
            name.push_str(", ");
        }
        name.push_str(title);
    }
    name
}

/// Numeric-aware string ordering: digit runs compare by value, so
/// `"Java 8" < "Java 11"`. Text runs compare case-insensitively first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut xs, mut ys) = (chunks(a).into_iter(), chunks(b).into_iter());
    loop {
        match (xs.next(), ys.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.is_numeric, y.is_numeric) {
                    (true, true) => cmp_digits(x.text, y.text),
                    _ => x
                        .text
                        .to_lowercase()
                        .cmp(&y.text.to_lowercase()),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
    a.cmp(b)
}

struct Chunk<'a> {
    text: &'a str,
    is_numeric: bool,
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut numeric = None;
    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match numeric {
            Some(prev) if prev != digit => {
                out.push(Chunk { text: &s[start..i], is_numeric: prev });
                start = i;
            }
            _ => {}
        }
        numeric = Some(digit);
    }
    if let Some(prev) = numeric {
        out.push(Chunk { text: &s[start..], is_numeric: prev });
    }
    out
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
