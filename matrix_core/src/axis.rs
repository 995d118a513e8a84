//! Axes: named configuration dimensions and their weighted values.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Function deriving a display title from a value.
pub type TitleFn = Arc<dyn Fn(&AxisValue) -> String + Send + Sync>;

/// One selectable value of an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisValue {
    /// Canonical token (what ends up in the emitted row)
    pub token: String,

    /// Explicit display title. `Some("")` hides the value from row names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Relative sampling weight (positive)
    pub weight: f64,

    /// Extra attributes, e.g. `language`/`country` for a locale
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl AxisValue {
    /// Creates a value with weight 1 and no title.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            title: None,
            weight: 1.0,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets an explicit display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the sampling weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Adds an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns an attribute by key.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns true if the token equals `token`.
    pub fn is(&self, token: &str) -> bool {
        self.token == token
    }
}

impl From<&str> for AxisValue {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for AxisValue {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// A configuration dimension with a closed, ordered set of values.
#[derive(Clone)]
pub struct Axis {
    name: String,
    values: Vec<AxisValue>,
    title: Option<TitleFn>,
}

impl Axis {
    /// Creates an axis. Validation happens on registration.
    pub fn new<V: Into<AxisValue>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            title: None,
        }
    }

    /// Sets the title function used for values without an explicit title.
    pub fn with_title<F>(mut self, title: F) -> Self
    where
        F: Fn(&AxisValue) -> String + Send + Sync + 'static,
    {
        self.title = Some(Arc::new(title));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[AxisValue] {
        &self.values
    }

    /// Looks up a value by token.
    pub fn value(&self, token: &str) -> Option<&AxisValue> {
        self.values.iter().find(|v| v.is(token))
    }

    /// First registered value.
    pub fn first(&self) -> Option<&AxisValue> {
        self.values.first()
    }

    /// Last registered value.
    pub fn last(&self) -> Option<&AxisValue> {
        self.values.last()
    }

    /// Display title: explicit title, then the axis title function, then the token.
    pub fn title_of(&self, value: &AxisValue) -> String {
        if let Some(title) = &value.title {
            return title.clone();
        }
        match &self.title {
            Some(f) => f(value),
            None => value.token.clone(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyAxisName);
        }
        if self.values.is_empty() {
            return Err(ConfigError::EmptyAxis(self.name.clone()));
        }

        let mut tokens = HashSet::new();
        for value in &self.values {
            if !tokens.insert(value.token.as_str()) {
                return Err(ConfigError::DuplicateValue {
                    axis: self.name.clone(),
                    token: value.token.clone(),
                });
            }
            if !(value.weight.is_finite() && value.weight > 0.0) {
                return Err(ConfigError::InvalidWeight {
                    axis: self.name.clone(),
                    token: value.token.clone(),
                    weight: value.weight,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Axis")
            .field("name", &self.name)
            .field("values", &self.values)
            .field("title", &self.title.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
