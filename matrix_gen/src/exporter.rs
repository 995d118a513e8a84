//! JSON export of the generated matrix.
//!
//! The document has the shape GitHub Actions expects for
//! `strategy.matrix: ${{ fromJSON(...) }}`: `{"include": [row, ...]}`.

use crate::error::GenError;
use matrix_env::{CiEnvironment, ResolvedSeed};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output key under which the matrix is published.
pub const OUTPUT_KEY: &str = "matrix";

/// Complete matrix export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixExport {
    /// Enriched rows in final order
    pub include: Vec<Map<String, Value>>,
}

impl MatrixExport {
    pub fn new(include: Vec<Map<String, Value>>) -> Self {
        Self { include }
    }

    /// Row names in output order.
    pub fn names(&self) -> Vec<&str> {
        self.include
            .iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str))
            .collect()
    }

    /// Single-line document, as published to the workflow.
    pub fn to_compact_json(&self) -> Result<String, GenError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented document for humans.
    pub fn to_pretty_json(&self) -> Result<String, GenError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Appends the compact document to the workflow outputs.
    ///
    /// Returns `false` when the environment has no output channel.
    pub fn publish<E: CiEnvironment + ?Sized>(&self, env: &E) -> Result<bool, GenError> {
        Ok(env.append_output(OUTPUT_KEY, &self.to_compact_json()?)?)
    }

    /// Writes the pretty document to a file.
    pub fn write_to_file(&self, path: &Path) -> Result<(), GenError> {
        let json = self.to_pretty_json()?;
        let io_err = |source| GenError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        Ok(())
    }
}

/// Markdown job summary: seed, provenance and how to reproduce.
pub fn summary_markdown(seed: &ResolvedSeed, export: &MatrixExport) -> String {
    let mut md = String::new();
    md.push_str("### Test matrix\n\n");
    md.push_str(&format!("- Seed: `{}` ({})\n", seed.value, seed.source));
    md.push_str(&format!("- Reproduce locally: `{} cargo run -p matrix_gen`\n", seed.reproduce_hint()));
    md.push_str(&format!("- Jobs: {}\n\n", export.include.len()));
    for name in export.names() {
        md.push_str(&format!("- {}\n", name));
    }
    md
}
