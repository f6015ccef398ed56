use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::db::Scalar;

/// The fixture file: a collection of questions with their expected rows.
#[derive(Debug, Deserialize)]
pub struct TruthFile {
    pub items: Vec<TruthItem>,
}

#[derive(Debug, Deserialize)]
pub struct TruthItem {
    pub question: String,
    pub expected_rows: Vec<Vec<Value>>,
}

impl TruthItem {
    /// Expected rows as typed scalars, for exact comparison with query
    /// output. JSON integers map to INTEGER, other numbers to REAL.
    pub fn expected(&self) -> Vec<Vec<Scalar>> {
        self.expected_rows
            .iter()
            .map(|row| row.iter().map(json_to_scalar).collect())
            .collect()
    }
}

fn json_to_scalar(v: &Value) -> Scalar {
    match v {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Int(*b as i64),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Scalar::Int(i),
            None => Scalar::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Scalar::Text(s.clone()),
        other => Scalar::Text(other.to_string()),
    }
}

/// Load the fixture. A missing or malformed file is fatal.
pub fn load_truth(path: &Path) -> Result<TruthFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read truth fixture {}", path.display()))?;
    let truth: TruthFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse truth fixture {}", path.display()))?;
    Ok(truth)
}
