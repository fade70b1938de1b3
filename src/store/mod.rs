//! Persistence of collected results as timestamped JSON and CSV files.

use crate::tokopedia::models::ProductRecord;
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors raised while persisting results.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes collection results under `<output_dir>/json` and
/// `<output_dir>/csv`, one timestamped file per save.
pub struct ResultStore {
    json_dir: PathBuf,
    csv_dir: PathBuf,
}

impl ResultStore {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        let base = output_dir.as_ref();
        Self { json_dir: base.join("json"), csv_dir: base.join("csv") }
    }

    /// Saves any serializable value as pretty-printed JSON. A missing
    /// `.json` extension is appended.
    pub fn save_json<T: Serialize>(&self, value: &T, filename: &str) -> Result<PathBuf, StoreError> {
        let path = self.json_dir.join(with_extension(filename, "json"));
        ensure_parent(&path)?;

        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, json).map_err(|source| StoreError::Io { path: path.clone(), source })?;

        info!("saved JSON to {}", path.display());
        Ok(path)
    }

    /// Saves a slice of serializable values as CSV. Rows are flattened via
    /// their JSON representation: the header is the sorted union of all
    /// keys, and nested arrays/objects are JSON-encoded into their cell.
    pub fn save_csv<T: Serialize>(&self, values: &[T], filename: &str) -> Result<PathBuf, StoreError> {
        let path = self.csv_dir.join(with_extension(filename, "csv"));
        ensure_parent(&path)?;

        let rows: Vec<serde_json::Map<String, serde_json::Value>> = values
            .iter()
            .map(|value| match serde_json::to_value(value)? {
                serde_json::Value::Object(map) => Ok(map),
                other => {
                    let mut map = serde_json::Map::new();
                    map.insert("value".to_string(), other);
                    Ok(map)
                }
            })
            .collect::<Result<_, serde_json::Error>>()?;

        let columns: BTreeSet<&str> =
            rows.iter().flat_map(|row| row.keys().map(String::as_str)).collect();

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(
            columns.iter().map(|c| csv_escape(c)).collect::<Vec<_>>().join(","),
        );
        for row in &rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| csv_cell(row.get(*column)))
                .collect();
            lines.push(cells.join(","));
        }

        std::fs::write(&path, lines.join("\n"))
            .map_err(|source| StoreError::Io { path: path.clone(), source })?;

        info!("saved CSV to {}", path.display());
        Ok(path)
    }

    /// Saves a full crawl: the detailed records as JSON plus a flat CSV
    /// companion, both stamped with the current local time.
    pub fn save_detailed(&self, records: &[ProductRecord]) -> Result<(PathBuf, PathBuf), StoreError> {
        let stamp = timestamp();
        let json = self.save_json(
            &records,
            &format!("tokopedia_products_with_details_{stamp}.json"),
        )?;
        let csv = self.save_csv(records, &format!("tokopedia_products_flat_{stamp}.csv"))?;
        Ok((json, csv))
    }
}

/// Local-time stamp used in output filenames.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn with_extension(filename: &str, extension: &str) -> String {
    let suffix = format!(".{extension}");
    if filename.ends_with(&suffix) {
        filename.to_string()
    } else {
        format!("{filename}{suffix}")
    }
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
    }
    Ok(())
}

fn csv_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => csv_escape(s),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        // Nested structures keep their JSON form inside the cell
        Some(nested) => csv_escape(&nested.to_string()),
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
