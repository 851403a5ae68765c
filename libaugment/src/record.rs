//! Human-readable record of the settings a trial ran with.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::Result;

pub const DEFAULT_CONFIG_FILE: &str = "config.txt";

/// Ordered `key=value` pairs. Written once, never read back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialRecord {
    entries: Vec<(String, String)>,
}

impl TrialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        self.entries.push((key.into(), value.to_string()));
        self
    }

    /// Flattens a serializable value into a record.
    ///
    /// Nested objects produce dotted keys (`occlusion.min_width`), `null`
    /// becomes `none` and strings are written without quotes.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        let mut record = Self::new();
        flatten("", &value, &mut record);
        Ok(record)
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `key=value` line per entry, no quoting or escaping.
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{key}={value}\n"))
            .collect()
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for TrialRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.push(key, value);
        }
        record
    }
}

fn flatten(prefix: &str, value: &Value, record: &mut TrialRecord) {
    let key = if prefix.is_empty() { "value" } else { prefix };
    match value {
        Value::Object(map) => {
            for (name, inner) in map {
                let nested = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                flatten(&nested, inner, record);
            }
        }
        Value::Null => {
            record.push(key, "none");
        }
        Value::String(s) => {
            record.push(key, s);
        }
        other => {
            record.push(key, other);
        }
    }
}

/// Writes `record` to `base_dir/filename`, creating `base_dir` first.
pub fn write_config_file<P: AsRef<Path>>(
    base_dir: P,
    record: &TrialRecord,
    filename: &str,
) -> Result<PathBuf> {
    let base_dir = base_dir.as_ref();
    fs::create_dir_all(base_dir)?;

    let path = base_dir.join(filename);
    fs::write(&path, record.to_text())?;
    info!(path = %path.display(), entries = record.len(), "wrote trial record");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OcclusionParams, RunConfig};

    #[test]
    fn twelve_pairs_make_twelve_lines() {
        let root = tempfile::tempdir().unwrap();
        let trial = root.path().join("runs").join("trial_7");
        let record: TrialRecord = (0..12).map(|i| (format!("key{i}"), i * 10)).collect();

        let path = write_config_file(&trial, &record, DEFAULT_CONFIG_FILE).unwrap();

        assert!(trial.is_dir());
        assert_eq!(path, trial.join("config.txt"));
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12);
        for (i, line) in lines.iter().enumerate() {
            let (key, value) = line.split_once('=').unwrap();
            assert_eq!(key, format!("key{i}"));
            assert_eq!(value, (i * 10).to_string());
        }
    }

    #[test]
    fn flattens_nested_config() {
        let config = RunConfig {
            trial_name: "flat".into(),
            contrast: Some(1.5),
            occlusion: Some(OcclusionParams {
                aug_factor: 3,
                ..OcclusionParams::default()
            }),
            ..RunConfig::default()
        };
        let record = TrialRecord::from_serialize(&config).unwrap();
        let text = record.to_text();

        assert!(text.lines().any(|l| l == "trial_name=flat"));
        assert!(text.lines().any(|l| l == "contrast=1.5"));
        assert!(text.lines().any(|l| l == "resize=none"));
        assert!(text.lines().any(|l| l == "occlusion.aug_factor=3"));
        assert!(text.lines().any(|l| l == "occlusion.origin_bound=edge"));
        assert_eq!(record.entries()[0].0, "input_dir");
    }

    #[test]
    fn float_settings_are_recorded_as_given() {
        let config = RunConfig {
            contrast: Some(1.2),
            occlusion: Some(OcclusionParams {
                max_width_prop: 0.3,
                center_bias: 0.1,
                ..OcclusionParams::default()
            }),
            ..RunConfig::default()
        };
        let text = TrialRecord::from_serialize(&config).unwrap().to_text();

        assert!(text.lines().any(|l| l == "contrast=1.2"));
        assert!(text.lines().any(|l| l == "occlusion.max_width_prop=0.3"));
        assert!(text.lines().any(|l| l == "occlusion.center_bias=0.1"));
    }

    #[test]
    fn missing_section_is_written_as_none() {
        let config = RunConfig {
            occlusion: None,
            ..RunConfig::default()
        };
        let record = TrialRecord::from_serialize(&config).unwrap();
        assert!(record
            .entries()
            .iter()
            .any(|(k, v)| k == "occlusion" && v == "none"));
    }

    #[test]
    fn push_keeps_insertion_order() {
        let mut record = TrialRecord::new();
        record.push("b", 2).push("a", "x");
        assert_eq!(record.to_text(), "b=2\na=x\n");
    }
}
