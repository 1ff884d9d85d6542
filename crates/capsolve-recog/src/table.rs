//! Reference tables
//!
//! A reference table maps each known character to the mean feature vector
//! of its calibration samples. Tables are stored as flat JSON objects:
//!
//! ```json
//! { "A": [41.2, 20.9, 23.1, 18.1, 14.0, 10.3, 9.8, 11.0, 10.1], "B": [...] }
//! ```
//!
//! One table exists per font variant. [`ReferenceTables`] keeps them in the
//! order the classifier tries them.

use crate::features::{FEATURE_COUNT, FeatureVector};
use crate::{RecogError, RecogResult};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::Path;

/// Character to feature vector mapping for one font variant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceTable {
    name: String,
    entries: BTreeMap<char, FeatureVector>,
}

impl ReferenceTable {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Variant name, e.g. `"bold"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference vector of a character
    pub fn get(&self, ch: char) -> Option<&FeatureVector> {
        self.entries.get(&ch)
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no characters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Characters in ascending order
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.entries.keys().copied()
    }

    /// Entries in ascending character order
    pub fn iter(&self) -> btree_map::Iter<'_, char, FeatureVector> {
        self.entries.iter()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, ch: char, features: FeatureVector) -> Option<FeatureVector> {
        self.entries.insert(ch, features)
    }

    /// Builder form of [`ReferenceTable::insert`]
    pub fn with_entry(mut self, ch: char, features: FeatureVector) -> Self {
        self.entries.insert(ch, features);
        self
    }

    /// Parse a table from JSON text.
    ///
    /// # Errors
    /// [`RecogError::InvalidTable`] unless every key is a single character,
    /// every value is nine finite numbers, and there is at least one entry.
    pub fn from_json_str(name: impl Into<String>, json: &str) -> RecogResult<Self> {
        let name = name.into();
        let raw: BTreeMap<String, Vec<f64>> = serde_json::from_str(json)
            .map_err(|e| RecogError::InvalidTable(format!("{}: {}", name, e)))?;

        let mut table = ReferenceTable::new(name);
        for (key, values) in raw {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    return Err(RecogError::InvalidTable(format!(
                        "{}: key {:?} is not a single character",
                        table.name, key
                    )));
                }
            };
            let features = FeatureVector::from_slice(&values)
                .filter(FeatureVector::is_finite)
                .ok_or_else(|| {
                    RecogError::InvalidTable(format!(
                        "{}: entry {:?} must be {} finite numbers, got {:?}",
                        table.name, key, FEATURE_COUNT, values
                    ))
                })?;
            table.entries.insert(ch, features);
        }

        if table.is_empty() {
            return Err(RecogError::InvalidTable(format!(
                "{}: table has no entries",
                table.name
            )));
        }
        Ok(table)
    }

    /// Load a table from a JSON file.
    ///
    /// A missing or unreadable file is a [`RecogError::Resource`] error;
    /// malformed contents are [`RecogError::InvalidTable`].
    pub fn from_json_file<P: AsRef<Path>>(name: impl Into<String>, path: P) -> RecogResult<Self> {
        let path = path.as_ref();
        let name = name.into();
        let data = std::fs::read_to_string(path).map_err(|e| {
            RecogError::resource(format!("{} table {}", name, path.display()), e)
        })?;
        let table = Self::from_json_str(name, &data)?;
        log::info!(
            "loaded {} table from {} ({} characters)",
            table.name,
            path.display(),
            table.len()
        );
        Ok(table)
    }

    /// Serialize the table as pretty-printed JSON.
    pub fn to_json_string(&self) -> RecogResult<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }

    /// Write the table to a JSON file.
    pub fn write_json_file<P: AsRef<Path>>(&self, path: P) -> RecogResult<()> {
        let json = self.to_json_string()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ReferenceTable {
    type Item = (&'a char, &'a FeatureVector);
    type IntoIter = btree_map::Iter<'a, char, FeatureVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Reference tables in the order the classifier tries them
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    tables: Vec<ReferenceTable>,
}

impl ReferenceTables {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual pair: bold first, slim as the fallback
    pub fn bold_slim(bold: ReferenceTable, slim: ReferenceTable) -> Self {
        Self {
            tables: vec![bold, slim],
        }
    }

    /// Append a table to the end of the retry order
    pub fn push(&mut self, table: ReferenceTable) {
        self.tables.push(table);
    }

    /// Builder form of [`ReferenceTables::push`]
    pub fn with_table(mut self, table: ReferenceTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True if there are no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Table by variant name
    pub fn get(&self, name: &str) -> Option<&ReferenceTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Tables in retry order
    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceTable> {
        self.tables.iter()
    }
}

impl From<Vec<ReferenceTable>> for ReferenceTables {
    fn from(tables: Vec<ReferenceTable>) -> Self {
        Self { tables }
    }
}

impl<'a> IntoIterator for &'a ReferenceTables {
    type Item = &'a ReferenceTable;
    type IntoIter = std::slice::Iter<'a, ReferenceTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "A": [41.2, 20.9, 23.1, 18.1, 14, 10.3, 9.8, 11.0, 10.1],
        "7": [30, 15, 20, 10, 12, 8, 8, 6, 6]
    }"#;

    #[test]
    fn test_parse_table() {
        let table = ReferenceTable::from_json_str("bold", SAMPLE).unwrap();
        assert_eq!(table.name(), "bold");
        assert_eq!(table.len(), 2);
        assert_eq!(table.chars().collect::<String>(), "7A");
        assert_eq!(table.get('A').unwrap().values()[4], 14.0);
        assert!(table.get('B').is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let bad = [
            r#"{ "AB": [1,2,3,4,5,6,7,8,9] }"#,
            r#"{ "": [1,2,3,4,5,6,7,8,9] }"#,
            r#"{ "A": [1,2,3,4,5,6,7,8] }"#,
            r#"{ "A": [1,2,3,4,5,6,7,8,9,10] }"#,
            r#"{ "A": [1,2,3,4,5,6,7,8,"x"] }"#,
            r#"{}"#,
            r#"[1, 2]"#,
        ];
        for json in bad {
            assert!(
                matches!(
                    ReferenceTable::from_json_str("t", json),
                    Err(RecogError::InvalidTable(_))
                ),
                "accepted {}",
                json
            );
        }
    }

    #[test]
    fn test_json_file_roundtrip() {
        let table = ReferenceTable::new("slim")
            .with_entry('x', FeatureVector::new([0.1, 0.2, 0.3, 0.4, 5.0, 1.0 / 3.0, 0.0, 0.0, 1e-9]))
            .with_entry('Q', FeatureVector::new([1.0; 9]));

        let dir = std::env::temp_dir().join(format!("capsolve_table_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("slim.json");
        table.write_json_file(&path).unwrap();
        let back = ReferenceTable::from_json_file("slim", &path).unwrap();
        assert_eq!(back, table);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        assert!(matches!(
            ReferenceTable::from_json_file("bold", "/nonexistent/bold.json"),
            Err(RecogError::Resource { .. })
        ));
    }

    #[test]
    fn test_tables_order() {
        let tables = ReferenceTables::bold_slim(ReferenceTable::new("bold"), ReferenceTable::new("slim"))
            .with_table(ReferenceTable::new("extra"));
        let names: Vec<&str> = tables.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["bold", "slim", "extra"]);
        assert!(tables.get("slim").is_some());
        assert!(tables.get("thin").is_none());
    }
}
