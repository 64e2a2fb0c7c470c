//! Entity-list codec
//!
//! The training entity list is a flat comma-separated text document: one
//! header row (`Text,Type`) followed by one `text,type` pair per row.
//! `text` is the exact, case-preserving substring matched in source
//! documents; `type` is an uppercase label. Rows that do not split into
//! exactly two fields are skipped on read, which tolerates corrupt
//! trailing lines without failing the whole list.

use serde::{Deserialize, Serialize};

/// Header row of every entity-list document
pub const ENTITY_LIST_HEADER: &str = "Text,Type";

/// One trainable entity: matched text plus its uppercase type label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Exact substring matched in source documents (case-preserving)
    pub text: String,
    /// Entity type label, normalized to uppercase
    pub entity_type: String,
}

impl EntityRecord {
    /// Create a record, normalizing the type label to uppercase
    pub fn new(text: impl Into<String>, entity_type: &str) -> Self {
        Self {
            text: text.into(),
            entity_type: entity_type.to_uppercase(),
        }
    }
}

/// An ordered entity list, deduplicated by entity text
///
/// Uniqueness key is `text`: the first occurrence wins, and a later row
/// with the same text but a different type is treated as a duplicate of
/// the first-seen record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityList {
    records: Vec<EntityRecord>,
}

impl EntityList {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an entity-list document
    ///
    /// The first row is the header and is always skipped. Malformed rows
    /// (not exactly two comma-separated fields) and blank lines are
    /// dropped; duplicate texts collapse to the first occurrence.
    pub fn parse(content: &str) -> Self {
        let mut list = Self::new();

        for (line_no, line) in content.lines().enumerate() {
            if line_no == 0 {
                continue; // header row
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != 2 {
                tracing::debug!(line_no, line, "Skipping malformed entity row");
                continue;
            }

            list.push(EntityRecord::new(fields[0].trim(), fields[1].trim()));
        }

        list
    }

    /// Serialize to the on-store document format (header + rows)
    pub fn to_csv(&self) -> String {
        let mut out = String::from(ENTITY_LIST_HEADER);
        for record in &self.records {
            out.push('\n');
            out.push_str(&record.text);
            out.push(',');
            out.push_str(&record.entity_type);
        }
        out.push('\n');
        out
    }

    /// Append a record unless its text is already present
    ///
    /// Returns true if the record was added.
    pub fn push(&mut self, record: EntityRecord) -> bool {
        if self.contains_text(&record.text) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Whether an entity with this exact text exists
    pub fn contains_text(&self, text: &str) -> bool {
        self.records.iter().any(|r| r.text == text)
    }

    /// Number of entity records (header excluded)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the list holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in list order
    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// Distinct entity types, sorted for deterministic output
    pub fn entity_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .records
            .iter()
            .map(|r| r.entity_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

impl FromIterator<EntityRecord> for EntityList {
    fn from_iter<I: IntoIterator<Item = EntityRecord>>(iter: I) -> Self {
        let mut list = Self::new();
        for record in iter {
            list.push(record);
        }
        list
    }
}
