//! Search-index document model.
//!
//! An [`IndexDocument`] is the uniform output of the engine: an ordered
//! multiset of typed field entries (names are not required to be unique —
//! search and sort companions share a name), a single aggregated free-text
//! blob, and zero or more bounding boxes for spatial search.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Sentinel produced when a path resolves to nothing.
pub const NULL_TOKEN: &str = "null";

/// Field carrying the record's own identifier.
pub const ID_FIELD: &str = "_id";

/// Constant discovery marker stamped on every document so the search backend
/// can enumerate "all documents".
pub const MARKER_FIELD: &str = "_index";

/// Value of [`MARKER_FIELD`].
pub const MARKER_VALUE: &str = "true";

/// Field carrying the aggregated free-text blob.
pub const ANY_TEXT_FIELD: &str = "anytext";

/// Suffix of the non-tokenized sort companion of a field.
pub const SORT_SUFFIX: &str = "_sort";

/// Object type stamped when classification yields no schema family.
pub const UNCLASSIFIED: &str = "unclassified";

/// Concrete numeric representation a field was stored under.
///
/// Recorded in the session's [`NumericKindRegistry`] so later range-query
/// planning knows how to query the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumericKind {
    Int,
    Long,
    Float,
    Double,
    /// Unsupported numeric representation stored as its string form.
    StringFallback,
}

/// Kind of a stored field entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Tokenized, stored text.
    Text,
    /// Non-tokenized sort companion of a text field.
    SortText,
    /// Numeric search field.
    Numeric(NumericKind),
    /// Numeric sort companion, same kind as its search field.
    SortNumeric(NumericKind),
}

/// Stored value of a field entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl FieldValue {
    /// String rendering used for free text and diagnostics.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Long(n) => n.to_string(),
            FieldValue::Float(n) => n.to_string(),
            FieldValue::Double(n) => n.to_string(),
        }
    }
}

/// One searchable or sortable field of a document.
#[derive(Debug, Clone, Serialize)]
pub struct FieldEntry {
    pub name: String,
    pub kind: FieldKind,
    pub value: FieldValue,
}

/// West/east/south/north envelope tagged with a coordinate reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub srid: i32,
}

/// Finished search-index document for one record.
///
/// Created, populated, and handed off atomically to the destination session;
/// never mutated afterward.
#[derive(Debug, Clone, Serialize)]
pub struct IndexDocument {
    /// Engine-allocated document id.
    pub doc_id: String,
    /// Root tag of the matched schema family, or [`UNCLASSIFIED`].
    pub object_type: String,
    /// Ordered multiset of field entries.
    pub fields: Vec<FieldEntry>,
    /// Aggregated free-text blob (also stamped as [`ANY_TEXT_FIELD`]).
    pub free_text: String,
    /// Extracted spatial envelopes.
    pub bounding_boxes: Vec<BoundingBox>,
}

impl IndexDocument {
    pub(crate) fn new(doc_id: String) -> Self {
        Self {
            doc_id,
            object_type: UNCLASSIFIED.to_string(),
            fields: Vec::new(),
            free_text: String::new(),
            bounding_boxes: Vec::new(),
        }
    }

    /// Append a text field (no sort companion, no free-text contribution).
    pub fn push_text(&mut self, name: &str, value: impl Into<String>) {
        self.fields.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Text,
            value: FieldValue::Text(value.into()),
        });
    }

    /// All values stored under `name`, in insertion order.
    pub fn values_of(&self, name: &str) -> Vec<&FieldValue> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .map(|f| &f.value)
            .collect()
    }
}

/// Session-scoped map of field name → numeric kind.
///
/// One instance per rebuild, passed by explicit ownership; the last write
/// for a given name wins for the remainder of the session.
#[derive(Debug, Default, Clone)]
pub struct NumericKindRegistry {
    kinds: FxHashMap<String, NumericKind>,
}

impl NumericKindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the kind a field was stored under. Last write wins.
    pub fn record(&mut self, field: &str, kind: NumericKind) {
        self.kinds.insert(field.to_string(), kind);
    }

    /// Kind the field was last stored under, if any numeric value was seen.
    pub fn kind_of(&self, field: &str) -> Option<NumericKind> {
        self.kinds.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Free-text accumulator with sentinel filtering and approximate
/// substring-based de-duplication.
///
/// A value is appended only if it is not the `"null"` sentinel and is not
/// already a substring of the accumulated text. The substring containment
/// check is an intentionally preserved approximation: it can both under- and
/// over-suppress repeated tokens, and is kept exactly as specified rather
/// than normalized to exact-match de-duplication.
#[derive(Debug, Default)]
pub struct FreeText {
    text: String,
}

impl FreeText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` unless it is the sentinel or already contained.
    pub fn push(&mut self, value: &str) {
        let value = value.trim();
        if value.is_empty() || value == NULL_TOKEN {
            return;
        }
        if self.text.contains(value) {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(value);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_skips_sentinel_and_duplicates() {
        let mut ft = FreeText::new();
        ft.push("Paris");
        ft.push("null");
        ft.push("Paris");
        assert_eq!(ft.as_str(), "Paris");
    }

    #[test]
    fn free_text_substring_containment_over_suppresses() {
        // "Par" arriving after "Paris" is suppressed even though it is a
        // distinct token. Intentional: containment, not exact match.
        let mut ft = FreeText::new();
        ft.push("Paris");
        ft.push("Par");
        assert_eq!(ft.as_str(), "Paris");
    }

    #[test]
    fn numeric_registry_last_write_wins() {
        let mut reg = NumericKindRegistry::new();
        reg.record("elevation", NumericKind::Int);
        reg.record("elevation", NumericKind::Double);
        assert_eq!(reg.kind_of("elevation"), Some(NumericKind::Double));
    }
}
