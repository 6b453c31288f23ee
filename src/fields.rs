//! Field materialization.
//!
//! Turns resolved scalar values into searchable/sortable/typed field entries
//! on a document, accumulates the free-text blob, and records numeric kinds
//! in the session registry.

use crate::document::{
    FieldEntry, FieldKind, FieldValue, FreeText, IndexDocument, NumericKind,
    NumericKindRegistry, SORT_SUFFIX,
};
use crate::resolve::ScalarValue;

/// Materializes resolved values as document fields.
#[derive(Debug, Default, Clone)]
pub struct FieldIndexer;

impl FieldIndexer {
    pub fn new() -> Self {
        Self
    }

    /// Index every value under `name`.
    ///
    /// Textual values get a tokenized search field plus a non-tokenized sort
    /// companion (`{name}_sort`) and contribute to the free-text blob.
    /// Numeric values get a search field and sort companion tagged with the
    /// same numeric kind, recorded in the session registry for both names.
    /// Numeric representations outside {int, long, float, double} are stored
    /// as their string form under the string-fallback kind. Anything else is
    /// ignored with a warning naming its runtime type.
    pub fn index_values(
        &self,
        name: &str,
        values: &[ScalarValue],
        doc: &mut IndexDocument,
        free_text: &mut FreeText,
        kinds: &mut NumericKindRegistry,
    ) {
        for value in values {
            match value {
                ScalarValue::Text(s) => self.index_text(name, s, doc, free_text),
                ScalarValue::Int(n) => {
                    self.index_numeric(name, NumericKind::Int, FieldValue::Int(*n), doc, kinds)
                }
                ScalarValue::Long(n) => {
                    self.index_numeric(name, NumericKind::Long, FieldValue::Long(*n), doc, kinds)
                }
                ScalarValue::Float(n) => {
                    self.index_numeric(name, NumericKind::Float, FieldValue::Float(*n), doc, kinds)
                }
                ScalarValue::Double(n) => self.index_numeric(
                    name,
                    NumericKind::Double,
                    FieldValue::Double(*n),
                    doc,
                    kinds,
                ),
                ScalarValue::BigInt(_) | ScalarValue::Decimal(_) => {
                    tracing::warn!(
                        field = %name,
                        representation = %value.type_name(),
                        "unsupported numeric representation, storing string form"
                    );
                    self.index_numeric(
                        name,
                        NumericKind::StringFallback,
                        FieldValue::Text(value.as_text()),
                        doc,
                        kinds,
                    );
                }
                other => {
                    tracing::warn!(
                        field = %name,
                        value_type = %other.type_name(),
                        "ignoring value of unsupported type"
                    );
                }
            }
        }
    }

    fn index_text(&self, name: &str, value: &str, doc: &mut IndexDocument, free_text: &mut FreeText) {
        doc.fields.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Text,
            value: FieldValue::Text(value.to_string()),
        });
        doc.fields.push(FieldEntry {
            name: format!("{name}{SORT_SUFFIX}"),
            kind: FieldKind::SortText,
            value: FieldValue::Text(value.to_string()),
        });
        free_text.push(value);
    }

    fn index_numeric(
        &self,
        name: &str,
        kind: NumericKind,
        value: FieldValue,
        doc: &mut IndexDocument,
        kinds: &mut NumericKindRegistry,
    ) {
        let sort_name = format!("{name}{SORT_SUFFIX}");
        doc.fields.push(FieldEntry {
            name: name.to_string(),
            kind: FieldKind::Numeric(kind),
            value: value.clone(),
        });
        doc.fields.push(FieldEntry {
            name: sort_name.clone(),
            kind: FieldKind::SortNumeric(kind),
            value,
        });
        kinds.record(name, kind);
        kinds.record(&sort_name, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use num_bigint::BigInt;
    use std::str::FromStr;

    fn setup() -> (IndexDocument, FreeText, NumericKindRegistry) {
        (
            IndexDocument::new("doc-1".into()),
            FreeText::new(),
            NumericKindRegistry::new(),
        )
    }

    #[test]
    fn text_gets_search_and_sort_companions() {
        let (mut doc, mut ft, mut kinds) = setup();
        FieldIndexer::new().index_values(
            "title",
            &[ScalarValue::Text("Paris".into())],
            &mut doc,
            &mut ft,
            &mut kinds,
        );
        assert_eq!(doc.fields.len(), 2);
        assert_eq!(doc.fields[0].kind, FieldKind::Text);
        assert_eq!(doc.fields[1].name, "title_sort");
        assert_eq!(doc.fields[1].kind, FieldKind::SortText);
        assert_eq!(ft.as_str(), "Paris");
        assert!(kinds.is_empty());
    }

    #[test]
    fn repeated_text_contributes_once_to_free_text() {
        let (mut doc, mut ft, mut kinds) = setup();
        let indexer = FieldIndexer::new();
        indexer.index_values(
            "keyword",
            &[ScalarValue::Text("Paris".into())],
            &mut doc,
            &mut ft,
            &mut kinds,
        );
        indexer.index_values(
            "city",
            &[ScalarValue::Text("Paris".into())],
            &mut doc,
            &mut ft,
            &mut kinds,
        );
        assert_eq!(ft.as_str(), "Paris");
        // Both fields are still stored.
        assert_eq!(doc.fields.len(), 4);
    }

    #[test]
    fn numeric_kinds_are_registered_for_both_names() {
        let (mut doc, mut ft, mut kinds) = setup();
        let indexer = FieldIndexer::new();
        indexer.index_values(
            "elevation",
            &[ScalarValue::Double(12.5)],
            &mut doc,
            &mut ft,
            &mut kinds,
        );
        indexer.index_values(
            "count",
            &[ScalarValue::Int(7)],
            &mut doc,
            &mut ft,
            &mut kinds,
        );
        assert_eq!(kinds.kind_of("elevation"), Some(NumericKind::Double));
        assert_eq!(kinds.kind_of("elevation_sort"), Some(NumericKind::Double));
        assert_eq!(kinds.kind_of("count"), Some(NumericKind::Int));
        assert!(ft.as_str().is_empty());
    }

    #[test]
    fn bigint_and_decimal_fall_back_to_string() {
        let (mut doc, mut ft, mut kinds) = setup();
        let indexer = FieldIndexer::new();
        indexer.index_values(
            "population",
            &[ScalarValue::BigInt(Box::new(
                BigInt::from_str("123456789012345678901234567890").unwrap(),
            ))],
            &mut doc,
            &mut ft,
            &mut kinds,
        );
        indexer.index_values(
            "ratio",
            &[ScalarValue::Decimal(Box::new(
                BigDecimal::from_str("1.25").unwrap(),
            ))],
            &mut doc,
            &mut ft,
            &mut kinds,
        );
        assert_eq!(
            kinds.kind_of("population"),
            Some(NumericKind::StringFallback)
        );
        assert_eq!(kinds.kind_of("ratio"), Some(NumericKind::StringFallback));
        assert_eq!(
            doc.fields[0].value,
            FieldValue::Text("123456789012345678901234567890".into())
        );
    }

    #[test]
    fn booleans_are_ignored() {
        let (mut doc, mut ft, mut kinds) = setup();
        FieldIndexer::new().index_values(
            "published",
            &[ScalarValue::Boolean(true)],
            &mut doc,
            &mut ft,
            &mut kinds,
        );
        assert!(doc.fields.is_empty());
        assert!(kinds.is_empty());
    }
}
