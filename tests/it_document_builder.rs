//! Per-record document building, end to end over the JSON backend.

use catalog_indexer::{
    CatalogRecord, DocumentBuilder, FieldValue, IndexError, IndexerConfig, JsonClassifier,
    JsonRecord, JsonResolver, NumericKind, NumericKindRegistry, QueryableRegistry, QueryableSet,
    Result, ScalarValue, ValueResolver, ANY_TEXT_FIELD, ID_FIELD, MARKER_FIELD, MARKER_VALUE,
};
use serde_json::json;
use std::collections::BTreeMap;

fn builder_with(
    additional: &[(&str, &str)],
    default_srid: i32,
) -> DocumentBuilder<JsonRecord, JsonClassifier, JsonResolver> {
    let mut config = IndexerConfig::default();
    config.default_srid = default_srid;
    config.additional_queryables = additional
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>();
    let registry = QueryableRegistry::new(
        config.additional_set().expect("valid additional set"),
        config.default_srid,
    );
    DocumentBuilder::new(JsonClassifier, JsonResolver::default(), registry)
}

fn texts(values: Vec<&FieldValue>) -> Vec<String> {
    values.iter().map(|v| v.as_text()).collect()
}

fn iso_record() -> JsonRecord {
    JsonRecord::new(
        "iso-1",
        json!({
            "$type": "MD_Metadata",
            "identification": {
                "citation": {"title": "Coastal habitats"},
                "abstract": "Survey of coastal habitats",
                "descriptiveKeywords": {"keyword": ["oceans", "habitats"]},
                "spatialResolution": {"denominator": 50000},
                "extent": {
                    "westBoundLongitude": "-10.5",
                    "eastBoundLongitude": "1.25",
                    "northBoundLatitude": "51.0",
                    "southBoundLatitude": "41.0"
                }
            }
        }),
    )
}

#[test]
fn iso_record_gets_root_tag_and_baseline_fields() {
    let builder = builder_with(&[], 4326);
    let mut kinds = NumericKindRegistry::new();
    let doc = builder.build(&iso_record(), &mut kinds).unwrap();

    assert_eq!(doc.object_type, "MD_Metadata");
    assert_eq!(texts(doc.values_of(ID_FIELD)), ["iso-1"]);

    // Schema pass and baseline pass both resolve the title.
    let titles = texts(doc.values_of("title"));
    assert_eq!(titles, ["Coastal habitats", "Coastal habitats"]);

    // Sort companion exists alongside the search field.
    assert!(!doc.values_of("title_sort").is_empty());

    assert_eq!(texts(doc.values_of(MARKER_FIELD)), [MARKER_VALUE]);
}

#[test]
fn operator_queryables_strictly_override_schema_paths() {
    let record = JsonRecord::new(
        "iso-2",
        json!({
            "$type": "MD_Metadata",
            "identification": {"citation": {"title": "Schema title"}},
            "operator": {"title": "Operator title"}
        }),
    );
    let builder = builder_with(&[("title", "operator/title")], 4326);
    let mut kinds = NumericKindRegistry::new();
    let doc = builder.build(&record, &mut kinds).unwrap();

    let titles = texts(doc.values_of("title"));
    assert_eq!(titles, ["Operator title"]);
    assert!(doc.free_text.contains("Operator title"));
    assert!(!doc.free_text.contains("Schema title"));
}

#[test]
fn schema_spatial_wins_over_baseline() {
    let record = JsonRecord::new(
        "iso-3",
        json!({
            "$type": "MD_Metadata",
            "identification": {
                "citation": {"title": "Both extents"},
                "extent": {
                    "westBoundLongitude": "-10.5",
                    "eastBoundLongitude": "1.25",
                    "northBoundLatitude": "51.0",
                    "southBoundLatitude": "41.0"
                }
            },
            "boundingBox": {"west": "0", "east": "1", "north": "1", "south": "0"}
        }),
    );
    let builder = builder_with(&[], 3857);
    let mut kinds = NumericKindRegistry::new();
    let doc = builder.build(&record, &mut kinds).unwrap();

    // One spatial layer only: the ISO extent at the schema SRID, the
    // Dublin-Core boundingBox never consulted.
    assert_eq!(doc.bounding_boxes.len(), 1);
    assert_eq!(doc.bounding_boxes[0].srid, 4326);
    assert_eq!(doc.bounding_boxes[0].min_x, -10.5);
}

#[test]
fn baseline_spatial_applies_when_schema_extraction_fails() {
    let record = JsonRecord::new(
        "iso-4",
        json!({
            "$type": "MD_Metadata",
            "identification": {"citation": {"title": "No ISO extent"}},
            "boundingBox": {"west": "2.0", "east": "2.5", "north": "49.0", "south": "48.5"}
        }),
    );
    let builder = builder_with(&[], 3857);
    let mut kinds = NumericKindRegistry::new();
    let doc = builder.build(&record, &mut kinds).unwrap();

    assert_eq!(doc.bounding_boxes.len(), 1);
    assert_eq!(doc.bounding_boxes[0].srid, 3857);
    assert_eq!(doc.bounding_boxes[0].max_y, 49.0);
}

#[test]
fn unclassifiable_records_still_get_the_baseline() {
    let record = JsonRecord::new(
        "odd-1",
        json!({"$type": "Mystery", "title": "Opaque thing"}),
    );
    let builder = builder_with(&[], 4326);
    let mut kinds = NumericKindRegistry::new();
    let doc = builder.build(&record, &mut kinds).unwrap();

    assert_eq!(doc.object_type, "unclassified");
    assert_eq!(texts(doc.values_of("title")), ["Opaque thing"]);
    assert!(doc.bounding_boxes.is_empty());
    assert_eq!(texts(doc.values_of(MARKER_FIELD)), [MARKER_VALUE]);
}

#[test]
fn repeated_values_appear_once_in_free_text() {
    let record = JsonRecord::new(
        "dc-1",
        json!({
            "$type": "Record",
            "title": "Paris",
            "subject": "Paris"
        }),
    );
    let builder = builder_with(&[], 4326);
    let mut kinds = NumericKindRegistry::new();
    let doc = builder.build(&record, &mut kinds).unwrap();

    assert_eq!(doc.free_text.matches("Paris").count(), 1);
    // The blob is also stamped as a searchable field.
    assert_eq!(texts(doc.values_of(ANY_TEXT_FIELD)), [doc.free_text.clone()]);
}

#[test]
fn numeric_fields_register_their_kind() {
    let record = JsonRecord::new(
        "iso-5",
        json!({
            "$type": "MD_Metadata",
            "identification": {
                "citation": {"title": "Scaled map"},
                "spatialResolution": {"denominator": 50000}
            },
            "stats": {"elevation": 120.5}
        }),
    );
    let builder = builder_with(&[("elevation", "stats/elevation")], 4326);
    let mut kinds = NumericKindRegistry::new();
    let doc = builder.build(&record, &mut kinds).unwrap();

    assert_eq!(kinds.kind_of("denominator"), Some(NumericKind::Int));
    assert_eq!(kinds.kind_of("denominator_sort"), Some(NumericKind::Int));
    assert_eq!(kinds.kind_of("elevation"), Some(NumericKind::Double));
    assert_eq!(
        doc.values_of("denominator"),
        vec![&FieldValue::Int(50000)]
    );
}

/// Delegates to the JSON backend but fails on one configured path,
/// like a backend whose storage read dies mid-record.
struct FailingResolver {
    inner: JsonResolver,
    broken_path: &'static str,
}

impl ValueResolver<JsonRecord> for FailingResolver {
    fn raw_values(&self, record: &JsonRecord, path: &str) -> Result<Vec<ScalarValue>> {
        if path == self.broken_path {
            return Err(IndexError::ValueResolution {
                record_id: record.id().to_string(),
                cause: "backing store read failed".to_string(),
            });
        }
        self.inner.raw_values(record, path)
    }
}

#[test]
fn resolution_failures_name_the_queryable_set_and_field() {
    let resolver = FailingResolver {
        inner: JsonResolver::default(),
        broken_path: "identification/abstract",
    };
    let registry = QueryableRegistry::new(QueryableSet::new("additional"), 4326);
    let builder = DocumentBuilder::new(JsonClassifier, resolver, registry);
    let mut kinds = NumericKindRegistry::new();

    let err = builder.build(&iso_record(), &mut kinds).unwrap_err();
    assert!(err.is_record_scoped());

    let msg = err.to_string();
    assert!(msg.contains("iso-1"));
    assert!(msg.contains("queryable set `iso19115`"));
    assert!(msg.contains("field `abstract`"));
    assert!(msg.contains("backing store read failed"));
}

#[test]
fn conditional_queryable_resolves_guarded_dates() {
    let record = JsonRecord::new(
        "iso-6",
        json!({
            "$type": "MD_Metadata",
            "identification": {
                "citation": {
                    "title": "Versioned set",
                    "date": [{"$date": "2008-06-15"}, {"$date": "2010-01-02"}],
                    "dateType": ["creation", "revision"]
                }
            }
        }),
    );
    let builder = builder_with(&[], 4326);
    let mut kinds = NumericKindRegistry::new();
    let doc = builder.build(&record, &mut kinds).unwrap();

    let dates = texts(doc.values_of("revisionDate"));
    assert_eq!(dates, ["20080615", "20100102"]);
}
