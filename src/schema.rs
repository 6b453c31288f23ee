//! Schema family classification.
//!
//! Classification is an ordered sequence of boolean predicates over the
//! record's shape, evaluated in a fixed priority: ISO19115 → ebRIM v3 →
//! ebRIM v2.5 → feature catalogue → Dublin Core. The first match wins.
//!
//! The result is advisory only for field selection: the Dublin-Core baseline
//! queryable set is applied to every record regardless of what the
//! classifier says (see [`crate::builder::DocumentBuilder`]).

use crate::resolve::{CatalogRecord, JsonRecord};
use serde::Serialize;

/// Mutually exclusive record shapes the engine can classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaFamily {
    Iso19115,
    DublinCore,
    EbrimV25,
    EbrimV3,
    FeatureCatalogue,
    Unknown,
}

impl SchemaFamily {
    /// Canonical root tag stamped as the document's `objectType`.
    pub fn object_type(self) -> &'static str {
        match self {
            SchemaFamily::Iso19115 => "MD_Metadata",
            SchemaFamily::DublinCore => "Record",
            SchemaFamily::EbrimV25 | SchemaFamily::EbrimV3 => "RegistryObject",
            SchemaFamily::FeatureCatalogue => "FC_FeatureCatalogue",
            SchemaFamily::Unknown => crate::document::UNCLASSIFIED,
        }
    }
}

/// Predicate dispatch over an opaque record.
pub trait Classifier<R> {
    /// Assign exactly one schema family to the record.
    ///
    /// Must never fail: an unrecognized shape yields
    /// [`SchemaFamily::Unknown`] (and a warning naming the unresolved root).
    fn classify(&self, record: &R) -> SchemaFamily;
}

/// Classifier for the JSON record backend.
///
/// Dispatches on the record's `$type` root marker, with `$version`
/// distinguishing the two ebRIM generations.
#[derive(Debug, Default, Clone)]
pub struct JsonClassifier;

impl Classifier<JsonRecord> for JsonClassifier {
    fn classify(&self, record: &JsonRecord) -> SchemaFamily {
        let root = record.root_type().unwrap_or("");
        match root {
            "MD_Metadata" => SchemaFamily::Iso19115,
            "RegistryObject" | "RegistryPackage" => {
                let version = record.schema_version().unwrap_or("");
                if version.starts_with('3') {
                    SchemaFamily::EbrimV3
                } else {
                    SchemaFamily::EbrimV25
                }
            }
            "FC_FeatureCatalogue" => SchemaFamily::FeatureCatalogue,
            "Record" | "SummaryRecord" | "BriefRecord" => SchemaFamily::DublinCore,
            _ => {
                tracing::warn!(
                    record_id = %record.id(),
                    root_type = %root,
                    "record shape did not match any schema family"
                );
                SchemaFamily::Unknown
            }
        }
    }
}
