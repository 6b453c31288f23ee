//! Heterogeneous metadata indexing engine.
//!
//! Turns catalog records of several incompatible schema families
//! (ISO19115-like, Dublin-Core-like, two ebRIM generations, feature
//! catalogues) into uniform search-index documents supporting full-text,
//! typed-field, and spatial (bounding-box) queries.
//!
//! # Architecture
//!
//! ```text
//! CorpusIndexer ── lists/fetches records (MetadataCorpus)
//!       │
//!       ▼
//! DocumentBuilder ── per record:
//!       │    Classifier ──────── schema family (ISO19115 → ebRIM v3 →
//!       │                        ebRIM v2.5 → FC → DC → unknown)
//!       │    QueryableRegistry ─ schema table minus operator overrides,
//!       │                        plus the always-run Dublin-Core baseline
//!       │    ValueResolver ───── path mini-language over the backend tree
//!       │    FieldIndexer ────── text/sort/numeric fields + free text
//!       │    SpatialExtractor ── at most one bbox layer per document
//!       ▼
//! IndexSession ── add_document / commit / close
//! ```
//!
//! The engine only builds documents; query execution, the wire protocol,
//! and record persistence are external collaborators. Processing is
//! single-threaded and synchronous.
//!
//! # Example
//!
//! ```ignore
//! use catalog_indexer::{
//!     CorpusIndexer, DocumentBuilder, IndexerConfig, JsonClassifier,
//!     JsonResolver, QueryableRegistry,
//! };
//!
//! let config = IndexerConfig::default();
//! let registry = QueryableRegistry::new(config.additional_set()?, config.default_srid);
//! let builder = DocumentBuilder::new(JsonClassifier, JsonResolver::default(), registry);
//! let indexer = CorpusIndexer::new(builder, config);
//!
//! let report = indexer.full_rebuild(&corpus, &session_factory)?;
//! println!("indexed {} documents", report.documents_indexed);
//! ```

pub mod builder;
pub mod config;
pub mod corpus;
pub mod document;
pub mod error;
pub mod fields;
pub mod path;
pub mod queryable;
pub mod resolve;
pub mod schema;
pub mod spatial;

pub use builder::DocumentBuilder;
pub use config::{IndexerConfig, LogLevel, DEFAULT_SRID};
pub use corpus::{
    CorpusIndexer, IncrementalReport, IndexSession, MetadataCorpus, RebuildReport, SessionFactory,
};
pub use document::{
    BoundingBox, FieldEntry, FieldKind, FieldValue, FreeText, IndexDocument, NumericKind,
    NumericKindRegistry, ANY_TEXT_FIELD, ID_FIELD, MARKER_FIELD, MARKER_VALUE, NULL_TOKEN,
    SORT_SUFFIX, UNCLASSIFIED,
};
pub use error::{IndexError, Result};
pub use fields::FieldIndexer;
pub use path::{PathExpr, QueryablePath};
pub use queryable::{QueryableRegistry, QueryableSet, SpatialPaths};
pub use resolve::{
    normalize_date, CatalogRecord, CodeList, CodeListCatalog, JsonRecord, JsonResolver,
    ScalarValue, ValueResolver,
};
pub use schema::{Classifier, JsonClassifier, SchemaFamily};
pub use spatial::SpatialExtractor;
