//! Corpus-level index rebuilds.
//!
//! Two entry points: a full rebuild that lists the corpus, opens a fresh
//! session, and builds every record best-effort; and an incremental pass
//! that indexes an already-materialized list of records into an existing
//! open session.
//!
//! Record-scoped fetch/build failures are logged and skipped (see
//! [`crate::error::IndexError::is_record_scoped`]). Anything else — session
//! open/write/commit failures included — is fatal and aborts the rebuild,
//! with the session still released on every exit path so handles are never
//! leaked.
//!
//! Processing is single-threaded and synchronous; callers serialize
//! concurrent rebuilds against the same destination index externally.

use crate::builder::DocumentBuilder;
use crate::config::IndexerConfig;
use crate::document::{IndexDocument, NumericKindRegistry};
use crate::error::Result;
use crate::resolve::{CatalogRecord, ValueResolver};
use crate::schema::Classifier;
use std::time::{Duration, Instant};

/// Record source the engine indexes from.
pub trait MetadataCorpus {
    type Record: CatalogRecord;

    /// All record identifiers, honoring the exposure/publication flags.
    fn list_identifiers(&self, exclude_internal: bool, published_only: bool)
        -> Result<Vec<String>>;

    /// Fetch one record read-only.
    fn fetch(&self, id: &str) -> Result<Self::Record>;
}

/// Destination index session.
///
/// A scoped resource: acquired at rebuild start, released on every exit
/// path (with commit on the success path).
pub trait IndexSession {
    fn add_document(&mut self, doc: IndexDocument) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Opens fresh sessions for full rebuilds.
pub trait SessionFactory {
    type Session: IndexSession;

    fn open(&self) -> Result<Self::Session>;
}

/// Outcome of a full rebuild.
#[derive(Debug)]
pub struct RebuildReport {
    /// Identifiers returned by the corpus listing.
    pub records_listed: usize,
    /// Documents successfully built and added to the session.
    pub documents_indexed: usize,
    /// Records skipped after a fetch or build failure.
    pub records_skipped: usize,
    /// Total bounding boxes emitted across all documents.
    pub bounding_boxes: usize,
    /// Wall-clock time for the whole rebuild.
    pub elapsed: Duration,
    /// Field → numeric kind map accumulated over the session, for
    /// range-query planning.
    pub numeric_kinds: NumericKindRegistry,
}

/// Outcome of an incremental indexing pass.
#[derive(Debug)]
pub struct IncrementalReport {
    pub documents_indexed: usize,
    pub records_skipped: usize,
    pub elapsed: Duration,
}

/// Drives full and incremental rebuilds over a record source.
pub struct CorpusIndexer<R, C, V>
where
    R: CatalogRecord,
    C: Classifier<R>,
    V: ValueResolver<R>,
{
    builder: DocumentBuilder<R, C, V>,
    config: IndexerConfig,
}

impl<R, C, V> CorpusIndexer<R, C, V>
where
    R: CatalogRecord,
    C: Classifier<R>,
    V: ValueResolver<R>,
{
    pub fn new(builder: DocumentBuilder<R, C, V>, config: IndexerConfig) -> Self {
        Self { builder, config }
    }

    /// Per-record builder, for single-record re-indexing.
    pub fn builder(&self) -> &DocumentBuilder<R, C, V> {
        &self.builder
    }

    /// Rebuild the whole corpus into a freshly opened session.
    ///
    /// Lists identifiers (honoring the configured exposure/publication
    /// flags), builds a document per record, commits, and closes. Session
    /// failures abort; everything below session scope is logged and
    /// skipped.
    pub fn full_rebuild<M, F>(&self, corpus: &M, sessions: &F) -> Result<RebuildReport>
    where
        M: MetadataCorpus<Record = R>,
        F: SessionFactory,
    {
        let start = Instant::now();
        let ids = corpus.list_identifiers(
            self.config.exclude_internal_recordsets,
            self.config.published_only,
        )?;
        tracing::info!(
            records = ids.len(),
            exclude_internal = self.config.exclude_internal_recordsets,
            published_only = self.config.published_only,
            "full index rebuild starting"
        );

        let mut session = sessions.open()?;
        let mut kinds = NumericKindRegistry::new();
        let mut indexed = 0usize;
        let mut skipped = 0usize;
        let mut boxes = 0usize;

        for (n, id) in ids.iter().enumerate() {
            let doc = match corpus
                .fetch(id)
                .and_then(|record| self.builder.build(&record, &mut kinds))
            {
                Ok(doc) => doc,
                Err(e) if e.is_record_scoped() => {
                    tracing::warn!(record_id = %id, error = %e, "skipping record");
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    release(&mut session);
                    return Err(e);
                }
            };
            boxes += doc.bounding_boxes.len();
            if let Err(e) = session.add_document(doc) {
                release(&mut session);
                return Err(e);
            }
            indexed += 1;
            if (n + 1) % 100 == 0 {
                tracing::debug!(
                    processed = n + 1,
                    total = ids.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "rebuild progress"
                );
            }
        }

        if let Err(e) = session.commit() {
            release(&mut session);
            return Err(e);
        }
        session.close()?;

        let elapsed = start.elapsed();
        tracing::info!(
            indexed,
            skipped,
            bounding_boxes = boxes,
            elapsed_ms = elapsed.as_millis() as u64,
            "full index rebuild finished"
        );
        Ok(RebuildReport {
            records_listed: ids.len(),
            documents_indexed: indexed,
            records_skipped: skipped,
            bounding_boxes: boxes,
            elapsed,
            numeric_kinds: kinds,
        })
    }

    /// Index an explicit list of records into an existing open session.
    ///
    /// Never commits or closes: the session (and its numeric-kind registry)
    /// belong to the caller.
    pub fn index_records<S>(
        &self,
        records: &[R],
        session: &mut S,
        kinds: &mut NumericKindRegistry,
    ) -> Result<IncrementalReport>
    where
        S: IndexSession,
    {
        let start = Instant::now();
        let mut indexed = 0usize;
        let mut skipped = 0usize;

        for record in records {
            match self.builder.build(record, kinds) {
                Ok(doc) => {
                    session.add_document(doc)?;
                    indexed += 1;
                }
                Err(e) if e.is_record_scoped() => {
                    tracing::warn!(record_id = %record.id(), error = %e, "skipping record");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        let elapsed = start.elapsed();
        tracing::info!(
            indexed,
            skipped,
            elapsed_ms = elapsed.as_millis() as u64,
            "incremental indexing finished"
        );
        Ok(IncrementalReport {
            documents_indexed: indexed,
            records_skipped: skipped,
            elapsed,
        })
    }
}

/// Best-effort close after a fatal session failure.
fn release<S: IndexSession>(session: &mut S) {
    if let Err(e) = session.close() {
        tracing::warn!(error = %e, "failed to close index session after fatal failure");
    }
}
