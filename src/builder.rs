//! Per-record document building.
//!
//! [`DocumentBuilder`] orchestrates classification, queryable resolution,
//! field materialization, and spatial extraction for one record:
//!
//! 1. Allocate the doc id and stamp identity fields.
//! 2. Classify the record.
//! 3. Apply the effective schema queryable set (schema set minus
//!    operator-overridden fields).
//! 4. Attempt schema-specific spatial extraction at the schema's SRID.
//! 5. Apply the effective Dublin-Core baseline set — for every record,
//!    whatever the classification said.
//! 6. If step 4 emitted nothing, attempt baseline spatial extraction at the
//!    session's default SRID. At most one spatial layer ever succeeds.
//! 7. Apply the additional (operator) set; its fields are never shadowed.
//! 8. Stamp the discovery marker.
//! 9. Stamp the accumulated free text as a single searchable field.
//!
//! Any resolution failure aborts only the record being built; the corpus
//! indexer logs it and continues the batch.

use crate::document::{
    FreeText, IndexDocument, NumericKindRegistry, ANY_TEXT_FIELD, ID_FIELD, MARKER_FIELD,
    MARKER_VALUE,
};
use crate::error::{IndexError, Result};
use crate::fields::FieldIndexer;
use crate::queryable::{QueryableRegistry, QueryableSet};
use crate::resolve::{CatalogRecord, ValueResolver};
use crate::schema::Classifier;
use crate::spatial::SpatialExtractor;
use std::marker::PhantomData;
use uuid::Uuid;

/// Builds one search-index document per record.
///
/// Composed from small injected collaborators rather than subclassed per
/// backend: the classifier and resolver are backend-specific, everything
/// else is shared.
pub struct DocumentBuilder<R, C, V>
where
    R: CatalogRecord,
    C: Classifier<R>,
    V: ValueResolver<R>,
{
    classifier: C,
    resolver: V,
    registry: QueryableRegistry,
    fields: FieldIndexer,
    spatial: SpatialExtractor,
    _record: PhantomData<fn(&R)>,
}

impl<R, C, V> DocumentBuilder<R, C, V>
where
    R: CatalogRecord,
    C: Classifier<R>,
    V: ValueResolver<R>,
{
    pub fn new(classifier: C, resolver: V, registry: QueryableRegistry) -> Self {
        Self {
            classifier,
            resolver,
            registry,
            fields: FieldIndexer::new(),
            spatial: SpatialExtractor::new(),
            _record: PhantomData,
        }
    }

    /// Backend resolver, exposed for callers that stamp extra state.
    pub fn resolver(&self) -> &V {
        &self.resolver
    }

    /// Build the finished document for one record.
    pub fn build(&self, record: &R, kinds: &mut NumericKindRegistry) -> Result<IndexDocument> {
        let mut doc = IndexDocument::new(Uuid::new_v4().to_string());
        let mut free_text = FreeText::new();

        doc.push_text(ID_FIELD, record.id());
        self.resolver.stamp_identity(record, &mut doc);

        let family = self.classifier.classify(record);
        doc.object_type = family.object_type().to_string();

        if let Some(schema_set) = self.registry.schema_set(family) {
            let effective = schema_set.effective(self.registry.additional());
            self.apply_set(record, &effective, &mut doc, &mut free_text, kinds)?;
        }

        let mut spatial_done = false;
        if let Some(paths) = self.registry.schema_spatial(family) {
            let boxes = self
                .spatial
                .extract(&self.resolver, record, paths)
                .map_err(|e| record_scoped(record.id(), e))?;
            if !boxes.is_empty() {
                doc.bounding_boxes.extend(boxes);
                spatial_done = true;
            }
        }

        let baseline = self
            .registry
            .baseline_set()
            .effective(self.registry.additional());
        self.apply_set(record, &baseline, &mut doc, &mut free_text, kinds)?;

        if !spatial_done {
            let paths = self.registry.baseline_spatial();
            let boxes = self
                .spatial
                .extract(&self.resolver, record, &paths)
                .map_err(|e| record_scoped(record.id(), e))?;
            doc.bounding_boxes.extend(boxes);
        }

        self.apply_set(
            record,
            self.registry.additional(),
            &mut doc,
            &mut free_text,
            kinds,
        )?;

        doc.push_text(MARKER_FIELD, MARKER_VALUE);

        doc.free_text = free_text.into_string();
        doc.push_text(ANY_TEXT_FIELD, doc.free_text.clone());

        tracing::debug!(
            record_id = %record.id(),
            doc_id = %doc.doc_id,
            object_type = %doc.object_type,
            fields = doc.fields.len(),
            boxes = doc.bounding_boxes.len(),
            "document built"
        );
        Ok(doc)
    }

    fn apply_set(
        &self,
        record: &R,
        set: &QueryableSet,
        doc: &mut IndexDocument,
        free_text: &mut FreeText,
        kinds: &mut NumericKindRegistry,
    ) -> Result<()> {
        for (field, path) in set.iter() {
            let values = self.resolver.resolve(record, path).map_err(|e| {
                let cause = match e {
                    IndexError::ValueResolution { cause, .. } => cause,
                    other => other.to_string(),
                };
                IndexError::ValueResolution {
                    record_id: record.id().to_string(),
                    cause: format!("queryable set `{}`, field `{field}`: {cause}", set.name()),
                }
            })?;
            self.fields
                .index_values(field, &values, doc, free_text, kinds);
        }
        tracing::trace!(
            record_id = %record.id(),
            set = %set.name(),
            fields = set.len(),
            "queryable set applied"
        );
        Ok(())
    }
}

/// Scope a resolution failure to the record being processed.
fn record_scoped(record_id: &str, e: IndexError) -> IndexError {
    match e {
        IndexError::ValueResolution { .. } => e,
        other => IndexError::ValueResolution {
            record_id: record_id.to_string(),
            cause: other.to_string(),
        },
    }
}
