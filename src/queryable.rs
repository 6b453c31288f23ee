//! Queryable sets: per-schema field → path tables and the override merge.
//!
//! Built-in tables are static, read-only configuration parsed once per
//! process; the operator's additional set is parsed once per session from
//! [`crate::config::IndexerConfig`]. Nothing here is mutated during
//! indexing.
//!
//! The additional set strictly overrides schema-provided fields: computing
//! the effective set removes every schema key the additional set defines,
//! and the additional set itself is applied as a wholly separate pass by the
//! document builder so its values are never shadowed.

use crate::path::QueryablePath;
use crate::schema::SchemaFamily;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Field name → queryable path table, scoped to one schema family (or the
/// global additional set).
#[derive(Debug, Clone)]
pub struct QueryableSet {
    name: String,
    entries: BTreeMap<String, QueryablePath>,
}

impl QueryableSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    fn from_table(name: &str, table: &[(&str, &str)]) -> Self {
        let mut set = Self::new(name);
        for (field, raw) in table {
            let path = QueryablePath::parse(raw).expect("built-in queryable path is valid");
            set.insert(*field, path);
        }
        set
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, field: impl Into<String>, path: QueryablePath) {
        self.entries.insert(field.into(), path);
    }

    pub fn get(&self, field: &str) -> Option<&QueryablePath> {
        self.entries.get(field)
    }

    /// Entries in deterministic (field-name) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryablePath)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// This set minus every field the additional set defines.
    ///
    /// The schema's own path for an overridden name is never consulted.
    pub fn effective(&self, additional: &QueryableSet) -> QueryableSet {
        let mut out = Self::new(self.name.clone());
        for (field, path) in &self.entries {
            if additional.get(field).is_none() {
                out.entries.insert(field.clone(), path.clone());
            }
        }
        out
    }
}

/// The four boundary path groups plus the SRID the schema declares for them.
#[derive(Debug, Clone)]
pub struct SpatialPaths {
    pub west: QueryablePath,
    pub east: QueryablePath,
    pub north: QueryablePath,
    pub south: QueryablePath,
    pub srid: i32,
}

impl SpatialPaths {
    fn from_table(west: &str, east: &str, north: &str, south: &str, srid: i32) -> Self {
        let parse =
            |raw: &str| QueryablePath::parse(raw).expect("built-in spatial path is valid");
        Self {
            west: parse(west),
            east: parse(east),
            north: parse(north),
            south: parse(south),
            srid,
        }
    }
}

static ISO19115_SET: Lazy<QueryableSet> = Lazy::new(|| {
    QueryableSet::from_table(
        "iso19115",
        &[
            ("title", "identification/citation/title"),
            ("abstract", "identification/abstract"),
            ("keyword", "identification/descriptiveKeywords/keyword"),
            ("type", "hierarchyLevel"),
            ("format", "distribution/format/name"),
            (
                "revisionDate",
                "identification/citation/date#identification/citation/dateType=revision",
            ),
            ("denominator", "identification/spatialResolution/denominator"),
            ("crs", "referenceSystem/code"),
            ("organisationName", "contact/organisationName"),
        ],
    )
});

static ISO19115_SPATIAL: Lazy<SpatialPaths> = Lazy::new(|| {
    SpatialPaths::from_table(
        "identification/extent/westBoundLongitude",
        "identification/extent/eastBoundLongitude",
        "identification/extent/northBoundLatitude",
        "identification/extent/southBoundLatitude",
        4326,
    )
});

static EBRIM_V3_SET: Lazy<QueryableSet> = Lazy::new(|| {
    QueryableSet::from_table(
        "ebrim-3.0",
        &[
            ("title", "name/localizedString/value"),
            ("abstract", "description/localizedString/value"),
            ("identifier", "externalIdentifier/value"),
            ("objectType", "objectType"),
        ],
    )
});

static EBRIM_V25_SET: Lazy<QueryableSet> = Lazy::new(|| {
    QueryableSet::from_table(
        "ebrim-2.5",
        &[
            ("title", "name/value"),
            ("abstract", "description/value"),
            ("identifier", "externalIdentifier/value"),
            ("objectType", "objectType"),
        ],
    )
});

static FEATURE_CATALOGUE_SET: Lazy<QueryableSet> = Lazy::new(|| {
    QueryableSet::from_table(
        "feature-catalogue",
        &[
            ("title", "name"),
            ("abstract", "scope"),
            ("featureType", "featureType/typeName"),
            ("versionNumber", "versionNumber"),
        ],
    )
});

/// Dublin-Core baseline, applied to every record regardless of
/// classification. Alternative paths let the baseline fields resolve against
/// the other families' shapes as well.
static DUBLIN_CORE_SET: Lazy<QueryableSet> = Lazy::new(|| {
    QueryableSet::from_table(
        "dublin-core",
        &[
            ("title", "title|identification/citation/title|name"),
            ("abstract", "abstract|description|identification/abstract"),
            ("keyword", "subject|identification/descriptiveKeywords/keyword"),
            ("date", "date"),
            ("format", "format"),
            ("type", "type"),
            ("identifier", "identifier"),
        ],
    )
});

static DUBLIN_CORE_SPATIAL: Lazy<SpatialPaths> = Lazy::new(|| {
    // SRID is substituted per session from the configured default.
    SpatialPaths::from_table(
        "boundingBox/west",
        "boundingBox/east",
        "boundingBox/north",
        "boundingBox/south",
        0,
    )
});

/// Read-only registry of the built-in tables plus the session's additional
/// (operator) set.
#[derive(Debug, Clone)]
pub struct QueryableRegistry {
    additional: QueryableSet,
    default_srid: i32,
}

impl QueryableRegistry {
    pub fn new(additional: QueryableSet, default_srid: i32) -> Self {
        Self {
            additional,
            default_srid,
        }
    }

    /// The operator-configured override set.
    pub fn additional(&self) -> &QueryableSet {
        &self.additional
    }

    /// Schema-specific table for a family.
    ///
    /// Dublin-Core-classified records have no schema-specific table: their
    /// extraction happens entirely in the unconditional baseline pass.
    pub fn schema_set(&self, family: SchemaFamily) -> Option<&'static QueryableSet> {
        match family {
            SchemaFamily::Iso19115 => Some(&ISO19115_SET),
            SchemaFamily::EbrimV3 => Some(&EBRIM_V3_SET),
            SchemaFamily::EbrimV25 => Some(&EBRIM_V25_SET),
            SchemaFamily::FeatureCatalogue => Some(&FEATURE_CATALOGUE_SET),
            SchemaFamily::DublinCore | SchemaFamily::Unknown => None,
        }
    }

    /// Schema-declared spatial path group for a family, if it has one.
    pub fn schema_spatial(&self, family: SchemaFamily) -> Option<&'static SpatialPaths> {
        match family {
            SchemaFamily::Iso19115 => Some(&ISO19115_SPATIAL),
            _ => None,
        }
    }

    /// Dublin-Core baseline table (applied to every record).
    pub fn baseline_set(&self) -> &'static QueryableSet {
        &DUBLIN_CORE_SET
    }

    /// Baseline spatial path group at the session's default SRID.
    pub fn baseline_spatial(&self) -> SpatialPaths {
        let mut paths = DUBLIN_CORE_SPATIAL.clone();
        paths.srid = self.default_srid;
        paths
    }
}
