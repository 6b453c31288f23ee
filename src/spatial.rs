//! Spatial extent extraction.
//!
//! Resolves the four boundary path groups of a schema to token strings,
//! tokenizes them into numeric sequences, and pairs same-index elements into
//! bounding boxes. Pure apart from logging: a cardinality mismatch between
//! the four sequences emits nothing and records a warning.

use crate::document::{BoundingBox, NULL_TOKEN};
use crate::error::Result;
use crate::queryable::SpatialPaths;
use crate::resolve::{CatalogRecord, ValueResolver};

/// Extracts bounding boxes through a backend resolver.
#[derive(Debug, Default, Clone)]
pub struct SpatialExtractor;

impl SpatialExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Attempt bbox extraction for one path group.
    ///
    /// Emits one box per coordinate position when all four boundary
    /// sequences have the same non-zero length, tagged with the group's
    /// SRID. Mismatched lengths emit nothing and log a missing-coordinates
    /// warning naming the record.
    pub fn extract<R, V>(
        &self,
        resolver: &V,
        record: &R,
        paths: &SpatialPaths,
    ) -> Result<Vec<BoundingBox>>
    where
        R: CatalogRecord,
        V: ValueResolver<R> + ?Sized,
    {
        let west = self.coordinates(resolver, record, paths, Bound::West)?;
        let east = self.coordinates(resolver, record, paths, Bound::East)?;
        let north = self.coordinates(resolver, record, paths, Bound::North)?;
        let south = self.coordinates(resolver, record, paths, Bound::South)?;

        let n = west.len();
        if n == 0 || east.len() != n || north.len() != n || south.len() != n {
            if n > 0 || !east.is_empty() || !north.is_empty() || !south.is_empty() {
                tracing::warn!(
                    record_id = %record.id(),
                    west = west.len(),
                    east = east.len(),
                    north = north.len(),
                    south = south.len(),
                    "missing coordinates, skipping spatial extraction"
                );
            }
            return Ok(Vec::new());
        }

        Ok((0..n)
            .map(|i| BoundingBox {
                min_x: west[i],
                max_x: east[i],
                min_y: south[i],
                max_y: north[i],
                srid: paths.srid,
            })
            .collect())
    }

    fn coordinates<R, V>(
        &self,
        resolver: &V,
        record: &R,
        paths: &SpatialPaths,
        bound: Bound,
    ) -> Result<Vec<f64>>
    where
        R: CatalogRecord,
        V: ValueResolver<R> + ?Sized,
    {
        let path = match bound {
            Bound::West => &paths.west,
            Bound::East => &paths.east,
            Bound::North => &paths.north,
            Bound::South => &paths.south,
        };
        let joined = resolver.resolve_joined(record, path)?;
        // An entirely unresolved group is silent; only individual bad tokens
        // inside a resolved group warrant a warning.
        if joined == NULL_TOKEN {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for token in joined.split([',', ';']) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            match token.parse::<f64>() {
                Ok(v) => out.push(v),
                Err(_) => {
                    tracing::warn!(
                        record_id = %record.id(),
                        bound = %bound.name(),
                        token = %token,
                        "dropping non-numeric coordinate token"
                    );
                }
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    West,
    East,
    North,
    South,
}

impl Bound {
    fn name(self) -> &'static str {
        match self {
            Bound::West => "west",
            Bound::East => "east",
            Bound::North => "north",
            Bound::South => "south",
        }
    }
}
