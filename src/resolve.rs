//! Value resolution over opaque records.
//!
//! The engine never inspects a record directly: a backend supplies raw
//! multi-value lookup for a plain path ([`ValueResolver::raw_values`]) and
//! the trait's provided methods evaluate the path mini-language on top of it
//! (ordinal selection, conditional guards, alternatives). Parsing of the
//! mini-language happens once at load time in [`crate::path`]; only
//! evaluation happens here.
//!
//! A JSON-backed default backend ([`JsonRecord`] / [`JsonResolver`]) is
//! provided: records are `serde_json` trees with `$`-prefixed marker keys
//! (`$type`, `$version`, `$date`, `$codeList`/`$codeListValue`).

use crate::document::{IndexDocument, NULL_TOKEN};
use crate::error::Result;
use crate::path::{PathExpr, QueryablePath};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Identity of a record: a string identifier plus a backend-specific tree.
pub trait CatalogRecord {
    /// Stable record identifier.
    fn id(&self) -> &str;
}

/// Scalar value produced by path resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Arbitrary-precision integer. Outside the supported numeric-kind set;
    /// stored as its string form under the string-fallback kind.
    BigInt(Box<BigInt>),
    /// Arbitrary-precision decimal. Same fallback handling as `BigInt`.
    Decimal(Box<BigDecimal>),
    Boolean(bool),
}

impl ScalarValue {
    /// String rendering used for joining, free text, and guards.
    pub fn as_text(&self) -> String {
        match self {
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Int(n) => n.to_string(),
            ScalarValue::Long(n) => n.to_string(),
            ScalarValue::Float(n) => n.to_string(),
            ScalarValue::Double(n) => n.to_string(),
            ScalarValue::BigInt(n) => n.to_string(),
            ScalarValue::Decimal(n) => n.to_string(),
            ScalarValue::Boolean(b) => b.to_string(),
        }
    }

    /// Runtime type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Text(_) => "text",
            ScalarValue::Int(_) => "int",
            ScalarValue::Long(_) => "long",
            ScalarValue::Float(_) => "float",
            ScalarValue::Double(_) => "double",
            ScalarValue::BigInt(_) => "bigint",
            ScalarValue::Decimal(_) => "decimal",
            ScalarValue::Boolean(_) => "boolean",
        }
    }
}

/// Backend contract for resolving values out of a record.
///
/// Implementors supply [`raw_values`](ValueResolver::raw_values); the
/// mini-language evaluation is shared across backends via the provided
/// methods.
pub trait ValueResolver<R: CatalogRecord> {
    /// All scalar values matching a plain backend path, in document order.
    ///
    /// A missing path yields an empty list; only I/O or structural failures
    /// are errors (scoped to the record being processed).
    fn raw_values(&self, record: &R, path: &str) -> Result<Vec<ScalarValue>>;

    /// Backend hook for stamping extra identity fields onto the document.
    ///
    /// The builder always stamps the record's own identifier; backends with
    /// additional identity material (internal keys, source handles) add it
    /// here.
    fn stamp_identity(&self, _record: &R, _doc: &mut IndexDocument) {}

    /// Evaluate a full queryable path: each expression in order, matches
    /// concatenated.
    fn resolve(&self, record: &R, path: &QueryablePath) -> Result<Vec<ScalarValue>> {
        let mut out = Vec::new();
        for expr in path.exprs() {
            match expr {
                PathExpr::Simple(p) => out.extend(self.raw_values(record, p)?),
                PathExpr::Ordinal { path, index } => {
                    // 1-based in the table, adjusted here.
                    let mut values = self.raw_values(record, path)?;
                    if *index <= values.len() {
                        out.push(values.swap_remove(index - 1));
                    }
                }
                PathExpr::Conditional {
                    path,
                    discriminator,
                    literal,
                } => {
                    let guard = self.raw_values(record, discriminator)?;
                    if guard.iter().any(|v| v.as_text() == *literal) {
                        out.extend(self.raw_values(record, path)?);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Join all resolved string representations with `,`; the `"null"`
    /// sentinel when nothing resolves.
    fn resolve_joined(&self, record: &R, path: &QueryablePath) -> Result<String> {
        let values = self.resolve(record, path)?;
        if values.is_empty() {
            return Ok(NULL_TOKEN.to_string());
        }
        Ok(values
            .iter()
            .map(ScalarValue::as_text)
            .collect::<Vec<_>>()
            .join(","))
    }
}

/// One controlled vocabulary: code → human-readable label.
#[derive(Debug, Clone, Default)]
pub struct CodeList {
    /// Free-text lists pass codes through untranslated.
    pub free_text: bool,
    labels: FxHashMap<String, String>,
}

impl CodeList {
    pub fn free_text() -> Self {
        Self {
            free_text: true,
            labels: FxHashMap::default(),
        }
    }

    pub fn with_labels<I, K, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            free_text: false,
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Named code lists available to a resolver.
#[derive(Debug, Clone, Default)]
pub struct CodeListCatalog {
    lists: FxHashMap<String, CodeList>,
}

impl CodeListCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the ISO lists the built-in queryable tables
    /// reference.
    pub fn with_iso_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            "MD_ScopeCode",
            CodeList::with_labels([
                ("dataset", "Dataset"),
                ("series", "Series"),
                ("service", "Service"),
                ("feature", "Feature"),
                ("featureType", "Feature type"),
                ("nonGeographicDataset", "Non-geographic dataset"),
            ]),
        );
        catalog.insert(
            "CI_DateTypeCode",
            CodeList::with_labels([
                ("creation", "Creation"),
                ("publication", "Publication"),
                ("revision", "Revision"),
            ]),
        );
        catalog
    }

    pub fn insert(&mut self, name: impl Into<String>, list: CodeList) {
        self.lists.insert(name.into(), list);
    }

    /// Label for `code` in `list`.
    ///
    /// Free-text lists return the code untranslated; an unknown list or an
    /// unmatched code yields `None` (callers warn, resolution continues).
    pub fn translate(&self, list: &str, code: &str) -> Option<String> {
        let list = self.lists.get(list)?;
        if list.free_text {
            return Some(code.to_string());
        }
        list.labels.get(code).cloned()
    }
}

/// Normalize a date-typed scalar: punctuation stripped, truncated to day
/// precision (`YYYYMMDD`).
///
/// Parseable dates and datetimes go through chrono; anything else falls back
/// to stripping `-`/`:` and truncating to the first eight digits.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return dt.format("%Y%m%d").to_string();
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y%m%d").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%Y%m%d").to_string();
    }
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(8)
        .collect();
    if digits.is_empty() {
        raw.to_string()
    } else {
        digits
    }
}

/// Record of the JSON backend: identifier plus a `serde_json` tree.
#[derive(Debug, Clone)]
pub struct JsonRecord {
    id: String,
    tree: Value,
}

impl JsonRecord {
    pub fn new(id: impl Into<String>, tree: Value) -> Self {
        Self {
            id: id.into(),
            tree,
        }
    }

    /// Root element name (`$type` marker), if present.
    pub fn root_type(&self) -> Option<&str> {
        self.tree.get("$type").and_then(Value::as_str)
    }

    /// Schema generation marker (`$version`), if present.
    pub fn schema_version(&self) -> Option<&str> {
        self.tree.get("$version").and_then(Value::as_str)
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }
}

impl CatalogRecord for JsonRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Path resolver over [`JsonRecord`] trees.
///
/// Paths are `/`-separated keys; arrays fan out at every step. Terminal
/// nodes map to scalars, with `$codeList`/`$codeListValue` objects going
/// through the code-list catalog and `$date` objects through
/// [`normalize_date`].
#[derive(Debug, Clone)]
pub struct JsonResolver {
    code_lists: CodeListCatalog,
}

impl Default for JsonResolver {
    fn default() -> Self {
        Self {
            code_lists: CodeListCatalog::with_iso_defaults(),
        }
    }
}

impl JsonResolver {
    pub fn new(code_lists: CodeListCatalog) -> Self {
        Self { code_lists }
    }

    fn collect<'a>(&self, node: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
        if let Value::Array(items) = node {
            for item in items {
                self.collect(item, segments, out);
            }
            return;
        }
        match segments.split_first() {
            None => out.push(node),
            Some((head, rest)) => {
                if let Some(child) = node.get(head) {
                    self.collect(child, rest, out);
                }
            }
        }
    }

    fn to_scalar(&self, record_id: &str, node: &Value) -> Option<ScalarValue> {
        match node {
            Value::String(s) => Some(ScalarValue::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if let Ok(small) = i32::try_from(i) {
                        Some(ScalarValue::Int(small))
                    } else {
                        Some(ScalarValue::Long(i))
                    }
                } else {
                    n.as_f64().map(ScalarValue::Double)
                }
            }
            Value::Bool(b) => Some(ScalarValue::Boolean(*b)),
            Value::Object(map) => {
                if let (Some(list), Some(code)) = (
                    map.get("$codeList").and_then(Value::as_str),
                    map.get("$codeListValue").and_then(Value::as_str),
                ) {
                    match self.code_lists.translate(list, code) {
                        Some(label) => return Some(ScalarValue::Text(label)),
                        None => {
                            tracing::warn!(
                                record_id = %record_id,
                                code_list = %list,
                                code = %code,
                                "code has no label in vocabulary, dropping value"
                            );
                            return None;
                        }
                    }
                }
                if let Some(date) = map.get("$date").and_then(Value::as_str) {
                    return Some(ScalarValue::Text(normalize_date(date)));
                }
                tracing::warn!(
                    record_id = %record_id,
                    "terminal object carries no scalar marker, dropping value"
                );
                None
            }
            Value::Null => None,
            // Arrays are fanned out during navigation; a nested array here
            // means the path stopped one level short.
            Value::Array(_) => None,
        }
    }
}

impl ValueResolver<JsonRecord> for JsonResolver {
    fn raw_values(&self, record: &JsonRecord, path: &str) -> Result<Vec<ScalarValue>> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut nodes = Vec::new();
        self.collect(record.tree(), &segments, &mut nodes);
        Ok(nodes
            .into_iter()
            .filter_map(|n| self.to_scalar(record.id(), n))
            .collect())
    }
}
