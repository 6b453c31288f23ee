//! Queryable path mini-language.
//!
//! A queryable path is an ordered list of path expressions. Each expression
//! is one of:
//!
//! - **Simple**: `identification/citation/title` — backend-interpreted path.
//! - **Ordinal**: `identification/keyword[2]` — selects only the n-th
//!   (1-based) occurrence among repeated matches.
//! - **Conditional**: `citation/date#citation/dateType=revision` — the main
//!   path is resolved only when the discriminator path resolves to the
//!   literal.
//!
//! Alternatives are separated with `|` in the textual form and evaluated in
//! order, concatenating their matches.
//!
//! Parsing is separate from evaluation: path tables are parsed and validated
//! once at load time (see [`crate::config::IndexerConfig::additional_set`]
//! and the built-in tables in [`crate::queryable`]); evaluation happens in
//! [`crate::resolve::ValueResolver::resolve`].

use crate::error::{IndexError, Result};
use std::fmt;

/// One parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathExpr {
    /// Plain backend path.
    Simple(String),
    /// Select the n-th occurrence (1-based) among repeated matches.
    Ordinal { path: String, index: usize },
    /// Resolve `path` only when `discriminator` resolves to `literal`.
    Conditional {
        path: String,
        discriminator: String,
        literal: String,
    },
}

impl PathExpr {
    /// Parse a single textual expression.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(invalid(raw, "empty path expression"));
        }
        if let Some((main, guard)) = raw.split_once('#') {
            let (disc, literal) = guard
                .split_once('=')
                .ok_or_else(|| invalid(raw, "conditional guard is missing `=literal`"))?;
            if main.trim().is_empty() || disc.trim().is_empty() {
                return Err(invalid(raw, "conditional parts must be non-empty"));
            }
            return Ok(PathExpr::Conditional {
                path: main.trim().to_string(),
                discriminator: disc.trim().to_string(),
                literal: literal.trim().to_string(),
            });
        }
        if let Some(open) = raw.rfind('[') {
            if raw.ends_with(']') {
                let digits = &raw[open + 1..raw.len() - 1];
                let index: usize = digits
                    .parse()
                    .map_err(|_| invalid(raw, "ordinal must be a positive integer"))?;
                if index == 0 {
                    return Err(invalid(raw, "ordinals are 1-based"));
                }
                let path = raw[..open].trim();
                if path.is_empty() {
                    return Err(invalid(raw, "ordinal has no path"));
                }
                return Ok(PathExpr::Ordinal {
                    path: path.to_string(),
                    index,
                });
            }
        }
        Ok(PathExpr::Simple(raw.to_string()))
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathExpr::Simple(p) => write!(f, "{p}"),
            PathExpr::Ordinal { path, index } => write!(f, "{path}[{index}]"),
            PathExpr::Conditional {
                path,
                discriminator,
                literal,
            } => write!(f, "{path}#{discriminator}={literal}"),
        }
    }
}

/// Ordered list of path expressions for one logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryablePath {
    exprs: Vec<PathExpr>,
}

impl QueryablePath {
    /// Parse a `|`-separated list of expressions.
    pub fn parse(raw: &str) -> Result<Self> {
        let exprs = raw
            .split('|')
            .map(PathExpr::parse)
            .collect::<Result<Vec<_>>>()?;
        if exprs.is_empty() {
            return Err(invalid(raw, "no expressions"));
        }
        Ok(Self { exprs })
    }

    /// Expressions in evaluation order.
    pub fn exprs(&self) -> &[PathExpr] {
        &self.exprs
    }
}

impl fmt::Display for QueryablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.exprs {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{e}")?;
            first = false;
        }
        Ok(())
    }
}

fn invalid(path: &str, reason: &str) -> IndexError {
    IndexError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
