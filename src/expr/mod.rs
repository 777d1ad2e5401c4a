//! The dynamic-expression grammar.
//!
//! Element arguments such as `count`, `optional` and option lists may be
//! given as expressions over previously resolved element values, written
//! with `$key$` placeholders (`"len($b$)"`, `"$a$ > 1"`,
//! `"$orders table$.columns"`). Expressions are parsed into a small AST and
//! interpreted by a dedicated engine against the project data map; there is
//! no host-language evaluation involved.

mod ast;
mod eval;
mod parser;

pub use ast::{Expression, Function};
pub use eval::ExprEngine;
pub use parser::{parse, parse_opt, scan_refs};

use crate::error::ExprError;
use crate::value::Value;
use ahash::AHashMap;
use std::collections::BTreeSet;

/// A repeat count: a fixed number or an expression resolved at dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Count {
    Fixed(u64),
    Dynamic { source: String, expr: Expression },
}

impl Count {
    pub fn parse(text: &str) -> Result<Count, ExprError> {
        Ok(Count::Dynamic {
            source: text.to_string(),
            expr: parse(text)?,
        })
    }

    pub fn resolve(&self, data: Option<&AHashMap<String, Value>>) -> Result<u64, ExprError> {
        match self {
            Count::Fixed(n) => Ok(*n),
            Count::Dynamic { expr, .. } => match ExprEngine::new(data).eval(expr)? {
                Value::Number(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as u64),
                other => Err(ExprError::InvalidCount(other)),
            },
        }
    }

    pub fn referenced_keys(&self, keys: &mut BTreeSet<String>) {
        if let Count::Dynamic { expr, .. } = self {
            expr.referenced_keys(keys);
        }
    }

    /// Descriptor form: the fixed number, or the expression source text.
    pub fn as_json(&self) -> serde_json::Value {
        match self {
            Count::Fixed(n) => serde_json::json!(n),
            Count::Dynamic { source, .. } => serde_json::json!(source),
        }
    }
}

impl From<u64> for Count {
    fn from(n: u64) -> Self {
        Count::Fixed(n)
    }
}

/// A boolean condition: fixed, or an expression resolved at dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Fixed(bool),
    Dynamic { source: String, expr: Expression },
}

impl Condition {
    pub fn parse(text: &str) -> Result<Condition, ExprError> {
        Ok(Condition::Dynamic {
            source: text.to_string(),
            expr: parse(text)?,
        })
    }

    pub fn is_fixed_false(&self) -> bool {
        matches!(self, Condition::Fixed(false))
    }

    pub fn resolve(&self, data: Option<&AHashMap<String, Value>>) -> Result<bool, ExprError> {
        match self {
            Condition::Fixed(b) => Ok(*b),
            Condition::Dynamic { expr, .. } => match ExprEngine::new(data).eval(expr)? {
                Value::Bool(b) => Ok(b),
                other => Err(ExprError::InvalidCondition(other)),
            },
        }
    }

    pub fn referenced_keys(&self, keys: &mut BTreeSet<String>) {
        if let Condition::Dynamic { expr, .. } = self {
            expr.referenced_keys(keys);
        }
    }

    pub fn as_json(&self) -> serde_json::Value {
        match self {
            Condition::Fixed(b) => serde_json::json!(b),
            Condition::Dynamic { source, .. } => serde_json::json!(source),
        }
    }
}

impl From<bool> for Condition {
    fn from(b: bool) -> Self {
        Condition::Fixed(b)
    }
}

/// An option list for choice elements: fixed values, or an expression
/// yielding a list (e.g. `"$csv$.columns"`).
#[derive(Debug, Clone, PartialEq)]
pub enum Options {
    Fixed(Vec<Value>),
    Dynamic { source: String, expr: Expression },
}

impl Options {
    pub fn parse(text: &str) -> Result<Options, ExprError> {
        Ok(Options::Dynamic {
            source: text.to_string(),
            expr: parse(text)?,
        })
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Options::Dynamic { .. })
    }

    pub fn resolve(&self, data: Option<&AHashMap<String, Value>>) -> Result<Vec<Value>, ExprError> {
        match self {
            Options::Fixed(values) => Ok(values.clone()),
            Options::Dynamic { expr, .. } => match ExprEngine::new(data).eval(expr)? {
                Value::List(values) => Ok(values),
                other => Err(ExprError::InvalidOptions(other)),
            },
        }
    }

    pub fn referenced_keys(&self, keys: &mut BTreeSet<String>) {
        if let Options::Dynamic { expr, .. } = self {
            expr.referenced_keys(keys);
        }
    }

    pub fn as_json(&self) -> serde_json::Value {
        match self {
            Options::Fixed(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_json).collect())
            }
            Options::Dynamic { source, .. } => serde_json::json!(source),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Options {
    fn from(values: Vec<T>) -> Self {
        Options::Fixed(values.into_iter().map(Into::into).collect())
    }
}
