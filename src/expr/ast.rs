use crate::value::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Allow-listed functions callable from dynamic expressions. Anything else
/// is a parse-time error; there is no general evaluation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Len,
    Abs,
    Min,
    Max,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Function> {
        match name {
            "len" => Some(Function::Len),
            "abs" => Some(Function::Abs),
            "min" => Some(Function::Min),
            "max" => Some(Function::Max),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Len => "len",
            Function::Abs => "abs",
            Function::Min => "min",
            Function::Max => "max",
        }
    }
}

/// The parsed form of a dynamic expression.
///
/// `$key$` placeholders become [`Expression::Ref`] nodes (the captured text
/// slugified), so a later element's `count`, `optional` condition or option
/// list can depend on an earlier element's resolved value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Arithmetic
    Sum(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Call {
        function: Function,
        args: Vec<Expression>,
    },
    Literal(Value),
    Ref {
        key: String,
        field: Option<String>,
    },
}

impl Expression {
    /// Collects the data keys this expression references, forming the
    /// element's implicit dependency edges.
    pub fn referenced_keys(&self, keys: &mut BTreeSet<String>) {
        match self {
            Expression::Ref { key, .. } => {
                keys.insert(key.clone());
            }
            Expression::Sum(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r) => {
                l.referenced_keys(keys);
                r.referenced_keys(keys);
            }
            Expression::Not(v) => v.referenced_keys(keys),
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.referenced_keys(keys);
                }
            }
            Expression::Literal(_) => {}
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Sum(l, r) => write!(f, "({} + {})", l, r),
            Expression::Subtract(l, r) => write!(f, "({} - {})", l, r),
            Expression::Multiply(l, r) => write!(f, "({} * {})", l, r),
            Expression::Divide(l, r) => write!(f, "({} / {})", l, r),
            Expression::Not(v) => write!(f, "(not {})", v),
            Expression::And(l, r) => write!(f, "({} and {})", l, r),
            Expression::Or(l, r) => write!(f, "({} or {})", l, r),
            Expression::Equal(l, r) => write!(f, "({} == {})", l, r),
            Expression::NotEqual(l, r) => write!(f, "({} != {})", l, r),
            Expression::GreaterThan(l, r) => write!(f, "({} > {})", l, r),
            Expression::GreaterThanOrEqual(l, r) => write!(f, "({} >= {})", l, r),
            Expression::SmallerThan(l, r) => write!(f, "({} < {})", l, r),
            Expression::SmallerThanOrEqual(l, r) => write!(f, "({} <= {})", l, r),
            Expression::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::Ref { key, field: None } => write!(f, "${}$", key),
            Expression::Ref {
                key,
                field: Some(field),
            } => write!(f, "${}$.{}", key, field),
        }
    }
}
