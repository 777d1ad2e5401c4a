use super::ast::{Expression, Function};
use crate::error::ExprError;
use crate::value::Value;
use ahash::AHashMap;

/// The recursive engine evaluating a parsed expression against the shared
/// data map. References resolve to previously recorded element values, so
/// an expression may only mention keys of elements evaluated before it.
pub struct ExprEngine<'a> {
    data: Option<&'a AHashMap<String, Value>>,
}

impl<'a> ExprEngine<'a> {
    pub fn new(data: Option<&'a AHashMap<String, Value>>) -> Self {
        Self { data }
    }

    pub fn eval(&self, expr: &Expression) -> Result<Value, ExprError> {
        match expr {
            // --- Arithmetic ---
            Expression::Sum(l, r) => self.eval_arithmetic(l, r, "+", |a, b| a + b),
            Expression::Subtract(l, r) => self.eval_arithmetic(l, r, "-", |a, b| a - b),
            Expression::Multiply(l, r) => self.eval_arithmetic(l, r, "*", |a, b| a * b),
            Expression::Divide(l, r) => self.eval_arithmetic(l, r, "/", |a, b| a / b),

            // --- Comparison ---
            Expression::GreaterThan(l, r) => self.eval_comparison(l, r, ">", |a, b| a > b),
            Expression::GreaterThanOrEqual(l, r) => self.eval_comparison(l, r, ">=", |a, b| a >= b),
            Expression::SmallerThan(l, r) => self.eval_comparison(l, r, "<", |a, b| a < b),
            Expression::SmallerThanOrEqual(l, r) => self.eval_comparison(l, r, "<=", |a, b| a <= b),

            // --- Equality (any value type) ---
            Expression::Equal(l, r) => Ok(Value::Bool(self.eval(l)? == self.eval(r)?)),
            Expression::NotEqual(l, r) => Ok(Value::Bool(self.eval(l)? != self.eval(r)?)),

            // --- Logical, short-circuiting ---
            Expression::And(l, r) => {
                if !self.eval_bool(l, "AND")? {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.eval_bool(r, "AND")?))
            }
            Expression::Or(l, r) => {
                if self.eval_bool(l, "OR")? {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.eval_bool(r, "OR")?))
            }
            Expression::Not(v) => Ok(Value::Bool(!self.eval_bool(v, "NOT")?)),

            // --- Leaves ---
            Expression::Literal(v) => Ok(v.clone()),
            Expression::Ref { key, field } => self.resolve_ref(key, field.as_deref()),
            Expression::Call { function, args } => self.call(*function, args),
        }
    }

    fn resolve_ref(&self, key: &str, field: Option<&str>) -> Result<Value, ExprError> {
        let value = self
            .data
            .and_then(|d| d.get(key))
            .ok_or_else(|| ExprError::KeyNotFound(key.to_string()))?;
        match field {
            None => Ok(value.clone()),
            Some(field) => match value {
                Value::Object(map) => map.get(field).cloned().ok_or_else(|| {
                    ExprError::FieldNotFound {
                        key: key.to_string(),
                        field: field.to_string(),
                    }
                }),
                other => Err(ExprError::TypeMismatch {
                    operation: format!(".{}", field),
                    expected: "object".to_string(),
                    found: other.clone(),
                }),
            },
        }
    }

    fn call(&self, function: Function, args: &[Expression]) -> Result<Value, ExprError> {
        match function {
            Function::Len => {
                let arg = self.single_arg(function, args)?;
                match arg {
                    Value::List(items) => Ok(Value::Number(items.len() as f64)),
                    Value::Text(s) => Ok(Value::Number(s.chars().count() as f64)),
                    Value::Object(map) => Ok(Value::Number(map.len() as f64)),
                    other => Err(ExprError::TypeMismatch {
                        operation: "len".to_string(),
                        expected: "list, text or object".to_string(),
                        found: other,
                    }),
                }
            }
            Function::Abs => {
                let arg = self.single_arg(function, args)?;
                match arg {
                    Value::Number(n) => Ok(Value::Number(n.abs())),
                    other => Err(ExprError::TypeMismatch {
                        operation: "abs".to_string(),
                        expected: "number".to_string(),
                        found: other,
                    }),
                }
            }
            Function::Min => self.fold_numbers(function, args, f64::min),
            Function::Max => self.fold_numbers(function, args, f64::max),
        }
    }

    fn single_arg(&self, function: Function, args: &[Expression]) -> Result<Value, ExprError> {
        if args.len() != 1 {
            return Err(ExprError::TypeMismatch {
                operation: function.name().to_string(),
                expected: "exactly one argument".to_string(),
                found: Value::Number(args.len() as f64),
            });
        }
        self.eval(&args[0])
    }

    /// `min`/`max` accept either a single list argument or numeric varargs.
    fn fold_numbers(
        &self,
        function: Function,
        args: &[Expression],
        f: fn(f64, f64) -> f64,
    ) -> Result<Value, ExprError> {
        let mut numbers = Vec::new();
        for arg in args {
            match self.eval(arg)? {
                Value::Number(n) => numbers.push(n),
                Value::List(items) if args.len() == 1 => {
                    for item in items {
                        match item {
                            Value::Number(n) => numbers.push(n),
                            other => {
                                return Err(ExprError::TypeMismatch {
                                    operation: function.name().to_string(),
                                    expected: "number".to_string(),
                                    found: other,
                                });
                            }
                        }
                    }
                }
                other => {
                    return Err(ExprError::TypeMismatch {
                        operation: function.name().to_string(),
                        expected: "number".to_string(),
                        found: other,
                    });
                }
            }
        }
        let mut iter = numbers.into_iter();
        let first = iter.next().ok_or_else(|| ExprError::TypeMismatch {
            operation: function.name().to_string(),
            expected: "at least one number".to_string(),
            found: Value::Null,
        })?;
        Ok(Value::Number(iter.fold(first, f)))
    }

    fn eval_arithmetic(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        f: fn(f64, f64) -> f64,
    ) -> Result<Value, ExprError> {
        match (self.eval(l)?, self.eval(r)?) {
            (Value::Number(lv), Value::Number(rv)) => Ok(Value::Number(f(lv, rv))),
            (Value::Number(_), r_val) => Err(self.type_mismatch(op, "number", r_val)),
            (l_val, _) => Err(self.type_mismatch(op, "number", l_val)),
        }
    }

    fn eval_comparison(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        f: fn(f64, f64) -> bool,
    ) -> Result<Value, ExprError> {
        match (self.eval(l)?, self.eval(r)?) {
            (Value::Number(lv), Value::Number(rv)) => Ok(Value::Bool(f(lv, rv))),
            (Value::Number(_), r_val) => Err(self.type_mismatch(op, "number", r_val)),
            (l_val, _) => Err(self.type_mismatch(op, "number", l_val)),
        }
    }

    fn eval_bool(&self, expr: &Expression, op: &str) -> Result<bool, ExprError> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.type_mismatch(op, "bool", other)),
        }
    }

    fn type_mismatch(&self, op: &str, expected: &str, found: Value) -> ExprError {
        ExprError::TypeMismatch {
            operation: op.to_string(),
            expected: expected.to_string(),
            found,
        }
    }
}
