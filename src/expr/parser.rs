use super::ast::{Expression, Function};
use crate::error::ExprError;
use crate::slug::slug;
use crate::value::Value;

/// Parses one dynamic expression into an [`Expression`] tree.
///
/// Grammar (precedence low to high): `or` > `and` > `not` > comparison >
/// additive > multiplicative > unary minus > primary. Primaries are number,
/// quoted text, `true`/`false`/`null`, `$key$` references with an optional
/// `.field` accessor, allow-listed function calls and parenthesised groups.
pub fn parse(text: &str) -> Result<Expression, ExprError> {
    let mut parser = Parser::new(text);
    let expr = parser.or_expr()?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(expr)
}

struct Parser<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: &str) -> ExprError {
        ExprError::Parse {
            text: self.text.to_string(),
            message: message.to_string(),
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consumes `symbol` if it is next (after whitespace).
    fn eat(&mut self, symbol: &str) -> bool {
        self.skip_ws();
        let sym: Vec<char> = symbol.chars().collect();
        if self.chars[self.pos..].starts_with(&sym) {
            self.pos += sym.len();
            true
        } else {
            false
        }
    }

    /// Consumes a word operator (`and`, `or`, `not`) guarding against
    /// identifier prefixes such as `order`.
    fn eat_word(&mut self, word: &str) -> bool {
        self.skip_ws();
        let w: Vec<char> = word.chars().collect();
        if self.chars[self.pos..].starts_with(&w) {
            let next = self.chars.get(self.pos + w.len());
            if !matches!(next, Some(c) if c.is_alphanumeric() || *c == '_') {
                self.pos += w.len();
                return true;
            }
        }
        false
    }

    fn or_expr(&mut self) -> Result<Expression, ExprError> {
        let mut left = self.and_expr()?;
        loop {
            if self.eat("||") || self.eat_word("or") {
                let right = self.and_expr()?;
                left = Expression::Or(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn and_expr(&mut self) -> Result<Expression, ExprError> {
        let mut left = self.not_expr()?;
        loop {
            if self.eat("&&") || self.eat_word("and") {
                let right = self.not_expr()?;
                left = Expression::And(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn not_expr(&mut self) -> Result<Expression, ExprError> {
        self.skip_ws();
        // `!=` belongs to comparison, a bare `!` is negation
        if self.eat_word("not") || (self.peek() == Some('!') && self.chars.get(self.pos + 1) != Some(&'=') && self.eat("!"))
        {
            let inner = self.not_expr()?;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expression, ExprError> {
        let left = self.additive()?;
        // Multi-character operators first so `>=` is not read as `>`.
        if self.eat("==") {
            let right = self.additive()?;
            return Ok(Expression::Equal(Box::new(left), Box::new(right)));
        }
        if self.eat("!=") {
            let right = self.additive()?;
            return Ok(Expression::NotEqual(Box::new(left), Box::new(right)));
        }
        if self.eat(">=") {
            let right = self.additive()?;
            return Ok(Expression::GreaterThanOrEqual(Box::new(left), Box::new(right)));
        }
        if self.eat("<=") {
            let right = self.additive()?;
            return Ok(Expression::SmallerThanOrEqual(Box::new(left), Box::new(right)));
        }
        if self.eat(">") {
            let right = self.additive()?;
            return Ok(Expression::GreaterThan(Box::new(left), Box::new(right)));
        }
        if self.eat("<") {
            let right = self.additive()?;
            return Ok(Expression::SmallerThan(Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expression, ExprError> {
        let mut left = self.multiplicative()?;
        loop {
            if self.eat("+") {
                let right = self.multiplicative()?;
                left = Expression::Sum(Box::new(left), Box::new(right));
            } else if self.eat("-") {
                let right = self.multiplicative()?;
                left = Expression::Subtract(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn multiplicative(&mut self) -> Result<Expression, ExprError> {
        let mut left = self.unary()?;
        loop {
            if self.eat("*") {
                let right = self.unary()?;
                left = Expression::Multiply(Box::new(left), Box::new(right));
            } else if self.eat("/") {
                let right = self.unary()?;
                left = Expression::Divide(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn unary(&mut self) -> Result<Expression, ExprError> {
        self.skip_ws();
        if self.eat("-") {
            let inner = self.unary()?;
            return Ok(Expression::Subtract(
                Box::new(Expression::Literal(Value::Number(0.0))),
                Box::new(inner),
            ));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression, ExprError> {
        self.skip_ws();
        match self.peek() {
            Some('(') => {
                self.bump();
                let inner = self.or_expr()?;
                if !self.eat(")") {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            Some('$') => self.reference(),
            Some('\'') | Some('"') => self.text_literal(),
            Some(c) if c.is_ascii_digit() || c == '.' => self.number_literal(),
            Some(c) if c.is_alphabetic() || c == '_' => self.word(),
            _ => Err(self.error("expected a value, reference or '('")),
        }
    }

    fn reference(&mut self) -> Result<Expression, ExprError> {
        self.bump(); // opening '$'
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '$' {
                let raw: String = self.chars[start..self.pos].iter().collect();
                self.bump(); // closing '$'
                let key = slug(&raw);
                if key.is_empty() {
                    return Err(self.error("empty reference"));
                }
                let field = self.field_accessor();
                return Ok(Expression::Ref { key, field });
            }
            self.bump();
        }
        Err(self.error("unterminated reference, expected closing '$'"))
    }

    fn field_accessor(&mut self) -> Option<String> {
        if self.peek() != Some('.') {
            return None;
        }
        self.bump();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        if self.pos == start {
            // a stray '.' is left for the caller to trip on
            self.pos -= 1;
            return None;
        }
        Some(self.chars[start..self.pos].iter().collect())
    }

    fn text_literal(&mut self) -> Result<Expression, ExprError> {
        let quote = self.bump().unwrap_or('\'');
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let text: String = self.chars[start..self.pos].iter().collect();
                self.bump();
                return Ok(Expression::Literal(Value::Text(text)));
            }
            self.bump();
        }
        Err(self.error("unterminated text literal"))
    }

    fn number_literal(&mut self) -> Result<Expression, ExprError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        raw.parse::<f64>()
            .map(|n| Expression::Literal(Value::Number(n)))
            .map_err(|_| self.error("invalid number literal"))
    }

    fn word(&mut self) -> Result<Expression, ExprError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "true" | "True" => return Ok(Expression::Literal(Value::Bool(true))),
            "false" | "False" => return Ok(Expression::Literal(Value::Bool(false))),
            "null" | "None" => return Ok(Expression::Literal(Value::Null)),
            _ => {}
        }
        self.skip_ws();
        if self.peek() != Some('(') {
            self.pos = start;
            return Err(self.error("bare identifiers are not allowed, use $key$ references"));
        }
        let function =
            Function::from_name(&word).ok_or_else(|| ExprError::UnknownFunction(word.clone()))?;
        self.bump(); // '('
        let mut args = Vec::new();
        self.skip_ws();
        if self.eat(")") {
            return Ok(Expression::Call { function, args });
        }
        loop {
            args.push(self.or_expr()?);
            if self.eat(",") {
                continue;
            }
            if self.eat(")") {
                return Ok(Expression::Call { function, args });
            }
            return Err(self.error("expected ',' or ')' in argument list"));
        }
    }
}

/// Scans raw text for `$...$` placeholders and returns the de-duplicated,
/// in-order slugified keys. This is the dependency-extraction half of the
/// expression contract and works on any string, parseable or not.
pub fn scan_refs(text: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('$') {
        let after = &rest[open + 1..];
        match after.find('$') {
            Some(close) => {
                let key = slug(&after[..close]);
                if !key.is_empty() && !keys.contains(&key) {
                    keys.push(key);
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    keys
}

/// `None` passes through unchanged; `Some(text)` is parsed. This mirrors the
/// no-op contract of the substitution helper the grammar replaces.
pub fn parse_opt(text: Option<&str>) -> Result<Option<Expression>, ExprError> {
    text.map(parse).transpose()
}
