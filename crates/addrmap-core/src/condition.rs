//! Validity-condition evaluation for optional address windows.
//!
//! [`ParameterConditionEvaluator`] understands the small comparison
//! language found in core definitions:
//!
//! ```text
//! C_INCLUDE_BAR == 1 AND (C_FAMILY = virtex5 OR C_FAMILY != spartan3)
//! ```
//!
//! Names that match one of the core's parameters are replaced by that
//! parameter's value. Operands that both read as address literals compare
//! numerically; anything else compares as case-insensitive text.

use std::cmp::Ordering;

use thiserror::Error;

use crate::design::Core;
use crate::numeric::parse_literal;

/// Failure to evaluate a validity condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot evaluate condition '{expression}': {message}")]
pub struct ConditionError {
    /// Expression as written.
    pub expression: String,
    /// What went wrong.
    pub message: String,
}

/// Decides whether an address window's condition holds for a core.
pub trait ConditionEvaluator {
    /// Evaluates `expression` against `core`'s current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError`] when the expression is malformed or
    /// cannot be decided.
    fn evaluate(&self, core: &Core, expression: &str) -> Result<bool, ConditionError>;
}

/// Evaluator that treats every condition as satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysValid;

impl ConditionEvaluator for AlwaysValid {
    fn evaluate(&self, _core: &Core, _expression: &str) -> Result<bool, ConditionError> {
        Ok(true)
    }
}

/// Evaluator for parameter comparisons joined by `AND`/`OR`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterConditionEvaluator;

impl ConditionEvaluator for ParameterConditionEvaluator {
    fn evaluate(&self, core: &Core, expression: &str) -> Result<bool, ConditionError> {
        let tokens = tokenize(expression).map_err(|message| ConditionError {
            expression: expression.to_string(),
            message,
        })?;
        let mut parser = Parser {
            core,
            tokens: &tokens,
            position: 0,
            depth: 0,
        };
        let value = parser.or_expr().and_then(|value| {
            if parser.position == tokens.len() {
                Ok(value)
            } else {
                Err(format!("unexpected token '{}'", tokens[parser.position]))
            }
        });
        value.map_err(|message| ConditionError {
            expression: expression.to_string(),
            message,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Compare(CompareOp),
    And,
    Or,
    Not,
    Open,
    Close,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Word(word) => write!(f, "{word}"),
            Self::Quoted(text) => write!(f, "\"{text}\""),
            Self::Compare(op) => write!(f, "{}", op.symbol()),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Not => write!(f, "NOT"),
            Self::Open => write!(f, "("),
            Self::Close => write!(f, ")"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    const fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ordering, Ordering::Equal),
            Self::Ne => !matches!(ordering, Ordering::Equal),
            Self::Lt => matches!(ordering, Ordering::Less),
            Self::Le => !matches!(ordering, Ordering::Greater),
            Self::Gt => matches!(ordering, Ordering::Greater),
            Self::Ge => !matches!(ordering, Ordering::Less),
        }
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        let two_char = |chars: &mut std::iter::Peekable<std::str::Chars<'_>>, next: char| {
            chars.next();
            chars.next_if_eq(&next).is_some()
        };
        let token = match ch {
            '(' => {
                chars.next();
                Token::Open
            }
            ')' => {
                chars.next();
                Token::Close
            }
            '=' => {
                two_char(&mut chars, '=');
                Token::Compare(CompareOp::Eq)
            }
            '!' => {
                if two_char(&mut chars, '=') {
                    Token::Compare(CompareOp::Ne)
                } else {
                    Token::Not
                }
            }
            '<' => {
                if two_char(&mut chars, '=') {
                    Token::Compare(CompareOp::Le)
                } else {
                    Token::Compare(CompareOp::Lt)
                }
            }
            '>' => {
                if two_char(&mut chars, '=') {
                    Token::Compare(CompareOp::Ge)
                } else {
                    Token::Compare(CompareOp::Gt)
                }
            }
            '&' => {
                if !two_char(&mut chars, '&') {
                    return Err("expected '&&'".to_string());
                }
                Token::And
            }
            '|' => {
                if !two_char(&mut chars, '|') {
                    return Err("expected '||'".to_string());
                }
                Token::Or
            }
            '"' | '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == ch => break,
                        Some(c) => text.push(c),
                        None => return Err("unterminated string".to_string()),
                    }
                }
                Token::Quoted(text)
            }
            c if c.is_ascii_alphanumeric() || c == '_' || c == '.' => {
                let mut word = String::new();
                while let Some(c) =
                    chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.')
                {
                    word.push(c);
                }
                match word.to_ascii_uppercase().as_str() {
                    "AND" => Token::And,
                    "OR" => Token::Or,
                    "NOT" => Token::Not,
                    _ => Token::Word(word),
                }
            }
            other => return Err(format!("unexpected character '{other}'")),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Deepest `NOT`/parenthesis nesting accepted before evaluation gives up.
const MAX_NESTING: usize = 64;

struct Parser<'a> {
    core: &'a Core,
    tokens: &'a [Token],
    position: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<bool, String>,
    ) -> Result<bool, String> {
        if self.depth >= MAX_NESTING {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn or_expr(&mut self) -> Result<bool, String> {
        let mut value = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.position += 1;
            let rhs = self.and_expr()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and_expr(&mut self) -> Result<bool, String> {
        let mut value = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.position += 1;
            let rhs = self.unary()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<bool, String> {
        match self.peek() {
            Some(Token::Not) => {
                self.position += 1;
                Ok(!self.nested(Self::unary)?)
            }
            Some(Token::Open) => {
                self.position += 1;
                let value = self.nested(Self::or_expr)?;
                match self.advance() {
                    Some(Token::Close) => Ok(value),
                    _ => Err("missing ')'".to_string()),
                }
            }
            _ => self.comparison(),
        }
    }

    fn comparison(&mut self) -> Result<bool, String> {
        let lhs = self.operand()?;
        let Some(Token::Compare(op)) = self.peek().cloned() else {
            return Ok(truthy(&lhs));
        };
        self.position += 1;
        let rhs = self.operand()?;

        match (parse_literal(&lhs), parse_literal(&rhs)) {
            (Ok(l), Ok(r)) => Ok(op.holds(l.cmp(&r))),
            _ if matches!(op, CompareOp::Eq | CompareOp::Ne) => {
                let ordering = if lhs.eq_ignore_ascii_case(&rhs) {
                    Ordering::Equal
                } else {
                    Ordering::Less
                };
                Ok(op.holds(ordering))
            }
            _ => Err(format!(
                "'{}' needs numeric operands, got '{lhs}' and '{rhs}'",
                op.symbol()
            )),
        }
    }

    fn operand(&mut self) -> Result<String, String> {
        let core = self.core;
        match self.advance() {
            Some(Token::Word(word)) => Ok(core
                .parameter(word)
                .map_or_else(|| word.clone(), str::to_string)),
            Some(Token::Quoted(text)) => Ok(text.clone()),
            Some(other) => Err(format!("expected operand, found '{other}'")),
            None => Err("expected operand, found end of expression".to_string()),
        }
    }
}

fn truthy(value: &str) -> bool {
    parse_literal(value).map_or_else(|_| value.eq_ignore_ascii_case("true"), |n| n != 0)
}

#[cfg(test)]
mod tests {
    use super::{AlwaysValid, ConditionEvaluator, ParameterConditionEvaluator};
    use crate::design::Core;

    fn core() -> Core {
        Core::new("pcie_0", "plbv46_pcie")
            .with_parameter("C_INCLUDE_BAR", "1")
            .with_parameter("C_FAMILY", "virtex5")
            .with_parameter("C_BAR_COUNT", "0x3")
    }

    fn eval(expression: &str) -> bool {
        ParameterConditionEvaluator
            .evaluate(&core(), expression)
            .expect("well-formed expression")
    }

    #[test]
    fn parameters_are_substituted() {
        assert!(eval("C_INCLUDE_BAR == 1"));
        assert!(eval("C_INCLUDE_BAR = 0b1"));
        assert!(!eval("C_INCLUDE_BAR != 1"));
        assert!(eval("C_FAMILY = VIRTEX5"));
    }

    #[test]
    fn numeric_ordering_uses_literal_values() {
        assert!(eval("C_BAR_COUNT > 2"));
        assert!(eval("C_BAR_COUNT <= 0x3"));
        assert!(!eval("C_BAR_COUNT < 3"));
    }

    #[test]
    fn boolean_connectives_and_grouping() {
        assert!(eval("C_INCLUDE_BAR == 1 AND C_FAMILY = virtex5"));
        assert!(eval("C_INCLUDE_BAR == 0 || C_FAMILY == 'virtex5'"));
        assert!(!eval("C_INCLUDE_BAR == 1 && (C_FAMILY = spartan3 OR C_BAR_COUNT == 0)"));
        assert!(eval("NOT (C_INCLUDE_BAR == 0)"));
        assert!(eval("!C_UNKNOWN_FLAG == 1 OR C_INCLUDE_BAR"));
    }

    #[test]
    fn bare_operand_is_truthy_when_nonzero() {
        assert!(eval("C_INCLUDE_BAR"));
        assert!(!eval("0"));
        assert!(eval("TRUE"));
    }

    #[test]
    fn malformed_expressions_are_errors() {
        let evaluator = ParameterConditionEvaluator;
        assert!(evaluator.evaluate(&core(), "C_INCLUDE_BAR ==").is_err());
        assert!(evaluator.evaluate(&core(), "(C_INCLUDE_BAR == 1").is_err());
        assert!(evaluator.evaluate(&core(), "C_FAMILY < virtex4").is_err());
        assert!(evaluator.evaluate(&core(), "C_INCLUDE_BAR & 1").is_err());
        assert!(evaluator.evaluate(&core(), "1 1").is_err());
    }

    #[test]
    fn deep_nesting_is_rejected_instead_of_recursing() {
        let parens = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        let nots = format!("{}1", "NOT ".repeat(200_000));
        for expression in [parens, nots] {
            let error = ParameterConditionEvaluator
                .evaluate(&core(), &expression)
                .expect_err("nesting limit applies");
            assert_eq!(error.message, "expression nested too deeply");
        }
        assert!(eval(&format!("{}C_INCLUDE_BAR{}", "(".repeat(32), ")".repeat(32))));
    }

    #[test]
    fn always_valid_accepts_anything() {
        assert_eq!(AlwaysValid.evaluate(&core(), "garbage ((("), Ok(true));
    }
}
