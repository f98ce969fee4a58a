//! Lexer and recursive descent parser for template expressions
//!
//! Precedence, lowest first:
//!
//! ```text
//! ternary    = coalesce ("?" ternary ":" ternary)?
//! coalesce   = comparison ("??" coalesce)?
//! comparison = operand (("==" | "!=" | "<" | "<=" | ">" | ">=") operand)?
//! operand    = "(" ternary ")" | literal | call | forEach | path
//! ```
//!
//! Only one comparison is allowed per operand chain; `a < b < c` is an error.

use super::ast::*;
use crate::error::ParseError;
use crate::path::{PathSegment, join_path};
use crate::value::Value;

/// Parse a template string into a TemplateExpression AST
pub fn parse_template(input: &str) -> Result<TemplateExpression, ParseError> {
    let mut parts = Vec::new();
    let mut current_text = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if ch != '$' || !matches!(chars.peek(), Some(&(_, '{'))) {
            current_text.push(ch);
            continue;
        }

        // Start of expression
        chars.next(); // consume '{'

        if !current_text.is_empty() {
            parts.push(Part::Text(std::mem::take(&mut current_text)));
        }

        // Find the matching closing brace, ignoring braces inside string literals
        let expr_start = pos + 2;
        let mut expr_end = None;
        let mut brace_depth = 1;
        let mut quote: Option<char> = None;

        while let Some((i, c)) = chars.next() {
            match quote {
                Some(_) if c == '\\' => {
                    chars.next();
                }
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None => match c {
                    '\'' | '"' => quote = Some(c),
                    '{' => brace_depth += 1,
                    '}' => {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            expr_end = Some(i);
                            break;
                        }
                    }
                    _ => {}
                },
            }
        }

        let Some(expr_end) = expr_end else {
            return Err(ParseError::new(
                "unclosed expression, expected '}'",
                pos,
                excerpt(input, pos),
            ));
        };

        let expr_str = &input[expr_start..expr_end];
        parts.push(parse_expression(expr_str, expr_start)?);
    }

    if !current_text.is_empty() {
        parts.push(Part::Text(current_text));
    }

    Ok(TemplateExpression::new(input, parts))
}

/// Parse the inside of a single `${...}` span
pub fn parse_expression(input: &str, base_pos: usize) -> Result<Part, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new("empty expression", base_pos, ""));
    }
    let tokens = Lexer::new(input, base_pos).tokenize()?;
    let mut parser = Parser {
        input,
        base_pos,
        tokens,
        pos: 0,
    };
    parser.parse()
}

fn excerpt(input: &str, pos: usize) -> String {
    input.get(pos..).unwrap_or("").chars().take(20).collect()
}

/// Token types for the expression lexer
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Ident(String),
    Number(f64),
    String(String),
    Bool(bool),
    Null,

    // Operators
    Minus,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Question,
    Colon,
    DoubleQuestion, // ??
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,

    /// A character no rule claims; reported by the parser so that `??`
    /// can still recover from a garbled left operand
    Unknown(char),

    // End of input
    Eof,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Number(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string '{}'", s),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Null => write!(f, "null"),
            Token::Minus => write!(f, "'-'"),
            Token::Eq => write!(f, "'=='"),
            Token::Ne => write!(f, "'!='"),
            Token::Lt => write!(f, "'<'"),
            Token::Le => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Ge => write!(f, "'>='"),
            Token::Question => write!(f, "'?'"),
            Token::Colon => write!(f, "':'"),
            Token::DoubleQuestion => write!(f, "'??'"),
            Token::Dot => write!(f, "'.'"),
            Token::Comma => write!(f, "','"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Unknown(c) => write!(f, "character '{}'", c),
            Token::Eof => write!(f, "end of expression"),
        }
    }
}

/// Lexer for expression tokens
struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    base_pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str, base_pos: usize) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            base_pos,
        }
    }

    /// Lex the whole input; each token carries its absolute position
    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let pos = self.current_pos();
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push((token, pos));
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_pos(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.input.len())
            + self.base_pos
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    /// Consume the next char if it equals `expected`
    fn eat(&mut self, expected: char) -> bool {
        if let Some(&(_, c)) = self.chars.peek() {
            if c == expected {
                self.chars.next();
                return true;
            }
        }
        false
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let Some(&(pos, ch)) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        // Single-char tokens
        let single = match ch {
            '-' => Some(Token::Minus),
            '.' => Some(Token::Dot),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ':' => Some(Token::Colon),
            _ => None,
        };
        if let Some(token) = single {
            self.chars.next();
            return Ok(token);
        }

        // One- or two-char operators
        match ch {
            '?' => {
                self.chars.next();
                return Ok(if self.eat('?') {
                    Token::DoubleQuestion
                } else {
                    Token::Question
                });
            }
            '=' => {
                self.chars.next();
                return Ok(if self.eat('=') {
                    Token::Eq
                } else {
                    Token::Unknown('=')
                });
            }
            '!' => {
                self.chars.next();
                return Ok(if self.eat('=') {
                    Token::Ne
                } else {
                    Token::Unknown('!')
                });
            }
            '<' => {
                self.chars.next();
                return Ok(if self.eat('=') { Token::Le } else { Token::Lt });
            }
            '>' => {
                self.chars.next();
                return Ok(if self.eat('=') { Token::Ge } else { Token::Gt });
            }
            _ => {}
        }

        // String literal, single or double quoted
        if ch == '\'' || ch == '"' {
            return self.lex_string(pos, ch);
        }

        if ch.is_ascii_digit() {
            return self.lex_number(pos);
        }

        // Identifier or keyword
        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            let start = pos;
            while let Some(&(_, c)) = self.chars.peek() {
                if c.is_alphanumeric() || c == '_' || c == '$' {
                    self.chars.next();
                } else {
                    break;
                }
            }
            let end = self.chars.peek().map(|(i, _)| *i).unwrap_or(self.input.len());
            return Ok(match &self.input[start..end] {
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                "null" => Token::Null,
                ident => Token::Ident(ident.to_string()),
            });
        }

        self.chars.next();
        Ok(Token::Unknown(ch))
    }

    fn lex_string(&mut self, pos: usize, quote: char) -> Result<Token, ParseError> {
        self.chars.next(); // consume opening quote
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(Token::String(s)),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => s.push('\n'),
                    Some((_, 't')) => s.push('\t'),
                    Some((_, c)) => s.push(c),
                    None => break,
                },
                Some((_, c)) => s.push(c),
                None => break,
            }
        }
        Err(ParseError::new(
            "unclosed string literal",
            pos + self.base_pos,
            excerpt(self.input, pos),
        ))
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, ParseError> {
        let mut has_dot = false;

        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.chars.next();
            } else if c == '.' && !has_dot {
                // Decimal point only when a digit follows; `items[0].name` keeps its dot
                let next_is_digit = self.input[i + 1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_digit());
                if !next_is_digit {
                    break;
                }
                has_dot = true;
                self.chars.next();
            } else {
                break;
            }
        }

        let end = self.chars.peek().map(|(i, _)| *i).unwrap_or(self.input.len());
        let num_str = &self.input[start..end];
        num_str.parse::<f64>().map(Token::Number).map_err(|_| {
            ParseError::new(
                format!("invalid number: {}", num_str),
                start + self.base_pos,
                num_str,
            )
        })
    }
}

/// Expression parser over a fully lexed token list
struct Parser<'a> {
    input: &'a str,
    base_pos: usize,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> &Token {
        // tokenize always ends with Eof, and advance never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)].0
    }

    fn position(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].1
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let position = self.position();
        ParseError::new(
            message,
            position,
            excerpt(self.input, position.saturating_sub(self.base_pos)),
        )
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ParseError> {
        if *self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {}", what, self.current())))
        }
    }

    /// Parse the full expression
    fn parse(&mut self) -> Result<Part, ParseError> {
        let part = self.parse_ternary()?;
        if *self.current() != Token::Eof {
            return Err(self.error(format!(
                "unexpected {} after expression",
                self.current()
            )));
        }
        Ok(part)
    }

    /// ternary = coalesce ("?" ternary ":" ternary)?
    fn parse_ternary(&mut self) -> Result<Part, ParseError> {
        let condition = self.parse_coalesce()?;

        if *self.current() == Token::Question {
            self.advance();
            let then_part = self.parse_ternary()?; // Right-associative
            self.expect(Token::Colon, "':' in conditional expression")?;
            let else_part = self.parse_ternary()?;
            return Ok(Part::ternary(condition, then_part, else_part));
        }

        Ok(condition)
    }

    /// coalesce = comparison ("??" coalesce)?
    fn parse_coalesce(&mut self) -> Result<Part, ParseError> {
        let left = self.parse_coalesce_operand()?;

        if *self.current() == Token::DoubleQuestion {
            self.advance();
            let right = self.parse_coalesce()?;
            return Ok(Part::NullCoalesce {
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    /// Left operand of a possible `??`.
    ///
    /// If the operand does not parse cleanly but a `??` follows in the same
    /// scope, the operand becomes a null literal instead of failing the
    /// whole expression.
    fn parse_coalesce_operand(&mut self) -> Result<Part, ParseError> {
        let start = self.pos;
        let result = self.parse_comparison();
        if result.is_ok() && self.at_operand_end() {
            return result;
        }

        match self.find_coalesce_from(start) {
            Some(idx) => {
                log::debug!(
                    "Treating unparseable left operand of '??' as null: {}",
                    match &result {
                        Err(e) => e.to_string(),
                        Ok(_) => format!("trailing {}", self.current()),
                    }
                );
                self.pos = idx;
                Ok(Part::Literal(Value::Null))
            }
            None => result,
        }
    }

    fn at_operand_end(&self) -> bool {
        matches!(
            self.current(),
            Token::DoubleQuestion
                | Token::Question
                | Token::Colon
                | Token::RParen
                | Token::Comma
                | Token::Eof
        )
    }

    /// Index of the next `??` at nesting depth zero, stopping at the end of
    /// the enclosing argument or branch
    fn find_coalesce_from(&self, start: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (idx, (token, _)) in self.tokens.iter().enumerate().skip(start) {
            match token {
                Token::LParen | Token::LBracket => depth += 1,
                Token::RParen | Token::RBracket if depth > 0 => depth -= 1,
                Token::DoubleQuestion if depth == 0 => return Some(idx),
                Token::RParen | Token::Comma | Token::Question | Token::Colon if depth == 0 => {
                    return None;
                }
                Token::Eof => return None,
                _ => {}
            }
        }
        None
    }

    /// comparison = operand (op operand)?
    fn parse_comparison(&mut self) -> Result<Part, ParseError> {
        let left = self.parse_operand()?;

        let op = match self.current() {
            Token::Eq => CompareOp::Eq,
            Token::Ne => CompareOp::Ne,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_operand()?;
        Ok(Part::compare(left, op, right))
    }

    /// operand = "(" ternary ")" | literal | call | forEach | path
    fn parse_operand(&mut self) -> Result<Part, ParseError> {
        match self.current().clone() {
            Token::LParen => {
                self.advance();
                let part = self.parse_ternary()?;
                self.expect(Token::RParen, "')'")?;
                Ok(part)
            }
            Token::Number(n) => {
                self.advance();
                Ok(Part::Literal(Value::Number(n)))
            }
            Token::Minus => {
                self.advance();
                match self.current().clone() {
                    Token::Number(n) => {
                        self.advance();
                        Ok(Part::Literal(Value::Number(-n)))
                    }
                    other => Err(self.error(format!("expected number after '-', found {}", other))),
                }
            }
            Token::String(s) => {
                self.advance();
                Ok(Part::Literal(Value::String(s)))
            }
            Token::Bool(b) => {
                self.advance();
                Ok(Part::Literal(Value::Bool(b)))
            }
            Token::Null => {
                self.advance();
                Ok(Part::Literal(Value::Null))
            }
            Token::Ident(name) => {
                self.advance();
                if *self.current() == Token::LParen {
                    let call_pos = self.position();
                    self.advance();
                    let args = self.parse_call_args(&name)?;
                    if name == "forEach" {
                        return self.build_for_each(args, call_pos);
                    }
                    return Ok(Part::call(name, args));
                }
                self.parse_path(name)
            }
            Token::Eof => Err(self.error("expected expression")),
            other => Err(self.error(format!("unexpected {}", other))),
        }
    }

    /// Arguments after the opening parenthesis, up to and including ')'
    fn parse_call_args(&mut self, name: &str) -> Result<Vec<Part>, ParseError> {
        let mut args = Vec::new();
        if *self.current() == Token::RParen {
            self.advance();
            return Ok(args);
        }

        loop {
            args.push(self.parse_ternary()?);
            match self.current() {
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    return Ok(args);
                }
                Token::Eof => {
                    return Err(self.error(format!("unclosed '(' in call to {}", name)));
                }
                other => {
                    return Err(self.error(format!(
                        "expected ',' or ')' in call to {}, found {}",
                        name, other
                    )));
                }
            }
        }
    }

    /// forEach(item, [index,] collection, body)
    fn build_for_each(&self, args: Vec<Part>, call_pos: usize) -> Result<Part, ParseError> {
        let err = |message: &str| {
            ParseError::new(
                message,
                call_pos,
                excerpt(self.input, call_pos.saturating_sub(self.base_pos)),
            )
        };

        let mut args = args.into_iter();
        let (item, index, collection, body) = match args.len() {
            3 => (args.next(), None, args.next(), args.next()),
            4 => (args.next(), args.next(), args.next(), args.next()),
            _ => {
                return Err(err(
                    "forEach expects (item, collection, body) or (item, index, collection, body)",
                ));
            }
        };

        let item = item
            .as_ref()
            .and_then(loop_variable_name)
            .ok_or_else(|| err("forEach item variable must be a plain identifier"))?;
        let index = match index {
            Some(part) => Some(
                loop_variable_name(&part)
                    .ok_or_else(|| err("forEach index variable must be a plain identifier"))?,
            ),
            None => None,
        };
        let (Some(collection), Some(body)) = (collection, body) else {
            return Err(err("forEach is missing its collection or body"));
        };

        Ok(Part::ForEach {
            item,
            index,
            collection: Box::new(collection),
            body: Box::new(body),
        })
    }

    /// Field/index chain after a root identifier: `.name`, `[0]`
    fn parse_path(&mut self, root: String) -> Result<Part, ParseError> {
        let mut segments = vec![PathSegment::Key(root)];

        loop {
            match self.current() {
                Token::Dot => {
                    self.advance();
                    let field = match self.current().clone() {
                        Token::Ident(s) => s,
                        Token::Bool(b) => b.to_string(),
                        Token::Null => "null".to_string(),
                        _ => return Err(self.error("expected field name after '.'")),
                    };
                    self.advance();
                    segments.push(PathSegment::Key(field));
                }
                Token::LBracket => {
                    self.advance();
                    let index = match self.current() {
                        Token::Number(n) if n.fract() == 0.0 && *n >= 0.0 => *n as usize,
                        _ => return Err(self.error("expected non-negative integer index")),
                    };
                    self.advance();
                    self.expect(Token::RBracket, "']'")?;
                    segments.push(PathSegment::Index(index));
                }
                _ => break,
            }
        }

        Ok(Part::Variable {
            path: join_path(&segments),
        })
    }
}

fn loop_variable_name(part: &Part) -> Option<String> {
    match part {
        Part::Variable { path } if !path.contains(['.', '[']) => Some(path.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(input: &str) -> Part {
        let template = parse_template(input).unwrap();
        assert_eq!(template.parts.len(), 1, "expected one part for {}", input);
        template.parts.into_iter().next().unwrap()
    }

    fn lit(v: impl Into<Value>) -> Part {
        Part::Literal(v.into())
    }

    #[test]
    fn test_parse_text_only() {
        let template = parse_template("Hello, World!").unwrap();
        assert_eq!(template.parts, vec![Part::Text("Hello, World!".to_string())]);
        assert_eq!(template.raw, "Hello, World!");
    }

    #[test]
    fn test_parse_empty() {
        let template = parse_template("").unwrap();
        assert!(template.parts.is_empty());
    }

    #[test]
    fn test_dollar_without_brace_is_text() {
        let template = parse_template("$100").unwrap();
        assert_eq!(template.parts, vec![Part::Text("$100".to_string())]);
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(single("${'x'}"), lit("x"));
        assert_eq!(single("${\"double\"}"), lit("double"));
        assert_eq!(single("${42}"), lit(42));
        assert_eq!(single("${3.14}"), lit(3.14));
        assert_eq!(single("${-2.5}"), lit(-2.5));
        assert_eq!(single("${true}"), lit(true));
        assert_eq!(single("${null}"), Part::Literal(Value::Null));
    }

    #[test]
    fn test_parse_string_escapes() {
        assert_eq!(single(r"${'it\'s'}"), lit("it's"));
        assert_eq!(single(r"${'a\nb'}"), lit("a\nb"));
    }

    #[test]
    fn test_operators_inside_strings_are_text() {
        assert_eq!(single("${'a > b ? c : d'}"), lit("a > b ? c : d"));
        assert_eq!(single("${'}'}"), lit("}"));
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!(single("${name}"), Part::variable("name"));
        assert_eq!(
            single("${addresses[0].street}"),
            Part::variable("addresses[0].street")
        );
        assert_eq!(single("${ user . email }"), Part::variable("user.email"));
    }

    #[test]
    fn test_parse_mixed_text_and_expr() {
        let template = parse_template("Name: ${name}, Age: ${age}").unwrap();
        assert_eq!(
            template.parts,
            vec![
                Part::Text("Name: ".to_string()),
                Part::variable("name"),
                Part::Text(", Age: ".to_string()),
                Part::variable("age"),
            ]
        );
    }

    #[test]
    fn test_parse_comparison_desugars_to_call() {
        assert_eq!(
            single("${age >= 18}"),
            Part::call("gte", vec![Part::variable("age"), lit(18)])
        );
        assert_eq!(
            single("${status != 'done'}"),
            Part::call("ne", vec![Part::variable("status"), lit("done")])
        );
    }

    #[test]
    fn test_chained_comparison_is_error() {
        assert!(parse_template("${a < b < c}").is_err());
    }

    #[test]
    fn test_parse_ternary() {
        assert_eq!(
            single("${active ? 'Yes' : 'No'}"),
            Part::ternary(Part::variable("active"), lit("Yes"), lit("No"))
        );
    }

    #[test]
    fn test_parse_nested_ternary() {
        let expected = Part::ternary(
            Part::call("gt", vec![Part::variable("a"), lit(18)]),
            Part::ternary(Part::variable("b"), lit("X"), lit("Y")),
            lit("Z"),
        );
        assert_eq!(single("${a > 18 ? (b ? 'X' : 'Y') : 'Z'}"), expected);
        // Right-associative without parentheses too
        assert_eq!(single("${a > 18 ? b ? 'X' : 'Y' : 'Z'}"), expected);
    }

    #[test]
    fn test_parse_coalesce_is_right_associative() {
        assert_eq!(
            single("${a ?? b ?? 'default'}"),
            Part::NullCoalesce {
                left: Box::new(Part::variable("a")),
                right: Box::new(Part::NullCoalesce {
                    left: Box::new(Part::variable("b")),
                    right: Box::new(lit("default")),
                }),
            }
        );
    }

    #[test]
    fn test_coalesce_binds_tighter_than_ternary() {
        assert_eq!(
            single("${a ?? b ? 'y' : 'n'}"),
            Part::ternary(
                Part::NullCoalesce {
                    left: Box::new(Part::variable("a")),
                    right: Box::new(Part::variable("b")),
                },
                lit("y"),
                lit("n"),
            )
        );
    }

    #[test]
    fn test_invalid_coalesce_left_becomes_null() {
        let expected = Part::NullCoalesce {
            left: Box::new(Part::Literal(Value::Null)),
            right: Box::new(lit("N/A")),
        };
        assert_eq!(single("${user. ?? 'N/A'}"), expected);
        assert_eq!(single("${a b # ?? 'N/A'}"), expected);
        assert_eq!(single("${null ?? 'N/A'}"), expected);
    }

    #[test]
    fn test_invalid_operand_without_coalesce_is_error() {
        assert!(parse_template("${user.}").is_err());
        assert!(parse_template("${a b}").is_err());
        // The `??` belongs to another argument, so it cannot rescue the first one
        assert!(parse_template("${f(a b, c ?? d)}").is_err());
    }

    #[test]
    fn test_parse_function_calls() {
        assert_eq!(single("${now()}"), Part::call("now", vec![]));
        assert_eq!(
            single("${concat(first, ' ', upper(last))}"),
            Part::call(
                "concat",
                vec![
                    Part::variable("first"),
                    lit(" "),
                    Part::call("upper", vec![Part::variable("last")]),
                ]
            )
        );
        assert_eq!(
            single("${if(x > 1, 'many', 'one')}"),
            Part::ternary(
                Part::call("gt", vec![Part::variable("x"), lit(1)]),
                lit("many"),
                lit("one")
            )
        );
    }

    #[test]
    fn test_parse_for_each() {
        assert_eq!(
            single("${forEach(item, items, item.name)}"),
            Part::ForEach {
                item: "item".to_string(),
                index: None,
                collection: Box::new(Part::variable("items")),
                body: Box::new(Part::variable("item.name")),
            }
        );
        assert_eq!(
            single("${forEach(item, i, order.items, concat(i, ':', item))}"),
            Part::ForEach {
                item: "item".to_string(),
                index: Some("i".to_string()),
                collection: Box::new(Part::variable("order.items")),
                body: Box::new(Part::call(
                    "concat",
                    vec![Part::variable("i"), lit(":"), Part::variable("item")]
                )),
            }
        );
    }

    #[test]
    fn test_for_each_argument_errors() {
        assert!(parse_template("${forEach(item, items)}").is_err());
        assert!(parse_template("${forEach('x', items, x)}").is_err());
        assert!(parse_template("${forEach(item, a > b, items, item)}").is_err());
        assert!(parse_template("${forEach(a, b, c, d, e)}").is_err());
    }

    #[test]
    fn test_unbalanced_input_errors() {
        let err = parse_template("${name").unwrap_err();
        assert!(err.message.contains("unclosed"));
        assert_eq!(err.position, 0);

        assert!(parse_template("${'unclosed}").is_err());
        assert!(parse_template("${upper(name}").is_err());
        assert!(parse_template("${concat(a, 'b)}").is_err());
        assert!(parse_template("${(a}").is_err());
        assert!(parse_template("${a ? b}").is_err());
        assert!(parse_template("${}").is_err());
    }

    #[test]
    fn test_error_position_is_absolute() {
        let err = parse_template("Hello ${a ? b}").unwrap_err();
        assert_eq!(err.position, 13);
    }

    #[test]
    fn test_display_reparses_to_same_ast() {
        for src in [
            "Hi ${user.name ?? 'guest'}!",
            "${a > 18 ? (b ? 'X' : 'Y') : 'Z'}",
            "${forEach(item, i, items, concat(i, '. ', item.name))}",
            "${'it\\'s'}",
        ] {
            let template = parse_template(src).unwrap();
            let reparsed = parse_template(&template.to_string()).unwrap();
            assert_eq!(template.parts, reparsed.parts, "source: {}", src);
        }
    }
}
