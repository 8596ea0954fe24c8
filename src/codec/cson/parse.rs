use serde_json::{Map, Number, Value};

use crate::codec::CodecError;

/// Parse CSON text into a value.
pub fn from_str(src: &str) -> Result<Value, CodecError> {
    let tokens = Lexer::new(src).run()?;
    let mut parser = Parser { tokens, pos: 0 };

    let value = match parser.peek() {
        Some(t) if parser.pair_start() => {
            let col = t.col;
            parser.implicit_object(col)?
        }
        _ => parser.value()?,
    };
    if let Some(t) = parser.peek() {
        return Err(t.error("unexpected token after document"));
    }
    Ok(value)
}

// ── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Str(String),
    Num(Number),
    Word(String),
    Colon,
    Comma,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

#[derive(Debug, Clone)]
struct Token {
    tok:        Tok,
    line:       usize,
    col:        usize,
    /// First token on its line; only these carry layout meaning.
    line_start: bool,
}

impl Token {
    fn error(&self, msg: &str) -> CodecError {
        CodecError::Cson { line: self.line, col: self.col + 1, msg: msg.to_string() }
    }
}

// ── Lexer ───────────────────────────────────────────────────────────────────

struct Lexer {
    chars:      Vec<char>,
    pos:        usize,
    line:       usize,
    col:        usize,
    line_start: bool,
    tokens:     Vec<Token>,
}

impl Lexer {
    fn new(src: &str) -> Self {
        Self {
            chars:      src.chars().collect(),
            pos:        0,
            line:       1,
            col:        0,
            line_start: true,
            tokens:     Vec::new(),
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
            self.line_start = true;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn error(&self, msg: &str) -> CodecError {
        CodecError::Cson { line: self.line, col: self.col + 1, msg: msg.to_string() }
    }

    fn push(&mut self, tok: Tok, (line, col, line_start): (usize, usize, bool)) {
        self.tokens.push(Token { tok, line, col, line_start });
        self.line_start = false;
    }

    fn run(mut self) -> Result<Vec<Token>, CodecError> {
        while let Some(c) = self.peek_at(0) {
            let at = (self.line, self.col, self.line_start);
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                '#' => self.comment()?,
                '{' | '}' | '[' | ']' | ':' | ',' => {
                    self.bump();
                    let tok = match c {
                        '{' => Tok::LBrace,
                        '}' => Tok::RBrace,
                        '[' => Tok::LBracket,
                        ']' => Tok::RBracket,
                        ':' => Tok::Colon,
                        _   => Tok::Comma,
                    };
                    self.push(tok, at);
                }
                '\'' | '"' => {
                    let s = self.string(c)?;
                    self.push(Tok::Str(s), at);
                }
                c if c.is_ascii_digit()
                    || ((c == '-' || c == '+' || c == '.')
                        && self.peek_at(1).is_some_and(|n| n.is_ascii_digit() || n == '.')) =>
                {
                    let n = self.number()?;
                    self.push(Tok::Num(n), at);
                }
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    let mut word = String::new();
                    while let Some(c) = self.peek_at(0) {
                        if !(c.is_ascii_alphanumeric() || c == '_' || c == '$') {
                            break;
                        }
                        word.push(c);
                        self.bump();
                    }
                    self.push(Tok::Word(word), at);
                }
                other => return Err(self.error(&format!("unexpected character {other:?}"))),
            }
        }
        Ok(self.tokens)
    }

    fn comment(&mut self) -> Result<(), CodecError> {
        if self.starts_with("###") && self.peek_at(3) != Some('#') {
            for _ in 0..3 {
                self.bump();
            }
            while !self.starts_with("###") {
                if self.bump().is_none() {
                    return Err(self.error("unterminated block comment"));
                }
            }
            for _ in 0..3 {
                self.bump();
            }
        } else {
            while let Some(c) = self.peek_at(0) {
                if c == '\n' {
                    break;
                }
                self.bump();
            }
        }
        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<String, CodecError> {
        let triple: String = std::iter::repeat(quote).take(3).collect();
        if self.starts_with(&triple) {
            for _ in 0..3 {
                self.bump();
            }
            let mut raw = String::new();
            while !self.starts_with(&triple) {
                match self.bump() {
                    Some(c) => raw.push(c),
                    None    => return Err(self.error("unterminated block string")),
                }
            }
            for _ in 0..3 {
                self.bump();
            }
            return self.unescape(&dedent(&raw));
        }

        self.bump();
        let mut raw = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    raw.push('\\');
                    match self.bump() {
                        Some(c) => raw.push(c),
                        None    => return Err(self.error("unterminated string")),
                    }
                }
                Some(c) if c == quote => break,
                Some('\n') => {
                    // Line breaks inside a plain string fold to one space.
                    while raw.ends_with(' ') || raw.ends_with('\t') {
                        raw.pop();
                    }
                    while matches!(self.peek_at(0), Some(' ' | '\t')) {
                        self.bump();
                    }
                    raw.push(' ');
                }
                Some(c) => raw.push(c),
            }
        }
        self.unescape(&raw)
    }

    fn unescape(&self, raw: &str) -> Result<String, CodecError> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n')  => out.push('\n'),
                Some('r')  => out.push('\r'),
                Some('t')  => out.push('\t'),
                Some('b')  => out.push('\u{8}'),
                Some('f')  => out.push('\u{c}'),
                Some('v')  => out.push('\u{b}'),
                Some('0')  => out.push('\0'),
                Some('x')  => {
                    let code = hex_digits(&mut chars, 2).ok_or_else(|| self.error("invalid \\x escape"))?;
                    out.push(char::from_u32(code).ok_or_else(|| self.error("invalid \\x escape"))?);
                }
                Some('u')  => {
                    let hi = hex_digits(&mut chars, 4).ok_or_else(|| self.error("invalid \\u escape"))?;
                    let code = if (0xD800..0xDC00).contains(&hi) && chars.peek() == Some(&'\\') {
                        chars.next();
                        if chars.next() != Some('u') {
                            return Err(self.error("unpaired surrogate"));
                        }
                        let lo = hex_digits(&mut chars, 4).ok_or_else(|| self.error("invalid \\u escape"))?;
                        0x10000 + ((hi - 0xD800) << 10) + (lo.wrapping_sub(0xDC00) & 0x3FF)
                    } else {
                        hi
                    };
                    out.push(char::from_u32(code).ok_or_else(|| self.error("invalid code point"))?);
                }
                Some('\n') => {
                    while matches!(chars.peek(), Some(' ' | '\t')) {
                        chars.next();
                    }
                }
                Some(other) => out.push(other),
                None        => out.push('\\'),
            }
        }
        Ok(out)
    }

    fn number(&mut self) -> Result<Number, CodecError> {
        let mut text = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek_at(0) {
            text.push(sign);
            self.bump();
        }

        if self.peek_at(0) == Some('0') {
            let radix = match self.peek_at(1) {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.bump();
                self.bump();
                let mut digits = String::new();
                while let Some(c) = self.peek_at(0).filter(|c| c.is_digit(radix)) {
                    digits.push(c);
                    self.bump();
                }
                let magnitude = i64::from_str_radix(&digits, radix)
                    .map_err(|_| self.error("invalid integer literal"))?;
                let n = if text == "-" { -magnitude } else { magnitude };
                return Ok(Number::from(n));
            }
        }

        let mut is_float = false;
        while let Some(c) = self.peek_at(0) {
            match c {
                '0'..='9' => {}
                '.' if !is_float => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    text.push(c);
                    self.bump();
                    if let Some(sign @ ('-' | '+')) = self.peek_at(0) {
                        text.push(sign);
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            text.push(c);
            self.bump();
        }

        let text = text.trim_start_matches('+');
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Number::from(i));
            }
            if let Ok(u) = text.parse::<u64>() {
                return Ok(Number::from(u));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| self.error(&format!("invalid number {text:?}")))
    }
}

fn hex_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<u32> {
    let mut code = 0;
    for _ in 0..count {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    Some(code)
}

/// Block-string layout: drop a blank first and last line, then strip the
/// common indentation.
fn dedent(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.split('\n').collect();
    if lines.len() > 1 && lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    if lines.len() > 1 && lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| l.get(margin..).unwrap_or("").trim_end_matches('\r'))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Parser ──────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos:    usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    fn peek_tok(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|t| &t.tok)
    }

    fn eof_error(&self) -> CodecError {
        let (line, col) = self.tokens.last().map_or((1, 1), |t| (t.line, t.col + 1));
        CodecError::Cson { line, col, msg: "unexpected end of input".to_string() }
    }

    fn next(&mut self) -> Result<Token, CodecError> {
        let t = self.peek().ok_or_else(|| self.eof_error())?;
        self.pos += 1;
        Ok(t)
    }

    /// `key :` at the current position.
    fn pair_start(&self) -> bool {
        let key = matches!(self.peek_tok(), Some(Tok::Str(_) | Tok::Word(_) | Tok::Num(_)));
        key && matches!(self.tokens.get(self.pos + 1).map(|t| &t.tok), Some(Tok::Colon))
    }

    fn skip_commas(&mut self) {
        while self.peek_tok() == Some(&Tok::Comma) {
            self.pos += 1;
        }
    }

    fn key(&mut self) -> Result<String, CodecError> {
        let t = self.next()?;
        let key = match t.tok {
            Tok::Str(s) | Tok::Word(s) => s,
            Tok::Num(n) => n.to_string(),
            _ => return Err(t.error("expected a key")),
        };
        let colon = self.next()?;
        if colon.tok != Tok::Colon {
            return Err(colon.error("expected ':'"));
        }
        Ok(key)
    }

    /// Brace-less object whose keys are aligned at `col`.
    fn implicit_object(&mut self, col: usize) -> Result<Value, CodecError> {
        let mut map = Map::new();
        loop {
            let key = self.key()?;
            let value = self.pair_value(col)?;
            map.insert(key, value);

            let after_comma = self.peek_tok() == Some(&Tok::Comma);
            if after_comma {
                self.pos += 1;
            }
            let Some(next) = self.peek() else { break };
            if !self.pair_start() {
                break;
            }
            if next.line_start {
                if next.col == col {
                    continue;
                }
                if next.col > col {
                    return Err(next.error("unexpected indentation"));
                }
                break;
            }
            if !after_comma {
                break;
            }
        }
        Ok(Value::Object(map))
    }

    /// The value after `key:`, where the key sits at column `col`.
    fn pair_value(&mut self, col: usize) -> Result<Value, CodecError> {
        let t = self.peek().ok_or_else(|| self.eof_error())?;
        if t.line_start && t.col <= col {
            return Err(t.error("expected an indented value"));
        }
        if self.pair_start() {
            return self.implicit_object(t.col);
        }
        self.value()
    }

    fn value(&mut self) -> Result<Value, CodecError> {
        let t = self.next()?;
        match t.tok {
            Tok::LBrace   => self.braced_object(),
            Tok::LBracket => self.array(),
            Tok::Str(s)   => Ok(Value::String(s)),
            Tok::Num(n)   => Ok(Value::Number(n)),
            Tok::Word(ref w) => match w.as_str() {
                "true" | "yes" | "on"   => Ok(Value::Bool(true)),
                "false" | "no" | "off"  => Ok(Value::Bool(false)),
                "null" | "undefined"    => Ok(Value::Null),
                _ => Err(t.error(&format!("unexpected identifier {w:?}"))),
            },
            _ => Err(t.error("expected a value")),
        }
    }

    fn braced_object(&mut self) -> Result<Value, CodecError> {
        let mut map = Map::new();
        loop {
            self.skip_commas();
            let t = self.peek().ok_or_else(|| self.eof_error())?;
            if t.tok == Tok::RBrace {
                self.pos += 1;
                break;
            }
            if !self.pair_start() {
                return Err(t.error("expected a key"));
            }
            let key = self.key()?;
            let value = self.pair_value(t.col)?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    fn array(&mut self) -> Result<Value, CodecError> {
        let mut items = Vec::new();
        loop {
            self.skip_commas();
            let t = self.peek().ok_or_else(|| self.eof_error())?;
            if t.tok == Tok::RBracket {
                self.pos += 1;
                break;
            }
            let item = if self.pair_start() { self.implicit_object(t.col)? } else { self.value()? };
            items.push(item);
        }
        Ok(Value::Array(items))
    }
}
