use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

/// Receives the lexer and the exact text the pattern matched.
pub type RegexHandler = fn(&mut Lexer, &str);

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

macro_rules! pattern {
    ($regex:expr, $handler:expr) => {
        RegexPattern {
            regex: Regex::new($regex).unwrap(),
            handler: $handler,
        }
    };
}

lazy_static! {
    /// Patterns tried in order inside PHP code. Longer operators come first.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern!(r"^\s+", skip_handler),
        pattern!(r"^/\*\*\s[\s\S]*?\*/", doc_comment_handler),
        pattern!(r"^/\*[\s\S]*?\*/", skip_handler),
        pattern!(r"^(?://|#)[^\n]*", line_comment_handler),
        pattern!(r#"^<<<[ \t]*['"]?[A-Za-z_][A-Za-z0-9_]*['"]?\r?\n"#, heredoc_handler),
        pattern!(
            r"(?i)^\([ \t]*(?:int|integer|bool|boolean|float|double|real|string|array|object|unset|binary)[ \t]*\)",
            cast_handler
        ),
        pattern!(r"^\$[a-zA-Z_[^\x00-\x7F]][a-zA-Z0-9_[^\x00-\x7F]]*", variable_handler),
        pattern!(r"(?i)^yield\s+from\b", yield_from_handler),
        pattern!(r"^[a-zA-Z_[^\x00-\x7F]][a-zA-Z0-9_[^\x00-\x7F]]*", symbol_handler),
        pattern!(
            r"^(?:0[xX][0-9a-fA-F_]+|0[bB][01_]+|[0-9][0-9_]*(?:\.[0-9_]*)?(?:[eE][+-]?[0-9]+)?|\.[0-9][0-9_]*(?:[eE][+-]?[0-9]+)?)",
            number_handler
        ),
        pattern!(r"^'(?:[^'\\]|\\[\s\S])*'", string_handler),
        pattern!(r#"^"(?:[^"\\]|\\[\s\S])*""#, string_handler),
        pattern!(r"^`(?:[^`\\]|\\[\s\S])*`", string_handler),
        pattern!(r"^\?>", close_tag_handler),
        pattern!(r"^<=>", MK_DEFAULT_HANDLER!(TokenKind::Spaceship, "<=>")),
        pattern!(r"^\*\*=", MK_DEFAULT_HANDLER!(TokenKind::PowEquals, "**=")),
        pattern!(r"^\.\.\.", MK_DEFAULT_HANDLER!(TokenKind::Ellipsis, "...")),
        pattern!(r"^<<=", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeftEquals, "<<=")),
        pattern!(r"^>>=", MK_DEFAULT_HANDLER!(TokenKind::ShiftRightEquals, ">>=")),
        pattern!(r"^===", MK_DEFAULT_HANDLER!(TokenKind::Identical, "===")),
        pattern!(r"^!==", MK_DEFAULT_HANDLER!(TokenKind::NotIdentical, "!==")),
        pattern!(r"^\?\?=", MK_DEFAULT_HANDLER!(TokenKind::CoalesceEquals, "??=")),
        pattern!(r"^\?->", MK_DEFAULT_HANDLER!(TokenKind::NullsafeArrow, "?->")),
        pattern!(r"^==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern!(r"^!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern!(r"^<>", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "<>")),
        pattern!(r"^<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern!(r"^>=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern!(r"^&&", MK_DEFAULT_HANDLER!(TokenKind::BooleanAnd, "&&")),
        pattern!(r"^\|\|", MK_DEFAULT_HANDLER!(TokenKind::BooleanOr, "||")),
        pattern!(r"^\+\+", MK_DEFAULT_HANDLER!(TokenKind::PlusPlus, "++")),
        pattern!(r"^--", MK_DEFAULT_HANDLER!(TokenKind::MinusMinus, "--")),
        pattern!(r"^\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern!(r"^-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern!(r"^\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern!(r"^/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern!(r"^\.=", MK_DEFAULT_HANDLER!(TokenKind::ConcatEquals, ".=")),
        pattern!(r"^%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        pattern!(r"^&=", MK_DEFAULT_HANDLER!(TokenKind::AndEquals, "&=")),
        pattern!(r"^\|=", MK_DEFAULT_HANDLER!(TokenKind::OrEquals, "|=")),
        pattern!(r"^\^=", MK_DEFAULT_HANDLER!(TokenKind::XorEquals, "^=")),
        pattern!(r"^->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        pattern!(r"^=>", MK_DEFAULT_HANDLER!(TokenKind::DoubleArrow, "=>")),
        pattern!(r"^::", MK_DEFAULT_HANDLER!(TokenKind::DoubleColon, "::")),
        pattern!(r"^\?\?", MK_DEFAULT_HANDLER!(TokenKind::Coalesce, "??")),
        pattern!(r"^\*\*", MK_DEFAULT_HANDLER!(TokenKind::Pow, "**")),
        pattern!(r"^<<", MK_DEFAULT_HANDLER!(TokenKind::ShiftLeft, "<<")),
        pattern!(r"^>>", MK_DEFAULT_HANDLER!(TokenKind::ShiftRight, ">>")),
        pattern!(r"^=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern!(r"^<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern!(r"^>", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern!(r"^!", MK_DEFAULT_HANDLER!(TokenKind::Not, "!")),
        pattern!(r"^&", MK_DEFAULT_HANDLER!(TokenKind::Ampersand, "&")),
        pattern!(r"^\|", MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|")),
        pattern!(r"^\^", MK_DEFAULT_HANDLER!(TokenKind::Caret, "^")),
        pattern!(r"^~", MK_DEFAULT_HANDLER!(TokenKind::Tilde, "~")),
        pattern!(r"^\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern!(r"^-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern!(r"^\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern!(r"^/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern!(r"^%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
        pattern!(r"^\.", MK_DEFAULT_HANDLER!(TokenKind::Dot, ".")),
        pattern!(r"^;", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern!(r"^,", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern!(r"^:", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern!(r"^\\", MK_DEFAULT_HANDLER!(TokenKind::Backslash, "\\")),
        pattern!(r"^\?", MK_DEFAULT_HANDLER!(TokenKind::Question, "?")),
        pattern!(r"^\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern!(r"^\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern!(r"^\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern!(r"^\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern!(r"^\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern!(r"^\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern!(r"^\$", MK_DEFAULT_HANDLER!(TokenKind::Dollar, "$")),
        pattern!(r"^@", MK_DEFAULT_HANDLER!(TokenKind::At, "@")),
    ];

    static ref OPEN_TAG: Regex = Regex::new(r"(?i)<\?(?:php\b|=)?").unwrap();
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    line: u32,
    column: u32,
    in_php: bool,
    file: Rc<String>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("<stdin>"))
        };

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            line: 1,
            column: 1,
            in_php: false,
            file: file_name,
        }
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, Rc::clone(&self.file))
    }

    /// Consumes `n` bytes and returns the position of the last consumed character.
    pub fn advance_n(&mut self, n: usize) -> Position {
        let mut end = (self.line, self.column);
        let end_pos = (self.pos + n).min(self.source.len());

        for ch in self.source[self.pos..end_pos].chars() {
            end = (self.line, self.column);
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }

        self.pos = end_pos;
        Position::new(end.0, end.1, Rc::clone(&self.file))
    }

    /// Records a token whose text starts at the current position.
    pub fn emit(&mut self, kind: TokenKind, image: String) {
        let start = self.position();
        let end = self.advance_n(image.len());
        self.push(MK_TOKEN!(kind, image, Span { start, end }));
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Handles text outside of `<?php ... ?>`.
    fn lex_inline_html(&mut self) {
        let (html_len, tag) = match OPEN_TAG.find(self.remainder()) {
            Some(found) => (found.start(), Some(found.as_str().to_string())),
            None => (self.remainder().len(), None),
        };

        if html_len > 0 {
            let html = self.remainder()[..html_len].to_string();
            self.emit(TokenKind::InlineHtml, html);
        }

        if let Some(tag) = tag {
            self.emit(TokenKind::OpenTag, tag);
            self.in_php = true;
        }
    }
}

fn skip_handler(lexer: &mut Lexer, matched: &str) {
    lexer.advance_n(matched.len());
}

fn line_comment_handler(lexer: &mut Lexer, matched: &str) {
    // A close tag ends a line comment.
    let length = matched.find("?>").unwrap_or(matched.len());
    lexer.advance_n(length);
}

fn doc_comment_handler(lexer: &mut Lexer, matched: &str) {
    lexer.emit(TokenKind::DocComment, matched.to_string());
}

fn number_handler(lexer: &mut Lexer, matched: &str) {
    lexer.emit(TokenKind::Number, matched.to_string());
}

fn string_handler(lexer: &mut Lexer, matched: &str) {
    lexer.emit(TokenKind::ConstantString, matched.to_string());
}

fn cast_handler(lexer: &mut Lexer, matched: &str) {
    lexer.emit(TokenKind::Cast, matched.to_string());
}

fn variable_handler(lexer: &mut Lexer, matched: &str) {
    lexer.emit(TokenKind::Variable, matched.to_string());
}

fn close_tag_handler(lexer: &mut Lexer, matched: &str) {
    lexer.emit(TokenKind::CloseTag, matched.to_string());
    lexer.in_php = false;
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) {
    let kind = RESERVED_LOOKUP
        .get(matched.to_ascii_lowercase().as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.emit(kind, matched.to_string());
}

fn yield_from_handler(lexer: &mut Lexer, matched: &str) {
    lexer.emit(TokenKind::YieldFrom, matched.to_string());
}

/// Heredoc and nowdoc strings are kept as one string token, terminator included.
fn heredoc_handler(lexer: &mut Lexer, matched: &str) {
    let label = matched
        .trim_start_matches("<<<")
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .to_string();

    let body = &lexer.remainder()[matched.len()..];
    let mut offset = 0;
    let mut length = None;

    for line in body.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];

        if let Some(after) = rest.strip_prefix(label.as_str()) {
            let closes = after
                .chars()
                .next()
                .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
            if closes {
                length = Some(offset + indent + label.len());
                break;
            }
        }
        offset += line.len();
    }

    let total = matched.len() + length.unwrap_or(body.len());
    let image = lexer.remainder()[..total].to_string();
    lexer.emit(TokenKind::ConstantString, image);
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::new(source, file);

    while !lex.at_eof() {
        if !lex.in_php {
            lex.lex_inline_html();
            continue;
        }

        let mut matched = false;

        for pattern in PATTERNS.iter() {
            let found = pattern
                .regex
                .find(lex.remainder())
                .map(|found| found.as_str().to_string());

            if let Some(text) = found {
                (pattern.handler)(&mut lex, &text);
                matched = true;
                break;
            }
        }

        if !matched {
            return Err(Error::new(
                ErrorImpl::UnrecognisedToken {
                    token: lex.at().to_string(),
                },
                lex.position(),
            ));
        }
    }

    let position = lex.position();
    lex.push(MK_TOKEN!(
        TokenKind::EOF,
        String::from("EOF"),
        Span {
            start: position.clone(),
            end: position
        }
    ));
    Ok(lex.tokens)
}
