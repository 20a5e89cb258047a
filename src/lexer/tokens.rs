use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    /// Keywords, keyed by their lowercase spelling. Keywords are case-insensitive.
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("abstract", TokenKind::Abstract);
        map.insert("and", TokenKind::LogicalAnd);
        map.insert("array", TokenKind::Array);
        map.insert("as", TokenKind::As);
        map.insert("break", TokenKind::Break);
        map.insert("case", TokenKind::Case);
        map.insert("catch", TokenKind::Catch);
        map.insert("class", TokenKind::Class);
        map.insert("clone", TokenKind::Clone);
        map.insert("const", TokenKind::Const);
        map.insert("continue", TokenKind::Continue);
        map.insert("declare", TokenKind::Declare);
        map.insert("default", TokenKind::Default);
        map.insert("die", TokenKind::Exit);
        map.insert("do", TokenKind::Do);
        map.insert("echo", TokenKind::Echo);
        map.insert("else", TokenKind::Else);
        map.insert("elseif", TokenKind::ElseIf);
        map.insert("empty", TokenKind::Empty);
        map.insert("eval", TokenKind::Eval);
        map.insert("exit", TokenKind::Exit);
        map.insert("extends", TokenKind::Extends);
        map.insert("final", TokenKind::Final);
        map.insert("finally", TokenKind::Finally);
        map.insert("fn", TokenKind::Fn);
        map.insert("for", TokenKind::For);
        map.insert("foreach", TokenKind::Foreach);
        map.insert("function", TokenKind::Function);
        map.insert("global", TokenKind::Global);
        map.insert("goto", TokenKind::Goto);
        map.insert("if", TokenKind::If);
        map.insert("implements", TokenKind::Implements);
        map.insert("include", TokenKind::Include);
        map.insert("include_once", TokenKind::IncludeOnce);
        map.insert("instanceof", TokenKind::Instanceof);
        map.insert("insteadof", TokenKind::Insteadof);
        map.insert("interface", TokenKind::Interface);
        map.insert("isset", TokenKind::Isset);
        map.insert("list", TokenKind::List);
        map.insert("match", TokenKind::Match);
        map.insert("namespace", TokenKind::Namespace);
        map.insert("new", TokenKind::New);
        map.insert("or", TokenKind::LogicalOr);
        map.insert("parent", TokenKind::Parent);
        map.insert("print", TokenKind::Print);
        map.insert("private", TokenKind::Private);
        map.insert("protected", TokenKind::Protected);
        map.insert("public", TokenKind::Public);
        map.insert("readonly", TokenKind::Readonly);
        map.insert("require", TokenKind::Require);
        map.insert("require_once", TokenKind::RequireOnce);
        map.insert("return", TokenKind::Return);
        map.insert("self", TokenKind::SelfRef);
        map.insert("static", TokenKind::Static);
        map.insert("switch", TokenKind::Switch);
        map.insert("throw", TokenKind::Throw);
        map.insert("trait", TokenKind::Trait);
        map.insert("try", TokenKind::Try);
        map.insert("unset", TokenKind::Unset);
        map.insert("use", TokenKind::Use);
        map.insert("var", TokenKind::Var);
        map.insert("while", TokenKind::While);
        map.insert("xor", TokenKind::LogicalXor);
        map.insert("yield", TokenKind::Yield);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    OpenTag,
    CloseTag,
    InlineHtml,
    DocComment,

    Variable,
    Identifier,
    Number,
    ConstantString,
    Cast,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment,       // =
    PlusEquals,       // +=
    MinusEquals,      // -=
    StarEquals,       // *=
    SlashEquals,      // /=
    ConcatEquals,     // .=
    PercentEquals,    // %=
    AndEquals,        // &=
    OrEquals,         // |=
    XorEquals,        // ^=
    ShiftLeftEquals,  // <<=
    ShiftRightEquals, // >>=
    PowEquals,        // **=
    CoalesceEquals,   // ??=

    Equals,       // ==
    NotEquals,    // != or <>
    Identical,    // ===
    NotIdentical, // !==
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Spaceship, // <=>

    BooleanAnd, // &&
    BooleanOr,  // ||
    Not,        // !

    Ampersand,
    Pipe,
    Caret,
    Tilde,
    ShiftLeft,
    ShiftRight,

    Plus,
    Dash,
    Star,
    Slash,
    Percent,
    Pow, // **
    Dot,
    PlusPlus,
    MinusMinus,

    Semicolon,
    Comma,
    Colon,
    DoubleColon,
    Backslash,
    Question,
    Coalesce,      // ??
    Arrow,         // ->
    NullsafeArrow, // ?->
    DoubleArrow,   // =>
    Dollar,
    At,
    Ellipsis,

    // Reserved
    Abstract,
    Array,
    As,
    Break,
    Case,
    Catch,
    Class,
    Clone,
    Const,
    Continue,
    Declare,
    Default,
    Do,
    Echo,
    Else,
    ElseIf,
    Empty,
    Eval,
    Exit,
    Extends,
    Final,
    Finally,
    Fn,
    For,
    Foreach,
    Function,
    Global,
    Goto,
    If,
    Implements,
    Include,
    IncludeOnce,
    Instanceof,
    Insteadof,
    Interface,
    Isset,
    List,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Match,
    Namespace,
    New,
    Parent,
    Print,
    Private,
    Protected,
    Public,
    Readonly,
    Require,
    RequireOnce,
    Return,
    SelfRef,
    Static,
    Switch,
    Throw,
    Trait,
    Try,
    Unset,
    Use,
    Var,
    While,
    Yield,
    YieldFrom, // yield from
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        RESERVED_LOOKUP.values().any(|kind| kind == self)
    }

    /// Identifiers plus every keyword; member, method and constant names may
    /// reuse reserved words.
    pub fn is_name(&self) -> bool {
        *self == TokenKind::Identifier || self.is_keyword()
    }

    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Abstract
                | TokenKind::Final
                | TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Readonly
                | TokenKind::Var
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub image: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nimage: {}}}", self.kind, self.image)
    }
}

impl Token {
    pub fn start_line(&self) -> u32 {
        self.span.start.line
    }

    pub fn end_line(&self) -> u32 {
        self.span.end.line
    }

    pub fn start_column(&self) -> u32 {
        self.span.start.column
    }

    pub fn end_column(&self) -> u32 {
        self.span.end.column
    }
}
