//! Utility macros for the front end.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_DEFAULT_HANDLER!` - Creates a default lexer handler for fixed-text tokens
//! - `MK_NODE_CONSTRUCTORS!` - Generates one `Node` constructor per node kind
//!
//! These macros reduce boilerplate in the lexer and the AST model.

/// Creates a Token instance.
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Variable, "$foo".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $image:expr, $span:expr) => {
        Token {
            kind: $kind,
            image: $image,
            span: $span,
        }
    };
}

/// Creates a default lexer handler for patterns that always match the same text.
///
/// The handler records a token with the given kind and advances the lexer
/// past the literal.
///
/// # Example
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^->").unwrap(),
///     handler: MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->"),
/// }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $image:literal) => {
        |lexer: &mut Lexer, _matched: &str| {
            lexer.emit($kind, String::from($image));
        }
    };
}

/// Generates the per-kind constructors of `Node`.
///
/// Each entry `fn_name => Kind` expands to
/// `pub fn fn_name(image: impl Into<String>) -> Node`.
#[macro_export]
macro_rules! MK_NODE_CONSTRUCTORS {
    ($($fn_name:ident => $kind:ident),* $(,)?) => {
        impl Node {
            $(
                pub fn $fn_name(image: impl Into<String>) -> Node {
                    Node::new(NodeKind::$kind, image)
                }
            )*
        }
    };
}
