//! Parser state and token plumbing.
//!
//! The `Parser` pulls tokens from a `Tokenizer`, records every consumed token
//! in the `TokenStack` so each node knows its source span, keeps the use
//! aliases of the current namespace block in a `SymbolTable` and declares
//! types and callables through the shared `BuildContext`.
//!
//! References are never looked up while parsing: they are stored as resolved
//! qualified names and turned into declarations once the file set is parsed.

use std::{collections::HashMap, rc::Rc};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{
    ast::{
        ast::{Ast, Node, NodeId},
        declarations::{CallableId, CallableKind, Modifiers, TypeDecl, TypeId},
    },
    builder::{
        builder::BuildContext,
        names::{DEFAULT_NAMESPACE, NAMESPACE_SEPARATOR},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{
        stream::Tokenizer,
        tokens::{Token, TokenKind},
    },
};

use super::{
    decl::parse_top_level,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler,
        NUDLookup, StmtHandler, StmtLookup,
    },
    symbol_table::SymbolTable,
    token_stack::TokenStack,
};

lazy_static! {
    static ref PACKAGE_ANNOTATION: Regex = Regex::new(r"@package\s+([^\s*]+)").unwrap();
    static ref SUBPACKAGE_ANNOTATION: Regex = Regex::new(r"@subpackage\s+([^\s*]+)").unwrap();
}

pub struct Parser<'a> {
    tokenizer: Box<dyn Tokenizer + 'a>,
    builder: &'a mut BuildContext,
    token_stack: TokenStack,
    use_symbols: SymbolTable<String>,
    /// Name of the active namespace declaration, if any.
    namespace_name: Option<String>,
    /// Package of the next declaration when no namespace is active.
    package_name: String,
    /// File-level package taken from the leading doc comment.
    global_package_name: String,
    doc_comment: Option<String>,
    modifiers: Modifiers,
    ignore_annotations: bool,
    current_type: Option<TypeId>,
    current_callable: Option<CallableId>,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: Box<dyn Tokenizer + 'a>, builder: &'a mut BuildContext) -> Self {
        let mut parser = Parser {
            tokenizer,
            builder,
            token_stack: TokenStack::new(),
            use_symbols: SymbolTable::new(),
            namespace_name: None,
            package_name: DEFAULT_NAMESPACE.to_string(),
            global_package_name: DEFAULT_NAMESPACE.to_string(),
            doc_comment: None,
            modifiers: Modifiers::empty(),
            ignore_annotations: false,
            current_type: None,
            current_callable: None,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        };
        create_token_lookups(&mut parser);
        parser
    }

    pub fn set_ignore_annotations(&mut self, ignore: bool) {
        self.ignore_annotations = ignore;
    }

    /// Parses the whole token stream into the build context.
    pub fn parse(&mut self) -> Result<(), Error> {
        let file = self.tokenizer.source_file();
        debug!(target: "parser", file = %file, "parsing file");

        self.use_symbols.create_scope();
        self.global_package_name = DEFAULT_NAMESPACE.to_string();
        self.namespace_name = None;
        self.reset();

        while self.has_tokens() {
            parse_top_level(self)?;
        }

        self.use_symbols.destroy_scope();
        debug!(target: "parser", file = %file, nodes = self.builder.ast().len(), "parsed file");
        Ok(())
    }

    // ---- token access -----------------------------------------------------

    /// Kind of the next code token. Pending doc comments are consumed first.
    pub fn current_token_kind(&mut self) -> TokenKind {
        self.consume_comments();
        self.tokenizer.peek()
    }

    /// Kind of the code token `n` positions ahead.
    pub fn peek_nth(&mut self, n: usize) -> TokenKind {
        self.consume_comments();
        self.tokenizer.peek_nth(n)
    }

    pub fn has_tokens(&mut self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Consumes the next code token and records it in the open frame.
    pub fn advance(&mut self) -> Token {
        self.consume_comments();
        let token = self.tokenizer.next();
        self.token_stack.add(token)
    }

    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() != expected_kind {
            return match error {
                Some(error) => Err(error),
                None => Err(self.unexpected()),
            };
        }
        Ok(self.advance())
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Consumes an identifier or a reserved word used as a name.
    pub fn expect_name(&mut self) -> Result<Token, Error> {
        if self.current_token_kind().is_name() {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    /// Consumes the offending token and turns it into an error.
    pub fn unexpected(&mut self) -> Error {
        let token = self.advance();
        match token.kind {
            TokenKind::EOF => Error::new(ErrorImpl::UnexpectedEndOfStream, token.span.start),
            _ => Error::new(
                ErrorImpl::UnexpectedToken { token: token.image },
                token.span.start,
            ),
        }
    }

    /// Error for a missing closing brace, naming the innermost open body.
    pub fn unclosed_body(&mut self) -> Error {
        let token = self.advance();
        let error = if let Some(callable) = self.current_callable {
            let callable = self.builder.callable(callable);
            ErrorImpl::UnclosedBody {
                kind: match callable.kind {
                    CallableKind::Function => "function",
                    CallableKind::Method => "method",
                },
                name: callable.name.clone(),
            }
        } else if let Some(owner) = self.current_type {
            let declaration = self.builder.type_decl(owner);
            ErrorImpl::UnclosedBody {
                kind: declaration.kind.label(),
                name: declaration.name.clone(),
            }
        } else {
            ErrorImpl::UnexpectedEndOfStream
        };
        Error::new(error, token.span.start)
    }

    pub fn source_file(&self) -> Rc<String> {
        self.tokenizer.source_file()
    }

    // ---- doc comments and packages ----------------------------------------

    fn consume_comments(&mut self) {
        while self.tokenizer.peek() == TokenKind::DocComment {
            let after_open_tag = self.tokenizer.prev() == Some(TokenKind::OpenTag);
            let token = self.tokenizer.next();
            let comment = self.token_stack.add(token).image;

            let at_top_level = self.current_type.is_none() && self.current_callable.is_none();
            if at_top_level {
                let declaration_follows = matches!(
                    self.tokenizer.peek(),
                    TokenKind::Class
                        | TokenKind::Interface
                        | TokenKind::Trait
                        | TokenKind::Function
                        | TokenKind::Abstract
                        | TokenKind::Final
                        | TokenKind::Readonly
                );
                if after_open_tag && !declaration_follows {
                    self.global_package_name = self.parse_package_annotation(&comment);
                }
                self.package_name = self.parse_package_annotation(&comment);
            }
            self.doc_comment = Some(comment);
        }
    }

    /// Package named by `@package`/`@subpackage`, or the file-level package.
    fn parse_package_annotation(&self, comment: &str) -> String {
        if self.ignore_annotations {
            return self.global_package_name.clone();
        }

        let package = match PACKAGE_ANNOTATION.captures(comment) {
            Some(captures) => captures[1].to_string(),
            None => return self.global_package_name.clone(),
        };
        match SUBPACKAGE_ANNOTATION.captures(comment) {
            Some(captures) => format!("{}{}{}", package, NAMESPACE_SEPARATOR, &captures[1]),
            None => package,
        }
    }

    pub fn take_doc_comment(&mut self) -> Option<String> {
        self.doc_comment.take()
    }

    pub fn take_modifiers(&mut self) -> Modifiers {
        std::mem::take(&mut self.modifiers)
    }

    pub fn add_modifier(&mut self, modifier: Modifiers) {
        self.modifiers |= modifier;
    }

    /// Clears per-declaration state once a top-level declaration is complete.
    pub fn reset(&mut self) {
        self.modifiers = Modifiers::empty();
        self.doc_comment = None;
        self.package_name = self.global_package_name.clone();
    }

    // ---- namespaces and names ---------------------------------------------

    pub fn namespace_name(&self) -> Option<&str> {
        self.namespace_name.as_deref()
    }

    pub fn set_namespace_name(&mut self, name: Option<String>) {
        self.namespace_name = name;
    }

    pub fn use_symbols(&mut self) -> &mut SymbolTable<String> {
        &mut self.use_symbols
    }

    /// Namespace, or package when no namespace is active.
    pub fn namespace_or_package(&self) -> &str {
        self.namespace_name
            .as_deref()
            .unwrap_or(self.package_name.as_str())
    }

    /// Qualified name for a declaration in the current namespace or package.
    pub fn qualify_declaration(&self, local_name: &str) -> String {
        format!(
            "{}{}{}",
            self.namespace_or_package(),
            NAMESPACE_SEPARATOR,
            local_name
        )
    }

    /// Resolves a name as written in source against the use aliases and the
    /// active namespace. Fully qualified names are returned unchanged.
    pub fn resolve_name(&self, name: &str) -> String {
        if name.starts_with(NAMESPACE_SEPARATOR) {
            return name.to_string();
        }

        let (first, rest) = match name.split_once(NAMESPACE_SEPARATOR) {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };

        if let Some(rest) = rest {
            if first.eq_ignore_ascii_case("namespace") {
                return match &self.namespace_name {
                    Some(namespace) => {
                        format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, rest)
                    }
                    None => rest.to_string(),
                };
            }
        }

        if let Some(alias) = self.use_symbols.lookup(first) {
            return match rest {
                Some(rest) => format!("{}{}{}", alias, NAMESPACE_SEPARATOR, rest),
                None => alias.clone(),
            };
        }

        match &self.namespace_name {
            Some(namespace) => format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name),
            None => name.to_string(),
        }
    }

    // ---- declarations in progress -----------------------------------------

    pub fn builder(&mut self) -> &mut BuildContext {
        &mut *self.builder
    }

    pub fn ast(&self) -> &Ast {
        self.builder.ast()
    }

    /// Declaration of a type built earlier in this run.
    pub fn type_decl(&self, id: TypeId) -> &TypeDecl {
        self.builder.type_decl(id)
    }

    pub fn current_type(&self) -> Option<TypeId> {
        self.current_type
    }

    pub fn set_current_type(&mut self, current: Option<TypeId>) -> Option<TypeId> {
        std::mem::replace(&mut self.current_type, current)
    }

    pub fn current_callable(&self) -> Option<CallableId> {
        self.current_callable
    }

    pub fn set_current_callable(&mut self, current: Option<CallableId>) -> Option<CallableId> {
        std::mem::replace(&mut self.current_callable, current)
    }

    /// Records a type the innermost callable, or else the current type,
    /// depends on.
    pub fn add_dependency(&mut self, name: &str) {
        if let Some(callable) = self.current_callable {
            self.builder.callable_mut(callable).dependencies.add(name);
        } else if let Some(owner) = self.current_type {
            self.builder.type_decl_mut(owner).dependencies.add(name);
        }
    }

    // ---- nodes and spans --------------------------------------------------

    /// Opens the token frame of a node about to be parsed.
    pub fn begin(&mut self) {
        self.token_stack.push();
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.builder.ast_mut().add(node)
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.builder.ast_mut().add_child(parent, child);
    }

    /// Closes the frame opened by `begin`, stores it as the node's span and
    /// folds it into the enclosing frame.
    pub fn finish(&mut self, node: NodeId) -> NodeId {
        let tokens = self.token_stack.pop();
        self.token_stack.fold(&tokens);
        self.builder.store_node_tokens(node, tokens);
        node
    }

    /// Like `finish`, for infix nodes whose left operand was parsed before the
    /// node's own frame was opened.
    pub fn finish_infix(&mut self, node: NodeId, left: NodeId) -> NodeId {
        let own = self.token_stack.pop();
        self.token_stack.fold(&own);

        let mut tokens = self.builder.node_tokens(left);
        tokens.extend(own);
        self.builder.store_node_tokens(node, tokens);
        node
    }

    /// Opens a frame that is not tied to a node.
    pub fn push_frame(&mut self) {
        self.token_stack.push();
    }

    /// Closes a frame opened with `push_frame`, keeping its tokens in the
    /// enclosing frame as well.
    pub fn pop_frame(&mut self) -> Vec<Token> {
        let tokens = self.token_stack.pop();
        self.token_stack.fold(&tokens);
        tokens
    }

    // ---- lookup tables ----------------------------------------------------

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }
}

/// Parses one token stream into `builder`.
pub fn parse<'a>(
    tokenizer: Box<dyn Tokenizer + 'a>,
    builder: &'a mut BuildContext,
    ignore_annotations: bool,
) -> Result<(), Error> {
    let mut parser = Parser::new(tokenizer, builder);
    parser.set_ignore_annotations(ignore_annotations);
    parser.parse()
}
