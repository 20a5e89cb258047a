//! Declarations: namespaces, use aliases, types, their members and callables.

use tracing::trace;

use crate::{
    ast::{
        ast::{Node, NodeId},
        declarations::{
            CallableId, Constant, Modifiers, Parameter, Property, TypeId, TypeKind,
        },
    },
    builder::names::{extract_type_name, is_primitive_type, NAMESPACE_SEPARATOR},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    expr::parse_expr,
    lookups::BindingPower,
    parser::Parser,
    stmt::{parse_statement_list, parse_statement_terminator, parse_stmt},
};

pub fn parse_top_level(parser: &mut Parser) -> Result<(), Error> {
    match parser.current_token_kind() {
        TokenKind::Abstract
        | TokenKind::Final
        | TokenKind::Readonly
        | TokenKind::Class
        | TokenKind::Interface
        | TokenKind::Trait => {
            parse_type_declaration(parser)?;
        }
        TokenKind::Function if is_function_declaration(parser) => {
            parse_function_declaration(parser)?;
        }
        TokenKind::Namespace if parser.peek_nth(1) != TokenKind::Backslash => {
            parse_namespace_declaration(parser)?;
        }
        TokenKind::Use => parse_use_declaration(parser)?,
        _ => {
            parse_stmt(parser)?;
        }
    }
    Ok(())
}

/// `function name(` as opposed to a closure `function (`.
pub fn is_function_declaration(parser: &mut Parser) -> bool {
    match parser.peek_nth(1) {
        TokenKind::Ampersand => parser.peek_nth(2).is_name(),
        kind => kind.is_name(),
    }
}

// ---- names -------------------------------------------------------------------

/// A name as written in source, e.g. `\Foo\Bar` or `namespace\Baz`.
pub fn parse_qualified_name_image(parser: &mut Parser) -> Result<String, Error> {
    let mut image = String::new();
    if parser.current_token_kind() == TokenKind::Backslash {
        parser.advance();
        image.push(NAMESPACE_SEPARATOR);
    }
    image.push_str(&parser.expect_name()?.image);

    while parser.current_token_kind() == TokenKind::Backslash && parser.peek_nth(1).is_name() {
        parser.advance();
        image.push(NAMESPACE_SEPARATOR);
        image.push_str(&parser.advance().image);
    }

    Ok(image)
}

/// Parses a class or interface name and resolves it against the use aliases.
fn parse_type_name(parser: &mut Parser) -> Result<String, Error> {
    let image = parse_qualified_name_image(parser)?;
    Ok(parser.resolve_name(&image))
}

/// `[?]T[|U...]`. Class types are resolved and recorded as dependencies.
pub fn parse_type_hint(parser: &mut Parser) -> Result<String, Error> {
    let nullable = parser.current_token_kind() == TokenKind::Question;
    if nullable {
        parser.advance();
    }

    let mut parts = vec![parse_single_type_hint(parser)?];
    while parser.current_token_kind() == TokenKind::Pipe {
        parser.advance();
        parts.push(parse_single_type_hint(parser)?);
    }

    let image = parts.join("|");
    Ok(if nullable { format!("?{}", image) } else { image })
}

fn parse_single_type_hint(parser: &mut Parser) -> Result<String, Error> {
    match parser.current_token_kind() {
        TokenKind::Array | TokenKind::SelfRef | TokenKind::Parent | TokenKind::Static => {
            Ok(parser.advance().image.to_lowercase())
        }
        _ => {
            let image = parse_qualified_name_image(parser)?;
            if !image.contains(NAMESPACE_SEPARATOR) && is_primitive_type(&image) {
                return Ok(image.to_lowercase());
            }
            let name = parser.resolve_name(&image);
            parser.add_dependency(&name);
            Ok(name)
        }
    }
}

/// Flag for a member or parameter modifier keyword. `var` is `public`.
fn modifier_flag(kind: TokenKind) -> Modifiers {
    match kind {
        TokenKind::Abstract => Modifiers::ABSTRACT,
        TokenKind::Final => Modifiers::FINAL,
        TokenKind::Public | TokenKind::Var => Modifiers::PUBLIC,
        TokenKind::Protected => Modifiers::PROTECTED,
        TokenKind::Private => Modifiers::PRIVATE,
        TokenKind::Static => Modifiers::STATIC,
        TokenKind::Readonly => Modifiers::READONLY,
        _ => Modifiers::empty(),
    }
}

fn starts_type_hint(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Question
            | TokenKind::Identifier
            | TokenKind::Backslash
            | TokenKind::Namespace
            | TokenKind::Array
            | TokenKind::SelfRef
            | TokenKind::Parent
            | TokenKind::Static
    )
}

// ---- namespaces and use ------------------------------------------------------

/// `namespace A\B;`, `namespace A\B { ... }` and `namespace { ... }`.
fn parse_namespace_declaration(parser: &mut Parser) -> Result<(), Error> {
    parser.expect(TokenKind::Namespace)?;

    let name = match parser.current_token_kind() {
        TokenKind::OpenCurly => None,
        _ => {
            let image = parse_qualified_name_image(parser)?;
            Some(image.trim_start_matches(NAMESPACE_SEPARATOR).to_string())
        }
    };

    parser.use_symbols().reset_scope();
    parser.reset();
    trace!(target: "parser", namespace = ?name, "namespace declaration");

    match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseTag => {
            parser.advance();
            parser.set_namespace_name(name);
            Ok(())
        }
        TokenKind::OpenCurly => {
            parser.advance();
            parser.set_namespace_name(name);
            parser.use_symbols().create_scope();

            while parser.current_token_kind() != TokenKind::CloseCurly {
                if parser.current_token_kind() == TokenKind::EOF {
                    return Err(parser.unexpected());
                }
                parse_top_level(parser)?;
            }
            parser.advance();

            parser.use_symbols().destroy_scope();
            parser.set_namespace_name(None);
            Ok(())
        }
        _ => Err(parser.unexpected()),
    }
}

/// `use A\B [as C], D;` and the grouped `use A\{B, C as D};`.
///
/// Only class imports are bound. Function and constant imports live in
/// their own symbol space and never rewrite type names.
fn parse_use_declaration(parser: &mut Parser) -> Result<(), Error> {
    parser.expect(TokenKind::Use)?;
    let imports_types = !skip_use_kind(parser);

    loop {
        let image = parse_qualified_name_image(parser)?;

        if parser.current_token_kind() == TokenKind::Backslash
            && parser.peek_nth(1) == TokenKind::OpenCurly
        {
            parser.advance();
            parser.advance();
            while parser.current_token_kind() != TokenKind::CloseCurly {
                let member_is_type = !skip_use_kind(parser) && imports_types;
                let member = parse_qualified_name_image(parser)?;
                let full = format!("{}{}{}", image, NAMESPACE_SEPARATOR, member);
                parse_use_alias(parser, &full, member_is_type)?;
                if parser.current_token_kind() != TokenKind::Comma {
                    break;
                }
                parser.advance();
            }
            parser.expect(TokenKind::CloseCurly)?;
        } else {
            parse_use_alias(parser, &image, imports_types)?;
        }

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parse_statement_terminator(parser)
}

/// Consumes a `function` or `const` import marker.
fn skip_use_kind(parser: &mut Parser) -> bool {
    match parser.current_token_kind() {
        TokenKind::Function | TokenKind::Const => {
            parser.advance();
            true
        }
        _ => false,
    }
}

/// Reads the alias of one imported name and binds it when `bind` is set.
/// Targets are stored fully qualified.
fn parse_use_alias(parser: &mut Parser, image: &str, bind: bool) -> Result<(), Error> {
    let target = format!(
        "{}{}",
        NAMESPACE_SEPARATOR,
        image.trim_start_matches(NAMESPACE_SEPARATOR)
    );

    let alias = if parser.current_token_kind() == TokenKind::As {
        parser.advance();
        parser.expect_name()?.image
    } else {
        extract_type_name(image).to_string()
    };

    if bind {
        trace!(target: "parser", alias = %alias, target = %target, "use alias");
        parser.use_symbols().add(&alias, target);
    }
    Ok(())
}

// ---- types -------------------------------------------------------------------

/// `[abstract|final|readonly] class|interface|trait Name [extends ...] [implements ...] { ... }`
pub fn parse_type_declaration(parser: &mut Parser) -> Result<TypeId, Error> {
    while let kind @ (TokenKind::Abstract | TokenKind::Final | TokenKind::Readonly) =
        parser.current_token_kind()
    {
        parser.advance();
        parser.add_modifier(modifier_flag(kind));
    }

    let keyword = parser.advance();
    let kind = match keyword.kind {
        TokenKind::Class => TypeKind::Class,
        TokenKind::Interface => TypeKind::Interface,
        TokenKind::Trait => TypeKind::Trait,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: keyword.image,
                },
                keyword.span.start,
            ))
        }
    };

    let name = parser.expect_name()?;
    let qualified_name = parser.qualify_declaration(&name.image);
    let modifiers = parser.take_modifiers();
    let doc_comment = parser.take_doc_comment();
    let source_file = parser.source_file();

    let id = match kind {
        TypeKind::Interface => parser.builder().build_interface(&qualified_name),
        TypeKind::Trait => parser.builder().build_trait(&qualified_name),
        _ => parser.builder().build_class(&qualified_name),
    };
    {
        let declaration = parser.builder().type_decl_mut(id);
        declaration.modifiers = modifiers;
        declaration.doc_comment = doc_comment;
        declaration.source_file = Some(source_file);
        declaration.start_line = keyword.start_line();
    }

    let outer_type = parser.set_current_type(Some(id));
    let outer_callable = parser.set_current_callable(None);

    if parser.current_token_kind() == TokenKind::Extends {
        parser.advance();
        loop {
            let parent = parse_type_name(parser)?;
            parser.add_dependency(&parent);
            let declaration = parser.builder().type_decl_mut(id);
            match kind {
                TypeKind::Interface => declaration.interfaces.push(parent),
                _ => declaration.parent_class = Some(parent),
            }

            if kind != TypeKind::Interface || parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    if parser.current_token_kind() == TokenKind::Implements {
        parser.advance();
        loop {
            let interface = parse_type_name(parser)?;
            parser.add_dependency(&interface);
            parser.builder().type_decl_mut(id).interfaces.push(interface);

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
    }

    let end_line = parse_type_body(parser, id)?;
    parser.builder().type_decl_mut(id).end_line = end_line;

    parser.set_current_type(outer_type);
    parser.set_current_callable(outer_callable);
    parser.reset();

    trace!(
        target: "parser",
        name = %qualified_name,
        kind = kind.label(),
        "type declaration"
    );
    Ok(id)
}

/// Members up to the closing brace. Modifiers and doc comments are consumed
/// by the member they precede. Returns the line of the closing brace.
fn parse_type_body(parser: &mut Parser, id: TypeId) -> Result<u32, Error> {
    parser.expect(TokenKind::OpenCurly)?;
    parser.take_modifiers();
    parser.take_doc_comment();

    loop {
        match parser.current_token_kind() {
            TokenKind::EOF => return Err(parser.unclosed_body()),
            TokenKind::CloseCurly => return Ok(parser.advance().end_line()),
            kind if kind.is_modifier() => {
                parser.advance();
                parser.add_modifier(modifier_flag(kind));
            }
            TokenKind::Function => {
                parse_method(parser, id)?;
            }
            TokenKind::Variable => parse_property_declaration(parser, id, None)?,
            TokenKind::Const => parse_class_constants(parser, id)?,
            TokenKind::Use => parse_trait_use(parser, id)?,
            TokenKind::Semicolon => {
                parser.advance();
            }
            kind if starts_type_hint(kind) => {
                let type_hint = parse_type_hint(parser)?;
                parse_property_declaration(parser, id, Some(type_hint))?;
            }
            _ => return Err(parser.unexpected()),
        }
    }
}

/// `$a [= expr], $b;` sharing the pending modifiers and doc comment.
fn parse_property_declaration(
    parser: &mut Parser,
    owner: TypeId,
    type_hint: Option<String>,
) -> Result<(), Error> {
    let mut modifiers = parser.take_modifiers();
    if !modifiers.intersects(Modifiers::VISIBILITY) {
        modifiers |= Modifiers::PUBLIC;
    }
    let doc_comment = parser.take_doc_comment();

    loop {
        let variable = parser.expect(TokenKind::Variable)?;
        let default_value = if parser.current_token_kind() == TokenKind::Assignment {
            parser.advance();
            Some(parse_expr(parser, BindingPower::Default)?)
        } else {
            None
        };

        parser.builder().type_decl_mut(owner).properties.push(Property {
            name: variable.image.clone(),
            modifiers,
            type_hint: type_hint.clone(),
            doc_comment: doc_comment.clone(),
            default_value,
            line: variable.start_line(),
        });

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parse_statement_terminator(parser)
}

/// `const A = 1, B = 2;` inside a type body.
fn parse_class_constants(parser: &mut Parser, owner: TypeId) -> Result<(), Error> {
    parser.take_modifiers();
    parser.take_doc_comment();
    parser.expect(TokenKind::Const)?;

    loop {
        let name = parser.expect_name()?;
        parser.expect(TokenKind::Assignment)?;
        let value = parse_expr(parser, BindingPower::Default)?;

        parser.builder().type_decl_mut(owner).constants.push(Constant {
            name: name.image.clone(),
            value: Some(value),
            line: name.start_line(),
        });

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parse_statement_terminator(parser)
}

/// `use A, B;` or `use A, B { ... }` inside a type body. The adaptation block
/// is skipped by brace counting.
fn parse_trait_use(parser: &mut Parser, owner: TypeId) -> Result<(), Error> {
    parser.take_modifiers();
    parser.take_doc_comment();
    parser.expect(TokenKind::Use)?;

    loop {
        let name = parse_type_name(parser)?;
        parser.builder().type_decl_mut(owner).traits.push(name);

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    match parser.current_token_kind() {
        TokenKind::OpenCurly => {
            parser.advance();
            let mut depth = 1;
            while depth > 0 {
                match parser.current_token_kind() {
                    TokenKind::EOF => return Err(parser.unclosed_body()),
                    TokenKind::OpenCurly => depth += 1,
                    TokenKind::CloseCurly => depth -= 1,
                    _ => {}
                }
                parser.advance();
            }
            Ok(())
        }
        _ => parse_statement_terminator(parser),
    }
}

// ---- callables ---------------------------------------------------------------

fn parse_method(parser: &mut Parser, owner: TypeId) -> Result<CallableId, Error> {
    let mut modifiers = parser.take_modifiers();
    let doc_comment = parser.take_doc_comment();

    let keyword = parser.expect(TokenKind::Function)?;
    let returns_reference = parser.current_token_kind() == TokenKind::Ampersand;
    if returns_reference {
        parser.advance();
    }
    let name = parser.expect_name()?;

    if parser.type_decl(owner).kind == TypeKind::Interface {
        modifiers |= Modifiers::ABSTRACT;
    }
    if !modifiers.intersects(Modifiers::VISIBILITY) {
        modifiers |= Modifiers::PUBLIC;
    }

    let source_file = parser.source_file();
    let id = parser.builder().build_method(&name.image);
    parser.builder().add_method(owner, id);
    {
        let method = parser.builder().callable_mut(id);
        method.modifiers = modifiers;
        method.doc_comment = doc_comment;
        method.returns_reference = returns_reference;
        method.source_file = Some(source_file);
        method.start_line = keyword.start_line();
    }

    parse_callable(parser, id, &name.image)?;
    Ok(id)
}

/// `function [&] name(...) [: type] { ... }` outside of a type body.
pub fn parse_function_declaration(parser: &mut Parser) -> Result<CallableId, Error> {
    let doc_comment = parser.take_doc_comment();
    parser.take_modifiers();

    let keyword = parser.expect(TokenKind::Function)?;
    let returns_reference = parser.current_token_kind() == TokenKind::Ampersand;
    if returns_reference {
        parser.advance();
    }
    let name = parser.expect_name()?;

    let qualified_name = parser.qualify_declaration(&name.image);
    let source_file = parser.source_file();
    let id = parser.builder().build_function(&qualified_name);
    {
        let function = parser.builder().callable_mut(id);
        function.doc_comment = doc_comment;
        function.returns_reference = returns_reference;
        function.source_file = Some(source_file);
        function.start_line = keyword.start_line();
    }

    parse_callable(parser, id, &name.image)?;
    parser.reset();

    trace!(target: "parser", name = %qualified_name, "function declaration");
    Ok(id)
}

/// Signature, optional return type and optional body of a callable.
fn parse_callable(parser: &mut Parser, id: CallableId, name: &str) -> Result<(), Error> {
    let outer = parser.set_current_callable(Some(id));

    let (parameters, _) = parse_formal_parameters(parser, name)?;
    parser.builder().callable_mut(id).parameters = parameters;

    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        let return_type = parse_type_hint(parser)?;
        parser.builder().callable_mut(id).return_type = Some(return_type);
    }

    let (body, end_line) = match parser.current_token_kind() {
        TokenKind::OpenCurly => {
            let body = parse_callable_body(parser, id)?;
            let end_line = parser.builder().node_end_line(body).unwrap_or_default();
            (Some(body), end_line)
        }
        TokenKind::Semicolon => (None, parser.advance().end_line()),
        _ => return Err(parser.unexpected()),
    };

    let callable = parser.builder().callable_mut(id);
    callable.body = body;
    callable.end_line = end_line;

    parser.set_current_callable(outer);
    Ok(())
}

/// The braced body. The tokens between the braces are stored for the callable.
fn parse_callable_body(parser: &mut Parser, id: CallableId) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::OpenCurly)?;
    let node = parser.add_node(Node::scope_statement("{"));

    parser.push_frame();
    parse_statement_list(parser, node, &[TokenKind::CloseCurly])?;
    let tokens = parser.pop_frame();
    parser.builder().store_callable_tokens(id, tokens);

    parser.expect(TokenKind::CloseCurly)?;
    Ok(parser.finish(node))
}

/// `( [param {, param}] )`. A list that reaches `{`, `;` or the end of the
/// stream before its closing parenthesis is an invalid signature.
pub fn parse_formal_parameters(
    parser: &mut Parser,
    name: &str,
) -> Result<(Vec<Parameter>, NodeId), Error> {
    parser.begin();
    if parser.current_token_kind() != TokenKind::OpenParen {
        return Err(invalid_signature(parser, name));
    }
    parser.advance();
    let node = parser.add_node(Node::formal_parameters("("));

    let mut parameters = Vec::new();
    loop {
        match parser.current_token_kind() {
            TokenKind::CloseParen => {
                parser.advance();
                break;
            }
            TokenKind::EOF | TokenKind::OpenCurly | TokenKind::Semicolon => {
                return Err(invalid_signature(parser, name));
            }
            TokenKind::Comma => {
                parser.advance();
            }
            _ => {
                let (parameter, parameter_node) = parse_formal_parameter(parser)?;
                parser.append(node, parameter_node);
                parameters.push(parameter);
            }
        }
    }

    Ok((parameters, parser.finish(node)))
}

fn invalid_signature(parser: &mut Parser, name: &str) -> Error {
    let token = parser.advance();
    Error::new(
        ErrorImpl::InvalidFunctionSignature {
            name: name.to_string(),
        },
        token.span.start,
    )
}

/// `[modifiers] [type] [&] [...] $name [= default]`.
///
/// A parameter with visibility or `readonly` modifiers is a promoted
/// constructor parameter and also declares a property on the current type.
fn parse_formal_parameter(parser: &mut Parser) -> Result<(Parameter, NodeId), Error> {
    parser.begin();

    let mut modifiers = Modifiers::empty();
    while let kind @ (TokenKind::Public
    | TokenKind::Protected
    | TokenKind::Private
    | TokenKind::Readonly) = parser.current_token_kind()
    {
        parser.advance();
        modifiers |= modifier_flag(kind);
    }

    let type_hint = if starts_type_hint(parser.current_token_kind()) {
        parser.begin();
        let hint = parse_type_hint(parser)?;
        let bare = hint.trim_start_matches('?');
        let reference = if bare == "array" || (!bare.contains('|') && is_primitive_type(bare)) {
            Node::primitive_type(hint.clone())
        } else {
            Node::class_or_interface_reference(hint.clone())
        };
        let reference = parser.add_node(reference);
        Some((hint, parser.finish(reference)))
    } else {
        None
    };

    let by_reference = parser.current_token_kind() == TokenKind::Ampersand;
    if by_reference {
        parser.advance();
    }
    let variadic = parser.current_token_kind() == TokenKind::Ellipsis;
    if variadic {
        parser.advance();
    }

    let variable = parser.expect(TokenKind::Variable)?;
    let node = parser.add_node(Node::formal_parameter(variable.image.clone()));
    if let Some((_, reference)) = &type_hint {
        parser.append(node, *reference);
    }

    let default_value = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, value);
        Some(value)
    } else {
        None
    };

    let type_hint = type_hint.map(|(hint, _)| hint);
    let promoted_into = parser.current_type().filter(|_| !modifiers.is_empty());
    if let Some(owner) = promoted_into {
        let mut property_modifiers = modifiers;
        if !property_modifiers.intersects(Modifiers::VISIBILITY) {
            property_modifiers |= Modifiers::PUBLIC;
        }
        parser.builder().type_decl_mut(owner).properties.push(Property {
            name: variable.image.clone(),
            modifiers: property_modifiers,
            type_hint: type_hint.clone(),
            doc_comment: None,
            default_value: None,
            line: variable.start_line(),
        });
    }

    let parameter = Parameter {
        name: variable.image,
        type_hint,
        by_reference,
        variadic,
        default_value,
        modifiers,
    };
    Ok((parameter, parser.finish(node)))
}
