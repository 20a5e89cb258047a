use crate::{
    ast::ast::{Node, NodeId},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    decl::{
        is_function_declaration, parse_function_declaration, parse_qualified_name_image,
        parse_type_declaration,
    },
    expr::{parse_expr, parse_expr_list, parse_parenthesized_expr, parse_variable_expr},
    lookups::BindingPower,
    parser::Parser,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let kind = parser.current_token_kind();

    match kind {
        TokenKind::Function if is_function_declaration(parser) => {
            return parse_nested_function_stmt(parser)
        }
        TokenKind::Static if parser.peek_nth(1) == TokenKind::Variable => {
            return parse_static_stmt(parser)
        }
        TokenKind::Class
        | TokenKind::Interface
        | TokenKind::Trait
        | TokenKind::Abstract
        | TokenKind::Final
        | TokenKind::Readonly => return parse_nested_type_stmt(parser),
        TokenKind::Identifier if parser.peek_nth(1) == TokenKind::Colon => {
            return parse_label_stmt(parser)
        }
        _ => {}
    }

    if let Some(stmt_fn) = parser.get_stmt_lookup().get(&kind).copied() {
        return stmt_fn(parser);
    }

    parse_expression_stmt(parser)
}

/// Parses statements into `parent` until one of `terminators` is next. The
/// terminator itself is left in the stream.
pub fn parse_statement_list(
    parser: &mut Parser,
    parent: NodeId,
    terminators: &[TokenKind],
) -> Result<(), Error> {
    loop {
        let kind = parser.current_token_kind();
        if terminators.contains(&kind) {
            return Ok(());
        }
        if kind == TokenKind::EOF {
            return Err(parser.unclosed_body());
        }
        let stmt = parse_stmt(parser)?;
        parser.append(parent, stmt);
    }
}

/// `;`, or a close tag which ends a statement as well.
pub fn parse_statement_terminator(parser: &mut Parser) -> Result<(), Error> {
    match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseTag => {
            parser.advance();
            Ok(())
        }
        _ => Err(parser.unexpected()),
    }
}

fn parse_expression_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let node = parser.add_node(Node::statement(""));
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.append(node, expr);
    parse_statement_terminator(parser)?;
    Ok(parser.finish(node))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::OpenCurly)?;
    let node = parser.add_node(Node::scope_statement("{"));
    parse_statement_list(parser, node, &[TokenKind::CloseCurly])?;
    parser.expect(TokenKind::CloseCurly)?;
    Ok(parser.finish(node))
}

pub fn parse_empty_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let token = parser.advance();
    let node = parser.add_node(Node::statement(token.image));
    Ok(parser.finish(node))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::If)?;
    let node = parser.add_node(Node::if_statement("if"));

    let condition = parse_parenthesized_expr(parser)?;
    parser.append(node, condition);
    let body = parse_stmt(parser)?;
    parser.append(node, body);

    loop {
        match parser.current_token_kind() {
            TokenKind::ElseIf => {
                let branch = parse_else_if(parser, false)?;
                parser.append(node, branch);
            }
            TokenKind::Else if parser.peek_nth(1) == TokenKind::If => {
                let branch = parse_else_if(parser, true)?;
                parser.append(node, branch);
            }
            TokenKind::Else => {
                parser.advance();
                let otherwise = parse_stmt(parser)?;
                parser.append(node, otherwise);
                break;
            }
            _ => break,
        }
    }

    Ok(parser.finish(node))
}

fn parse_else_if(parser: &mut Parser, spaced: bool) -> Result<NodeId, Error> {
    parser.begin();
    let image = if spaced {
        parser.advance();
        parser.advance();
        "else if"
    } else {
        parser.advance();
        "elseif"
    };
    let node = parser.add_node(Node::else_if_statement(image));

    let condition = parse_parenthesized_expr(parser)?;
    parser.append(node, condition);
    let body = parse_stmt(parser)?;
    parser.append(node, body);

    Ok(parser.finish(node))
}

pub fn parse_for_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::For)?;
    parser.expect(TokenKind::OpenParen)?;
    let node = parser.add_node(Node::for_statement("for"));

    if parser.current_token_kind() != TokenKind::Semicolon {
        parser.begin();
        let init = parser.add_node(Node::for_init(""));
        parse_expr_list(parser, init)?;
        let init = parser.finish(init);
        parser.append(node, init);
    }
    parser.expect(TokenKind::Semicolon)?;

    if parser.current_token_kind() != TokenKind::Semicolon {
        parser.begin();
        let condition = parser.add_node(Node::expression(""));
        parse_expr_list(parser, condition)?;
        let condition = parser.finish(condition);
        parser.append(node, condition);
    }
    parser.expect(TokenKind::Semicolon)?;

    if parser.current_token_kind() != TokenKind::CloseParen {
        parser.begin();
        let update = parser.add_node(Node::for_update(""));
        parse_expr_list(parser, update)?;
        let update = parser.finish(update);
        parser.append(node, update);
    }
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_stmt(parser)?;
    parser.append(node, body);
    Ok(parser.finish(node))
}

pub fn parse_foreach_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Foreach)?;
    parser.expect(TokenKind::OpenParen)?;
    let node = parser.add_node(Node::foreach_statement("foreach"));

    let subject = parse_expr(parser, BindingPower::Default)?;
    parser.append(node, subject);
    parser.expect(TokenKind::As)?;

    let first = parse_expr(parser, BindingPower::Default)?;
    parser.append(node, first);
    if parser.current_token_kind() == TokenKind::DoubleArrow {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, value);
    }
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_stmt(parser)?;
    parser.append(node, body);
    Ok(parser.finish(node))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::While)?;
    let node = parser.add_node(Node::while_statement("while"));

    let condition = parse_parenthesized_expr(parser)?;
    parser.append(node, condition);
    let body = parse_stmt(parser)?;
    parser.append(node, body);
    Ok(parser.finish(node))
}

pub fn parse_do_while_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Do)?;
    let node = parser.add_node(Node::do_while_statement("do"));

    let body = parse_stmt(parser)?;
    parser.append(node, body);
    parser.expect(TokenKind::While)?;
    let condition = parse_parenthesized_expr(parser)?;
    parser.append(node, condition);
    parse_statement_terminator(parser)?;
    Ok(parser.finish(node))
}

pub fn parse_switch_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Switch)?;
    let node = parser.add_node(Node::switch_statement("switch"));

    let subject = parse_parenthesized_expr(parser)?;
    parser.append(node, subject);
    parser.expect(TokenKind::OpenCurly)?;

    loop {
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::Case | TokenKind::Default => {
                let label = parse_switch_label(parser)?;
                parser.append(node, label);
            }
            TokenKind::EOF => return Err(parser.unclosed_body()),
            _ => return Err(parser.unexpected()),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;
    Ok(parser.finish(node))
}

fn parse_switch_label(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let keyword = parser.advance();
    let node = parser.add_node(Node::switch_label(keyword.image.to_lowercase()));

    if keyword.kind == TokenKind::Case {
        let value = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, value);
    }
    match parser.current_token_kind() {
        TokenKind::Colon | TokenKind::Semicolon => {
            parser.advance();
        }
        _ => return Err(parser.unexpected()),
    }

    parse_statement_list(
        parser,
        node,
        &[TokenKind::Case, TokenKind::Default, TokenKind::CloseCurly],
    )?;
    Ok(parser.finish(node))
}

pub fn parse_try_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Try)?;
    let node = parser.add_node(Node::try_statement("try"));

    let body = parse_block_stmt(parser)?;
    parser.append(node, body);

    while parser.current_token_kind() == TokenKind::Catch {
        let catch = parse_catch(parser)?;
        parser.append(node, catch);
    }

    if parser.current_token_kind() == TokenKind::Finally {
        parser.begin();
        parser.advance();
        let finally = parser.add_node(Node::finally_statement("finally"));
        let body = parse_block_stmt(parser)?;
        parser.append(finally, body);
        let finally = parser.finish(finally);
        parser.append(node, finally);
    }

    Ok(parser.finish(node))
}

/// `catch (A | B $e) { ... }`; the variable is optional.
fn parse_catch(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Catch)?;
    parser.expect(TokenKind::OpenParen)?;
    let node = parser.add_node(Node::catch_statement("catch"));

    loop {
        parser.begin();
        let image = parse_qualified_name_image(parser)?;
        let name = parser.resolve_name(&image);
        let reference = parser.add_node(Node::class_or_interface_reference(name));
        let reference = parser.finish(reference);
        parser.append(node, reference);

        if parser.current_token_kind() != TokenKind::Pipe {
            break;
        }
        parser.advance();
    }

    if parser.current_token_kind() == TokenKind::Variable {
        let variable = parse_variable_expr(parser)?;
        parser.append(node, variable);
    }
    parser.expect(TokenKind::CloseParen)?;

    let body = parse_block_stmt(parser)?;
    parser.append(node, body);
    Ok(parser.finish(node))
}

pub fn parse_throw_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_keyword_stmt(parser, Node::throw_statement("throw"), true)
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_keyword_stmt(parser, Node::return_statement("return"), false)
}

/// `break` and `continue`, each with an optional level.
pub fn parse_break_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let node = match parser.current_token_kind() {
        TokenKind::Break => Node::break_statement("break"),
        _ => Node::continue_statement("continue"),
    };
    parse_keyword_stmt(parser, node, false)
}

/// Keyword, optional (or `required`) operand, terminator.
fn parse_keyword_stmt(parser: &mut Parser, node: Node, required: bool) -> Result<NodeId, Error> {
    parser.begin();
    parser.advance();
    let node = parser.add_node(node);

    let terminated = matches!(
        parser.current_token_kind(),
        TokenKind::Semicolon | TokenKind::CloseTag
    );
    if required || !terminated {
        let operand = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, operand);
    }

    parse_statement_terminator(parser)?;
    Ok(parser.finish(node))
}

pub fn parse_goto_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Goto)?;
    let label = parser.expect(TokenKind::Identifier)?;
    let node = parser.add_node(Node::goto_statement(label.image));
    parse_statement_terminator(parser)?;
    Ok(parser.finish(node))
}

fn parse_label_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let label = parser.expect(TokenKind::Identifier)?;
    parser.expect(TokenKind::Colon)?;
    let node = parser.add_node(Node::label_statement(label.image));
    Ok(parser.finish(node))
}

pub fn parse_global_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_list_stmt(parser, Node::global_statement("global"), false)
}

pub fn parse_echo_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    if parser.current_token_kind() == TokenKind::InlineHtml {
        parser.begin();
        let html = parser.advance();
        let node = parser.add_node(Node::echo_statement("?>"));
        let literal = parser.add_node(Node::literal(html.image));
        parser.append(node, literal);
        return Ok(parser.finish(node));
    }
    parse_list_stmt(parser, Node::echo_statement("echo"), false)
}

pub fn parse_unset_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_list_stmt(parser, Node::unset_statement("unset"), true)
}

/// Keyword followed by a comma separated expression list, optionally inside
/// parentheses.
fn parse_list_stmt(parser: &mut Parser, node: Node, parenthesized: bool) -> Result<NodeId, Error> {
    parser.begin();
    parser.advance();
    let node = parser.add_node(node);

    if parenthesized {
        parser.expect(TokenKind::OpenParen)?;
    }
    parse_expr_list(parser, node)?;
    if parenthesized {
        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        }
        parser.expect(TokenKind::CloseParen)?;
    }

    parse_statement_terminator(parser)?;
    Ok(parser.finish(node))
}

/// `declare(ticks=1);`, `declare(ticks=1) { ... }` or `declare(...) stmt`.
pub fn parse_declare_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Declare)?;
    parser.expect(TokenKind::OpenParen)?;
    let node = parser.add_node(Node::declare_statement("declare"));
    parse_expr_list(parser, node)?;
    parser.expect(TokenKind::CloseParen)?;

    match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseTag => parse_statement_terminator(parser)?,
        _ => {
            let body = parse_stmt(parser)?;
            parser.append(node, body);
        }
    }

    Ok(parser.finish(node))
}

/// `const A = 1, B = 2;` outside of a class body.
pub fn parse_const_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_list_stmt(parser, Node::statement("const"), false)
}

/// `static $a = 1, $b;` inside a function body.
fn parse_static_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Static)?;
    let node = parser.add_node(Node::static_variable_declaration("static"));

    loop {
        parser.begin();
        let variable = parser.expect(TokenKind::Variable)?;
        let declarator = parser.add_node(Node::variable_declarator(variable.image));
        if parser.current_token_kind() == TokenKind::Assignment {
            parser.advance();
            let value = parse_expr(parser, BindingPower::Default)?;
            parser.append(declarator, value);
        }
        let declarator = parser.finish(declarator);
        parser.append(node, declarator);

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parse_statement_terminator(parser)?;
    Ok(parser.finish(node))
}

/// A named function declared inside another body.
fn parse_nested_function_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let function = parse_function_declaration(parser)?;
    let name = parser.builder().callable(function).name.clone();
    let node = parser.add_node(Node::statement(name));
    Ok(parser.finish(node))
}

/// A class, interface or trait declared inside a body, usually conditionally.
fn parse_nested_type_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let declaration = parse_type_declaration(parser)?;
    let name = parser.type_decl(declaration).name.clone();
    let node = parser.add_node(Node::statement(name));
    Ok(parser.finish(node))
}
