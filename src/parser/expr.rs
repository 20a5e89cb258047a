use crate::{
    ast::ast::{Node, NodeId, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{
    decl::{parse_formal_parameters, parse_qualified_name_image, parse_type_hint},
    lookups::BindingPower,
    parser::Parser,
    stmt::parse_block_stmt,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    let kind = parser.current_token_kind();
    let nud_fn = match parser.get_nud_lookup().get(&kind) {
        Some(nud_fn) => *nud_fn,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud_fn(parser)?;

    loop {
        let kind = parser.current_token_kind();
        let power = match parser.get_bp_lookup().get(&kind) {
            Some(power) if *power > bp => *power,
            _ => break,
        };
        let led_fn = match parser.get_led_lookup().get(&kind) {
            Some(led_fn) => *led_fn,
            None => break,
        };
        left = led_fn(parser, left, power)?;
    }

    Ok(left)
}

/// Comma separated expressions appended to `parent`.
pub fn parse_expr_list(parser: &mut Parser, parent: NodeId) -> Result<(), Error> {
    loop {
        let expr = parse_expr(parser, BindingPower::Default)?;
        parser.append(parent, expr);
        if parser.current_token_kind() != TokenKind::Comma {
            return Ok(());
        }
        parser.advance();
    }
}

/// `( expr )`, as used by conditions.
pub fn parse_parenthesized_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;
    Ok(expr)
}

pub fn parse_arguments(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::OpenParen)?;
    let node = parser.add_node(Node::arguments("("));

    while parser.current_token_kind() != TokenKind::CloseParen {
        let argument = if parser.current_token_kind() == TokenKind::Ellipsis {
            parser.begin();
            parser.advance();
            let spread = parser.add_node(Node::unary_expression("..."));
            if parser.current_token_kind() != TokenKind::CloseParen {
                let operand = parse_expr(parser, BindingPower::Default)?;
                parser.append(spread, operand);
            }
            parser.finish(spread)
        } else {
            parse_expr(parser, BindingPower::Default)?
        };
        parser.append(node, argument);

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(parser.finish(node))
}

// ---- primaries ---------------------------------------------------------------

pub fn parse_variable_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let token = parser.expect(TokenKind::Variable)?;
    let node = parser.add_node(Node::variable(token.image));
    Ok(parser.finish(node))
}

/// `$$name` and `${expr}`.
pub fn parse_variable_variable_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Dollar)?;

    let node = match parser.current_token_kind() {
        TokenKind::OpenCurly => {
            parser.advance();
            let node = parser.add_node(Node::compound_variable("$"));
            let inner = parse_expr(parser, BindingPower::Default)?;
            parser.append(node, inner);
            parser.expect(TokenKind::CloseCurly)?;
            node
        }
        TokenKind::Variable => {
            let node = parser.add_node(Node::variable_variable("$"));
            let inner = parse_variable_expr(parser)?;
            parser.append(node, inner);
            node
        }
        TokenKind::Dollar => {
            let node = parser.add_node(Node::variable_variable("$"));
            let inner = parse_variable_variable_expr(parser)?;
            parser.append(node, inner);
            node
        }
        _ => return Err(parser.unexpected()),
    };

    Ok(parser.finish(node))
}

pub fn parse_literal_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let token = parser.advance();
    let node = parser.add_node(Node::literal(token.image));
    Ok(parser.finish(node))
}

/// A name in expression position: a class reference before `::`, a function
/// call before `(`, a constant otherwise.
pub fn parse_name_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let image = parse_qualified_name_image(parser)?;

    let node = match parser.current_token_kind() {
        TokenKind::DoubleColon => {
            let name = parser.resolve_name(&image);
            parser.add_node(Node::class_or_interface_reference(name))
        }
        TokenKind::OpenParen => {
            let node = parser.add_node(Node::function_postfix(image));
            let arguments = parse_arguments(parser)?;
            parser.append(node, arguments);
            node
        }
        _ => parser.add_node(Node::constant(image)),
    };

    Ok(parser.finish(node))
}

/// `self`, `parent` or `static` used as a class reference.
pub fn parse_class_keyword_reference(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let token = parser.advance();
    let current = parser.current_type();

    let node = match token.kind {
        TokenKind::SelfRef => Node::self_reference(token.image).with_target(current),
        TokenKind::Static => Node::static_reference(token.image).with_target(current),
        TokenKind::Parent => {
            let parent = current.and_then(|owner| {
                parser.type_decl(owner).parent_class.clone()
            });
            Node::parent_reference(parent.unwrap_or(token.image))
        }
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.image },
                token.span.start,
            ))
        }
    };

    let node = parser.add_node(node);
    Ok(parser.finish(node))
}

pub fn parse_class_keyword_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    if parser.current_token_kind() == TokenKind::Static {
        match parser.peek_nth(1) {
            TokenKind::Function => return parse_closure_expr(parser),
            TokenKind::Fn => return parse_arrow_function_expr(parser),
            _ => {}
        }
    }
    parse_class_keyword_reference(parser)
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_parenthesized_expr(parser)
}

/// `array(...)` and `[...]`.
pub fn parse_array_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let close = if parser.current_token_kind() == TokenKind::Array {
        parser.advance();
        parser.expect(TokenKind::OpenParen)?;
        TokenKind::CloseParen
    } else {
        parser.expect(TokenKind::OpenBracket)?;
        TokenKind::CloseBracket
    };

    let node = parser.add_node(Node::array("array"));
    parse_array_elements(parser, node, close)?;
    parser.expect(close)?;
    Ok(parser.finish(node))
}

/// `list(...)`.
pub fn parse_list_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::List)?;
    parser.expect(TokenKind::OpenParen)?;

    let node = parser.add_node(Node::list_expression("list"));
    parse_array_elements(parser, node, TokenKind::CloseParen)?;
    parser.expect(TokenKind::CloseParen)?;
    Ok(parser.finish(node))
}

fn parse_array_elements(parser: &mut Parser, node: NodeId, close: TokenKind) -> Result<(), Error> {
    loop {
        match parser.current_token_kind() {
            kind if kind == close => return Ok(()),
            TokenKind::Comma => {
                parser.advance();
            }
            _ => {
                let element = parse_array_element(parser)?;
                parser.append(node, element);
                if parser.current_token_kind() != TokenKind::Comma {
                    return Ok(());
                }
                parser.advance();
            }
        }
    }
}

fn parse_array_element(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let image = if parser.current_token_kind() == TokenKind::Ellipsis {
        parser.advance();
        "..."
    } else {
        ""
    };
    let node = parser.add_node(Node::array_element(image));

    let first = parse_expr(parser, BindingPower::Default)?;
    parser.append(node, first);

    if parser.current_token_kind() == TokenKind::DoubleArrow {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, value);
    }

    Ok(parser.finish(node))
}

/// `[static] function [&] (...) [use (...)] [: type] { ... }`.
///
/// Dependencies found in a closure belong to the enclosing callable.
pub fn parse_closure_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let mut image = String::from("function");
    if parser.current_token_kind() == TokenKind::Static {
        parser.advance();
        image = String::from("static function");
    }
    parser.expect(TokenKind::Function)?;
    if parser.current_token_kind() == TokenKind::Ampersand {
        parser.advance();
    }

    let node = parser.add_node(Node::closure(image));
    let (_, parameters) = parse_formal_parameters(parser, "{closure}")?;
    parser.append(node, parameters);

    if parser.current_token_kind() == TokenKind::Use {
        parser.advance();
        parser.expect(TokenKind::OpenParen)?;
        while parser.current_token_kind() != TokenKind::CloseParen {
            let by_reference = parser.current_token_kind() == TokenKind::Ampersand;
            parser.begin();
            if by_reference {
                parser.advance();
            }
            let token = parser.expect(TokenKind::Variable)?;
            let image = if by_reference {
                format!("&{}", token.image)
            } else {
                token.image
            };
            let variable = parser.add_node(Node::variable(image));
            let variable = parser.finish(variable);
            parser.append(node, variable);

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }
        parser.expect(TokenKind::CloseParen)?;
    }

    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        parse_type_hint(parser)?;
    }

    let body = parse_block_stmt(parser)?;
    parser.append(node, body);
    Ok(parser.finish(node))
}

/// `[static] fn [&] (...) [: type] => expr`. Like closures, its dependencies
/// belong to the enclosing callable.
pub fn parse_arrow_function_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let mut image = String::from("fn");
    if parser.current_token_kind() == TokenKind::Static {
        parser.advance();
        image = String::from("static fn");
    }
    parser.expect(TokenKind::Fn)?;
    if parser.current_token_kind() == TokenKind::Ampersand {
        parser.advance();
    }

    let node = parser.add_node(Node::arrow_function(image));
    let (_, parameters) = parse_formal_parameters(parser, "{closure}")?;
    parser.append(node, parameters);

    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        parse_type_hint(parser)?;
    }

    parser.expect(TokenKind::DoubleArrow)?;
    let body = parse_expr(parser, BindingPower::Default)?;
    parser.append(node, body);
    Ok(parser.finish(node))
}

/// `match (subject) { a, b => x, default => y }`.
pub fn parse_match_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Match)?;
    let node = parser.add_node(Node::match_expression("match"));
    let subject = parse_parenthesized_expr(parser)?;
    parser.append(node, subject);

    parser.expect(TokenKind::OpenCurly)?;
    while parser.current_token_kind() != TokenKind::CloseCurly {
        let arm = parse_match_arm(parser)?;
        parser.append(node, arm);
        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }
    parser.expect(TokenKind::CloseCurly)?;
    Ok(parser.finish(node))
}

/// Conditions, or `default`, then `=>` and the arm's result.
fn parse_match_arm(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let node = if parser.current_token_kind() == TokenKind::Default {
        parser.advance();
        parser.add_node(Node::match_arm("default"))
    } else {
        let node = parser.add_node(Node::match_arm("=>"));
        loop {
            let condition = parse_expr(parser, BindingPower::Default)?;
            parser.append(node, condition);
            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
            if parser.current_token_kind() == TokenKind::DoubleArrow {
                break;
            }
        }
        node
    };

    parser.expect(TokenKind::DoubleArrow)?;
    let result = parse_expr(parser, BindingPower::Default)?;
    parser.append(node, result);
    Ok(parser.finish(node))
}

// ---- prefix operators ----------------------------------------------------------

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let operator = parser.advance();
    let node = parser.add_node(Node::unary_expression(operator.image));

    // `!` binds looser than `instanceof` but tighter than arithmetic.
    let power = match operator.kind {
        TokenKind::Not => BindingPower::Multiplicative,
        _ => BindingPower::Unary,
    };
    let operand = parse_expr(parser, power)?;
    parser.append(node, operand);
    Ok(parser.finish(node))
}

pub fn parse_cast_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let cast = parser.expect(TokenKind::Cast)?;
    let node = parser.add_node(Node::cast_expression(cast.image.to_lowercase()));
    let operand = parse_expr(parser, BindingPower::Unary)?;
    parser.append(node, operand);
    Ok(parser.finish(node))
}

pub fn parse_pre_increment_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let operator = parser.advance();
    let node = match operator.kind {
        TokenKind::PlusPlus => Node::pre_increment_expression(operator.image),
        _ => Node::pre_decrement_expression(operator.image),
    };
    let node = parser.add_node(node);
    let operand = parse_expr(parser, BindingPower::Unary)?;
    parser.append(node, operand);
    Ok(parser.finish(node))
}

// ---- keyword expressions -------------------------------------------------------

/// `new Class(...)`. Named classes are recorded as dependencies of the
/// enclosing callable; instantiations through a variable are not.
pub fn parse_allocation_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::New)?;
    let node = parser.add_node(Node::allocation_expression("new"));

    let class = match parser.current_token_kind() {
        TokenKind::Identifier | TokenKind::Backslash | TokenKind::Namespace => {
            parser.begin();
            let image = parse_qualified_name_image(parser)?;
            let name = parser.resolve_name(&image);
            parser.add_dependency(&name);
            let reference = parser.add_node(Node::class_or_interface_reference(name));
            parser.finish(reference)
        }
        TokenKind::SelfRef | TokenKind::Parent | TokenKind::Static => {
            parse_class_keyword_reference(parser)?
        }
        TokenKind::Variable | TokenKind::Dollar => parse_dynamic_class_name(parser)?,
        _ => return Err(parser.unexpected()),
    };
    parser.append(node, class);

    if parser.current_token_kind() == TokenKind::OpenParen {
        let arguments = parse_arguments(parser)?;
        parser.append(node, arguments);
    }

    Ok(parser.finish(node))
}

/// Variable class name after `new`: `$class`, `$this->class`, `$map['key']`.
fn parse_dynamic_class_name(parser: &mut Parser) -> Result<NodeId, Error> {
    let mut target = match parser.current_token_kind() {
        TokenKind::Dollar => parse_variable_variable_expr(parser)?,
        _ => parse_variable_expr(parser)?,
    };

    loop {
        match parser.current_token_kind() {
            TokenKind::Arrow | TokenKind::NullsafeArrow | TokenKind::DoubleColon => {
                parser.begin();
                let operator = parser.advance();
                let node = parser.add_node(Node::member_primary_prefix(operator.image));
                parser.append(node, target);

                parser.begin();
                let name = match parser.current_token_kind() {
                    TokenKind::Variable => parser.advance(),
                    _ => parser.expect_name()?,
                };
                let postfix = parser.add_node(Node::property_postfix(name.image));
                let postfix = parser.finish(postfix);
                parser.append(node, postfix);

                target = parser.finish_infix(node, target);
            }
            TokenKind::OpenBracket => {
                target = parse_index_expr(parser, target, BindingPower::Member)?;
            }
            _ => return Ok(target),
        }
    }
}

pub fn parse_clone_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_keyword_operand(parser, Node::clone_expression("clone"), BindingPower::Unary)
}

pub fn parse_print_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_keyword_operand(parser, Node::print_expression("print"), BindingPower::Assignment)
}

pub fn parse_include_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let node = match parser.current_token_kind() {
        TokenKind::Include | TokenKind::IncludeOnce => Node::include_expression(""),
        _ => Node::require_expression(""),
    };
    parse_keyword_operand(parser, node, BindingPower::Default)
}

/// Keyword followed by a single operand; the node image becomes the keyword.
fn parse_keyword_operand(
    parser: &mut Parser,
    mut node: Node,
    power: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    let keyword = parser.advance();
    node.image = keyword.image.to_lowercase();
    let node = parser.add_node(node);

    let operand = parse_expr(parser, power)?;
    parser.append(node, operand);
    Ok(parser.finish(node))
}

/// `yield`, `yield value`, `yield key => value` and `yield from expr`.
pub fn parse_yield_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    let keyword = parser.advance();
    let delegates = keyword.kind == TokenKind::YieldFrom;
    let image = if delegates { "yield from" } else { "yield" };
    let node = parser.add_node(Node::yield_expression(image));

    let bare = matches!(
        parser.current_token_kind(),
        TokenKind::Semicolon
            | TokenKind::CloseParen
            | TokenKind::CloseBracket
            | TokenKind::Comma
            | TokenKind::CloseTag
    );
    if delegates || !bare {
        let value = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, value);

        if !delegates && parser.current_token_kind() == TokenKind::DoubleArrow {
            parser.advance();
            let value = parse_expr(parser, BindingPower::Default)?;
            parser.append(node, value);
        }
    }

    Ok(parser.finish(node))
}

pub fn parse_isset_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Isset)?;
    parser.expect(TokenKind::OpenParen)?;
    let node = parser.add_node(Node::isset_expression("isset"));
    parse_expr_list(parser, node)?;
    if parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
    }
    parser.expect(TokenKind::CloseParen)?;
    Ok(parser.finish(node))
}

pub fn parse_empty_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_call_like(parser, Node::empty_expression("empty"), true)
}

pub fn parse_eval_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_call_like(parser, Node::eval_expression("eval"), true)
}

/// `exit`, `exit()`, `exit(expr)` and the `die` spellings.
pub fn parse_exit_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    if parser.peek_nth(1) != TokenKind::OpenParen {
        parser.begin();
        let keyword = parser.advance();
        let node = parser.add_node(Node::exit_expression(keyword.image.to_lowercase()));
        return Ok(parser.finish(node));
    }
    parse_call_like(parser, Node::exit_expression("exit"), false)
}

/// Keyword with a parenthesized operand, optional unless `required`.
fn parse_call_like(parser: &mut Parser, mut node: Node, required: bool) -> Result<NodeId, Error> {
    parser.begin();
    let keyword = parser.advance();
    node.image = keyword.image.to_lowercase();
    let node = parser.add_node(node);

    parser.expect(TokenKind::OpenParen)?;
    if required || parser.current_token_kind() != TokenKind::CloseParen {
        let operand = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, operand);
    }
    parser.expect(TokenKind::CloseParen)?;
    Ok(parser.finish(node))
}

// ---- infix and postfix ---------------------------------------------------------

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: NodeId,
    bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    let operator = parser.advance();

    let node = match operator.kind {
        TokenKind::BooleanAnd => Node::boolean_and_expression(operator.image),
        TokenKind::BooleanOr => Node::boolean_or_expression(operator.image),
        TokenKind::LogicalAnd => Node::logical_and_expression(operator.image),
        TokenKind::LogicalOr => Node::logical_or_expression(operator.image),
        TokenKind::LogicalXor => Node::logical_xor_expression(operator.image),
        _ => Node::expression(operator.image),
    };
    let node = parser.add_node(node);
    parser.append(node, left);

    let power = match operator.kind {
        TokenKind::Pow | TokenKind::Coalesce => bp.lower(),
        _ => bp,
    };
    let right = parse_expr(parser, power)?;
    parser.append(node, right);

    Ok(parser.finish_infix(node, left))
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: NodeId,
    bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    let operator = parser.advance();

    let mut image = operator.image;
    if operator.kind == TokenKind::Assignment
        && parser.current_token_kind() == TokenKind::Ampersand
    {
        parser.advance();
        image.push('&');
    }

    let node = parser.add_node(Node::assignment_expression(image));
    parser.append(node, left);
    let right = parse_expr(parser, bp.lower())?;
    parser.append(node, right);

    Ok(parser.finish_infix(node, left))
}

/// `cond ? a : b` and the short `cond ?: b`.
pub fn parse_conditional_expr(
    parser: &mut Parser,
    left: NodeId,
    bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::Question)?;
    let node = parser.add_node(Node::conditional_expression("?"));
    parser.append(node, left);

    if parser.current_token_kind() != TokenKind::Colon {
        let then = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, then);
    }
    parser.expect(TokenKind::Colon)?;
    let otherwise = parse_expr(parser, bp)?;
    parser.append(node, otherwise);

    Ok(parser.finish_infix(node, left))
}

pub fn parse_instanceof_expr(
    parser: &mut Parser,
    left: NodeId,
    bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    let operator = parser.expect(TokenKind::Instanceof)?;
    let node = parser.add_node(Node::instance_of_expression(operator.image));
    parser.append(node, left);

    let right = match parser.current_token_kind() {
        TokenKind::Identifier | TokenKind::Backslash | TokenKind::Namespace => {
            parser.begin();
            let image = parse_qualified_name_image(parser)?;
            let name = parser.resolve_name(&image);
            let reference = parser.add_node(Node::class_or_interface_reference(name));
            parser.finish(reference)
        }
        TokenKind::SelfRef | TokenKind::Parent | TokenKind::Static => {
            parse_class_keyword_reference(parser)?
        }
        _ => parse_expr(parser, bp)?,
    };
    parser.append(node, right);

    Ok(parser.finish_infix(node, left))
}

pub fn parse_postfix_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    let operator = parser.advance();
    let node = parser.add_node(Node::postfix_expression(operator.image));
    parser.append(node, left);
    Ok(parser.finish_infix(node, left))
}

/// `->` and `?->` member access.
pub fn parse_member_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    let operator = parser.advance();
    let node = parser.add_node(Node::member_primary_prefix(operator.image));
    parser.append(node, left);

    parser.begin();
    let (image, inner) = match parser.current_token_kind() {
        TokenKind::Variable => (parser.advance().image, None),
        TokenKind::OpenCurly => {
            parser.advance();
            let inner = parse_expr(parser, BindingPower::Default)?;
            parser.expect(TokenKind::CloseCurly)?;
            (String::from("{}"), Some(inner))
        }
        kind if kind.is_name() => (parser.advance().image, None),
        _ => return Err(parser.unexpected()),
    };

    let postfix = if parser.current_token_kind() == TokenKind::OpenParen {
        let postfix = parser.add_node(Node::method_postfix(image));
        if let Some(inner) = inner {
            parser.append(postfix, inner);
        }
        let arguments = parse_arguments(parser)?;
        parser.append(postfix, arguments);
        postfix
    } else {
        let postfix = parser.add_node(Node::property_postfix(image));
        if let Some(inner) = inner {
            parser.append(postfix, inner);
        }
        postfix
    };
    let postfix = parser.finish(postfix);
    parser.append(node, postfix);

    Ok(parser.finish_infix(node, left))
}

/// `::` access. A static method call on a named class is a dependency of the
/// enclosing callable.
pub fn parse_static_member_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::DoubleColon)?;
    let node = parser.add_node(Node::member_primary_prefix("::"));
    parser.append(node, left);

    parser.begin();
    let postfix = match parser.current_token_kind() {
        TokenKind::Variable => {
            let token = parser.advance();
            parser.add_node(Node::property_postfix(token.image))
        }
        TokenKind::Class => {
            let token = parser.advance();
            parser.add_node(Node::constant_postfix(token.image))
        }
        kind if kind.is_name() => {
            let token = parser.advance();
            if parser.current_token_kind() == TokenKind::OpenParen {
                let left_node = parser.ast().get(left);
                if left_node.kind == NodeKind::ClassOrInterfaceReference {
                    let name = left_node.image.clone();
                    parser.add_dependency(&name);
                }

                let postfix = parser.add_node(Node::method_postfix(token.image));
                let arguments = parse_arguments(parser)?;
                parser.append(postfix, arguments);
                postfix
            } else {
                parser.add_node(Node::constant_postfix(token.image))
            }
        }
        _ => return Err(parser.unexpected()),
    };
    let postfix = parser.finish(postfix);
    parser.append(node, postfix);

    Ok(parser.finish_infix(node, left))
}

/// Call on an arbitrary callee: `$callback(...)`, `(expr)(...)`.
pub fn parse_call_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    let node = parser.add_node(Node::function_postfix("()"));
    parser.append(node, left);
    let arguments = parse_arguments(parser)?;
    parser.append(node, arguments);
    Ok(parser.finish_infix(node, left))
}

pub fn parse_index_expr(
    parser: &mut Parser,
    left: NodeId,
    _bp: BindingPower,
) -> Result<NodeId, Error> {
    parser.begin();
    parser.expect(TokenKind::OpenBracket)?;
    let node = parser.add_node(Node::array_index_expression("["));
    parser.append(node, left);

    if parser.current_token_kind() != TokenKind::CloseBracket {
        let index = parse_expr(parser, BindingPower::Default)?;
        parser.append(node, index);
    }
    parser.expect(TokenKind::CloseBracket)?;

    Ok(parser.finish_infix(node, left))
}
