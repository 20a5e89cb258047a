use std::collections::HashMap;

use crate::{ast::ast::NodeId, errors::errors::Error, lexer::tokens::TokenKind};

use super::{expr::*, parser::Parser, stmt::*};

/// Operator precedence, weakest first.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    LogicalOr,
    LogicalXor,
    LogicalAnd,
    Assignment,
    Ternary,
    Coalesce,
    BooleanOr,
    BooleanAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Instanceof,
    Unary,
    Pow,
    Postfix,
    Member,
    Primary,
}

impl BindingPower {
    /// The next weaker level. Right-associative operators parse their right
    /// operand with it.
    pub fn lower(self) -> BindingPower {
        use BindingPower::*;
        match self {
            Default | LogicalOr => Default,
            LogicalXor => LogicalOr,
            LogicalAnd => LogicalXor,
            Assignment => LogicalAnd,
            Ternary => Assignment,
            Coalesce => Ternary,
            BooleanOr => Coalesce,
            BooleanAnd => BooleanOr,
            BitwiseOr => BooleanAnd,
            BitwiseXor => BitwiseOr,
            BitwiseAnd => BitwiseXor,
            Equality => BitwiseAnd,
            Relational => Equality,
            Shift => Relational,
            Additive => Shift,
            Multiplicative => Additive,
            Instanceof => Multiplicative,
            Unary => Instanceof,
            Pow => Unary,
            Postfix => Pow,
            Member => Postfix,
            Primary => Member,
        }
    }
}

pub type StmtHandler = for<'p> fn(&mut Parser<'p>) -> Result<NodeId, Error>;
pub type NUDHandler = for<'p> fn(&mut Parser<'p>) -> Result<NodeId, Error>;
pub type LEDHandler = for<'p> fn(&mut Parser<'p>, NodeId, BindingPower) -> Result<NodeId, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    // Assignment
    for kind in [
        TokenKind::Assignment,
        TokenKind::PlusEquals,
        TokenKind::MinusEquals,
        TokenKind::StarEquals,
        TokenKind::SlashEquals,
        TokenKind::ConcatEquals,
        TokenKind::PercentEquals,
        TokenKind::AndEquals,
        TokenKind::OrEquals,
        TokenKind::XorEquals,
        TokenKind::ShiftLeftEquals,
        TokenKind::ShiftRightEquals,
        TokenKind::PowEquals,
        TokenKind::CoalesceEquals,
    ] {
        parser.led(kind, BindingPower::Assignment, parse_assignment_expr);
    }

    // Logical
    parser.led(TokenKind::LogicalOr, BindingPower::LogicalOr, parse_binary_expr);
    parser.led(TokenKind::LogicalXor, BindingPower::LogicalXor, parse_binary_expr);
    parser.led(TokenKind::LogicalAnd, BindingPower::LogicalAnd, parse_binary_expr);
    parser.led(TokenKind::Question, BindingPower::Ternary, parse_conditional_expr);
    parser.led(TokenKind::Coalesce, BindingPower::Coalesce, parse_binary_expr);
    parser.led(TokenKind::BooleanOr, BindingPower::BooleanOr, parse_binary_expr);
    parser.led(TokenKind::BooleanAnd, BindingPower::BooleanAnd, parse_binary_expr);

    // Bitwise
    parser.led(TokenKind::Pipe, BindingPower::BitwiseOr, parse_binary_expr);
    parser.led(TokenKind::Caret, BindingPower::BitwiseXor, parse_binary_expr);
    parser.led(TokenKind::Ampersand, BindingPower::BitwiseAnd, parse_binary_expr);

    // Relational
    for kind in [
        TokenKind::Equals,
        TokenKind::NotEquals,
        TokenKind::Identical,
        TokenKind::NotIdentical,
        TokenKind::Spaceship,
    ] {
        parser.led(kind, BindingPower::Equality, parse_binary_expr);
    }
    for kind in [
        TokenKind::Less,
        TokenKind::LessEquals,
        TokenKind::Greater,
        TokenKind::GreaterEquals,
    ] {
        parser.led(kind, BindingPower::Relational, parse_binary_expr);
    }
    parser.led(TokenKind::ShiftLeft, BindingPower::Shift, parse_binary_expr);
    parser.led(TokenKind::ShiftRight, BindingPower::Shift, parse_binary_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dot, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Percent, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Instanceof, BindingPower::Instanceof, parse_instanceof_expr);
    parser.led(TokenKind::Pow, BindingPower::Pow, parse_binary_expr);

    // Postfix and member access
    parser.led(TokenKind::PlusPlus, BindingPower::Postfix, parse_postfix_expr);
    parser.led(TokenKind::MinusMinus, BindingPower::Postfix, parse_postfix_expr);
    parser.led(TokenKind::Arrow, BindingPower::Member, parse_member_expr);
    parser.led(TokenKind::NullsafeArrow, BindingPower::Member, parse_member_expr);
    parser.led(TokenKind::DoubleColon, BindingPower::Member, parse_static_member_expr);
    parser.led(TokenKind::OpenParen, BindingPower::Member, parse_call_expr);
    parser.led(TokenKind::OpenBracket, BindingPower::Member, parse_index_expr);

    // Literals and symbols
    parser.nud(TokenKind::Variable, parse_variable_expr);
    parser.nud(TokenKind::Dollar, parse_variable_variable_expr);
    parser.nud(TokenKind::Number, parse_literal_expr);
    parser.nud(TokenKind::ConstantString, parse_literal_expr);
    parser.nud(TokenKind::Identifier, parse_name_expr);
    parser.nud(TokenKind::Backslash, parse_name_expr);
    parser.nud(TokenKind::Namespace, parse_name_expr);
    parser.nud(TokenKind::SelfRef, parse_class_keyword_expr);
    parser.nud(TokenKind::Parent, parse_class_keyword_expr);
    parser.nud(TokenKind::Static, parse_class_keyword_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::OpenBracket, parse_array_expr);
    parser.nud(TokenKind::Array, parse_array_expr);
    parser.nud(TokenKind::List, parse_list_expr);
    parser.nud(TokenKind::Function, parse_closure_expr);
    parser.nud(TokenKind::Fn, parse_arrow_function_expr);

    // Prefix
    parser.nud(TokenKind::Cast, parse_cast_expr);
    parser.nud(TokenKind::Not, parse_prefix_expr);
    parser.nud(TokenKind::Tilde, parse_prefix_expr);
    parser.nud(TokenKind::Dash, parse_prefix_expr);
    parser.nud(TokenKind::Plus, parse_prefix_expr);
    parser.nud(TokenKind::At, parse_prefix_expr);
    parser.nud(TokenKind::Ampersand, parse_prefix_expr);
    parser.nud(TokenKind::PlusPlus, parse_pre_increment_expr);
    parser.nud(TokenKind::MinusMinus, parse_pre_increment_expr);

    // Keyword expressions
    parser.nud(TokenKind::New, parse_allocation_expr);
    parser.nud(TokenKind::Clone, parse_clone_expr);
    parser.nud(TokenKind::Isset, parse_isset_expr);
    parser.nud(TokenKind::Empty, parse_empty_expr);
    parser.nud(TokenKind::Eval, parse_eval_expr);
    parser.nud(TokenKind::Exit, parse_exit_expr);
    parser.nud(TokenKind::Print, parse_print_expr);
    parser.nud(TokenKind::Include, parse_include_expr);
    parser.nud(TokenKind::IncludeOnce, parse_include_expr);
    parser.nud(TokenKind::Require, parse_include_expr);
    parser.nud(TokenKind::RequireOnce, parse_include_expr);
    parser.nud(TokenKind::Yield, parse_yield_expr);
    parser.nud(TokenKind::YieldFrom, parse_yield_expr);
    parser.nud(TokenKind::Match, parse_match_expr);

    // Statements
    parser.stmt(TokenKind::OpenCurly, parse_block_stmt);
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::For, parse_for_stmt);
    parser.stmt(TokenKind::Foreach, parse_foreach_stmt);
    parser.stmt(TokenKind::While, parse_while_stmt);
    parser.stmt(TokenKind::Do, parse_do_while_stmt);
    parser.stmt(TokenKind::Switch, parse_switch_stmt);
    parser.stmt(TokenKind::Try, parse_try_stmt);
    parser.stmt(TokenKind::Throw, parse_throw_stmt);
    parser.stmt(TokenKind::Goto, parse_goto_stmt);
    parser.stmt(TokenKind::Global, parse_global_stmt);
    parser.stmt(TokenKind::Unset, parse_unset_stmt);
    parser.stmt(TokenKind::Echo, parse_echo_stmt);
    parser.stmt(TokenKind::InlineHtml, parse_echo_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::Break, parse_break_stmt);
    parser.stmt(TokenKind::Continue, parse_break_stmt);
    parser.stmt(TokenKind::Declare, parse_declare_stmt);
    parser.stmt(TokenKind::Const, parse_const_stmt);
    parser.stmt(TokenKind::Semicolon, parse_empty_stmt);
    parser.stmt(TokenKind::OpenTag, parse_empty_stmt);
    parser.stmt(TokenKind::CloseTag, parse_empty_stmt);
}

// Lookup tables inside parser struct, so it's easier
pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
