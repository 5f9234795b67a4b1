//! Binding powers for the Pratt expression parser, lowest to highest.
//!
//! The infix loop keeps going while the next operator binds tighter than the
//! caller's minimum, so a left-associative operator parses its right operand
//! at its own power and a right-associative one at `power - 1`.

use cinder_ast::nodes::{AssignOp, BinaryOp};

use crate::token::TokenKind;

pub const BP_NONE: u8 = 0;
pub const BP_ASSIGN: u8 = 10;
pub const BP_TERNARY: u8 = 20;
pub const BP_OR: u8 = 30;
pub const BP_AND: u8 = 40;
pub const BP_BIT_OR: u8 = 50;
pub const BP_BIT_XOR: u8 = 60;
pub const BP_BIT_AND: u8 = 70;
pub const BP_EQUALITY: u8 = 80;
pub const BP_RELATIONAL: u8 = 90;
pub const BP_SHIFT: u8 = 100;
pub const BP_SUM: u8 = 110;
pub const BP_PRODUCT: u8 = 120;
pub const BP_EXPONENT: u8 = 130;
pub const BP_UNARY: u8 = 140;
pub const BP_POSTFIX: u8 = 150;
pub const BP_CALL: u8 = 160;
pub const BP_PRIMARY: u8 = 170;

/// Binding power of `kind` in infix or postfix position; [`BP_NONE`] if it is not an operator.
#[must_use]
pub fn infix_binding_power(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Eq
        | TokenKind::PlusEq
        | TokenKind::MinusEq
        | TokenKind::StarEq
        | TokenKind::SlashEq
        | TokenKind::PercentEq => BP_ASSIGN,
        TokenKind::Question => BP_TERNARY,
        TokenKind::PipePipe => BP_OR,
        TokenKind::AmpAmp => BP_AND,
        TokenKind::Pipe => BP_BIT_OR,
        TokenKind::Caret => BP_BIT_XOR,
        TokenKind::Amp => BP_BIT_AND,
        TokenKind::EqEq | TokenKind::BangEq => BP_EQUALITY,
        TokenKind::Less | TokenKind::LessEq | TokenKind::Greater | TokenKind::GreaterEq => {
            BP_RELATIONAL
        }
        TokenKind::ShiftLeft | TokenKind::ShiftRight => BP_SHIFT,
        TokenKind::Plus | TokenKind::Minus => BP_SUM,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => BP_PRODUCT,
        TokenKind::StarStar => BP_EXPONENT,
        TokenKind::PlusPlus | TokenKind::MinusMinus => BP_POSTFIX,
        TokenKind::LParen | TokenKind::Dot | TokenKind::LBracket => BP_CALL,
        _ => BP_NONE,
    }
}

#[must_use]
pub fn is_right_associative(kind: TokenKind) -> bool {
    assign_op(kind).is_some() || matches!(kind, TokenKind::StarStar | TokenKind::Question)
}

#[must_use]
pub fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::StarStar => BinaryOp::Pow,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::Ne,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::LessEq => BinaryOp::Le,
        TokenKind::Greater => BinaryOp::Gt,
        TokenKind::GreaterEq => BinaryOp::Ge,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::ShiftLeft => BinaryOp::Shl,
        TokenKind::ShiftRight => BinaryOp::Shr,
        _ => return None,
    };
    Some(op)
}

#[must_use]
pub fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Eq => Some(AssignOp::Assign),
        TokenKind::PlusEq => Some(AssignOp::Add),
        TokenKind::MinusEq => Some(AssignOp::Sub),
        TokenKind::StarEq => Some(AssignOp::Mul),
        TokenKind::SlashEq => Some(AssignOp::Div),
        TokenKind::PercentEq => Some(AssignOp::Mod),
        _ => None,
    }
}
