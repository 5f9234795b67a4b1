use core::fmt;
use std::fmt::{Display, Formatter};

use cinder_ast::nodes::{BasicType, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Eof,
    Error,

    // Identifiers and literals
    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,

    // Directives
    ModuleDirective, // @module
    UseDirective,    // @use

    // Keywords
    Fn,
    Let,
    Const,
    Return,
    If,
    Elif,
    Else,
    Loop,
    Break,
    Continue,
    Print,
    Pub,
    Priv,
    Struct,
    Enum,
    As,
    True,
    False,
    Null,
    Int,
    Float,
    Double,
    Char,
    Bool,
    String,
    Void,

    // Two-character symbols
    EqEq,       // ==
    BangEq,     // !=
    LessEq,     // <=
    GreaterEq,  // >=
    AmpAmp,     // &&
    PipePipe,   // ||
    ShiftLeft,  // <<
    ShiftRight, // >>
    StarStar,   // **
    Arrow,      // ->
    PlusPlus,   // ++
    MinusMinus, // --
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    SlashEq,    // /=
    PercentEq,  // %=

    // One-character symbols
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Less,
    Greater,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Question,
    Colon,
    Semicolon,
    Comma,
    Dot,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

/// Two-character symbols, matched before [`ONE_CHAR_SYMBOLS`].
pub const TWO_CHAR_SYMBOLS: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<=", TokenKind::LessEq),
    (">=", TokenKind::GreaterEq),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("<<", TokenKind::ShiftLeft),
    (">>", TokenKind::ShiftRight),
    ("**", TokenKind::StarStar),
    ("->", TokenKind::Arrow),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
];

pub const ONE_CHAR_SYMBOLS: &[(u8, TokenKind)] = &[
    (b'+', TokenKind::Plus),
    (b'-', TokenKind::Minus),
    (b'*', TokenKind::Star),
    (b'/', TokenKind::Slash),
    (b'%', TokenKind::Percent),
    (b'=', TokenKind::Eq),
    (b'<', TokenKind::Less),
    (b'>', TokenKind::Greater),
    (b'!', TokenKind::Bang),
    (b'~', TokenKind::Tilde),
    (b'&', TokenKind::Amp),
    (b'|', TokenKind::Pipe),
    (b'^', TokenKind::Caret),
    (b'?', TokenKind::Question),
    (b':', TokenKind::Colon),
    (b';', TokenKind::Semicolon),
    (b',', TokenKind::Comma),
    (b'.', TokenKind::Dot),
    (b'(', TokenKind::LParen),
    (b')', TokenKind::RParen),
    (b'{', TokenKind::LBrace),
    (b'}', TokenKind::RBrace),
    (b'[', TokenKind::LBracket),
    (b']', TokenKind::RBracket),
];

#[must_use]
pub fn keyword(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "fn" => TokenKind::Fn,
        "let" => TokenKind::Let,
        "const" => TokenKind::Const,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "loop" => TokenKind::Loop,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "print" => TokenKind::Print,
        "pub" => TokenKind::Pub,
        "priv" => TokenKind::Priv,
        "struct" => TokenKind::Struct,
        "enum" => TokenKind::Enum,
        "as" => TokenKind::As,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "int" => TokenKind::Int,
        "float" => TokenKind::Float,
        "double" => TokenKind::Double,
        "char" => TokenKind::Char,
        "bool" => TokenKind::Bool,
        "string" => TokenKind::String,
        "void" => TokenKind::Void,
        _ => return None,
    };
    Some(kind)
}

/// Directive table, keyed by the name following `@`.
#[must_use]
pub fn directive(name: &str) -> Option<TokenKind> {
    match name {
        "module" => Some(TokenKind::ModuleDirective),
        "use" => Some(TokenKind::UseDirective),
        _ => None,
    }
}

impl TokenKind {
    #[must_use]
    pub fn basic_type(self) -> Option<BasicType> {
        match self {
            TokenKind::Int => Some(BasicType::Int),
            TokenKind::Float => Some(BasicType::Float),
            TokenKind::Double => Some(BasicType::Double),
            TokenKind::Char => Some(BasicType::Char),
            TokenKind::Bool => Some(BasicType::Bool),
            TokenKind::String => Some(BasicType::String),
            TokenKind::Void => Some(BasicType::Void),
            _ => None,
        }
    }

    /// Tokens that may start a declaration; used as parser recovery points.
    #[must_use]
    pub fn starts_declaration(self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Pub
                | TokenKind::Priv
                | TokenKind::UseDirective
                | TokenKind::ModuleDirective
        )
    }

    /// Human-readable form used in diagnostics.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
            TokenKind::Ident => "identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::ModuleDirective => "'@module'",
            TokenKind::UseDirective => "'@use'",
            TokenKind::Fn => "'fn'",
            TokenKind::Let => "'let'",
            TokenKind::Const => "'const'",
            TokenKind::Return => "'return'",
            TokenKind::If => "'if'",
            TokenKind::Elif => "'elif'",
            TokenKind::Else => "'else'",
            TokenKind::Loop => "'loop'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Print => "'print'",
            TokenKind::Pub => "'pub'",
            TokenKind::Priv => "'priv'",
            TokenKind::Struct => "'struct'",
            TokenKind::Enum => "'enum'",
            TokenKind::As => "'as'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Int => "'int'",
            TokenKind::Float => "'float'",
            TokenKind::Double => "'double'",
            TokenKind::Char => "'char'",
            TokenKind::Bool => "'bool'",
            TokenKind::String => "'string'",
            TokenKind::Void => "'void'",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::LessEq => "'<='",
            TokenKind::GreaterEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::ShiftLeft => "'<<'",
            TokenKind::ShiftRight => "'>>'",
            TokenKind::StarStar => "'**'",
            TokenKind::Arrow => "'->'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::Bang => "'!'",
            TokenKind::Tilde => "'~'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token borrowing its text from the source buffer.
///
/// `text.len()` is the token length in bytes. `leading_whitespace` counts the
/// whitespace and comment bytes skipped directly before the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub line: u32,
    pub column: u32,
    pub leading_whitespace: usize,
}

impl Token<'_> {
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{} {:?} {:?}",
            self.line, self.column, self.kind, self.text
        )
    }
}
