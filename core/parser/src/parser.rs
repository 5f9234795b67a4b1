//! Pratt expression parser with recursive-descent statements.
//!
//! Failed rules return `None` after recording a `SyntaxError`. The item loops
//! then resynchronize on the next `;`, `}` or declaration keyword, so one file
//! can report many independent errors. While recovering, follow-up errors are
//! suppressed until the parser is back in sync.

use std::path::Path;

use cinder_ast::builder::Builder;
use cinder_ast::diagnostics::{Diagnostic, Diagnostics};
use cinder_ast::nodes::{
    Block, ConditionalBranch, Expr, Field, Identifier, LoopKind, Module, Param, Position, PostfixOp,
    Program, Stmt, TypeNode, UnaryOp, Visibility,
};
use tracing::debug;

use crate::lexer::{source_line, tokenize, unquote};
use crate::precedence::{
    BP_NONE, BP_UNARY, assign_op, binary_op, infix_binding_power, is_right_associative,
};
use crate::token::{Token, TokenKind};

/// Parses one source file into a module.
pub fn parse_module<'a>(
    builder: &Builder<'a>,
    path: &str,
    source: &str,
    diagnostics: &mut Diagnostics,
) -> &'a Module<'a> {
    Parser::new(builder, path, source, diagnostics).parse_module()
}

/// Parses every `(path, source)` pair, in order, into one program.
pub fn parse_program<'a, 's, I>(
    builder: &Builder<'a>,
    sources: I,
    diagnostics: &mut Diagnostics,
) -> &'a Program<'a>
where
    I: IntoIterator<Item = (&'s str, &'s str)>,
{
    let mut modules = builder.vec();
    for (path, source) in sources {
        modules.push(parse_module(builder, path, source, diagnostics));
    }
    builder.program(modules.into_bump_slice())
}

pub struct Parser<'a, 'b, 'src> {
    builder: &'b Builder<'a>,
    file: &'b str,
    source: &'src str,
    tokens: Vec<Token<'src>>,
    current: usize,
    diagnostics: &'b mut Diagnostics,
    panicking: bool,
}

impl<'a, 'b, 'src> Parser<'a, 'b, 'src> {
    /// Lexes `source` eagerly; lexical errors land in `diagnostics` before parsing starts.
    pub fn new(
        builder: &'b Builder<'a>,
        file: &'b str,
        source: &'src str,
        diagnostics: &'b mut Diagnostics,
    ) -> Self {
        let tokens = tokenize(source, file, diagnostics);
        Self {
            builder,
            file,
            source,
            tokens,
            current: 0,
            diagnostics,
            panicking: false,
        }
    }

    pub fn parse_module(&mut self) -> &'a Module<'a> {
        let (name, explicit_name) = if self.check(TokenKind::ModuleDirective) {
            match self.parse_module_directive() {
                Some(name) => (name, true),
                None => {
                    self.synchronize();
                    (self.default_module_name(), false)
                }
            }
        } else {
            (self.default_module_name(), false)
        };
        let items = self.parse_items(None);
        debug!(
            file = self.file,
            module = name.name,
            items = items.len(),
            "parsed module"
        );
        self.builder
            .module(name, explicit_name, self.file, self.source, items)
    }

    fn parse_module_directive(&mut self) -> Option<Identifier<'a>> {
        self.advance();
        let name = self.expect_ident("expected module name after '@module'")?;
        self.expect(TokenKind::Semicolon, "expected ';' after module directive")?;
        Some(name)
    }

    fn default_module_name(&self) -> Identifier<'a> {
        let stem = Path::new(self.file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("main");
        self.builder.ident(Position::new(1, 1), stem)
    }

    /// Parses items until end of input or until `terminator` is next.
    fn parse_items(&mut self, terminator: Option<TokenKind>) -> &'a [&'a Stmt<'a>] {
        let mut items = self.builder.vec();
        while !self.is_at_end() && terminator.is_none_or(|t| !self.check(t)) {
            let start = self.current;
            if let Some(item) = self.parse_item() {
                items.push(item);
            } else {
                let token = *self.peek();
                debug!(
                    file = self.file,
                    line = token.line,
                    column = token.column,
                    "skipping malformed statement"
                );
                self.synchronize();
                if self.current == start {
                    self.advance();
                }
            }
        }
        items.into_bump_slice()
    }

    fn parse_item(&mut self) -> Option<&'a Stmt<'a>> {
        let start = self.peek().position();
        let visibility = match self.peek_kind() {
            TokenKind::Pub => {
                self.advance();
                Some(Visibility::Public)
            }
            TokenKind::Priv => {
                self.advance();
                Some(Visibility::Private)
            }
            _ => None,
        };
        match self.peek_kind() {
            TokenKind::Fn => self.parse_function(start, visibility),
            TokenKind::Struct => self.parse_struct(start, visibility),
            TokenKind::Enum => self.parse_enum(start, visibility),
            TokenKind::Const => self.parse_var_decl(start, visibility, true),
            TokenKind::Let => self.parse_var_decl(start, visibility, false),
            _ if visibility.is_some() => {
                self.error_at_current("expected a declaration after visibility modifier");
                None
            }
            _ => self.parse_statement(),
        }
    }

    fn parse_function(
        &mut self,
        start: Position,
        visibility: Option<Visibility>,
    ) -> Option<&'a Stmt<'a>> {
        self.advance();
        let name = self.expect_ident("expected function name after 'fn'")?;
        self.expect(TokenKind::LParen, "expected '(' after function name")?;
        let mut params = self.builder.vec();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after parameters")?;
        let return_type = if self.match_kind(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = self.parse_block("expected '{' before function body")?;
        Some(self.builder.function(
            start,
            name,
            params.into_bump_slice(),
            return_type,
            body,
            visibility,
        ))
    }

    /// `name: type`. Either half may be missing; the checker reports incomplete parameters.
    fn parse_param(&mut self) -> Option<Param<'a>> {
        let position = self.peek().position();
        if self.check(TokenKind::Ident) {
            let token = self.advance();
            let name = self.builder.ident(position, token.text);
            let ty = if self.match_kind(TokenKind::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            Some(self.builder.param(position, Some(name), ty))
        } else if self.starts_type() {
            let ty = self.parse_type()?;
            Some(self.builder.param(position, None, Some(ty)))
        } else {
            self.error_at_current("expected parameter name");
            None
        }
    }

    fn parse_struct(
        &mut self,
        start: Position,
        visibility: Option<Visibility>,
    ) -> Option<&'a Stmt<'a>> {
        self.advance();
        let name = self.expect_ident("expected struct name after 'struct'")?;
        self.expect(TokenKind::LBrace, "expected '{' after struct name")?;
        let mut fields = self.builder.vec();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let field_name = self.expect_ident("expected field name")?;
            self.expect(TokenKind::Colon, "expected ':' after field name")?;
            let ty = self.parse_type()?;
            fields.push(Field {
                name: field_name,
                ty,
            });
            let separated =
                self.match_kind(TokenKind::Comma) || self.match_kind(TokenKind::Semicolon);
            if !separated && !self.check(TokenKind::RBrace) {
                self.error_at_current("expected ',' or '}' after struct field");
                return None;
            }
        }
        self.expect(TokenKind::RBrace, "expected '}' after struct fields")?;
        Some(
            self.builder
                .struct_decl(start, name, fields.into_bump_slice(), visibility),
        )
    }

    fn parse_enum(
        &mut self,
        start: Position,
        visibility: Option<Visibility>,
    ) -> Option<&'a Stmt<'a>> {
        self.advance();
        let name = self.expect_ident("expected enum name after 'enum'")?;
        self.expect(TokenKind::LBrace, "expected '{' after enum name")?;
        let mut variants = self.builder.vec();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            variants.push(self.expect_ident("expected enum variant name")?);
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "expected '}' after enum variants")?;
        Some(
            self.builder
                .enum_decl(start, name, variants.into_bump_slice(), visibility),
        )
    }

    fn parse_var_decl(
        &mut self,
        start: Position,
        visibility: Option<Visibility>,
        is_const: bool,
    ) -> Option<&'a Stmt<'a>> {
        self.advance();
        let name = if is_const {
            self.expect_ident("expected constant name after 'const'")?
        } else {
            self.expect_ident("expected variable name after 'let'")?
        };
        let ty = if self.match_kind(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let value = if is_const {
            self.expect(TokenKind::Eq, "expected '=' after constant name")?;
            Some(self.parse_expression(BP_NONE)?)
        } else if self.match_kind(TokenKind::Eq) {
            Some(self.parse_expression(BP_NONE)?)
        } else {
            None
        };
        self.expect(
            TokenKind::Semicolon,
            "expected ';' after variable declaration",
        )?;
        Some(
            self.builder
                .var_decl(start, name, ty, value, is_const, visibility),
        )
    }

    fn parse_statement(&mut self) -> Option<&'a Stmt<'a>> {
        let start = self.peek().position();
        match self.peek_kind() {
            TokenKind::If => self.parse_if(start),
            TokenKind::Loop => self.parse_loop(start),
            TokenKind::Break => {
                self.advance();
                self.expect(TokenKind::Semicolon, "expected ';' after 'break'")?;
                Some(self.builder.break_stmt(start))
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(TokenKind::Semicolon, "expected ';' after 'continue'")?;
                Some(self.builder.continue_stmt(start))
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression(BP_NONE)?)
                };
                self.expect(TokenKind::Semicolon, "expected ';' after return value")?;
                Some(self.builder.return_stmt(start, value))
            }
            TokenKind::Print => self.parse_print(start),
            TokenKind::UseDirective => self.parse_use(start),
            TokenKind::LBrace => {
                let block = self.parse_block("expected '{'")?;
                Some(self.builder.block_stmt(block))
            }
            TokenKind::ModuleDirective => {
                self.error_at_current("'@module' must be the first item of a file");
                self.advance();
                None
            }
            _ => {
                let expr = self.parse_expression(BP_NONE)?;
                self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
                Some(self.builder.expression_stmt(start, expr))
            }
        }
    }

    fn parse_block(&mut self, message: &str) -> Option<&'a Block<'a>> {
        let position = self.peek().position();
        self.expect(TokenKind::LBrace, message)?;
        let statements = self.parse_items(Some(TokenKind::RBrace));
        self.expect(TokenKind::RBrace, "expected '}' after block")?;
        Some(self.builder.block(position, statements))
    }

    fn parse_if(&mut self, start: Position) -> Option<&'a Stmt<'a>> {
        self.advance();
        let mut branches = self.builder.vec();
        let condition = self.parse_expression(BP_NONE)?;
        let body = self.parse_block("expected '{' after if condition")?;
        branches.push(ConditionalBranch { condition, body });
        while self.match_kind(TokenKind::Elif) {
            let condition = self.parse_expression(BP_NONE)?;
            let body = self.parse_block("expected '{' after elif condition")?;
            branches.push(ConditionalBranch { condition, body });
        }
        let else_branch = if self.match_kind(TokenKind::Else) {
            Some(self.parse_block("expected '{' after 'else'")?)
        } else {
            None
        };
        Some(
            self.builder
                .if_stmt(start, branches.into_bump_slice(), else_branch),
        )
    }

    /// `loop {}`, `loop cond {}` or `loop [init; cond; step] {}`.
    fn parse_loop(&mut self, start: Position) -> Option<&'a Stmt<'a>> {
        self.advance();
        let kind = if self.check(TokenKind::LBrace) {
            LoopKind::Infinite
        } else if self.match_kind(TokenKind::LBracket) {
            let init = if self.match_kind(TokenKind::Semicolon) {
                None
            } else if self.check(TokenKind::Let) {
                let position = self.peek().position();
                Some(self.parse_var_decl(position, None, false)?)
            } else {
                let position = self.peek().position();
                let expr = self.parse_expression(BP_NONE)?;
                self.expect(TokenKind::Semicolon, "expected ';' after loop initializer")?;
                Some(self.builder.expression_stmt(position, expr))
            };
            let condition = if self.check(TokenKind::Semicolon) {
                None
            } else {
                Some(self.parse_expression(BP_NONE)?)
            };
            self.expect(TokenKind::Semicolon, "expected ';' after loop condition")?;
            let step = if self.check(TokenKind::RBracket) {
                None
            } else {
                Some(self.parse_expression(BP_NONE)?)
            };
            self.expect(TokenKind::RBracket, "expected ']' after loop header")?;
            LoopKind::For {
                init,
                condition,
                step,
            }
        } else {
            LoopKind::While {
                condition: self.parse_expression(BP_NONE)?,
            }
        };
        let body = self.parse_block("expected '{' before loop body")?;
        Some(self.builder.loop_stmt(start, kind, body))
    }

    fn parse_print(&mut self, start: Position) -> Option<&'a Stmt<'a>> {
        self.advance();
        self.expect(TokenKind::LParen, "expected '(' after 'print'")?;
        let args = self.parse_arguments()?;
        self.expect(TokenKind::RParen, "expected ')' after print arguments")?;
        self.expect(TokenKind::Semicolon, "expected ';' after print statement")?;
        Some(self.builder.print(start, args))
    }

    fn parse_use(&mut self, start: Position) -> Option<&'a Stmt<'a>> {
        self.advance();
        let module = self.expect_ident("expected module name after '@use'")?;
        let alias = if self.match_kind(TokenKind::As) {
            Some(self.expect_ident("expected alias name after 'as'")?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "expected ';' after '@use' directive")?;
        Some(self.builder.use_directive(start, module, alias))
    }

    fn starts_type(&self) -> bool {
        let kind = self.peek_kind();
        kind.basic_type().is_some()
            || matches!(
                kind,
                TokenKind::Star
                    | TokenKind::StarStar
                    | TokenKind::LBracket
                    | TokenKind::Fn
                    | TokenKind::Ident
            )
    }

    pub fn parse_type(&mut self) -> Option<&'a TypeNode<'a>> {
        let token = *self.peek();
        let position = token.position();
        if let Some(basic) = token.kind.basic_type() {
            self.advance();
            return Some(self.builder.basic_type(position, basic));
        }
        match token.kind {
            TokenKind::Star => {
                self.advance();
                let pointee = self.parse_type()?;
                Some(self.builder.pointer_type(position, pointee))
            }
            // `**T` arrives as a single token.
            TokenKind::StarStar => {
                self.advance();
                let pointee = self.parse_type()?;
                let inner_position = Position::new(position.line, position.column + 1);
                let inner = self.builder.pointer_type(inner_position, pointee);
                Some(self.builder.pointer_type(position, inner))
            }
            TokenKind::LBracket => {
                self.advance();
                let element = self.parse_type()?;
                let length = if self.match_kind(TokenKind::Semicolon) {
                    let length = self.expect(TokenKind::IntLiteral, "expected array length")?;
                    let Ok(value) = length.text.parse::<u64>() else {
                        self.error_at_token(length, "array length is out of range");
                        return None;
                    };
                    Some(value)
                } else {
                    None
                };
                self.expect(TokenKind::RBracket, "expected ']' after array type")?;
                Some(self.builder.array_type(position, element, length))
            }
            TokenKind::Fn => {
                self.advance();
                self.expect(TokenKind::LParen, "expected '(' after 'fn' in function type")?;
                let mut params = self.builder.vec();
                if !self.check(TokenKind::RParen) {
                    loop {
                        params.push(self.parse_type()?);
                        if !self.match_kind(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "expected ')' after parameter types")?;
                self.expect(TokenKind::Arrow, "expected '->' in function type")?;
                let return_type = self.parse_type()?;
                Some(
                    self.builder
                        .function_type(position, params.into_bump_slice(), return_type),
                )
            }
            TokenKind::Ident => {
                self.advance();
                Some(self.builder.named_type(position, token.text))
            }
            kind => {
                let message = format!("expected a type, found {}", kind.describe());
                self.error_at_token(token, &message);
                None
            }
        }
    }

    /// Parses an expression whose operators all bind tighter than `min_bp`.
    pub fn parse_expression(&mut self, min_bp: u8) -> Option<&'a Expr<'a>> {
        let mut left = self.parse_prefix()?;
        loop {
            let bp = infix_binding_power(self.peek_kind());
            if bp <= min_bp {
                break;
            }
            left = self.parse_infix(left, bp)?;
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<&'a Expr<'a>> {
        let token = *self.peek();
        let position = token.position();
        let builder = self.builder;
        let expr = match token.kind {
            TokenKind::IntLiteral | TokenKind::FloatLiteral => {
                self.advance();
                let literal = if token.kind == TokenKind::IntLiteral {
                    builder.int_literal_from_text(position, token.text)
                } else {
                    builder.float_literal_from_text(position, token.text)
                };
                match literal {
                    Ok(expr) => expr,
                    Err(err) => {
                        self.error_at_token(token, &err.to_string());
                        return None;
                    }
                }
            }
            TokenKind::StringLiteral => {
                self.advance();
                builder.string_literal(position, &unquote(token.text))
            }
            TokenKind::CharLiteral => {
                self.advance();
                let byte = unquote(token.text).bytes().next().unwrap_or_default();
                builder.char_literal(position, byte)
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                builder.bool_literal(position, token.kind == TokenKind::True)
            }
            TokenKind::Null => {
                self.advance();
                builder.null_literal(position)
            }
            TokenKind::Ident => {
                self.advance();
                builder.identifier(position, token.text)
            }
            TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Star
            | TokenKind::Amp => {
                self.advance();
                let op = match token.kind {
                    TokenKind::Minus => UnaryOp::Neg,
                    TokenKind::Bang => UnaryOp::Not,
                    TokenKind::Tilde => UnaryOp::BitNot,
                    TokenKind::Star => UnaryOp::Deref,
                    _ => UnaryOp::AddressOf,
                };
                // `i64::MIN` has no positive counterpart, so its sign folds into the literal.
                if op == UnaryOp::Neg
                    && self.check(TokenKind::IntLiteral)
                    && self.peek().text.parse::<i64>().is_err()
                {
                    let literal = self.advance();
                    return match builder.negative_int_literal_from_text(position, literal.text) {
                        Ok(expr) => Some(expr),
                        Err(err) => {
                            self.error_at_token(literal, &err.to_string());
                            None
                        }
                    };
                }
                let operand = self.parse_expression(BP_UNARY)?;
                builder.unary(position, op, operand)
            }
            TokenKind::StarStar => {
                self.advance();
                let operand = self.parse_expression(BP_UNARY)?;
                let inner_position = Position::new(position.line, position.column + 1);
                let inner = builder.unary(inner_position, UnaryOp::Deref, operand);
                builder.unary(position, UnaryOp::Deref, inner)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(BP_NONE)?;
                self.expect(TokenKind::RParen, "expected ')' after expression")?;
                builder.grouping(position, inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = builder.vec();
                while !self.check(TokenKind::RBracket) && !self.is_at_end() {
                    elements.push(self.parse_expression(BP_NONE)?);
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket, "expected ']' after array elements")?;
                builder.array_literal(position, elements.into_bump_slice())
            }
            kind => {
                let message = format!("expected expression, found {}", kind.describe());
                self.error_at_token(token, &message);
                return None;
            }
        };
        Some(expr)
    }

    fn parse_infix(&mut self, left: &'a Expr<'a>, bp: u8) -> Option<&'a Expr<'a>> {
        let token = self.advance();
        let builder = self.builder;
        let position = left.position;

        if let Some(op) = assign_op(token.kind) {
            let value = self.parse_expression(bp - 1)?;
            if !left.is_place() {
                self.error_at(
                    position,
                    1,
                    "invalid assignment target",
                    Some("cannot assign to this expression"),
                );
                return None;
            }
            return Some(builder.assign(position, op, left, value));
        }

        if let Some(op) = binary_op(token.kind) {
            let right_bp = if is_right_associative(token.kind) {
                bp - 1
            } else {
                bp
            };
            let right = self.parse_expression(right_bp)?;
            return Some(builder.binary(position, op, left, right));
        }

        let expr = match token.kind {
            TokenKind::Question => {
                let then_branch = self.parse_expression(BP_NONE)?;
                self.expect(TokenKind::Colon, "expected ':' in conditional expression")?;
                let else_branch = self.parse_expression(bp - 1)?;
                builder.ternary(position, left, then_branch, else_branch)
            }
            TokenKind::PlusPlus => builder.postfix(position, PostfixOp::Increment, left),
            TokenKind::MinusMinus => builder.postfix(position, PostfixOp::Decrement, left),
            TokenKind::LParen => {
                let args = self.parse_arguments()?;
                self.expect(TokenKind::RParen, "expected ')' after arguments")?;
                builder.call(position, left, args)
            }
            TokenKind::Dot => {
                let member = self.expect_ident("expected member name after '.'")?;
                builder.member(position, left, member)
            }
            TokenKind::LBracket => {
                let index = self.parse_expression(BP_NONE)?;
                self.expect(TokenKind::RBracket, "expected ']' after index")?;
                builder.index(position, left, index)
            }
            kind => {
                let message = format!("unexpected {} in expression", kind.describe());
                self.error_at_token(token, &message);
                return None;
            }
        };
        Some(expr)
    }

    /// Comma-separated expressions up to, not including, `)`.
    fn parse_arguments(&mut self) -> Option<&'a [&'a Expr<'a>]> {
        let mut args = self.builder.vec();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression(BP_NONE)?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        Some(args.into_bump_slice())
    }

    /// Skips tokens until a likely statement boundary. Braces opened while
    /// skipping are skipped as a unit so a broken header does not leave its
    /// body behind as stray statements.
    fn synchronize(&mut self) {
        self.panicking = false;
        let mut nesting = 0_usize;
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon if nesting == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => {
                    nesting += 1;
                    self.advance();
                }
                TokenKind::RBrace if nesting == 0 => return,
                TokenKind::RBrace => {
                    nesting -= 1;
                    self.advance();
                }
                kind if nesting == 0
                    && (kind.starts_declaration()
                        || matches!(
                            kind,
                            TokenKind::If
                                | TokenKind::Loop
                                | TokenKind::Return
                                | TokenKind::Print
                                | TokenKind::Break
                                | TokenKind::Continue
                        )) =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn peek(&self) -> &Token<'src> {
        &self.tokens[self.current]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token<'src> {
        let token = *self.peek();
        if token.kind != TokenKind::Eof {
            self.current += 1;
        }
        token
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns the next token if it has `kind`. Otherwise records `message`
    /// and returns an `Eof` sentinel without advancing.
    pub fn consume(&mut self, kind: TokenKind, message: &str) -> Token<'src> {
        if self.check(kind) {
            return self.advance();
        }
        let found = *self.peek();
        if kind == TokenKind::Semicolon && self.current > 0 {
            // Point just past the previous token, where the ';' belongs.
            let previous = self.tokens[self.current - 1];
            let width = u32::try_from(previous.len()).unwrap_or(0);
            let position = Position::new(previous.line, previous.column.saturating_add(width));
            let label = format!("expected {kind}");
            self.error_at(position, 1, message, Some(&label));
        } else {
            let message = format!("{message}, found {}", found.kind.describe());
            self.error_at_token(found, &message);
        }
        Token {
            kind: TokenKind::Eof,
            text: "",
            line: found.line,
            column: found.column,
            leading_whitespace: 0,
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Option<Token<'src>> {
        let token = self.consume(kind, message);
        (token.kind == kind).then_some(token)
    }

    fn expect_ident(&mut self, message: &str) -> Option<Identifier<'a>> {
        let token = self.expect(TokenKind::Ident, message)?;
        Some(self.builder.ident(token.position(), token.text))
    }

    fn error_at_current(&mut self, message: &str) {
        let token = *self.peek();
        self.error_at_token(token, message);
    }

    fn error_at_token(&mut self, token: Token<'src>, message: &str) {
        if token.kind == TokenKind::Error {
            // The lexer already reported this token.
            self.panicking = true;
            return;
        }
        self.error_at(token.position(), token.len(), message, None);
    }

    fn error_at(&mut self, position: Position, length: usize, message: &str, label: Option<&str>) {
        if self.panicking {
            return;
        }
        self.panicking = true;
        let mut diagnostic =
            Diagnostic::syntax_error(self.file, message, position).with_length(length);
        if let Some(line) = source_line(self.source, position.line) {
            diagnostic = diagnostic.with_source_line(line);
        }
        if let Some(label) = label {
            diagnostic = diagnostic.with_label(label);
        }
        self.diagnostics.add(diagnostic);
    }
}
