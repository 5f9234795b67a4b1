//! Node constructors.
//!
//! Every constructor allocates exactly one node in the [`Arena`], stamps it
//! with the next sequential [`NodeId`] and returns a shared reference that
//! lives as long as the arena. Names and string payloads are copied into the
//! arena, so the builder never borrows from the caller's buffers.
//!
//! Constructors do not validate: a `break` outside a loop or a call with the
//! wrong arity builds fine and is rejected later by the type checker.
//!
//! # Node ID Assignment
//!
//! IDs start at 1 and follow construction order. Zero is never handed out.

use std::cell::Cell;

use crate::arena::{Arena, ArenaVec};
use crate::errors::AstError;
use crate::nodes::{
    AssignOp, BasicType, BinaryOp, Block, ConditionalBranch, EnumDecl, Expr, ExprKind, Field,
    FunctionDecl, Identifier, IfStmt, LiteralValue, LoopKind, LoopStmt, Module, NodeId, Param,
    Position, PostfixOp, Program, Stmt, StmtKind, StructDecl, TypeKind, TypeNode, UnaryOp,
    UseDirective, VarDecl, Visibility,
};

pub struct Builder<'a> {
    arena: &'a Arena,
    next_id: Cell<u32>,
}

impl<'a> Builder<'a> {
    #[must_use]
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            next_id: Cell::new(1),
        }
    }

    #[must_use]
    pub fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Number of nodes built so far.
    #[must_use]
    pub fn node_count(&self) -> u32 {
        self.next_id.get() - 1
    }

    fn fresh_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    /// Starts an arena-backed list; finish it with `into_bump_slice()`.
    #[must_use]
    pub fn vec<T>(&self) -> ArenaVec<'a, T> {
        self.arena.vec()
    }

    /// Collects `items` into an arena slice.
    pub fn list<T, I>(&self, items: I) -> &'a [T]
    where
        I: IntoIterator<Item = T>,
    {
        let mut list = self.arena.vec();
        list.extend(items);
        list.into_bump_slice()
    }

    #[must_use]
    pub fn ident(&self, position: Position, name: &str) -> Identifier<'a> {
        Identifier {
            name: self.arena.alloc_str(name),
            position,
        }
    }

    fn expr(&self, position: Position, kind: ExprKind<'a>) -> &'a Expr<'a> {
        self.arena.alloc(Expr {
            id: self.fresh_id(),
            position,
            kind,
        })
    }

    pub fn int_literal(&self, position: Position, value: i64) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Literal(LiteralValue::Int(value)))
    }

    /// Builds an integer literal from its decimal spelling.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::LiteralOutOfRange`] when the value does not fit an `i64`.
    pub fn int_literal_from_text(
        &self,
        position: Position,
        text: &str,
    ) -> Result<&'a Expr<'a>, AstError> {
        let value = text
            .parse::<i64>()
            .map_err(|_| AstError::LiteralOutOfRange {
                kind: "integer",
                text: text.to_string(),
            })?;
        Ok(self.int_literal(position, value))
    }

    /// Builds the literal `-text` from the decimal spelling of its magnitude,
    /// which reaches down to `i64::MIN`.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::LiteralOutOfRange`] when the negated value does not fit an `i64`.
    pub fn negative_int_literal_from_text(
        &self,
        position: Position,
        text: &str,
    ) -> Result<&'a Expr<'a>, AstError> {
        text.parse::<u64>()
            .ok()
            .and_then(|magnitude| 0_i64.checked_sub_unsigned(magnitude))
            .map(|value| self.int_literal(position, value))
            .ok_or_else(|| AstError::LiteralOutOfRange {
                kind: "integer",
                text: format!("-{text}"),
            })
    }

    pub fn float_literal(&self, position: Position, value: f64) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Literal(LiteralValue::Float(value)))
    }

    /// # Errors
    ///
    /// Returns [`AstError::LiteralOutOfRange`] when the spelling does not denote a finite `f64`.
    pub fn float_literal_from_text(
        &self,
        position: Position,
        text: &str,
    ) -> Result<&'a Expr<'a>, AstError> {
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(self.float_literal(position, value)),
            _ => Err(AstError::LiteralOutOfRange {
                kind: "float",
                text: text.to_string(),
            }),
        }
    }

    /// `value` is the decoded string contents, without quotes.
    pub fn string_literal(&self, position: Position, value: &str) -> &'a Expr<'a> {
        let value = self.arena.alloc_str(value);
        self.expr(position, ExprKind::Literal(LiteralValue::Str(value)))
    }

    pub fn char_literal(&self, position: Position, value: u8) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Literal(LiteralValue::Char(value)))
    }

    pub fn bool_literal(&self, position: Position, value: bool) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Literal(LiteralValue::Bool(value)))
    }

    pub fn null_literal(&self, position: Position) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Literal(LiteralValue::Null))
    }

    pub fn identifier(&self, position: Position, name: &str) -> &'a Expr<'a> {
        let name = self.arena.alloc_str(name);
        self.expr(position, ExprKind::Identifier(name))
    }

    pub fn binary(
        &self,
        position: Position,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Binary { op, left, right })
    }

    pub fn unary(&self, position: Position, op: UnaryOp, operand: &'a Expr<'a>) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Unary { op, operand })
    }

    pub fn postfix(
        &self,
        position: Position,
        op: PostfixOp,
        operand: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Postfix { op, operand })
    }

    pub fn assign(
        &self,
        position: Position,
        op: AssignOp,
        target: &'a Expr<'a>,
        value: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Assign { op, target, value })
    }

    pub fn ternary(
        &self,
        position: Position,
        condition: &'a Expr<'a>,
        then_branch: &'a Expr<'a>,
        else_branch: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.expr(
            position,
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            },
        )
    }

    pub fn call(
        &self,
        position: Position,
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    ) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Call { callee, args })
    }

    pub fn member(
        &self,
        position: Position,
        object: &'a Expr<'a>,
        member: Identifier<'a>,
    ) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Member { object, member })
    }

    pub fn index(
        &self,
        position: Position,
        object: &'a Expr<'a>,
        index: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Index { object, index })
    }

    pub fn array_literal(&self, position: Position, elements: &'a [&'a Expr<'a>]) -> &'a Expr<'a> {
        self.expr(position, ExprKind::ArrayLiteral(elements))
    }

    pub fn grouping(&self, position: Position, inner: &'a Expr<'a>) -> &'a Expr<'a> {
        self.expr(position, ExprKind::Grouping(inner))
    }

    fn stmt(&self, position: Position, kind: StmtKind<'a>) -> &'a Stmt<'a> {
        self.arena.alloc(Stmt {
            id: self.fresh_id(),
            position,
            kind,
        })
    }

    pub fn expression_stmt(&self, position: Position, expr: &'a Expr<'a>) -> &'a Stmt<'a> {
        self.stmt(position, StmtKind::Expression(expr))
    }

    pub fn var_decl(
        &self,
        position: Position,
        name: Identifier<'a>,
        ty: Option<&'a TypeNode<'a>>,
        value: Option<&'a Expr<'a>>,
        is_const: bool,
        visibility: Option<Visibility>,
    ) -> &'a Stmt<'a> {
        self.stmt(
            position,
            StmtKind::VarDecl(VarDecl {
                name,
                ty,
                value,
                is_const,
                visibility,
            }),
        )
    }

    #[must_use]
    pub fn param(
        &self,
        position: Position,
        name: Option<Identifier<'a>>,
        ty: Option<&'a TypeNode<'a>>,
    ) -> Param<'a> {
        Param { name, ty, position }
    }

    pub fn function(
        &self,
        position: Position,
        name: Identifier<'a>,
        params: &'a [Param<'a>],
        return_type: Option<&'a TypeNode<'a>>,
        body: &'a Block<'a>,
        visibility: Option<Visibility>,
    ) -> &'a Stmt<'a> {
        self.stmt(
            position,
            StmtKind::Function(FunctionDecl {
                name,
                params,
                return_type,
                body,
                visibility,
            }),
        )
    }

    pub fn struct_decl(
        &self,
        position: Position,
        name: Identifier<'a>,
        fields: &'a [Field<'a>],
        visibility: Option<Visibility>,
    ) -> &'a Stmt<'a> {
        self.stmt(
            position,
            StmtKind::Struct(StructDecl {
                name,
                fields,
                visibility,
            }),
        )
    }

    pub fn enum_decl(
        &self,
        position: Position,
        name: Identifier<'a>,
        variants: &'a [Identifier<'a>],
        visibility: Option<Visibility>,
    ) -> &'a Stmt<'a> {
        self.stmt(
            position,
            StmtKind::Enum(EnumDecl {
                name,
                variants,
                visibility,
            }),
        )
    }

    pub fn if_stmt(
        &self,
        position: Position,
        branches: &'a [ConditionalBranch<'a>],
        else_branch: Option<&'a Block<'a>>,
    ) -> &'a Stmt<'a> {
        self.stmt(
            position,
            StmtKind::If(IfStmt {
                branches,
                else_branch,
            }),
        )
    }

    pub fn loop_stmt(
        &self,
        position: Position,
        kind: LoopKind<'a>,
        body: &'a Block<'a>,
    ) -> &'a Stmt<'a> {
        self.stmt(position, StmtKind::Loop(LoopStmt { kind, body }))
    }

    pub fn block(&self, position: Position, statements: &'a [&'a Stmt<'a>]) -> &'a Block<'a> {
        self.arena.alloc(Block {
            statements,
            position,
        })
    }

    pub fn block_stmt(&self, block: &'a Block<'a>) -> &'a Stmt<'a> {
        self.stmt(block.position, StmtKind::Block(block))
    }

    pub fn return_stmt(&self, position: Position, value: Option<&'a Expr<'a>>) -> &'a Stmt<'a> {
        self.stmt(position, StmtKind::Return(value))
    }

    pub fn break_stmt(&self, position: Position) -> &'a Stmt<'a> {
        self.stmt(position, StmtKind::Break)
    }

    pub fn continue_stmt(&self, position: Position) -> &'a Stmt<'a> {
        self.stmt(position, StmtKind::Continue)
    }

    pub fn print(&self, position: Position, args: &'a [&'a Expr<'a>]) -> &'a Stmt<'a> {
        self.stmt(position, StmtKind::Print(args))
    }

    pub fn use_directive(
        &self,
        position: Position,
        module: Identifier<'a>,
        alias: Option<Identifier<'a>>,
    ) -> &'a Stmt<'a> {
        self.stmt(position, StmtKind::Use(UseDirective { module, alias }))
    }

    fn ty(&self, position: Position, kind: TypeKind<'a>) -> &'a TypeNode<'a> {
        self.arena.alloc(TypeNode {
            id: self.fresh_id(),
            position,
            kind,
        })
    }

    pub fn basic_type(&self, position: Position, basic: BasicType) -> &'a TypeNode<'a> {
        self.ty(position, TypeKind::Basic(basic))
    }

    pub fn pointer_type(&self, position: Position, pointee: &'a TypeNode<'a>) -> &'a TypeNode<'a> {
        self.ty(position, TypeKind::Pointer(pointee))
    }

    pub fn array_type(
        &self,
        position: Position,
        element: &'a TypeNode<'a>,
        length: Option<u64>,
    ) -> &'a TypeNode<'a> {
        self.ty(position, TypeKind::Array { element, length })
    }

    pub fn function_type(
        &self,
        position: Position,
        params: &'a [&'a TypeNode<'a>],
        return_type: &'a TypeNode<'a>,
    ) -> &'a TypeNode<'a> {
        self.ty(
            position,
            TypeKind::Function {
                params,
                return_type,
            },
        )
    }

    pub fn named_type(&self, position: Position, name: &str) -> &'a TypeNode<'a> {
        let name = self.arena.alloc_str(name);
        self.ty(position, TypeKind::Named(name))
    }

    pub fn module(
        &self,
        name: Identifier<'a>,
        explicit_name: bool,
        path: &str,
        source: &str,
        items: &'a [&'a Stmt<'a>],
    ) -> &'a Module<'a> {
        self.arena.alloc(Module {
            id: self.fresh_id(),
            name,
            explicit_name,
            path: self.arena.alloc_str(path),
            source: self.arena.alloc_str(source),
            items,
        })
    }

    pub fn program(&self, modules: &'a [&'a Module<'a>]) -> &'a Program<'a> {
        self.arena.alloc(Program { modules })
    }
}
