use core::fmt;
use std::fmt::{Display, Formatter};

/// One-based source coordinates of the first character of a node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Sequential node identifier, unique within one arena. Zero is never handed out.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Category {
    Expression,
    Statement,
    Type,
}

/// Closed set of concrete node kinds across all three categories.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NodeKind {
    Literal,
    Identifier,
    Binary,
    Unary,
    Postfix,
    Assign,
    Ternary,
    Call,
    Member,
    Index,
    ArrayLiteral,
    Grouping,

    ExpressionStatement,
    VarDecl,
    Function,
    Struct,
    Enum,
    If,
    Loop,
    Block,
    Return,
    Break,
    Continue,
    Print,
    Use,

    BasicType,
    PointerType,
    ArrayType,
    FunctionType,
    NamedType,
}

impl NodeKind {
    #[must_use]
    pub fn category(self) -> Category {
        match self {
            NodeKind::Literal
            | NodeKind::Identifier
            | NodeKind::Binary
            | NodeKind::Unary
            | NodeKind::Postfix
            | NodeKind::Assign
            | NodeKind::Ternary
            | NodeKind::Call
            | NodeKind::Member
            | NodeKind::Index
            | NodeKind::ArrayLiteral
            | NodeKind::Grouping => Category::Expression,
            NodeKind::ExpressionStatement
            | NodeKind::VarDecl
            | NodeKind::Function
            | NodeKind::Struct
            | NodeKind::Enum
            | NodeKind::If
            | NodeKind::Loop
            | NodeKind::Block
            | NodeKind::Return
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Print
            | NodeKind::Use => Category::Statement,
            NodeKind::BasicType
            | NodeKind::PointerType
            | NodeKind::ArrayType
            | NodeKind::FunctionType
            | NodeKind::NamedType => Category::Type,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Identifier<'a> {
    pub name: &'a str,
    pub position: Position,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LiteralValue<'a> {
    Int(i64),
    Float(f64),
    Str(&'a str),
    Char(u8),
    Bool(bool),
    Null,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperatorClass {
    Arithmetic,
    Bitwise,
    Shift,
    Equality,
    Relational,
    Logical,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    #[must_use]
    pub fn class(self) -> OperatorClass {
        match self {
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Pow => OperatorClass::Arithmetic,
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => OperatorClass::Bitwise,
            BinaryOp::Shl | BinaryOp::Shr => OperatorClass::Shift,
            BinaryOp::Eq | BinaryOp::Ne => OperatorClass::Equality,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => OperatorClass::Relational,
            BinaryOp::And | BinaryOp::Or => OperatorClass::Logical,
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    Deref,
    AddressOf,
}

impl UnaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Deref => "*",
            UnaryOp::AddressOf => "&",
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl PostfixOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            PostfixOp::Increment => "++",
            PostfixOp::Decrement => "--",
        }
    }
}

impl Display for PostfixOp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    /// The arithmetic operator a compound assignment applies, `None` for plain `=`.
    #[must_use]
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
        }
    }
}

#[derive(Debug)]
pub struct Expr<'a> {
    pub id: NodeId,
    pub position: Position,
    pub kind: ExprKind<'a>,
}

#[derive(Debug)]
pub enum ExprKind<'a> {
    Literal(LiteralValue<'a>),
    Identifier(&'a str),
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Unary {
        op: UnaryOp,
        operand: &'a Expr<'a>,
    },
    Postfix {
        op: PostfixOp,
        operand: &'a Expr<'a>,
    },
    Assign {
        op: AssignOp,
        target: &'a Expr<'a>,
        value: &'a Expr<'a>,
    },
    Ternary {
        condition: &'a Expr<'a>,
        then_branch: &'a Expr<'a>,
        else_branch: &'a Expr<'a>,
    },
    Call {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    Member {
        object: &'a Expr<'a>,
        member: Identifier<'a>,
    },
    Index {
        object: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },
    ArrayLiteral(&'a [&'a Expr<'a>]),
    Grouping(&'a Expr<'a>),
}

impl<'a> Expr<'a> {
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self.kind {
            ExprKind::Literal(_) => NodeKind::Literal,
            ExprKind::Identifier(_) => NodeKind::Identifier,
            ExprKind::Binary { .. } => NodeKind::Binary,
            ExprKind::Unary { .. } => NodeKind::Unary,
            ExprKind::Postfix { .. } => NodeKind::Postfix,
            ExprKind::Assign { .. } => NodeKind::Assign,
            ExprKind::Ternary { .. } => NodeKind::Ternary,
            ExprKind::Call { .. } => NodeKind::Call,
            ExprKind::Member { .. } => NodeKind::Member,
            ExprKind::Index { .. } => NodeKind::Index,
            ExprKind::ArrayLiteral(_) => NodeKind::ArrayLiteral,
            ExprKind::Grouping(_) => NodeKind::Grouping,
        }
    }

    /// Strips any number of enclosing parentheses.
    #[must_use]
    pub fn ungrouped(&'a self) -> &'a Expr<'a> {
        let mut expr = self;
        while let ExprKind::Grouping(inner) = expr.kind {
            expr = inner;
        }
        expr
    }

    /// Whether the expression denotes a storage location that can be assigned to.
    #[must_use]
    pub fn is_place(&self) -> bool {
        match &self.ungrouped().kind {
            ExprKind::Identifier(_) | ExprKind::Member { .. } | ExprKind::Index { .. } => true,
            ExprKind::Unary { op, .. } => *op == UnaryOp::Deref,
            _ => false,
        }
    }

    #[must_use]
    pub fn as_identifier(&self) -> Option<&'a str> {
        if let ExprKind::Identifier(name) = self.kind {
            Some(name)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub struct Stmt<'a> {
    pub id: NodeId,
    pub position: Position,
    pub kind: StmtKind<'a>,
}

#[derive(Debug)]
pub enum StmtKind<'a> {
    Expression(&'a Expr<'a>),
    VarDecl(VarDecl<'a>),
    Function(FunctionDecl<'a>),
    Struct(StructDecl<'a>),
    Enum(EnumDecl<'a>),
    If(IfStmt<'a>),
    Loop(LoopStmt<'a>),
    Block(&'a Block<'a>),
    Return(Option<&'a Expr<'a>>),
    Break,
    Continue,
    Print(&'a [&'a Expr<'a>]),
    Use(UseDirective<'a>),
}

/// `let` and `const` declarations.
#[derive(Debug)]
pub struct VarDecl<'a> {
    pub name: Identifier<'a>,
    pub ty: Option<&'a TypeNode<'a>>,
    pub value: Option<&'a Expr<'a>>,
    pub is_const: bool,
    /// `None` when no `pub`/`priv` modifier was written.
    pub visibility: Option<Visibility>,
}

/// A parameter as written. Name and type are optional so that a partially
/// parsed signature still reaches the checker, which rejects it.
#[derive(Debug)]
pub struct Param<'a> {
    pub name: Option<Identifier<'a>>,
    pub ty: Option<&'a TypeNode<'a>>,
    pub position: Position,
}

#[derive(Debug)]
pub struct FunctionDecl<'a> {
    pub name: Identifier<'a>,
    pub params: &'a [Param<'a>],
    pub return_type: Option<&'a TypeNode<'a>>,
    pub body: &'a Block<'a>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug)]
pub struct Field<'a> {
    pub name: Identifier<'a>,
    pub ty: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct StructDecl<'a> {
    pub name: Identifier<'a>,
    pub fields: &'a [Field<'a>],
    pub visibility: Option<Visibility>,
}

impl<'a> StructDecl<'a> {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field<'a>> {
        self.fields.iter().find(|f| f.name.name == name)
    }
}

#[derive(Debug)]
pub struct EnumDecl<'a> {
    pub name: Identifier<'a>,
    pub variants: &'a [Identifier<'a>],
    pub visibility: Option<Visibility>,
}

impl EnumDecl<'_> {
    #[must_use]
    pub fn has_variant(&self, name: &str) -> bool {
        self.variants.iter().any(|v| v.name == name)
    }
}

#[derive(Debug)]
pub struct ConditionalBranch<'a> {
    pub condition: &'a Expr<'a>,
    pub body: &'a Block<'a>,
}

/// `if` / `elif`* / `else`?. The first branch is the `if` arm.
#[derive(Debug)]
pub struct IfStmt<'a> {
    pub branches: &'a [ConditionalBranch<'a>],
    pub else_branch: Option<&'a Block<'a>>,
}

#[derive(Debug)]
pub enum LoopKind<'a> {
    Infinite,
    While {
        condition: &'a Expr<'a>,
    },
    For {
        init: Option<&'a Stmt<'a>>,
        condition: Option<&'a Expr<'a>>,
        step: Option<&'a Expr<'a>>,
    },
}

#[derive(Debug)]
pub struct LoopStmt<'a> {
    pub kind: LoopKind<'a>,
    pub body: &'a Block<'a>,
}

#[derive(Debug)]
pub struct Block<'a> {
    pub statements: &'a [&'a Stmt<'a>],
    pub position: Position,
}

/// `@use module as alias;`
#[derive(Debug)]
pub struct UseDirective<'a> {
    pub module: Identifier<'a>,
    pub alias: Option<Identifier<'a>>,
}

impl<'a> UseDirective<'a> {
    /// The name the module is bound to in the importing scope.
    #[must_use]
    pub fn binding(&self) -> Identifier<'a> {
        self.alias.unwrap_or(self.module)
    }
}

impl<'a> Stmt<'a> {
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self.kind {
            StmtKind::Expression(_) => NodeKind::ExpressionStatement,
            StmtKind::VarDecl(_) => NodeKind::VarDecl,
            StmtKind::Function(_) => NodeKind::Function,
            StmtKind::Struct(_) => NodeKind::Struct,
            StmtKind::Enum(_) => NodeKind::Enum,
            StmtKind::If(_) => NodeKind::If,
            StmtKind::Loop(_) => NodeKind::Loop,
            StmtKind::Block(_) => NodeKind::Block,
            StmtKind::Return(_) => NodeKind::Return,
            StmtKind::Break => NodeKind::Break,
            StmtKind::Continue => NodeKind::Continue,
            StmtKind::Print(_) => NodeKind::Print,
            StmtKind::Use(_) => NodeKind::Use,
        }
    }

    /// Name introduced by a declaration statement.
    #[must_use]
    pub fn declared_name(&self) -> Option<Identifier<'a>> {
        match &self.kind {
            StmtKind::VarDecl(decl) => Some(decl.name),
            StmtKind::Function(decl) => Some(decl.name),
            StmtKind::Struct(decl) => Some(decl.name),
            StmtKind::Enum(decl) => Some(decl.name),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionDecl<'a>> {
        if let StmtKind::Function(decl) = &self.kind {
            Some(decl)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_struct(&self) -> Option<&StructDecl<'a>> {
        if let StmtKind::Struct(decl) = &self.kind {
            Some(decl)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumDecl<'a>> {
        if let StmtKind::Enum(decl) = &self.kind {
            Some(decl)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BasicType {
    Int,
    Float,
    Double,
    Char,
    Bool,
    String,
    Void,
    /// Type of the `null` literal; only ever produced by the checker.
    Null,
}

impl BasicType {
    pub const ALL: &'static [BasicType] = &[
        BasicType::Int,
        BasicType::Float,
        BasicType::Double,
        BasicType::Char,
        BasicType::Bool,
        BasicType::String,
        BasicType::Void,
        BasicType::Null,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BasicType::Int => "int",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::Char => "char",
            BasicType::Bool => "bool",
            BasicType::String => "string",
            BasicType::Void => "void",
            BasicType::Null => "null",
        }
    }

    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            BasicType::Int | BasicType::Float | BasicType::Double | BasicType::Char
        )
    }

    #[must_use]
    pub fn is_integral(self) -> bool {
        matches!(self, BasicType::Int | BasicType::Char)
    }

    /// Rank used to pick the result of mixed arithmetic: char < int < float < double.
    #[must_use]
    pub fn numeric_rank(self) -> Option<u8> {
        match self {
            BasicType::Char => Some(0),
            BasicType::Int => Some(1),
            BasicType::Float => Some(2),
            BasicType::Double => Some(3),
            _ => None,
        }
    }
}

impl Display for BasicType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub struct TypeNode<'a> {
    pub id: NodeId,
    pub position: Position,
    pub kind: TypeKind<'a>,
}

#[derive(Debug)]
pub enum TypeKind<'a> {
    Basic(BasicType),
    Pointer(&'a TypeNode<'a>),
    Array {
        element: &'a TypeNode<'a>,
        length: Option<u64>,
    },
    Function {
        params: &'a [&'a TypeNode<'a>],
        return_type: &'a TypeNode<'a>,
    },
    /// User type referenced by name: a struct, an enum, or a module marker.
    Named(&'a str),
}

impl<'a> TypeNode<'a> {
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self.kind {
            TypeKind::Basic(_) => NodeKind::BasicType,
            TypeKind::Pointer(_) => NodeKind::PointerType,
            TypeKind::Array { .. } => NodeKind::ArrayType,
            TypeKind::Function { .. } => NodeKind::FunctionType,
            TypeKind::Named(_) => NodeKind::NamedType,
        }
    }

    #[must_use]
    pub fn as_basic(&self) -> Option<BasicType> {
        if let TypeKind::Basic(basic) = self.kind {
            Some(basic)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_basic(&self, expected: BasicType) -> bool {
        self.as_basic() == Some(expected)
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.is_basic(BasicType::Void)
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.as_basic().is_some_and(BasicType::is_numeric)
    }

    #[must_use]
    pub fn is_integral(&self) -> bool {
        self.as_basic().is_some_and(BasicType::is_integral)
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer(_))
    }

    #[must_use]
    pub fn as_named(&self) -> Option<&'a str> {
        if let TypeKind::Named(name) = self.kind {
            Some(name)
        } else {
            None
        }
    }
}

impl Display for TypeNode<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.kind {
            TypeKind::Basic(basic) => write!(f, "{basic}"),
            TypeKind::Pointer(pointee) => write!(f, "*{pointee}"),
            TypeKind::Array {
                element,
                length: Some(length),
            } => write!(f, "[{element}; {length}]"),
            TypeKind::Array {
                element,
                length: None,
            } => write!(f, "[{element}]"),
            TypeKind::Function {
                params,
                return_type,
            } => {
                let params = params
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "fn({params}) -> {return_type}")
            }
            TypeKind::Named(name) => f.write_str(name),
        }
    }
}

/// One source file. `name` comes from an `@module` directive or the file stem.
#[derive(Debug)]
pub struct Module<'a> {
    pub id: NodeId,
    pub name: Identifier<'a>,
    pub explicit_name: bool,
    pub path: &'a str,
    pub source: &'a str,
    pub items: &'a [&'a Stmt<'a>],
}

impl<'a> Module<'a> {
    /// Text of the one-based `line`, without its terminator.
    #[must_use]
    pub fn source_line(&self, line: u32) -> Option<&'a str> {
        let index = usize::try_from(line).ok()?.checked_sub(1)?;
        self.source.lines().nth(index)
    }
}

/// Root node handed to the checker and the code generator.
#[derive(Debug)]
pub struct Program<'a> {
    pub modules: &'a [&'a Module<'a>],
}

impl<'a> Program<'a> {
    pub fn modules(&self) -> impl Iterator<Item = &'a Module<'a>> + '_ {
        self.modules.iter().copied()
    }
}

/// Category-erased view over any expression, statement or type node.
#[derive(Clone, Copy, Debug)]
pub enum AstNode<'a> {
    Expression(&'a Expr<'a>),
    Statement(&'a Stmt<'a>),
    Type(&'a TypeNode<'a>),
}

impl AstNode<'_> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            AstNode::Expression(node) => node.id,
            AstNode::Statement(node) => node.id,
            AstNode::Type(node) => node.id,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            AstNode::Expression(node) => node.position,
            AstNode::Statement(node) => node.position,
            AstNode::Type(node) => node.position,
        }
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            AstNode::Expression(node) => node.node_kind(),
            AstNode::Statement(node) => node.node_kind(),
            AstNode::Type(node) => node.node_kind(),
        }
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.kind().category()
    }
}

impl<'a> From<&'a Expr<'a>> for AstNode<'a> {
    fn from(node: &'a Expr<'a>) -> Self {
        AstNode::Expression(node)
    }
}

impl<'a> From<&'a Stmt<'a>> for AstNode<'a> {
    fn from(node: &'a Stmt<'a>) -> Self {
        AstNode::Statement(node)
    }
}

impl<'a> From<&'a TypeNode<'a>> for AstNode<'a> {
    fn from(node: &'a TypeNode<'a>) -> Self {
        AstNode::Type(node)
    }
}
