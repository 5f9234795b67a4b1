//! Node identity and categories across a parsed and checked program.

use cinder_ast::nodes::{
    AstNode, Block, Category, Expr, ExprKind, LoopKind, NodeId, NodeKind, Stmt, StmtKind,
};
use cinder_ast::{Arena, Builder, Diagnostics};
use cinder_parser::parse_program;
use rustc_hash::FxHashSet;

use crate::utils::with_typed_context;

fn collect_block<'a>(block: &'a Block<'a>, out: &mut Vec<&'a Expr<'a>>) {
    for stmt in block.statements {
        collect_stmt(stmt, out);
    }
}

fn collect_stmt<'a>(stmt: &'a Stmt<'a>, out: &mut Vec<&'a Expr<'a>>) {
    match &stmt.kind {
        StmtKind::Expression(expr) => collect_expr(expr, out),
        StmtKind::VarDecl(decl) => {
            if let Some(value) = decl.value {
                collect_expr(value, out);
            }
        }
        StmtKind::Function(function) => collect_block(function.body, out),
        StmtKind::If(if_stmt) => {
            for branch in if_stmt.branches {
                collect_expr(branch.condition, out);
                collect_block(branch.body, out);
            }
            if let Some(block) = if_stmt.else_branch {
                collect_block(block, out);
            }
        }
        StmtKind::Loop(loop_stmt) => {
            match &loop_stmt.kind {
                LoopKind::Infinite => {}
                LoopKind::While { condition } => collect_expr(condition, out),
                LoopKind::For {
                    init,
                    condition,
                    step,
                } => {
                    if let Some(init) = init {
                        collect_stmt(init, out);
                    }
                    if let Some(condition) = condition {
                        collect_expr(condition, out);
                    }
                    if let Some(step) = step {
                        collect_expr(step, out);
                    }
                }
            }
            collect_block(loop_stmt.body, out);
        }
        StmtKind::Block(block) => collect_block(block, out),
        StmtKind::Return(Some(value)) => collect_expr(value, out),
        StmtKind::Print(args) => args.iter().for_each(|arg| collect_expr(arg, out)),
        _ => {}
    }
}

fn collect_expr<'a>(expr: &'a Expr<'a>, out: &mut Vec<&'a Expr<'a>>) {
    out.push(expr);
    match &expr.kind {
        ExprKind::Binary { left, right, .. } => {
            collect_expr(left, out);
            collect_expr(right, out);
        }
        ExprKind::Unary { operand, .. } | ExprKind::Postfix { operand, .. } => {
            collect_expr(operand, out);
        }
        ExprKind::Assign { target, value, .. } => {
            collect_expr(target, out);
            collect_expr(value, out);
        }
        ExprKind::Ternary {
            condition,
            then_branch,
            else_branch,
        } => {
            collect_expr(condition, out);
            collect_expr(then_branch, out);
            collect_expr(else_branch, out);
        }
        ExprKind::Call { callee, args } => {
            collect_expr(callee, out);
            args.iter().for_each(|arg| collect_expr(arg, out));
        }
        ExprKind::Member { object, .. } => collect_expr(object, out),
        ExprKind::Index { object, index } => {
            collect_expr(object, out);
            collect_expr(index, out);
        }
        ExprKind::ArrayLiteral(elements) => elements.iter().for_each(|e| collect_expr(e, out)),
        ExprKind::Grouping(inner) => collect_expr(inner, out),
        ExprKind::Literal(_) | ExprKind::Identifier(_) => {}
    }
}

const SAMPLE: &str = "\
fn fib(n: int) -> int {
    if n < 2 {
        return n;
    }
    return fib(n - 1) + fib(n - 2);
}

fn main() -> int {
    let values: [int; 3] = [fib(1), fib(2), (fib(3))];
    let total = 0;
    loop [let i = 0; i < 3; i++] {
        total += values[i];
    }
    print(total > 2 ? total : -total);
    return 0;
}
";

#[test]
fn node_ids_are_unique_within_an_arena() {
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let program = parse_program(
        &builder,
        [("a.cnd", SAMPLE), ("b.cnd", "let shared = 1 + 2;")],
        &mut diagnostics,
    );
    let mut exprs = Vec::new();
    for module in program.modules() {
        for item in module.items {
            collect_stmt(item, &mut exprs);
        }
    }
    let ids: FxHashSet<NodeId> = exprs.iter().map(|expr| expr.id).collect();
    assert_eq!(ids.len(), exprs.len());
    assert!(!ids.contains(&NodeId(0)));
    assert!(ids.iter().all(|id| id.0 <= builder.node_count()));
}

#[test]
fn every_value_expression_is_typed() {
    with_typed_context(&[("main.cnd", SAMPLE)], |context| {
        let mut exprs = Vec::new();
        for (_, function) in context.functions() {
            collect_block(function.body, &mut exprs);
        }
        for expr in exprs {
            assert!(
                context.expr_type(expr).is_some(),
                "untyped {:?} at {}",
                expr.node_kind(),
                expr.position
            );
        }
    });
}

#[test]
fn erased_view_reports_category() {
    let arena = Arena::new();
    let builder = Builder::new(&arena);
    let mut diagnostics = Diagnostics::new();
    let program = parse_program(&builder, [("a.cnd", SAMPLE)], &mut diagnostics);
    let main = program.modules[0].items[1];
    let node = AstNode::from(main);
    assert_eq!(node.kind(), NodeKind::Function);
    assert_eq!(node.category(), Category::Statement);
    assert_eq!(node.id(), main.id);

    let function = main.as_function().unwrap();
    let return_type = AstNode::from(function.return_type.unwrap());
    assert_eq!(return_type.category(), Category::Type);
    assert_eq!(return_type.kind(), NodeKind::BasicType);
}
