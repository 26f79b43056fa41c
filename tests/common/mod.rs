//! Shared AST-construction helpers for integration tests.
//!
//! There is no parser in scope (§1 Non-goals), so every test builds its AST
//! by hand, the way `mir_tests.rs` builds MIR directly in the teacher.
//! `NodeId`s only need to be distinct within a single test, so each helper
//! takes an explicit id rather than running a global counter.

#![allow(dead_code)]

use hexen::ast::*;
use hexen::error::SourceSpan;
use hexen::types::Type;

pub fn span() -> SourceSpan {
    SourceSpan::unknown()
}

pub fn ident(name: &str) -> Identifier {
    Identifier::new(name, span())
}

pub fn expr(id: NodeId, kind: ExprKind) -> Expression {
    Expression::new(id, kind, span())
}

pub fn int_lit(id: NodeId, v: i64) -> Expression {
    expr(id, ExprKind::IntLit(v))
}

pub fn float_lit(id: NodeId, v: f64) -> Expression {
    expr(id, ExprKind::FloatLit(v))
}

pub fn bool_lit(id: NodeId, v: bool) -> Expression {
    expr(id, ExprKind::BoolLit(v))
}

pub fn ident_expr(id: NodeId, name: &str) -> Expression {
    expr(id, ExprKind::Identifier(name.to_string()))
}

pub fn binary(id: NodeId, op: BinaryOp, left: Expression, right: Expression) -> Expression {
    expr(id, ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) })
}

pub fn conversion(id: NodeId, value: Expression, target: Type) -> Expression {
    expr(id, ExprKind::Conversion { expr: Box::new(value), target })
}

pub fn array_lit(id: NodeId, elements: Vec<Expression>) -> Expression {
    expr(id, ExprKind::ArrayLit(elements))
}

pub fn array_copy(id: NodeId, value: Expression) -> Expression {
    expr(id, ExprKind::ArrayCopy(Box::new(value)))
}

pub fn array_access(id: NodeId, array: Expression, index: Expression) -> Expression {
    expr(id, ExprKind::ArrayAccess { array: Box::new(array), index: Box::new(index) })
}

pub fn property_access(id: NodeId, object: Expression, name: &str) -> Expression {
    expr(id, ExprKind::PropertyAccess { object: Box::new(object), name: name.to_string() })
}

pub fn range(id: NodeId, lo: Expression, hi: Option<Expression>, inclusive: bool) -> Expression {
    expr(id, ExprKind::Range { lo: Box::new(lo), hi: hi.map(Box::new), inclusive, step: None })
}

pub fn call(id: NodeId, name: &str, args: Vec<Expression>) -> Expression {
    expr(id, ExprKind::Call { callee: ident(name), args })
}

pub fn expr_block(id: NodeId, block: Block) -> Expression {
    expr(id, ExprKind::ExprBlock(block))
}

pub fn for_in(id: NodeId, var: &str, var_type: Option<Type>, iter: Expression, body: Block, label: Option<&str>) -> Expression {
    expr(
        id,
        ExprKind::ForIn { var: ident(var), var_type, iter: Box::new(iter), body, label: label.map(str::to_string) },
    )
}

pub fn while_loop(id: NodeId, cond: Expression, body: Block, label: Option<&str>) -> Expression {
    expr(id, ExprKind::While { cond: Box::new(cond), body, label: label.map(str::to_string) })
}

pub fn val_decl(id: NodeId, name: &str, ty: Option<Type>, init: Expression) -> Statement {
    Statement { id, kind: StmtKind::ValDecl { name: ident(name), ty, init }, span: span() }
}

pub fn mut_decl(id: NodeId, name: &str, ty: Type, init: Expression) -> Statement {
    Statement { id, kind: StmtKind::MutDecl { name: ident(name), ty, init }, span: span() }
}

pub fn assign(id: NodeId, lhs: Expression, rhs: Expression) -> Statement {
    Statement { id, kind: StmtKind::Assign { lhs, rhs }, span: span() }
}

pub fn return_stmt(id: NodeId, value: Option<Expression>) -> Statement {
    Statement { id, kind: StmtKind::Return { value }, span: span() }
}

pub fn produce(id: NodeId, value: Expression) -> Statement {
    Statement { id, kind: StmtKind::Produce { value }, span: span() }
}

pub fn if_stmt(id: NodeId, cond: Expression, then_block: Block, else_block: Option<Block>) -> Statement {
    Statement { id, kind: StmtKind::If { cond, then_block, else_block }, span: span() }
}

pub fn break_stmt(id: NodeId, label: Option<&str>) -> Statement {
    Statement { id, kind: StmtKind::Break { label: label.map(str::to_string) }, span: span() }
}

pub fn continue_stmt(id: NodeId, label: Option<&str>) -> Statement {
    Statement { id, kind: StmtKind::Continue { label: label.map(str::to_string) }, span: span() }
}

pub fn expr_stmt(id: NodeId, e: Expression) -> Statement {
    Statement { id, kind: StmtKind::ExprStmt(e), span: span() }
}

pub fn stmt_block(id: NodeId, block: Block) -> Statement {
    Statement { id, kind: StmtKind::StmtBlock(block), span: span() }
}

pub fn block(id: NodeId, stmts: Vec<Statement>) -> Block {
    Block { id, stmts, span: span() }
}

pub fn param(name: &str, is_mut: bool, ty: Type) -> Param {
    Param { name: ident(name), is_mut, ty }
}

pub fn func(id: NodeId, name: &str, params: Vec<Param>, return_type: Type, body: Block) -> FuncDecl {
    FuncDecl { id, name: ident(name), params, return_type, body, span: span() }
}

pub fn program(items: Vec<FuncDecl>) -> Program {
    Program { items, span: span() }
}

/// Build a single-function program, the common case for these tests.
pub fn single_fn_program(body_stmts: Vec<Statement>, return_type: Type) -> Program {
    program(vec![func(0, "main", vec![], return_type, block(1, body_stmts))])
}

/// `func(name, params, return_type) = { stmts }` plus a `main` that does
/// nothing, for call-site tests where only the callee's signature matters.
pub fn fn_with_caller(callee: FuncDecl, main_stmts: Vec<Statement>) -> Program {
    program(vec![callee, func(900, "main", vec![], Type::void(), block(901, main_stmts))])
}

pub fn error_kinds(outcome: &hexen::AnalysisOutcome) -> Vec<&str> {
    outcome.diagnostics.iter().map(|d| d.kind.as_str()).collect()
}

pub fn has_error(outcome: &hexen::AnalysisOutcome, kind: &str) -> bool {
    outcome.diagnostics.iter().any(|d| d.kind == kind)
}
