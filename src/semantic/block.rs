// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The unified block analyzer (§4.6): function bodies, statement blocks,
//! and expression blocks all share one traversal; only the `produce_ctx`
//! threaded through distinguishes them.

use super::{array, Analyzer};
use crate::ast::{Block, FuncDecl, Statement, StmtKind};
use crate::error::SemanticError;
use crate::symbols::{FrameTag, Mutability, Symbol};
use crate::types::Type;

/// Whether a straight-line path out of a block is guaranteed to produce a
/// value, return from the function, or neither — a pure structural
/// classifier over the AST (§9: "infrastructure only").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathEnd {
    Return,
    Produce,
    Neither,
}

fn path_terminator(block: &Block) -> PathEnd {
    match block.stmts.last() {
        None => PathEnd::Neither,
        Some(stmt) => match &stmt.kind {
            StmtKind::Return { .. } => PathEnd::Return,
            StmtKind::Produce { .. } => PathEnd::Produce,
            StmtKind::StmtBlock(inner) => path_terminator(inner),
            StmtKind::If { then_block, else_block: Some(else_block), .. } => {
                combine(path_terminator(then_block), path_terminator(else_block))
            }
            _ => PathEnd::Neither,
        },
    }
}

fn combine(a: PathEnd, b: PathEnd) -> PathEnd {
    match (a, b) {
        (PathEnd::Neither, _) | (_, PathEnd::Neither) => PathEnd::Neither,
        (PathEnd::Return, PathEnd::Return) => PathEnd::Return,
        _ => PathEnd::Produce,
    }
}

impl Analyzer {
    pub(super) fn analyze_function(&mut self, func: &FuncDecl) {
        self.symbols.enter_scope(FrameTag::Function { return_type: func.return_type.clone() });
        for param in &func.params {
            let _ = self.symbols.declare(Symbol::new(
                param.name.name.clone(),
                param.ty.clone(),
                if param.is_mut { Mutability::Mut } else { Mutability::Val },
                true,
                param.name.span.clone(),
            ));
        }

        self.analyze_block_stmts(&func.body, None);

        if func.return_type != Type::void() && !matches!(path_terminator(&func.body), PathEnd::Return) {
            self.emit(SemanticError::MissingReturn { name: func.name.name.clone(), span: func.body.span.clone() });
        }

        self.check_mut_param_return(func);
        self.symbols.exit_scope();
    }

    /// Analyzes a block appearing in a value position (§4.6 role 3):
    /// requires `ctx`, requires `->`/`return` coverage on every path.
    pub(super) fn analyze_expression_block(&mut self, block: &Block, ctx: Option<&Type>) -> Type {
        let Some(ctx) = ctx else {
            return self.emit(SemanticError::ExpressionBlockMissingContext { span: block.span.clone() });
        };

        self.symbols.enter_scope(FrameTag::Plain);
        self.analyze_block_stmts(block, Some(ctx));
        self.symbols.exit_scope();

        if matches!(path_terminator(block), PathEnd::Neither) {
            return self.emit(SemanticError::ExpressionBlockMissingProduce { span: block.span.clone() });
        }
        ctx.clone()
    }

    /// Analyzes a block appearing as a bare statement (§4.6 role 2): no
    /// value production, may contain `return`.
    pub(super) fn analyze_statement_block(&mut self, block: &Block) {
        self.symbols.enter_scope(FrameTag::Plain);
        self.analyze_block_stmts(block, None);
        self.symbols.exit_scope();
    }

    /// Walks every statement of `block` in source order. `produce_ctx` is
    /// `Some` only when this traversal is inside an expression block or an
    /// array-producing loop body, and is the type each `->` must unify with.
    pub(super) fn analyze_block_stmts(&mut self, block: &Block, produce_ctx: Option<&Type>) {
        for stmt in &block.stmts {
            if self.halted {
                return;
            }
            self.analyze_statement(stmt, produce_ctx);
        }
    }

    fn analyze_statement(&mut self, stmt: &Statement, produce_ctx: Option<&Type>) {
        match &stmt.kind {
            StmtKind::ValDecl { name, ty, init } => self.analyze_val_decl(name, ty, init),
            StmtKind::MutDecl { name, ty, init } => self.analyze_mut_decl(name, ty, init),
            StmtKind::Assign { lhs, rhs } => self.analyze_assign(lhs, rhs),
            StmtKind::Return { value } => self.analyze_return(value.as_ref(), &stmt.span),
            StmtKind::Produce { value } => self.analyze_produce(value, produce_ctx, &stmt.span),
            StmtKind::If { cond, then_block, else_block } => {
                let cond_ty = self.analyze_expr(cond, Some(&Type::bool()));
                if !cond_ty.is_unknown() && !cond_ty.is_bool() {
                    self.emit(SemanticError::TypeMismatch { expected: "bool".to_string(), found: cond_ty.to_string(), span: cond.span.clone() });
                }
                self.symbols.enter_scope(FrameTag::Plain);
                self.analyze_block_stmts(then_block, produce_ctx);
                self.symbols.exit_scope();
                if let Some(else_block) = else_block {
                    self.symbols.enter_scope(FrameTag::Plain);
                    self.analyze_block_stmts(else_block, produce_ctx);
                    self.symbols.exit_scope();
                }
            }
            StmtKind::Break { label } => self.analyze_break(label.as_deref(), &stmt.span),
            StmtKind::Continue { label } => self.analyze_continue(label.as_deref(), &stmt.span),
            StmtKind::ExprStmt(expr) => {
                self.analyze_expr(expr, None);
            }
            StmtKind::StmtBlock(block) => self.analyze_statement_block(block),
        }
    }

    fn analyze_return(&mut self, value: &Option<crate::ast::Expression>, span: &crate::error::SourceSpan) {
        let return_type = self.symbols.enclosing_return_type().cloned().unwrap_or(Type::void());
        match value {
            None => {
                if return_type != Type::void() {
                    self.emit(SemanticError::ReturnTypeMismatch { expected: return_type.to_string(), found: "void".to_string(), span: span.clone() });
                }
            }
            Some(expr) => {
                if return_type == Type::void() {
                    self.emit(SemanticError::ReturnValueInVoid { span: expr.span.clone() });
                    self.analyze_expr(expr, None);
                    return;
                }
                let actual = self.analyze_expr(expr, Some(&return_type));
                if !actual.is_unknown() && actual != return_type && crate::types::check_convert(&actual, &return_type, false).is_err() {
                    self.emit(SemanticError::ReturnTypeMismatch { expected: return_type.to_string(), found: actual.to_string(), span: expr.span.clone() });
                }
            }
        }
    }

    fn analyze_produce(&mut self, value: &crate::ast::Expression, produce_ctx: Option<&Type>, span: &crate::error::SourceSpan) {
        let Some(ctx) = produce_ctx else {
            self.emit(SemanticError::ProduceOutsideExpressionBlock { span: span.clone() });
            self.analyze_expr(value, None);
            return;
        };
        let ctx = ctx.clone();
        let actual = self.analyze_expr(value, Some(&ctx));
        // §3.4: a block production via `->` is a "new owner" position, exactly
        // like a function argument — a concrete array always requires `[..]`,
        // not only when it performs a conversion.
        if matches!(ctx, Type::Array { .. }) && array::call_argument_missing_copy(value) {
            self.emit(SemanticError::MissingExplicitArrayCopy { span: value.span.clone() });
            return;
        }
        self.check_assignable(&actual, &ctx, &value.span);
    }

    fn analyze_break(&mut self, label: Option<&str>, span: &crate::error::SourceSpan) {
        if let Err(err) = self.symbols.resolve_loop_label(label, span) {
            self.emit(err);
        }
    }

    fn analyze_continue(&mut self, label: Option<&str>, span: &crate::error::SourceSpan) {
        if let Err(err) = self.symbols.resolve_loop_label(label, span) {
            let err = match err {
                SemanticError::BreakOutsideLoop { span } => SemanticError::ContinueOutsideLoop { span },
                other => other,
            };
            self.emit(err);
        }
    }
}
