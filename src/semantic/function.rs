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

//! Function signature registration and call checking (§4.7, §5).

use super::{array, Analyzer};
use crate::ast::{Block, Expression, ExprKind, FuncDecl, Identifier, Statement, StmtKind};
use crate::error::SemanticError;
use crate::symbols::{FunctionSignature, Param as ParamSig};
use crate::types::Type;

impl Analyzer {
    /// Pre-pass (§5): install every function's signature before any body is
    /// analyzed, so forward and mutually recursive calls resolve.
    pub(super) fn register_signature(&mut self, func: &FuncDecl) {
        if let Some(existing) = self.functions.get(&func.name.name) {
            let previous = existing.declared_at.clone();
            self.emit(SemanticError::DuplicateDeclaration { name: func.name.name.clone(), span: func.span.clone(), previous });
            return;
        }
        let params = func
            .params
            .iter()
            .map(|p| ParamSig { name: p.name.name.clone(), is_mut: p.is_mut, ty: p.ty.clone() })
            .collect();
        self.functions.insert(
            func.name.name.clone(),
            FunctionSignature { name: func.name.name.clone(), params, return_type: func.return_type.clone(), declared_at: func.span.clone() },
        );
    }

    pub(super) fn analyze_call(&mut self, callee: &Identifier, args: &[Expression], expr: &Expression) -> Type {
        let Some(sig) = self.functions.get(&callee.name).cloned() else {
            return self.emit(SemanticError::UndefinedIdentifier { name: callee.name.clone(), span: callee.span.clone() });
        };
        self.annotations.record_symbol(
            expr.id,
            crate::ast::SymbolRef { name: sig.name.clone(), ty: sig.return_type.clone(), declared_at: sig.declared_at.clone() },
        );

        if args.len() != sig.params.len() {
            return self.emit(SemanticError::ArgCountMismatch {
                name: sig.name.clone(),
                expected: sig.params.len(),
                found: args.len(),
                span: expr.span.clone(),
            });
        }

        for (index, (arg, param)) in args.iter().zip(sig.params.iter()).enumerate() {
            let actual = self.analyze_expr(arg, Some(&param.ty));
            if matches!(param.ty, Type::Array { .. }) && array::call_argument_missing_copy(arg) {
                self.emit(SemanticError::MissingExplicitArrayCopy { span: arg.span.clone() });
                continue;
            }
            if actual.is_unknown() {
                continue;
            }
            if actual != param.ty && crate::types::check_convert(&actual, &param.ty, false).is_err() {
                self.emit(SemanticError::ArgTypeMismatch {
                    name: sig.name.clone(),
                    index,
                    expected: param.ty.to_string(),
                    found: actual.to_string(),
                    span: arg.span.clone(),
                });
            }
        }

        sig.return_type.clone()
    }

    /// §4.2: a function that reassigns one of its own `mut` parameters (a
    /// call-by-reference style mutation) must declare a non-`void` return
    /// type, since the caller otherwise has no way to observe the change.
    pub(super) fn check_mut_param_return(&mut self, func: &FuncDecl) {
        if func.return_type != Type::void() {
            return;
        }
        let mut_params: Vec<&str> = func.params.iter().filter(|p| p.is_mut).map(|p| p.name.name.as_str()).collect();
        if mut_params.is_empty() {
            return;
        }
        if let Some(param) = find_mut_param_assignment(&func.body, &mut_params) {
            self.emit(SemanticError::MutParamRequiresReturn { name: func.name.name.clone(), param: param.to_string(), span: func.span.clone() });
        }
    }
}

fn find_mut_param_assignment<'a>(block: &'a Block, params: &[&str]) -> Option<&'a str> {
    block.stmts.iter().find_map(|stmt| find_in_stmt(stmt, params))
}

fn find_in_stmt<'a>(stmt: &'a Statement, params: &[&str]) -> Option<&'a str> {
    match &stmt.kind {
        StmtKind::Assign { lhs, rhs } => find_in_expr(rhs, params).or_else(|| match &lhs.kind {
            ExprKind::Identifier(name) => params.iter().find(|p| **p == name).copied(),
            ExprKind::ArrayAccess { array, index } => find_in_expr(index, params).or_else(|| match &array.kind {
                ExprKind::Identifier(name) => params.iter().find(|p| **p == name).copied(),
                _ => find_in_expr(array, params),
            }),
            _ => None,
        }),
        StmtKind::ValDecl { init, .. } | StmtKind::MutDecl { init, .. } => find_in_expr(init, params),
        StmtKind::Return { value } => value.as_ref().and_then(|v| find_in_expr(v, params)),
        StmtKind::Produce { value } => find_in_expr(value, params),
        StmtKind::If { cond, then_block, else_block } => find_in_expr(cond, params)
            .or_else(|| find_mut_param_assignment(then_block, params))
            .or_else(|| else_block.as_ref().and_then(|b| find_mut_param_assignment(b, params))),
        StmtKind::ExprStmt(expr) => find_in_expr(expr, params),
        StmtKind::StmtBlock(block) => find_mut_param_assignment(block, params),
        StmtKind::Break { .. } | StmtKind::Continue { .. } => None,
    }
}

fn find_in_expr<'a>(expr: &'a Expression, params: &[&str]) -> Option<&'a str> {
    match &expr.kind {
        ExprKind::Binary { left, right, .. } => find_in_expr(left, params).or_else(|| find_in_expr(right, params)),
        ExprKind::Unary { operand, .. } => find_in_expr(operand, params),
        ExprKind::Conversion { expr, .. } => find_in_expr(expr, params),
        ExprKind::ArrayLit(elems) => elems.iter().find_map(|e| find_in_expr(e, params)),
        ExprKind::ArrayAccess { array, index } => find_in_expr(array, params).or_else(|| find_in_expr(index, params)),
        ExprKind::ArrayCopy(inner) => find_in_expr(inner, params),
        ExprKind::PropertyAccess { object, .. } => find_in_expr(object, params),
        ExprKind::Range { lo, hi, step, .. } => find_in_expr(lo, params)
            .or_else(|| hi.as_deref().and_then(|h| find_in_expr(h, params)))
            .or_else(|| step.as_deref().and_then(|s| find_in_expr(s, params))),
        ExprKind::Call { args, .. } => args.iter().find_map(|a| find_in_expr(a, params)),
        ExprKind::ExprBlock(block) => find_mut_param_assignment(block, params),
        ExprKind::ForIn { iter, body, .. } => find_in_expr(iter, params).or_else(|| find_mut_param_assignment(body, params)),
        ExprKind::While { cond, body, .. } => find_in_expr(cond, params).or_else(|| find_mut_param_assignment(body, params)),
        _ => None,
    }
}
