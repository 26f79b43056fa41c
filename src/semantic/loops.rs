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

//! Loop analysis (§4.9): `for`-in / `while`, iterable typing, loop-variable
//! immutability, label resolution, and loops as array-producing expressions.
//!
//! `for`-in and `while` are both [`crate::ast::ExprKind`] variants analyzed
//! through the same `analyze_expr(expr, ctx)` entry point as every other
//! expression (§9 "unified block semantics"): whether a loop is a statement
//! or an array producer is decided entirely by whether `ctx` is an array
//! type, exactly like an `{ … }` block's role is decided by its position.

use super::Analyzer;
use crate::ast::{Block, Expression, Identifier};
use crate::error::SemanticError;
use crate::symbols::{FrameTag, Mutability, Symbol};
use crate::types::Type;

impl Analyzer {
    pub(super) fn analyze_for_in(
        &mut self,
        var: &Identifier,
        var_type: Option<&Type>,
        iter: &Expression,
        body: &Block,
        label: Option<&str>,
        ctx: Option<&Type>,
        expr: &Expression,
    ) -> Type {
        let iter_ty = self.analyze_expr(iter, None);

        let (element_type, bounded) = match &iter_ty {
            Type::Range { element, bounded } => ((**element).clone(), *bounded),
            t if t.is_array() => (t.element_type().unwrap_or(Type::Unknown), true),
            Type::Unknown => (Type::Unknown, true),
            other => {
                return self.emit(SemanticError::TypeMismatch {
                    expected: "range or array".to_string(),
                    found: other.to_string(),
                    span: iter.span.clone(),
                });
            }
        };

        let produces_array = ctx.is_some_and(Type::is_array);

        if !bounded && produces_array {
            self.emit(SemanticError::UnboundedRangeInExpressionLoop { span: expr.span.clone() });
        }

        let loop_var_type = match var_type {
            Some(declared) if !element_type.is_unknown() => {
                match crate::types::check_convert(&element_type, declared, false) {
                    Ok(_) => declared.clone(),
                    Err(_) => self.emit(SemanticError::TypeMismatch {
                        expected: declared.to_string(),
                        found: element_type.to_string(),
                        span: var.span.clone(),
                    }),
                }
            }
            Some(declared) => declared.clone(),
            None => element_type.clone(),
        };

        let produce_elem_ctx = ctx.filter(|t| t.is_array()).and_then(|t| t.element_type());

        let loop_frame = self.symbols.enter_loop_scope(label.map(str::to_string), produce_elem_ctx.clone(), &expr.span);
        let loop_frame = match loop_frame {
            Ok(idx) => Some(idx),
            Err(err) => {
                self.emit(err);
                self.symbols.enter_scope(FrameTag::Plain);
                None
            }
        };
        let _ = self.symbols.declare(Symbol::new(var.name.clone(), loop_var_type, Mutability::LoopVar, true, var.span.clone()));

        self.analyze_block_stmts(body, produce_elem_ctx.as_ref());
        self.symbols.exit_scope();
        let _ = loop_frame;

        match ctx {
            Some(t) if t.is_array() => t.clone(),
            Some(_) => self.emit(SemanticError::TypeMismatch {
                expected: ctx.unwrap().to_string(),
                found: "array produced by a for-in loop".to_string(),
                span: expr.span.clone(),
            }),
            None => Type::void(),
        }
    }

    pub(super) fn analyze_while(
        &mut self,
        cond: &Expression,
        body: &Block,
        label: Option<&str>,
        ctx: Option<&Type>,
        expr: &Expression,
    ) -> Type {
        if ctx.is_some_and(Type::is_array) {
            self.emit(SemanticError::TypeMismatch {
                expected: ctx.unwrap().to_string(),
                found: "void ('while' never produces a value)".to_string(),
                span: expr.span.clone(),
            });
        }

        let cond_ty = self.analyze_expr(cond, Some(&Type::bool()));
        if !cond_ty.is_unknown() && !cond_ty.is_bool() {
            self.emit(SemanticError::TypeMismatch { expected: "bool".to_string(), found: cond_ty.to_string(), span: cond.span.clone() });
        }

        match self.symbols.enter_loop_scope(label.map(str::to_string), None, &expr.span) {
            Ok(_) => {}
            Err(err) => {
                self.emit(err);
                self.symbols.enter_scope(FrameTag::Plain);
            }
        }
        self.analyze_block_stmts(body, None);
        self.symbols.exit_scope();

        Type::void()
    }
}
