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

//! Expression analysis: bidirectional context propagation (§4.4, §9).

use super::Analyzer;
use crate::ast::{BinaryOp, Expression, ExprKind, UnaryOp};
use crate::error::SemanticError;
use crate::types::{self, ConvertError, NumericKind, Type, UnifyError};

impl Analyzer {
    /// `analyze(expr, ctx?) -> type` (§4.4). `ctx` is the target type the
    /// surrounding construct expects; `None` means no expectation.
    pub(super) fn analyze_expr(&mut self, expr: &Expression, ctx: Option<&Type>) -> Type {
        if self.halted {
            return Type::Unknown;
        }
        let ty = match &expr.kind {
            ExprKind::IntLit(_) => self.analyze_int_lit(ctx, expr),
            ExprKind::FloatLit(_) => self.analyze_float_lit(ctx, expr),
            ExprKind::BoolLit(_) => Type::bool(),
            ExprKind::StrLit(_) => Type::string(),
            ExprKind::Undef => Type::Undef,
            ExprKind::Identifier(name) => self.analyze_identifier(name, ctx, expr),
            ExprKind::Binary { op, left, right } => self.analyze_binary(*op, left, right, ctx, expr),
            ExprKind::Unary { op, operand } => self.analyze_unary(*op, operand, expr),
            ExprKind::Conversion { expr: inner, target } => self.analyze_conversion(inner, target, expr),
            ExprKind::ArrayLit(elements) => self.analyze_array_lit(elements, ctx, expr),
            ExprKind::ArrayAccess { array, index } => self.analyze_array_access(array, index, expr),
            ExprKind::ArrayCopy(inner) => self.analyze_array_copy(inner),
            ExprKind::PropertyAccess { object, name } => self.analyze_property_access(object, name, expr),
            ExprKind::Range { lo, hi, inclusive: _, step } => self.analyze_range(lo, hi.as_deref(), step.as_deref(), expr),
            ExprKind::Call { callee, args } => self.analyze_call(callee, args, expr),
            ExprKind::ExprBlock(block) => self.analyze_expression_block(block, ctx),
            ExprKind::ForIn { var, var_type, iter, body, label } => self.analyze_for_in(var, var_type.as_ref(), iter, body, label.as_deref(), ctx, expr),
            ExprKind::While { cond, body, label } => self.analyze_while(cond, body, label.as_deref(), ctx, expr),
        };
        self.record(expr.id, ty)
    }

    fn analyze_int_lit(&mut self, ctx: Option<&Type>, expr: &Expression) -> Type {
        match types::unify_literal(ctx, &Type::ComptimeInt) {
            Ok(ty) => ty,
            Err(_) => self.emit(SemanticError::TypeMismatch {
                expected: ctx.map(ToString::to_string).unwrap_or_default(),
                found: "comptime_int".to_string(),
                span: expr.span.clone(),
            }),
        }
    }

    fn analyze_float_lit(&mut self, ctx: Option<&Type>, expr: &Expression) -> Type {
        match types::unify_literal(ctx, &Type::ComptimeFloat) {
            Ok(ty) => ty,
            Err(UnifyError::FloatNeedsExplicitForInt) => {
                let target = ctx.unwrap().to_string();
                self.emit(SemanticError::UnsafeImplicitConversion {
                    from: "comptime_float".to_string(),
                    to: target,
                    span: expr.span.clone(),
                })
            }
            Err(UnifyError::Incompatible) => self.emit(SemanticError::TypeMismatch {
                expected: ctx.map(ToString::to_string).unwrap_or_default(),
                found: "comptime_float".to_string(),
                span: expr.span.clone(),
            }),
        }
    }

    fn analyze_identifier(&mut self, name: &str, ctx: Option<&Type>, expr: &Expression) -> Type {
        let Some(symbol) = self.symbols.lookup(name) else {
            return self.emit(SemanticError::UndefinedIdentifier { name: name.to_string(), span: expr.span.clone() });
        };
        let symbol_ref = crate::ast::SymbolRef { name: symbol.name.clone(), ty: symbol.ty.clone(), declared_at: symbol.declared_at.clone() };
        self.annotations.record_symbol(expr.id, symbol_ref);
        if !symbol.initialized {
            return self.emit(SemanticError::UseBeforeInit { name: name.to_string(), span: expr.span.clone() });
        }
        let declared = symbol.ty.clone();
        if declared.is_comptime() {
            match types::unify_literal(ctx, &declared) {
                Ok(resolved) => resolved,
                Err(_) => declared,
            }
        } else {
            declared
        }
    }

    fn analyze_binary(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        ctx: Option<&Type>,
        expr: &Expression,
    ) -> Type {
        use BinaryOp::*;
        match op {
            Add | Sub | Mul | Mod => self.analyze_arith(op, left, right, ctx, expr),
            FloatDiv => self.analyze_float_div(left, right, ctx, expr),
            IntDiv => self.analyze_int_div(left, right, ctx, expr),
            Lt | Gt | Le | Ge | Eq | Ne => self.analyze_comparison(op, left, right, expr),
            And | Or => self.analyze_logical(left, right, expr),
        }
    }

    fn analyze_arith(
        &mut self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        ctx: Option<&Type>,
        expr: &Expression,
    ) -> Type {
        let lt = self.analyze_expr(left, ctx);
        let rt = self.analyze_expr(right, ctx);
        if lt.is_unknown() || rt.is_unknown() {
            return Type::Unknown;
        }
        if op == BinaryOp::Mod && (lt.is_float() || rt.is_float()) {
            let found = if lt.is_float() { lt.to_string() } else { rt.to_string() };
            return self.emit(SemanticError::ModuloOnFloat { found, span: expr.span.clone() });
        }
        match types::widen_binary(&lt, &rt, ctx) {
            Ok(result) => result,
            Err(types::BinaryTypeError::MixedConcrete { left, right }) => {
                self.emit(SemanticError::MixedConcreteRequiresExplicit { left: left.to_string(), right: right.to_string(), span: expr.span.clone() })
            }
            Err(types::BinaryTypeError::NotNumeric) => self.emit(SemanticError::TypeMismatch {
                expected: "numeric".to_string(),
                found: if !lt.is_numeric() { lt.to_string() } else { rt.to_string() },
                span: expr.span.clone(),
            }),
        }
    }

    fn analyze_float_div(&mut self, left: &Expression, right: &Expression, ctx: Option<&Type>, expr: &Expression) -> Type {
        let lt = self.analyze_expr(left, ctx);
        let rt = self.analyze_expr(right, ctx);
        if lt.is_unknown() || rt.is_unknown() {
            return Type::Unknown;
        }
        if !lt.is_numeric() || !rt.is_numeric() {
            return self.emit(SemanticError::TypeMismatch { expected: "numeric".to_string(), found: lt.to_string(), span: expr.span.clone() });
        }
        if lt.is_comptime() && rt.is_comptime() {
            return if lt.is_float() || rt.is_float() { Type::ComptimeFloat } else { Type::ComptimeFloat };
        }
        if lt == rt && lt.is_integer() && !lt.is_comptime() {
            return self.emit(SemanticError::FloatDivOnSameIntegers { ty: lt.to_string(), span: expr.span.clone() });
        }
        match types::widen_binary(&lt, &rt, None) {
            Ok(result) if result.is_float() => result,
            Ok(result) if result.is_comptime() => Type::ComptimeFloat,
            Ok(_) => Type::ComptimeFloat,
            Err(types::BinaryTypeError::MixedConcrete { left, right }) => {
                self.emit(SemanticError::MixedConcreteRequiresExplicit { left: left.to_string(), right: right.to_string(), span: expr.span.clone() })
            }
            Err(_) => self.emit(SemanticError::TypeMismatch { expected: "numeric".to_string(), found: lt.to_string(), span: expr.span.clone() }),
        }
    }

    fn analyze_int_div(&mut self, left: &Expression, right: &Expression, ctx: Option<&Type>, expr: &Expression) -> Type {
        let lt = self.analyze_expr(left, ctx);
        let rt = self.analyze_expr(right, ctx);
        if lt.is_unknown() || rt.is_unknown() {
            return Type::Unknown;
        }
        if lt.is_float() || rt.is_float() {
            let found = if lt.is_float() { lt.to_string() } else { rt.to_string() };
            return self.emit(SemanticError::IntegerDivOnFloat { found, span: expr.span.clone() });
        }
        if !lt.is_integer() || !rt.is_integer() {
            return self.emit(SemanticError::TypeMismatch { expected: "integer".to_string(), found: lt.to_string(), span: expr.span.clone() });
        }
        match types::widen_binary(&lt, &rt, ctx) {
            Ok(result) => result,
            Err(types::BinaryTypeError::MixedConcrete { left, right }) => {
                self.emit(SemanticError::MixedConcreteRequiresExplicit { left: left.to_string(), right: right.to_string(), span: expr.span.clone() })
            }
            Err(_) => self.emit(SemanticError::TypeMismatch { expected: "integer".to_string(), found: lt.to_string(), span: expr.span.clone() }),
        }
    }

    fn analyze_comparison(&mut self, op: BinaryOp, left: &Expression, right: &Expression, expr: &Expression) -> Type {
        let lt = self.analyze_expr(left, None);
        let rt = self.analyze_expr(right, None);
        if lt.is_unknown() || rt.is_unknown() {
            return Type::bool();
        }
        let same_category = (lt.is_numeric() && rt.is_numeric())
            || (lt.is_bool() && rt.is_bool())
            || (lt.is_string() && rt.is_string());
        if !same_category {
            return self.emit(SemanticError::TypeMismatch { expected: lt.to_string(), found: rt.to_string(), span: expr.span.clone() });
        }
        if lt.is_numeric() && rt.is_numeric() && !lt.is_comptime() && !rt.is_comptime() && lt != rt {
            return self.emit(SemanticError::MixedConcreteRequiresExplicit { left: lt.to_string(), right: rt.to_string(), span: expr.span.clone() });
        }
        let _ = op;
        Type::bool()
    }

    fn analyze_logical(&mut self, left: &Expression, right: &Expression, expr: &Expression) -> Type {
        let lt = self.analyze_expr(left, Some(&Type::bool()));
        let rt = self.analyze_expr(right, Some(&Type::bool()));
        if !lt.is_unknown() && !lt.is_bool() {
            return self.emit(SemanticError::TypeMismatch { expected: "bool".to_string(), found: lt.to_string(), span: expr.span.clone() });
        }
        if !rt.is_unknown() && !rt.is_bool() {
            return self.emit(SemanticError::TypeMismatch { expected: "bool".to_string(), found: rt.to_string(), span: expr.span.clone() });
        }
        Type::bool()
    }

    fn analyze_unary(&mut self, op: UnaryOp, operand: &Expression, expr: &Expression) -> Type {
        match op {
            UnaryOp::Neg => {
                let ty = self.analyze_expr(operand, None);
                if ty.is_unknown() {
                    return Type::Unknown;
                }
                if !ty.is_numeric() {
                    return self.emit(SemanticError::TypeMismatch { expected: "numeric".to_string(), found: ty.to_string(), span: expr.span.clone() });
                }
                ty
            }
            UnaryOp::Not => {
                let ty = self.analyze_expr(operand, Some(&Type::bool()));
                if !ty.is_unknown() && !ty.is_bool() {
                    return self.emit(SemanticError::TypeMismatch { expected: "bool".to_string(), found: ty.to_string(), span: expr.span.clone() });
                }
                Type::bool()
            }
        }
    }

    fn analyze_conversion(&mut self, inner: &Expression, target: &Type, expr: &Expression) -> Type {
        let source = self.analyze_expr(inner, None);
        if source.is_unknown() {
            return Type::Unknown;
        }
        match types::check_convert(&source, target, true) {
            Ok(outcome) => types::resolved_type(target, &outcome),
            Err(ConvertError::Nonsensical) => {
                self.emit(SemanticError::NonsensicalConversion { from: source.to_string(), to: target.to_string(), span: expr.span.clone() })
            }
            Err(ConvertError::ShapeMismatch { source_count, target_count }) => {
                self.emit(SemanticError::ArrayShapeMismatch { source_count, target_count, span: expr.span.clone() })
            }
            Err(ConvertError::MultiInferredAmbiguous) => {
                self.emit(SemanticError::MultiInferredDimensionAmbiguous { span: expr.span.clone() })
            }
            Err(ConvertError::RequiresExplicit) => unreachable!("explicit conversion never requires further explicitness"),
        }
    }

    fn analyze_array_access(&mut self, array: &Expression, index: &Expression, expr: &Expression) -> Type {
        let array_ty = self.analyze_expr(array, None);
        let index_ty = self.analyze_expr(index, None);
        if !index_ty.is_unknown() && !index_ty.is_integer() {
            self.emit(SemanticError::TypeMismatch { expected: "integer".to_string(), found: index_ty.to_string(), span: expr.span.clone() });
        }
        match array_ty.element_type() {
            Some(elem) => elem,
            None => {
                if array_ty.is_unknown() {
                    Type::Unknown
                } else {
                    self.emit(SemanticError::TypeMismatch { expected: "array".to_string(), found: array_ty.to_string(), span: expr.span.clone() })
                }
            }
        }
    }

    fn analyze_array_copy(&mut self, inner: &Expression) -> Type {
        self.analyze_expr(inner, None)
    }

    fn analyze_property_access(&mut self, object: &Expression, name: &str, expr: &Expression) -> Type {
        let object_ty = self.analyze_expr(object, None);
        if object_ty.is_unknown() {
            return Type::Unknown;
        }
        if name != "length" {
            return self.emit(SemanticError::UnknownProperty { name: name.to_string(), span: expr.span.clone() });
        }
        if !object_ty.is_array() {
            return self.emit(SemanticError::TypeMismatch { expected: "array".to_string(), found: object_ty.to_string(), span: expr.span.clone() });
        }
        match object_ty.leading_dimension() {
            Some(_) => Type::ComptimeInt,
            None => self.emit(SemanticError::LengthOnUnsizedArray { span: expr.span.clone() }),
        }
    }

    fn analyze_range(&mut self, lo: &Expression, hi: Option<&Expression>, step: Option<&Expression>, expr: &Expression) -> Type {
        let lo_ty = self.analyze_expr(lo, None);
        if !lo_ty.is_unknown() && !lo_ty.is_numeric() {
            self.emit(SemanticError::TypeMismatch { expected: "numeric".to_string(), found: lo_ty.to_string(), span: expr.span.clone() });
        }
        let hi_ty = hi.map(|hi| self.analyze_expr(hi, None));
        if let Some(step) = step {
            self.analyze_expr(step, None);
        }
        if let Some(hi_ty) = &hi_ty {
            if !lo_ty.is_unknown() && !hi_ty.is_unknown() {
                let both_int = lo_ty.is_integer() && hi_ty.is_integer();
                let both_float = lo_ty.is_float() && hi_ty.is_float();
                if !both_int && !both_float {
                    self.emit(SemanticError::TypeMismatch { expected: lo_ty.to_string(), found: hi_ty.to_string(), span: expr.span.clone() });
                }
            }
        }
        let element = if lo_ty.is_float() { lo_ty.clone() } else if lo_ty.is_unknown() { Type::Unknown } else { lo_ty.clone() };
        Type::Range { element: Box::new(element), bounded: hi.is_some() }
    }

    fn analyze_array_lit(&mut self, elements: &[Expression], ctx: Option<&Type>, expr: &Expression) -> Type {
        let elem_ctx = ctx.and_then(|t| t.element_type());
        if elements.is_empty() {
            return match ctx {
                Some(t) if t.is_array() => t.clone(),
                _ => self.emit(SemanticError::TypeMismatch {
                    expected: "array type".to_string(),
                    found: "empty array literal with no target type".to_string(),
                    span: expr.span.clone(),
                }),
            };
        }

        let elem_types: Vec<Type> = elements.iter().map(|e| self.analyze_expr(e, elem_ctx.as_ref())).collect();
        if elem_types.iter().any(Type::is_unknown) {
            return Type::Unknown;
        }

        if let Some(target) = ctx {
            if target.is_array() {
                if elem_types.len() != target.total_elements().unwrap_or(elem_types.len()) && target.leading_dimension().is_some() {
                    return self.emit(SemanticError::ArrayShapeMismatch {
                        source_count: elem_types.len(),
                        target_count: target.total_elements().unwrap_or(0),
                        span: expr.span.clone(),
                    });
                }
                return target.clone();
            }
        }

        // No usable context: infer a comptime array shape if every element is a
        // scalar comptime numeric of one kind, or a nested comptime array (uniform rank).
        if let Some(nested_dims) = elem_types[0].clone().into_array_dims() {
            for t in &elem_types[1..] {
                if t.clone().into_array_dims().as_deref() != Some(&nested_dims[..]) {
                    return self.emit(SemanticError::ArrayShapeMismatch { source_count: elem_types.len(), target_count: elem_types.len(), span: expr.span.clone() });
                }
            }
            let kind = match &elem_types[0] {
                Type::ComptimeArray { kind, .. } => *kind,
                _ => return self.emit(SemanticError::TypeMismatch { expected: "comptime array".to_string(), found: elem_types[0].to_string(), span: expr.span.clone() }),
            };
            let mut dims = vec![elements.len()];
            dims.extend(nested_dims);
            return Type::ComptimeArray { kind, dims };
        }

        let kind = if elem_types.iter().all(|t| matches!(t, Type::ComptimeInt)) {
            NumericKind::Int
        } else if elem_types.iter().all(Type::is_comptime) {
            NumericKind::Float
        } else {
            return self.emit(SemanticError::MixedConcreteRequiresExplicit {
                left: elem_types[0].to_string(),
                right: elem_types[1].to_string(),
                span: expr.span.clone(),
            });
        };
        Type::ComptimeArray { kind, dims: vec![elements.len()] }
    }
}

trait IntoArrayDims {
    fn into_array_dims(self) -> Option<Vec<usize>>;
}

impl IntoArrayDims for Type {
    fn into_array_dims(self) -> Option<Vec<usize>> {
        match self {
            Type::ComptimeArray { dims, .. } => Some(dims),
            _ => None,
        }
    }
}
