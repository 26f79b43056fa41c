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

//! Declaration and assignment analysis (§4.5).

use super::{array, Analyzer};
use crate::ast::{Expression, ExprKind, Identifier};
use crate::error::SemanticError;
use crate::symbols::{Mutability, Symbol};
use crate::types::Type;

impl Analyzer {
    pub(super) fn analyze_val_decl(&mut self, name: &Identifier, ty: &Option<Type>, init: &Expression) {
        if matches!(init.kind, ExprKind::Undef) {
            self.emit(SemanticError::UndefOnVal { span: init.span.clone() });
            return;
        }

        let declared_type = match ty {
            Some(t) => {
                let actual = self.analyze_expr(init, Some(t));
                let is_concrete_array = matches!(&actual, Type::Array { .. });
                let conversion_happens = is_concrete_array && matches!(init.kind, ExprKind::Conversion { .. });
                if array::initializer_missing_copy(init, is_concrete_array, conversion_happens) {
                    self.emit(SemanticError::MissingExplicitArrayCopy { span: init.span.clone() });
                    t.clone()
                } else {
                    // §4.8: an inferred `_` in `t` resolves to a concrete size
                    // here, so `h`'s declared type carries the resolved shape
                    // rather than the literal `_` the user wrote (Scenario E).
                    self.check_assignable(&actual, t, &init.span)
                }
            }
            None => self.analyze_expr(init, None),
        };

        let _ = self.symbols.declare(Symbol::new(
            name.name.clone(),
            declared_type,
            Mutability::Val,
            true,
            name.span.clone(),
        ));
    }

    pub(super) fn analyze_mut_decl(&mut self, name: &Identifier, ty: &Type, init: &Expression) {
        let mut declared_type = ty.clone();
        let initialized = if matches!(init.kind, ExprKind::Undef) {
            self.analyze_expr(init, Some(ty));
            false
        } else {
            let actual = self.analyze_expr(init, Some(ty));
            let is_concrete_array = matches!(&actual, Type::Array { .. });
            let conversion_happens = is_concrete_array && matches!(init.kind, ExprKind::Conversion { .. });
            if array::initializer_missing_copy(init, is_concrete_array, conversion_happens) {
                self.emit(SemanticError::MissingExplicitArrayCopy { span: init.span.clone() });
            } else {
                declared_type = self.check_assignable(&actual, ty, &init.span);
            }
            true
        };

        let _ = self.symbols.declare(Symbol::new(name.name.clone(), declared_type, Mutability::Mut, initialized, name.span.clone()));
    }

    pub(super) fn analyze_assign(&mut self, lhs: &Expression, rhs: &Expression) {
        match &lhs.kind {
            ExprKind::Identifier(name) => self.analyze_simple_assign(name, lhs, rhs),
            ExprKind::ArrayAccess { array, index } => self.analyze_element_assign(array, index, rhs, &lhs.span),
            _ => {
                self.emit(SemanticError::TypeMismatch {
                    expected: "assignable location".to_string(),
                    found: "expression".to_string(),
                    span: lhs.span.clone(),
                });
            }
        }
    }

    fn analyze_simple_assign(&mut self, name: &str, lhs: &Expression, rhs: &Expression) {
        let Some(symbol) = self.symbols.lookup(name) else {
            self.emit(SemanticError::UndefinedIdentifier { name: name.to_string(), span: lhs.span.clone() });
            return;
        };
        match symbol.mutability {
            Mutability::Val => {
                self.emit(SemanticError::ValReassignment { name: name.to_string(), span: lhs.span.clone() });
                return;
            }
            Mutability::LoopVar => {
                self.emit(SemanticError::LoopVariableReassignment { name: name.to_string(), span: lhs.span.clone() });
                return;
            }
            Mutability::Mut => {}
        }
        let declared = symbol.ty.clone();
        let actual = self.analyze_expr(rhs, Some(&declared));
        self.check_assignable(&actual, &declared, &rhs.span);
        if let Some(sym) = self.symbols.lookup_mut(name) {
            sym.initialized = true;
        }
    }

    fn analyze_element_assign(&mut self, array: &Expression, index: &Expression, rhs: &Expression, span: &crate::error::SourceSpan) {
        let array_ty = self.analyze_expr(array, None);
        let index_ty = self.analyze_expr(index, None);
        if !index_ty.is_unknown() && !index_ty.is_integer() {
            self.emit(SemanticError::TypeMismatch { expected: "integer".to_string(), found: index_ty.to_string(), span: index.span.clone() });
        }
        let Some(elem_ty) = array_ty.element_type() else {
            if !array_ty.is_unknown() {
                self.emit(SemanticError::TypeMismatch { expected: "array".to_string(), found: array_ty.to_string(), span: span.clone() });
            }
            return;
        };
        let actual = self.analyze_expr(rhs, Some(&elem_ty));
        self.check_assignable(&actual, &elem_ty, &rhs.span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprKind;
    use crate::error::SourceSpan;
    use crate::semantic::AnalyzerConfig;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, SourceSpan::unknown())
    }

    fn e(id: u32, kind: ExprKind) -> Expression {
        Expression::new(id, kind, SourceSpan::unknown())
    }

    #[test]
    fn test_val_reassignment_is_rejected() {
        let mut analyzer = Analyzer::new(AnalyzerConfig::new());
        analyzer.analyze_val_decl(&ident("x"), &Some(Type::i32()), &e(1, ExprKind::IntLit(1)));
        analyzer.analyze_assign(&e(2, ExprKind::Identifier("x".to_string())), &e(3, ExprKind::IntLit(2)));
        let outcome = analyzer.finish();
        assert!(outcome.diagnostics.iter().any(|d| d.kind == "ValReassignment"));
    }

    #[test]
    fn test_undef_on_val_is_rejected() {
        let mut analyzer = Analyzer::new(AnalyzerConfig::new());
        analyzer.analyze_val_decl(&ident("x"), &Some(Type::i32()), &e(1, ExprKind::Undef));
        let outcome = analyzer.finish();
        assert!(outcome.diagnostics.iter().any(|d| d.kind == "UndefOnVal"));
    }

    #[test]
    fn test_mut_with_undef_is_allowed_but_uninitialized() {
        let mut analyzer = Analyzer::new(AnalyzerConfig::new());
        analyzer.analyze_mut_decl(&ident("x"), &Type::i32(), &e(1, ExprKind::Undef));
        assert!(!analyzer.symbols.lookup("x").unwrap().initialized);
        let outcome = analyzer.finish();
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_mut_reassignment_after_undef_initializes() {
        let mut analyzer = Analyzer::new(AnalyzerConfig::new());
        analyzer.analyze_mut_decl(&ident("x"), &Type::i32(), &e(1, ExprKind::Undef));
        analyzer.analyze_assign(&e(2, ExprKind::Identifier("x".to_string())), &e(3, ExprKind::IntLit(5)));
        assert!(analyzer.symbols.lookup("x").unwrap().initialized);
    }
}
