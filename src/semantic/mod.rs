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

//! The Hexen semantic analyzer: a two-pass, bidirectional type checker
//! (§4.10, §5, §9).
//!
//! `analyze` is the only public entry point (§6.3): it walks the program
//! once to register every function signature, then a second time to
//! type-check bodies, so forward calls resolve. All mutable state (symbol
//! table, function signatures, diagnostics) is owned by a single `Analyzer`
//! instance with no globals; running two programs means creating two
//! `Analyzer`s (§5).

mod array;
mod block;
mod decl;
mod expr;
mod function;
mod loops;

use crate::ast::{Annotations, NodeId, Program};
use crate::error::{Diagnostic, DiagnosticReporter, SemanticError};
use crate::symbols::{FunctionSignature, SymbolTable};
use crate::types::Type;
use std::collections::HashMap;

/// Configuration knob for a single analysis run (§10.2). The only surface
/// beyond the AST itself: no file I/O, no CLI, no target triple, all of
/// which remain out of scope.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    max_diagnostics: Option<usize>,
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop accumulating diagnostics (and halt analysis) after `max` errors.
    pub fn max_diagnostics(mut self, max: usize) -> Self {
        self.max_diagnostics = Some(max);
        self
    }
}

/// The result of `analyze`: the type/symbol annotations for every node plus
/// every diagnostic raised, in source order.
pub struct AnalysisOutcome {
    pub annotations: Annotations,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == crate::error::Severity::Error)
    }
}

/// `analyze(program_ast) -> (annotated_ast, diagnostics)` (§6.3).
pub fn analyze(program: &Program) -> AnalysisOutcome {
    analyze_with_config(program, AnalyzerConfig::new())
}

pub fn analyze_with_config(program: &Program, config: AnalyzerConfig) -> AnalysisOutcome {
    let mut analyzer = Analyzer::new(config);
    analyzer.analyze_program(program);
    analyzer.finish()
}

pub(crate) struct Analyzer {
    symbols: SymbolTable,
    functions: HashMap<String, FunctionSignature>,
    annotations: Annotations,
    reporter: DiagnosticReporter,
    halted: bool,
}

impl Analyzer {
    fn new(config: AnalyzerConfig) -> Self {
        Self {
            symbols: SymbolTable::new(),
            functions: HashMap::new(),
            annotations: Annotations::new(),
            reporter: DiagnosticReporter::new(config.max_diagnostics),
            halted: false,
        }
    }

    fn finish(self) -> AnalysisOutcome {
        AnalysisOutcome { annotations: self.annotations, diagnostics: self.reporter.into_diagnostics() }
    }

    /// Record a diagnostic; always returns `Type::Unknown` so call sites can
    /// `return self.emit(err)` from expression analysis (§4.3, §7
    /// propagation policy: substitute `Unknown` and keep going).
    fn emit(&mut self, err: SemanticError) -> Type {
        if !self.halted && !self.reporter.report(err) {
            self.halted = true;
        }
        Type::Unknown
    }

    fn record(&mut self, id: NodeId, ty: Type) -> Type {
        self.annotations.record(id, ty.clone());
        ty
    }

    fn analyze_program(&mut self, program: &Program) {
        for func in &program.items {
            self.register_signature(func);
        }
        for func in &program.items {
            if self.halted {
                break;
            }
            self.analyze_function(func);
        }
    }

    /// Checks `actual` against an expected type allowing only implicit
    /// conversions (identity + comptime materialization), emitting the
    /// matching taxonomy error otherwise. Shared by declarations,
    /// assignments, `return`/`->`, and call-argument checking.
    pub(crate) fn check_assignable(&mut self, actual: &Type, expected: &Type, span: &crate::error::SourceSpan) -> Type {
        if actual.is_unknown() || expected.is_unknown() {
            return expected.clone();
        }
        if actual == expected {
            return expected.clone();
        }
        match crate::types::check_convert(actual, expected, false) {
            Ok(outcome) => crate::types::resolved_type(expected, &outcome),
            Err(crate::types::ConvertError::RequiresExplicit) => self.emit(SemanticError::TypeMismatch {
                expected: expected.to_string(),
                found: actual.to_string(),
                span: span.clone(),
            }),
            Err(crate::types::ConvertError::Nonsensical) => self.emit(SemanticError::NonsensicalConversion {
                from: actual.to_string(),
                to: expected.to_string(),
                span: span.clone(),
            }),
            Err(crate::types::ConvertError::ShapeMismatch { source_count, target_count }) => {
                self.emit(SemanticError::ArrayShapeMismatch { source_count, target_count, span: span.clone() })
            }
            Err(crate::types::ConvertError::MultiInferredAmbiguous) => {
                self.emit(SemanticError::MultiInferredDimensionAmbiguous { span: span.clone() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::error::SourceSpan;

    fn span() -> SourceSpan {
        SourceSpan::unknown()
    }

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, span())
    }

    fn int_lit(id: NodeId, v: i64) -> Expression {
        Expression::new(id, ExprKind::IntLit(v), span())
    }

    #[test]
    fn test_empty_program_has_no_diagnostics() {
        let program = Program { items: vec![], span: span() };
        let outcome = analyze(&program);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_scenario_a_comptime_flexibility() {
        // val flex = 42 + 100 * 5; val a: i32 = flex; val b: i64 = flex
        let flex_init = Expression::new(
            10,
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(int_lit(1, 42)),
                right: Box::new(Expression::new(
                    2,
                    ExprKind::Binary {
                        op: BinaryOp::Mul,
                        left: Box::new(int_lit(3, 100)),
                        right: Box::new(int_lit(4, 5)),
                    },
                    span(),
                )),
            },
            span(),
        );
        let stmts = vec![
            Statement { id: 20, kind: StmtKind::ValDecl { name: ident("flex"), ty: None, init: flex_init }, span: span() },
            Statement {
                id: 21,
                kind: StmtKind::ValDecl {
                    name: ident("a"),
                    ty: Some(Type::i32()),
                    init: Expression::new(11, ExprKind::Identifier("flex".to_string()), span()),
                },
                span: span(),
            },
            Statement {
                id: 22,
                kind: StmtKind::ValDecl {
                    name: ident("b"),
                    ty: Some(Type::i64()),
                    init: Expression::new(12, ExprKind::Identifier("flex".to_string()), span()),
                },
                span: span(),
            },
            Statement { id: 23, kind: StmtKind::Return { value: None }, span: span() },
        ];
        let program = Program {
            items: vec![FuncDecl {
                id: 0,
                name: ident("main"),
                params: vec![],
                return_type: Type::void(),
                body: Block { id: 1, stmts, span: span() },
                span: span(),
            }],
            span: span(),
        };
        let outcome = analyze(&program);
        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.annotations.type_of(11), Some(&Type::i32()));
        assert_eq!(outcome.annotations.type_of(12), Some(&Type::i64()));
    }

    #[test]
    fn test_scenario_b_mixed_concrete_requires_explicit() {
        let stmts = vec![
            Statement { id: 20, kind: StmtKind::ValDecl { name: ident("x"), ty: Some(Type::i32()), init: int_lit(1, 10) }, span: span() },
            Statement { id: 21, kind: StmtKind::ValDecl { name: ident("y"), ty: Some(Type::i64()), init: int_lit(2, 20) }, span: span() },
            Statement {
                id: 22,
                kind: StmtKind::ValDecl {
                    name: ident("z"),
                    ty: None,
                    init: Expression::new(
                        10,
                        ExprKind::Binary {
                            op: BinaryOp::Add,
                            left: Box::new(Expression::new(3, ExprKind::Identifier("x".to_string()), span())),
                            right: Box::new(Expression::new(4, ExprKind::Identifier("y".to_string()), span())),
                        },
                        span(),
                    ),
                },
                span: span(),
            },
            Statement { id: 23, kind: StmtKind::Return { value: None }, span: span() },
        ];
        let program = Program {
            items: vec![FuncDecl {
                id: 0,
                name: ident("main"),
                params: vec![],
                return_type: Type::void(),
                body: Block { id: 1, stmts, span: span() },
                span: span(),
            }],
            span: span(),
        };
        let outcome = analyze(&program);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, "MixedConcreteRequiresExplicit");
    }

    #[test]
    fn test_diagnostic_cap_halts_analysis() {
        let bad = Expression::new(2, ExprKind::Identifier("missing".to_string()), span());
        let stmts = vec![
            Statement { id: 10, kind: StmtKind::ValDecl { name: ident("a"), ty: None, init: bad.clone() }, span: span() },
            Statement { id: 11, kind: StmtKind::ValDecl { name: ident("b"), ty: None, init: bad }, span: span() },
            Statement { id: 12, kind: StmtKind::Return { value: None }, span: span() },
        ];
        let program = Program {
            items: vec![FuncDecl {
                id: 0,
                name: ident("main"),
                params: vec![],
                return_type: Type::void(),
                body: Block { id: 1, stmts, span: span() },
                span: span(),
            }],
            span: span(),
        };
        let outcome = analyze_with_config(&program, AnalyzerConfig::new().max_diagnostics(1));
        assert_eq!(outcome.diagnostics.len(), 1);
    }
}
