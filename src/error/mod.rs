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

//! Error handling for the Hexen semantic analyzer.
//!
//! Structured diagnostics with source location, category and suggestion,
//! following the error taxonomy the analyzer is required to surface.

use std::fmt;
use thiserror::Error;

/// A single point in source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(file: String, line: usize, column: usize, offset: usize) -> Self {
        Self { file, line, column, offset }
    }

    pub fn unknown() -> Self {
        Self { file: "<unknown>".to_string(), line: 0, column: 0, offset: 0 }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A range of source text, as carried by every AST node.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    pub fn single(location: SourceLocation) -> Self {
        Self { start: location.clone(), end: location }
    }

    pub fn unknown() -> Self {
        Self::single(SourceLocation::unknown())
    }
}

/// The structured error taxonomy the analyzer can raise.
///
/// Every variant carries the `SourceSpan` where the problem was found;
/// variants that compare two types carry both sides for the message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("undefined identifier '{name}' at {span.start}")]
    UndefinedIdentifier { name: String, span: SourceSpan },

    #[error("'{name}' is already declared in this scope at {span.start}")]
    DuplicateDeclaration { name: String, span: SourceSpan, previous: SourceSpan },

    #[error("declaration of '{name}' shadows an outer binding at {span.start}")]
    ShadowingError { name: String, span: SourceSpan },

    #[error("type mismatch: expected {expected}, found {found} at {span.start}")]
    TypeMismatch { expected: String, found: String, span: SourceSpan },

    #[error("mixing concrete types {left} and {right} requires an explicit conversion at {span.start}")]
    MixedConcreteRequiresExplicit { left: String, right: String, span: SourceSpan },

    #[error("implicit conversion from {from} to {to} may lose precision at {span.start}")]
    UnsafeImplicitConversion { from: String, to: String, span: SourceSpan },

    #[error("conversion from {from} to {to} is not meaningful at {span.start}")]
    NonsensicalConversion { from: String, to: String, span: SourceSpan },

    #[error("`\\` (integer division) requires integer operands, found {found} at {span.start}")]
    IntegerDivOnFloat { found: String, span: SourceSpan },

    #[error("`/` on two identical integer operands requires `\\` or an explicit float conversion at {span.start}")]
    FloatDivOnSameIntegers { ty: String, span: SourceSpan },

    #[error("`%` requires integer operands, found {found} at {span.start}")]
    ModuloOnFloat { found: String, span: SourceSpan },

    #[error("cannot reassign 'val' binding '{name}' at {span.start}")]
    ValReassignment { name: String, span: SourceSpan },

    #[error("'mut' declaration of '{name}' requires an explicit type at {span.start}")]
    MutRequiresExplicitType { name: String, span: SourceSpan },

    #[error("'{name}' is used before being initialized at {span.start}")]
    UseBeforeInit { name: String, span: SourceSpan },

    #[error("'undef' is not allowed as the initializer of a 'val' at {span.start}")]
    UndefOnVal { span: SourceSpan },

    #[error("array value must be copied explicitly with `[..]` before flowing into a new owner at {span.start}")]
    MissingExplicitArrayCopy { span: SourceSpan },

    #[error("array shape mismatch: source has {source_count} elements, target shape requires {target_count} at {span.start}")]
    ArrayShapeMismatch { source_count: usize, target_count: usize, span: SourceSpan },

    #[error("array conversion target has more than one inferred `_` dimension and the source shape does not resolve it unambiguously at {span.start}")]
    MultiInferredDimensionAmbiguous { span: SourceSpan },

    #[error("unknown property '{name}' on array type at {span.start}")]
    UnknownProperty { name: String, span: SourceSpan },

    #[error("`.length` requested on an array whose size is not statically known at {span.start}")]
    LengthOnUnsizedArray { span: SourceSpan },

    #[error("expression block requires an explicit target type from its surrounding context at {span.start}")]
    ExpressionBlockMissingContext { span: SourceSpan },

    #[error("expression block has no `->` on at least one path and does not return on every path at {span.start}")]
    ExpressionBlockMissingProduce { span: SourceSpan },

    #[error("`->` may only appear inside an expression block or an array-producing loop at {span.start}")]
    ProduceOutsideExpressionBlock { span: SourceSpan },

    #[error("return type mismatch: function returns {expected}, found {found} at {span.start}")]
    ReturnTypeMismatch { expected: String, found: String, span: SourceSpan },

    #[error("function '{name}' does not return a value on every path at {span.start}")]
    MissingReturn { name: String, span: SourceSpan },

    #[error("'return' with a value is not allowed in a 'void' function at {span.start}")]
    ReturnValueInVoid { span: SourceSpan },

    #[error("'break' outside any loop at {span.start}")]
    BreakOutsideLoop { span: SourceSpan },

    #[error("'continue' outside any loop at {span.start}")]
    ContinueOutsideLoop { span: SourceSpan },

    #[error("no enclosing loop is labeled '{label}' at {span.start}")]
    UnknownLabel { label: String, span: SourceSpan },

    #[error("label '{label}' is already used by an enclosing loop at {span.start}")]
    DuplicateLabel { label: String, span: SourceSpan },

    #[error("label '{label}' does not name a loop at {span.start}")]
    LabelNotOnLoop { label: String, span: SourceSpan },

    #[error("unbounded range cannot be used in a value-producing loop at {span.start}")]
    UnboundedRangeInExpressionLoop { span: SourceSpan },

    #[error("loop variable '{name}' cannot be reassigned at {span.start}")]
    LoopVariableReassignment { name: String, span: SourceSpan },

    #[error("call to '{name}' passes {found} argument(s), expected {expected} at {span.start}")]
    ArgCountMismatch { name: String, expected: usize, found: usize, span: SourceSpan },

    #[error("argument {index} to '{name}' has type {found}, expected {expected} at {span.start}")]
    ArgTypeMismatch { name: String, index: usize, expected: String, found: String, span: SourceSpan },

    #[error("function '{name}' mutates 'mut' parameter '{param}' but declares a 'void' return type at {span.start}")]
    MutParamRequiresReturn { name: String, param: String, span: SourceSpan },
}

impl SemanticError {
    /// The source span every variant carries, used to sort/emit diagnostics in source order.
    pub fn span(&self) -> &SourceSpan {
        use SemanticError::*;
        match self {
            UndefinedIdentifier { span, .. }
            | DuplicateDeclaration { span, .. }
            | ShadowingError { span, .. }
            | TypeMismatch { span, .. }
            | MixedConcreteRequiresExplicit { span, .. }
            | UnsafeImplicitConversion { span, .. }
            | NonsensicalConversion { span, .. }
            | IntegerDivOnFloat { span, .. }
            | FloatDivOnSameIntegers { span, .. }
            | ModuloOnFloat { span, .. }
            | ValReassignment { span, .. }
            | MutRequiresExplicitType { span, .. }
            | UseBeforeInit { span, .. }
            | UndefOnVal { span }
            | MissingExplicitArrayCopy { span }
            | ArrayShapeMismatch { span, .. }
            | MultiInferredDimensionAmbiguous { span }
            | UnknownProperty { span, .. }
            | LengthOnUnsizedArray { span }
            | ExpressionBlockMissingContext { span }
            | ExpressionBlockMissingProduce { span }
            | ProduceOutsideExpressionBlock { span }
            | ReturnTypeMismatch { span, .. }
            | MissingReturn { span, .. }
            | ReturnValueInVoid { span }
            | BreakOutsideLoop { span }
            | ContinueOutsideLoop { span }
            | UnknownLabel { span, .. }
            | DuplicateLabel { span, .. }
            | LabelNotOnLoop { span, .. }
            | UnboundedRangeInExpressionLoop { span }
            | LoopVariableReassignment { span, .. }
            | ArgCountMismatch { span, .. }
            | ArgTypeMismatch { span, .. }
            | MutParamRequiresReturn { span, .. } => span,
        }
    }

    /// A short, stable tag identifying the taxonomy category, independent of the rendered message.
    pub fn kind(&self) -> &'static str {
        use SemanticError::*;
        match self {
            UndefinedIdentifier { .. } => "UndefinedIdentifier",
            DuplicateDeclaration { .. } => "DuplicateDeclaration",
            ShadowingError { .. } => "ShadowingError",
            TypeMismatch { .. } => "TypeMismatch",
            MixedConcreteRequiresExplicit { .. } => "MixedConcreteRequiresExplicit",
            UnsafeImplicitConversion { .. } => "UnsafeImplicitConversion",
            NonsensicalConversion { .. } => "NonsensicalConversion",
            IntegerDivOnFloat { .. } => "IntegerDivOnFloat",
            FloatDivOnSameIntegers { .. } => "FloatDivOnSameIntegers",
            ModuloOnFloat { .. } => "ModuloOnFloat",
            ValReassignment { .. } => "ValReassignment",
            MutRequiresExplicitType { .. } => "MutRequiresExplicitType",
            UseBeforeInit { .. } => "UseBeforeInit",
            UndefOnVal { .. } => "UndefOnVal",
            MissingExplicitArrayCopy { .. } => "MissingExplicitArrayCopy",
            ArrayShapeMismatch { .. } => "ArrayShapeMismatch",
            MultiInferredDimensionAmbiguous { .. } => "MultiInferredDimensionAmbiguous",
            UnknownProperty { .. } => "UnknownProperty",
            LengthOnUnsizedArray { .. } => "LengthOnUnsizedArray",
            ExpressionBlockMissingContext { .. } => "ExpressionBlockMissingContext",
            ExpressionBlockMissingProduce { .. } => "ExpressionBlockMissingProduce",
            ProduceOutsideExpressionBlock { .. } => "ProduceOutsideExpressionBlock",
            ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            MissingReturn { .. } => "MissingReturn",
            ReturnValueInVoid { .. } => "ReturnValueInVoid",
            BreakOutsideLoop { .. } => "BreakOutsideLoop",
            ContinueOutsideLoop { .. } => "ContinueOutsideLoop",
            UnknownLabel { .. } => "UnknownLabel",
            DuplicateLabel { .. } => "DuplicateLabel",
            LabelNotOnLoop { .. } => "LabelNotOnLoop",
            UnboundedRangeInExpressionLoop { .. } => "UnboundedRangeInExpressionLoop",
            LoopVariableReassignment { .. } => "LoopVariableReassignment",
            ArgCountMismatch { .. } => "ArgCountMismatch",
            ArgTypeMismatch { .. } => "ArgTypeMismatch",
            MutParamRequiresReturn { .. } => "MutParamRequiresReturn",
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A rendered diagnostic record: the public, language-neutral error output (§6.2).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: String,
    pub span: SourceSpan,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(kind: &'static str, span: SourceSpan, message: String) -> Self {
        Self { severity: Severity::Error, kind: kind.to_string(), span, message, suggestion: None }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

/// Accumulates `SemanticError`s and converts them into rendered `Diagnostic`s.
///
/// Unlike a CLI error reporter this never prints: it produces data, the only
/// I/O-free surface a library analyzer can expose.
pub struct DiagnosticReporter {
    diagnostics: Vec<Diagnostic>,
    max_diagnostics: Option<usize>,
}

impl DiagnosticReporter {
    pub fn new(max_diagnostics: Option<usize>) -> Self {
        Self { diagnostics: Vec::new(), max_diagnostics }
    }

    /// Record a `SemanticError`, converting it to a `Diagnostic`. Returns `false`
    /// once the configured cap has been reached, signaling the analyzer to stop.
    pub fn report(&mut self, error: SemanticError) -> bool {
        if let Some(max) = self.max_diagnostics {
            if self.diagnostics.len() >= max {
                return false;
            }
        }
        self.diagnostics.push(self.to_diagnostic(error));
        self.max_diagnostics.map_or(true, |max| self.diagnostics.len() < max)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn to_diagnostic(&self, error: SemanticError) -> Diagnostic {
        let kind = error.kind();
        let span = error.span().clone();
        let message = error.to_string();
        let diag = Diagnostic::error(kind, span, message);

        match &error {
            SemanticError::MixedConcreteRequiresExplicit { left, .. } => {
                diag.with_suggestion(format!("add `:{left}` (or the other operand's type) to one side"))
            }
            SemanticError::UnsafeImplicitConversion { to, .. } => {
                diag.with_suggestion(format!("add `:{to}` to acknowledge the conversion"))
            }
            SemanticError::IntegerDivOnFloat { .. } => {
                diag.with_suggestion("use `/` for float division".to_string())
            }
            SemanticError::FloatDivOnSameIntegers { .. } => {
                diag.with_suggestion("use `\\` for integer division, or convert one operand explicitly".to_string())
            }
            SemanticError::MissingExplicitArrayCopy { .. } => {
                diag.with_suggestion("write `expr[..]` to make the copy explicit".to_string())
            }
            SemanticError::ArrayShapeMismatch { source_count, .. } => {
                diag.with_suggestion(format!("target shape must account for all {source_count} source elements"))
            }
            SemanticError::ExpressionBlockMissingContext { .. } => {
                diag.with_suggestion("annotate the binding with an explicit `: T`".to_string())
            }
            SemanticError::UndefinedIdentifier { name, .. } => {
                diag.with_suggestion(format!("check the spelling of '{name}' or that it is declared before use"))
            }
            _ => diag,
        }
    }
}

/// Suggest the closest candidate to `input` by edit distance, if within tolerance.
pub fn suggest_correction(input: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .min_by_key(|candidate| edit_distance(input, candidate))
        .filter(|candidate| edit_distance(input, candidate) <= 2)
        .map(|s| s.to_string())
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    let mut dp = vec![vec![0; b_len + 1]; a_len + 1];
    for (i, row) in dp.iter_mut().enumerate().take(a_len + 1) {
        row[0] = i;
    }
    for j in 0..=b_len {
        dp[0][j] = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            dp[i][j] = if a_chars[i - 1] == b_chars[j - 1] {
                dp[i - 1][j - 1]
            } else {
                1 + std::cmp::min(std::cmp::min(dp[i - 1][j], dp[i][j - 1]), dp[i - 1][j - 1])
            };
        }
    }

    dp[a_len][b_len]
}
