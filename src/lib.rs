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

//! Semantic analyzer for the Hexen programming language.
//!
//! Hexen's front-end is a pipeline: source → parser → AST → semantic
//! analyzer → (annotated AST, diagnostics). This crate is the semantic
//! analyzer: a context-propagating, bidirectional type checker over an
//! externally-produced AST (§3.7). Lexing, parsing, and code generation are
//! out of scope — the parser is an external collaborator, and this crate
//! only defines the AST contract it must satisfy.
//!
//! The only entry point is [`analyze`]; everything else is exposed for
//! tooling built on top of the analyzer (REPLs, language servers, test
//! harnesses) that need finer-grained access to the type lattice or symbol
//! table.

pub mod ast;
pub mod error;
pub mod semantic;
pub mod symbols;
pub mod types;

pub use ast::{Annotations, Program, SymbolRef};
pub use error::{Diagnostic, Severity};
pub use semantic::{analyze, analyze_with_config, AnalysisOutcome, AnalyzerConfig};
