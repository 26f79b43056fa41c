//! Array literals, `[..]` copy discipline, shape conversion and flattening,
//! and `.length` (§3.3, §3.4, §4.4, §4.8, §8.2).

mod common;
use common::*;
use hexen::types::{Dimension, Type};

fn matrix_ty() -> Type {
    Type::Array { element: Box::new(Type::i32()), dims: vec![Dimension::Fixed(2), Dimension::Fixed(3)] }
}

fn flat6_ty() -> Type {
    Type::Array { element: Box::new(Type::i32()), dims: vec![Dimension::Fixed(6)] }
}

fn matrix_literal(id_base: u32) -> hexen::ast::Expression {
    array_lit(
        id_base,
        vec![
            array_lit(id_base + 1, vec![int_lit(id_base + 2, 1), int_lit(id_base + 3, 2), int_lit(id_base + 4, 3)]),
            array_lit(id_base + 5, vec![int_lit(id_base + 6, 4), int_lit(id_base + 7, 5), int_lit(id_base + 8, 6)]),
        ],
    )
}

#[test]
fn array_literal_with_matching_context_is_accepted() {
    let program = single_fn_program(
        vec![
            val_decl(1, "xs", Some(Type::Array { element: Box::new(Type::i32()), dims: vec![Dimension::Fixed(3)] }), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2), int_lit(5, 3)])),
            return_stmt(6, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
}

#[test]
fn array_literal_wrong_element_count_is_a_shape_mismatch() {
    let program = single_fn_program(
        vec![
            val_decl(1, "xs", Some(Type::Array { element: Box::new(Type::i32()), dims: vec![Dimension::Fixed(4)] }), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2)])),
            return_stmt(5, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(has_error(&outcome, "ArrayShapeMismatch"), "{:?}", outcome.diagnostics);
}

#[test]
fn flatten_with_explicit_copy_is_accepted() {
    // val g: [6]i32 = m[..]:[6]i32 (spec §8.2 Scenario E)
    let program = single_fn_program(
        vec![
            val_decl(1, "m", Some(matrix_ty()), matrix_literal(2)),
            val_decl(20, "g", Some(flat6_ty()), conversion(21, array_copy(22, ident_expr(23, "m")), flat6_ty())),
            return_stmt(24, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
}

#[test]
fn flatten_without_explicit_copy_is_rejected() {
    // val g: [6]i32 = m:[6]i32 — missing `[..]` before the shape conversion.
    let program = single_fn_program(
        vec![
            val_decl(1, "m", Some(matrix_ty()), matrix_literal(2)),
            val_decl(20, "g", Some(flat6_ty()), conversion(21, ident_expr(22, "m"), flat6_ty())),
            return_stmt(24, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(has_error(&outcome, "MissingExplicitArrayCopy"), "{:?}", outcome.diagnostics);
}

#[test]
fn flatten_to_wrong_element_count_is_a_shape_mismatch() {
    // val bad: [5]i32 = m[..]:[5]i32 (spec §8.2 Scenario E)
    let bad5_ty = Type::Array { element: Box::new(Type::i32()), dims: vec![Dimension::Fixed(5)] };
    let program = single_fn_program(
        vec![
            val_decl(1, "m", Some(matrix_ty()), matrix_literal(2)),
            val_decl(20, "bad", Some(bad5_ty.clone()), conversion(21, array_copy(22, ident_expr(23, "m")), bad5_ty)),
            return_stmt(24, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(has_error(&outcome, "ArrayShapeMismatch"), "{:?}", outcome.diagnostics);
}

#[test]
fn flatten_to_inferred_dimension_is_accepted() {
    // val h: [_]i32 = m[..]:[_]i32 (spec §8.2 Scenario E): h's resolved type
    // must carry the concrete shape [6], not an unresolved `_`.
    let inferred_ty = Type::Array { element: Box::new(Type::i32()), dims: vec![Dimension::Inferred] };
    let program = single_fn_program(
        vec![
            val_decl(1, "m", Some(matrix_ty()), matrix_literal(2)),
            val_decl(20, "h", Some(inferred_ty.clone()), conversion(21, array_copy(22, ident_expr(23, "m")), inferred_ty)),
            val_decl(40, "n", Some(Type::i32()), property_access(41, ident_expr(42, "h"), "length")),
            return_stmt(43, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
    assert_eq!(outcome.annotations.type_of(21), Some(&flat6_ty()), "conversion result should resolve `_` to 6, not stay unresolved");
}

#[test]
fn same_shape_move_needs_no_copy() {
    let flat_ty = flat6_ty();
    let program = single_fn_program(
        vec![
            val_decl(1, "a", Some(flat_ty.clone()), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2), int_lit(5, 3), int_lit(6, 4), int_lit(7, 5), int_lit(8, 6)])),
            val_decl(9, "b", Some(flat_ty), ident_expr(10, "a")),
            return_stmt(11, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
}

#[test]
fn length_on_fixed_size_array_resolves_to_comptime_int() {
    let flat_ty = flat6_ty();
    let program = single_fn_program(
        vec![
            val_decl(1, "a", Some(flat_ty), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2), int_lit(5, 3), int_lit(6, 4), int_lit(7, 5), int_lit(8, 6)])),
            val_decl(9, "n", Some(Type::i32()), property_access(10, ident_expr(11, "a"), "length")),
            return_stmt(12, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
}

#[test]
fn length_on_unsized_parameter_array_is_rejected() {
    let inferred_ty = Type::Array { element: Box::new(Type::i32()), dims: vec![Dimension::Inferred] };
    let f = func(
        0,
        "len_of",
        vec![param("xs", false, inferred_ty)],
        Type::i32(),
        block(1, vec![return_stmt(2, Some(property_access(3, ident_expr(4, "xs"), "length")))]),
    );
    let outcome = hexen::analyze(&program(vec![f]));
    assert!(has_error(&outcome, "LengthOnUnsizedArray"), "{:?}", outcome.diagnostics);
}

#[test]
fn unknown_property_is_rejected() {
    let flat_ty = flat6_ty();
    let program = single_fn_program(
        vec![
            val_decl(1, "a", Some(flat_ty), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2), int_lit(5, 3), int_lit(6, 4), int_lit(7, 5), int_lit(8, 6)])),
            expr_stmt(9, property_access(10, ident_expr(11, "a"), "capacity")),
            return_stmt(12, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(has_error(&outcome, "UnknownProperty"), "{:?}", outcome.diagnostics);
}

#[test]
fn array_access_out_of_array_yields_element_type() {
    let flat_ty = flat6_ty();
    let program = single_fn_program(
        vec![
            val_decl(1, "a", Some(flat_ty), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2), int_lit(5, 3), int_lit(6, 4), int_lit(7, 5), int_lit(8, 6)])),
            val_decl(9, "x", Some(Type::i32()), array_access(10, ident_expr(11, "a"), int_lit(12, 0))),
            return_stmt(13, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
}

#[test]
fn array_access_with_non_integer_index_is_rejected() {
    let flat_ty = flat6_ty();
    let program = single_fn_program(
        vec![
            val_decl(1, "a", Some(flat_ty), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2), int_lit(5, 3), int_lit(6, 4), int_lit(7, 5), int_lit(8, 6)])),
            expr_stmt(9, array_access(10, ident_expr(11, "a"), bool_lit(12, true))),
            return_stmt(13, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(has_error(&outcome, "TypeMismatch"), "{:?}", outcome.diagnostics);
}

#[test]
fn mixed_concrete_elements_in_array_literal_require_explicit_conversion() {
    let program = single_fn_program(
        vec![
            val_decl(1, "a", Some(Type::i32()), int_lit(2, 1)),
            val_decl(3, "b", Some(Type::i64()), int_lit(4, 2)),
            expr_stmt(5, array_lit(6, vec![ident_expr(7, "a"), ident_expr(8, "b")])),
            return_stmt(9, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(has_error(&outcome, "MixedConcreteRequiresExplicit"), "{:?}", outcome.diagnostics);
}

#[test]
fn empty_array_literal_without_context_is_rejected() {
    let program = single_fn_program(vec![expr_stmt(1, array_lit(2, vec![])), return_stmt(3, None)], Type::void());
    let outcome = hexen::analyze(&program);
    assert!(has_error(&outcome, "TypeMismatch"), "{:?}", outcome.diagnostics);
}

#[test]
fn empty_array_literal_with_context_is_accepted() {
    let flat_ty = flat6_ty();
    let program = single_fn_program(vec![val_decl(1, "a", Some(flat_ty), array_lit(2, vec![])), return_stmt(3, None)], Type::void());
    let outcome = hexen::analyze(&program);
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
}

#[test]
fn block_production_of_concrete_array_requires_explicit_copy() {
    let flat_ty = flat6_ty();
    let inner = block(30, vec![produce(31, ident_expr(32, "a"))]);
    let program = single_fn_program(
        vec![
            val_decl(1, "a", Some(flat_ty.clone()), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2), int_lit(5, 3), int_lit(6, 4), int_lit(7, 5), int_lit(8, 6)])),
            val_decl(9, "b", Some(flat_ty), expr_block(10, inner)),
            return_stmt(11, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(has_error(&outcome, "MissingExplicitArrayCopy"), "{:?}", outcome.diagnostics);
}

#[test]
fn block_production_of_concrete_array_with_explicit_copy_is_accepted() {
    let flat_ty = flat6_ty();
    let inner = block(30, vec![produce(31, array_copy(32, ident_expr(33, "a")))]);
    let program = single_fn_program(
        vec![
            val_decl(1, "a", Some(flat_ty.clone()), array_lit(2, vec![int_lit(3, 1), int_lit(4, 2), int_lit(5, 3), int_lit(6, 4), int_lit(7, 5), int_lit(8, 6)])),
            val_decl(9, "b", Some(flat_ty), expr_block(10, inner)),
            return_stmt(11, None),
        ],
        Type::void(),
    );
    let outcome = hexen::analyze(&program);
    assert!(!outcome.has_errors(), "{:?}", outcome.diagnostics);
}
