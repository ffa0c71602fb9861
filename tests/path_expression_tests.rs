//! Path Expression Tests
//!
//! Traversal of relative path expressions over declared trees.

use ruletree::prelude::*;
use ruletree::Movement;

/// user
/// ├── name
/// └── orders[]
///     └── *
///         ├── sku
///         └── lines[]
///             └── *
///                 └── qty
fn sample_tree() -> (RootNode, NodeRef) {
    let root = ruletree::create();
    let user = root.object("user").unwrap();
    user.string("name").unwrap();
    let order = user.array("orders").unwrap().each_object().unwrap();
    order.string("sku").unwrap();
    let qty = order
        .array("lines")
        .unwrap()
        .each_object()
        .unwrap()
        .integer("qty")
        .unwrap();
    let qty = qty.to_ref();
    (root, qty)
}

#[test]
fn test_inverse_descent_returns_same_node() {
    let (root, qty) = sample_tree();

    // qty -> lines.* -> lines -> order(*), then back down
    let exp = PathExp::new()
        .parent()
        .parent()
        .parent()
        .get("lines")
        .unwrap()
        .get("*")
        .unwrap();
    let landed = exp.traverse(&qty).unwrap();
    let direct = root.node_at("user.orders.*.lines.*").unwrap();
    assert_eq!(landed, direct.to_ref());
}

#[test]
fn test_expression_is_reusable_across_owners() {
    let (root, qty) = sample_tree();
    let sku = root.node_at("user.orders.*.sku").unwrap();

    let to_name = PathExp::new().parent().get("name").unwrap();
    let user = root.node_at("user").unwrap();
    let name_from_user_child = to_name
        .traverse(&user.into_object().unwrap().get("orders").unwrap().to_ref())
        .unwrap();
    assert_eq!(name_from_user_child.path().unwrap(), "user.name");

    let up_two = PathExp::new().parent().parent();
    assert_eq!(
        up_two.traverse(&qty).unwrap().path().unwrap(),
        "user.orders.*.lines"
    );
    assert_eq!(
        up_two.traverse(&sku.to_ref()).unwrap().path().unwrap(),
        "user.orders"
    );
}

#[test]
fn test_in_place_movements_are_no_ops() {
    let (_root, qty) = sample_tree();
    let exp = PathExp::new().here().here();
    assert_eq!(exp.traverse(&qty).unwrap(), qty);
    let dotted = PathExp::new().get(".").unwrap();
    assert_eq!(dotted.movements(), &[Movement::InPlace]);
}

#[test]
fn test_named_movement_into_scalar_is_not_found() {
    let (_root, qty) = sample_tree();
    let err = PathExp::new().get("deeper").unwrap().traverse(&qty).unwrap_err();
    assert!(matches!(err, SchemaError::NotFound { .. }));
}

#[test]
fn test_walking_past_the_root_is_illegal() {
    let (_root, qty) = sample_tree();
    let mut exp = PathExp::new();
    for _ in 0..7 {
        exp = exp.parent();
    }
    let err = exp.traverse(&qty).unwrap_err();
    assert!(matches!(err, SchemaError::IllegalState(_)));
}

#[test]
fn test_parsed_expression_matches_built_one() {
    let (_root, qty) = sample_tree();
    let parsed: PathExp = "../../../sku".parse().unwrap();
    let built = PathExp::new()
        .parent()
        .parent()
        .parent()
        .get("sku")
        .unwrap();
    assert_eq!(parsed, built);
    assert_eq!(
        parsed.traverse(&qty).unwrap().path().unwrap(),
        "user.orders.*.sku"
    );
}

#[test]
fn test_starting_point_of_scalar_is_its_container() {
    let (root, qty) = sample_tree();
    let start = PathExp::find_starting_point(&qty).unwrap();
    assert_eq!(start.path().unwrap(), "user.orders.*.lines.*");
    let top = PathExp::find_starting_point(&root.to_ref()).unwrap();
    assert_eq!(top.path().unwrap(), "");
}

#[test]
fn test_resolved_reference_is_typed() {
    let (_root, qty) = sample_tree();
    let node = qty.resolve().unwrap();
    assert_eq!(node.kind(), NodeKind::Integer);
    let parent = node.end();
    assert!(!parent.is_array());
    assert_eq!(parent.path(), "user.orders.*.lines.*");
}
