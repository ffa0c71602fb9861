//! Build Tests
//!
//! End-to-end checks of tree declaration and flattening.

use ruletree::prelude::*;
use serde_json::json;

fn tokens(rules: &RuleSet, path: &str) -> Vec<String> {
    rules
        .tokens(path)
        .unwrap_or_else(|| panic!("no entry for {:?}", path))
}

// =============================================================================
// Default Rules
// =============================================================================

#[test]
fn test_fresh_nodes_carry_their_type_rule() {
    let root = ruletree::create();
    root.string("s").unwrap();
    root.integer("i").unwrap();
    root.numeric("n").unwrap();
    root.float("f").unwrap();
    root.boolean("b").unwrap();
    root.scalar("x").unwrap();
    root.array("a").unwrap();
    root.file("u").unwrap();
    root.object("o").unwrap();

    let rules = root.build().unwrap();
    assert_eq!(tokens(&rules, "s"), ["string"]);
    assert_eq!(tokens(&rules, "i"), ["integer"]);
    assert_eq!(tokens(&rules, "n"), ["numeric"]);
    assert_eq!(tokens(&rules, "f"), ["float"]);
    assert_eq!(tokens(&rules, "b"), ["boolean"]);
    assert!(tokens(&rules, "x").is_empty());
    assert_eq!(tokens(&rules, "a"), ["array"]);
    assert!(tokens(&rules, "u").is_empty());
    assert_eq!(tokens(&rules, "o"), ["array"]);
}

#[test]
fn test_single_string_node() {
    let root = ruletree::create();
    let rules = root.string("foo").unwrap().build().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(tokens(&rules, "foo"), ["string"]);
}

// =============================================================================
// Flattening
// =============================================================================

#[test]
fn test_nested_structure_flattens_to_one_entry_per_node() {
    let root = ruletree::create();
    root.object("foo")
        .unwrap()
        .array("bar")
        .unwrap()
        .each_object()
        .unwrap()
        .string("name")
        .unwrap()
        .required()
        .max(255)
        .unwrap();

    let rules = root.build().unwrap();
    assert_eq!(
        rules.paths().collect::<Vec<_>>(),
        ["", "foo", "foo.bar", "foo.bar.*", "foo.bar.*.name"]
    );
    assert_eq!(tokens(&rules, "foo.bar"), ["array"]);
    assert_eq!(
        rules.get("foo.bar.*").unwrap(),
        &[BuiltRule::object(KnownPropertiesOnly::new(["name"]))]
    );
    assert_eq!(
        tokens(&rules, "foo.bar.*.name"),
        ["string", "required", "max:255"]
    );
}

#[test]
fn test_guard_lists_declared_properties_in_order() {
    let root = ruletree::create();
    let user = root.object("user").unwrap();
    user.string("name").unwrap();
    user.integer("age").unwrap();

    let rules = root.build().unwrap();
    assert_eq!(
        rules.get("user").unwrap(),
        &[BuiltRule::object(KnownPropertiesOnly::new(["name", "age"]))]
    );

    let user = user.allow_unknown_properties(true);
    let rules = user.build().unwrap();
    assert_eq!(tokens(&rules, "user"), ["array"]);
}

#[test]
fn test_guard_comes_before_own_rules() {
    let root = ruletree::create();
    root.object("meta")
        .unwrap()
        .required()
        .string("a")
        .unwrap();
    let rules = root.build().unwrap();
    assert_eq!(
        tokens(&rules, "meta"),
        ["known_properties_only:a", "required"]
    );
}

#[test]
fn test_custom_properties_rule() {
    let root = ruletree::create();
    root.object("meta")
        .unwrap()
        .properties_rule(|view| {
            vec![RuleInput::from(format!(
                "keys:{}",
                view.defined_property_names().join("+")
            ))]
        })
        .string("a")
        .unwrap()
        .end()
        .string("b")
        .unwrap();

    let rules = root.build().unwrap();
    assert_eq!(tokens(&rules, "meta"), ["keys:a+b"]);
}

#[test]
fn test_custom_properties_rule_yields_to_allowed_unknown_properties() {
    let root = ruletree::create();
    root.object("meta")
        .unwrap()
        .properties_rule(|_| vec![RuleInput::from("custom_guard")])
        .allow_unknown_properties(true)
        .string("a")
        .unwrap();

    let rules = root.build().unwrap();
    assert_eq!(tokens(&rules, "meta"), ["array"]);
}

#[test]
fn test_custom_properties_rule_skipped_without_properties() {
    let root = ruletree::create();
    root.object("meta")
        .unwrap()
        .properties_rule(|_| vec![RuleInput::from("custom_guard")])
        .required();

    let rules = root.build().unwrap();
    assert_eq!(tokens(&rules, "meta"), ["array", "required"]);
}

#[test]
fn test_each_kind_mismatch_is_illegal_in_either_order() {
    let root = ruletree::create();

    let loose = root.array("loose").unwrap();
    loose.each(NodeKind::Scalar).unwrap();
    let err = loose.each(NodeKind::String).unwrap_err();
    assert!(matches!(err, SchemaError::IllegalState(_)));

    let strict = root.array("strict").unwrap();
    strict.each(NodeKind::String).unwrap();
    let err = strict.each(NodeKind::Scalar).unwrap_err();
    assert!(matches!(err, SchemaError::IllegalState(_)));

    let rules = root.build().unwrap();
    assert!(tokens(&rules, "loose.*").is_empty());
    assert_eq!(tokens(&rules, "strict.*"), ["string"]);
}

#[test]
fn test_removed_property_is_omitted() {
    let root = ruletree::create();
    let user = root.object("user").unwrap();
    user.string("name").unwrap();
    user.object("address").unwrap().string("city").unwrap();

    let user = user.remove("address");
    let rules = root.build().unwrap();
    assert!(rules.contains("user.name"));
    assert!(!rules.contains("user.address"));
    assert!(!rules.contains("user.address.city"));
    assert_eq!(tokens(&rules, "user"), ["known_properties_only:name"]);
    assert_eq!(user.defined_property_names(), ["name"]);
}

#[test]
fn test_build_is_repeatable() {
    let root = ruletree::create();
    let foo = root.object("foo").unwrap();
    foo.boolean("flag").unwrap();
    foo.string("bar")
        .unwrap()
        .required_if(PathExp::new().parent().get("flag").unwrap(), true)
        .unwrap();

    let first = root.build().unwrap();
    let second = root.build().unwrap();
    assert_eq!(first, second);
    assert_eq!(tokens(&first, "foo.bar"), ["string", "required_if:foo.flag,true"]);
}

#[test]
fn test_redeclared_property_does_not_duplicate_entries() {
    let root = ruletree::create();
    root.string("name").unwrap().required();
    root.string("name").unwrap().max(10).unwrap();
    let rules = root.build().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(tokens(&rules, "name"), ["string", "required", "max:10"]);
}

// =============================================================================
// References
// =============================================================================

#[test]
fn test_three_reference_forms_agree() {
    let root = ruletree::create();
    let foo = root.object("foo").unwrap();
    let bar = foo.string("bar").unwrap();

    foo.string("by_path")
        .unwrap()
        .required_if("foo.bar", "boo")
        .unwrap();
    foo.string("by_node")
        .unwrap()
        .required_if(&bar, "boo")
        .unwrap();
    foo.string("by_expression")
        .unwrap()
        .required_if(PathExp::new().parent().get("bar").unwrap(), "boo")
        .unwrap();

    let rules = root.build().unwrap();
    for key in ["foo.by_path", "foo.by_node", "foo.by_expression"] {
        assert_eq!(tokens(&rules, key), ["string", "required_if:foo.bar,boo"]);
    }
}

#[test]
fn test_reference_declared_before_target_exists() {
    let root = ruletree::create();
    let form = root.object("form").unwrap();
    form.string("confirmation")
        .unwrap()
        .same(PathExp::new().parent().get("password").unwrap())
        .unwrap();
    form.string("password").unwrap();

    let rules = root.build().unwrap();
    assert_eq!(
        tokens(&rules, "form.confirmation"),
        ["string", "same:form.password"]
    );
}

#[test]
fn test_missing_reference_target_fails_build() {
    let root = ruletree::create();
    root.string("a")
        .unwrap()
        .same(PathExp::new().parent().get("nope").unwrap())
        .unwrap();
    let err = root.build().unwrap_err();
    assert!(matches!(err, SchemaError::NotFound { .. }));
}

#[test]
fn test_relative_reference_through_array() {
    let root = ruletree::create();
    let item = root.array("bar").unwrap().each_object().unwrap();
    item.boolean("cool_kid").unwrap();
    item.array("hobbies")
        .unwrap()
        .required_if(PathExp::new().parent().get("cool_kid").unwrap(), 1)
        .unwrap();

    let rules = root.build().unwrap();
    assert_eq!(
        tokens(&rules, "bar.*.hobbies"),
        ["array", "required_if:bar.*.cool_kid,1"]
    );
}

#[test]
fn test_reference_into_other_tree() {
    let other = ruletree::create();
    let target = other.object("shared").unwrap().string("id").unwrap();

    let root = ruletree::create();
    root.string("ref").unwrap().same(&target).unwrap();
    let rules = root.build().unwrap();
    assert_eq!(tokens(&rules, "ref"), ["string", "same:shared.id"]);
}

#[test]
fn test_reference_into_dropped_tree_is_illegal() {
    let root = ruletree::create();
    {
        let other = ruletree::create();
        let target = other.string("gone").unwrap();
        root.string("ref").unwrap().same(&target).unwrap();
    }
    let err = root.build().unwrap_err();
    assert!(matches!(err, SchemaError::IllegalState(_)));
}

#[test]
fn test_multi_field_relational_rules() {
    let root = ruletree::create();
    let a = root.string("a").unwrap();
    root.string("b").unwrap();
    root.string("c")
        .unwrap()
        .required_with([PathArg::from(&a), PathArg::from("b")])
        .unwrap()
        .prohibits(["a"])
        .unwrap();

    let rules = root.build().unwrap();
    assert_eq!(
        tokens(&rules, "c"),
        ["string", "required_with:a,b", "prohibits:a"]
    );
}

// =============================================================================
// Rule Vocabulary
// =============================================================================

#[test]
fn test_generic_rules_are_snake_cased() {
    let root = ruletree::create();
    root.string("s")
        .unwrap()
        .rule_named("helloWorld")
        .unwrap()
        .rule_with("helloWorld", [1, 2, 3])
        .unwrap();
    let rules = root.build().unwrap();
    assert_eq!(
        tokens(&rules, "s"),
        ["string", "hello_world", "hello_world:1,2,3"]
    );
}

#[test]
fn test_empty_rule_name_is_rejected() {
    let root = ruletree::create();
    let name = root.string("name").unwrap();
    let err = name.clone().rule_named("").unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));
    let err = name.clone().rule_named("   ").unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));
    assert_eq!(name.rule_tokens().unwrap(), ["string"]);
}

#[test]
fn test_argument_normalization_in_rules() {
    let root = ruletree::create();
    root.scalar("v")
        .unwrap()
        .in_list(["a", "b"])
        .unwrap()
        .rule_with("flags", [RuleArg::from(true), RuleArg::from(None::<i32>), RuleArg::from(1.5)])
        .unwrap();
    let rules = root.build().unwrap();
    assert_eq!(tokens(&rules, "v"), ["in:a,b", "flags:true,NULL,1.5"]);
}

#[test]
fn test_aggregate_argument_is_rejected() {
    let root = ruletree::create();
    let err = root
        .string("s")
        .unwrap()
        .rule_with("in", [json!(["a", "b"])])
        .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));
}

#[test]
fn test_conditional_helpers() {
    let root = ruletree::create();
    root.string("a")
        .unwrap()
        .required_when(false)
        .when(true, |node| node.max(3))
        .unwrap();
    root.string("b").unwrap().required_when(true);
    let rules = root.build().unwrap();
    assert_eq!(tokens(&rules, "a"), ["string", "max:3"]);
    assert_eq!(tokens(&rules, "b"), ["string", "required"]);
}

#[test]
fn test_assign_to_captures_nested_handle() {
    let mut name = None;
    let root = ruletree::create()
        .object("user")
        .unwrap()
        .string("name")
        .unwrap()
        .assign_to(&mut name)
        .end()
        .end();

    let name = name.unwrap().required();
    assert_eq!(name.path(), "user.name");
    assert_eq!(
        tokens(&root.build().unwrap(), "user.name"),
        ["string", "required"]
    );
}

#[test]
fn test_custom_kind() {
    let email = CustomKind::with_rules("email", ["string", "email:rfc"]);
    let root = ruletree::create();
    root.custom("contact", email.clone()).unwrap().required();
    root.array("cc").unwrap().each_scalar(email).unwrap();

    let rules = root.build().unwrap();
    assert_eq!(tokens(&rules, "contact"), ["string", "email:rfc", "required"]);
    assert_eq!(tokens(&rules, "cc.*"), ["string", "email:rfc"]);
}

#[test]
fn test_rule_object_passes_through() {
    let root = ruletree::create();
    root.string("code")
        .unwrap()
        .rule(RuleInput::object(KnownPropertiesOnly::new(["x"])))
        .unwrap();
    let rules = root.build().unwrap();
    let code = rules.get("code").unwrap();
    assert!(code[1].as_object().is_some());
    assert_eq!(
        serde_json::to_value(&rules).unwrap()["code"],
        json!(["string", {"rule": "known_properties_only", "allowed_properties": ["x"]}])
    );
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_reject_delimiter_policy() {
    let mut config = BuilderConfig::default();
    config.arguments.delimiters = ruletree::DelimiterPolicy::Reject;
    let root = RootNode::with_config(config);

    let err = root
        .string("s")
        .unwrap()
        .in_list(["a,b"])
        .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)));

    let verbatim = ruletree::create();
    verbatim.string("s").unwrap().in_list(["a,b"]).unwrap();
    assert_eq!(
        tokens(&verbatim.build().unwrap(), "s"),
        ["string", "in:a,b"]
    );
}
