use sb3forge::dsl::builder::{block, BlockBuilder, InputSpec, LiteralSpec};
use sb3forge::dsl::literal;
use sb3forge::dsl::script::Script;
use sb3forge::dsl::{Input, Literal};
use sb3forge::error::BuildError;
use serde_json::json;

#[test]
fn test_literal_input_encoding() {
    let fragment = BlockBuilder::new("motion_movesteps")
        .input("STEPS", InputSpec::literal(literal::MATH_NUMBER, "10"))
        .build()
        .expect("Block build failed");

    assert_eq!(fragment.blocks.len(), 1);
    let node = fragment.base_block().expect("Base block missing");
    assert_eq!(node.opcode, "motion_movesteps");
    assert_eq!(node.inputs.get("STEPS"), Some(&Input::Literal(Literal::new(4, "10"))));

    let encoded = serde_json::to_value(node).unwrap();
    assert_eq!(encoded["inputs"], json!({ "STEPS": [1, [4, "10"]] }));
    assert_eq!(encoded["fields"], json!({}));
    assert_eq!(encoded["parent"], json!(null));
    assert_eq!(encoded["next"], json!(null));
    assert_eq!(encoded["shadow"], json!(false));
    assert_eq!(encoded["topLevel"], json!(false));
    assert_eq!(encoded["x"], json!(0.0));
    assert_eq!(encoded["y"], json!(0.0));
}

#[test]
fn test_block_function_form() {
    let fragment = block(
        "looks_seteffectto",
        &[("EFFECT", "COLOR")],
        vec![("VALUE", InputSpec::literal(literal::MATH_NUMBER, "25"))],
    )
    .unwrap();

    let encoded = serde_json::to_value(fragment.base_block().unwrap()).unwrap();
    assert_eq!(encoded["fields"], json!({ "EFFECT": ["COLOR", null] }));
    assert_eq!(encoded["inputs"], json!({ "VALUE": [1, [4, "25"]] }));
}

#[test]
fn test_literal_without_type_is_rejected() {
    let result = BlockBuilder::new("motion_movesteps")
        .input("STEPS", LiteralSpec::untyped("10"))
        .build();

    match result {
        Err(BuildError::InvalidInput { opcode, input }) => {
            assert_eq!(opcode, "motion_movesteps");
            assert_eq!(input, "STEPS");
        }
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_fallback_without_type_is_rejected() {
    let mut reporter = Script::new();
    reporter.push(BlockBuilder::new("motion_xposition").build().unwrap());

    let result = BlockBuilder::new("looks_say")
        .input(
            "MESSAGE",
            InputSpec::Chain {
                value: reporter,
                fallback: Some(LiteralSpec::untyped("Hello!")),
            },
        )
        .build();

    assert!(matches!(result, Err(BuildError::InvalidInput { .. })));
}

#[test]
fn test_connected_input_merges_nested_blocks() {
    let mut reporter = Script::new();
    reporter.push(BlockBuilder::new("motion_xposition").build().unwrap());
    let reporter_id = reporter.first().unwrap().to_string();

    let fragment = BlockBuilder::new("looks_say")
        .input("MESSAGE", reporter)
        .build()
        .unwrap();

    assert_eq!(fragment.blocks.len(), 2);
    assert!(fragment.blocks.contains_key(&reporter_id));

    let encoded = serde_json::to_value(fragment.base_block().unwrap()).unwrap();
    assert_eq!(encoded["inputs"], json!({ "MESSAGE": [2, reporter_id] }));
}

#[test]
fn test_connected_input_with_fallback() {
    let mut reporter = Script::new();
    reporter.push(BlockBuilder::new("sensing_answer").build().unwrap());
    let reporter_id = reporter.first().unwrap().to_string();

    let fragment = BlockBuilder::new("looks_say")
        .input(
            "MESSAGE",
            InputSpec::chain_with_fallback(reporter, literal::TEXT, "Hello!"),
        )
        .build()
        .unwrap();

    let node = fragment.base_block().unwrap();
    assert_eq!(node.inputs["MESSAGE"].shape(), 3);
    assert_eq!(node.inputs["MESSAGE"].block_id(), Some(reporter_id.as_str()));

    let encoded = serde_json::to_value(node).unwrap();
    assert_eq!(
        encoded["inputs"],
        json!({ "MESSAGE": [3, reporter_id, [10, "Hello!"]] })
    );
}

#[test]
fn test_empty_chain_input_is_omitted() {
    let fragment = BlockBuilder::new("control_forever")
        .input("SUBSTACK", Script::new())
        .build()
        .unwrap();

    let node = fragment.base_block().unwrap();
    assert!(node.inputs.is_empty());
    assert!(!node.inputs.contains_key("SUBSTACK"));
    assert_eq!(fragment.blocks.len(), 1);
}

#[test]
fn test_field_reference_keeps_id() {
    let fragment = BlockBuilder::new("data_setvariableto")
        .field_ref("VARIABLE", "score", "var-id")
        .input("VALUE", InputSpec::literal(literal::TEXT, "0"))
        .build()
        .unwrap();

    let encoded = serde_json::to_value(fragment.base_block().unwrap()).unwrap();
    assert_eq!(encoded["fields"], json!({ "VARIABLE": ["score", "var-id"] }));
}

#[test]
fn test_block_ids_are_fresh() {
    let a = BlockBuilder::new("motion_ifonedgebounce").build().unwrap();
    let b = BlockBuilder::new("motion_ifonedgebounce").build().unwrap();

    assert_ne!(a.base, b.base);
    assert_eq!(a.base.len(), 32);
    assert!(a.base.chars().all(|c| c.is_ascii_hexdigit()));
}
