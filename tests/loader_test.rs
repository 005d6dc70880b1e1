use sb3forge::dsl::loader::{self, FieldDef, InputDef};
use sb3forge::dsl::Input;
use sb3forge::error::BuildError;
use serde_json::json;
use std::fs;

const GREETING: &str = r#"
top_level: true
x: 50
y: 80
blocks:
  - opcode: event_whenflagclicked
  - opcode: looks_sayforsecs
    inputs:
      MESSAGE:
        value:
          - opcode: sensing_answer
        fallback:
          type: 10
          value: "Hello!"
      SECS:
        type: 4
        value: 2
  - opcode: looks_switchcostumeto
    inputs:
      COSTUME:
        value:
          shadow: true
          blocks:
            - opcode: looks_costume
              fields:
                COSTUME: costume2
  - opcode: data_setvariableto
    fields:
      VARIABLE:
        value: score
        id: score-id
    inputs:
      VALUE:
        type: 10
        value: "0"
"#;

#[test]
fn test_parse_script_definition() {
    let def = loader::parse_script(GREETING).expect("Failed to parse script YAML");

    assert!(def.top_level);
    assert_eq!(def.x, Some(50.0));
    assert_eq!(def.blocks.len(), 4);
    assert!(matches!(def.blocks[1].inputs["SECS"], InputDef::Literal(_)));
    assert!(matches!(def.blocks[1].inputs["MESSAGE"], InputDef::Chain { .. }));
    assert_eq!(
        def.blocks[3].fields["VARIABLE"],
        FieldDef::Ref { value: "score".to_string(), id: "score-id".to_string() }
    );
}

#[test]
fn test_build_script_from_definition() {
    let script = loader::parse_script(GREETING).unwrap().build().expect("Build failed");

    // hat, say, answer, switch, costume menu, set variable
    assert_eq!(script.blocks().len(), 6);
    let sequence = script.sequence();
    assert_eq!(sequence.len(), 4);

    let hat = script.get(sequence[0]).unwrap();
    assert!(hat.top_level);
    assert_eq!(hat.position.x, 50.0);
    assert_eq!(hat.position.y, 80.0);

    let say = script.get(sequence[1]).unwrap();
    let encoded = serde_json::to_value(say).unwrap();
    assert_eq!(encoded["inputs"]["SECS"], json!([1, [4, "2"]]));
    let Input::ConnectedWithFallback { block, fallback } = &say.inputs["MESSAGE"] else {
        panic!("Expected a connected input with fallback");
    };
    assert_eq!(script.get(block).unwrap().opcode, "sensing_answer");
    assert_eq!(fallback.value, "Hello!");

    let switch = script.get(sequence[2]).unwrap();
    let menu_id = switch.inputs["COSTUME"].block_id().unwrap();
    let menu = script.get(menu_id).unwrap();
    assert!(menu.shadow);
    assert!(!switch.shadow);

    let set = serde_json::to_value(script.get(sequence[3]).unwrap()).unwrap();
    assert_eq!(set["fields"], json!({ "VARIABLE": ["score", "score-id"] }));
}

#[test]
fn test_untyped_literal_fails_on_build() {
    let yaml = r#"
blocks:
  - opcode: motion_movesteps
    inputs:
      STEPS:
        value: 10
"#;
    let def = loader::parse_script(yaml).expect("Untyped literal should still parse");
    assert!(matches!(def.build(), Err(BuildError::InvalidInput { .. })));
}

#[test]
fn test_load_script_from_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("greeting.yaml");
    fs::write(&file_path, GREETING).expect("Failed to write temp file");

    let script = loader::load_script_from_yaml(&file_path).expect("Failed to load script");
    assert_eq!(script.sequence().len(), 4);
    assert!(script.is_top_level());

    let missing = loader::load_script_from_yaml(&temp_dir.path().join("missing.yaml"));
    assert!(missing.is_err());

    temp_dir.close().expect("Failed to close temp dir");
}

#[test]
fn test_load_reports_invalid_input() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file_path = temp_dir.path().join("bad.yaml");
    fs::write(
        &file_path,
        "blocks:\n  - opcode: looks_say\n    inputs:\n      MESSAGE:\n        value: hi\n",
    )
    .unwrap();

    let err = loader::load_script_from_yaml(&file_path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidInput { .. })
    ));
}
