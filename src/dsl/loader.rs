use crate::dsl::builder::{BlockBuilder, Fragment, InputSpec, LiteralSpec};
use crate::dsl::script::Script;
use crate::error::BuildResult;
use anyhow::{Context as AnyhowContext, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Declarative form of a script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptDef {
    #[serde(default)]
    pub top_level: bool,
    #[serde(default)]
    pub shadow: bool,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    pub blocks: Vec<BlockDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockDef {
    pub opcode: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDef>,
    #[serde(default)]
    pub inputs: BTreeMap<String, InputDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldDef {
    Ref {
        #[serde(deserialize_with = "scalar_string")]
        value: String,
        id: String,
    },
    Plain(#[serde(deserialize_with = "scalar_string")] String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InputDef {
    Chain {
        value: NestedDef,
        #[serde(default)]
        fallback: Option<LiteralSpec>,
    },
    Literal(LiteralSpec),
}

/// A nested chain is either a bare list of blocks or a full script (to mark it shadow).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NestedDef {
    Blocks(Vec<BlockDef>),
    Script(ScriptDef),
}

impl ScriptDef {
    pub fn build(&self) -> BuildResult<Script> {
        let mut script = Script::with_flags(self.top_level, self.shadow);
        if self.x.is_some() || self.y.is_some() {
            script = script.at(self.x.unwrap_or_default(), self.y.unwrap_or_default());
        }
        for block in &self.blocks {
            script.push(block.build()?);
        }
        Ok(script)
    }
}

impl BlockDef {
    pub fn build(&self) -> BuildResult<Fragment> {
        let mut builder = BlockBuilder::new(&self.opcode);
        for (name, field) in &self.fields {
            builder = match field {
                FieldDef::Plain(value) => builder.field(name, value.as_str()),
                FieldDef::Ref { value, id } => builder.field_ref(name, value.as_str(), id.as_str()),
            };
        }
        for (name, input) in &self.inputs {
            builder = builder.input(name, input.to_spec()?);
        }
        builder.build()
    }
}

impl InputDef {
    fn to_spec(&self) -> BuildResult<InputSpec> {
        match self {
            InputDef::Literal(literal) => Ok(InputSpec::Literal(literal.clone())),
            InputDef::Chain { value, fallback } => Ok(InputSpec::Chain {
                value: value.build()?,
                fallback: fallback.clone(),
            }),
        }
    }
}

impl NestedDef {
    fn build(&self) -> BuildResult<Script> {
        match self {
            NestedDef::Blocks(blocks) => {
                let mut script = Script::new();
                for block in blocks {
                    script.push(block.build()?);
                }
                Ok(script)
            }
            NestedDef::Script(def) => def.build(),
        }
    }
}

pub fn parse_script(yaml: &str) -> Result<ScriptDef> {
    let def: ScriptDef = serde_yaml::from_str(yaml).context("Failed to deserialize script YAML")?;
    Ok(def)
}

pub fn load_script_from_yaml(file_path: &Path) -> Result<Script> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read YAML file from {}", file_path.display()))?;

    let def = parse_script(&yaml_content)
        .with_context(|| format!("Failed to load script from {}", file_path.display()))?;

    Ok(def.build()?)
}

/// Accepts a YAML string, number or bool and keeps its textual form.
pub(crate) fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a scalar literal, found {other}"))),
    }
}
