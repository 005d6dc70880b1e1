use crate::dsl::script::Script;
use crate::dsl::{Block, BlockTable, Field, Input, Literal};
use crate::error::{BuildError, BuildResult};
use crate::ids::next_id;
use serde::Deserialize;

/// A freshly built block plus every block its nested inputs brought along.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub base: String,
    pub blocks: BlockTable,
}

impl Fragment {
    /// The block keyed by `base`.
    pub fn base_block(&self) -> Option<&Block> {
        self.blocks.get(&self.base)
    }
}

/// Literal value as the caller declares it. The type tag is optional here so
/// that declarative sources can be checked when the block is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LiteralSpec {
    #[serde(rename = "type", default)]
    pub kind: Option<u32>,
    #[serde(deserialize_with = "crate::dsl::loader::scalar_string")]
    pub value: String,
}

impl LiteralSpec {
    pub fn typed(kind: u32, value: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            value: value.into(),
        }
    }

    pub fn untyped(value: impl Into<String>) -> Self {
        Self {
            kind: None,
            value: value.into(),
        }
    }

    fn resolve(self, opcode: &str, input: &str) -> BuildResult<Literal> {
        let kind = self
            .kind
            .ok_or_else(|| BuildError::invalid_input(opcode, input))?;
        Ok(Literal::new(kind, self.value))
    }
}

#[derive(Debug, Clone)]
pub enum InputSpec {
    Literal(LiteralSpec),
    Chain {
        value: Script,
        fallback: Option<LiteralSpec>,
    },
}

impl InputSpec {
    pub fn literal(kind: u32, value: impl Into<String>) -> Self {
        InputSpec::Literal(LiteralSpec::typed(kind, value))
    }

    pub fn chain(value: Script) -> Self {
        InputSpec::Chain {
            value,
            fallback: None,
        }
    }

    pub fn chain_with_fallback(value: Script, kind: u32, fallback: impl Into<String>) -> Self {
        InputSpec::Chain {
            value,
            fallback: Some(LiteralSpec::typed(kind, fallback)),
        }
    }
}

impl From<LiteralSpec> for InputSpec {
    fn from(spec: LiteralSpec) -> Self {
        InputSpec::Literal(spec)
    }
}

impl From<Script> for InputSpec {
    fn from(script: Script) -> Self {
        InputSpec::chain(script)
    }
}

/// Builds one block, keyed by a fresh id.
pub struct BlockBuilder {
    opcode: String,
    fields: Vec<(String, Field)>,
    inputs: Vec<(String, InputSpec)>,
}

impl BlockBuilder {
    pub fn new(opcode: &str) -> Self {
        Self {
            opcode: opcode.to_string(),
            fields: Vec::new(),
            inputs: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), Field::new(value)));
        self
    }

    /// Field pointing at a variable, list or broadcast by id.
    pub fn field_ref(mut self, name: &str, value: impl Into<String>, id: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), Field::with_id(value, id)));
        self
    }

    pub fn input(mut self, name: &str, spec: impl Into<InputSpec>) -> Self {
        self.inputs.push((name.to_string(), spec.into()));
        self
    }

    pub fn build(self) -> BuildResult<Fragment> {
        let base = next_id();
        let mut root = Block::new(self.opcode.as_str());
        root.fields.extend(self.fields);

        let mut blocks = BlockTable::new();
        for (name, spec) in self.inputs {
            match spec {
                InputSpec::Literal(literal) => {
                    let literal = literal.resolve(&self.opcode, &name)?;
                    root.inputs.insert(name, Input::Literal(literal));
                }
                InputSpec::Chain { value, fallback } => {
                    // An empty chain leaves the slot out entirely.
                    let Some(first) = value.first().map(str::to_string) else {
                        continue;
                    };
                    let input = match fallback {
                        Some(fallback) => Input::ConnectedWithFallback {
                            block: first,
                            fallback: fallback.resolve(&self.opcode, &name)?,
                        },
                        None => Input::Connected(first),
                    };
                    blocks.extend(value.into_blocks());
                    root.inputs.insert(name, input);
                }
            }
        }

        blocks.insert(base.clone(), root);
        Ok(Fragment { base, blocks })
    }
}

/// Node factory in function form: opcode, fields and inputs in one call.
pub fn block(opcode: &str, fields: &[(&str, &str)], inputs: Vec<(&str, InputSpec)>) -> BuildResult<Fragment> {
    let builder = fields
        .iter()
        .fold(BlockBuilder::new(opcode), |b, (name, value)| b.field(name, *value));
    inputs
        .into_iter()
        .fold(builder, |b, (name, spec)| b.input(name, spec))
        .build()
}
