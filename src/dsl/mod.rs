pub mod builder;
pub mod loader;
pub mod script;

use std::collections::BTreeMap;
use serde::ser::{Serialize, SerializeSeq, SerializeTuple, Serializer};

/// Node table keyed by block id. Only `parent`/`next` and connected inputs
/// define structure; key order carries no meaning.
pub type BlockTable = BTreeMap<String, Block>;

/// Type tags for literal input values.
pub mod literal {
    pub const MATH_NUMBER: u32 = 4;
    pub const POSITIVE_NUMBER: u32 = 5;
    pub const WHOLE_NUMBER: u32 = 6;
    pub const INTEGER: u32 = 7;
    pub const ANGLE: u32 = 8;
    pub const COLOR: u32 = 9;
    pub const TEXT: u32 = 10;
    pub const BROADCAST: u32 = 11;
    pub const VARIABLE: u32 = 12;
    pub const LIST: u32 = 13;
}

/// One instruction in a script.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Block {
    pub opcode: String,
    pub next: Option<String>,
    pub parent: Option<String>,
    pub inputs: BTreeMap<String, Input>,
    pub fields: BTreeMap<String, Field>,
    pub shadow: bool,
    #[serde(rename = "topLevel")]
    pub top_level: bool,
    #[serde(flatten)]
    pub position: Position,
}

impl Block {
    pub fn new(opcode: impl Into<String>) -> Self {
        Self {
            opcode: opcode.into(),
            next: None,
            parent: None,
            inputs: BTreeMap::new(),
            fields: BTreeMap::new(),
            shadow: false,
            top_level: false,
            position: Position::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A typed literal: the schema wants a type tag next to every bare value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: u32,
    pub value: String,
}

impl Literal {
    pub fn new(kind: u32, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl Serialize for Literal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.kind)?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// Encoding of one input slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `[1, [type, value]]`
    Literal(Literal),
    /// `[2, block_id]`
    Connected(String),
    /// `[3, block_id, [type, value]]`; the fallback is only shown by editors
    /// once the connected block is removed.
    ConnectedWithFallback { block: String, fallback: Literal },
}

impl Input {
    pub fn shape(&self) -> u8 {
        match self {
            Input::Literal(_) => 1,
            Input::Connected(_) => 2,
            Input::ConnectedWithFallback { .. } => 3,
        }
    }

    /// Id of the block feeding this slot, if any.
    pub fn block_id(&self) -> Option<&str> {
        match self {
            Input::Literal(_) => None,
            Input::Connected(id) | Input::ConnectedWithFallback { block: id, .. } => Some(id),
        }
    }
}

impl Serialize for Input {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Input::Literal(literal) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&self.shape())?;
                seq.serialize_element(literal)?;
                seq.end()
            }
            Input::Connected(block) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&self.shape())?;
                seq.serialize_element(block)?;
                seq.end()
            }
            Input::ConnectedWithFallback { block, fallback } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(&self.shape())?;
                seq.serialize_element(block)?;
                seq.serialize_element(fallback)?;
                seq.end()
            }
        }
    }
}

/// Field value, serialized as `[value, id]`. The id is set only for fields
/// naming a variable, list or broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub value: String,
    pub id: Option<String>,
}

impl Field {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            id: None,
        }
    }

    pub fn with_id(value: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            id: Some(id.into()),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.value)?;
        tuple.serialize_element(&self.id)?;
        tuple.end()
    }
}
