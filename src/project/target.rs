use crate::dsl::BlockTable;
use crate::dsl::script::Script;
use crate::error::{BuildError, BuildResult};
use crate::ids::next_id;
use crate::project::asset::{AssetIdCache, Costume, CostumeJson, Sound, SoundJson};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const STAGE_NAME: &str = "Stage";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationStyle {
    #[default]
    #[serde(rename = "all around")]
    AllAround,
    #[serde(rename = "left-right")]
    LeftRight,
    #[serde(rename = "don't rotate")]
    DontRotate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoState {
    #[default]
    On,
    Off,
    OnFlipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageState {
    pub tempo: f64,
    pub video_transparency: f64,
    pub video_state: VideoState,
    pub text_to_speech_language: Option<String>,
}

impl Default for StageState {
    fn default() -> Self {
        Self {
            tempo: 60.0,
            video_transparency: 50.0,
            video_state: VideoState::On,
            text_to_speech_language: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteState {
    #[serde(skip)]
    pub name: String,
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub direction: f64,
    pub draggable: bool,
    pub rotation_style: RotationStyle,
}

impl SpriteState {
    fn new(name: String) -> Self {
        Self {
            name,
            visible: true,
            x: 0.0,
            y: 0.0,
            size: 100.0,
            direction: 90.0,
            draggable: false,
            rotation_style: RotationStyle::AllAround,
        }
    }
}

/// The stage is the one target without a name.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    Stage(StageState),
    Sprite(SpriteState),
}

#[derive(Debug, Clone)]
pub struct Target {
    pub kind: TargetKind,
    pub current_costume: usize,
    pub volume: f64,
    pub layer_order: i32,
    costumes: Vec<Costume>,
    sounds: Vec<Sound>,
    blocks: BlockTable,
    variables: BTreeMap<String, (String, Value)>,
    lists: BTreeMap<String, (String, Vec<Value>)>,
    broadcasts: BTreeMap<String, String>,
}

impl Target {
    fn with_kind(kind: TargetKind, layer_order: i32) -> Self {
        Self {
            kind,
            current_costume: 0,
            volume: 100.0,
            layer_order,
            costumes: Vec::new(),
            sounds: Vec::new(),
            blocks: BlockTable::new(),
            variables: BTreeMap::new(),
            lists: BTreeMap::new(),
            broadcasts: BTreeMap::new(),
        }
    }

    pub fn stage() -> Self {
        Self::with_kind(TargetKind::Stage(StageState::default()), 0)
    }

    pub fn sprite(name: impl Into<String>) -> Self {
        Self::with_kind(TargetKind::Sprite(SpriteState::new(name.into())), 1)
    }

    pub fn is_stage(&self) -> bool {
        matches!(self.kind, TargetKind::Stage(_))
    }

    /// `None` for the stage.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TargetKind::Stage(_) => None,
            TargetKind::Sprite(sprite) => Some(&sprite.name),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(STAGE_NAME)
    }

    pub fn costumes(&self) -> &[Costume] {
        &self.costumes
    }

    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    pub fn blocks(&self) -> &BlockTable {
        &self.blocks
    }

    pub fn add_costume(&mut self, costume: Costume) -> &mut Self {
        self.costumes.push(costume);
        self
    }

    pub fn add_sound(&mut self, sound: Sound) -> &mut Self {
        self.sounds.push(sound);
        self
    }

    /// Merges a finished script into this target's block table.
    pub fn add_script(&mut self, script: Script) -> &mut Self {
        self.blocks.extend(script.into_blocks());
        self
    }

    /// Returns the new variable's id, for use in `field_ref`.
    pub fn add_variable(&mut self, name: impl Into<String>, value: impl Into<Value>) -> String {
        let id = next_id();
        self.variables.insert(id.clone(), (name.into(), value.into()));
        id
    }

    pub fn add_list(&mut self, name: impl Into<String>, items: Vec<Value>) -> String {
        let id = next_id();
        self.lists.insert(id.clone(), (name.into(), items));
        id
    }

    pub fn add_broadcast(&mut self, name: impl Into<String>) -> String {
        let id = next_id();
        self.broadcasts.insert(id.clone(), name.into());
        id
    }

    pub fn stage_state_mut(&mut self) -> Option<&mut StageState> {
        match &mut self.kind {
            TargetKind::Stage(stage) => Some(stage),
            TargetKind::Sprite(_) => None,
        }
    }

    fn sprite_mut(&mut self, operation: &str) -> BuildResult<&mut SpriteState> {
        match &mut self.kind {
            TargetKind::Sprite(sprite) => Ok(sprite),
            TargetKind::Stage(_) => Err(BuildError::invalid_mutation(operation)),
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) -> BuildResult<&mut Self> {
        self.sprite_mut("rename")?.name = name.into();
        Ok(self)
    }

    pub fn set_position(&mut self, x: f64, y: f64) -> BuildResult<&mut Self> {
        let sprite = self.sprite_mut("set_position")?;
        sprite.x = x;
        sprite.y = y;
        Ok(self)
    }

    pub fn set_direction(&mut self, direction: f64) -> BuildResult<&mut Self> {
        self.sprite_mut("set_direction")?.direction = direction;
        Ok(self)
    }

    pub fn set_size(&mut self, size: f64) -> BuildResult<&mut Self> {
        self.sprite_mut("set_size")?.size = size;
        Ok(self)
    }

    pub fn set_visible(&mut self, visible: bool) -> BuildResult<&mut Self> {
        self.sprite_mut("set_visible")?.visible = visible;
        Ok(self)
    }

    pub fn set_draggable(&mut self, draggable: bool) -> BuildResult<&mut Self> {
        self.sprite_mut("set_draggable")?.draggable = draggable;
        Ok(self)
    }

    pub fn set_rotation_style(&mut self, style: RotationStyle) -> BuildResult<&mut Self> {
        self.sprite_mut("set_rotation_style")?.rotation_style = style;
        Ok(self)
    }

    pub fn to_json(&self, ids: &AssetIdCache) -> BuildResult<Value> {
        if self.costumes.is_empty() {
            return Err(BuildError::MissingCostume {
                target: self.display_name().to_string(),
            });
        }

        let state = match &self.kind {
            TargetKind::Stage(stage) => StateJson::Stage(stage),
            TargetKind::Sprite(sprite) => StateJson::Sprite(sprite),
        };
        let json = TargetJson {
            is_stage: self.is_stage(),
            name: self.display_name(),
            variables: self
                .variables
                .iter()
                .map(|(id, (name, value))| (id.as_str(), (name.as_str(), value)))
                .collect(),
            lists: self
                .lists
                .iter()
                .map(|(id, (name, items))| (id.as_str(), (name.as_str(), items.as_slice())))
                .collect(),
            broadcasts: &self.broadcasts,
            blocks: &self.blocks,
            comments: Map::new(),
            current_costume: self.current_costume,
            costumes: self.costumes.iter().map(|c| c.to_json(ids)).collect(),
            sounds: self.sounds.iter().map(|s| s.to_json(ids)).collect(),
            volume: self.volume,
            layer_order: if self.is_stage() { 0 } else { self.layer_order },
            state,
        };
        Ok(serde_json::to_value(json)?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetJson<'a> {
    is_stage: bool,
    name: &'a str,
    variables: BTreeMap<&'a str, (&'a str, &'a Value)>,
    lists: BTreeMap<&'a str, (&'a str, &'a [Value])>,
    broadcasts: &'a BTreeMap<String, String>,
    blocks: &'a BlockTable,
    comments: Map<String, Value>,
    current_costume: usize,
    costumes: Vec<CostumeJson>,
    sounds: Vec<SoundJson>,
    volume: f64,
    layer_order: i32,
    #[serde(flatten)]
    state: StateJson<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum StateJson<'a> {
    Stage(&'a StageState),
    Sprite(&'a SpriteState),
}
