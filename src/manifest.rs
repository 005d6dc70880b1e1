use crate::dsl::loader::ScriptDef;
use crate::project::asset::{AssetHandle, Costume, Sound};
use crate::project::target::{RotationStyle, Target};
use crate::project::Project;
use anyhow::{bail, Context as AnyhowContext, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// YAML description of a whole project.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub extension_urls: BTreeMap<String, String>,
    pub stage: TargetDef,
    #[serde(default)]
    pub sprites: Vec<TargetDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetDef {
    #[serde(default)]
    pub name: Option<String>,
    pub costumes: Vec<CostumeDef>,
    #[serde(default)]
    pub sounds: Vec<SoundDef>,
    #[serde(default)]
    pub scripts: Vec<ScriptDef>,
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    #[serde(default)]
    pub lists: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    pub broadcasts: Vec<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub size: Option<f64>,
    pub direction: Option<f64>,
    pub visible: Option<bool>,
    pub draggable: Option<bool>,
    pub rotation_style: Option<RotationStyle>,
    pub layer_order: Option<i32>,
    pub volume: Option<f64>,
    pub tempo: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostumeDef {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub rotation_center_x: f64,
    #[serde(default)]
    pub rotation_center_y: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SoundDef {
    pub name: String,
    pub path: PathBuf,
}

impl Manifest {
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to deserialize manifest YAML")
    }

    pub fn load(file_path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read manifest from {}", file_path.display()))?;
        Self::parse(&yaml_content).with_context(|| format!("Invalid manifest {}", file_path.display()))
    }

    /// Builds the project; asset paths resolve against `base_dir`.
    pub fn into_project(self, base_dir: &Path) -> Result<Project> {
        if let Some(name) = &self.stage.name {
            bail!("The stage cannot be named (found '{}')", name);
        }

        let mut project = Project::new();
        if let Some(agent) = &self.agent {
            project = project.with_agent(agent);
        }
        for id in &self.extensions {
            project.add_extension(id);
        }
        for (id, url) in &self.extension_urls {
            project.set_extension_url(id, url);
        }

        let mut assets = AssetReader::new(base_dir);
        project.add_target(self.stage.build(Target::stage(), &mut assets)?);
        for sprite in self.sprites {
            let Some(name) = sprite.name.clone() else {
                bail!("Every sprite needs a name");
            };
            project.add_target(sprite.build(Target::sprite(name), &mut assets)?);
        }
        info!(sprites = project.sprites().len(), "built project from manifest");
        Ok(project)
    }
}

impl TargetDef {
    fn build(self, mut target: Target, assets: &mut AssetReader) -> Result<Target> {
        let label = target.display_name().to_string();

        for costume in &self.costumes {
            let (handle, ext) = assets.read(&costume.path)?;
            target.add_costume(
                Costume::new(costume.name.as_str(), ext, handle)
                    .with_rotation_center(costume.rotation_center_x, costume.rotation_center_y),
            );
        }
        for sound in &self.sounds {
            let (handle, ext) = assets.read(&sound.path)?;
            target.add_sound(Sound::new(sound.name.as_str(), ext, handle));
        }
        for (name, value) in self.variables {
            target.add_variable(name, value);
        }
        for (name, items) in self.lists {
            target.add_list(name, items);
        }
        for name in self.broadcasts {
            target.add_broadcast(name);
        }
        for script in &self.scripts {
            let script = script
                .build()
                .with_context(|| format!("Failed to build script for {}", label))?;
            target.add_script(script);
        }

        if let Some(volume) = self.volume {
            target.volume = volume;
        }
        if let Some(layer_order) = self.layer_order {
            target.layer_order = layer_order;
        }
        if let Some(tempo) = self.tempo {
            if let Some(stage) = target.stage_state_mut() {
                stage.tempo = tempo;
            }
        }
        if self.x.is_some() || self.y.is_some() {
            target.set_position(self.x.unwrap_or_default(), self.y.unwrap_or_default())?;
        }
        if let Some(size) = self.size {
            target.set_size(size)?;
        }
        if let Some(direction) = self.direction {
            target.set_direction(direction)?;
        }
        if let Some(visible) = self.visible {
            target.set_visible(visible)?;
        }
        if let Some(draggable) = self.draggable {
            target.set_draggable(draggable)?;
        }
        if let Some(style) = self.rotation_style {
            target.set_rotation_style(style)?;
        }
        Ok(target)
    }
}

/// Reads each asset file once; a path listed twice shares one handle.
struct AssetReader<'a> {
    base_dir: &'a Path,
    loaded: HashMap<PathBuf, (AssetHandle, String)>,
}

impl<'a> AssetReader<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            loaded: HashMap::new(),
        }
    }

    fn read(&mut self, path: &Path) -> Result<(AssetHandle, String)> {
        let full_path = self.base_dir.join(path);
        if let Some(found) = self.loaded.get(&full_path) {
            return Ok(found.clone());
        }
        let ext = full_path
            .extension()
            .and_then(|x| x.to_str())
            .map(str::to_lowercase)
            .with_context(|| format!("Asset {} has no file extension", full_path.display()))?;
        let bytes = fs::read(&full_path)
            .with_context(|| format!("Failed to read asset {}", full_path.display()))?;
        let entry = (AssetHandle::new(bytes), ext);
        self.loaded.insert(full_path, entry.clone());
        Ok(entry)
    }
}
