pub mod asset;
pub mod target;

use crate::error::{BuildError, BuildResult};
use crate::package::{FileSet, Packager};
use crate::project::asset::{AssetHandle, AssetIdCache};
use crate::project::target::Target;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const SEMVER: &str = "3.0.0";
pub const VM_VERSION: &str = "2.3.0";
pub const PROJECT_JSON: &str = "project.json";

/// Project-wide metadata written under `meta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMeta {
    pub agent: String,
}

impl Default for ProjectMeta {
    fn default() -> Self {
        Self {
            agent: concat!("sb3forge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// One stage plus sprites, in serialization order.
///
/// Asset ids are resolved through the project's own cache, so `to_json` and
/// `assets` agree for as long as the project lives.
#[derive(Debug, Default)]
pub struct Project {
    stage: Option<Target>,
    sprites: Vec<Target>,
    extensions: Vec<String>,
    extension_urls: BTreeMap<String, String>,
    meta: ProjectMeta,
    asset_ids: AssetIdCache,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, agent: &str) -> Self {
        self.meta.agent = agent.to_string();
        self
    }

    pub fn meta(&self) -> &ProjectMeta {
        &self.meta
    }

    /// A stage replaces any earlier stage; sprites are appended.
    pub fn add_target(&mut self, target: Target) -> &mut Self {
        if target.is_stage() {
            if self.stage.is_some() {
                debug!("replacing previously registered stage");
            }
            self.stage = Some(target);
        } else {
            self.sprites.push(target);
        }
        self
    }

    pub fn add_extension(&mut self, id: &str) -> &mut Self {
        if !self.extensions.iter().any(|e| e == id) {
            self.extensions.push(id.to_string());
        }
        self
    }

    pub fn set_extension_url(&mut self, id: &str, url: &str) -> &mut Self {
        self.extension_urls.insert(id.to_string(), url.to_string());
        self
    }

    pub fn stage(&self) -> Option<&Target> {
        self.stage.as_ref()
    }

    pub fn stage_mut(&mut self) -> Option<&mut Target> {
        self.stage.as_mut()
    }

    pub fn sprites(&self) -> &[Target] {
        &self.sprites
    }

    pub fn sprite_mut(&mut self, name: &str) -> Option<&mut Target> {
        self.sprites.iter_mut().find(|t| t.name() == Some(name))
    }

    fn targets(&self) -> BuildResult<impl Iterator<Item = &Target>> {
        let stage = self.stage.as_ref().ok_or(BuildError::MissingStage)?;
        Ok(std::iter::once(stage).chain(self.sprites.iter()))
    }

    pub fn to_json(&self) -> BuildResult<Value> {
        let targets = self
            .targets()?
            .map(|t| t.to_json(&self.asset_ids))
            .collect::<BuildResult<Vec<_>>>()?;
        debug!(targets = targets.len(), "serialized project");

        Ok(json!({
            "targets": targets,
            "monitors": [],
            "extensions": self.extensions,
            "extensionURLs": self.extension_urls,
            "meta": {
                "semver": SEMVER,
                "vm": VM_VERSION,
                "agent": self.meta.agent,
            }
        }))
    }

    /// `<assetId>.<ext>` for every costume and sound; a handle used twice
    /// yields one entry.
    pub fn assets(&self) -> BuildResult<FileSet> {
        let mut files = FileSet::new();
        for target in self.targets()? {
            let costumes = target.costumes().iter().map(|c| (&c.handle, &c.data_format));
            let sounds = target.sounds().iter().map(|s| (&s.handle, &s.data_format));
            for (handle, ext) in costumes.chain(sounds) {
                let id = self.asset_ids.resolve(handle);
                files.insert(format!("{id}.{ext}"), handle.clone());
            }
        }
        debug!(assets = files.len(), "collected project assets");
        Ok(files)
    }

    pub fn files(&self) -> BuildResult<FileSet> {
        let mut files = self.assets()?;
        let manifest = serde_json::to_vec(&self.to_json()?)?;
        files.insert(PROJECT_JSON.to_string(), AssetHandle::new(manifest));
        Ok(files)
    }

    /// The file set is fixed before the packager starts.
    pub async fn zip<P: Packager + ?Sized>(&self, packager: &P) -> BuildResult<Vec<u8>> {
        let files = self.files()?;
        info!(files = files.len(), "packaging project");
        let archive = packager.pack(files).await.map_err(BuildError::Package)?;
        info!(bytes = archive.len(), "project packaged");
        Ok(archive)
    }
}
