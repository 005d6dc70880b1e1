use crate::ids::next_id;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// Shared handle to an asset's bytes. Clones are the same handle; two handles
/// built from equal bytes are not.
#[derive(Debug, Clone)]
pub struct AssetHandle(Arc<[u8]>);

impl AssetHandle {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn ptr_eq(&self, other: &AssetHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const u8 as usize
    }
}

impl From<Vec<u8>> for AssetHandle {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for AssetHandle {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

/// Asset ids keyed by handle identity. The cache keeps a clone of every handle
/// it has seen, so an address is never reused while its id is cached.
#[derive(Debug, Default)]
pub struct AssetIdCache {
    ids: DashMap<usize, (AssetHandle, String)>,
}

impl AssetIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, handle: &AssetHandle) -> String {
        self.ids
            .entry(handle.identity())
            .or_insert_with(|| (handle.clone(), next_id()))
            .1
            .clone()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Costume image. `data_format` is the file extension, e.g. `svg` or `png`.
#[derive(Debug, Clone)]
pub struct Costume {
    pub name: String,
    pub data_format: String,
    pub handle: AssetHandle,
    pub rotation_center: (f64, f64),
}

impl Costume {
    pub fn new(name: impl Into<String>, data_format: impl Into<String>, handle: AssetHandle) -> Self {
        Self {
            name: name.into(),
            data_format: data_format.into(),
            handle,
            rotation_center: (0.0, 0.0),
        }
    }

    pub fn with_rotation_center(mut self, x: f64, y: f64) -> Self {
        self.rotation_center = (x, y);
        self
    }

    pub fn is_vector(&self) -> bool {
        self.data_format.eq_ignore_ascii_case("svg")
    }

    pub(crate) fn to_json(&self, ids: &AssetIdCache) -> CostumeJson {
        let asset_id = ids.resolve(&self.handle);
        CostumeJson {
            md5ext: format!("{}.{}", asset_id, self.data_format),
            asset_id,
            name: self.name.clone(),
            data_format: self.data_format.clone(),
            bitmap_resolution: if self.is_vector() { 1 } else { 2 },
            rotation_center_x: self.rotation_center.0,
            rotation_center_y: self.rotation_center.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sound {
    pub name: String,
    pub data_format: String,
    pub handle: AssetHandle,
}

impl Sound {
    pub fn new(name: impl Into<String>, data_format: impl Into<String>, handle: AssetHandle) -> Self {
        Self {
            name: name.into(),
            data_format: data_format.into(),
            handle,
        }
    }

    pub(crate) fn to_json(&self, ids: &AssetIdCache) -> SoundJson {
        let asset_id = ids.resolve(&self.handle);
        // Audio metadata is not decoded; format/rate/sampleCount stay empty.
        SoundJson {
            md5ext: format!("{}.{}", asset_id, self.data_format),
            asset_id,
            name: self.name.clone(),
            data_format: self.data_format.clone(),
            format: String::new(),
            rate: 0,
            sample_count: 0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CostumeJson {
    pub asset_id: String,
    pub name: String,
    pub md5ext: String,
    pub data_format: String,
    pub bitmap_resolution: u32,
    pub rotation_center_x: f64,
    pub rotation_center_y: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SoundJson {
    pub asset_id: String,
    pub name: String,
    pub md5ext: String,
    pub data_format: String,
    pub format: String,
    pub rate: u32,
    pub sample_count: u64,
}
