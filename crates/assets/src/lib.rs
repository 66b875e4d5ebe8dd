//! Asset registry: content-addressed meshes, materials and animation clips.
//!
//! Assets are identified by a hash of their contents, so importing the same
//! file twice registers nothing new. Only glTF metadata is read: the game
//! draws its own primitives and uses an imported avatar for clip selection.

mod gltf;
mod rig;

pub use rig::{AvatarRig, RIG_STATES};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub vertex_count: u32,
    pub index_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".into(),
            base_color: [0.8, 0.8, 0.8, 1.0],
        }
    }
}

/// A named animation with its length in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channel_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Asset {
    Mesh(Mesh),
    Material(Material),
    Clip(AnimationClip),
}

impl Asset {
    fn content_id(&self) -> AssetId {
        let mut hasher = Sha256::new();
        match self {
            Asset::Mesh(m) => {
                hasher.update(b"mesh");
                hasher.update(m.name.as_bytes());
                hasher.update(m.vertex_count.to_le_bytes());
                hasher.update(m.index_count.to_le_bytes());
            }
            Asset::Material(m) => {
                hasher.update(b"material");
                hasher.update(m.name.as_bytes());
                for c in m.base_color {
                    hasher.update(c.to_le_bytes());
                }
            }
            Asset::Clip(c) => {
                hasher.update(b"clip");
                hasher.update(c.name.as_bytes());
                hasher.update(c.duration.to_le_bytes());
                hasher.update(c.channel_count.to_le_bytes());
            }
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        AssetId(u64::from_le_bytes(bytes))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset not found: {0:?}")]
    NotFound(AssetId),
    #[error("glTF parse error: {0}")]
    GltfParse(String),
    #[error("unsupported asset format: {0}")]
    Unsupported(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Content-addressed asset registry, persisted as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset and return its ID. Identical content maps to the same ID.
    pub fn register(&mut self, asset: Asset) -> AssetId {
        let id = asset.content_id();
        self.assets.insert(id, asset);
        id
    }

    /// Register a mesh and return its asset ID.
    pub fn register_mesh(&mut self, mesh: Mesh) -> AssetId {
        self.register(Asset::Mesh(mesh))
    }

    /// Register a material and return its asset ID.
    pub fn register_material(&mut self, material: Material) -> AssetId {
        self.register(Asset::Material(material))
    }

    /// Register an animation clip and return its asset ID.
    pub fn register_clip(&mut self, clip: AnimationClip) -> AssetId {
        self.register(Asset::Clip(clip))
    }

    /// Get an asset by ID.
    pub fn get(&self, id: AssetId) -> Result<&Asset, AssetError> {
        self.assets.get(&id).ok_or(AssetError::NotFound(id))
    }

    /// Get a mesh by ID.
    pub fn get_mesh(&self, id: AssetId) -> Option<&Mesh> {
        match self.assets.get(&id) {
            Some(Asset::Mesh(m)) => Some(m),
            _ => None,
        }
    }

    /// Get a material by ID.
    pub fn get_material(&self, id: AssetId) -> Option<&Material> {
        match self.assets.get(&id) {
            Some(Asset::Material(m)) => Some(m),
            _ => None,
        }
    }

    pub fn get_clip(&self, id: AssetId) -> Option<&AnimationClip> {
        match self.assets.get(&id) {
            Some(Asset::Clip(c)) => Some(c),
            _ => None,
        }
    }

    /// All registered animation clips, in ID order.
    pub fn clips(&self) -> impl Iterator<Item = &AnimationClip> {
        self.assets.values().filter_map(|a| match a {
            Asset::Clip(c) => Some(c),
            _ => None,
        })
    }

    /// Number of registered assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Import a `.gltf` file's meshes, materials and animations.
    ///
    /// Binary `.glb` containers are rejected.
    pub fn import_gltf(&mut self, path: impl AsRef<Path>) -> Result<Vec<AssetId>, AssetError> {
        let path = path.as_ref();
        let is_glb = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("glb"));
        if is_glb {
            return Err(AssetError::Unsupported(format!(
                "{}: binary glTF is not supported",
                path.display()
            )));
        }
        let data = std::fs::read_to_string(path)?;
        let ids = self.import_gltf_str(&data)?;
        tracing::info!(path = %path.display(), assets = ids.len(), "imported glTF");
        Ok(ids)
    }

    /// Import glTF JSON already in memory.
    pub fn import_gltf_str(&mut self, json: &str) -> Result<Vec<AssetId>, AssetError> {
        let assets = gltf::parse(json)?;
        Ok(assets.into_iter().map(|a| self.register(a)).collect())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let file = std::fs::File::open(path)?;
        let store: Self = serde_json::from_reader(file)?;
        Ok(store)
    }
}

pub fn crate_info() -> &'static str {
    "rooftop-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Mesh {
        Mesh {
            name: "cube".into(),
            vertex_count: 24,
            index_count: 36,
        }
    }

    #[test]
    fn register_and_get() {
        let mut store = AssetStore::new();
        let mesh = store.register_mesh(cube());
        let mat = store.register_material(Material::default());
        assert_eq!(store.get_mesh(mesh), Some(&cube()));
        assert!(store.get_material(mat).is_some());
        assert!(store.get_mesh(mat).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn content_addressed_dedup() {
        let mut store = AssetStore::new();
        let a = store.register_mesh(cube());
        let b = store.register_mesh(cube());
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn kinds_do_not_collide() {
        let mut store = AssetStore::new();
        let mesh = store.register_mesh(Mesh {
            name: "x".into(),
            vertex_count: 0,
            index_count: 0,
        });
        let clip = store.register_clip(AnimationClip {
            name: "x".into(),
            duration: 0.0,
            channel_count: 0,
        });
        assert_ne!(mesh, clip);
    }

    #[test]
    fn missing_id_is_not_found() {
        let store = AssetStore::new();
        assert!(matches!(store.get(AssetId(7)), Err(AssetError::NotFound(AssetId(7)))));
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut store = AssetStore::new();
        store.register_mesh(cube());
        let clip = store.register_clip(AnimationClip {
            name: "Run".into(),
            duration: 0.8,
            channel_count: 12,
        });
        store.save(tmp.path()).unwrap();

        let loaded = AssetStore::load(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get_clip(clip).map(|c| c.name.as_str()), Some("Run"));
    }

    #[test]
    fn glb_is_unsupported() {
        let tmp = tempfile::Builder::new().suffix(".glb").tempfile().unwrap();
        let mut store = AssetStore::new();
        assert!(matches!(store.import_gltf(tmp.path()), Err(AssetError::Unsupported(_))));
    }

    #[test]
    fn import_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.gltf");
        std::fs::write(
            &path,
            r#"{"asset":{"version":"2.0"},"materials":[{"name":"skin"}]}"#,
        )
        .unwrap();
        let mut store = AssetStore::new();
        let ids = store.import_gltf(&path).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.get_material(ids[0]).unwrap().base_color, [0.8, 0.8, 0.8, 1.0]);
    }
}
