use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{AnimationClip, Asset, AssetError, Material, Mesh};

// Only the parts of the glTF 2.0 JSON schema the registry records.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    accessors: Vec<Accessor>,
    meshes: Vec<GltfMesh>,
    materials: Vec<GltfMaterial>,
    animations: Vec<GltfAnimation>,
}

#[derive(Debug, Deserialize)]
struct Accessor {
    count: u32,
    #[serde(default)]
    max: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GltfMesh {
    name: Option<String>,
    #[serde(default)]
    primitives: Vec<Primitive>,
}

#[derive(Debug, Deserialize)]
struct Primitive {
    #[serde(default)]
    attributes: BTreeMap<String, usize>,
    indices: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GltfMaterial {
    name: Option<String>,
    #[serde(rename = "pbrMetallicRoughness")]
    pbr: Option<Pbr>,
}

#[derive(Debug, Deserialize)]
struct Pbr {
    #[serde(rename = "baseColorFactor")]
    base_color_factor: Option<[f32; 4]>,
}

#[derive(Debug, Deserialize)]
struct GltfAnimation {
    name: Option<String>,
    #[serde(default)]
    channels: Vec<serde_json::Value>,
    #[serde(default)]
    samplers: Vec<Sampler>,
}

#[derive(Debug, Deserialize)]
struct Sampler {
    input: usize,
}

impl Document {
    fn accessor(&self, index: usize) -> Result<&Accessor, AssetError> {
        self.accessors
            .get(index)
            .ok_or_else(|| AssetError::GltfParse(format!("accessor {index} out of range")))
    }
}

/// Parse glTF JSON into registry assets: meshes, then materials, then clips.
pub(crate) fn parse(json: &str) -> Result<Vec<Asset>, AssetError> {
    let doc: Document = serde_json::from_str(json).map_err(|e| AssetError::GltfParse(e.to_string()))?;
    let mut assets = Vec::with_capacity(doc.meshes.len() + doc.materials.len() + doc.animations.len());

    for (i, mesh) in doc.meshes.iter().enumerate() {
        let mut vertex_count = 0;
        let mut index_count = 0;
        for prim in &mesh.primitives {
            if let Some(&position) = prim.attributes.get("POSITION") {
                vertex_count += doc.accessor(position)?.count;
            }
            if let Some(indices) = prim.indices {
                index_count += doc.accessor(indices)?.count;
            }
        }
        assets.push(Asset::Mesh(Mesh {
            name: mesh.name.clone().unwrap_or_else(|| format!("mesh_{i}")),
            vertex_count,
            index_count,
        }));
    }

    for (i, mat) in doc.materials.iter().enumerate() {
        let base_color = mat
            .pbr
            .as_ref()
            .and_then(|p| p.base_color_factor)
            .unwrap_or(Material::default().base_color);
        assets.push(Asset::Material(Material {
            name: mat.name.clone().unwrap_or_else(|| format!("material_{i}")),
            base_color,
        }));
    }

    for (i, anim) in doc.animations.iter().enumerate() {
        let mut duration = 0.0f32;
        for sampler in &anim.samplers {
            let input = doc.accessor(sampler.input)?;
            if let Some(&end) = input.max.first() {
                duration = duration.max(end);
            }
        }
        assets.push(Asset::Clip(AnimationClip {
            name: anim.name.clone().unwrap_or_else(|| format!("clip_{i}")),
            duration,
            channel_count: anim.channels.len() as u32,
        }));
    }

    tracing::debug!(
        meshes = doc.meshes.len(),
        materials = doc.materials.len(),
        clips = doc.animations.len(),
        "parsed glTF"
    );
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AVATAR: &str = r#"{
        "asset": { "version": "2.0" },
        "accessors": [
            { "count": 120, "type": "VEC3" },
            { "count": 360, "type": "SCALAR" },
            { "count": 30, "type": "SCALAR", "min": [0.0], "max": [1.25] },
            { "count": 20, "type": "SCALAR", "min": [0.0], "max": [0.8] }
        ],
        "meshes": [
            { "name": "Body", "primitives": [ { "attributes": { "POSITION": 0, "NORMAL": 0 }, "indices": 1 } ] }
        ],
        "materials": [
            { "name": "Suit", "pbrMetallicRoughness": { "baseColorFactor": [0.1, 0.2, 0.3, 1.0] } }
        ],
        "animations": [
            { "name": "Idle", "channels": [ {}, {} ], "samplers": [ { "input": 2, "output": 0 } ] },
            { "name": "Run", "channels": [ {} ], "samplers": [ { "input": 3 }, { "input": 2 } ] }
        ]
    }"#;

    #[test]
    fn reads_counts_colors_and_durations() {
        let assets = parse(AVATAR).unwrap();
        assert_eq!(assets.len(), 4);
        assert_eq!(
            assets[0],
            Asset::Mesh(Mesh {
                name: "Body".into(),
                vertex_count: 120,
                index_count: 360,
            })
        );
        match &assets[1] {
            Asset::Material(m) => assert_eq!(m.base_color, [0.1, 0.2, 0.3, 1.0]),
            other => panic!("expected material, got {other:?}"),
        }
        match &assets[3] {
            Asset::Clip(c) => {
                assert_eq!(c.name, "Run");
                // Longest sampler wins.
                assert_eq!(c.duration, 1.25);
                assert_eq!(c.channel_count, 1);
            }
            other => panic!("expected clip, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse("{ not json"), Err(AssetError::GltfParse(_))));
    }

    #[test]
    fn dangling_accessor_is_a_parse_error() {
        let json = r#"{ "meshes": [ { "primitives": [ { "attributes": { "POSITION": 4 } } ] } ] }"#;
        assert!(matches!(parse(json), Err(AssetError::GltfParse(_))));
    }

    #[test]
    fn unnamed_entries_get_index_names() {
        let json = r#"{ "meshes": [ { "primitives": [] } ], "animations": [ {} ] }"#;
        let assets = parse(json).unwrap();
        assert!(matches!(&assets[0], Asset::Mesh(m) if m.name == "mesh_0" && m.vertex_count == 0));
        assert!(matches!(&assets[1], Asset::Clip(c) if c.name == "clip_0" && c.duration == 0.0));
    }
}
