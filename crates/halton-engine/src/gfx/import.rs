//! glTF 2.0 static mesh loading.

use std::path::Path;

use super::error::GfxError;
use super::vertex::SceneVertex;

/// One indexed draw inside an imported mesh.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IndexRange {
    pub first_index: u32,
    pub index_count: u32,
    pub base_vertex: i32,
}

/// CPU-side geometry of an imported file.
#[derive(Debug, Default, Clone)]
pub struct MeshData {
    pub vertices: Vec<SceneVertex>,
    pub indices: Vec<u32>,
    pub ranges: Vec<IndexRange>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

pub fn load_gltf(path: &Path) -> Result<MeshData, GfxError> {
    let (document, buffers, _images) = gltf::import(path).map_err(|source| GfxError::MeshLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let data = collect(&document, &buffers)?;
    log::info!(
        "loaded {}: {} vertices, {} indices, {} ranges",
        path.display(),
        data.vertices.len(),
        data.indices.len(),
        data.ranges.len()
    );
    Ok(data)
}

pub fn load_gltf_slice(bytes: &[u8]) -> Result<MeshData, GfxError> {
    let (document, buffers, _images) = gltf::import_slice(bytes).map_err(|source| GfxError::MeshLoad {
        path: "<memory>".into(),
        source,
    })?;
    collect(&document, &buffers)
}

/// Triangle primitives of every mesh in the document, in node-independent
/// object space. Missing normals and texture coordinates are zero-filled.
fn collect(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<MeshData, GfxError> {
    let mut data = MeshData::default();

    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "skipping {:?} primitive in mesh {:?}",
                    primitive.mode(),
                    mesh.name()
                );
                continue;
            }

            let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| &d.0[..]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| GfxError::MeshLayout(format!("mesh {:?} has no positions", mesh.name())))?
                .collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|it| it.collect())
                .unwrap_or_default();
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|it| it.into_f32().collect())
                .unwrap_or_default();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(it) => it.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                return Err(GfxError::MeshLayout(format!(
                    "index {bad} out of range for {} vertices",
                    positions.len()
                )));
            }

            let base_vertex = data.vertices.len() as i32;
            let first_index = data.indices.len() as u32;

            data.vertices
                .extend(positions.iter().enumerate().map(|(i, p)| SceneVertex {
                    position: *p,
                    normal: normals.get(i).copied().unwrap_or_default(),
                    uv: uvs.get(i).copied().unwrap_or_default(),
                }));
            data.indices.extend_from_slice(&indices);
            data.ranges.push(IndexRange {
                first_index,
                index_count: indices.len() as u32,
                base_vertex,
            });
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    // One triangle: 3 positions (36 bytes) followed by 3 u16 indices (6 bytes + 2 pad).
    const TRIANGLE: &str = r#"{
        "asset": { "version": "2.0" },
        "buffers": [{
            "byteLength": 44,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0, 0, 0], "max": [1, 1, 0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }]
    }"#;

    #[test]
    fn loads_an_embedded_triangle() {
        let data = load_gltf_slice(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(data.vertices.len(), 3);
        assert_eq!(data.indices, vec![0, 1, 2]);
        assert_eq!(
            data.ranges,
            vec![IndexRange { first_index: 0, index_count: 3, base_vertex: 0 }]
        );
        assert_eq!(data.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(data.vertices[2].normal, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_gltf(Path::new("does/not/exist.gltf")).unwrap_err();
        assert!(matches!(err, GfxError::MeshLoad { .. }));
    }
}
