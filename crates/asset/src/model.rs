//! glTF 2.0 importer: every triangle primitive of the default scene becomes a
//! [`ModelPart`] with its node hierarchy baked into a local matrix.
//! Supports .gltf with sibling buffers/images, .glb and data URIs via `gltf::import`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use glam::Mat4;
use gltf::image::Format;
use gltf::mesh::Mode;

use crate::material::MaterialData;
use crate::mesh::{MeshData, MeshVertex};
use crate::texture::TextureData;

#[derive(Clone, Debug)]
pub struct ModelPart {
    pub name: String,
    pub mesh: MeshData,
    pub material: MaterialData,
    /// Transform from part space to model-root space.
    pub local: Mat4,
}

#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub parts: Vec<ModelPart>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.mesh.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.mesh.triangle_count()).sum()
    }
}

/// Load a glTF/GLB file and everything it references.
pub fn load_gltf<P: AsRef<Path>>(path: P) -> Result<ModelData> {
    let path = path.as_ref();
    log::info!("Loading model from {:?}", path);

    let (doc, buffers, images) = gltf::import(path)
        .with_context(|| format!("Failed to import glTF: {}", path.display()))?;

    let scene = doc
        .default_scene()
        .or_else(|| doc.scenes().next())
        .with_context(|| format!("glTF has no scenes: {}", path.display()))?;

    let mut importer = Importer {
        buffers: &buffers,
        images: &images,
        textures: HashMap::new(),
        parts: Vec::new(),
    };
    for node in scene.nodes() {
        importer.visit(&node, Mat4::IDENTITY)?;
    }

    let model = ModelData {
        parts: importer.parts,
    };
    if model.parts.is_empty() {
        bail!("glTF contains no triangle primitives: {}", path.display());
    }

    log::info!(
        "Loaded model: {} parts, {} vertices, {} triangles",
        model.parts.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}

struct Importer<'a> {
    buffers: &'a [gltf::buffer::Data],
    images: &'a [gltf::image::Data],
    textures: HashMap<usize, Option<TextureData>>,
    parts: Vec<ModelPart>,
}

impl Importer<'_> {
    fn visit(&mut self, node: &gltf::Node, parent: Mat4) -> Result<()> {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            for prim in mesh.primitives() {
                if prim.mode() != Mode::Triangles {
                    log::warn!(
                        "Skipping {:?} primitive in mesh '{}'",
                        prim.mode(),
                        mesh.name().unwrap_or("?")
                    );
                    continue;
                }
                let data = self.read_primitive(&prim).with_context(|| {
                    format!("Mesh '{}' primitive {}", mesh.name().unwrap_or("?"), prim.index())
                })?;
                let material = self.read_material(&prim.material());
                self.parts.push(ModelPart {
                    name: mesh.name().unwrap_or("mesh").to_owned(),
                    mesh: data,
                    material,
                    local: world,
                });
            }
        }

        for child in node.children() {
            self.visit(&child, world)?;
        }
        Ok(())
    }

    fn read_primitive(&self, prim: &gltf::Primitive) -> Result<MeshData> {
        let reader = prim.reader(|buffer| self.buffers.get(buffer.index()).map(|d| d.0.as_slice()));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .context("Primitive has no POSITION attribute")?
            .collect();
        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(n) => n.collect(),
            None => vec![[0.0, 1.0, 0.0]; positions.len()],
        };
        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(t) => t.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                MeshVertex::new(
                    *p,
                    normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                    uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                )
            })
            .collect::<Vec<_>>();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(idx) => idx.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            bail!("Index {} out of bounds ({} vertices)", bad, vertices.len());
        }

        let data = MeshData::new(vertices, indices);
        if !data.is_valid() {
            bail!("Primitive has no triangles");
        }
        Ok(data)
    }

    fn read_material(&mut self, m: &gltf::Material) -> MaterialData {
        let pbr = m.pbr_metallic_roughness();
        let base_color_texture = pbr
            .base_color_texture()
            .and_then(|info| self.texture(info.texture().source().index()));
        MaterialData {
            name: m.name().unwrap_or("material").to_owned(),
            base_color: pbr.base_color_factor(),
            base_color_texture,
            metallic: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
            double_sided: m.double_sided(),
        }
    }

    fn texture(&mut self, image_index: usize) -> Option<TextureData> {
        let images = self.images;
        self.textures
            .entry(image_index)
            .or_insert_with(|| {
                let img = images.get(image_index)?;
                match convert_image(img) {
                    Ok(tex) => Some(tex),
                    Err(e) => {
                        log::warn!("Ignoring texture image {}: {:#}", image_index, e);
                        None
                    }
                }
            })
            .clone()
    }
}

fn convert_image(img: &gltf::image::Data) -> Result<TextureData> {
    match img.format {
        Format::R8G8B8A8 => TextureData::new_rgba8(img.width, img.height, img.pixels.clone()),
        Format::R8G8B8 => TextureData::from_rgb8(img.width, img.height, &img.pixels),
        Format::R8 => TextureData::from_r8(img.width, img.height, &img.pixels),
        other => bail!("Unsupported image format {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::io::Write;

    // One triangle: positions (0,0,0) (1,0,0) (0,1,0), u16 indices 0 1 2.
    const TRIANGLE_BUFFER: &str =
        "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA=";

    fn write_gltf(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".gltf").tempfile().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn triangle_gltf(materials_json: &str) -> String {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "children": [1], "translation": [0.0, 2.0, 0.0] }},
    {{ "mesh": 0, "scale": [2.0, 2.0, 2.0] }}
  ],
  "meshes": [{{ "name": "tri", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 {material} }}] }}],
  {materials}
  "buffers": [{{ "byteLength": 44, "uri": "{TRIANGLE_BUFFER}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#,
            material = if materials_json.is_empty() { "" } else { r#", "material": 0"# },
            materials = materials_json,
        )
    }

    #[test]
    fn imports_embedded_triangle_with_baked_hierarchy() {
        let file = write_gltf(&triangle_gltf(""));
        let model = load_gltf(file.path()).unwrap();

        assert_eq!(model.parts.len(), 1);
        let part = &model.parts[0];
        assert_eq!(part.name, "tri");
        assert_eq!(part.mesh.vertices.len(), 3);
        assert_eq!(part.mesh.indices, vec![0, 1, 2]);
        // Missing normals default to +Y.
        assert_eq!(part.mesh.vertices[0].normal, [0.0, 1.0, 0.0]);

        let p = part.local.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(2.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn reads_pbr_factors() {
        let materials = r#""materials": [{ "name": "paint", "doubleSided": true,
            "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0], "metallicFactor": 0.25, "roughnessFactor": 0.5 } }],"#;
        let file = write_gltf(&triangle_gltf(materials));
        let model = load_gltf(file.path()).unwrap();

        let m = &model.parts[0].material;
        assert_eq!(m.name, "paint");
        assert_eq!(m.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.metallic, 0.25);
        assert_eq!(m.roughness, 0.5);
        assert!(m.double_sided);
        assert!(m.base_color_texture.is_none());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_gltf("/nonexistent/scene.gltf").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/scene.gltf"));
    }

    #[test]
    fn scene_without_meshes_is_rejected() {
        let file = write_gltf(
            r#"{ "asset": { "version": "2.0" }, "scene": 0, "scenes": [{ "nodes": [0] }], "nodes": [{}] }"#,
        );
        let err = load_gltf(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("no triangle primitives"));
    }

    // Positions only, no index buffer and no TEXCOORD_0.
    const POSITIONS_BUFFER: &str =
        "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA";
    // Positions followed by UVs (0,0) (1,0) (0,1).
    const POSITIONS_UV_BUFFER: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/";
    // Positions followed by u16 indices 0 1 5.
    const BAD_INDEX_BUFFER: &str =
        "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAUAAAA=";
    // 2x1 RGB PNG: red, green.
    const RED_GREEN_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAIAAAABCAIAAAB7QOjdAAAAD0lEQVR4nGP4z8DA8J8BAAf/Af8Bf4mnAAAAAElFTkSuQmCC";

    const POSITION_ACCESSOR: &str = r#"{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }"#;

    #[test]
    fn non_indexed_primitive_gets_sequential_indices_and_zero_uvs() {
        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0 }}],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
  "buffers": [{{ "byteLength": 36, "uri": "{POSITIONS_BUFFER}" }}],
  "bufferViews": [{{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }}],
  "accessors": [{POSITION_ACCESSOR}]
}}"#
        );
        let file = write_gltf(&json);
        let model = load_gltf(file.path()).unwrap();

        let part = &model.parts[0];
        assert_eq!(part.name, "mesh");
        assert_eq!(part.mesh.indices, vec![0, 1, 2]);
        assert!(part.mesh.vertices.iter().all(|v| v.uv == [0.0, 0.0]));
        assert_eq!(part.material.name, "material");
        assert!(part.local.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0 }}],
  "meshes": [{{ "name": "tri", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}] }}],
  "buffers": [{{ "byteLength": 44, "uri": "{BAD_INDEX_BUFFER}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }}
  ],
  "accessors": [
    {POSITION_ACCESSOR},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
  ]
}}"#
        );
        let file = write_gltf(&json);
        let err = load_gltf(file.path()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Index 5 out of bounds"), "{msg}");
        assert!(msg.contains("Mesh 'tri' primitive 0"), "{msg}");
    }

    #[test]
    fn base_color_texture_is_decoded_and_shared() {
        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scenes": [{{ "nodes": [0, 1] }}],
  "nodes": [{{ "mesh": 0 }}, {{ "mesh": 1 }}],
  "meshes": [
    {{ "name": "a", "primitives": [{{ "attributes": {{ "POSITION": 0, "TEXCOORD_0": 1 }}, "material": 0 }}] }},
    {{ "name": "b", "primitives": [{{ "attributes": {{ "POSITION": 0, "TEXCOORD_0": 1 }}, "material": 1 }}] }}
  ],
  "materials": [
    {{ "name": "left", "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }},
    {{ "name": "right", "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }}
  ],
  "textures": [{{ "source": 0 }}],
  "images": [{{ "uri": "{RED_GREEN_PNG}" }}],
  "buffers": [{{ "byteLength": 60, "uri": "{POSITIONS_UV_BUFFER}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 24 }}
  ],
  "accessors": [
    {POSITION_ACCESSOR},
    {{ "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" }}
  ]
}}"#
        );
        let file = write_gltf(&json);
        let model = load_gltf(file.path()).unwrap();

        assert_eq!(model.parts.len(), 2);
        assert_eq!(model.parts[0].mesh.vertices[1].uv, [1.0, 0.0]);
        let tex = model.parts[0].material.base_color_texture.as_ref().unwrap();
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.data, vec![255, 0, 0, 255, 0, 255, 0, 255]);
        assert_eq!(model.parts[1].material.base_color_texture.as_ref(), Some(tex));
    }

    fn image(format: Format, width: u32, height: u32, pixels: Vec<u8>) -> gltf::image::Data {
        gltf::image::Data {
            pixels,
            format,
            width,
            height,
        }
    }

    #[test]
    fn luma_and_rgb_images_expand_to_rgba() {
        let gray = convert_image(&image(Format::R8, 2, 1, vec![10, 20])).unwrap();
        assert_eq!(gray.data, vec![10, 10, 10, 255, 20, 20, 20, 255]);

        let rgb = convert_image(&image(Format::R8G8B8, 1, 1, vec![1, 2, 3])).unwrap();
        assert_eq!(rgb.data, vec![1, 2, 3, 255]);

        let err = convert_image(&image(Format::R8G8, 1, 1, vec![1, 2])).unwrap_err();
        assert!(err.to_string().contains("Unsupported image format"));
    }

    #[test]
    fn texture_cache_converts_each_image_once() {
        let images = vec![image(Format::R8G8B8A8, 1, 1, vec![9, 8, 7, 6])];
        let mut importer = Importer {
            buffers: &[],
            images: &images,
            textures: HashMap::new(),
            parts: Vec::new(),
        };

        let first = importer.texture(0).unwrap();
        let second = importer.texture(0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.data, vec![9, 8, 7, 6]);
        assert_eq!(importer.textures.len(), 1);

        // Missing image index yields no texture and is remembered.
        assert!(importer.texture(3).is_none());
        assert_eq!(importer.textures.len(), 2);
    }
}
