//! Asset loading/parsers: meshes, materials, textures, HDR environments, glTF models.

pub mod hdr;
pub mod material;
pub mod mesh;
pub mod model;
pub mod radiance;
pub mod texture;

pub use hdr::HdrTexture;
pub use material::MaterialData;
pub use mesh::{MeshData, MeshVertex};
pub use model::{ModelData, ModelPart, load_gltf};
pub use radiance::{RadianceMap, RadianceProcessor, RadianceSettings};
pub use texture::TextureData;
