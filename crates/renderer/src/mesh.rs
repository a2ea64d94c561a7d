//! GPU mesh/material upload.

use asset::{MaterialData, MeshData, TextureData};
use bytemuck::{Pod, Zeroable};
use wgpu::util::{DeviceExt, TextureDataOrder};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, BufferUsages, Device, Extent3d, Queue, Sampler,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, VertexBufferLayout,
    VertexStepMode,
};

use crate::uniforms::ObjectUniform;

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

/// Uploaded mesh with its own material bind group. The object UBO is
/// rewritten on every draw, so each mesh is drawn at most once per frame.
pub(crate) struct GpuMesh {
    pub vertex_buf: Buffer,
    pub index_buf: Buffer,
    pub index_count: u32,
    pub object_buf: Buffer,
    pub bind_group: BindGroup,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub double_sided: bool,
}

impl GpuMesh {
    pub fn upload(
        device: &Device,
        queue: &Queue,
        layout: &BindGroupLayout,
        sampler: &Sampler,
        mesh: &MeshData,
        material: &MaterialData,
    ) -> Self {
        let vertices: Vec<Vertex> = mesh
            .vertices
            .iter()
            .map(|v| Vertex {
                pos: v.position,
                normal: v.normal,
                uv: v.uv,
            })
            .collect();

        let label = material.name.as_str();
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });

        let object_init = ObjectUniform::new(
            glam::Mat4::IDENTITY,
            material.base_color,
            material.metallic,
            material.roughness,
        );
        let object_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object UBO"),
            contents: bytemuck::bytes_of(&object_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let white = TextureData::white();
        let texture = material.base_color_texture.as_ref().unwrap_or(&white);
        let view = upload_texture(device, queue, texture);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object BG"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            vertex_buf,
            index_buf,
            index_count: mesh.indices.len() as u32,
            object_buf,
            bind_group,
            base_color: material.base_color,
            metallic: material.metallic,
            roughness: material.roughness,
            double_sided: material.double_sided,
        }
    }

    pub fn object_uniform(&self, world: glam::Mat4) -> ObjectUniform {
        ObjectUniform::new(world, self.base_color, self.metallic, self.roughness)
    }
}

fn upload_texture(device: &Device, queue: &Queue, tex: &TextureData) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &TextureDescriptor {
            label: Some("BaseColorTex"),
            size: Extent3d {
                width: tex.width.max(1),
                height: tex.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        &tex.data,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
