//! Vertex formats and GPU mesh buffers.

use bytemuck::{Pod, Zeroable};

/// Flat-shaded grid vertex: position, per-face normal, face color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl GridVertex {
    /// Vertex buffer layout: location 0 = position, 1 = normal, 2 = color.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: (std::mem::size_of::<[f32; 3]>() * 2) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Unlit line vertex: position and color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    /// Vertex buffer layout: location 0 = position, 1 = color.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// A GPU mesh: a vertex buffer, an optional u32 index buffer, and the draw
/// count (indices when indexed, vertices otherwise).
///
/// Grid levels are drawn non-indexed — flat shading duplicates every vertex
/// per face anyway — while the sphere shell shares vertices and indexes.
pub struct MeshBuffer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    draw_count: u32,
}

impl MeshBuffer {
    /// Bind and draw the whole mesh.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(indices) => {
                render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.draw_count, 0, 0..1);
            }
            None => render_pass.draw(0..self.draw_count, 0..1),
        }
    }

    /// Number of indices (indexed) or vertices (non-indexed) drawn.
    #[must_use]
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }
}

/// Creates [`MeshBuffer`]s on a device.
pub struct BufferAllocator<'a> {
    device: &'a wgpu::Device,
}

impl<'a> BufferAllocator<'a> {
    /// Create a new buffer allocator with the given device.
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self { device }
    }

    /// Non-indexed mesh from a vertex slice.
    pub fn vertex_mesh<V: Pod>(&self, label: &str, vertices: &[V]) -> MeshBuffer {
        MeshBuffer {
            vertex_buffer: self.raw_buffer(
                label,
                bytemuck::cast_slice(vertices),
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: None,
            draw_count: vertices.len() as u32,
        }
    }

    /// Indexed mesh from vertex and u32 index slices.
    pub fn indexed_mesh<V: Pod>(&self, label: &str, vertices: &[V], indices: &[u32]) -> MeshBuffer {
        MeshBuffer {
            vertex_buffer: self.raw_buffer(
                &format!("{label}-vertices"),
                bytemuck::cast_slice(vertices),
                wgpu::BufferUsages::VERTEX,
            ),
            index_buffer: Some(self.raw_buffer(
                &format!("{label}-indices"),
                bytemuck::cast_slice(indices),
                wgpu::BufferUsages::INDEX,
            )),
            draw_count: indices.len() as u32,
        }
    }

    fn raw_buffer(&self, label: &str, data: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_vertex_layout() {
        let layout = GridVertex::layout();
        // position (f32×3) + normal (f32×3) + color (f32×4) = 40 bytes
        assert_eq!(layout.array_stride, 40);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 24);
    }

    #[test]
    fn test_line_vertex_layout() {
        let layout = LineVertex::layout();
        // position (f32×3) + color (f32×4) = 28 bytes
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn test_layouts_match_shader_locations() {
        for (i, attr) in GridVertex::layout().attributes.iter().enumerate() {
            assert_eq!(attr.shader_location, i as u32);
        }
        for (i, attr) in LineVertex::layout().attributes.iter().enumerate() {
            assert_eq!(attr.shader_location, i as u32);
        }
    }
}
