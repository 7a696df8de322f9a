//! The viewer's three render pipelines and their shared bind group layouts.
//!
//! - **grid**: flat-shaded triangles with directional N·L + ambient shading,
//!   no culling (the face table mixes windings and both sides are visible
//!   while a reveal is partial).
//! - **lines**: unlit line list for edges, normal rays, centroid markers,
//!   and axes.
//! - **shell**: the translucent sphere, alpha-blended with the depth buffer
//!   read-only so the grid always shows through.
//!
//! All three share one camera bind group (group 0); the shaded pipelines
//! add a directional light (group 1).

use bytemuck::{Pod, Zeroable};
use std::num::NonZeroU64;

use crate::buffer::{GridVertex, LineVertex};
use crate::gpu::DepthTexture;

/// Directional light uniform: direction toward the light, diffuse color,
/// ambient floor.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightUniform {
    pub direction: [f32; 4],
    pub color: [f32; 4],
    pub ambient: [f32; 4],
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            direction: [0.6, 0.4, 0.7, 0.0],
            color: [0.5, 0.5, 0.5, 1.0],
            ambient: [0.25, 0.25, 0.25, 1.0],
        }
    }
}

/// The pipelines plus the bind group layouts the app allocates uniforms for.
pub struct ScenePipelines {
    pub grid: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
    pub shell: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub light_bind_group_layout: wgpu::BindGroupLayout,
}

impl ScenePipelines {
    /// Build all three pipelines against the given surface format.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let camera_bind_group_layout = uniform_layout(device, "icogrid-camera-bgl", 80);
        let light_bind_group_layout = uniform_layout(device, "icogrid-light-bgl", 48);

        let shaded_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("icogrid-shaded-layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &light_bind_group_layout],
            immediate_size: 0,
        });
        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("icogrid-line-layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            immediate_size: 0,
        });

        let shaded_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("icogrid-shaded-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADED_SHADER_SOURCE.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("icogrid-line-shader"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER_SOURCE.into()),
        });

        let grid = build_pipeline(
            device,
            &PipelineSpec {
                label: "icogrid-grid-pipeline",
                layout: &shaded_layout,
                shader: &shaded_shader,
                vertex_layout: GridVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: None,
                depth_write: true,
                surface_format,
            },
        );
        let lines = build_pipeline(
            device,
            &PipelineSpec {
                label: "icogrid-line-pipeline",
                layout: &line_layout,
                shader: &line_shader,
                vertex_layout: LineVertex::layout(),
                topology: wgpu::PrimitiveTopology::LineList,
                blend: None,
                depth_write: true,
                surface_format,
            },
        );
        let shell = build_pipeline(
            device,
            &PipelineSpec {
                label: "icogrid-shell-pipeline",
                layout: &shaded_layout,
                shader: &shaded_shader,
                vertex_layout: GridVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                depth_write: false,
                surface_format,
            },
        );

        Self {
            grid,
            lines,
            shell,
            camera_bind_group_layout,
            light_bind_group_layout,
        }
    }
}

/// One uniform buffer at binding 0, visible to both stages.
fn uniform_layout(device: &wgpu::Device, label: &str, size: u64) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }],
    })
}

struct PipelineSpec<'a> {
    label: &'static str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    topology: wgpu::PrimitiveTopology,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    surface_format: wgpu::TextureFormat,
}

fn build_pipeline(device: &wgpu::Device, spec: &PipelineSpec) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(spec.layout),
        vertex: wgpu::VertexState {
            module: spec.shader,
            entry_point: Some("vs_main"),
            buffers: &[spec.vertex_layout.clone()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTexture::FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: DepthTexture::COMPARE,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: spec.surface_format,
                blend: spec.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

/// WGSL for the shaded pipelines (grid triangles and sphere shell).
pub const SHADED_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
};

struct LightUniform {
    direction: vec4<f32>,
    color: vec4<f32>,
    ambient: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

@group(1) @binding(0)
var<uniform> light: LightUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.normal = in.normal;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let l = normalize(light.direction.xyz);
    // Two-sided: faces lit from either side, since culling is off.
    let diffuse = abs(dot(n, l));
    let shade = light.ambient.rgb + light.color.rgb * diffuse;
    return vec4<f32>(in.color.rgb * shade, in.color.a);
}
"#;

/// WGSL for the unlit line pipeline.
pub const LINE_SHADER_SOURCE: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(in.position, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_uniform_layout() {
        // Three vec4s.
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
    }

    #[test]
    fn test_shaders_declare_expected_entry_points() {
        for source in [SHADED_SHADER_SOURCE, LINE_SHADER_SOURCE] {
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
        }
    }

    #[test]
    fn test_shaded_shader_binds_camera_and_light() {
        assert!(SHADED_SHADER_SOURCE.contains("@group(0) @binding(0)"));
        assert!(SHADED_SHADER_SOURCE.contains("@group(1) @binding(0)"));
        // The line shader only needs the camera.
        assert!(!LINE_SHADER_SOURCE.contains("@group(1)"));
    }

    #[test]
    fn test_default_light_direction_is_normalizable() {
        let light = LightUniform::default();
        let d = glam::Vec3::new(light.direction[0], light.direction[1], light.direction[2]);
        assert!(d.length() > 0.1);
    }
}
