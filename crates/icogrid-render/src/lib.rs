//! GPU rendering for the Icogrid viewer.
//!
//! Owns the wgpu device/surface plumbing, the orbit camera, the three
//! render pipelines (lit grid triangles, unlit overlay lines, translucent
//! sphere shell), and the CPU-side mesh builders that turn grid levels into
//! vertex buffers.

mod buffer;
mod camera;
mod gpu;
mod mesh;
mod pipelines;

pub use buffer::{BufferAllocator, GridVertex, LineVertex, MeshBuffer};
pub use camera::{CameraUniform, OrbitCamera};
pub use gpu::{DepthTexture, RenderContext, RenderContextError, SurfaceError,
    init_render_context_blocking};
pub use mesh::{
    axes_lines, centroid_markers, edge_lines, grid_vertices, normal_rays, sphere_shell,
};
pub use pipelines::{LightUniform, ScenePipelines};
