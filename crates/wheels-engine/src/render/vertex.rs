use bytemuck::{Pod, Zeroable};

/// Vertex emitted by the batcher and consumed by renderers.
///
/// Layout (32 bytes):
///
///  offset  0  position [f32; 2]   loc 0  logical px, top-left origin
///  offset  8  uv       [f32; 2]   loc 1
///  offset 16  color    [f32; 4]   loc 2  linear premultiplied
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    #[inline]
    pub const fn new(position: [f32; 2], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, uv, color }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
