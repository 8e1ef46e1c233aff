//! Shared GPU types and helpers for the wgpu backend.

use bytemuck::{Pod, Zeroable};

use crate::coords::Viewport;

use super::ScissorRect;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState { color: component, alpha: component }
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl ViewportUniform {
    pub(super) fn new(viewport: Viewport) -> Self {
        Self {
            viewport: [viewport.width.max(1.0), viewport.height.max(1.0)],
            _pad: [0.0; 2],
        }
    }

    pub(super) fn min_binding_size() -> Option<wgpu::BufferSize> {
        wgpu::BufferSize::new(std::mem::size_of::<ViewportUniform>() as u64)
    }
}

// ── scissor rect ──────────────────────────────────────────────────────────

/// Converts a logical-pixel scissor to physical `(x, y, w, h)` for wgpu,
/// clamped to the render target.
///
/// `None` means "no scissor" and yields the full target. Returns `None` when
/// the clamped area is empty; the draw should then be skipped.
pub(super) fn logical_clip_to_scissor(
    clip: Option<ScissorRect>,
    viewport: Viewport,
    scale: f32,
) -> Option<(u32, u32, u32, u32)> {
    let phys_vw = (viewport.width * scale).max(1.0) as u32;
    let phys_vh = (viewport.height * scale).max(1.0) as u32;

    let (x, y, w, h) = match clip {
        None => (0, 0, phys_vw, phys_vh),
        Some(s) => {
            let r = s.to_rect();
            let x  = ((r.left() * scale).max(0.0) as u32).min(phys_vw);
            let y  = ((r.top() * scale).max(0.0) as u32).min(phys_vh);
            let x2 = ((r.right() * scale).max(0.0) as u32).min(phys_vw);
            let y2 = ((r.bottom() * scale).max(0.0) as u32).min(phys_vh);
            (x, y, x2.saturating_sub(x), y2.saturating_sub(y))
        }
    };

    if w == 0 || h == 0 { None } else { Some((x, y, w, h)) }
}

/// Growth policy for dynamic buffers.
#[inline]
pub(super) fn grow_capacity(required: usize, minimum: usize) -> usize {
    required.next_power_of_two().max(minimum)
}
