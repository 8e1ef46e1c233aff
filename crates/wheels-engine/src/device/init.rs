/// Graphics device options.
///
/// The renderer draws 2D geometry in submission order, so no depth buffer is
/// ever allocated.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Enables backend validation and debug labels.
    pub debug: bool,

    /// Syncs presentation to the vertical blank. When off, an immediate or
    /// mailbox mode is used if the platform offers one.
    pub vsync: bool,

    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features. Empty for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    pub fn instance_flags(&self) -> wgpu::InstanceFlags {
        if self.debug {
            wgpu::InstanceFlags::debugging()
        } else {
            wgpu::InstanceFlags::empty()
        }
    }

    /// Picks the surface format out of the supported `formats`: an sRGB one
    /// when preferred and offered, otherwise the surface's first choice.
    pub fn pick_surface_format(&self, formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
        const SRGB: [wgpu::TextureFormat; 2] =
            [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Rgba8UnormSrgb];

        let srgb = SRGB.into_iter().find(|f| formats.contains(f));
        match srgb {
            Some(f) if self.prefer_srgb => Some(f),
            _ => formats.first().copied(),
        }
    }

    /// The requested alpha mode if supported, else the surface's first one.
    pub fn pick_alpha_mode(&self, modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
        self.alpha_mode
            .filter(|m| modes.contains(m))
            .or_else(|| modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            debug: false,
            vsync: true,
            prefer_srgb: true,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
