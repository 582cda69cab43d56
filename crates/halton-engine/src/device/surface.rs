/// Back-buffer size and format as seen by the app's lifecycle callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BackbufferDesc {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

impl BackbufferDesc {
    /// Width over height; 1 for a zero-height buffer.
    pub fn aspect(&self) -> f32 {
        match self.height {
            0 => 1.0,
            h => self.width as f32 / h as f32,
        }
    }

    /// Minimized windows have an empty back buffer and render nothing.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// How the frame loop proceeds after `get_current_texture` failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; try again next frame.
    Reconfigured,
    SkipFrame,
    /// Out of memory. The app exits.
    Fatal,
}

/// Lost and outdated surfaces are reconfigured by the caller.
pub(super) fn error_action(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

pub(super) fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = formats.iter().copied().find(|f| {
        matches!(f, wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb)
    });
    match srgb {
        Some(f) if prefer_srgb => Some(f),
        _ => formats.first().copied(),
    }
}

pub(super) fn pick_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    match requested {
        Some(mode) if supported.contains(&mode) => mode,
        _ => supported.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
    }
}

pub(super) fn pick_present_mode(supported: &[wgpu::PresentMode], requested: wgpu::PresentMode) -> wgpu::PresentMode {
    if supported.contains(&requested) {
        return requested;
    }
    log::warn!("present mode {requested:?} is not supported here, using Fifo");
    wgpu::PresentMode::Fifo
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    fn desc(width: u32, height: u32) -> BackbufferDesc {
        BackbufferDesc { width, height, format: F::Bgra8UnormSrgb }
    }

    #[test]
    fn aspect_and_emptiness() {
        assert_eq!(desc(640, 480).aspect(), 640.0 / 480.0);
        assert_eq!(desc(640, 0).aspect(), 1.0);
        assert!(desc(640, 0).is_empty());
        assert!(!desc(1, 1).is_empty());
    }

    #[test]
    fn surface_errors_map_to_actions() {
        use wgpu::SurfaceError as E;
        assert_eq!(error_action(&E::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(error_action(&E::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(error_action(&E::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(error_action(&E::Other), SurfaceErrorAction::SkipFrame);
        assert_eq!(error_action(&E::OutOfMemory), SurfaceErrorAction::Fatal);
    }

    #[test]
    fn srgb_is_preferred_only_when_asked() {
        let formats = [F::Bgra8Unorm, F::Bgra8UnormSrgb];
        assert_eq!(pick_format(&formats, true), Some(F::Bgra8UnormSrgb));
        assert_eq!(pick_format(&formats, false), Some(F::Bgra8Unorm));
        assert_eq!(pick_format(&[F::Rgba16Float], true), Some(F::Rgba16Float));
        assert_eq!(pick_format(&[], true), None);
    }

    #[test]
    fn unsupported_present_mode_falls_back_to_fifo() {
        let supported = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(pick_present_mode(&supported, wgpu::PresentMode::Mailbox), wgpu::PresentMode::Mailbox);
        assert_eq!(pick_present_mode(&supported, wgpu::PresentMode::Immediate), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn alpha_mode_uses_first_supported_when_request_is_missing() {
        let supported = [wgpu::CompositeAlphaMode::Opaque, wgpu::CompositeAlphaMode::PreMultiplied];
        assert_eq!(pick_alpha_mode(&supported, None), wgpu::CompositeAlphaMode::Opaque);
        assert_eq!(
            pick_alpha_mode(&supported, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::PreMultiplied
        );
        assert_eq!(pick_alpha_mode(&[], Some(wgpu::CompositeAlphaMode::PostMultiplied)), wgpu::CompositeAlphaMode::Auto);
    }
}
