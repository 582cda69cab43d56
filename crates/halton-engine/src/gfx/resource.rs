//! Owned GPU textures and their views.
//!
//! Every wrapper here releases its native objects on drop, so swapping a
//! stored value (resize) or setting it to `None` (swapchain loss) is the
//! whole release path.

use super::error::GfxError;

/// Floating-point color format for offscreen targets.
///
/// Filterable on every adapter without optional features.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Depth/stencil format for depth targets and the back-buffer depth.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Render target categories.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TargetKind {
    /// Depth/stencil surface; persists across swapchain resizes.
    Depth,
    /// Offscreen HDR color surface; recreated at the back-buffer size.
    HdrColor,
}

impl TargetKind {
    pub const fn format(self) -> wgpu::TextureFormat {
        match self {
            TargetKind::Depth => DEPTH_FORMAT,
            TargetKind::HdrColor => HDR_FORMAT,
        }
    }

    #[inline]
    pub const fn is_color(self) -> bool {
        matches!(self, TargetKind::HdrColor)
    }
}

/// A render target's texture plus the views its kind needs.
#[derive(Debug)]
pub struct GpuTarget {
    kind: TargetKind,
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    /// Render-target view (color) or depth-stencil view (depth).
    attachment_view: wgpu::TextureView,
    /// Shader-bindable view; depth aspect only for depth targets.
    sample_view: wgpu::TextureView,
}

impl GpuTarget {
    pub fn new(
        device: &wgpu::Device,
        kind: TargetKind,
        width: u32,
        height: u32,
    ) -> Result<Self, GfxError> {
        validate_extent(device, width, height)?;

        let label = match kind {
            TargetKind::Depth => "halton depth target",
            TargetKind::HdrColor => "halton hdr target",
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: kind.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let attachment_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sample_view = match kind {
            TargetKind::Depth => texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("halton depth sample view"),
                aspect: wgpu::TextureAspect::DepthOnly,
                ..Default::default()
            }),
            TargetKind::HdrColor => texture.create_view(&wgpu::TextureViewDescriptor::default()),
        };

        log::debug!("created {kind:?} target {width}x{height}");

        Ok(Self {
            kind,
            width,
            height,
            texture,
            attachment_view,
            sample_view,
        })
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    pub fn attachment_view(&self) -> &wgpu::TextureView {
        &self.attachment_view
    }

    pub fn sample_view(&self) -> &wgpu::TextureView {
        &self.sample_view
    }
}

fn validate_extent(device: &wgpu::Device, width: u32, height: u32) -> Result<(), GfxError> {
    let max = device.limits().max_texture_dimension_2d;
    if width == 0 || height == 0 || width > max || height > max {
        return Err(GfxError::ResourceCreation(format!(
            "texture extent {width}x{height} outside 1..={max}"
        )));
    }
    Ok(())
}

/// 1×1 opaque black texture bound into texture slots that have nothing bound.
#[derive(Debug)]
pub struct FallbackTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl FallbackTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("halton fallback texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[0, 0, 0, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_color_targets_follow_the_swapchain() {
        assert!(TargetKind::HdrColor.is_color());
        assert!(!TargetKind::Depth.is_color());
    }

    #[test]
    fn kinds_map_to_fixed_formats() {
        assert_eq!(TargetKind::HdrColor.format(), wgpu::TextureFormat::Rgba16Float);
        assert_eq!(TargetKind::Depth.format(), wgpu::TextureFormat::Depth24PlusStencil8);
        assert!(DEPTH_FORMAT.has_depth_aspect());
    }
}
