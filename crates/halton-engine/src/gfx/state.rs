//! Fixed-function state tables selected by small enum IDs.

/// Rasterizer states. Culling is disabled in both.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RasterState {
    #[default]
    Solid,
    Wireframe,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum SamplerState {
    /// Nearest filtering, clamp to an opaque white border.
    Point,
    /// Trilinear filtering, wrap addressing.
    #[default]
    Linear,
}

impl SamplerState {
    pub const ALL: [SamplerState; 2] = [SamplerState::Point, SamplerState::Linear];
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum DepthState {
    /// Depth test `Less` with writes: the device default.
    #[default]
    Unused,
    /// No test, no writes.
    Disable,
}

/// Primitive state for a raster state and topology.
///
/// Wireframe needs `POLYGON_MODE_LINE`; without it the pipeline falls back to
/// solid fill.
pub fn primitive_state(
    raster: RasterState,
    topology: wgpu::PrimitiveTopology,
    line_mode_supported: bool,
) -> wgpu::PrimitiveState {
    let polygon_mode = match raster {
        RasterState::Wireframe if line_mode_supported => wgpu::PolygonMode::Line,
        RasterState::Wireframe => {
            log::warn!("wireframe requested but POLYGON_MODE_LINE is unavailable; using solid fill");
            wgpu::PolygonMode::Fill
        }
        RasterState::Solid => wgpu::PolygonMode::Fill,
    };

    wgpu::PrimitiveState {
        topology,
        cull_mode: None,
        polygon_mode,
        ..Default::default()
    }
}

pub fn depth_stencil_state(state: DepthState, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
    let (depth_write_enabled, depth_compare) = match state {
        DepthState::Unused => (true, wgpu::CompareFunction::Less),
        DepthState::Disable => (false, wgpu::CompareFunction::Always),
    };

    wgpu::DepthStencilState {
        format,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Immutable sampler objects, one per [`SamplerState`].
pub struct SamplerTable {
    point: wgpu::Sampler,
    linear: wgpu::Sampler,
}

impl SamplerTable {
    pub fn new(device: &wgpu::Device) -> Self {
        let border = device
            .features()
            .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER);
        let (point_address, border_color) = if border {
            (wgpu::AddressMode::ClampToBorder, Some(wgpu::SamplerBorderColor::OpaqueWhite))
        } else {
            log::debug!("clamp-to-border unsupported; point sampler clamps to edge");
            (wgpu::AddressMode::ClampToEdge, None)
        };

        let point = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("halton point sampler"),
            address_mode_u: point_address,
            address_mode_v: point_address,
            address_mode_w: point_address,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            border_color,
            ..Default::default()
        });

        let linear = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("halton linear sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self { point, linear }
    }

    pub fn get(&self, state: SamplerState) -> &wgpu::Sampler {
        match state {
            SamplerState::Point => &self.point,
            SamplerState::Linear => &self.linear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_and_wireframe_never_cull() {
        for raster in [RasterState::Solid, RasterState::Wireframe] {
            let p = primitive_state(raster, wgpu::PrimitiveTopology::TriangleList, true);
            assert_eq!(p.cull_mode, None);
        }
    }

    #[test]
    fn wireframe_uses_line_mode_when_available() {
        let p = primitive_state(RasterState::Wireframe, wgpu::PrimitiveTopology::TriangleList, true);
        assert_eq!(p.polygon_mode, wgpu::PolygonMode::Line);
    }

    #[test]
    fn wireframe_falls_back_to_fill() {
        let p = primitive_state(RasterState::Wireframe, wgpu::PrimitiveTopology::TriangleList, false);
        assert_eq!(p.polygon_mode, wgpu::PolygonMode::Fill);
    }

    #[test]
    fn disable_turns_off_test_and_write() {
        let d = depth_stencil_state(DepthState::Disable, wgpu::TextureFormat::Depth24PlusStencil8);
        assert!(!d.depth_write_enabled);
        assert_eq!(d.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn default_depth_state_tests_less_and_writes() {
        let d = depth_stencil_state(DepthState::default(), wgpu::TextureFormat::Depth24PlusStencil8);
        assert!(d.depth_write_enabled);
        assert_eq!(d.depth_compare, wgpu::CompareFunction::Less);
    }
}
