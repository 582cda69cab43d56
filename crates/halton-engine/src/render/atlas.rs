//! Glyph atlas: an R8 coverage texture filled on demand.

use std::collections::HashMap;

use fontdue::layout::GlyphRasterConfig;

pub(crate) const ATLAS_SIZE: u32 = 512;
const PADDING: u32 = 1;
/// Opaque block at the atlas origin; fills sample its centre.
const WHITE_BLOCK: u32 = 4;

/// Texture-space rectangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct UvRect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

/// Row-by-row rectangle packer.
#[derive(Debug, Clone)]
pub(crate) struct ShelfPacker {
    size: u32,
    x: u32,
    y: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub fn new(size: u32) -> Self {
        Self { size, x: PADDING, y: PADDING, row_height: 0 }
    }

    /// Top-left corner for a `w`×`h` block, or `None` when the atlas is full.
    pub fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w + 2 * PADDING > self.size {
            return None;
        }
        if self.x + w + PADDING > self.size {
            self.y += self.row_height + PADDING;
            self.x = PADDING;
            self.row_height = 0;
        }
        if self.y + h + PADDING > self.size {
            return None;
        }
        let at = (self.x, self.y);
        self.x += w + PADDING;
        self.row_height = self.row_height.max(h);
        Some(at)
    }
}

pub(crate) struct GlyphAtlas {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    packer: ShelfPacker,
    glyphs: HashMap<GlyphRasterConfig, UvRect>,
    white: UvRect,
    full: bool,
}

impl GlyphAtlas {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("halton glyph atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut atlas = Self {
            texture,
            view,
            packer: ShelfPacker::new(ATLAS_SIZE),
            glyphs: HashMap::new(),
            white: UvRect { min: [0.0; 2], max: [0.0; 2] },
            full: false,
        };

        let block = [0xffu8; (WHITE_BLOCK * WHITE_BLOCK) as usize];
        if let Some(uv) = atlas.upload(queue, &block, WHITE_BLOCK, WHITE_BLOCK) {
            let centre = [(uv.min[0] + uv.max[0]) * 0.5, (uv.min[1] + uv.max[1]) * 0.5];
            atlas.white = UvRect { min: centre, max: centre };
        }
        atlas
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Texture coordinates that sample full coverage.
    pub fn white(&self) -> UvRect {
        self.white
    }

    /// Cached location of `key`, rasterizing it on first use.
    pub fn glyph(
        &mut self,
        queue: &wgpu::Queue,
        font: &fontdue::Font,
        key: GlyphRasterConfig,
    ) -> Option<UvRect> {
        if let Some(uv) = self.glyphs.get(&key) {
            return Some(*uv);
        }
        let (metrics, bitmap) = font.rasterize_config(key);
        if metrics.width == 0 || metrics.height == 0 {
            return None;
        }
        let uv = self.upload(queue, &bitmap, metrics.width as u32, metrics.height as u32)?;
        self.glyphs.insert(key, uv);
        Some(uv)
    }

    fn upload(&mut self, queue: &wgpu::Queue, pixels: &[u8], w: u32, h: u32) -> Option<UvRect> {
        if self.full {
            return None;
        }
        let Some((x, y)) = self.packer.place(w, h) else {
            log::warn!("glyph atlas full ({ATLAS_SIZE}x{ATLAS_SIZE}); further glyphs dropped");
            self.full = true;
            return None;
        };

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        let s = ATLAS_SIZE as f32;
        Some(UvRect {
            min: [x as f32 / s, y as f32 / s],
            max: [(x + w) as f32 / s, (y + h) as f32 / s],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_pack_left_to_right_with_padding() {
        let mut p = ShelfPacker::new(64);
        assert_eq!(p.place(10, 8), Some((1, 1)));
        assert_eq!(p.place(10, 12), Some((12, 1)));
    }

    #[test]
    fn overflow_starts_a_new_row_below_the_tallest() {
        let mut p = ShelfPacker::new(32);
        p.place(20, 5);
        p.place(5, 9);
        assert_eq!(p.place(10, 4), Some((1, 11)));
    }

    #[test]
    fn full_atlas_rejects() {
        let mut p = ShelfPacker::new(16);
        assert!(p.place(14, 14).is_some());
        assert_eq!(p.place(14, 14), None);
        assert_eq!(ShelfPacker::new(16).place(15, 1), None);
    }
}
