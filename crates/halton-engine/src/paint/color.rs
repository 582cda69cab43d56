/// Linear premultiplied RGBA color.
///
/// Invariant: `rgb` components are already multiplied by `a`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn transparent() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 }
    }

    /// Creates a premultiplied color from premultiplied components.
    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    /// Creates a premultiplied color from a packed straight-alpha `0xAARRGGBB` value.
    #[inline]
    pub fn from_argb(argb: u32) -> Self {
        let [r, g, b, a] = unpack_argb(argb);
        Self::from_straight(r, g, b, a)
    }
}

/// Splits `0xAARRGGBB` into straight `[r, g, b, a]`, each byte divided by 255.
#[inline]
pub fn unpack_argb(argb: u32) -> [f32; 4] {
    let byte = |shift: u32| ((argb >> shift) & 0xff) as f32 / 255.0;
    [byte(16), byte(8), byte(0), byte(24)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_argb_orders_channels() {
        assert_eq!(unpack_argb(0xff00_8000), [0.0, 128.0 / 255.0, 0.0, 1.0]);
        assert_eq!(unpack_argb(0x0010_1010)[3], 0.0);
    }

    #[test]
    fn from_argb_premultiplies() {
        let c = Color::from_argb(0x80ff_ffff);
        let a = 128.0 / 255.0;
        assert_eq!(c, Color::from_premul(a, a, a, a));
    }

    #[test]
    fn straight_components_are_clamped() {
        let c = Color::from_straight(2.0, 0.5, -1.0, 0.5);
        assert_eq!(c, Color::from_premul(0.5, 0.25, 0.0, 0.5));
    }
}
