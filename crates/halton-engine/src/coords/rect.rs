use super::Vec2;

/// Pixel rectangle given by its top-left corner and extent.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::at(Vec2::new(x, y), Vec2::new(w, h))
    }

    pub const fn at(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn right(self) -> f32 {
        self.origin.x + self.size.x
    }

    pub fn bottom(self) -> f32 {
        self.origin.y + self.size.y
    }

    /// True when either extent is zero or negative.
    pub fn is_empty(self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0)
    }

    /// Flips negative extents so the origin is the top-left corner.
    pub fn normalized(self) -> Self {
        let (x, w) = if self.size.x < 0.0 { (self.right(), -self.size.x) } else { (self.origin.x, self.size.x) };
        let (y, h) = if self.size.y < 0.0 { (self.bottom(), -self.size.y) } else { (self.origin.y, self.size.y) };
        Rect::new(x, y, w, h)
    }

    /// Hit test including the top and left edges but not the bottom and right ones.
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        (r.origin.x..r.right()).contains(&p.x) && (r.origin.y..r.bottom()).contains(&p.y)
    }

    pub fn translated(self, by: Vec2) -> Self {
        Self::at(self.origin + by, self.size)
    }

    /// Pulls all four edges inward. Extents stop at zero.
    pub fn inset(self, by: f32) -> Self {
        Rect::new(
            self.origin.x + by,
            self.origin.y + by,
            (self.size.x - 2.0 * by).max(0.0),
            (self.size.y - 2.0 * by).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_extents_flip_around_the_origin() {
        assert_eq!(Rect::new(10.0, 10.0, -4.0, -3.0).normalized(), Rect::new(6.0, 7.0, 4.0, 3.0));
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.normalized(), r);
    }

    #[test]
    fn hit_test_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 22.0);
        assert!(r.contains(Vec2::new(10.0, 20.0)));
        assert!(r.contains(Vec2::new(109.9, 41.9)));
        assert!(!r.contains(Vec2::new(110.0, 30.0)));
        assert!(!r.contains(Vec2::new(50.0, 42.0)));
        assert!(!r.contains(Vec2::new(9.0, 30.0)));
    }

    #[test]
    fn flipped_rects_still_hit() {
        assert!(Rect::new(10.0, 10.0, -10.0, -10.0).contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn translate_and_inset() {
        let r = Rect::new(0.0, 0.0, 20.0, 10.0).translated(Vec2::new(5.0, 5.0));
        assert_eq!((r.right(), r.bottom()), (25.0, 15.0));
        assert_eq!(r.inset(2.0), Rect::new(7.0, 7.0, 16.0, 6.0));
        assert!(r.inset(6.0).is_empty());
        assert!(!r.is_empty());
    }
}
