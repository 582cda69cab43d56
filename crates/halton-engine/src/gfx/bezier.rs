//! Bicubic Bézier patches and CPU tessellation.
//!
//! The bound hull variant picks a [`Partition`] that turns the requested
//! tessellation factor into a segment count; the domain variant evaluates the
//! patch on the resulting grid.

use std::f32::consts::PI;

use glam::Vec3;

use super::vertex::SceneVertex;

pub const MAX_TESS_FACTOR: u32 = 64;

/// Tessellation partition rules.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Partition {
    /// Round up to the next integer, 1..=64.
    Integer,
    /// Round up to the next even integer, 2..=64.
    FractionalEven,
    /// Round up to the next odd integer, 1..=63.
    FractionalOdd,
}

impl Partition {
    /// Segments per patch edge for `factor`.
    pub fn segments(self, factor: f32) -> u32 {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
        let n = factor.ceil() as u32;
        match self {
            Partition::Integer => n.clamp(1, MAX_TESS_FACTOR),
            Partition::FractionalEven => (n + n % 2).clamp(2, MAX_TESS_FACTOR),
            Partition::FractionalOdd => {
                let odd = if n % 2 == 0 { n + 1 } else { n };
                odd.clamp(1, MAX_TESS_FACTOR - 1)
            }
        }
    }
}

/// Sixteen control points, row-major in `v` then `u`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BezierPatch(pub [Vec3; 16]);

impl BezierPatch {
    #[inline]
    fn point(&self, row: usize, col: usize) -> Vec3 {
        self.0[row * 4 + col]
    }

    /// Surface position at `(u, v)` in `[0, 1]²`.
    pub fn position(&self, u: f32, v: f32) -> Vec3 {
        let bu = bernstein(u);
        let bv = bernstein(v);
        let mut p = Vec3::ZERO;
        for (row, wv) in bv.iter().enumerate() {
            for (col, wu) in bu.iter().enumerate() {
                p += self.point(row, col) * (wu * wv);
            }
        }
        p
    }

    /// Position and unit normal at `(u, v)`.
    pub fn evaluate(&self, u: f32, v: f32) -> (Vec3, Vec3) {
        let (bu, du) = (bernstein(u), bernstein_derivative(u));
        let (bv, dv) = (bernstein(v), bernstein_derivative(v));

        let mut p = Vec3::ZERO;
        let mut tangent_u = Vec3::ZERO;
        let mut tangent_v = Vec3::ZERO;
        for row in 0..4 {
            for col in 0..4 {
                let cp = self.point(row, col);
                p += cp * (bu[col] * bv[row]);
                tangent_u += cp * (du[col] * bv[row]);
                tangent_v += cp * (bu[col] * dv[row]);
            }
        }

        let normal = tangent_u.cross(tangent_v).normalize_or_zero();
        (p, normal)
    }
}

fn bernstein(t: f32) -> [f32; 4] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * t * s * s, 3.0 * t * t * s, t * t * t]
}

fn bernstein_derivative(t: f32) -> [f32; 4] {
    let s = 1.0 - t;
    [-3.0 * s * s, 3.0 * s * s - 6.0 * t * s, 6.0 * t * s - 3.0 * t * t, 3.0 * t * t]
}

/// Grid of `(segments + 1)²` vertices per patch plus a triangle list.
pub fn tessellate(patches: &[BezierPatch], segments: u32) -> (Vec<SceneVertex>, Vec<u32>) {
    let n = segments.max(1);
    let row = n + 1;
    let mut vertices = Vec::with_capacity(patches.len() * (row * row) as usize);
    let mut indices = Vec::with_capacity(patches.len() * (n * n * 6) as usize);

    for patch in patches {
        let base = vertices.len() as u32;

        for j in 0..=n {
            let v = j as f32 / n as f32;
            for i in 0..=n {
                let u = i as f32 / n as f32;
                let (p, normal) = patch.evaluate(u, v);
                vertices.push(SceneVertex {
                    position: p.to_array(),
                    normal: normal.to_array(),
                    uv: [u, v],
                });
            }
        }

        for j in 0..n {
            for i in 0..n {
                let a = base + j * row + i;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                indices.extend_from_slice(&[a, b, c, b, d, c]);
            }
        }
    }

    (vertices, indices)
}

// ── Möbius strip ─────────────────────────────────────────────────────────

const MOBIUS_PATCHES: usize = 4;

fn mobius_point(s: f32, w: f32) -> Vec3 {
    let half = s * 0.5;
    let r = 1.0 + 0.5 * w * half.cos();
    Vec3::new(r * s.cos(), r * s.sin(), 0.5 * w * half.sin())
}

/// Control points of the cubic through four samples at t = 0, 1/3, 2/3, 1.
fn interpolate_cubic(q: [Vec3; 4]) -> [Vec3; 4] {
    [
        q[0],
        (-5.0 * q[0] + 18.0 * q[1] - 9.0 * q[2] + 2.0 * q[3]) / 6.0,
        (2.0 * q[0] - 9.0 * q[1] + 18.0 * q[2] - 5.0 * q[3]) / 6.0,
        q[3],
    ]
}

/// Four bicubic patches (64 control points) interpolating a Möbius strip.
///
/// Adjacent patches share their boundary samples, so the strip is closed
/// with the half twist meeting at `s = 2π`.
pub fn mobius_strip() -> Vec<BezierPatch> {
    let span = 2.0 * PI / MOBIUS_PATCHES as f32;

    (0..MOBIUS_PATCHES)
        .map(|k| {
            let s0 = k as f32 * span;

            let mut samples = [[Vec3::ZERO; 4]; 4];
            for (row, line) in samples.iter_mut().enumerate() {
                let w = -1.0 + 2.0 * row as f32 / 3.0;
                for (col, p) in line.iter_mut().enumerate() {
                    *p = mobius_point(s0 + span * col as f32 / 3.0, w);
                }
            }

            // Fit along u, then along v.
            let mut rows = [[Vec3::ZERO; 4]; 4];
            for (dst, src) in rows.iter_mut().zip(samples.iter()) {
                *dst = interpolate_cubic(*src);
            }

            let mut points = [Vec3::ZERO; 16];
            for col in 0..4 {
                let fitted = interpolate_cubic([rows[0][col], rows[1][col], rows[2][col], rows[3][col]]);
                for row in 0..4 {
                    points[row * 4 + col] = fitted[row];
                }
            }

            BezierPatch(points)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    // ── partition ────────────────────────────────────────────────────────

    #[test]
    fn integer_partition_rounds_up() {
        assert_eq!(Partition::Integer.segments(3.2), 4);
        assert_eq!(Partition::Integer.segments(4.0), 4);
        assert_eq!(Partition::Integer.segments(0.0), 1);
        assert_eq!(Partition::Integer.segments(500.0), 64);
    }

    #[test]
    fn fractional_even_partition_is_even() {
        assert_eq!(Partition::FractionalEven.segments(3.2), 4);
        assert_eq!(Partition::FractionalEven.segments(4.5), 6);
        assert_eq!(Partition::FractionalEven.segments(0.5), 2);
        assert_eq!(Partition::FractionalEven.segments(70.0), 64);
    }

    #[test]
    fn fractional_odd_partition_is_odd() {
        assert_eq!(Partition::FractionalOdd.segments(3.2), 5);
        assert_eq!(Partition::FractionalOdd.segments(5.0), 5);
        assert_eq!(Partition::FractionalOdd.segments(0.0), 1);
        assert_eq!(Partition::FractionalOdd.segments(64.0), 63);
    }

    #[test]
    fn non_finite_factor_is_one_segment() {
        assert_eq!(Partition::Integer.segments(f32::NAN), 1);
    }

    // ── evaluation ───────────────────────────────────────────────────────

    #[test]
    fn bernstein_weights_sum_to_one() {
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            let sum: f32 = bernstein(t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn flat_patch_has_vertical_normal() {
        let mut points = [Vec3::ZERO; 16];
        for row in 0..4 {
            for col in 0..4 {
                points[row * 4 + col] = Vec3::new(col as f32, row as f32, 0.0);
            }
        }
        let (p, n) = BezierPatch(points).evaluate(0.5, 0.5);
        assert!(approx(p, Vec3::new(1.5, 1.5, 0.0)));
        assert!(approx(n, Vec3::Z));
    }

    #[test]
    fn tessellation_counts() {
        let patches = mobius_strip();
        let (vertices, indices) = tessellate(&patches, 4);
        assert_eq!(vertices.len(), 4 * 25);
        assert_eq!(indices.len(), 4 * 4 * 4 * 6);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    // ── Möbius strip ─────────────────────────────────────────────────────

    #[test]
    fn strip_has_sixty_four_control_points() {
        let patches = mobius_strip();
        assert_eq!(patches.len(), 4);
        assert_eq!(patches.iter().map(|p| p.0.len()).sum::<usize>(), 64);
    }

    #[test]
    fn patches_interpolate_the_surface_samples() {
        let patches = mobius_strip();
        let span = 2.0 * PI / 4.0;
        for (k, patch) in patches.iter().enumerate() {
            for (u, v) in [(0.0, 0.0), (1.0 / 3.0, 2.0 / 3.0), (1.0, 1.0)] {
                let expected = mobius_point(k as f32 * span + span * u, -1.0 + 2.0 * v);
                assert!(approx(patch.position(u, v), expected));
            }
        }
    }

    #[test]
    fn neighbouring_patches_share_edges() {
        let patches = mobius_strip();
        for k in 0..3 {
            for v in [0.0, 0.5, 1.0] {
                assert!(approx(patches[k].position(1.0, v), patches[k + 1].position(0.0, v)));
            }
        }
    }
}
