//! Scanline triangle fill
//!
//! Triangles arrive in top/bottom/middle order: P0 has the smallest y, P1 the
//! largest and P2 sits in between. The fill walks the upper sub-triangle
//! (P0.y ..= P2.y) bounded by the long edge P0->P1 and the short edge P0->P2,
//! then the lower sub-triangle (P2.y + 1 ..= P1.y) with the short edge
//! replaced by P2->P1. The split row belongs to the upper half only, so no row
//! is painted twice.

use super::math::{Vec2, Vec3};
use super::shader::PixelShader;

/// Reorder three vertices into top/bottom/middle order with three
/// compare-and-swap steps. UVs travel with their vertex.
///
/// Afterwards `pos[0].y <= pos[2].y <= pos[1].y`.
pub fn sort_top_bottom_middle(pos: &mut [Vec3; 3], uvs: &mut [Vec2; 3]) {
    compare_swap(pos, uvs, 0, 1);
    compare_swap(pos, uvs, 0, 2);
    compare_swap(pos, uvs, 2, 1);
}

/// Swap vertices `a` and `b` if `b` is above `a`
fn compare_swap(pos: &mut [Vec3; 3], uvs: &mut [Vec2; 3], a: usize, b: usize) {
    if pos[b].y < pos[a].y {
        pos.swap(a, b);
        uvs.swap(a, b);
    }
}

/// A snapped screen-space vertex with its texture coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenVertex {
    pub x: i32,
    pub y: i32,
    pub u: f32,
    pub v: f32,
}

impl ScreenVertex {
    /// Snap to the integer grid (floor, PS1-style jitter)
    pub fn snap(pos: Vec3, uv: Vec2) -> Self {
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            u: uv.x,
            v: uv.y,
        }
    }
}

/// Triangle ready for scanline fill (top, bottom, middle)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    pub top: ScreenVertex,
    pub bottom: ScreenVertex,
    pub middle: ScreenVertex,
}

impl ScreenTriangle {
    /// Build from vertices already in top/bottom/middle order
    pub fn from_sorted(pos: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        Self {
            top: ScreenVertex::snap(pos[0], uvs[0]),
            bottom: ScreenVertex::snap(pos[1], uvs[1]),
            middle: ScreenVertex::snap(pos[2], uvs[2]),
        }
    }
}

/// An edge position at some scanline. `x` drives interpolation, while
/// `x_floor` and `x_ceil` round the exact rational crossing.
#[derive(Debug, Clone, Copy)]
struct EdgePoint {
    x: f32,
    x_floor: i64,
    x_ceil: i64,
    u: f32,
    v: f32,
}

impl EdgePoint {
    fn at_vertex(v: ScreenVertex) -> Self {
        Self {
            x: v.x as f32,
            x_floor: v.x as i64,
            x_ceil: v.x as i64,
            u: v.u,
            v: v.v,
        }
    }
}

/// One triangle edge between snapped vertices, walked one scanline at a time
#[derive(Debug, Clone, Copy)]
struct Edge {
    start_y: i32,
    start: ScreenVertex,
    dx: i64,
    dy: i64,
    dudy: f32,
    dvdy: f32,
}

impl Edge {
    fn new(from: ScreenVertex, to: ScreenVertex) -> Self {
        let dy = to.y as i64 - from.y as i64;

        // Zero height: no increments, the edge holds the far endpoint
        if dy == 0 {
            return Self {
                start_y: to.y,
                start: to,
                dx: 0,
                dy: 1,
                dudy: 0.0,
                dvdy: 0.0,
            };
        }

        Self {
            start_y: from.y,
            start: from,
            dx: to.x as i64 - from.x as i64,
            dy,
            dudy: (to.u - from.u) / dy as f32,
            dvdy: (to.v - from.v) / dy as f32,
        }
    }

    /// True if this edge runs left of `other` below their shared start
    fn leans_left_of(&self, other: &Edge) -> bool {
        // dx_a / dy_a < dx_b / dy_b with both dy positive
        (self.dx as i128) * (other.dy as i128) < (other.dx as i128) * (self.dy as i128)
    }

    /// Position after stepping from the edge start down to row `y`
    fn at(&self, y: i32) -> EdgePoint {
        let steps = y as i64 - self.start_y as i64;
        // Rows stay within the edge, so the quotient is bounded by dx
        let num = self.dx as i128 * steps as i128;
        let dy = self.dy as i128;
        let x0 = self.start.x as i64;
        let fsteps = steps as f32;
        EdgePoint {
            x: self.start.x as f32 + num as f32 / self.dy as f32,
            x_floor: x0 + num.div_euclid(dy) as i64,
            x_ceil: x0 - (-num).div_euclid(dy) as i64,
            u: self.start.u + self.dudy * fsteps,
            v: self.start.v + self.dvdy * fsteps,
        }
    }
}

/// Fill a triangle into a `width` x `height` surface.
///
/// Expects top/bottom/middle order. Rows and columns outside the surface are
/// skipped; visible pixels get the same interpolated values as without clipping.
pub fn fill_triangle<S: PixelShader + ?Sized>(
    tri: &ScreenTriangle,
    width: usize,
    height: usize,
    shader: &mut S,
) {
    let (p0, p1, p2) = (tri.top, tri.bottom, tri.middle);
    if !(p0.y <= p2.y && p2.y <= p1.y) {
        // Only reachable with non-finite input coordinates
        return;
    }

    let max_x = i32::try_from(width).unwrap_or(i32::MAX) - 1;
    let max_y = i32::try_from(height).unwrap_or(i32::MAX) - 1;

    if p0.y == p1.y {
        fill_flat_row(tri, max_x, max_y, shader);
        return;
    }

    let long = Edge::new(p0, p1);
    let upper = Edge::new(p0, p2);

    // Decided once: the long edge keeps its side for the whole triangle
    let long_is_left = if p2.y > p0.y {
        long.leans_left_of(&upper)
    } else {
        // Flat top: the upper half is the single row P0..P2
        p0.x < p2.x
    };

    // Upper half
    for y in p0.y.max(0)..=p2.y.min(max_y) {
        let (a, b) = (long.at(y), upper.at(y));
        if long_is_left {
            fill_span(y, a, b, max_x, shader);
        } else {
            fill_span(y, b, a, max_x, shader);
        }
    }

    // Lower half
    let lower = Edge::new(p2, p1);
    for y in p2.y.saturating_add(1).max(0)..=p1.y.min(max_y) {
        let (a, b) = (long.at(y), lower.at(y));
        if long_is_left {
            fill_span(y, a, b, max_x, shader);
        } else {
            fill_span(y, b, a, max_x, shader);
        }
    }
}

/// All three vertices on one row: fill between the extreme x values
fn fill_flat_row<S: PixelShader + ?Sized>(tri: &ScreenTriangle, max_x: i32, max_y: i32, shader: &mut S) {
    let y = tri.top.y;
    if y < 0 || y > max_y {
        return;
    }

    let verts = [tri.top, tri.middle, tri.bottom];
    let mut left = verts[0];
    let mut right = verts[0];
    for v in &verts[1..] {
        if v.x < left.x {
            left = *v;
        }
        if v.x > right.x {
            right = *v;
        }
    }

    fill_span(y, EdgePoint::at_vertex(left), EdgePoint::at_vertex(right), max_x, shader);
}

/// Shade every pixel center in `left.x ..= right.x` on row `y`,
/// interpolating u,v linearly across the span
fn fill_span<S: PixelShader + ?Sized>(y: i32, left: EdgePoint, right: EdgePoint, max_x: i32, shader: &mut S) {
    let start = left.x_ceil.max(0);
    let end = right.x_floor.min(max_x as i64);
    if start > end {
        return;
    }
    let (start, end) = (start as i32, end as i32);

    let span = right.x - left.x;
    let (dudx, dvdx) = if span > 0.0 {
        ((right.u - left.u) / span, (right.v - left.v) / span)
    } else {
        (0.0, 0.0)
    };

    for x in start..=end {
        let t = x as f32 - left.x;
        shader.plot(x, y, left.u + dudx * t, left.v + dvdx * t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{FlatShader, Framebuffer, IndexedTarget, Texture, TexturedShader};
    use std::collections::HashSet;

    /// Records every plot call
    #[derive(Default)]
    struct Recorder {
        plots: Vec<(i32, i32, f32, f32)>,
    }

    impl PixelShader for Recorder {
        fn plot(&mut self, x: i32, y: i32, u: f32, v: f32) {
            self.plots.push((x, y, u, v));
        }
    }

    fn sorted(points: [(f32, f32); 3]) -> ScreenTriangle {
        sorted_uv(points, [(0.0, 0.0); 3])
    }

    fn sorted_uv(points: [(f32, f32); 3], uvs: [(f32, f32); 3]) -> ScreenTriangle {
        let mut pos = points.map(|(x, y)| Vec3::new(x, y, 0.0));
        let mut uv = uvs.map(|(u, v)| Vec2::new(u, v));
        sort_top_bottom_middle(&mut pos, &mut uv);
        ScreenTriangle::from_sorted(pos, uv)
    }

    fn orient(a: (i64, i64), b: (i64, i64), p: (i64, i64)) -> i64 {
        (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
    }

    /// Closed point-in-triangle test on integer pixel centers
    fn reference_pixels(points: [(i64, i64); 3], width: i64, height: i64) -> HashSet<(i32, i32)> {
        let [a, b, c] = points;
        let mut set = HashSet::new();
        for y in 0..height {
            for x in 0..width {
                let p = (x, y);
                let (e0, e1, e2) = (orient(a, b, p), orient(b, c, p), orient(c, a, p));
                let inside = (e0 >= 0 && e1 >= 0 && e2 >= 0) || (e0 <= 0 && e1 <= 0 && e2 <= 0);
                if inside {
                    set.insert((x as i32, y as i32));
                }
            }
        }
        set
    }

    fn filled_pixels(tri: &ScreenTriangle, width: usize, height: usize) -> (HashSet<(i32, i32)>, usize) {
        let mut rec = Recorder::default();
        fill_triangle(tri, width, height, &mut rec);
        let count = rec.plots.len();
        (rec.plots.into_iter().map(|(x, y, _, _)| (x, y)).collect(), count)
    }

    #[test]
    fn test_sort_order_all_permutations() {
        let ys = [[0.0, 5.0, 9.0], [3.0, 3.0, 1.0], [2.0, 2.0, 2.0], [7.0, 1.0, 7.0], [4.0, 8.0, 8.0]];
        let perms = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for y in ys {
            for p in perms {
                let mut pos = p.map(|i| Vec3::new(i as f32, y[i], 0.0));
                let mut uvs = p.map(|i| Vec2::new(i as f32, 0.0));
                sort_top_bottom_middle(&mut pos, &mut uvs);
                assert!(pos[0].y <= pos[2].y && pos[2].y <= pos[1].y, "{:?} {:?}", y, p);
                for k in 0..3 {
                    // UV still belongs to the same vertex
                    assert_eq!(pos[k].x, uvs[k].x);
                }
            }
        }
    }

    #[test]
    fn test_fill_matches_reference() {
        let (pixels, count) = filled_pixels(&sorted([(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]), 32, 32);
        let expected = reference_pixels([(0, 0), (10, 0), (5, 10)], 32, 32);
        assert_eq!(pixels, expected);
        assert_eq!(count, expected.len(), "pixel painted twice");
    }

    #[test]
    fn test_fill_matches_reference_many() {
        // Small LCG so the triangle set is fixed
        let mut seed: u32 = 12345;
        let mut next = || {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            ((seed >> 16) % 40) as i64 - 4
        };

        for _ in 0..300 {
            let pts = [(next(), next()), (next(), next()), (next(), next())];
            let area = orient(pts[0], pts[1], pts[2]);
            if area == 0 {
                continue;
            }
            let tri = sorted(pts.map(|(x, y)| (x as f32, y as f32)));
            let (pixels, count) = filled_pixels(&tri, 32, 32);
            let expected = reference_pixels(pts, 32, 32);
            assert_eq!(pixels, expected, "triangle {:?}", pts);
            assert_eq!(count, expected.len(), "double paint in {:?}", pts);
        }
    }

    #[test]
    fn test_fill_matches_reference_tall_edge() {
        // Edge crossings land 1/2000 past a pixel center
        let pts = [(0, 0), (1, 2000), (0, 2000)];
        let (pixels, count) = filled_pixels(&sorted(pts.map(|(x, y)| (x as f32, y as f32))), 8, 3001);
        let expected = reference_pixels(pts, 8, 3001);
        assert!(!pixels.contains(&(1, 1999)));
        assert_eq!(pixels, expected);
        assert_eq!(count, expected.len());

        let wide = [(0, 0), (4001, 3000), (1, 3000)];
        let (pixels, _) = filled_pixels(&sorted(wide.map(|(x, y)| (x as f32, y as f32))), 8, 3001);
        assert_eq!(pixels, reference_pixels(wide, 8, 3001));
    }

    #[test]
    fn test_split_row_painted_once() {
        // Middle vertex on the left, split at y = 4
        let tri = sorted([(6.0, 0.0), (0.0, 4.0), (8.0, 10.0)]);
        let mut rec = Recorder::default();
        fill_triangle(&tri, 32, 32, &mut rec);

        let split: Vec<_> = rec.plots.iter().filter(|p| p.1 == 4).map(|p| p.0).collect();
        let unique: HashSet<_> = split.iter().collect();
        assert_eq!(split.len(), unique.len());
        assert_eq!(split.first(), Some(&0));
    }

    #[test]
    fn test_flat_top_and_flat_bottom() {
        let flat_bottom = [(5, 0), (0, 10), (10, 10)];
        let (pixels, _) = filled_pixels(&sorted(flat_bottom.map(|(x, y)| (x as f32, y as f32))), 16, 16);
        assert_eq!(pixels, reference_pixels(flat_bottom, 16, 16));

        let flat_top = [(10, 0), (0, 0), (5, 10)];
        let (pixels, _) = filled_pixels(&sorted(flat_top.map(|(x, y)| (x as f32, y as f32))), 16, 16);
        assert_eq!(pixels, reference_pixels(flat_top, 16, 16));
    }

    #[test]
    fn test_degenerate_same_y() {
        let mut rec = Recorder::default();
        fill_triangle(&sorted([(2.0, 3.0), (7.0, 3.0), (4.0, 3.0)]), 16, 16, &mut rec);
        assert!(rec.plots.iter().all(|p| p.1 == 3));
        let xs: Vec<_> = rec.plots.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![2, 3, 4, 5, 6, 7]);

        let mut rec = Recorder::default();
        fill_triangle(&sorted([(4.0, 4.0), (4.0, 4.0), (4.0, 4.0)]), 16, 16, &mut rec);
        assert_eq!(rec.plots.len(), 1);
    }

    #[test]
    fn test_clipped_to_surface() {
        let tri = sorted([(-100.0, -100.0), (300.0, -100.0), (-100.0, 300.0)]);
        let mut fb = Framebuffer::new(8, 8);
        fill_triangle(&tri, fb.width(), fb.height(), &mut FlatShader::new(&mut fb, 3));
        assert!(fb.pixels.iter().all(|&p| p == 3));

        let offscreen = sorted([(50.0, 50.0), (60.0, 50.0), (55.0, 60.0)]);
        let (pixels, _) = filled_pixels(&offscreen, 8, 8);
        assert!(pixels.is_empty());
    }

    #[test]
    fn test_affine_uv_across_span() {
        // Right triangle, u follows x and v follows y
        let tri = sorted_uv(
            [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)],
            [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)],
        );
        let mut rec = Recorder::default();
        fill_triangle(&tri, 16, 16, &mut rec);
        for (x, y, u, v) in rec.plots {
            assert!((u - x as f32 / 10.0).abs() < 0.001, "u at {},{}", x, y);
            assert!((v - y as f32 / 10.0).abs() < 0.001, "v at {},{}", x, y);
        }
    }

    #[test]
    fn test_textured_quad_corners() {
        let tex = Texture::from_indices(2, 2, vec![1, 2, 3, 4], "quad").unwrap();
        let mut fb = Framebuffer::new(16, 16);
        let tris = [
            sorted_uv([(0.0, 0.0), (15.0, 0.0), (15.0, 15.0)], [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
            sorted_uv([(0.0, 0.0), (15.0, 15.0), (0.0, 15.0)], [(0.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
        ];
        for tri in &tris {
            fill_triangle(tri, 16, 16, &mut TexturedShader::new(&mut fb, &tex));
        }
        assert_eq!(fb.get_index(0, 0), 1);
        assert_eq!(fb.get_index(15, 0), 2);
        assert_eq!(fb.get_index(0, 15), 3);
        assert_eq!(fb.get_index(15, 15), 4);
        assert!(fb.pixels.iter().all(|&p| p != 0));
    }
}
