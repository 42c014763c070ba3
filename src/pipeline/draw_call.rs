//! Draw calls and the triangles the transform stage derives from them

use std::sync::Arc;

use crate::error::DrawCallError;
use crate::rasterizer::{sort_top_bottom_middle, Mat4, ScreenTriangle, Texture, Vec2, Vec3};

/// How the triangles of one draw call are shaded
#[derive(Debug, Clone)]
pub enum Shading {
    /// One palette index per triangle
    Flat(Vec<u8>),
    /// One UV per vertex, sampled from a shared texture
    Textured { uvs: Vec<Vec2>, texture: Arc<Texture> },
}

/// A validated batch of triangles with its transform
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub id: u64,
    pub transform: Mat4,
    pub vertices: Vec<Vec3>,
    pub shading: Shading,
}

impl DrawCall {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Transform every vertex and group the results into sorted triangles
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.vertices.chunks_exact(3).enumerate().map(move |(i, chunk)| {
            let pos = [
                self.transform.transform_point(chunk[0]),
                self.transform.transform_point(chunk[1]),
                self.transform.transform_point(chunk[2]),
            ];
            let shading = match &self.shading {
                Shading::Flat(colors) => TriangleShading::Flat(colors[i]),
                Shading::Textured { uvs, texture } => TriangleShading::Textured {
                    uvs: [uvs[i * 3], uvs[i * 3 + 1], uvs[i * 3 + 2]],
                    texture: Arc::clone(texture),
                },
            };
            let mut tri = Triangle { pos, shading };
            tri.reorder();
            tri
        })
    }
}

/// Untyped draw call request, validated by [`DrawCallDesc::validate`].
///
/// Exactly one of `colors` or `uvs` + `texture` must be set.
#[derive(Debug, Clone, Default)]
pub struct DrawCallDesc {
    pub transform: Mat4,
    pub vertices: Vec<Vec3>,
    pub colors: Option<Vec<u8>>,
    pub uvs: Option<Vec<Vec2>>,
    pub texture: Option<Arc<Texture>>,
}

impl DrawCallDesc {
    pub fn flat(transform: Mat4, vertices: Vec<Vec3>, colors: Vec<u8>) -> Self {
        Self {
            transform,
            vertices,
            colors: Some(colors),
            ..Default::default()
        }
    }

    pub fn textured(transform: Mat4, vertices: Vec<Vec3>, uvs: Vec<Vec2>, texture: Arc<Texture>) -> Self {
        Self {
            transform,
            vertices,
            uvs: Some(uvs),
            texture: Some(texture),
            ..Default::default()
        }
    }

    /// Check the shape of the request and assign `id`
    pub fn validate(self, id: u64) -> Result<DrawCall, DrawCallError> {
        let count = self.vertices.len();
        if count % 3 != 0 {
            return Err(DrawCallError::VertexCount { count });
        }

        let shading = match (self.colors, self.uvs, self.texture) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(DrawCallError::ConflictingShading);
            }
            (Some(colors), None, None) => {
                if colors.len() != count / 3 {
                    return Err(DrawCallError::ColorCount {
                        expected: count / 3,
                        actual: colors.len(),
                    });
                }
                Shading::Flat(colors)
            }
            (None, Some(_), None) => return Err(DrawCallError::MissingTexture),
            (None, None, None) => return Err(DrawCallError::MissingShading),
            (None, uvs, Some(texture)) => {
                let uvs = uvs.unwrap_or_default();
                if uvs.len() != count {
                    return Err(DrawCallError::UvCount {
                        expected: count,
                        actual: uvs.len(),
                    });
                }
                if texture.is_empty() {
                    return Err(DrawCallError::EmptyTexture { name: texture.name.clone() });
                }
                Shading::Textured { uvs, texture }
            }
        };

        Ok(DrawCall {
            id,
            transform: self.transform,
            vertices: self.vertices,
            shading,
        })
    }
}

/// Per-triangle shading data
#[derive(Debug, Clone)]
pub enum TriangleShading {
    Flat(u8),
    Textured { uvs: [Vec2; 3], texture: Arc<Texture> },
}

/// A transformed triangle in top/bottom/middle order
#[derive(Debug, Clone)]
pub struct Triangle {
    pub pos: [Vec3; 3],
    pub shading: TriangleShading,
}

impl Triangle {
    /// Sort into top/bottom/middle order: `pos[0].y <= pos[2].y <= pos[1].y`
    pub fn reorder(&mut self) {
        match &mut self.shading {
            TriangleShading::Flat(_) => {
                let mut uvs = [Vec2::default(); 3];
                sort_top_bottom_middle(&mut self.pos, &mut uvs);
            }
            TriangleShading::Textured { uvs, .. } => sort_top_bottom_middle(&mut self.pos, uvs),
        }
    }

    pub fn to_screen(&self) -> ScreenTriangle {
        let uvs = match &self.shading {
            TriangleShading::Flat(_) => [Vec2::default(); 3],
            TriangleShading::Textured { uvs, .. } => *uvs,
        };
        ScreenTriangle::from_sorted(self.pos, uvs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri_vertices() -> Vec<Vec3> {
        vec![Vec3::new(0.0, 10.0, 0.0), Vec3::new(5.0, 0.0, 0.0), Vec3::new(9.0, 5.0, 0.0)]
    }

    fn texture() -> Arc<Texture> {
        Arc::new(Texture::checkerboard(8, 8, 1, 2))
    }

    #[test]
    fn test_validate_flat() {
        let dc = DrawCallDesc::flat(Mat4::IDENTITY, tri_vertices(), vec![7]).validate(3).unwrap();
        assert_eq!(dc.id, 3);
        assert_eq!(dc.triangle_count(), 1);
        assert!(matches!(dc.shading, Shading::Flat(ref c) if c == &vec![7u8]));
    }

    #[test]
    fn test_validate_rejects_vertex_count() {
        let mut verts = tri_vertices();
        verts.pop();
        let err = DrawCallDesc::flat(Mat4::IDENTITY, verts, vec![]).validate(1).unwrap_err();
        assert_eq!(err, DrawCallError::VertexCount { count: 2 });
    }

    #[test]
    fn test_validate_rejects_color_count() {
        let err = DrawCallDesc::flat(Mat4::IDENTITY, tri_vertices(), vec![1, 2]).validate(1).unwrap_err();
        assert_eq!(err, DrawCallError::ColorCount { expected: 1, actual: 2 });
    }

    #[test]
    fn test_validate_rejects_uv_count() {
        let desc = DrawCallDesc::textured(Mat4::IDENTITY, tri_vertices(), vec![Vec2::default(); 2], texture());
        assert_eq!(desc.validate(1).unwrap_err(), DrawCallError::UvCount { expected: 3, actual: 2 });
    }

    #[test]
    fn test_validate_shading_exclusive() {
        let mut both = DrawCallDesc::flat(Mat4::IDENTITY, tri_vertices(), vec![1]);
        both.uvs = Some(vec![Vec2::default(); 3]);
        both.texture = Some(texture());
        assert_eq!(both.validate(1).unwrap_err(), DrawCallError::ConflictingShading);

        let neither = DrawCallDesc { vertices: tri_vertices(), ..Default::default() };
        assert_eq!(neither.validate(1).unwrap_err(), DrawCallError::MissingShading);

        let no_texture = DrawCallDesc {
            vertices: tri_vertices(),
            uvs: Some(vec![Vec2::default(); 3]),
            ..Default::default()
        };
        assert_eq!(no_texture.validate(1).unwrap_err(), DrawCallError::MissingTexture);
    }

    #[test]
    fn test_validate_rejects_empty_texture() {
        let desc = DrawCallDesc::textured(
            Mat4::IDENTITY,
            tri_vertices(),
            vec![Vec2::default(); 3],
            Arc::new(Texture::new(0, 4)),
        );
        assert!(matches!(desc.validate(1), Err(DrawCallError::EmptyTexture { .. })));
    }

    #[test]
    fn test_empty_flat_is_valid() {
        let dc = DrawCallDesc::flat(Mat4::IDENTITY, vec![], vec![]).validate(1).unwrap();
        assert_eq!(dc.triangles().count(), 0);
    }

    #[test]
    fn test_triangles_are_transformed_and_sorted() {
        let transform = Mat4::translation(Vec3::new(100.0, 50.0, 0.0));
        let dc = DrawCallDesc::flat(transform, tri_vertices(), vec![4]).validate(1).unwrap();
        let tris: Vec<_> = dc.triangles().collect();
        assert_eq!(tris.len(), 1);

        let pos = tris[0].pos;
        assert_eq!(pos[0], Vec3::new(105.0, 50.0, 0.0)); // top
        assert_eq!(pos[1], Vec3::new(100.0, 60.0, 0.0)); // bottom
        assert_eq!(pos[2], Vec3::new(109.0, 55.0, 0.0)); // middle
        assert!(matches!(tris[0].shading, TriangleShading::Flat(4)));
    }

    #[test]
    fn test_uvs_follow_vertices() {
        let uvs = vec![Vec2::new(0.0, 1.0), Vec2::new(0.5, 0.0), Vec2::new(1.0, 0.5)];
        let dc = DrawCallDesc::textured(Mat4::IDENTITY, tri_vertices(), uvs, texture())
            .validate(1)
            .unwrap();
        let tri = dc.triangles().next().unwrap();
        match tri.shading {
            TriangleShading::Textured { uvs, .. } => {
                assert_eq!(uvs, [Vec2::new(0.5, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.5)]);
            }
            TriangleShading::Flat(_) => panic!("expected textured triangle"),
        }
    }

    #[test]
    fn test_colors_assigned_per_triangle() {
        let mut verts = tri_vertices();
        verts.extend(tri_vertices());
        let dc = DrawCallDesc::flat(Mat4::IDENTITY, verts, vec![1, 2]).validate(1).unwrap();
        let colors: Vec<_> = dc
            .triangles()
            .map(|t| match t.shading {
                TriangleShading::Flat(c) => c,
                TriangleShading::Textured { .. } => 0,
            })
            .collect();
        assert_eq!(colors, vec![1, 2]);
    }
}
