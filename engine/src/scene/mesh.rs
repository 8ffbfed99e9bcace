use cgmath::Vector3;

/// Indexed triangle soup in object space.
///
/// Only positions are kept: navigation needs nothing but ray/triangle tests
/// and face normals, which come from the winding order (counter-clockwise
/// seen from the front).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub positions: Vec<Vector3<f32>>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new(positions: Vec<Vector3<f32>>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    /// Horizontal plane centred on the origin, lying in XZ and facing +Y.
    pub fn plane(width: f32, depth: f32) -> Self {
        let (hw, hd) = (width * 0.5, depth * 0.5);
        Self::new(
            vec![
                Vector3::new(-hw, 0.0, -hd),
                Vector3::new(-hw, 0.0, hd),
                Vector3::new(hw, 0.0, hd),
                Vector3::new(hw, 0.0, -hd),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    /// Axis aligned box centred on the origin with outward facing triangles.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
        let positions = vec![
            Vector3::new(-x, -y, -z),
            Vector3::new(x, -y, -z),
            Vector3::new(x, y, -z),
            Vector3::new(-x, y, -z),
            Vector3::new(-x, -y, z),
            Vector3::new(x, -y, z),
            Vector3::new(x, y, z),
            Vector3::new(-x, y, z),
        ];
        let triangles = vec![
            // +z
            [4, 5, 6],
            [4, 6, 7],
            // -z
            [1, 0, 3],
            [1, 3, 2],
            // +x
            [5, 1, 2],
            [5, 2, 6],
            // -x
            [0, 4, 7],
            [0, 7, 3],
            // +y
            [7, 6, 2],
            [7, 2, 3],
            // -y
            [0, 1, 5],
            [0, 5, 4],
        ];
        Self::new(positions, triangles)
    }

    pub fn triangle(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Self {
        Self::new(vec![a, b, c], vec![[0, 1, 2]])
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Corner positions of every face. Faces with out of range indices are skipped.
    pub fn faces(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.triangles.iter().filter_map(|[a, b, c]| {
            Some([
                *self.positions.get(*a as usize)?,
                *self.positions.get(*b as usize)?,
                *self.positions.get(*c as usize)?,
            ])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn face_normal([a, b, c]: [Vector3<f32>; 3]) -> Vector3<f32> {
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn test_plane_faces_up() {
        for face in Mesh::plane(10.0, 10.0).faces() {
            assert_eq!(face_normal(face), Vector3::new(0.0, 1.0, 0.0));
        }
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let mesh = Mesh::cuboid(2.0, 4.0, 6.0);
        assert_eq!(mesh.triangle_count(), 12);

        for face in mesh.faces() {
            let centroid = (face[0] + face[1] + face[2]) / 3.0;
            assert!(face_normal(face).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_faces_skip_bad_indices() {
        let mesh = Mesh::new(
            vec![Vector3::new(0.0, 0.0, 0.0); 3],
            vec![[0, 1, 2], [0, 1, 9]],
        );
        assert_eq!(mesh.faces().count(), 1);
    }
}
