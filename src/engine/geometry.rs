// Polygon packing into GPU-ready interleaved vertex records.
//
// Pipeline:
//   shape builder → add_polygon() → GeometryBuffer → static GPU buffers
//
// Buffers are packed once at startup and never mutated afterwards; the
// per-frame work is all in rotation.rs / frame.rs.

use glam::Vec3;
use thiserror::Error;

/// Cross products shorter than this are treated as degenerate geometry
/// (collinear or coincident leading points) and rejected.
const DEGENERATE_EPSILON: f32 = 1e-12;

// ============================================================================
// PACKED VERTEX
// ============================================================================

/// Quantization policy for the 8-bit normal channels.
///
/// Must match the vertex attribute format declared to the GPU: mixing the
/// encoding on the CPU side with the other format on the GPU side corrupts
/// lighting. Chosen once per `GeometryBuffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalEncoding {
    /// `round(c * 127.5 - 0.5)` stored as a two's-complement byte,
    /// consumed as a normalized signed byte (Snorm8).
    Signed,
    /// `round((c + 1.0) * 127.5)` in [0, 255], consumed as a normalized
    /// unsigned byte (Unorm8). Sign is recovered in the shader via `* 2 - 1`.
    UnsignedBiased,
}

impl NormalEncoding {
    /// The wgpu vertex format the normal attribute must be declared with.
    pub fn vertex_format(self) -> wgpu::VertexFormat {
        match self {
            NormalEncoding::Signed => wgpu::VertexFormat::Snorm8x4,
            NormalEncoding::UnsignedBiased => wgpu::VertexFormat::Unorm8x4,
        }
    }
}

/// GPU-ready vertex, fixed 20-byte interleaved layout:
///   bytes  0..12  position, 3 x f32
///   bytes 12..15  quantized face normal (flat shaded, shared per polygon)
///   byte     15   padding
///   bytes 16..20  RGBA color, one unsigned byte per channel
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedVertex {
    pub position: [f32; 3],
    pub normal:   [u8; 4],
    pub color:    [u8; 4],
}

impl PackedVertex {
    pub fn desc(encoding: NormalEncoding) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PackedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: match encoding {
                NormalEncoding::Signed => &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        offset: 12,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Snorm8x4,
                    },
                    wgpu::VertexAttribute {
                        offset: 16,
                        shader_location: 2,
                        format: wgpu::VertexFormat::Unorm8x4,
                    },
                ],
                NormalEncoding::UnsignedBiased => &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        offset: 12,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Unorm8x4,
                    },
                    wgpu::VertexAttribute {
                        offset: 16,
                        shader_location: 2,
                        format: wgpu::VertexFormat::Unorm8x4,
                    },
                ],
            },
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("degenerate polygon: leading points are collinear or coincident")]
    DegenerateNormal,

    #[error("buffer capacity exceeded: need {needed} vertices, {capacity} available")]
    CapacityExceeded { needed: usize, capacity: usize },
}

// ============================================================================
// GEOMETRY BUFFER
// ============================================================================

/// Fixed-capacity arena for packed vertices and triangle-fan indices.
///
/// Append-only: `add_polygon` either appends a whole polygon or leaves the
/// buffer untouched. Capacity is a hard precondition checked up front, not a
/// silent overflow.
pub struct GeometryBuffer {
    vertices: Vec<PackedVertex>,
    indices:  Vec<u16>,
    max_vertices: usize,
    max_indices:  usize,
    encoding: NormalEncoding,
}

impl GeometryBuffer {
    /// Reference sizing: 64 vertices / 128 indices, enough for every shape
    /// this crate ships.
    pub fn new(encoding: NormalEncoding) -> Self {
        Self::with_capacity(encoding, 64, 128)
    }

    pub fn with_capacity(encoding: NormalEncoding, max_vertices: usize, max_indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(max_vertices),
            indices:  Vec::with_capacity(max_indices),
            max_vertices,
            max_indices,
            encoding,
        }
    }

    /// Append one planar convex polygon as a triangle fan.
    ///
    /// `points` must be in CCW order when viewed from the front face; the
    /// face normal comes from the first three points via the right-hand rule
    /// and is shared flat across every vertex of the polygon.
    ///
    /// `color` is packed little-endian RGBA: byte0=R, byte1=G, byte2=B, byte3=A.
    pub fn add_polygon(&mut self, color: u32, points: &[Vec3]) -> Result<(), GeometryError> {
        let n = points.len();
        if n < 3 {
            return Err(GeometryError::TooFewPoints(n));
        }

        let needed_vertices = self.vertices.len() + n;
        if needed_vertices > self.max_vertices {
            return Err(GeometryError::CapacityExceeded {
                needed: needed_vertices,
                capacity: self.max_vertices,
            });
        }
        if self.indices.len() + 3 * (n - 2) > self.max_indices {
            return Err(GeometryError::CapacityExceeded {
                needed: needed_vertices,
                capacity: self.max_vertices,
            });
        }

        let normal = face_normal(points)?;
        let normal_bytes = quantize_normal(normal, self.encoding);
        let color_bytes = color.to_le_bytes();

        let base = self.vertices.len() as u16;
        for p in points {
            self.vertices.push(PackedVertex {
                position: p.to_array(),
                normal:   normal_bytes,
                color:    color_bytes,
            });
        }

        // Triangle fan anchored at the polygon's first vertex.
        for k in 2..n as u16 {
            self.indices.push(base);
            self.indices.push(base + k - 1);
            self.indices.push(base + k);
        }

        Ok(())
    }

    pub fn encoding(&self) -> NormalEncoding { self.encoding }
    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn index_count(&self) -> usize { self.indices.len() }

    pub fn vertices(&self) -> &[PackedVertex] { &self.vertices }
    pub fn indices(&self) -> &[u16] { &self.indices }

    /// Cast vertex slice to raw bytes for wgpu buffer upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Cast index slice to raw bytes for wgpu buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

// ============================================================================
// NORMAL COMPUTATION + QUANTIZATION
// ============================================================================

/// Unnormalized face normal from the first three points (right-hand rule,
/// CCW winding front face). The magnitude carries no meaning downstream;
/// quantization rescales by the dominant component.
fn face_normal(points: &[Vec3]) -> Result<Vec3, GeometryError> {
    let e0 = points[1] - points[0];
    let e1 = points[2] - points[0];
    let n = e0.cross(e1);
    if n.length_squared() < DEGENERATE_EPSILON {
        return Err(GeometryError::DegenerateNormal);
    }
    Ok(n)
}

/// Compress a face normal into three bytes (fourth byte is padding).
///
/// The normal is first scaled so its dominant-magnitude component is exactly
/// ±1, then each component is mapped into the 8-bit range per the encoding.
fn quantize_normal(n: Vec3, encoding: NormalEncoding) -> [u8; 4] {
    let dominant = n.x.abs().max(n.y.abs()).max(n.z.abs());
    let scaled = n / dominant;

    let quantize = |c: f32| -> u8 {
        match encoding {
            NormalEncoding::UnsignedBiased => ((c + 1.0) * 127.5).round() as u8,
            NormalEncoding::Signed => ((c * 127.5 - 0.5).round() as i32 & 0xFF) as u8,
        }
    };

    [quantize(scaled.x), quantize(scaled.y), quantize(scaled.z), 0]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Front face of the unit-ish cube, CCW viewed from +Z.
    fn front_quad() -> Vec<Vec3> {
        vec![
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ]
    }

    fn decode(byte: u8, encoding: NormalEncoding) -> f32 {
        match encoding {
            NormalEncoding::UnsignedBiased => byte as f32 / 127.5 - 1.0,
            NormalEncoding::Signed => (byte as i8 as f32 + 0.5) / 127.5,
        }
    }

    #[test]
    fn packed_vertex_is_20_bytes() {
        assert_eq!(std::mem::size_of::<PackedVertex>(), 20);
    }

    #[test]
    fn front_quad_normal_points_along_positive_z() {
        let n = face_normal(&front_quad()).unwrap();
        assert_eq!(n, Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn flipped_winding_flips_every_normal_component() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.5, 0.0),
            Vec3::new(1.0, 2.0, 1.0),
        ];
        let mut reversed = points.clone();
        reversed.reverse();

        let n = face_normal(&points).unwrap();
        let m = face_normal(&reversed).unwrap();
        assert_eq!(m, -n);
    }

    #[test]
    fn degenerate_polygon_is_rejected() {
        let mut buf = GeometryBuffer::new(NormalEncoding::Signed);
        let collinear = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(2.0, 2.0, 2.0),
        ];
        assert_eq!(
            buf.add_polygon(0xFFFF_FFFF, &collinear),
            Err(GeometryError::DegenerateNormal)
        );
        assert_eq!(buf.vertex_count(), 0);
    }

    #[test]
    fn too_few_points_is_rejected() {
        let mut buf = GeometryBuffer::new(NormalEncoding::Signed);
        let line = [Vec3::ZERO, Vec3::X];
        assert_eq!(buf.add_polygon(0, &line), Err(GeometryError::TooFewPoints(2)));
    }

    #[test]
    fn quantization_round_trips_within_one_step() {
        // A normal with no zero components and a clear dominant axis.
        let n = Vec3::new(0.3, -0.7, 1.9);
        let scaled = n / 1.9;

        for encoding in [NormalEncoding::Signed, NormalEncoding::UnsignedBiased] {
            let bytes = quantize_normal(n, encoding);
            for (i, &b) in bytes[..3].iter().enumerate() {
                let truth = scaled[i];
                let got = decode(b, encoding);
                assert!(
                    (got - truth).abs() <= 1.0 / 127.5,
                    "{encoding:?} channel {i}: {got} vs {truth}"
                );
            }
        }
    }

    #[test]
    fn quad_packs_as_two_fan_triangles() {
        let mut buf = GeometryBuffer::new(NormalEncoding::UnsignedBiased);
        buf.add_polygon(0x0000_00FF, &front_quad()).unwrap();

        assert_eq!(buf.vertex_count(), 4);
        assert_eq!(buf.indices(), &[0, 1, 2, 0, 2, 3]);

        // All four vertices share the quad's flat normal.
        let n0 = buf.vertices()[0].normal;
        assert!(buf.vertices().iter().all(|v| v.normal == n0));
        // +Z dominant axis in unsigned-biased encoding maps to 255.
        assert_eq!(n0[2], 255);
    }

    #[test]
    fn second_polygon_fans_from_its_own_base() {
        let mut buf = GeometryBuffer::new(NormalEncoding::Signed);
        buf.add_polygon(0, &front_quad()).unwrap();
        buf.add_polygon(0, &front_quad()).unwrap();
        assert_eq!(&buf.indices()[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn color_bytes_are_little_endian_rgba() {
        let mut buf = GeometryBuffer::new(NormalEncoding::Signed);
        buf.add_polygon(0x8040_20FF, &front_quad()).unwrap();
        // byte0=R .. byte3=A of the packed little-endian u32
        assert_eq!(buf.vertices()[0].color, [0xFF, 0x20, 0x40, 0x80]);
    }

    #[test]
    fn exceeding_vertex_capacity_fails_without_mutation() {
        let mut buf = GeometryBuffer::with_capacity(NormalEncoding::Signed, 6, 12);
        buf.add_polygon(0, &front_quad()).unwrap();

        let before = buf.vertex_count();
        let err = buf.add_polygon(0, &front_quad()).unwrap_err();
        assert_eq!(
            err,
            GeometryError::CapacityExceeded { needed: 8, capacity: 6 }
        );
        assert_eq!(buf.vertex_count(), before);
        assert_eq!(buf.index_count(), 6);
    }

    #[test]
    fn signed_encoding_extremes() {
        // Dominant +Z hits 127, dominant -Z hits -128.
        let up = quantize_normal(Vec3::new(0.0, 0.0, 2.0), NormalEncoding::Signed);
        assert_eq!(up[2] as i8, 127);
        let down = quantize_normal(Vec3::new(0.0, 0.0, -2.0), NormalEncoding::Signed);
        assert_eq!(down[2] as i8, -128);
    }
}
