// Static shape geometry, packed once at startup.
//
// All three shapes live in one fixed-capacity arena and are drawn by index
// range, so switching shapes never touches GPU buffers after init.

use std::ops::Range;

use glam::Vec3;

use super::frame::SpinStyle;
use super::geometry::{GeometryBuffer, GeometryError, NormalEncoding};

// Face palette, little-endian RGBA (byte0=R .. byte3=A).
const RED: u32 = 0xFF00_00FF;
const GREEN: u32 = 0xFF00_FF00;
const BLUE: u32 = 0xFFFF_0000;
const YELLOW: u32 = 0xFF00_FFFF;
const MAGENTA: u32 = 0xFFFF_00FF;
const CYAN: u32 = 0xFFFF_FF00;
const WHITE: u32 = 0xFFFF_FFFF;
const ORANGE: u32 = 0xFF00_80FF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Cube,
    Octahedron,
    Spinner,
}

impl ShapeKind {
    pub fn spin_style(self) -> SpinStyle {
        match self {
            ShapeKind::Cube | ShapeKind::Octahedron => SpinStyle::Tumble,
            ShapeKind::Spinner => SpinStyle::FlatSpin,
        }
    }

    /// Tab cycles cube -> octahedron -> spinner -> cube.
    pub fn next(self) -> Self {
        match self {
            ShapeKind::Cube => ShapeKind::Octahedron,
            ShapeKind::Octahedron => ShapeKind::Spinner,
            ShapeKind::Spinner => ShapeKind::Cube,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Cube => "cube",
            ShapeKind::Octahedron => "octahedron",
            ShapeKind::Spinner => "spinner",
        }
    }
}

/// All shapes packed into one vertex/index arena, with the index range each
/// shape occupies.
pub struct ShapeArena {
    buffer: GeometryBuffer,
    cube: Range<u32>,
    octahedron: Range<u32>,
    spinner: Range<u32>,
}

impl ShapeArena {
    pub fn pack(encoding: NormalEncoding) -> Result<Self, GeometryError> {
        let mut buffer = GeometryBuffer::new(encoding);

        let start = buffer.index_count() as u32;
        cube(&mut buffer)?;
        let cube_range = start..buffer.index_count() as u32;

        let start = buffer.index_count() as u32;
        octahedron(&mut buffer)?;
        let octahedron_range = start..buffer.index_count() as u32;

        let start = buffer.index_count() as u32;
        spinner_quad(&mut buffer)?;
        let spinner_range = start..buffer.index_count() as u32;

        Ok(Self {
            buffer,
            cube: cube_range,
            octahedron: octahedron_range,
            spinner: spinner_range,
        })
    }

    pub fn buffer(&self) -> &GeometryBuffer {
        &self.buffer
    }

    pub fn index_range(&self, kind: ShapeKind) -> Range<u32> {
        match kind {
            ShapeKind::Cube => self.cube.clone(),
            ShapeKind::Octahedron => self.octahedron.clone(),
            ShapeKind::Spinner => self.spinner.clone(),
        }
    }
}

/// Unit cube centered on the origin, one color per face, every face wound
/// CCW when viewed from outside.
pub fn cube(buffer: &mut GeometryBuffer) -> Result<(), GeometryError> {
    let faces: [(u32, [Vec3; 4]); 6] = [
        // +Z front
        (RED, [
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ]),
        // -Z back
        (GREEN, [
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
        ]),
        // +X right
        (BLUE, [
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        ]),
        // -X left
        (YELLOW, [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ]),
        // +Y top
        (MAGENTA, [
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ]),
        // -Y bottom
        (CYAN, [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
        ]),
    ];

    for (color, points) in &faces {
        buffer.add_polygon(*color, points)?;
    }
    Ok(())
}

/// Regular octahedron: apexes on the coordinate axes, one triangle per
/// octant. Winding is flipped in octants of negative parity to keep every
/// face CCW from outside.
pub fn octahedron(buffer: &mut GeometryBuffer) -> Result<(), GeometryError> {
    const R: f32 = 1.4;
    let colors = [RED, GREEN, BLUE, YELLOW, MAGENTA, CYAN, WHITE, ORANGE];

    let mut face = 0;
    for sx in [1.0f32, -1.0] {
        for sy in [1.0f32, -1.0] {
            for sz in [1.0f32, -1.0] {
                let px = Vec3::new(sx * R, 0.0, 0.0);
                let py = Vec3::new(0.0, sy * R, 0.0);
                let pz = Vec3::new(0.0, 0.0, sz * R);
                let points = if sx * sy * sz > 0.0 {
                    [px, py, pz]
                } else {
                    [py, px, pz]
                };
                buffer.add_polygon(colors[face], &points)?;
                face += 1;
            }
        }
    }
    Ok(())
}

/// Single front-facing square for the flat spinner variant.
pub fn spinner_quad(buffer: &mut GeometryBuffer) -> Result<(), GeometryError> {
    buffer.add_polygon(WHITE, &[
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
    ])
}
