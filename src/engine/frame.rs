// Per-frame driver: owns the mutable render state and turns (timestamp,
// viewport, pointer history) into the matrix + projection the renderer
// uploads. The caller owns the repeat schedule; step() is just invoked once
// per display frame with the current clock reading.

use glam::Mat3;

use super::rotation::{apply_drag, demo_rotation, embed_spin, spin_rotation, ThrowPhase};

/// Half of the vertical field of view, radians.
const HALF_FOV: f32 = std::f32::consts::FRAC_PI_6; // 30 degrees

/// Which idle animation the active shape uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStyle {
    /// 3D wobble with drag/throw interaction (the solids).
    Tumble,
    /// Fixed-rate planar spin, no interaction (the flat spinner).
    FlatSpin,
}

/// Per-component perspective scalars consumed by the vertex shader in place
/// of a full 4x4 projection matrix. Valid because the camera sits at the
/// origin looking down -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Projection {
    /// `fov = 1/tan(half_angle)`, scaled so the smaller viewport dimension
    /// spans the full field of view regardless of aspect ratio.
    pub fn compute(viewport: (u32, u32)) -> Self {
        let w = viewport.0.max(1) as f32;
        let h = viewport.1.max(1) as f32;
        let min_dim = w.min(h);
        let fov = 1.0 / HALF_FOV.tan();
        Self {
            x: fov * min_dim / w,
            y: fov * min_dim / h,
            z: -fov,
        }
    }
}

/// What the renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub orientation: Mat3,
    pub projection: Projection,
}

/// All mutable per-frame state, explicit and caller-owned. Single writer:
/// pointer callbacks record coordinates, step() reads them on the next frame.
pub struct RenderState {
    epoch_ms: Option<f64>,
    last_frame_ms: f64,
    orientation: Mat3,
    phase: ThrowPhase,
    style: SpinStyle,
    pointer: (f32, f32),
    last_pointer: (f32, f32),
    viewport: (u32, u32),
    projection: Projection,
}

impl RenderState {
    pub fn new(style: SpinStyle) -> Self {
        Self {
            epoch_ms: None,
            last_frame_ms: 0.0,
            orientation: Mat3::IDENTITY,
            phase: ThrowPhase::Idle,
            style,
            pointer: (0.0, 0.0),
            last_pointer: (0.0, 0.0),
            viewport: (0, 0),
            projection: Projection::compute((1, 1)),
        }
    }

    pub fn phase(&self) -> ThrowPhase { self.phase }
    pub fn style(&self) -> SpinStyle { self.style }

    pub fn set_style(&mut self, style: SpinStyle) {
        self.style = style;
    }

    /// Pointer pressed: enter drag mode and anchor both pointer samples so
    /// the first frame sees a zero delta.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.pointer = (x, y);
        self.last_pointer = (x, y);
        self.phase = ThrowPhase::Dragging;
    }

    /// Pointer moved: only tracked while dragging; motion outside a drag
    /// must not disturb a throw in progress.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if self.phase == ThrowPhase::Dragging {
            self.pointer = (x, y);
        }
    }

    /// Pointer released: capture the release position and convert the
    /// last frame's delta into momentum.
    pub fn pointer_up(&mut self, x: f32, y: f32) {
        if self.phase == ThrowPhase::Dragging {
            self.pointer = (x, y);
            self.phase = ThrowPhase::Thrown { momentum: 1.0 };
        }
    }

    /// Advance one frame. The first call establishes the time epoch; a call
    /// whose timestamp has not advanced past the previous frame returns None
    /// and changes nothing.
    pub fn step(&mut self, now_ms: f64, viewport: (u32, u32)) -> Option<FrameParams> {
        let first = self.epoch_ms.is_none();
        if !first && now_ms <= self.last_frame_ms {
            return None;
        }
        let epoch = *self.epoch_ms.get_or_insert(now_ms);
        let dt_ms = if first { 0.0 } else { (now_ms - self.last_frame_ms) as f32 };
        self.last_frame_ms = now_ms;
        let elapsed_ms = (now_ms - epoch) as f32;

        if viewport != self.viewport {
            self.viewport = viewport;
            self.projection = Projection::compute(viewport);
        }

        match self.style {
            SpinStyle::FlatSpin => {
                self.orientation = embed_spin(spin_rotation(elapsed_ms));
            }
            SpinStyle::Tumble => match self.phase {
                ThrowPhase::Idle => {
                    self.orientation = demo_rotation(elapsed_ms);
                }
                ThrowPhase::Dragging | ThrowPhase::Thrown { .. } => {
                    let delta = (
                        self.pointer.0 - self.last_pointer.0,
                        self.pointer.1 - self.last_pointer.1,
                    );
                    let min_dim = viewport.0.min(viewport.1) as f32;
                    apply_drag(&mut self.orientation, delta, min_dim, self.phase.gain());
                    if self.phase == ThrowPhase::Dragging {
                        // Consume the motion so it is not replayed after
                        // release; the throw replays only the final delta.
                        self.last_pointer = self.pointer;
                    }
                    self.phase.decay(dt_ms);
                }
            },
        }

        Some(FrameParams {
            orientation: self.orientation,
            projection: self.projection,
        })
    }
}
