// Orientation math for the spinning shapes.
//
// Two strategies produce the per-frame orientation matrix:
//   - demo_rotation(): closed-form wobble, pure function of elapsed time
//   - apply_drag():    incremental small-angle update from pointer motion,
//                      with decaying momentum after release ("throw")
//
// Both go through unit quaternions so composition never suffers gimbal lock
// and orthonormality is preserved to float precision.

use glam::{Mat2, Mat3, Quat};

/// Wobble frequencies in rad/ms, one per quaternion component. Deliberately
/// incommensurate so the orientation path never repeats within any practical
/// time window.
const WOBBLE_FREQ_W: f32 = 0.00059;
const WOBBLE_FREQ_X: f32 = 0.00097;
const WOBBLE_FREQ_Y: f32 = 0.00071;
const WOBBLE_FREQ_Z: f32 = 0.00083;

/// Planar spin rate for the flat (2x2) variant, rad/ms.
const SPIN_RATE: f32 = 0.0005;

/// Drag sensitivity in radians per (pixel / min viewport dimension).
/// Dividing by the min dimension keeps the feel independent of window size.
const BASE_DRAG_SPEED: f32 = 4.0;

/// Momentum decay constant after release, per ms.
const MOMENTUM_DECAY: f32 = 0.004;

/// Below this the throw is visually at rest; momentum snaps to 0 so frames
/// stop composing negligible increments.
const MOMENTUM_REST_EPSILON: f32 = 1e-4;

// ============================================================================
// DEMO / IDLE WOBBLE
// ============================================================================

/// Closed-form wobble orientation at `elapsed_ms` since the epoch.
///
/// The quaternion components are four independent sinusoids; at t=0 the
/// quaternion is (w=1, 0, 0, 0) and the result is the identity. Normalization
/// happens in the quaternion-to-matrix conversion.
pub fn demo_rotation(elapsed_ms: f32) -> Mat3 {
    let q = Quat::from_xyzw(
        (WOBBLE_FREQ_X * elapsed_ms).sin(),
        (WOBBLE_FREQ_Y * elapsed_ms).sin(),
        (WOBBLE_FREQ_Z * elapsed_ms).sin(),
        (WOBBLE_FREQ_W * elapsed_ms).cos(),
    );
    Mat3::from_quat(q.normalize())
}

/// Planar rotation for the flat spinner variant.
pub fn spin_rotation(elapsed_ms: f32) -> Mat2 {
    Mat2::from_angle(SPIN_RATE * elapsed_ms)
}

/// Lift a planar rotation into a 3x3 matrix rotating about Z, so the flat
/// variant draws through the same pipeline as the solids.
pub fn embed_spin(m: Mat2) -> Mat3 {
    Mat3::from_cols(
        m.x_axis.extend(0.0),
        m.y_axis.extend(0.0),
        glam::Vec3::Z,
    )
}

// ============================================================================
// DRAG / THROW
// ============================================================================

/// Interaction regime for the incremental rotation path.
///
/// `Idle` shows the demo wobble; a pointer press enters `Dragging`; release
/// enters `Thrown` with full momentum, which decays toward rest. Once thrown
/// the shape never returns to the demo wobble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrowPhase {
    Idle,
    Dragging,
    Thrown { momentum: f32 },
}

impl ThrowPhase {
    /// Multiplier applied to the drag increment this frame.
    /// Zero means no increment is composed at all.
    pub fn gain(self) -> f32 {
        match self {
            ThrowPhase::Idle => 0.0,
            ThrowPhase::Dragging => 1.0,
            ThrowPhase::Thrown { momentum } => momentum,
        }
    }

    /// Exponential momentum decay while thrown. Decay is monotone and never
    /// crosses zero; below the rest epsilon momentum snaps to exactly 0.
    pub fn decay(&mut self, dt_ms: f32) {
        if let ThrowPhase::Thrown { momentum } = self {
            *momentum *= (-dt_ms * MOMENTUM_DECAY).exp();
            if *momentum < MOMENTUM_REST_EPSILON {
                *momentum = 0.0;
            }
        }
    }
}

/// Compose one frame of pointer-drag rotation into `orientation`.
///
/// `delta` is the pointer motion in pixels since the last frame (screen
/// coordinates, y down); `min_dim` the smaller viewport dimension; `gain`
/// comes from `ThrowPhase::gain()`.
///
/// The increment is a first-order small-angle quaternion (w=1, z=0, no roll):
/// horizontal drag maps to rotation about Y, vertical drag to rotation about
/// X. Composition is a full 3x3 product followed by a quaternion round-trip
/// to keep the accumulated matrix orthonormal.
pub fn apply_drag(orientation: &mut Mat3, delta: (f32, f32), min_dim: f32, gain: f32) {
    let speed = BASE_DRAG_SPEED / min_dim.max(1.0) * gain;
    let qx = delta.1 * speed;
    let qy = delta.0 * speed;
    if qx == 0.0 && qy == 0.0 {
        return;
    }

    let increment = Mat3::from_quat(Quat::from_xyzw(qx, qy, 0.0, 1.0).normalize());
    *orientation = increment * *orientation;

    // Re-orthonormalize so drift from repeated float products stays bounded.
    *orientation = Mat3::from_quat(Quat::from_mat3(orientation).normalize());
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const TOLERANCE: f32 = 1e-5;

    fn assert_orthonormal(m: &Mat3) {
        for col in [m.x_axis, m.y_axis, m.z_axis] {
            assert!((col.length() - 1.0).abs() < TOLERANCE, "column not unit: {col:?}");
        }
        assert!(m.x_axis.dot(m.y_axis).abs() < TOLERANCE);
        assert!(m.y_axis.dot(m.z_axis).abs() < TOLERANCE);
        assert!(m.x_axis.dot(m.z_axis).abs() < TOLERANCE);
        assert!((m.determinant() - 1.0).abs() < 10.0 * TOLERANCE, "not a proper rotation");
    }

    #[test]
    fn demo_rotation_at_epoch_is_identity() {
        assert_eq!(demo_rotation(0.0), Mat3::IDENTITY);
    }

    #[test]
    fn demo_rotation_stays_orthonormal() {
        for t in [1.0, 16.7, 1000.0, 98765.4, 3.6e6] {
            assert_orthonormal(&demo_rotation(t));
        }
    }

    #[test]
    fn spin_rotation_at_epoch_is_identity() {
        assert_eq!(spin_rotation(0.0), Mat2::IDENTITY);
    }

    #[test]
    fn embedded_spin_leaves_z_fixed() {
        let m = embed_spin(spin_rotation(1234.0));
        assert_eq!(m * Vec3::Z, Vec3::Z);
        assert_orthonormal(&m);
    }

    #[test]
    fn zero_delta_drag_is_a_no_op() {
        let mut orientation = demo_rotation(4321.0);
        let before = orientation;
        apply_drag(&mut orientation, (0.0, 0.0), 600.0, 1.0);
        assert_eq!(orientation, before);
    }

    #[test]
    fn zero_gain_drag_is_a_no_op() {
        let mut orientation = demo_rotation(4321.0);
        let before = orientation;
        apply_drag(&mut orientation, (35.0, -12.0), 600.0, 0.0);
        assert_eq!(orientation, before);
    }

    #[test]
    fn drag_composition_stays_orthonormal_over_many_frames() {
        let mut orientation = Mat3::IDENTITY;
        for i in 0..5000 {
            let delta = (((i % 17) as f32) - 8.0, ((i % 11) as f32) - 5.0);
            apply_drag(&mut orientation, delta, 480.0, 1.0);
        }
        assert_orthonormal(&orientation);
    }

    #[test]
    fn horizontal_drag_rotates_about_y() {
        let mut orientation = Mat3::IDENTITY;
        apply_drag(&mut orientation, (40.0, 0.0), 800.0, 1.0);
        // Rotation about Y keeps the Y axis fixed and moves +Z toward +X.
        assert!((orientation * Vec3::Y - Vec3::Y).length() < TOLERANCE);
        assert!((orientation * Vec3::Z).x > 0.0);
    }

    #[test]
    fn vertical_drag_rotates_about_x() {
        let mut orientation = Mat3::IDENTITY;
        apply_drag(&mut orientation, (0.0, 40.0), 800.0, 1.0);
        assert!((orientation * Vec3::X - Vec3::X).length() < TOLERANCE);
        // Dragging down (screen y grows downward) pulls the front face down.
        assert!((orientation * Vec3::Z).y < 0.0);
    }

    #[test]
    fn larger_viewport_means_gentler_rotation() {
        let mut small = Mat3::IDENTITY;
        let mut large = Mat3::IDENTITY;
        apply_drag(&mut small, (30.0, 0.0), 400.0, 1.0);
        apply_drag(&mut large, (30.0, 0.0), 1600.0, 1.0);
        let angle_of = |m: Mat3| (m * Vec3::Z).x.asin();
        assert!(angle_of(small) > angle_of(large));
    }

    #[test]
    fn momentum_decays_monotonically_to_rest() {
        let mut phase = ThrowPhase::Thrown { momentum: 1.0 };
        let mut prev = 1.0;
        for _ in 0..2000 {
            phase.decay(16.0);
            let ThrowPhase::Thrown { momentum } = phase else {
                panic!("decay must not change the phase");
            };
            assert!(momentum >= 0.0);
            assert!(momentum <= prev);
            prev = momentum;
        }
        assert_eq!(prev, 0.0);
    }

    #[test]
    fn decay_leaves_other_phases_alone() {
        let mut idle = ThrowPhase::Idle;
        idle.decay(16.0);
        assert_eq!(idle, ThrowPhase::Idle);

        let mut dragging = ThrowPhase::Dragging;
        dragging.decay(16.0);
        assert_eq!(dragging, ThrowPhase::Dragging);
    }
}
