//! Motion contract shared by the frame loop, the harness and every strategy.
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::constants::{DELTA_TIME_MAX, DELTA_TIME_MIN, VECTOR_EPSILON};

/// Plain 2D vector in viewport pixels (or pixels per second).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` (radians, counter-clockwise from +x).
    #[must_use]
    pub fn from_angle(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { x: cos, y: sin }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Counter-clockwise perpendicular.
    #[must_use]
    pub const fn perp(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        (len > VECTOR_EPSILON).then(|| self * (1.0 / len))
    }

    /// Rotate counter-clockwise by `angle` radians.
    #[must_use]
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x.mul_add(cos, -self.y * sin),
            y: self.x.mul_add(sin, self.y * cos),
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Per-tick input supplied by the rendering/pointer collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionEnvironment {
    pub width: f64,
    pub height: f64,
    /// Elapsed simulation time in seconds.
    pub time: f64,
    /// Seconds since the previous tick, before clamping.
    pub delta_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_velocity: Option<Vec2>,
}

impl MotionEnvironment {
    #[must_use]
    pub const fn new(width: f64, height: f64, time: f64, delta_time: f64) -> Self {
        Self {
            width,
            height,
            time,
            delta_time,
            mouse: None,
            mouse_velocity: None,
        }
    }

    #[must_use]
    pub const fn with_mouse(mut self, mouse: Vec2) -> Self {
        self.mouse = Some(mouse);
        self
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Delta time clamped into the stable integration window.
    #[must_use]
    pub fn clamped_delta(&self) -> f64 {
        clamp_delta_time(self.delta_time)
    }
}

/// Clamp a caller-supplied delta into `[DELTA_TIME_MIN, DELTA_TIME_MAX]`.
/// Non-finite deltas collapse to the minimum.
#[must_use]
pub fn clamp_delta_time(delta_time: f64) -> f64 {
    if delta_time.is_nan() {
        return DELTA_TIME_MIN;
    }
    delta_time.clamp(DELTA_TIME_MIN, DELTA_TIME_MAX)
}

/// Strategy-specific diagnostics attached to an update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StepMeta {
    #[serde(rename_all = "camelCase")]
    Zen {
        paused: bool,
        drift_velocity: f64,
        target_speed: f64,
    },
    #[serde(rename_all = "camelCase")]
    FlowField {
        turn_sign: f64,
        orbit_phase: f64,
        curl: Vec2,
    },
}

impl StepMeta {
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        matches!(self, Self::Zen { paused: true, .. })
    }
}

/// Per-tick output consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyUpdateResult {
    pub position: Vec2,
    pub velocity: Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<StepMeta>,
}

impl StrategyUpdateResult {
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}

/// Capability every motion personality implements.
///
/// The stepping loop only ever talks to this trait; it never inspects which
/// personality it is driving.
pub trait MotionStrategy: Send {
    /// Registry identifier, e.g. `"zen"`.
    fn id(&self) -> &'static str;

    /// Advance one tick and report the new kinematic state.
    fn step(&mut self, env: &MotionEnvironment) -> StrategyUpdateResult;

    /// Rebuild internal state for the given viewport.
    fn reset(&mut self, env: &MotionEnvironment);
}
