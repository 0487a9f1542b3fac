//! Flow-field personality: the agent rides the curl of a pseudo-noise field
//! at a fixed cruising speed, optionally looping or orbiting the viewport
//! centre.
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::config::{MotionConfigError, at_least, finite, within};
use crate::constants::{
    CURL_EPSILON, FLOW_RESTITUTION, NOISE_TIME_X, NOISE_TIME_Y, NOISE_Y_SCALE, ORBIT_MIN_RADIUS,
};
use crate::forces::{
    contain, pointer_avoidance, pointer_collision, soft_wall_push, wrap_angle,
};
use crate::random::SeededRandom;
use crate::types::{MotionEnvironment, MotionStrategy, StepMeta, StrategyUpdateResult, Vec2};

pub const FLOW_FIELD_ID: &str = "flow-field";

/// Tuning parameters for [`FlowFieldStrategy`]. Every key is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowFieldConfig {
    pub base_speed: f64,
    pub curl_strength: f64,
    pub noise_scale: f64,
    pub time_scale: f64,
    /// Low-pass factor; the velocity moves `1 - smoothing` of the way to its
    /// target each tick.
    pub smoothing: f64,
    pub wall_padding: f64,
    pub wall_stiffness: f64,
    pub boundary_padding: f64,
    pub mouse_avoidance_radius: f64,
    pub mouse_avoidance_strength: f64,
    pub mouse_collision_radius: f64,
    pub mouse_collision_damping: f64,
    /// Mean seconds between turn-direction flips; `0` disables persistent
    /// turning.
    pub turn_persistence: f64,
    pub min_turn_rate: f64,
    pub turn_jitter: f64,
    /// Weight of the orbit term in `[0, 1]`; `0` disables orbiting.
    pub orbit_blend: f64,
    pub orbit_radius: f64,
    pub orbit_radius_drift: f64,
    pub orbit_drift_hz: f64,
    pub orbit_build_up_period: f64,
    pub turn_centering: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

impl Default for FlowFieldConfig {
    fn default() -> Self {
        Self {
            base_speed: 70.0,
            curl_strength: 40.0,
            noise_scale: 0.006,
            time_scale: 1.0,
            smoothing: 0.85,
            wall_padding: 80.0,
            wall_stiffness: 60.0,
            boundary_padding: 8.0,
            mouse_avoidance_radius: 140.0,
            mouse_avoidance_strength: 90.0,
            mouse_collision_radius: 28.0,
            mouse_collision_damping: 0.6,
            turn_persistence: 0.0,
            min_turn_rate: 0.6,
            turn_jitter: 0.0,
            orbit_blend: 0.0,
            orbit_radius: 160.0,
            orbit_radius_drift: 0.25,
            orbit_drift_hz: 0.05,
            orbit_build_up_period: 6.0,
            turn_centering: 0.0,
            seed: None,
        }
    }
}

impl FlowFieldConfig {
    /// Reject parameters that would make the simulation degenerate.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), MotionConfigError> {
        at_least("baseSpeed", self.base_speed, 0.0)?;
        finite("curlStrength", self.curl_strength)?;
        at_least("noiseScale", self.noise_scale, 0.0)?;
        finite("timeScale", self.time_scale)?;
        within("smoothing", self.smoothing, 0.0, 1.0)?;
        finite("wallPadding", self.wall_padding)?;
        finite("wallStiffness", self.wall_stiffness)?;
        finite("boundaryPadding", self.boundary_padding)?;
        finite("mouseAvoidanceRadius", self.mouse_avoidance_radius)?;
        finite("mouseAvoidanceStrength", self.mouse_avoidance_strength)?;
        finite("mouseCollisionRadius", self.mouse_collision_radius)?;
        finite("mouseCollisionDamping", self.mouse_collision_damping)?;
        at_least("turnPersistence", self.turn_persistence, 0.0)?;
        finite("minTurnRate", self.min_turn_rate)?;
        at_least("turnJitter", self.turn_jitter, 0.0)?;
        finite("orbitBlend", self.orbit_blend)?;
        at_least("orbitRadius", self.orbit_radius, 0.0)?;
        finite("orbitRadiusDrift", self.orbit_radius_drift)?;
        finite("orbitDriftHz", self.orbit_drift_hz)?;
        at_least("orbitBuildUpPeriod", self.orbit_build_up_period, 0.0)?;
        at_least("turnCentering", self.turn_centering, 0.0)?;
        Ok(())
    }

    /// Clamp soft parameters into their usable range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.wall_padding = self.wall_padding.max(0.0);
        self.boundary_padding = self.boundary_padding.max(0.0);
        self.mouse_avoidance_radius = self.mouse_avoidance_radius.max(0.0);
        self.mouse_collision_radius = self.mouse_collision_radius.max(0.0);
        self.mouse_collision_damping = self.mouse_collision_damping.clamp(0.0, 1.0);
        self.orbit_blend = self.orbit_blend.clamp(0.0, 1.0);
        self
    }
}

/// Kinematic state owned by one flow-field runner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowFieldState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: f64,
    pub turn_sign: f64,
    pub orbit_phase: f64,
    pub orbit_started_at: f64,
}

pub struct FlowFieldStrategy {
    config: FlowFieldConfig,
    seed: u32,
    rng: SeededRandom,
    state: Option<FlowFieldState>,
}

impl FlowFieldStrategy {
    /// Build a runner. An explicit `seed` wins over `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration fails validation.
    pub fn new(config: FlowFieldConfig, seed: Option<u32>) -> Result<Self, MotionConfigError> {
        config.validate()?;
        let config = config.sanitized();
        let rng = SeededRandom::new(seed.or(config.seed));
        Ok(Self {
            seed: rng.seed(),
            config,
            rng,
            state: None,
        })
    }

    /// Registry factory: parse a flat parameter record and box the runner.
    ///
    /// # Errors
    ///
    /// Returns an error when the record cannot be parsed or validated.
    pub fn from_params(
        params: &serde_json::Value,
        seed: Option<u32>,
    ) -> Result<Box<dyn MotionStrategy>, MotionConfigError> {
        let config: FlowFieldConfig = serde_json::from_value(params.clone())?;
        Ok(Box::new(Self::new(config, seed)?))
    }

    #[must_use]
    pub const fn config(&self) -> &FlowFieldConfig {
        &self.config
    }

    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    #[must_use]
    pub const fn state(&self) -> Option<&FlowFieldState> {
        self.state.as_ref()
    }

    /// Move the agent. Heading follows the new velocity when it is non-zero.
    /// Ignored before the first reset.
    pub fn place(&mut self, position: Vec2, velocity: Vec2) {
        if let Some(state) = self.state.as_mut() {
            state.position = position;
            state.velocity = velocity;
            if let Some(direction) = velocity.normalized() {
                state.heading = direction.angle();
            }
        }
    }

    fn restart(&mut self, env: &MotionEnvironment) -> FlowFieldState {
        self.rng = SeededRandom::new(Some(self.seed));
        let heading = self.rng.uniform(-PI, PI);
        let state = FlowFieldState {
            position: env.center(),
            velocity: Vec2::from_angle(heading) * self.config.base_speed,
            heading,
            turn_sign: 1.0,
            orbit_phase: 0.0,
            orbit_started_at: env.time,
        };
        self.state = Some(state);
        log::debug!("flow-field reset (seed {}) heading {heading:.3}", self.seed);
        state
    }
}

impl MotionStrategy for FlowFieldStrategy {
    fn id(&self) -> &'static str {
        FLOW_FIELD_ID
    }

    fn step(&mut self, env: &MotionEnvironment) -> StrategyUpdateResult {
        let mut state = match self.state {
            Some(state) => state,
            None => self.restart(env),
        };
        let meta = advance(&self.config, &mut self.rng, &mut state, env);
        self.state = Some(state);
        StrategyUpdateResult {
            position: state.position,
            velocity: state.velocity,
            heading: Some(state.heading),
            meta: Some(meta),
        }
    }

    fn reset(&mut self, env: &MotionEnvironment) {
        self.restart(env);
    }
}

/// Cheap continuous stand-in for Perlin noise; bounded to `[-1, 1]`.
#[must_use]
pub fn noise(x: f64, y: f64, t: f64) -> f64 {
    (x + t * NOISE_TIME_X).sin() * NOISE_Y_SCALE.mul_add(y, -t * NOISE_TIME_Y).cos()
}

/// Curl `(∂n/∂y, −∂n/∂x)` of [`noise`] by central differences.
#[must_use]
pub fn curl(point: Vec2, t: f64) -> Vec2 {
    let e = CURL_EPSILON;
    let dn_dy = (noise(point.x, point.y + e, t) - noise(point.x, point.y - e, t)) / (2.0 * e);
    let dn_dx = (noise(point.x + e, point.y, t) - noise(point.x - e, point.y, t)) / (2.0 * e);
    Vec2::new(dn_dy, -dn_dx)
}

fn advance(
    cfg: &FlowFieldConfig,
    rng: &mut SeededRandom,
    state: &mut FlowFieldState,
    env: &MotionEnvironment,
) -> StepMeta {
    let dt = env.clamped_delta();
    let field_time = env.time * cfg.time_scale;

    let curl_force = curl(state.position * cfg.noise_scale, field_time);
    let raw = state.velocity + curl_force * cfg.curl_strength;
    let direction = raw
        .normalized()
        .unwrap_or_else(|| Vec2::from_angle(state.heading));
    let mut cruise = direction * cfg.base_speed;

    if cfg.turn_persistence > 0.0 {
        if rng.next_f64() < dt / cfg.turn_persistence {
            state.turn_sign = -state.turn_sign;
        }
        let turn = (state.turn_sign * cfg.min_turn_rate)
            .mul_add(dt, cfg.turn_jitter * dt.sqrt() * rng.gaussian());
        cruise = cruise.rotated(turn);
    }

    if cfg.orbit_blend > 0.0 {
        cruise = orbit_steer(cfg, state, env, dt, cruise);
    }

    let mut target = cruise
        + soft_wall_push(
            state.position,
            env.width,
            env.height,
            cfg.wall_padding,
            cfg.wall_stiffness,
        );
    if let Some(mouse) = env.mouse {
        target += pointer_avoidance(
            state.position,
            mouse,
            cfg.mouse_avoidance_radius,
            cfg.mouse_avoidance_strength,
        );
    }

    state.velocity += (target - state.velocity) * (1.0 - cfg.smoothing);
    state.position += state.velocity * dt;

    if let Some(mouse) = env.mouse
        && let Some(hit) = pointer_collision(
            state.position,
            state.velocity,
            mouse,
            cfg.mouse_collision_radius,
            cfg.mouse_collision_damping,
        )
    {
        state.position = hit.position;
        state.velocity = hit.velocity;
    }

    if contain(
        &mut state.position,
        &mut state.velocity,
        env.width,
        env.height,
        cfg.boundary_padding,
        FLOW_RESTITUTION,
    ) {
        log::trace!("flow-field boundary correction at {:?}", state.position);
    }

    if let Some(heading) = state.velocity.normalized() {
        state.heading = heading.angle();
    }

    StepMeta::FlowField {
        turn_sign: state.turn_sign,
        orbit_phase: state.orbit_phase,
        curl: curl_force,
    }
}

/// Blend the cruise velocity with a pull toward a slowly breathing circle
/// around the viewport centre.
fn orbit_steer(
    cfg: &FlowFieldConfig,
    state: &mut FlowFieldState,
    env: &MotionEnvironment,
    dt: f64,
    cruise: Vec2,
) -> Vec2 {
    state.orbit_phase = (TAU * cfg.orbit_drift_hz).mul_add(dt, state.orbit_phase) % TAU;

    let elapsed = (env.time - state.orbit_started_at).max(0.0);
    let ramp = if cfg.orbit_build_up_period > 0.0 {
        (elapsed / cfg.orbit_build_up_period).min(1.0)
    } else {
        1.0
    };
    let wobble = cfg
        .orbit_radius_drift
        .mul_add(state.orbit_phase.sin(), 1.0);
    let radius = (cfg.orbit_radius * ramp * wobble).max(ORBIT_MIN_RADIUS);

    let offset = state.position - env.center();
    let Some(radial) = offset.normalized() else {
        return cruise;
    };
    let tangent = radial.perp() * state.turn_sign;
    let correction = (radius - offset.length()) / radius;
    let orbit = (tangent + radial * correction)
        .normalized()
        .unwrap_or(tangent)
        * cfg.base_speed;

    let blended = cruise * (1.0 - cfg.orbit_blend) + orbit * cfg.orbit_blend;
    let mut direction = blended.normalized().unwrap_or(tangent);
    if cfg.turn_centering > 0.0 {
        let heading = direction.angle();
        let nudge = wrap_angle(tangent.angle() - heading) * (cfg.turn_centering * dt).min(1.0);
        direction = Vec2::from_angle(heading + nudge);
    }
    direction * cfg.base_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(time: f64) -> MotionEnvironment {
        MotionEnvironment::new(800.0, 600.0, time, 0.016)
    }

    #[test]
    fn noise_is_bounded() {
        for i in 0..200 {
            let v = f64::from(i) * 0.37;
            let n = noise(v, -v * 1.3, v * 0.1);
            assert!((-1.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn curl_matches_analytic_derivatives() {
        let point = Vec2::new(0.4, 1.1);
        let t = 2.0;
        let c = curl(point, t);
        let a = point.x + t * 0.1;
        let b = 0.7 * point.y - t * 0.05;
        let dn_dx = a.cos() * b.cos();
        let dn_dy = -0.7 * a.sin() * b.sin();
        assert!((c.x - dn_dy).abs() < 1e-6);
        assert!((c.y + dn_dx).abs() < 1e-6);
    }

    #[test]
    fn curl_is_divergence_free() {
        let e = 1e-3;
        for (x, y) in [(0.1, 0.2), (1.5, -0.7), (3.0, 2.2)] {
            let div = (curl(Vec2::new(x + e, y), 0.5).x - curl(Vec2::new(x - e, y), 0.5).x)
                / (2.0 * e)
                + (curl(Vec2::new(x, y + e), 0.5).y - curl(Vec2::new(x, y - e), 0.5).y)
                    / (2.0 * e);
            assert!(div.abs() < 1e-3, "divergence {div} at ({x}, {y})");
        }
    }

    #[test]
    fn rejects_out_of_range_smoothing() {
        let config = FlowFieldConfig {
            smoothing: 1.5,
            ..FlowFieldConfig::default()
        };
        assert!(matches!(
            FlowFieldStrategy::new(config, Some(1)),
            Err(MotionConfigError::RangeViolation {
                field: "smoothing",
                ..
            })
        ));
    }

    #[test]
    fn orbit_blend_is_clamped() {
        let config = FlowFieldConfig {
            orbit_blend: 4.0,
            ..FlowFieldConfig::default()
        };
        let flow = FlowFieldStrategy::new(config, Some(1)).unwrap();
        assert!((flow.config().orbit_blend - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn turn_sign_flips_with_short_persistence() {
        let config = FlowFieldConfig {
            turn_persistence: 0.01,
            ..FlowFieldConfig::default()
        };
        let mut flow = FlowFieldStrategy::new(config, Some(11)).unwrap();
        flow.reset(&env(0.0));
        let mut signs = Vec::new();
        for i in 0..200 {
            flow.step(&env(f64::from(i) * 0.016));
            signs.push(flow.state().unwrap().turn_sign);
        }
        assert!(signs.iter().any(|s| *s > 0.0));
        assert!(signs.iter().any(|s| *s < 0.0));
    }

    #[test]
    fn orbit_pulls_agent_onto_ring() {
        let config = FlowFieldConfig {
            curl_strength: 0.0,
            orbit_blend: 1.0,
            orbit_radius: 150.0,
            orbit_radius_drift: 0.0,
            orbit_build_up_period: 0.0,
            smoothing: 0.5,
            wall_stiffness: 0.0,
            ..FlowFieldConfig::default()
        };
        let mut flow = FlowFieldStrategy::new(config, Some(4)).unwrap();
        flow.reset(&env(0.0));
        flow.place(Vec2::new(400.0, 100.0), Vec2::new(70.0, 0.0));
        for i in 0..1_500 {
            flow.step(&env(f64::from(i) * 0.016));
        }
        let distance = (flow.state().unwrap().position - Vec2::new(400.0, 300.0)).length();
        assert!(
            (distance - 150.0).abs() < 30.0,
            "agent settled at distance {distance}"
        );
    }

    #[test]
    fn meta_reports_flow_field_diagnostics() {
        let mut flow = FlowFieldStrategy::new(FlowFieldConfig::default(), Some(2)).unwrap();
        let result = flow.step(&env(0.0));
        match result.meta {
            Some(StepMeta::FlowField { turn_sign, curl, .. }) => {
                assert!((turn_sign - 1.0).abs() < f64::EPSILON);
                assert!(curl.is_finite());
            }
            other => panic!("unexpected meta {other:?}"),
        }
    }
}
