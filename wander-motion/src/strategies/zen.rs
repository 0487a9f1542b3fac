//! Zen personality: Ornstein–Uhlenbeck heading drift with speed breathing,
//! probabilistic pauses and soft steering forces.
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

use crate::config::{MotionConfigError, PauseWindow, at_least, finite, positive, within};
use crate::constants::{
    ZEN_FLOW_CROSS_SCALE, ZEN_FLOW_PHASE_OFFSET, ZEN_FLOW_TIME_X, ZEN_FLOW_TIME_Y,
    ZEN_PAUSE_DECAY, ZEN_RESTITUTION,
};
use crate::forces::{contain, pointer_avoidance, pointer_collision, soft_wall_push, wrap_angle};
use crate::random::SeededRandom;
use crate::types::{MotionEnvironment, MotionStrategy, StepMeta, StrategyUpdateResult, Vec2};

pub const ZEN_ID: &str = "zen";

/// Tuning parameters for [`ZenStrategy`]. Every key is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZenConfig {
    /// Cruising speed in px/s.
    pub base_speed: f64,
    /// OU relaxation time in seconds.
    pub tau: f64,
    /// OU noise strength.
    pub sigma: f64,
    /// Hard bound on angular velocity, rad/s.
    pub max_turn_rate: f64,
    /// Velocity blend rate toward the desired velocity per tick.
    pub ema: f64,
    pub breathe_amp: f64,
    pub breathe_hz: f64,
    /// Pause rate per second.
    pub pause_probability: f64,
    pub pause_duration: PauseWindow,
    pub flow_strength: f64,
    pub flow_scale: f64,
    pub wall_padding: f64,
    pub wall_stiffness: f64,
    /// Inset used by the hard-boundary fallback.
    pub boundary_padding: f64,
    pub mouse_avoidance_radius: f64,
    pub mouse_avoidance_strength: f64,
    pub mouse_collision_radius: f64,
    pub mouse_collision_damping: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

impl Default for ZenConfig {
    fn default() -> Self {
        Self {
            base_speed: 60.0,
            tau: 1.5,
            sigma: 1.2,
            max_turn_rate: 1.8,
            ema: 0.08,
            breathe_amp: 0.2,
            breathe_hz: 0.1,
            pause_probability: 0.04,
            pause_duration: PauseWindow::new(0.8, 2.4),
            flow_strength: 6.0,
            flow_scale: 0.004,
            wall_padding: 80.0,
            wall_stiffness: 60.0,
            boundary_padding: 8.0,
            mouse_avoidance_radius: 140.0,
            mouse_avoidance_strength: 90.0,
            mouse_collision_radius: 28.0,
            mouse_collision_damping: 0.6,
            seed: None,
        }
    }
}

impl ZenConfig {
    /// Reject parameters that would make the simulation degenerate.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), MotionConfigError> {
        at_least("baseSpeed", self.base_speed, 0.0)?;
        positive("tau", self.tau)?;
        at_least("sigma", self.sigma, 0.0)?;
        at_least("maxTurnRate", self.max_turn_rate, 0.0)?;
        within("ema", self.ema, 0.0, 1.0)?;
        within("breatheAmp", self.breathe_amp, 0.0, 1.0)?;
        at_least("breatheHz", self.breathe_hz, 0.0)?;
        finite("pauseProbability", self.pause_probability)?;
        self.pause_duration.validate("pauseDuration")?;
        finite("flowStrength", self.flow_strength)?;
        at_least("flowScale", self.flow_scale, 0.0)?;
        finite("wallPadding", self.wall_padding)?;
        finite("wallStiffness", self.wall_stiffness)?;
        finite("boundaryPadding", self.boundary_padding)?;
        finite("mouseAvoidanceRadius", self.mouse_avoidance_radius)?;
        finite("mouseAvoidanceStrength", self.mouse_avoidance_strength)?;
        finite("mouseCollisionRadius", self.mouse_collision_radius)?;
        finite("mouseCollisionDamping", self.mouse_collision_damping)?;
        Ok(())
    }

    /// Clamp soft parameters into their usable range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.pause_probability = self.pause_probability.max(0.0);
        self.wall_padding = self.wall_padding.max(0.0);
        self.boundary_padding = self.boundary_padding.max(0.0);
        self.mouse_avoidance_radius = self.mouse_avoidance_radius.max(0.0);
        self.mouse_collision_radius = self.mouse_collision_radius.max(0.0);
        self.mouse_collision_damping = self.mouse_collision_damping.clamp(0.0, 1.0);
        self
    }
}

/// Kinematic state owned by one zen runner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZenState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: f64,
    pub drift_velocity: f64,
    pub paused_until: f64,
}

pub struct ZenStrategy {
    config: ZenConfig,
    seed: u32,
    rng: SeededRandom,
    state: Option<ZenState>,
}

impl ZenStrategy {
    /// Build a runner. An explicit `seed` wins over `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration fails validation.
    pub fn new(config: ZenConfig, seed: Option<u32>) -> Result<Self, MotionConfigError> {
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
        let config: ZenConfig = serde_json::from_value(params.clone())?;
        Ok(Box::new(Self::new(config, seed)?))
    }

    #[must_use]
    pub const fn config(&self) -> &ZenConfig {
        &self.config
    }

    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    #[must_use]
    pub const fn state(&self) -> Option<&ZenState> {
        self.state.as_ref()
    }

    /// Move the agent, e.g. after the emblem was dragged. Heading follows the
    /// new velocity when it is non-zero. Ignored before the first reset.
    pub fn place(&mut self, position: Vec2, velocity: Vec2) {
        if let Some(state) = self.state.as_mut() {
            state.position = position;
            state.velocity = velocity;
            if let Some(direction) = velocity.normalized() {
                state.heading = direction.angle();
            }
        }
    }

    fn restart(&mut self, env: &MotionEnvironment) -> ZenState {
        self.rng = SeededRandom::new(Some(self.seed));
        let heading = self.rng.uniform(-PI, PI);
        let state = ZenState {
            position: env.center(),
            velocity: Vec2::from_angle(heading) * self.config.base_speed,
            heading,
            drift_velocity: 0.0,
            paused_until: f64::NEG_INFINITY,
        };
        self.state = Some(state);
        log::debug!("zen reset (seed {}) heading {heading:.3}", self.seed);
        state
    }
}

impl MotionStrategy for ZenStrategy {
    fn id(&self) -> &'static str {
        ZEN_ID
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

fn advance(
    cfg: &ZenConfig,
    rng: &mut SeededRandom,
    state: &mut ZenState,
    env: &MotionEnvironment,
) -> StepMeta {
    let dt = env.clamped_delta();
    let time = env.time;

    let mut paused = time < state.paused_until;
    if !paused && rng.next_f64() < cfg.pause_probability * dt {
        let length = rng.uniform(cfg.pause_duration.min, cfg.pause_duration.max);
        if length > 0.0 {
            state.paused_until = time + length;
            paused = true;
            log::debug!("zen pause {length:.2}s at t={time:.2}");
        }
    }

    let breath = cfg
        .breathe_amp
        .mul_add((TAU * cfg.breathe_hz * time).cos(), 1.0);
    let target_speed = cfg.base_speed * breath;

    if paused {
        state.velocity = state.velocity * ZEN_PAUSE_DECAY;
    } else {
        // Capped at 1 so a relaxation time shorter than the step cannot
        // overshoot and grow without bound.
        let relax = (dt / cfg.tau).min(1.0);
        state.drift_velocity += -state.drift_velocity * relax
            + cfg.sigma * dt.sqrt() * rng.gaussian();

        let target_heading = state.heading + state.drift_velocity * dt;
        let max_turn = cfg.max_turn_rate * dt;
        let delta = wrap_angle(target_heading - state.heading).clamp(-max_turn, max_turn);
        state.heading = wrap_angle(state.heading + delta);

        let mut desired = Vec2::from_angle(state.heading) * target_speed;
        desired += soft_wall_push(
            state.position,
            env.width,
            env.height,
            cfg.wall_padding,
            cfg.wall_stiffness,
        );
        desired += flow_bias(state.position, time, cfg);
        if let Some(mouse) = env.mouse {
            desired += pointer_avoidance(
                state.position,
                mouse,
                cfg.mouse_avoidance_radius,
                cfg.mouse_avoidance_strength,
            );
        }
        state.velocity += (desired - state.velocity) * cfg.ema;
    }

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
        ZEN_RESTITUTION,
    ) {
        if let Some(direction) = state.velocity.normalized() {
            state.heading = direction.angle();
        }
        log::trace!("zen boundary correction at {:?}", state.position);
    }

    StepMeta::Zen {
        paused,
        drift_velocity: state.drift_velocity,
        target_speed,
    }
}

/// Low-frequency sinusoidal bias: two orthogonal sine/cosine products with a
/// phase offset so the field never settles into a fixed pattern.
fn flow_bias(position: Vec2, time: f64, cfg: &ZenConfig) -> Vec2 {
    if cfg.flow_strength == 0.0 {
        return Vec2::ZERO;
    }
    let sx = position.x * cfg.flow_scale;
    let sy = position.y * cfg.flow_scale;
    Vec2::new(
        (sy + time * ZEN_FLOW_TIME_X).sin() * (sx * ZEN_FLOW_CROSS_SCALE).cos(),
        (sx + time * ZEN_FLOW_TIME_Y + ZEN_FLOW_PHASE_OFFSET).cos()
            * (sy * ZEN_FLOW_CROSS_SCALE).sin(),
    ) * cfg.flow_strength
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(time: f64) -> MotionEnvironment {
        MotionEnvironment::new(800.0, 600.0, time, 0.016)
    }

    #[test]
    fn rejects_non_positive_tau() {
        let config = ZenConfig {
            tau: 0.0,
            ..ZenConfig::default()
        };
        assert!(matches!(
            ZenStrategy::new(config, Some(1)),
            Err(MotionConfigError::NonPositive { field: "tau", .. })
        ));
    }

    #[test]
    fn sanitizes_negative_padding() {
        let config = ZenConfig {
            wall_padding: -10.0,
            pause_probability: -1.0,
            mouse_collision_damping: 3.0,
            ..ZenConfig::default()
        };
        let zen = ZenStrategy::new(config, Some(1)).unwrap();
        assert!(zen.config().wall_padding.abs() < f64::EPSILON);
        assert!(zen.config().pause_probability.abs() < f64::EPSILON);
        assert!((zen.config().mouse_collision_damping - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn explicit_seed_overrides_config_seed() {
        let config = ZenConfig {
            seed: Some(9),
            ..ZenConfig::default()
        };
        assert_eq!(ZenStrategy::new(config.clone(), Some(3)).unwrap().seed(), 3);
        assert_eq!(ZenStrategy::new(config, None).unwrap().seed(), 9);
    }

    #[test]
    fn parses_camel_case_params() {
        let params = serde_json::json!({
            "baseSpeed": 42.0,
            "pauseDuration": { "min": 0.1, "max": 0.2 },
            "unknownKey": 1
        });
        let config: ZenConfig = serde_json::from_value(params).unwrap();
        assert!((config.base_speed - 42.0).abs() < f64::EPSILON);
        assert!((config.tau - ZenConfig::default().tau).abs() < f64::EPSILON);
        assert!((config.pause_duration.max - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_starts_at_center_with_base_speed() {
        let mut zen = ZenStrategy::new(ZenConfig::default(), Some(42)).unwrap();
        assert!(zen.state().is_none());
        zen.reset(&env(0.0));
        let state = *zen.state().unwrap();
        assert_eq!(state.position, Vec2::new(400.0, 300.0));
        assert!((state.velocity.length() - 60.0).abs() < 1e-9);
        assert!(state.drift_velocity.abs() < f64::EPSILON);
    }

    #[test]
    fn step_before_reset_initializes_state() {
        let mut zen = ZenStrategy::new(ZenConfig::default(), Some(5)).unwrap();
        let result = zen.step(&env(0.0));
        assert!(zen.state().is_some());
        assert!(result.position.is_finite());
        assert!(matches!(result.meta, Some(StepMeta::Zen { .. })));
    }

    #[test]
    fn reset_replays_the_same_run() {
        let mut zen = ZenStrategy::new(ZenConfig::default(), Some(77)).unwrap();
        zen.reset(&env(0.0));
        let first: Vec<_> = (0..50)
            .map(|i| zen.step(&env(f64::from(i) * 0.016)))
            .collect();
        zen.reset(&env(0.0));
        let second: Vec<_> = (0..50)
            .map(|i| zen.step(&env(f64::from(i) * 0.016)))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn place_moves_agent_and_aligns_heading() {
        let mut zen = ZenStrategy::new(ZenConfig::default(), Some(5)).unwrap();
        zen.place(Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0));
        assert!(zen.state().is_none());
        zen.reset(&env(0.0));
        zen.place(Vec2::new(100.0, 120.0), Vec2::new(0.0, 30.0));
        let state = zen.state().unwrap();
        assert_eq!(state.position, Vec2::new(100.0, 120.0));
        assert!((state.heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn flow_bias_vanishes_without_strength() {
        let cfg = ZenConfig {
            flow_strength: 0.0,
            ..ZenConfig::default()
        };
        assert_eq!(flow_bias(Vec2::new(10.0, 20.0), 3.0, &cfg), Vec2::ZERO);
        let bias = flow_bias(Vec2::new(10.0, 20.0), 3.0, &ZenConfig::default());
        assert!(bias.length() <= ZenConfig::default().flow_strength * 2.0_f64.sqrt());
    }
}
