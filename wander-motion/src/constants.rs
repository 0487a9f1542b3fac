//! Centralized tuning constants for the wander motion engine.
//!
//! These values pin down the deterministic math shared by every strategy.
//! Per-personality parameters live in the strategy configs; anything that is
//! part of the engine's contract stays here.

// Time stepping ------------------------------------------------------------
pub const DELTA_TIME_MIN: f64 = 0.001;
pub const DELTA_TIME_MAX: f64 = 0.033;

// Seeded random source -----------------------------------------------------
pub(crate) const LCG_MULTIPLIER: u32 = 1_664_525;
pub(crate) const LCG_INCREMENT: u32 = 1_013_904_223;
pub(crate) const LCG_MODULUS: f64 = 4_294_967_296.0;

// Zen ----------------------------------------------------------------------
pub const ZEN_PAUSE_DECAY: f64 = 0.88;
pub const ZEN_RESTITUTION: f64 = 0.8;
pub(crate) const ZEN_FLOW_PHASE_OFFSET: f64 = 1.3;
pub(crate) const ZEN_FLOW_TIME_X: f64 = 0.3;
pub(crate) const ZEN_FLOW_TIME_Y: f64 = 0.25;
pub(crate) const ZEN_FLOW_CROSS_SCALE: f64 = 0.7;

// Flow field ---------------------------------------------------------------
pub const FLOW_RESTITUTION: f64 = 0.7;
pub const CURL_EPSILON: f64 = 1e-4;
pub(crate) const NOISE_TIME_X: f64 = 0.1;
pub(crate) const NOISE_TIME_Y: f64 = 0.05;
pub(crate) const NOISE_Y_SCALE: f64 = 0.7;
pub(crate) const ORBIT_MIN_RADIUS: f64 = 1.0;

// Numeric guards -----------------------------------------------------------
pub(crate) const VECTOR_EPSILON: f64 = 1e-9;
