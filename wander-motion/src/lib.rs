//! Wander Motion Engine
//!
//! Deterministic, seed-reproducible motion strategies for a self-propelled
//! 2D emblem that roams a bounded viewport and reacts to a pointer. The crate
//! performs no rendering, scheduling or I/O: an external frame loop feeds a
//! [`MotionEnvironment`] into [`MotionStrategy::step`] once per tick.

pub mod config;
pub mod constants;
pub mod forces;
pub mod numbers;
pub mod random;
pub mod registry;
pub mod strategies;
pub mod types;

// Re-export commonly used types
pub use config::{MotionConfigError, PauseWindow};
pub use forces::{
    Collision, contain, pointer_avoidance, pointer_collision, soft_wall_push, wall_force,
    wrap_angle,
};
pub use random::SeededRandom;
pub use registry::{StrategyFactory, StrategyKind, StrategyRegistry};
pub use strategies::{
    FlowFieldConfig, FlowFieldState, FlowFieldStrategy, ZenConfig, ZenState, ZenStrategy,
};
pub use types::{
    MotionEnvironment, MotionStrategy, StepMeta, StrategyUpdateResult, Vec2, clamp_delta_time,
};
