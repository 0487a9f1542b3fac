//! Motion personalities. Each one implements [`MotionStrategy`] and exposes a
//! `from_params` factory for the registry.
//!
//! [`MotionStrategy`]: crate::types::MotionStrategy

pub mod flow_field;
pub mod zen;

pub use flow_field::{FLOW_FIELD_ID, FlowFieldConfig, FlowFieldState, FlowFieldStrategy};
pub use zen::{ZEN_ID, ZenConfig, ZenState, ZenStrategy};
