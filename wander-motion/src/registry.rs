//! Strategy registry: the one place motion personalities are wired in.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::MotionConfigError;
use crate::strategies::{FLOW_FIELD_ID, FlowFieldStrategy, ZEN_ID, ZenStrategy};
use crate::types::MotionStrategy;

/// Constructor for a motion personality: flat parameter record plus an
/// optional seed override.
pub type StrategyFactory =
    fn(&serde_json::Value, Option<u32>) -> Result<Box<dyn MotionStrategy>, MotionConfigError>;

/// Built-in personalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Zen,
    FlowField,
}

impl StrategyKind {
    pub const ALL: [Self; 2] = [Self::Zen, Self::FlowField];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Zen => ZEN_ID,
            Self::FlowField => FLOW_FIELD_ID,
        }
    }

    #[must_use]
    pub fn factory(self) -> StrategyFactory {
        match self {
            Self::Zen => ZenStrategy::from_params,
            Self::FlowField => FlowFieldStrategy::from_params,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = MotionConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| MotionConfigError::UnknownStrategy(s.to_string()))
    }
}

/// Maps strategy type identifiers to their factories.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in personality.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in StrategyKind::ALL {
            registry.register(kind.id(), kind.factory());
        }
        registry
    }

    /// Add or replace a personality.
    pub fn register(&mut self, id: &str, factory: StrategyFactory) {
        self.factories.insert(id.to_string(), factory);
    }

    #[must_use]
    pub fn get_factory(&self, id: &str) -> Option<StrategyFactory> {
        self.factories.get(id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a strategy by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MotionConfigError::UnknownStrategy`] for unregistered ids and
    /// propagates parameter parse/validation failures from the factory.
    pub fn create(
        &self,
        id: &str,
        params: &serde_json::Value,
        seed: Option<u32>,
    ) -> Result<Box<dyn MotionStrategy>, MotionConfigError> {
        let factory = self
            .get_factory(id)
            .ok_or_else(|| MotionConfigError::UnknownStrategy(id.to_string()))?;
        factory(params, seed)
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("ids", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_register_builtin_personalities() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["flow-field", "zen"]);
        assert!(registry.get_factory("zen").is_some());
        assert!(registry.get_factory("sparkle").is_none());
    }

    #[test]
    fn kind_parses_from_identifier() {
        assert_eq!("zen".parse::<StrategyKind>().unwrap(), StrategyKind::Zen);
        assert_eq!(
            "flow-field".parse::<StrategyKind>().unwrap(),
            StrategyKind::FlowField
        );
        assert!("flowfield".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::FlowField.to_string(), "flow-field");
    }

    #[test]
    fn create_reports_unknown_type() {
        let registry = StrategyRegistry::with_defaults();
        let err = registry.create("sparkle", &json!({}), Some(1)).err().unwrap();
        assert!(matches!(err, MotionConfigError::UnknownStrategy(ref id) if id == "sparkle"));
    }

    #[test]
    fn create_builds_strategy_with_matching_id() {
        let registry = StrategyRegistry::with_defaults();
        for kind in StrategyKind::ALL {
            let strategy = registry.create(kind.id(), &json!({}), Some(3)).unwrap();
            assert_eq!(strategy.id(), kind.id());
        }
    }

    #[test]
    fn custom_factories_can_be_registered() {
        let mut registry = StrategyRegistry::new();
        assert!(!registry.contains("calm"));
        registry.register("calm", ZenStrategy::from_params);
        let strategy = registry.create("calm", &json!({ "sigma": 0.0 }), None).unwrap();
        assert_eq!(strategy.id(), "zen");
    }
}
