//! A name-keyed factory map for congestion control algorithms.
//!
//! 以名称为键的拥塞控制算法工厂映射。

use crate::congestion::{CongestionControl, LinuxReno};
use crate::error::{Error, Result};
use dashmap::DashMap;
use tracing::{debug, warn};

/// Constructs a default-configured instance of one algorithm.
pub type AlgorithmConstructor = fn() -> Box<dyn CongestionControl>;

fn new_linux_reno() -> Box<dyn CongestionControl> {
    Box::new(LinuxReno::new())
}

/// Maps algorithm names to constructors. Registration and lookup may happen
/// from several threads at once.
///
/// 将算法名称映射到构造函数。
#[derive(Debug, Default)]
pub struct Registry {
    constructors: DashMap<String, AlgorithmConstructor>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry containing every algorithm shipped with this crate.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(LinuxReno::NAME, new_linux_reno);
        registry
    }

    /// Registers `constructor` under `name`, returning the constructor it replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        constructor: AlgorithmConstructor,
    ) -> Option<AlgorithmConstructor> {
        let name = name.into();
        let previous = self.constructors.insert(name.clone(), constructor);
        if previous.is_some() {
            warn!(algorithm = %name, "Replacing registered congestion control algorithm");
        } else {
            debug!(algorithm = %name, "Registered congestion control algorithm");
        }
        previous
    }

    /// Creates a fresh instance of the algorithm registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn CongestionControl>> {
        let constructor = *self
            .constructors
            .get(name)
            .ok_or_else(|| Error::UnknownAlgorithm(name.to_string()))?;
        Ok(constructor())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// The registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .constructors
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}
