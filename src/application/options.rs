//! Options consumed when building applications and connecting hybrids.

use serde::{Deserialize, Serialize};

use crate::net::{AutoListen, AutoListenPolicy};

/// Options of the primary application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationOptions {
    /// Retry on the next port when the requested one is busy.
    /// See [`AutoListenPolicy`] for how each shape is read.
    pub auto_listen: Option<AutoListen>,
}

impl ApplicationOptions {
    pub fn with_auto_listen(mut self, auto_listen: AutoListen) -> Self {
        self.auto_listen = Some(auto_listen);
        self
    }

    pub fn auto_listen_policy(&self) -> AutoListenPolicy {
        AutoListenPolicy::from_option(self.auto_listen.as_ref())
    }
}

/// How a hybrid microservice attaches to its parent.
///
/// Read once by `connect_microservice`; changing it afterwards has no effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HybridOptions {
    /// Share the parent's config instance instead of starting from an empty one.
    pub inherit_app_config: bool,
    /// Return the microservice uninitialized; the caller initializes it later.
    pub defer_initialization: bool,
}

impl HybridOptions {
    pub fn inherit_app_config() -> Self {
        Self {
            inherit_app_config: true,
            ..Self::default()
        }
    }

    pub fn deferred() -> Self {
        Self {
            defer_initialization: true,
            ..Self::default()
        }
    }
}
