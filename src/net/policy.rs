//! Auto-listen policy.
//!
//! `auto_listen` may be given as a literal boolean or as a table:
//!
//! | option                          | retries on busy port |
//! |---------------------------------|----------------------|
//! | omitted                         | yes                  |
//! | `true`                          | yes                  |
//! | `false`                         | no                   |
//! | `{}` (no `enabled` key)         | no                   |
//! | `{ enabled = true }`            | yes                  |
//!
//! A table without `enabled` deliberately means *disabled*: supplying
//! settings is treated as opting into explicit control.

use serde::{Deserialize, Serialize};

/// Consecutive busy ports tolerated before giving up.
pub const DEFAULT_MAX_PORT_ATTEMPTS: u32 = 50;

/// Auto-listen option as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AutoListen {
    Enabled(bool),
    Settings(AutoListenSettings),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AutoListenSettings {
    pub enabled: Option<bool>,
    pub max_attempts: Option<u32>,
}

/// Resolved policy consumed by the port binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoListenPolicy {
    pub enabled: bool,
    pub max_attempts: u32,
}

impl AutoListenPolicy {
    pub fn from_option(option: Option<&AutoListen>) -> Self {
        match option {
            None => Self::default(),
            Some(AutoListen::Enabled(enabled)) => Self {
                enabled: *enabled,
                ..Self::default()
            },
            Some(AutoListen::Settings(settings)) => Self {
                enabled: settings.enabled.unwrap_or(false),
                max_attempts: settings
                    .max_attempts
                    .unwrap_or(DEFAULT_MAX_PORT_ATTEMPTS)
                    .max(1),
            },
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for AutoListenPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_MAX_PORT_ATTEMPTS,
        }
    }
}
