//! Input configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Focus-gating policy.
///
/// The global gate masks every device; the per-device flags layer under
/// it, so a device is gated when either its own flag or the global flag
/// asks for focus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Gate all devices on window focus.
    #[serde(default = "default_true")]
    pub focused_input_only: bool,
    /// Gate the keyboard on window focus.
    #[serde(default)]
    pub focused_keyboard_only: bool,
    /// Gate the pointer on window focus.
    #[serde(default)]
    pub focused_pointer_only: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            focused_input_only: true,
            focused_keyboard_only: false,
            focused_pointer_only: false,
        }
    }
}

/// Input system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    /// Focus-gating policy
    #[serde(default)]
    pub focus: FocusConfig,
}

impl InputConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Profiles are loaded from config files in the following order:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{profile}.toml (profile-specific overrides)
    /// 3. Environment variables with prefix KEYWIRE_ (e.g.,
    ///    KEYWIRE_FOCUS__FOCUSED_INPUT_ONLY=false)
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", profile)).required(false))
            // Use __ as separator for nested fields
            .add_source(
                Environment::with_prefix("KEYWIRE")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("profile", profile)?
            .build()?;

        config.try_deserialize()
    }

    /// Loads configuration using the KEYWIRE_PROFILE environment variable,
    /// defaulting to "debug" if not set
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var("KEYWIRE_PROFILE").unwrap_or_else(|_| "debug".to_string());
        Self::load(&profile)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self::load("debug").unwrap_or_else(|_| Self {
            profile: "debug".to_string(),
            focus: FocusConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_focus_gating() {
        let focus = FocusConfig::default();
        assert!(focus.focused_input_only);
        assert!(!focus.focused_keyboard_only);
        assert!(!focus.focused_pointer_only);
    }
}
