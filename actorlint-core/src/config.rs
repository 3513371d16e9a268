//! Configuration loading from actorlint.toml.
//!
//! Every knob the two analyses recognize lives here; the defaults reproduce
//! the fixed constants of the checks (actor_core send identities, the
//! `Program` entry-point convention, Test/Spec naming markers).

use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{ActorlintError, ActorlintResult, IoResultExt};

/// Conventional entry-point type name, never flagged as unused.
pub const DEFAULT_ENTRY_POINT: &str = "Program";

/// Naming markers identifying test/spec types and namespaces.
pub const DEFAULT_MARKERS: &[&str] = &["Test", "Spec"];

/// File extensions scanned by the textual usage fallback.
pub const DEFAULT_CONFIG_EXTENSIONS: &[&str] = &["conf", "toml"];

/// Method name of the general-purpose send operation.
pub const DEFAULT_TARGET_METHOD: &str = "tell";

/// The send operation as declared on the `CanTell` trait.
pub const CAN_TELL_IDENTITY: &str = "actor_core::CanTell::tell";

/// The send operation as declared on the concrete `ActorRef` type.
pub const ACTOR_REF_IDENTITY: &str = "actor_core::ActorRef::tell";

/// The static/UFCS form of the send operation; the recipient is an explicit
/// leading argument, so the message sits one position later.
pub const TELL_EXT_IDENTITY: &str = "actor_core::TellExt::tell";

/// Qualified-name prefix of the protected internal message trait.
pub const SYSTEM_MESSAGE_INTERFACE: &str = "actor_core::system::SystemMessage";

/// Main configuration structure for actorlint.toml.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ActorlintConfig {
    /// Unused-type detector configuration.
    #[serde(default)]
    pub unused: UnusedConfig,
    /// Send-rule analyzer configuration.
    #[serde(default)]
    pub sendrule: SendRuleConfig,
}

/// Configuration of the unused-type detector.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UnusedConfig {
    /// Simple type name treated as the application entry point.
    pub entry_point: String,
    /// Name fragments excluding test/spec types (matched case-insensitively
    /// against type names, base-type names, and namespace paths).
    pub markers: Vec<String>,
    /// File extensions included in the configuration-file fallback scan.
    pub config_extensions: Vec<String>,
}

impl Default for UnusedConfig {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            markers: DEFAULT_MARKERS.iter().map(|s| s.to_string()).collect(),
            config_extensions: DEFAULT_CONFIG_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Configuration of the send-rule analyzer.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SendRuleConfig {
    /// Method name the syntactic filter matches (case-sensitive, exact).
    pub target_method: String,
    /// Fully-qualified callee identities that all expose the same logical
    /// send operation.
    pub allowed_callees: Vec<String>,
    /// Qualified-name prefix of the forbidden message interface.
    pub forbidden_interface: String,
}

impl Default for SendRuleConfig {
    fn default() -> Self {
        Self {
            target_method: DEFAULT_TARGET_METHOD.to_string(),
            allowed_callees: vec![
                CAN_TELL_IDENTITY.to_string(),
                ACTOR_REF_IDENTITY.to_string(),
                TELL_EXT_IDENTITY.to_string(),
            ],
            forbidden_interface: SYSTEM_MESSAGE_INTERFACE.to_string(),
        }
    }
}

/// Loads configuration from actorlint.toml if it exists; defaults otherwise.
///
/// Failures are recoverable: callers fall back to the defaults.
pub fn load_config(root: &Path) -> ActorlintResult<ActorlintConfig> {
    let path = root.join("actorlint.toml");
    if !path.exists() {
        return Ok(ActorlintConfig::default());
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    let cfg =
        toml::from_str(&content).map_err(|e| ActorlintError::config(&path, e.to_string()))?;
    Ok(cfg)
}
