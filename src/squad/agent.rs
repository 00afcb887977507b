//! Per-agent tactical profiles loaded from TOML
//!
//! Profiles define role, stance, and engagement distances. The AI core
//! consumes them as immutable value objects; hosts may load them from data
//! files or build them in code.

use serde::de::{Deserialize, Deserializer};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, RetinueError};

/// Tactical role determining target selection and combat behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Ranged,
    #[default]
    Melee,
    Tank,
    Healer,
}

impl Role {
    /// Lenient parse; unknown strings fall back to Melee
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "ranged" => Role::Ranged,
            "melee" => Role::Melee,
            "tank" => Role::Tank,
            "healer" => Role::Healer,
            _ => Role::Melee,
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Role::parse(&s))
    }
}

/// Positioning stance relative to the leader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    #[default]
    Aggressive,
    Defensive,
    Hold,
}

impl Stance {
    /// Lenient parse; unknown strings fall back to Aggressive
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Stance::Aggressive,
            "defensive" => Stance::Defensive,
            "hold" => Stance::Hold,
            _ => Stance::Aggressive,
        }
    }
}

impl<'de> Deserialize<'de> for Stance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Stance::parse(&s))
    }
}

/// Immutable tactical profile for one agent
///
/// All distances are non-negative tile counts by construction.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Whether this agent is AI-driven at all
    pub enabled: bool,
    pub role: Role,
    pub stance: Stance,
    /// Personal engagement radius for aggressive early pulls (tiles)
    pub aggro_radius: u32,
    /// Maximum drift from the leader before forced recovery (tiles)
    pub leash_radius: u32,
    /// Distance this agent tries to hold to its target for ability use (tiles)
    pub preferred_range: u32,
    /// Kiting threshold against melee threats (tiles)
    pub keep_distance: u32,
    /// Peel radius around protected allies, tank only (tiles)
    pub protect_radius: u32,
    pub attack_ability: Option<String>,
    pub defend_ability: Option<String>,
    pub heal_ability: Option<String>,
    pub buff_ability: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            role: Role::Melee,
            stance: Stance::Aggressive,
            aggro_radius: 8,
            leash_radius: 25,
            preferred_range: 1,
            keep_distance: 4,
            protect_radius: 5,
            attack_ability: None,
            defend_ability: None,
            heal_ability: None,
            buff_ability: None,
        }
    }
}

impl AgentConfig {
    /// Profile with engagement distances that suit the given role
    pub fn for_role(role: Role) -> Self {
        let mut config = Self::default();
        config.role = role;
        match role {
            Role::Ranged => {
                config.preferred_range = 8;
                config.keep_distance = 4;
            }
            Role::Melee => {
                config.preferred_range = 1;
            }
            Role::Tank => {
                config.preferred_range = 1;
                config.protect_radius = 6;
            }
            Role::Healer => {
                config.preferred_range = 7;
            }
        }
        config
    }
}

/// Load a tactical profile from TOML
///
/// Loads from `data/profiles/{name}.toml`
pub fn load_profile(name: &str) -> Result<AgentConfig> {
    if name.is_empty() || name.contains(['/', '\\', '.']) {
        return Err(RetinueError::InvalidProfile(name.to_string()));
    }
    let path = profile_path(name);
    let contents = fs::read_to_string(&path)?;
    let config: AgentConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Get path to a profile file
fn profile_path(name: &str) -> PathBuf {
    PathBuf::from("data/profiles").join(format!("{}.toml", name))
}
