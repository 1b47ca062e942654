use ron::error::SpannedError;

/// Battlefield-wide toggles, loaded once at startup.
/// Sight blocking and partial cover degrade to permissive values when
/// disabled; reflection is opt-in.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Rules {
    pub sight_blocking: bool,
    pub partial_cover: bool,
    pub damage_reflection: bool,
    /// Engine ticks between unconditional sight-cache clears
    pub cache_clear_ticks: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            sight_blocking: true,
            partial_cover: true,
            damage_reflection: false,
            cache_clear_ticks: 300,
        }
    }
}

impl Rules {
    pub fn from_string(raw: &str) -> Result<Self, SpannedError> {
        ron::from_str(raw)
    }
}
