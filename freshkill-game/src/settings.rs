//! Clan settings that steer a feeding pass.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    #[serde(rename = "classic")]
    Classic,
    #[serde(rename = "expanded")]
    Expanded,
    #[serde(rename = "cruel season")]
    CruelSeason,
}

impl GameMode {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Expanded => "expanded",
            Self::CruelSeason => "cruel season",
        }
    }

    /// Expanded rules apply in expanded and cruel season modes.
    #[must_use]
    pub const fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded | Self::CruelSeason)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GameMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "classic" => Ok(Self::Classic),
            "expanded" => Ok(Self::Expanded),
            "cruel season" | "cruel_season" => Ok(Self::CruelSeason),
            other => Err(SettingsError::UnknownGameMode(other.to_string())),
        }
    }
}

/// Optional layer fed before the ordering tactic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedingPriority {
    SickInjuredFirst,
    HunterFirst,
}

impl FeedingPriority {
    pub const ALL: [Self; 2] = [Self::SickInjuredFirst, Self::HunterFirst];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SickInjuredFirst => "sick_injured_first",
            Self::HunterFirst => "hunter_first",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedingTactic {
    #[default]
    LowRank,
    HighRank,
    YoungestFirst,
    OldestFirst,
    HungriestFirst,
    ExperienceFirst,
}

impl FeedingTactic {
    pub const ALL: [Self; 6] = [
        Self::LowRank,
        Self::HighRank,
        Self::YoungestFirst,
        Self::OldestFirst,
        Self::HungriestFirst,
        Self::ExperienceFirst,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::LowRank => "low_rank",
            Self::HighRank => "high_rank",
            Self::YoungestFirst => "youngest_first",
            Self::OldestFirst => "oldest_first",
            Self::HungriestFirst => "hungriest_first",
            Self::ExperienceFirst => "experience_first",
        }
    }
}

/// A raw clan toggle as stored by the surrounding game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToggleValue {
    Flag(bool),
    Text(String),
}

impl From<bool> for ToggleValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for ToggleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("feeding priorities {first} and {second} are both enabled")]
    ConflictingPriority {
        first: &'static str,
        second: &'static str,
    },
    #[error("feeding tactics {first} and {second} are both enabled")]
    ConflictingTactic {
        first: &'static str,
        second: &'static str,
    },
    #[error("unknown game mode {0:?}")]
    UnknownGameMode(String),
    #[error("toggle {name} must be a {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanSettings {
    #[serde(default)]
    pub game_mode: GameMode,
    #[serde(default)]
    pub ration_prey: bool,
    #[serde(default = "default_auto_feed")]
    pub auto_feed: bool,
    #[serde(default)]
    pub priority: Option<FeedingPriority>,
    #[serde(default)]
    pub tactic: FeedingTactic,
}

const fn default_auto_feed() -> bool {
    true
}

impl Default for ClanSettings {
    fn default() -> Self {
        Self::new(GameMode::Classic)
    }
}

impl ClanSettings {
    #[must_use]
    pub const fn new(game_mode: GameMode) -> Self {
        Self {
            game_mode,
            ration_prey: false,
            auto_feed: true,
            priority: None,
            tactic: FeedingTactic::LowRank,
        }
    }

    #[must_use]
    pub const fn with_tactic(mut self, tactic: FeedingTactic) -> Self {
        self.tactic = tactic;
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: FeedingPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn with_rationing(mut self, ration_prey: bool) -> Self {
        self.ration_prey = ration_prey;
        self
    }

    #[must_use]
    pub const fn with_auto_feed(mut self, auto_feed: bool) -> Self {
        self.auto_feed = auto_feed;
        self
    }

    /// Parse settings from named toggles. Toggles this module does not know
    /// about are ignored; at most one priority and one tactic may be on.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] for conflicting switches, an unknown game
    /// mode, or a toggle holding the wrong kind of value.
    pub fn from_toggles<'a, I>(toggles: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (&'a str, &'a ToggleValue)>,
    {
        let mut settings = Self::new(GameMode::Classic);
        let mut tactic: Option<FeedingTactic> = None;

        for (name, value) in toggles {
            match name {
                "game_mode" => {
                    settings.game_mode = text(name, value)?.parse()?;
                }
                "ration_prey" => settings.ration_prey = flag(name, value)?,
                "auto_feed" => settings.auto_feed = flag(name, value)?,
                _ => {
                    if let Some(priority) = FeedingPriority::ALL.into_iter().find(|p| p.key() == name) {
                        if flag(name, value)? {
                            if let Some(existing) = settings.priority.filter(|p| *p != priority) {
                                return Err(SettingsError::ConflictingPriority {
                                    first: existing.key(),
                                    second: priority.key(),
                                });
                            }
                            settings.priority = Some(priority);
                        }
                    } else if let Some(candidate) = FeedingTactic::ALL.into_iter().find(|t| t.key() == name) {
                        if flag(name, value)? {
                            if let Some(existing) = tactic.filter(|t| *t != candidate) {
                                return Err(SettingsError::ConflictingTactic {
                                    first: existing.key(),
                                    second: candidate.key(),
                                });
                            }
                            tactic = Some(candidate);
                        }
                    } else {
                        log::debug!("ignoring unrelated clan toggle {name}");
                    }
                }
            }
        }

        settings.tactic = tactic.unwrap_or_default();
        Ok(settings)
    }
}

fn flag(name: &str, value: &ToggleValue) -> Result<bool, SettingsError> {
    match value {
        ToggleValue::Flag(on) => Ok(*on),
        ToggleValue::Text(_) => Err(SettingsError::WrongType {
            name: name.to_string(),
            expected: "boolean",
        }),
    }
}

fn text<'v>(name: &str, value: &'v ToggleValue) -> Result<&'v str, SettingsError> {
    match value {
        ToggleValue::Text(text) => Ok(text),
        ToggleValue::Flag(_) => Err(SettingsError::WrongType {
            name: name.to_string(),
            expected: "string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn toggles(pairs: &[(&str, ToggleValue)]) -> BTreeMap<String, ToggleValue> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    fn parse(map: &BTreeMap<String, ToggleValue>) -> Result<ClanSettings, SettingsError> {
        ClanSettings::from_toggles(map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    #[test]
    fn empty_toggles_use_defaults() {
        let settings = parse(&BTreeMap::new()).unwrap();
        assert_eq!(settings.game_mode, GameMode::Classic);
        assert_eq!(settings.tactic, FeedingTactic::LowRank);
        assert!(settings.auto_feed);
        assert!(settings.priority.is_none());
    }

    #[test]
    fn toggles_map_onto_settings() {
        let map = toggles(&[
            ("game_mode", "cruel season".into()),
            ("ration_prey", true.into()),
            ("auto_feed", false.into()),
            ("hunter_first", true.into()),
            ("sick_injured_first", false.into()),
            ("oldest_first", true.into()),
            ("low_rank", false.into()),
            ("show_fullscreen", true.into()),
        ]);
        let settings = parse(&map).unwrap();
        assert_eq!(settings.game_mode, GameMode::CruelSeason);
        assert!(settings.ration_prey);
        assert!(!settings.auto_feed);
        assert_eq!(settings.priority, Some(FeedingPriority::HunterFirst));
        assert_eq!(settings.tactic, FeedingTactic::OldestFirst);
    }

    #[test]
    fn conflicting_switches_are_rejected() {
        let map = toggles(&[("high_rank", true.into()), ("youngest_first", true.into())]);
        assert!(matches!(parse(&map), Err(SettingsError::ConflictingTactic { .. })));

        let map = toggles(&[("hunter_first", true.into()), ("sick_injured_first", true.into())]);
        assert!(matches!(parse(&map), Err(SettingsError::ConflictingPriority { .. })));
    }

    #[test]
    fn bad_values_are_rejected() {
        let map = toggles(&[("game_mode", "endless".into())]);
        assert_eq!(
            parse(&map),
            Err(SettingsError::UnknownGameMode("endless".to_string()))
        );
        let map = toggles(&[("ration_prey", "yes".into())]);
        assert!(matches!(parse(&map), Err(SettingsError::WrongType { .. })));
    }

    #[test]
    fn game_mode_serializes_with_spaces() {
        let json = serde_json::to_string(&GameMode::CruelSeason).unwrap();
        assert_eq!(json, "\"cruel season\"");
    }
}
