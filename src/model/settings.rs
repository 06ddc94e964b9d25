//! User preferences and the colour-role contract.
//!
//! Settings live across project switches. The presentation layer reads
//! colours through [`AppSettings::palette`], which always yields a concrete
//! value for every [`ColorRole`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::model::lenient;

/// Interface language used when none is stored.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Named theme preset, or `custom` for the user palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemeName {
    #[default]
    Dark,
    Cappuccino,
    TokyoNight,
    Custom,
}

impl ThemeName {
    pub const ALL: [ThemeName; 4] = [
        ThemeName::Dark,
        ThemeName::Cappuccino,
        ThemeName::TokyoNight,
        ThemeName::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Dark => "dark",
            ThemeName::Cappuccino => "cappuccino",
            ThemeName::TokyoNight => "tokyo-night",
            ThemeName::Custom => "custom",
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeName::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown theme '{}'", s))
    }
}

impl Serialize for ThemeName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ThemeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|e| {
            warn!("{}; using dark", e);
            ThemeName::Dark
        }))
    }
}

/// Semantic colour roles the presentation layer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
    Background,
    Surface,
    Elevated,
    TextPrimary,
    TextSecondary,
    TextTertiary,
    Border,
    Divider,
    Success,
    Warning,
    Error,
    Info,
    Hover,
    Disabled,
}

impl ColorRole {
    pub const ALL: [ColorRole; 17] = [
        ColorRole::Primary,
        ColorRole::Secondary,
        ColorRole::Accent,
        ColorRole::Background,
        ColorRole::Surface,
        ColorRole::Elevated,
        ColorRole::TextPrimary,
        ColorRole::TextSecondary,
        ColorRole::TextTertiary,
        ColorRole::Border,
        ColorRole::Divider,
        ColorRole::Success,
        ColorRole::Warning,
        ColorRole::Error,
        ColorRole::Info,
        ColorRole::Hover,
        ColorRole::Disabled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorRole::Primary => "primary",
            ColorRole::Secondary => "secondary",
            ColorRole::Accent => "accent",
            ColorRole::Background => "background",
            ColorRole::Surface => "surface",
            ColorRole::Elevated => "elevated",
            ColorRole::TextPrimary => "text-primary",
            ColorRole::TextSecondary => "text-secondary",
            ColorRole::TextTertiary => "text-tertiary",
            ColorRole::Border => "border",
            ColorRole::Divider => "divider",
            ColorRole::Success => "success",
            ColorRole::Warning => "warning",
            ColorRole::Error => "error",
            ColorRole::Info => "info",
            ColorRole::Hover => "hover",
            ColorRole::Disabled => "disabled",
        }
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorRole {
    type Err = String;

    /// Accepts role names and the older custom-theme keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        let legacy = match key {
            "bgMain" => Some(ColorRole::Background),
            "bgPanel" => Some(ColorRole::Surface),
            "bgHeader" => Some(ColorRole::Elevated),
            "text1" => Some(ColorRole::TextPrimary),
            "text2" => Some(ColorRole::TextSecondary),
            _ => None,
        };
        if let Some(role) = legacy {
            return Ok(role);
        }
        let normalized = key.to_ascii_lowercase().replace('_', "-");
        ColorRole::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| format!("unknown colour role '{}'", key))
    }
}

impl Serialize for ColorRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColorRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A partial user palette. Roles left out fall back to the dark preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomTheme(pub BTreeMap<ColorRole, String>);

impl CustomTheme {
    pub fn get(&self, role: ColorRole) -> Option<&str> {
        self.0.get(&role).map(String::as_str)
    }

    pub fn set(&mut self, role: ColorRole, value: impl Into<String>) {
        self.0.insert(role, value.into());
    }
}

// Unknown keys and non-string colours are dropped one entry at a time.
impl<'de> Deserialize<'de> for CustomTheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let mut theme = CustomTheme::default();
        for (key, value) in raw {
            let Ok(role) = key.parse::<ColorRole>() else {
                warn!("Ignoring unknown custom theme key '{}'", key);
                continue;
            };
            match value {
                Value::String(color) => theme.set(role, color),
                Value::Null => {}
                other => warn!("Ignoring non-string colour for '{}': {}", key, other),
            }
        }
        Ok(theme)
    }
}

/// Every role resolved to a concrete colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(BTreeMap<ColorRole, String>);

impl Palette {
    pub fn get(&self, role: ColorRole) -> &str {
        // Construction fills every role.
        self.0.get(&role).map(String::as_str).unwrap_or("#000000")
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorRole, &str)> {
        self.0.iter().map(|(r, v)| (*r, v.as_str()))
    }
}

/// Built-in preset values; `custom` resolves against the dark preset.
fn preset_color(theme: ThemeName, role: ColorRole) -> &'static str {
    use ColorRole::*;

    let (bg_main, bg_panel, text1, text2, accent) = match theme {
        ThemeName::Cappuccino => ("#f5f1ee", "#ede8e3", "#3d3935", "#8b7d75", "#c17a4a"),
        ThemeName::TokyoNight => ("#1a1b26", "#24283b", "#a9b1d6", "#565f89", "#7aa2f7"),
        ThemeName::Dark | ThemeName::Custom => {
            ("#121212", "#1e1e1e", "#f1f5f9", "#94a3b8", "#3b82f6")
        }
    };

    match role {
        Primary | Accent | Info => accent,
        Secondary | TextSecondary | Border => text2,
        Background => bg_main,
        Surface | Elevated | Hover => bg_panel,
        TextPrimary => text1,
        TextTertiary | Divider | Disabled => match theme {
            ThemeName::Cappuccino => "#b5aaa2",
            _ => "#64748b",
        },
        Success => "#10b981",
        Warning => "#f59e0b",
        Error => "#ef4444",
    }
}

/// Cross-project user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: ThemeName,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<CustomTheme>,

    pub auto_save: bool,
    pub show_line_numbers: bool,

    #[serde(rename = "enableAI")]
    pub enable_ai: bool,

    pub language: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            custom_theme: None,
            auto_save: true,
            show_line_numbers: true,
            enable_ai: true,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl AppSettings {
    /// Decode stored settings key by key over the defaults; a bad key keeps
    /// its default and the others still apply.
    pub fn from_value(value: Value) -> Self {
        lenient::overlay(value, "settings")
    }

    /// Resolve every colour role: custom value, then preset, then dark defaults.
    pub fn palette(&self) -> Palette {
        let custom = match self.theme {
            ThemeName::Custom => self.custom_theme.as_ref(),
            _ => None,
        };
        let map = ColorRole::ALL
            .into_iter()
            .map(|role| {
                let value = custom
                    .and_then(|c| c.get(role))
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| preset_color(self.theme, role));
                (role, value.to_string())
            })
            .collect();
        Palette(map)
    }
}
