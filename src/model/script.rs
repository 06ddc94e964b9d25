//! Writing-system configuration.

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::model::lenient;

/// Name of the script created for fresh projects.
pub const DEFAULT_SCRIPT_NAME: &str = "Standard Script";

/// Text direction of the conscript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
    Ttb,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
            TextDirection::Ttb => "ttb",
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ltr" => Ok(TextDirection::Ltr),
            "rtl" => Ok(TextDirection::Rtl),
            "ttb" => Ok(TextDirection::Ttb),
            other => Err(format!("unknown text direction '{}'", other)),
        }
    }
}

impl Serialize for TextDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Unknown directions degrade to left-to-right instead of rejecting the script.
impl<'de> Deserialize<'de> for TextDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|e| {
            warn!("{}; using ltr", e);
            TextDirection::Ltr
        }))
    }
}

/// Glyph advance mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingMode {
    Mono,
    #[default]
    Proportional,
}

/// Drawing primitive of a glyph layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    #[default]
    Path,
    Rect,
    Circle,
    Line,
    Image,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeCap {
    #[default]
    Round,
    Square,
}

/// One layer of a glyph drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlyphStroke {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "lenient::or_default")]
    pub kind: StrokeKind,
    /// Path data for paths and lines.
    #[serde(deserialize_with = "lenient::or_default")]
    pub d: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub x: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub y: Option<f64>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub width: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub height: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub radius: Option<f64>,
    #[serde(deserialize_with = "stroke_width_or_default")]
    pub stroke_width: f64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub cap: StrokeCap,
    #[serde(deserialize_with = "color_or_default")]
    pub color: String,
    #[serde(deserialize_with = "visible_or_default")]
    pub visible: bool,
    #[serde(deserialize_with = "lenient::or_default")]
    pub locked: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub label: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub image_url: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub opacity: Option<f64>,
}

const DEFAULT_STROKE_WIDTH: f64 = 1.0;
const DEFAULT_STROKE_COLOR: &str = "#ffffff";

fn stroke_width_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient::decode_or(value, || DEFAULT_STROKE_WIDTH))
}

fn color_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient::decode_or(value, || DEFAULT_STROKE_COLOR.to_string()))
}

// A stroke with an unreadable flag stays visible.
fn visible_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient::decode_or(value, || true))
}

impl Default for GlyphStroke {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: StrokeKind::Path,
            d: String::new(),
            x: None,
            y: None,
            width: 0.0,
            height: None,
            radius: None,
            stroke_width: DEFAULT_STROKE_WIDTH,
            cap: StrokeCap::Round,
            color: DEFAULT_STROKE_COLOR.to_string(),
            visible: true,
            locked: false,
            label: None,
            image_url: None,
            opacity: None,
        }
    }
}

/// A conscript glyph mapped to a Latin character and a private-use codepoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptGlyph {
    #[serde(deserialize_with = "lenient::or_default")]
    pub char: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub pua: String,
    #[serde(deserialize_with = "lenient::seq")]
    pub strokes: Vec<GlyphStroke>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub width: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub view_width: Option<f64>,
    /// Pre-1.1 single-image glyphs; migrated into an image stroke on load.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub image_url: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::or_default"
    )]
    pub font_override: Option<bool>,
}

/// Writing-system metadata of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptConfig {
    pub name: String,
    pub direction: TextDirection,
    #[serde(deserialize_with = "lenient::seq")]
    pub glyphs: Vec<ScriptGlyph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_data: Option<String>,
    pub spacing_mode: SpacingMode,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SCRIPT_NAME.to_string(),
            direction: TextDirection::Ltr,
            glyphs: Vec::new(),
            font_family: None,
            font_data: None,
            spacing_mode: SpacingMode::Proportional,
        }
    }
}

impl ScriptConfig {
    /// Glyph bound to a Latin character, if any.
    pub fn glyph_for(&self, ch: &str) -> Option<&ScriptGlyph> {
        self.glyphs.iter().find(|g| g.char == ch)
    }
}
