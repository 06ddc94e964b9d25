//! Key combinations.
//!
//! Shortcuts are written as `modifier-modifier-key`, e.g. `alt-c`, `ctrl-shift-f1`
//! or `alt--` (Alt with the minus key). Modifiers are `ctrl`, `alt`, `shift`
//! and `meta` (alias `cmd`). Keys are single characters or named keys such as
//! `up`, `esc`, `enter`, `plus`, `comma` and `f1`..`f12`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StudioError};

/// A key press as delivered by the host.
///
/// `key` uses DOM key names (`"c"`, `"ArrowUp"`, `"+"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyEvent {
    /// A key press with no modifiers held.
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            alt: false,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Build the event a combo describes, e.g. `alt-up` → Alt + ArrowUp.
    pub fn parse(input: &str) -> Result<Self> {
        let combo: KeyCombo = input.parse()?;
        Ok(Self {
            key: combo.key,
            alt: combo.alt,
            ctrl: combo.ctrl,
            meta: combo.meta,
            shift: combo.shift,
        })
    }

    /// Lower-cased key, the form kept in the pressed-key set.
    pub fn normalized_key(&self) -> String {
        self.key.to_lowercase()
    }
}

/// A shortcut pattern: required modifiers plus one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub key: String,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyCombo {
    /// Modifiers the combo names must be held; others are not checked.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        (!self.alt || event.alt)
            && (!self.ctrl || event.ctrl)
            && (!self.meta || event.meta)
            && (!self.shift || event.shift)
            && self.key.to_lowercase() == event.normalized_key()
    }
}

impl FromStr for KeyCombo {
    type Err = StudioError;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = |reason: &str| StudioError::InvalidKeyCombo {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let mut combo = KeyCombo {
            key: String::new(),
            alt: false,
            ctrl: false,
            meta: false,
            shift: false,
        };

        let mut rest = input.trim();
        while let Some((prefix, tail)) = rest.split_once('-') {
            if tail.is_empty() {
                break;
            }
            let flag = match prefix.to_ascii_lowercase().as_str() {
                "ctrl" => &mut combo.ctrl,
                "alt" => &mut combo.alt,
                "shift" => &mut combo.shift,
                "meta" | "cmd" => &mut combo.meta,
                _ => break,
            };
            if *flag {
                return Err(invalid(&format!("modifier '{}' repeated", prefix)));
            }
            *flag = true;
            rest = tail;
        }

        if rest.is_empty() {
            return Err(invalid("missing key"));
        }
        combo.key = named_key(rest).ok_or_else(|| invalid(&format!("unknown key '{}'", rest)))?;
        Ok(combo)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (held, name) in [
            (self.ctrl, "ctrl"),
            (self.alt, "alt"),
            (self.shift, "shift"),
            (self.meta, "meta"),
        ] {
            if held {
                write!(f, "{}-", name)?;
            }
        }
        f.write_str(&self.key)
    }
}

/// Map a combo key to its DOM key name.
fn named_key(raw: &str) -> Option<String> {
    let mut chars = raw.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(ch.to_lowercase().to_string());
    }

    let lower = raw.to_ascii_lowercase();
    let named = match lower.as_str() {
        "up" => "ArrowUp",
        "down" => "ArrowDown",
        "left" => "ArrowLeft",
        "right" => "ArrowRight",
        "esc" | "escape" => "Escape",
        "enter" | "return" => "Enter",
        "tab" => "Tab",
        "space" => " ",
        "backspace" => "Backspace",
        "del" | "delete" => "Delete",
        "home" => "Home",
        "end" => "End",
        "pageup" => "PageUp",
        "pagedown" => "PageDown",
        "plus" => "+",
        "minus" => "-",
        "comma" => ",",
        _ => {
            let number = lower.strip_prefix('f')?.parse::<u8>().ok()?;
            return (1..=12)
                .contains(&number)
                .then(|| format!("F{}", number));
        }
    };
    Some(named.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("alt-c", "c", true, false ; "alt and char")]
    #[test_case("Alt-C", "c", true, false ; "case insensitive")]
    #[test_case("alt--", "-", true, false ; "minus key")]
    #[test_case("alt-+", "+", true, false ; "plus key")]
    #[test_case("ctrl-alt-up", "ArrowUp", true, true ; "named key")]
    #[test_case("f5", "F5", false, false ; "function key")]
    fn test_parse_combo(input: &str, key: &str, alt: bool, ctrl: bool) {
        let combo: KeyCombo = input.parse().unwrap();
        assert_eq!(combo.key, key);
        assert_eq!(combo.alt, alt);
        assert_eq!(combo.ctrl, ctrl);
    }

    #[test_case("" ; "empty")]
    #[test_case("alt-" ; "modifier only")]
    #[test_case("alt-alt-c" ; "repeated modifier")]
    #[test_case("hyper-c" ; "unknown modifier")]
    #[test_case("f13" ; "out of range function key")]
    fn test_invalid_combo(input: &str) {
        let err = input.parse::<KeyCombo>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_KEY_COMBO");
    }

    #[test]
    fn test_unnamed_modifiers_are_not_checked() {
        let combo: KeyCombo = "alt-c".parse().unwrap();
        let mut event = KeyEvent::plain("C").with_alt();
        assert!(combo.matches(&event));
        event.shift = true;
        assert!(combo.matches(&event));
        event.alt = false;
        assert!(!combo.matches(&event));
    }

    #[test]
    fn test_event_from_combo() {
        let event = KeyEvent::parse("alt-down").unwrap();
        assert_eq!(event.key, "ArrowDown");
        assert!(event.alt);
        assert_eq!(event.normalized_key(), "arrowdown");
    }

    #[test]
    fn test_display_round_trips() {
        let combo: KeyCombo = "shift-ctrl-x".parse().unwrap();
        assert_eq!(combo.to_string(), "ctrl-shift-x");
    }
}
