//! Version upgrades for stored project documents.
//!
//! Documents carry a `version` tag. Older documents are upgraded step by step
//! before the tolerant decoder sees them. Unknown or newer tags pass through
//! untouched: the decoder already ignores what it does not understand.

use std::collections::HashMap;

use log::{debug, warn};
use serde_json::{json, Map, Value};

use crate::error::{Result, StudioError};
use crate::model::project::DOCUMENT_VERSION;

/// Tag assumed for documents that carry none.
pub const LEGACY_VERSION: &str = "1.0";

type MigrationFn = fn(Value) -> Result<Value>;

fn migration_registry() -> HashMap<(&'static str, &'static str), MigrationFn> {
    let mut registry: HashMap<(&'static str, &'static str), MigrationFn> = HashMap::new();
    registry.insert(("1.0", "1.1"), migrate_1_0_to_1_1);
    registry
}

/// All known versions, oldest first.
fn version_order() -> &'static [&'static str] {
    &["1.0", "1.1"]
}

/// Upgrade a raw document to [`DOCUMENT_VERSION`].
///
/// Non-object values are returned unchanged so the decoder can reject them
/// with a proper message.
pub fn migrate_document(mut data: Value) -> Result<Value> {
    if !data.is_object() {
        return Ok(data);
    }

    let current = data
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(LEGACY_VERSION)
        .to_string();

    if current == DOCUMENT_VERSION {
        return Ok(data);
    }

    let path = find_migration_path(&current, DOCUMENT_VERSION);
    if path.is_empty() {
        warn!(
            "Project version '{}' has no migration to {}; loading as-is",
            current, DOCUMENT_VERSION
        );
        return Ok(data);
    }

    let registry = migration_registry();
    for (from, to) in path {
        let migration = registry.get(&(from, to)).ok_or_else(|| {
            StudioError::Internal(format!("migration {} -> {} is not registered", from, to))
        })?;

        data = migration(data).map_err(|e| StudioError::InvalidDocument {
            reason: format!("migration {} -> {} failed: {}", from, to, e),
        })?;

        if let Some(obj) = data.as_object_mut() {
            obj.insert("version".to_string(), Value::String(to.to_string()));
        }
        debug!("Migrated project document {} -> {}", from, to);
    }

    Ok(data)
}

/// Sequence of registered steps from `from` to `to`; empty when none exists
/// or when `from` is not older than `to`.
pub fn find_migration_path(from: &str, to: &str) -> Vec<(&'static str, &'static str)> {
    let versions = version_order();
    let registry = migration_registry();

    let (from_idx, to_idx) = match (
        versions.iter().position(|&v| v == from),
        versions.iter().position(|&v| v == to),
    ) {
        (Some(f), Some(t)) if f < t => (f, t),
        _ => return Vec::new(),
    };

    let mut path = Vec::new();
    let mut current_idx = from_idx;

    while current_idx < to_idx {
        let current = versions[current_idx];
        let next = ((current_idx + 1)..=to_idx)
            .find(|&idx| registry.contains_key(&(current, versions[idx])));

        match next {
            Some(next_idx) => {
                path.push((current, versions[next_idx]));
                current_idx = next_idx;
            }
            None => return Vec::new(),
        }
    }

    path
}

/// 1.0 glyphs were single images (`imageUrl`); 1.1 draws every glyph from
/// strokes, so the image becomes one full-size image stroke.
fn migrate_1_0_to_1_1(mut data: Value) -> Result<Value> {
    let glyphs = data
        .pointer_mut("/scriptConfig/glyphs")
        .and_then(Value::as_array_mut);

    if let Some(glyphs) = glyphs {
        for glyph in glyphs.iter_mut().filter_map(Value::as_object_mut) {
            migrate_glyph(glyph);
        }
    }

    Ok(data)
}

fn migrate_glyph(glyph: &mut Map<String, Value>) {
    let has_strokes = glyph
        .get("strokes")
        .and_then(Value::as_array)
        .is_some_and(|s| !s.is_empty());
    if has_strokes {
        return;
    }

    let Some(url) = glyph.remove("imageUrl") else {
        return;
    };
    let Some(url) = url.as_str().filter(|u| !u.is_empty()).map(str::to_string) else {
        return;
    };

    let id = format!(
        "img-{}",
        glyph.get("char").and_then(Value::as_str).unwrap_or("glyph")
    );
    glyph.insert(
        "strokes".to_string(),
        json!([{
            "id": id,
            "type": "image",
            "d": "",
            "x": 0,
            "y": 0,
            "width": 100,
            "height": 100,
            "strokeWidth": 0,
            "cap": "round",
            "color": "#ffffff",
            "visible": true,
            "locked": false,
            "imageUrl": url
        }]),
    );
}
