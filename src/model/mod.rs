//! Project and settings data model.

pub mod constraints;
pub mod lenient;
pub mod project;
pub mod script;
pub mod settings;

pub use constraints::{ConstraintRule, ProjectConstraints, RuleEdge, Violation};
pub use project::{
    LexiconEntry, MorphologyState, Phoneme, PhonemeKind, PhonologyConfig, ProjectDocument,
    ProjectSeed, SoundChangeRule,
};
pub use script::{ScriptConfig, SpacingMode, TextDirection};
pub use settings::{AppSettings, ColorRole, CustomTheme, Palette, ThemeName};
