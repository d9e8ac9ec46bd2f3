/*!
 * Field classification for game-content documents.
 *
 * Decides per map key whether a value is translated externally, looked up in
 * a closed vocabulary, left as canonical mechanics, or passed through. The
 * classification is a pure, total function of the key: every key maps to
 * exactly one class, independent of the value's type.
 */

/// What to do with a string value under a given key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Free text sent to the external service
    Translate,

    /// Stable identifiers, never altered
    Never,

    /// Canonical mechanics tokens; value untouched, children still traversed
    Canonical,

    /// Closed-vocabulary values mapped locally, bypassing the external call
    LocalEnum,

    /// Anything else: unchanged, except unit/glossary localization
    PassThrough,
}

/// Classify a map key.
///
/// `translate_names` demotes the `name` field to pass-through so English
/// names (and the links built from them) stay stable.
pub fn classify(key: &str, translate_names: bool) -> FieldClass {
    match key {
        "name" if !translate_names => FieldClass::Never,
        "name" | "text" | "blurb" | "notes" | "ac_note" | "legendary_actions_intro"
        | "lair_actions_text" | "regional_effects_text" => FieldClass::Translate,
        "id" | "file" | "slug" | "source" => FieldClass::Never,
        "type" | "cr" | "formula" | "proficiency_bonus" | "xp" | "avg" | "to_hit"
        | "reach_ft" | "targets" | "range_ft" | "ability" | "save_dc" => FieldClass::Canonical,
        "size" | "alignment" => FieldClass::LocalEnum,
        _ => FieldClass::PassThrough,
    }
}

/// Map a closed-vocabulary value to its German form, saving quota.
///
/// Returns None for values outside the vocabulary; those fall back to the
/// pass-through path.
pub fn local_enum_value(key: &str, value: &str) -> Option<String> {
    match key {
        "size" => size_de(value).map(str::to_string),
        "alignment" => alignment_de(&value.to_lowercase()).map(str::to_string),
        _ => None,
    }
}

fn size_de(value: &str) -> Option<&'static str> {
    match value {
        "Tiny" => Some("Winzig"),
        "Small" => Some("Klein"),
        "Medium" => Some("Mittelgroß"),
        "Large" => Some("Groß"),
        "Huge" => Some("Riesig"),
        "Gargantuan" => Some("Gigantisch"),
        _ => None,
    }
}

fn alignment_de(value: &str) -> Option<&'static str> {
    match value {
        "lawful good" => Some("rechtschaffen gut"),
        "neutral good" => Some("neutral gut"),
        "chaotic good" => Some("chaotisch gut"),
        "lawful neutral" => Some("rechtschaffen neutral"),
        "neutral" => Some("neutral"),
        "chaotic neutral" => Some("chaotisch neutral"),
        "lawful evil" => Some("rechtschaffen böse"),
        "neutral evil" => Some("neutral böse"),
        "chaotic evil" => Some("chaotisch böse"),
        "unaligned" => Some("ohne Gesinnung"),
        _ => None,
    }
}
