//! Identifier mangling for the Python output.

/// Python keywords and soft keywords, per the 3.12 grammar.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "case", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "match", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "type", "while", "with", "yield", "_",
];

/// Prefix applied to identifiers that would collide with a keyword or
/// shadow a dunder/private name.
const MANGLE_PREFIX: &str = "rune_attr_";

/// Maps a model identifier to a collision-safe Python identifier.
///
/// Identifiers that collide with a Python keyword or begin with an
/// underscore are prefixed; everything else passes through unchanged.
/// Never applied to already-qualified dotted names.
#[must_use]
pub fn mangle_name(name: &str) -> String {
    if PYTHON_KEYWORDS.contains(&name) || name.starts_with('_') {
        format!("{MANGLE_PREFIX}{name}")
    } else {
        name.to_string()
    }
}
