/// 9 caractères : la rampe historique, deux W en tête de densité.
pub const RAMP_CLASSIC: &str = " .:nhBXWW";

/// 10 caractères, compact, bon contraste.
pub const RAMP_COMPACT: &str = " .:-=+*#%@";

/// Blocs Unicode, pseudo-pixels.
pub const RAMP_BLOCKS: &str = " ░▒▓█";

/// Named built-in ramps, ordered empty → fully near.
pub const RAMPS: &[(&str, &str)] = &[
    ("classic", RAMP_CLASSIC),
    ("compact", RAMP_COMPACT),
    ("blocks", RAMP_BLOCKS),
];

/// Resolve a ramp by built-in name.
///
/// # Example
/// ```
/// use dr_core::charset::{ramp_by_name, RAMP_BLOCKS};
/// assert_eq!(ramp_by_name("Blocks"), Some(RAMP_BLOCKS));
/// assert_eq!(ramp_by_name("nope"), None);
/// ```
#[must_use]
pub fn ramp_by_name(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    RAMPS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, ramp)| *ramp)
}

/// Préfixe forçant une rampe littérale, même si elle forme un nom built-in.
pub const LITERAL_PREFIX: &str = "literal:";

/// Resolve a user-supplied ramp: a built-in name (case-insensitive), otherwise
/// the literal symbols. [`LITERAL_PREFIX`] skips the name lookup.
///
/// # Example
/// ```
/// use dr_core::charset::resolve_ramp;
/// assert_eq!(resolve_ramp("classic"), vec![' ', '.', ':', 'n', 'h', 'B', 'X', 'W', 'W']);
/// assert_eq!(resolve_ramp(" #"), vec![' ', '#']);
/// assert_eq!(resolve_ramp("literal:abc"), vec!['a', 'b', 'c']);
/// ```
#[must_use]
pub fn resolve_ramp(input: &str) -> Vec<char> {
    if let Some(symbols) = input.strip_prefix(LITERAL_PREFIX) {
        return symbols.chars().collect();
    }
    ramp_by_name(input).unwrap_or(input).chars().collect()
}
