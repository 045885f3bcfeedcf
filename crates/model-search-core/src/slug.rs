//! Type-name slugs.
//!
//! Index type names are derived from a model's simple name. Accented
//! Latin-1 letters fold to their base letter, any other character that is
//! not an ASCII word character, whitespace or a hyphen is dropped, runs of
//! whitespace and hyphens collapse into one hyphen, and the result is
//! lowercased.

/// Base letter of a Latin-1 letter that decomposes into one plus a
/// combining mark. `Ø`, `Æ` and `ß` have no such form.
fn fold_accent(ch: char) -> Option<char> {
    let base = match ch {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

/// Slugify a model name. May return an empty string.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        let ch = fold_accent(ch).unwrap_or(ch);
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }
    slug
}
