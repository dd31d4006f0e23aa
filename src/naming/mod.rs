//! Identifier transformation for generated names.
//!
//! Turns raw catalog identifiers (`user_id`, `ip_address`) into the names the
//! emission stage uses:
//!
//! ```text
//! user_id     → exported "UserID"    camel "userID"    short "ui"
//! ip_address  → exported "IPAddress" camel "ipAddress" short "i"
//! ```
//!
//! Case conversion uses the `inflector` crate; acronym normalization runs
//! afterwards against the fixed [`ACRONYMS`] table.

use inflector::Inflector;

/// Recognized acronyms, applied in this order.
///
/// Each entry replaces the *first* occurrence of the token's title-cased form
/// (`Id`, `Ip`, `Url`) with the upper-case acronym. The replacement is a plain
/// substring replace, so `identity` becomes `IDentity`; the table order decides
/// the outcome when several tokens overlap.
pub static ACRONYMS: &[(&str, &str)] = &[("id", "ID"), ("ip", "IP"), ("url", "URL")];

/// Exported (PascalCase) name with acronyms normalized.
///
/// ```
/// use schemata::naming::exported_name;
///
/// assert_eq!(exported_name("user_id"), "UserID");
/// assert_eq!(exported_name("ip_address"), "IPAddress");
/// ```
pub fn exported_name(name: &str) -> String {
    replace_acronyms(name.to_pascal_case())
}

/// camelCase name with acronyms normalized.
///
/// A leading token stays lower-case (`id` → `id`, `url_path` → `urlPath`)
/// because only title-cased occurrences are rewritten.
pub fn camel_name(name: &str) -> String {
    replace_acronyms(name.to_camel_case())
}

/// Initialism of the exported name.
///
/// Concatenates the lower-cased first letter of every run of upper-case
/// letters: `UserAccount` → `ua`, `UserID` → `ui`.
pub fn short_name(name: &str) -> String {
    initials(&exported_name(name))
}

/// Initialism of an already exported identifier.
pub fn initials(exported: &str) -> String {
    let mut short = String::new();
    let mut in_run = false;

    for c in exported.chars() {
        if c.is_uppercase() {
            if !in_run {
                short.extend(c.to_lowercase());
            }
            in_run = true;
        } else {
            in_run = false;
        }
    }

    short
}

fn replace_acronyms(mut name: String) -> String {
    for (token, acronym) in ACRONYMS {
        let titled = token.to_title_case();
        if let Some(idx) = name.find(&titled) {
            name.replace_range(idx..idx + titled.len(), acronym);
        }
    }
    name
}
