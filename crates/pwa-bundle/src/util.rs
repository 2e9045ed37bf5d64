//! Utility functions for naming and serialization.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::Result;

fn separator_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[\s_\-]+").unwrap())
}

/// Convert an extension name to the dash-cased namespace used inside the archive.
///
/// Every uppercase letter after the first character starts a new word,
/// whitespace and underscores separate words, and the words are lowercased
/// and joined with a single `-`.
///
/// # Examples
///
/// ```
/// use pwa_bundle::util::convert_to_dash_case;
///
/// assert_eq!(convert_to_dash_case("Foo Bar"), "foo-bar");
/// assert_eq!(convert_to_dash_case("SwagCustomizedProducts"), "swag-customized-products");
/// assert_eq!(convert_to_dash_case("my_plugin"), "my-plugin");
/// ```
pub fn convert_to_dash_case(name: &str) -> String {
    let mut split = String::with_capacity(name.len() + 8);

    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            split.push('-');
        }
        split.extend(c.to_lowercase());
    }

    separator_regex()
        .split(&split)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Serialize a value to JSON the way the shop platform's PHP runtime does.
///
/// PHP's `json_encode` escapes forward slashes and writes every non-ASCII
/// character as a UTF-16 `\uXXXX` escape. Checksums of previously published
/// artifacts were computed over that representation.
pub fn to_php_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    let mut out = String::with_capacity(json.len());

    for c in json.chars() {
        match c {
            '/' => out.push_str("\\/"),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04x}", unit));
                }
            }
        }
    }

    Ok(out)
}
