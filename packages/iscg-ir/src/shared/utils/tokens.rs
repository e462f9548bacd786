//! Token scanning over LLVM instruction text
//!
//! All substitutions in the canonicalizer go through [`rewrite_symbols`], so a
//! rename never touches a substring of a longer identifier (`%1` vs `%10`).

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::borrow::Cow;

lazy_static! {
    /// Local (`%`) or global (`@`) identifier
    static ref SYMBOL_TOKEN: Regex = Regex::new(r"[%@][-\w$.:]+").unwrap();

    /// `iN <int>` immediate
    pub static ref INT_IMMEDIATE: Regex = Regex::new(r"\b(i\d+)\s+(-?\d+)\b").unwrap();

    /// `dereferenceable(N)` / `dereferenceable_or_null(N)` attribute
    pub static ref DEREFERENCEABLE: Regex =
        Regex::new(r"\b(dereferenceable(?:_or_null)?)\((\d+)\)").unwrap();

    /// Start of a trailing `, !dbg !N` style attachment
    static ref METADATA_ATTACHMENT: Regex = Regex::new(r",\s*!").unwrap();

    /// Trailing `.123.4` disambiguation suffix of a struct name
    static ref STRUCT_SUFFIX: Regex = Regex::new(r"(\.\d+)+$").unwrap();

    static ref LITERAL: Regex = Regex::new(
        r"^(-?\d+(\.\d+)?([eE][-+]?\d+)?|0x[0-9A-Fa-f]+|<const>|null|undef|poison|true|false|zeroinitializer|none)$"
    )
    .unwrap();
}

/// Type prefixes that mark a `%` token as a named aggregate
const STRUCT_PREFIXES: [&str; 3] = ["%struct.", "%class.", "%union."];

/// Last whitespace-separated token, without trailing commas
///
/// `"ptr noundef %buf"` → `"%buf"`, `"label %7"` → `"%7"`
pub fn last_token(s: &str) -> &str {
    s.split_whitespace()
        .last()
        .map(|t| t.trim_end_matches(','))
        .unwrap_or("")
}

/// `%`/`@` identifiers in left-to-right order
pub fn symbol_tokens(s: &str) -> impl Iterator<Item = &str> {
    SYMBOL_TOKEN.find_iter(s).map(|m| m.as_str())
}

/// Replace every identifier for which `f` returns a new name
pub fn rewrite_symbols<'a, F>(text: &'a str, mut f: F) -> Cow<'a, str>
where
    F: FnMut(&str) -> Option<String>,
{
    SYMBOL_TOKEN.replace_all(text, |caps: &Captures| {
        let token = &caps[0];
        f(token).unwrap_or_else(|| token.to_string())
    })
}

/// Drop `, !dbg !12`-style attachments and double quotes
pub fn strip_metadata(text: &str) -> Cow<'_, str> {
    let kept = match METADATA_ATTACHMENT.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
    .trim_end();
    if kept.contains('"') {
        Cow::Owned(kept.replace('"', ""))
    } else if kept.len() != text.len() {
        Cow::Owned(kept.to_string())
    } else {
        Cow::Borrowed(text)
    }
}

/// `%struct.foo.12` → `%struct.foo`
pub fn strip_struct_suffix(token: &str) -> &str {
    match STRUCT_SUFFIX.find(token) {
        // never strip a whole name like `%0`
        Some(m) if m.start() > 1 => &token[..m.start()],
        _ => token,
    }
}

/// Block label in reference form: `7:` and `"7"` both become `%7`
pub fn normalize_label(label: &str) -> String {
    let label = label.trim().trim_end_matches(':').replace('"', "");
    let label = last_token(&label);
    if label.starts_with('%') {
        label.to_string()
    } else {
        format!("%{}", label)
    }
}

/// Named aggregate type token (`%struct.*`, `%class.*`, `%union.*`)
pub fn is_struct_like(token: &str) -> bool {
    STRUCT_PREFIXES.iter().any(|p| token.starts_with(p))
}

/// Integer, float, hex or keyword constant
pub fn is_literal(token: &str) -> bool {
    LITERAL.is_match(token.trim())
}
