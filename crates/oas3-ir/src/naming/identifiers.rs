//! Casing and sanitization rules for target-language identifiers.

use std::{collections::HashSet, sync::LazyLock};

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

static RESERVED_KEYWORDS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "try", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "gen", "self",
  ]
  .into_iter()
  .collect()
});

static RESERVED_PASCAL_CASE: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  ["Clone", "Copy", "Display", "Self", "Send", "Sync", "Option", "Result", "String", "Vec", "Box"]
    .into_iter()
    .collect()
});

/// Transliterates to ASCII, replaces invalid characters with underscores,
/// collapses consecutive underscores, and trims leading/trailing underscores.
pub(crate) fn sanitize(input: &str) -> String {
  static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());
  static MULTI_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").unwrap());

  if input.is_empty() {
    return String::new();
  }

  let ascii = any_ascii(input);
  let replaced = INVALID_CHARS_RE.replace_all(&ascii, "_");
  let collapsed = MULTI_UNDERSCORE_RE.replace_all(&replaced, "_");

  collapsed.trim_matches('_').to_string()
}

/// Converts a candidate into a type identifier (`PascalCase`).
///
/// Reserved names take a trailing underscore rather than being rejected, so
/// every document name maps to some identifier. Digits cannot lead a type
/// name and get a `T` prefix.
pub(crate) fn to_type_ident(name: &str) -> String {
  let (negative, rest) = split_leading_minus(name);
  let mut ident = sanitize(rest).to_pascal_case();

  if ident.is_empty() {
    return "Unnamed".to_string();
  }
  if negative {
    ident = format!("Negative{ident}");
  }
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, 'T');
  }
  if RESERVED_PASCAL_CASE.contains(ident.as_str()) {
    ident.push('_');
  }
  ident
}

/// Converts a wire key into a field identifier (`snake_case`).
pub(crate) fn to_field_ident(name: &str) -> String {
  let (negative, rest) = split_leading_minus(name);
  let mut ident = sanitize(rest).to_snake_case();

  if ident.is_empty() {
    return "field".to_string();
  }
  if negative {
    ident = format!("negative_{ident}");
  }
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, '_');
  }
  if RESERVED_KEYWORDS.contains(ident.as_str()) {
    ident.push('_');
  }
  ident
}

/// Converts an enum literal into a member identifier (`PascalCase`).
pub(crate) fn to_member_ident(literal: &str) -> String {
  let (negative, rest) = split_leading_minus(literal);
  let mut ident = sanitize(rest).to_pascal_case();

  if ident.is_empty() {
    return "Empty".to_string();
  }
  if negative {
    ident = format!("Negative{ident}");
  }
  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, 'N');
  }
  if RESERVED_PASCAL_CASE.contains(ident.as_str()) {
    ident.push('_');
  }
  ident
}

/// Converts a tag into a module-style grouping identifier (`snake_case`).
pub(crate) fn to_module_ident(name: &str) -> String {
  to_field_ident(name)
}

fn split_leading_minus(name: &str) -> (bool, &str) {
  match name.strip_prefix('-') {
    Some(stripped) => (true, stripped),
    None => (false, name),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_type_ident_pascal_cases_candidates() {
    assert_eq!(to_type_ident("pet-store.order"), "PetStoreOrder");
    assert_eq!(to_type_ident("user_profile"), "UserProfile");
    assert_eq!(to_type_ident(""), "Unnamed");
  }

  #[test]
  fn test_type_ident_rewrites_reserved_with_suffix() {
    assert_eq!(to_type_ident("option"), "Option_");
    assert_eq!(to_type_ident("string"), "String_");
  }

  #[test]
  fn test_type_ident_prefixes_leading_digit() {
    assert_eq!(to_type_ident("3d-model"), "T3dModel");
  }

  #[test]
  fn test_field_ident_rewrites_keywords_with_suffix() {
    assert_eq!(to_field_ident("type"), "type_");
    assert_eq!(to_field_ident("self"), "self_");
    assert_eq!(to_field_ident("async"), "async_");
  }

  #[test]
  fn test_field_ident_snake_cases_wire_keys() {
    assert_eq!(to_field_ident("petId"), "pet_id");
    assert_eq!(to_field_ident("X-Rate-Limit"), "x_rate_limit");
  }

  #[test]
  fn test_member_ident_handles_numeric_and_negative_literals() {
    assert_eq!(to_member_ident("404"), "N404");
    assert_eq!(to_member_ident("-1"), "Negative1");
    assert_eq!(to_member_ident("in-progress"), "InProgress");
  }

  #[test]
  fn test_sanitize_transliterates_unicode() {
    assert_eq!(sanitize("café au lait"), "cafe_au_lait");
  }
}
