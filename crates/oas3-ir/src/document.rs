//! Thin typed accessors over the already-parsed document tree.
//!
//! The loader that turns bytes into a `serde_json::Value` is out of scope; this
//! module only gives the rest of the engine shaped views onto that tree.

use serde_json::{Map, Value};

use crate::builder::BuildError;

pub(crate) const METHOD_KEYS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Root-level view of one OpenAPI document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawDocument<'a> {
  root: &'a Map<String, Value>,
}

impl<'a> RawDocument<'a> {
  pub(crate) fn parse(document: &'a Value) -> Result<Self, BuildError> {
    let root = document.as_object().ok_or(BuildError::MalformedRoot)?;

    // The additionalProperties default is configuration, but a non-3.x document
    // is refused outright rather than misread.
    if let Some(version) = root.get("openapi").and_then(Value::as_str)
      && !version.starts_with("3.")
    {
      return Err(BuildError::UnsupportedVersion(version.to_string()));
    }

    Ok(Self { root })
  }

  pub(crate) fn component_section(&self, section: &str) -> Option<&'a Map<String, Value>> {
    self.root.get("components")?.get(section)?.as_object()
  }

  pub(crate) fn paths(&self) -> Option<&'a Map<String, Value>> {
    self.root.get("paths")?.as_object()
  }

  pub(crate) fn has_global_security(&self) -> bool {
    self
      .root
      .get("security")
      .and_then(Value::as_array)
      .is_some_and(|reqs| !reqs.is_empty())
  }
}

pub(crate) fn get<'a>(fragment: &'a Value, key: &str) -> Option<&'a Value> {
  fragment.as_object()?.get(key)
}

pub(crate) fn get_str<'a>(fragment: &'a Value, key: &str) -> Option<&'a str> {
  get(fragment, key)?.as_str()
}

pub(crate) fn get_bool(fragment: &Value, key: &str) -> Option<bool> {
  get(fragment, key)?.as_bool()
}

pub(crate) fn get_object<'a>(fragment: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
  get(fragment, key)?.as_object()
}

pub(crate) fn get_array<'a>(fragment: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
  get(fragment, key)?.as_array()
}

/// Returns the `$ref` pointer of a fragment, if it is a reference.
pub(crate) fn ref_target(fragment: &Value) -> Option<&str> {
  get_str(fragment, "$ref")
}

/// The `type` keyword, collapsed to its non-null member when the 3.1 array
/// form is used (`type: ["string", "null"]`).
pub(crate) fn type_of(fragment: &Value) -> Option<&str> {
  match get(fragment, "type")? {
    Value::String(single) => Some(single.as_str()),
    Value::Array(members) => members
      .iter()
      .filter_map(Value::as_str)
      .find(|member| *member != "null"),
    _ => None,
  }
}

/// True when the 3.1 array form declares more than one non-null type
/// (`type: ["string", "integer"]`). Such a fragment has no single resolved
/// shape and must be reported, not collapsed.
pub(crate) fn is_multi_typed(fragment: &Value) -> bool {
  match get(fragment, "type") {
    Some(Value::Array(members)) => {
      members
        .iter()
        .filter(|member| member.as_str() != Some("null"))
        .count()
        > 1
    }
    _ => false,
  }
}

/// Nullability declared either the 3.0 way (`nullable: true`) or the 3.1 way
/// (a `"null"` member in the `type` array).
pub(crate) fn is_nullable(fragment: &Value) -> bool {
  if get_bool(fragment, "nullable") == Some(true) {
    return true;
  }
  match get(fragment, "type") {
    Some(Value::Array(members)) => members.iter().any(|member| member.as_str() == Some("null")),
    Some(Value::String(single)) => single == "null",
    _ => false,
  }
}

/// Documentation string carried onto IR nodes: `description` wins over
/// `summary`, which wins over `title`.
pub(crate) fn docs_of(fragment: &Value) -> Option<String> {
  get_str(fragment, "description")
    .or_else(|| get_str(fragment, "summary"))
    .or_else(|| get_str(fragment, "title"))
    .map(str::to_string)
}

pub(crate) fn is_deprecated(fragment: &Value) -> bool {
  get_bool(fragment, "deprecated") == Some(true)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_parse_rejects_non_object_root() {
    assert!(matches!(RawDocument::parse(&json!([])), Err(BuildError::MalformedRoot)));
  }

  #[test]
  fn test_parse_rejects_swagger_2() {
    let doc = json!({ "openapi": "2.0.0" });
    assert!(matches!(
      RawDocument::parse(&doc),
      Err(BuildError::UnsupportedVersion(v)) if v == "2.0.0"
    ));
  }

  #[test]
  fn test_type_of_collapses_nullable_array_form() {
    let fragment = json!({ "type": ["string", "null"] });
    assert_eq!(type_of(&fragment), Some("string"));
    assert!(is_nullable(&fragment));
  }

  #[test]
  fn test_is_multi_typed_ignores_null_members() {
    assert!(is_multi_typed(&json!({ "type": ["string", "integer"] })));
    assert!(!is_multi_typed(&json!({ "type": ["string", "null"] })));
    assert!(!is_multi_typed(&json!({ "type": "string" })));
  }

  #[test]
  fn test_nullable_keyword_3_0() {
    let fragment = json!({ "type": "integer", "nullable": true });
    assert_eq!(type_of(&fragment), Some("integer"));
    assert!(is_nullable(&fragment));
  }

  #[test]
  fn test_docs_prefers_description() {
    let fragment = json!({ "title": "T", "description": "D" });
    assert_eq!(docs_of(&fragment).as_deref(), Some("D"));
  }
}
