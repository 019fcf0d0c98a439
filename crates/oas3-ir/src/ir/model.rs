use std::collections::BTreeSet;

use serde_json::Value;

use super::Property;

/// Free-form capture policy for keys outside a model's declared property set.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalProperties {
  Denied,
  #[default]
  Untyped,
  Typed(Box<Property>),
}

impl AdditionalProperties {
  #[must_use]
  pub fn allows(&self) -> bool {
    !matches!(self, Self::Denied)
  }
}

/// A named object type: required and optional members in document insertion
/// order (generated constructors keep this ordering), plus free-form capture.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
  pub ident: String,
  /// Canonical pointer path of the owning component, or the synthesizing
  /// operation for inline bodies/responses.
  pub pointer: String,
  pub required_fields: Vec<Property>,
  pub optional_fields: Vec<Property>,
  pub additional_properties: AdditionalProperties,
  /// Set when this model participates in a reference cycle; emitters break
  /// unbounded recursion at the language level (e.g. via indirection).
  pub self_referential: bool,
  pub deprecated: bool,
  pub docs: Option<String>,
}

impl Model {
  pub(crate) fn new(ident: impl Into<String>, pointer: impl Into<String>) -> Self {
    Self {
      ident: ident.into(),
      pointer: pointer.into(),
      required_fields: vec![],
      optional_fields: vec![],
      additional_properties: AdditionalProperties::default(),
      self_referential: false,
      deprecated: false,
      docs: None,
    }
  }

  /// Required members first, then optional, each group in document order.
  pub fn fields(&self) -> impl Iterator<Item = &Property> {
    self.required_fields.iter().chain(&self.optional_fields)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
  pub ident: String,
  pub value: Value,
}

/// A deduplicated, globally shared enum, keyed by resolved class name.
///
/// Two schemas producing the same name must produce the same member set; the
/// builder reports a naming conflict otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
  pub ident: String,
  pub value_type: super::PrimitiveKind,
  pub members: Vec<EnumMember>,
  pub docs: Option<String>,
}

impl EnumDef {
  /// Order-insensitive identity used for the same-name-same-members check.
  pub(crate) fn member_fingerprint(&self) -> BTreeSet<(String, String)> {
    self
      .members
      .iter()
      .map(|member| (member.ident.clone(), member.value.to_string()))
      .collect()
  }
}
