use indexmap::IndexMap;
use serde_json::Value;
use strum::Display;

use super::{EnumId, ModelId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum PrimitiveKind {
  #[strum(to_string = "string")]
  String,
  #[strum(to_string = "integer")]
  Integer,
  #[strum(to_string = "number")]
  Float,
  #[strum(to_string = "boolean")]
  Boolean,
}

/// The closed set of concrete type shapes a schema fragment can resolve to.
///
/// Emitters match this exhaustively; all document-shape decisions are final by
/// the time a `PropertyKind` exists. New schema shapes are supported by adding
/// a variant and a resolver arm, never by string-keyed branching downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
  Primitive(PrimitiveKind),
  DateTime,
  Date,
  Binary,
  Enum(EnumId),
  List(Box<Property>),
  /// Dictionary of arbitrary keys to one uniform value type.
  FreeForm(Box<Property>),
  /// Any JSON value; produced by empty `additionalProperties` constraints.
  Any,
  ModelRef(ModelId),
  Union(UnionShape),
  /// Placeholder left behind by a recorded diagnostic so sibling schemas can
  /// still be checked in the same run. Never survives a successful build.
  Unknown,
}

/// A `oneOf`/`anyOf` alternative set.
///
/// Variant order is the document's declaration order. Decoding tries variants
/// in this order and the first structurally-valid match wins; that first-match
/// policy is deliberate, documented best-effort behavior, not exhaustive
/// disambiguation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionShape {
  pub variants: Vec<Property>,
  pub discriminator: Option<Discriminator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
  pub property_name: String,
  /// Discriminator value to the model that value selects, in mapping order.
  pub mapping: IndexMap<String, ModelId>,
}

/// One resolved type node plus the envelope every schema position carries:
/// requiredness, nullability, default literal, and the wire-format key
/// (distinct from the resolved identifier).
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
  /// Target-language-safe identifier assigned by the naming resolver.
  pub ident: String,
  /// The wire-format key as it appears in the document.
  pub source_name: String,
  pub kind: PropertyKind,
  pub required: bool,
  pub nullable: bool,
  /// Typed default literal, present only when it round-trips through `kind`.
  pub default: Option<Value>,
  pub deprecated: bool,
  pub docs: Option<String>,
}

impl Property {
  pub(crate) fn new(ident: impl Into<String>, source_name: impl Into<String>, kind: PropertyKind) -> Self {
    Self {
      ident: ident.into(),
      source_name: source_name.into(),
      kind,
      required: false,
      nullable: false,
      default: None,
      deprecated: false,
      docs: None,
    }
  }

  #[must_use]
  pub fn has_default(&self) -> bool {
    self.default.is_some()
  }
}
