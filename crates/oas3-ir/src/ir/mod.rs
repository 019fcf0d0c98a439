//! The resolved intermediate representation: an arena of models and enums plus
//! endpoints grouped by tag.
//!
//! Models live in an index-addressed arena so a still-being-built model can be
//! pointed at before it is complete, which is what makes self- and
//! mutually-referential schema graphs resolve without recursion. All nodes are
//! constructed during a single builder pass and are immutable afterward.

mod endpoint;
mod model;
mod property;

pub use endpoint::{
  Endpoint, Parameter, ParameterLocation, ParameterStyle, RequestBody, Response, ResponseTable, StatusSelector,
};
use indexmap::IndexMap;
pub use model::{AdditionalProperties, EnumDef, EnumMember, Model};
pub use property::{Discriminator, PrimitiveKind, Property, PropertyKind, UnionShape};

/// Index of a model in the arena. Handles compare by identity, so two
/// references to the same id point at the same model even mid-construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) usize);

/// Index of a deduplicated enum in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub(crate) usize);

#[derive(Debug)]
enum ModelSlot {
  /// Reserved in pass 1; the identifier is known before the body is resolved.
  Placeholder { ident: String, pointer: String },
  Ready(Box<Model>),
}

/// Owner of every model and enum node produced by one build.
#[derive(Debug, Default)]
pub struct IrArena {
  models: Vec<ModelSlot>,
  enums: Vec<EnumDef>,
}

impl IrArena {
  pub(crate) fn reserve_model(&mut self, ident: &str, pointer: &str) -> ModelId {
    self.models.push(ModelSlot::Placeholder {
      ident: ident.to_string(),
      pointer: pointer.to_string(),
    });
    ModelId(self.models.len() - 1)
  }

  pub(crate) fn fill_model(&mut self, id: ModelId, model: Model) {
    self.models[id.0] = ModelSlot::Ready(Box::new(model));
  }

  pub(crate) fn insert_enum(&mut self, def: EnumDef) -> EnumId {
    self.enums.push(def);
    EnumId(self.enums.len() - 1)
  }

  /// Resolved model for an id, or `None` while the slot is still a placeholder.
  #[must_use]
  pub fn model(&self, id: ModelId) -> Option<&Model> {
    match &self.models[id.0] {
      ModelSlot::Ready(model) => Some(model),
      ModelSlot::Placeholder { .. } => None,
    }
  }

  /// Identifier of a model, available even before its slot is filled.
  #[must_use]
  pub fn model_ident(&self, id: ModelId) -> &str {
    match &self.models[id.0] {
      ModelSlot::Ready(model) => &model.ident,
      ModelSlot::Placeholder { ident, .. } => ident,
    }
  }

  #[must_use]
  pub fn model_pointer(&self, id: ModelId) -> &str {
    match &self.models[id.0] {
      ModelSlot::Ready(model) => &model.pointer,
      ModelSlot::Placeholder { pointer, .. } => pointer,
    }
  }

  #[must_use]
  pub fn enum_def(&self, id: EnumId) -> &EnumDef {
    &self.enums[id.0]
  }

  pub fn models(&self) -> impl Iterator<Item = &Model> {
    self.models.iter().filter_map(|slot| match slot {
      ModelSlot::Ready(model) => Some(model.as_ref()),
      ModelSlot::Placeholder { .. } => None,
    })
  }

  pub fn enums(&self) -> impl Iterator<Item = &EnumDef> {
    self.enums.iter()
  }

  pub(crate) fn unfilled_models(&self) -> impl Iterator<Item = (ModelId, &str)> {
    self.models.iter().enumerate().filter_map(|(idx, slot)| match slot {
      ModelSlot::Placeholder { pointer, .. } => Some((ModelId(idx), pointer.as_str())),
      ModelSlot::Ready(_) => None,
    })
  }
}

/// The completed IR handed to a code emitter: endpoints in document order
/// grouped per tag, plus the arena owning all model and enum nodes.
#[derive(Debug, Default)]
pub struct IrForest {
  pub endpoints: IndexMap<String, Vec<Endpoint>>,
  pub arena: IrArena,
}

impl IrForest {
  pub fn all_endpoints(&self) -> impl Iterator<Item = &Endpoint> {
    self.endpoints.values().flatten()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_placeholder_exposes_ident_before_fill() {
    let mut arena = IrArena::default();
    let id = arena.reserve_model("Node", "#/components/schemas/Node");
    assert!(arena.model(id).is_none());
    assert_eq!(arena.model_ident(id), "Node");

    arena.fill_model(id, Model::new("Node", "#/components/schemas/Node"));
    assert_eq!(arena.model(id).unwrap().ident, "Node");
    assert_eq!(arena.models().count(), 1);
  }

  #[test]
  fn test_unfilled_models_reports_placeholders() {
    let mut arena = IrArena::default();
    let first = arena.reserve_model("A", "#/components/schemas/A");
    let _second = arena.reserve_model("B", "#/components/schemas/B");
    arena.fill_model(first, Model::new("A", "#/components/schemas/A"));

    let unfilled: Vec<_> = arena.unfilled_models().collect();
    assert_eq!(unfilled.len(), 1);
    assert_eq!(unfilled[0].1, "#/components/schemas/B");
  }
}
