//! Model assembler: groups object schemas into [`Model`] nodes.
//!
//! `allOf` bases are flattened into the derived model before partitioning
//! members into required and optional sets. A property a base marks required
//! stays required in the derived model even when the derived schema stays
//! silent about it. The free-form capture default differs between OpenAPI 3.0
//! and 3.1 and is taken from configuration, never inferred from content.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::{
  builder::{BuildContext, SpecVersion},
  diagnostics::Diagnostic,
  document,
  graph::ReferenceGraph,
  ir::{AdditionalProperties, Model, ModelId, PropertyKind},
  naming::{IdentKind, NameRegistry, identifiers::to_type_ident},
  resolver,
};

/// One object schema with its `allOf` ancestry flattened in.
#[derive(Debug, Default)]
struct MergedSchema {
  properties: IndexMap<String, Value>,
  required: IndexSet<String>,
  additional: Option<Value>,
  unevaluated_denied: bool,
}

fn merge_schema(ctx: &mut BuildContext<'_>, location: &str, fragment: &Value) -> MergedSchema {
  let mut merged = MergedSchema::default();
  let mut visited = BTreeSet::new();
  merge_into(ctx, location, fragment, &mut merged, &mut visited);
  merged
}

fn merge_into(
  ctx: &mut BuildContext<'_>,
  location: &str,
  fragment: &Value,
  merged: &mut MergedSchema,
  visited: &mut BTreeSet<String>,
) {
  // Bases first, so derived declarations override base property schemas while
  // base-required names stay required.
  if let Some(entries) = document::get_array(fragment, "allOf") {
    for entry in entries {
      if let Some(target) = document::ref_target(entry) {
        if !visited.insert(target.to_string()) {
          continue;
        }
        match ctx.graph.resolve_chained(target) {
          Some((_, base)) => merge_into(ctx, location, base, merged, visited),
          None => ctx.diagnostics.push(Diagnostic::DanglingReference {
            pointer: target.to_string(),
            location: location.to_string(),
          }),
        }
      } else {
        merge_into(ctx, location, entry, merged, visited);
      }
    }
  }

  if let Some(properties) = document::get_object(fragment, "properties") {
    for (name, schema) in properties {
      merged.properties.insert(name.clone(), schema.clone());
    }
  }
  if let Some(required) = document::get_array(fragment, "required") {
    merged
      .required
      .extend(required.iter().filter_map(Value::as_str).map(str::to_string));
  }
  // Later (derived) declarations replace earlier (base) ones, same as
  // property schemas.
  if let Some(additional) = document::get(fragment, "additionalProperties") {
    merged.additional = Some(additional.clone());
  }
  if document::get(fragment, "unevaluatedProperties") == Some(&Value::Bool(false)) {
    merged.unevaluated_denied = true;
  }
}

/// Fills a reserved model slot from its (possibly `allOf`-composed) fragment.
pub(crate) fn assemble_model(ctx: &mut BuildContext<'_>, id: ModelId, pointer: &str, ident: &str, fragment: &Value) {
  let merged = merge_schema(ctx, pointer, fragment);

  let mut model = Model::new(ident, pointer);
  model.docs = document::docs_of(fragment);
  model.deprecated = document::is_deprecated(fragment);
  model.self_referential = ReferenceGraph::schema_name(pointer).is_some_and(|name| ctx.graph.is_cyclic(name));

  let mut field_names = NameRegistry::new();
  for (source_name, schema) in &merged.properties {
    let property_location = format!("{pointer}/properties/{source_name}");
    let field_ident = field_names.assign(source_name, IdentKind::Field, &property_location);
    let stem = format!("{ident}{}", to_type_ident(source_name));
    let required = merged.required.contains(source_name);

    let property = resolver::resolve_property(
      ctx,
      &property_location,
      &stem,
      &field_ident,
      source_name,
      required,
      schema,
    );
    if required {
      model.required_fields.push(property);
    } else {
      model.optional_fields.push(property);
    }
  }

  // A name may be listed required without ever being declared.
  for name in &merged.required {
    if !merged.properties.contains_key(name) {
      ctx.diagnostics.push(Diagnostic::MissingRequiredDeclaration {
        model: ident.to_string(),
        name: name.clone(),
      });
    }
  }

  model.additional_properties = additional_properties(ctx, pointer, ident, &merged);

  ctx.arena.fill_model(id, model);
  ctx.stats.record_model();
}

fn additional_properties(
  ctx: &mut BuildContext<'_>,
  pointer: &str,
  ident: &str,
  merged: &MergedSchema,
) -> AdditionalProperties {
  match &merged.additional {
    Some(Value::Bool(false)) => AdditionalProperties::Denied,
    Some(Value::Bool(true)) => AdditionalProperties::Untyped,
    Some(schema) if schema.is_object() => {
      if schema.as_object().is_some_and(serde_json::Map::is_empty) {
        // An empty constraint schema admits any value.
        return AdditionalProperties::Untyped;
      }
      let location = format!("{pointer}/additionalProperties");
      let stem = format!("{ident}Value");
      let value = resolver::resolve_property(ctx, &location, &stem, "value", "", false, schema);
      if value.kind == PropertyKind::Any {
        AdditionalProperties::Untyped
      } else {
        AdditionalProperties::Typed(Box::new(value))
      }
    }
    Some(other) => {
      ctx.diagnostics.push(Diagnostic::UnrecognizedSchema {
        location: format!("{pointer}/additionalProperties"),
        fragment: other.to_string(),
      });
      AdditionalProperties::Untyped
    }
    // Absent: both 3.0 and 3.1 default to allowing untyped capture, but 3.1
    // documents can deny it through `unevaluatedProperties: false`.
    None => match ctx.config.spec_version {
      SpecVersion::V3_0 => AdditionalProperties::Untyped,
      SpecVersion::V3_1 => {
        if merged.unevaluated_denied {
          AdditionalProperties::Denied
        } else {
          AdditionalProperties::Untyped
        }
      }
    },
  }
}

/// Synthesizes a model for an inline object (request body, response payload,
/// nested property object) and returns its identity handle. The synthesized
/// name joins the same collision table as user-declared schema names.
///
/// Memoized by location: an inline object inside an alias body is resolved
/// once per use site of the alias, and every resolution must land on the same
/// arena entry or the model table would carry duplicates.
pub(crate) fn assemble_synthetic(ctx: &mut BuildContext<'_>, location: &str, stem: &str, fragment: &Value) -> ModelId {
  if let Some(&id) = ctx.synthetic_models.get(location) {
    return id;
  }
  let ident = ctx.names.assign(stem, IdentKind::Type, location);
  let id = ctx.arena.reserve_model(&ident, location);
  ctx.synthetic_models.insert(location.to_string(), id);
  ctx.stats.record_synthetic_type();
  assemble_model(ctx, id, location, &ident, fragment);
  id
}
