//! Type resolver: converts one raw schema fragment into one typed [`Property`].
//!
//! Dispatch order is fixed: `$ref`, `enum`, `oneOf`/`anyOf`, `allOf`, the
//! `type` keyword, then failure. Anything that matches none of the recognized
//! shapes is recorded as a diagnostic and resolved to the `Unknown`
//! placeholder so sibling schemas can still be checked in the same run.

use chrono::{DateTime, NaiveDate};
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
  builder::BuildContext,
  diagnostics::Diagnostic,
  document,
  graph::{ComponentSection, Reference, ReferenceGraph},
  ir::{Discriminator, EnumDef, EnumId, EnumMember, PrimitiveKind, Property, PropertyKind, UnionShape},
  naming::{IdentKind, NameRegistry, identifiers::to_type_ident},
};

/// Resolves a schema fragment into a typed property node.
///
/// `location` is the pointer path used for diagnostics and as the naming
/// origin; `stem` seeds the class name of any synthetic type born at this
/// position (inline enums, inline objects, union variants).
pub(crate) fn resolve_property<'a>(
  ctx: &mut BuildContext<'a>,
  location: &str,
  stem: &str,
  ident: &str,
  source_name: &str,
  required: bool,
  fragment: &Value,
) -> Property {
  let mut prop = Property::new(ident, source_name, PropertyKind::Unknown);
  prop.required = required;
  prop.nullable = document::is_nullable(fragment);
  prop.deprecated = document::is_deprecated(fragment);
  prop.docs = document::docs_of(fragment);

  resolve_kind(ctx, location, stem, &mut prop, fragment);

  if let Some(default) = document::get(fragment, "default") {
    if default_fits(ctx, &prop, default) {
      prop.default = Some(default.clone());
    } else {
      ctx.diagnostics.push(Diagnostic::InvalidDefault {
        location: location.to_string(),
        value: default.to_string(),
        expected: describe_kind(ctx, &prop.kind),
      });
    }
  }

  prop
}

fn resolve_kind<'a>(ctx: &mut BuildContext<'a>, location: &str, stem: &str, prop: &mut Property, fragment: &Value) {
  if let Some(target) = document::ref_target(fragment) {
    resolve_reference(ctx, location, prop, target);
    return;
  }

  if document::get_array(fragment, "enum").is_some() {
    resolve_enum(ctx, location, stem, prop, fragment);
    return;
  }

  let union_key = ["oneOf", "anyOf"]
    .into_iter()
    .find(|key| document::get_array(fragment, key).is_some_and(|variants| !variants.is_empty()));
  if let Some(key) = union_key {
    resolve_union(ctx, location, stem, prop, fragment, key);
    return;
  }

  if document::get_array(fragment, "allOf").is_some_and(|entries| !entries.is_empty()) {
    let model = crate::assembler::assemble_synthetic(ctx, location, stem, fragment);
    prop.kind = PropertyKind::ModelRef(model);
    return;
  }

  // `type: ["string", "integer"]` has no single resolved shape; picking one
  // member would be silently lossy.
  if document::is_multi_typed(fragment) {
    record_unrecognized(ctx, location, fragment);
    prop.kind = PropertyKind::Unknown;
    return;
  }

  match document::type_of(fragment) {
    Some("string") => prop.kind = string_kind(fragment),
    Some("integer") => prop.kind = PropertyKind::Primitive(PrimitiveKind::Integer),
    Some("number") => prop.kind = PropertyKind::Primitive(PrimitiveKind::Float),
    Some("boolean") => prop.kind = PropertyKind::Primitive(PrimitiveKind::Boolean),
    Some("array") => resolve_list(ctx, location, stem, prop, fragment),
    Some("object") => resolve_object(ctx, location, stem, prop, fragment),
    Some("null") => {
      prop.nullable = true;
      prop.kind = PropertyKind::Any;
    }
    Some(_) => {
      record_unrecognized(ctx, location, fragment);
      prop.kind = PropertyKind::Unknown;
    }
    None => {
      // Objects are frequently declared by `properties` alone.
      if document::get_object(fragment, "properties").is_some() {
        resolve_object(ctx, location, stem, prop, fragment);
      } else if document::get(fragment, "type").is_some() && prop.nullable {
        // `type: ["null"]` with no non-null member.
        prop.kind = PropertyKind::Any;
      } else {
        record_unrecognized(ctx, location, fragment);
        prop.kind = PropertyKind::Unknown;
      }
    }
  }
}

fn string_kind(fragment: &Value) -> PropertyKind {
  match document::get_str(fragment, "format") {
    Some("date-time") => PropertyKind::DateTime,
    Some("date") => PropertyKind::Date,
    Some("binary" | "byte") => PropertyKind::Binary,
    _ => PropertyKind::Primitive(PrimitiveKind::String),
  }
}

fn resolve_list<'a>(ctx: &mut BuildContext<'a>, location: &str, stem: &str, prop: &mut Property, fragment: &Value) {
  let item = match document::get(fragment, "items") {
    Some(items) => resolve_property(
      ctx,
      &format!("{location}/items"),
      &format!("{stem}Item"),
      "item",
      "",
      false,
      items,
    ),
    None => Property::new("item", "", PropertyKind::Any),
  };
  prop.kind = PropertyKind::List(Box::new(item));
}

fn resolve_object<'a>(ctx: &mut BuildContext<'a>, location: &str, stem: &str, prop: &mut Property, fragment: &Value) {
  if document::get_object(fragment, "properties").is_some_and(|properties| !properties.is_empty()) {
    let model = crate::assembler::assemble_synthetic(ctx, location, stem, fragment);
    prop.kind = PropertyKind::ModelRef(model);
    return;
  }

  // No declared property set: a dictionary of arbitrary keys.
  let value = match document::get(fragment, "additionalProperties") {
    Some(schema) if schema.is_object() => resolve_property(
      ctx,
      &format!("{location}/additionalProperties"),
      &format!("{stem}Value"),
      "value",
      "",
      false,
      schema,
    ),
    _ => Property::new("value", "", PropertyKind::Any),
  };
  prop.kind = PropertyKind::FreeForm(Box::new(value));
}

fn resolve_reference<'a>(ctx: &mut BuildContext<'a>, location: &str, prop: &mut Property, target: &str) {
  let Some((reference, fragment)) = ctx.graph.resolve_chained(target) else {
    ctx.diagnostics.push(Diagnostic::DanglingReference {
      pointer: target.to_string(),
      location: location.to_string(),
    });
    prop.kind = PropertyKind::Unknown;
    return;
  };

  if reference.section != ComponentSection::Schemas {
    ctx.diagnostics.push(Diagnostic::DanglingReference {
      pointer: target.to_string(),
      location: location.to_string(),
    });
    prop.kind = PropertyKind::Unknown;
    return;
  }

  // Model handles are by identity: a reference to a model still being filled
  // in this pass resolves to the same id the finished model will have.
  if let Some(&model) = ctx.model_ids.get(&reference.pointer) {
    prop.kind = PropertyKind::ModelRef(model);
    return;
  }

  if let Some(values) = document::get_array(fragment, "enum") {
    prop.nullable |= values.iter().any(Value::is_null);
    prop.kind = match ensure_named_enum(ctx, &reference, fragment) {
      Some(id) => PropertyKind::Enum(id),
      None => PropertyKind::Unknown,
    };
    return;
  }

  // Scalar, array, or union alias: resolve the aliased body in place. A chain
  // of aliases that loops back through itself has no grounded shape.
  if ctx.alias_stack.contains(&reference.pointer) {
    ctx.diagnostics.push(Diagnostic::UnrecognizedSchema {
      location: location.to_string(),
      fragment: format!("cyclic alias chain through '{}'", reference.pointer),
    });
    prop.kind = PropertyKind::Unknown;
    return;
  }

  ctx.alias_stack.push(reference.pointer.clone());
  prop.nullable |= document::is_nullable(fragment);
  let stem = to_type_ident(&reference.name);
  resolve_kind(ctx, &reference.pointer, &stem, prop, fragment);
  ctx.alias_stack.pop();
}

/// Builds (or merges into) a named enum, memoized by pointer.
fn ensure_named_enum<'a>(ctx: &mut BuildContext<'a>, reference: &Reference, fragment: &Value) -> Option<EnumId> {
  if let Some(&id) = ctx.enum_pointers.get(&reference.pointer) {
    return Some(id);
  }
  let id = build_enum(ctx, &reference.pointer, &reference.name, fragment)?;
  ctx.enum_pointers.insert(reference.pointer.clone(), id);
  Some(id)
}

/// Builds a named enum schema directly, for the builder's component pass.
pub(crate) fn resolve_named_enum<'a>(ctx: &mut BuildContext<'a>, pointer: &str, name: &str, fragment: &Value) {
  if ctx.enum_pointers.contains_key(pointer) {
    return;
  }
  if let Some(id) = build_enum(ctx, pointer, name, fragment) {
    ctx.enum_pointers.insert(pointer.to_string(), id);
  }
}

fn resolve_enum<'a>(ctx: &mut BuildContext<'a>, location: &str, stem: &str, prop: &mut Property, fragment: &Value) {
  let had_null = document::get_array(fragment, "enum").is_some_and(|values| values.iter().any(Value::is_null));
  prop.nullable |= had_null;
  prop.kind = match build_enum(ctx, location, stem, fragment) {
    Some(id) => PropertyKind::Enum(id),
    None => PropertyKind::Unknown,
  };
}

/// Builds an enum from a fragment's `enum` values and registers it under its
/// resolved class name.
///
/// Enums are globally deduplicated by name: a second schema producing the same
/// class name merges with the first when their member sets agree, and raises a
/// naming conflict when they do not.
fn build_enum<'a>(ctx: &mut BuildContext<'a>, location: &str, candidate: &str, fragment: &Value) -> Option<EnumId> {
  let values = document::get_array(fragment, "enum")?;
  let literals: Vec<&Value> = values.iter().filter(|value| !value.is_null()).collect();

  if literals.is_empty() {
    record_unrecognized(ctx, location, fragment);
    return None;
  }

  let value_type = match literals[0] {
    Value::String(_) => PrimitiveKind::String,
    Value::Number(n) if n.is_f64() => PrimitiveKind::Float,
    Value::Number(_) => PrimitiveKind::Integer,
    Value::Bool(_) => PrimitiveKind::Boolean,
    _ => {
      record_unrecognized(ctx, location, fragment);
      return None;
    }
  };

  let mut member_names = NameRegistry::new();
  let mut members = Vec::with_capacity(literals.len());
  for literal in literals {
    let raw = match literal {
      Value::String(s) => s.clone(),
      other => other.to_string(),
    };
    let ident = member_names.assign(&raw, IdentKind::EnumMember, &format!("{location}/enum/{raw}"));
    members.push(EnumMember {
      ident,
      value: (*literal).clone(),
    });
  }

  let def = EnumDef {
    ident: to_type_ident(candidate),
    value_type,
    members,
    docs: document::docs_of(fragment),
  };

  if let Some(&existing) = ctx.enum_idents.get(&def.ident) {
    if ctx.arena.enum_def(existing).member_fingerprint() == def.member_fingerprint() {
      return Some(existing);
    }
    let first = ctx
      .names
      .owner_of(&def.ident, IdentKind::Type)
      .unwrap_or("<unknown>")
      .to_string();
    ctx.diagnostics.push(Diagnostic::NamingConflict {
      ident: def.ident,
      first,
      second: location.to_string(),
    });
    return None;
  }

  // A non-enum component may already own the class name.
  if let Some(owner) = ctx.names.owner_of(&def.ident, IdentKind::Type) {
    let first = owner.to_string();
    ctx.diagnostics.push(Diagnostic::NamingConflict {
      ident: def.ident,
      first,
      second: location.to_string(),
    });
    return None;
  }

  ctx.names.assign(candidate, IdentKind::Type, location);
  let ident = def.ident.clone();
  let id = ctx.arena.insert_enum(def);
  ctx.enum_idents.insert(ident, id);
  ctx.stats.record_enum();
  Some(id)
}

fn resolve_union<'a>(
  ctx: &mut BuildContext<'a>,
  location: &str,
  stem: &str,
  prop: &mut Property,
  fragment: &Value,
  key: &str,
) {
  let Some(raw_variants) = document::get_array(fragment, key) else {
    return;
  };

  let grounded: Vec<(usize, &Value)> = raw_variants
    .iter()
    .enumerate()
    .filter(|(_, variant)| !is_null_schema(variant))
    .collect();

  if grounded.len() < raw_variants.len() {
    prop.nullable = true;
  }

  match grounded.as_slice() {
    [] => prop.kind = PropertyKind::Any,
    // `oneOf: [T, null]` is a nullable T, not a union.
    [(index, only)] => {
      let variant_location = format!("{location}/{key}/{index}");
      resolve_kind(ctx, &variant_location, stem, prop, only);
    }
    _ => {
      let mut variants = Vec::with_capacity(grounded.len());
      for (index, variant_fragment) in &grounded {
        let variant_location = format!("{location}/{key}/{index}");
        let (ident, variant_stem) = match document::ref_target(variant_fragment)
          .and_then(ReferenceGraph::schema_name)
        {
          Some(name) => (to_type_ident(name), to_type_ident(name)),
          None => (format!("Variant{index}"), format!("{stem}Variant{index}")),
        };
        variants.push(resolve_property(
          ctx,
          &variant_location,
          &variant_stem,
          &ident,
          "",
          false,
          variant_fragment,
        ));
      }

      let discriminator = resolve_discriminator(ctx, location, fragment);
      prop.kind = PropertyKind::Union(UnionShape { variants, discriminator });
    }
  }
}

fn resolve_discriminator<'a>(ctx: &mut BuildContext<'a>, location: &str, fragment: &Value) -> Option<Discriminator> {
  let discriminator = document::get(fragment, "discriminator")?;
  let property_name = document::get_str(discriminator, "propertyName")?.to_string();

  let mut mapping = IndexMap::new();
  if let Some(entries) = document::get_object(discriminator, "mapping") {
    for (value, target) in entries {
      let Some(target) = target.as_str() else { continue };
      let pointer = if target.starts_with('#') {
        target.to_string()
      } else {
        ReferenceGraph::schema_pointer(target)
      };
      match ctx.model_ids.get(&pointer) {
        Some(&model) => {
          mapping.insert(value.clone(), model);
        }
        None => ctx.diagnostics.push(Diagnostic::DanglingReference {
          pointer,
          location: format!("{location}/discriminator/mapping/{value}"),
        }),
      }
    }
  }

  Some(Discriminator { property_name, mapping })
}

fn is_null_schema(fragment: &Value) -> bool {
  match document::get(fragment, "type") {
    Some(Value::String(ty)) => ty == "null",
    Some(Value::Array(members)) => !members.is_empty() && members.iter().all(|m| m.as_str() == Some("null")),
    _ => false,
  }
}

fn record_unrecognized(ctx: &mut BuildContext<'_>, location: &str, fragment: &Value) {
  ctx.diagnostics.push(Diagnostic::UnrecognizedSchema {
    location: location.to_string(),
    fragment: fragment.to_string(),
  });
}

/// Whether a default literal independently round-trips through the resolved
/// type. Defaults that do not fit are resolution errors, never silently kept.
fn default_fits(ctx: &BuildContext<'_>, prop: &Property, default: &Value) -> bool {
  if default.is_null() {
    return prop.nullable;
  }
  kind_accepts(ctx, &prop.kind, default)
}

fn kind_accepts(ctx: &BuildContext<'_>, kind: &PropertyKind, value: &Value) -> bool {
  match kind {
    PropertyKind::Primitive(PrimitiveKind::String) => value.is_string(),
    PropertyKind::Primitive(PrimitiveKind::Integer) => value.as_i64().is_some() || value.as_u64().is_some(),
    PropertyKind::Primitive(PrimitiveKind::Float) => value.is_number(),
    PropertyKind::Primitive(PrimitiveKind::Boolean) => value.is_boolean(),
    PropertyKind::DateTime => value
      .as_str()
      .is_some_and(|text| DateTime::parse_from_rfc3339(text).is_ok()),
    PropertyKind::Date => value
      .as_str()
      .is_some_and(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()),
    PropertyKind::Binary => value.is_string(),
    PropertyKind::Enum(id) => ctx
      .arena
      .enum_def(*id)
      .members
      .iter()
      .any(|member| member.value == *value),
    PropertyKind::List(item) => value
      .as_array()
      .is_some_and(|elements| elements.iter().all(|element| kind_accepts(ctx, &item.kind, element))),
    PropertyKind::FreeForm(_) | PropertyKind::ModelRef(_) => value.is_object(),
    PropertyKind::Union(shape) => shape
      .variants
      .iter()
      .any(|variant| kind_accepts(ctx, &variant.kind, value)),
    PropertyKind::Any | PropertyKind::Unknown => true,
  }
}

fn describe_kind(ctx: &BuildContext<'_>, kind: &PropertyKind) -> String {
  match kind {
    PropertyKind::Primitive(primitive) => primitive.to_string(),
    PropertyKind::DateTime => "date-time".to_string(),
    PropertyKind::Date => "date".to_string(),
    PropertyKind::Binary => "binary".to_string(),
    PropertyKind::Enum(id) => format!("enum {}", ctx.arena.enum_def(*id).ident),
    PropertyKind::List(item) => format!("list of {}", describe_kind(ctx, &item.kind)),
    PropertyKind::FreeForm(value) => format!("map of {}", describe_kind(ctx, &value.kind)),
    PropertyKind::Any => "any".to_string(),
    PropertyKind::ModelRef(id) => ctx.arena.model_ident(*id).to_string(),
    PropertyKind::Union(_) => "union".to_string(),
    PropertyKind::Unknown => "unknown".to_string(),
  }
}
