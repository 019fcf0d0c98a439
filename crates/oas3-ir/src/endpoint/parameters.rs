//! Parameter collection: path-item inheritance, operation override, and
//! synthesis of path parameters the template declares but the document omits.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::{
  builder::BuildContext,
  diagnostics::Diagnostic,
  document,
  graph::ComponentSection,
  ir::{Parameter, ParameterLocation, ParameterStyle, PrimitiveKind, Property, PropertyKind},
  naming::{IdentKind, NameRegistry, identifiers::to_type_ident},
};

static TEMPLATE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Merges path-item and operation parameter lists, then builds one
/// [`Parameter`] per entry. An operation entry replaces a path-item entry with
/// the same `(name, in)` pair; everything else is inherited.
pub(crate) fn collect<'a>(
  ctx: &mut BuildContext<'a>,
  path: &str,
  shared: Option<&'a Vec<Value>>,
  own: Option<&'a Vec<Value>>,
  operation_location: &str,
  stem: &str,
) -> Vec<Parameter> {
  let mut fragments: Vec<&'a Value> = Vec::new();
  for raw in shared.into_iter().chain(own).flatten() {
    let Some(fragment) = deref_parameter(ctx, operation_location, raw) else {
      continue;
    };
    let key = parameter_key(fragment);
    fragments.retain(|existing| parameter_key(existing) != key);
    fragments.push(fragment);
  }

  let mut field_names = NameRegistry::new();
  let mut parameters: Vec<Parameter> = fragments
    .into_iter()
    .filter_map(|fragment| build_parameter(ctx, operation_location, stem, &mut field_names, fragment))
    .collect();

  synthesize_path_parameters(ctx, path, operation_location, &mut field_names, &mut parameters);
  parameters
}

fn deref_parameter<'a>(ctx: &mut BuildContext<'a>, location: &str, raw: &'a Value) -> Option<&'a Value> {
  let Some(target) = document::ref_target(raw) else {
    return Some(raw);
  };
  match ctx.graph.resolve_chained(target) {
    Some((reference, fragment)) if reference.section == ComponentSection::Parameters => Some(fragment),
    _ => {
      ctx.diagnostics.push(Diagnostic::DanglingReference {
        pointer: target.to_string(),
        location: location.to_string(),
      });
      None
    }
  }
}

fn parameter_key(fragment: &Value) -> (Option<&str>, Option<&str>) {
  (document::get_str(fragment, "name"), document::get_str(fragment, "in"))
}

fn build_parameter<'a>(
  ctx: &mut BuildContext<'a>,
  operation_location: &str,
  stem: &str,
  field_names: &mut NameRegistry,
  fragment: &'a Value,
) -> Option<Parameter> {
  let (Some(name), Some(raw_location)) = parameter_key(fragment) else {
    ctx.diagnostics.push(Diagnostic::UnrecognizedSchema {
      location: format!("{operation_location}/parameters"),
      fragment: fragment.to_string(),
    });
    return None;
  };
  let Some(location) = ParameterLocation::parse(raw_location) else {
    ctx.diagnostics.push(Diagnostic::UnrecognizedSchema {
      location: format!("{operation_location}/parameters/{name}"),
      fragment: fragment.to_string(),
    });
    return None;
  };

  // Path parameters are always required, whatever the document claims.
  let required =
    location == ParameterLocation::Path || document::get_bool(fragment, "required").unwrap_or(false);

  let property_location = format!("{operation_location}/parameters/{name}");
  let ident = field_names.assign(name, IdentKind::Field, &property_location);
  let property = match document::get(fragment, "schema") {
    Some(schema) => {
      let property_stem = format!("{stem}{}", to_type_ident(name));
      let mut property =
        crate::resolver::resolve_property(ctx, &property_location, &property_stem, &ident, name, required, schema);
      if property.docs.is_none() {
        property.docs = document::docs_of(fragment);
      }
      property.deprecated = property.deprecated || document::is_deprecated(fragment);
      property
    }
    // Schemaless parameters decode as plain strings.
    None => {
      let mut property = Property::new(&ident, name, PropertyKind::Primitive(PrimitiveKind::String));
      property.required = required;
      property.docs = document::docs_of(fragment);
      property.deprecated = document::is_deprecated(fragment);
      property
    }
  };

  let style = document::get_str(fragment, "style")
    .and_then(ParameterStyle::parse)
    .unwrap_or_else(|| ParameterStyle::default_for(location));
  // `explode` defaults to true exactly when the effective style is `form`.
  let explode = document::get_bool(fragment, "explode").unwrap_or(style == ParameterStyle::Form);

  Some(Parameter {
    location,
    style,
    explode,
    property,
  })
}

/// Every `{name}` in the template must surface as a path parameter; templates
/// routinely omit the declaration, so missing ones are synthesized as required
/// strings.
fn synthesize_path_parameters(
  ctx: &mut BuildContext<'_>,
  path: &str,
  operation_location: &str,
  field_names: &mut NameRegistry,
  parameters: &mut Vec<Parameter>,
) {
  for capture in TEMPLATE_PARAM_RE.captures_iter(path) {
    let Some(name) = capture.get(1).map(|group| group.as_str()) else {
      continue;
    };
    let declared = parameters.iter().any(|parameter| {
      parameter.location == ParameterLocation::Path && parameter.property.source_name == name
    });
    if declared {
      continue;
    }

    let property_location = format!("{operation_location}/parameters/{name}");
    let ident = field_names.assign(name, IdentKind::Field, &property_location);
    let mut property = Property::new(&ident, name, PropertyKind::Primitive(PrimitiveKind::String));
    property.required = true;

    parameters.push(Parameter {
      location: ParameterLocation::Path,
      style: ParameterStyle::Simple,
      explode: false,
      property,
    });
    ctx.stats.record_synthesized_path_param();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_template_param_pattern_finds_names() {
    let names: Vec<&str> = TEMPLATE_PARAM_RE
      .captures_iter("/orgs/{orgId}/repos/{repo-name}")
      .filter_map(|capture| capture.get(1))
      .map(|group| group.as_str())
      .collect();
    assert_eq!(names, ["orgId", "repo-name"]);
  }

  #[test]
  fn test_parameter_key_distinguishes_location() {
    let query = serde_json::json!({ "name": "id", "in": "query" });
    let path = serde_json::json!({ "name": "id", "in": "path" });
    assert_ne!(parameter_key(&query), parameter_key(&path));
  }
}
