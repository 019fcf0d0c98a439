//! Request body classification.
//!
//! The `content` map is scanned in document order and the first entry with a
//! recognized structured media type decides the body shape. Anything else is
//! carried opaquely as raw bytes under its declared content type.

use mediatype::MediaType;
use serde_json::Value;

use crate::{
  assembler,
  builder::BuildContext,
  diagnostics::Diagnostic,
  document,
  graph::ComponentSection,
  ir::{ModelId, Property, PropertyKind, RequestBody},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyCategory {
  Json,
  Form,
  Multipart,
  Raw,
}

fn categorize(content_type: &str) -> BodyCategory {
  let Ok(media) = MediaType::parse(content_type) else {
    return BodyCategory::Raw;
  };
  let suffix = media.suffix.map(|name| name.as_str());
  match (media.ty.as_str(), media.subty.as_str(), suffix) {
    ("multipart", _, _) => BodyCategory::Multipart,
    ("application", "x-www-form-urlencoded", _) => BodyCategory::Form,
    ("application", "json", _) | (_, _, Some("json")) => BodyCategory::Json,
    _ => BodyCategory::Raw,
  }
}

pub(crate) fn build<'a>(
  ctx: &mut BuildContext<'a>,
  operation_location: &str,
  stem: &str,
  operation: &'a Value,
) -> RequestBody {
  let Some(raw) = document::get(operation, "requestBody") else {
    return RequestBody::None;
  };
  let location = format!("{operation_location}/requestBody");

  let body = if let Some(target) = document::ref_target(raw) {
    match ctx.graph.resolve_chained(target) {
      Some((reference, fragment)) if reference.section == ComponentSection::RequestBodies => fragment,
      _ => {
        ctx.diagnostics.push(Diagnostic::DanglingReference {
          pointer: target.to_string(),
          location,
        });
        return RequestBody::None;
      }
    }
  } else {
    raw
  };

  let Some(content) = document::get_object(body, "content") else {
    return RequestBody::None;
  };
  let required = document::get_bool(body, "required").unwrap_or(false);

  let mut raw_fallback: Option<&String> = None;
  for (content_type, media) in content {
    let schema = document::get(media, "schema");
    let media_location = format!("{location}/content/{}", content_type.replace('/', "~1"));
    match categorize(content_type) {
      BodyCategory::Json => {
        let property = match schema {
          Some(schema) => {
            crate::resolver::resolve_property(ctx, &media_location, &format!("{stem}Body"), "body", "", required, schema)
          }
          None => untyped_body(required),
        };
        return RequestBody::Json { property };
      }
      BodyCategory::Form => match body_model(ctx, &media_location, stem, schema) {
        Some(model) => return RequestBody::Form { model },
        None => {
          raw_fallback.get_or_insert(content_type);
        }
      },
      BodyCategory::Multipart => match body_model(ctx, &media_location, stem, schema) {
        Some(model) => return RequestBody::Multipart { model },
        None => {
          raw_fallback.get_or_insert(content_type);
        }
      },
      BodyCategory::Raw => {
        raw_fallback.get_or_insert(content_type);
      }
    }
  }

  match raw_fallback {
    Some(content_type) => RequestBody::RawBytes {
      content_type: content_type.to_string(),
    },
    None => RequestBody::None,
  }
}

fn untyped_body(required: bool) -> Property {
  let mut property = Property::new("body", "", PropertyKind::Any);
  property.required = required;
  property
}

/// Form and multipart bodies need a concrete field list to serialize, so the
/// schema must ground to a model: a named schema reference or an inline
/// object. Anything else falls back to raw bytes at the call site.
fn body_model(ctx: &mut BuildContext<'_>, location: &str, stem: &str, schema: Option<&Value>) -> Option<ModelId> {
  let schema = schema?;

  if let Some(target) = document::ref_target(schema) {
    let Some((reference, _)) = ctx.graph.resolve_chained(target) else {
      ctx.diagnostics.push(Diagnostic::DanglingReference {
        pointer: target.to_string(),
        location: location.to_string(),
      });
      return None;
    };
    return ctx.model_ids.get(&reference.pointer).copied();
  }

  let object_like = document::get_object(schema, "properties").is_some()
    || document::get_array(schema, "allOf").is_some()
    || document::type_of(schema) == Some("object");
  if object_like {
    return Some(assembler::assemble_synthetic(ctx, location, &format!("{stem}Body"), schema));
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_categorize_structured_media_types() {
    assert_eq!(categorize("application/json"), BodyCategory::Json);
    assert_eq!(categorize("application/vnd.github+json"), BodyCategory::Json);
    assert_eq!(categorize("application/x-www-form-urlencoded"), BodyCategory::Form);
    assert_eq!(categorize("multipart/form-data"), BodyCategory::Multipart);
  }

  #[test]
  fn test_categorize_opaque_media_types() {
    assert_eq!(categorize("application/octet-stream"), BodyCategory::Raw);
    assert_eq!(categorize("text/plain"), BodyCategory::Raw);
    assert_eq!(categorize("not a media type"), BodyCategory::Raw);
  }
}
