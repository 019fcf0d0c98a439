//! Response table construction.
//!
//! Responses are stored in declaration order; matching precedence lives in
//! [`ResponseTable::select`], not here. Unparseable status keys are reported
//! and skipped so the rest of the operation still builds.

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
  builder::BuildContext,
  diagnostics::Diagnostic,
  document,
  graph::ComponentSection,
  ir::{Property, PropertyKind, Response, ResponseTable},
};

use super::status_codes;

pub(crate) fn build_table<'a>(
  ctx: &mut BuildContext<'a>,
  operation_location: &str,
  stem: &str,
  operation: &'a Value,
) -> ResponseTable {
  let Some(responses) = document::get_object(operation, "responses") else {
    return ResponseTable::default();
  };

  let mut built = Vec::with_capacity(responses.len());
  for (key, raw) in responses {
    let location = format!("{operation_location}/responses/{key}");

    let Some(selector) = status_codes::parse_selector(key) else {
      ctx.diagnostics.push(Diagnostic::UnrecognizedSchema {
        location,
        fragment: format!("status key {key:?}"),
      });
      continue;
    };

    let fragment = if let Some(target) = document::ref_target(raw) {
      match ctx.graph.resolve_chained(target) {
        Some((reference, fragment)) if reference.section == ComponentSection::Responses => fragment,
        _ => {
          ctx.diagnostics.push(Diagnostic::DanglingReference {
            pointer: target.to_string(),
            location,
          });
          continue;
        }
      }
    } else {
      raw
    };

    let mut content = IndexMap::new();
    if let Some(content_map) = document::get_object(fragment, "content") {
      for (content_type, media) in content_map {
        let media_location = format!("{location}/content/{}", content_type.replace('/', "~1"));
        let payload_stem = format!("{stem}{}", status_codes::response_suffix(selector));
        let property = match document::get(media, "schema") {
          Some(schema) => {
            crate::resolver::resolve_property(ctx, &media_location, &payload_stem, "body", "", false, schema)
          }
          None => Property::new("body", "", PropertyKind::Any),
        };
        content.insert(content_type.clone(), property);
      }
    }

    built.push(Response {
      selector,
      content,
      docs: document::docs_of(fragment),
    });
  }

  ResponseTable::new(built)
}
