//! Endpoint assembler: builds one [`Endpoint`] IR node per path/method
//! operation, partitioning parameters by location, classifying the request
//! body, and ordering the response table.

pub(crate) mod parameters;
pub(crate) mod requests;
pub(crate) mod responses;
pub(crate) mod status_codes;

use http::Method;
use serde_json::Value;

use crate::{
  builder::BuildContext,
  document,
  ir::Endpoint,
  naming::{IdentKind, identifiers::to_type_ident},
};

pub(crate) fn method_from_key(key: &str) -> Option<Method> {
  match key {
    "get" => Some(Method::GET),
    "put" => Some(Method::PUT),
    "post" => Some(Method::POST),
    "delete" => Some(Method::DELETE),
    "options" => Some(Method::OPTIONS),
    "head" => Some(Method::HEAD),
    "patch" => Some(Method::PATCH),
    "trace" => Some(Method::TRACE),
    _ => None,
  }
}

pub(crate) fn build_endpoint<'a>(
  ctx: &mut BuildContext<'a>,
  path: &str,
  method_key: &str,
  path_item: &'a Value,
  operation: &'a Value,
  global_security: bool,
) -> Option<Endpoint> {
  let method = method_from_key(method_key)?;
  let operation_location = format!("#/paths/{}/{method_key}", path.replace('/', "~1"));

  let raw_name = document::get_str(operation, "operationId").map_or_else(
    || infer_operation_name(method_key, path),
    str::to_string,
  );
  let operation_name = ctx.names.assign(&raw_name, IdentKind::Field, &operation_location);
  let stem = to_type_ident(&raw_name);

  let tag = document::get_array(operation, "tags")
    .and_then(|tags| tags.first())
    .and_then(Value::as_str)
    .map_or_else(|| ctx.config.default_tag.clone(), str::to_string);

  let requires_auth = match document::get_array(operation, "security") {
    Some(requirements) => !requirements.is_empty(),
    None => global_security,
  };

  let parameters = parameters::collect(
    ctx,
    path,
    document::get_array(path_item, "parameters"),
    document::get_array(operation, "parameters"),
    &operation_location,
    &stem,
  );
  let request_body = requests::build(ctx, &operation_location, &stem, operation);
  let responses = responses::build_table(ctx, &operation_location, &stem, operation);

  ctx.stats.record_endpoint();

  Some(Endpoint {
    path_template: path.to_string(),
    method,
    operation_name,
    parameters,
    request_body,
    responses,
    requires_auth,
    tag,
    deprecated: document::is_deprecated(operation),
    docs: document::docs_of(operation),
  })
}

/// Deterministic fallback name for operations without an `operationId`,
/// derived from the method and path segments.
fn infer_operation_name(method: &str, path: &str) -> String {
  let mut parts = vec![method.to_string()];
  for segment in path.split('/').filter(|segment| !segment.is_empty()) {
    match segment.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
      Some(param) => parts.push(format!("by_{param}")),
      None => parts.push(segment.to_string()),
    }
  }
  parts.join("_")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_method_from_key_rejects_non_methods() {
    assert_eq!(method_from_key("get"), Some(Method::GET));
    assert_eq!(method_from_key("parameters"), None);
    assert_eq!(method_from_key("summary"), None);
  }

  #[test]
  fn test_infer_operation_name_from_template() {
    assert_eq!(infer_operation_name("get", "/pets/{petId}/photos"), "get_pets_by_petId_photos");
    assert_eq!(infer_operation_name("delete", "/"), "delete");
  }
}
