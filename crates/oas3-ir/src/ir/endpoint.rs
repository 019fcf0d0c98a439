use http::Method;
use indexmap::IndexMap;
use strum::Display;

use super::{ModelId, Property};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ParameterLocation {
  #[strum(to_string = "path")]
  Path,
  #[strum(to_string = "query")]
  Query,
  #[strum(to_string = "header")]
  Header,
  #[strum(to_string = "cookie")]
  Cookie,
}

impl ParameterLocation {
  pub(crate) fn parse(raw: &str) -> Option<Self> {
    match raw {
      "path" => Some(Self::Path),
      "query" => Some(Self::Query),
      "header" => Some(Self::Header),
      "cookie" => Some(Self::Cookie),
      _ => None,
    }
  }
}

/// Serialization style for array/object parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ParameterStyle {
  #[strum(to_string = "form")]
  Form,
  #[strum(to_string = "simple")]
  Simple,
  #[strum(to_string = "label")]
  Label,
  #[strum(to_string = "matrix")]
  Matrix,
  #[strum(to_string = "spaceDelimited")]
  SpaceDelimited,
  #[strum(to_string = "pipeDelimited")]
  PipeDelimited,
  #[strum(to_string = "deepObject")]
  DeepObject,
}

impl ParameterStyle {
  pub(crate) fn parse(raw: &str) -> Option<Self> {
    match raw {
      "form" => Some(Self::Form),
      "simple" => Some(Self::Simple),
      "label" => Some(Self::Label),
      "matrix" => Some(Self::Matrix),
      "spaceDelimited" => Some(Self::SpaceDelimited),
      "pipeDelimited" => Some(Self::PipeDelimited),
      "deepObject" => Some(Self::DeepObject),
      _ => None,
    }
  }

  /// Default style per location, as fixed by the OpenAPI specification.
  #[must_use]
  pub fn default_for(location: ParameterLocation) -> Self {
    match location {
      ParameterLocation::Query | ParameterLocation::Cookie => Self::Form,
      ParameterLocation::Path | ParameterLocation::Header => Self::Simple,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  pub location: ParameterLocation,
  pub style: ParameterStyle,
  pub explode: bool,
  pub property: Property,
}

/// The request body variant an endpoint accepts.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
  #[default]
  None,
  Json {
    property: Property,
  },
  /// `application/x-www-form-urlencoded`.
  Form {
    model: ModelId,
  },
  /// `multipart/form-data`; each model field is emitted as an individual part,
  /// with binary fields mapped to file parts.
  Multipart {
    model: ModelId,
  },
  RawBytes {
    content_type: String,
  },
}

/// Which runtime status codes a declared response covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSelector {
  Exact(u16),
  /// A status class wildcard such as `4XX`; the payload is the leading digit.
  Range(u8),
  Default,
}

impl StatusSelector {
  #[must_use]
  pub fn matches(&self, status: u16) -> bool {
    match self {
      Self::Exact(code) => *code == status,
      Self::Range(class) => status / 100 == u16::from(*class),
      Self::Default => true,
    }
  }
}

impl std::fmt::Display for StatusSelector {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Exact(code) => write!(f, "{code}"),
      Self::Range(class) => write!(f, "{class}XX"),
      Self::Default => write!(f, "default"),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
  pub selector: StatusSelector,
  /// Response content type to the payload it decodes into, in document order.
  /// Decoders branch on the observed content type and fall through to
  /// "unparsed" when none match.
  pub content: IndexMap<String, Property>,
  pub docs: Option<String>,
}

/// Declared responses in document order, with the fixed lookup precedence the
/// emitted decoder must apply.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseTable {
  responses: Vec<Response>,
}

impl ResponseTable {
  pub(crate) fn new(responses: Vec<Response>) -> Self {
    Self { responses }
  }

  /// Declaration order, untouched; precedence is a property of `select`, not
  /// of storage.
  pub fn iter(&self) -> impl Iterator<Item = &Response> {
    self.responses.iter()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.responses.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.responses.is_empty()
  }

  /// Picks the response a runtime status decodes with: an exact code match
  /// first, then range wildcards in declaration order, then `default`,
  /// regardless of how the document interleaved them.
  #[must_use]
  pub fn select(&self, status: u16) -> Option<&Response> {
    self
      .responses
      .iter()
      .find(|response| matches!(response.selector, StatusSelector::Exact(code) if code == status))
      .or_else(|| {
        self
          .responses
          .iter()
          .find(|response| matches!(response.selector, StatusSelector::Range(_)) && response.selector.matches(status))
      })
      .or_else(|| {
        self
          .responses
          .iter()
          .find(|response| response.selector == StatusSelector::Default)
      })
  }
}

/// One operation's worth of IR: everything an emitter needs to render a typed
/// client method.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
  pub path_template: String,
  pub method: Method,
  pub operation_name: String,
  pub parameters: Vec<Parameter>,
  pub request_body: RequestBody,
  pub responses: ResponseTable,
  pub requires_auth: bool,
  pub tag: String,
  pub deprecated: bool,
  pub docs: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn response(selector: StatusSelector) -> Response {
    Response {
      selector,
      content: IndexMap::new(),
      docs: None,
    }
  }

  #[test]
  fn test_select_prefers_exact_over_range_and_default() {
    let table = ResponseTable::new(vec![
      response(StatusSelector::Exact(200)),
      response(StatusSelector::Exact(404)),
      response(StatusSelector::Range(4)),
      response(StatusSelector::Default),
    ]);

    assert_eq!(table.select(404).unwrap().selector, StatusSelector::Exact(404));
    assert_eq!(table.select(430).unwrap().selector, StatusSelector::Range(4));
    assert_eq!(table.select(500).unwrap().selector, StatusSelector::Default);
  }

  #[test]
  fn test_select_ignores_declaration_interleaving() {
    // default declared first must still lose to the exact match
    let table = ResponseTable::new(vec![
      response(StatusSelector::Default),
      response(StatusSelector::Range(4)),
      response(StatusSelector::Exact(404)),
    ]);
    assert_eq!(table.select(404).unwrap().selector, StatusSelector::Exact(404));
  }

  #[test]
  fn test_select_range_declaration_order_breaks_ties() {
    let table = ResponseTable::new(vec![response(StatusSelector::Range(4)), response(StatusSelector::Range(4))]);
    let selected = table.select(422).unwrap();
    assert!(std::ptr::eq(selected, table.iter().next().unwrap()));
  }

  #[test]
  fn test_select_none_when_nothing_matches() {
    let table = ResponseTable::new(vec![response(StatusSelector::Exact(200))]);
    assert!(table.select(500).is_none());
  }

  #[test]
  fn test_default_style_per_location() {
    assert_eq!(
      ParameterStyle::default_for(ParameterLocation::Query),
      ParameterStyle::Form
    );
    assert_eq!(
      ParameterStyle::default_for(ParameterLocation::Path),
      ParameterStyle::Simple
    );
    assert_eq!(
      ParameterStyle::default_for(ParameterLocation::Cookie),
      ParameterStyle::Form
    );
    assert_eq!(
      ParameterStyle::default_for(ParameterLocation::Header),
      ParameterStyle::Simple
    );
  }
}
