//! Status code selector parsing.

use crate::ir::StatusSelector;

/// Parses a responses-map key. Accepts exact codes (`"404"`), class wildcards
/// (`"4XX"`, case-insensitive), and `"default"`; everything else is rejected
/// so the caller can report it.
pub(crate) fn parse_selector(key: &str) -> Option<StatusSelector> {
  if key.eq_ignore_ascii_case("default") {
    return Some(StatusSelector::Default);
  }
  if key.len() != 3 {
    return None;
  }
  if let Ok(code) = key.parse::<u16>() {
    return (100..=599).contains(&code).then_some(StatusSelector::Exact(code));
  }

  let bytes = key.as_bytes();
  if bytes[1].eq_ignore_ascii_case(&b'X') && bytes[2].eq_ignore_ascii_case(&b'X') && bytes[0].is_ascii_digit() {
    let class = bytes[0] - b'0';
    return (1..=5).contains(&class).then_some(StatusSelector::Range(class));
  }
  None
}

/// Type-name suffix for payloads synthesized inside a response, keeping
/// distinct statuses from colliding on the same operation stem.
pub(crate) fn response_suffix(selector: StatusSelector) -> String {
  match selector {
    StatusSelector::Exact(code) => format!("Response{code}"),
    StatusSelector::Range(class) => format!("Response{class}xx"),
    StatusSelector::Default => "ResponseDefault".to_string(),
  }
}
