//! The collision table shared by user-declared and synthesized names.

use std::collections::HashMap;

use super::identifiers::{to_field_ident, to_member_ident, to_module_ident, to_type_ident};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum IdentKind {
  Type,
  Field,
  EnumMember,
  Module,
}

/// Assigns target-language-safe identifiers, deterministically given a fixed
/// assignment order.
///
/// On collision with an already-assigned identifier of the same kind but a
/// different origin, the disambiguating suffix is derived from the owning
/// pointer path — never a bare counter — so output names stay stable when
/// unrelated parts of the document change.
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
  assigned: HashMap<(IdentKind, String), String>,
}

impl NameRegistry {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn assign(&mut self, candidate: &str, kind: IdentKind, origin: &str) -> String {
    let base = normalize(candidate, kind);
    if self.claim(&base, kind, origin) {
      return base;
    }

    let segments = origin_segments(origin);
    for take in 1..=segments.len() {
      let tail = segments[segments.len() - take..].join("_");
      let attempt = join_suffix(&base, &tail, kind);
      if self.claim(&attempt, kind, origin) {
        return attempt;
      }
    }

    // Distinct origins can normalize to the same path suffix; extend the full
    // path with an index so the loop always terminates.
    let full_tail = segments.join("_");
    for index in 2.. {
      let attempt = join_suffix(&base, &format!("{full_tail}_{index}"), kind);
      if self.claim(&attempt, kind, origin) {
        return attempt;
      }
    }
    unreachable!("claim eventually succeeds for a fresh suffix");
  }

  /// Claims `ident` for `origin`; re-claims by the same origin are idempotent.
  fn claim(&mut self, ident: &str, kind: IdentKind, origin: &str) -> bool {
    match self.assigned.get(&(kind, ident.to_string())) {
      Some(owner) => owner == origin,
      None => {
        self.assigned.insert((kind, ident.to_string()), origin.to_string());
        true
      }
    }
  }

  /// Origin pointer currently owning `ident`, if any.
  pub(crate) fn owner_of(&self, ident: &str, kind: IdentKind) -> Option<&str> {
    self.assigned.get(&(kind, ident.to_string())).map(String::as_str)
  }
}

fn normalize(candidate: &str, kind: IdentKind) -> String {
  match kind {
    IdentKind::Type => to_type_ident(candidate),
    IdentKind::Field => to_field_ident(candidate),
    IdentKind::EnumMember => to_member_ident(candidate),
    IdentKind::Module => to_module_ident(candidate),
  }
}

fn join_suffix(base: &str, tail: &str, kind: IdentKind) -> String {
  match kind {
    IdentKind::Type | IdentKind::EnumMember => format!("{base}{}", to_type_ident(tail)),
    IdentKind::Field | IdentKind::Module => format!("{base}_{}", to_field_ident(tail)),
  }
}

fn origin_segments(origin: &str) -> Vec<String> {
  origin
    .trim_start_matches('#')
    .split('/')
    .map(|segment| segment.replace("~1", "_").replace("~0", "_"))
    .filter(|segment| !segment.is_empty())
    .collect()
}
