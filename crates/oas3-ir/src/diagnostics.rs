//! Diagnostics and statistics collected across one build.
//!
//! Every recoverable problem is recorded here instead of aborting the pass, so
//! a single run can surface as many document errors as possible. The builder
//! refuses to hand out IR when the diagnostic list is non-empty.

use itertools::Itertools;
use strum::Display;

/// A recoverable document error, recorded with enough context to report the
/// failing pointer path precisely.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Diagnostic {
  #[strum(to_string = "dangling reference '{pointer}' (referenced from {location})")]
  DanglingReference { pointer: String, location: String },
  #[strum(to_string = "naming conflict: '{ident}' is produced by both {first} and {second} with incompatible shapes")]
  NamingConflict { ident: String, first: String, second: String },
  #[strum(to_string = "unrecognized schema shape at {location}: {fragment}")]
  UnrecognizedSchema { location: String, fragment: String },
  #[strum(to_string = "'{model}' lists '{name}' as required but never declares it")]
  MissingRequiredDeclaration { model: String, name: String },
  #[strum(to_string = "default literal {value} at {location} does not round-trip through type {expected}")]
  InvalidDefault {
    location: String,
    value: String,
    expected: String,
  },
}

impl Diagnostic {
  #[must_use]
  pub fn kind(&self) -> DiagnosticKind {
    match self {
      Self::DanglingReference { .. } => DiagnosticKind::DanglingReference,
      Self::NamingConflict { .. } => DiagnosticKind::NamingConflict,
      Self::UnrecognizedSchema { .. } => DiagnosticKind::UnrecognizedSchema,
      Self::MissingRequiredDeclaration { .. } => DiagnosticKind::MissingRequiredDeclaration,
      Self::InvalidDefault { .. } => DiagnosticKind::InvalidDefault,
    }
  }
}

/// One-line rollup of a diagnostic list, grouped by kind.
pub(crate) fn summarize(diagnostics: &[Diagnostic]) -> String {
  diagnostics
    .iter()
    .counts_by(Diagnostic::kind)
    .into_iter()
    .sorted_by_key(|(kind, _)| kind.to_string())
    .map(|(kind, count)| format!("{count} {kind}"))
    .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DiagnosticKind {
  DanglingReference,
  NamingConflict,
  UnrecognizedSchema,
  MissingRequiredDeclaration,
  InvalidDefault,
}

/// Counters describing what one build produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildStats {
  pub models_built: usize,
  pub enums_built: usize,
  pub endpoints_built: usize,
  pub synthetic_types_named: usize,
  pub synthesized_path_params: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
}

impl BuildStats {
  pub fn record_model(&mut self) {
    self.models_built += 1;
  }

  pub fn record_enum(&mut self) {
    self.enums_built += 1;
  }

  pub fn record_endpoint(&mut self) {
    self.endpoints_built += 1;
  }

  pub fn record_synthetic_type(&mut self) {
    self.synthetic_types_named += 1;
  }

  pub fn record_synthesized_path_param(&mut self) {
    self.synthesized_path_params += 1;
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    self.cycles_detected += cycles.len();
    self.cycle_details.extend(cycles);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_diagnostic_display_includes_context() {
    let diag = Diagnostic::DanglingReference {
      pointer: "#/components/schemas/Missing".to_string(),
      location: "#/components/schemas/Pet/properties/owner".to_string(),
    };
    let rendered = diag.to_string();
    assert!(rendered.contains("#/components/schemas/Missing"));
    assert!(rendered.contains("properties/owner"));
    assert_eq!(diag.kind(), DiagnosticKind::DanglingReference);
  }

  #[test]
  fn test_summarize_groups_by_kind() {
    let diagnostics = vec![
      Diagnostic::DanglingReference {
        pointer: "#/components/schemas/A".to_string(),
        location: "#/x".to_string(),
      },
      Diagnostic::DanglingReference {
        pointer: "#/components/schemas/B".to_string(),
        location: "#/y".to_string(),
      },
      Diagnostic::MissingRequiredDeclaration {
        model: "Pet".to_string(),
        name: "ghost".to_string(),
      },
    ];
    assert_eq!(summarize(&diagnostics), "2 DanglingReference, 1 MissingRequiredDeclaration");
  }

  #[test]
  fn test_stats_record_cycles() {
    let mut stats = BuildStats::default();
    stats.record_cycles(vec![vec!["Node".to_string()], vec!["A".to_string(), "B".to_string()]]);
    assert_eq!(stats.cycles_detected, 2);
    assert_eq!(stats.cycle_details.len(), 2);
  }
}
