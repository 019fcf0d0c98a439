//! Reference graph: canonical pointer indexing and `$ref` resolution.
//!
//! Pass 1 registers every named component under its canonical pointer path so
//! forward references resolve before their targets are filled. `$ref` chains
//! are followed to a grounded fragment; schema-level cycles are detected up
//! front so resolvers can hand out identity handles instead of recursing.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap};
use serde_json::Value;
use strum::Display;

use crate::document::{self, RawDocument};

pub(crate) const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// The component section a resolved pointer lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ComponentSection {
  #[strum(to_string = "schemas")]
  Schemas,
  #[strum(to_string = "parameters")]
  Parameters,
  #[strum(to_string = "responses")]
  Responses,
  #[strum(to_string = "requestBodies")]
  RequestBodies,
}

impl ComponentSection {
  pub(crate) const ALL: [Self; 4] = [Self::Schemas, Self::Parameters, Self::Responses, Self::RequestBodies];

  pub(crate) fn key(self) -> &'static str {
    match self {
      Self::Schemas => "schemas",
      Self::Parameters => "parameters",
      Self::Responses => "responses",
      Self::RequestBodies => "requestBodies",
    }
  }
}

/// A resolved pointer: canonical path, owning section, and component name.
/// Every `Reference` resolves to exactly one component; dangling pointers are
/// reported by the caller as hard errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  pub pointer: String,
  pub section: ComponentSection,
  pub name: String,
}

#[derive(Debug)]
pub(crate) struct ReferenceGraph<'a> {
  components: IndexMap<String, (ComponentSection, &'a Value)>,
  cyclic: BTreeSet<String>,
}

impl<'a> ReferenceGraph<'a> {
  /// Pass 1: registers every named component's pointer path.
  pub(crate) fn index(doc: &RawDocument<'a>) -> Self {
    let mut components = IndexMap::new();

    for section in ComponentSection::ALL {
      if let Some(entries) = doc.component_section(section.key()) {
        for (name, fragment) in entries {
          components.insert(format!("#/components/{}/{name}", section.key()), (section, fragment));
        }
      }
    }

    Self {
      components,
      cyclic: BTreeSet::new(),
    }
  }

  pub(crate) fn schema_pointer(name: &str) -> String {
    format!("{SCHEMA_REF_PREFIX}{name}")
  }

  pub(crate) fn schema_name(pointer: &str) -> Option<&str> {
    pointer.strip_prefix(SCHEMA_REF_PREFIX).filter(|name| !name.contains('/'))
  }

  /// Resolves one pointer to its registered component, without chasing
  /// nested `$ref` indirection.
  pub(crate) fn resolve(&self, pointer: &str) -> Option<(Reference, &'a Value)> {
    let (section, fragment) = self.components.get(pointer)?;
    let name = pointer.rsplit('/').next().unwrap_or_default().to_string();
    Some((
      Reference {
        pointer: pointer.to_string(),
        section: *section,
        name,
      },
      fragment,
    ))
  }

  /// Resolves a pointer, following chains of pure `$ref` aliases until a
  /// grounded fragment is reached. A chain that revisits a pointer has no
  /// grounded target and resolves to nothing.
  pub(crate) fn resolve_chained(&self, pointer: &str) -> Option<(Reference, &'a Value)> {
    let mut seen = BTreeSet::new();
    let mut current = pointer.to_string();
    loop {
      if !seen.insert(current.clone()) {
        return None;
      }
      let (reference, fragment) = self.resolve(&current)?;
      match document::ref_target(fragment) {
        Some(next) => current = next.to_string(),
        None => return Some((reference, fragment)),
      }
    }
  }

  pub(crate) fn named_schemas(&self) -> impl Iterator<Item = (&str, &'a Value)> {
    self.components.iter().filter_map(|(pointer, (section, fragment))| {
      matches!(section, ComponentSection::Schemas).then_some((pointer.as_str(), *fragment))
    })
  }

  /// Detects self- and mutual-reference cycles among named schemas. Members
  /// of a cycle are handed out as identity handles during resolution and
  /// flagged for indirection at emission.
  pub(crate) fn detect_cycles(&mut self) -> Vec<Vec<String>> {
    let mut dependencies: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (pointer, fragment) in self.named_schemas() {
      let Some(name) = Self::schema_name(pointer) else {
        continue;
      };
      let mut refs = BTreeSet::new();
      collect_schema_refs(fragment, &mut refs);
      dependencies.insert(name.to_string(), refs);
    }

    let mut graph = DiGraphMap::<&str, ()>::new();
    for (node, deps) in &dependencies {
      graph.add_node(node.as_str());
      for dep in deps {
        graph.add_edge(node.as_str(), dep.as_str(), ());
      }
    }

    let cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
      .into_iter()
      .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
      .map(|scc| scc.into_iter().map(String::from).collect())
      .collect();

    self.cyclic.extend(cycles.iter().flatten().cloned());
    cycles
  }

  pub(crate) fn is_cyclic(&self, schema_name: &str) -> bool {
    self.cyclic.contains(schema_name)
  }
}

/// Collects every named-schema `$ref` reachable inside one raw fragment.
fn collect_schema_refs(fragment: &Value, refs: &mut BTreeSet<String>) {
  if let Some(target) = document::ref_target(fragment) {
    if let Some(name) = ReferenceGraph::schema_name(target) {
      refs.insert(name.to_string());
    }
    return;
  }

  if let Some(properties) = document::get_object(fragment, "properties") {
    for prop in properties.values() {
      collect_schema_refs(prop, refs);
    }
  }
  for combinator in ["oneOf", "anyOf", "allOf"] {
    if let Some(variants) = document::get_array(fragment, combinator) {
      for variant in variants {
        collect_schema_refs(variant, refs);
      }
    }
  }
  if let Some(items) = document::get(fragment, "items") {
    collect_schema_refs(items, refs);
  }
  if let Some(additional) = document::get(fragment, "additionalProperties")
    && additional.is_object()
  {
    collect_schema_refs(additional, refs);
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn graph_for(doc: &Value) -> ReferenceGraph<'_> {
    ReferenceGraph::index(&RawDocument::parse(doc).unwrap())
  }

  #[test]
  fn test_resolve_registered_component() {
    let doc = json!({
      "openapi": "3.0.3",
      "components": { "schemas": { "Pet": { "type": "object" } } }
    });
    let graph = graph_for(&doc);

    let (reference, fragment) = graph.resolve("#/components/schemas/Pet").unwrap();
    assert_eq!(reference.section, ComponentSection::Schemas);
    assert_eq!(reference.name, "Pet");
    assert_eq!(document::type_of(fragment), Some("object"));
  }

  #[test]
  fn test_resolve_unknown_pointer_is_none() {
    let doc = json!({ "openapi": "3.0.3" });
    assert!(graph_for(&doc).resolve("#/components/schemas/Missing").is_none());
  }

  #[test]
  fn test_resolve_chained_follows_aliases() {
    let doc = json!({
      "openapi": "3.1.0",
      "components": { "schemas": {
        "A": { "$ref": "#/components/schemas/B" },
        "B": { "type": "string" }
      }}
    });
    let (reference, fragment) = graph_for(&doc).resolve_chained("#/components/schemas/A").unwrap();
    assert_eq!(reference.name, "B");
    assert_eq!(document::type_of(fragment), Some("string"));
  }

  #[test]
  fn test_resolve_chained_rejects_pure_alias_cycle() {
    let doc = json!({
      "openapi": "3.1.0",
      "components": { "schemas": {
        "A": { "$ref": "#/components/schemas/B" },
        "B": { "$ref": "#/components/schemas/A" }
      }}
    });
    assert!(graph_for(&doc).resolve_chained("#/components/schemas/A").is_none());
  }

  #[test]
  fn test_detect_cycles_flags_self_reference() {
    let doc = json!({
      "openapi": "3.0.3",
      "components": { "schemas": {
        "Node": {
          "type": "object",
          "properties": { "next": { "$ref": "#/components/schemas/Node" } }
        },
        "Leaf": { "type": "object", "properties": { "label": { "type": "string" } } }
      }}
    });
    let mut graph = graph_for(&doc);
    let cycles = graph.detect_cycles();

    assert_eq!(cycles, vec![vec!["Node".to_string()]]);
    assert!(graph.is_cyclic("Node"));
    assert!(!graph.is_cyclic("Leaf"));
  }

  #[test]
  fn test_detect_cycles_flags_mutual_reference() {
    let doc = json!({
      "openapi": "3.0.3",
      "components": { "schemas": {
        "Left": { "type": "object", "properties": { "right": { "$ref": "#/components/schemas/Right" } } },
        "Right": { "type": "object", "properties": { "left": { "$ref": "#/components/schemas/Left" } } }
      }}
    });
    let mut graph = graph_for(&doc);
    let cycles = graph.detect_cycles();

    assert_eq!(cycles.len(), 1);
    let mut members = cycles[0].clone();
    members.sort();
    assert_eq!(members, ["Left", "Right"]);
  }
}
