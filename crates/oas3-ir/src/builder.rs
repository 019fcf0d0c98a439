//! Document builder: the fixed pass order that turns a parsed document tree
//! into an [`IrForest`].
//!
//! Pass 1 indexes components and reserves an identity handle plus a final
//! class name for every named object schema, in document order. Pass 2 fills
//! enums and models, again in document order, so forward and cyclic references
//! land on the handles reserved up front. Pass 3 walks `paths` and assembles
//! endpoints grouped by tag. A build with any diagnostic is rejected whole;
//! partially-resolved IR is never handed out.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::{
  assembler,
  diagnostics::{BuildStats, Diagnostic},
  document::{self, METHOD_KEYS, RawDocument},
  endpoint,
  graph::ReferenceGraph,
  ir::{Endpoint, EnumId, IrArena, IrForest, ModelId},
  naming::{IdentKind, NameRegistry},
  resolver,
};

/// Which revision's defaulting rules apply where 3.0 and 3.1 disagree,
/// notably the free-form capture default for object schemas. This is explicit
/// configuration, never inferred from document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecVersion {
  #[default]
  V3_0,
  V3_1,
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
  pub spec_version: SpecVersion,
  /// Tag assigned to operations that declare none.
  pub default_tag: String,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      spec_version: SpecVersion::default(),
      default_tag: "default".to_string(),
    }
  }
}

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("document root is not a JSON object")]
  MalformedRoot,
  #[error("unsupported OpenAPI version '{0}'")]
  UnsupportedVersion(String),
  #[error("document rejected: {}", crate::diagnostics::summarize(diagnostics))]
  Rejected {
    diagnostics: Vec<Diagnostic>,
    stats: BuildStats,
  },
}

/// A successful build: the forest plus counters describing it.
#[derive(Debug)]
pub struct IrBuild {
  pub forest: IrForest,
  pub stats: BuildStats,
}

/// Mutable state threaded through every resolution pass.
pub(crate) struct BuildContext<'a> {
  pub(crate) graph: ReferenceGraph<'a>,
  pub(crate) config: BuildConfig,
  pub(crate) names: NameRegistry,
  pub(crate) arena: IrArena,
  /// Canonical schema pointer to reserved model handle.
  pub(crate) model_ids: HashMap<String, ModelId>,
  /// Inline-object location to its synthesized model. Alias bodies are
  /// re-resolved at every `$ref` use site; the same location must keep
  /// handing out the same arena entry.
  pub(crate) synthetic_models: HashMap<String, ModelId>,
  /// Resolved enum class name to the arena entry owning it.
  pub(crate) enum_idents: HashMap<String, EnumId>,
  /// Canonical schema pointer to built enum, memoizing named enum resolution.
  pub(crate) enum_pointers: HashMap<String, EnumId>,
  /// Alias pointers currently being resolved in place, for cycle refusal.
  pub(crate) alias_stack: Vec<String>,
  pub(crate) diagnostics: Vec<Diagnostic>,
  pub(crate) stats: BuildStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaRole {
  Model,
  Enum,
  /// Scalar, array, or union shorthand; resolved in place at each use site.
  Alias,
}

fn classify(fragment: &Value) -> SchemaRole {
  if document::get_array(fragment, "enum").is_some() {
    return SchemaRole::Enum;
  }
  let object_like = document::get_object(fragment, "properties").is_some()
    || document::get_array(fragment, "allOf").is_some_and(|entries| !entries.is_empty())
    || document::type_of(fragment) == Some("object")
    || document::get(fragment, "additionalProperties").is_some();
  if object_like {
    SchemaRole::Model
  } else {
    SchemaRole::Alias
  }
}

#[derive(Debug, Default)]
pub struct DocumentBuilder {
  config: BuildConfig,
}

impl DocumentBuilder {
  #[must_use]
  pub fn new(config: BuildConfig) -> Self {
    Self { config }
  }

  /// Resolves one document tree into IR, or rejects it with every diagnostic
  /// found in the run.
  pub fn build(&self, document: &Value) -> Result<IrBuild, BuildError> {
    let doc = RawDocument::parse(document)?;

    let mut graph = ReferenceGraph::index(&doc);
    let cycles = graph.detect_cycles();

    let mut ctx = BuildContext {
      graph,
      config: self.config.clone(),
      names: NameRegistry::new(),
      arena: IrArena::default(),
      model_ids: HashMap::new(),
      synthetic_models: HashMap::new(),
      enum_idents: HashMap::new(),
      enum_pointers: HashMap::new(),
      alias_stack: Vec::new(),
      diagnostics: Vec::new(),
      stats: BuildStats::default(),
    };
    ctx.stats.record_cycles(cycles);

    // Pass 1: reserve a handle and claim a class name for every named object
    // schema before any body is resolved, so forward and cyclic references
    // already have something to point at.
    let mut plan: Vec<(SchemaRole, String, String, &Value)> = Vec::new();
    for (pointer, fragment) in ctx.graph.named_schemas() {
      let Some(name) = ReferenceGraph::schema_name(pointer) else {
        continue;
      };
      plan.push((classify(fragment), pointer.to_string(), name.to_string(), fragment));
    }
    for (role, pointer, name, _) in &plan {
      if *role == SchemaRole::Model {
        let ident = ctx.names.assign(name, IdentKind::Type, pointer);
        let id = ctx.arena.reserve_model(&ident, pointer);
        ctx.model_ids.insert(pointer.clone(), id);
      }
    }

    // Pass 2: fill bodies in document order.
    for (role, pointer, name, fragment) in &plan {
      match role {
        SchemaRole::Enum => resolver::resolve_named_enum(&mut ctx, pointer, name, fragment),
        SchemaRole::Model => {
          if let Some(&id) = ctx.model_ids.get(pointer) {
            let ident = ctx.arena.model_ident(id).to_string();
            assembler::assemble_model(&mut ctx, id, pointer, &ident, fragment);
          }
        }
        SchemaRole::Alias => {}
      }
    }

    // Pass 3: endpoints, grouped by tag in first-appearance order.
    let mut endpoints: IndexMap<String, Vec<Endpoint>> = IndexMap::new();
    let global_security = doc.has_global_security();
    if let Some(paths) = doc.paths() {
      for (path, path_item) in paths {
        for method_key in METHOD_KEYS.iter().copied() {
          let Some(operation) = document::get(path_item, method_key) else {
            continue;
          };
          if !operation.is_object() {
            continue;
          }
          if let Some(built) =
            endpoint::build_endpoint(&mut ctx, path, method_key, path_item, operation, global_security)
          {
            endpoints.entry(built.tag.clone()).or_default().push(built);
          }
        }
      }
    }

    // A reserved slot left unfilled means a schema body never resolved.
    let unfilled: Vec<String> = ctx
      .arena
      .unfilled_models()
      .map(|(_, pointer)| pointer.to_string())
      .collect();
    for pointer in unfilled {
      ctx.diagnostics.push(Diagnostic::UnrecognizedSchema {
        location: pointer,
        fragment: "model reserved but never filled".to_string(),
      });
    }

    if !ctx.diagnostics.is_empty() {
      return Err(BuildError::Rejected {
        diagnostics: ctx.diagnostics,
        stats: ctx.stats,
      });
    }

    Ok(IrBuild {
      forest: IrForest {
        endpoints,
        arena: ctx.arena,
      },
      stats: ctx.stats,
    })
  }
}
