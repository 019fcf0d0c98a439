//! The contract between the resolution engine and code emitters.
//!
//! Emitters consume a finished [`IrForest`] and never see raw schema syntax;
//! every kind they can encounter is a closed enum, so adding a new IR shape is
//! a compile error in every emitter rather than a silent fall-through.

use crate::ir::IrForest;

pub trait CodeEmitter {
  type Output;

  fn emit(&mut self, forest: &IrForest) -> anyhow::Result<Self::Output>;
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{
    builder::{BuildConfig, DocumentBuilder},
    ir::{PrimitiveKind, PropertyKind},
  };

  /// A deliberately tiny emitter that renders one line per model field,
  /// matching every IR kind exhaustively.
  struct OutlineEmitter;

  fn kind_label(forest: &IrForest, kind: &PropertyKind) -> String {
    match kind {
      PropertyKind::Primitive(PrimitiveKind::String) => "string".to_string(),
      PropertyKind::Primitive(PrimitiveKind::Integer) => "integer".to_string(),
      PropertyKind::Primitive(PrimitiveKind::Float) => "float".to_string(),
      PropertyKind::Primitive(PrimitiveKind::Boolean) => "boolean".to_string(),
      PropertyKind::DateTime => "date-time".to_string(),
      PropertyKind::Date => "date".to_string(),
      PropertyKind::Binary => "binary".to_string(),
      PropertyKind::Enum(id) => forest.arena.enum_def(*id).ident.clone(),
      PropertyKind::List(item) => format!("[{}]", kind_label(forest, &item.kind)),
      PropertyKind::FreeForm(value) => format!("{{{}}}", kind_label(forest, &value.kind)),
      PropertyKind::Any => "any".to_string(),
      PropertyKind::ModelRef(id) => forest.arena.model_ident(*id).to_string(),
      PropertyKind::Union(shape) => format!("union({})", shape.variants.len()),
      PropertyKind::Unknown => "unknown".to_string(),
    }
  }

  impl CodeEmitter for OutlineEmitter {
    type Output = String;

    fn emit(&mut self, forest: &IrForest) -> anyhow::Result<Self::Output> {
      let mut out = String::new();
      for model in forest.arena.models() {
        out.push_str(&model.ident);
        out.push('\n');
        for field in model.fields() {
          out.push_str(&format!("  {}: {}\n", field.ident, kind_label(forest, &field.kind)));
        }
      }
      Ok(out)
    }
  }

  #[test]
  fn test_emitter_walks_finished_forest() {
    let document = json!({
      "openapi": "3.0.3",
      "components": { "schemas": {
        "Pet": {
          "type": "object",
          "required": ["name"],
          "properties": {
            "name": { "type": "string" },
            "tags": { "type": "array", "items": { "type": "string" } }
          }
        }
      }}
    });
    let build = DocumentBuilder::new(BuildConfig::default()).build(&document).unwrap();

    let rendered = OutlineEmitter.emit(&build.forest).unwrap();
    assert!(rendered.contains("Pet\n"));
    assert!(rendered.contains("  name: string\n"));
    assert!(rendered.contains("  tags: [string]\n"));
  }
}
