//! Collision-free, deterministic identifier assignment.

pub(crate) mod identifiers;
pub(crate) mod registry;

pub(crate) use registry::{IdentKind, NameRegistry};
