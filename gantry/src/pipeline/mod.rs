//! Component resolution and pipeline composition.

mod component;
mod engine;

pub use component::{CastFn, ComponentDescriptor, ComponentKind, ComponentRef, FactoryFn};
pub use engine::{Chain, PipelineEntry, PipelineOptions, compose, resolve_entries};
