//! Public façade for the drafting workflow layer.

pub mod controller;
pub mod export;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use controller::{Studio, StudioError, StudioSnapshot};
pub use state::{SectionEvent, StudioState, VariantBatch};
pub use types::{
    Category, ImageVariant, SectionKind, SectionState, SeoVariant, Settings, TextVariant, Variant,
};
