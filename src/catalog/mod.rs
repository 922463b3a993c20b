//! Table catalog

mod registry;

#[cfg(test)]
pub(crate) mod fixtures;

pub use registry::Catalog;
