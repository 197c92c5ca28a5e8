pub mod importer;
pub mod layout;
pub mod representation;
pub mod resolver;

pub use crate::utils::error::Result;
pub use importer::{ImportMode, ImportSettings, ModelImporter, DEFAULT_VERSION_COMMENT};
pub use layout::{FlowLayout, LayoutSettings};
