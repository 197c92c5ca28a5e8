pub mod adapters;
pub mod config;
pub mod convert;
pub mod core;
pub mod dialect;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::ImporterConfig;

pub use adapters::{FileModelStore, InMemoryModelStore};
pub use core::{FlowLayout, ImportMode, ImportSettings, LayoutSettings, ModelImporter};
pub use dialect::DocumentFormat;
pub use domain::model::{Model, ModelHistory, ModelId, ModelRepresentation, ModelType};
pub use domain::ports::{LayoutEngine, ModelStore};
pub use utils::error::{ErrorCategory, ImportError, Result};
