// Adapters layer: concrete model stores behind the `ModelStore` port.

pub mod file_store;
pub mod memory_store;

pub use file_store::FileModelStore;
pub use memory_store::InMemoryModelStore;
