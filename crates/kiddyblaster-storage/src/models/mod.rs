pub mod entry;

pub use entry::RegistryEntry;
