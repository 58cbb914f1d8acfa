mod registry;

pub use registry::InMemoryClientRegistry;
