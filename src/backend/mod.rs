mod map_backend;

pub use map_backend::MapBackend;
