// Opaque value persistence (bincode files)
pub mod blob;
