// Module declarations
pub mod error;
pub mod value;
pub mod tabular;

// Re-exports for convenience
pub use error::DatabaseError;
pub use value::Value;
pub use tabular::TabularResult;
