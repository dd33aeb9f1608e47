pub mod ids;

// Foundation crate: small, well-tested primitives only.
pub use ids::*;
