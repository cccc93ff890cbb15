//! Pure scoring functions: no database access, deterministic for equal inputs.

pub mod allocator;
pub mod feedback;
pub mod normalizer;
pub mod qol;
pub mod stats;

pub use allocator::*;
pub use feedback::*;
pub use normalizer::*;
pub use qol::*;
pub use stats::*;
