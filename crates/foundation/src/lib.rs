//! Geometry and bookkeeping primitives shared by the campus crates.

pub mod bounds;
pub mod handles;
pub mod math;

pub use bounds::GeoBounds;
pub use handles::{Handle, HandleAllocator};
