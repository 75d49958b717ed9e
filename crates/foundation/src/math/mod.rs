pub mod geo;
pub mod local;
pub mod precision;
pub mod vec;

pub use geo::*;
pub use local::*;
pub use precision::*;
pub use vec::*;
