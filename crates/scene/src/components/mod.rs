pub mod bounds;
pub mod drawable3d;
pub mod label;

pub use bounds::*;
pub use drawable3d::*;
pub use label::*;
