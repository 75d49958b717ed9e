pub mod event_bus;
pub mod frame;
pub mod providers;
pub mod selection;

pub use event_bus::*;
pub use frame::*;
pub use providers::*;
pub use selection::*;
