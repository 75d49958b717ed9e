//! Minimal 3D campus world: box entities, labels, the tour camera and picking.

pub mod camera;
pub mod components;
pub mod entity;
pub mod picking;
pub mod world;

pub use camera::*;
pub use entity::EntityId;
pub use picking::{PickHit, PickOptions, Ray, pick_ray, pick_screen};
pub use world::*;
