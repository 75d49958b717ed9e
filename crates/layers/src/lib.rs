pub mod layer;
pub mod planar;
pub mod scene_layer;
pub mod symbology;

pub use layer::*;
pub use planar::{MapFrame, MapView, PlanarMapLayer, PlanarSnapshot, TileLayer};
pub use scene_layer::{SceneLayer, TourSnapshot};
pub use symbology::{MarkerStyle, category_color, category_hex};
