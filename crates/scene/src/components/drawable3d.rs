#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape3D {
    Box { width: f64, height: f64, depth: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drawable3D {
    pub shape: Shape3D,
    /// Linear RGBA.
    pub color: [f32; 4],
}

impl Drawable3D {
    pub fn cuboid(width: f64, height: f64, depth: f64, color: [f32; 4]) -> Self {
        Self {
            shape: Shape3D::Box {
                width,
                height,
                depth,
            },
            color,
        }
    }
}
