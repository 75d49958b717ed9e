use foundation::math::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComponentBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ComponentBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box resting on `base` (bottom face center) with the given extents.
    pub fn from_base(base: Vec3, width: f64, height: f64, depth: f64) -> Self {
        Self {
            min: Vec3::new(base.x - width * 0.5, base.y, base.z - depth * 0.5),
            max: Vec3::new(base.x + width * 0.5, base.y + height, base.z + depth * 0.5),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }
}
