use super::{Point3, Vector3, ON_SURFACE_THRESH};

/// One of the six faces of an axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    XMin,
    XMax,
    YMin,
    YMax,
    ZMin,
    ZMax,
}

impl Face {
    /// All faces in `±x, ±y, ±z` order.
    pub const ALL: [Face; 6] = [
        Face::XMin,
        Face::XMax,
        Face::YMin,
        Face::YMax,
        Face::ZMin,
        Face::ZMax,
    ];

    /// Coordinate axis normal to this face (0 = x, 1 = y, 2 = z).
    #[must_use]
    pub fn axis(self) -> usize {
        match self {
            Face::XMin | Face::XMax => 0,
            Face::YMin | Face::YMax => 1,
            Face::ZMin | Face::ZMax => 2,
        }
    }

    /// Returns `true` for the upper face along its axis.
    #[must_use]
    pub fn is_max(self) -> bool {
        matches!(self, Face::XMax | Face::YMax | Face::ZMax)
    }

    /// Index of this face in [`Face::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self.axis() * 2 + usize::from(self.is_max())
    }

    /// Mirrors the direction component normal to this face.
    #[must_use]
    pub fn reflect(self, direction: &Vector3) -> Vector3 {
        let mut reflected = *direction;
        reflected[self.axis()] = -reflected[self.axis()];
        reflected
    }
}

/// An axis-aligned bounding box. Unbounded axes use infinite extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a bounding box from its two corners.
    #[must_use]
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// The box covering all of space.
    #[must_use]
    pub fn infinite() -> Self {
        Self {
            min: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            max: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        }
    }

    /// The empty box, identity element for [`Aabb::union`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    #[must_use]
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::from(self.min.coords.sup(&other.min.coords)),
            max: Point3::from(self.max.coords.inf(&other.max.coords)),
        }
    }

    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point3::from(self.min.coords.inf(&other.min.coords)),
            max: Point3::from(self.max.coords.sup(&other.max.coords)),
        }
    }

    /// Returns `true` if the box has no volume on some axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.max[axis] - self.min[axis] <= ON_SURFACE_THRESH)
    }

    /// Extent along an axis; infinite for unbounded axes.
    #[must_use]
    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Centre of the box. Unbounded axes contribute 0, half-bounded axes their finite side.
    #[must_use]
    pub fn center(&self) -> Point3 {
        let mut center = Point3::origin();
        for axis in 0..3 {
            let (lo, hi) = (self.min[axis], self.max[axis]);
            center[axis] = match (lo.is_finite(), hi.is_finite()) {
                (true, true) => 0.5 * (lo + hi),
                (true, false) => lo,
                (false, true) => hi,
                (false, false) => 0.0,
            };
        }
        center
    }

    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Inclusive containment test with surface tolerance.
    #[must_use]
    pub fn contains(&self, point: &Point3) -> bool {
        (0..3).all(|axis| {
            point[axis] >= self.min[axis] - ON_SURFACE_THRESH
                && point[axis] <= self.max[axis] + ON_SURFACE_THRESH
        })
    }

    /// Containment test where a point on a face counts as outside if the
    /// direction leaves the box through that face.
    #[must_use]
    pub fn contains_along(&self, point: &Point3, direction: &Vector3) -> bool {
        self.contains(point) && self.exit_faces(point, direction).is_empty()
    }

    /// Faces a point on (or beyond) the boundary is leaving through.
    ///
    /// A direction component below `f64::EPSILON` in magnitude runs parallel
    /// to the face and never leaves through it.
    #[must_use]
    pub fn exit_faces(&self, point: &Point3, direction: &Vector3) -> Vec<Face> {
        Face::ALL
            .into_iter()
            .filter(|face| {
                let axis = face.axis();
                if face.is_max() {
                    direction[axis] >= f64::EPSILON
                        && point[axis] >= self.max[axis] - ON_SURFACE_THRESH
                } else {
                    direction[axis] <= -f64::EPSILON
                        && point[axis] <= self.min[axis] + ON_SURFACE_THRESH
                }
            })
            .collect()
    }

    /// Distance along `direction` from an interior point to the box boundary.
    #[must_use]
    pub fn distance_to_exit(&self, point: &Point3, direction: &Vector3) -> f64 {
        let mut distance = f64::INFINITY;
        for axis in 0..3 {
            let d = direction[axis];
            if d.abs() < f64::EPSILON {
                continue;
            }
            let bound = if d > 0.0 { self.max[axis] } else { self.min[axis] };
            let t = (bound - point[axis]) / d;
            if t > ON_SURFACE_THRESH && t < distance {
                distance = t;
            }
        }
        distance
    }
}
