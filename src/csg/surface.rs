use crate::error::{CsgError, Result};
use crate::math::{Aabb, Point3, Vector3, ON_SURFACE_THRESH, TINY_MOVE, TOLERANCE};

slotmap::new_key_type! {
    /// Unique identifier for a surface in the CSG store.
    pub struct SurfaceKey;
}

/// User-facing surface identifier.
pub type SurfaceId = u32;

/// Boundary condition applied where a surface bounds the root universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundaryType {
    /// Particles leaving through the boundary are lost.
    #[default]
    Vacuum,
    /// Particles are mirrored back into the geometry.
    Reflective,
}

/// Quadric shape of a surface.
///
/// Every variant's `evaluate` is a signed distance or a monotone function of
/// it, negative on the inside of the `Negative` halfspace.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceKind {
    /// `x - x0 = 0`.
    XPlane { x0: f64 },
    /// `y - y0 = 0`.
    YPlane { y0: f64 },
    /// `z - z0 = 0`.
    ZPlane { z0: f64 },
    /// `n · p + d = 0` with unit normal `n`.
    Plane { normal: Vector3, d: f64 },
    /// `(x - x0)^2 + (y - y0)^2 - r^2 = 0`.
    ZCylinder { x0: f64, y0: f64, radius: f64 },
}

/// A named surface with an optional boundary condition.
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    name: String,
    kind: SurfaceKind,
    boundary: Option<BoundaryType>,
}

impl Surface {
    /// Creates a plane normal to x at `x0`.
    #[must_use]
    pub fn x_plane(id: SurfaceId, x0: f64) -> Self {
        Self::from_kind(id, SurfaceKind::XPlane { x0 })
    }

    /// Creates a plane normal to y at `y0`.
    #[must_use]
    pub fn y_plane(id: SurfaceId, y0: f64) -> Self {
        Self::from_kind(id, SurfaceKind::YPlane { y0 })
    }

    /// Creates a plane normal to z at `z0`.
    #[must_use]
    pub fn z_plane(id: SurfaceId, z0: f64) -> Self {
        Self::from_kind(id, SurfaceKind::ZPlane { z0 })
    }

    /// Creates the general plane `a x + b y + c z + d = 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `(a, b, c)` is a zero vector.
    pub fn plane(id: SurfaceId, a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let normal = Vector3::new(a, b, c);
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(CsgError::DegenerateSurface(format!("plane {id} has a zero normal")).into());
        }
        Ok(Self::from_kind(
            id,
            SurfaceKind::Plane {
                normal: normal / len,
                d: d / len,
            },
        ))
    }

    /// Creates an infinite cylinder parallel to z.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not positive.
    pub fn z_cylinder(id: SurfaceId, x0: f64, y0: f64, radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(CsgError::DegenerateSurface(format!(
                "cylinder {id} radius must be positive"
            ))
            .into());
        }
        Ok(Self::from_kind(id, SurfaceKind::ZCylinder { x0, y0, radius }))
    }

    fn from_kind(id: SurfaceId, kind: SurfaceKind) -> Self {
        Self {
            id,
            name: String::new(),
            kind,
            boundary: None,
        }
    }

    /// Sets a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks this surface as a geometry boundary.
    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundaryType) -> Self {
        self.boundary = Some(boundary);
        self
    }

    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &SurfaceKind {
        &self.kind
    }

    /// The boundary condition, or `None` for an interior surface.
    #[must_use]
    pub fn boundary(&self) -> Option<BoundaryType> {
        self.boundary
    }

    /// Evaluates the surface function at a point.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        match self.kind {
            SurfaceKind::XPlane { x0 } => point.x - x0,
            SurfaceKind::YPlane { y0 } => point.y - y0,
            SurfaceKind::ZPlane { z0 } => point.z - z0,
            SurfaceKind::Plane { normal, d } => normal.dot(&point.coords) + d,
            SurfaceKind::ZCylinder { x0, y0, radius } => {
                let dx = point.x - x0;
                let dy = point.y - y0;
                dx * dx + dy * dy - radius * radius
            }
        }
    }

    /// Smallest strictly forward distance along `direction` at which the ray
    /// from `point` meets this surface, or `f64::INFINITY`.
    #[must_use]
    pub fn min_distance(&self, point: &Point3, direction: &Vector3) -> f64 {
        match self.kind {
            SurfaceKind::XPlane { x0 } => axis_plane_distance(point.x, direction.x, x0),
            SurfaceKind::YPlane { y0 } => axis_plane_distance(point.y, direction.y, y0),
            SurfaceKind::ZPlane { z0 } => axis_plane_distance(point.z, direction.z, z0),
            SurfaceKind::Plane { normal, d } => {
                let denom = normal.dot(direction);
                if denom.abs() < TOLERANCE {
                    return f64::INFINITY;
                }
                forward(-(normal.dot(&point.coords) + d) / denom)
            }
            SurfaceKind::ZCylinder { x0, y0, radius } => {
                let a = direction.x * direction.x + direction.y * direction.y;
                if a < TOLERANCE {
                    return f64::INFINITY;
                }
                let px = point.x - x0;
                let py = point.y - y0;
                let b = 2.0 * (direction.x * px + direction.y * py);
                let c = px * px + py * py - radius * radius;
                let discriminant = b * b - 4.0 * a * c;
                if discriminant < 0.0 {
                    return f64::INFINITY;
                }
                let root = discriminant.sqrt();
                let near = forward((-b - root) / (2.0 * a));
                if near.is_finite() {
                    near
                } else {
                    forward((-b + root) / (2.0 * a))
                }
            }
        }
    }

    /// Axis-aligned bounds of one side of the surface; infinite where the side is unbounded.
    #[must_use]
    pub fn halfspace_bounds(&self, sense: Sense) -> Aabb {
        let mut bounds = Aabb::infinite();
        let positive = sense == Sense::Positive;
        match self.kind {
            SurfaceKind::XPlane { x0 } => clip_axis(&mut bounds, 0, x0, positive),
            SurfaceKind::YPlane { y0 } => clip_axis(&mut bounds, 1, y0, positive),
            SurfaceKind::ZPlane { z0 } => clip_axis(&mut bounds, 2, z0, positive),
            SurfaceKind::ZCylinder { x0, y0, radius } if !positive => {
                bounds.min.x = x0 - radius;
                bounds.max.x = x0 + radius;
                bounds.min.y = y0 - radius;
                bounds.max.y = y0 + radius;
            }
            _ => {}
        }
        bounds
    }
}

fn axis_plane_distance(position: f64, direction: f64, plane: f64) -> f64 {
    if direction.abs() < f64::EPSILON {
        return f64::INFINITY;
    }
    forward((plane - position) / direction)
}

fn forward(t: f64) -> f64 {
    if t > ON_SURFACE_THRESH {
        t
    } else {
        f64::INFINITY
    }
}

fn clip_axis(bounds: &mut Aabb, axis: usize, value: f64, positive: bool) {
    if positive {
        bounds.min[axis] = value;
    } else {
        bounds.max[axis] = value;
    }
}

/// Which side of a surface a halfspace selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    /// Points where the surface function is positive.
    Positive,
    /// Points where the surface function is negative.
    Negative,
}

impl Sense {
    fn sign(self) -> f64 {
        match self {
            Sense::Positive => 1.0,
            Sense::Negative => -1.0,
        }
    }
}

/// Tests whether `point` lies on the `sense` side of `surface`.
///
/// Points within [`ON_SURFACE_THRESH`] of the surface are classified by the
/// point a [`TINY_MOVE`] further along `direction`. Without a direction, or when
/// the step runs along the surface, boundary points belong to both sides.
#[must_use]
pub fn halfspace_contains(
    surface: &Surface,
    sense: Sense,
    point: &Point3,
    direction: Option<&Vector3>,
) -> bool {
    let mut value = surface.evaluate(point);
    if value.abs() < ON_SURFACE_THRESH {
        let Some(direction) = direction else {
            return true;
        };
        value = surface.evaluate(&(point + direction * TINY_MOVE));
        if value.abs() < ON_SURFACE_THRESH {
            return true;
        }
    }
    sense.sign() * value > 0.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn x_plane_distance_forward_only() {
        let s = Surface::x_plane(1, 2.0);
        let p = Point3::new(0.0, 0.0, 0.0);
        assert_relative_eq!(s.min_distance(&p, &Vector3::new(1.0, 0.0, 0.0)), 2.0);
        assert!(s.min_distance(&p, &Vector3::new(-1.0, 0.0, 0.0)).is_infinite());
        assert!(s.min_distance(&p, &Vector3::new(0.0, 1.0, 0.0)).is_infinite());
    }

    #[test]
    fn general_plane_is_normalized() {
        let s = Surface::plane(1, 0.0, 2.0, 0.0, -4.0).unwrap();
        assert_relative_eq!(s.evaluate(&Point3::new(0.0, 3.0, 0.0)), 1.0);
        let d = s.min_distance(&Point3::origin(), &Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(d, 2.0);
    }

    #[test]
    fn zero_normal_plane_is_rejected() {
        assert!(Surface::plane(1, 0.0, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn cylinder_distance_from_inside_and_outside() {
        let s = Surface::z_cylinder(1, 0.0, 0.0, 1.0).unwrap();
        let dir = Vector3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(s.min_distance(&Point3::origin(), &dir), 1.0);
        assert_relative_eq!(s.min_distance(&Point3::new(-3.0, 0.0, 0.0), &dir), 2.0);
        assert!(s
            .min_distance(&Point3::new(-3.0, 2.0, 0.0), &dir)
            .is_infinite());
    }

    #[test]
    fn cylinder_parallel_to_axis_never_hits() {
        let s = Surface::z_cylinder(1, 0.0, 0.0, 1.0).unwrap();
        let d = s.min_distance(&Point3::origin(), &Vector3::new(0.0, 0.0, 1.0));
        assert!(d.is_infinite());
    }

    #[test]
    fn boundary_point_follows_direction() {
        let s = Surface::x_plane(1, 0.0);
        let on = Point3::new(0.0, 1.0, 0.0);
        let right = Vector3::new(1.0, 0.0, 0.0);
        let left = Vector3::new(-1.0, 0.0, 0.0);
        assert!(halfspace_contains(&s, Sense::Positive, &on, Some(&right)));
        assert!(!halfspace_contains(&s, Sense::Negative, &on, Some(&right)));
        assert!(halfspace_contains(&s, Sense::Negative, &on, Some(&left)));
        assert!(halfspace_contains(&s, Sense::Positive, &on, None));
        assert!(halfspace_contains(&s, Sense::Negative, &on, None));
    }

    #[test]
    fn inside_of_cylinder_is_bounded() {
        let s = Surface::z_cylinder(1, 1.0, 2.0, 0.5).unwrap();
        let b = s.halfspace_bounds(Sense::Negative);
        assert_relative_eq!(b.min.x, 0.5);
        assert_relative_eq!(b.max.y, 2.5);
        assert!(b.max.z.is_infinite());
        assert!(s.halfspace_bounds(Sense::Positive).max.x.is_infinite());
    }
}
