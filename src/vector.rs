use serde::{Deserialize, Deserializer};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Neg, Add, Sub, Mul, Div, Display, Serialize, Deserialize)]
#[display(fmt = "({}, {}, {})", x, y, z)]
pub struct Vector<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T> Vector<T>
where
    T: Copy + core::ops::Add<Output = T> + core::ops::Sub<Output = T> + core::ops::Mul<Output = T>,
{
    pub fn dot(self, rhs: Self) -> T {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn norm_sqr(self) -> T {
        self.dot(self)
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }
}

impl Vector<f64> {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub fn norm(self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Radial distance from the z axis.
    pub fn perp(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }
}

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Deref, Into, Display, Serialize)]
pub struct UnitVector<T>(pub Vector<T>);

impl UnitVector<f64> {
    pub fn new(v: Vector<f64>) -> Option<Self> {
        if (v.norm_sqr() - 1.0).abs() < 1e-12 {
            Some(Self(v))
        } else {
            None
        }
    }

    /// Rescales any non-zero vector onto the unit sphere.
    pub fn normalize(v: Vector<f64>) -> Option<Self> {
        let n = v.norm();
        if n > 0.0 && n.is_finite() {
            Some(Self(v / n))
        } else {
            None
        }
    }

    pub const fn x() -> Self {
        Self(Vector::new(1.0, 0.0, 0.0))
    }

    pub const fn y() -> Self {
        Self(Vector::new(0.0, 1.0, 0.0))
    }

    pub const fn z() -> Self {
        Self(Vector::new(0.0, 0.0, 1.0))
    }
}

impl<'de> Deserialize<'de> for UnitVector<f64> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Vector::<f64>::deserialize(deserializer)?;
        UnitVector::normalize(v).ok_or_else(|| serde::de::Error::custom(format!("{} is not a direction", v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    #[test]
    fn cross_of_axes() {
        let z = UnitVector::x().cross(*UnitVector::y());
        assert_eq!(z, *UnitVector::z());
    }

    #[test]
    fn unit_vector_rejects_unnormalized() {
        assert!(UnitVector::new(Vector::new(0.0, 2.0, 0.0)).is_none());
        let v = UnitVector::normalize(Vector::new(0.0, 2.0, 0.0)).unwrap();
        assert_ulps_eq!(v.y, 1.0);
        assert!(UnitVector::normalize(Vector::ZERO).is_none());
    }

    #[test]
    fn deserialized_direction_is_normalized() {
        let v: UnitVector<f64> = serde_json::from_str(r#"{"x": 3.0, "y": 0.0, "z": 4.0}"#).unwrap();
        assert_ulps_eq!(v.x, 0.6);
        assert_ulps_eq!(v.z, 0.8);
        assert!(serde_json::from_str::<UnitVector<f64>>(r#"{"x": 0.0, "y": 0.0, "z": 0.0}"#).is_err());
    }
}
