use serde::{Deserialize, Serialize};
use std::ops;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct V3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for V3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        V3 { x, y, z }
    }
}

impl From<V3> for [f64; 3] {
    fn from(a: V3) -> Self {
        [a.x, a.y, a.z]
    }
}

/// Pixel fractions and image sizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct V2 {
    pub x: f64,
    pub y: f64,
}

pub fn v2(x: f64, y: f64) -> V2 {
    V2 { x, y }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: V3,
    pub direction: V3,
}

impl Ray {
    pub fn at(&self, t: f64) -> V3 {
        add(&self.origin, &mul(t, &self.direction))
    }
}

/// Quaternion with scalar part `w` and vector part `v`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub w: f64,
    pub v: V3,
}

impl Quat {
    pub fn pure(v: V3) -> Quat {
        Quat { w: 0., v }
    }

    pub fn conj(&self) -> Quat {
        Quat {
            w: self.w,
            v: -self.v,
        }
    }
}

/// Hamilton product.
impl ops::Mul<Quat> for Quat {
    type Output = Quat;

    fn mul(self, rhs: Quat) -> Quat {
        Quat {
            w: self.w * rhs.w - dot(&self.v, &rhs.v),
            v: self.w * rhs.v + rhs.w * self.v + cross(&self.v, &rhs.v),
        }
    }
}

/// Derives a camera basis direction from a unit `axis` and an orientation vector.
///
/// The orientation is used as the vector part of a quaternion whose scalar part is
/// fixed at 1.0, and `axis` is conjugated by it (`q * axis * q⁻¹` with the plain
/// conjugate). The quaternion is not normalized, so the result carries a factor of
/// `1 + |orientation|²`.
pub fn rotate(axis: &V3, orientation: &V3) -> V3 {
    let q = Quat {
        w: 1.,
        v: *orientation,
    };
    (q * Quat::pure(*axis) * q.conj()).v
}

pub fn sub(x: &V3, y: &V3) -> V3 {
    V3 {
        x: x.x - y.x,
        y: x.y - y.y,
        z: x.z - y.z,
    }
}

pub fn abs2(x: &V3) -> f64 {
    x.x * x.x + x.y * x.y + x.z * x.z
}

pub fn abs(x: &V3) -> f64 {
    abs2(x).sqrt()
}

pub fn v(x: f64, y: f64, z: f64) -> V3 {
    V3 { x, y, z }
}

pub fn mul(scalar: f64, x: &V3) -> V3 {
    V3 {
        x: x.x * scalar,
        y: x.y * scalar,
        z: x.z * scalar,
    }
}

pub fn add(x: &V3, y: &V3) -> V3 {
    V3 {
        x: x.x + y.x,
        y: x.y + y.y,
        z: x.z + y.z,
    }
}

pub fn dist(x: &V3, y: &V3) -> f64 {
    abs(&sub(x, y))
}

/// Zero-length input comes back unchanged.
pub fn normalize(x: &V3) -> V3 {
    let len = abs(x);
    if len == 0. {
        return *x;
    }
    mul(1. / len, x)
}

pub fn dot(x: &V3, y: &V3) -> f64 {
    x.x * y.x + x.y * y.y + x.z * y.z
}

pub fn cross(v1: &V3, v2: &V3) -> V3 {
    v(
        v1.y * v2.z - v1.z * v2.y,
        v1.z * v2.x - v1.x * v2.z,
        v1.x * v2.y - v1.y * v2.x,
    )
}

impl ops::Add<V3> for V3 {
    type Output = V3;

    fn add(self, rhs: V3) -> V3 {
        add(&self, &rhs)
    }
}

impl ops::AddAssign<V3> for V3 {
    fn add_assign(&mut self, rhs: V3) {
        *self = add(self, &rhs)
    }
}

impl ops::Sub<V3> for V3 {
    type Output = V3;

    fn sub(self, rhs: V3) -> V3 {
        sub(&self, &rhs)
    }
}

impl ops::Neg for V3 {
    type Output = V3;

    fn neg(self) -> V3 {
        mul(-1., &self)
    }
}

impl ops::Mul<V3> for f64 {
    type Output = V3;

    fn mul(self, rhs: V3) -> Self::Output {
        mul(self, &rhs)
    }
}

impl ops::Mul<f64> for V3 {
    type Output = V3;

    fn mul(self, rhs: f64) -> Self::Output {
        mul(rhs, &self)
    }
}

impl ops::Div<f64> for V3 {
    type Output = V3;

    fn div(self, rhs: f64) -> Self::Output {
        mul(1. / rhs, &self)
    }
}

pub const B1: V3 = V3 {
    x: 1.,
    y: 0.,
    z: 0.,
};

pub const B2: V3 = V3 {
    x: 0.,
    y: 1.,
    z: 0.,
};

pub const B3: V3 = V3 {
    x: 0.,
    y: 0.,
    z: 1.,
};

pub const O: V3 = V3 {
    x: 0.,
    y: 0.,
    z: 0.,
};
