// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Atlas Core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Vec3;

/// A 4x4 row-major modelview matrix, as handed to us by the renderer.
pub type Mat4 = [f64; 16];

/// A bounding sphere in ECEF cartesian space, radius in metres.
///
/// An empty sphere (no points added yet) has a radius of zero and an
/// undefined centre; the first call to [`extend_point`](Self::extend_point)
/// or [`extend_sphere`](Self::extend_sphere) establishes the centre.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
    empty: bool,
}

impl Sphere {
    pub fn empty() -> Self {
        Self {
            center: Vec3::default(),
            radius: 0.0,
            empty: true,
        }
    }

    pub fn new(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius,
            empty: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Grows the sphere to contain `point`. If the sphere was empty, it
    /// becomes centred on `point` with zero radius.
    pub fn extend_point(&mut self, point: Vec3) {
        if self.empty {
            self.center = point;
            self.radius = 0.0;
            self.empty = false;
            return;
        }

        let d = self.center.distance_to(&point);
        if d > self.radius {
            self.radius = d;
        }
    }

    /// Grows the sphere to contain the farthest point of `other`.
    pub fn extend_sphere(&mut self, other: &Sphere) {
        if other.empty {
            return;
        }
        if self.empty {
            *self = *other;
            return;
        }

        let d = self.center.distance_to(&other.center) + other.radius;
        if d > self.radius {
            self.radius = d;
        }
    }

    pub fn contains(&self, point: &Vec3) -> bool {
        !self.empty && self.center.distance_to(point) <= self.radius
    }

    /// Tests this sphere (transformed by `modelview`) against `frustum`.
    pub fn contains_frustum(&self, frustum: &Frustum, modelview: &Mat4) -> FrustumRelation {
        if self.empty {
            return FrustumRelation::Outside;
        }

        let eye_center = transform_point(modelview, &self.center);
        let mut fully_inside = true;

        for plane in &frustum.planes {
            let signed_dist = plane.normal.x * eye_center.x
                + plane.normal.y * eye_center.y
                + plane.normal.z * eye_center.z
                + plane.d;

            if signed_dist < -self.radius {
                return FrustumRelation::Outside;
            }
            if signed_dist < self.radius {
                fully_inside = false;
            }
        }

        if fully_inside {
            FrustumRelation::Inside
        } else {
            FrustumRelation::Intersects
        }
    }
}

fn transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
    Vec3::new(
        m[0] * p.x + m[1] * p.y + m[2] * p.z + m[3],
        m[4] * p.x + m[5] * p.y + m[6] * p.z + m[7],
        m[8] * p.x + m[9] * p.y + m[10] * p.z + m[11],
    )
}

/// Result of testing a [`Sphere`] against a [`Frustum`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FrustumRelation {
    Inside,
    Outside,
    Intersects,
}

struct Plane {
    normal: Vec3,
    d: f64,
}

/// A view frustum in eye space, defined by six clipping planes.
///
/// Built once per `zoom()` call from the standard `glFrustum`-style
/// parameters; [`Sphere::contains_frustum`] transforms a world-space sphere
/// into eye space with the caller's modelview matrix before testing it
/// against these planes.
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    #[allow(clippy::too_many_arguments)]
    pub fn new(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        // Eye space looks down -z, as in OpenGL. Each plane's normal points
        // into the visible half-space.
        let left_n = Vec3::new(near, 0.0, -left).normalize_plane();
        let right_n = Vec3::new(-near, 0.0, right).normalize_plane();
        let bottom_n = Vec3::new(0.0, near, -bottom).normalize_plane();
        let top_n = Vec3::new(0.0, -near, top).normalize_plane();

        Self {
            planes: [
                Plane {
                    normal: Vec3::new(0.0, 0.0, -1.0),
                    d: -near,
                }, // near
                Plane {
                    normal: Vec3::new(0.0, 0.0, 1.0),
                    d: far,
                }, // far
                Plane {
                    normal: left_n,
                    d: 0.0,
                },
                Plane {
                    normal: right_n,
                    d: 0.0,
                },
                Plane {
                    normal: bottom_n,
                    d: 0.0,
                },
                Plane {
                    normal: top_n,
                    d: 0.0,
                },
            ],
        }
    }
}

impl Vec3 {
    /// Normalizes a plane-equation direction vector built from frustum
    /// parameters; distinct from a geometric point, but reuses `Vec3`'s
    /// storage since both are just three `f64`s.
    fn normalize_plane(self) -> Vec3 {
        let len = self.length();
        if len < 1e-12 {
            self
        } else {
            Vec3::new(self.x / len, self.y / len, self.z / len)
        }
    }
}
