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

//! A three-level hierarchical spatial index over latitude/longitude
//! bands, used to answer "what's in view" and "what's near this point"
//! in sublinear time over the tens of thousands of navaids, fixes and
//! airports a loaded database holds.
//!
//! The world is divided at three levels: 18 cells of 60°, each holding
//! 36 children of 10°, each holding 100 children of 1°. Each 1° cell is
//! a leaf holding the objects whose centre falls within it. Branch
//! bounds are cached and only recomputed when a descendant leaf has
//! changed since the last query.

mod search;

pub use search::{PointSearch, Search};

use crate::geodesy::{Frustum, FrustumRelation, Mat4, Sphere, Vec3};
use std::rc::Rc;

/// Degree of each branch level: 18 level-0 cells, 36 level-1 children
/// per level-0 cell, 100 level-2 (leaf) children per level-1 cell.
const BRANCH_SIZES: [usize; 3] = [18, 36, 100];
const CELL_DEGREES: [f64; 3] = [60.0, 10.0, 1.0];

/// Anything the culler can index: it must report a bounding sphere and
/// the latitude/longitude its centre lies at.
pub trait Cullable {
    fn bounds(&self) -> Sphere;
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

enum Node<T> {
    Branch {
        children: Vec<Option<Box<Node<T>>>>,
        bounds: Sphere,
        dirty: bool,
    },
    Leaf {
        objects: Vec<Rc<T>>,
        bounds: Sphere,
    },
}

impl<T: Cullable> Node<T> {
    fn branch(level: usize) -> Self {
        Node::Branch {
            children: (0..BRANCH_SIZES[level]).map(|_| None).collect(),
            bounds: Sphere::empty(),
            dirty: false,
        }
    }

    fn leaf() -> Self {
        Node::Leaf {
            objects: Vec::new(),
            bounds: Sphere::empty(),
        }
    }

    /// Inserts `handle` at the leaf addressed by `indices[depth..]`,
    /// extending leaf bounds immediately and marking every ancestor on
    /// the path dirty so their cached bounds are recomputed lazily.
    fn insert(&mut self, depth: usize, indices: [usize; 3], handle: Rc<T>) {
        match self {
            Node::Leaf { objects, bounds } => {
                bounds.extend_sphere(&handle.bounds());
                objects.push(handle);
            }
            Node::Branch {
                children, dirty, ..
            } => {
                let idx = indices[depth];
                let child = children[idx].get_or_insert_with(|| {
                    Box::new(if depth + 1 < BRANCH_SIZES.len() {
                        Node::branch(depth + 1)
                    } else {
                        Node::leaf()
                    })
                });
                child.insert(depth + 1, indices, handle);
                *dirty = true;
            }
        }
    }

    /// Recomputes this node's bounds if dirty, recursing into dirty
    /// children first, and returns the (now clean) bounds.
    fn clean_bounds(&mut self) -> Sphere {
        match self {
            Node::Leaf { bounds, .. } => *bounds,
            Node::Branch {
                children,
                bounds,
                dirty,
            } => clean_branch_bounds(children, bounds, dirty),
        }
    }

    fn grab_all(&self, out: &mut Vec<Rc<T>>) {
        match self {
            Node::Leaf { objects, .. } => out.extend(objects.iter().cloned()),
            Node::Branch { children, .. } => {
                for child in children.iter().flatten() {
                    child.grab_all(out);
                }
            }
        }
    }

    fn intersect_frustum(&mut self, frustum: &Frustum, modelview: &Mat4, out: &mut Vec<Rc<T>>) {
        match self {
            Node::Leaf { objects, .. } => {
                for obj in objects.iter() {
                    if obj.bounds().contains_frustum(frustum, modelview) != FrustumRelation::Outside {
                        out.push(obj.clone());
                    }
                }
            }
            Node::Branch {
                children,
                bounds,
                dirty,
            } => {
                let clean = clean_branch_bounds(children, bounds, dirty);
                match clean.contains_frustum(frustum, modelview) {
                    FrustumRelation::Outside => {}
                    FrustumRelation::Inside => {
                        for child in children.iter().flatten() {
                            child.grab_all(out);
                        }
                    }
                    FrustumRelation::Intersects => {
                        for child in children.iter_mut().flatten() {
                            child.intersect_frustum(frustum, modelview, out);
                        }
                    }
                }
            }
        }
    }

    fn intersect_point(&mut self, point: Vec3, out: &mut Vec<Rc<T>>) {
        match self {
            Node::Leaf { objects, .. } => {
                for obj in objects.iter() {
                    if obj.bounds().contains(&point) {
                        out.push(obj.clone());
                    }
                }
            }
            Node::Branch {
                children,
                bounds,
                dirty,
            } => {
                let clean = clean_branch_bounds(children, bounds, dirty);
                if !clean.contains(&point) {
                    return;
                }
                for child in children.iter_mut().flatten() {
                    child.intersect_point(point, out);
                }
            }
        }
    }
}

/// Recomputes `bounds` by unioning children's (recursively cleaned)
/// bounds, if `dirty`. Shared by [`Node::clean_bounds`] and the
/// intersection walks, which already hold a live borrow of `children`
/// and so can't call back through `self`.
fn clean_branch_bounds<T: Cullable>(
    children: &mut [Option<Box<Node<T>>>],
    bounds: &mut Sphere,
    dirty: &mut bool,
) -> Sphere {
    if *dirty {
        let mut union = Sphere::empty();
        for child in children.iter_mut().flatten() {
            union.extend_sphere(&child.clean_bounds());
        }
        *bounds = union;
        *dirty = false;
    }
    *bounds
}

/// Maps a latitude/longitude to the three-level cell address
/// `[l0, l1, l2]` described above.
///
/// At each level the current (lat, lon) remainder is known to lie
/// within a `span x span` cell from the level above (`180 x 360` at the
/// root); dividing that cell into `cell_degrees`-sized bands gives this
/// level's column/row index, and the remainder feeds the next level.
fn lat_lon_to_indices(lat_deg: f64, lon_deg: f64) -> [usize; 3] {
    let mut lat_rem = (lat_deg + 90.0).clamp(0.0, 179.999_999);
    let mut lon_rem = (lon_deg + 180.0).rem_euclid(360.0);
    let mut lon_span = 360.0;

    let mut indices = [0usize; 3];
    for (level, &cell_degrees) in CELL_DEGREES.iter().enumerate() {
        let lon_cols = (lon_span / cell_degrees).round() as usize;
        let lon_idx = (lon_rem / cell_degrees) as usize;
        let lat_idx = (lat_rem / cell_degrees) as usize;

        indices[level] = lat_idx * lon_cols + lon_idx;

        lon_rem -= lon_idx as f64 * cell_degrees;
        lat_rem -= lat_idx as f64 * cell_degrees;
        lon_span = cell_degrees;
    }

    indices
}

/// The spatial index itself. Owns nothing but `Rc` handles to the
/// objects it indexes; callers remain free to hold their own
/// references alongside it.
pub struct Culler<T: Cullable> {
    root: Node<T>,
    version: u64,
}

impl<T: Cullable> Default for Culler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Cullable> Culler<T> {
    pub fn new() -> Self {
        Self {
            root: Node::branch(0),
            version: 0,
        }
    }

    /// Indexes `object`, keyed by its own reported latitude/longitude.
    /// Every [`Search`]/[`PointSearch`] attached to this culler is
    /// invalidated by the resulting version bump.
    pub fn add(&mut self, object: Rc<T>) {
        let indices = lat_lon_to_indices(object.latitude(), object.longitude());
        self.root.insert(0, indices, object);
        self.version += 1;
    }

    /// Returns the objects intersecting `frustum` (transformed by
    /// `modelview`), ignoring any cached [`Search`]. Prefer attaching a
    /// [`Search`] for repeated queries against a slowly-changing view.
    pub fn intersections_frustum(&mut self, frustum: &Frustum, modelview: &Mat4) -> Vec<Rc<T>> {
        let mut out = Vec::new();
        self.root.intersect_frustum(frustum, modelview, &mut out);
        out
    }

    /// Returns the objects whose bounds contain `point`.
    pub fn intersections_point(&mut self, point: Vec3) -> Vec<Rc<T>> {
        let mut out = Vec::new();
        self.root.intersect_point(point, &mut out);
        out
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::LatLon;

    struct Point {
        lat: f64,
        lon: f64,
        radius: f64,
    }

    impl Cullable for Point {
        fn bounds(&self) -> Sphere {
            Sphere::new(LatLon::new(self.lat, self.lon).to_cart(0.0), self.radius)
        }
        fn latitude(&self) -> f64 {
            self.lat
        }
        fn longitude(&self) -> f64 {
            self.lon
        }
    }

    #[test]
    fn indices_are_within_branch_sizes() {
        for &(lat, lon) in &[(-90.0, -180.0), (89.9, 179.9), (0.0, 0.0), (37.6, -122.4)] {
            let idx = lat_lon_to_indices(lat, lon);
            for (level, &i) in idx.iter().enumerate() {
                assert!(i < BRANCH_SIZES[level], "lat={lat} lon={lon} level={level} idx={i}");
            }
        }
    }

    #[test]
    fn point_query_finds_added_object() {
        let mut culler = Culler::new();
        culler.add(Rc::new(Point {
            lat: 37.6,
            lon: -122.4,
            radius: 1000.0,
        }));

        let point = LatLon::new(37.6, -122.4).to_cart(0.0);
        let hits = culler.intersections_point(point);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn point_query_misses_far_object() {
        let mut culler = Culler::new();
        culler.add(Rc::new(Point {
            lat: 37.6,
            lon: -122.4,
            radius: 1000.0,
        }));

        let point = LatLon::new(-10.0, 50.0).to_cart(0.0);
        let hits = culler.intersections_point(point);
        assert!(hits.is_empty());
    }

    #[test]
    fn adding_bumps_version() {
        let mut culler: Culler<Point> = Culler::new();
        assert_eq!(culler.version(), 0);
        culler.add(Rc::new(Point {
            lat: 0.0,
            lon: 0.0,
            radius: 0.0,
        }));
        assert_eq!(culler.version(), 1);
    }

    #[test]
    fn frustum_query_finds_object_in_front_of_camera() {
        let mut culler = Culler::new();
        culler.add(Rc::new(Point {
            lat: 0.0,
            lon: 0.0,
            radius: 10.0,
        }));

        let center = LatLon::new(0.0, 0.0).to_cart(0.0);
        // A camera parked 1000m "above" the object, looking straight down
        // its own -z axis: translate the object to the origin, then push
        // it back along z so it lands inside the frustum's near/far range.
        let modelview = translate_then_push_back(center, 1000.0);
        let frustum = Frustum::new(-1.0, 1.0, -1.0, 1.0, 1.0, 1.0e4);
        let hits = culler.intersections_frustum(&frustum, &modelview);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn frustum_query_excludes_object_behind_far_plane() {
        let mut culler = Culler::new();
        culler.add(Rc::new(Point {
            lat: 0.0,
            lon: 0.0,
            radius: 10.0,
        }));

        let center = LatLon::new(0.0, 0.0).to_cart(0.0);
        let modelview = translate_then_push_back(center, 1.0e8);
        let frustum = Frustum::new(-1.0, 1.0, -1.0, 1.0, 1.0, 1.0e4);
        let hits = culler.intersections_frustum(&frustum, &modelview);
        assert!(hits.is_empty());
    }

    fn translate_then_push_back(center: Vec3, depth: f64) -> Mat4 {
        [
            1.0, 0.0, 0.0, -center.x, 0.0, 1.0, 0.0, -center.y, 0.0, 0.0, 1.0, -center.z - depth,
            0.0, 0.0, 0.0, 1.0,
        ]
    }
}
