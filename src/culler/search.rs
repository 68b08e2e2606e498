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

//! Cached queries over a [`Culler`](super::Culler).
//!
//! The original design has searchers register themselves with the
//! culler and get pinged on every mutation; here a search instead
//! remembers the culler's `version()` at the time of its last query and
//! treats a version change exactly like an explicit `zoom`/`move` call.
//! Same invalidation semantics, no registration bookkeeping.

use super::{Culler, Cullable};
use crate::geodesy::{Frustum, Mat4, Vec3};
use std::rc::Rc;

/// A cached frustum query against a [`Culler`].
///
/// `zoom`/`move_to` mark the cache dirty; `intersections` re-runs the
/// search only if dirty (by view change or by the culler having grown
/// since the last call), otherwise returns the cached result.
pub struct Search<'a, T: Cullable> {
    culler: &'a mut Culler<T>,
    frustum: Option<Frustum>,
    modelview: Mat4,
    cached: Vec<Rc<T>>,
    last_version: u64,
    dirty: bool,
}

const IDENTITY: Mat4 = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

impl<'a, T: Cullable> Search<'a, T> {
    pub fn new(culler: &'a mut Culler<T>) -> Self {
        Self {
            culler,
            frustum: None,
            modelview: IDENTITY,
            cached: Vec::new(),
            last_version: u64::MAX,
            dirty: true,
        }
    }

    pub fn zoom(&mut self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) {
        self.frustum = Some(Frustum::new(left, right, bottom, top, near, far));
        self.dirty = true;
    }

    pub fn move_view(&mut self, modelview: Mat4) {
        self.modelview = modelview;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.culler.version() != self.last_version
    }

    /// Returns the cached intersections, recomputing first if dirty.
    pub fn intersections(&mut self) -> &[Rc<T>] {
        if self.is_dirty() {
            if let Some(frustum) = &self.frustum {
                self.cached = self.culler.intersections_frustum(frustum, &self.modelview);
            } else {
                self.cached.clear();
            }
            self.last_version = self.culler.version();
            self.dirty = false;
        }
        &self.cached
    }
}

/// A cached point query against a [`Culler`], used to find navaids in
/// range of a moving point (typically an aircraft position).
pub struct PointSearch<'a, T: Cullable> {
    culler: &'a mut Culler<T>,
    point: Vec3,
    cached: Vec<Rc<T>>,
    last_version: u64,
    dirty: bool,
}

impl<'a, T: Cullable> PointSearch<'a, T> {
    pub fn new(culler: &'a mut Culler<T>) -> Self {
        Self {
            culler,
            point: Vec3::default(),
            cached: Vec::new(),
            last_version: u64::MAX,
            dirty: true,
        }
    }

    pub fn move_to(&mut self, point: Vec3) {
        self.point = point;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.culler.version() != self.last_version
    }

    pub fn intersections(&mut self) -> &[Rc<T>] {
        if self.is_dirty() {
            self.cached = self.culler.intersections_point(self.point);
            self.last_version = self.culler.version();
            self.dirty = false;
        }
        &self.cached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::{LatLon, Sphere};

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
    fn point_search_caches_until_moved() {
        let mut culler = Culler::new();
        culler.add(Rc::new(Point {
            lat: 10.0,
            lon: 10.0,
            radius: 1000.0,
        }));

        let mut search = PointSearch::new(&mut culler);
        search.move_to(LatLon::new(10.0, 10.0).to_cart(0.0));
        assert_eq!(search.intersections().len(), 1);
        assert!(!search.is_dirty());
    }

    #[test]
    fn point_search_invalidates_when_culler_grows() {
        let mut culler = Culler::new();
        culler.add(Rc::new(Point {
            lat: 10.0,
            lon: 10.0,
            radius: 1000.0,
        }));

        let mut search = PointSearch::new(&mut culler);
        search.move_to(LatLon::new(10.0, 10.0).to_cart(0.0));
        assert_eq!(search.intersections().len(), 1);

        search.culler.add(Rc::new(Point {
            lat: 10.0,
            lon: 10.0,
            radius: 1000.0,
        }));
        assert!(search.is_dirty());
        assert_eq!(search.intersections().len(), 2);
    }
}
