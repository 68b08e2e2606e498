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

//! A single position/attitude/radio-state reading on a [`super::FlightTrack`],
//! plus the bookkeeping (`est_t_offset_s`, `cum_dist_m`) a whole track
//! maintains as samples are added, evicted or re-ordered.

use std::cell::RefCell;
use std::rc::Rc;

use crate::culler::Culler;
use crate::geodesy::Vec3;
use crate::waypoint::Waypoint;

/// One GPS/NMEA-derived reading. Frequencies are stored in kHz the way
/// the wire protocol carries them (`$PATLA`'s VOR fields are
/// thousandths of MHz, which is kHz); a zero frequency means "no
/// receiver tuned", matching the original's all-zeroed default.
#[derive(Clone, Debug, Default)]
pub struct FlightSample {
    pub time_epoch: i64,
    pub lat: f64,
    pub lon: f64,
    pub alt_ft: f64,
    pub hdg_deg: f64,
    pub spd_kt: f64,
    pub nav1_freq_khz: i32,
    pub nav1_radial: f64,
    pub nav2_freq_khz: i32,
    pub nav2_radial: f64,
    pub adf_freq_khz: i32,
    /// Fractional-second offset within the run of samples sharing this
    /// sample's integer second, assigned by [`adjust_offsets_around`].
    pub est_t_offset_s: f64,
    /// WGS84 ECEF position, derived from `lat`/`lon`/`alt_ft` once both
    /// are known.
    pub cart: Vec3,
    /// Cumulative great-circle-ish distance (straight-line ECEF) from
    /// the track's first sample, assigned by [`calc_distances_from`].
    pub cum_dist_m: f64,
    navaid_cache: RefCell<Option<Vec<Rc<Waypoint>>>>,
}

impl FlightSample {
    /// Recomputes [`Self::cart`] from `lat`/`lon`/`alt_ft`. Called once
    /// both position fields are known, mirroring the original's
    /// `sgGeodToCart` call sited right after `$GPGGA` parsing.
    pub fn recompute_cart(&mut self) {
        self.cart = crate::geodesy::geod_to_cart(self.lat, self.lon, self.alt_ft * crate::measurements::constants::FEET_IN_METER);
        self.navaid_cache = RefCell::new(None);
    }

    /// The navaids in range of this sample's position whose frequency
    /// matches nav1, nav2 or adf, computed lazily and cached: the
    /// original only resolves this on demand (e.g. when a track point
    /// is displayed), not at ingest time, since most samples are never
    /// inspected that closely.
    pub fn locked_navaids(&self, culler: &mut Culler<Waypoint>) -> Vec<Rc<Waypoint>> {
        if let Some(cached) = self.navaid_cache.borrow().as_ref() {
            return cached.clone();
        }
        let tuned: Vec<i32> = [self.nav1_freq_khz, self.nav2_freq_khz, self.adf_freq_khz]
            .into_iter()
            .filter(|&f| f != 0)
            .collect();
        let found: Vec<Rc<Waypoint>> = culler
            .intersections_point(self.cart)
            .into_iter()
            .filter(|wp| wp.frequency_khz().is_some_and(|f| tuned.contains(&(f as i32))))
            .collect();
        *self.navaid_cache.borrow_mut() = Some(found.clone());
        found
    }
}

impl PartialEq for FlightSample {
    fn eq(&self, other: &Self) -> bool {
        self.time_epoch == other.time_epoch
            && self.lat == other.lat
            && self.lon == other.lon
            && self.alt_ft == other.alt_ft
            && self.hdg_deg == other.hdg_deg
            && self.spd_kt == other.spd_kt
            && self.nav1_freq_khz == other.nav1_freq_khz
            && self.nav1_radial == other.nav1_radial
            && self.nav2_freq_khz == other.nav2_freq_khz
            && self.nav2_radial == other.nav2_radial
            && self.adf_freq_khz == other.adf_freq_khz
    }
}

/// Recomputes `est_t_offset_s` for every sample in the contiguous run
/// of equal `time_epoch` that contains index `i`, spreading them evenly
/// across the one-second window they share. Mirrors
/// `FlightTrack::_adjustOffsetsAround`, which walks back to the start of
/// the run and forward to its end; grouping by the run directly (rather
/// than the original's backward-scan-then-forward-recompute with a
/// `subPoints` counter) gives the same result.
pub fn adjust_offsets_around(samples: &mut [FlightSample], i: usize) {
    if samples.is_empty() {
        return;
    }
    let t = samples[i].time_epoch;

    let mut start = i;
    while start > 0 && samples[start - 1].time_epoch == t {
        start -= 1;
    }
    let mut end = i;
    while end + 1 < samples.len() && samples[end + 1].time_epoch == t {
        end += 1;
    }

    let run_len = end - start + 1;
    for (j, sample) in samples[start..=end].iter_mut().enumerate() {
        sample.est_t_offset_s = j as f64 / run_len as f64;
    }
}

/// Recomputes `cum_dist_m` for every sample from index `i` onward, each
/// as the straight-line ECEF distance from its predecessor added to the
/// predecessor's cumulative distance. Mirrors
/// `FlightTrack::_calcDistancesFrom`.
pub fn calc_distances_from(samples: &mut [FlightSample], i: usize) {
    if samples.is_empty() {
        return;
    }
    let start = if i == 0 {
        samples[0].cum_dist_m = 0.0;
        1
    } else {
        i
    };
    for j in start..samples.len() {
        let step = samples[j].cart.distance_to(&samples[j - 1].cart);
        samples[j].cum_dist_m = samples[j - 1].cum_dist_m + step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(time_epoch: i64) -> FlightSample {
        FlightSample {
            time_epoch,
            ..Default::default()
        }
    }

    #[test]
    fn offsets_spread_evenly_across_a_shared_second() {
        let mut samples = vec![sample_at(100), sample_at(100), sample_at(100), sample_at(101)];
        adjust_offsets_around(&mut samples, 1);
        assert_eq!(samples[0].est_t_offset_s, 0.0);
        assert!((samples[1].est_t_offset_s - 1.0 / 3.0).abs() < 1e-9);
        assert!((samples[2].est_t_offset_s - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(samples[3].est_t_offset_s, 0.0);
    }

    #[test]
    fn single_sample_run_has_zero_offset() {
        let mut samples = vec![sample_at(5), sample_at(6), sample_at(7)];
        adjust_offsets_around(&mut samples, 1);
        assert_eq!(samples[1].est_t_offset_s, 0.0);
    }

    #[test]
    fn distances_accumulate_from_first_sample() {
        let mut samples = vec![
            FlightSample {
                cart: Vec3::new(0.0, 0.0, 0.0),
                ..Default::default()
            },
            FlightSample {
                cart: Vec3::new(3.0, 4.0, 0.0),
                ..Default::default()
            },
            FlightSample {
                cart: Vec3::new(3.0, 4.0, 12.0),
                ..Default::default()
            },
        ];
        calc_distances_from(&mut samples, 0);
        assert_eq!(samples[0].cum_dist_m, 0.0);
        assert_eq!(samples[1].cum_dist_m, 5.0);
        assert_eq!(samples[2].cum_dist_m, 17.0);
    }

    #[test]
    fn recalculating_from_a_later_index_leaves_earlier_distances_untouched() {
        let mut samples = vec![
            FlightSample {
                cart: Vec3::new(0.0, 0.0, 0.0),
                cum_dist_m: 0.0,
                ..Default::default()
            },
            FlightSample {
                cart: Vec3::new(3.0, 4.0, 0.0),
                cum_dist_m: 5.0,
                ..Default::default()
            },
            FlightSample {
                cart: Vec3::new(6.0, 8.0, 0.0),
                cum_dist_m: 999.0,
                ..Default::default()
            },
        ];
        calc_distances_from(&mut samples, 2);
        assert_eq!(samples[1].cum_dist_m, 5.0);
        assert_eq!(samples[2].cum_dist_m, 10.0);
    }
}
