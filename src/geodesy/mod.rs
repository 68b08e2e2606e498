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

//! Geodesy primitives: lat/lon, ECEF cartesian coordinates, great-circle
//! distance/bearing, bounding spheres and magnetic variation. This is the
//! lowest layer of the stack — the culler, loader and flight-track modules
//! all build on it.

mod latlon;
mod magvar;
mod sphere;
mod vec3;

pub use latlon::LatLon;
pub use magvar::magnetic_variation;
pub use sphere::{Frustum, FrustumRelation, Mat4, Sphere};
pub use vec3::Vec3;

use crate::measurements::constants::{WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS_M};

/// Converts geodetic lat/lon/elevation to WGS84 ECEF cartesian coordinates.
///
/// `lat_deg`/`lon_deg` are in degrees, `elev_m` in metres above the
/// ellipsoid.
pub fn geod_to_cart(lat_deg: f64, lon_deg: f64, elev_m: f64) -> Vec3 {
    let a = WGS84_SEMI_MAJOR_AXIS_M;
    let f = WGS84_FLATTENING;
    let e2 = f * (2.0 - f);

    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();

    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();

    Vec3 {
        x: (n + elev_m) * cos_lat * lon.cos(),
        y: (n + elev_m) * cos_lat * lon.sin(),
        z: (n * (1.0 - e2) + elev_m) * sin_lat,
    }
}

/// Converts WGS84 ECEF cartesian coordinates back to geodetic lat/lon/elevation.
///
/// Uses Bowring's iterative method, which converges to sub-millimetre
/// accuracy in two or three iterations for any point near the Earth's
/// surface.
pub fn cart_to_geod(p: Vec3) -> (f64, f64, f64) {
    let a = WGS84_SEMI_MAJOR_AXIS_M;
    let f = WGS84_FLATTENING;
    let e2 = f * (2.0 - f);
    let b = a * (1.0 - f);
    let ep2 = (a * a - b * b) / (b * b);

    let lon = p.y.atan2(p.x);
    let r = (p.x * p.x + p.y * p.y).sqrt();

    if r < 1e-9 {
        // on the polar axis
        let lat = if p.z >= 0.0 { 90.0 } else { -90.0 };
        return (lat, lon.to_degrees(), p.z.abs() - b);
    }

    let theta = (p.z * a).atan2(r * b);
    let mut lat = (p.z + ep2 * b * theta.sin().powi(3)).atan2(r - e2 * a * theta.cos().powi(3));

    for _ in 0..3 {
        let sin_lat = lat.sin();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let elev = r / lat.cos() - n;
        lat = (p.z / r) * (1.0 - e2 * n / (n + elev)).recip().atan();
    }

    let sin_lat = lat.sin();
    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let elev = r / lat.cos() - n;

    (lat.to_degrees(), lon.to_degrees(), elev)
}

/// Computes the forward/reverse azimuths and geodesic distance between two
/// points using Vincenty's inverse formula.
///
/// Returns `(az1_deg, az2_deg, distance_m)` where `az1` is the initial
/// bearing from `a` to `b` and `az2` is the bearing from `b` back to `a`
/// (both measured from true north). Falls back to the antipodal-case
/// approximation (a straight great-circle bearing) if Vincenty's iteration
/// fails to converge, which can happen for nearly-antipodal points.
pub fn geo_inverse(a: LatLon, b: LatLon) -> (f64, f64, f64) {
    let f = WGS84_FLATTENING;
    let r_major = WGS84_SEMI_MAJOR_AXIS_M;
    let r_minor = r_major * (1.0 - f);

    let l = (b.lon - a.lon).to_radians();
    let u1 = ((1.0 - f) * a.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * b.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut cos_sq_alpha;
    let mut sin_sigma;
    let mut cos_sigma;
    let mut sigma;
    let mut cos2_sigma_m;

    let mut converged = false;
    for _ in 0..200 {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();

        if sin_sigma == 0.0 {
            // coincident points
            return (0.0, 0.0, 0.0);
        }

        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        cos2_sigma_m = if cos_sq_alpha.abs() < 1e-12 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        };

        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos2_sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos2_sigma_m * cos2_sigma_m)));

        if (lambda - lambda_prev).abs() < 1e-12 {
            converged = true;
            break;
        }
    }

    if !converged {
        // antipodal fallback: great-circle bearing on a sphere
        let az1 = initial_bearing(a, b);
        let az2 = (initial_bearing(b, a) + 180.0) % 360.0;
        let dist = haversine_distance(a, b);
        return (az1, az2, dist);
    }

    let (sin_lambda, cos_lambda) = lambda.sin_cos();
    let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
        + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
    .sqrt();
    let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
    let sigma = sin_sigma.atan2(cos_sigma);
    let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let cos2_sigma_m = if cos_sq_alpha.abs() < 1e-12 {
        0.0
    } else {
        cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
    };

    let u_sq = cos_sq_alpha * (r_major * r_major - r_minor * r_minor) / (r_minor * r_minor);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = big_b
        * sin_sigma
        * (cos2_sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos2_sigma_m * cos2_sigma_m)
                    - big_b / 6.0
                        * cos2_sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos2_sigma_m * cos2_sigma_m)));

    let distance = r_minor * big_a * (sigma - delta_sigma);

    let az1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
    let az2 = (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

    (
        (az1.to_degrees() + 360.0) % 360.0,
        (az2.to_degrees() + 180.0) % 360.0,
        distance,
    )
}

fn initial_bearing(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

fn haversine_distance(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * WGS84_SEMI_MAJOR_AXIS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geod_to_cart_to_geod_round_trip() {
        let original = (37.61899, -122.37408, 130.0);
        let cart = geod_to_cart(original.0, original.1, original.2);
        let (lat, lon, elev) = cart_to_geod(cart);

        assert!((lat - original.0).abs() < 1e-6);
        assert!((lon - original.1).abs() < 1e-6);
        assert!((elev - original.2).abs() < 1e-2);
    }

    #[test]
    fn geo_inverse_known_distance() {
        use crate::measurements::constants::NAUTICAL_MILE_IN_METER;

        // Helgoland VOR -> Itzehoe Hungriger Wolf, ~60 NM per the German AIP.
        let dhe = LatLon::new(54.18568611, 7.91070000);
        let edhf = LatLon::new(53.99250000, 9.57666667);

        let (_, _, dist_m) = geo_inverse(dhe, edhf);
        let dist_nm = dist_m / NAUTICAL_MILE_IN_METER;
        assert!((dist_nm - 60.0).abs() < 1.0);
    }

    #[test]
    fn geo_inverse_coincident_points_are_zero() {
        let p = LatLon::new(50.0, 8.0);
        let (_, _, dist) = geo_inverse(p, p);
        assert_eq!(dist, 0.0);
    }
}
