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

//! The NMEA-derived wire protocol a flight track is read from and
//! written to: three-line sentence triples (`$GPRMC`, `$GPGGA`,
//! `$PATLA`/`$GPGSA`), each terminated with an XOR checksum.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};

use super::sample::FlightSample;

/// XOR-folds every byte of `body` (the sentence with leading `$` and
/// trailing `*XX` stripped) into a single checksum byte.
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Strips a leading `$` and trailing `*XX` checksum from `line`,
/// verifying the checksum matches. Returns `None` if the line is
/// malformed or the checksum doesn't match.
fn strip_and_verify(line: &str) -> Option<&str> {
    let line = line.strip_prefix('$')?;
    let (body, check) = line.rsplit_once('*')?;
    let found = u8::from_str_radix(check.trim(), 16).ok()?;
    if checksum(body) != found {
        return None;
    }
    Some(body)
}

/// Parses one `$GPRMC,...,$GPGGA,...,$PATLA-or-$GPGSA,...` triple into
/// a [`FlightSample`], returning the protocol flavour it matched
/// (`true` for atlas, `false` for plain nmea). A blank line in place of
/// any sentence is tolerated as long as the other two parse; the
/// original treats a wholly blank triple as a no-op success, which
/// callers handle before reaching this function.
pub fn parse_triple(rmc_line: &str, gga_line: &str, third_line: &str) -> Option<(FlightSample, bool)> {
    let mut sample = FlightSample::default();
    let mut is_atlas = None;

    if !rmc_line.trim().is_empty() {
        parse_gprmc(rmc_line, &mut sample)?;
    }
    if !gga_line.trim().is_empty() {
        parse_gpgga(gga_line, &mut sample)?;
    }
    match third_line.trim() {
        "" => {}
        _ => {
            if let Some(body) = strip_and_verify(third_line) {
                if let Some(rest) = body.strip_prefix("PATLA,") {
                    parse_patla(rest, &mut sample)?;
                    is_atlas = Some(true);
                } else if body.starts_with("GPGSA,") {
                    let fields: Vec<&str> = body.split(',').collect();
                    if fields.len() != 18 {
                        return None;
                    }
                    is_atlas = Some(false);
                } else {
                    return None;
                }
            } else {
                return None;
            }
        }
    }

    sample.recompute_cart();
    Some((sample, is_atlas.unwrap_or(true)))
}

fn parse_gprmc(line: &str, sample: &mut FlightSample) -> Option<()> {
    let body = strip_and_verify(line)?;
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != 12 && fields.len() != 13 {
        return None;
    }
    let is_nmea = fields.len() == 13;

    let utc = fields[1];
    if utc.len() < 6 {
        return None;
    }
    let hour: u32 = utc[0..2].parse().ok()?;
    let minute: u32 = utc[2..4].parse().ok()?;
    let second: u32 = utc[4..6].parse().ok()?;

    let date = fields[9];
    if date.len() < 6 {
        return None;
    }
    let day: u32 = date[0..2].parse().ok()?;
    let month: u32 = date[2..4].parse().ok()?;
    let mut year: i32 = date[4..].parse().ok()?;
    if is_nmea && year < 90 {
        year += 100;
    }

    sample.time_epoch = ymd_hms_to_epoch(1900 + year, month, day, hour, minute, second)?;

    sample.spd_kt = fields[7].parse().unwrap_or(0.0);
    sample.hdg_deg = fields[8].parse().unwrap_or(0.0);

    Some(())
}

fn parse_gpgga(line: &str, sample: &mut FlightSample) -> Option<()> {
    let body = strip_and_verify(line)?;
    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != 15 {
        return None;
    }

    let lat = parse_dm(fields[2])?;
    let lat_sign = if fields[3] == "S" { -1.0 } else { 1.0 };
    let lon = parse_dm(fields[4])?;
    let lon_sign = if fields[5] == "W" { -1.0 } else { 1.0 };

    sample.lat = lat * lat_sign;
    sample.lon = lon * lon_sign;

    let alt: f64 = fields[9].parse().ok()?;
    sample.alt_ft = match fields[10] {
        "M" => alt / crate::measurements::constants::FEET_IN_METER,
        _ => alt,
    };

    Some(())
}

/// Parses a `DDMM.MMM`-style field into decimal degrees. Works for both
/// the two-digit-degree latitude and three-digit-degree longitude
/// forms: everything but the last two whole digits before the decimal
/// point is the degree part.
fn parse_dm(field: &str) -> Option<f64> {
    let dot = field.find('.')?;
    if dot < 2 {
        return None;
    }
    let deg_len = dot - 2;
    let deg: f64 = field[..deg_len].parse().ok()?;
    let min: f64 = field[deg_len..].parse().ok()?;
    Some(deg + min / 60.0)
}

fn parse_patla(rest: &str, sample: &mut FlightSample) -> Option<()> {
    let fields: Vec<&str> = rest.split(',').collect();
    if fields.len() != 5 {
        return None;
    }
    let nav1_freq: f64 = fields[0].parse().ok()?;
    sample.nav1_freq_khz = (nav1_freq * 1000.0).round() as i32;
    sample.nav1_radial = fields[1].parse().ok()?;
    let nav2_freq: f64 = fields[2].parse().ok()?;
    sample.nav2_freq_khz = (nav2_freq * 1000.0).round() as i32;
    sample.nav2_radial = fields[3].parse().ok()?;
    sample.adf_freq_khz = fields[4].parse().ok()?;
    Some(())
}

/// Gregorian calendar to Unix epoch seconds, treating the input as UTC
/// with no leap seconds, matching the original's use of
/// `timegm`/`sgTimeGetGMT`.
fn ymd_hms_to_epoch(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(date.and_time(time).and_utc().timestamp())
}

/// Formats a signed angle as `(degrees, minutes, sign char)`, matching
/// `_splitAngle`: `direction[0]` for non-negative, `direction[1]` for
/// negative.
pub fn split_angle(angle: f64, direction: (char, char)) -> (u32, f64, char) {
    let sign = if angle < 0.0 { direction.1 } else { direction.0 };
    let angle = angle.abs();
    let degrees = angle as u32;
    let minutes = (angle - degrees as f64) * 60.0;
    (degrees, minutes, sign)
}

/// Renders one sample as a `$GPRMC`/`$GPGGA`/`$PATLA-or-$GPGSA` triple,
/// each line checksummed, matching `FlightTrack::save`.
pub fn format_triple(sample: &FlightSample, is_atlas: bool) -> [String; 3] {
    let (year, month, day, hour, minute, second) = epoch_to_ymd_hms(sample.time_epoch);
    let date_year = if is_atlas { year - 1900 } else { (year - 1900) % 100 };

    let (lat_deg, lat_min, lat_c) = split_angle(sample.lat, ('N', 'S'));
    let (lon_deg, lon_min, lon_c) = split_angle(sample.lon, ('E', 'W'));

    let rmc_body = if is_atlas {
        format!(
            "GPRMC,{hour:02}{minute:02}{second:02},A,,,,,{:.1},{:.1},{day:02}{month:02}{date_year:02},0.000,E",
            sample.spd_kt, sample.hdg_deg
        )
    } else {
        format!(
            "GPRMC,{hour:02}{minute:02}{second:02},A,,,,,{:.1},{:.1},{day:02}{month:02}{date_year:02},0.000,E,A",
            sample.spd_kt, sample.hdg_deg
        )
    };
    let rmc = format!("${rmc_body}*{:02X}", checksum(&rmc_body));

    let gga_body = format!(
        "GPGGA,{hour:02}{minute:02}{second:02},{lat_deg:02}{lat_min:06.3},{lat_c},{lon_deg:03}{lon_min:06.3},{lon_c},1,,,{:.0},F,,,,",
        sample.alt_ft
    );
    let gga = format!("${gga_body}*{:02X}", checksum(&gga_body));

    let third_body = if is_atlas {
        format!(
            "PATLA,{:.2},{:.1},{:.2},{:.1},{}",
            sample.nav1_freq_khz as f64 / 1000.0,
            sample.nav1_radial,
            sample.nav2_freq_khz as f64 / 1000.0,
            sample.nav2_radial,
            sample.adf_freq_khz
        )
    } else {
        "GPGSA,A,3,01,02,03,,05,,07,,09,,11,12,0.9,0.9,2.0".to_string()
    };
    let third = format!("${third_body}*{:02X}", checksum(&third_body));

    [rmc, gga, third]
}

/// Inverse of [`ymd_hms_to_epoch`].
fn epoch_to_ymd_hms(epoch: i64) -> (i32, u32, u32, u32, u32, u32) {
    let dt = DateTime::<Utc>::from_timestamp(epoch, 0).unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).unwrap());
    (dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), dt.second())
}
