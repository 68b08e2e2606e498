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

//! A flight track: an ordered, optionally bounded sequence of
//! [`FlightSample`]s, either loaded whole from a saved file or grown
//! live from a UDP/serial feed. Grounded on the original `FlightTrack`
//! class (spec.md §4.5); the three C++ constructors become three
//! associated functions over one [`Source`]-tagged struct.

mod io;
mod protocol;
mod sample;

pub use sample::FlightSample;

use std::path::{Path, PathBuf};

use crate::error::Error;
use io::{Channel, LineReader};

/// Where a track's samples come from.
#[derive(Debug)]
pub enum Source {
    File(PathBuf),
    Udp(u16),
    Serial { device: String, baud: u32 },
    Detached,
}

/// One flight's worth of samples, with the insertion/eviction/offset
/// bookkeeping a live-growing or file-loaded track both need.
pub struct FlightTrack {
    samples: std::collections::VecDeque<FlightSample>,
    /// `0` means unbounded, matching the original's `_max_buffer`.
    max_buffer: usize,
    mark: Option<usize>,
    cursor: usize,
    version: u64,
    version_at_last_save: u64,
    is_atlas_protocol: Option<bool>,
    source: Source,
    file_path: Option<PathBuf>,
    reader: Option<LineReader>,
}

/// How close (in degrees) a new sample's lat/lon must be to the
/// previous one to be rejected as a duplicate. The original's unit
/// tests and default preferences use an input-agnostic tolerance of
/// `0.0`, i.e. only exact duplicates are rejected; callers tighten this
/// for noisy feeds.
pub const DEFAULT_TOLERANCE: f64 = 0.0;

/// A sample whose position components are all within this of zero is
/// FlightGear's "no GPS fix yet" sentinel (nicknamed "somewhere in the
/// Atlantic Ocean" in the original), and is always rejected regardless
/// of tolerance.
const PARKED_SENTINEL: f64 = 0.001;

impl FlightTrack {
    /// Loads a complete track from a saved file: every well-formed
    /// sentence triple is accepted unconditionally (tolerance `-1.0`),
    /// matching `_readFlightFile`'s `_addPoint(d, -1.0)` call.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
        let lines: Vec<&str> = contents.lines().collect();

        let mut track = Self {
            samples: Default::default(),
            max_buffer: 0,
            mark: None,
            cursor: 0,
            version: 0,
            version_at_last_save: 0,
            is_atlas_protocol: None,
            source: Source::File(path.clone()),
            file_path: Some(path),
            reader: None,
        };

        for triple in lines.chunks(3) {
            if triple.len() < 3 {
                break;
            }
            if let Some((sample, is_atlas)) = protocol::parse_triple(triple[0], triple[1], triple[2]) {
                track.is_atlas_protocol = Some(is_atlas);
                track.add_sample(sample, -1.0);
            }
        }
        track.version_at_last_save = track.version;
        Ok(track)
    }

    /// Starts a live track fed by UDP datagrams on `port`, the way
    /// FlightGear's own `--atlas=socket,...` output arrives.
    pub fn new_udp(port: u16, max_buffer: usize) -> Result<Self, Error> {
        let channel = Channel::open_udp(port)?;
        Ok(Self::new_live(Source::Udp(port), channel, max_buffer))
    }

    /// Starts a live track fed by a serial GPS on `device` at `baud`.
    pub fn new_serial(device: impl Into<String>, baud: u32, max_buffer: usize) -> Result<Self, Error> {
        let device = device.into();
        let channel = Channel::open_serial(&device, baud)?;
        Ok(Self::new_live(Source::Serial { device, baud }, channel, max_buffer))
    }

    fn new_live(source: Source, channel: Channel, max_buffer: usize) -> Self {
        Self {
            samples: Default::default(),
            max_buffer,
            mark: None,
            cursor: 0,
            version: 0,
            version_at_last_save: 0,
            is_atlas_protocol: None,
            source,
            file_path: None,
            reader: Some(LineReader::new(channel)),
        }
    }

    /// Whether the live feed (if any) has spoken atlas's own `$PATLA`
    /// sentinel sentence at least once, vs. plain third-party nmea.
    pub fn is_atlas_protocol(&self) -> Option<bool> {
        self.is_atlas_protocol
    }

    pub fn is_network(&self) -> bool {
        matches!(self.source, Source::Udp(_))
    }

    pub fn is_serial(&self) -> bool {
        matches!(self.source, Source::Serial { .. })
    }

    pub fn is_live(&self) -> bool {
        self.reader.is_some()
    }

    pub fn port(&self) -> Option<u16> {
        match &self.source {
            Source::Udp(p) => Some(*p),
            _ => None,
        }
    }

    pub fn device(&self) -> Option<&str> {
        match &self.source {
            Source::Serial { device, .. } => Some(device),
            _ => None,
        }
    }

    pub fn baud(&self) -> Option<u32> {
        match &self.source {
            Source::Serial { baud, .. } => Some(*baud),
            _ => None,
        }
    }

    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer
    }

    pub fn set_max_buffer_size(&mut self, max_buffer: usize) {
        self.max_buffer = max_buffer;
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.cursor = 0;
        self.mark = None;
        self.version += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Stops reading from the live feed, leaving the samples gathered
    /// so far in place. Matches `FlightTrack::detach`: a detached track
    /// behaves exactly like a file-loaded one from then on.
    pub fn detach(&mut self) {
        self.reader = None;
        self.source = Source::Detached;
    }

    /// Polls the live feed (if any), parsing and adding every complete
    /// sentence triple currently buffered. Returns the number of
    /// samples added. A no-op for a file-loaded or detached track.
    pub fn check_for_input(&mut self) -> Result<usize, Error> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(0);
        };
        reader.poll()?;

        let mut added = 0;
        while let Some([a, b, c]) = reader.pop_triple() {
            if let Some((sample, is_atlas)) = protocol::parse_triple(&a, &b, &c) {
                self.is_atlas_protocol = Some(is_atlas);
                if self.add_sample(sample, DEFAULT_TOLERANCE) {
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    /// The insertion filter and derived-value maintenance shared by
    /// file loads and live input. Mirrors `FlightTrack::_addPoint`:
    /// rejects the "no fix yet" sentinel, rejects a near-duplicate of
    /// the last sample, evicts the oldest sample when `max_buffer` is
    /// exceeded, and recalculates `est_t_offset_s`/`cum_dist_m` around
    /// whatever index changed. Returns whether the sample was kept.
    pub fn add_sample(&mut self, sample: FlightSample, tolerance: f64) -> bool {
        if sample.lat.abs() < PARKED_SENTINEL
            && sample.lon.abs() < PARKED_SENTINEL
            && sample.alt_ft.abs() < PARKED_SENTINEL
            && sample.hdg_deg.abs() < PARKED_SENTINEL
            && sample.spd_kt.abs() < PARKED_SENTINEL
        {
            return false;
        }

        if let Some(last) = self.samples.back() {
            if (last.lat - sample.lat).abs() < tolerance && (last.lon - sample.lon).abs() < tolerance {
                return false;
            }
        }

        if self.max_buffer != 0 && self.samples.len() >= self.max_buffer {
            self.samples.pop_front();
            if let Some(mark) = self.mark.as_mut() {
                *mark = mark.saturating_sub(1);
            }
            self.cursor = self.cursor.saturating_sub(1);
            let slice = self.samples.make_contiguous();
            sample::adjust_offsets_around(slice, 0);
            sample::calc_distances_from(slice, 0);
        }

        self.samples.push_back(sample);
        let last_index = self.samples.len() - 1;
        let slice = self.samples.make_contiguous();
        sample::adjust_offsets_around(slice, last_index);
        sample::calc_distances_from(slice, last_index);

        self.version += 1;
        true
    }

    pub fn first_point(&mut self) -> Option<&FlightSample> {
        self.cursor = 0;
        self.samples.front()
    }

    pub fn get_next_point(&mut self) -> Option<&FlightSample> {
        self.cursor += 1;
        self.samples.get(self.cursor)
    }

    pub fn get_current_point(&self) -> Option<&FlightSample> {
        self.samples.get(self.cursor)
    }

    pub fn get_last_point(&mut self) -> Option<&FlightSample> {
        self.cursor = self.samples.len().saturating_sub(1);
        self.samples.back()
    }

    pub fn data_at_point(&self, i: usize) -> Option<&FlightSample> {
        self.samples.get(i)
    }

    pub fn at(&self, i: usize) -> Option<&FlightSample> {
        self.samples.get(i)
    }

    pub fn last(&self) -> Option<&FlightSample> {
        self.samples.back()
    }

    pub fn set_mark(&mut self, mark: Option<usize>) {
        self.mark = mark;
    }

    pub fn mark(&self) -> Option<usize> {
        self.mark
    }

    pub fn has_file(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_path.as_deref()?.file_name()?.to_str()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    /// The display/sort name: the file's base name if saved, otherwise
    /// a synthesized description of the live source. The original uses
    /// this same string for both display and the track list's sort
    /// order; the owning list is responsible for re-sorting after a
    /// `save_as` changes a track's name (spec.md §9, "niceName used for
    /// both display and sort order").
    pub fn nice_name(&self) -> String {
        if let Some(name) = self.file_name() {
            return name.to_string();
        }
        match &self.source {
            Source::Udp(port) => format!("<udp:{port}>"),
            Source::Serial { device, baud } => format!("<{device}:{baud}>"),
            Source::File(path) => path.display().to_string(),
            Source::Detached => "<unsaved>".to_string(),
        }
    }

    /// Whether any sample has been added since the last [`Self::save`].
    pub fn modified(&self) -> bool {
        self.version != self.version_at_last_save
    }

    /// Writes every sample to [`Self::file_path`] as sentence triples,
    /// atlas or nmea flavour depending on [`Self::is_atlas_protocol`].
    /// Matches `FlightTrack::save`.
    pub fn save(&mut self) -> Result<(), Error> {
        let path = self.file_path.clone().ok_or_else(|| Error::Io("no file path set".to_string()))?;
        let is_atlas = self.is_atlas_protocol.unwrap_or(true);

        let mut out = String::new();
        for sample in &self.samples {
            for line in protocol::format_triple(sample, is_atlas) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        std::fs::write(&path, out).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
        self.version_at_last_save = self.version;
        Ok(())
    }

    /// Writes to a new path, adopting it as [`Self::file_path`].
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
        self.file_path = Some(path.into());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_sample(lat: f64, lon: f64) -> FlightSample {
        let mut sample = FlightSample {
            lat,
            lon,
            alt_ft: 1000.0,
            hdg_deg: 90.0,
            spd_kt: 100.0,
            time_epoch: 1_000_000,
            ..Default::default()
        };
        sample.recompute_cart();
        sample
    }

    fn empty_track() -> FlightTrack {
        FlightTrack {
            samples: Default::default(),
            max_buffer: 0,
            mark: None,
            cursor: 0,
            version: 0,
            version_at_last_save: 0,
            is_atlas_protocol: None,
            source: Source::Detached,
            file_path: None,
            reader: None,
        }
    }

    #[test]
    fn parked_sentinel_sample_is_rejected() {
        let mut track = empty_track();
        let sample = FlightSample::default();
        assert!(!track.add_sample(sample, DEFAULT_TOLERANCE));
        assert!(track.is_empty());
    }

    #[test]
    fn first_real_sample_is_always_accepted() {
        let mut track = empty_track();
        assert!(track.add_sample(fixture_sample(37.0, -122.0), DEFAULT_TOLERANCE));
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn exact_duplicate_position_is_rejected_at_zero_tolerance() {
        let mut track = empty_track();
        track.add_sample(fixture_sample(37.0, -122.0), DEFAULT_TOLERANCE);
        assert!(!track.add_sample(fixture_sample(37.0, -122.0), DEFAULT_TOLERANCE));
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn distinct_position_is_accepted() {
        let mut track = empty_track();
        track.add_sample(fixture_sample(37.0, -122.0), DEFAULT_TOLERANCE);
        assert!(track.add_sample(fixture_sample(37.1, -122.1), DEFAULT_TOLERANCE));
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn buffer_eviction_keeps_size_bounded() {
        let mut track = empty_track();
        track.set_max_buffer_size(2);
        track.add_sample(fixture_sample(37.0, -122.0), DEFAULT_TOLERANCE);
        track.add_sample(fixture_sample(37.1, -122.1), DEFAULT_TOLERANCE);
        track.add_sample(fixture_sample(37.2, -122.2), DEFAULT_TOLERANCE);
        assert_eq!(track.len(), 2);
        assert_eq!(track.at(0).unwrap().lat, 37.1);
        assert_eq!(track.at(1).unwrap().lat, 37.2);
    }

    #[test]
    fn nice_name_falls_back_to_source_description_when_unsaved() {
        let track = empty_track();
        assert_eq!(track.nice_name(), "<unsaved>");
    }

    #[test]
    fn modified_tracks_version_against_last_save() {
        let mut track = empty_track();
        assert!(!track.modified());
        track.add_sample(fixture_sample(37.0, -122.0), DEFAULT_TOLERANCE);
        assert!(track.modified());
    }
}
