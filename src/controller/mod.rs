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

//! The single-threaded coordinator tying the spatial index, loader
//! output, flight-track list, tile manager and palette manager
//! together (spec.md §2 item 8, §4.8). Grounded directly on
//! `original_source/src/AtlasController.cxx`'s `AtlasController`,
//! `FlightTracks` and `Palettes` classes: the setters compare old and
//! new values before publishing, and the flight-track lifecycle
//! methods (`add`/`load`/`remove`/`detach`/`save`/`save_as`/
//! `check_for_input`) mirror `addTrack`/`loadTrack`/`removeTrack`/
//! `detachTrack`/`saveTrack`/`saveTrackAs`/`checkForInput` respectively.

pub mod flags;
pub mod notify;

pub use flags::{ControllerFlags, ImageType};
pub use notify::{Notification, NotificationBus};

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::Config;
use crate::error::Error;
use crate::loader::NavigationDatabase;
use crate::searcher::Searcher;
use crate::tile::TileManager;
use crate::track::FlightTrack;
use crate::palette::PaletteManager;
use crate::waypoint::Searchable;

/// Owns every long-lived piece of Atlas's data backbone and publishes
/// the notifications consumers subscribe to when that state changes.
pub struct Controller {
    config: Config,
    database: NavigationDatabase,
    searcher: Searcher,
    tiles: TileManager,
    palettes: PaletteManager,
    tracks: Vec<FlightTrack>,
    current_track: Option<usize>,
    flags: ControllerFlags,
    bus: NotificationBus,
}

impl Controller {
    /// Builds a controller over an already-loaded [`NavigationDatabase`]
    /// (see [`crate::loader::load_all`]), indexing every waypoint and
    /// airport into a fresh [`Searcher`] and scanning `config`'s
    /// scenery tree for tiles needing work. Matches the constructor
    /// sequence in `AtlasController::AtlasController`, minus the
    /// preference-driven defaults, which callers apply afterwards via
    /// the setters.
    pub fn new(config: Config, database: NavigationDatabase) -> Self {
        let mut searcher = Searcher::new();
        for waypoint in &database.waypoints {
            searcher.add(waypoint.clone());
        }
        for airport in &database.airports {
            let entity: Rc<dyn Searchable> = Rc::new(airport.clone());
            searcher.add(entity);
        }

        let mut tiles = TileManager::new();
        tiles.scan(&config);

        Self {
            config,
            database,
            searcher,
            tiles,
            palettes: PaletteManager::new(),
            tracks: Vec::new(),
            current_track: None,
            flags: ControllerFlags::default(),
            bus: NotificationBus::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &NavigationDatabase {
        &self.database
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn searcher_mut(&mut self) -> &mut Searcher {
        &mut self.searcher
    }

    pub fn tiles(&self) -> &TileManager {
        &self.tiles
    }

    pub fn palettes(&self) -> &PaletteManager {
        &self.palettes
    }

    pub fn flags(&self) -> &ControllerFlags {
        &self.flags
    }

    /// Registers `callback` against `kind`; see [`NotificationBus::subscribe`].
    pub fn subscribe(&mut self, kind: Notification, callback: impl FnMut(&mut NotificationBus, Notification) + 'static) {
        self.bus.subscribe(kind, callback);
    }

    /// Drives the tile worker one bounded step. Returns whether any
    /// tile still has outstanding work, matching `TileManager::doSomeWork`.
    pub fn advance_tile_work(&mut self) -> bool {
        self.tiles.do_some_work(&self.config)
    }

    /// Loads every `*.ap` file in `dir` and publishes `PaletteList`,
    /// matching the `Notification::notify(Notification::PaletteList)`
    /// call in the `Palettes` constructor.
    pub fn load_palettes(&mut self, dir: impl AsRef<Path>) -> std::io::Result<()> {
        self.palettes.load_dir(dir)?;
        self.bus.publish(Notification::PaletteList);
        Ok(())
    }

    // -- Rendering-policy setters --------------------------------------
    //
    // Each compares old and new before mutating `self.flags` and
    // publishing, matching every `AtlasController::set*` method's
    // `if (_field != newValue) { ...; notify(...); }` shape.

    pub fn set_discrete_contours(&mut self, value: bool) {
        if self.flags.discrete_contours != value {
            self.flags.discrete_contours = value;
            self.bus.publish(Notification::DiscreteContours);
        }
    }

    pub fn set_contour_lines(&mut self, value: bool) {
        if self.flags.contour_lines != value {
            self.flags.contour_lines = value;
            self.bus.publish(Notification::ContourLines);
        }
    }

    pub fn set_lighting_on(&mut self, value: bool) {
        if self.flags.lighting_on != value {
            self.flags.lighting_on = value;
            self.bus.publish(Notification::LightingOn);
        }
    }

    pub fn set_smooth_shading(&mut self, value: bool) {
        if self.flags.smooth_shading != value {
            self.flags.smooth_shading = value;
            self.bus.publish(Notification::SmoothShading);
        }
    }

    pub fn set_azimuth(&mut self, value: f64) {
        if self.flags.azimuth != value {
            self.flags.azimuth = value;
            self.bus.publish(Notification::Azimuth);
        }
    }

    pub fn set_elevation(&mut self, value: f64) {
        if self.flags.elevation != value {
            self.flags.elevation = value;
            self.bus.publish(Notification::Elevation);
        }
    }

    pub fn set_oversampling(&mut self, value: u32) {
        if self.flags.oversampling != value {
            self.flags.oversampling = value;
            self.bus.publish(Notification::Oversampling);
        }
    }

    pub fn set_image_type(&mut self, value: ImageType) {
        if self.flags.image_type != value {
            self.flags.image_type = value;
            self.bus.publish(Notification::ImageType);
        }
    }

    pub fn set_jpeg_quality(&mut self, value: u32) {
        if self.flags.jpeg_quality != value {
            self.flags.jpeg_quality = value;
            self.bus.publish(Notification::JPEGQuality);
        }
    }

    pub fn set_deg_min_sec(&mut self, value: bool) {
        if self.flags.deg_min_sec != value {
            self.flags.deg_min_sec = value;
            self.bus.publish(Notification::DegMinSec);
        }
    }

    pub fn set_mag_true(&mut self, value: bool) {
        if self.flags.mag_true != value {
            self.flags.mag_true = value;
            self.bus.publish(Notification::MagTrue);
        }
    }

    pub fn set_mefs(&mut self, value: bool) {
        if self.flags.mefs != value {
            self.flags.mefs = value;
            self.bus.publish(Notification::MEFs);
        }
    }

    pub fn set_show_track_info(&mut self, value: bool) {
        if self.flags.show_track_info != value {
            self.flags.show_track_info = value;
            self.bus.publish(Notification::ShowTrackInfo);
        }
    }

    // -- Palette setters --------------------------------------------------

    /// Selects the palette at `index` as current. Out-of-range indices
    /// are ignored, matching `setCurrentPalette`'s `i >= size()` guard.
    /// The original notifies unconditionally once past that guard;
    /// this compares old and new first, per spec.md §4.8's general
    /// "compare old/new and publish only on change" rule for every
    /// controller setter (see DESIGN.md).
    pub fn set_current_palette(&mut self, index: usize) {
        if index >= self.palettes.len() {
            return;
        }
        if self.palettes.current() != Some(index) {
            self.palettes.set_current(index);
            self.bus.publish(Notification::Palette);
        }
    }

    /// Adjusts the current palette's `base` elevation, matching
    /// `setPaletteBase`. A no-op if no palette is selected.
    pub fn set_palette_base(&mut self, base: f64) {
        let Some(palette) = self.palettes.current_palette_mut() else {
            return;
        };
        if palette.base() != base {
            palette.set_base(base);
            self.bus.publish(Notification::Palette);
        }
    }

    // -- Flight-track lifecycle -------------------------------------------

    pub fn tracks(&self) -> &[FlightTrack] {
        &self.tracks
    }

    pub fn current_track_index(&self) -> Option<usize> {
        self.current_track
    }

    pub fn current_track(&self) -> Option<&FlightTrack> {
        self.current_track.map(|i| &self.tracks[i])
    }

    /// Inserts `track` at the position that keeps `self.tracks` sorted
    /// by [`FlightTrack::nice_name`], matching `FlightTracks::add`'s
    /// sort-after-push (done here as a sorted insert instead, since the
    /// invariant already holds on every other element). Returns the
    /// track's new index.
    fn insert_sorted(&mut self, track: FlightTrack) -> usize {
        let name = track.nice_name();
        let pos = self.tracks.partition_point(|t| t.nice_name() < name);
        self.tracks.insert(pos, track);
        pos
    }

    /// Adds `track`, making it current. Matches `addTrack`.
    pub fn add(&mut self, track: FlightTrack) {
        let pos = self.insert_sorted(track);
        self.current_track = Some(pos);
        self.bus.publish(Notification::FlightTrackList);
        self.bus.publish(Notification::NewFlightTrack);
    }

    /// Loads a track from `path`, rejecting a path already attached.
    /// Matches `loadTrack`'s `find(fileName) == NaFT` guard.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        if self.tracks.iter().any(|t| t.file_path() == Some(path)) {
            return Err(Error::DuplicateTrack {
                source: path.display().to_string(),
            });
        }
        let mut track = FlightTrack::from_file(path)?;
        track.set_mark(Some(0));
        self.add(track);
        Ok(())
    }

    /// Clears the current track's samples. Matches `clearTrack`.
    pub fn clear(&mut self) {
        if let Some(i) = self.current_track {
            self.tracks[i].clear();
            self.bus.publish(Notification::FlightTrackModified);
        }
    }

    /// Saves the current track to its existing file path, if any.
    /// Matches `saveTrack`.
    pub fn save(&mut self) -> Result<(), Error> {
        let Some(i) = self.current_track else {
            return Ok(());
        };
        if self.tracks[i].has_file() {
            self.tracks[i].save()?;
            self.bus.publish(Notification::FlightTrackModified);
        }
        Ok(())
    }

    /// Saves the current track to `path`, adopting it as the track's
    /// file path, then re-sorts it into the list since its nice-name
    /// (and therefore sort position) may have changed. Matches
    /// `saveTrackAs`'s remove-then-readd-to-resort idiom.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), Error> {
        let Some(i) = self.current_track else {
            return Ok(());
        };
        self.tracks[i].set_file_path(path);
        let result = self.tracks[i].save();
        if result.is_ok() {
            let track = self.tracks.remove(i);
            let pos = self.insert_sorted(track);
            self.current_track = Some(pos);
            self.bus.publish(Notification::FlightTrackList);
            self.bus.publish(Notification::FlightTrackModified);
        }
        result
    }

    /// Removes the current track entirely. Matches `removeTrack`.
    pub fn remove(&mut self) {
        let Some(i) = self.current_track else {
            return;
        };
        self.tracks.remove(i);
        self.current_track = if self.tracks.is_empty() {
            None
        } else if i >= self.tracks.len() {
            Some(self.tracks.len() - 1)
        } else {
            Some(i)
        };
        self.bus.publish(Notification::FlightTrackList);
        self.bus.publish(Notification::NewFlightTrack);
    }

    /// Stops reading from the current track's live feed. An empty,
    /// never-populated live track is discarded outright rather than
    /// left around as a permanently empty entry, matching `detachTrack`.
    pub fn detach(&mut self) {
        let Some(i) = self.current_track else {
            return;
        };
        if !self.tracks[i].is_live() {
            return;
        }
        if self.tracks[i].is_empty() {
            self.remove();
        } else {
            self.tracks[i].detach();
            self.tracks[i].set_mark(Some(0));
            self.bus.publish(Notification::NewFlightTrack);
        }
    }

    pub fn set_mark(&mut self, mark: usize) {
        let Some(i) = self.current_track else {
            return;
        };
        if self.tracks[i].mark() != Some(mark) {
            self.tracks[i].set_mark(Some(mark));
            self.bus.publish(Notification::AircraftMoved);
        }
    }

    pub fn set_current_track(&mut self, index: usize) {
        if index < self.tracks.len() && self.current_track != Some(index) {
            self.current_track = Some(index);
            self.bus.publish(Notification::NewFlightTrack);
        }
    }

    /// Sets the live-buffer cap on the current track. No notification:
    /// `setTrackLimit` doesn't publish one either.
    pub fn set_track_limit(&mut self, limit: usize) {
        if let Some(i) = self.current_track {
            self.tracks[i].set_max_buffer_size(limit);
        }
    }

    /// Polls every live track for new input. For the current track, if
    /// its mark was sitting at the tail before new samples arrived, the
    /// mark follows the tail and `AircraftMoved` is published ahead of
    /// `FlightTrackModified`; a non-tail mark is left where it is (the
    /// viewer is presumed to be reviewing history). Matches
    /// `AtlasController::checkForInput`.
    pub fn check_for_input(&mut self) -> Result<(), Error> {
        for i in 0..self.tracks.len() {
            let was_synced = match self.tracks[i].mark() {
                None => true,
                Some(mark) => mark + 1 == self.tracks[i].len(),
            };

            let added = self.tracks[i].check_for_input()?;
            if added > 0 && self.current_track == Some(i) {
                if was_synced {
                    self.tracks[i].set_mark(Some(self.tracks[i].len() - 1));
                    self.bus.publish(Notification::AircraftMoved);
                }
                self.bus.publish(Notification::FlightTrackModified);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn test_config() -> Config {
        Config::from_raw("/scenery", "/atlas", "/fgdata", "/usr/bin/Map", "server", "1000", "256").unwrap()
    }

    fn empty_controller() -> Controller {
        Controller::new(test_config(), NavigationDatabase::default())
    }

    #[test]
    fn setter_publishes_only_on_change() {
        let mut controller = empty_controller();
        let calls = Rc::new(RefCell::new(0));
        let calls_clone = calls.clone();
        controller.subscribe(Notification::LightingOn, move |_, _| *calls_clone.borrow_mut() += 1);

        controller.set_lighting_on(false);
        assert_eq!(*calls.borrow(), 0, "no change from the default, no publish");

        controller.set_lighting_on(true);
        assert_eq!(*calls.borrow(), 1);

        controller.set_lighting_on(true);
        assert_eq!(*calls.borrow(), 1, "same value again, no publish");
    }

    #[test]
    fn set_current_palette_out_of_range_is_ignored() {
        let mut controller = empty_controller();
        controller.set_current_palette(3);
        assert_eq!(controller.palettes().current(), None);
    }

    #[test]
    fn set_palette_base_is_noop_without_a_current_palette() {
        let mut controller = empty_controller();
        controller.set_palette_base(500.0);
        assert!(controller.palettes().current_palette().is_none());
    }

    #[test]
    fn adding_tracks_sorts_by_nice_name() {
        let mut controller = empty_controller();
        controller.add(FlightTrack::new_udp(15_500, 0).unwrap());
        controller.add(FlightTrack::new_udp(15_400, 0).unwrap());

        let names: Vec<String> = controller.tracks().iter().map(|t| t.nice_name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn removing_the_only_track_clears_current() {
        let mut controller = empty_controller();
        controller.add(FlightTrack::new_udp(15_501, 0).unwrap());
        assert!(controller.current_track_index().is_some());

        controller.remove();
        assert_eq!(controller.current_track_index(), None);
        assert!(controller.tracks().is_empty());
    }

    #[test]
    fn loading_the_same_path_twice_is_rejected() {
        let dir = std::env::temp_dir().join(format!("atlas-core-controller-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("flight.fgtrack");
        std::fs::write(&path, "").unwrap();

        let mut controller = empty_controller();
        controller.load(&path).unwrap();
        let result = controller.load(&path);
        assert!(matches!(result, Err(Error::DuplicateTrack { .. })));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn check_for_input_advances_mark_only_when_current_track_was_synced() {
        let mut controller = empty_controller();
        controller.add(FlightTrack::new_udp(15_502, 0).unwrap());

        let moved = Rc::new(RefCell::new(0));
        let moved_clone = moved.clone();
        controller.subscribe(Notification::AircraftMoved, move |_, _| *moved_clone.borrow_mut() += 1);

        // An empty track has no samples, so `check_for_input` on a live
        // socket with nothing waiting is a no-op either way.
        controller.check_for_input().unwrap();
        assert_eq!(*moved.borrow(), 0);
    }
}
