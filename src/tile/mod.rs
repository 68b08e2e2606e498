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

//! One scenery tile's sync/map-generation pipeline and the tile list
//! that walks the scenery tree to find work. Grounded on `Tile.hxx`/
//! `.cxx` and `TileManager.cxx`: a single-threaded state machine driven
//! one non-blocking step at a time via [`Tile::do_some_work`], matching
//! spec.md §5's "bounded work and return" cooperative model.

mod naming;
mod png;
mod process;

pub use naming::{lat_lon_to_tile, name_to_centre};

use std::collections::HashMap;
use std::path::PathBuf;

use log::warn;

use crate::config::Config;
use crate::error::Error;
use process::ChildProcess;

/// Which rsync/Map step is next; `doSomeWork` advances through these in
/// order and stops once nothing remains.
pub mod task {
    pub const NO_TASK: u8 = 0;
    pub const SYNC_SCENERY: u8 = 1 << 0;
    pub const GENERATE_HIRES_MAP: u8 = 1 << 1;
    pub const GENERATE_LOWRES_MAP: u8 = 1 << 2;
}

/// Where a tile's current task is within its own multi-step process.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TaskState {
    #[default]
    NotStarted,
    CheckingObjects,
    SyncingObjects,
    CheckingTerrain,
    SyncingTerrain,
    Mapping,
    Finished,
}

/// A single 1°×1° scenery tile, tracked through checking, syncing and
/// map generation.
pub struct Tile {
    pub name: String,
    pub dir: String,
    pub center_lat: f64,
    pub center_lon: f64,

    tasks: u8,
    state: TaskState,

    hires_size: u32,
    lowres_size: u32,
    up_to_date: bool,

    to_be_synced_files: u32,
    to_be_synced_size: u64,
    synced_files: u32,
    synced_size: u64,
    files: HashMap<String, u64>,

    process: Option<ChildProcess>,
}

impl Tile {
    /// Builds a tile for `name`, probing `atlas_root` for existing
    /// hires/lowres maps and scheduling whichever are missing. Returns
    /// `None` if both maps already exist (or lowres generation is
    /// disabled and the hires map exists) — matching the original's
    /// `checkScenery` only keeping tiles that have at least one
    /// pending task.
    pub fn new(name: &str, config: &Config) -> Option<Self> {
        let (_, dir, center_lat, center_lon) = lat_lon_to_tile_from_name(name)?;

        let hires_path = config.atlas_root.join(format!("{name}.png"));
        let hires_size = png::png_size(&hires_path).map_or(0, |(w, _)| w);

        let lowres_path = config.atlas_root.join("lowres").join(format!("{name}.png"));
        let lowres_size = png::png_size(&lowres_path).map_or(0, |(w, _)| w);

        let mut tasks = task::NO_TASK;
        if hires_size != config.map_size {
            tasks |= task::GENERATE_HIRES_MAP;
        }
        if config.lowres_map_size != 0 && lowres_size != config.lowres_map_size {
            tasks |= task::GENERATE_LOWRES_MAP;
        }
        if tasks == task::NO_TASK {
            return None;
        }
        // Any map work implies the underlying scenery should be synced
        // first, so the generated map reflects current data.
        tasks |= task::SYNC_SCENERY;

        Some(Self {
            name: name.to_string(),
            dir,
            center_lat,
            center_lon,
            tasks,
            state: TaskState::NotStarted,
            hires_size,
            lowres_size,
            up_to_date: false,
            to_be_synced_files: 0,
            to_be_synced_size: 0,
            synced_files: 0,
            synced_size: 0,
            files: HashMap::new(),
            process: None,
        })
    }

    pub fn current_task(&self) -> u8 {
        if self.tasks & task::SYNC_SCENERY != 0 {
            task::SYNC_SCENERY
        } else if self.tasks & task::GENERATE_HIRES_MAP != 0 {
            task::GENERATE_HIRES_MAP
        } else if self.tasks & task::GENERATE_LOWRES_MAP != 0 {
            task::GENERATE_LOWRES_MAP
        } else {
            task::NO_TASK
        }
    }

    pub fn task_state(&self) -> TaskState {
        self.state
    }

    /// Clears the just-finished task and decides whether the next one
    /// still makes sense, mirroring `Tile::nextTask`.
    fn next_task(&mut self, config: &Config) {
        if self.tasks & task::SYNC_SCENERY != 0 {
            self.tasks ^= task::SYNC_SCENERY;
            if self.synced_files == 0 {
                self.tasks = task::NO_TASK;
            } else if self.up_to_date && self.hires_size == config.map_size && self.lowres_size == config.lowres_map_size {
                self.tasks = task::NO_TASK;
            }
        } else if self.tasks & task::GENERATE_HIRES_MAP != 0 {
            self.tasks ^= task::GENERATE_HIRES_MAP;
        } else if self.tasks & task::GENERATE_LOWRES_MAP != 0 {
            self.tasks ^= task::GENERATE_LOWRES_MAP;
        }
        self.state = TaskState::NotStarted;
    }

    /// Advances the tile's current task by one cooperative step,
    /// starting/continuing/finishing whatever external process the
    /// step needs, and returns the task that's now current (`NO_TASK`
    /// once every scheduled task is done). Mirrors `Tile::doSomeWork`.
    pub fn do_some_work(&mut self, config: &Config) -> u8 {
        match self.current_task() {
            task::SYNC_SCENERY => self.work_on_sync(config),
            task::GENERATE_HIRES_MAP | task::GENERATE_LOWRES_MAP => self.work_on_mapping(config),
            _ => {}
        }

        if self.state == TaskState::Finished {
            self.next_task(config);
        }
        self.current_task()
    }

    fn work_on_sync(&mut self, config: &Config) {
        match self.state {
            TaskState::NotStarted => {
                self.state = TaskState::CheckingObjects;
                self.start_checking(config, "Objects");
            }
            TaskState::CheckingObjects | TaskState::CheckingTerrain => {
                if !self.continue_checking() {
                    if self.to_be_synced_files > 0 {
                        if self.state == TaskState::CheckingObjects {
                            self.state = TaskState::SyncingObjects;
                            self.up_to_date = true;
                        } else {
                            self.state = TaskState::SyncingTerrain;
                        }
                        let area = if self.state == TaskState::SyncingObjects { "Objects" } else { "Terrain" };
                        self.start_syncing(config, area);
                    } else if self.state == TaskState::CheckingObjects {
                        self.state = TaskState::CheckingTerrain;
                        self.start_checking(config, "Terrain");
                    } else {
                        self.state = TaskState::Finished;
                    }
                }
            }
            TaskState::SyncingObjects | TaskState::SyncingTerrain => {
                if !self.continue_syncing() {
                    if self.state == TaskState::SyncingObjects {
                        self.state = TaskState::CheckingTerrain;
                        self.start_checking(config, "Terrain");
                    } else {
                        self.state = TaskState::Finished;
                    }
                }
            }
            TaskState::Mapping | TaskState::Finished => {}
        }
    }

    fn work_on_mapping(&mut self, config: &Config) {
        if self.state == TaskState::NotStarted {
            self.state = TaskState::Mapping;
            self.start_mapping(config);
        }
        if self.state == TaskState::Mapping && !self.continue_mapping(config) {
            self.state = TaskState::Finished;
        }
    }

    fn start_checking(&mut self, config: &Config, area: &str) {
        self.to_be_synced_files = 0;
        self.to_be_synced_size = 0;
        self.files.clear();

        let cmd = format!("rsync -v -a {}::Scenery/{area}/{}/{}", config.rsync_server, self.dir, self.name);
        match ChildProcess::spawn(&cmd) {
            Ok(process) => self.process = Some(process),
            Err(e) => {
                warn!("tile {}: {e}", self.name);
                self.state = TaskState::Finished;
            }
        }
    }

    fn continue_checking(&mut self) -> bool {
        let Some(process) = self.process.as_mut() else {
            return false;
        };
        for line in process.poll_lines() {
            if let Some((file_name, size)) = parse_check_line(&line) {
                self.to_be_synced_files += 1;
                self.to_be_synced_size += size;
                self.files.insert(file_name, size);
            }
        }
        !process.eof()
    }

    fn start_syncing(&mut self, config: &Config, area: &str) {
        self.synced_files = 0;
        self.synced_size = 0;

        let dest = config.scenery_root.join(area).join(&self.dir);
        if let Err(e) = std::fs::create_dir_all(&dest) {
            warn!("tile {}: could not create {}: {e}", self.name, dest.display());
        }

        let cmd = format!(
            "rsync -v -v -a --delete {}::Scenery/{area}/{}/{} {}",
            config.rsync_server,
            self.dir,
            self.name,
            dest.display()
        );
        match ChildProcess::spawn(&cmd) {
            Ok(process) => self.process = Some(process),
            Err(e) => {
                warn!("tile {}: {e}", self.name);
                self.state = TaskState::Finished;
            }
        }
    }

    fn continue_syncing(&mut self) -> bool {
        if self.to_be_synced_files == 0 {
            return false;
        }
        let Some(process) = self.process.as_mut() else {
            return false;
        };
        for line in process.poll_lines() {
            if let Some((file_name, up_to_date)) = parse_sync_line(&line) {
                self.synced_files += 1;
                self.synced_size += self.files.get(&file_name).copied().unwrap_or(0);
                if !up_to_date {
                    self.up_to_date = false;
                }
            }
        }
        !process.eof()
    }

    fn start_mapping(&mut self, config: &Config) {
        let (output, size) = if self.current_task() == task::GENERATE_HIRES_MAP {
            (config.atlas_root.join(format!("{}.partial", self.name)), config.map_size)
        } else {
            (
                config.atlas_root.join("lowres").join(format!("{}.partial", self.name)),
                config.lowres_map_size,
            )
        };
        if let Some(parent) = output.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let cmd = format!(
            "{} --fg-root={} --fg-scenery={} --lat={} --lon={} --output={} --size={size} --headless --autoscale",
            config.map_executable.display(),
            config.fg_root.display(),
            config.scenery_root.display(),
            self.center_lat,
            self.center_lon,
            output.display(),
        );
        match ChildProcess::spawn(&cmd) {
            Ok(process) => self.process = Some(process),
            Err(e) => {
                warn!("tile {}: {e}", self.name);
                self.state = TaskState::Finished;
            }
        }
    }

    /// Drains the Map tool's output (never parsed — it's just progress
    /// chatter) and, once it exits, renames the `.partial` file to its
    /// final `.png` name so a half-written map is never read. Mirrors
    /// `_continueMapping`, using `std::fs::rename` in place of shelling
    /// out to `mv`.
    fn continue_mapping(&mut self, config: &Config) -> bool {
        let Some(process) = self.process.as_mut() else {
            return false;
        };
        for _ in process.poll_lines() {}
        if !process.eof() {
            return true;
        }

        let lowres = self.current_task() == task::GENERATE_LOWRES_MAP;
        let dir = if lowres { config.atlas_root.join("lowres") } else { config.atlas_root.clone() };
        let partial = dir.join(format!("{}.partial", self.name));
        let final_path = dir.join(format!("{}.png", self.name));

        match std::fs::rename(&partial, &final_path) {
            Ok(()) => {
                if let Some((w, _)) = png::png_size(&final_path) {
                    if lowres {
                        self.lowres_size = w;
                    } else {
                        self.hires_size = w;
                    }
                }
            }
            Err(e) => warn!("tile {}: could not finalize map: {e}", self.name),
        }
        false
    }
}

fn lat_lon_to_tile_from_name(name: &str) -> Option<(String, String, f64, f64)> {
    let (center_lat, center_lon) = name_to_centre(name)?;
    let (canonical_name, dir, lat, lon) = lat_lon_to_tile(center_lat, center_lon);
    if canonical_name != name {
        return None;
    }
    Some((canonical_name, dir, lat, lon))
}

/// Parses an `rsync -a` checking line like
/// `-rw-rw-r--   4260 2006/01/09 04:01:05 w120n37/5CL0.btg.gz`,
/// returning the file's basename and size. Directory lines (starting
/// with `d`) are skipped, matching the original's leading `-` match.
fn parse_check_line(line: &str) -> Option<(String, u64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 || !fields[0].starts_with('-') {
        return None;
    }
    let size: u64 = fields[1].parse().ok()?;
    let file_name = fields[4].rsplit('/').next()?.to_string();
    Some((file_name, size))
}

/// Parses an `rsync -v -v --delete` syncing line like
/// `e006n43/3055936.btg.gz` or `e006n43/3055936.btg.gz is uptodate`,
/// returning the file's basename and whether it was already current.
fn parse_sync_line(line: &str) -> Option<(String, bool)> {
    let (_, rest) = line.split_once('/')?;
    let file_name = rest.split_whitespace().next()?.to_string();
    let up_to_date = line.contains("uptodate");
    Some((file_name, up_to_date))
}

/// Walks `scenery_root/Terrain` for 10°/1° directories and builds a
/// tile for each one missing a map, mirroring `TileManager::checkScenery`.
pub fn scan_scenery(config: &Config) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let terrain_root = config.scenery_root.join("Terrain");

    let Ok(ten_degree_dirs) = std::fs::read_dir(&terrain_root) else {
        warn!("could not read {}", terrain_root.display());
        return tiles;
    };

    for ten_dir in ten_degree_dirs.flatten() {
        let Ok(one_degree_dirs) = std::fs::read_dir(ten_dir.path()) else {
            continue;
        };
        for one_dir in one_degree_dirs.flatten() {
            let Some(name) = one_dir.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Some(tile) = Tile::new(&name, config) {
                tiles.push(tile);
            }
        }
    }

    tiles
}

/// The in-memory set of tiles currently scheduled for work, keyed by
/// name to match `TileManager`'s add/remove-by-name contract.
#[derive(Default)]
pub struct TileManager {
    tiles: Vec<Tile>,
}

impl TileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan(&mut self, config: &Config) {
        for tile in scan_scenery(config) {
            self.add_tile(tile);
        }
    }

    pub fn add_tile(&mut self, tile: Tile) {
        if !self.tiles.iter().any(|t| t.name == tile.name) {
            self.tiles.push(tile);
        }
    }

    pub fn remove_tile(&mut self, name: &str) {
        self.tiles.retain(|t| t.name != name);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile_with_name(&self, name: &str) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.name == name)
    }

    pub fn tile_at_lat_lon(&self, lat: f64, lon: f64) -> Option<&Tile> {
        let (name, ..) = lat_lon_to_tile(lat, lon);
        self.tile_with_name(&name)
    }

    /// Advances the first tile with outstanding work by one cooperative
    /// step, removing it once finished. Returns whether any work was
    /// done this call.
    pub fn do_some_work(&mut self, config: &Config) -> bool {
        let Some(index) = self.tiles.iter().position(|t| t.current_task() != task::NO_TASK) else {
            return false;
        };
        let finished = self.tiles[index].do_some_work(config) == task::NO_TASK;
        if finished {
            self.tiles.remove(index);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::from_raw("/scenery", "/atlas", "/fgdata", "/usr/bin/Map", "scenery.flightgear.org", "1000", "256").unwrap()
    }

    #[test]
    fn current_task_prefers_sync_over_map_generation() {
        let tile = Tile {
            name: "w121n36".to_string(),
            dir: "w130n30".to_string(),
            center_lat: 36.5,
            center_lon: -120.5,
            tasks: task::SYNC_SCENERY | task::GENERATE_HIRES_MAP,
            state: TaskState::NotStarted,
            hires_size: 0,
            lowres_size: 0,
            up_to_date: false,
            to_be_synced_files: 0,
            to_be_synced_size: 0,
            synced_files: 0,
            synced_size: 0,
            files: HashMap::new(),
            process: None,
        };
        assert_eq!(tile.current_task(), task::SYNC_SCENERY);
    }

    #[test]
    fn next_task_skips_map_generation_when_nothing_was_synced() {
        let config = test_config();
        let mut tile = Tile {
            name: "w121n36".to_string(),
            dir: "w130n30".to_string(),
            center_lat: 36.5,
            center_lon: -120.5,
            tasks: task::SYNC_SCENERY | task::GENERATE_HIRES_MAP,
            state: TaskState::NotStarted,
            hires_size: 0,
            lowres_size: 0,
            up_to_date: false,
            to_be_synced_files: 0,
            to_be_synced_size: 0,
            synced_files: 0,
            synced_size: 0,
            files: HashMap::new(),
            process: None,
        };
        tile.next_task(&config);
        assert_eq!(tile.current_task(), task::NO_TASK);
    }

    #[test]
    fn next_task_skips_remap_when_already_up_to_date_and_correctly_sized() {
        let config = test_config();
        let mut tile = Tile {
            name: "w121n36".to_string(),
            dir: "w130n30".to_string(),
            center_lat: 36.5,
            center_lon: -120.5,
            tasks: task::SYNC_SCENERY | task::GENERATE_HIRES_MAP,
            state: TaskState::NotStarted,
            hires_size: 1000,
            lowres_size: 256,
            up_to_date: true,
            to_be_synced_files: 0,
            to_be_synced_size: 0,
            synced_files: 4,
            synced_size: 0,
            files: HashMap::new(),
            process: None,
        };
        tile.next_task(&config);
        assert_eq!(tile.current_task(), task::NO_TASK);
    }

    #[test]
    fn parse_check_line_extracts_basename_and_size() {
        let line = "-rw-rw-r--        4260 2006/01/09 04:01:05 w120n37/5CL0.btg.gz";
        assert_eq!(parse_check_line(line), Some(("5CL0.btg.gz".to_string(), 4260)));
    }

    #[test]
    fn parse_check_line_skips_directory_entries() {
        let line = "drwxrwxr-x        4096 2006/01/10 04:33:58 w120n37";
        assert!(parse_check_line(line).is_none());
    }

    #[test]
    fn parse_sync_line_detects_uptodate_files() {
        let (name, up_to_date) = parse_sync_line("e006n43/3055936.btg.gz is uptodate").unwrap();
        assert_eq!(name, "3055936.btg.gz");
        assert!(up_to_date);
    }

    #[test]
    fn parse_sync_line_detects_freshly_downloaded_files() {
        let (name, up_to_date) = parse_sync_line("e006n43/3055936.btg.gz").unwrap();
        assert_eq!(name, "3055936.btg.gz");
        assert!(!up_to_date);
    }

    #[test]
    fn tile_manager_dedupes_tiles_by_name() {
        let config = test_config();
        let mut manager = TileManager::new();
        let tile_a = Tile::new("w121n36", &config);
        let tile_b = Tile::new("w121n36", &config);
        if let (Some(a), Some(b)) = (tile_a, tile_b) {
            manager.add_tile(a);
            manager.add_tile(b);
            assert_eq!(manager.len(), 1);
        }
    }
}
