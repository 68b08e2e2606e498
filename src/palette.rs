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

//! `.ap` colour table manager (spec.md §4.7): a small, dedup-by-path
//! registry of loaded palette files plus the "currently selected"
//! index. Grounded on `AtlasController`'s `Palettes`/`Palette` pair
//! (`original_source/src/AtlasController.cxx`): `find()`'s
//! basename-then-`.ap`-retry lookup and the per-palette `base`
//! elevation that `setPaletteBase` adjusts both come from there. The
//! registry shape itself follows the loader's dedup-by-key `HashMap`
//! pattern (`loader::builder::NavigationDataBuilder`).

use std::path::{Path, PathBuf};

/// Sentinel index meaning "no palette selected", named after the
/// original's `NaP` constant.
pub const NAP: usize = usize::MAX;

/// One loaded `.ap` colour table. The core never parses the table's
/// contents (that's a rendering concern outside this crate); it only
/// tracks the file's identity and its `base` elevation, the one
/// per-palette value the controller adjusts directly
/// (`AtlasController::setPaletteBase`).
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    path: PathBuf,
    base: f64,
}

impl Palette {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name without its directory, used by [`PaletteManager::find`].
    pub fn basename(&self) -> Option<&str> {
        self.path.file_name()?.to_str()
    }

    /// The elevation (metres) this palette's colour bands are offset
    /// from. Defaults to `0.0` until a caller sets it explicitly.
    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn set_base(&mut self, base: f64) {
        self.base = base;
    }
}

/// Owns the list of loaded palettes and which one is current.
/// Mirrors the original's `Palettes` singleton, minus the global.
#[derive(Default)]
pub struct PaletteManager {
    palettes: Vec<Palette>,
    current: usize,
}

impl PaletteManager {
    pub fn new() -> Self {
        Self {
            palettes: Vec::new(),
            current: NAP,
        }
    }

    /// Loads `path`, returning its index. A path already present
    /// (compared as given, not canonicalised) is not re-added; its
    /// existing index is returned instead.
    pub fn load(&mut self, path: impl Into<PathBuf>) -> usize {
        let path = path.into();
        if let Some(i) = self.palettes.iter().position(|p| p.path == path) {
            return i;
        }
        self.palettes.push(Palette { path, base: 0.0 });
        self.palettes.len() - 1
    }

    /// Scans `dir` for `*.ap` files, loading each. Returns the indices
    /// assigned, in directory-read order.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> std::io::Result<Vec<usize>> {
        let mut loaded = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("ap") {
                loaded.push(self.load(path));
            }
        }
        Ok(loaded)
    }

    /// Looks up a palette by name: first an exact basename match, then
    /// a retry with `.ap` appended if the first attempt misses —
    /// `Palettes::find()`'s behaviour when callers pass a bare palette
    /// name like `"Default"` instead of `"Default.ap"`.
    pub fn find(&self, name: &str) -> Option<usize> {
        if let Some(i) = self.palettes.iter().position(|p| p.basename() == Some(name)) {
            return Some(i);
        }
        let with_suffix = format!("{name}.ap");
        self.palettes.iter().position(|p| p.basename() == Some(with_suffix.as_str()))
    }

    /// Selects the palette at `index` as current. `index` is not
    /// bounds-checked against the list beyond equality with [`NAP`];
    /// the controller compares old/new before publishing, so an
    /// out-of-range index here simply fails to change anything the
    /// controller will treat as a change.
    pub fn set_current(&mut self, index: usize) {
        self.current = index;
    }

    /// `None` when no palette is selected ([`NAP`]).
    pub fn current(&self) -> Option<usize> {
        (self.current != NAP).then_some(self.current)
    }

    pub fn palette_at(&self, index: usize) -> Option<&Palette> {
        self.palettes.get(index)
    }

    /// The currently selected palette, if any.
    pub fn current_palette(&self) -> Option<&Palette> {
        if self.current == NAP {
            return None;
        }
        self.palettes.get(self.current)
    }

    /// The currently selected palette, if any, mutably — used by
    /// `Controller::set_palette_base` to adjust its `base` in place.
    pub fn current_palette_mut(&mut self) -> Option<&mut Palette> {
        if self.current == NAP {
            return None;
        }
        self.palettes.get_mut(self.current)
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_the_same_path_twice_returns_the_same_index() {
        let mut palettes = PaletteManager::new();
        let a = palettes.load("/palettes/Default.ap");
        let b = palettes.load("/palettes/Default.ap");
        assert_eq!(a, b);
        assert_eq!(palettes.len(), 1);
    }

    #[test]
    fn no_palette_selected_by_default() {
        let palettes = PaletteManager::new();
        assert_eq!(palettes.current(), None);
    }

    #[test]
    fn set_current_selects_a_loaded_palette() {
        let mut palettes = PaletteManager::new();
        let i = palettes.load("/palettes/Default.ap");
        palettes.set_current(i);
        assert_eq!(palettes.current(), Some(i));
    }

    #[test]
    fn find_matches_exact_basename() {
        let mut palettes = PaletteManager::new();
        let i = palettes.load("/palettes/Default.ap");
        assert_eq!(palettes.find("Default.ap"), Some(i));
    }

    #[test]
    fn find_retries_with_ap_suffix_appended() {
        let mut palettes = PaletteManager::new();
        let i = palettes.load("/palettes/Default.ap");
        assert_eq!(palettes.find("Default"), Some(i));
    }

    #[test]
    fn find_returns_none_for_unknown_name() {
        let mut palettes = PaletteManager::new();
        palettes.load("/palettes/Default.ap");
        assert_eq!(palettes.find("Nonexistent"), None);
    }

    #[test]
    fn current_palette_mut_is_none_until_selected() {
        let mut palettes = PaletteManager::new();
        palettes.load("/palettes/Default.ap");
        assert!(palettes.current_palette_mut().is_none());
    }

    #[test]
    fn current_palette_mut_adjusts_base_of_selected_palette() {
        let mut palettes = PaletteManager::new();
        let i = palettes.load("/palettes/Default.ap");
        palettes.set_current(i);
        palettes.current_palette_mut().unwrap().set_base(500.0);
        assert_eq!(palettes.palette_at(i).unwrap().base(), 500.0);
    }

    #[test]
    fn load_dir_picks_up_only_ap_files() {
        let dir = std::env::temp_dir().join(format!("atlas-core-palette-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Default.ap"), "").unwrap();
        std::fs::write(dir.join("readme.txt"), "").unwrap();

        let mut palettes = PaletteManager::new();
        let loaded = palettes.load_dir(&dir).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(palettes.palette_at(loaded[0]).unwrap().basename(), Some("Default.ap"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
