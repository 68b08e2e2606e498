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

//! Rendering-policy state the controller owns on behalf of the map
//! renderer (spec.md §2 item 9): display units, lighting, oversampling
//! and the other toggles `AtlasController`'s setters guard. Grouped
//! into their own struct so [`Controller`](super::Controller) stays a
//! coordinator rather than a flat bag of fields; defaults mirror the
//! ones `AtlasController`'s constructor applies before reading any
//! preferences (`original_source/src/AtlasController.cxx`, lines
//! 273-276: `setShowTrackInfo(true); setDegMinSec(true);
//! setMagTrue(true); setMEFs(true);`).

/// Output format for a generated map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Jpeg,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControllerFlags {
    pub discrete_contours: bool,
    pub contour_lines: bool,
    pub lighting_on: bool,
    pub smooth_shading: bool,
    pub azimuth: f64,
    pub elevation: f64,
    pub oversampling: u32,
    pub image_type: ImageType,
    pub jpeg_quality: u32,
    pub deg_min_sec: bool,
    pub mag_true: bool,
    pub mefs: bool,
    pub show_track_info: bool,
}

impl Default for ControllerFlags {
    fn default() -> Self {
        Self {
            discrete_contours: false,
            contour_lines: false,
            lighting_on: false,
            smooth_shading: false,
            azimuth: 0.0,
            elevation: 0.0,
            oversampling: 1,
            image_type: ImageType::Png,
            jpeg_quality: 75,
            deg_min_sec: true,
            mag_true: true,
            mefs: true,
            show_track_info: true,
        }
    }
}
