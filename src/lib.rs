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

//! Geospatial data backbone for the Atlas FlightGear map browser.
//!
//! `atlas-core` loads FlightGear's navaid, fix, airway and airport
//! databases into a spatial index and an incremental searcher, tracks
//! one or more flight-data feeds (file, UDP or serial), drives the
//! scenery-tile sync/mapping worker, and manages the `.ap` colour
//! palettes used to render a map — all coordinated by a single
//! [`controller::Controller`] that publishes typed change
//! notifications. It has no rendering, windowing or navigation-
//! guidance code of its own; those remain the embedding application's
//! concern.

pub mod airport;
pub mod airway;
pub mod config;
pub mod controller;
pub mod culler;
pub mod error;
pub mod geodesy;
pub mod loader;
pub mod measurements;
pub mod palette;
pub mod searcher;
pub mod tile;
pub mod track;
pub mod waypoint;

pub use config::Config;
pub use controller::Controller;
pub use error::Error;
