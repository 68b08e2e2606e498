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

//! Co-located navaid groupings: VOR-DME, VORTAC, NDB-DME and full ILS
//! approach systems.
//!
//! The loader assembles these after all individual stations are parsed
//! (spec.md §4.2, "DME merge"); nothing here parses a database file
//! itself. [`NavaidSystemRegistry`] answers "which system, if any, owns
//! this navaid id" without requiring a back-pointer on every component,
//! which would make the component structs self-referential.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Dme, Gs, Loc, Marker, Ndb, Tacan, Vor};

/// A co-located group of transmitting navaids that share a single
/// ground installation.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NavaidSystem {
    VorDme(Vor, Dme),
    Vortac(Vor, Tacan),
    NdbDme(Ndb, Dme),
    Ils {
        loc: Loc,
        gs: Option<Gs>,
        dme: Option<Dme>,
        markers: Vec<Marker>,
    },
}

impl NavaidSystem {
    /// The ids of every component navaid belonging to this system.
    pub fn component_ids(&self) -> Vec<String> {
        match self {
            Self::VorDme(vor, dme) => vec![vor.common.id.clone(), dme.common.id.clone()],
            Self::Vortac(vor, tacan) => vec![vor.common.id.clone(), tacan.common.id.clone()],
            Self::NdbDme(ndb, dme) => vec![ndb.common.id.clone(), dme.common.id.clone()],
            Self::Ils {
                loc,
                gs,
                dme,
                markers,
            } => {
                let mut ids = vec![loc.common.id.clone()];
                ids.extend(gs.iter().map(|g| g.common.id.clone()));
                ids.extend(dme.iter().map(|d| d.common.id.clone()));
                ids.extend(markers.iter().map(|m| m.common.id.clone()));
                ids
            }
        }
    }

    pub fn kind(&self) -> NavaidSystemKind {
        match self {
            Self::VorDme(..) => NavaidSystemKind::VorDme,
            Self::Vortac(..) => NavaidSystemKind::Vortac,
            Self::NdbDme(..) => NavaidSystemKind::NdbDme,
            Self::Ils { .. } => NavaidSystemKind::Ils,
        }
    }
}

/// Tag for a [`NavaidSystem`] without its data, for quick filtering.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NavaidSystemKind {
    VorDme,
    Vortac,
    NdbDme,
    Ils,
}

/// Maps a component navaid's id to the index of the [`NavaidSystem`] that
/// owns it, within a parallel `Vec<NavaidSystem>` the caller keeps.
///
/// The relation is kept unidirectional: systems own a `Vec` of their
/// components by value, and this index is built from them afterwards,
/// rather than components holding a reference back to their system (see
/// spec.md §9, "Cyclic parent/child in navaid systems").
#[derive(Clone, Debug, Default)]
pub struct NavaidSystemRegistry {
    owner_of: HashMap<String, usize>,
}

impl NavaidSystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `systems` by component id, replacing any previous index.
    pub fn rebuild(&mut self, systems: &[NavaidSystem]) {
        self.owner_of.clear();
        for (idx, system) in systems.iter().enumerate() {
            for id in system.component_ids() {
                self.owner_of.insert(id, idx);
            }
        }
    }

    /// The index into the caller's system list that owns `navaid_id`, if any.
    pub fn owner(&self, navaid_id: &str) -> Option<usize> {
        self.owner_of.get(navaid_id).copied()
    }

    pub fn len(&self) -> usize {
        self.owner_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner_of.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::LatLon;

    fn vor() -> Vor {
        Vor::new("SFO", "SAN FRANCISCO VOR", LatLon::new(37.6, -122.4), 130.0, 115_800, 130_000.0, 17.0)
    }

    fn dme() -> Dme {
        Dme::new("SFO", "SAN FRANCISCO VOR", LatLon::new(37.6, -122.4), 130.0, 111_000, 130_000.0, 0.0)
    }

    #[test]
    fn registry_finds_owner_of_either_component() {
        let systems = vec![NavaidSystem::VorDme(vor(), dme())];
        let mut registry = NavaidSystemRegistry::new();
        registry.rebuild(&systems);
        assert_eq!(registry.owner("SFO"), Some(0));
    }

    #[test]
    fn registry_has_no_owner_for_unknown_id() {
        let systems = vec![NavaidSystem::VorDme(vor(), dme())];
        let mut registry = NavaidSystemRegistry::new();
        registry.rebuild(&systems);
        assert_eq!(registry.owner("ZZZ"), None);
    }

    #[test]
    fn ils_component_ids_include_present_markers() {
        let loc = Loc::new("ILOC", "LOC", LatLon::new(0.0, 0.0), 0.0, 110_300, 30_000.0, 270.0);
        let marker = Marker::new(
            "IOM",
            "OUTER MARKER",
            LatLon::new(0.0, 0.0),
            270.0,
            super::super::MarkerKind::Outer,
            1_000.0,
        );
        let system = NavaidSystem::Ils {
            loc,
            gs: None,
            dme: None,
            markers: vec![marker],
        };
        assert_eq!(system.component_ids(), vec!["ILOC".to_string(), "IOM".to_string()]);
    }
}
