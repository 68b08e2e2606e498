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

//! Case-insensitive, incremental search across every indexed entity.
//!
//! Grounded on the original `Searcher`/`Searchable` pair: a
//! case-folding token multimap plus a distance-sorted result set that
//! resumes scanning across calls instead of redoing the whole query
//! each time a user interface asks for "a few more matches".

use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use crate::geodesy::Vec3;
use crate::waypoint::Searchable;

/// Splits `query` on whitespace, case-folding every token. Tokens made
/// up purely of whitespace vanish under `split_whitespace` and so
/// never produce a match, matching the tokenizer's intent.
fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Holds every searchable entity and a case-folded token index over
/// them, plus the state needed to resume an in-progress query.
pub struct Searcher {
    entities: Vec<Rc<dyn Searchable>>,
    token_index: BTreeMap<String, Vec<usize>>,

    last_query: Option<String>,
    complete_tokens: Vec<String>,
    incomplete_token: Option<String>,
    centre: Vec3,

    candidate_queue: Vec<usize>,
    cursor: usize,
    matches: Vec<usize>,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            token_index: BTreeMap::new(),
            last_query: None,
            complete_tokens: Vec::new(),
            incomplete_token: None,
            centre: Vec3::default(),
            candidate_queue: Vec::new(),
            cursor: 0,
            matches: Vec::new(),
        }
    }

    /// Indexes `entity` under every token it reports.
    pub fn add(&mut self, entity: Rc<dyn Searchable>) {
        let idx = self.entities.len();
        for token in entity.tokens() {
            self.token_index.entry(token.to_lowercase()).or_default().push(idx);
        }
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Runs (or resumes) a search for `query`, returning whether the
    /// match set changed as a result of this call.
    ///
    /// If `query` is the same string as the previous call, scanning
    /// resumes from the saved cursor; at most `max` new matches are
    /// added (unbounded if `None`). If only `centre` changed, the
    /// existing match set is re-sorted without rescanning the index.
    pub fn find_matches(&mut self, query: &str, centre: Vec3, max: Option<usize>) -> bool {
        let before = self.matches.clone();
        let query_changed = self.last_query.as_deref() != Some(query);

        if query_changed {
            self.last_query = Some(query.to_string());
            self.centre = centre;
            self.matches.clear();
            self.cursor = 0;

            let tokens = tokenize(query);
            let ends_with_ws = query.is_empty() || query.ends_with(char::is_whitespace);
            if ends_with_ws {
                self.complete_tokens = tokens;
                self.incomplete_token = None;
            } else {
                let mut tokens = tokens;
                self.incomplete_token = tokens.pop();
                self.complete_tokens = tokens;
            }

            self.candidate_queue = self.seed_candidates();
            self.scan_more(max);
        } else if centre != self.centre {
            self.centre = centre;
            self.resort_matches();
        } else {
            self.scan_more(max);
        }

        self.matches != before
    }

    /// The current match set, nearest-first.
    pub fn matches(&self) -> impl Iterator<Item = &Rc<dyn Searchable>> {
        self.matches.iter().map(move |&i| &self.entities[i])
    }

    fn seed_candidates(&self) -> Vec<usize> {
        let Some(seed) = self.complete_tokens.last().cloned().or_else(|| self.incomplete_token.clone()) else {
            return Vec::new();
        };
        let seed_is_complete = !self.complete_tokens.is_empty();

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        if seed_is_complete {
            if let Some(idxs) = self.token_index.get(&seed) {
                for &i in idxs {
                    if seen.insert(i) {
                        out.push(i);
                    }
                }
            }
        } else {
            for (key, idxs) in self.token_index.range(seed.clone()..) {
                if !key.starts_with(seed.as_str()) {
                    break;
                }
                for &i in idxs {
                    if seen.insert(i) {
                        out.push(i);
                    }
                }
            }
        }
        out
    }

    fn full_match(&self, idx: usize) -> bool {
        let tokens: Vec<String> = self.entities[idx].tokens().iter().map(|t| t.to_lowercase()).collect();
        let complete_ok = self.complete_tokens.iter().all(|ct| tokens.iter().any(|t| t == ct));
        let incomplete_ok = match &self.incomplete_token {
            Some(it) => tokens.iter().any(|t| t.starts_with(it.as_str())),
            None => true,
        };
        complete_ok && incomplete_ok
    }

    fn scan_more(&mut self, max: Option<usize>) -> bool {
        let limit = max.unwrap_or(usize::MAX);
        let mut added = 0;
        while added < limit && self.cursor < self.candidate_queue.len() {
            let idx = self.candidate_queue[self.cursor];
            self.cursor += 1;
            if self.matches.contains(&idx) {
                continue;
            }
            if self.full_match(idx) {
                self.insert_sorted(idx);
                added += 1;
            }
        }
        added > 0
    }

    fn insert_sorted(&mut self, idx: usize) {
        let d = self.entities[idx].distance_squared(self.centre);
        let pos = self
            .matches
            .partition_point(|&m| self.entities[m].distance_squared(self.centre) <= d);
        self.matches.insert(pos, idx);
    }

    fn resort_matches(&mut self) {
        let centre = self.centre;
        self.matches
            .sort_by(|&a, &b| {
                self.entities[a]
                    .distance_squared(centre)
                    .partial_cmp(&self.entities[b].distance_squared(centre))
                    .unwrap()
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::LatLon;
    use crate::waypoint::{Fix, Waypoint};

    fn fix(id: &str, lat: f64, lon: f64) -> Rc<dyn Searchable> {
        Rc::new(Waypoint::Fix(Fix::new(id, LatLon::new(lat, lon))))
    }

    fn vor(id: &str, name: &str, lat: f64, lon: f64) -> Rc<dyn Searchable> {
        use crate::waypoint::Vor;
        Rc::new(Waypoint::Vor(Vor::new(id, name, LatLon::new(lat, lon), 0.0, 115_000, 100_000.0, 0.0)))
    }

    #[test]
    fn exact_id_match_finds_single_entity() {
        let mut searcher = Searcher::new();
        searcher.add(vor("SFO", "SAN FRANCISCO VOR", 37.6, -122.4));
        searcher.add(fix("FOO", 40.0, -120.0));

        let changed = searcher.find_matches("sfo", Vec3::default(), None);
        assert!(changed);
        let found: Vec<_> = searcher.matches().map(|m| m.as_string()).collect();
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("VOR: SFO SAN FRANCISCO VOR"));
    }

    #[test]
    fn prefix_match_on_incomplete_token() {
        let mut searcher = Searcher::new();
        searcher.add(vor("SFO", "SAN FRANCISCO VOR", 37.6, -122.4));
        searcher.add(vor("SBA", "SANTA BARBARA VOR", 34.4, -119.8));

        searcher.find_matches("san", Vec3::default(), None);
        assert_eq!(searcher.matches().count(), 2);
    }

    #[test]
    fn results_sorted_by_distance_to_centre() {
        let mut searcher = Searcher::new();
        searcher.add(vor("FAR", "FAR VOR", 10.0, 10.0));
        searcher.add(vor("NEAR", "NEAR VOR", 0.1, 0.1));

        let centre = LatLon::new(0.0, 0.0).to_cart(0.0);
        searcher.find_matches("vor", centre, None);
        let ids: Vec<&str> = searcher.matches().map(|m| m.as_string()).collect();
        assert!(ids[0].contains("NEAR"));
        assert!(ids[1].contains("FAR"));
    }

    #[test]
    fn incremental_scan_accumulates_up_to_max() {
        let mut searcher = Searcher::new();
        for i in 0..5 {
            searcher.add(vor(&format!("CA{i}"), "CALIFORNIA STATION", 0.0, 0.0));
        }

        let centre = Vec3::default();
        searcher.find_matches("california", centre, Some(2));
        assert_eq!(searcher.matches().count(), 2);

        searcher.find_matches("california", centre, Some(2));
        assert_eq!(searcher.matches().count(), 4);

        searcher.find_matches("california", centre, Some(2));
        assert_eq!(searcher.matches().count(), 5);
    }

    #[test]
    fn centre_change_resorts_without_rescanning() {
        let mut searcher = Searcher::new();
        searcher.add(vor("A", "ALPHA VOR", 0.0, 0.0));
        searcher.add(vor("B", "BRAVO VOR", 10.0, 10.0));

        searcher.find_matches("vor", Vec3::default(), None);
        assert_eq!(searcher.matches().count(), 2);

        let far_centre = LatLon::new(10.0, 10.0).to_cart(0.0);
        let changed = searcher.find_matches("vor", far_centre, None);
        assert!(changed);
        let ids: Vec<&str> = searcher.matches().map(|m| m.as_string()).collect();
        assert!(ids[0].contains('B'));
    }

    #[test]
    fn trailing_space_makes_token_complete_and_narrows_results() {
        let mut searcher = Searcher::new();
        searcher.add(vor("CAL", "CALIFORNIA VOR", 0.0, 0.0));
        searcher.add(vor("CALX", "CALX STATION", 0.0, 0.0));

        searcher.find_matches("cal", Vec3::default(), None);
        let broad = searcher.matches().count();

        searcher.find_matches("cal ", Vec3::default(), None);
        let narrow = searcher.matches().count();

        assert!(narrow < broad);
    }

    #[test]
    fn whitespace_only_query_yields_no_matches() {
        let mut searcher = Searcher::new();
        searcher.add(vor("SFO", "SAN FRANCISCO VOR", 37.6, -122.4));

        searcher.find_matches("   ", Vec3::default(), None);
        assert_eq!(searcher.matches().count(), 0);
    }
}
