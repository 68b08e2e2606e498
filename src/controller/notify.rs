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

//! The typed event vocabulary `AtlasController` publishes
//! (`original_source/src/AtlasController.cxx`'s `Notification::notify`
//! calls, spec.md §2 item 8) and the synchronous publish/subscribe
//! registry that delivers them. No pack example owns a pub/sub bus
//! outright, so the registry shape is written from spec.md §4.8/§5's
//! description: subscribers register one callback per event kind;
//! publishing invokes every callback registered for that kind, in
//! registration order, on the caller's own thread; a callback that
//! itself publishes is delivered depth-first before the outer publish
//! resumes.

use std::collections::HashMap;

/// Every kind of change the controller can announce. Not every variant
/// has a publishing call site in this crate yet — `Moved`, `Zoomed` and
/// `NewPalette` belong to map-view and palette-reload actions that live
/// outside `atlas-core`'s scope (see DESIGN.md) — but the full closed
/// set is defined here since consumers subscribe against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notification {
    AircraftMoved,
    NewFlightTrack,
    Palette,
    NewPalette,
    DiscreteContours,
    ContourLines,
    LightingOn,
    SmoothShading,
    Azimuth,
    Elevation,
    Moved,
    Zoomed,
    MagTrue,
    DegMinSec,
    MEFs,
    ShowTrackInfo,
    FlightTrackList,
    FlightTrackModified,
    SceneryChanged,
    PaletteList,
    Oversampling,
    ImageType,
    JPEGQuality,
}

type Callback = Box<dyn FnMut(&mut NotificationBus, Notification)>;

/// A per-kind callback registry. Subscribers receive the bus itself so
/// they can publish further notifications from within their callback.
#[derive(Default)]
pub struct NotificationBus {
    subscribers: HashMap<Notification, Vec<Callback>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to run every time `kind` is published.
    pub fn subscribe(&mut self, kind: Notification, callback: impl FnMut(&mut NotificationBus, Notification) + 'static) {
        self.subscribers.entry(kind).or_default().push(Box::new(callback));
    }

    /// Invokes every subscriber registered for `kind`, in registration
    /// order. The kind's callback list is removed from `self` for the
    /// duration of delivery, so a callback is free to call `publish`
    /// again (including for the same kind) without this recursing into
    /// a borrow of the list it's already iterating; any subscription
    /// added mid-delivery is appended once delivery for this call
    /// finishes.
    pub fn publish(&mut self, kind: Notification) {
        let Some(mut callbacks) = self.subscribers.remove(&kind) else {
            return;
        };
        for callback in callbacks.iter_mut() {
            callback(self, kind);
        }
        if let Some(added_during_delivery) = self.subscribers.remove(&kind) {
            callbacks.extend(added_during_delivery);
        }
        self.subscribers.insert(kind, callbacks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscriber_is_invoked_on_matching_publish() {
        let mut bus = NotificationBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        bus.subscribe(Notification::Azimuth, move |_, kind| seen_clone.borrow_mut().push(kind));

        bus.publish(Notification::Azimuth);
        assert_eq!(*seen.borrow(), vec![Notification::Azimuth]);
    }

    #[test]
    fn subscriber_is_not_invoked_for_a_different_kind() {
        let mut bus = NotificationBus::new();
        let seen = Rc::new(RefCell::new(0));
        let seen_clone = seen.clone();
        bus.subscribe(Notification::Azimuth, move |_, _| *seen_clone.borrow_mut() += 1);

        bus.publish(Notification::Elevation);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn nested_publish_runs_depth_first() {
        let mut bus = NotificationBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let order_outer = order.clone();
        bus.subscribe(Notification::FlightTrackList, move |bus, _| {
            order_outer.borrow_mut().push("outer-start");
            bus.publish(Notification::FlightTrackModified);
            order_outer.borrow_mut().push("outer-end");
        });
        let order_inner = order.clone();
        bus.subscribe(Notification::FlightTrackModified, move |_, _| {
            order_inner.borrow_mut().push("inner");
        });

        bus.publish(Notification::FlightTrackList);
        assert_eq!(*order.borrow(), vec!["outer-start", "inner", "outer-end"]);
    }

    #[test]
    fn multiple_subscribers_to_the_same_kind_all_run() {
        let mut bus = NotificationBus::new();
        let count = Rc::new(RefCell::new(0));
        for _ in 0..3 {
            let count = count.clone();
            bus.subscribe(Notification::SceneryChanged, move |_, _| *count.borrow_mut() += 1);
        }
        bus.publish(Notification::SceneryChanged);
        assert_eq!(*count.borrow(), 3);
    }
}
