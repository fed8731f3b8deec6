use crate::config::MARKER_POOL_TAG;
use crate::events::ArtdEvent;
use crate::tracking::{TrackableId, Tracking, TrackingState};
use crate::world::{MarkerId, World};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Keeps one pooled marker on every image that is currently tracked.
#[derive(Clone, Debug, Default)]
pub struct ImageTracker {
    enabled: bool,
    markers: BTreeMap<TrackableId, MarkerId>,
}

impl ImageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stops tracking and returns every marker to its pool.
    pub fn disable(&mut self, world: &mut World, events: &mut Vec<ArtdEvent>) {
        self.enabled = false;
        for trackable in self.markers.keys().copied().collect::<Vec<_>>() {
            self.release(trackable, world, events);
        }
    }

    /// Forgets markers without touching the pool, for when the world itself
    /// was reset.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn marker(&self, trackable: TrackableId) -> Option<MarkerId> {
        self.markers.get(&trackable).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Spawns a marker for each newly tracked image, moves existing ones, and
    /// releases markers whose image went limited or disappeared.
    pub fn update<T: Tracking>(&mut self, tracking: &T, world: &mut World, events: &mut Vec<ArtdEvent>) {
        if !self.enabled {
            return;
        }

        for image in tracking.images() {
            if image.state != TrackingState::Tracking {
                if self.markers.contains_key(&image.id) {
                    self.release(image.id, world, events);
                }
                continue;
            }

            match self.markers.get(&image.id) {
                Some(&id) => {
                    if let Some(slot) = world.markers.slot_mut(id) {
                        slot.pose = image.pose;
                    }
                }
                None => {
                    let Some(id) = world.markers.acquire(MARKER_POOL_TAG, image.pose) else {
                        warn!(image = %image.name, "no marker available");
                        continue;
                    };
                    if let Some(marker) = world.markers.get_mut(id) {
                        marker.trackable = Some(image.id);
                        marker.image = image.name.clone();
                    }
                    debug!(image = %image.name, "marker spawned");
                    self.markers.insert(image.id, id);
                    events.push(ArtdEvent::MarkerSpawned {
                        id,
                        trackable: image.id,
                    });
                }
            }
        }

        let vanished: Vec<TrackableId> = self
            .markers
            .keys()
            .copied()
            .filter(|t| !tracking.images().iter().any(|img| img.id == *t))
            .collect();
        for trackable in vanished {
            self.release(trackable, world, events);
        }
    }

    fn release(&mut self, trackable: TrackableId, world: &mut World, events: &mut Vec<ArtdEvent>) {
        let Some(id) = self.markers.remove(&trackable) else {
            return;
        };
        if let Err(err) = world.markers.release(MARKER_POOL_TAG, id) {
            warn!(%err, "marker release failed");
        }
        events.push(ArtdEvent::MarkerReleased { id, trackable });
    }
}
