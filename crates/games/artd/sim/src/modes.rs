//! Top-level AR mode selection.
//!
//! Exactly one mode is active. Leaving a mode disables what it enabled, so
//! placement and image tracking never run together.

use crate::events::ArtdEvent;
use crate::feedback::Feedback;
use crate::image_tracking::ImageTracker;
use crate::placement::PlacementController;
use crate::world::World;
use artd_types::ModeInfo;
use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArMode {
    #[default]
    Idle,
    /// Taps place cubes on tracked surfaces.
    Placement,
    /// Markers follow tracked images.
    Tracking,
}

impl ArMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ArMode::Idle => "idle",
            ArMode::Placement => "placement",
            ArMode::Tracking => "tracking",
        }
    }

    pub fn to_info(self) -> ModeInfo {
        match self {
            ArMode::Idle => ModeInfo::Idle,
            ArMode::Placement => ModeInfo::Placement,
            ArMode::Tracking => ModeInfo::Tracking,
        }
    }
}

/// Components a mode switch turns on and off.
pub struct ModeTargets<'a, F: Feedback> {
    pub placement: &'a mut PlacementController,
    pub images: &'a mut ImageTracker,
    pub world: &'a mut World,
    pub feedback: &'a mut F,
}

/// Switches from `current` to `to`. Selecting the active mode does nothing.
pub fn select<F: Feedback>(
    current: &mut ArMode,
    to: ArMode,
    targets: ModeTargets<'_, F>,
    events: &mut Vec<ArtdEvent>,
) {
    let from = *current;
    if from == to {
        return;
    }

    match from {
        ArMode::Idle => {}
        ArMode::Placement => {
            targets.placement.disable();
            targets.feedback.show_tracking_indicator(false);
        }
        ArMode::Tracking => targets.images.disable(targets.world, events),
    }

    match to {
        ArMode::Idle => {}
        ArMode::Placement => targets.placement.enable(targets.feedback),
        ArMode::Tracking => targets.images.enable(),
    }

    *current = to;
    info!(from = from.as_str(), to = to.as_str(), "mode changed");
    events.push(ArtdEvent::ModeChanged { from, to });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArtdConfig, MARKER_POOL_TAG};
    use crate::feedback::FeedbackLog;
    use crate::placement::MSG_PLACEMENT_ENABLED;
    use crate::scene::Scene;
    use crate::tracking::{ScriptedTracking, Tracking};

    struct Parts {
        mode: ArMode,
        placement: PlacementController,
        images: ImageTracker,
        world: World,
        feedback: FeedbackLog,
        events: Vec<ArtdEvent>,
    }

    impl Parts {
        fn new() -> Self {
            let config = ArtdConfig::default();
            Self {
                mode: ArMode::Idle,
                placement: PlacementController::new(&config),
                images: ImageTracker::new(),
                world: World::new(&config),
                feedback: FeedbackLog::new(),
                events: Vec::new(),
            }
        }

        fn select(&mut self, to: ArMode) {
            select(
                &mut self.mode,
                to,
                ModeTargets {
                    placement: &mut self.placement,
                    images: &mut self.images,
                    world: &mut self.world,
                    feedback: &mut self.feedback,
                },
                &mut self.events,
            );
        }
    }

    #[test]
    fn placement_and_tracking_are_exclusive() {
        let mut parts = Parts::new();
        parts.select(ArMode::Placement);
        assert!(parts.placement.is_enabled());
        assert_eq!(parts.feedback.count(MSG_PLACEMENT_ENABLED), 1);

        parts.select(ArMode::Tracking);
        assert!(!parts.placement.is_enabled());
        assert!(parts.images.is_enabled());
        assert_eq!(
            parts.events,
            vec![
                ArtdEvent::ModeChanged {
                    from: ArMode::Idle,
                    to: ArMode::Placement
                },
                ArtdEvent::ModeChanged {
                    from: ArMode::Placement,
                    to: ArMode::Tracking
                },
            ]
        );
    }

    #[test]
    fn reselecting_is_a_no_op() {
        let mut parts = Parts::new();
        parts.select(ArMode::Placement);
        parts.select(ArMode::Placement);
        assert_eq!(parts.events.len(), 1);
        assert_eq!(parts.feedback.count(MSG_PLACEMENT_ENABLED), 1);
    }

    #[test]
    fn idle_releases_markers() {
        let mut parts = Parts::new();
        parts.select(ArMode::Tracking);
        let mut tracking = ScriptedTracking::new(Scene::images(), None);
        tracking.update(130);
        parts
            .images
            .update(&tracking, &mut parts.world, &mut parts.events);
        assert_eq!(parts.world.markers.active_count(MARKER_POOL_TAG), 2);

        parts.select(ArMode::Idle);
        assert!(!parts.images.is_enabled());
        assert_eq!(parts.world.markers.active_count(MARKER_POOL_TAG), 0);
        assert_eq!(parts.mode.to_info(), ModeInfo::Idle);
    }
}
