use std::time::Duration;

use cgmath::Vector2;

use crate::hit_resolver::LandingResolution;
use crate::input::Handedness;

/// Where a hover ray came from. A cached result is only reused for the same source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HoverSource {
    /// Pointer position in viewport pixels.
    Pointer(Vector2<f32>),
    Reticle,
    Hand(Handedness),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverSample {
    pub source: HoverSource,
    pub computed_at: Duration,
    pub landing: LandingResolution,
}

/// Last hover hit test plus when it was taken.
///
/// A sample is fresh for one `interval` after it was computed, so anything
/// reading it sees a result at most one throttle window (about a frame) old.
#[derive(Clone, Debug)]
pub struct HoverCache {
    interval: Duration,
    sample: Option<HoverSample>,
}

impl HoverCache {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            sample: None,
        }
    }

    /// True when a new hover raycast may run.
    pub fn is_due(&self, now: Duration) -> bool {
        match &self.sample {
            Some(sample) => now.saturating_sub(sample.computed_at) >= self.interval,
            None => true,
        }
    }

    pub fn store(&mut self, sample: HoverSample) {
        self.sample = Some(sample);
    }

    /// The cached sample if it was taken for `source` within the staleness bound.
    pub fn fresh(&self, now: Duration, source: HoverSource) -> Option<&HoverSample> {
        self.sample.as_ref().filter(|sample| {
            sample.source == source && now.saturating_sub(sample.computed_at) < self.interval
        })
    }

    pub fn latest(&self) -> Option<&HoverSample> {
        self.sample.as_ref()
    }

    pub fn clear(&mut self) {
        self.sample = None;
    }
}
