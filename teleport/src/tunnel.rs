use std::time::Duration;

use crate::transition::NavigationEvent;

/// Vignette that closes in while the rig moves and opens again on arrival,
/// driven purely by navigation events.
#[derive(Clone, Debug)]
pub struct TunnelEffect {
    amount: f32,
    target: f32,
    fade: Duration,
}

impl TunnelEffect {
    pub fn new(fade: Duration) -> Self {
        Self {
            amount: 0.0,
            target: 0.0,
            fade,
        }
    }

    pub fn handle(&mut self, event: &NavigationEvent) {
        self.target = match event {
            NavigationEvent::Start { .. } => 1.0,
            NavigationEvent::End { .. } => 0.0,
        };
    }

    pub fn tick(&mut self, delta: Duration) {
        if self.fade.is_zero() {
            self.amount = self.target;
            return;
        }
        let step = delta.as_secs_f32() / self.fade.as_secs_f32();
        self.amount = if self.target > self.amount {
            (self.amount + step).min(self.target)
        } else {
            (self.amount - step).max(self.target)
        };
    }

    /// 0 is fully open, 1 fully closed.
    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn is_visible(&self) -> bool {
        self.amount > 0.0
    }
}

impl Default for TunnelEffect {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;
    use engine::scene::Pose;

    #[test]
    fn test_closes_on_start_and_opens_on_end() {
        let pose = Pose::at(Vector3::new(0.0, 0.0, 0.0));
        let mut tunnel = TunnelEffect::new(Duration::from_millis(200));

        tunnel.handle(&NavigationEvent::Start { from: pose, to: pose });
        tunnel.tick(Duration::from_millis(100));
        assert!((tunnel.amount() - 0.5).abs() < 1e-5);
        tunnel.tick(Duration::from_millis(500));
        assert_eq!(tunnel.amount(), 1.0);

        tunnel.handle(&NavigationEvent::End { pose });
        tunnel.tick(Duration::from_millis(200));
        assert_eq!(tunnel.amount(), 0.0);
        assert!(!tunnel.is_visible());
    }

    #[test]
    fn test_zero_fade_snaps() {
        let pose = Pose::at(Vector3::new(0.0, 0.0, 0.0));
        let mut tunnel = TunnelEffect::new(Duration::ZERO);
        tunnel.handle(&NavigationEvent::Start { from: pose, to: pose });
        tunnel.tick(Duration::from_millis(1));
        assert_eq!(tunnel.amount(), 1.0);
    }
}
