//! Platform abstraction layer
//!
//! Converts browser-shaped input into animator input:
//! - requestAnimationFrame timestamps to (dt, seconds)
//! - client pixel coordinates to normalized device coordinates
//! - document scroll position to [`ScrollState`]
//!
//! Nothing here touches `web_sys`, so it is exercised by native tests.

use glam::Vec2;

use crate::anim::ScrollState;

/// Largest dt reported for one frame (tab switches, debugger pauses)
pub const MAX_FRAME_DT: f32 = 0.1;

/// Turns monotonic millisecond timestamps into frame timing
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    start_ms: Option<f64>,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(dt, seconds since first tick)`. The first finite tick has
    /// dt 0 and starts the clock; non-finite timestamps before it are ignored.
    /// Timestamps that go backwards yield dt 0 and keep the previous clock.
    pub fn tick(&mut self, now_ms: f64) -> (f32, f32) {
        let (Some(start), Some(last)) = (self.start_ms, self.last_ms) else {
            if now_ms.is_finite() {
                self.start_ms = Some(now_ms);
                self.last_ms = Some(now_ms);
            }
            return (0.0, 0.0);
        };
        let now = if now_ms.is_finite() { now_ms.max(last) } else { last };
        self.last_ms = Some(now);

        let dt = (((now - last) / 1000.0) as f32).min(MAX_FRAME_DT);
        let seconds = ((now - start) / 1000.0) as f32;
        (dt, seconds)
    }
}

/// Client-space pixel position to NDC (+Y up)
pub fn client_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    let nx = (x / width) * 2.0 - 1.0;
    let ny = -((y / height) * 2.0 - 1.0);
    Vec2::new(nx.clamp(-1.0, 1.0), ny.clamp(-1.0, 1.0))
}

/// Tracks document scroll and derives offset velocity
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    last_offset: Option<f32>,
    velocity: f32,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `scroll_top` over the scrollable range `content_height - viewport_height`
    pub fn update(
        &mut self,
        scroll_top: f32,
        content_height: f32,
        viewport_height: f32,
        dt: f32,
    ) -> ScrollState {
        let range = content_height - viewport_height;
        let offset = if range > 0.0 {
            (scroll_top / range).clamp(0.0, 1.0)
        } else {
            0.0
        };

        if let Some(last) = self.last_offset {
            if dt > 0.0 {
                self.velocity = (offset - last) / dt;
            }
        }
        self.last_offset = Some(offset);

        ScrollState::new(offset, self.velocity).sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_first_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1234.0), (0.0, 0.0));
        let (dt, secs) = clock.tick(1250.0);
        assert!((dt - 0.016).abs() < 1e-6);
        assert!((secs - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_frame_clock_caps_dt_but_not_clock() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        let (dt, secs) = clock.tick(5000.0);
        assert_eq!(dt, MAX_FRAME_DT);
        assert_eq!(secs, 5.0);
    }

    #[test]
    fn test_frame_clock_never_goes_backwards() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        clock.tick(1000.0);
        let (dt, secs) = clock.tick(500.0);
        assert_eq!(dt, 0.0);
        assert_eq!(secs, 1.0);
        let (dt, _) = clock.tick(f64::NAN);
        assert_eq!(dt, 0.0);
    }

    #[test]
    fn test_frame_clock_ignores_non_finite_first_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(f64::NAN), (0.0, 0.0));
        assert_eq!(clock.tick(f64::INFINITY), (0.0, 0.0));
        assert_eq!(clock.tick(1000.0), (0.0, 0.0));
        let (dt, secs) = clock.tick(1016.0);
        assert!((dt - 0.016).abs() < 1e-6);
        assert!((secs - 0.016).abs() < 1e-6);
        assert!(secs.is_finite());
    }

    #[test]
    fn test_client_to_ndc_corners() {
        assert_eq!(client_to_ndc(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
        assert_eq!(client_to_ndc(800.0, 600.0, 800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(client_to_ndc(400.0, 300.0, 800.0, 600.0), Vec2::ZERO);
        assert_eq!(client_to_ndc(10.0, 10.0, 0.0, 600.0), Vec2::ZERO);
    }

    #[test]
    fn test_scroll_offset_and_velocity() {
        let mut tracker = ScrollTracker::new();
        let s = tracker.update(0.0, 3000.0, 1000.0, 0.0);
        assert_eq!(s, ScrollState::new(0.0, 0.0));

        let s = tracker.update(500.0, 3000.0, 1000.0, 0.5);
        assert_eq!(s.offset, 0.25);
        assert_eq!(s.velocity, 0.5);

        // dt 0 keeps the previous velocity
        let s = tracker.update(500.0, 3000.0, 1000.0, 0.0);
        assert_eq!(s.velocity, 0.5);
    }

    #[test]
    fn test_scroll_unscrollable_page() {
        let mut tracker = ScrollTracker::new();
        assert_eq!(tracker.update(100.0, 800.0, 1000.0, 0.016).offset, 0.0);
    }
}
