#![forbid(unsafe_code)]

//! Scroll position and location hash of the hosting page.
//!
//! The viewport is sampled, not driven: [`Viewport::start_scroll`] records a
//! target and duration, and every [`Ui::tick`](crate::Ui::tick) writes the
//! eased position for the current logical time. Setting the position directly
//! cancels any running animation.

use web_time::{Duration, Instant};

/// Easing curves for scroll animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Quadratic S-curve (`easeInOutQuad`).
    #[default]
    EaseInOutQuad,
}

impl Easing {
    /// Map linear progress `t` (clamped to `0.0..=1.0`) to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv / 2.0
                }
            }
        }
    }
}

/// A scroll in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    pub from: i32,
    pub to: i32,
    pub start: Instant,
    pub duration: Duration,
    pub easing: Easing,
}

impl ScrollAnimation {
    /// Position at `now`, and whether the animation has finished.
    pub fn sample(&self, now: Instant) -> (i32, bool) {
        if self.duration.is_zero() {
            return (self.to, true);
        }
        let elapsed = now.saturating_duration_since(self.start);
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        if t >= 1.0 {
            return (self.to, true);
        }
        let eased = self.easing.apply(t);
        let delta = f64::from(self.to - self.from);
        (self.from + (delta * eased).round() as i32, false)
    }
}

#[derive(Debug, Default, Clone)]
pub struct Viewport {
    scroll_top: i32,
    hash: Option<String>,
    animation: Option<ScrollAnimation>,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn scroll_top(&self) -> i32 {
        self.scroll_top
    }

    /// Jump to `top`, cancelling any running scroll.
    pub fn set_scroll_top(&mut self, top: i32) {
        self.animation = None;
        self.scroll_top = top.max(0);
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn set_hash(&mut self, hash: impl Into<String>) {
        self.hash = Some(hash.into());
    }

    pub fn is_scrolling(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation(&self) -> Option<&ScrollAnimation> {
        self.animation.as_ref()
    }

    /// Begin scrolling from the current position to `to`.
    pub fn start_scroll(&mut self, now: Instant, to: i32, duration: Duration, easing: Easing) {
        let to = to.max(0);
        self.animation = Some(ScrollAnimation {
            from: self.scroll_top,
            to,
            start: now,
            duration,
            easing,
        });
        self.sample(now);
    }

    /// Update the position for `now`. Returns `true` while still scrolling.
    pub fn sample(&mut self, now: Instant) -> bool {
        let Some(anim) = self.animation else {
            return false;
        };
        let (pos, done) = anim.sample(now);
        self.scroll_top = pos;
        if done {
            self.animation = None;
        }
        !done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_in_out_quad_is_symmetric() {
        let e = Easing::EaseInOutQuad;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert!((e.apply(0.5) - 0.5).abs() < 1e-9);
        assert!(e.apply(0.25) < 0.25);
        assert!(e.apply(0.75) > 0.75);
        assert!((e.apply(0.25) + e.apply(0.75) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scroll_reaches_target_at_duration() {
        let t0 = Instant::now();
        let mut vp = Viewport::new();
        vp.start_scroll(t0, 400, Duration::from_millis(100), Easing::Linear);
        assert!(vp.sample(t0 + Duration::from_millis(50)));
        assert_eq!(vp.scroll_top(), 200);
        assert!(!vp.sample(t0 + Duration::from_millis(100)));
        assert_eq!(vp.scroll_top(), 400);
        assert!(!vp.is_scrolling());
    }

    #[test]
    fn zero_duration_jumps() {
        let t0 = Instant::now();
        let mut vp = Viewport::new();
        vp.start_scroll(t0, 90, Duration::ZERO, Easing::EaseInOutQuad);
        assert_eq!(vp.scroll_top(), 90);
        assert!(!vp.is_scrolling());
    }

    #[test]
    fn direct_set_cancels_animation() {
        let t0 = Instant::now();
        let mut vp = Viewport::new();
        vp.start_scroll(t0, 500, Duration::from_millis(300), Easing::Linear);
        vp.set_scroll_top(10);
        assert!(!vp.is_scrolling());
        assert_eq!(vp.scroll_top(), 10);
    }

    #[test]
    fn negative_targets_clamp_to_top() {
        let t0 = Instant::now();
        let mut vp = Viewport::new();
        vp.start_scroll(t0, -40, Duration::ZERO, Easing::Linear);
        assert_eq!(vp.scroll_top(), 0);
    }
}
