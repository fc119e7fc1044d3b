//! Eased transitions for scalar and color properties
//!
//! A [`Tweened`] value owns the queue of transitions currently acting on it.
//! Relative transitions ([`Tweened::by`]) stack: every one contributes its full
//! delta by the time it finishes, so starting one per frame while a key is held
//! keeps adding motion on top of what is already in flight. Absolute
//! transitions ([`Tweened::to`]) drop whatever is in flight and animate from
//! the current value to the target, so the latest target wins.

use serde::{Deserialize, Serialize};

/// Easing curve applied to a transition's normalized progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Quadratic ease-in (slow start)
    QuadIn,
    /// Quadratic ease-out (slow finish)
    #[default]
    QuadOut,
}

impl Ease {
    /// Map progress in [0, 1] to eased progress in [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => t * (2.0 - t),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Transition {
    delta: f32,
    duration: f32,
    elapsed: f32,
    ease: Ease,
    /// Eased progress already folded into the value
    applied: f32,
}

impl Transition {
    fn remaining(&self) -> f32 {
        self.delta * (1.0 - self.applied)
    }
}

/// A scalar property with a queue of in-flight eased transitions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tweened {
    value: f32,
    transitions: Vec<Transition>,
}

impl Tweened {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            transitions: Vec::new(),
        }
    }

    /// Current value
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Overwrite the value directly. In-flight transitions keep running and
    /// continue to add their remaining deltas on top.
    pub fn set(&mut self, value: f32) {
        self.value = value;
    }

    /// Value the property settles at once every in-flight transition completes
    pub fn projected(&self) -> f32 {
        self.value + self.transitions.iter().map(Transition::remaining).sum::<f32>()
    }

    /// Number of transitions still running
    pub fn in_flight(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_animating(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Start a relative transition that adds `delta` over `duration` seconds
    pub fn by(&mut self, delta: f32, duration: f32, ease: Ease) {
        if duration <= 0.0 {
            self.value += delta;
            return;
        }
        self.transitions.push(Transition {
            delta,
            duration,
            elapsed: 0.0,
            ease,
            applied: 0.0,
        });
    }

    /// Start an absolute transition to `target`, replacing anything in flight
    pub fn to(&mut self, target: f32, duration: f32, ease: Ease) {
        self.transitions.clear();
        let delta = target - self.value;
        self.by(delta, duration, ease);
    }

    /// Advance every transition by `dt` seconds and drop the finished ones
    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let mut value = self.value;
        for transition in &mut self.transitions {
            transition.elapsed += dt;
            let eased = transition
                .ease
                .apply(transition.elapsed / transition.duration);
            value += transition.delta * (eased - transition.applied);
            transition.applied = eased;
        }
        self.value = value;
        self.transitions.retain(|t| t.elapsed < t.duration);
    }
}

/// An RGB color whose channels animate independently
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweenedColor {
    channels: [Tweened; 3],
}

impl TweenedColor {
    pub fn new(rgb: [f32; 3]) -> Self {
        Self {
            channels: rgb.map(Tweened::new),
        }
    }

    /// Current color as linear [r, g, b] in 0..=1
    pub fn rgb(&self) -> [f32; 3] {
        [
            self.channels[0].value().clamp(0.0, 1.0),
            self.channels[1].value().clamp(0.0, 1.0),
            self.channels[2].value().clamp(0.0, 1.0),
        ]
    }

    /// Retarget every channel to `rgb` over `duration` seconds
    pub fn to(&mut self, rgb: [f32; 3], duration: f32, ease: Ease) {
        for (channel, target) in self.channels.iter_mut().zip(rgb) {
            channel.to(target, duration, ease);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.channels.iter().any(Tweened::is_animating)
    }

    pub fn advance(&mut self, dt: f32) {
        for channel in &mut self.channels {
            channel.advance(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_ease_endpoints() {
        for ease in [Ease::Linear, Ease::QuadIn, Ease::QuadOut] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
            assert_eq!(ease.apply(2.0), 1.0);
        }
        assert!((Ease::QuadIn.apply(0.5) - 0.25).abs() < EPS);
        assert!((Ease::QuadOut.apply(0.5) - 0.75).abs() < EPS);
    }

    #[test]
    fn test_relative_transition_completes() {
        let mut v = Tweened::new(1.0);
        v.by(0.5, 0.3, Ease::QuadOut);
        assert_eq!(v.value(), 1.0);
        assert!((v.projected() - 1.5).abs() < EPS);

        v.advance(0.15);
        assert!(v.value() > 1.0 && v.value() < 1.5);

        v.advance(0.2);
        assert!((v.value() - 1.5).abs() < EPS);
        assert!(!v.is_animating());
    }

    #[test]
    fn test_relative_transitions_stack() {
        let mut v = Tweened::new(0.0);
        for _ in 0..3 {
            v.by(0.1, 0.3, Ease::QuadOut);
            v.advance(1.0 / 60.0);
        }
        assert_eq!(v.in_flight(), 3);
        assert!((v.projected() - 0.3).abs() < EPS);

        v.advance(1.0);
        assert!((v.value() - 0.3).abs() < EPS);
    }

    #[test]
    fn test_absolute_transition_latest_wins() {
        let mut v = Tweened::new(0.0);
        v.to(1.0, 1.0, Ease::QuadIn);
        v.advance(0.5);
        let mid = v.value();
        assert!(mid > 0.0 && mid < 1.0);

        v.to(0.2, 1.0, Ease::QuadIn);
        assert_eq!(v.in_flight(), 1);
        assert_eq!(v.value(), mid);

        v.advance(1.0);
        assert!((v.value() - 0.2).abs() < EPS);
    }

    #[test]
    fn test_zero_duration_applies_immediately() {
        let mut v = Tweened::new(2.0);
        v.by(-1.0, 0.0, Ease::Linear);
        assert_eq!(v.value(), 1.0);
        assert!(!v.is_animating());
    }

    #[test]
    fn test_direct_set_keeps_transitions() {
        let mut v = Tweened::new(0.0);
        v.by(1.0, 1.0, Ease::Linear);
        v.advance(0.5);
        v.set(10.0);
        v.advance(0.5);
        assert!((v.value() - 10.5).abs() < EPS);
    }

    #[test]
    fn test_color_transition() {
        let mut c = TweenedColor::new([1.0, 1.0, 1.0]);
        c.to([0.0, 0.5, 0.25], 0.3, Ease::QuadIn);
        assert!(c.is_animating());
        c.advance(0.3);
        let [r, g, b] = c.rgb();
        assert!(r.abs() < EPS);
        assert!((g - 0.5).abs() < EPS);
        assert!((b - 0.25).abs() < EPS);
        assert!(!c.is_animating());
    }
}
