//! Cosmetic color retargeting and decorative spin

use rand::Rng;

use crate::config::CosmeticsConfig;
use crate::tween::{Ease, TweenedColor};

/// Parse "#rrggbb" or "rrggbb" into RGB floats (0.0-1.0)
pub fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
    ])
}

/// Uniformly random color
pub fn random_rgb<R: Rng + ?Sized>(rng: &mut R) -> [f32; 3] {
    [rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>()]
}

/// Kind of decorative object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
    Ground,
    /// Corner cylinder, spins every frame
    Cylinder,
}

/// A scene object whose color is periodically retargeted
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub color: TweenedColor,
    /// Accumulated yaw
    pub spin: f32,
}

impl Decoration {
    pub fn new(kind: DecorationKind, rgb: [f32; 3]) -> Self {
        Self {
            kind,
            color: TweenedColor::new(rgb),
            spin: 0.0,
        }
    }
}

/// Ground plus the four corner cylinders, in spawn order
pub fn default_decorations() -> Vec<Decoration> {
    let ground = [0.251, 0.588, 0.337];
    let cylinders = ["#4b42b1", "#aa0495", "#75e3d1", "#ebdba2"];

    let mut set = vec![Decoration::new(DecorationKind::Ground, ground)];
    set.extend(cylinders.iter().filter_map(|hex| {
        parse_hex_color(hex).map(|rgb| Decoration::new(DecorationKind::Cylinder, rgb))
    }));
    set
}

/// Timer-driven decoration colors, on-demand tank colors, cylinder spin
#[derive(Debug, Clone, PartialEq)]
pub struct CosmeticAnimator {
    period: f32,
    elapsed: f32,
    decoration_duration: f32,
    tank_duration: f32,
    spin_step: f32,
}

impl CosmeticAnimator {
    pub fn new(config: &CosmeticsConfig) -> Self {
        Self {
            period: config.color_period,
            elapsed: 0.0,
            decoration_duration: config.decoration_duration,
            tank_duration: config.tank_color_duration,
            spin_step: config.spin_step,
        }
    }

    /// Advance the color timer. When a period elapses every decoration gets a
    /// fresh random target. Returns whether the timer fired.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        decorations: &mut [Decoration],
        rng: &mut R,
    ) -> bool {
        self.elapsed += dt.max(0.0);
        if self.elapsed < self.period {
            return false;
        }
        // Several periods in one tick still retarget once; later targets win anyway
        self.elapsed %= self.period;
        for decoration in decorations.iter_mut() {
            decoration
                .color
                .to(random_rgb(rng), self.decoration_duration, Ease::QuadIn);
        }
        true
    }

    /// Retarget every tracked tank material. No-op on an empty slice.
    pub fn randomize_tank<R: Rng + ?Sized>(
        &self,
        materials: &mut [TweenedColor],
        rng: &mut R,
    ) -> bool {
        if materials.is_empty() {
            return false;
        }
        for material in materials.iter_mut() {
            material.to(random_rgb(rng), self.tank_duration, Ease::QuadIn);
        }
        true
    }

    /// Fixed per-frame spin of the cylinders, independent of elapsed time
    pub fn spin(&self, decorations: &mut [Decoration]) {
        for decoration in decorations
            .iter_mut()
            .filter(|d| d.kind == DecorationKind::Cylinder)
        {
            decoration.spin += self.spin_step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn animator() -> CosmeticAnimator {
        CosmeticAnimator::new(&CosmeticsConfig::default())
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0]));
        assert_eq!(parse_hex_color("00ff00"), Some([0.0, 1.0, 0.0]));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_default_decorations() {
        let set = default_decorations();
        assert_eq!(set.len(), 5);
        assert_eq!(set[0].kind, DecorationKind::Ground);
        assert!(set[1..].iter().all(|d| d.kind == DecorationKind::Cylinder));
    }

    #[test]
    fn test_timer_fires_each_period() {
        let mut cosmetics = animator();
        let mut rng = StdRng::seed_from_u64(7);
        let mut set = default_decorations();

        let mut fired = 0;
        for _ in 0..(60 * 9) {
            if cosmetics.tick(1.0 / 60.0, &mut set, &mut rng) {
                fired += 1;
            }
            for d in &mut set {
                d.color.advance(1.0 / 60.0);
            }
        }
        assert_eq!(fired, 2);
    }

    #[test]
    fn test_timer_retargets_colors() {
        let mut cosmetics = animator();
        let mut rng = StdRng::seed_from_u64(42);
        let mut set = default_decorations();
        let before: Vec<_> = set.iter().map(|d| d.color.rgb()).collect();

        assert!(!cosmetics.tick(3.9, &mut set, &mut rng));
        assert!(set.iter().all(|d| !d.color.is_animating()));

        assert!(cosmetics.tick(0.2, &mut set, &mut rng));
        assert!(set.iter().all(|d| d.color.is_animating()));
        for d in &mut set {
            d.color.advance(1.0);
        }
        let after: Vec<_> = set.iter().map(|d| d.color.rgb()).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_randomize_tank() {
        let cosmetics = animator();
        let mut rng = StdRng::seed_from_u64(1);

        assert!(!cosmetics.randomize_tank(&mut [], &mut rng));

        let mut materials = vec![TweenedColor::new([1.0, 1.0, 1.0]); 3];
        assert!(cosmetics.randomize_tank(&mut materials, &mut rng));
        assert!(materials.iter().all(TweenedColor::is_animating));
        for m in &mut materials {
            m.advance(0.3);
        }
        assert!(materials.iter().all(|m| !m.is_animating()));
    }

    #[test]
    fn test_spin_only_cylinders() {
        let cosmetics = animator();
        let mut set = default_decorations();
        for _ in 0..100 {
            cosmetics.spin(&mut set);
        }
        assert_eq!(set[0].spin, 0.0);
        assert!((set[1].spin - 1.0).abs() < 1e-4);
    }
}
