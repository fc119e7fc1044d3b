//! Active camera selection

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four fixed viewpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraView {
    /// Overhead camera looking straight down at the arena
    #[default]
    Default,
    /// Chase camera behind and above the tank
    Tank,
    /// Camera looking back from the front of the tank
    Rear,
    /// Camera riding on the barrel
    Barrel,
}

impl CameraView {
    pub const ALL: [CameraView; 4] = [
        CameraView::Default,
        CameraView::Tank,
        CameraView::Rear,
        CameraView::Barrel,
    ];

    /// View bound to a number key (1-4)
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(CameraView::Default),
            2 => Some(CameraView::Tank),
            3 => Some(CameraView::Rear),
            4 => Some(CameraView::Barrel),
            _ => None,
        }
    }

    /// Parse a view name; anything unrecognized resolves to [`CameraView::Default`]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "tank" | "tankcamera" => CameraView::Tank,
            "rear" | "rearcamera" => CameraView::Rear,
            "barrel" | "barrelcamera" => CameraView::Barrel,
            _ => CameraView::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraView::Default => "default",
            CameraView::Tank => "tank",
            CameraView::Rear => "rear",
            CameraView::Barrel => "barrel",
        }
    }
}

impl fmt::Display for CameraView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks which camera the frame is rendered with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraSelector {
    active: CameraView,
}

impl CameraSelector {
    pub fn new(initial: CameraView) -> Self {
        Self { active: initial }
    }

    pub fn active(&self) -> CameraView {
        self.active
    }

    /// Handle the release of a number key. Returns the new view when the key
    /// is one of the camera bindings.
    pub fn on_digit_released(&mut self, digit: u8) -> Option<CameraView> {
        let view = CameraView::from_digit(digit)?;
        self.active = view;
        Some(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(CameraSelector::default().active(), CameraView::Default);
        assert_eq!(CameraSelector::new(CameraView::Rear).active(), CameraView::Rear);
    }

    #[test]
    fn test_digit_switching() {
        let mut selector = CameraSelector::default();
        assert_eq!(selector.on_digit_released(2), Some(CameraView::Tank));
        assert_eq!(selector.active(), CameraView::Tank);

        assert_eq!(selector.on_digit_released(4), Some(CameraView::Barrel));
        assert_eq!(selector.on_digit_released(1), Some(CameraView::Default));
        assert_eq!(selector.active(), CameraView::Default);
    }

    #[test]
    fn test_unrecognized_digit_keeps_state() {
        let mut selector = CameraSelector::default();
        selector.on_digit_released(3);
        assert_eq!(selector.on_digit_released(5), None);
        assert_eq!(selector.on_digit_released(0), None);
        assert_eq!(selector.active(), CameraView::Rear);
    }

    #[test]
    fn test_from_name_falls_back() {
        assert_eq!(CameraView::from_name("Barrel"), CameraView::Barrel);
        assert_eq!(CameraView::from_name("tankCamera"), CameraView::Tank);
        assert_eq!(CameraView::from_name("periscope"), CameraView::Default);
        assert_eq!(CameraView::from_name(""), CameraView::Default);
    }

    #[test]
    fn test_names_round_trip() {
        for view in CameraView::ALL {
            assert_eq!(CameraView::from_name(view.as_str()), view);
        }
    }
}
