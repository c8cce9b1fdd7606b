//! Per-kind visibility state, independent of data freshness.

use shared::kind::OverlayKind;

/// On/off toggle per overlay kind.
///
/// Visibility is purely about whether a kind's objects are attached to the
/// surface; the overlay store is never touched by a toggle, so switching a
/// kind off and back on restores the last-synchronized state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    particles: bool,
    robots: bool,
    isl: bool,
    region: bool,
}

impl Visibility {
    /// Every kind starts visible; aggregates simply have nothing to show
    /// until their first successful fetch.
    pub fn new() -> Self {
        Self {
            particles: true,
            robots: true,
            isl: true,
            region: true,
        }
    }

    fn flag(&self, kind: OverlayKind) -> bool {
        match kind {
            OverlayKind::Particles => self.particles,
            OverlayKind::Robots => self.robots,
            OverlayKind::Isl => self.isl,
            OverlayKind::Region => self.region,
        }
    }

    fn flag_mut(&mut self, kind: OverlayKind) -> &mut bool {
        match kind {
            OverlayKind::Particles => &mut self.particles,
            OverlayKind::Robots => &mut self.robots,
            OverlayKind::Isl => &mut self.isl,
            OverlayKind::Region => &mut self.region,
        }
    }

    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        self.flag(kind)
    }

    /// Flip a kind and return the new state.
    pub fn toggle(&mut self, kind: OverlayKind) -> bool {
        let flag = self.flag_mut(kind);
        *flag = !*flag;
        *flag
    }

    pub fn set(&mut self, kind: OverlayKind, visible: bool) {
        *self.flag_mut(kind) = visible;
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_visible() {
        let visibility = Visibility::new();
        for kind in OverlayKind::ALL {
            assert!(visibility.is_visible(kind));
        }
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut visibility = Visibility::new();
        assert!(!visibility.toggle(OverlayKind::Robots));
        assert!(!visibility.is_visible(OverlayKind::Robots));
        assert!(visibility.is_visible(OverlayKind::Isl));
        assert!(visibility.toggle(OverlayKind::Robots));
        assert!(visibility.is_visible(OverlayKind::Robots));
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut visibility = Visibility::new();
        visibility.set(OverlayKind::Region, false);
        visibility.set(OverlayKind::Region, false);
        assert!(!visibility.is_visible(OverlayKind::Region));
    }
}
