pub(crate) mod leaflet;

pub use leaflet::LeafletMap;

use crate::models::{LatLng, Note};

/// Largest latitude Web Mercator tiles can show.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// The map widget as seen by the sync engine.
///
/// Implementations only draw; which markers exist is decided by
/// [`MapSync`] and the controller.
pub trait MapWidget {
    fn show_pointer(&self, at: LatLng);
    fn hide_pointer(&self);
    /// Remove every note marker.
    fn clear_notes(&self);
    fn add_notes(&self, notes: &[Note]);
    fn zoom(&self) -> f64;
    fn pan_to(&self, center: LatLng);
}

/// What the engine believes is currently drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapSync {
    pointer: Option<LatLng>,
    rendered: usize,
    center: Option<LatLng>,
    panel_offset_px: f64,
}

impl MapSync {
    pub fn new(panel_offset_px: f64) -> Self {
        Self {
            panel_offset_px,
            ..Default::default()
        }
    }

    pub fn pointer(&self) -> Option<LatLng> {
        self.pointer
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn center(&self) -> Option<LatLng> {
        self.center
    }

    /// Record a full redraw of `count` markers.
    pub(crate) fn set_rendered(&mut self, count: usize) {
        self.rendered = count;
    }

    /// Move the pointer to `target`. Returns whether the widget must change.
    pub(crate) fn place_pointer(&mut self, target: Option<LatLng>) -> bool {
        if self.pointer == target {
            return false;
        }
        self.pointer = target;
        true
    }

    /// Center to pan to so that `target` stays above the panel, or `None`
    /// when the view is already there.
    pub(crate) fn follow(&mut self, target: LatLng, zoom: f64) -> Option<LatLng> {
        let center = view_center_for(target, zoom, self.panel_offset_px);
        if self.center == Some(center) {
            return None;
        }
        self.center = Some(center);
        Some(center)
    }
}

/// Degrees of latitude covered by one screen pixel at `zoom`.
///
/// Uses the equatorial 256px-tile scale, which is close enough for a
/// visual offset.
pub fn degrees_per_pixel(zoom: f64) -> f64 {
    360.0 / (256.0 * 2f64.powf(zoom))
}

/// View center that leaves `target` `offset_px` pixels above the middle.
pub fn view_center_for(target: LatLng, zoom: f64, offset_px: f64) -> LatLng {
    let lat = (target.lat - offset_px * degrees_per_pixel(zoom))
        .clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    LatLng::new(lat, target.long)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_shrinks_as_zoom_grows() {
        let target = LatLng::new(32.0, 52.0);
        let far = view_center_for(target, 2.0, 100.0);
        let near = view_center_for(target, 8.0, 100.0);
        assert!(far.lat < near.lat);
        assert!(near.lat < target.lat);
        assert_eq!(near.long, 52.0);
        assert!((target.lat - near.lat - 100.0 * 360.0 / (256.0 * 256.0)).abs() < 1e-9);
    }

    #[test]
    fn test_center_is_clamped() {
        let c = view_center_for(LatLng::new(-84.0, 0.0), 2.0, 400.0);
        assert_eq!(c.lat, -MAX_MERCATOR_LAT);
    }

    #[test]
    fn test_zero_offset_centers_on_target() {
        let t = LatLng::new(10.0, 20.0);
        assert_eq!(view_center_for(t, 5.0, 0.0), t);
    }

    #[test]
    fn test_place_pointer_reports_changes() {
        let mut m = MapSync::new(0.0);
        let p = Some(LatLng::new(1.0, 2.0));
        assert!(m.place_pointer(p));
        assert!(!m.place_pointer(p));
        assert!(m.place_pointer(None));
        assert_eq!(m.pointer(), None);
    }

    #[test]
    fn test_follow_skips_when_already_centered() {
        let mut m = MapSync::new(120.0);
        let t = LatLng::new(1.0, 2.0);
        assert!(m.follow(t, 5.0).is_some());
        assert!(m.follow(t, 5.0).is_none());
        assert!(m.follow(t, 6.0).is_some());
    }
}
