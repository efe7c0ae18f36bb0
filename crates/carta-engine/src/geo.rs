//! Great-circle distance on a spherical Earth.

use carta_core::entities::Coordinates;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Slack applied to the radius comparison so rounding never drops a point
/// that sits on the boundary.
pub const DISTANCE_TOLERANCE_MILES: f64 = 1e-6;

/// Haversine distance between two positions, in miles.
#[must_use]
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Whether `distance` is inside `radius` once tolerance is applied.
#[must_use]
pub fn within_radius(distance: f64, radius: f64) -> bool {
    distance <= radius + DISTANCE_TOLERANCE_MILES
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates {
            latitude,
            longitude,
        }
    }

    #[test]
    fn zero_distance_to_self() {
        let p = at(25.7617, -80.1918);
        assert!(haversine_miles(p, p).abs() < 1e-12);
    }

    #[test]
    fn symmetric() {
        let miami = at(25.7617, -80.1918);
        let orlando = at(28.5383, -81.3792);
        let d1 = haversine_miles(miami, orlando);
        let d2 = haversine_miles(orlando, miami);
        assert!((d1 - d2).abs() < 1e-9);
        // Roughly 205 miles as the crow flies.
        assert!((200.0..210.0).contains(&d1), "got {d1}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_miles(at(0.0, 0.0), at(1.0, 0.0));
        let expected = EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0;
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = haversine_miles(at(0.0, 0.0), at(0.0, 180.0));
        assert!((d - EARTH_RADIUS_MILES * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn boundary_tolerance() {
        assert!(within_radius(10.0, 10.0));
        assert!(within_radius(10.000_000_5, 10.0));
        assert!(!within_radius(10.1, 10.0));
    }
}
