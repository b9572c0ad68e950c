//! Great-circle distances between coordinates.

use crate::domain::Coordinates;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometres, rounded to one
/// decimal place.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h just past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round_tenths(EARTH_RADIUS_KM * c)
}

fn round_tenths(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng)
    }

    #[test]
    fn known_distances() {
        let paris = point(48.8566, 2.3522);
        let lyon = point(45.7640, 4.8357);
        let d = distance_km(paris, lyon);
        assert!((d - 391.5).abs() < 1.0, "paris-lyon was {d}");

        let algiers = point(36.7538, 3.0588);
        let oran = point(35.6971, -0.6308);
        let d = distance_km(algiers, oran);
        assert!((d - 351.2).abs() < 1.0, "algiers-oran was {d}");
    }

    #[test]
    fn rounds_to_one_decimal() {
        let d = distance_km(point(0.0, 0.0), point(0.0, 1.0));
        assert_eq!(d, 111.2);
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = distance_km(point(0.0, 0.0), point(0.0, 180.0));
        assert_eq!(d, round_tenths(std::f64::consts::PI * EARTH_RADIUS_KM));
    }
}
