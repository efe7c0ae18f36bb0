//! Proximity resolution: facilities within a radius of an origin.
//!
//! Location rows come from the store pre-filtered by a bounding box. Exact
//! great-circle filtering, per-facility deduplication and ordering happen
//! here.

use std::cmp::Ordering;
use std::collections::HashMap;

use carta_core::entities::{BoundingBox, Coordinates, Facility, FacilityLocation, ProximityResult};

use crate::error::EngineError;
use crate::geo::{haversine_miles, within_radius};
use crate::source::FacilitySource;

/// Reject radii that are not positive and finite.
///
/// # Errors
///
/// Returns `EngineError::InvalidRadius`.
pub fn validate_radius(radius_miles: f64) -> Result<(), EngineError> {
    if radius_miles.is_finite() && radius_miles > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidRadius(radius_miles))
    }
}

/// Minimum distance per facility over all of its location rows, keeping only
/// facilities inside the radius.
///
/// Rows with invalid coordinates are ignored. The result is in first-seen
/// order; callers sort it.
#[must_use]
pub fn nearest_per_facility(
    origin: Coordinates,
    radius_miles: f64,
    locations: &[FacilityLocation],
) -> Vec<(String, f64)> {
    let mut order: Vec<&str> = Vec::new();
    let mut best: HashMap<&str, f64> = HashMap::new();

    for loc in locations {
        if !loc.coordinates.is_valid() {
            continue;
        }
        let d = haversine_miles(origin, loc.coordinates);
        match best.get_mut(loc.facility_id.as_str()) {
            Some(current) => {
                if d < *current {
                    *current = d;
                }
            }
            None => {
                order.push(&loc.facility_id);
                best.insert(&loc.facility_id, d);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| {
            let d = best[id];
            within_radius(d, radius_miles).then(|| (id.to_string(), d))
        })
        .collect()
}

/// Ascending distance, then case-insensitive name, then id.
pub fn sort_results(results: &mut [ProximityResult]) {
    results.sort_by(|a, b| {
        a.distance_miles
            .partial_cmp(&b.distance_miles)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.facility
                    .name
                    .to_lowercase()
                    .cmp(&b.facility.name.to_lowercase())
            })
            .then_with(|| a.facility.id.cmp(&b.facility.id))
    });
}

/// Every facility with a location within `radius_miles` of `origin`.
///
/// # Errors
///
/// Returns `InvalidRadius`, `InvalidOrigin`, or any source failure.
pub async fn resolve_around<S: FacilitySource>(
    source: &S,
    origin: Coordinates,
    radius_miles: f64,
) -> Result<Vec<ProximityResult>, EngineError> {
    validate_radius(radius_miles)?;
    if !origin.is_valid() {
        return Err(EngineError::InvalidOrigin(format!(
            "({}, {}) is not a WGS84 position",
            origin.latitude, origin.longitude
        )));
    }

    let bbox = BoundingBox::around(origin, radius_miles);
    let mut locations = source.locations_within(&bbox).await?;
    locations.retain(|l| bbox.contains(l.coordinates));
    let nearest = nearest_per_facility(origin, radius_miles, &locations);
    attach_facilities(source, nearest).await
}

/// Facilities within range of `origin_facility`.
///
/// The origin itself is placed at distance 0 when `include_origin` is set and
/// omitted otherwise, regardless of its location rows.
///
/// # Errors
///
/// Returns `InvalidOrigin` if the facility has no valid coordinates, plus the
/// errors of [`resolve_around`].
pub async fn resolve_nearby<S: FacilitySource>(
    source: &S,
    origin_facility: &Facility,
    radius_miles: f64,
    include_origin: bool,
) -> Result<Vec<ProximityResult>, EngineError> {
    validate_radius(radius_miles)?;
    let origin = origin_facility
        .coordinates
        .filter(Coordinates::is_valid)
        .ok_or_else(|| {
            EngineError::InvalidOrigin(format!(
                "facility '{}' has no valid coordinates",
                origin_facility.id
            ))
        })?;

    let mut results = resolve_around(source, origin, radius_miles).await?;
    results.retain(|r| r.facility.id != origin_facility.id);
    if include_origin {
        results.push(ProximityResult {
            facility: origin_facility.clone(),
            distance_miles: 0.0,
        });
        sort_results(&mut results);
    }
    tracing::debug!(
        origin = %origin_facility.id,
        radius_miles,
        found = results.len(),
        "resolved nearby facilities"
    );
    Ok(results)
}

async fn attach_facilities<S: FacilitySource>(
    source: &S,
    nearest: Vec<(String, f64)>,
) -> Result<Vec<ProximityResult>, EngineError> {
    let ids: Vec<String> = nearest.iter().map(|(id, _)| id.clone()).collect();
    let distances: HashMap<String, f64> = nearest.into_iter().collect();
    let facilities = source.facilities(&ids).await?;

    let mut results: Vec<ProximityResult> = facilities
        .into_iter()
        .filter_map(|facility| {
            let distance_miles = *distances.get(&facility.id)?;
            Some(ProximityResult {
                facility,
                distance_miles,
            })
        })
        .collect();
    sort_results(&mut results);
    Ok(results)
}
