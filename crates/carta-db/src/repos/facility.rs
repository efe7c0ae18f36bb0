//! Facility repository: registry reads and location-row candidates.

use carta_core::entities::{Address, BoundingBox, Coordinates, Facility, FacilityLocation};

use crate::error::DatabaseError;
use crate::helpers::{dedup_preserving_order, get_opt_string, parse_enum, placeholders};
use crate::service::CartaService;

const FACILITY_COLUMNS: &str = "id, name, network, street, city, state, zip, county_fips, \
     latitude, longitude, bed_count, facility_type";

fn row_to_facility(row: &libsql::Row) -> Result<Facility, DatabaseError> {
    let coordinates = match (row.get::<Option<f64>>(8)?, row.get::<Option<f64>>(9)?) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };
    let bed_count = row
        .get::<Option<i64>>(10)?
        .map(u32::try_from)
        .transpose()
        .map_err(|e| DatabaseError::InvalidState(format!("bed_count out of range: {e}")))?;

    Ok(Facility {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        network: get_opt_string(row, 2)?,
        address: Address {
            street: get_opt_string(row, 3)?,
            city: get_opt_string(row, 4)?,
            state: get_opt_string(row, 5)?,
            zip: get_opt_string(row, 6)?,
            county_fips: get_opt_string(row, 7)?,
        },
        coordinates,
        bed_count,
        facility_type: parse_enum(&row.get::<String>(11)?)?,
    })
}

impl CartaService {
    /// Load one facility.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UnknownFacility` if the id is not registered.
    pub async fn get_facility(&self, id: &str) -> Result<Facility, DatabaseError> {
        let sql = format!("SELECT {FACILITY_COLUMNS} FROM facilities WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::UnknownFacility(id.to_string()))?;
        row_to_facility(&row)
    }

    /// Load facilities by id, in input order. Unknown ids are skipped.
    pub async fn get_facilities(&self, ids: &[String]) -> Result<Vec<Facility>, DatabaseError> {
        let ids = dedup_preserving_order(ids);
        let mut found = std::collections::HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(self.chunk_size()) {
            let sql = format!(
                "SELECT {FACILITY_COLUMNS} FROM facilities WHERE id IN ({})",
                placeholders(1, chunk.len())
            );
            let params: Vec<libsql::Value> = chunk.iter().map(|id| id.as_str().into()).collect();
            let mut rows = self
                .db()
                .query_with(&sql, || libsql::params_from_iter(params.clone()))
                .await?;
            while let Some(row) = rows.next().await? {
                let facility = row_to_facility(&row)?;
                found.insert(facility.id.clone(), facility);
            }
        }

        Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
    }

    /// Every location row (primary coordinates and extra locations) inside
    /// the box.
    ///
    /// Rows are returned in storage order; the same facility may appear more
    /// than once.
    pub async fn location_candidates(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<FacilityLocation>, DatabaseError> {
        let sql = "SELECT id, latitude, longitude FROM facilities
                   WHERE latitude IS NOT NULL AND longitude IS NOT NULL
                     AND latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4
                   UNION ALL
                   SELECT facility_id, latitude, longitude FROM facility_locations
                   WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4";
        let mut rows = self
            .db()
            .query_with(sql, || {
                libsql::params![
                    bbox.min_latitude,
                    bbox.max_latitude,
                    bbox.min_longitude,
                    bbox.max_longitude
                ]
            })
            .await?;

        let mut locations = Vec::new();
        while let Some(row) = rows.next().await? {
            locations.push(FacilityLocation {
                facility_id: row.get::<String>(0)?,
                coordinates: Coordinates {
                    latitude: row.get::<f64>(1)?,
                    longitude: row.get::<f64>(2)?,
                },
            });
        }
        tracing::debug!(candidates = locations.len(), "location rows inside bounding box");
        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use carta_core::entities::{BoundingBox, Coordinates};
    use carta_core::enums::FacilityType;

    use crate::error::DatabaseError;
    use crate::test_support::helpers::{MIAMI, seeded_service};

    #[tokio::test]
    async fn get_facility_decodes_all_columns() {
        let svc = seeded_service().await;
        let f = svc.get_facility("F-ORIGIN").await.unwrap();
        assert_eq!(f.name, "Biscayne Care Center");
        assert_eq!(f.facility_type, FacilityType::SkilledNursing);
        assert_eq!(f.address.state.as_deref(), Some("FL"));
        assert_eq!(f.address.county_fips.as_deref(), Some("12086"));
        assert_eq!(f.bed_count, Some(120));
        assert!(f.coordinates.is_some());
    }

    #[tokio::test]
    async fn get_facility_unknown_id() {
        let svc = seeded_service().await;
        let err = svc.get_facility("F-NOPE").await.unwrap_err();
        assert!(matches!(err, DatabaseError::UnknownFacility(id) if id == "F-NOPE"));
    }

    #[tokio::test]
    async fn get_facilities_preserves_input_order_across_chunks() {
        let svc = seeded_service().await.with_chunk_size(2);
        let ids: Vec<String> = ["F-FAR", "F-NOPE", "F-ORIGIN", "F-NEAR", "F-ORIGIN"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let found: Vec<_> = svc
            .get_facilities(&ids)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(found, vec!["F-FAR", "F-ORIGIN", "F-NEAR"]);
    }

    #[tokio::test]
    async fn location_candidates_include_extra_locations() {
        let svc = seeded_service().await;
        let bbox = BoundingBox::around(Coordinates::new(MIAMI.0, MIAMI.1).unwrap(), 15.0);
        let rows = svc.location_candidates(&bbox).await.unwrap();
        let near: Vec<_> = rows.iter().filter(|r| r.facility_id == "F-NEAR").collect();
        assert_eq!(near.len(), 2, "primary position plus one satellite location");
        assert!(rows.iter().all(|r| r.facility_id != "F-NOWHERE"));
    }
}
