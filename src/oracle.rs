//! The `Oracle` contract (§6) and the deterministic mock oracles used by the
//! CLI's `--mock-oracle` flag and by the scenario tests in `tests/`.
//!
//! A real oracle backed by a shapefile/spatial database is out of scope for
//! this crate (§1); it would implement the same trait.

use thiserror::Error;

use crate::node::CountryId;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("oracle query failed for (ilat={ilat}, ilon={ilon}): {reason}")]
    QueryFailed {
        ilat: u32,
        ilon: u32,
        reason: String,
    },
}

/// A pure function from a lattice point to a country id. Must be safe to
/// call concurrently from multiple builder threads (§5).
pub trait Oracle: Sync {
    fn country_at(&self, ilat: u32, ilon: u32) -> Result<CountryId, OracleError>;
}

/// Returns one id inside an axis-aligned rectangle, `0` outside it.
/// Grounded on scenario S3.
pub struct RectangleOracle {
    pub rect_ilon: (u32, u32),
    pub rect_ilat: (u32, u32),
    pub id: CountryId,
}

impl Oracle for RectangleOracle {
    fn country_at(&self, ilat: u32, ilon: u32) -> Result<CountryId, OracleError> {
        let in_lon = ilon >= self.rect_ilon.0 && ilon <= self.rect_ilon.1;
        let in_lat = ilat >= self.rect_ilat.0 && ilat <= self.rect_ilat.1;
        Ok(if in_lon && in_lat { self.id } else { 0 })
    }
}

/// Returns one id inside a circle (in lattice-index units), `0` outside it.
pub struct CircleOracle {
    pub center_ilat: u32,
    pub center_ilon: u32,
    pub radius: u32,
    pub id: CountryId,
}

impl Oracle for CircleOracle {
    fn country_at(&self, ilat: u32, ilon: u32) -> Result<CountryId, OracleError> {
        let dlat = ilat as i64 - self.center_ilat as i64;
        let dlon = ilon as i64 - self.center_ilon as i64;
        let dist_sq = dlat * dlat + dlon * dlon;
        let radius_sq = self.radius as i64 * self.radius as i64;
        Ok(if dist_sq <= radius_sq { self.id } else { 0 })
    }
}

/// Returns `1` for `ilat > ymax/2`, `2` otherwise. Grounded on scenario S2.
pub struct SimpleOracle {
    pub y_max: u32,
}

impl Oracle for SimpleOracle {
    fn country_at(&self, ilat: u32, _ilon: u32) -> Result<CountryId, OracleError> {
        Ok(if ilat > self.y_max / 2 { 1 } else { 2 })
    }
}

/// Returns `id` at exactly one lattice point, `0` everywhere else.
/// Grounded on scenario S4.
pub struct SinglePointOracle {
    pub ilat: u32,
    pub ilon: u32,
    pub id: CountryId,
}

impl Oracle for SinglePointOracle {
    fn country_at(&self, ilat: u32, ilon: u32) -> Result<CountryId, OracleError> {
        Ok(if ilat == self.ilat && ilon == self.ilon {
            self.id
        } else {
            0
        })
    }
}

/// Constant-id oracle. Grounded on scenario S1.
pub struct UniformOracle {
    pub id: CountryId,
}

impl Oracle for UniformOracle {
    fn country_at(&self, _ilat: u32, _ilon: u32) -> Result<CountryId, OracleError> {
        Ok(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_oracle_respects_bounds() {
        let oracle = RectangleOracle {
            rect_ilon: (100, 200),
            rect_ilat: (50, 80),
            id: 5,
        };
        assert_eq!(oracle.country_at(65, 150).unwrap(), 5);
        assert_eq!(oracle.country_at(49, 150).unwrap(), 0);
        assert_eq!(oracle.country_at(65, 201).unwrap(), 0);
    }

    #[test]
    fn single_point_oracle_is_isolated() {
        let oracle = SinglePointOracle {
            ilat: 100,
            ilon: 200,
            id: 9,
        };
        assert_eq!(oracle.country_at(100, 200).unwrap(), 9);
        assert_eq!(oracle.country_at(99, 200).unwrap(), 0);
        assert_eq!(oracle.country_at(101, 199).unwrap(), 0);
    }
}
