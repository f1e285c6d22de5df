//! Donation matching. Scores available food items against an open NGO
//! request so the NGO sees the best candidates first.
//!
//! Scoring is a weighted 0..100 blend of category fit, quantity coverage,
//! expiry urgency, and donor proximity.

use chrono::Utc;
use db::models::{
    food_item::{FoodItem, FoodItemWithLocation},
    food_request::FoodRequest,
    ngo::Ngo,
};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

const CATEGORY_WEIGHT: f64 = 40.0;
const QUANTITY_WEIGHT: f64 = 25.0;
const URGENCY_WEIGHT: f64 = 15.0;
const PROXIMITY_WEIGHT: f64 = 20.0;

/// Distance beyond which proximity contributes nothing.
const MAX_USEFUL_DISTANCE_KM: f64 = 50.0;

#[derive(Debug, Error)]
pub enum MatchingError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("food request not found")]
    RequestNotFound,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ScoredMatch {
    #[serde(flatten)]
    pub food_item: FoodItemWithLocation,
    pub score: f64,
    pub distance_km: Option<f64>,
}

pub struct MatchingService {
    pool: SqlitePool,
}

impl MatchingService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Rank every available food item against the given request, best first.
    pub async fn find_matches(&self, request_id: Uuid) -> Result<Vec<ScoredMatch>, MatchingError> {
        let request = FoodRequest::find_by_id(&self.pool, request_id)
            .await?
            .ok_or(MatchingError::RequestNotFound)?;

        let ngo = Ngo::find_by_id(&self.pool, request.ngo_id).await?;
        let ngo_location = ngo
            .as_ref()
            .and_then(|n| Some((n.latitude?, n.longitude?)));

        let items = FoodItem::find_available_with_location(&self.pool).await?;

        let mut matches: Vec<ScoredMatch> = items
            .into_iter()
            .map(|item| {
                let distance_km = distance_between(&item, ngo_location);
                let score = match_score(&item.item, &request, distance_km);
                ScoredMatch {
                    food_item: item,
                    score,
                    distance_km,
                }
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(matches)
    }
}

fn distance_between(
    item: &FoodItemWithLocation,
    ngo_location: Option<(f64, f64)>,
) -> Option<f64> {
    let (ngo_lat, ngo_lon) = ngo_location?;
    let item_lat = item.donor_latitude?;
    let item_lon = item.donor_longitude?;
    Some(haversine_km(item_lat, item_lon, ngo_lat, ngo_lon))
}

/// Score an item against a request on a 0..100 scale.
pub fn match_score(item: &FoodItem, request: &FoodRequest, distance_km: Option<f64>) -> f64 {
    let category = if item.category.eq_ignore_ascii_case(&request.category) {
        1.0
    } else {
        0.0
    };

    // Fraction of the requested quantity this item covers, capped at full.
    let quantity = if request.quantity > 0.0 {
        (item.quantity / request.quantity).min(1.0)
    } else {
        1.0
    };

    // Items expiring soon score higher so they move first. No expiry means a
    // neutral half score.
    let urgency = match item.expires_at {
        Some(expires_at) => {
            let hours_left = (expires_at - Utc::now()).num_minutes() as f64 / 60.0;
            if hours_left <= 0.0 {
                0.0
            } else if hours_left <= 24.0 {
                1.0
            } else if hours_left <= 72.0 {
                0.7
            } else {
                0.4
            }
        }
        None => 0.5,
    };

    let proximity = match distance_km {
        Some(d) => (1.0 - d / MAX_USEFUL_DISTANCE_KM).clamp(0.0, 1.0),
        None => 0.5,
    };

    category * CATEGORY_WEIGHT
        + quantity * QUANTITY_WEIGHT
        + urgency * URGENCY_WEIGHT
        + proximity * PROXIMITY_WEIGHT
}

/// Great-circle distance in kilometres.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use db::models::food_item::FoodStatus;
    use db::models::food_request::RequestStatus;

    use super::*;

    fn test_item(category: &str, quantity: f64) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4(),
            donor_id: Uuid::new_v4(),
            title: "Rice".to_string(),
            description: None,
            category: category.to_string(),
            quantity,
            unit: "kg".to_string(),
            expires_at: None,
            status: FoodStatus::Available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_request(category: &str, quantity: f64) -> FoodRequest {
        FoodRequest {
            id: Uuid::new_v4(),
            ngo_id: Uuid::new_v4(),
            category: category.to_string(),
            quantity,
            needed_by: None,
            status: RequestStatus::Open,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn category_match_dominates() {
        let request = test_request("grains", 10.0);
        let matching = match_score(&test_item("grains", 10.0), &request, None);
        let other = match_score(&test_item("dairy", 10.0), &request, None);
        assert!(matching > other);
        assert!((matching - other - CATEGORY_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn category_comparison_ignores_case() {
        let request = test_request("Grains", 10.0);
        let a = match_score(&test_item("grains", 10.0), &request, None);
        let b = match_score(&test_item("GRAINS", 10.0), &request, None);
        assert_eq!(a, b);
    }

    #[test]
    fn partial_quantity_scores_proportionally() {
        let request = test_request("grains", 10.0);
        let full = match_score(&test_item("grains", 10.0), &request, None);
        let half = match_score(&test_item("grains", 5.0), &request, None);
        let surplus = match_score(&test_item("grains", 40.0), &request, None);
        assert!((full - half - QUANTITY_WEIGHT / 2.0).abs() < 1e-9);
        assert_eq!(full, surplus);
    }

    #[test]
    fn items_expiring_soon_outrank_fresh_ones() {
        let request = test_request("grains", 10.0);
        let mut soon = test_item("grains", 10.0);
        soon.expires_at = Some(Utc::now() + Duration::hours(6));
        let mut later = test_item("grains", 10.0);
        later.expires_at = Some(Utc::now() + Duration::days(7));
        assert!(match_score(&soon, &request, None) > match_score(&later, &request, None));
    }

    #[test]
    fn closer_donors_score_higher() {
        let request = test_request("grains", 10.0);
        let item = test_item("grains", 10.0);
        let near = match_score(&item, &request, Some(2.0));
        let far = match_score(&item, &request, Some(45.0));
        let very_far = match_score(&item, &request, Some(500.0));
        assert!(near > far);
        assert!(far > very_far);
    }

    #[test]
    fn score_stays_in_range() {
        let request = test_request("grains", 10.0);
        let mut item = test_item("grains", 100.0);
        item.expires_at = Some(Utc::now() + Duration::hours(1));
        let best = match_score(&item, &request, Some(0.0));
        assert!((best - 100.0).abs() < 1e-9);

        let mut worst_item = test_item("dairy", 0.0);
        worst_item.expires_at = Some(Utc::now() - Duration::hours(1));
        let worst = match_score(&worst_item, &request, Some(1000.0));
        assert_eq!(worst, 0.0);
    }

    #[test]
    fn haversine_matches_known_distance() {
        // London to Paris, roughly 344 km.
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 344.0).abs() < 5.0);
    }
}
