use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub application_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[garde(range(min = 1, max = 5))]
    pub rating: i32,

    #[garde(length(max = 2000))]
    pub comment: Option<String>,
}

/// Average star rating, rounded to one decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
}

impl RatingSummary {
    pub fn from_parts(average: Option<f64>, count: i64) -> Self {
        Self {
            average: average
                .filter(|_| count > 0)
                .map(|avg| (avg * 10.0).round() / 10.0),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_rounds_to_one_decimal() {
        let summary = RatingSummary::from_parts(Some(4.666_666), 3);
        assert_eq!(summary.average, Some(4.7));
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn test_empty_summary_has_no_average() {
        assert_eq!(RatingSummary::from_parts(None, 0), RatingSummary::default());
        assert_eq!(RatingSummary::from_parts(Some(5.0), 0).average, None);
    }

    #[test]
    fn test_rating_bounds() {
        let ok = CreateReviewRequest { rating: 5, comment: None };
        let low = CreateReviewRequest { rating: 0, comment: None };
        let high = CreateReviewRequest { rating: 6, comment: None };

        assert!(ok.validate().is_ok());
        assert!(low.validate().is_err());
        assert!(high.validate().is_err());
    }
}
