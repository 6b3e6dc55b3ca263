//! Worker availability and applicant ordering.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::models::application::Applicant;
use crate::models::relation::RelationKind;

/// Half-open interval overlap: a shift ending at 12:00 does not clash with
/// one starting at 12:00.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// First committed window that clashes with `candidate`, if any.
pub fn first_conflict<'a, I>(
    candidate: (DateTime<Utc>, DateTime<Utc>),
    committed: I,
) -> Option<(DateTime<Utc>, DateTime<Utc>)>
where
    I: IntoIterator<Item = &'a (DateTime<Utc>, DateTime<Utc>)>,
{
    committed
        .into_iter()
        .find(|(start, end)| overlaps(candidate.0, candidate.1, *start, *end))
        .copied()
}

fn relation_rank(relation: Option<RelationKind>) -> u8 {
    match relation {
        Some(RelationKind::Favorite) => 0,
        None => 1,
        Some(RelationKind::Blacklist) => 2,
    }
}

/// Order applicants for a hiring decision: favorites first and blacklisted
/// last, then higher average rating (unrated after rated), then earliest
/// application.
pub fn rank_applicants(applicants: &mut [Applicant]) {
    applicants.sort_by(|a, b| {
        relation_rank(a.relation)
            .cmp(&relation_rank(b.relation))
            .then_with(|| match (a.rating.average, b.rating.average) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.application.created_at.cmp(&b.application.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{Application, ApplicationStatus};
    use crate::models::profile::VerificationStatus;
    use crate::models::review::RatingSummary;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, hour, 0, 0).unwrap()
    }

    fn applicant(
        name: &str,
        relation: Option<RelationKind>,
        average: Option<f64>,
        applied_minutes_ago: i64,
    ) -> Applicant {
        let now = t(12);
        Applicant {
            application: Application {
                id: Uuid::new_v4(),
                shift_id: Uuid::nil(),
                worker_id: Uuid::new_v4(),
                status: ApplicationStatus::Pending,
                message: None,
                decided_at: None,
                created_at: now - Duration::minutes(applied_minutes_ago),
                updated_at: now,
            },
            worker_name: name.to_string(),
            verification_status: VerificationStatus::Verified,
            rating: RatingSummary::from_parts(average, i64::from(average.is_some())),
            relation,
        }
    }

    #[test]
    fn test_overlap_is_half_open() {
        assert!(overlaps(t(8), t(12), t(11), t(15)));
        assert!(overlaps(t(8), t(16), t(10), t(12)));
        assert!(!overlaps(t(8), t(12), t(12), t(16)));
        assert!(!overlaps(t(13), t(16), t(8), t(12)));
    }

    #[test]
    fn test_first_conflict() {
        let committed = vec![(t(6), t(8)), (t(14), t(18))];

        assert_eq!(first_conflict((t(9), t(13)), &committed), None);
        assert_eq!(
            first_conflict((t(12), t(15)), &committed),
            Some((t(14), t(18)))
        );
    }

    #[test]
    fn test_ranking_order() {
        let mut applicants = vec![
            applicant("blocked", Some(RelationKind::Blacklist), Some(5.0), 50),
            applicant("unrated", None, None, 40),
            applicant("good", None, Some(4.8), 10),
            applicant("ok", None, Some(3.9), 30),
            applicant("fav", Some(RelationKind::Favorite), Some(2.0), 5),
            applicant("good-early", None, Some(4.8), 20),
        ];

        rank_applicants(&mut applicants);

        let names: Vec<_> = applicants.iter().map(|a| a.worker_name.as_str()).collect();
        assert_eq!(
            names,
            ["fav", "good-early", "good", "ok", "unrated", "blocked"]
        );
    }
}
