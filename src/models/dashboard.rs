use serde::Serialize;

use super::profile::VerificationStatus;
use super::review::RatingSummary;

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Company(CompanyDashboard),
    Worker(WorkerDashboard),
    Admin(AdminDashboard),
}

#[derive(Debug, Default, Serialize)]
pub struct CompanyDashboard {
    pub open_shifts: i64,
    pub filled_shifts: i64,
    pub upcoming_shifts: i64,
    pub pending_applications: i64,
    pub submitted_timesheets: i64,
    pub pending_payments_cents: i64,
    pub paid_payments_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct WorkerDashboard {
    pub upcoming_shifts: i64,
    pub pending_applications: i64,
    pub completed_shifts: i64,
    pub pending_earnings_cents: i64,
    pub paid_earnings_cents: i64,
    pub rating: RatingSummary,
    pub verification_status: VerificationStatus,
}

#[derive(Debug, Default, Serialize)]
pub struct AdminDashboard {
    pub pending_verifications: i64,
    pub workers: i64,
    pub companies: i64,
    pub admins: i64,
}
