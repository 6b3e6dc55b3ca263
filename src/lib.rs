//! Staffer: a staffing marketplace API.
//!
//! Companies post paid shifts, workers apply, and accepted work flows through
//! timesheets into payment ledger rows. Workers prove their identity through
//! a photo verification wizard screened by the background worker and
//! reviewed by admins.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
