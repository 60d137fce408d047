//! Apartment evaluation comparison and scoring.
//!
//! [`comparison`] ranks one apartment against a cohort metric by metric and
//! [`scoring`] folds configured metrics into a weighted composite and a
//! recommendation. Both are pure; [`evaluations`] holds the record model,
//! derived figures and the service/HTTP layer that feeds them.

pub mod comparison;
pub mod config;
pub mod error;
pub mod evaluations;
pub mod scoring;
pub mod telemetry;
