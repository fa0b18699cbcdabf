//! Workforce Rules Engine
//!
//! Business rules for a plant's administration system: monthly payroll
//! calculation, exam scoring, the tool stock ledger, approval workflows,
//! spreadsheet imports with duplicate detection, and login lockout. The
//! rules are plain functions over the [`models`]; [`services`] apply them to
//! the [`store`], and [`api`] exposes both over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod calculation;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod services;
pub mod store;
pub mod workflow;
