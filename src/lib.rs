//! Credit Risk API Library
//!
//! Scores customer credit records read from the `clien` table and rolls the
//! scores up into portfolio statistics for the credit dashboard.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `circuit_breaker`: Circuit breaker for store queries.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Customer queries.
//! - `detail`: Single-customer detail view.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Records, assessments and response models.
//! - `portfolio`: Portfolio aggregation.
//! - `presentation`: JSON, date and currency formatting.
//! - `routes`: Router construction.
//! - `scoring`: Credit-risk scoring engine.

pub mod api;
pub mod core;

pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod detail;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod portfolio;
pub mod presentation;
pub mod routes;
pub mod scoring;
