//! Nutrilog Library
//!
//! Core engine for nutrient tracking: remote analysis job orchestration,
//! substance aggregation, reference comparison, composite scoring and
//! weekly report assembly.

pub mod analysis;
pub mod build_info;
pub mod db;
pub mod models;
pub mod nutrition;
pub mod report;
