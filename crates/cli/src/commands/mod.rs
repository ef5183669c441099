//! CLI Commands

pub mod smoke;
pub mod suite;
