//! Data models for the CRM entities.
//!
//! This module contains the data structures persisted by the store:
//!
//! - `Lead`, `Followup`: prospect records and their follow-up log
//! - `Project`: development listings with rate/PLC/floor-rise pricing
//! - `Profile`, `ProfilePatch`: the singleton business profile

pub mod lead;
pub mod profile;
pub mod project;

pub use lead::{Followup, Lead};
pub use profile::{Profile, ProfilePatch};
pub use project::{PlcCharge, Project, Rate, RateBasis};
