//! Job cost estimation for a paving and sealcoating contractor.
//!
//! [`build_estimate`] turns an [`EstimateInput`] and a read-only
//! [`BusinessProfile`] snapshot into an itemized [`EstimateOutput`]. Every
//! calculator is a pure function, so estimates can be built concurrently
//! from shared references.

pub mod domain;
pub mod util;

pub use domain::{
    build_estimate, build_estimate_with, BusinessProfile, EstimateBreakdownItem, EstimateError,
    EstimateInput, EstimateOutput, ProductivityModel, ServiceType, StandardProductivity,
};
