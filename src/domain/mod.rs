//! Estimation domain: business profile, job requests, per-service
//! calculators and the estimate orchestrator.

pub mod entities;
pub mod estimate;
pub mod operations;
pub mod productivity;
pub mod profile;
pub mod services;
pub mod validation;

pub use entities::{
    ApplicationMethod, EstimateBreakdownItem, EstimateInput, EstimateOutput, PatchMaterial,
    RoundedVariant, ServiceType, TransportLoad,
};
pub use estimate::{build_estimate, build_estimate_with, compute_totals, rounded_variant, Totals};
pub use operations::{
    compute_fuel_and_equipment, compute_labor, compute_transport_load, FuelAndEquipment,
    FuelParams, Labor, TravelRouting,
};
pub use productivity::{ProductivityModel, StandardProductivity, Throughput};
pub use profile::BusinessProfile;
pub use services::{
    compute_crack_fill, compute_patching, compute_sealcoat_materials, compute_striping,
    patch_base_rate, CrackFill, CrackFillUnitCosts, Patching, SealcoatMaterials,
    SealcoatUnitCosts, Striping, StripingParams,
};
pub use validation::{validate_input, EstimateError};
