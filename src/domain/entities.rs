use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::validation::EstimateError;
use crate::util::round2;

/// Kind of job requested. Combo types bundle several services into one job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "sealcoating")]
    Sealcoating,
    #[serde(rename = "crack_filling")]
    CrackFilling,
    #[serde(rename = "patching")]
    Patching,
    #[serde(rename = "line_striping")]
    LineStriping,
    /// Sealcoat + crack fill + patch.
    #[serde(rename = "combo_driveway")]
    ComboDriveway,
    /// Sealcoat + crack fill + patch + striping.
    #[serde(rename = "combo_parkinglot")]
    ComboParkingLot,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::Sealcoating,
        ServiceType::CrackFilling,
        ServiceType::Patching,
        ServiceType::LineStriping,
        ServiceType::ComboDriveway,
        ServiceType::ComboParkingLot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sealcoating => "sealcoating",
            Self::CrackFilling => "crack_filling",
            Self::Patching => "patching",
            Self::LineStriping => "line_striping",
            Self::ComboDriveway => "combo_driveway",
            Self::ComboParkingLot => "combo_parkinglot",
        }
    }

    pub fn includes_sealcoating(&self) -> bool {
        matches!(
            self,
            Self::Sealcoating | Self::ComboDriveway | Self::ComboParkingLot
        )
    }

    pub fn includes_crack_filling(&self) -> bool {
        matches!(
            self,
            Self::CrackFilling | Self::ComboDriveway | Self::ComboParkingLot
        )
    }

    pub fn includes_patching(&self) -> bool {
        matches!(
            self,
            Self::Patching | Self::ComboDriveway | Self::ComboParkingLot
        )
    }

    pub fn includes_striping(&self) -> bool {
        matches!(self, Self::LineStriping | Self::ComboParkingLot)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = EstimateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service| service.as_str() == value)
            .ok_or_else(|| {
                EstimateError::input("serviceType", format!("unknown service type `{value}`"))
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchMaterial {
    Hot,
    Cold,
}

/// How sealer is put down. Spraying is faster than squeegeeing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMethod {
    Spray,
    Squeegee,
}

impl ApplicationMethod {
    pub fn labor_factor(&self) -> f64 {
        match self {
            Self::Spray => 0.9,
            Self::Squeegee => 1.1,
        }
    }
}

fn default_coats() -> u32 {
    1
}

/// One job request. Every `Option` rate falls back to the business profile.
///
/// Striping extras, tack coat, patch additive and the hot/cold patching rates
/// have no per-call field; price them through
/// [`BusinessProfile::with_overrides`](super::profile::BusinessProfile::with_overrides).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateInput {
    pub service_type: ServiceType,

    // Areas and lengths
    #[serde(default)]
    pub sealcoat_square_feet: f64,
    #[serde(default)]
    pub patch_square_feet: f64,
    #[serde(default)]
    pub crack_linear_feet: f64,

    // Sealcoat options
    #[serde(default = "default_coats")]
    pub coats: u32,
    #[serde(default)]
    pub waste_factor_pct: f64,
    #[serde(default)]
    pub application_method: Option<ApplicationMethod>,

    // Patching options
    #[serde(default)]
    pub patch_material: Option<PatchMaterial>,
    #[serde(default)]
    pub patch_thickness_inches: Option<f64>,
    #[serde(default)]
    pub patch_tack_coat: bool,
    #[serde(default)]
    pub patch_additive: bool,

    // Crack filling options
    #[serde(default)]
    pub crack_hours: f64,
    #[serde(default)]
    pub propane_cost_per_hour: Option<f64>,

    // Line striping
    #[serde(default)]
    pub num_standard_stalls: u32,
    #[serde(default)]
    pub num_double_stalls: u32,
    #[serde(default)]
    pub num_handicap_spots: u32,
    /// Counts as one crosswalk when `num_crosswalks` is zero.
    #[serde(default)]
    pub has_crosswalks: bool,
    #[serde(default)]
    pub num_crosswalks: u32,
    #[serde(default)]
    pub num_stop_bars: u32,
    #[serde(default)]
    pub num_text_stencils: u32,
    #[serde(default)]
    pub num_arrows: u32,
    #[serde(default)]
    pub stall_size: Option<String>,
    #[serde(default)]
    pub paint_color: Option<String>,

    // Site conditions
    #[serde(default)]
    pub oil_spot_square_feet: f64,
    #[serde(default)]
    pub surface_porosity_factor: Option<f64>,

    // Crew & labor
    #[serde(default)]
    pub num_full_time: Option<u32>,
    #[serde(default)]
    pub num_part_time: Option<u32>,
    #[serde(default)]
    pub hourly_rate_per_person: Option<f64>,

    // Travel & fuel
    #[serde(default)]
    pub round_trip_miles_supplier: Option<f64>,
    #[serde(default)]
    pub round_trip_miles_job: f64,
    #[serde(default)]
    pub heavy_mpg_loaded: Option<f64>,
    #[serde(default)]
    pub light_mpg: Option<f64>,
    #[serde(default)]
    pub mpg_degrade_loaded_pct: Option<f64>,
    /// Signed fraction applied to both vehicles' mpg; negative for drag.
    #[serde(default)]
    pub trailer_mpg_modifier_pct: Option<f64>,
    #[serde(default)]
    pub fuel_price_per_gallon: Option<f64>,
    #[serde(default)]
    pub leg_based_routing: bool,
    #[serde(default)]
    pub leg_heavy_total_miles: f64,
    #[serde(default)]
    pub leg_heavy_loaded_miles: f64,
    #[serde(default)]
    pub leg_light_total_miles: f64,

    // Equipment operation
    #[serde(default)]
    pub sealer_active_hours: f64,
    #[serde(default)]
    pub equipment_active_fuel_gph: Option<f64>,
    #[serde(default)]
    pub excessive_idle_hours: f64,
    #[serde(default)]
    pub excessive_idle_cost_per_hour: Option<f64>,

    // Unit pricing overrides
    #[serde(default)]
    pub pmm_price_per_gallon: Option<f64>,
    #[serde(default)]
    pub sand_price_per_50lb_bag: Option<f64>,
    #[serde(default)]
    pub fast_dry_price_per_5gal: Option<f64>,
    #[serde(default)]
    pub prep_seal_price_per_5gal: Option<f64>,
    #[serde(default)]
    pub crack_box_price_per_30lb: Option<f64>,
    #[serde(default)]
    pub propane_per_tank: Option<f64>,
    #[serde(default)]
    pub crack_fill_rate_per_foot: Option<f64>,
    #[serde(default)]
    pub patching_per_sqft: Option<f64>,
    #[serde(default)]
    pub line_cost_per_linear_foot: Option<f64>,
    #[serde(default)]
    pub mobilization_fee: Option<f64>,
    #[serde(default)]
    pub overhead_pct: Option<f64>,
    #[serde(default)]
    pub profit_pct: Option<f64>,

    // Options
    #[serde(default)]
    pub include_transport_weight_check: bool,
    #[serde(default)]
    pub apply_sales_tax: bool,
    #[serde(default)]
    pub sales_tax_pct: Option<f64>,
}

impl EstimateInput {
    /// A request with no quantities; every rate comes from the profile.
    pub fn new(service_type: ServiceType) -> Self {
        Self {
            service_type,
            sealcoat_square_feet: 0.0,
            patch_square_feet: 0.0,
            crack_linear_feet: 0.0,
            coats: default_coats(),
            waste_factor_pct: 0.0,
            application_method: None,
            patch_material: None,
            patch_thickness_inches: None,
            patch_tack_coat: false,
            patch_additive: false,
            crack_hours: 0.0,
            propane_cost_per_hour: None,
            num_standard_stalls: 0,
            num_double_stalls: 0,
            num_handicap_spots: 0,
            has_crosswalks: false,
            num_crosswalks: 0,
            num_stop_bars: 0,
            num_text_stencils: 0,
            num_arrows: 0,
            stall_size: None,
            paint_color: None,
            oil_spot_square_feet: 0.0,
            surface_porosity_factor: None,
            num_full_time: None,
            num_part_time: None,
            hourly_rate_per_person: None,
            round_trip_miles_supplier: None,
            round_trip_miles_job: 0.0,
            heavy_mpg_loaded: None,
            light_mpg: None,
            mpg_degrade_loaded_pct: None,
            trailer_mpg_modifier_pct: None,
            fuel_price_per_gallon: None,
            leg_based_routing: false,
            leg_heavy_total_miles: 0.0,
            leg_heavy_loaded_miles: 0.0,
            leg_light_total_miles: 0.0,
            sealer_active_hours: 0.0,
            equipment_active_fuel_gph: None,
            excessive_idle_hours: 0.0,
            excessive_idle_cost_per_hour: None,
            pmm_price_per_gallon: None,
            sand_price_per_50lb_bag: None,
            fast_dry_price_per_5gal: None,
            prep_seal_price_per_5gal: None,
            crack_box_price_per_30lb: None,
            propane_per_tank: None,
            crack_fill_rate_per_foot: None,
            patching_per_sqft: None,
            line_cost_per_linear_foot: None,
            mobilization_fee: None,
            overhead_pct: None,
            profit_pct: None,
            include_transport_weight_check: false,
            apply_sales_tax: false,
            sales_tax_pct: None,
        }
    }

    pub fn crosswalk_count(&self) -> u32 {
        if self.num_crosswalks == 0 && self.has_crosswalks {
            1
        } else {
            self.num_crosswalks
        }
    }
}

/// One priced line of an estimate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateBreakdownItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl EstimateBreakdownItem {
    /// Line whose cost is `round2(quantity * unit_cost)`.
    pub fn priced(label: impl Into<String>, quantity: f64, unit: &str, unit_cost: f64) -> Self {
        Self {
            label: label.into(),
            quantity: Some(quantity),
            unit: Some(unit.to_string()),
            unit_cost: Some(unit_cost),
            cost: round2(quantity * unit_cost),
            notes: None,
        }
    }

    /// Line with a directly supplied cost (fees, fuel totals, labor).
    pub fn flat(label: impl Into<String>, cost: f64) -> Self {
        Self {
            label: label.into(),
            quantity: None,
            unit: None,
            unit_cost: None,
            cost: round2(cost),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

pub fn sum_costs(items: &[EstimateBreakdownItem]) -> f64 {
    items.iter().map(|item| item.cost).sum()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundedVariant {
    /// Total rounded up to the next $10.
    pub rounded_total: f64,
    /// Extra margin introduced by rounding, in percent of the total.
    pub implied_markup_pct: f64,
    pub rounded_plus_25pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportLoad {
    pub total_weight_lbs: f64,
    pub notes: String,
    pub exceeds_likely_gvwr: bool,
}

/// Priced, itemized estimate for one job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateOutput {
    pub project_description: String,
    pub materials: Vec<EstimateBreakdownItem>,
    /// Market-rate sell lines for crack filling, patching and striping.
    pub services: Vec<EstimateBreakdownItem>,
    pub labor: Vec<EstimateBreakdownItem>,
    pub equipment_and_fuel: Vec<EstimateBreakdownItem>,
    pub mobilization: Vec<EstimateBreakdownItem>,
    pub subtotal: f64,
    pub overhead: EstimateBreakdownItem,
    pub profit: EstimateBreakdownItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_tax: Option<EstimateBreakdownItem>,
    pub total: f64,
    pub total_with_25pct_markup: f64,
    pub rounded_variant: RoundedVariant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_load: Option<TransportLoad>,
    pub notes: Vec<String>,
}
