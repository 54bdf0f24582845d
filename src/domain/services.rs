//! Per-service calculators: sealcoat materials, crack filling, patching and
//! line striping. Each one is a pure function of its quantities and the
//! resolved unit costs.

use serde::{Deserialize, Serialize};

use super::entities::{EstimateBreakdownItem, PatchMaterial};
use super::profile::{CoverageRates, MixGuidelines, PricingBaselines};
use crate::util::{round2, whole_units};

/// Feet of crack one 30 lb box of filler covers (conservative).
pub const CRACK_LF_PER_BOX: f64 = 150.0;
/// Boxes melted per propane tank.
pub const BOXES_PER_PROPANE_TANK: f64 = 2.0;
/// Thickness the patching rates are quoted at.
pub const PATCH_BASELINE_THICKNESS_IN: f64 = 2.0;

pub(crate) fn push_nonzero(items: &mut Vec<EstimateBreakdownItem>, item: EstimateBreakdownItem) {
    if item.cost != 0.0 {
        items.push(item);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SealcoatUnitCosts {
    pub pmm_per_gallon: f64,
    pub sand_per_bag: f64,
    pub fast_dry_per_5gal: f64,
    pub prep_seal_per_5gal: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealcoatMaterials {
    pub items: Vec<EstimateBreakdownItem>,
    pub mixed_gallons: f64,
    pub concentrate_gallons: f64,
    pub water_gallons: f64,
    /// Unrounded sand requirement, kept for weight calculations.
    pub sand_bags: f64,
    pub sand_bags_purchased: f64,
    pub fast_dry_buckets: f64,
    pub prep_seal_buckets: f64,
}

impl SealcoatMaterials {
    pub fn material_cost(&self) -> f64 {
        round2(self.items.iter().map(|item| item.cost).sum())
    }
}

/// Converts square footage into concentrate, water, sand, fast-dry and
/// prep-seal quantities and prices them.
///
/// Mixed volume is concentrate plus water, so the concentrate share is
/// `mixed / (1 + water%)`. Bags and buckets are rounded up for purchase.
pub fn compute_sealcoat_materials(
    square_feet: f64,
    porosity_factor: f64,
    oil_spot_square_feet: f64,
    costs: &SealcoatUnitCosts,
    mix: &MixGuidelines,
    coverage: &CoverageRates,
) -> SealcoatMaterials {
    let porosity = if porosity_factor > 0.0 {
        porosity_factor
    } else {
        1.0
    };
    let effective_coverage = coverage.mixed_sealer_coverage_sqft_per_gal / porosity;
    let mixed_gallons = square_feet / effective_coverage;
    let concentrate_gallons = mixed_gallons / (1.0 + mix.water_percent);
    let water_gallons = concentrate_gallons * mix.water_percent;

    let sand_bags = concentrate_gallons / 100.0 * mix.sand_bags_per_100gal_concentrate;
    let sand_bags_purchased = whole_units(sand_bags);

    let fast_dry_gallons =
        concentrate_gallons / 125.0 * mix.fast_dry_gal_per_125gal_concentrate;
    let fast_dry_buckets = whole_units(fast_dry_gallons / 5.0);

    let prep_seal_buckets = if oil_spot_square_feet > 0.0 {
        whole_units(oil_spot_square_feet / coverage.prep_seal_coverage_sqft_per_gal / 5.0)
    } else {
        0.0
    };

    let mut items = Vec::new();
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::priced(
            "SealMaster PMM Concentrate",
            round2(concentrate_gallons),
            "gal",
            costs.pmm_per_gallon,
        )
        .with_notes(format!(
            "{:.0}% water ({} gal) assumed; sand added per guidelines",
            mix.water_percent * 100.0,
            round2(water_gallons)
        )),
    );
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::priced(
            "Sand (50 lb bags)",
            sand_bags_purchased,
            "bag",
            costs.sand_per_bag,
        ),
    );
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::priced(
            "Fast Dry Additive (5 gal)",
            fast_dry_buckets,
            "bucket",
            costs.fast_dry_per_5gal,
        ),
    );
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::priced(
            "Prep Seal (5 gal)",
            prep_seal_buckets,
            "bucket",
            costs.prep_seal_per_5gal,
        )
        .with_notes(format!("{oil_spot_square_feet} sq ft of oil spots")),
    );

    SealcoatMaterials {
        items,
        mixed_gallons,
        concentrate_gallons,
        water_gallons,
        sand_bags,
        sand_bags_purchased,
        fast_dry_buckets,
        prep_seal_buckets,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrackFillUnitCosts {
    pub box_30lb: f64,
    pub propane_tank: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CrackFill {
    pub boxes: f64,
    pub propane_tanks: f64,
    pub items: Vec<EstimateBreakdownItem>,
    pub material_cost: f64,
    /// Market price for the work, independent of material cost.
    pub sell_price: f64,
}

pub fn compute_crack_fill(
    linear_feet: f64,
    costs: &CrackFillUnitCosts,
    rate_per_foot: f64,
) -> CrackFill {
    let boxes = whole_units(linear_feet / CRACK_LF_PER_BOX);
    let propane_tanks = if boxes == 0.0 {
        0.0
    } else {
        whole_units(boxes / BOXES_PER_PROPANE_TANK).max(1.0)
    };

    let mut items = Vec::new();
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::priced(
            "Crack Filler (30 lb boxes)",
            boxes,
            "box",
            costs.box_30lb,
        ),
    );
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::priced(
            "Propane Tanks",
            propane_tanks,
            "tank",
            costs.propane_tank,
        ),
    );

    let material_cost = round2(boxes * costs.box_30lb + propane_tanks * costs.propane_tank);

    CrackFill {
        boxes,
        propane_tanks,
        items,
        material_cost,
        sell_price: round2(linear_feet * rate_per_foot),
    }
}

/// Rate per square foot at the 2" baseline. A per-call override wins, then
/// the profile's hot/cold rate for the chosen mix, then the generic rate.
pub fn patch_base_rate(
    pricing: &PricingBaselines,
    material: Option<PatchMaterial>,
    rate_override: Option<f64>,
) -> f64 {
    if let Some(rate) = rate_override {
        return rate;
    }
    let material_rate = match material {
        Some(PatchMaterial::Hot) => pricing.patching_hot_per_sqft,
        Some(PatchMaterial::Cold) => pricing.patching_cold_per_sqft,
        None => None,
    };
    material_rate.unwrap_or(pricing.patching_per_sqft)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Patching {
    pub base_rate_per_sqft: f64,
    pub thickness_inches: f64,
    /// Base rate scaled to the requested thickness.
    pub unit_price: f64,
    pub sell_price: f64,
}

/// Patching sell price scales linearly with thickness against the 2"
/// baseline.
pub fn compute_patching(
    square_feet: f64,
    base_rate_per_sqft: f64,
    thickness_inches: Option<f64>,
) -> Patching {
    let thickness_inches = thickness_inches
        .filter(|inches| *inches > 0.0)
        .unwrap_or(PATCH_BASELINE_THICKNESS_IN);
    let unit_price = base_rate_per_sqft * (thickness_inches / PATCH_BASELINE_THICKNESS_IN);
    Patching {
        base_rate_per_sqft,
        thickness_inches,
        unit_price,
        sell_price: round2(square_feet * unit_price),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StripingParams<'a> {
    pub num_standard_stalls: u32,
    pub num_double_stalls: u32,
    pub num_handicap_spots: u32,
    pub num_crosswalks: u32,
    pub num_stop_bars: u32,
    pub num_text_stencils: u32,
    pub num_arrows: u32,
    pub stall_size: Option<&'a str>,
    pub paint_color: Option<&'a str>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Striping {
    pub linear_feet: f64,
    pub extras: f64,
    pub color_delta: f64,
    pub sell_price: f64,
}

pub fn compute_striping(
    params: &StripingParams<'_>,
    rate_per_linear_foot: f64,
    pricing: &PricingBaselines,
) -> Striping {
    let catalog = &pricing.stencil_catalog;
    let linear_feet = f64::from(params.num_standard_stalls) * catalog.stall_lf(params.stall_size)
        + f64::from(params.num_double_stalls) * catalog.double_stall_lf;

    let extras = f64::from(params.num_handicap_spots) * pricing.handicap_symbol_cost
        + f64::from(params.num_crosswalks) * pricing.crosswalk_cost
        + f64::from(params.num_stop_bars) * pricing.stop_bar_cost
        + f64::from(params.num_text_stencils) * pricing.text_stencil_cost
        + f64::from(params.num_arrows) * pricing.arrow_cost;

    let color_delta = pricing.paint_color_delta(params.paint_color) * linear_feet;

    Striping {
        linear_feet,
        extras,
        color_delta,
        sell_price: round2(linear_feet * rate_per_linear_foot + extras + color_delta),
    }
}
