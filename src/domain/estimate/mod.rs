//! Estimate orchestration: runs the calculators a job needs, accumulates
//! line items and derives totals and quoting variants.

use tracing::{debug, warn};

use super::entities::{
    sum_costs, EstimateBreakdownItem, EstimateInput, EstimateOutput, PatchMaterial,
    RoundedVariant,
};
use super::operations::{
    compute_fuel_and_equipment, compute_labor, compute_transport_load, FuelParams, TravelRouting,
};
use super::productivity::{ProductivityModel, StandardProductivity};
use super::profile::BusinessProfile;
use super::services::{
    compute_crack_fill, compute_patching, compute_sealcoat_materials, compute_striping,
    patch_base_rate, push_nonzero, CrackFillUnitCosts, SealcoatUnitCosts, StripingParams,
};
use super::validation::{validate_input, EstimateError};
use crate::util::{ceil_to, round2};

#[cfg(test)]
mod tests;

/// Share of single-coat material each additional coat needs.
pub const EXTRA_COAT_MATERIAL_FACTOR: f64 = 0.9;
pub const MARKUP_VARIANT_PCT: f64 = 0.25;
pub const QUOTE_ROUNDING_STEP: f64 = 10.0;

const STANDARD_NOTES: [&str; 3] = [
    "Estimate valid for 30 days. Subject to site inspection.",
    "Coverage and material usage may vary with pavement age and porosity.",
    "Travel distances and fuel calculations are estimates; actual costs may vary.",
];

/// Per-call values with profile defaults filled in.
#[derive(Clone, Debug)]
struct ResolvedRates {
    porosity: f64,
    sealcoat: SealcoatUnitCosts,
    crack: CrackFillUnitCosts,
    crack_rate_per_foot: f64,
    propane_cost_per_hour: f64,
    line_rate_per_foot: f64,
    mobilization_fee: f64,
    overhead_pct: f64,
    profit_pct: f64,
    sales_tax_pct: f64,
    num_full_time: u32,
    num_part_time: u32,
    hourly_rate: f64,
    fuel: FuelParams,
}

impl ResolvedRates {
    fn resolve(input: &EstimateInput, profile: &BusinessProfile) -> Self {
        let materials = &profile.materials;
        let pricing = &profile.pricing;
        let fuel = &profile.fuel;

        let routing = if input.leg_based_routing {
            TravelRouting::LegBased {
                heavy_total_miles: input.leg_heavy_total_miles,
                heavy_loaded_miles: input.leg_heavy_loaded_miles,
                light_total_miles: input.leg_light_total_miles,
            }
        } else {
            TravelRouting::RoundTrip {
                supplier_miles: input
                    .round_trip_miles_supplier
                    .unwrap_or(profile.travel_defaults.round_trip_miles_supplier),
                job_miles: input.round_trip_miles_job,
            }
        };

        Self {
            porosity: input
                .surface_porosity_factor
                .filter(|factor| *factor > 0.0)
                .unwrap_or(1.0),
            sealcoat: SealcoatUnitCosts {
                pmm_per_gallon: input
                    .pmm_price_per_gallon
                    .unwrap_or(materials.pmm_price_per_gallon),
                sand_per_bag: input
                    .sand_price_per_50lb_bag
                    .unwrap_or(materials.sand_price_per_50lb_bag),
                fast_dry_per_5gal: input
                    .fast_dry_price_per_5gal
                    .unwrap_or(materials.fast_dry_price_per_5gal),
                prep_seal_per_5gal: input
                    .prep_seal_price_per_5gal
                    .unwrap_or(materials.prep_seal_price_per_5gal),
            },
            crack: CrackFillUnitCosts {
                box_30lb: input
                    .crack_box_price_per_30lb
                    .unwrap_or(materials.crack_box_price_per_30lb),
                propane_tank: input.propane_per_tank.unwrap_or(materials.propane_per_tank),
            },
            crack_rate_per_foot: input
                .crack_fill_rate_per_foot
                .unwrap_or(pricing.crack_fill_rate_per_foot),
            propane_cost_per_hour: input.propane_cost_per_hour.unwrap_or(0.0),
            line_rate_per_foot: input
                .line_cost_per_linear_foot
                .unwrap_or(pricing.line_cost_per_linear_foot),
            mobilization_fee: input.mobilization_fee.unwrap_or(pricing.mobilization_fee),
            overhead_pct: input.overhead_pct.unwrap_or(pricing.overhead_pct),
            profit_pct: input.profit_pct.unwrap_or(pricing.profit_pct),
            sales_tax_pct: input.sales_tax_pct.unwrap_or(pricing.sales_tax_pct),
            num_full_time: input.num_full_time.unwrap_or(profile.crew.num_full_time),
            num_part_time: input.num_part_time.unwrap_or(profile.crew.num_part_time),
            hourly_rate: input
                .hourly_rate_per_person
                .unwrap_or(profile.crew.hourly_rate_per_person),
            fuel: FuelParams {
                heavy_mpg: input.heavy_mpg_loaded.unwrap_or(fuel.heavy_mpg_loaded),
                light_mpg: input.light_mpg.unwrap_or(fuel.light_mpg),
                mpg_degrade_loaded_pct: input
                    .mpg_degrade_loaded_pct
                    .unwrap_or(fuel.mpg_degrade_loaded_pct),
                trailer_mpg_modifier_pct: input.trailer_mpg_modifier_pct.unwrap_or(0.0),
                fuel_price_per_gallon: input
                    .fuel_price_per_gallon
                    .unwrap_or(fuel.default_fuel_price_per_gallon),
                routing,
                active_hours: input.sealer_active_hours,
                active_gallons_per_hour: input
                    .equipment_active_fuel_gph
                    .unwrap_or(fuel.equipment_active_fuel_gph),
                idle_hours: input.excessive_idle_hours,
                idle_cost_per_hour: input
                    .excessive_idle_cost_per_hour
                    .unwrap_or(fuel.excessive_idle_cost_per_hour),
            },
        }
    }
}

fn pct_label(fraction: f64) -> String {
    format!("{}%", round2(fraction * 100.0))
}

/// Overhead, profit, optional sales tax and total for a cost subtotal.
#[derive(Clone, Debug, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub overhead: EstimateBreakdownItem,
    pub profit: EstimateBreakdownItem,
    pub sales_tax: Option<EstimateBreakdownItem>,
    pub total: f64,
}

/// Overhead is charged on the subtotal; profit on subtotal plus overhead;
/// sales tax, when given, on everything before it.
pub fn compute_totals(
    subtotal: f64,
    overhead_pct: f64,
    profit_pct: f64,
    sales_tax_pct: Option<f64>,
) -> Totals {
    let subtotal = round2(subtotal);
    let overhead = EstimateBreakdownItem::flat(
        format!("Overhead ({})", pct_label(overhead_pct)),
        subtotal * overhead_pct,
    );
    let profit = EstimateBreakdownItem::flat(
        format!("Profit ({})", pct_label(profit_pct)),
        (subtotal + overhead.cost) * profit_pct,
    );
    let before_tax = round2(subtotal + overhead.cost + profit.cost);
    let sales_tax = sales_tax_pct.filter(|pct| *pct > 0.0).map(|pct| {
        EstimateBreakdownItem::flat(format!("Sales Tax ({})", pct_label(pct)), before_tax * pct)
    });
    let total = round2(before_tax + sales_tax.as_ref().map_or(0.0, |tax| tax.cost));

    Totals {
        subtotal,
        overhead,
        profit,
        sales_tax,
        total,
    }
}

/// Total rounded up to the next $10 for verbal quoting, with the margin the
/// rounding adds.
pub fn rounded_variant(total: f64) -> RoundedVariant {
    let rounded_total = ceil_to(total, QUOTE_ROUNDING_STEP);
    let implied_markup_pct = if total == 0.0 {
        0.0
    } else {
        round2((rounded_total - total) / total * 100.0)
    };
    RoundedVariant {
        rounded_total,
        implied_markup_pct,
        rounded_plus_25pct: ceil_to(
            rounded_total * (1.0 + MARKUP_VARIANT_PCT),
            QUOTE_ROUNDING_STEP,
        ),
    }
}

/// Builds an estimate with the standard crew throughput assumptions.
pub fn build_estimate(
    input: &EstimateInput,
    profile: &BusinessProfile,
) -> Result<EstimateOutput, EstimateError> {
    build_estimate_with(input, profile, &StandardProductivity::default())
}

/// Builds an estimate for one job.
///
/// The profile is only read. Each call is independent: identical inputs
/// produce identical output.
pub fn build_estimate_with(
    input: &EstimateInput,
    profile: &BusinessProfile,
    productivity: &dyn ProductivityModel,
) -> Result<EstimateOutput, EstimateError> {
    validate_input(input)?;
    profile.validate()?;

    let rates = ResolvedRates::resolve(input, profile);
    let service = input.service_type;

    let mut description = Vec::new();
    let mut materials = Vec::new();
    let mut services = Vec::new();
    let mut labor = Vec::new();
    let mut equipment_and_fuel = Vec::new();
    let mut mobilization = Vec::new();
    let mut labor_hours = 0.0;

    let mut payload = None;

    if service.includes_sealcoating() {
        let square_feet = input.sealcoat_square_feet;
        let sealcoat = compute_sealcoat_materials(
            square_feet,
            rates.porosity,
            input.oil_spot_square_feet,
            &rates.sealcoat,
            &profile.mix,
            &profile.coverage,
        );
        let single_coat_cost = sealcoat.material_cost();
        materials.extend(sealcoat.items.iter().cloned());

        let extra_coats = input.coats.saturating_sub(1);
        if extra_coats > 0 {
            push_nonzero(
                &mut materials,
                EstimateBreakdownItem::flat(
                    format!("Additional coats ({extra_coats})"),
                    single_coat_cost * f64::from(extra_coats) * EXTRA_COAT_MATERIAL_FACTOR,
                )
                .with_notes(format!(
                    "{extra_coats} extra coat(s) at {} of single-coat material",
                    pct_label(EXTRA_COAT_MATERIAL_FACTOR)
                )),
            );
        }

        let load_factor = 1.0 + f64::from(extra_coats) * EXTRA_COAT_MATERIAL_FACTOR;
        payload = Some((
            sealcoat.concentrate_gallons * load_factor,
            sealcoat.water_gallons * load_factor,
            sealcoat.sand_bags * load_factor,
        ));

        let mut hours = productivity.sealcoat_hours(square_feet);
        if let Some(method) = input.application_method {
            hours *= method.labor_factor();
        }
        labor_hours += hours;

        description.push(if input.coats > 1 {
            format!("Sealcoating {square_feet} sq ft ({} coats).", input.coats)
        } else {
            format!("Sealcoating {square_feet} sq ft.")
        });
    }

    if service.includes_crack_filling() && input.crack_linear_feet > 0.0 {
        let linear_feet = input.crack_linear_feet;
        let crack = compute_crack_fill(linear_feet, &rates.crack, rates.crack_rate_per_foot);
        materials.extend(crack.items);
        push_nonzero(
            &mut materials,
            EstimateBreakdownItem::priced(
                "Propane (hours)",
                input.crack_hours,
                "hr",
                rates.propane_cost_per_hour,
            ),
        );
        push_nonzero(
            &mut services,
            EstimateBreakdownItem::priced(
                "Crack Filling",
                linear_feet,
                "lf",
                rates.crack_rate_per_foot,
            ),
        );
        labor_hours += productivity.crack_fill_hours(linear_feet);
        description.push(format!("Crack filling {linear_feet} linear ft."));
    }

    if service.includes_patching() && input.patch_square_feet > 0.0 {
        let square_feet = input.patch_square_feet;
        let base_rate =
            patch_base_rate(&profile.pricing, input.patch_material, input.patching_per_sqft);
        let patch = compute_patching(square_feet, base_rate, input.patch_thickness_inches);
        push_nonzero(
            &mut services,
            EstimateBreakdownItem::priced("Patching", square_feet, "sqft", patch.unit_price)
                .with_notes(format!(
                    "{}\" thick @ ${}/sq ft baseline",
                    patch.thickness_inches, patch.base_rate_per_sqft
                )),
        );
        if input.patch_tack_coat {
            push_nonzero(
                &mut materials,
                EstimateBreakdownItem::priced(
                    "Tack Coat",
                    square_feet,
                    "sqft",
                    profile.pricing.tack_coat_per_sqft,
                ),
            );
        }
        if input.patch_additive {
            push_nonzero(
                &mut materials,
                EstimateBreakdownItem::priced(
                    "Patch Additive",
                    square_feet,
                    "sqft",
                    profile.pricing.patch_additive_per_sqft,
                ),
            );
        }
        labor_hours += productivity.patching_hours(square_feet);
        let mix = match input.patch_material {
            Some(PatchMaterial::Hot) => " hot mix",
            Some(PatchMaterial::Cold) => " cold mix",
            None => "",
        };
        description.push(format!("Patching {square_feet} sq ft{mix}."));
    }

    if service.includes_striping() {
        let params = StripingParams {
            num_standard_stalls: input.num_standard_stalls,
            num_double_stalls: input.num_double_stalls,
            num_handicap_spots: input.num_handicap_spots,
            num_crosswalks: input.crosswalk_count(),
            num_stop_bars: input.num_stop_bars,
            num_text_stencils: input.num_text_stencils,
            num_arrows: input.num_arrows,
            stall_size: input.stall_size.as_deref(),
            paint_color: input.paint_color.as_deref(),
        };
        let striping = compute_striping(&params, rates.line_rate_per_foot, &profile.pricing);
        push_nonzero(
            &mut services,
            EstimateBreakdownItem::flat("Line Striping", striping.sell_price).with_notes(format!(
                "{} LF @ ${}/LF + ${} extras + ${} color premium",
                striping.linear_feet,
                rates.line_rate_per_foot,
                round2(striping.extras),
                round2(striping.color_delta)
            )),
        );
        labor_hours += productivity.striping_hours(striping.linear_feet);
        description.push(format!(
            "Line striping ~{} LF with extras.",
            striping.linear_feet
        ));
    }

    if input.waste_factor_pct > 0.0 {
        let waste = sum_costs(&materials) * input.waste_factor_pct;
        push_nonzero(
            &mut materials,
            EstimateBreakdownItem::flat(
                format!("Material waste ({})", pct_label(input.waste_factor_pct)),
                waste,
            ),
        );
    }

    let crew = compute_labor(
        labor_hours,
        rates.num_full_time,
        rates.num_part_time,
        rates.hourly_rate,
        "Crew Labor",
    );
    push_nonzero(&mut labor, crew.item);

    let fuel = compute_fuel_and_equipment(&rates.fuel);
    equipment_and_fuel.extend(fuel.items);

    push_nonzero(
        &mut mobilization,
        EstimateBreakdownItem::flat("Mobilization", rates.mobilization_fee),
    );

    let subtotal = sum_costs(&materials)
        + sum_costs(&services)
        + sum_costs(&labor)
        + sum_costs(&equipment_and_fuel)
        + sum_costs(&mobilization);
    let totals = compute_totals(
        subtotal,
        rates.overhead_pct,
        rates.profit_pct,
        input.apply_sales_tax.then_some(rates.sales_tax_pct),
    );

    let transport_load = match payload {
        Some((concentrate, water, sand_bags))
            if input.include_transport_weight_check && concentrate > 0.0 =>
        {
            Some(compute_transport_load(
                concentrate,
                water,
                sand_bags,
                &profile.equipment,
                &profile.vehicles.heavy,
            ))
        }
        _ => None,
    };

    let mut notes: Vec<String> = STANDARD_NOTES.iter().map(|note| note.to_string()).collect();
    if let Some(load) = transport_load.as_ref().filter(|load| load.exceeds_likely_gvwr) {
        warn!(
            total_weight_lbs = load.total_weight_lbs,
            "estimated transport weight exceeds likely GVWR"
        );
        notes.push(format!(
            "Transport weight of ~{} lbs may exceed the truck's GVWR; split the load.",
            load.total_weight_lbs
        ));
    }
    if rates.num_part_time > 0 {
        notes.push("Part-time crew is billed at the same hourly rate as full-time crew.".to_string());
    }

    debug!(
        service = %service,
        labor_hours,
        subtotal = totals.subtotal,
        total = totals.total,
        "built estimate"
    );

    Ok(EstimateOutput {
        project_description: description.join(" "),
        materials,
        services,
        labor,
        equipment_and_fuel,
        mobilization,
        subtotal: totals.subtotal,
        overhead: totals.overhead,
        profit: totals.profit,
        sales_tax: totals.sales_tax,
        total: totals.total,
        total_with_25pct_markup: round2(totals.total * (1.0 + MARKUP_VARIANT_PCT)),
        rounded_variant: rounded_variant(totals.total),
        transport_load,
        notes,
    })
}
