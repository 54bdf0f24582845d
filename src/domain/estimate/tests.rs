use super::*;
use crate::domain::entities::{ApplicationMethod, ServiceType};

fn base_input() -> EstimateInput {
    EstimateInput {
        sealcoat_square_feet: 3000.0,
        round_trip_miles_supplier: Some(10.0),
        round_trip_miles_job: 10.0,
        fuel_price_per_gallon: Some(3.14),
        ..EstimateInput::new(ServiceType::Sealcoating)
    }
}

fn fuel_total(output: &EstimateOutput) -> f64 {
    sum_costs(&output.equipment_and_fuel)
}

fn find<'a>(items: &'a [EstimateBreakdownItem], label: &str) -> &'a EstimateBreakdownItem {
    items
        .iter()
        .find(|item| item.label == label)
        .unwrap_or_else(|| panic!("missing line `{label}`"))
}

#[test]
fn sealcoat_quantities_match_mix_guidelines() {
    let output = build_estimate(&base_input(), &BusinessProfile::default()).unwrap();

    let concentrate = find(&output.materials, "SealMaster PMM Concentrate");
    assert_eq!(concentrate.quantity, Some(32.89));
    assert_eq!(concentrate.unit_cost, Some(3.65));

    let sand = find(&output.materials, "Sand (50 lb bags)");
    assert_eq!(sand.quantity, Some(2.0));
    assert_eq!(sand.cost, 20.0);

    assert_eq!(output.project_description, "Sealcoating 3000 sq ft.");
    assert!(output.services.is_empty());
    assert_eq!(output.mobilization[0].cost, 250.0);
}

#[test]
fn crack_fill_materials_and_market_rate() {
    let input = EstimateInput {
        crack_linear_feet: 450.0,
        crack_box_price_per_30lb: Some(44.99),
        propane_per_tank: Some(10.0),
        ..EstimateInput::new(ServiceType::CrackFilling)
    };
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();

    assert_eq!(output.materials.len(), 2);
    assert_eq!(find(&output.materials, "Crack Filler (30 lb boxes)").quantity, Some(3.0));
    assert_eq!(find(&output.materials, "Propane Tanks").quantity, Some(2.0));
    assert_eq!(round2(sum_costs(&output.materials)), 154.97);
    assert_eq!(find(&output.services, "Crack Filling").cost, 787.5);
}

#[test]
fn striping_ten_stalls_sells_for_line_rate() {
    let input = EstimateInput {
        num_standard_stalls: 10,
        line_cost_per_linear_foot: Some(0.9),
        ..EstimateInput::new(ServiceType::LineStriping)
    };
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();
    assert_eq!(find(&output.services, "Line Striping").cost, 180.0);
    assert!(output.materials.is_empty());
    assert_eq!(output.project_description, "Line striping ~200 LF with extras.");
}

#[test]
fn overhead_profit_and_rounded_variant() {
    let input = EstimateInput {
        mobilization_fee: Some(1000.0),
        hourly_rate_per_person: Some(0.0),
        round_trip_miles_supplier: Some(0.0),
        overhead_pct: Some(0.10),
        profit_pct: Some(0.18),
        ..EstimateInput::new(ServiceType::LineStriping)
    };
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();

    assert!(output.labor.is_empty());
    assert!(output.equipment_and_fuel.is_empty());
    assert_eq!(output.subtotal, 1000.0);
    assert_eq!(output.overhead.cost, 100.0);
    assert_eq!(output.overhead.label, "Overhead (10%)");
    assert_eq!(output.profit.cost, 198.0);
    assert_eq!(output.profit.label, "Profit (18%)");
    assert_eq!(output.total, 1298.0);
    assert_eq!(output.total_with_25pct_markup, 1622.5);
    assert_eq!(output.rounded_variant.rounded_total, 1300.0);
    assert_eq!(output.rounded_variant.implied_markup_pct, 0.15);
    assert_eq!(output.rounded_variant.rounded_plus_25pct, 1630.0);
}

#[test]
fn totals_helper_applies_sales_tax_last() {
    let totals = compute_totals(1000.0, 0.10, 0.18, Some(0.05));
    let tax = totals.sales_tax.expect("tax line");
    assert_eq!(tax.cost, 64.9);
    assert_eq!(tax.label, "Sales Tax (5%)");
    assert_eq!(totals.total, 1362.9);

    let untaxed = compute_totals(1000.0, 0.10, 0.18, Some(0.0));
    assert!(untaxed.sales_tax.is_none());
    assert_eq!(untaxed.total, 1298.0);
}

#[test]
fn rounded_variant_of_zero_total() {
    let variant = rounded_variant(0.0);
    assert_eq!(variant.rounded_total, 0.0);
    assert_eq!(variant.implied_markup_pct, 0.0);
    assert_eq!(variant.rounded_plus_25pct, 0.0);
}

#[test]
fn sales_tax_rolls_into_total_when_requested() {
    let mut input = base_input();
    input.apply_sales_tax = true;
    input.sales_tax_pct = Some(0.053);
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();

    let tax = output.sales_tax.as_ref().expect("tax line");
    let before_tax = round2(output.subtotal + output.overhead.cost + output.profit.cost);
    assert_eq!(output.total, round2(before_tax + tax.cost));
    assert!(output.total > before_tax);

    input.apply_sales_tax = false;
    let untaxed = build_estimate(&input, &BusinessProfile::default()).unwrap();
    assert!(untaxed.sales_tax.is_none());
}

#[test]
fn trailer_drag_raises_fuel_cost() {
    let mut input = base_input();
    input.trailer_mpg_modifier_pct = Some(-0.1);
    let dragged = build_estimate(&input, &BusinessProfile::default()).unwrap();
    input.trailer_mpg_modifier_pct = Some(0.0);
    let plain = build_estimate(&input, &BusinessProfile::default()).unwrap();
    assert!(fuel_total(&dragged) > fuel_total(&plain));
}

#[test]
fn hourly_propane_is_billed_for_crack_filling() {
    let input = EstimateInput {
        crack_linear_feet: 150.0,
        crack_hours: 2.0,
        propane_cost_per_hour: Some(10.0),
        ..EstimateInput::new(ServiceType::CrackFilling)
    };
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();
    assert_eq!(find(&output.materials, "Propane (hours)").cost, 20.0);
}

#[test]
fn leg_based_routing_labels_travel_fuel() {
    let mut input = base_input();
    input.leg_based_routing = true;
    input.leg_heavy_total_miles = 100.0;
    input.leg_heavy_loaded_miles = 60.0;
    input.leg_light_total_miles = 40.0;
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();
    assert!(output
        .equipment_and_fuel
        .iter()
        .any(|item| item.label.contains("leg-based")));
}

#[test]
fn extra_coats_and_waste_inflate_materials() {
    let profile = BusinessProfile::default();
    let single = build_estimate(&base_input(), &profile).unwrap();
    let single_cost = round2(sum_costs(&single.materials));

    let mut input = base_input();
    input.coats = 2;
    input.waste_factor_pct = 0.1;
    let output = build_estimate(&input, &profile).unwrap();

    let extra = find(&output.materials, "Additional coats (1)");
    assert_eq!(extra.cost, round2(single_cost * 0.9));
    let waste = find(&output.materials, "Material waste (10%)");
    assert_eq!(waste.cost, round2((single_cost + extra.cost) * 0.1));
    assert_eq!(output.project_description, "Sealcoating 3000 sq ft (2 coats).");
}

#[test]
fn application_method_nudges_labor() {
    let profile = BusinessProfile::default();
    let mut input = base_input();
    input.sealcoat_square_feet = 9000.0;

    let neutral = build_estimate(&input, &profile).unwrap();
    input.application_method = Some(ApplicationMethod::Spray);
    let spray = build_estimate(&input, &profile).unwrap();
    input.application_method = Some(ApplicationMethod::Squeegee);
    let squeegee = build_estimate(&input, &profile).unwrap();

    // 3 hr x 3 crew x $12
    assert_eq!(neutral.labor[0].cost, 108.0);
    assert_eq!(spray.labor[0].cost, 97.2);
    assert_eq!(squeegee.labor[0].cost, 118.8);
}

#[test]
fn patching_adds_surcharge_lines() {
    let input = EstimateInput {
        patch_square_feet: 200.0,
        patch_material: Some(PatchMaterial::Cold),
        patch_thickness_inches: Some(3.0),
        patch_tack_coat: true,
        patch_additive: true,
        ..EstimateInput::new(ServiceType::Patching)
    };
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();

    assert_eq!(find(&output.services, "Patching").cost, 900.0);
    assert_eq!(find(&output.materials, "Tack Coat").cost, 30.0);
    assert_eq!(find(&output.materials, "Patch Additive").cost, 20.0);
    assert_eq!(output.project_description, "Patching 200 sq ft cold mix.");
}

#[test]
fn transport_check_uses_unrounded_sand() {
    let mut input = base_input();
    input.include_transport_weight_check = true;
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();

    let load = output.transport_load.expect("transport check");
    // 1865 + (32.89 + 6.58) * 10 + 1.97 * 50 + 4300
    assert_eq!(load.total_weight_lbs, 6658.0);
    assert!(!load.exceeds_likely_gvwr);

    let without = build_estimate(&base_input(), &BusinessProfile::default()).unwrap();
    assert!(without.transport_load.is_none());
}

#[test]
fn heavy_load_adds_gvwr_note() {
    let mut input = base_input();
    input.sealcoat_square_feet = 40_000.0;
    input.include_transport_weight_check = true;
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();

    assert!(output.transport_load.as_ref().unwrap().exceeds_likely_gvwr);
    assert!(output.notes.iter().any(|note| note.contains("GVWR")));
}

#[test]
fn part_time_crew_limitation_is_noted() {
    let output = build_estimate(&base_input(), &BusinessProfile::default()).unwrap();
    assert!(output.notes.iter().any(|note| note.contains("Part-time")));

    let mut input = base_input();
    input.num_part_time = Some(0);
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();
    assert_eq!(output.notes.len(), STANDARD_NOTES.len());
}

struct FlatDay;

impl ProductivityModel for FlatDay {
    fn sealcoat_hours(&self, _square_feet: f64) -> f64 {
        8.0
    }
    fn crack_fill_hours(&self, _linear_feet: f64) -> f64 {
        8.0
    }
    fn patching_hours(&self, _square_feet: f64) -> f64 {
        8.0
    }
    fn striping_hours(&self, _linear_feet: f64) -> f64 {
        8.0
    }
}

#[test]
fn productivity_model_is_pluggable() {
    let output =
        build_estimate_with(&base_input(), &BusinessProfile::default(), &FlatDay).unwrap();
    // 8 hr x 3 crew x $12
    assert_eq!(output.labor[0].cost, 288.0);
}

#[test]
fn invalid_input_fails_fast() {
    let mut input = base_input();
    input.oil_spot_square_feet = -5.0;
    let err = build_estimate(&input, &BusinessProfile::default()).unwrap_err();
    assert!(matches!(
        err,
        EstimateError::InvalidEstimateInput { ref field, .. } if field == "oilSpotSquareFeet"
    ));
}

#[test]
fn invalid_profile_fails_fast() {
    let mut profile = BusinessProfile::default();
    profile.pricing.overhead_pct = -0.1;
    assert!(matches!(
        build_estimate(&base_input(), &profile),
        Err(EstimateError::InvalidProfile { .. })
    ));
}

#[test]
fn oversized_crew_is_priced_not_wrapped() {
    let input: EstimateInput = serde_json::from_value(serde_json::json!({
        "serviceType": "sealcoating",
        "sealcoatSquareFeet": 3000,
        "numFullTime": u32::MAX,
        "numPartTime": 1
    }))
    .unwrap();
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();
    // 2 hr minimum x 2^32 crew x $12
    assert_eq!(output.labor[0].cost, 2.0 * 4_294_967_296.0 * 12.0);
}

#[test]
fn huge_sealcoat_area_prices_every_purchased_bag() {
    let mut input = base_input();
    input.sealcoat_square_feet = 1e14;
    let output = build_estimate(&input, &BusinessProfile::default()).unwrap();

    let sand = find(&output.materials, "Sand (50 lb bags)").quantity.unwrap();
    assert!(sand > f64::from(u32::MAX));
    assert_eq!(sand, sand.ceil());
}

#[test]
fn fuel_cost_follows_fuel_assumptions_not_vehicle_nameplate() {
    let defaults = BusinessProfile::default();
    let plain = build_estimate(&base_input(), &defaults).unwrap();

    let nameplate = defaults
        .with_overrides(&serde_json::json!({ "vehicles": { "heavy": { "mpgLoaded": 6.0 } } }))
        .unwrap();
    let output = build_estimate(&base_input(), &nameplate).unwrap();
    assert_eq!(fuel_total(&output), fuel_total(&plain));

    let assumed = defaults
        .with_overrides(&serde_json::json!({ "fuel": { "heavyMpgLoaded": 6.0 } }))
        .unwrap();
    let output = build_estimate(&base_input(), &assumed).unwrap();
    assert!(fuel_total(&output) > fuel_total(&plain));
}

#[test]
fn profile_overrides_price_rates_without_input_fields() {
    let input = EstimateInput {
        patch_square_feet: 100.0,
        patch_tack_coat: true,
        ..EstimateInput::new(ServiceType::Patching)
    };
    let profile = BusinessProfile::default()
        .with_overrides(&serde_json::json!({ "pricing": { "tackCoatPerSqft": 0.5 } }))
        .unwrap();
    let output = build_estimate(&input, &profile).unwrap();
    assert_eq!(find(&output.materials, "Tack Coat").cost, 50.0);
}
