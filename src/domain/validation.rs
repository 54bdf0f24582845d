//! Input checks run before any calculator sees a request.

use thiserror::Error;

use super::entities::EstimateInput;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error("invalid estimate input `{field}`: {reason}")]
    InvalidEstimateInput { field: String, reason: String },
    #[error("invalid business profile `{field}`: {reason}")]
    InvalidProfile { field: String, reason: String },
}

impl EstimateError {
    pub(crate) fn input(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEstimateInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), EstimateError> {
    if !value.is_finite() {
        return Err(EstimateError::input(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(EstimateError::input(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

fn fraction(field: &str, value: f64) -> Result<(), EstimateError> {
    non_negative(field, value)?;
    if value > 1.0 {
        return Err(EstimateError::input(
            field,
            format!("must be a fraction in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

/// Rejects non-finite or negative quantities and rates, and percentages
/// outside their range. Absent optional values are always accepted.
pub fn validate_input(input: &EstimateInput) -> Result<(), EstimateError> {
    let quantities = [
        ("sealcoatSquareFeet", input.sealcoat_square_feet),
        ("patchSquareFeet", input.patch_square_feet),
        ("crackLinearFeet", input.crack_linear_feet),
        ("oilSpotSquareFeet", input.oil_spot_square_feet),
        ("crackHours", input.crack_hours),
        ("roundTripMilesJob", input.round_trip_miles_job),
        ("legHeavyTotalMiles", input.leg_heavy_total_miles),
        ("legHeavyLoadedMiles", input.leg_heavy_loaded_miles),
        ("legLightTotalMiles", input.leg_light_total_miles),
        ("sealerActiveHours", input.sealer_active_hours),
        ("excessiveIdleHours", input.excessive_idle_hours),
    ];
    for (field, value) in quantities {
        non_negative(field, value)?;
    }

    let overrides = [
        ("surfacePorosityFactor", input.surface_porosity_factor),
        ("patchThicknessInches", input.patch_thickness_inches),
        ("propaneCostPerHour", input.propane_cost_per_hour),
        ("hourlyRatePerPerson", input.hourly_rate_per_person),
        ("roundTripMilesSupplier", input.round_trip_miles_supplier),
        ("heavyMpgLoaded", input.heavy_mpg_loaded),
        ("lightMpg", input.light_mpg),
        ("fuelPricePerGallon", input.fuel_price_per_gallon),
        ("equipmentActiveFuelGph", input.equipment_active_fuel_gph),
        ("excessiveIdleCostPerHour", input.excessive_idle_cost_per_hour),
        ("pmmPricePerGallon", input.pmm_price_per_gallon),
        ("sandPricePer50lbBag", input.sand_price_per_50lb_bag),
        ("fastDryPricePer5gal", input.fast_dry_price_per_5gal),
        ("prepSealPricePer5gal", input.prep_seal_price_per_5gal),
        ("crackBoxPricePer30lb", input.crack_box_price_per_30lb),
        ("propanePerTank", input.propane_per_tank),
        ("crackFillRatePerFoot", input.crack_fill_rate_per_foot),
        ("patchingPerSqft", input.patching_per_sqft),
        ("lineCostPerLinearFoot", input.line_cost_per_linear_foot),
        ("mobilizationFee", input.mobilization_fee),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            non_negative(field, value)?;
        }
    }

    let fractions = [
        ("wasteFactorPct", Some(input.waste_factor_pct)),
        ("mpgDegradeLoadedPct", input.mpg_degrade_loaded_pct),
        ("overheadPct", input.overhead_pct),
        ("profitPct", input.profit_pct),
        ("salesTaxPct", input.sales_tax_pct),
    ];
    for (field, value) in fractions {
        if let Some(value) = value {
            fraction(field, value)?;
        }
    }

    if let Some(modifier) = input.trailer_mpg_modifier_pct {
        if !modifier.is_finite() || modifier <= -1.0 || modifier > 1.0 {
            return Err(EstimateError::input(
                "trailerMpgModifierPct",
                format!("must be in (-1, 1], got {modifier}"),
            ));
        }
    }

    if input.leg_based_routing && input.leg_heavy_loaded_miles > input.leg_heavy_total_miles {
        return Err(EstimateError::input(
            "legHeavyLoadedMiles",
            "loaded miles cannot exceed total heavy-vehicle miles",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ServiceType;

    #[test]
    fn accepts_default_request() {
        assert!(validate_input(&EstimateInput::new(ServiceType::ComboParkingLot)).is_ok());
    }

    #[test]
    fn rejects_negative_area() {
        let mut input = EstimateInput::new(ServiceType::Sealcoating);
        input.sealcoat_square_feet = -10.0;
        let err = validate_input(&input).unwrap_err();
        assert_eq!(
            err,
            EstimateError::InvalidEstimateInput {
                field: "sealcoatSquareFeet".to_string(),
                reason: "must be >= 0, got -10".to_string(),
            }
        );
    }

    #[test]
    fn rejects_nan_override() {
        let mut input = EstimateInput::new(ServiceType::CrackFilling);
        input.crack_box_price_per_30lb = Some(f64::NAN);
        assert!(matches!(
            validate_input(&input),
            Err(EstimateError::InvalidEstimateInput { ref field, .. }) if field == "crackBoxPricePer30lb"
        ));
    }

    #[test]
    fn rejects_percentages_out_of_range() {
        let mut input = EstimateInput::new(ServiceType::Patching);
        input.overhead_pct = Some(10.0);
        assert!(validate_input(&input).is_err());

        let mut input = EstimateInput::new(ServiceType::Patching);
        input.trailer_mpg_modifier_pct = Some(-1.0);
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn rejects_loaded_miles_above_total() {
        let mut input = EstimateInput::new(ServiceType::Sealcoating);
        input.leg_based_routing = true;
        input.leg_heavy_total_miles = 40.0;
        input.leg_heavy_loaded_miles = 60.0;
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn leg_fields_are_ignored_for_round_trip_routing() {
        let mut input = EstimateInput::new(ServiceType::Sealcoating);
        input.leg_heavy_total_miles = 40.0;
        input.leg_heavy_loaded_miles = 60.0;
        assert_eq!(validate_input(&input), Ok(()));
    }
}
