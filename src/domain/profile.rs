//! Contractor business profile: unit prices, mix ratios, coverage, pricing
//! baselines, fuel and fleet specs.
//!
//! A [`BusinessProfile`] is a read-only snapshot. User edits are expressed as
//! a partial JSON document and applied with [`BusinessProfile::with_overrides`],
//! which returns a fresh snapshot instead of touching the defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::EstimateError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    pub fn full(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub name: String,
    pub address: Address,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewDefaults {
    pub num_full_time: u32,
    pub num_part_time: u32,
    /// Single rate shared by full- and part-time crew.
    pub hourly_rate_per_person: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPrices {
    pub pmm_price_per_gallon: f64,
    /// Bulk reference price, informational.
    pub pmm_bulk_price_per_gallon: f64,
    pub sand_price_per_50lb_bag: f64,
    pub fast_dry_price_per_5gal: f64,
    pub prep_seal_price_per_5gal: f64,
    pub crack_box_price_per_30lb: f64,
    pub propane_per_tank: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixGuidelines {
    /// Water added on top of concentrate, as a fraction of concentrate volume.
    pub water_percent: f64,
    pub sand_bags_per_100gal_concentrate: f64,
    pub fast_dry_gal_per_125gal_concentrate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRates {
    pub mixed_sealer_coverage_sqft_per_gal: f64,
    pub prep_seal_coverage_sqft_per_gal: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallStencil {
    pub size: String,
    pub lf: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StencilCatalog {
    pub stalls: Vec<StallStencil>,
    pub double_stall_lf: f64,
}

impl StencilCatalog {
    pub const FALLBACK_STALL_LF: f64 = 20.0;

    /// Linear feet of paint for one stall of the given size class.
    pub fn stall_lf(&self, size: Option<&str>) -> f64 {
        let size = size.unwrap_or("standard");
        self.stalls
            .iter()
            .find(|stall| stall.size.eq_ignore_ascii_case(size))
            .map(|stall| stall.lf)
            .unwrap_or(Self::FALLBACK_STALL_LF)
    }
}

impl Default for StencilCatalog {
    fn default() -> Self {
        Self {
            stalls: vec![
                StallStencil {
                    size: "standard".to_string(),
                    lf: 20.0,
                },
                StallStencil {
                    size: "compact".to_string(),
                    lf: 18.0,
                },
                StallStencil {
                    size: "truck".to_string(),
                    lf: 22.0,
                },
            ],
            double_stall_lf: 25.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBaselines {
    pub crack_fill_rate_per_foot: f64,
    pub patching_per_sqft: f64,
    pub line_cost_per_linear_foot: f64,
    pub mobilization_fee: f64,
    pub overhead_pct: f64,
    pub profit_pct: f64,
    pub handicap_symbol_cost: f64,
    pub arrow_cost: f64,
    pub crosswalk_cost: f64,
    pub stop_bar_cost: f64,
    pub text_stencil_cost: f64,
    /// Colors offered to customers. Pricing only reads
    /// `paint_color_cost_delta`.
    pub paint_colors: Vec<String>,
    /// Premium per linear foot keyed by paint color.
    pub paint_color_cost_delta: BTreeMap<String, f64>,
    /// Hot-mix rate at 2" thickness; overrides `patching_per_sqft` when set.
    pub patching_hot_per_sqft: Option<f64>,
    /// Cold-mix rate at 2" thickness; overrides `patching_per_sqft` when set.
    pub patching_cold_per_sqft: Option<f64>,
    pub tack_coat_per_sqft: f64,
    pub patch_additive_per_sqft: f64,
    pub sales_tax_pct: f64,
    pub stencil_catalog: StencilCatalog,
}

impl PricingBaselines {
    pub fn paint_color_delta(&self, color: Option<&str>) -> f64 {
        color
            .and_then(|color| {
                self.paint_color_cost_delta
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(color))
                    .map(|(_, delta)| *delta)
            })
            .unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelAssumptions {
    /// Heavy (sealer-hauling) truck mpg when loaded.
    pub heavy_mpg_loaded: f64,
    /// Light crew truck mpg.
    pub light_mpg: f64,
    pub equipment_active_fuel_gph: f64,
    /// Flat penalty per hour of excessive idle, not a fuel volume.
    pub excessive_idle_cost_per_hour: f64,
    pub default_fuel_price_per_gallon: f64,
    pub mpg_degrade_loaded_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSpec {
    pub name: String,
    pub curb_weight_lbs: Option<f64>,
    pub gvwr_min_lbs: Option<f64>,
    /// Nameplate figures for display. Fuel cost reads [`FuelAssumptions`].
    pub mpg_loaded: Option<f64>,
    pub mpg: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicles {
    pub heavy: VehicleSpec,
    pub light: VehicleSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSpec {
    pub name: String,
    pub empty_weight_lbs: f64,
    pub capacity_gallons: f64,
    pub sealer_weight_per_gallon_lbs: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub sealer_unit: EquipmentSpec,
    pub sand_bag_weight_lbs: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailerSpec {
    pub name: String,
    pub length_ft: Option<f64>,
    pub kind: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelDefaults {
    pub round_trip_miles_supplier: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub business_name: Option<String>,
    pub address: Address,
    pub supplier: Supplier,
    pub crew: CrewDefaults,
    pub materials: MaterialPrices,
    pub mix: MixGuidelines,
    pub coverage: CoverageRates,
    pub pricing: PricingBaselines,
    pub fuel: FuelAssumptions,
    pub vehicles: Vehicles,
    pub equipment: Equipment,
    pub trailers: Vec<TrailerSpec>,
    pub travel_defaults: TravelDefaults,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            business_name: None,
            address: Address {
                street: "337 Ayers Orchard Road".to_string(),
                city: "Stuart".to_string(),
                state: "VA".to_string(),
                zip: "24171".to_string(),
            },
            supplier: Supplier {
                name: "SealMaster Madison NC".to_string(),
                address: Address {
                    street: "703 West Decatur Street".to_string(),
                    city: "Madison".to_string(),
                    state: "NC".to_string(),
                    zip: "27025".to_string(),
                },
            },
            crew: CrewDefaults {
                num_full_time: 2,
                num_part_time: 1,
                hourly_rate_per_person: 12.0,
            },
            materials: MaterialPrices {
                pmm_price_per_gallon: 3.65,
                pmm_bulk_price_per_gallon: 3.79,
                sand_price_per_50lb_bag: 10.0,
                fast_dry_price_per_5gal: 50.0,
                prep_seal_price_per_5gal: 50.0,
                crack_box_price_per_30lb: 44.99,
                propane_per_tank: 10.0,
            },
            mix: MixGuidelines {
                water_percent: 0.2,
                sand_bags_per_100gal_concentrate: 6.0,
                fast_dry_gal_per_125gal_concentrate: 2.0,
            },
            coverage: CoverageRates {
                mixed_sealer_coverage_sqft_per_gal: 76.0,
                prep_seal_coverage_sqft_per_gal: 175.0,
            },
            pricing: PricingBaselines {
                crack_fill_rate_per_foot: 1.75,
                patching_per_sqft: 3.5,
                line_cost_per_linear_foot: 0.9,
                mobilization_fee: 250.0,
                overhead_pct: 0.10,
                profit_pct: 0.18,
                handicap_symbol_cost: 40.0,
                arrow_cost: 15.0,
                crosswalk_cost: 60.0,
                stop_bar_cost: 25.0,
                text_stencil_cost: 15.0,
                paint_colors: vec!["white".to_string(), "yellow".to_string(), "blue".to_string()],
                paint_color_cost_delta: BTreeMap::from([("blue".to_string(), 0.05)]),
                patching_hot_per_sqft: Some(3.5),
                patching_cold_per_sqft: Some(3.0),
                tack_coat_per_sqft: 0.15,
                patch_additive_per_sqft: 0.10,
                sales_tax_pct: 0.0,
                stencil_catalog: StencilCatalog::default(),
            },
            fuel: FuelAssumptions {
                heavy_mpg_loaded: 12.0,
                light_mpg: 17.0,
                equipment_active_fuel_gph: 2.0,
                excessive_idle_cost_per_hour: 50.0,
                default_fuel_price_per_gallon: 3.14,
                mpg_degrade_loaded_pct: 0.1,
            },
            vehicles: Vehicles {
                heavy: VehicleSpec {
                    name: "1978 Chevy C30 Custom Deluxe (350, 3-speed)".to_string(),
                    curb_weight_lbs: Some(4300.0),
                    gvwr_min_lbs: Some(10000.0),
                    mpg_loaded: Some(12.0),
                    mpg: None,
                },
                light: VehicleSpec {
                    name: "1995 Dodge Dakota V6 Magnum (Auto)".to_string(),
                    curb_weight_lbs: None,
                    gvwr_min_lbs: None,
                    mpg_loaded: None,
                    mpg: Some(17.0),
                },
            },
            equipment: Equipment {
                sealer_unit: EquipmentSpec {
                    name: "SealMaster SK 550 Tank Sealing Machine (Skid Unit)".to_string(),
                    empty_weight_lbs: 1865.0,
                    capacity_gallons: 550.0,
                    sealer_weight_per_gallon_lbs: 10.0,
                },
                sand_bag_weight_lbs: 50.0,
            },
            trailers: vec![
                trailer(
                    "8ft black utility trailer",
                    8.0,
                    "utility",
                    Some("4 crack machines, propane, crack filler, sand, 2 push blowers, tools"),
                ),
                trailer(
                    "10ft black utility trailer",
                    10.0,
                    "utility",
                    Some("Similar load as 8ft trailer"),
                ),
                trailer("8ft white trailer", 8.0, "enclosed", None),
                trailer("10ft tilt-back trailer", 10.0, "tilt-back", None),
                trailer("12ft heavy duty black trailer", 12.0, "heavy-duty", None),
            ],
            travel_defaults: TravelDefaults {
                round_trip_miles_supplier: 96.0,
            },
        }
    }
}

fn trailer(name: &str, length_ft: f64, kind: &str, notes: Option<&str>) -> TrailerSpec {
    TrailerSpec {
        name: name.to_string(),
        length_ft: Some(length_ft),
        kind: Some(kind.to_string()),
        notes: notes.map(str::to_string),
    }
}

impl BusinessProfile {
    /// Returns a new snapshot with `overrides` deep-merged on top of `self`.
    ///
    /// Objects merge key by key, arrays and scalars replace, `null` leaves the
    /// existing value alone. The merged profile is validated before it is
    /// handed back.
    pub fn with_overrides(&self, overrides: &Value) -> Result<BusinessProfile, EstimateError> {
        let mut base = serde_json::to_value(self).map_err(|err| EstimateError::InvalidProfile {
            field: "profile".to_string(),
            reason: err.to_string(),
        })?;
        deep_merge(&mut base, overrides);
        let merged: BusinessProfile =
            serde_json::from_value(base).map_err(|err| EstimateError::InvalidProfile {
                field: "overrides".to_string(),
                reason: err.to_string(),
            })?;
        merged.validate()?;
        Ok(merged)
    }

    /// Checks that every rate is finite and non-negative and every
    /// percentage is a fraction in [0, 1].
    pub fn validate(&self) -> Result<(), EstimateError> {
        let rates = [
            ("crew.hourlyRatePerPerson", self.crew.hourly_rate_per_person),
            ("materials.pmmPricePerGallon", self.materials.pmm_price_per_gallon),
            (
                "materials.pmmBulkPricePerGallon",
                self.materials.pmm_bulk_price_per_gallon,
            ),
            ("materials.sandPricePer50lbBag", self.materials.sand_price_per_50lb_bag),
            ("materials.fastDryPricePer5gal", self.materials.fast_dry_price_per_5gal),
            ("materials.prepSealPricePer5gal", self.materials.prep_seal_price_per_5gal),
            ("materials.crackBoxPricePer30lb", self.materials.crack_box_price_per_30lb),
            ("materials.propanePerTank", self.materials.propane_per_tank),
            (
                "mix.sandBagsPer100galConcentrate",
                self.mix.sand_bags_per_100gal_concentrate,
            ),
            (
                "mix.fastDryGalPer125galConcentrate",
                self.mix.fast_dry_gal_per_125gal_concentrate,
            ),
            ("pricing.crackFillRatePerFoot", self.pricing.crack_fill_rate_per_foot),
            ("pricing.patchingPerSqft", self.pricing.patching_per_sqft),
            ("pricing.lineCostPerLinearFoot", self.pricing.line_cost_per_linear_foot),
            ("pricing.mobilizationFee", self.pricing.mobilization_fee),
            ("pricing.handicapSymbolCost", self.pricing.handicap_symbol_cost),
            ("pricing.arrowCost", self.pricing.arrow_cost),
            ("pricing.crosswalkCost", self.pricing.crosswalk_cost),
            ("pricing.stopBarCost", self.pricing.stop_bar_cost),
            ("pricing.textStencilCost", self.pricing.text_stencil_cost),
            ("pricing.tackCoatPerSqft", self.pricing.tack_coat_per_sqft),
            ("pricing.patchAdditivePerSqft", self.pricing.patch_additive_per_sqft),
            (
                "pricing.stencilCatalog.doubleStallLf",
                self.pricing.stencil_catalog.double_stall_lf,
            ),
            ("fuel.heavyMpgLoaded", self.fuel.heavy_mpg_loaded),
            ("fuel.lightMpg", self.fuel.light_mpg),
            ("fuel.equipmentActiveFuelGph", self.fuel.equipment_active_fuel_gph),
            (
                "fuel.excessiveIdleCostPerHour",
                self.fuel.excessive_idle_cost_per_hour,
            ),
            (
                "fuel.defaultFuelPricePerGallon",
                self.fuel.default_fuel_price_per_gallon,
            ),
            (
                "equipment.sealerUnit.emptyWeightLbs",
                self.equipment.sealer_unit.empty_weight_lbs,
            ),
            (
                "equipment.sealerUnit.sealerWeightPerGallonLbs",
                self.equipment.sealer_unit.sealer_weight_per_gallon_lbs,
            ),
            ("equipment.sandBagWeightLbs", self.equipment.sand_bag_weight_lbs),
            (
                "travelDefaults.roundTripMilesSupplier",
                self.travel_defaults.round_trip_miles_supplier,
            ),
        ];
        for (field, value) in rates {
            ensure_rate(field, value)?;
        }

        let optional_rates = [
            ("pricing.patchingHotPerSqft", self.pricing.patching_hot_per_sqft),
            ("pricing.patchingColdPerSqft", self.pricing.patching_cold_per_sqft),
            ("vehicles.heavy.curbWeightLbs", self.vehicles.heavy.curb_weight_lbs),
            ("vehicles.heavy.gvwrMinLbs", self.vehicles.heavy.gvwr_min_lbs),
        ];
        for (field, value) in optional_rates {
            if let Some(value) = value {
                ensure_rate(field, value)?;
            }
        }
        for (color, delta) in &self.pricing.paint_color_cost_delta {
            ensure_rate(&format!("pricing.paintColorCostDelta.{color}"), *delta)?;
        }
        for stall in &self.pricing.stencil_catalog.stalls {
            ensure_rate(&format!("pricing.stencilCatalog.stalls.{}", stall.size), stall.lf)?;
        }

        let fractions = [
            ("mix.waterPercent", self.mix.water_percent),
            ("pricing.overheadPct", self.pricing.overhead_pct),
            ("pricing.profitPct", self.pricing.profit_pct),
            ("pricing.salesTaxPct", self.pricing.sales_tax_pct),
            ("fuel.mpgDegradeLoadedPct", self.fuel.mpg_degrade_loaded_pct),
        ];
        for (field, value) in fractions {
            ensure_fraction(field, value)?;
        }

        for (field, value) in [
            (
                "coverage.mixedSealerCoverageSqftPerGal",
                self.coverage.mixed_sealer_coverage_sqft_per_gal,
            ),
            (
                "coverage.prepSealCoverageSqftPerGal",
                self.coverage.prep_seal_coverage_sqft_per_gal,
            ),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EstimateError::InvalidProfile {
                    field: field.to_string(),
                    reason: "coverage must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn ensure_rate(field: &str, value: f64) -> Result<(), EstimateError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EstimateError::InvalidProfile {
            field: field.to_string(),
            reason: format!("expected a non-negative number, got {value}"),
        })
    }
}

fn ensure_fraction(field: &str, value: f64) -> Result<(), EstimateError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EstimateError::InvalidProfile {
            field: field.to_string(),
            reason: format!("expected a fraction between 0 and 1, got {value}"),
        })
    }
}

/// Merges `patch` into `target`: objects recurse, everything else replaces.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    continue;
                }
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        BusinessProfile::default().validate().unwrap();
    }

    #[test]
    fn overrides_merge_without_touching_defaults() {
        let base = BusinessProfile::default();
        let patched = base
            .with_overrides(&json!({
                "materials": { "pmmPricePerGallon": 4.1 },
                "pricing": { "paintColorCostDelta": { "yellow": 0.02 } }
            }))
            .unwrap();

        assert_eq!(patched.materials.pmm_price_per_gallon, 4.1);
        assert_eq!(patched.materials.sand_price_per_50lb_bag, 10.0);
        assert_eq!(patched.pricing.paint_color_delta(Some("yellow")), 0.02);
        assert_eq!(patched.pricing.paint_color_delta(Some("blue")), 0.05);
        assert_eq!(base.materials.pmm_price_per_gallon, 3.65);
    }

    #[test]
    fn arrays_replace_and_nulls_are_ignored() {
        let patched = BusinessProfile::default()
            .with_overrides(&json!({
                "trailers": [{ "name": "16ft lowboy", "lengthFt": 16.0 }],
                "businessName": null,
                "crew": { "numPartTime": 0 }
            }))
            .unwrap();

        assert_eq!(patched.trailers.len(), 1);
        assert_eq!(patched.trailers[0].name, "16ft lowboy");
        assert_eq!(patched.crew.num_part_time, 0);
        assert_eq!(patched.crew.num_full_time, 2);
    }

    #[test]
    fn overrides_reject_out_of_range_percentages() {
        let err = BusinessProfile::default()
            .with_overrides(&json!({ "pricing": { "profitPct": 18.0 } }))
            .unwrap_err();
        assert!(matches!(
            err,
            EstimateError::InvalidProfile { ref field, .. } if field == "pricing.profitPct"
        ));
    }

    #[test]
    fn overrides_reject_negative_prices() {
        let err = BusinessProfile::default()
            .with_overrides(&json!({ "materials": { "propanePerTank": -1.0 } }))
            .unwrap_err();
        assert!(matches!(err, EstimateError::InvalidProfile { .. }));
    }

    #[test]
    fn stall_lookup_falls_back_to_twenty_feet() {
        let catalog = StencilCatalog::default();
        assert_eq!(catalog.stall_lf(None), 20.0);
        assert_eq!(catalog.stall_lf(Some("Compact")), 18.0);
        assert_eq!(catalog.stall_lf(Some("motorcycle")), 20.0);
    }

    #[test]
    fn full_address_is_formatted() {
        let profile = BusinessProfile::default();
        assert_eq!(
            profile.supplier.address.full(),
            "703 West Decatur Street, Madison, NC 27025"
        );
    }
}
