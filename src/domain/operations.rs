//! Job-wide cost components: travel and equipment fuel, crew labor and the
//! transported-payload check.

use super::entities::{EstimateBreakdownItem, TransportLoad};
use super::profile::{Equipment, VehicleSpec};
use super::services::push_nonzero;
use crate::util::round2;

/// How travel miles are split between the two vehicles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TravelRouting {
    /// Heavy truck runs supplier + job round trips, light truck the job
    /// round trip only.
    RoundTrip {
        supplier_miles: f64,
        job_miles: f64,
    },
    /// Explicit per-vehicle legs; only the heavy truck's loaded miles pay
    /// the loaded penalty.
    LegBased {
        heavy_total_miles: f64,
        heavy_loaded_miles: f64,
        light_total_miles: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuelParams {
    pub heavy_mpg: f64,
    pub light_mpg: f64,
    pub mpg_degrade_loaded_pct: f64,
    pub trailer_mpg_modifier_pct: f64,
    pub fuel_price_per_gallon: f64,
    pub routing: TravelRouting,
    pub active_hours: f64,
    pub active_gallons_per_hour: f64,
    pub idle_hours: f64,
    pub idle_cost_per_hour: f64,
}

impl FuelParams {
    fn effective_mpg(&self, base_mpg: f64, loaded: bool) -> f64 {
        let degrade = if loaded {
            1.0 - self.mpg_degrade_loaded_pct
        } else {
            1.0
        };
        base_mpg * degrade * (1.0 + self.trailer_mpg_modifier_pct)
    }
}

fn gallons_for(miles: f64, mpg: f64) -> f64 {
    if miles > 0.0 && mpg > 0.0 {
        miles / mpg
    } else {
        0.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuelAndEquipment {
    pub items: Vec<EstimateBreakdownItem>,
    pub travel_gallons: f64,
    pub active_gallons: f64,
    pub cost: f64,
}

/// Travel fuel, active equipment fuel and the excessive-idle penalty. All
/// fuel is costed at the same per-job price; zero components are dropped.
pub fn compute_fuel_and_equipment(params: &FuelParams) -> FuelAndEquipment {
    let price = params.fuel_price_per_gallon;

    let (travel_gallons, travel_label) = match params.routing {
        TravelRouting::RoundTrip {
            supplier_miles,
            job_miles,
        } => {
            let heavy = gallons_for(
                supplier_miles + job_miles,
                params.effective_mpg(params.heavy_mpg, true),
            );
            let light = gallons_for(job_miles, params.effective_mpg(params.light_mpg, true));
            (heavy + light, "Travel Fuel (both vehicles)")
        }
        TravelRouting::LegBased {
            heavy_total_miles,
            heavy_loaded_miles,
            light_total_miles,
        } => {
            let loaded = heavy_loaded_miles.min(heavy_total_miles);
            let heavy_loaded = gallons_for(loaded, params.effective_mpg(params.heavy_mpg, true));
            let heavy_empty = gallons_for(
                heavy_total_miles - loaded,
                params.effective_mpg(params.heavy_mpg, false),
            );
            let light =
                gallons_for(light_total_miles, params.effective_mpg(params.light_mpg, true));
            (heavy_loaded + heavy_empty + light, "Travel Fuel (leg-based)")
        }
    };
    let travel_cost = round2(travel_gallons * price);

    let active_gallons = params.active_hours * params.active_gallons_per_hour;
    let active_cost = round2(active_gallons * price);

    let idle_cost = round2(params.idle_hours * params.idle_cost_per_hour);

    let mut items = Vec::new();
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::flat(travel_label, travel_cost).with_notes(format!(
            "{} gal @ ${}/gal",
            round2(travel_gallons),
            price
        )),
    );
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::flat("Equipment Fuel (active operation)", active_cost).with_notes(
            format!("{} gal @ ${}/gal", round2(active_gallons), price),
        ),
    );
    push_nonzero(
        &mut items,
        EstimateBreakdownItem::flat("Equipment Excessive Idle", idle_cost).with_notes(format!(
            "{} hr @ ${}/hr",
            params.idle_hours, params.idle_cost_per_hour
        )),
    );

    FuelAndEquipment {
        items,
        travel_gallons,
        active_gallons,
        cost: round2(travel_cost + active_cost + idle_cost),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Labor {
    pub item: EstimateBreakdownItem,
    pub hours: f64,
    pub crew_size: f64,
    pub hourly_rate: f64,
}

/// Crew labor at one shared hourly rate. Full- and part-time workers are
/// not paid differently.
pub fn compute_labor(
    hours: f64,
    num_full_time: u32,
    num_part_time: u32,
    hourly_rate: f64,
    label: &str,
) -> Labor {
    let crew_size = f64::from(num_full_time) + f64::from(num_part_time);
    let cost = round2(hours * crew_size * hourly_rate);
    let item = EstimateBreakdownItem::flat(label, cost).with_notes(format!(
        "{} hr x {} crew x ${}/hr",
        round2(hours),
        crew_size,
        hourly_rate
    ));
    Labor {
        item,
        hours,
        crew_size,
        hourly_rate,
    }
}

/// Combined weight of truck, sealer skid, mixed sealer and sand compared to
/// the truck's GVWR floor. Advisory only.
pub fn compute_transport_load(
    concentrate_gallons: f64,
    water_gallons: f64,
    sand_bags: f64,
    equipment: &Equipment,
    truck: &VehicleSpec,
) -> TransportLoad {
    let unit = &equipment.sealer_unit;
    let sealer_gallons = concentrate_gallons + water_gallons;
    let sealer_lbs = sealer_gallons * unit.sealer_weight_per_gallon_lbs;
    let sand_lbs = sand_bags * equipment.sand_bag_weight_lbs;
    let truck_lbs = truck.curb_weight_lbs.unwrap_or(0.0);
    let combined = unit.empty_weight_lbs + sealer_lbs + sand_lbs + truck_lbs;

    let exceeds_likely_gvwr = truck.gvwr_min_lbs.is_some_and(|gvwr| combined > gvwr);

    let mut notes = format!(
        "Unit {} lbs + sealer {} lbs + sand {} lbs + truck {} lbs = {} lbs.",
        unit.empty_weight_lbs.round(),
        sealer_lbs.round(),
        sand_lbs.round(),
        truck_lbs.round(),
        combined.round()
    );
    if let Some(gvwr) = truck.gvwr_min_lbs {
        notes.push_str(&format!(" Likely GVWR {} lbs.", gvwr.round()));
    }
    if unit.capacity_gallons > 0.0 && sealer_gallons > unit.capacity_gallons {
        notes.push_str(&format!(
            " Mixed sealer exceeds {} gal tank; plan multiple loads.",
            unit.capacity_gallons
        ));
    }

    TransportLoad {
        total_weight_lbs: combined.round(),
        notes,
        exceeds_likely_gvwr,
    }
}
