use crate::model::WorkshopTechnicianPlan;

// ---------------------------------------------------------------------------
// Shift-based base manpower
// ---------------------------------------------------------------------------

/// Base manpower for one centre-level plan: shifts × employees-per-shift.
///
/// Zero shifts always yield zero, overriding any stale employees-per-shift
/// left in the row. A nonzero shift count with zero employees-per-shift
/// defaults to one head per shift, so a newly activated shift never plans
/// zero heads silently. Negative inputs clamp to zero.
pub fn base_manpower(num_shifts: i32, employees_per_shift: i32) -> u32 {
    let shifts = num_shifts.max(0) as u32;
    if shifts == 0 {
        return 0;
    }
    let per_shift = employees_per_shift.max(0) as u32;
    let per_shift = if per_shift == 0 { 1 } else { per_shift };
    shifts * per_shift
}

/// Shift count implied by a truck-based plan: each truck runs two crews.
pub fn shifts_for_trucks(trucks: i32) -> i32 {
    trucks.max(0) * 2
}

// ---------------------------------------------------------------------------
// Shrinkage adjustment
// ---------------------------------------------------------------------------

/// Buffer a base headcount by a shrinkage percentage, rounding up.
///
/// Shrinkage at or above 100% would zero or flip the denominator; the guard
/// returns the base unadjusted in that case. Negative shrinkage clamps to 0.
pub fn apply_shrinkage(base: u32, shrinkage_percent: f64) -> u32 {
    let factor = 1.0 - shrinkage_percent.max(0.0) / 100.0;
    if factor > 0.0 {
        (base as f64 / factor).ceil() as u32
    } else {
        base
    }
}

// ---------------------------------------------------------------------------
// Workshop-technician capacity
// ---------------------------------------------------------------------------

/// City-level technician requirement from a demand figure, fault rate,
/// per-technician capacity, and shrinkage. Returns `None` when the
/// per-mechanic capacity is not positive (the formula cannot resolve).
///
/// The same 100%-shrinkage guard applies, except the unbuffered figure is
/// still ceiled — the pre-shrinkage technician count is fractional.
pub fn workshop_required(
    demand: i32,
    fault_rate_percent: f64,
    per_mechanic_capacity: i32,
    shrinkage_percent: f64,
) -> Option<u32> {
    if per_mechanic_capacity <= 0 {
        return None;
    }
    let faulty_units = demand.max(0) as f64 * fault_rate_percent.max(0.0) / 100.0;
    let base_technicians = faulty_units / per_mechanic_capacity as f64;
    let factor = 1.0 - shrinkage_percent.max(0.0) / 100.0;
    let required = if factor > 0.0 {
        (base_technicians / factor).ceil()
    } else {
        base_technicians.ceil()
    };
    Some(required as u32)
}

/// Convenience wrapper evaluating a whole plan with an already-resolved
/// demand source.
pub fn workshop_required_for_plan(
    plan: &WorkshopTechnicianPlan,
    source: crate::model::DemandSource,
) -> Option<u32> {
    workshop_required(
        plan.demand(source),
        plan.fault_rate_percent,
        plan.per_mechanic_capacity,
        plan.shrinkage_percent,
    )
}

// ---------------------------------------------------------------------------
// Surplus / deficit
// ---------------------------------------------------------------------------

/// Signed headcount delta against a target, or `None` when the target is
/// unknown (an unplanned designation has no deficit to report).
pub fn surplus_deficit(required: Option<i32>, current: i32) -> Option<i32> {
    required.map(|r| current - r)
}

/// Display classification of a surplus/deficit delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurplusClass {
    Surplus,
    Deficit,
    Balanced,
    NotSet,
}

pub fn classify_surplus(delta: Option<i32>) -> SurplusClass {
    match delta {
        None => SurplusClass::NotSet,
        Some(d) if d > 0 => SurplusClass::Surplus,
        Some(d) if d < 0 => SurplusClass::Deficit,
        Some(_) => SurplusClass::Balanced,
    }
}

// ---------------------------------------------------------------------------
// Bikes-per-employee ratio
// ---------------------------------------------------------------------------

/// Bikes ÷ employees, or `None` when there are no employees.
///
/// Aggregate callers must sum numerators and denominators before dividing;
/// averaging per-city ratios would weight small cities as heavily as large
/// ones.
pub fn bikes_per_employee(bikes: i64, employees: i64) -> Option<f64> {
    if employees <= 0 {
        None
    } else {
        Some(bikes as f64 / employees as f64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DemandSource;

    #[test]
    fn base_manpower_multiplies_shifts_and_employees() {
        assert_eq!(base_manpower(2, 5), 10);
        assert_eq!(base_manpower(3, 4), 12);
        assert_eq!(base_manpower(1, 1), 1);
    }

    #[test]
    fn zero_shifts_zero_base_regardless_of_stored_employees() {
        assert_eq!(base_manpower(0, 7), 0);
        assert_eq!(base_manpower(0, 0), 0);
    }

    #[test]
    fn activated_shift_defaults_one_head() {
        // Shifts turned on while employees-per-shift was still 0.
        assert_eq!(base_manpower(2, 0), 2);
        assert_eq!(base_manpower(3, 0), 3);
    }

    #[test]
    fn negative_inputs_clamp_to_zero() {
        assert_eq!(base_manpower(-1, 5), 0);
        // Negative employees clamps to 0, which then defaults to 1 per shift.
        assert_eq!(base_manpower(2, -3), 2);
    }

    #[test]
    fn truck_shift_equivalence() {
        // base(trucks=t, eps=e) == 2*t*e
        for t in 0..5 {
            for e in 0..4 {
                let expected = if t == 0 {
                    0
                } else if e == 0 {
                    2 * t as u32
                } else {
                    2 * t as u32 * e as u32
                };
                assert_eq!(base_manpower(shifts_for_trucks(t), e), expected);
            }
        }
        assert_eq!(shifts_for_trucks(-2), 0);
    }

    #[test]
    fn shrinkage_ceiling_invariant() {
        // finalRequired == ceil(base / (1 - s/100)) and never below base.
        for base in [0u32, 1, 7, 10, 40, 100] {
            for s in [0.0f64, 5.0, 15.0, 20.0, 50.0, 99.0] {
                let required = apply_shrinkage(base, s);
                let expected = (base as f64 / (1.0 - s / 100.0)).ceil() as u32;
                assert_eq!(required, expected, "base={base} s={s}");
                assert!(required >= base, "base={base} s={s}");
            }
        }
    }

    #[test]
    fn shrinkage_known_values() {
        // 10 heads at 20% shrinkage -> ceil(10 / 0.8) = 13
        assert_eq!(apply_shrinkage(10, 20.0), 13);
        assert_eq!(apply_shrinkage(8, 0.0), 8);
    }

    #[test]
    fn shrinkage_at_or_above_hundred_returns_base() {
        assert_eq!(apply_shrinkage(10, 100.0), 10);
        assert_eq!(apply_shrinkage(10, 150.0), 10);
    }

    #[test]
    fn negative_shrinkage_clamps() {
        assert_eq!(apply_shrinkage(10, -25.0), 10);
    }

    #[test]
    fn workshop_required_end_to_end_scenario() {
        // DAU 1000, fault 8%, capacity 10, shrinkage 15%:
        // faulty 80 -> base 8 -> ceil(8 / 0.85) = ceil(9.41) = 10
        assert_eq!(workshop_required(1000, 8.0, 10, 15.0), Some(10));
    }

    #[test]
    fn workshop_required_full_shrinkage_takes_guard() {
        // 100% shrinkage: no division, just ceil of the base technicians.
        // faulty 80 -> base 8 -> ceil(8) = 8
        assert_eq!(workshop_required(1000, 8.0, 10, 100.0), Some(8));
    }

    #[test]
    fn workshop_required_rejects_nonpositive_capacity() {
        assert_eq!(workshop_required(1000, 8.0, 0, 15.0), None);
        assert_eq!(workshop_required(1000, 8.0, -4, 15.0), None);
    }

    #[test]
    fn workshop_required_clamps_negative_demand_and_fault() {
        assert_eq!(workshop_required(-500, 8.0, 10, 15.0), Some(0));
        assert_eq!(workshop_required(1000, -8.0, 10, 15.0), Some(0));
    }

    #[test]
    fn workshop_plan_wrapper_uses_resolved_source() {
        let plan = WorkshopTechnicianPlan {
            city_id: 1,
            dau: 1000,
            bikes_in_city: 500,
            fault_rate_percent: 8.0,
            per_mechanic_capacity: 10,
            shrinkage_percent: 15.0,
            use_dau: false,
            use_bic: true,
        };
        // BIC 500 -> faulty 40 -> base 4 -> ceil(4 / 0.85) = 5
        assert_eq!(workshop_required_for_plan(&plan, DemandSource::Bic), Some(5));
        assert_eq!(workshop_required_for_plan(&plan, DemandSource::Dau), Some(10));
    }

    #[test]
    fn surplus_deficit_and_classification() {
        assert_eq!(surplus_deficit(Some(10), 12), Some(2));
        assert_eq!(surplus_deficit(Some(10), 7), Some(-3));
        assert_eq!(surplus_deficit(None, 7), None);

        assert_eq!(classify_surplus(Some(2)), SurplusClass::Surplus);
        assert_eq!(classify_surplus(Some(-3)), SurplusClass::Deficit);
        assert_eq!(classify_surplus(Some(0)), SurplusClass::Balanced);
        assert_eq!(classify_surplus(None), SurplusClass::NotSet);
    }

    #[test]
    fn ratio_undefined_without_employees() {
        assert_eq!(bikes_per_employee(1000, 0), None);
        assert_eq!(bikes_per_employee(0, 0), None);
    }

    #[test]
    fn ratio_divides_totals() {
        assert_eq!(bikes_per_employee(1000, 40), Some(25.0));
    }

    #[test]
    fn demand_source_resolution() {
        assert_eq!(DemandSource::resolve(true, false), (DemandSource::Dau, false));
        assert_eq!(DemandSource::resolve(false, true), (DemandSource::Bic, false));
        assert_eq!(DemandSource::resolve(true, true), (DemandSource::Dau, true));
        assert_eq!(DemandSource::resolve(false, false), (DemandSource::Dau, true));
    }
}
