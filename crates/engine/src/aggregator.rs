use std::collections::{HashMap, HashSet};

use crate::calc;
use crate::model::{
    classify_designations, BikesPerEmployeeReport, CentrePlanning, CityAnalysis, CityRatio,
    ClusterSummary, DemandSource, DesignationClass, DesignationRequirementRow, PanIndiaAnalysis,
    PanIndiaRatio, PanIndiaSummary, PlanningSnapshot, PlanningTotals,
    WORKSHOP_TECHNICIAN_COMBINED_NAME,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("Centre {0} does not exist in the snapshot")]
    UnknownCentre(i32),
    #[error("Cluster {0} does not exist in the snapshot")]
    UnknownCluster(i32),
    #[error("City {0} does not exist in the snapshot")]
    UnknownCity(i32),
}

// ---------------------------------------------------------------------------
// Scope plumbing
// ---------------------------------------------------------------------------

/// How shrinkage applies to the scope's summed base manpower.
enum ShrinkagePolicy {
    /// Centre scope: shrinkage belongs to the cluster and is not applied yet.
    Raw,
    /// Cluster scope: one shrinkage figure buffers the whole scope.
    Uniform(f64),
    /// City / pan-India scope: each cluster's share is buffered with its own
    /// figure, then the adjusted requirements are summed.
    PerCluster,
}

/// Lookups shared by every scope computation, resolved once per snapshot.
struct ScopeCtx<'a> {
    snapshot: &'a PlanningSnapshot,
    classes: HashMap<i32, DesignationClass>,
    centre_to_cluster: HashMap<i32, i32>,
    cluster_shrinkage: HashMap<i32, f64>,
}

impl<'a> ScopeCtx<'a> {
    fn new(snapshot: &'a PlanningSnapshot) -> Self {
        ScopeCtx {
            snapshot,
            classes: classify_designations(&snapshot.designations),
            centre_to_cluster: snapshot
                .centres
                .iter()
                .map(|c| (c.id, c.cluster_id))
                .collect(),
            cluster_shrinkage: snapshot
                .clusters
                .iter()
                .map(|c| (c.id, c.shrinkage_percent))
                .collect(),
        }
    }

    fn centres_in_cluster(&self, cluster_id: i32) -> HashSet<i32> {
        self.snapshot
            .centres
            .iter()
            .filter(|c| c.cluster_id == cluster_id)
            .map(|c| c.id)
            .collect()
    }

    fn centres_in_city(&self, city_id: i32) -> HashSet<i32> {
        let cluster_ids: HashSet<i32> = self
            .snapshot
            .clusters
            .iter()
            .filter(|c| c.city_id == city_id)
            .map(|c| c.id)
            .collect();
        self.snapshot
            .centres
            .iter()
            .filter(|c| cluster_ids.contains(&c.cluster_id))
            .map(|c| c.id)
            .collect()
    }
}

/// Per-designation accumulation over one scope.
#[derive(Default)]
struct DesignationAcc {
    /// Base manpower per owning cluster, so per-cluster shrinkage can apply.
    base_by_cluster: HashMap<i32, u32>,
    has_plan: bool,
    headcount: i32,
}

// ---------------------------------------------------------------------------
// Shared row assembly
// ---------------------------------------------------------------------------

/// Build the ordered requirement rows plus totals for one scope.
///
/// Malformed rows never abort the scope: plans or headcounts that reference
/// unknown designations, or shift plans filed against demand-driven
/// designations, are skipped with a warning.
fn build_rows(
    ctx: &ScopeCtx,
    centre_ids: &HashSet<i32>,
    policy: ShrinkagePolicy,
    workshop_required: Option<i32>,
    warnings: &mut Vec<String>,
) -> (Vec<DesignationRequirementRow>, PlanningTotals) {
    // -----------------------------------------------------------------------
    // 1. Accumulate plans and headcounts per designation
    // -----------------------------------------------------------------------
    let mut acc: HashMap<i32, DesignationAcc> = HashMap::new();
    let mut workshop_headcount: i32 = 0;
    let mut workshop_has_plan = false;

    for plan in &ctx.snapshot.manpower_plans {
        if !centre_ids.contains(&plan.centre_id) {
            continue;
        }
        let class = match ctx.classes.get(&plan.designation_id) {
            Some(c) => *c,
            None => {
                warnings.push(format!(
                    "Plan for centre {} references unknown designation {} -- skipped",
                    plan.centre_id, plan.designation_id
                ));
                continue;
            }
        };
        if class == DesignationClass::WorkshopTechnician {
            // Demand-driven requirement is never re-derived from shift math.
            warnings.push(format!(
                "Shift plan for workshop-technician designation {} ignored -- requirement is demand-driven",
                plan.designation_id
            ));
            workshop_has_plan = true;
            continue;
        }
        let cluster_id = match ctx.centre_to_cluster.get(&plan.centre_id) {
            Some(id) => *id,
            None => {
                warnings.push(format!(
                    "Plan references centre {} with no cluster -- skipped",
                    plan.centre_id
                ));
                continue;
            }
        };
        let base = calc::base_manpower(plan.num_shifts, plan.employees_per_shift);
        let entry = acc.entry(plan.designation_id).or_default();
        entry.has_plan = true;
        *entry.base_by_cluster.entry(cluster_id).or_insert(0) += base;
    }

    for hc in &ctx.snapshot.headcounts {
        if !centre_ids.contains(&hc.centre_id) {
            continue;
        }
        let count = hc.count.max(0);
        match ctx.classes.get(&hc.designation_id) {
            Some(DesignationClass::WorkshopTechnician) => workshop_headcount += count,
            Some(_) => acc.entry(hc.designation_id).or_default().headcount += count,
            None => {
                warnings.push(format!(
                    "Headcount row for centre {} references unknown designation {} -- skipped",
                    hc.centre_id, hc.designation_id
                ));
            }
        }
    }

    // -----------------------------------------------------------------------
    // 2. One row per planning-eligible designation (workshop variants merge
    //    into a single combined row below)
    // -----------------------------------------------------------------------
    let mut rows: Vec<DesignationRequirementRow> = Vec::new();
    let mut has_workshop_variants = false;

    for designation in &ctx.snapshot.designations {
        let class = ctx.classes[&designation.id];
        if class == DesignationClass::WorkshopTechnician {
            has_workshop_variants = true;
            continue;
        }
        if !designation.manpower_planning_required {
            if acc.get(&designation.id).is_some_and(|a| a.has_plan) {
                warnings.push(format!(
                    "Designation '{}' is not marked for manpower planning -- its plan is ignored",
                    designation.name
                ));
            }
            continue;
        }
        let data = acc.remove(&designation.id).unwrap_or_default();

        // Zero headcount and no plan: nothing to show.
        if !data.has_plan && data.headcount == 0 {
            continue;
        }

        let total_base: u32 = data.base_by_cluster.values().sum();
        let (base_manpower, required, shrinkage_percent) = if data.has_plan {
            let required = match &policy {
                ShrinkagePolicy::Raw => total_base,
                ShrinkagePolicy::Uniform(s) => calc::apply_shrinkage(total_base, *s),
                ShrinkagePolicy::PerCluster => data
                    .base_by_cluster
                    .iter()
                    .map(|(cluster_id, base)| {
                        let s = ctx.cluster_shrinkage.get(cluster_id).copied().unwrap_or(0.0);
                        calc::apply_shrinkage(*base, s)
                    })
                    .sum(),
            };
            let shown_shrinkage = match &policy {
                ShrinkagePolicy::Uniform(s) => Some(*s),
                _ => None,
            };
            (Some(total_base as i32), Some(required as i32), shown_shrinkage)
        } else {
            (None, None, None)
        };

        rows.push(DesignationRequirementRow {
            designation_id: Some(designation.id),
            designation_name: designation.name.clone(),
            is_planned: data.has_plan,
            planning_type: class.planning_type(),
            base_manpower,
            required_manpower: required,
            current_headcount: data.headcount,
            surplus_deficit: calc::surplus_deficit(required, data.headcount),
            shrinkage_percent,
        });
    }

    // -----------------------------------------------------------------------
    // 3. Merged workshop-technician row
    // -----------------------------------------------------------------------
    let merged = if has_workshop_variants {
        let is_planned = workshop_required.is_some() || workshop_has_plan;
        if workshop_headcount == 0 && !is_planned {
            None
        } else {
            Some(DesignationRequirementRow {
                designation_id: None,
                designation_name: WORKSHOP_TECHNICIAN_COMBINED_NAME.to_string(),
                is_planned,
                planning_type: crate::model::PlanningType::DemandDriven,
                base_manpower: None,
                required_manpower: workshop_required,
                current_headcount: workshop_headcount,
                surplus_deficit: calc::surplus_deficit(workshop_required, workshop_headcount),
                shrinkage_percent: None,
            })
        }
    } else {
        None
    };

    // -----------------------------------------------------------------------
    // 4. Ordering: planned first, descending headcount, merged row inserted
    //    at its descending-order position; unplanned follow, same order.
    // -----------------------------------------------------------------------
    let (mut planned, mut unplanned): (Vec<_>, Vec<_>) =
        rows.into_iter().partition(|r| r.is_planned);
    planned.sort_by(|a, b| b.current_headcount.cmp(&a.current_headcount));
    unplanned.sort_by(|a, b| b.current_headcount.cmp(&a.current_headcount));

    if let Some(row) = merged {
        let list = if row.is_planned { &mut planned } else { &mut unplanned };
        let pos = list
            .iter()
            .position(|r| r.current_headcount < row.current_headcount)
            .unwrap_or(list.len());
        list.insert(pos, row);
    }

    let ordered: Vec<DesignationRequirementRow> =
        planned.into_iter().chain(unplanned).collect();

    // -----------------------------------------------------------------------
    // 5. Totals over the displayed rows
    // -----------------------------------------------------------------------
    let required_total: i32 = ordered.iter().filter_map(|r| r.required_manpower).sum();
    let headcount_total: i32 = ordered.iter().map(|r| r.current_headcount).sum();
    let totals = PlanningTotals {
        required_manpower: required_total,
        current_headcount: headcount_total,
        surplus_deficit: headcount_total - required_total,
    };

    (ordered, totals)
}

/// Resolve one city's demand-driven technician requirement, flagging missing
/// or ambiguous configuration instead of failing.
fn city_workshop_required(
    ctx: &ScopeCtx,
    city_id: i32,
    city_name: &str,
    warnings: &mut Vec<String>,
) -> Option<i32> {
    let plan = match ctx
        .snapshot
        .workshop_plans
        .iter()
        .find(|p| p.city_id == city_id)
    {
        Some(p) => p,
        None => {
            warnings.push(format!(
                "No workshop technician plan configured for city '{}'",
                city_name
            ));
            return None;
        }
    };

    let (source, ambiguous) = DemandSource::resolve(plan.use_dau, plan.use_bic);
    if ambiguous {
        warnings.push(format!(
            "Workshop technician plan for city '{}' does not select exactly one of DAU/BIC -- defaulting to DAU",
            city_name
        ));
    }

    match calc::workshop_required_for_plan(plan, source) {
        Some(required) => Some(required as i32),
        None => {
            warnings.push(format!(
                "Workshop technician plan for city '{}' has non-positive per-mechanic capacity -- requirement not computed",
                city_name
            ));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Per-designation requirements for a single centre. Shrinkage is a cluster
/// property and is not applied at this scope; required equals base.
pub fn compute_centre_planning(
    snapshot: &PlanningSnapshot,
    centre_id: i32,
) -> Result<CentrePlanning, ScopeError> {
    let ctx = ScopeCtx::new(snapshot);
    let centre = snapshot
        .centres
        .iter()
        .find(|c| c.id == centre_id)
        .ok_or(ScopeError::UnknownCentre(centre_id))?;

    let mut warnings = Vec::new();
    let centre_ids: HashSet<i32> = [centre_id].into_iter().collect();
    let (designations, totals) =
        build_rows(&ctx, &centre_ids, ShrinkagePolicy::Raw, None, &mut warnings);

    Ok(CentrePlanning {
        centre_id,
        centre_name: centre.name.clone(),
        designations,
        totals,
        warnings,
    })
}

/// Cluster rollup: centre bases sum per designation, then the cluster's
/// shrinkage buffers the total once.
pub fn compute_cluster_summary(
    snapshot: &PlanningSnapshot,
    cluster_id: i32,
) -> Result<ClusterSummary, ScopeError> {
    let ctx = ScopeCtx::new(snapshot);
    let cluster = snapshot
        .clusters
        .iter()
        .find(|c| c.id == cluster_id)
        .ok_or(ScopeError::UnknownCluster(cluster_id))?;

    let mut warnings = Vec::new();
    let centre_ids = ctx.centres_in_cluster(cluster_id);
    let (designations, totals) = build_rows(
        &ctx,
        &centre_ids,
        ShrinkagePolicy::Uniform(cluster.shrinkage_percent),
        None,
        &mut warnings,
    );

    Ok(ClusterSummary {
        cluster_id,
        cluster_name: cluster.name.clone(),
        shrinkage_percent: cluster.shrinkage_percent,
        designations,
        totals,
        warnings,
    })
}

/// City rollup: per-cluster requirements sum per designation, and the
/// demand-driven workshop-technician figure resolves at this scope.
pub fn compute_city_analysis(
    snapshot: &PlanningSnapshot,
    city_id: i32,
) -> Result<CityAnalysis, ScopeError> {
    let ctx = ScopeCtx::new(snapshot);
    let city = snapshot
        .cities
        .iter()
        .find(|c| c.id == city_id)
        .ok_or(ScopeError::UnknownCity(city_id))?;

    let mut warnings = Vec::new();
    let workshop = city_workshop_required(&ctx, city_id, &city.name, &mut warnings);
    let centre_ids = ctx.centres_in_city(city_id);
    let (designations, totals) = build_rows(
        &ctx,
        &centre_ids,
        ShrinkagePolicy::PerCluster,
        workshop,
        &mut warnings,
    );

    Ok(CityAnalysis {
        city_id,
        city_name: city.name.clone(),
        designations,
        totals,
        workshop_technician_required: workshop,
        warnings,
    })
}

/// Nation-wide rollup: every city's analysis plus one merged summary whose
/// workshop requirement is the sum of the per-city figures.
pub fn compute_pan_india_analysis(snapshot: &PlanningSnapshot) -> PanIndiaAnalysis {
    let ctx = ScopeCtx::new(snapshot);

    let mut cities = Vec::with_capacity(snapshot.cities.len());
    let mut workshop_sum: Option<i32> = None;
    let mut pan_warnings = Vec::new();

    for city in &snapshot.cities {
        let mut warnings = Vec::new();
        let required = city_workshop_required(&ctx, city.id, &city.name, &mut warnings);
        match required {
            Some(r) => workshop_sum = Some(workshop_sum.unwrap_or(0) + r),
            None => pan_warnings.push(format!(
                "Workshop technician requirement for city '{}' is unknown and excluded from the pan-India figure",
                city.name
            )),
        }

        let centre_ids = ctx.centres_in_city(city.id);
        let (designations, totals) = build_rows(
            &ctx,
            &centre_ids,
            ShrinkagePolicy::PerCluster,
            required,
            &mut warnings,
        );
        cities.push(CityAnalysis {
            city_id: city.id,
            city_name: city.name.clone(),
            designations,
            totals,
            workshop_technician_required: required,
            warnings,
        });
    }

    let all_centres: HashSet<i32> = snapshot.centres.iter().map(|c| c.id).collect();
    let (designations, totals) = build_rows(
        &ctx,
        &all_centres,
        ShrinkagePolicy::PerCluster,
        workshop_sum,
        &mut pan_warnings,
    );

    PanIndiaAnalysis {
        cities,
        pan_india: PanIndiaSummary {
            designations,
            totals,
            workshop_technician_required: workshop_sum,
            warnings: pan_warnings,
        },
    }
}

/// Bikes-per-employee, city-wise and pan-India. The caller's toggle picks the
/// numerator; the pan-India ratio divides summed totals, never averages the
/// per-city ratios.
pub fn compute_bikes_per_employee(
    snapshot: &PlanningSnapshot,
    use_bic: bool,
) -> BikesPerEmployeeReport {
    let ctx = ScopeCtx::new(snapshot);
    let mut warnings = Vec::new();
    let mut city_wise = Vec::new();
    let mut total_bikes: i64 = 0;
    let mut total_employees: i64 = 0;

    for city in &snapshot.cities {
        let plan = match snapshot.workshop_plans.iter().find(|p| p.city_id == city.id) {
            Some(p) => p,
            None => {
                warnings.push(format!(
                    "No workshop technician plan for city '{}' -- excluded from bikes-per-employee",
                    city.name
                ));
                continue;
            }
        };
        let bikes = if use_bic { plan.bikes_in_city } else { plan.dau }.max(0);
        let centre_ids = ctx.centres_in_city(city.id);
        let employees: i32 = snapshot
            .headcounts
            .iter()
            .filter(|hc| centre_ids.contains(&hc.centre_id))
            .map(|hc| hc.count.max(0))
            .sum();

        total_bikes += bikes as i64;
        total_employees += employees as i64;
        city_wise.push(CityRatio {
            city_id: city.id,
            city_name: city.name.clone(),
            bikes,
            employees,
            ratio: calc::bikes_per_employee(bikes as i64, employees as i64),
        });
    }

    BikesPerEmployeeReport {
        use_bic,
        city_wise,
        pan_india: PanIndiaRatio {
            bikes: total_bikes,
            employees: total_employees,
            ratio: calc::bikes_per_employee(total_bikes, total_employees),
        },
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
