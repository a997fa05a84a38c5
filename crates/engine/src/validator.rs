use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{
    classify_designations, DesignationClass, ManpowerPlan, PlanningSnapshot,
};

// ---------------------------------------------------------------------------
// Validation result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validate implementation
// ---------------------------------------------------------------------------

/// Validate a planning snapshot, returning errors (structural problems the
/// host should fix at the source) and warnings (advisory). The compute paths
/// never require a prior validate call — they degrade row by row — so this
/// is a diagnostic surface, not a gate.
pub fn validate(snapshot: &PlanningSnapshot) -> ValidationResult {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let classes = classify_designations(&snapshot.designations);

    // Entity ID sets for reference checks
    let designation_ids: HashSet<i32> = snapshot.designations.iter().map(|d| d.id).collect();
    let centre_ids: HashSet<i32> = snapshot.centres.iter().map(|c| c.id).collect();
    let cluster_ids: HashSet<i32> = snapshot.clusters.iter().map(|c| c.id).collect();
    let city_ids: HashSet<i32> = snapshot.cities.iter().map(|c| c.id).collect();

    // -----------------------------------------------------------------------
    // Errors: duplicate entity IDs
    // -----------------------------------------------------------------------
    {
        let mut seen: HashSet<i32> = HashSet::new();
        for d in &snapshot.designations {
            if !seen.insert(d.id) {
                errors.push(format!(
                    "Duplicate designation ID {} ('{}') -- each designation must have a unique ID",
                    d.id, d.name
                ));
            }
        }
    }
    {
        let mut seen: HashSet<i32> = HashSet::new();
        for c in &snapshot.centres {
            if !seen.insert(c.id) {
                errors.push(format!("Duplicate centre ID {} ('{}')", c.id, c.name));
            }
        }
    }
    {
        let mut seen: HashSet<i32> = HashSet::new();
        for c in &snapshot.clusters {
            if !seen.insert(c.id) {
                errors.push(format!("Duplicate cluster ID {} ('{}')", c.id, c.name));
            }
        }
    }
    {
        let mut seen: HashSet<i32> = HashSet::new();
        for c in &snapshot.cities {
            if !seen.insert(c.id) {
                errors.push(format!("Duplicate city ID {} ('{}')", c.id, c.name));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Errors: dangling hierarchy references
    // -----------------------------------------------------------------------
    for centre in &snapshot.centres {
        if !cluster_ids.contains(&centre.cluster_id) {
            errors.push(format!(
                "Centre '{}' references cluster {} which doesn't exist",
                centre.name, centre.cluster_id
            ));
        }
    }
    for cluster in &snapshot.clusters {
        if !city_ids.contains(&cluster.city_id) {
            errors.push(format!(
                "Cluster '{}' references city {} which doesn't exist",
                cluster.name, cluster.city_id
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Per-plan checks
    // -----------------------------------------------------------------------
    {
        let mut seen: HashSet<(i32, i32)> = HashSet::new();
        for plan in &snapshot.manpower_plans {
            let key = (plan.centre_id, plan.designation_id);
            if !seen.insert(key) {
                errors.push(format!(
                    "Duplicate manpower plan for centre {} / designation {} -- one row per pair",
                    plan.centre_id, plan.designation_id
                ));
            }
            if !centre_ids.contains(&plan.centre_id) {
                errors.push(format!(
                    "Manpower plan references centre {} which doesn't exist",
                    plan.centre_id
                ));
            }
            if !designation_ids.contains(&plan.designation_id) {
                errors.push(format!(
                    "Manpower plan references designation {} which doesn't exist",
                    plan.designation_id
                ));
            }
            if plan.num_shifts < 0 {
                errors.push(format!(
                    "Manpower plan for centre {} / designation {} has negative shift count {}",
                    plan.centre_id, plan.designation_id, plan.num_shifts
                ));
            }
            if plan.employees_per_shift < 0 {
                errors.push(format!(
                    "Manpower plan for centre {} / designation {} has negative employees-per-shift {}",
                    plan.centre_id, plan.designation_id, plan.employees_per_shift
                ));
            }

            match classes.get(&plan.designation_id) {
                Some(DesignationClass::TruckBased) => {
                    if plan.num_shifts % 2 != 0 {
                        warnings.push(format!(
                            "Truck-based plan for centre {} / designation {} has odd shift count {} -- trucks imply two shifts each",
                            plan.centre_id, plan.designation_id, plan.num_shifts
                        ));
                    }
                }
                Some(DesignationClass::WorkshopTechnician) => {
                    warnings.push(format!(
                        "Shift plan filed against workshop-technician designation {} -- technician requirement is demand-driven and this plan is ignored",
                        plan.designation_id
                    ));
                }
                _ => {
                    if plan.num_shifts > 3 {
                        warnings.push(format!(
                            "Plan for centre {} / designation {} has {} shifts -- policy allows at most 3",
                            plan.centre_id, plan.designation_id, plan.num_shifts
                        ));
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Per-workshop-plan checks
    // -----------------------------------------------------------------------
    {
        let mut seen: HashSet<i32> = HashSet::new();
        for plan in &snapshot.workshop_plans {
            if !seen.insert(plan.city_id) {
                errors.push(format!(
                    "Duplicate workshop technician plan for city {} -- one per city",
                    plan.city_id
                ));
            }
            if !city_ids.contains(&plan.city_id) {
                errors.push(format!(
                    "Workshop technician plan references city {} which doesn't exist",
                    plan.city_id
                ));
            }
            if plan.per_mechanic_capacity <= 0 {
                errors.push(format!(
                    "Workshop technician plan for city {} has non-positive per-mechanic capacity {}",
                    plan.city_id, plan.per_mechanic_capacity
                ));
            }
            if plan.dau < 0 || plan.bikes_in_city < 0 {
                errors.push(format!(
                    "Workshop technician plan for city {} has a negative demand figure",
                    plan.city_id
                ));
            }
            if plan.use_dau == plan.use_bic {
                warnings.push(format!(
                    "Workshop technician plan for city {} does not select exactly one of DAU/BIC -- defaulting to DAU",
                    plan.city_id
                ));
            }
            if !(0.0..100.0).contains(&plan.shrinkage_percent) {
                warnings.push(format!(
                    "Workshop technician plan for city {} has shrinkage {}% outside [0, 100)",
                    plan.city_id, plan.shrinkage_percent
                ));
            }
            if plan.fault_rate_percent > 100.0 || plan.fault_rate_percent < 0.0 {
                warnings.push(format!(
                    "Workshop technician plan for city {} has fault rate {}% outside [0, 100]",
                    plan.city_id, plan.fault_rate_percent
                ));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Cluster shrinkage bounds
    // -----------------------------------------------------------------------
    for cluster in &snapshot.clusters {
        if !(0.0..100.0).contains(&cluster.shrinkage_percent) {
            warnings.push(format!(
                "Cluster '{}' has shrinkage {}% outside [0, 100)",
                cluster.name, cluster.shrinkage_percent
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Headcount rows
    // -----------------------------------------------------------------------
    {
        let mut seen: HashSet<(i32, i32)> = HashSet::new();
        for hc in &snapshot.headcounts {
            if !seen.insert((hc.centre_id, hc.designation_id)) {
                warnings.push(format!(
                    "Duplicate headcount row for centre {} / designation {}",
                    hc.centre_id, hc.designation_id
                ));
            }
            if hc.count < 0 {
                errors.push(format!(
                    "Headcount for centre {} / designation {} is negative",
                    hc.centre_id, hc.designation_id
                ));
            }
            if !centre_ids.contains(&hc.centre_id) {
                errors.push(format!(
                    "Headcount row references centre {} which doesn't exist",
                    hc.centre_id
                ));
            }
            if !designation_ids.contains(&hc.designation_id) {
                errors.push(format!(
                    "Headcount row references designation {} which doesn't exist",
                    hc.designation_id
                ));
            }
        }
    }

    ValidationResult { errors, warnings }
}

// ---------------------------------------------------------------------------
// Optimistic-concurrency write guard
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StaleWriteError {
    #[error("Plan was modified since it was read: expected version {expected}, stored version is {actual}")]
    VersionMismatch { expected: i32, actual: i32 },
    #[error("Plan was modified since it was read: expected timestamp {expected}, stored timestamp is {actual}")]
    TimestampMismatch { expected: String, actual: String },
    #[error("Write carries no concurrency token (version or updatedAt) -- blind overwrites are rejected")]
    MissingToken,
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    // Strip trailing Z or timezone offset for NaiveDateTime parsing.
    let s = s.trim_end_matches('Z');
    let s = if let Some(pos) = s.rfind('+') {
        if pos > 10 {
            &s[..pos]
        } else {
            s
        }
    } else {
        s
    };
    let s = if s.len() > 19 && s.as_bytes().get(19) == Some(&b'-') {
        &s[..19]
    } else {
        s
    };

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    None
}

/// Check a plan edit against the stored row before the host persists it.
///
/// The caller submits the concurrency token it read (preferably the version
/// counter; the updatedAt stamp works as a fallback for hosts that predate
/// versioning). A missing or stale token rejects the write so concurrent
/// planners can't silently overwrite each other.
pub fn check_plan_write(
    stored: &ManpowerPlan,
    expected_version: Option<i32>,
    expected_updated_at: Option<&str>,
) -> Result<(), StaleWriteError> {
    if let Some(expected) = expected_version {
        if expected != stored.version {
            return Err(StaleWriteError::VersionMismatch {
                expected,
                actual: stored.version,
            });
        }
        return Ok(());
    }

    if let Some(expected) = expected_updated_at {
        let actual = stored.updated_at.as_deref().unwrap_or("");
        let matches = match (parse_datetime(expected), parse_datetime(actual)) {
            (Some(e), Some(a)) => e == a,
            // Unparseable on either side: fall back to a raw comparison.
            _ => expected == actual,
        };
        if !matches {
            return Err(StaleWriteError::TimestampMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        return Ok(());
    }

    Err(StaleWriteError::MissingToken)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
