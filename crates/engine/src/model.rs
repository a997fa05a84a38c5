use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which demand figure drives the workshop-technician capacity formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandSource {
    /// Daily active users — a utilization proxy for the city's fleet.
    Dau,
    /// Bikes in city — the raw fleet size.
    Bic,
}

impl DemandSource {
    /// Resolve the pair of host-side toggle flags into a single source.
    /// Both set or neither set falls back to DAU; the second tuple element
    /// reports whether the configuration was ambiguous.
    pub fn resolve(use_dau: bool, use_bic: bool) -> (DemandSource, bool) {
        match (use_dau, use_bic) {
            (true, false) => (DemandSource::Dau, false),
            (false, true) => (DemandSource::Bic, false),
            _ => (DemandSource::Dau, true),
        }
    }
}

/// How a designation's requirement is computed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlanningType {
    /// Shifts × employees-per-shift per centre.
    ShiftBased,
    /// Sized by vehicle count; each truck implies two shifts.
    TruckBased,
    /// City-level capacity formula driven by DAU/BIC and fault rate.
    DemandDriven,
}

/// Typed classification of a designation, resolved once per snapshot instead
/// of re-matching name substrings on every computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignationClass {
    Standard,
    TruckBased,
    WorkshopTechnician,
}

impl DesignationClass {
    pub fn planning_type(self) -> PlanningType {
        match self {
            DesignationClass::Standard => PlanningType::ShiftBased,
            DesignationClass::TruckBased => PlanningType::TruckBased,
            DesignationClass::WorkshopTechnician => PlanningType::DemandDriven,
        }
    }
}

/// Designation name variants that all mean "workshop technician" and are
/// merged into one combined row during aggregation.
pub const WORKSHOP_TECHNICIAN_VARIANTS: [&str; 3] = [
    "workshop technician",
    "senior workshop technician",
    "associate workshop technician",
];

/// Display label of the merged workshop-technician row.
pub const WORKSHOP_TECHNICIAN_COMBINED_NAME: &str =
    "Workshop Technician + Senior Workshop Technician + Associate Workshop Technician";

/// Name keyword identifying truck-based ("operator") designations.
pub const TRUCK_BASED_KEYWORD: &str = "operator";

/// Classify every designation in one pass. Workshop-technician variants win
/// over the operator keyword.
pub fn classify_designations(designations: &[Designation]) -> HashMap<i32, DesignationClass> {
    designations
        .iter()
        .map(|d| {
            let lower = d.name.to_lowercase();
            let class = if WORKSHOP_TECHNICIAN_VARIANTS
                .iter()
                .any(|v| lower.contains(v))
            {
                DesignationClass::WorkshopTechnician
            } else if lower.contains(TRUCK_BASED_KEYWORD) {
                DesignationClass::TruckBased
            } else {
                DesignationClass::Standard
            };
            (d.id, class)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A job title eligible for staffing math. Master-data admin flows own the
/// lifecycle; the engine treats these as immutable reference rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Designation {
    pub id: i32,
    pub name: String,
    pub role_name: Option<String>,
    pub sub_department_name: Option<String>,
    pub manpower_planning_required: bool,
}

/// A physical site — the leaf of the staffing hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Centre {
    pub id: i32,
    pub name: String,
    pub cluster_id: i32,
}

/// Mid-level aggregation unit. Owns the shrinkage percentage applied when
/// centre-level base manpower rolls up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: i32,
    pub name: String,
    pub city_id: i32,
    pub shrinkage_percent: f64,
}

/// Top aggregation unit below pan-India.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: i32,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Planning inputs
// ---------------------------------------------------------------------------

/// Staffing intent for one designation at one centre. Quantities are signed
/// on the wire so a malformed negative row can be clamped with a warning
/// instead of failing the whole snapshot.
///
/// `version` is the optimistic-concurrency token checked by
/// [`crate::validator::check_plan_write`] before the host persists an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManpowerPlan {
    pub centre_id: i32,
    pub designation_id: i32,
    pub num_shifts: i32,
    pub employees_per_shift: i32,
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub updated_by: Option<String>,
    /// ISO 8601 audit stamp of the last write.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Per-city parameters of the workshop-technician capacity formula. Exactly
/// one of `use_dau`/`use_bic` should be set; the paired toggles are only a UI
/// convention upstream, so [`DemandSource::resolve`] enforces it here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopTechnicianPlan {
    pub city_id: i32,
    pub dau: i32,
    pub bikes_in_city: i32,
    pub fault_rate_percent: f64,
    pub per_mechanic_capacity: i32,
    pub shrinkage_percent: f64,
    pub use_dau: bool,
    pub use_bic: bool,
}

impl WorkshopTechnicianPlan {
    /// Demand figure for the resolved source, clamped non-negative.
    pub fn demand(&self, source: DemandSource) -> i32 {
        let raw = match source {
            DemandSource::Dau => self.dau,
            DemandSource::Bic => self.bikes_in_city,
        };
        raw.max(0)
    }
}

/// Live active-employee count for one designation at one centre, supplied by
/// the external roster collaborator. Aggregate scopes sum these upward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadcountRecord {
    pub centre_id: i32,
    pub designation_id: i32,
    pub count: i32,
}

/// Everything the engine needs for one computation, assembled by the host
/// from its backing store. The engine is a pure function over one snapshot;
/// independent scopes can be computed concurrently from the same snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningSnapshot {
    pub designations: Vec<Designation>,
    pub centres: Vec<Centre>,
    pub clusters: Vec<Cluster>,
    pub cities: Vec<City>,
    #[serde(default)]
    pub manpower_plans: Vec<ManpowerPlan>,
    #[serde(default)]
    pub workshop_plans: Vec<WorkshopTechnicianPlan>,
    #[serde(default)]
    pub headcounts: Vec<HeadcountRecord>,
}

// ---------------------------------------------------------------------------
// Computed output types (transient; never persisted)
// ---------------------------------------------------------------------------

/// One designation's requirement within a scope. `designation_id` is absent
/// on the merged workshop-technician row, which stands for several
/// designations at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignationRequirementRow {
    pub designation_id: Option<i32>,
    pub designation_name: String,
    pub is_planned: bool,
    pub planning_type: PlanningType,
    pub base_manpower: Option<i32>,
    pub required_manpower: Option<i32>,
    pub current_headcount: i32,
    pub surplus_deficit: Option<i32>,
    pub shrinkage_percent: Option<f64>,
}

/// Totals over the displayed rows of one scope. Required sums only the rows
/// whose requirement is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningTotals {
    pub required_manpower: i32,
    pub current_headcount: i32,
    pub surplus_deficit: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentrePlanning {
    pub centre_id: i32,
    pub centre_name: String,
    pub designations: Vec<DesignationRequirementRow>,
    pub totals: PlanningTotals,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub cluster_id: i32,
    pub cluster_name: String,
    pub shrinkage_percent: f64,
    pub designations: Vec<DesignationRequirementRow>,
    pub totals: PlanningTotals,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityAnalysis {
    pub city_id: i32,
    pub city_name: String,
    pub designations: Vec<DesignationRequirementRow>,
    pub totals: PlanningTotals,
    /// City-level demand-driven technician requirement; absent when the city
    /// has no workshop-technician plan configured.
    pub workshop_technician_required: Option<i32>,
    pub warnings: Vec<String>,
}

/// Nation-wide rollup: the per-city analyses plus one merged summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanIndiaAnalysis {
    pub cities: Vec<CityAnalysis>,
    pub pan_india: PanIndiaSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanIndiaSummary {
    pub designations: Vec<DesignationRequirementRow>,
    pub totals: PlanningTotals,
    /// Sum of the per-city workshop-technician requirements that could be
    /// computed; absent when no city has a workshop plan.
    pub workshop_technician_required: Option<i32>,
    pub warnings: Vec<String>,
}

/// One city's bikes-per-employee figure. `ratio` is absent when the city has
/// no employees — rendered as "N/A" downstream, never a division by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRatio {
    pub city_id: i32,
    pub city_name: String,
    pub bikes: i32,
    pub employees: i32,
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanIndiaRatio {
    pub bikes: i64,
    pub employees: i64,
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BikesPerEmployeeReport {
    /// Which figure fed the numerator: bikes-in-city when true, DAU otherwise.
    pub use_bic: bool,
    pub city_wise: Vec<CityRatio>,
    pub pan_india: PanIndiaRatio,
    pub warnings: Vec<String>,
}
