#![deny(clippy::all)]

use napi_derive::napi;

use manpower_engine::model as engine;
use manpower_engine::{aggregator, validator};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[napi(string_enum)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningType {
    ShiftBased,
    TruckBased,
    DemandDriven,
}

impl From<engine::PlanningType> for PlanningType {
    fn from(v: engine::PlanningType) -> Self {
        match v {
            engine::PlanningType::ShiftBased => PlanningType::ShiftBased,
            engine::PlanningType::TruckBased => PlanningType::TruckBased,
            engine::PlanningType::DemandDriven => PlanningType::DemandDriven,
        }
    }
}

// ---------------------------------------------------------------------------
// Mirror types: snapshot / input side
// ---------------------------------------------------------------------------

#[napi(object)]
#[derive(Debug, Clone)]
pub struct Designation {
    pub id: i32,
    pub name: String,
    pub role_name: Option<String>,
    pub sub_department_name: Option<String>,
    pub manpower_planning_required: bool,
}

impl From<Designation> for engine::Designation {
    fn from(v: Designation) -> Self {
        engine::Designation {
            id: v.id,
            name: v.name,
            role_name: v.role_name,
            sub_department_name: v.sub_department_name,
            manpower_planning_required: v.manpower_planning_required,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct Centre {
    pub id: i32,
    pub name: String,
    pub cluster_id: i32,
}

impl From<Centre> for engine::Centre {
    fn from(v: Centre) -> Self {
        engine::Centre {
            id: v.id,
            name: v.name,
            cluster_id: v.cluster_id,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct Cluster {
    pub id: i32,
    pub name: String,
    pub city_id: i32,
    pub shrinkage_percent: f64,
}

impl From<Cluster> for engine::Cluster {
    fn from(v: Cluster) -> Self {
        engine::Cluster {
            id: v.id,
            name: v.name,
            city_id: v.city_id,
            shrinkage_percent: v.shrinkage_percent,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct City {
    pub id: i32,
    pub name: String,
}

impl From<City> for engine::City {
    fn from(v: City) -> Self {
        engine::City { id: v.id, name: v.name }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ManpowerPlan {
    pub centre_id: i32,
    pub designation_id: i32,
    pub num_shifts: i32,
    pub employees_per_shift: i32,
    /// Optimistic-concurrency token; defaults to 0 for hosts that don't
    /// version their rows yet.
    pub version: Option<i32>,
    pub updated_by: Option<String>,
    pub updated_at: Option<String>,
}

impl From<ManpowerPlan> for engine::ManpowerPlan {
    fn from(v: ManpowerPlan) -> Self {
        engine::ManpowerPlan {
            centre_id: v.centre_id,
            designation_id: v.designation_id,
            num_shifts: v.num_shifts,
            employees_per_shift: v.employees_per_shift,
            version: v.version.unwrap_or(0),
            updated_by: v.updated_by,
            updated_at: v.updated_at,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
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

impl From<WorkshopTechnicianPlan> for engine::WorkshopTechnicianPlan {
    fn from(v: WorkshopTechnicianPlan) -> Self {
        engine::WorkshopTechnicianPlan {
            city_id: v.city_id,
            dau: v.dau,
            bikes_in_city: v.bikes_in_city,
            fault_rate_percent: v.fault_rate_percent,
            per_mechanic_capacity: v.per_mechanic_capacity,
            shrinkage_percent: v.shrinkage_percent,
            use_dau: v.use_dau,
            use_bic: v.use_bic,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct HeadcountRecord {
    pub centre_id: i32,
    pub designation_id: i32,
    pub count: i32,
}

impl From<HeadcountRecord> for engine::HeadcountRecord {
    fn from(v: HeadcountRecord) -> Self {
        engine::HeadcountRecord {
            centre_id: v.centre_id,
            designation_id: v.designation_id,
            count: v.count,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct PlanningSnapshot {
    pub designations: Vec<Designation>,
    pub centres: Vec<Centre>,
    pub clusters: Vec<Cluster>,
    pub cities: Vec<City>,
    pub manpower_plans: Vec<ManpowerPlan>,
    pub workshop_plans: Vec<WorkshopTechnicianPlan>,
    pub headcounts: Vec<HeadcountRecord>,
}

impl From<PlanningSnapshot> for engine::PlanningSnapshot {
    fn from(v: PlanningSnapshot) -> Self {
        engine::PlanningSnapshot {
            designations: v.designations.into_iter().map(Into::into).collect(),
            centres: v.centres.into_iter().map(Into::into).collect(),
            clusters: v.clusters.into_iter().map(Into::into).collect(),
            cities: v.cities.into_iter().map(Into::into).collect(),
            manpower_plans: v.manpower_plans.into_iter().map(Into::into).collect(),
            workshop_plans: v.workshop_plans.into_iter().map(Into::into).collect(),
            headcounts: v.headcounts.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Mirror types: computed output side
// ---------------------------------------------------------------------------

#[napi(object)]
#[derive(Debug, Clone)]
pub struct DesignationRequirementRow {
    /// Absent on the merged workshop-technician row.
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

impl From<engine::DesignationRequirementRow> for DesignationRequirementRow {
    fn from(v: engine::DesignationRequirementRow) -> Self {
        DesignationRequirementRow {
            designation_id: v.designation_id,
            designation_name: v.designation_name,
            is_planned: v.is_planned,
            planning_type: v.planning_type.into(),
            base_manpower: v.base_manpower,
            required_manpower: v.required_manpower,
            current_headcount: v.current_headcount,
            surplus_deficit: v.surplus_deficit,
            shrinkage_percent: v.shrinkage_percent,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct PlanningTotals {
    pub required_manpower: i32,
    pub current_headcount: i32,
    pub surplus_deficit: i32,
}

impl From<engine::PlanningTotals> for PlanningTotals {
    fn from(v: engine::PlanningTotals) -> Self {
        PlanningTotals {
            required_manpower: v.required_manpower,
            current_headcount: v.current_headcount,
            surplus_deficit: v.surplus_deficit,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct CentrePlanning {
    pub centre_id: i32,
    pub centre_name: String,
    pub designations: Vec<DesignationRequirementRow>,
    pub totals: PlanningTotals,
    pub warnings: Vec<String>,
}

impl From<engine::CentrePlanning> for CentrePlanning {
    fn from(v: engine::CentrePlanning) -> Self {
        CentrePlanning {
            centre_id: v.centre_id,
            centre_name: v.centre_name,
            designations: v.designations.into_iter().map(Into::into).collect(),
            totals: v.totals.into(),
            warnings: v.warnings,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ClusterSummary {
    pub cluster_id: i32,
    pub cluster_name: String,
    pub shrinkage_percent: f64,
    pub designations: Vec<DesignationRequirementRow>,
    pub totals: PlanningTotals,
    pub warnings: Vec<String>,
}

impl From<engine::ClusterSummary> for ClusterSummary {
    fn from(v: engine::ClusterSummary) -> Self {
        ClusterSummary {
            cluster_id: v.cluster_id,
            cluster_name: v.cluster_name,
            shrinkage_percent: v.shrinkage_percent,
            designations: v.designations.into_iter().map(Into::into).collect(),
            totals: v.totals.into(),
            warnings: v.warnings,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct CityAnalysis {
    pub city_id: i32,
    pub city_name: String,
    pub designations: Vec<DesignationRequirementRow>,
    pub totals: PlanningTotals,
    pub workshop_technician_required: Option<i32>,
    pub warnings: Vec<String>,
}

impl From<engine::CityAnalysis> for CityAnalysis {
    fn from(v: engine::CityAnalysis) -> Self {
        CityAnalysis {
            city_id: v.city_id,
            city_name: v.city_name,
            designations: v.designations.into_iter().map(Into::into).collect(),
            totals: v.totals.into(),
            workshop_technician_required: v.workshop_technician_required,
            warnings: v.warnings,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct PanIndiaSummary {
    pub designations: Vec<DesignationRequirementRow>,
    pub totals: PlanningTotals,
    pub workshop_technician_required: Option<i32>,
    pub warnings: Vec<String>,
}

impl From<engine::PanIndiaSummary> for PanIndiaSummary {
    fn from(v: engine::PanIndiaSummary) -> Self {
        PanIndiaSummary {
            designations: v.designations.into_iter().map(Into::into).collect(),
            totals: v.totals.into(),
            workshop_technician_required: v.workshop_technician_required,
            warnings: v.warnings,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct PanIndiaAnalysis {
    pub cities: Vec<CityAnalysis>,
    pub pan_india: PanIndiaSummary,
}

impl From<engine::PanIndiaAnalysis> for PanIndiaAnalysis {
    fn from(v: engine::PanIndiaAnalysis) -> Self {
        PanIndiaAnalysis {
            cities: v.cities.into_iter().map(Into::into).collect(),
            pan_india: v.pan_india.into(),
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct CityRatio {
    pub city_id: i32,
    pub city_name: String,
    pub bikes: i32,
    pub employees: i32,
    /// Absent when the city has no employees (rendered as "N/A").
    pub ratio: Option<f64>,
}

impl From<engine::CityRatio> for CityRatio {
    fn from(v: engine::CityRatio) -> Self {
        CityRatio {
            city_id: v.city_id,
            city_name: v.city_name,
            bikes: v.bikes,
            employees: v.employees,
            ratio: v.ratio,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct PanIndiaRatio {
    pub bikes: i64,
    pub employees: i64,
    pub ratio: Option<f64>,
}

impl From<engine::PanIndiaRatio> for PanIndiaRatio {
    fn from(v: engine::PanIndiaRatio) -> Self {
        PanIndiaRatio {
            bikes: v.bikes,
            employees: v.employees,
            ratio: v.ratio,
        }
    }
}

#[napi(object)]
#[derive(Debug, Clone)]
pub struct BikesPerEmployeeReport {
    pub use_bic: bool,
    pub city_wise: Vec<CityRatio>,
    pub pan_india: PanIndiaRatio,
    pub warnings: Vec<String>,
}

impl From<engine::BikesPerEmployeeReport> for BikesPerEmployeeReport {
    fn from(v: engine::BikesPerEmployeeReport) -> Self {
        BikesPerEmployeeReport {
            use_bic: v.use_bic,
            city_wise: v.city_wise.into_iter().map(Into::into).collect(),
            pan_india: v.pan_india.into(),
            warnings: v.warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation result
// ---------------------------------------------------------------------------

#[napi(object)]
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<validator::ValidationResult> for ValidationResult {
    fn from(v: validator::ValidationResult) -> Self {
        ValidationResult {
            errors: v.errors,
            warnings: v.warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Exported functions
// ---------------------------------------------------------------------------

/// Per-designation requirements for a single centre (no shrinkage at this
/// scope; that buffer belongs to the cluster rollup).
#[napi]
pub fn compute_centre_planning(
    snapshot: PlanningSnapshot,
    centre_id: i32,
) -> napi::Result<CentrePlanning> {
    let snapshot = engine::PlanningSnapshot::from(snapshot);
    aggregator::compute_centre_planning(&snapshot, centre_id)
        .map(Into::into)
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// Cluster rollup with the cluster's shrinkage applied once to each summed
/// designation base.
#[napi]
pub fn compute_cluster_summary(
    snapshot: PlanningSnapshot,
    cluster_id: i32,
) -> napi::Result<ClusterSummary> {
    let snapshot = engine::PlanningSnapshot::from(snapshot);
    aggregator::compute_cluster_summary(&snapshot, cluster_id)
        .map(Into::into)
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// City rollup including the demand-driven workshop-technician requirement
/// and the merged technician row.
#[napi]
pub fn compute_city_analysis(
    snapshot: PlanningSnapshot,
    city_id: i32,
) -> napi::Result<CityAnalysis> {
    let snapshot = engine::PlanningSnapshot::from(snapshot);
    aggregator::compute_city_analysis(&snapshot, city_id)
        .map(Into::into)
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// Every city's analysis plus the nation-wide summary.
#[napi]
pub fn compute_pan_india_analysis(snapshot: PlanningSnapshot) -> PanIndiaAnalysis {
    let snapshot = engine::PlanningSnapshot::from(snapshot);
    aggregator::compute_pan_india_analysis(&snapshot).into()
}

/// Bikes-per-employee city-wise and pan-India; `use_bic` picks bikes-in-city
/// over DAU as the numerator.
#[napi]
pub fn compute_bikes_per_employee(
    snapshot: PlanningSnapshot,
    use_bic: bool,
) -> BikesPerEmployeeReport {
    let snapshot = engine::PlanningSnapshot::from(snapshot);
    aggregator::compute_bikes_per_employee(&snapshot, use_bic).into()
}

/// Validate a snapshot and return errors and warnings without computing.
#[napi]
pub fn validate(snapshot: PlanningSnapshot) -> ValidationResult {
    let snapshot = engine::PlanningSnapshot::from(snapshot);
    validator::validate(&snapshot).into()
}

/// Optimistic-concurrency check the host runs before persisting a plan edit.
/// Rejects the write when the submitted token no longer matches the stored
/// row (or when no token is submitted at all).
#[napi]
pub fn check_plan_write(
    stored: ManpowerPlan,
    expected_version: Option<i32>,
    expected_updated_at: Option<String>,
) -> napi::Result<()> {
    let stored = engine::ManpowerPlan::from(stored);
    validator::check_plan_write(&stored, expected_version, expected_updated_at.as_deref())
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}
