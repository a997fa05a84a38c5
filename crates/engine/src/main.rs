use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use manpower_engine::model::PlanningSnapshot;
use manpower_engine::{aggregator, validator};

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum Request {
    CentrePlanning {
        centre_id: i32,
        snapshot: PlanningSnapshot,
    },
    ClusterSummary {
        cluster_id: i32,
        snapshot: PlanningSnapshot,
    },
    CityAnalysis {
        city_id: i32,
        snapshot: PlanningSnapshot,
    },
    PanIndiaAnalysis {
        snapshot: PlanningSnapshot,
    },
    BikesPerEmployee {
        /// Numerator toggle: bikes-in-city when true, DAU otherwise.
        use_bic: bool,
        snapshot: PlanningSnapshot,
    },
    Validate {
        snapshot: PlanningSnapshot,
    },
}

#[derive(Debug, Serialize)]
struct OkResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrResponse {
    ok: bool,
    error: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_ok<T: Serialize>(data: T) {
    let resp = OkResponse { ok: true, data };
    let json = serde_json::to_string(&resp).unwrap_or_else(|e| {
        format!("{{\"ok\":false,\"error\":\"serialization error: {}\"}}", e)
    });
    println!("{}", json);
    let _ = io::stdout().flush();
}

fn write_err(msg: impl std::fmt::Display) -> ! {
    let resp = ErrResponse {
        ok: false,
        error: msg.to_string(),
    };
    let json = serde_json::to_string(&resp)
        .unwrap_or_else(|_| "{\"ok\":false,\"error\":\"double serialization error\"}".to_string());
    println!("{}", json);
    let _ = io::stdout().flush();
    std::process::exit(1);
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    // Read all of stdin
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        write_err(format!("Failed to read stdin: {}", e));
    }

    // Parse request
    let request: Request = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => write_err(format!("Invalid JSON input: {}", e)),
    };

    match request {
        Request::CentrePlanning { centre_id, snapshot } => {
            match aggregator::compute_centre_planning(&snapshot, centre_id) {
                Ok(result) => write_ok(result),
                Err(e) => write_err(e),
            }
        }
        Request::ClusterSummary { cluster_id, snapshot } => {
            match aggregator::compute_cluster_summary(&snapshot, cluster_id) {
                Ok(result) => write_ok(result),
                Err(e) => write_err(e),
            }
        }
        Request::CityAnalysis { city_id, snapshot } => {
            match aggregator::compute_city_analysis(&snapshot, city_id) {
                Ok(result) => write_ok(result),
                Err(e) => write_err(e),
            }
        }
        Request::PanIndiaAnalysis { snapshot } => {
            write_ok(aggregator::compute_pan_india_analysis(&snapshot));
        }
        Request::BikesPerEmployee { use_bic, snapshot } => {
            write_ok(aggregator::compute_bikes_per_employee(&snapshot, use_bic));
        }
        Request::Validate { snapshot } => {
            write_ok(validator::validate(&snapshot));
        }
    }
}
