/// Integration tests for the manpower-engine binary.
///
/// These tests spawn the compiled binary via assert_cmd and verify
/// the JSON stdin/stdout protocol for all key scenarios.
///
/// Run with: cargo test --manifest-path crates/engine/Cargo.toml
use assert_cmd::Command;
use predicates::str::contains;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cmd() -> Command {
    Command::cargo_bin("manpower-engine").unwrap()
}

/// One city ("Pune"), one cluster at 20% shrinkage, two centres. A standard
/// designation, a truck-based one, the three workshop-technician variants,
/// and a designation with headcount but no plan.
fn base_snapshot() -> &'static str {
    r#"{
        "designations": [
            { "id": 1, "name": "Fleet Executive", "manpowerPlanningRequired": true },
            { "id": 2, "name": "Charging Operator", "manpowerPlanningRequired": true },
            { "id": 3, "name": "Workshop Technician", "manpowerPlanningRequired": true },
            { "id": 4, "name": "Senior Workshop Technician", "manpowerPlanningRequired": true },
            { "id": 5, "name": "Associate Workshop Technician", "manpowerPlanningRequired": true },
            { "id": 6, "name": "Centre Manager", "manpowerPlanningRequired": true }
        ],
        "centres": [
            { "id": 10, "name": "Hub North", "clusterId": 100 },
            { "id": 11, "name": "Hub South", "clusterId": 100 }
        ],
        "clusters": [
            { "id": 100, "name": "Central", "cityId": 1000, "shrinkagePercent": 20.0 }
        ],
        "cities": [
            { "id": 1000, "name": "Pune" }
        ],
        "manpowerPlans": [
            { "centreId": 10, "designationId": 1, "numShifts": 2, "employeesPerShift": 5 },
            { "centreId": 11, "designationId": 1, "numShifts": 1, "employeesPerShift": 2 },
            { "centreId": 10, "designationId": 2, "numShifts": 4, "employeesPerShift": 1 }
        ],
        "workshopPlans": [
            {
                "cityId": 1000,
                "dau": 1000,
                "bikesInCity": 500,
                "faultRatePercent": 8.0,
                "perMechanicCapacity": 10,
                "shrinkagePercent": 15.0,
                "useDau": true,
                "useBic": false
            }
        ],
        "headcounts": [
            { "centreId": 10, "designationId": 1, "count": 8 },
            { "centreId": 11, "designationId": 1, "count": 3 },
            { "centreId": 10, "designationId": 2, "count": 5 },
            { "centreId": 10, "designationId": 3, "count": 3 },
            { "centreId": 11, "designationId": 4, "count": 4 },
            { "centreId": 11, "designationId": 5, "count": 5 },
            { "centreId": 10, "designationId": 6, "count": 2 }
        ]
    }"#
}

fn run_ok(input: String) -> serde_json::Value {
    let output = cmd()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains(r#""ok":true"#))
        .get_output()
        .stdout
        .clone();
    serde_json::from_str(&String::from_utf8(output).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Test 1: centre_planning_basic
// Single centre; required equals base because shrinkage belongs to the cluster.
// ---------------------------------------------------------------------------

#[test]
fn centre_planning_basic() {
    let input = format!(
        r#"{{"command":"centrePlanning","centreId":10,"snapshot":{}}}"#,
        base_snapshot()
    );
    let parsed = run_ok(input);

    assert_eq!(parsed["data"]["centreName"], "Hub North");
    let rows = parsed["data"]["designations"].as_array().unwrap();
    let fleet = rows
        .iter()
        .find(|r| r["designationName"] == "Fleet Executive")
        .unwrap();
    // 2 shifts x 5 employees, no shrinkage at centre scope.
    assert_eq!(fleet["baseManpower"], 10);
    assert_eq!(fleet["requiredManpower"], 10);
    assert_eq!(fleet["surplusDeficit"], -2);
    assert_eq!(fleet["shrinkagePercent"], serde_json::Value::Null);
}

// ---------------------------------------------------------------------------
// Test 2: cluster_summary_applies_shrinkage
// Summed base 12 at 20% shrinkage -> ceil(12 / 0.8) = 15.
// ---------------------------------------------------------------------------

#[test]
fn cluster_summary_applies_shrinkage() {
    let input = format!(
        r#"{{"command":"clusterSummary","clusterId":100,"snapshot":{}}}"#,
        base_snapshot()
    );
    let parsed = run_ok(input);

    let rows = parsed["data"]["designations"].as_array().unwrap();
    let fleet = rows
        .iter()
        .find(|r| r["designationName"] == "Fleet Executive")
        .unwrap();
    assert_eq!(fleet["baseManpower"], 12);
    assert_eq!(fleet["requiredManpower"], 15);
    assert_eq!(fleet["shrinkagePercent"], 20.0);
}

// ---------------------------------------------------------------------------
// Test 3: city_analysis_workshop_requirement
// DAU 1000, fault 8%, capacity 10, shrinkage 15% -> ceil(9.41) = 10, and the
// three variant headcounts merge into one row (3 + 4 + 5 = 12).
// ---------------------------------------------------------------------------

#[test]
fn city_analysis_workshop_requirement() {
    let input = format!(
        r#"{{"command":"cityAnalysis","cityId":1000,"snapshot":{}}}"#,
        base_snapshot()
    );
    let parsed = run_ok(input);

    assert_eq!(parsed["data"]["workshopTechnicianRequired"], 10);

    let rows = parsed["data"]["designations"].as_array().unwrap();
    let merged = rows
        .iter()
        .find(|r| {
            r["designationName"]
                .as_str()
                .unwrap()
                .starts_with("Workshop Technician +")
        })
        .unwrap();
    assert_eq!(merged["currentHeadcount"], 12);
    assert_eq!(merged["requiredManpower"], 10);
    assert_eq!(merged["planningType"], "demandDriven");
    assert_eq!(merged["designationId"], serde_json::Value::Null);

    // The variants must not also appear as standalone rows.
    assert!(rows
        .iter()
        .all(|r| r["designationName"] != "Senior Workshop Technician"));
}

// ---------------------------------------------------------------------------
// Test 4: pan_india_rolls_up
// One city only, so pan-India mirrors the city figures.
// ---------------------------------------------------------------------------

#[test]
fn pan_india_rolls_up() {
    let input = format!(
        r#"{{"command":"panIndiaAnalysis","snapshot":{}}}"#,
        base_snapshot()
    );
    let parsed = run_ok(input);

    assert_eq!(parsed["data"]["cities"].as_array().unwrap().len(), 1);
    assert_eq!(
        parsed["data"]["panIndia"]["workshopTechnicianRequired"],
        10
    );
    let totals = &parsed["data"]["panIndia"]["totals"];
    // Required: fleet 15 + operator 5 + workshop 10; headcount 11 + 5 + 12 + 2.
    assert_eq!(totals["requiredManpower"], 30);
    assert_eq!(totals["currentHeadcount"], 30);
    assert_eq!(totals["surplusDeficit"], 0);
}

// ---------------------------------------------------------------------------
// Test 5: bikes_per_employee_null_ratio
// No headcounts at all: the ratio must be null (N/A), never a division error.
// ---------------------------------------------------------------------------

#[test]
fn bikes_per_employee_null_ratio() {
    let snapshot = base_snapshot().replace(
        r#""headcounts": [
            { "centreId": 10, "designationId": 1, "count": 8 },
            { "centreId": 11, "designationId": 1, "count": 3 },
            { "centreId": 10, "designationId": 2, "count": 5 },
            { "centreId": 10, "designationId": 3, "count": 3 },
            { "centreId": 11, "designationId": 4, "count": 4 },
            { "centreId": 11, "designationId": 5, "count": 5 },
            { "centreId": 10, "designationId": 6, "count": 2 }
        ]"#,
        r#""headcounts": []"#,
    );
    let input = format!(
        r#"{{"command":"bikesPerEmployee","useBic":false,"snapshot":{}}}"#,
        snapshot
    );
    let parsed = run_ok(input);

    let city = &parsed["data"]["cityWise"][0];
    assert_eq!(city["bikes"], 1000);
    assert_eq!(city["employees"], 0);
    assert_eq!(city["ratio"], serde_json::Value::Null);
    assert_eq!(parsed["data"]["panIndia"]["ratio"], serde_json::Value::Null);
}

// ---------------------------------------------------------------------------
// Test 6: bikes_per_employee_toggle
// useBic switches the numerator from DAU to bikes-in-city.
// ---------------------------------------------------------------------------

#[test]
fn bikes_per_employee_toggle() {
    let input = format!(
        r#"{{"command":"bikesPerEmployee","useBic":true,"snapshot":{}}}"#,
        base_snapshot()
    );
    let parsed = run_ok(input);

    let city = &parsed["data"]["cityWise"][0];
    assert_eq!(city["bikes"], 500);
    assert_eq!(city["employees"], 30);
}

// ---------------------------------------------------------------------------
// Test 7: ambiguous_demand_flags_warn
// Both useDau and useBic set: DAU wins and a warning is surfaced.
// ---------------------------------------------------------------------------

#[test]
fn ambiguous_demand_flags_warn() {
    let snapshot = base_snapshot().replace(r#""useBic": false"#, r#""useBic": true"#);
    let input = format!(
        r#"{{"command":"cityAnalysis","cityId":1000,"snapshot":{}}}"#,
        snapshot
    );
    let parsed = run_ok(input);

    assert_eq!(parsed["data"]["workshopTechnicianRequired"], 10);
    let warnings = parsed["data"]["warnings"].as_array().unwrap();
    assert!(warnings
        .iter()
        .any(|w| w.as_str().unwrap().contains("defaulting to DAU")));
}

// ---------------------------------------------------------------------------
// Test 8: validate_valid_snapshot
// The base snapshot has no structural errors.
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_snapshot() {
    let input = format!(r#"{{"command":"validate","snapshot":{}}}"#, base_snapshot());
    let parsed = run_ok(input);

    let errors = parsed["data"]["errors"].as_array().unwrap();
    assert!(errors.is_empty(), "expected no errors, got: {:?}", errors);
    // The operator plan carries 4 shifts, which is fine for a truck-based
    // designation, so no policy warning either.
    let warnings = parsed["data"]["warnings"].as_array().unwrap();
    assert!(
        warnings.is_empty(),
        "expected no warnings, got: {:?}",
        warnings
    );
}

// ---------------------------------------------------------------------------
// Test 9: validate_invalid_snapshot
// A dangling cluster reference and a negative shift count must both surface.
// ---------------------------------------------------------------------------

#[test]
fn validate_invalid_snapshot() {
    let snapshot = base_snapshot()
        .replace(r#""clusterId": 100 }"#, r#""clusterId": 999 }"#)
        .replace(r#""numShifts": 2"#, r#""numShifts": -2"#);
    let input = format!(r#"{{"command":"validate","snapshot":{}}}"#, snapshot);
    let parsed = run_ok(input);

    let errors = parsed["data"]["errors"].as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e.as_str().unwrap().contains("references cluster 999")));
    assert!(errors
        .iter()
        .any(|e| e.as_str().unwrap().contains("negative shift count")));
}

// ---------------------------------------------------------------------------
// Test 10: unknown_scope_id
// Asking for a centre that isn't in the snapshot fails with ok:false.
// ---------------------------------------------------------------------------

#[test]
fn unknown_scope_id() {
    let input = format!(
        r#"{{"command":"centrePlanning","centreId":404,"snapshot":{}}}"#,
        base_snapshot()
    );
    cmd()
        .write_stdin(input)
        .assert()
        .failure()
        .stdout(contains(r#""ok":false"#))
        .stdout(contains("Centre 404"));
}

// ---------------------------------------------------------------------------
// Test 11: invalid_json_input
// Malformed JSON must make the binary exit with code 1 and ok:false.
// ---------------------------------------------------------------------------

#[test]
fn invalid_json_input() {
    let input = r#"{ this is not valid json "#;

    cmd()
        .write_stdin(input)
        .assert()
        .failure()
        .stdout(contains(r#""ok":false"#))
        .stdout(contains("error"));
}

// ---------------------------------------------------------------------------
// Test 12: unknown_command
// JSON with an unknown command value must be handled gracefully (ok:false).
// ---------------------------------------------------------------------------

#[test]
fn unknown_command() {
    let input = format!(
        r#"{{"command":"unknownCommand","snapshot":{}}}"#,
        base_snapshot()
    );

    cmd()
        .write_stdin(input)
        .assert()
        .failure()
        .stdout(contains(r#""ok":false"#))
        .stdout(contains("error"));
}
