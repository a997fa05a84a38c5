//! Manpower-requirement computation engine.
//!
//! A pure function over a snapshot of planning rows: shift-based and
//! truck-based base manpower per centre, demand-driven workshop-technician
//! capacity per city, shrinkage buffering, and centre → cluster → city →
//! pan-India aggregation with surplus/deficit reporting. The surrounding
//! product (store, HTTP API, UI) lives in the Node.js host; this crate is
//! embedded there via the `manpower-node` bindings or driven through the
//! JSON stdin/stdout binary.

pub mod aggregator;
pub mod calc;
pub mod model;
pub mod validator;
