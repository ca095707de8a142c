//! Status rendering for the console: a fixed-width line or a JSON object.

use pultruder_core::Snapshot;
use serde_json::json;

pub fn status_line(s: &Snapshot) -> String {
    format!(
        "{:<8} {}  length {:.3} m  complete {:.1} %",
        s.state.label(),
        s.elapsed_hms(),
        s.length_produced_m,
        s.percent_complete
    )
}

pub fn status_json(s: &Snapshot) -> serde_json::Value {
    json!({
        "state": s.state.to_string(),
        "duration": s.elapsed_hms(),
        "elapsed_s": s.elapsed_secs(),
        "length_produced_m": s.length_produced_m,
        "percent_complete": s.percent_complete,
        "raw_percent": s.raw_percent,
    })
}

/// Print a status snapshot to stdout in the selected format.
pub fn emit(s: &Snapshot, json: bool) {
    if json {
        println!("{}", status_json(s));
    } else {
        println!("{}", status_line(s));
    }
}
