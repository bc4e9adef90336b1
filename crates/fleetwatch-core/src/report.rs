//! Fixed-layout plain-text maintenance report for a single machine.

use crate::record::MachineRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

const RULE: &str = "==============================================";

/// Renders the scalar fields of a record as a fixed-layout report.
pub fn render(machine_id: &str, record: &MachineRecord, generated_at: DateTime<Utc>) -> String {
    let mut out = String::with_capacity(512);

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, " Predictive Maintenance Report: {}", machine_id);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        " Generated:       {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(out, " Status:          {}", record.status);
    let _ = writeln!(out, " Failure mode:    {}", record.mode);
    let _ = writeln!(out, " Health:          {:.1} %", record.health);
    let _ = writeln!(out, " RUL:             {:.2}", record.rul);
    let _ = writeln!(out, " Predicted RUL:   {:.2}", record.predicted_rul);
    let _ = writeln!(out, " Temperature:     {:.1} C", record.temperature);
    let _ = writeln!(out, " Vibration:       {:.2} mm/s", record.vibration);
    let _ = writeln!(
        out,
        " Anomaly:         {}",
        if record.anomaly { "YES" } else { "no" }
    );
    let _ = writeln!(out, " Samples:         {}", record.history.health.len());
    let _ = writeln!(out, "{}", RULE);

    out
}
