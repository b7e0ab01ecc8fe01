use mobgate_core::{MobgateError, MobgateResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Status values that count as a satisfied control, after trimming and lowercasing.
pub const PASS_TOKENS: [&str; 3] = ["pass", "passed", "compliant"];

/// A control the service reported as not satisfied.
///
/// The service's JSON entry is kept verbatim; the accessors apply the
/// fallbacks used when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlViolation(Value);

impl ControlViolation {
    /// Wraps a raw control entry.
    pub fn new(entry: Value) -> Self {
        Self(entry)
    }

    /// The entry exactly as the service sent it.
    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// Control identifier: `control`, `id` or `title`, else `Unknown control`.
    pub fn requirement(&self) -> String {
        first_truthy(&self.0, &["control", "id", "title"])
            .map(json_text)
            .unwrap_or_else(|| "Unknown control".to_string())
    }

    /// Free-text description: `description` or `details`, else empty.
    pub fn description(&self) -> String {
        first_truthy(&self.0, &["description", "details"])
            .map(json_text)
            .unwrap_or_default()
    }

    /// Remediation guidance: `remediation` or `remedy`, else empty.
    pub fn guidance(&self) -> String {
        first_truthy(&self.0, &["remediation", "remedy"])
            .map(json_text)
            .unwrap_or_default()
    }
}

/// Outcome of a MASVS compliance check at one level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResult {
    /// The requested MASVS level.
    pub level: String,
    /// Number of satisfied controls.
    pub passed: u64,
    /// Violated controls, in the order the service listed them.
    pub failed: Vec<ControlViolation>,
}

impl ComplianceResult {
    /// True iff no control failed.
    pub fn is_compliant(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The schema a compliance payload uses. MobSF releases disagree on this.
#[derive(Debug)]
enum ResponseShape<'a> {
    /// A list of per-control entries, each carrying its own status.
    PerControl(&'a [Value]),
    /// Only aggregate counts and a list of failed controls (always an object).
    Aggregate(&'a Value),
    /// Neither shape is present.
    Empty,
}

impl<'a> ResponseShape<'a> {
    fn detect(data: &'a Value) -> Self {
        if let Some(controls) =
            first_truthy(data, &["controls", "masvs_controls"]).and_then(Value::as_array)
        {
            return ResponseShape::PerControl(controls);
        }
        match first_truthy(data, &["summary", "masvs_summary"]).filter(|v| v.is_object()) {
            Some(aggregate) => ResponseShape::Aggregate(aggregate),
            None => ResponseShape::Empty,
        }
    }
}

/// Classifies a MASVS compliance payload into a [`ComplianceResult`].
///
/// A per-control list (`controls` / `masvs_controls`) takes precedence. The
/// aggregate summary (`summary` / `masvs_summary`) is only consulted when no
/// such list is present.
pub fn parse_masvs(data: &Value, level: &str) -> MobgateResult<ComplianceResult> {
    if !data.is_object() {
        return Err(MobgateError::MalformedResponse(format!(
            "MASVS report is not a JSON object: {data}"
        )));
    }

    let (passed, failed) = match ResponseShape::detect(data) {
        ResponseShape::PerControl(controls) => {
            debug!(entries = controls.len(), "Classifying per-control MASVS entries");
            classify_controls(controls)
        }
        ResponseShape::Aggregate(aggregate) => {
            debug!("Reading aggregate MASVS summary");
            read_aggregate(aggregate)
        }
        ResponseShape::Empty => {
            debug!("MASVS report carries no controls or summary");
            (0, Vec::new())
        }
    };

    Ok(ComplianceResult {
        level: level.to_string(),
        passed,
        failed,
    })
}

fn classify_controls(controls: &[Value]) -> (u64, Vec<ControlViolation>) {
    let mut passed = 0;
    let mut failed = Vec::new();

    for entry in controls {
        let status = first_truthy(entry, &["status", "value"])
            .map(json_text)
            .unwrap_or_default();
        let status = status.trim().to_lowercase();

        if PASS_TOKENS.contains(&status.as_str()) {
            passed += 1;
        } else {
            // Missing or unknown status counts as a failure.
            failed.push(ControlViolation::new(entry.clone()));
        }
    }

    (passed, failed)
}

fn read_aggregate(aggregate: &Value) -> (u64, Vec<ControlViolation>) {
    let failed = first_truthy(aggregate, &["failed", "non_compliant"])
        .and_then(Value::as_array)
        .map(|list| list.iter().cloned().map(ControlViolation::new).collect())
        .unwrap_or_default();
    let passed = first_truthy(aggregate, &["pass", "passed"])
        .and_then(Value::as_u64)
        .unwrap_or(0);

    (passed, failed)
}

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects are empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The first non-empty value among `keys` on `value`, if it is an object.
fn first_truthy<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| is_truthy(v))
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
