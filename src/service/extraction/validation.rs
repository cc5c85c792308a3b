//! Schema validation for LLM extraction output
//!
//! Turns the untyped JSON tree returned by the generator into a typed
//! [`ExtractionResponse`]. Every violated constraint is collected with the
//! path of the offending field; a response with any violation is rejected as a
//! whole.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde_json::{Map, Value};
use std::fmt;

use crate::model::{
    ConfidenceLevel, ConfidenceSummary, Context, CoverageGap, EvidenceCategory, EvidenceItem,
    ExtractionResponse, LlmFamily, Metadata, Metric, MetricType, Performance, SchemaEnum, Score,
    SourceInfo,
};

/// Rejected extraction with one message per violated constraint
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} violation(s): {}", .violations.len(), .violations.join("; "))]
pub struct SchemaValidationError {
    pub violations: Vec<String>,
}

impl SchemaValidationError {
    /// Whether any violation concerns the field at `path`
    pub fn mentions(&self, path: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.split_once(": ").is_some_and(|(field, _)| field == path))
    }
}

/// Validate a raw extraction response
pub fn validate_extraction_response(
    raw: &Value,
) -> Result<ExtractionResponse, SchemaValidationError> {
    let mut validator = Validator::default();
    let response = validator.extraction_response(raw);

    match response {
        Some(response) if validator.violations.is_empty() => Ok(response),
        _ => Err(SchemaValidationError {
            violations: validator.violations,
        }),
    }
}

/// Check that `value` is an ISO 8601 date or date-time
///
/// Dates may be calendar (`2025-02-10`, `20250210`) or week dates
/// (`2025-W07`, `2025-W07-1`, `2025W071`). An optional time follows a `T` or
/// a space, at hour, minute, second or fractional precision in extended or
/// basic form, with an optional `Z` or `±HH[:MM[:SS[.f]]]` offset. Surrounding
/// whitespace is rejected.
pub fn is_iso8601(value: &str) -> bool {
    if !value.is_ascii() {
        return false;
    }

    match value.split_once(['T', ' ']) {
        Some((date, time)) => is_iso_date(date) && is_iso_time(time),
        None => is_iso_date(value),
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn digits(s: &str) -> Option<u32> {
    if all_digits(s) { s.parse().ok() } else { None }
}

fn is_iso_date(date: &str) -> bool {
    let calendar = |y: &str, m: &str, d: &str| match (digits(y), digits(m), digits(d)) {
        (Some(y @ 1..), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y as i32, m, d).is_some(),
        _ => false,
    };
    let week = |y: &str, w: &str, d: &str| match (digits(y), digits(w), digits(d)) {
        (Some(y @ 1..), Some(w), Some(d @ 1..=7)) => Weekday::try_from((d - 1) as u8)
            .ok()
            .and_then(|day| NaiveDate::from_isoywd_opt(y as i32, w, day))
            .is_some(),
        _ => false,
    };

    let b = date.as_bytes();
    match date.len() {
        // YYYY-Www-D
        10 if b[5] == b'W' => {
            b[4] == b'-' && b[8] == b'-' && week(&date[..4], &date[6..8], &date[9..])
        }
        // YYYY-MM-DD
        10 => b[4] == b'-' && b[7] == b'-' && calendar(&date[..4], &date[5..7], &date[8..]),
        // YYYY-Www
        8 if b[5] == b'W' => b[4] == b'-' && week(&date[..4], &date[6..], "1"),
        // YYYYWwwD
        8 if b[4] == b'W' => week(&date[..4], &date[5..7], &date[7..]),
        // YYYYMMDD
        8 => calendar(&date[..4], &date[4..6], &date[6..]),
        // YYYYWww
        7 => b[4] == b'W' && week(&date[..4], &date[5..], "1"),
        _ => false,
    }
}

fn is_iso_time(time: &str) -> bool {
    let (clock, offset) = match time.find(['Z', '+', '-']) {
        Some(i) => (&time[..i], Some(&time[i..])),
        None => (time, None),
    };

    is_iso_clock(clock)
        && offset.is_none_or(|offset| match offset.strip_prefix(['+', '-']) {
            Some(rest) => is_iso_clock(rest),
            None => offset == "Z",
        })
}

/// `HH`, `HH:MM`, `HHMM`, `HH:MM:SS` or `HHMMSS`, seconds optionally fractional
fn is_iso_clock(clock: &str) -> bool {
    let (hms, fraction) = match clock.split_once(['.', ',']) {
        Some((hms, fraction)) => (hms, Some(fraction)),
        None => (clock, None),
    };

    let b = hms.as_bytes();
    let (h, m, s, with_seconds) = match hms.len() {
        2 => (hms, "00", "00", false),
        4 => (&hms[..2], &hms[2..], "00", false),
        5 if b[2] == b':' => (&hms[..2], &hms[3..], "00", false),
        6 => (&hms[..2], &hms[2..4], &hms[4..], true),
        8 if b[2] == b':' && b[5] == b':' => (&hms[..2], &hms[3..5], &hms[6..], true),
        _ => return false,
    };
    if fraction.is_some_and(|f| !with_seconds || !all_digits(f)) {
        return false;
    }

    match (digits(h), digits(m), digits(s)) {
        (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s).is_some(),
        _ => false,
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Walks the raw tree, building typed records and recording violations
#[derive(Default)]
struct Validator {
    violations: Vec<String>,
}

impl Validator {
    fn violation(&mut self, path: &str, message: impl fmt::Display) {
        self.violations.push(format!("{path}: {message}"));
    }

    fn wrong_type(&mut self, path: &str, expected: &str, found: &Value) {
        self.violation(path, format!("expected {expected}, found {}", kind(found)));
    }

    /// Look up a required key, recording a violation when it is absent
    fn required<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<&'a Value> {
        let value = obj.get(key);
        if value.is_none() {
            self.violation(&child(path, key), "field required");
        }
        value
    }

    fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.wrong_type(path, "object", other);
                None
            }
        }
    }

    fn string(&mut self, value: &Value, path: &str) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.wrong_type(path, "string", other);
                None
            }
        }
    }

    fn integer(&mut self, value: &Value, path: &str) -> Option<i64> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            _ => None,
        };
        if parsed.is_none() {
            self.wrong_type(path, "integer", value);
        }
        parsed
    }

    fn required_string(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<String> {
        let value = self.required(obj, path, key)?;
        self.string(value, &child(path, key))
    }

    /// Absent and null both mean "not given"
    fn optional_string(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<Option<String>> {
        match obj.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(value) => self.string(value, &child(path, key)).map(Some),
        }
    }

    fn optional_integer(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<Option<i64>> {
        match obj.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(value) => self.integer(value, &child(path, key)).map(Some),
        }
    }

    fn required_enum<T: SchemaEnum>(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
    ) -> Option<T> {
        let literal = self.required_string(obj, path, key)?;
        let parsed = T::parse(&literal);
        if parsed.is_none() {
            self.violation(
                &child(path, key),
                format!("'{}' is not one of [{}]", literal, T::expected()),
            );
        }
        parsed
    }

    /// Validate every element of a required array, even after a failure
    fn required_list<T>(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
        mut element: impl FnMut(&mut Self, &Value, &str) -> Option<T>,
    ) -> Option<Vec<T>> {
        let value = self.required(obj, path, key)?;
        let field = child(path, key);
        let Value::Array(items) = value else {
            self.wrong_type(&field, "array", value);
            return None;
        };

        let mut parsed = Vec::with_capacity(items.len());
        let mut complete = true;
        for (i, item) in items.iter().enumerate() {
            match element(self, item, &format!("{field}[{i}]")) {
                Some(value) => parsed.push(value),
                None => complete = false,
            }
        }
        complete.then_some(parsed)
    }

    fn required_object<T>(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
        key: &str,
        record: impl FnOnce(&mut Self, &Map<String, Value>, &str) -> Option<T>,
    ) -> Option<T> {
        let value = self.required(obj, path, key)?;
        let field = child(path, key);
        let map = self.object(value, &field)?;
        record(self, map, &field)
    }

    fn extraction_response(&mut self, raw: &Value) -> Option<ExtractionResponse> {
        let obj = self.object(raw, "$")?;

        let evidence_items = self.required_list(obj, "", "evidence_items", |v, item, path| {
            v.evidence_item(item, path)
        });
        let metadata = self.required_object(obj, "", "metadata", Self::metadata);

        Some(ExtractionResponse {
            evidence_items: evidence_items?,
            metadata: metadata?,
        })
    }

    fn evidence_item(&mut self, value: &Value, path: &str) -> Option<EvidenceItem> {
        let obj = self.object(value, path)?;

        let category = self.required_enum::<EvidenceCategory>(obj, path, "category");
        let llm_family = self.required_enum::<LlmFamily>(obj, path, "llm_family");
        let capability = self.required_string(obj, path, "capability");
        let metric = self.required_object(obj, path, "metric", Self::metric);
        let performance = self.required_object(obj, path, "performance", Self::performance);
        let context = self.required_object(obj, path, "context", Self::context);
        let source_info = self.required_object(obj, path, "source_info", Self::source_info);

        Some(EvidenceItem {
            category: category?,
            llm_family: llm_family?,
            capability: capability?,
            metric: metric?,
            performance: performance?,
            context: context?,
            source_info: source_info?,
        })
    }

    fn metric(&mut self, obj: &Map<String, Value>, path: &str) -> Option<Metric> {
        let metric_type = self.required_enum::<MetricType>(obj, path, "type");
        let value = self.required_string(obj, path, "value");
        let unit = self.optional_string(obj, path, "unit");

        Some(Metric {
            metric_type: metric_type?,
            value: value?,
            unit: unit?,
        })
    }

    fn performance(&mut self, obj: &Map<String, Value>, path: &str) -> Option<Performance> {
        let score = self.required(obj, path, "score").and_then(|value| match value {
            Value::Number(n) => n.as_f64().map(Score::Number),
            Value::String(s) => Some(Score::Text(s.clone())),
            other => {
                self.wrong_type(&child(path, "score"), "number or string", other);
                None
            }
        });
        let baseline = self.optional_string(obj, path, "baseline");
        let comparison = self.optional_string(obj, path, "comparison");

        Some(Performance {
            score: score?,
            baseline: baseline?,
            comparison: comparison?,
        })
    }

    fn context(&mut self, obj: &Map<String, Value>, path: &str) -> Option<Context> {
        let test_conditions = self.required_string(obj, path, "test_conditions");
        let limitations =
            self.required_list(obj, path, "limitations", |v, item, p| v.string(item, p));
        let assumptions =
            self.required_list(obj, path, "assumptions", |v, item, p| v.string(item, p));

        Some(Context {
            test_conditions: test_conditions?,
            limitations: limitations?,
            assumptions: assumptions?,
        })
    }

    fn source_info(&mut self, obj: &Map<String, Value>, path: &str) -> Option<SourceInfo> {
        let section = self.required_string(obj, path, "section");
        let page = self.optional_integer(obj, path, "page");
        let confidence = self.required_enum::<ConfidenceLevel>(obj, path, "confidence");

        Some(SourceInfo {
            section: section?,
            page: page?,
            confidence: confidence?,
        })
    }

    fn coverage_gap(&mut self, value: &Value, path: &str) -> Option<CoverageGap> {
        let obj = self.object(value, path)?;
        let category = self.required_string(obj, path, "category");
        let reason = self.required_string(obj, path, "reason");

        Some(CoverageGap {
            category: category?,
            reason: reason?,
        })
    }

    fn confidence_summary(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Option<ConfidenceSummary> {
        let overall_score = self.required_enum::<ConfidenceLevel>(obj, path, "overall_score");
        let methodology_strength =
            self.required_enum::<ConfidenceLevel>(obj, path, "methodology_strength");
        let data_quality = self.required_enum::<ConfidenceLevel>(obj, path, "data_quality");

        Some(ConfidenceSummary {
            overall_score: overall_score?,
            methodology_strength: methodology_strength?,
            data_quality: data_quality?,
        })
    }

    fn metadata(&mut self, obj: &Map<String, Value>, path: &str) -> Option<Metadata> {
        let total_evidence_points = self
            .required(obj, path, "total_evidence_points")
            .and_then(|value| self.integer(value, &child(path, "total_evidence_points")));
        let coverage_gaps =
            self.required_list(obj, path, "coverage_gaps", |v, item, p| v.coverage_gap(item, p));
        let confidence_summary =
            self.required_object(obj, path, "confidence_summary", Self::confidence_summary);
        let extraction_timestamp = self
            .required_string(obj, path, "extraction_timestamp")
            .and_then(|timestamp| {
                if is_iso8601(&timestamp) {
                    Some(timestamp)
                } else {
                    self.violation(
                        &child(path, "extraction_timestamp"),
                        format!("invalid ISO 8601 timestamp '{}'", timestamp),
                    );
                    None
                }
            });

        Some(Metadata {
            total_evidence_points: total_evidence_points?,
            coverage_gaps: coverage_gaps?,
            confidence_summary: confidence_summary?,
            extraction_timestamp: extraction_timestamp?,
        })
    }
}
