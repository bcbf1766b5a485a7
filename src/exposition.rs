// Prometheus text exposition: one `name{labels} value[ timestamp_ms]` line per sample

use std::fmt::Write as _;

/// Values below this magnitude that are whole numbers render without a decimal point.
const INTEGRAL_LIMIT: f64 = 1e15;

/// One sample in the exposition format. Labels render in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    name: String,
    labels: Vec<(String, String)>,
    value: f64,
    timestamp_ms: Option<i64>,
}

impl MetricLine {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            value,
            timestamp_ms: None,
        }
    }

    /// Adds a label. A key that is already present keeps its position and takes the new value,
    /// so keys stay unique within the line.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.labels.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.labels.push((key, value)),
        }
        self
    }

    pub fn labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in labels {
            self = self.label(k, v);
        }
        self
    }

    pub fn at(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_value(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn label_keys(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(k, _)| k.as_str())
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(64 + self.labels.len() * 24);
        self.render_into(&mut out);
        out
    }

    /// Appends the rendered line (without a trailing newline) to `out`.
    pub fn render_into(&self, out: &mut String) {
        out.push_str(&self.name);
        out.push('{');
        for (i, (k, v)) in self.labels.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(k);
            out.push_str("=\"");
            escape_label_value(v, out);
            out.push('"');
        }
        out.push_str("} ");
        out.push_str(&format_value(self.value));
        if let Some(ts) = self.timestamp_ms {
            let _ = write!(out, " {ts}");
        }
    }
}

/// Whole numbers with magnitude below 1e15 render as integers; everything else with two decimals.
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < INTEGRAL_LIMIT {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

fn escape_label_value(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
}

/// Joins lines into one payload with a trailing newline.
pub fn render_payload<'a>(lines: impl IntoIterator<Item = &'a MetricLine>) -> String {
    let mut out = String::new();
    for line in lines {
        line.render_into(&mut out);
        out.push('\n');
    }
    out
}
