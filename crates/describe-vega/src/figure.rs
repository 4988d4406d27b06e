//! Vega-Lite specifications for the three plot kinds.
//!
//! Figures carry data, mark and encodings only. Titles, axis titles and
//! size are applied at render time from the plot style.

use chrono::NaiveDate;
use describe_engine::Level;
use describe_model::{Figure, LineStyle};
use serde_json::{json, Map, Value};

pub const SCHEMA_URL: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Field reference with Vega-Lite's nested-access characters escaped.
pub fn field_ref(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '.' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Bar chart of level proportions, levels in the order given.
pub fn histogram_figure(levels: &[Level]) -> Figure {
    let values: Vec<Value> = levels
        .iter()
        .map(|l| json!({ "level": l.value, "count": l.count, "proportion": l.proportion }))
        .collect();

    Figure::new(json!({
        "$schema": SCHEMA_URL,
        "data": { "values": values },
        "mark": { "type": "bar" },
        "encoding": {
            "x": { "field": "level", "type": "ordinal", "sort": null },
            "y": { "field": "proportion", "type": "quantitative" },
            "tooltip": [
                { "field": "level" },
                { "field": "count", "type": "quantitative", "format": "," },
                { "field": "proportion", "type": "quantitative", "format": ".4f" }
            ]
        }
    }))
}

/// Value against rank `u` in [0, 1].
pub fn quantile_figure(points: &[(f64, f64)]) -> Figure {
    let values: Vec<Value> = points
        .iter()
        .map(|(u, v)| json!({ "u": u, "value": v }))
        .collect();

    Figure::new(json!({
        "$schema": SCHEMA_URL,
        "data": { "values": values },
        "mark": { "type": "line", "point": true },
        "encoding": {
            "x": { "field": "u", "type": "quantitative", "scale": { "domain": [0, 1] } },
            "y": { "field": "value", "type": "quantitative" }
        }
    }))
}

/// Encoding type guessed from the first non-null value of a column.
fn measure_type(rows: &[Map<String, Value>], field: &str) -> &'static str {
    let first = rows.iter().find_map(|r| r.get(field).filter(|v| !v.is_null()));
    match first {
        Some(Value::Number(_)) => "quantitative",
        Some(Value::String(s))
            if s
                .get(..10)
                .is_some_and(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok()) =>
        {
            "temporal"
        }
        Some(Value::String(_)) | Some(Value::Bool(_)) => "nominal",
        _ => "quantitative",
    }
}

/// `fields[0]` against every other field, folded into one series column.
pub fn xy_figure(
    rows: Vec<Map<String, Value>>,
    fields: &[String],
    color: Option<&str>,
    line: LineStyle,
) -> Figure {
    let x = fields.first().map(String::as_str).unwrap_or_default();
    let ys: Vec<&String> = fields.iter().skip(1).collect();

    let mark = match line {
        LineStyle::Markers => json!({ "type": "point", "filled": true }),
        LineStyle::Lines => json!({ "type": "line" }),
        LineStyle::LinesMarkers => json!({ "type": "line", "point": true }),
    };

    let color_enc = match color {
        Some(c) => json!({ "field": field_ref(c), "type": measure_type(&rows, c) }),
        None => json!({ "field": "series", "type": "nominal" }),
    };
    let mut encoding = json!({
        "x": { "field": field_ref(x), "type": measure_type(&rows, x) },
        "y": { "field": "value", "type": "quantitative" },
        "color": color_enc
    });
    if color.is_some() && ys.len() > 1 {
        encoding["shape"] = json!({ "field": "series", "type": "nominal" });
    }

    Figure::new(json!({
        "$schema": SCHEMA_URL,
        "data": { "values": rows },
        "transform": [
            { "fold": ys.iter().map(|y| field_ref(y)).collect::<Vec<_>>(), "as": ["series", "value"] }
        ],
        "mark": mark,
        "encoding": encoding
    }))
}
