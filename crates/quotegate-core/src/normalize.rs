//! Per-operation normalization of provider payloads.
//!
//! Each gateway operation has one explicit normalizer with a documented
//! output shape, instead of leaning on whatever the upstream JSON happens
//! to look like. All normalizers accept a single `quoteSummary` result
//! object (or chart result, for history) and return the mapping described
//! in their doc comment. Missing or malformed sections yield an empty
//! mapping; the operation layer turns emptiness into a not-found.

use serde_json::Value;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::provider::{HistoryRow, HoldersSnapshot, QueryResult};
use crate::yahoo::ChartResult;

/// Modules merged into the `info` mapping, in merge order. Later modules
/// overwrite earlier keys, so canonical price fields win.
pub const INFO_MODULES: [&str; 4] = [
    "assetProfile",
    "summaryDetail",
    "defaultKeyStatistics",
    "price",
];

/// Collapse provider value wrappers: an object carrying a `raw` key becomes
/// its raw value, recursively. Other values pass through untouched.
pub fn simplify(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(raw) = map.get("raw") {
                return raw.clone();
            }
            Value::Object(
                map.iter()
                    .map(|(key, inner)| (key.clone(), simplify(inner)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(simplify).collect()),
        other => other.clone(),
    }
}

/// `info`: flat mapping merged from the summary modules, wrappers collapsed.
pub fn info(result: &Value) -> QueryResult {
    let mut out = QueryResult::new();
    for module in INFO_MODULES {
        let Some(fields) = result.get(module).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in fields {
            if key == "maxAge" {
                continue;
            }
            out.insert(key.clone(), simplify(value));
        }
    }
    out
}

/// `financials`: `{line_item: {end_date: value}}`, column-oriented over the
/// annual income-statement history.
pub fn financials(result: &Value) -> QueryResult {
    let mut out = QueryResult::new();
    let statements = result
        .pointer("/incomeStatementHistory/incomeStatementHistory")
        .and_then(Value::as_array);
    let Some(statements) = statements else {
        return out;
    };

    for statement in statements {
        let Some(fields) = statement.as_object() else {
            continue;
        };
        let Some(end_date) = fields
            .get("endDate")
            .and_then(|v| v.get("fmt"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        for (key, value) in fields {
            if key == "endDate" || key == "maxAge" {
                continue;
            }
            let per_period = out
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Default::default()));
            if let Some(columns) = per_period.as_object_mut() {
                columns.insert(end_date.to_owned(), simplify(value));
            }
        }
    }
    out
}

/// `earnings`: `{figure: {year: value}}` over the yearly financials chart,
/// with `Revenue` and `Earnings` figures.
pub fn earnings(result: &Value) -> QueryResult {
    let mut revenue = QueryResult::new();
    let mut net = QueryResult::new();

    let years = result
        .pointer("/earnings/financialsChart/yearly")
        .and_then(Value::as_array);
    for row in years.into_iter().flatten() {
        let Some(year) = row.get("date") else {
            continue;
        };
        let year = match year {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => continue,
        };
        if let Some(value) = row.get("revenue") {
            revenue.insert(year.clone(), simplify(value));
        }
        if let Some(value) = row.get("earnings") {
            net.insert(year, simplify(value));
        }
    }

    let mut out = QueryResult::new();
    if !revenue.is_empty() {
        out.insert("Revenue".into(), Value::Object(revenue));
    }
    if !net.is_empty() {
        out.insert("Earnings".into(), Value::Object(net));
    }
    out
}

/// `holders`: the major-holders breakdown as a flat mapping, plus the
/// institutional ownership list keyed by organization. Either block may be
/// absent on its own.
pub fn holders(result: &Value) -> HoldersSnapshot {
    let major_holders = result
        .get("majorHoldersBreakdown")
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .filter(|(key, _)| key.as_str() != "maxAge")
                .map(|(key, value)| (key.clone(), simplify(value)))
                .collect::<QueryResult>()
        })
        .filter(|block| !block.is_empty());

    let institutional_holders = result
        .pointer("/institutionOwnership/ownershipList")
        .and_then(Value::as_array)
        .map(|rows| {
            let mut block = QueryResult::new();
            for row in rows {
                let Some(organization) = row.get("organization").and_then(Value::as_str) else {
                    continue;
                };
                let mut detail = QueryResult::new();
                for (from, to) in [
                    ("pctHeld", "pct_held"),
                    ("position", "position"),
                    ("value", "value"),
                ] {
                    if let Some(value) = row.get(from) {
                        detail.insert(to.into(), simplify(value));
                    }
                }
                if let Some(date) = row
                    .get("reportDate")
                    .and_then(|v| v.get("fmt"))
                    .and_then(Value::as_str)
                {
                    detail.insert("report_date".into(), Value::String(date.to_owned()));
                }
                block.insert(organization.to_owned(), Value::Object(detail));
            }
            block
        })
        .filter(|block| !block.is_empty());

    HoldersSnapshot {
        major_holders,
        institutional_holders,
    }
}

/// `recommendations`: `{period: {strongBuy, buy, hold, sell, strongSell}}`
/// over the recommendation trend.
pub fn recommendations(result: &Value) -> QueryResult {
    let mut out = QueryResult::new();
    let trend = result
        .pointer("/recommendationTrend/trend")
        .and_then(Value::as_array);
    for row in trend.into_iter().flatten() {
        let Some(period) = row.get("period").and_then(Value::as_str) else {
            continue;
        };
        let mut counts = QueryResult::new();
        for key in ["strongBuy", "buy", "hold", "sell", "strongSell"] {
            if let Some(value) = row.get(key) {
                counts.insert(key.into(), simplify(value));
            }
        }
        out.insert(period.to_owned(), Value::Object(counts));
    }
    out
}

/// `calendar`: flat mapping of calendar fields. The provider returns either
/// a plain mapping or a one-row table; a table is reduced to its first row,
/// anything else counts as absent. The nested `earnings` block is merged
/// into the top level.
pub fn calendar(result: &Value) -> QueryResult {
    let mut events = result.get("calendarEvents");
    if let Some(Value::Array(rows)) = events {
        events = rows.first();
    }
    let Some(fields) = events.and_then(Value::as_object) else {
        return QueryResult::new();
    };

    let mut out = QueryResult::new();
    for (key, value) in fields {
        if key == "maxAge" {
            continue;
        }
        if key == "earnings" {
            if let Some(inner) = value.as_object() {
                for (inner_key, inner_value) in inner {
                    if inner_key == "maxAge" {
                        continue;
                    }
                    out.insert(inner_key.clone(), simplify(inner_value));
                }
                continue;
            }
        }
        out.insert(key.clone(), simplify(value));
    }
    out
}

/// `history`: one record per chart timestamp with a complete OHLC set.
/// Dates serialize as `YYYY-MM-DD`.
pub(crate) fn history_rows(chart: &ChartResult) -> Vec<HistoryRow> {
    let Some(timestamps) = chart.timestamp.as_ref() else {
        return Vec::new();
    };
    let Some(quote) = chart.indicators.quote.first() else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(timestamps.len());
    for (index, &unix) in timestamps.iter().enumerate() {
        let Some(date) = format_date(unix) else {
            continue;
        };
        let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(index),
            quote.high.get(index),
            quote.low.get(index),
            quote.close.get(index),
        ) else {
            continue;
        };
        rows.push(HistoryRow {
            date,
            open: *open,
            high: *high,
            low: *low,
            close: *close,
            volume: quote.volume.get(index).copied().flatten(),
        });
    }
    rows
}

fn format_date(unix: i64) -> Option<String> {
    let datetime = OffsetDateTime::from_unix_timestamp(unix).ok()?;
    datetime
        .format(format_description!("[year]-[month]-[day]"))
        .ok()
}
