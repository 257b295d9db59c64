use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use tender_calc_core::format::{fmt_num, fmt_percent};

use super::{find_matrix, matrix_parts};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(matrix) = find_matrix(value) {
        print_matrix(matrix);
        print_ranking(value);
        if let Value::Object(envelope) = value {
            print_footer(envelope);
        }
        return;
    }

    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

/// Metric rows × scheme columns, amounts in ru-RU format.
fn print_matrix(matrix: &serde_json::Map<String, Value>) {
    let (codes, rows) = matrix_parts(matrix);
    let mut builder = Builder::default();

    let mut header = vec!["Показатель".to_string()];
    header.extend(codes);
    builder.push_record(header);

    for (metric, label, cells) in rows {
        let ratio = metric == "profitability";
        let mut record = vec![label];
        record.extend(cells.iter().map(|c| format_amount(c, ratio)));
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
}

fn print_ranking(value: &Value) {
    let ranking = match value
        .get("result")
        .and_then(|r| r.get("ranking"))
        .and_then(Value::as_array)
    {
        Some(r) if !r.is_empty() => r,
        _ => return,
    };

    println!("\nRanking:");
    for entry in ranking {
        let rank = entry.get("rank").map(|r| r.to_string()).unwrap_or_default();
        println!(
            "  {}. {} ({}) {} [{}]",
            rank,
            str_field(entry, "code"),
            str_field(entry, "name"),
            format_amount(str_field(entry, "profitability"), true),
            str_field(entry, "band"),
        );
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn format_amount(raw: &str, ratio: bool) -> String {
    match Decimal::from_str(raw) {
        Ok(d) if ratio => fmt_percent(d),
        Ok(d) => fmt_num(d),
        Err(_) => raw.to_string(),
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if let Value::Object(res_map) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in res_map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }

    print_footer(envelope);
}

fn print_footer(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
