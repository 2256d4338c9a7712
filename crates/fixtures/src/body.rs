//! Encoding of object payloads (`text`, `json`, `base64`, `csv`, `file`) to bytes.

use std::fs;
use std::io;

use base64::Engine as _;
use serde::Serialize;
use serde_json::Value;

use forge_core::Record;

use crate::error::{FixtureError, Result};

/// Payload kinds an object's `data` mapping may carry. Exactly one is allowed.
pub const DATA_TYPES: [&str; 5] = ["text", "json", "base64", "csv", "file"];

/// Turn an object's `data` mapping into the bytes to upload.
pub fn encode_body(data: &Record) -> Result<Vec<u8>> {
    let present: Vec<&str> = DATA_TYPES
        .into_iter()
        .filter(|t| data.contains_key(*t))
        .collect();

    let [data_type] = present.as_slice() else {
        return Err(FixtureError::Validation(format!(
            "can only have one of the following per s3 object: {}",
            DATA_TYPES.join(", ")
        )));
    };

    let value = &data[*data_type];
    match *data_type {
        "text" => value
            .as_str()
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| FixtureError::Validation("text payload must be a string".to_string())),
        "json" => encode_json(value),
        "base64" => {
            let encoded = value.as_str().ok_or_else(|| {
                FixtureError::Validation("base64 payload must be a string".to_string())
            })?;
            Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
        }
        "csv" => encode_csv(value),
        _ => {
            let path = value
                .as_str()
                .ok_or_else(|| FixtureError::Validation("file payload must be a path".to_string()))?;
            Ok(fs::read(path)?)
        }
    }
}

/// JSON with `", "` and `": "` separators.
struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

fn encode_json(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Rows of scalar cells, comma separated, `\r\n` terminated. Cells holding a
/// comma, quote or line break are quoted with inner quotes doubled.
fn encode_csv(value: &Value) -> Result<Vec<u8>> {
    let rows = value
        .as_array()
        .ok_or_else(|| FixtureError::Validation("csv payload must be a list of rows".to_string()))?;

    let mut out = String::new();
    for row in rows {
        let cells = row
            .as_array()
            .ok_or_else(|| FixtureError::Validation("csv rows must be lists".to_string()))?;

        let rendered = cells.iter().map(csv_cell).collect::<Result<Vec<_>>>()?;
        out.push_str(&rendered.join(","));
        out.push_str("\r\n");
    }
    Ok(out.into_bytes())
}

fn csv_cell(cell: &Value) -> Result<String> {
    let raw = match cell {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => {
            return Err(FixtureError::Validation(
                "csv cells must be strings, numbers or booleans".to_string(),
            ))
        }
    };

    if raw.contains([',', '"', '\r', '\n']) {
        Ok(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Ok(raw)
    }
}
