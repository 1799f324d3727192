/*!
Inspect command - decode CBOR and display the tree in various formats
*/

use super::io::{Input, Output};
use anyhow::Context;
use base64::prelude::*;
use cbor_tree::{Arena, Value};
use clap::Parser;
use std::fmt::Write;

type Item<'t, 'a> = cbor_tree::Item<'t, 'a, Arena<'a>>;

/// Inspect and display CBOR data
#[derive(Parser, Debug)]
#[command(about = "Decode and display CBOR data", long_about = None)]
pub struct Command {
    /// Output format
    #[arg(
        long,
        default_value = "tree",
        value_name = "FORMAT",
        help = "Output format: tree (one node per line), json (lossy), hex"
    )]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input CBOR file (use '-' for stdin)
    input: Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Indented outline of the decoded nodes
    Tree,
    /// JSON format (lossy - loses tags, simple values and string kinds)
    Json,
    /// Hexadecimal dump of the input
    Hex,
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let data = self.input.read_all()?;
        let doc = cbor_tree::decode(&data)
            .with_context(|| format!("Failed to decode {}", self.input))?;

        let text = match self.format {
            OutputFormat::Tree => format_tree(doc.root()),
            OutputFormat::Json => serde_json::to_string_pretty(&to_json(doc.root(), 0)?)?,
            OutputFormat::Hex => hex::encode(&data),
        };

        self.output.unwrap_or_default().write_str(&text)?;
        Ok(())
    }
}

/// One line per node, indented by depth, without recursing
fn format_tree(root: Item) -> String {
    let mut out = String::new();
    let mut stack = vec![(0usize, root)];
    while let Some((depth, item)) = stack.pop() {
        _ = writeln!(out, "{:width$}{}", "", describe(item), width = depth * 2);

        let first = stack.len();
        stack.extend(item.children().map(|child| (depth + 1, child)));
        stack[first..].reverse();
    }
    out
}

fn describe(item: Item) -> String {
    match item.value() {
        Value::Unsigned(v) => format!("{v}"),
        Value::Signed(v) => format!("{v}"),
        Value::Bytes(v) => format!("h'{}'", hex::encode(v)),
        Value::Text(v) => format!("{:?}", String::from_utf8_lossy(v)),
        Value::BytesChunked | Value::TextChunked => {
            format!("{} ({} chunks)", item.value().type_name(), item.len())
        }
        Value::Array { .. } => format!("{} ({} items)", item.value().type_name(), item.len()),
        Value::Map { .. } => format!("{} ({} pairs)", item.value().type_name(), item.len() / 2),
        Value::Tag(t) => format!("{t}(...)"),
        Value::Simple(v) => format!("simple({v})"),
        Value::Double(v) => format!("{v:?}"),
        Value::False => "false".into(),
        Value::True => "true".into(),
        Value::Null => "null".into(),
        Value::Undefined => "undefined".into(),
        Value::Invalid => "invalid".into(),
    }
}

/// Deepest nesting converted to JSON, as `serde_json::Value` is built and
/// dropped recursively
const MAX_JSON_DEPTH: usize = 128;

/// Convert an item to JSON (lossy)
fn to_json(item: Item, depth: usize) -> anyhow::Result<serde_json::Value> {
    use serde_json::Value as Json;

    if depth > MAX_JSON_DEPTH {
        anyhow::bail!("Nesting deeper than {MAX_JSON_DEPTH} levels cannot be shown as JSON");
    }

    Ok(match item.value() {
        Value::Unsigned(v) => Json::from(*v),
        Value::Signed(v) => Json::from(*v),
        Value::Bytes(_) | Value::BytesChunked => Json::String(
            BASE64_URL_SAFE_NO_PAD.encode(item.concat().unwrap_or_default()),
        ),
        Value::Text(_) | Value::TextChunked => Json::String(
            String::from_utf8_lossy(&item.concat().unwrap_or_default()).into_owned(),
        ),
        Value::Array { .. } => Json::Array(
            item.children()
                .map(|child| to_json(child, depth + 1))
                .collect::<anyhow::Result<_>>()?,
        ),
        Value::Map { .. } => {
            let mut map = serde_json::Map::new();
            let mut children = item.children();
            while let (Some(key), Some(value)) = (children.next(), children.next()) {
                // JSON keys must be strings
                let key = match to_json(key, depth + 1)? {
                    Json::String(s) => s,
                    k => k.to_string(),
                };
                map.insert(key, to_json(value, depth + 1)?);
            }
            Json::Object(map)
        }
        // Tags are dropped, keeping only the tagged item
        Value::Tag(_) => match item.children().next() {
            Some(child) => to_json(child, depth + 1)?,
            None => Json::Null,
        },
        Value::Double(v) => serde_json::Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::False => Json::Bool(false),
        Value::True => Json::Bool(true),
        Value::Null | Value::Undefined | Value::Simple(_) | Value::Invalid => Json::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree() {
        let data = hex::decode("a161618263626364f5").unwrap();
        let doc = cbor_tree::decode(&data).unwrap();
        assert_eq!(
            format_tree(doc.root()),
            "Definite-length Map (1 pairs)\n  \"a\"\n  Definite-length Array (2 items)\n    \"bcd\"\n    true\n"
        );
    }

    #[test]
    fn json() {
        let data = hex::decode("a3616101626232d818420102613bf97e00").unwrap();
        let doc = cbor_tree::decode(&data).unwrap();
        assert_eq!(
            to_json(doc.root(), 0).unwrap(),
            serde_json::json!({"a": 1, "b2": "AQI", ";": null})
        );
    }

    #[test]
    fn json_depth() {
        let mut data = vec![0x81; MAX_JSON_DEPTH];
        data.push(0x00);
        let doc = cbor_tree::decode(&data).unwrap();
        let json = to_json(doc.root(), 0).unwrap();
        assert_eq!(serde_json::to_string(&json).unwrap().len(), 2 * MAX_JSON_DEPTH + 1);

        let mut data = vec![0x81; 200_000];
        data.push(0x00);
        let doc = cbor_tree::decode(&data).unwrap();
        assert!(to_json(doc.root(), 0).is_err());

        // Tags and map values count towards the depth too
        let mut data = [0xa1, 0x00].repeat(MAX_JSON_DEPTH / 2);
        data.extend([0xc1; MAX_JSON_DEPTH]);
        data.push(0x00);
        let doc = cbor_tree::decode(&data).unwrap();
        assert!(to_json(doc.root(), 0).is_err());
    }
}
