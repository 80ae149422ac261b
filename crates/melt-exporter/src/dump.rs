//! Diagnostic renderings of built payloads.

use std::fmt::Write;

use serde::Serialize;

use crate::{
    config::DumpFormat,
    text_format::{to_text, TextFormat},
    Error,
};

/// Renders a payload in the requested format.
///
/// `wire` must be the protobuf encoding of `message`; the hex format dumps it
/// as is so the output matches what is sent.
pub fn render_payload<M>(
    message: &M,
    wire: &[u8],
    format: DumpFormat,
    json_indent: &str,
) -> Result<String, Error>
where
    M: Serialize + TextFormat,
{
    let rendered = match format {
        DumpFormat::Human => to_text(message, true),
        DumpFormat::Text => {
            let mut text = to_text(message, false);
            text.push('\n');
            text
        }
        DumpFormat::Json => {
            let mut out = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(json_indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
            message
                .serialize(&mut serializer)
                .map_err(|e| Error::DumpError(format, e.to_string()))?;
            let mut text =
                String::from_utf8(out).map_err(|e| Error::DumpError(format, e.to_string()))?;
            text.push('\n');
            text
        }
        DumpFormat::Yaml => {
            let mut text =
                serde_yaml::to_string(message).map_err(|e| Error::DumpError(format, e.to_string()))?;
            text.push('\n');
            text
        }
        DumpFormat::Hex => hex_dump(wire),
    };
    Ok(rendered)
}

/// Classic hex dump: offset, sixteen bytes split in two groups, printable ASCII.
///
/// ```text
/// 00000000  0a 05 68 65 6c 6c 6f                              |..hello|
/// ```
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 4 + data.len() / 16 * 14 + 16);
    for (line, chunk) in data.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", line * 16);
        for i in 0..16 {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{b:02x} ");
                }
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if (32..=126).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}
