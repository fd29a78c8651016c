//! Minimal styles.xml parsing: per-xf date-format detection.
//!
//! The exporter needs styles for exactly one thing: deciding whether a
//! numeric cell holds a date serial. Everything else in styles.xml is
//! ignored.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::XlsxResult;

/// For each cellXf index, whether its number format is a date/time format.
/// Index 0 is the default format (never a date).
pub fn read_date_styles<R: BufRead>(reader: R) -> XlsxResult<Vec<bool>> {
    let mut xml_reader = Reader::from_reader(reader);

    let mut buf = Vec::new();
    let mut custom_formats: HashMap<u32, String> = HashMap::new();
    let mut xf_is_date = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|s| s.parse::<u32>().ok());
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        custom_formats.insert(id, code);
                    }
                }
                b"cellXfs" => {
                    in_cell_xfs = true;
                }
                b"xf" if in_cell_xfs => {
                    let num_fmt_id = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"numFmtId")
                        .and_then(|a| a.unescape_value().ok())
                        .and_then(|s| s.parse::<u32>().ok())
                        .unwrap_or(0);
                    xf_is_date.push(is_date_fmt_id(num_fmt_id, &custom_formats));
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(xf_is_date)
}

fn is_date_fmt_id(id: u32, custom_formats: &HashMap<u32, String>) -> bool {
    match id {
        14..=22 | 45..=47 => true,
        _ => custom_formats
            .get(&id)
            .map(|code| is_date_format_code(code))
            .unwrap_or(false),
    }
}

/// Heuristic over a number format code: it is a date/time format if any
/// y/m/d/h/s placeholder survives outside quoted literals and `[...]`
/// modifier blocks.
pub fn is_date_format_code(code: &str) -> bool {
    let mut in_quote = false;
    let mut in_bracket = false;
    let mut escaped = false;

    for c in code.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S'
                if !in_quote && !in_bracket =>
            {
                return true;
            }
            _ => {}
        }
    }

    false
}
