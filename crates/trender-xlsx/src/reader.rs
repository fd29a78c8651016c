//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::debug;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_date_styles;
use trender_core::{CellAddress, CellValue, Workbook};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML, e.g.
/// `_x000d_` for CR and `_x005f_` for an escaped underscore.
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        // _xHHHH_ is 8 bytes; the hex digits are always ASCII
        let code = tail
            .as_bytes()
            .get(2..7)
            .filter(|w| w[4] == b'_' && w[..4].iter().all(|b| b.is_ascii_hexdigit()))
            .and_then(|w| u32::from_str_radix(std::str::from_utf8(&w[..4]).ok()?, 16).ok())
            .and_then(char::from_u32);
        match code {
            Some(c) => {
                result.push(c);
                rest = &tail[8..];
            }
            None => {
                result.push('_');
                rest = &tail[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Convert an Excel date serial (1900 system) to a date/time.
///
/// Day 0 of the 1900 system is 1899-12-30 once the fictitious 1900-02-29
/// is accounted for; the workbooks this exporter reads hold modern survey
/// years, so the pre-1900 quirks never come into play.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let days = serial.floor();
    let secs = ((serial - days) * 86_400.0).round() as i64;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    epoch
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(secs))
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX package
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        // Read shared strings (if present)
        let shared_strings = Self::read_shared_strings(&mut archive)?;

        // Read styles (if present) - only date-format flags are kept
        let date_styles = Self::read_styles(&mut archive)?;

        // Read workbook.xml to get sheet info
        let sheet_info = Self::read_workbook_xml(&mut archive)?;

        // Read workbook.xml.rels to get sheet paths
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        // Read each worksheet, preserving workbook.xml order
        for (name, r_id) in &sheet_info {
            if let Some(path) = sheet_paths.get(r_id) {
                let sheet_idx = workbook.add_worksheet_with_name(name)?;
                Self::read_worksheet(
                    &mut archive,
                    path,
                    workbook.worksheet_mut(sheet_idx).unwrap(),
                    &shared_strings,
                    &date_styles,
                )?;
            } else {
                debug!("sheet '{}' has no worksheet relationship, skipping", name);
            }
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => {
                        in_t = true;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"t" => {
                        in_t = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<bool>> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(Vec::new()),
        };
        read_date_styles(BufReader::new(file))
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    // Only worksheet relationships matter here
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ unless rooted
                            let full_path = if let Some(stripped) = target.strip_prefix('/') {
                                stripped.to_string()
                            } else {
                                format!("xl/{}", target)
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read one worksheet part into the given worksheet
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut trender_core::Worksheet,
        shared_strings: &[String],
        date_styles: &[bool],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();

        // Current cell state
        let mut current_cell_ref: Option<String> = None;
        let mut current_cell_type: Option<String> = None;
        let mut current_cell_style: Option<u32> = None;
        let mut current_value: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => {
                        in_cell = true;
                        current_cell_ref = None;
                        current_cell_type = None;
                        current_cell_style = None;
                        current_value = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    current_cell_ref =
                                        attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"t" => {
                                    current_cell_type =
                                        attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"s" => {
                                    current_cell_style = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|s| s.parse::<u32>().ok());
                                }
                                _ => {}
                            }
                        }
                    }
                    b"v" if in_cell => {
                        in_value = true;
                    }
                    b"is" if in_cell => {
                        in_inline_str = true;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = true;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(ref cell_ref) = current_cell_ref {
                            Self::process_cell(
                                worksheet,
                                cell_ref,
                                current_cell_type.as_deref(),
                                current_value.as_deref(),
                                current_cell_style,
                                shared_strings,
                                date_styles,
                            )?;
                        }
                        in_cell = false;
                    }
                    b"v" => {
                        in_value = false;
                    }
                    b"is" => {
                        in_inline_str = false;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value {
                        if let Ok(text) = e.unescape() {
                            current_value = Some(text.to_string());
                        }
                    } else if in_inline_text {
                        if let Ok(text) = e.unescape() {
                            current_value = Some(text.to_string());
                            current_cell_type = Some("inlineStr".to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn process_cell(
        worksheet: &mut trender_core::Worksheet,
        cell_ref: &str,
        cell_type: Option<&str>,
        value: Option<&str>,
        style: Option<u32>,
        shared_strings: &[String],
        date_styles: &[bool],
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(cell_ref)?;
        let Some(value) = value else {
            return Ok(());
        };

        let cell_value = match cell_type {
            Some("s") => {
                let idx: usize = value.parse().map_err(|_| {
                    XlsxError::InvalidFormat(format!("bad shared string index '{}'", value))
                })?;
                match shared_strings.get(idx) {
                    Some(s) => CellValue::String(s.clone()),
                    None => {
                        debug!("shared string index {} out of range at {}", idx, cell_ref);
                        CellValue::Empty
                    }
                }
            }
            Some("str") | Some("inlineStr") => {
                CellValue::String(decode_excel_escapes(value))
            }
            Some("b") => CellValue::Boolean(value == "1"),
            // Error cells carry no usable value for the exporter
            Some("e") => CellValue::Empty,
            _ => {
                // Numeric (the default type); date-styled serials decode
                // to date/time values
                match value.parse::<f64>() {
                    Ok(n) => {
                        let is_date = style
                            .and_then(|s| date_styles.get(s as usize).copied())
                            .unwrap_or(false);
                        if is_date {
                            serial_to_datetime(n)
                                .map(CellValue::DateTime)
                                .unwrap_or(CellValue::Number(n))
                        } else {
                            CellValue::Number(n)
                        }
                    }
                    Err(_) => CellValue::String(value.to_string()),
                }
            }
        };

        worksheet.set_value_at(addr.row, addr.col, cell_value);
        Ok(())
    }
}
