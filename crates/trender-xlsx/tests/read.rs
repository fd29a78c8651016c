//! Reader tests against minimal in-memory packages.
//!
//! Fixtures are written on the fly with `zip::ZipWriter` so no binary files
//! need to live in the repository.

use std::io::{Cursor, Write};

use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use trender_core::CellValue;
use trender_xlsx::{chart_parts, XlsxError, XlsxReader};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="xml" ContentType="application/xml"/>
</Types>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Data" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#;

fn build_package(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    let mut cursor = zip.finish().unwrap();
    cursor.set_position(0);
    cursor
}

fn single_sheet_package(sheet_xml: &str, extra: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut entries = vec![
        ("[Content_Types].xml", CONTENT_TYPES),
        ("xl/workbook.xml", WORKBOOK_XML),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", sheet_xml),
    ];
    entries.extend_from_slice(extra);
    build_package(&entries)
}

#[test]
fn reads_numbers_strings_and_booleans() {
    let sheet = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1"><v>42</v></c>
      <c r="C1" t="b"><v>1</v></c>
    </row>
    <row r="2">
      <c r="A2" t="inlineStr"><is><t>inline text</t></is></c>
      <c r="B2"><v>3.5</v></c>
    </row>
  </sheetData>
</worksheet>"#;
    let shared = r#"<?xml version="1.0"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1">
  <si><t>Rubrik</t></si>
</sst>"#;

    let package = single_sheet_package(sheet, &[("xl/sharedStrings.xml", shared)]);
    let workbook = XlsxReader::read(package).unwrap();

    assert_eq!(workbook.sheet_names(), vec!["Data"]);
    let ws = workbook.worksheet_by_name("Data").unwrap();
    assert_eq!(ws.value_at(0, 0), CellValue::String("Rubrik".into()));
    assert_eq!(ws.value_at(0, 1), CellValue::Number(42.0));
    assert_eq!(ws.value_at(0, 2), CellValue::Boolean(true));
    assert_eq!(ws.value_at(1, 0), CellValue::String("inline text".into()));
    assert_eq!(ws.value_at(1, 1), CellValue::Number(3.5));
}

#[test]
fn reads_date_styled_cells_as_datetimes() {
    let styles = r#"<?xml version="1.0"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    <xf numFmtId="14" fontId="0" fillId="0" borderId="0"/>
  </cellXfs>
</styleSheet>"#;
    // 45292 = 2024-01-01 in the 1900 date system
    let sheet = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" s="1"><v>45292</v></c>
      <c r="B1" s="0"><v>45292</v></c>
    </row>
  </sheetData>
</worksheet>"#;

    let package = single_sheet_package(sheet, &[("xl/styles.xml", styles)]);
    let workbook = XlsxReader::read(package).unwrap();
    let ws = workbook.worksheet_by_name("Data").unwrap();

    match ws.value_at(0, 0) {
        CellValue::DateTime(dt) => {
            assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-01")
        }
        other => panic!("expected a datetime, got {:?}", other),
    }
    // Same serial without a date style stays numeric
    assert_eq!(ws.value_at(0, 1), CellValue::Number(45292.0));
}

#[test]
fn missing_shared_strings_is_not_an_error() {
    let sheet = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1"><v>1</v></c></row>
  </sheetData>
</worksheet>"#;

    let workbook = XlsxReader::read(single_sheet_package(sheet, &[])).unwrap();
    assert_eq!(workbook.sheet_count(), 1);
}

#[test]
fn rejects_archives_without_content_types() {
    let package = build_package(&[("random.txt", "not a workbook")]);
    match XlsxReader::read(package) {
        Err(XlsxError::InvalidFormat(_)) => {}
        other => panic!("expected InvalidFormat, got {:?}", other),
    }
}

#[test]
fn reads_from_a_file_path() {
    let sheet = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1"><v>7</v></c></row>
  </sheetData>
</worksheet>"#;
    let package = single_sheet_package(sheet, &[("xl/charts/chart1.xml", "<c:chartSpace/>")]);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(package.get_ref()).unwrap();
    file.flush().unwrap();

    let workbook = XlsxReader::read_file(file.path()).unwrap();
    assert_eq!(
        workbook.worksheet_by_name("Data").unwrap().value_at(0, 0),
        CellValue::Number(7.0)
    );

    let parts = trender_xlsx::read_chart_parts(file.path()).unwrap();
    assert_eq!(parts.len(), 1);
}

#[test]
fn enumerates_chart_parts_in_lexical_order() {
    let sheet = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData/>
</worksheet>"#;
    let package = single_sheet_package(
        sheet,
        &[
            ("xl/charts/chart2.xml", "<c:chartSpace/>"),
            ("xl/charts/chart1.xml", "<c:chartSpace/>"),
            ("xl/charts/colors1.xml", "<cs:colorStyle/>"),
            ("xl/drawings/drawing1.xml", "<xdr:wsDr/>"),
        ],
    );

    let parts = chart_parts(package).unwrap();
    let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["xl/charts/chart1.xml", "xl/charts/chart2.xml"]);
    assert_eq!(parts[0].id(), "chart1");
}
