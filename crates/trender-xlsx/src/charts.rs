//! Chart part enumeration.
//!
//! Chart definitions live as standalone XML parts under `xl/charts/` in the
//! package; the workbook model never sees them. The report assembler parses
//! these payloads separately and joins them back to worksheets through the
//! data references inside each chart.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::XlsxResult;

/// One raw chart-definition payload from the package
#[derive(Debug, Clone)]
pub struct ChartPart {
    /// Archive path, e.g. `xl/charts/chart3.xml`
    pub name: String,
    /// Raw XML bytes of the part
    pub bytes: Vec<u8>,
}

impl ChartPart {
    /// The part's file stem (`xl/charts/chart3.xml` -> `chart3`), used as a
    /// stable chart id
    pub fn id(&self) -> &str {
        let file_name = self.name.rsplit('/').next().unwrap_or(&self.name);
        file_name.strip_suffix(".xml").unwrap_or(file_name)
    }
}

/// Read all chart parts from a workbook file, in lexical part-name order
pub fn read_chart_parts<P: AsRef<Path>>(path: P) -> XlsxResult<Vec<ChartPart>> {
    let file = File::open(path)?;
    chart_parts(file)
}

/// Read all chart parts from a reader, in lexical part-name order.
///
/// The order is part of the contract: chart ids and the per-sheet chart
/// sequence in the report follow it.
pub fn chart_parts<R: Read + Seek>(reader: R) -> XlsxResult<Vec<ChartPart>> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("xl/charts/chart") && name.ends_with(".xml"))
        .map(|name| name.to_string())
        .collect();
    names.sort();

    let mut parts = Vec::with_capacity(names.len());
    for name in names {
        let mut bytes = Vec::new();
        archive.by_name(&name)?.read_to_end(&mut bytes)?;
        parts.push(ChartPart { name, bytes });
    }

    Ok(parts)
}
