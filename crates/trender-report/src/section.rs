//! Section and indicator assembly.
//!
//! Drives the whole pass: worksheets are visited once, in workbook order.
//! All-caps sheet names open sections; every other sheet becomes an
//! indicator under the currently open section, carrying its charts, its
//! metadata fields, and - for table sheets - its extracted table.

use std::collections::HashMap;

use trender_core::Workbook;

use crate::metadata;
use crate::model::{Chart, Indicator, Section};
use crate::overrides::{
    self, apply_title_rules, is_all_caps, sentence_case, sentence_case_words, DisplayText,
    FlipCtx, SheetCtx,
};
use crate::slug::slugify;
use crate::table;

/// Whether a sheet name is a section header: with spaces removed, free of
/// lowercase characters and at least 8 characters long. The length floor
/// keeps short all-caps acronym sheets ("EU", "SR") out of the header set.
pub fn is_section_header(name: &str) -> bool {
    let squeezed: String = name.chars().filter(|c| *c != ' ').collect();
    squeezed.chars().count() >= 8 && is_all_caps(&squeezed)
}

/// Build the ordered section list.
///
/// `charts` is consumed: each indicator takes ownership of the charts
/// assembled for its worksheet.
pub fn build_sections(
    workbook: &Workbook,
    mut charts: HashMap<String, Vec<Chart>>,
) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();

    for worksheet in workbook.worksheets() {
        let sheet_name = worksheet.name();

        if is_section_header(sheet_name) {
            sections.push(Section {
                title: overrides::section_title(sheet_name),
                slug: slugify(sheet_name),
                indicators: Vec::new(),
            });
            continue;
        }

        let meta = metadata::scan(worksheet);
        let mut chart_list = charts.remove(sheet_name).unwrap_or_default();
        let mut table = meta.is_table().then(|| table::extract_table(worksheet)).flatten();

        // A few sheets store newest-first; flip them so every indicator
        // reads oldest-first
        let flip_ctx = FlipCtx::new(meta.rubrik.as_deref(), meta.underrubrik.as_deref(), sheet_name);
        if overrides::needs_chronological_flip(&flip_ctx) {
            for chart in &mut chart_list {
                chart.flip_chronology();
            }
            if let Some(table) = &mut table {
                table.reverse_data_rows();
            }
        }

        // Content before any header sheet lands in an implicit section
        if sections.is_empty() {
            sections.push(Section {
                title: "Report".to_string(),
                slug: "report".to_string(),
                indicators: Vec::new(),
            });
        }

        let text = display_text(&meta.rubrik, &meta.underrubrik, sheet_name);

        let indicator = Indicator {
            title: text.title,
            slug: slugify(sheet_name),
            sheet: sheet_name.to_string(),
            charts: chart_list,
            table,
            typ: meta.typ,
            rubrik: meta.rubrik,
            underrubrik: text.subtitle,
            fraga: meta.fraga,
            kommentar: meta.kommentar,
            kalla: meta.kalla,
        };

        sections
            .last_mut()
            .expect("a section exists by construction")
            .indicators
            .push(indicator);
    }

    // A header sheet with no content sheets after it leaves an empty
    // section behind; those are dropped, not errors
    sections.retain(|section| !section.indicators.is_empty());
    sections
}

/// Normalize the display title/subtitle for one indicator: heading (or
/// sheet name) out of all-caps, then the literal override rules in order
fn display_text(
    rubrik: &Option<String>,
    underrubrik: &Option<String>,
    sheet_name: &str,
) -> DisplayText {
    let raw_title = rubrik.as_deref().unwrap_or(sheet_name);
    let title = if is_all_caps(raw_title) {
        sentence_case_words(raw_title)
    } else {
        raw_title.to_string()
    };

    let subtitle = underrubrik.as_deref().map(|raw| {
        if is_all_caps(raw) {
            sentence_case(raw)
        } else {
            raw.to_string()
        }
    });

    let mut text = DisplayText { title, subtitle };
    apply_title_rules(&mut text, &SheetCtx { sheet_name });
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_section_header_classification() {
        assert!(is_section_header("SAMHÄLLSTRENDER"));
        assert!(is_section_header("MEDIETRENDER"));
        // Embedded spaces change nothing
        assert!(is_section_header("POLITISKA TRENDER"));
        assert!(is_section_header("POLITISKATRENDER"));
        // Too short: acronym sheets are content, not headers
        assert!(!is_section_header("EU"));
        assert!(!is_section_header("SR"));
        assert!(!is_section_header("EURO"));
        // Lowercase anywhere disqualifies
        assert!(!is_section_header("Förtroende 1"));
        assert!(!is_section_header("Partisymp 2"));
        assert!(!is_section_header(""));
    }

    fn content_sheet(wb: &mut Workbook, name: &str, rubrik: &str) {
        let idx = wb.add_worksheet_with_name(name).unwrap();
        let ws = wb.worksheet_mut(idx).unwrap();
        ws.set_value_at(0, 0, "Rubrik");
        ws.set_value_at(0, 1, rubrik);
    }

    #[test]
    fn test_sheets_group_under_preceding_header() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("SAMHÄLLSTRENDER").unwrap();
        content_sheet(&mut wb, "Hälsa 1", "SJÄLVSKATTAD HÄLSA");
        wb.add_worksheet_with_name("MEDIETRENDER").unwrap();
        content_sheet(&mut wb, "Medier 1", "MEDIEFÖRTROENDE");

        let sections = build_sections(&wb, HashMap::new());
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "SAMHÄLLSTRENDER");
        assert_eq!(sections[0].slug, "samhallstrender");
        assert_eq!(sections[0].indicators[0].sheet, "Hälsa 1");
        assert_eq!(sections[1].title, "MEDIETRENDER");
        assert_eq!(sections[1].indicators[0].title, "Medieförtroende");
    }

    #[test]
    fn test_implicit_report_section() {
        let mut wb = Workbook::empty();
        content_sheet(&mut wb, "Hälsa 1", "SJÄLVSKATTAD HÄLSA");

        let sections = build_sections(&wb, HashMap::new());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Report");
        assert_eq!(sections[0].slug, "report");
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("SAMHÄLLSTRENDER").unwrap();
        content_sheet(&mut wb, "Hälsa 1", "SJÄLVSKATTAD HÄLSA");
        // Trailing header with nothing after it
        wb.add_worksheet_with_name("MEDIETRENDER").unwrap();

        let sections = build_sections(&wb, HashMap::new());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "SAMHÄLLSTRENDER");
    }

    #[test]
    fn test_title_falls_back_to_sheet_name() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Partisymp 2").unwrap();

        let sections = build_sections(&wb, HashMap::new());
        let indicator = &sections[0].indicators[0];
        assert_eq!(indicator.title, "Partisymp 2");
        assert_eq!(indicator.slug, "partisymp-2");
        assert_eq!(indicator.rubrik, None);
    }

    #[test]
    fn test_section_title_spelling_fix_applies() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("POL SAKFRÅGOR").unwrap();
        content_sheet(&mut wb, "Sakfråga 1", "VIKTIGASTE FRÅGAN");

        let sections = build_sections(&wb, HashMap::new());
        assert_eq!(sections[0].title, "POLITISKA SAKFRÅGOR");
        // The slug stays derived from the sheet name as written
        assert_eq!(sections[0].slug, "pol-sakfragor");
    }
}
