//! Chart assembly: parse every chart part, resolve its references, and key
//! the results by owning worksheet.

use std::collections::HashMap;

use log::{debug, warn};

use trender_core::Workbook;
use trender_xlsx::ChartPart;

use crate::chart::{parse_chart_part, ChartDefinition};
use crate::model::{Chart, ChartSeries, ResolvedValues};
use crate::overrides::chart_title_display;
use crate::resolve::resolve_range;

/// Parse and resolve all chart parts.
///
/// The result maps worksheet name to that sheet's charts, in part order.
/// Broken charts never abort the pass: an unparseable part, a part with no
/// recognized plot group, or a chart whose references all fail is dropped
/// (with a log line) and the rest continue.
pub fn assemble_charts(workbook: &Workbook, parts: &[ChartPart]) -> HashMap<String, Vec<Chart>> {
    let mut charts: HashMap<String, Vec<Chart>> = HashMap::new();

    for part in parts {
        let definition = match parse_chart_part(&part.bytes) {
            Ok(Some(definition)) => definition,
            Ok(None) => {
                debug!("{}: no recognized plot group, skipping", part.name);
                continue;
            }
            Err(err) => {
                warn!("{}: unreadable chart part: {}", part.name, err);
                continue;
            }
        };

        if let Some(chart) = resolve_chart(workbook, part, definition) {
            charts.entry(chart.sheet.clone()).or_default().push(chart);
        }
    }

    charts
}

/// Resolve one definition into a concrete chart, or nothing if no series
/// survives resolution.
fn resolve_chart(workbook: &Workbook, part: &ChartPart, definition: ChartDefinition) -> Option<Chart> {
    let mut categories: Option<ResolvedValues> = None;
    let mut sheet: Option<String> = None;
    let mut series_out: Vec<ChartSeries> = Vec::new();

    for series in definition.series {
        // The category axis is shared: resolve it once, from the first
        // series that both carries a reference and resolves
        if categories.is_none() {
            if let Some(cat_ref) = &series.category_ref {
                match resolve_range(workbook, cat_ref) {
                    Ok(resolved) => {
                        sheet.get_or_insert(resolved.sheet);
                        categories = Some(resolved.values);
                    }
                    Err(err) => {
                        warn!("{}: category reference '{}' failed: {}", part.name, cat_ref, err);
                    }
                }
            }
        }

        match resolve_range(workbook, &series.value_ref) {
            Ok(resolved) => {
                sheet.get_or_insert(resolved.sheet);
                series_out.push(ChartSeries {
                    name: series.label.unwrap_or_default(),
                    values: resolved.values,
                });
            }
            Err(err) => {
                warn!(
                    "{}: series reference '{}' failed, dropping series: {}",
                    part.name, series.value_ref, err
                );
            }
        }
    }

    if series_out.is_empty() {
        debug!("{}: no series resolved, dropping chart", part.name);
        return None;
    }

    Some(Chart {
        id: part.id().to_string(),
        source: part.name.clone(),
        title: definition.title.as_deref().map(chart_title_display),
        sheet: sheet?,
        kind: definition.kind,
        categories,
        series: series_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChartKind, Datum};
    use pretty_assertions::assert_eq;

    fn chart_part(name: &str, xml: &str) -> ChartPart {
        ChartPart {
            name: name.to_string(),
            bytes: xml.as_bytes().to_vec(),
        }
    }

    fn workbook_with_trend_sheet() -> Workbook {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name("Hälsa").unwrap();
        let ws = wb.worksheet_mut(idx).unwrap();
        for (i, (year, share)) in [(2022.0, 71.0), (2023.0, 72.0), (2024.0, 74.0)]
            .into_iter()
            .enumerate()
        {
            ws.set_value_at(i as u32 + 1, 0, year);
            ws.set_value_at(i as u32 + 1, 1, share);
        }
        wb
    }

    const CHART_XML: &str = r#"<c:chartSpace xmlns:c="c" xmlns:a="a">
<c:chart>
  <c:title><c:tx><c:rich><a:p><a:r><a:t>SJÄLVSKATTAD HÄLSA</a:t></a:r></a:p></c:rich></c:tx></c:title>
  <c:plotArea>
    <c:lineChart>
      <c:ser>
        <c:tx><c:strRef><c:f>Hälsa!$B$1</c:f><c:strCache><c:pt idx="0"><c:v>Mycket god</c:v></c:pt></c:strCache></c:strRef></c:tx>
        <c:cat><c:numRef><c:f>Hälsa!$A$2:$A$4</c:f></c:numRef></c:cat>
        <c:val><c:numRef><c:f>Hälsa!$B$2:$B$4</c:f></c:numRef></c:val>
      </c:ser>
    </c:lineChart>
  </c:plotArea>
</c:chart>
</c:chartSpace>"#;

    #[test]
    fn test_assembles_resolved_chart_keyed_by_sheet() {
        let wb = workbook_with_trend_sheet();
        let parts = vec![chart_part("xl/charts/chart1.xml", CHART_XML)];

        let charts = assemble_charts(&wb, &parts);
        let on_sheet = &charts["Hälsa"];
        assert_eq!(on_sheet.len(), 1);

        let chart = &on_sheet[0];
        assert_eq!(chart.id, "chart1");
        assert_eq!(chart.kind, ChartKind::Line);
        assert_eq!(chart.title.as_deref(), Some("Självskattad hälsa"));
        assert_eq!(
            chart.categories,
            Some(ResolvedValues::Flat(vec![
                Datum::Number(2022.0),
                Datum::Number(2023.0),
                Datum::Number(2024.0),
            ]))
        );
        assert_eq!(chart.series[0].name, "Mycket god");
        assert_eq!(
            chart.series[0].values,
            ResolvedValues::Flat(vec![
                Datum::Number(71.0),
                Datum::Number(72.0),
                Datum::Number(74.0),
            ])
        );
    }

    #[test]
    fn test_chart_referencing_missing_sheet_is_dropped() {
        let wb = workbook_with_trend_sheet();
        let broken = CHART_XML.replace("Hälsa!", "Borta!");
        let parts = vec![
            chart_part("xl/charts/chart1.xml", &broken),
            chart_part("xl/charts/chart2.xml", CHART_XML),
        ];

        // The broken chart disappears; the good one is unaffected
        let charts = assemble_charts(&wb, &parts);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts["Hälsa"][0].id, "chart2");
    }

    #[test]
    fn test_failed_category_degrades_to_none() {
        let wb = workbook_with_trend_sheet();
        let xml = CHART_XML.replace("<c:f>Hälsa!$A$2:$A$4</c:f>", "<c:f>Borta!$A$2:$A$4</c:f>");
        let parts = vec![chart_part("xl/charts/chart1.xml", &xml)];

        let charts = assemble_charts(&wb, &parts);
        let chart = &charts["Hälsa"][0];
        assert_eq!(chart.categories, None);
        assert_eq!(chart.series.len(), 1);
    }
}
