//! Chart descriptor parsing.
//!
//! A chart part is DrawingML: a `chartSpace` whose plot area holds one plot
//! group (`lineChart`, `barChart`, ...) with `ser` children. Each series
//! points back into the workbook through formula references
//! (`'Sheet'!$B$2:$B$40`) wrapped in `numRef`/`strRef`/`multiLvlStrRef`
//! elements. This module only extracts the descriptor; resolving the
//! references is [`crate::resolve`]'s job.
//!
//! Parsing is namespace-agnostic: elements are matched by local name, so
//! `c:ser` and `ser` read the same.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::ReportResult;
use crate::model::ChartKind;

/// A parsed chart descriptor, references not yet resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDefinition {
    /// Chart type tag from the plot area
    pub kind: ChartKind,
    /// Chart title text, if present
    pub title: Option<String>,
    /// Series in document order; every entry has a value reference
    pub series: Vec<SeriesRef>,
}

/// One series' references, prior to resolution
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRef {
    /// Series label (literal runs, or the cached string table)
    pub label: Option<String>,
    /// Formula reference backing the series values
    pub value_ref: String,
    /// Formula reference backing the category axis, if present
    pub category_ref: Option<String>,
}

/// Raw series state while the plot group is being read
#[derive(Debug, Default)]
struct RawSeries {
    label: Option<String>,
    value_ref: Option<String>,
    category_ref: Option<String>,
}

fn kind_for_tag(local: &[u8]) -> Option<ChartKind> {
    match local {
        b"lineChart" => Some(ChartKind::Line),
        b"barChart" => Some(ChartKind::Bar),
        b"areaChart" => Some(ChartKind::Area),
        b"scatterChart" => Some(ChartKind::Scatter),
        b"pieChart" => Some(ChartKind::Pie),
        b"doughnutChart" => Some(ChartKind::Doughnut),
        b"bubbleChart" => Some(ChartKind::Bubble),
        _ => None,
    }
}

/// Parse one chart part.
///
/// Returns `Ok(None)` when the XML parses but contains none of the seven
/// recognized plot groups - many packaged charts are auxiliary and that is
/// not an error. When more than one group is present the first kind in
/// [`ChartKind::PRIORITY`] wins.
pub fn parse_chart_part(bytes: &[u8]) -> ReportResult<Option<ChartDefinition>> {
    // No trim_text here: literal text runs may carry meaningful leading or
    // trailing spaces that concatenation must keep
    let mut reader = Reader::from_reader(bytes);

    let mut buf = Vec::new();
    let mut title: Option<String> = None;
    let mut groups: Vec<(ChartKind, Vec<RawSeries>)> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let local = e.local_name();
                if local.as_ref() == b"title" {
                    // First title in document order is the chart title;
                    // later ones belong to axes
                    let text = read_label_text(&mut reader, b"title")?;
                    if title.is_none() {
                        title = text;
                    }
                } else if let Some(kind) = kind_for_tag(local.as_ref()) {
                    let series = read_plot_group(&mut reader, local.as_ref().to_vec())?;
                    groups.push((kind, series));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    // Pick the winning plot group by fixed kind priority
    let Some(kind) = ChartKind::PRIORITY
        .into_iter()
        .find(|k| groups.iter().any(|(gk, _)| gk == k))
    else {
        return Ok(None);
    };
    let (_, raw_series) = groups
        .into_iter()
        .find(|(gk, _)| *gk == kind)
        .expect("winning kind came from groups");

    // A series without a value reference never makes it into the
    // definition
    let series = raw_series
        .into_iter()
        .filter_map(|raw| {
            raw.value_ref.map(|value_ref| SeriesRef {
                label: raw.label,
                value_ref,
                category_ref: raw.category_ref,
            })
        })
        .collect();

    Ok(Some(ChartDefinition {
        kind,
        title,
        series,
    }))
}

/// Read a plot group's series until the group's end tag
fn read_plot_group<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    end_tag: Vec<u8>,
) -> ReportResult<Vec<RawSeries>> {
    let mut series = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"ser" => {
                series.push(read_series(reader)?);
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == end_tag.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(series)
}

/// Read one `ser` element
fn read_series<R: std::io::BufRead>(reader: &mut Reader<R>) -> ReportResult<RawSeries> {
    let mut series = RawSeries::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tx" => series.label = read_label_text(reader, b"tx")?,
                b"cat" => series.category_ref = read_data_ref(reader, b"cat")?,
                b"val" => series.value_ref = read_data_ref(reader, b"val")?,
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"ser" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(series)
}

/// Read label text until `end_tag` closes: the concatenation of all literal
/// text runs, or - when there are none - the cached string-value table
/// joined with spaces. Charts often store a label only as its cached
/// rendered value.
fn read_label_text<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    end_tag: &[u8],
) -> ReportResult<Option<String>> {
    let mut runs = String::new();
    let mut cached: Vec<String> = Vec::new();
    let mut in_run = false;
    let mut in_cache = false;
    let mut in_point = false;
    let mut in_point_value = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_run = true,
                b"strCache" => in_cache = true,
                b"pt" if in_cache => {
                    in_point = true;
                    cached.push(String::new());
                }
                b"v" if in_point => in_point_value = true,
                _ => {}
            },
            Ok(Event::End(e)) => {
                let local = e.local_name();
                if local.as_ref() == end_tag {
                    break;
                }
                match local.as_ref() {
                    b"t" => in_run = false,
                    b"strCache" => in_cache = false,
                    b"pt" => in_point = false,
                    b"v" => in_point_value = false,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if let Ok(text) = e.unescape() {
                    if in_run {
                        runs.push_str(&text);
                    } else if in_point_value {
                        if let Some(last) = cached.last_mut() {
                            last.push_str(&text);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    let text = if !runs.is_empty() {
        runs.trim().to_string()
    } else if !cached.is_empty() {
        cached.join(" ").trim().to_string()
    } else {
        return Ok(None);
    };

    Ok((!text.is_empty()).then_some(text))
}

/// Read a `cat`/`val` element's formula reference until `end_tag` closes.
///
/// A reference may be wrapped as a numeric, string, or multi-level string
/// reference; the first present in that order wins.
fn read_data_ref<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    end_tag: &[u8],
) -> ReportResult<Option<String>> {
    const NUM: usize = 0;
    const STR: usize = 1;
    const MULTI: usize = 2;

    let mut formulas: [Option<String>; 3] = [None, None, None];
    let mut container: Option<usize> = None;
    let mut in_formula = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"numRef" => container = Some(NUM),
                b"strRef" => container = Some(STR),
                b"multiLvlStrRef" => container = Some(MULTI),
                b"f" if container.is_some() => in_formula = true,
                _ => {}
            },
            Ok(Event::End(e)) => {
                let local = e.local_name();
                if local.as_ref() == end_tag {
                    break;
                }
                match local.as_ref() {
                    b"numRef" | b"strRef" | b"multiLvlStrRef" => container = None,
                    b"f" => in_formula = false,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) if in_formula => {
                if let (Some(idx), Ok(text)) = (container, e.unescape()) {
                    formulas[idx] = Some(text.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    let [num, string, multi] = formulas;
    Ok(num.or(string).or(multi))
}
