//! Domain-specific display normalization.
//!
//! The source workbook is inconsistent about capitalization and carries a
//! handful of titles that the published report spells differently. All of
//! those literal cases live here, as rule tables evaluated in a fixed
//! order, so they can be audited and tested apart from the scanning logic.

/// Title/subtitle pair under normalization
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayText {
    /// Indicator display title
    pub title: String,
    /// Indicator display subtitle, if any
    pub subtitle: Option<String>,
}

/// Sheet context available to the rules
#[derive(Debug, Clone, Copy)]
pub struct SheetCtx<'a> {
    /// Name of the worksheet the indicator came from
    pub sheet_name: &'a str,
}

/// A literal display override: `matches` decides, `apply` rewrites
pub struct TitleRule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    pub matches: fn(&DisplayText, &SheetCtx) -> bool,
    pub apply: fn(&mut DisplayText, &SheetCtx),
}

/// The literal title/subtitle overrides, in application order.
pub const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        name: "institutional-trust-collapses-to-trust",
        matches: trust_matches,
        apply: trust_apply,
    },
    TitleRule {
        name: "party-leader-popularity-canonical-spelling",
        matches: party_leader_matches,
        apply: party_leader_apply,
    },
    TitleRule {
        name: "worry-subtitle-rewrite",
        matches: worry_subtitle_matches,
        apply: worry_subtitle_apply,
    },
];

/// Apply every matching title rule, in table order
pub fn apply_title_rules(text: &mut DisplayText, ctx: &SheetCtx) {
    for rule in TITLE_RULES {
        if (rule.matches)(text, ctx) {
            (rule.apply)(text, ctx);
        }
    }
}

// The trust-in-institutions sheets repeat the full heading on every tab;
// with a subtitle present the title carries no extra information.
fn trust_matches(text: &DisplayText, _: &SheetCtx) -> bool {
    let lower = text.title.to_lowercase();
    lower.contains("förtroende")
        && lower.contains("samhällsinstitutioner")
        && text.subtitle.is_some()
}

fn trust_apply(text: &mut DisplayText, _: &SheetCtx) {
    text.title = "Förtroende".to_string();
}

fn party_leader_matches(text: &DisplayText, _: &SheetCtx) -> bool {
    text.title.to_lowercase().contains("partiledarpopularitet")
}

fn party_leader_apply(text: &mut DisplayText, _: &SheetCtx) {
    text.title = "Partiledarpopularitet".to_string();
}

// "Arbetslöshet och ekonomisk kris" is the workbook's label for two
// different cuts of the worry indicator; the published report names them
// by scope instead.
fn worry_subtitle_matches(text: &DisplayText, _: &SheetCtx) -> bool {
    text.subtitle.as_deref() == Some("Arbetslöshet och ekonomisk kris")
}

fn worry_subtitle_apply(text: &mut DisplayText, ctx: &SheetCtx) {
    let replacement = if ctx.sheet_name.to_lowercase() == "oro 1" {
        "Ekonomisk kris och Stor arbetslöshet"
    } else {
        "Samtliga områden"
    };
    text.subtitle = Some(replacement.to_string());
}

/// Raw (pre-normalization) facts the reversal rules match against
#[derive(Debug, Clone)]
pub struct FlipCtx {
    rubrik: String,
    underrubrik: String,
    sheet: String,
}

impl FlipCtx {
    /// Lowercases once so the rules stay plain substring checks
    pub fn new(rubrik: Option<&str>, underrubrik: Option<&str>, sheet: &str) -> Self {
        Self {
            rubrik: rubrik.unwrap_or("").to_lowercase(),
            underrubrik: underrubrik.unwrap_or("").to_lowercase(),
            sheet: sheet.to_lowercase(),
        }
    }
}

/// A reversal trigger: sheets matching it store newest-first and must be
/// flipped to the chronological order every other sheet uses
pub struct FlipRule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    pub matches: fn(&FlipCtx) -> bool,
}

/// The reversal triggers, in evaluation order.
pub const FLIP_RULES: &[FlipRule] = &[
    FlipRule {
        name: "citizens-priority-problems",
        matches: |ctx| ctx.rubrik.contains("medborgarnas viktigaste samhällsproblem"),
    },
    FlipRule {
        name: "worry-all-areas",
        matches: |ctx| {
            ctx.rubrik.contains("vad svenskar oroar sig")
                && ctx.underrubrik.contains("samtliga områden")
        },
    },
    FlipRule {
        name: "party-sympathy",
        matches: |ctx| ctx.rubrik.contains("partisympati") || ctx.sheet.contains("partisymp"),
    },
];

/// Whether any reversal trigger matches
pub fn needs_chronological_flip(ctx: &FlipCtx) -> bool {
    FLIP_RULES.iter().any(|rule| (rule.matches)(ctx))
}

/// One known misspelling of a section-header sheet is corrected; all other
/// headers are used verbatim.
pub fn section_title(sheet_name: &str) -> String {
    let squeezed: String = sheet_name
        .chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_uppercase();
    if squeezed == "POLSAKFRÅGOR" {
        return "POLITISKA SAKFRÅGOR".to_string();
    }
    sheet_name.to_string()
}

/// Non-empty and free of lowercase characters.
///
/// This is the single all-caps test used everywhere a "was this typed in
/// capitals" decision is needed.
pub fn is_all_caps(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_lowercase)
}

/// Whole-string sentence case: first character uppercased, the rest
/// lowercased
pub fn sentence_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

/// Proper nouns that keep their canonical capitalization when a title is
/// folded out of all-caps
const PROPER_NOUNS: &[(&str, &str)] = &[
    ("sveriges", "Sveriges"),
    ("sverige", "Sverige"),
    ("svenska", "Svenska"),
    ("svenskar", "Svenskar"),
    ("svensk", "Svensk"),
    ("eu", "EU"),
    ("nato", "NATO"),
];

/// Word-by-word sentence case for all-caps headings: the first word is
/// sentence-cased, later words lowercased, and allow-listed proper nouns
/// come out in canonical form wherever they stand.
pub fn sentence_case_words(s: &str) -> String {
    let words: Vec<String> = s
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if let Some((_, canonical)) = PROPER_NOUNS.iter().find(|(key, _)| *key == lower) {
                (*canonical).to_string()
            } else if i == 0 {
                sentence_case(word)
            } else {
                lower
            }
        })
        .collect();
    words.join(" ")
}

/// Display form of a chart title: all-caps titles are sentence-cased, with
/// the party-leader-popularity charts keeping their parenthesized
/// qualifier untouched.
pub fn chart_title_display(title: &str) -> String {
    if !is_all_caps(title) {
        return title.to_string();
    }

    if title.to_lowercase().contains("partiledarpopularitet") {
        if let Some((main, rest)) = title.split_once('(') {
            return format!("{} ({}", sentence_case(main.trim()), rest);
        }
    }

    sentence_case(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_all_caps() {
        assert!(is_all_caps("FÖRTROENDE FÖR SAMHÄLLSINSTITUTIONER"));
        assert!(is_all_caps("EU"));
        assert!(is_all_caps("1986-2024"));
        assert!(!is_all_caps("Förtroende"));
        assert!(!is_all_caps(""));
    }

    #[test]
    fn test_sentence_case_words() {
        assert_eq!(
            sentence_case_words("FÖRTROENDE FÖR SAMHÄLLSINSTITUTIONER"),
            "Förtroende för samhällsinstitutioner"
        );
        assert_eq!(
            sentence_case_words("VAD SVENSKAR OROAR SIG FÖR"),
            "Vad Svenskar oroar sig för"
        );
        assert_eq!(
            sentence_case_words("INSTÄLLNING TILL EU OCH NATO"),
            "Inställning till EU och NATO"
        );
    }

    #[test]
    fn test_trust_collapse_requires_subtitle() {
        let ctx = SheetCtx {
            sheet_name: "Förtroende 1",
        };
        let mut with_subtitle = DisplayText {
            title: "Förtroende för samhällsinstitutioner".into(),
            subtitle: Some("Domstolar".into()),
        };
        apply_title_rules(&mut with_subtitle, &ctx);
        assert_eq!(with_subtitle.title, "Förtroende");

        let mut without_subtitle = DisplayText {
            title: "Förtroende för samhällsinstitutioner".into(),
            subtitle: None,
        };
        apply_title_rules(&mut without_subtitle, &ctx);
        assert_eq!(
            without_subtitle.title,
            "Förtroende för samhällsinstitutioner"
        );
    }

    #[test]
    fn test_worry_subtitle_depends_on_sheet() {
        let mut first = DisplayText {
            title: "Vad Svenskar oroar sig för".into(),
            subtitle: Some("Arbetslöshet och ekonomisk kris".into()),
        };
        apply_title_rules(
            &mut first,
            &SheetCtx {
                sheet_name: "Oro 1",
            },
        );
        assert_eq!(
            first.subtitle.as_deref(),
            Some("Ekonomisk kris och Stor arbetslöshet")
        );

        let mut second = DisplayText {
            title: "Vad Svenskar oroar sig för".into(),
            subtitle: Some("Arbetslöshet och ekonomisk kris".into()),
        };
        apply_title_rules(
            &mut second,
            &SheetCtx {
                sheet_name: "Oro 2",
            },
        );
        assert_eq!(second.subtitle.as_deref(), Some("Samtliga områden"));
    }

    #[test]
    fn test_flip_rules() {
        assert!(needs_chronological_flip(&FlipCtx::new(
            Some("Medborgarnas viktigaste samhällsproblem"),
            None,
            "Samhällsproblem 1"
        )));
        assert!(needs_chronological_flip(&FlipCtx::new(
            Some("Vad svenskar oroar sig för"),
            Some("Samtliga områden"),
            "Oro 2"
        )));
        // The two-series worry cut keeps its stored order
        assert!(!needs_chronological_flip(&FlipCtx::new(
            Some("Vad svenskar oroar sig för"),
            Some("Ekonomisk kris och stor arbetslöshet"),
            "Oro 1"
        )));
        // Party sympathy triggers on the sheet name alone
        assert!(needs_chronological_flip(&FlipCtx::new(
            None,
            None,
            "Partisymp 2"
        )));
        assert!(!needs_chronological_flip(&FlipCtx::new(
            Some("Förtroende för samhällsinstitutioner"),
            Some("Domstolar"),
            "Förtroende 1"
        )));
    }

    #[test]
    fn test_section_title_spelling_fix() {
        assert_eq!(section_title("POL SAKFRÅGOR"), "POLITISKA SAKFRÅGOR");
        assert_eq!(section_title("POLSAKFRÅGOR"), "POLITISKA SAKFRÅGOR");
        assert_eq!(section_title("SAMHÄLLSTRENDER"), "SAMHÄLLSTRENDER");
    }

    #[test]
    fn test_chart_title_display() {
        assert_eq!(chart_title_display("Redan normal"), "Redan normal");
        assert_eq!(chart_title_display("SJÄLVSKATTAD HÄLSA"), "Självskattad hälsa");
        assert_eq!(
            chart_title_display("PARTILEDARPOPULARITET (SAMTLIGA)"),
            "Partiledarpopularitet (SAMTLIGA)"
        );
        assert_eq!(
            chart_title_display("PARTILEDARPOPULARITET"),
            "Partiledarpopularitet"
        );
    }
}
