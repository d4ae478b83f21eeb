//! Best-effort structure extraction from the model's free-text analysis.
//!
//! The model is asked for bold headings (`**Strengths:**` and so on) but nothing guarantees
//! it complies. Sections are located case-insensitively in whatever order they appear;
//! any heading that is missing yields an empty list. A reply with no recognisable heading
//! at all is reported as unparseable together with the raw text.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    MatchPercentage,
    Strengths,
    Weaknesses,
    MissingKeywords,
    Recommendations,
}

impl Section {
    const ALL: [Section; 5] = [
        Section::MatchPercentage,
        Section::Strengths,
        Section::Weaknesses,
        Section::MissingKeywords,
        Section::Recommendations,
    ];

    /// Heading text, already lowercase.
    fn marker(self) -> &'static str {
        match self {
            Section::MatchPercentage => "**match percentage:**",
            Section::Strengths => "**strengths:**",
            Section::Weaknesses => "**weaknesses:**",
            Section::MissingKeywords => "**missing keywords:**",
            Section::Recommendations => "**recommendations:**",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<f64>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisOutcome {
    Parsed(StructuredAnalysis),
    Unparseable { raw: String },
}

pub fn parse_analysis(text: &str) -> AnalysisOutcome {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();

    let mut found: Vec<(usize, Section)> = Section::ALL
        .iter()
        .filter_map(|&s| lower.find(s.marker()).map(|pos| (pos, s)))
        .collect();
    if found.is_empty() {
        return AnalysisOutcome::Unparseable {
            raw: text.to_string(),
        };
    }
    found.sort_by_key(|&(pos, _)| pos);

    // A heading that starts inside an earlier heading is not a heading.
    let mut covered = 0;
    found.retain(|&(pos, section)| {
        let keep = pos >= covered;
        if keep {
            covered = pos + section.marker().len();
        }
        keep
    });

    let mut analysis = StructuredAnalysis::default();
    for (i, &(pos, section)) in found.iter().enumerate() {
        let start = pos + section.marker().len();
        let end = found.get(i + 1).map_or(text.len(), |&(next, _)| next);
        let body = text.get(start..end).unwrap_or_default();

        match section {
            Section::MatchPercentage => analysis.match_percentage = first_number(body),
            Section::Strengths => analysis.strengths = list_items(body),
            Section::Weaknesses => analysis.weaknesses = list_items(body),
            Section::MissingKeywords => analysis.missing_keywords = keyword_items(body),
            Section::Recommendations => analysis.recommendations = list_items(body),
        }
    }
    AnalysisOutcome::Parsed(analysis)
}

fn list_items(body: &str) -> Vec<String> {
    body.lines()
        .map(strip_list_marker)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Keywords often come back as one comma-separated line instead of a list.
fn keyword_items(body: &str) -> Vec<String> {
    let items = list_items(body);
    if items.len() == 1 && items[0].contains(',') {
        return items[0]
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
    }
    items
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();

    if !line.starts_with("**") {
        if let Some(rest) = line.strip_prefix(['-', '*', '•', '+']) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }

    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(['.', ')']) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    line
}

fn first_number(body: &str) -> Option<f64> {
    let start = body.find(|c: char| c.is_ascii_digit())?;
    let rest = &body[start..];
    let len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..len].trim_end_matches('.').parse().ok()
}
