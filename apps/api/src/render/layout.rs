//! Resume → positioned text.
//!
//! Two passes: `build_blocks` fixes the section order and wording, `paginate` wraps each
//! block with the font tables and assigns coordinates on US-letter pages. Both are pure,
//! so the same record always produces the same pages.

use crate::models::resume::ResumeContent;
use crate::render::metrics::Font;
use crate::render::RenderError;

pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;
pub const MARGIN_PT: f32 = 54.0;
pub const CONTENT_WIDTH_PT: f32 = PAGE_WIDTH_PT - 2.0 * MARGIN_PT;

const LINE_SPACING: f32 = 1.25;
const BULLET_INDENT_PT: f32 = 12.0;
const RULE_OFFSET_PT: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Name,
    SectionHeading,
    EntryTitle,
    Body,
}

impl Style {
    pub fn font(self) -> Font {
        match self {
            Style::Body => Font::Helvetica,
            Style::Name | Style::SectionHeading | Style::EntryTitle => Font::HelveticaBold,
        }
    }

    pub fn size_pt(self) -> f32 {
        match self {
            Style::Name => 24.0,
            Style::SectionHeading => 16.0,
            Style::EntryTitle => 12.0,
            Style::Body => 10.0,
        }
    }

    fn leading_pt(self) -> f32 {
        self.size_pt() * LINE_SPACING
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// A paragraph before wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub style: Style,
    pub text: String,
    pub align: Align,
    pub indent_pt: f32,
    pub space_before_pt: f32,
}

impl Block {
    fn new(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
            align: Align::Left,
            indent_pt: 0.0,
            space_before_pt: 0.0,
        }
    }

    fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    fn indented(mut self, indent_pt: f32) -> Self {
        self.indent_pt = indent_pt;
        self
    }

    fn spaced(mut self, space_before_pt: f32) -> Self {
        self.space_before_pt = space_before_pt;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Text {
        text: String,
        font: Font,
        size_pt: f32,
        x: f32,
        y: f32,
    },
    /// Horizontal underline below a section heading.
    Rule { x_start: f32, x_end: f32, y: f32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub marks: Vec<Mark>,
}

#[cfg(test)]
impl Page {
    /// Text of every line on the page, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().filter_map(|m| match m {
            Mark::Text { text, .. } => Some(text.as_str()),
            Mark::Rule { .. } => None,
        })
    }
}

/// Lays the resume out onto pages.
pub fn layout(content: &ResumeContent) -> Result<Vec<Page>, RenderError> {
    Ok(paginate(&build_blocks(content)?))
}

/// Emits sections in fixed order: header, summary, experience, education, skills,
/// certifications. Empty sections are omitted.
pub fn build_blocks(content: &ResumeContent) -> Result<Vec<Block>, RenderError> {
    let info = &content.personal_info;
    let full_name = info.full_name.trim();
    if full_name.is_empty() {
        return Err(RenderError::MissingFullName);
    }

    let mut blocks = vec![Block::new(Style::Name, full_name).centered()];

    let contact = [
        Some(info.email.as_str()),
        Some(info.phone.as_str()),
        Some(info.location.as_str()),
        info.linkedin.as_deref(),
        info.portfolio.as_deref(),
    ];
    for line in contact.into_iter().flatten() {
        if !line.trim().is_empty() {
            blocks.push(Block::new(Style::Body, line).centered());
        }
    }

    if let Some(summary) = content
        .professional_summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        blocks.push(heading("Professional Summary"));
        blocks.push(Block::new(Style::Body, summary));
    }

    if !content.experience.is_empty() {
        blocks.push(heading("Professional Experience"));
        for exp in &content.experience {
            blocks.push(
                Block::new(
                    Style::EntryTitle,
                    format!("{} at {}", exp.position, exp.company),
                )
                .spaced(6.0),
            );
            let end = if exp.current {
                "Present"
            } else {
                exp.end_date.as_deref().unwrap_or("")
            };
            blocks.push(Block::new(Style::Body, date_range(&exp.start_date, end)));
            blocks.push(Block::new(Style::Body, exp.description.as_str()));
            if !exp.achievements.is_empty() {
                blocks.push(Block::new(Style::Body, "Key Achievements:").spaced(4.0));
                for achievement in &exp.achievements {
                    blocks.push(
                        Block::new(Style::Body, format!("\u{2022} {achievement}"))
                            .indented(BULLET_INDENT_PT),
                    );
                }
            }
        }
    }

    if !content.education.is_empty() {
        blocks.push(heading("Education"));
        for edu in &content.education {
            blocks.push(
                Block::new(
                    Style::EntryTitle,
                    format!("{} in {}", edu.degree, edu.field),
                )
                .spaced(6.0),
            );
            blocks.push(Block::new(Style::Body, edu.institution.as_str()));
            let gpa = edu
                .gpa
                .as_deref()
                .filter(|g| !g.trim().is_empty())
                .unwrap_or("N/A");
            blocks.push(Block::new(Style::Body, format!("GPA: {gpa}")));
        }
    }

    if !content.skills.is_empty() {
        blocks.push(heading("Skills"));
        for (category, skills) in content.skills.categories() {
            if skills.is_empty() {
                continue;
            }
            blocks.push(Block::new(Style::EntryTitle, capitalize(category)).spaced(6.0));
            blocks.push(Block::new(Style::Body, skills.join(", ")));
        }
    }

    if !content.certifications.is_empty() {
        blocks.push(heading("Certifications"));
        for cert in &content.certifications {
            blocks.push(Block::new(Style::EntryTitle, cert.name.as_str()).spaced(6.0));
            blocks.push(Block::new(Style::Body, format!("Issued by {}", cert.issuer)));
            blocks.push(Block::new(Style::Body, format!("Date: {}", cert.date)));
        }
    }

    Ok(blocks)
}

/// Wraps and positions blocks. Headings never end a page on their own.
pub fn paginate(blocks: &[Block]) -> Vec<Page> {
    let top = PAGE_HEIGHT_PT - MARGIN_PT;
    let mut pages = vec![Page::default()];
    let mut y = top;

    for block in blocks {
        let font = block.style.font();
        let size = block.style.size_pt();
        let leading = block.style.leading_pt();
        let width_em = (CONTENT_WIDTH_PT - block.indent_pt) / size;
        let lines = font.metrics().wrap(&block.text, width_em);
        if lines.is_empty() {
            continue;
        }

        y -= block.space_before_pt;

        let needed = if block.style == Style::SectionHeading {
            leading + 2.0 * Style::Body.leading_pt()
        } else {
            leading
        };
        if y - needed < MARGIN_PT && y < top {
            pages.push(Page::default());
            y = top;
        }

        let mut last_baseline = y;
        for line in lines {
            if y - leading < MARGIN_PT {
                pages.push(Page::default());
                y = top;
            }
            let baseline = y - size;
            y -= leading;

            let x = match block.align {
                Align::Left => MARGIN_PT + block.indent_pt,
                Align::Center => {
                    let w = font.metrics().width_pt(&line, size);
                    MARGIN_PT + ((CONTENT_WIDTH_PT - w) / 2.0).max(0.0)
                }
            };

            if let Some(page) = pages.last_mut() {
                page.marks.push(Mark::Text {
                    text: line,
                    font,
                    size_pt: size,
                    x,
                    y: baseline,
                });
            }
            last_baseline = baseline;
        }

        if block.style == Style::SectionHeading {
            if let Some(page) = pages.last_mut() {
                page.marks.push(Mark::Rule {
                    x_start: MARGIN_PT,
                    x_end: PAGE_WIDTH_PT - MARGIN_PT,
                    y: last_baseline - RULE_OFFSET_PT,
                });
            }
        }
    }

    pages
}

fn heading(title: &str) -> Block {
    Block::new(Style::SectionHeading, title).spaced(12.0)
}

fn date_range(start: &str, end: &str) -> String {
    match (start.trim().is_empty(), end.trim().is_empty()) {
        (false, false) => format!("{start} - {end}"),
        (false, true) => start.to_string(),
        (true, false) => end.to_string(),
        (true, true) => String::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{
        Certification, Education, Experience, PersonalInfo, ResumeContent, Skills,
    };

    fn content() -> ResumeContent {
        ResumeContent {
            title: "Systems".into(),
            personal_info: PersonalInfo {
                full_name: "Linus Example".into(),
                email: "linus@example.com".into(),
                phone: "555-0199".into(),
                location: "Helsinki".into(),
                linkedin: None,
                portfolio: Some("example.dev".into()),
                photo: None,
            },
            professional_summary: Some("Kernel hacker.".into()),
            experience: vec![
                Experience {
                    company: "Transmeta".into(),
                    position: "Engineer".into(),
                    start_date: "1997".into(),
                    end_date: Some("2003".into()),
                    current: false,
                    description: "Worked on code morphing.".into(),
                    achievements: vec![],
                },
                Experience {
                    company: "Linux Foundation".into(),
                    position: "Fellow".into(),
                    start_date: "2003".into(),
                    end_date: None,
                    current: true,
                    description: "Maintains the kernel.".into(),
                    achievements: vec!["Merged 1000 pulls".into()],
                },
            ],
            education: vec![Education {
                institution: "University of Helsinki".into(),
                degree: "MSc".into(),
                field: "Computer Science".into(),
                gpa: None,
                ..Default::default()
            }],
            skills: Skills {
                technical: vec!["C".into(), "Git".into()],
                soft: vec![],
                languages: vec!["Swedish".into(), "Finnish".into()],
            },
            certifications: vec![Certification {
                name: "Millennium Technology Prize".into(),
                issuer: "Technology Academy Finland".into(),
                date: "2012".into(),
                url: None,
            }],
            extended: Default::default(),
        }
    }

    fn texts(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_sections_emitted_in_fixed_order() {
        let blocks = build_blocks(&content()).unwrap();
        let headings: Vec<_> = blocks
            .iter()
            .filter(|b| b.style == Style::SectionHeading)
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(
            headings,
            [
                "Professional Summary",
                "Professional Experience",
                "Education",
                "Skills",
                "Certifications"
            ]
        );
    }

    #[test]
    fn test_header_is_centered_name_then_contact_lines() {
        let blocks = build_blocks(&content()).unwrap();
        assert_eq!(blocks[0].style, Style::Name);
        assert_eq!(blocks[0].align, Align::Center);
        assert_eq!(
            texts(&blocks[1..5]),
            ["linus@example.com", "555-0199", "Helsinki", "example.dev"]
        );
    }

    #[test]
    fn test_experience_entries_format() {
        let blocks = build_blocks(&content()).unwrap();
        let t = texts(&blocks);
        assert!(t.contains(&"Engineer at Transmeta"));
        assert!(t.contains(&"1997 - 2003"));
        assert!(t.contains(&"2003 - Present"));
        assert!(t.contains(&"Key Achievements:"));
        assert!(t.contains(&"\u{2022} Merged 1000 pulls"));
    }

    #[test]
    fn test_current_overrides_stale_end_date() {
        let mut c = content();
        c.experience[1].end_date = Some("2010".into());
        let t = build_blocks(&c).unwrap();
        assert!(texts(&t).contains(&"2003 - Present"));
    }

    #[test]
    fn test_education_defaults_gpa_to_na() {
        let t = build_blocks(&content()).unwrap();
        let t = texts(&t);
        assert!(t.contains(&"MSc in Computer Science"));
        assert!(t.contains(&"University of Helsinki"));
        assert!(t.contains(&"GPA: N/A"));
    }

    #[test]
    fn test_skill_categories_title_cased_and_empty_skipped() {
        let blocks = build_blocks(&content()).unwrap();
        let t = texts(&blocks);
        assert!(t.contains(&"Technical"));
        assert!(t.contains(&"C, Git"));
        assert!(t.contains(&"Languages"));
        assert!(!t.contains(&"Soft"));
    }

    #[test]
    fn test_certification_lines() {
        let blocks = build_blocks(&content()).unwrap();
        let t = texts(&blocks);
        assert!(t.contains(&"Issued by Technology Academy Finland"));
        assert!(t.contains(&"Date: 2012"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let mut c = content();
        c.professional_summary = Some("  ".into());
        c.experience.clear();
        c.education.clear();
        c.skills = Skills::default();
        c.certifications.clear();
        let blocks = build_blocks(&c).unwrap();
        assert!(blocks.iter().all(|b| b.style != Style::SectionHeading));
    }

    #[test]
    fn test_missing_full_name_fails() {
        let mut c = content();
        c.personal_info.full_name = " ".into();
        assert!(matches!(
            build_blocks(&c),
            Err(RenderError::MissingFullName)
        ));
    }

    #[test]
    fn test_layout_is_deterministic() {
        assert_eq!(layout(&content()).unwrap(), layout(&content()).unwrap());
    }

    #[test]
    fn test_long_resume_spills_onto_more_pages_within_margins() {
        let mut c = content();
        c.experience[0].achievements = (0..120).map(|i| format!("Achievement {i}")).collect();
        let pages = layout(&c).unwrap();
        assert!(pages.len() > 1);
        for page in &pages {
            for mark in &page.marks {
                if let Mark::Text { y, .. } = mark {
                    assert!(*y >= MARGIN_PT - 1.0 && *y <= PAGE_HEIGHT_PT - MARGIN_PT);
                }
            }
        }
        let all: Vec<_> = pages.iter().flat_map(|p| p.lines()).collect();
        assert!(all.contains(&"\u{2022} Achievement 119"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("technical"), "Technical");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_date_range_with_missing_parts() {
        assert_eq!(date_range("2020", ""), "2020");
        assert_eq!(date_range("", "Present"), "Present");
        assert_eq!(date_range("", ""), "");
    }
}
