//! Manual-section preservation
//!
//! Readers add their own `##` sections to generated pages. On re-render
//! those sections are lifted out of the previous page and re-inserted
//! after the same fixed section they followed before. A manual section
//! whose anchor no longer exists is appended at the end rather than
//! dropped.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

/// One reader-authored section lifted from a previous render
#[derive(Debug, Clone, PartialEq)]
pub struct ManualSection {
    /// Heading of the fixed section this one followed, if any
    pub anchor: Option<String>,
    /// Verbatim section text, heading included
    pub text: String,
}

#[derive(Debug)]
struct Section {
    heading: String,
    start: usize,
}

/// `##` headings with their byte offsets, in document order
fn h2_sections(body: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(String, usize)> = None;

    for (event, range) in Parser::new(body).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H2,
                ..
            }) => {
                current = Some((String::new(), range.start));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((heading, _)) = current.as_mut() {
                    heading.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(HeadingLevel::H2)) => {
                if let Some((heading, start)) = current.take() {
                    sections.push(Section { heading, start });
                }
            }
            _ => {}
        }
    }
    sections
}

/// Lift every non-fixed `##` section out of a previous page body
#[must_use]
pub fn extract_manual_sections(body: &str, fixed: &[&str]) -> Vec<ManualSection> {
    let sections = h2_sections(body);
    let mut manual = Vec::new();

    for (idx, section) in sections.iter().enumerate() {
        if fixed.contains(&section.heading.as_str()) {
            continue;
        }
        let end = sections.get(idx + 1).map_or(body.len(), |s| s.start);
        let anchor = sections[..idx]
            .iter()
            .rev()
            .find(|s| fixed.contains(&s.heading.as_str()))
            .map(|s| s.heading.clone());
        manual.push(ManualSection {
            anchor,
            text: body[section.start..end].to_string(),
        });
    }
    manual
}

/// Re-insert lifted sections into a freshly rendered body
#[must_use]
pub fn reinsert_manual_sections(rendered: &str, manual: &[ManualSection]) -> String {
    if manual.is_empty() {
        return rendered.to_string();
    }

    let sections = h2_sections(rendered);
    let mut inserts: Vec<(usize, &ManualSection)> = Vec::new();
    let mut trailing: Vec<&ManualSection> = Vec::new();

    for section in manual {
        let position = section
            .anchor
            .as_deref()
            .and_then(|anchor| sections.iter().position(|s| s.heading == anchor));
        match position {
            Some(idx) => {
                let end = sections.get(idx + 1).map_or(rendered.len(), |s| s.start);
                inserts.push((end, section));
            }
            None => trailing.push(section),
        }
    }
    inserts.sort_by_key(|(offset, _)| *offset);

    let mut out = String::with_capacity(rendered.len());
    let mut cursor = 0;
    for (offset, section) in inserts {
        out.push_str(&rendered[cursor..offset]);
        push_block(&mut out, &section.text);
        cursor = offset;
    }
    out.push_str(&rendered[cursor..]);
    for section in trailing {
        push_block(&mut out, &section.text);
    }
    out
}

fn push_block(out: &mut String, text: &str) {
    while !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
    out.push_str(text.trim_end());
    out.push_str("\n\n");
}
