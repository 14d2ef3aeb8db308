//! Final report assembly
//!
//! Deterministic: no model call, same sections in gives the same text out.

use crate::types::Section;
use parley_interview::{parse_source_line, renumber_citations};
use std::collections::HashMap;

/// The combined report of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalReport {
    /// Report title (the topic)
    pub title: String,

    /// Sections ordered by persona index, cited against [`Self::sources`]
    pub sections: Vec<Section>,

    /// Unique sources across all sections, in first-seen order
    pub sources: Vec<String>,
}

impl FinalReport {
    /// Build the report from sections in any order
    ///
    /// Each section's citations and source lines are renumbered to the
    /// report-wide source list, so `[n]` means the same source everywhere.
    pub fn compile(topic: &str, sections: &[Section]) -> Self {
        let mut ordered = sections.to_vec();
        ordered.sort_by_key(|s| s.persona_index);

        let mut sources: Vec<String> = Vec::new();
        for section in &mut ordered {
            let mut remap: HashMap<u32, u32> = HashMap::new();
            for (local, source) in section_sources(&section.text) {
                let global = match sources.iter().position(|s| *s == source) {
                    Some(pos) => pos + 1,
                    None => {
                        sources.push(source);
                        sources.len()
                    }
                };
                if local as usize != global {
                    remap.insert(local, global as u32);
                }
            }
            section.text = renumber_citations(&section.text, &remap);
        }

        Self {
            title: topic.trim().to_string(),
            sections: ordered,
            sources,
        }
    }

    /// Render as Markdown
    pub fn render(&self) -> String {
        let mut out = format!("# {}\n\n", self.title);

        let body = self
            .sections
            .iter()
            .map(|s| s.text.trim().to_string())
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");
        out.push_str(&body);

        if !self.sources.is_empty() {
            out.push_str("\n\n---\n\n## Sources\n");
            for (idx, source) in self.sources.iter().enumerate() {
                out.push_str(&format!("[{}] {}  \n", idx + 1, source));
            }
        }
        out
    }
}

/// Numbered sources listed under a section's Sources heading
fn section_sources(text: &str) -> Vec<(u32, String)> {
    text.lines()
        .skip_while(|l| !is_sources_heading(l))
        .filter_map(parse_source_line)
        .collect()
}

fn is_sources_heading(line: &str) -> bool {
    let trimmed = line.trim().trim_start_matches('#').trim();
    line.trim_start().starts_with('#') && trimmed.eq_ignore_ascii_case("sources")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(index: usize, name: &str, text: &str) -> Section {
        Section {
            persona_index: index,
            persona_name: name.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_orders_by_persona_and_merges_sources() {
        let sections = vec![
            section(1, "Maria", "## B\n### Summary\nb [1]\n### Sources\n[1] https://shared\n[2] https://b"),
            section(0, "Jake", "## A\n### Summary\na [1]\n### Sources\n[1] https://a\n[2] https://shared"),
        ];
        let report = FinalReport::compile("Snowboard bindings", &sections);

        assert_eq!(report.sections[0].persona_name, "Jake");
        assert_eq!(report.sources, vec!["https://a", "https://shared", "https://b"]);

        // Maria's local [1]/[2] become the report-wide [2]/[3]
        assert_eq!(
            report.sections[1].text,
            "## B\n### Summary\nb [2]\n### Sources\n[2] https://shared\n[3] https://b"
        );
        assert_eq!(report.sections[0].text, sections[1].text);

        let text = report.render();
        assert!(text.starts_with("# Snowboard bindings\n\n## A"));
        assert!(text.contains("\n\n---\n\n## B"));
        assert!(text.ends_with("## Sources\n[1] https://a  \n[2] https://shared  \n[3] https://b  \n"));
    }

    #[test]
    fn test_is_deterministic() {
        let a = vec![section(0, "A", "## A\n### Sources\n[1] x"), section(1, "B", "## B")];
        let b = vec![a[1].clone(), a[0].clone()];
        assert_eq!(
            FinalReport::compile("t", &a).render(),
            FinalReport::compile("t", &b).render()
        );
    }

    #[test]
    fn test_swapped_numbers_are_renumbered_once() {
        let sections = vec![
            section(0, "A", "## A\nx [1] y [2]\n### Sources\n[1] https://p\n[2] https://q"),
            section(1, "B", "## B\nq [1] p [2]\n### Sources\n[1] https://q\n[2] https://p"),
        ];
        let report = FinalReport::compile("t", &sections);
        assert_eq!(report.sources, vec!["https://p", "https://q"]);
        assert_eq!(
            report.sections[1].text,
            "## B\nq [2] p [1]\n### Sources\n[2] https://q\n[1] https://p"
        );
    }

    #[test]
    fn test_no_sources_block_when_empty() {
        let report = FinalReport::compile("t", &[section(0, "A", "## A\nno sources")]);
        assert!(!report.render().contains("## Sources"));
    }
}
