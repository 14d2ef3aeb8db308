//! Source deduplication for written sections
//!
//! Models often list one URL under several numbers. [`dedupe_sources`] keeps
//! the first number for each distinct source string, drops the repeats, and
//! rewrites body citations that pointed at a dropped number.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn source_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\[(\d+)\]\s*(.*?)\s*$").expect("valid regex"))
}

fn citation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(\d+)\]").expect("valid regex"))
}

fn sources_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*#{2,4}\s*sources\s*:?\s*$").expect("valid regex"))
}

/// Parse a source line into its number and source string
///
/// # Examples
///
/// ```
/// use parley_interview::parse_source_line;
///
/// assert_eq!(
///     parse_source_line("[3] https://example.com/fuse  "),
///     Some((3, "https://example.com/fuse".to_string()))
/// );
/// assert_eq!(parse_source_line("Plain text"), None);
/// ```
pub fn parse_source_line(line: &str) -> Option<(u32, String)> {
    let caps = source_line_re().captures(line)?;
    let number = caps[1].parse().ok()?;
    let source = caps[2].trim().to_string();
    if source.is_empty() {
        return None;
    }
    Some((number, source))
}

/// Remove duplicate source lines from a section
///
/// Source lines are the `[n] source` lines after the `### Sources` heading,
/// or anywhere when the section has no such heading. Other lines are body
/// text and get their `[n]` citations remapped.
pub fn dedupe_sources(section: &str) -> String {
    let lines: Vec<&str> = section.lines().collect();
    let sources_start = lines
        .iter()
        .rposition(|l| sources_heading_re().is_match(l))
        .map(|idx| idx + 1)
        .unwrap_or(0);

    // First pass: pick the surviving number for each source string
    let mut first_by_source: HashMap<String, u32> = HashMap::new();
    let mut remap: HashMap<u32, u32> = HashMap::new();
    let mut repeated = false;
    for line in &lines[sources_start..] {
        if let Some((number, source)) = parse_source_line(line) {
            if first_by_source.contains_key(&source) {
                repeated = true;
            }
            let survivor = *first_by_source.entry(source).or_insert(number);
            if survivor != number {
                remap.insert(number, survivor);
            }
        }
    }

    if !repeated {
        return section.to_string();
    }

    // Second pass: drop repeats, rewrite body citations
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if idx >= sources_start {
            if let Some((_, source)) = parse_source_line(line) {
                if !seen.insert(source) {
                    continue;
                }
                out.push(line.to_string());
                continue;
            }
        }
        out.push(rewrite_citations(line, &remap));
    }

    let mut result = out.join("\n");
    if section.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// Rewrite every `[n]` in `section` through `remap`
///
/// Source lines are rewritten too, so a section can be moved onto another
/// numbering. Numbers missing from `remap` are left alone.
///
/// # Examples
///
/// ```
/// use parley_interview::renumber_citations;
/// use std::collections::HashMap;
///
/// let remap = HashMap::from([(1, 2), (2, 1)]);
/// assert_eq!(
///     renumber_citations("a [1] b [2]\n[1] x\n[2] y", &remap),
///     "a [2] b [1]\n[2] x\n[1] y"
/// );
/// ```
pub fn renumber_citations(section: &str, remap: &HashMap<u32, u32>) -> String {
    if remap.is_empty() {
        return section.to_string();
    }
    let mut result = section
        .lines()
        .map(|line| rewrite_citations(line, remap))
        .collect::<Vec<_>>()
        .join("\n");
    if section.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn rewrite_citations(line: &str, remap: &HashMap<u32, u32>) -> String {
    citation_re()
        .replace_all(line, |caps: &regex::Captures<'_>| {
            let number: Option<u32> = caps[1].parse().ok();
            match number.and_then(|n| remap.get(&n)) {
                Some(survivor) => format!("[{}]", survivor),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
