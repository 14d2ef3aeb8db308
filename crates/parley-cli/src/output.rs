//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use parley_domain::PersonaSet;
use parley_orchestrator::{InterviewOutcome, RunResult};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a persona set.
    pub fn format_personas(&self, personas: &PersonaSet) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(personas)?),
            OutputFormat::Table => Ok(self.format_personas_table(personas)),
            OutputFormat::Markdown => Ok(format_personas_markdown(personas)),
        }
    }

    fn format_personas_table(&self, personas: &PersonaSet) -> String {
        if personas.is_empty() {
            return self.colorize("No personas.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Name", "Occupation", "Age", "Description"]);

        for (idx, persona) in personas.iter().enumerate() {
            builder.push_record([
                (idx + 1).to_string(),
                persona.name.clone(),
                persona.occupation.clone(),
                persona.age.to_string(),
                persona.description.clone(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the outcome of a run.
    ///
    /// With `report` set, or in Markdown mode, prints the combined report;
    /// otherwise one block per section followed by failures.
    pub fn format_run(&self, result: &RunResult, report: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_run_json(result),
            OutputFormat::Markdown => Ok(result.report().render()),
            OutputFormat::Table if report => Ok(result.report().render()),
            OutputFormat::Table => Ok(self.format_run_sections(result)),
        }
    }

    fn format_run_sections(&self, result: &RunResult) -> String {
        let mut blocks: Vec<String> = result
            .sections
            .iter()
            .map(|s| {
                format!(
                    "{}\n{}",
                    self.colorize(&format!("── {} ──", s.persona_name), "cyan"),
                    s.text.trim()
                )
            })
            .collect();

        for failure in result.failures() {
            if let InterviewOutcome::Failed {
                persona_name,
                error,
                ..
            } = failure
            {
                blocks.push(self.error(&format!(
                    "Interview with {} failed: {}",
                    persona_name, error
                )));
            }
        }

        if blocks.is_empty() {
            return self.warning("No sections were written.");
        }
        blocks.join("\n\n")
    }

    fn format_run_json(&self, result: &RunResult) -> Result<String> {
        let outcomes: Vec<serde_json::Value> = result
            .outcomes
            .iter()
            .map(|o| match o {
                InterviewOutcome::Completed {
                    persona_index,
                    record,
                } => serde_json::json!({
                    "persona_index": persona_index,
                    "status": "completed",
                    "record": record,
                }),
                InterviewOutcome::Failed {
                    persona_index,
                    persona_name,
                    error,
                } => serde_json::json!({
                    "persona_index": persona_index,
                    "persona_name": persona_name,
                    "status": "failed",
                    "error": error,
                }),
            })
            .collect();

        let sections: Vec<serde_json::Value> = result
            .sections
            .iter()
            .map(|s| {
                serde_json::json!({
                    "persona_index": s.persona_index,
                    "persona_name": s.persona_name,
                    "text": s.text,
                })
            })
            .collect();

        let value = serde_json::json!({
            "run_id": result.run_id.to_string(),
            "topic": result.topic,
            "personas": result.personas,
            "outcomes": outcomes,
            "sections": sections,
            "report": result.report().render(),
            "metrics": {
                "interviews_started": result.metrics.interviews_started,
                "interviews_completed": result.metrics.interviews_completed,
                "interviews_failed": result.metrics.interviews_failed,
                "total_turns": result.metrics.total_turns,
                "context_documents": result.metrics.context_documents,
                "total_runtime_ms": result.metrics.total_runtime_ms,
            },
        });

        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn format_personas_markdown(personas: &PersonaSet) -> String {
    personas
        .iter()
        .map(|p| {
            format!(
                "### {}\n- Occupation: {}\n- Age: {}\n\n{}\n",
                p.name, p.occupation, p.age, p.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
