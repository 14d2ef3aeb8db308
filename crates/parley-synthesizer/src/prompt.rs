//! Prompt for persona synthesis

/// JSON schema the model must follow
pub const PERSONA_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "personas": {
      "type": "array",
      "items": {
        "type": "object",
        "properties": {
          "name": {"type": "string", "description": "Name of the customer"},
          "occupation": {"type": "string", "description": "Occupation of the customer"},
          "age": {"type": "integer", "description": "Customer's age"},
          "description": {"type": "string", "description": "The customer's focus, concerns, and motives"}
        },
        "required": ["name", "occupation", "age", "description"]
      }
    }
  },
  "required": ["personas"]
}"#;

/// User message that triggers generation
pub const GENERATE_REQUEST: &str = "Generate the set of customer personas.";

/// Build the system prompt for one synthesis call
///
/// Blank feedback is treated as absent.
pub fn build_system_prompt(topic: &str, max_count: usize, feedback: Option<&str>) -> String {
    let feedback = feedback.map(str::trim).filter(|f| !f.is_empty()).unwrap_or("");

    format!(
        "You are tasked with creating a set of AI customer personas. Follow these instructions carefully:\n\
         1. First, review the product topic: {topic}\n\n\
         2. Examine any editorial feedback that has been optionally provided to guide creation of the personas: {feedback}\n\n\
         3. Determine the most interesting themes based upon the topic and/or feedback above.\n\n\
         4. Pick the top {max_count} themes.\n\n\
         5. Assign one customer persona to each theme. Return exactly {max_count} personas, \
         each with a name, occupation, age (1-120), and a description of their focus, concerns, and motives.",
    )
}
