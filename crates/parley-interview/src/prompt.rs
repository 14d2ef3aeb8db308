//! Prompts for each interview stage

/// Schema for the search query rewrite
pub const SEARCH_QUERY_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "search_query": {"type": "string", "description": "Search query for retrieval."}
  },
  "required": ["search_query"]
}"#;

/// System prompt for the search query rewrite
pub const SEARCH_INSTRUCTIONS: &str = "You will be given a conversation between an analyst and a customer.\n\
Your goal is to generate a well-structured query for use in retrieval and / or web-search related to the conversation.\n\
First, analyze the full conversation.\n\
Pay particular attention to the final question posed by the analyst.\n\
Convert this final question into a well-structured web search query.";

/// Moderator message that opens every interview
pub fn opening_message(topic: &str) -> String {
    format!("So you said you were writing an article on {}?", topic)
}

/// System prompt for the analyst asking questions
pub fn question_instructions(goals: &str, closing_phrase: &str) -> String {
    format!(
        "You are an analyst tasked with interviewing a customer to learn about a specific topic.\n\
         Your goal is to boil down to interesting and specific insights related to your topic.\n\
         1. Interesting: Insights that people will find surprising or non-obvious.\n\
         2. Specific: Insights that avoid generalities and include specific examples from the customer.\n\
         Here is your topic of focus and set of goals: {goals}\n\
         Begin by introducing yourself using a name that fits your persona, and then ask your question.\n\
         Continue to ask questions to drill down and refine your understanding of the topic.\n\
         When you are satisfied with your understanding, complete the interview with \"{closing_phrase}\"\n\
         Remember to stay in character throughout your response, reflecting the persona and goals provided to you.",
    )
}

/// User message carrying the conversation to the query rewriter
pub fn search_request(conversation: &str) -> String {
    format!("Conversation so far:\n{}", conversation)
}

/// System prompt for the persona answering from context
pub fn answer_instructions(goals: &str, context: &str) -> String {
    format!(
        "You are a customer being interviewed by an analyst.\n\
         Here is the analyst's area of focus: {goals}\n\
         Your goal is to answer a question posed by the interviewer.\n\
         To answer the question, use this context:\n{context}\n\n\
         When answering questions, follow these guidelines:\n\
         1. Use only the information provided in the context.\n\
         2. Do not introduce external information or make assumptions beyond what is explicitly stated in the context.\n\
         3. The context contains sources at the top of each individual document.\n\
         4. Include these sources in your answer next to any relevant statements. For example, for source #1 use [1].\n\
         5. List your sources in order at the bottom of your answer. [1] Source 1, [2] Source 2, etc.\n\
         6. If the source is: <Document source=\"assistant/docs/llama3_1.pdf\" page=\"7\"/> then just list: [1] assistant/docs/llama3_1.pdf, page 7\n\
         And skip the addition of the brackets as well as the Document source preamble in your citation.",
    )
}

/// System prompt for the section writer
pub fn section_writer_instructions(focus: &str) -> String {
    format!(
        "You are an expert technical writer.\n\
         Your task is to create a short, easily digestible section of a report based on a set of source documents.\n\
         1. Analyze the content of the source documents.\n\
         2. Create a report structure using markdown formatting:\n\
         - Use ## for the section title\n\
         - Use ### for sub-section headers\n\
         3. Write the report following this structure:\n\
         a. Title (## header)\n\
         b. Summary (### header)\n\
         c. Sources (### header)\n\
         4. Make your title engaging based upon the focus area of the customer:\n{focus}\n\
         5. For the summary section:\n\
         - Set up summary with general background / context related to the focus area of the customer\n\
         - Emphasize what is novel, interesting, or surprising about insights gathered from the interview\n\
         - Create a numbered list of source documents, as you use them\n\
         - Do not mention the names of interviewers or customers\n\
         - Aim for approximately 400 words maximum\n\
         - Use numbered sources in your report (e.g., [1], [2]) based on information from source documents\n\
         6. In the Sources section:\n\
         - Include all sources used in your report\n\
         - Provide full links to relevant websites or specific document paths\n\
         - Separate each source by a newline, in the form: [1] Link or Document name\n\
         7. Combine sources: no source may be listed twice under different numbers.\n\
         8. Final review:\n\
         - Ensure the report follows the required structure\n\
         - Include no preamble before the title of the report",
    )
}

/// User message carrying the transcript to the section writer
pub fn section_request(transcript: &str) -> String {
    format!("Use this source to write your section: {}", transcript)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_message() {
        assert_eq!(
            opening_message("latest snowboard binding"),
            "So you said you were writing an article on latest snowboard binding?"
        );
    }

    #[test]
    fn test_question_prompt_carries_goals_and_phrase() {
        let prompt = question_instructions("Name: Jake\n", "Thank you so much for your help!");
        assert!(prompt.contains("Name: Jake"));
        assert!(prompt.contains("\"Thank you so much for your help!\""));
    }

    #[test]
    fn test_answer_prompt_embeds_context() {
        let prompt = answer_instructions("goals", "<Document href=\"https://x\"/>\nfacts\n</Document>");
        assert!(prompt.contains("<Document href=\"https://x\"/>"));
        assert!(prompt.contains("Use only the information provided in the context."));
    }
}
