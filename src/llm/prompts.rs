//! Prompt templates for query enhancement and interview response formatting.

// Author: kelexine (https://github.com/kelexine)

use crate::models::RagConfig;

pub fn query_enhancement_prompt(question: &str, config: &RagConfig) -> String {
    let emphasis = if config.emphasize_metrics {
        "quantifiable achievements and metrics"
    } else {
        "qualitative experiences and growth"
    };
    let coverage = if config.use_star_format {
        "Situation-Task-Action-Result components"
    } else {
        "strategic and high-level concepts"
    };

    format!(
        "You are an interview preparation assistant optimizing search queries for professional profile data.\n\
         \n\
         Original Question: \"{question}\"\n\
         \n\
         Interview Context:\n\
         - Focus Areas: {focus}\n\
         - Response Style: {style}\n\
         \n\
         Enhance this query to search for relevant experience by:\n\
         - Adding synonyms and related terms from the focus areas\n\
         - Including both technical and professional terminology\n\
         - Emphasizing {emphasis}\n\
         - Expanding to cover {coverage}\n\
         \n\
         Return only the enhanced search query (no explanation):",
        focus = config.focus_areas.join(", "),
        style = config.response_style,
    )
}

pub fn response_formatting_prompt(question: &str, context: &str, config: &RagConfig) -> String {
    let structure = if config.use_star_format {
        "- Structure using STAR format (Situation, Task, Action, Result) when describing experiences\n\
         - Include specific examples and stories"
    } else {
        "- Provide strategic, high-level responses\n\
         - Focus on outcomes and business impact"
    };
    let detail = if config.emphasize_metrics {
        "- Include specific metrics, percentages, and quantifiable results\n\
         - Mention technologies, tools, and technical details"
    } else {
        "- Focus on qualitative impact and personal growth\n\
         - Emphasize soft skills and team dynamics"
    };

    format!(
        "You are an expert interview coach preparing responses for a professional interview.\n\
         \n\
         Interview Type Context:\n\
         - Focus Areas: {focus}\n\
         - Response Style: {style}\n\
         \n\
         Question: \"{question}\"\n\
         \n\
         Professional Background Data:\n\
         {context}\n\
         \n\
         Create an interview-ready response that:\n\
         {structure}\n\
         {detail}\n\
         - Sounds confident, natural, and conversational\n\
         - Speaks in first person as the candidate\n\
         - Directly addresses the question\n\
         - Highlights unique value and differentiators\n\
         - Is concise but impactful (aim for {min_words}-{max_words} words)\n\
         \n\
         Interview Response:",
        focus = config.focus_areas.join(", "),
        style = config.response_style,
        min_words = config.max_tokens / 2,
        max_words = config.max_tokens,
    )
}
