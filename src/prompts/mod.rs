//! Prompts sent to the generative AI service
//!
//! The analyst prompt embeds the user's question, optional web search
//! context, and the two chart schemas the model may emit. The chart
//! extractor relies on the model wrapping its JSON in a fenced block as
//! instructed here.

/// Placeholder used when no search context is available
pub const NO_CONTEXT: &str = "No external context available.";

/// Builds the emissions analyst prompt
///
/// # Arguments
///
/// * `question` - The user's question, embedded verbatim
/// * `context` - Formatted web search results, if the search succeeded
///
/// # Returns
///
/// A single prompt string for the text-completion endpoint
///
/// # Examples
///
/// ```
/// use ecoinsight::prompts::build_analyst_prompt;
///
/// let prompt = build_analyst_prompt("Plot EU emissions", None);
/// assert!(prompt.contains("\"Plot EU emissions\""));
/// assert!(prompt.contains("No external context available."));
/// ```
pub fn build_analyst_prompt(question: &str, context: Option<&str>) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(NO_CONTEXT);

    format!(
        r##"You are EcoInsight, an expert environmental data analyst.
User Question: "{question}"

Context from Web Search:
{context}

DATA VISUALIZATION INSTRUCTIONS:
If the user command implies visualizing data (e.g., "plot", "show", "compare", "graph"), you MUST include a JSON object.

You have two valid schema options. Choose the one that fits the available data best.

OPTION 1: Time Series (Trends over years)
{{
    "response_text": "Explanation...",
    "chart_type": "trend",
    "chart_data": [
        {{
            "sector": "USA",
            "data": [ {{ "year": 2020, "co2": 100 }}, {{ "year": 2021, "co2": 110 }} ],
            "color": "#3b82f6"
        }}
    ]
}}

OPTION 2: Snapshot (Comparison at a single point in time)
{{
    "response_text": "Explanation...",
    "chart_type": "snapshot",
    "chart_data": [
        {{ "label": "Transport", "value": 4500, "color": "#ef4444" }},
        {{ "label": "Energy", "value": 8000, "color": "#f59e0b" }}
    ]
}}

General Rules:
1. Always wrap the main JSON object in ```json code blocks.
2. Emit at most one JSON object per answer.
3. Ensure "chart_data" is never empty if you promise a visualization.
4. Use contrasting colors for different entities.
"##
    )
}
