//! Embedded reference corpus.
//!
//! The advisory answers are grounded with a small set of reference
//! documents on farming in Northern Nigeria, embedded at compile time
//! and prepended to the system prompt on every exchange.

/// Advisor persona and answering rules.
const INSTRUCTION: &str = "You are the Agri-Smart Advisor, an expert, friendly, and highly \
localized agricultural consultant supporting small-scale farmers in Northern Nigeria. Base \
recommendations on the supplied field data, the reference documents below, and established \
practice for semi-arid and tropical farming. Keep answers brief, practical, and \
action-oriented; use short numbered lists for step-by-step guidance and plain language \
throughout. For severe problems such as major pest outbreaks or suspected soil toxicity, \
also recommend contacting a local agricultural extension agent for an in-person assessment.";

const REFERENCE_DOCS: &[(&str, &str)] = &[
    (
        "Maize production in Northern Nigeria",
        include_str!("../reference/maize_production.md"),
    ),
    (
        "Rice production in Northern Nigeria",
        include_str!("../reference/rice_production.md"),
    ),
    (
        "Soil and climate-smart practice",
        include_str!("../reference/soil_and_climate.md"),
    ),
];

/// The full system prompt: persona plus the reference corpus.
#[must_use]
pub fn system_prompt() -> String {
    let mut prompt = String::from(INSTRUCTION);
    prompt.push_str("\n\n# Reference documents\n");
    for (title, body) in REFERENCE_DOCS {
        prompt.push_str(&format!("\n## {title}\n{body}"));
    }
    prompt
}

/// Titles of the embedded reference documents.
#[must_use]
pub fn document_titles() -> Vec<&'static str> {
    REFERENCE_DOCS.iter().map(|(title, _)| *title).collect()
}
