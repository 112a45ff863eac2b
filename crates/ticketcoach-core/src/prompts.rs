//! Prompt templates for the three model calls.
//!
//! The evaluation template is the contract the decoder parses against: the
//! JSON layout under "Return STRICTLY valid JSON" must stay in step with
//! `ticketcoach_schema::Evaluation`. `prompt_schema_matches_decoder` in the
//! tests below fails when the two drift apart.

use ticketcoach_schema::CoachingRecord;

pub const QA_SYSTEM_PROMPT: &str =
    "You are a careful, precise QA evaluator. Always return strictly valid JSON as requested.";

pub const KB_SYSTEM_PROMPT: &str = "You are an excellent technical writer for support KB articles.";

pub const INSIGHTS_SYSTEM_PROMPT: &str = "You are a seasoned Director of Support Enablement.";

const TICKET_PLACEHOLDER: &str = "{ticket_text}";
const SUGGESTION_PLACEHOLDER: &str = "{kb_suggestion}";
const COACHING_PLACEHOLDER: &str = "{coaching_block}";

pub const QA_PROMPT_TEMPLATE: &str = r#"
You are a senior support QA coach.

You will be given the full text of a customer support ticket, including:
- subject
- customer messages
- agent replies
- any internal notes if present

Your job is to evaluate the AGENT'S performance only.

Evaluate the agent on the following 5 criteria, each scored from 1–5:
1. technical_accuracy – Did the agent provide factually correct and relevant information?
2. clarity_and_tone – Was the response clear, well-structured, and appropriately empathetic/professional?
3. diagnostic_depth – Did the agent ask good questions, check assumptions, and narrow down the root cause?
4. ownership_and_follow_through – Did the agent take ownership, set expectations, and move the case towards resolution?
5. escalation_judgment – Did the agent handle escalation appropriately (or explain when/why escalation was not needed)?

Every criterion needs an integer score between 1 and 5 and a short justification.

Then, analyze the ROOT CAUSE of any problems in this interaction.

You MUST choose one of:
- "agent_performance"
- "content_gap"
- "mixed"

Use these decision rules:

1) "agent_performance"
   Choose this when:
   - Appropriate documentation, playbooks, or prior cases clearly COULD have helped,
   - But the agent failed to use them, ignored clear signals, or behaved poorly.

2) "content_gap"
   Choose this when:
   - The main issue is that there is NO good documentation or playbook available,
   - And the agent is clearly struggling because the organization has not documented the scenario well.
   Strong signals for content_gap:
   - The customer asks explicitly for documentation or limits (e.g. API limits, SLAs, size caps),
     and the agent says there is nothing in the help center or KB.
   - The agent has to improvise or guess because there is no documented guidance.

   Example pattern (should be classified as content_gap, not pure agent_performance):
   - Customer: "Do you have any documented limits for CSV size or processing time?"
   - Agent: "I don't see anything in our help center about that. You may just need to try smaller batches."

3) "mixed"
   Choose this when:
   - There is clearly a documentation or content gap AND
   - The agent also misses obvious steps, ignores history, or mishandles tone/ownership.

Return STRICTLY valid JSON in this format:

{
  "criteria": {
    "technical_accuracy": {
      "score": <integer 1-5>,
      "justification": "<short explanation>"
    },
    "clarity_and_tone": {
      "score": <integer 1-5>,
      "justification": "<short explanation>"
    },
    "diagnostic_depth": {
      "score": <integer 1-5>,
      "justification": "<short explanation>"
    },
    "ownership_and_follow_through": {
      "score": <integer 1-5>,
      "justification": "<short explanation>"
    },
    "escalation_judgment": {
      "score": <integer 1-5>,
      "justification": "<short explanation>"
    }
  },
  "overall_rating": {
    "score": <integer 1-5>,
    "justification": "<2–3 sentences summarizing overall performance>"
  },
  "root_cause": {
    "label": "agent_performance" | "content_gap" | "mixed",
    "explanation": "<1–3 sentences explaining why>",
    "kb_article_suggestion": "<if content_gap or mixed, suggest a KB article title and outline; if agent_performance, this MUST be an empty string>"
  },
  "coaching_summary": "<3–6 bullet-style coaching points, in plain text>"
}

Ticket:
"""{ticket_text}"""
"#;

pub const KB_PROMPT_TEMPLATE: &str = r#"
You are a senior technical writer for a B2B SaaS support organization.

You are given:
- A support ticket transcript (including customer and agent messages)
- A suggested knowledge base article idea that would help prevent similar issues in the future

Write a **clear, structured KB article** that a support agent or customer could use for self-serve resolution.

Requirements:
- Neutral, professional tone.
- Sections:
  - Overview
  - Symptoms
  - Root cause (as far as can be inferred)
  - Step-by-step resolution
  - Verification steps
  - When to escalate

Return only the article text, formatted in Markdown (no JSON).

Suggested KB article idea:
"""{kb_suggestion}"""

Ticket:
"""{ticket_text}"""
"#;

pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"
You are a Director of Support Enablement presenting to a VP of Support and a CRO.

You will be given several ticket-level coaching summaries.

Your job is to synthesize them into a **single, team-wide coaching document**
that clearly ties coaching themes to business outcomes.

Focus on:
- Common agent weaknesses and anti-patterns
- Systematic behavior patterns across tickets
- Org-wide coaching themes
- Recommended best practices for all agents
- Training or playbook updates that would help
- Repeated signals of documentation or content gaps

For each theme, explicitly connect to metrics such as:
- case deflection / self-serve rate
- first-contact resolution (FCR)
- time to resolution
- escalations avoided (Tier-2 / Engineering)
- churn / renewal risk
- compliance / audit risk for regulated customers

Return a concise, actionable document in Markdown.

Coaching items:
{coaching_block}
"#;

pub fn build_qa_prompt(ticket_text: &str) -> String {
    QA_PROMPT_TEMPLATE.replace(TICKET_PLACEHOLDER, ticket_text)
}

pub fn build_kb_prompt(ticket_text: &str, kb_suggestion: &str) -> String {
    // The suggestion slot precedes the ticket slot, so after the ticket is
    // substituted the first suggestion placeholder is still the template's.
    KB_PROMPT_TEMPLATE
        .replace(TICKET_PLACEHOLDER, ticket_text)
        .replacen(SUGGESTION_PLACEHOLDER, kb_suggestion, 1)
}

pub fn build_insights_prompt(records: &[CoachingRecord]) -> String {
    INSIGHTS_PROMPT_TEMPLATE.replace(COACHING_PLACEHOLDER, &format_coaching_items(records))
}

/// Evidence block for the insights prompt, one bullet group per record.
pub fn format_coaching_items(records: &[CoachingRecord]) -> String {
    records
        .iter()
        .map(|item| {
            format!(
                "- Ticket: {}\n  - Root cause: {}\n  - Overall score: {}\n  - Coaching summary:\n    {}\n",
                item.label,
                item.root_cause,
                item.overall_score,
                item.coaching_summary.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
