//! Centralized prompt definitions for the facilitator stages
//!
//! Each stage embeds the user's problem and context into one of these
//! templates and asks the model for a JSON-only reply.

use crate::stages::{Answer, FinalSolution, FrameworkSuggestion};

/// Closing instruction shared by every prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single valid JSON value. Do not include any text, comments, or markdown formatting outside of the JSON.";

/// Shape of the suggestions reply.
pub const SUGGESTIONS_FORMAT: &str = r#"{
  "problemAnalysis": "2-4 sentences restating the real problem behind the symptoms",
  "strategicGoals": ["3 to 4 high-level, measurable strategic goals"],
  "recommendedFrameworks": [
    {
      "id": "root-cause-analysis",
      "name": "Root Cause Analysis",
      "type": "Analysis",
      "description": "One sentence on why this framework fits the problem"
    }
  ]
}"#;

/// Shape of the guidance reply.
pub const GUIDANCE_FORMAT: &str = r#"{
  "title": "Applying <framework>",
  "description": "1-2 sentences on how the framework helps with this problem",
  "keyQuestions": ["3 to 5 critical questions the analyst must answer"],
  "actionSteps": ["3 to 5 practical, sequential steps"],
  "expectedOutcome": "What success looks like after applying the framework"
}"#;

/// Shape of the Five Whys guidance reply.
pub const FIVE_WHYS_FORMAT: &str = r#"{
  "title": "Applying the Five Whys",
  "description": "1-2 sentences on the symptom being traced",
  "keyQuestions": [
    "Why does <symptom> happen?",
    "Why does <cause 1> happen?",
    "Why does <cause 2> happen?",
    "Why does <cause 3> happen?",
    "Why does <cause 4> happen?"
  ],
  "actionSteps": ["How to validate each answer with evidence"],
  "expectedOutcome": "The root cause, stated so it can be acted on"
}"#;

/// Shape of the final solution reply.
pub const SOLUTION_FORMAT: &str = r#"{
  "title": "Title of the plan",
  "summary": "2-3 sentence executive summary",
  "recommendations": [
    {"title": "Recommendation title", "details": "Specific, actionable implementation details"}
  ]
}"#;

/// Shape of the complexity reply.
pub const COMPLEXITY_FORMAT: &str = r#"{
  "causeAmbiguity": {"score": 1, "reasoning": "How clear the root cause is (1 = obvious, 5 = unclear)"},
  "interconnections": {"score": 1, "reasoning": "How many teams and processes are involved (1 = isolated, 5 = systemic)"},
  "businessImpact": {"score": 1, "reasoning": "How much the problem costs the business (1 = minor, 5 = critical)"},
  "strategicRecommendations": ["2 to 4 recommendations on how to organize the response"]
}"#;

/// Shape of the suggested solutions reply.
pub const SUGGESTED_SOLUTIONS_FORMAT: &str = r#"[
  {
    "solutionTitle": "Short title",
    "solutionDescription": "2-3 sentences describing an alternative or complementary solution",
    "kpi": {"metric": "What to measure", "target": "Target value and deadline"},
    "alert": {"risk": "Main risk", "mitigation": "How to mitigate it"},
    "quote": {"text": "A relevant quote", "author": "Its author"}
  }
]"#;

/// Prompt for the initial framework suggestions.
pub fn suggestions_prompt(problem: &str, context: &str) -> String {
    format!(
        r#"Problem: "{problem}"
Context: "{context}"

You are an expert business strategist. Analyse the problem in its context and recommend investigative frameworks.
The "recommendedFrameworks" array must contain between 6 and 8 frameworks; "type" is one of Analysis, Strategy, Implementation, Evaluation.
The "strategicGoals" array must contain 3 to 4 points.

Format:
{SUGGESTIONS_FORMAT}

{JSON_ONLY_INSTRUCTION}"#
    )
}

/// Prompt for guidance on one framework. Five Whys gets its own template.
pub fn guidance_prompt(problem: &str, context: &str, framework: &FrameworkSuggestion) -> String {
    if is_five_whys(&framework.name) {
        return format!(
            r#"Problem: "{problem}"
Context: "{context}"
Selected Framework: "Five Whys"

You are an expert in root cause analysis. Build a Five Whys chain for this problem.
"keyQuestions" must contain exactly five questions. The first asks why the stated symptom occurs; each following question asks why the likely answer to the previous one occurs, drilling one level deeper each time.

Format:
{FIVE_WHYS_FORMAT}

{JSON_ONLY_INSTRUCTION}"#
        );
    }

    format!(
        r#"Problem: "{problem}"
Context: "{context}"
Selected Framework: "{name}" ({kind})
Framework summary: {description}

You are an expert business strategist. Provide a detailed, actionable guide on how to apply the selected framework to this problem and context.

Format:
{GUIDANCE_FORMAT}

{JSON_ONLY_INSTRUCTION}"#,
        name = framework.name,
        kind = framework.framework_type,
        description = framework.description,
    )
}

/// Prompt for the final plan, given the answered questions.
pub fn solution_prompt(problem: &str, context: &str, framework: &str, answers: &[Answer]) -> String {
    let qa = answers
        .iter()
        .map(|a| format!("Question: {}\nAnswer: {}", a.question, a.answer))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a senior business consultant. You have guided an analyst through a problem-solving process; now produce a concrete plan.

Initial Problem:
{problem}

Business Context:
{context}

Framework Applied:
{framework}

Analyst's Answers to Key Framework Questions:
{qa}

---

The plan must be practical, specific and address the analyst's answers directly. Give 2 to 4 recommendations.

Format:
{SOLUTION_FORMAT}

{JSON_ONLY_INSTRUCTION}"#
    )
}

/// Prompt scoring the complexity of a five-whys transcript.
pub fn complexity_prompt(analysis: &str) -> String {
    format!(
        r#"You are assessing how complex a business problem is, based on a Five Whys analysis.

Analysis:
{analysis}

Rate each dimension with an integer from 1 to 5 and explain the rating in one or two sentences.

Format:
{COMPLEXITY_FORMAT}

{JSON_ONLY_INSTRUCTION}"#
    )
}

/// Prompt asking for alternative solutions to an accepted plan.
pub fn suggested_solutions_prompt(problem: &str, context: &str, solution: &FinalSolution) -> String {
    let recommendations = solution
        .recommendations
        .iter()
        .map(|r| format!("- {}: {}", r.title, r.details))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Problem: "{problem}"
Context: "{context}"

Current plan: {title}
{summary}
{recommendations}

Propose 3 alternative or complementary solutions the team has not considered yet. Each one needs a KPI, a risk alert with mitigation, and a short motivating quote.

Format:
{SUGGESTED_SOLUTIONS_FORMAT}

{JSON_ONLY_INSTRUCTION}"#,
        title = solution.title,
        summary = solution.summary,
    )
}

/// Whether a framework name refers to the Five Whys technique.
pub fn is_five_whys(name: &str) -> bool {
    let normalized: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    matches!(
        normalized.as_str(),
        "5whys" | "fivewhys" | "5whysanalysis" | "fivewhysanalysis"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{FrameworkType, Recommendation};

    fn framework(name: &str) -> FrameworkSuggestion {
        FrameworkSuggestion {
            id: "f".to_string(),
            name: name.to_string(),
            framework_type: FrameworkType::Analysis,
            description: "desc".to_string(),
        }
    }

    #[test]
    fn test_suggestions_prompt_embeds_inputs() {
        let prompt = suggestions_prompt("High churn", "B2B SaaS, 5 people");
        assert!(prompt.contains("Problem: \"High churn\""));
        assert!(prompt.contains("Context: \"B2B SaaS, 5 people\""));
        assert!(prompt.contains("recommendedFrameworks"));
        assert!(prompt.ends_with(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_five_whys_detection() {
        assert!(is_five_whys("5 Whys"));
        assert!(is_five_whys("Five Whys"));
        assert!(is_five_whys("five-whys analysis"));
        assert!(!is_five_whys("SWOT Analysis"));
        assert!(!is_five_whys("Whys"));
    }

    #[test]
    fn test_guidance_prompt_branches_on_five_whys() {
        let five = guidance_prompt("p", "c", &framework("5 Whys"));
        assert!(five.contains("exactly five questions"));

        let swot = guidance_prompt("p", "c", &framework("SWOT Analysis"));
        assert!(swot.contains("Selected Framework: \"SWOT Analysis\" (Analysis)"));
        assert!(!swot.contains("exactly five questions"));
    }

    #[test]
    fn test_solution_prompt_lists_answers() {
        let answers = vec![
            Answer {
                question: "Who churns?".to_string(),
                answer: "Trial users".to_string(),
            },
            Answer {
                question: "When?".to_string(),
                answer: "Week 2".to_string(),
            },
        ];
        let prompt = solution_prompt("p", "c", "RCA", &answers);
        assert!(prompt
            .contains("Question: Who churns?\nAnswer: Trial users\n\nQuestion: When?\nAnswer: Week 2"));
    }

    #[test]
    fn test_suggested_solutions_prompt_includes_plan() {
        let solution = FinalSolution {
            title: "Plan".to_string(),
            summary: "Summary".to_string(),
            recommendations: vec![Recommendation {
                title: "Checklist".to_string(),
                details: "Add one".to_string(),
            }],
        };
        let prompt = suggested_solutions_prompt("p", "c", &solution);
        assert!(prompt.contains("Current plan: Plan"));
        assert!(prompt.contains("- Checklist: Add one"));
    }
}
