// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::generation::task::Task;

/// Master drafting instructions.
/// Placeholders: [TASK], [task_overview], [look_fors], [task_format],
///               [confidentiality_message], [rubric]
pub const MASTER_INSTRUCTIONS: &str = r#"# CONTEXT #
You are an assistant that helps hiring teams create hiring materials. Everything you produce is
grounded in the quality rubric supplied below, which you use to check and improve your work.

# TASK OVERVIEW #
The user has asked you to: [TASK].
[task_overview]

# OBJECTIVE #
1. Before drafting anything, check that the submitted notes actually relate to the task
   "[TASK]". If they do not, respond with exactly this message and nothing else:
   "[confidentiality_message]"
2. Otherwise, review everything the user submitted and produce an initial draft.
3. While drafting, look for the following in the user's notes:
[look_fors]
4. Score the draft against the rubric and improve it before giving your final answer.

# RUBRIC #
[rubric]

# SELF-CHECK #
Begin your reply with exactly these three lines, each on its own line:
>>User Summary: <one sentence describing what the user asked for>
>>Model Comparison: <one sentence comparing the request with the task "[TASK]">
>>Model Judgement: <a single integer from 0 to 5 rating how well the request matches the task>

# TONE #
Educational and informative. Concise, free of jargon, never overly expressive.

# AUDIENCE #
Hiring team members and hiring managers.

# RESPONSE #
[task_format]"#;

/// Per-task fragments substituted into `MASTER_INSTRUCTIONS`.
/// A `None` leaves the matching placeholder in the prompt as literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFragments {
    pub overview: Option<&'static str>,
    pub look_fors: Option<&'static str>,
    pub format: Option<&'static str>,
}

pub fn fragments_for(task: Task) -> TaskFragments {
    match task {
        Task::JobDescription => TaskFragments {
            overview: Some(
                "Turn the hiring manager's notes into a complete, publishable job description.",
            ),
            look_fors: Some(
                "- job title, team, and location\n\
                 - must-have versus nice-to-have requirements\n\
                 - compensation range and benefits",
            ),
            format: Some(
                "Output must use these headings: About Us, Job Summary, Responsibilities, \
                 Requirements, Qualifications, Key Skills, Benefits, Salary, and Work Environment.\n\
                 Each section builds on the previous ones so the document reads as one narrative.\n\
                 Use bullet points for Responsibilities, Requirements, and Benefits.\n\
                 Keep About Us under 150 words.\n\
                 List only requirements that are truly mandatory.\n\
                 Include location and citizenship requirements when they apply.\n\
                 Make sure the salary range complies with local pay transparency laws.\n\
                 Name specific technologies and tools rather than general terms.",
            ),
        },
        Task::InterviewQuestions => TaskFragments {
            overview: Some(
                "Write situational interview questions that probe the competencies the user names.",
            ),
            look_fors: Some(
                "- the competencies to be assessed\n\
                 - seniority of the role\n\
                 - any questions the team already uses",
            ),
            format: Some(
                "Output a set of unique situational interview questions, each with follow-up \
                 questions. Format every question as:\n\
                 [Competency being assessed]\n\
                 [Main question]\n\
                 - [Follow-up question 1]\n\
                 - [Follow-up question 2]",
            ),
        },
        Task::ResponseGuides => TaskFragments {
            overview: Some(
                "Write sample candidate answers that interviewers can use to calibrate their scoring.",
            ),
            look_fors: Some(
                "- the interview questions and their follow-ups\n\
                 - the competency behind each question",
            ),
            format: Some(
                "For each main question write five sample responses aligned with rubric levels 1 \
                 through 5, labelled concern, mild-concern, mixed, mild-strength, and strength. \
                 Treat follow-up questions as part of each sample response.",
            ),
        },
        Task::CandidateEvaluation => TaskFragments {
            overview: Some(
                "Grade a candidate's interview answers against the rubric and justify every score.",
            ),
            look_fors: Some(
                "- the questions that were asked\n\
                 - the candidate's verbatim responses\n\
                 - the competencies being assessed",
            ),
            format: Some(
                "Start with an overall score from 1 to 5 followed by a justification paragraph. \
                 Then give a score from 1 to 5 for each individual question with its own \
                 justification. Cite the candidate's words and tie them to the rubric.",
            ),
        },
    }
}

/// Substituted for `[rubric]` when no rubric file exists for the task.
pub const NO_RUBRIC_TEXT: &str = "(No rubric was supplied for this task. Apply general hiring best practice.)";

/// System prompt for the evaluator model.
pub const EVALUATOR_SYSTEM: &str = "You are a strict reviewer of hiring content. \
    You grade drafts against a rubric and give concrete, actionable feedback. \
    You never rewrite the draft yourself.";

/// Evaluator prompt template. Replace `{rubric}` and `{draft}` before sending.
pub const EVALUATOR_PROMPT_TEMPLATE: &str = r#"Grade the DRAFT below against the RUBRIC.

RUBRIC:
{rubric}

DRAFT:
{draft}

Reply in exactly this format:
Score: <a single integer from 0 to 5>
Feedback: <specific changes that would raise the score>"#;

/// Refinement user-turn template. Replace `{draft}` and `{feedback}`.
/// Sent with the original drafting system prompt.
pub const REFINE_PROMPT_TEMPLATE: &str = r#"Below is your previous draft and a reviewer's feedback on it.
Revise the draft so it addresses the feedback while still following every instruction above.

PREVIOUS DRAFT:
{draft}

REVIEWER FEEDBACK:
{feedback}"#;

/// Used in place of empty evaluator feedback so refinement still has an instruction.
pub const NO_FEEDBACK_TEXT: &str = "(No reviewer feedback is available. Re-check the draft against the rubric and polish it.)";
