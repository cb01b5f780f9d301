// Prompt templates for the two inference calls. Both force a bare JSON object;
// the client additionally requests `format: "json"` from the server.

/// Analysis prompt template. Replace `{resume}` and `{jd}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"
Analyze this RESUME against the JOB DESCRIPTION.
Output ONLY a strictly valid JSON object. Do not include any text before or after the JSON.

RESUME:
{resume}

JOB DESCRIPTION:
{jd}

JSON SCHEMA:
{
  "overallScore": number (0-100),
  "skillsMatch": number (0-100),
  "experienceRelevance": number (0-100),
  "keywordMatch": number (0-100),
  "educationAlignment": number (0-100),
  "missingSkills": ["skill1", "skill2"],
  "suggestions": ["tip1", "tip2"],
  "summary": "Short professional overview"
}
"#;

/// Optimization prompt template (STAR-method bullets). Replace `{resume}` and `{jd}`.
pub const OPTIMIZATION_PROMPT_TEMPLATE: &str = r#"
Optimize this RESUME for the JOB DESCRIPTION using the STAR method.
Output ONLY a strictly valid JSON object.

RESUME:
{resume}

JOB DESCRIPTION:
{jd}

JSON SCHEMA:
{
  "header": "Name and Contact",
  "summary": "Tailored summary",
  "experience": ["STAR bullet 1", "STAR bullet 2"],
  "skills": ["Skill 1", "Skill 2"]
}
"#;

pub fn analysis_prompt(resume: &str, jd: &str) -> String {
    fill(ANALYSIS_PROMPT_TEMPLATE, resume, jd)
}

pub fn optimization_prompt(resume: &str, jd: &str) -> String {
    fill(OPTIMIZATION_PROMPT_TEMPLATE, resume, jd)
}

// Inputs are never rescanned, so placeholder text inside a résumé or JD survives verbatim.
fn fill(template: &str, resume: &str, jd: &str) -> String {
    let (head, tail) = template
        .split_once("{resume}")
        .unwrap_or((template, ""));
    format!("{}{}{}", head, resume, tail.replace("{jd}", jd))
}
