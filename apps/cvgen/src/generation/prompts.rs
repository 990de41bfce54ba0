// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System instruction for résumé generation. `call_json` adds the JSON-only rules.
pub const RESUME_SYSTEM: &str = "You are a professional CV writer and ATS optimization expert.";

/// Résumé generation prompt template.
/// Replace: {plausibility_instruction}, {source_section}, {job_description}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"Analyze the following job description and extract:
1. Key skills required
2. Required years of experience
3. Recommended keywords for ATS optimization
4. A brief summary of the job
5. Industry context

Then generate a CV that matches the job description.

{plausibility_instruction}

{source_section}

Return a JSON object with this EXACT schema:
{
  "name": "Full Name",
  "title": "Professional Title",
  "email": "email@example.com",
  "location": "City, Country",
  "remoteWork": true,
  "age": "26 years old",
  "phone": "Phone Number",
  "github": "https://github.com/username",
  "linkedin": "https://linkedin.com/in/username",
  "summary": "Professional summary. Separate paragraphs with newlines.",
  "experience": [
    {
      "title": "Job Title",
      "company": "Company Name",
      "location": "City, Country",
      "startMonthYear": "10/2020",
      "endMonthYear": "03/2024",
      "description": ["Achievement 1", "Achievement 2"],
      "technologies": "Comma-separated technologies used"
    }
  ],
  "education": [
    {
      "degree": "Degree Name",
      "institution": "Institution Name",
      "location": "City, Country",
      "startMonthYear": "10/2016",
      "endMonthYear": "06/2020",
      "details": ["Detail 1", "Detail 2"]
    }
  ],
  "jobDescriptionSummary": "Two-sentence summary of the role",
  "atsScore": 85,
  "requiredYearsExperience": 5,
  "recommendedKeywords": ["keyword1", "keyword2"]
}

atsScore is how well the generated CV matches the job description, from 0 to 100.

JOB DESCRIPTION:
{job_description}"#;

/// Inserted into the résumé prompt when the user uploaded an existing CV.
/// Replace: {pdf_text}
pub const EXISTING_CV_SECTION: &str = r#"The candidate's existing CV is below. Keep their real name, contact details, employers, institutions and dates. Rewrite and reorder content to fit the job, but do NOT invent employers or degrees.

EXISTING CV:
{pdf_text}"#;

/// Used instead of `EXISTING_CV_SECTION` when no CV was uploaded.
pub const NO_EXISTING_CV_SECTION: &str =
    "No existing CV was provided. Generate a realistic example candidate for this role.";

/// System instruction for cover-letter generation.
pub const COVER_LETTER_SYSTEM: &str = "You are a professional cover letter writer.";

/// Cover-letter prompt template.
/// Replace: {plausibility_instruction}, {cv_json}, {job_description}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a cover letter for the candidate below, applying to the job described.

{plausibility_instruction}

CANDIDATE CV (JSON):
{cv_json}

Return a JSON object with this EXACT schema:
{
  "name": "Candidate Full Name",
  "title": "Professional Title",
  "email": "email@example.com",
  "location": "City, Country",
  "phone": "Phone Number",
  "recipient": "Hiring Manager",
  "company": "Company Name",
  "coverLetter": {
    "introduction": "Opening paragraph",
    "body": "Main paragraphs, separated by newlines",
    "closing": "Closing paragraph"
  }
}

JOB DESCRIPTION:
{job_description}"#;
