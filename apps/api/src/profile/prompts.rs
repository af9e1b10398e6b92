// Prompt templates for profile parsing and experience retargeting.

/// System prompt for resume parsing. Joined with the shared JSON/untrusted-input fragments.
pub const PARSE_SYSTEM: &str = "\
You are a resume parser. Extract structured information from resume text and return it \
in JSON format. Be accurate and keep the original wording of every field.";

/// Resume parsing prompt. Replace `{resume_block}` before sending.
pub const PARSE_PROMPT_TEMPLATE: &str = r#"Parse the resume below and extract:
1. Personal information (name, email, phone, location, linkedin)
2. Professional summary
3. Work experience (title, company, duration, description), in the order listed
4. Education (degree, school, year)
5. Skills

{resume_block}

Return ONLY a JSON object with EXACTLY this structure:
{
  "personalInfo": {
    "name": "Full Name",
    "email": "email@example.com",
    "phone": "phone number",
    "location": "city, state",
    "linkedin": "linkedin url"
  },
  "summary": "professional summary",
  "experience": [
    {
      "title": "job title",
      "company": "company name",
      "duration": "duration",
      "description": "job description"
    }
  ],
  "education": [
    {
      "degree": "degree name",
      "school": "school name",
      "year": "graduation year"
    }
  ],
  "skills": ["skill1", "skill2", "skill3"]
}

RULES:
1. Use an empty string for any field the resume does not state. Never omit a key.
2. Keep experience and education in the order they appear in the resume.
3. Copy values; do not summarise, embellish or invent."#;

/// System prompt for experience retargeting.
pub const RETARGET_SYSTEM: &str = "\
You are a professional resume writer. Your task is to rewrite work experience \
descriptions so they better match a specific job description while staying truthful \
to the original experience.";

/// Retargeting prompt. Replace `{job_block}`, `{experience_json}` and `{count}`.
pub const RETARGET_PROMPT_TEMPLATE: &str = r#"Rewrite the work experience below so each description is more relevant to the target job.

TARGET JOB:
{job_block}

CURRENT WORK EXPERIENCE ({count} entries, JSON):
{experience_json}

Return ONLY a JSON array with exactly {count} objects, in the same order, each shaped:
{"title": "...", "company": "...", "duration": "...", "description": "..."}

HARD RULES:
1. "title", "company" and "duration" are IMMUTABLE: copy them character for character.
2. Only "description" may change. Make it targeted to the job requirements.
3. Do not add, remove, merge or reorder entries.
4. Stay truthful: do not invent employers, technologies or achievements."#;
