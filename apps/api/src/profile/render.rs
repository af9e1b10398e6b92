use crate::profile::models::{join_skills, Profile};

/// Renders a profile as a markdown document: personal info, summary, experience,
/// education and comma-joined skills. Empty sections are skipped.
pub fn render_profile_to_md(profile: &Profile) -> String {
    let info = &profile.personal_info;
    let heading = if info.name.is_empty() { "Resume" } else { info.name.as_str() };
    let mut md = format!("# {heading}\n\n");

    for (label, value) in [
        ("Email", &info.email),
        ("Phone", &info.phone),
        ("Location", &info.location),
        ("LinkedIn", &info.linkedin),
    ] {
        if !value.is_empty() {
            md.push_str(&format!("- **{label}:** {value}\n"));
        }
    }
    md.push('\n');

    if !profile.summary.is_empty() {
        md.push_str("## Professional Summary\n\n");
        md.push_str(&profile.summary);
        md.push_str("\n\n");
    }

    if !profile.experience.is_empty() {
        md.push_str("## Work Experience\n\n");
        for exp in &profile.experience {
            md.push_str(&format!(
                "### {} at {} ({})\n\n",
                exp.title, exp.company, exp.duration
            ));
            if !exp.description.is_empty() {
                md.push_str(&exp.description);
                md.push_str("\n\n");
            }
        }
    }

    if !profile.education.is_empty() {
        md.push_str("## Education\n\n");
        for edu in &profile.education {
            md.push_str(&format!("- **{}**, {} - {}\n", edu.degree, edu.school, edu.year));
        }
        md.push('\n');
    }

    if !profile.skills.is_empty() {
        md.push_str("## Skills\n\n");
        md.push_str(&join_skills(&profile.skills));
        md.push('\n');
    }

    md
}
