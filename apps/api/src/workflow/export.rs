use crate::models::resume::OptimizedResume;

pub const EXPORT_FILE_NAME: &str = "ATS_Optimized_Resume.txt";

/// Renders the downloadable plain-text résumé.
pub fn render_export(resume: &OptimizedResume) -> String {
    format!(
        "{}\n\nSUMMARY\n{}\n\nSKILLS\n{}\n\nEXPERIENCE\n{}",
        resume.header,
        resume.summary,
        resume.skills.join(", "),
        resume.experience.join("\n")
    )
}
