use serde::{Deserialize, Serialize};

/// The target role as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    pub title: String,
    pub description: String,
}

/// Structured assessment returned by the analysis prompt.
///
/// Scores are stored exactly as the model returned them. The model is asked for
/// 0–100 but nothing here clamps or recomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: f64,
    pub skills_match: f64,
    pub experience_relevance: f64,
    pub keyword_match: f64,
    pub education_alignment: f64,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
    pub summary: String,
}

/// Rewritten résumé content returned by the optimization prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedResume {
    pub header: String,
    pub summary: String,
    pub experience: Vec<String>,
    pub skills: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_result_deserializes_camel_case() {
        let json = r#"{
            "overallScore": 78,
            "skillsMatch": 81.5,
            "experienceRelevance": 70,
            "keywordMatch": 64,
            "educationAlignment": 90,
            "missingSkills": ["Kubernetes"],
            "suggestions": ["Quantify the migration project"],
            "summary": "Strong backend profile."
        }"#;

        let parsed: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.overall_score, 78.0);
        assert_eq!(parsed.skills_match, 81.5);
        assert_eq!(parsed.missing_skills, vec!["Kubernetes".to_string()]);
        assert_eq!(parsed.summary, "Strong backend profile.");
    }

    #[test]
    fn test_out_of_range_scores_are_not_clamped() {
        let json = r#"{
            "overallScore": 140,
            "skillsMatch": -5,
            "experienceRelevance": 0,
            "keywordMatch": 0,
            "educationAlignment": 0,
            "missingSkills": [],
            "suggestions": [],
            "summary": ""
        }"#;

        let parsed: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.overall_score, 140.0);
        assert_eq!(parsed.skills_match, -5.0);
    }

    #[test]
    fn test_optimized_resume_missing_field_fails() {
        let json = r#"{"header": "Jane Doe", "summary": "S", "experience": []}"#;
        assert!(serde_json::from_str::<OptimizedResume>(json).is_err());
    }
}
