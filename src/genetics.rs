//! Genetic Analysis
//!
//! Prompt assembly and response handling for the AI-backed genetic-analysis
//! routes. The free-text analysis returns prose; the report variant demands
//! strict JSON from the completion and parses it.

use serde_json::Value;

use crate::upstream::SnpExtract;

pub const ANALYSIS_TEMPERATURE: f64 = 0.7;
pub const ANALYSIS_MAX_TOKENS: u32 = 1000;
pub const REPORT_MAX_TOKENS: u32 = 2000;

/// System prompt for the free-text analysis
pub const ANALYST_SYSTEM_PROMPT: &str = "You are a genetic analysis expert. Provide clear, \
concise, and scientifically accurate analysis of genetic data in relation to symptoms.";

/// System prompt for the structured report; the completion must be pure JSON
pub const REPORT_SYSTEM_PROMPT: &str = "You are a medical AI assistant specializing in genetic \
analysis and symptom interpretation. You must respond with valid JSON only, no additional text \
or formatting. Double-check your response is valid JSON before sending.";

/// User prompt for the free-text analysis
pub fn analysis_prompt(symptoms: &[String], genetic_data: &Value) -> String {
    format!(
        "Analyze the following genetic data in relation to the reported symptoms:\n\
         \n\
         Symptoms: {}\n\
         \n\
         Genetic Data:\n\
         {}\n\
         \n\
         Please provide:\n\
         1. A brief analysis of potential genetic correlations\n\
         2. Key genetic markers that might be relevant\n\
         3. Suggested areas for further investigation\n\
         4. Any notable patterns or connections",
        symptoms.join(", "),
        serde_json::to_string_pretty(genetic_data).unwrap_or_default(),
    )
}

/// User prompt for the structured report, with optional family history and
/// SNPedia context
pub fn report_prompt(
    symptoms: &str,
    family_history: Option<&str>,
    snp_extracts: &[SnpExtract],
) -> String {
    let mut prompt = format!(
        "You are a medical AI assistant specializing in genetic analysis. Analyze the following \
         information and provide a detailed genetic analysis in strict JSON format.\n\
         \n\
         Symptoms: {symptoms}\n"
    );

    if let Some(history) = family_history.filter(|h| !h.trim().is_empty()) {
        prompt.push_str(&format!("Family History: {history}\n"));
    }

    if !snp_extracts.is_empty() {
        let context = serde_json::to_string(snp_extracts).unwrap_or_default();
        prompt.push_str(&format!("SNPedia Data: {context}\n"));
    }

    prompt.push_str(
        "\nIMPORTANT: Your response must be a valid JSON object with no additional text, \
         markdown, or formatting. The response must start with { and end with }.\n\
         \n\
         Required JSON structure:\n\
         {\n\
           \"possibleDiagnoses\": [\n\
             {\n\
               \"condition\": \"string\",\n\
               \"confidence\": \"High|Medium|Low\",\n\
               \"description\": \"string\",\n\
               \"symptoms\": [\"string\"],\n\
               \"recommendations\": [\"string\"],\n\
               \"clinicalTrials\": [\n\
                 {\n\
                   \"id\": \"string\",\n\
                   \"title\": \"string\",\n\
                   \"status\": \"string\",\n\
                   \"link\": \"string\"\n\
                 }\n\
               ]\n\
             }\n\
           ],\n\
           \"genes\": [\n\
             {\n\
               \"name\": \"string\",\n\
               \"relevance\": \"High|Medium|Low\",\n\
               \"description\": \"string\",\n\
               \"associatedSNPs\": [\"string\"],\n\
               \"familyHistoryRelevance\": \"string\"\n\
             }\n\
           ],\n\
           \"snps\": [\n\
             {\n\
               \"id\": \"string\",\n\
               \"gene\": \"string\",\n\
               \"description\": \"string\",\n\
               \"clinicalSignificance\": \"string\",\n\
               \"populationFrequency\": \"string\"\n\
             }\n\
           ],\n\
           \"familyHistoryAnalysis\": {\n\
             \"riskFactors\": [\"string\"],\n\
             \"preventiveMeasures\": [\"string\"],\n\
             \"screeningRecommendations\": [\"string\"]\n\
           }\n\
         }",
    );

    prompt
}

/// Parse the completion's report JSON
pub fn parse_report(content: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(content.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analysis_prompt_contents() {
        let prompt = analysis_prompt(
            &["headache".to_string(), "fatigue".to_string()],
            &json!({"rs53576": "AA"}),
        );
        assert!(prompt.contains("Symptoms: headache, fatigue"));
        assert!(prompt.contains("rs53576"));
        assert!(prompt.contains("Key genetic markers"));
    }

    #[test]
    fn test_report_prompt_optional_sections() {
        let bare = report_prompt("fatigue", None, &[]);
        assert!(!bare.contains("Family History:"));
        assert!(!bare.contains("SNPedia Data:"));
        assert!(bare.contains("possibleDiagnoses"));

        let extracts = vec![SnpExtract {
            snp: "rs53576".to_string(),
            extract: Some("oxytocin receptor".to_string()),
        }];
        let full = report_prompt("fatigue", Some("diabetes"), &extracts);
        assert!(full.contains("Family History: diabetes"));
        assert!(full.contains("rs53576"));
    }

    #[test]
    fn test_parse_report() {
        assert!(parse_report(r#"{"possibleDiagnoses": []}"#).is_ok());
        assert!(parse_report("Sure! Here's the JSON: {}").is_err());
    }
}
