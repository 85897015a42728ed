//! Trial Suitability Evaluation
//!
//! Builds the evaluation prompt that ranks clinical trials against a patient
//! profile and normalizes the completion's JSON into a stable response shape
//! (missing scores become 0, missing lists become empty).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const EVALUATION_TEMPERATURE: f64 = 0.7;
pub const EVALUATION_MAX_TOKENS: u32 = 2000;

/// Evaluation dimensions the completion scores
pub const EVALUATION_CATEGORIES: [&str; 4] = [
    "clinical_knowledge",
    "medical_reasoning",
    "patient_safety",
    "treatment_recommendations",
];

/// System prompt; the completion must be pure JSON
pub const SYSTEM_PROMPT: &str = "You are HealthBench, an AI system specialized in evaluating \
clinical trial suitability. You must respond with valid JSON only, no additional text or \
formatting.";

/// User prompt pairing the patient profile with the candidate trials
pub fn evaluation_prompt(user_profile: &Value, trials: &[Value]) -> String {
    let profile = profile_for_evaluation(user_profile);
    let trials = trials_for_evaluation(trials);

    format!(
        "You are HealthBench, an AI system specialized in evaluating clinical trial suitability \
         for patients. Analyze the following patient profile and clinical trials to provide \
         personalized recommendations.\n\
         \n\
         Patient Profile:\n\
         {}\n\
         \n\
         Available Trials:\n\
         {}\n\
         \n\
         Provide a detailed evaluation in the following JSON format:\n\
         {{\n\
           \"overall_score\": number (0-10),\n\
           \"summary\": \"string\",\n\
           \"recommended_trials\": [\n\
             {{\n\
               \"trial_id\": \"string\",\n\
               \"match_score\": number (0-10),\n\
               \"match_reason\": \"string\"\n\
             }}\n\
           ],\n\
           \"evaluations\": {{\n\
             \"clinical_knowledge\": {{ \"score\": number (0-10), \"feedback\": [\"string\"], \"recommendations\": [\"string\"] }},\n\
             \"medical_reasoning\": {{ \"score\": number (0-10), \"feedback\": [\"string\"], \"recommendations\": [\"string\"] }},\n\
             \"patient_safety\": {{ \"score\": number (0-10), \"feedback\": [\"string\"], \"recommendations\": [\"string\"] }},\n\
             \"treatment_recommendations\": {{ \"score\": number (0-10), \"feedback\": [\"string\"], \"recommendations\": [\"string\"] }}\n\
           }}\n\
         }}\n\
         \n\
         IMPORTANT: Respond with valid JSON only. No additional text or formatting.",
        serde_json::to_string_pretty(&profile).unwrap_or_default(),
        serde_json::to_string_pretty(&trials).unwrap_or_default(),
    )
}

fn profile_for_evaluation(profile: &Value) -> Value {
    json!({
        "condition": profile.get("condition"),
        "age": profile.get("age"),
        "gender": profile.get("gender"),
        "medical_history": profile.get("medicalHistory"),
        "current_medications": profile.get("currentMedications"),
        "location": profile.get("location"),
        "preferences": profile.get("preferences"),
    })
}

fn trials_for_evaluation(trials: &[Value]) -> Value {
    Value::Array(
        trials
            .iter()
            .map(|trial| {
                json!({
                    "trial_id": trial.get("NCTId"),
                    "title": trial.get("BriefTitle"),
                    "condition": trial.get("Condition"),
                    "summary": trial.get("BriefSummary"),
                    "status": trial.get("OverallStatus"),
                    "phase": trial.get("Phase"),
                    "eligibility": trial.get("EligibilityCriteria"),
                })
            })
            .collect(),
    )
}

/// Score + guidance for one evaluation category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub feedback: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// One recommended trial with its match score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendedTrial {
    #[serde(default)]
    pub trial_id: String,
    #[serde(default)]
    pub match_score: f64,
    #[serde(default)]
    pub match_reason: String,
}

/// Per-category evaluations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluations {
    #[serde(default)]
    pub clinical_knowledge: Evaluation,
    #[serde(default)]
    pub medical_reasoning: Evaluation,
    #[serde(default)]
    pub patient_safety: Evaluation,
    #[serde(default)]
    pub treatment_recommendations: Evaluation,
}

/// Normalized evaluation returned to the front end
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub overall_score: f64,
    pub summary: String,
    pub recommended_trials: Vec<RecommendedTrial>,
    pub evaluations: Evaluations,
    pub last_updated: String,
}

/// Fill gaps in the completion's JSON with defaults so the front end always
/// gets the full shape
pub fn normalize_report(raw: &Value, now: DateTime<Utc>) -> EvaluationReport {
    EvaluationReport {
        overall_score: raw.get("overall_score").and_then(Value::as_f64).unwrap_or(0.0),
        summary: raw
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        recommended_trials: raw
            .get("recommended_trials")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        evaluations: raw
            .get("evaluations")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        last_updated: now.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_prompt_reshapes_profile_and_trials() {
        let profile = json!({
            "condition": "asthma",
            "medicalHistory": ["allergies"],
            "currentMedications": ["albuterol"]
        });
        let trials = vec![json!({
            "NCTId": "NCT000", "BriefTitle": "Inhaler Study", "OverallStatus": "RECRUITING"
        })];

        let prompt = evaluation_prompt(&profile, &trials);
        assert!(prompt.contains("\"medical_history\""));
        assert!(prompt.contains("\"trial_id\": \"NCT000\""));
        assert!(prompt.contains("overall_score"));
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let raw = json!({
            "overall_score": 7.5,
            "recommended_trials": [
                { "trial_id": "NCT000", "match_score": 8 },
                { "trial_id": "NCT001" }
            ],
            "evaluations": {
                "patient_safety": { "score": 9, "feedback": ["good"] }
            }
        });

        let report = normalize_report(&raw, now);
        assert_eq!(report.overall_score, 7.5);
        assert_eq!(report.summary, "");
        assert_eq!(report.recommended_trials.len(), 2);
        assert_eq!(report.recommended_trials[1].match_score, 0.0);
        assert_eq!(report.recommended_trials[1].match_reason, "");
        assert_eq!(report.evaluations.patient_safety.score, 9.0);
        assert_eq!(report.evaluations.clinical_knowledge.score, 0.0);
        assert!(report.evaluations.medical_reasoning.feedback.is_empty());
        assert_eq!(report.last_updated, "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_normalize_tolerates_empty_payload() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let report = normalize_report(&json!({}), now);
        assert_eq!(report.overall_score, 0.0);
        assert!(report.recommended_trials.is_empty());
    }
}
