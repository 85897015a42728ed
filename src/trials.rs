//! Trial Record Reshaping
//!
//! Projects ClinicalTrials.gov v2 study JSON into the flat shapes the front
//! end renders. Field names mirror the legacy ClinicalTrials.gov field list
//! the UI already binds to.

use serde::Serialize;
use serde_json::Value;

/// Flat study summary returned by the search route
#[derive(Debug, Clone, Serialize)]
pub struct TrialSummary {
    #[serde(rename = "NCTId")]
    pub nct_id: String,
    #[serde(rename = "BriefTitle")]
    pub brief_title: Option<String>,
    #[serde(rename = "OverallStatus")]
    pub overall_status: Option<String>,
    #[serde(rename = "StartDate")]
    pub start_date: Option<String>,
    #[serde(rename = "CompletionDate")]
    pub completion_date: Option<String>,
    #[serde(rename = "BriefSummary")]
    pub brief_summary: Option<String>,
    #[serde(rename = "Condition")]
    pub condition: Option<String>,
    #[serde(rename = "StudyType")]
    pub study_type: Option<String>,
    #[serde(rename = "Phase")]
    pub phase: Option<String>,
    #[serde(rename = "EnrollmentCount")]
    pub enrollment_count: Option<u64>,
    #[serde(rename = "LocationFacility")]
    pub location_facility: Option<String>,
}

/// Full study detail returned by the trial-by-id route
#[derive(Debug, Clone, Serialize)]
pub struct TrialDetail {
    #[serde(flatten)]
    pub summary: TrialSummary,
    #[serde(rename = "EligibilityCriteria")]
    pub eligibility: EligibilityCriteria,
    #[serde(rename = "Locations")]
    pub locations: Vec<TrialLocation>,
    #[serde(rename = "ContactInfo")]
    pub contact_info: ContactInfo,
}

/// Eligibility criteria split into inclusion and exclusion lines
#[derive(Debug, Clone, Default, Serialize)]
pub struct EligibilityCriteria {
    pub inclusion: Vec<String>,
    pub exclusion: Vec<String>,
}

/// One study site
#[derive(Debug, Clone, Serialize)]
pub struct TrialLocation {
    pub facility: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Primary and backup central contacts
#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub primary: Contact,
    pub backup: Contact,
}

#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

const NOT_SPECIFIED: &str = "Not specified";

/// Summarize one study record; None when the study carries no NCT id
pub fn summarize_study(study: &Value) -> Option<TrialSummary> {
    let protocol = study.get("protocolSection")?;
    let nct_id = protocol
        .pointer("/identificationModule/nctId")?
        .as_str()?
        .to_string();

    Some(TrialSummary {
        nct_id,
        brief_title: str_at(protocol, "/identificationModule/briefTitle"),
        overall_status: str_at(protocol, "/statusModule/overallStatus"),
        start_date: str_at(protocol, "/statusModule/startDateStruct/date"),
        completion_date: str_at(protocol, "/statusModule/completionDateStruct/date"),
        brief_summary: str_at(protocol, "/descriptionModule/briefSummary"),
        condition: str_at(protocol, "/conditionsModule/conditions/0"),
        study_type: str_at(protocol, "/designModule/studyType"),
        phase: str_at(protocol, "/designModule/phases/0"),
        enrollment_count: protocol
            .pointer("/designModule/enrollmentInfo/count")
            .and_then(Value::as_u64),
        location_facility: str_at(protocol, "/contactsLocationsModule/locations/0/facility"),
    })
}

/// Build the full detail shape; None when the study carries no NCT id
pub fn detail_from_study(study: &Value) -> Option<TrialDetail> {
    let summary = summarize_study(study)?;
    let protocol = study.get("protocolSection")?;

    let eligibility = protocol
        .pointer("/eligibilityModule/eligibilityCriteria")
        .and_then(Value::as_str)
        .map(split_eligibility)
        .unwrap_or_default();

    let locations = protocol
        .pointer("/contactsLocationsModule/locations")
        .and_then(Value::as_array)
        .map(|locations| {
            locations
                .iter()
                .filter_map(|location| {
                    let facility = location.get("facility")?.as_str()?.to_string();
                    Some(TrialLocation {
                        facility,
                        address: str_or_default(location, "address"),
                        city: str_or_default(location, "city"),
                        state: str_or_default(location, "state"),
                        zip: str_or_default(location, "zip"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let contacts = protocol
        .pointer("/contactsLocationsModule/centralContacts")
        .and_then(Value::as_array);
    let contact_at = |index: usize| -> Contact {
        let entry = contacts.and_then(|c| c.get(index));
        Contact {
            name: entry.map(|e| str_or_default(e, "name")).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            email: entry.map(|e| str_or_default(e, "email")).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            phone: entry.map(|e| str_or_default(e, "phone")).unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        }
    };

    Some(TrialDetail {
        summary,
        eligibility,
        locations,
        contact_info: ContactInfo {
            primary: contact_at(0),
            backup: contact_at(1),
        },
    })
}

/// Split a free-text criteria block into inclusion and exclusion lines.
/// A line belongs to a bucket when it mentions the keyword; the leading
/// "inclusion criteria:" / "exclusion criteria:" label is stripped.
pub fn split_eligibility(criteria: &str) -> EligibilityCriteria {
    let collect = |keyword: &str, label: &str| -> Vec<String> {
        criteria
            .lines()
            .filter(|line| line.to_lowercase().contains(keyword))
            .map(|line| strip_label(line, label))
            .collect()
    };

    EligibilityCriteria {
        inclusion: collect("inclusion", "inclusion criteria:"),
        exclusion: collect("exclusion", "exclusion criteria:"),
    }
}

fn strip_label(line: &str, label: &str) -> String {
    let trimmed = line.trim();
    match trimmed.get(..label.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(label) => {
            trimmed[label.len()..].trim().to_string()
        }
        _ => trimmed.to_string(),
    }
}

fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

fn str_or_default(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(NOT_SPECIFIED)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn study_fixture() -> Value {
        json!({
            "protocolSection": {
                "identificationModule": { "nctId": "NCT01234567", "briefTitle": "A Study" },
                "statusModule": {
                    "overallStatus": "RECRUITING",
                    "startDateStruct": { "date": "2024-01-01" }
                },
                "descriptionModule": { "briefSummary": "Summary text" },
                "conditionsModule": { "conditions": ["Asthma", "COPD"] },
                "designModule": {
                    "studyType": "INTERVENTIONAL",
                    "phases": ["PHASE2"],
                    "enrollmentInfo": { "count": 120 }
                },
                "contactsLocationsModule": {
                    "locations": [
                        { "facility": "General Hospital", "city": "Boston" },
                        { "city": "No Facility Town" }
                    ],
                    "centralContacts": [
                        { "name": "Dr. A", "email": "a@example.org" }
                    ]
                },
                "eligibilityModule": {
                    "eligibilityCriteria": "Inclusion Criteria: adults over 18\nhealthy inclusion group\nExclusion Criteria: pregnancy\nunrelated line"
                }
            }
        })
    }

    #[test]
    fn test_summarize_projects_fields() {
        let summary = summarize_study(&study_fixture()).unwrap();
        assert_eq!(summary.nct_id, "NCT01234567");
        assert_eq!(summary.brief_title.as_deref(), Some("A Study"));
        assert_eq!(summary.condition.as_deref(), Some("Asthma"));
        assert_eq!(summary.phase.as_deref(), Some("PHASE2"));
        assert_eq!(summary.enrollment_count, Some(120));
        assert_eq!(summary.location_facility.as_deref(), Some("General Hospital"));
        assert!(summary.completion_date.is_none());
    }

    #[test]
    fn test_summarize_drops_study_without_nct_id() {
        let study = json!({
            "protocolSection": { "identificationModule": { "briefTitle": "No id" } }
        });
        assert!(summarize_study(&study).is_none());
    }

    #[test]
    fn test_split_eligibility() {
        let criteria = split_eligibility(
            "Inclusion Criteria: adults over 18\nhealthy inclusion group\nExclusion Criteria: pregnancy\nunrelated line",
        );
        assert_eq!(criteria.inclusion, vec!["adults over 18", "healthy inclusion group"]);
        assert_eq!(criteria.exclusion, vec!["pregnancy"]);
    }

    #[test]
    fn test_detail_locations_and_contacts() {
        let detail = detail_from_study(&study_fixture()).unwrap();

        // second location has no facility and is dropped
        assert_eq!(detail.locations.len(), 1);
        assert_eq!(detail.locations[0].facility, "General Hospital");
        assert_eq!(detail.locations[0].city, "Boston");
        assert_eq!(detail.locations[0].address, "Not specified");

        assert_eq!(detail.contact_info.primary.name, "Dr. A");
        assert_eq!(detail.contact_info.primary.phone, "Not specified");
        assert_eq!(detail.contact_info.backup.name, "Not specified");
    }

    #[test]
    fn test_detail_serializes_legacy_field_names() {
        let value = serde_json::to_value(detail_from_study(&study_fixture()).unwrap()).unwrap();
        assert_eq!(value["NCTId"], "NCT01234567");
        assert_eq!(value["EligibilityCriteria"]["inclusion"][0], "adults over 18");
        assert_eq!(value["ContactInfo"]["primary"]["name"], "Dr. A");
        assert_eq!(value["Locations"][0]["facility"], "General Hospital");
    }
}
