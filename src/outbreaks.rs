//! Outbreak Tracking
//!
//! Disease-to-indicator mapping, severity tiers, response recommendations,
//! and the reshaping of WHO GHO case counts into outbreak GeoJSON.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::geo::{self, Feature};
use crate::upstream::GhoIndicator;

/// Built-in disease → GHO indicator codes; the refresh flag on the outbreak
/// route can rebuild this map from the live catalogue
pub fn default_indicators() -> HashMap<String, String> {
    [
        ("measles", "WHS4_543"),
        ("yellowfever", "WHS4_544"),
        ("polio", "WHS4_545"),
        ("dengue", "WHS8_110"),
        ("ebola", "WHS9_86"),
        ("cholera", "WHS10_93"),
        ("covid19", "WHS11_95"),
    ]
    .into_iter()
    .map(|(disease, code)| (disease.to_string(), code.to_string()))
    .collect()
}

/// Substring the catalogue indicator name must contain to map to a disease
const NAME_PATTERNS: [(&str, &str); 7] = [
    ("measles", "measles"),
    ("yellowfever", "yellow fever"),
    ("polio", "polio"),
    ("dengue", "dengue"),
    ("ebola", "ebola"),
    ("cholera", "cholera"),
    ("covid19", "covid"),
];

/// Rebuild the disease map from the live indicator catalogue. Each indicator
/// maps to at most one disease (first matching pattern); later catalogue
/// entries win when several match the same disease.
pub fn indicators_from_catalogue(indicators: &[GhoIndicator]) -> HashMap<String, String> {
    let mut mapped = HashMap::new();

    for indicator in indicators {
        let (Some(code), Some(name)) = (&indicator.code, &indicator.name) else {
            continue;
        };
        let lowered = name.to_lowercase();
        for (disease, pattern) in NAME_PATTERNS {
            if lowered.contains(pattern) {
                mapped.insert(disease.to_string(), code.clone());
                break;
            }
        }
    }

    mapped
}

/// Reporting window for the outbreak query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    Days7,
    Days30,
    Days90,
    Year1,
}

impl TimePeriod {
    /// Parse the request parameter; anything unrecognized falls back to 30 days
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("7d") => TimePeriod::Days7,
            Some("90d") => TimePeriod::Days90,
            Some("1y") => TimePeriod::Year1,
            _ => TimePeriod::Days30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::Days7 => "7d",
            TimePeriod::Days30 => "30d",
            TimePeriod::Days90 => "90d",
            TimePeriod::Year1 => "1y",
        }
    }

    fn days(&self) -> i64 {
        match self {
            TimePeriod::Days7 => 7,
            TimePeriod::Days30 => 30,
            TimePeriod::Days90 => 90,
            TimePeriod::Year1 => 365,
        }
    }
}

/// OData time filter for the window ending at `now`
pub fn time_filter(period: TimePeriod, now: DateTime<Utc>) -> String {
    let start = (now - Duration::days(period.days())).format("%Y-%m-%d");
    let end = now.format("%Y-%m-%d");
    format!("TimeDim ge datetime'{start}' and TimeDim le datetime'{end}'")
}

/// Outbreak severity tier derived from the case count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Moderate,
    Low,
}

impl Severity {
    pub fn for_cases(cases: i64) -> Self {
        if cases >= 1000 {
            Severity::High
        } else if cases >= 100 {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Severity::High),
            "moderate" => Some(Severity::Moderate),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// One reshaped outbreak record
#[derive(Debug, Clone)]
pub struct Outbreak {
    pub id: String,
    pub disease: String,
    pub country: String,
    pub cases: i64,
    pub severity: Severity,
    pub last_updated: Value,
    pub recommendations: Vec<String>,
    pub coordinates: [f64; 2],
}

/// Properties of one outbreak map feature
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutbreakProperties {
    pub id: String,
    pub disease: String,
    pub country: String,
    pub cases: i64,
    pub severity: Severity,
    pub last_updated: Value,
    pub status: String,
    pub recommendations: Vec<String>,
}

impl Outbreak {
    pub fn into_feature(self) -> Feature<OutbreakProperties> {
        let coordinates = self.coordinates;
        Feature::point(
            OutbreakProperties {
                id: self.id,
                disease: self.disease,
                country: self.country,
                cases: self.cases,
                severity: self.severity,
                last_updated: self.last_updated,
                status: "active".to_string(),
                recommendations: self.recommendations,
            },
            coordinates,
        )
    }
}

/// Reshape GHO rows into outbreaks. Only country rows with a case count that
/// parses to an integer survive; an optional severity filter drops the rest.
pub fn outbreaks_from_rows(
    rows: &[Value],
    disease: &str,
    severity_filter: Option<Severity>,
) -> Vec<Outbreak> {
    rows.iter()
        .filter_map(|row| {
            if row.get("SpatialDimType").and_then(Value::as_str) != Some("COUNTRY") {
                return None;
            }
            let country = row.get("SpatialDim").and_then(Value::as_str)?;
            let cases = parse_cases(row.get("Value")?)?;

            let severity = Severity::for_cases(cases);
            if let Some(wanted) = severity_filter {
                if severity != wanted {
                    return None;
                }
            }

            let last_updated = row.get("TimeDim").cloned().unwrap_or(Value::Null);

            Some(Outbreak {
                id: format!("{}-{}-{}", country, disease, scalar_string(&last_updated)),
                disease: disease.to_string(),
                country: country.to_string(),
                cases,
                severity,
                last_updated,
                recommendations: recommendations_for(disease, severity),
                coordinates: geo::country_coordinates(country),
            })
        })
        .collect()
}

fn parse_cases(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f.trunc() as i64),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        _ => None,
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Response recommendations for a disease at a severity tier: the
/// severity-wide guidance followed by disease-specific measures
pub fn recommendations_for(disease: &str, severity: Severity) -> Vec<String> {
    let base: &[&str] = match severity {
        Severity::High => &[
            "Implement immediate containment measures",
            "Increase surveillance and testing",
            "Mobilize emergency response teams",
            "Consider travel restrictions",
            "Enhance healthcare capacity",
        ],
        Severity::Moderate => &[
            "Enhance monitoring and reporting",
            "Strengthen healthcare capacity",
            "Implement preventive measures",
            "Increase public awareness",
            "Prepare response plans",
        ],
        Severity::Low => &[
            "Maintain routine surveillance",
            "Continue standard prevention protocols",
            "Monitor for any changes in situation",
            "Review and update response plans",
            "Ensure adequate supplies",
        ],
    };

    let specific: &[&str] = match disease {
        "measles" => &[
            "Ensure high vaccination coverage",
            "Implement catch-up vaccination programs",
            "Strengthen routine immunization",
        ],
        "yellowfever" => &[
            "Implement vector control measures",
            "Ensure vaccination of travelers",
            "Monitor mosquito populations",
        ],
        "polio" => &[
            "Maintain high vaccination coverage",
            "Implement supplementary immunization activities",
            "Enhance environmental surveillance",
        ],
        "dengue" => &[
            "Implement vector control measures",
            "Remove standing water sources",
            "Use mosquito repellents",
        ],
        "ebola" => &[
            "Implement strict infection control measures",
            "Establish isolation facilities",
            "Train healthcare workers",
        ],
        "cholera" => &[
            "Ensure access to clean water",
            "Improve sanitation facilities",
            "Implement food safety measures",
        ],
        "covid19" => &[
            "Promote vaccination",
            "Implement social distancing measures",
            "Enhance testing and contact tracing",
        ],
        _ => &[],
    };

    base.iter()
        .chain(specific.iter())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_severity_tiers() {
        assert_eq!(Severity::for_cases(1000), Severity::High);
        assert_eq!(Severity::for_cases(999), Severity::Moderate);
        assert_eq!(Severity::for_cases(100), Severity::Moderate);
        assert_eq!(Severity::for_cases(99), Severity::Low);
        assert_eq!(Severity::for_cases(0), Severity::Low);
    }

    #[test]
    fn test_time_period_parse() {
        assert_eq!(TimePeriod::parse(Some("7d")), TimePeriod::Days7);
        assert_eq!(TimePeriod::parse(Some("1y")), TimePeriod::Year1);
        assert_eq!(TimePeriod::parse(Some("bogus")), TimePeriod::Days30);
        assert_eq!(TimePeriod::parse(None), TimePeriod::Days30);
    }

    #[test]
    fn test_time_filter_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let filter = time_filter(TimePeriod::Days7, now);
        assert_eq!(
            filter,
            "TimeDim ge datetime'2024-03-08' and TimeDim le datetime'2024-03-15'"
        );
    }

    #[test]
    fn test_outbreaks_from_rows() {
        let rows = vec![
            json!({ "SpatialDimType": "COUNTRY", "SpatialDim": "NGA", "Value": "1500", "TimeDim": 2024 }),
            json!({ "SpatialDimType": "COUNTRY", "SpatialDim": "KEN", "Value": "250", "TimeDim": 2024 }),
            // null case count dropped
            json!({ "SpatialDimType": "COUNTRY", "SpatialDim": "BRA", "Value": null, "TimeDim": 2024 }),
            // non-country rows dropped
            json!({ "SpatialDimType": "REGION", "SpatialDim": "AFR", "Value": "9000", "TimeDim": 2024 }),
        ];

        let outbreaks = outbreaks_from_rows(&rows, "measles", None);
        assert_eq!(outbreaks.len(), 2);
        assert_eq!(outbreaks[0].id, "NGA-measles-2024");
        assert_eq!(outbreaks[0].severity, Severity::High);
        assert_eq!(outbreaks[0].coordinates, [8.6753, 9.0820]);
        assert_eq!(outbreaks[1].severity, Severity::Moderate);
    }

    #[test]
    fn test_severity_filter() {
        let rows = vec![
            json!({ "SpatialDimType": "COUNTRY", "SpatialDim": "NGA", "Value": "1500", "TimeDim": 2024 }),
            json!({ "SpatialDimType": "COUNTRY", "SpatialDim": "KEN", "Value": "50", "TimeDim": 2024 }),
        ];

        let high_only = outbreaks_from_rows(&rows, "measles", Some(Severity::High));
        assert_eq!(high_only.len(), 1);
        assert_eq!(high_only[0].country, "NGA");
    }

    #[test]
    fn test_recommendations_include_disease_specific() {
        let recommendations = recommendations_for("cholera", Severity::High);
        assert_eq!(recommendations.len(), 8);
        assert_eq!(recommendations[0], "Implement immediate containment measures");
        assert!(recommendations.contains(&"Ensure access to clean water".to_string()));

        // unknown disease gets only the severity-wide guidance
        assert_eq!(recommendations_for("unknown", Severity::Low).len(), 5);
    }

    #[test]
    fn test_indicators_from_catalogue() {
        let catalogue = vec![
            GhoIndicator {
                code: Some("NEW_MEASLES".to_string()),
                name: Some("Reported measles cases".to_string()),
                description: None,
            },
            GhoIndicator {
                code: Some("NEW_YF".to_string()),
                name: Some("Yellow fever reported cases".to_string()),
                description: None,
            },
            GhoIndicator {
                code: Some("UNRELATED".to_string()),
                name: Some("Hospital beds".to_string()),
                description: None,
            },
            GhoIndicator {
                code: None,
                name: Some("measles without code".to_string()),
                description: None,
            },
        ];

        let mapped = indicators_from_catalogue(&catalogue);
        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped.get("measles").map(String::as_str), Some("NEW_MEASLES"));
        assert_eq!(mapped.get("yellowfever").map(String::as_str), Some("NEW_YF"));
    }

    #[test]
    fn test_outbreak_feature_shape() {
        let rows = vec![json!({
            "SpatialDimType": "COUNTRY", "SpatialDim": "IND", "Value": 2000, "TimeDim": "2024-01"
        })];
        let features: Vec<_> = outbreaks_from_rows(&rows, "dengue", None)
            .into_iter()
            .map(Outbreak::into_feature)
            .collect();

        let value = serde_json::to_value(&features).unwrap();
        assert_eq!(value[0]["properties"]["id"], "IND-dengue-2024-01");
        assert_eq!(value[0]["properties"]["severity"], "high");
        assert_eq!(value[0]["properties"]["status"], "active");
        assert_eq!(value[0]["properties"]["lastUpdated"], "2024-01");
        assert_eq!(value[0]["geometry"]["coordinates"][0], 78.9629);
    }
}
