//! Vaccine Coverage Data
//!
//! The vaccine → WHO GHO indicator table and the reshaping of GHO indicator
//! rows into GeoJSON for the coverage map layers.

use serde::Serialize;
use serde_json::Value;

use crate::geo::{self, Feature};
use crate::upstream::GhoIndicator;

/// One supported vaccine and the GHO indicator that tracks its coverage
#[derive(Debug, Clone)]
pub struct VaccineIndicator {
    /// Key used in API requests (e.g., "measles")
    pub key: &'static str,
    /// GHO indicator code
    pub code: &'static str,
    /// Display name of the coverage series
    pub name: &'static str,
    /// Disease the vaccine targets
    pub target_disease: &'static str,
}

/// Supported vaccines, keyed by the request parameter
pub const VACCINE_INDICATORS: [VaccineIndicator; 11] = [
    VaccineIndicator {
        key: "measles",
        code: "WHS4_543",
        name: "MCV1 Coverage",
        target_disease: "Measles",
    },
    VaccineIndicator {
        key: "polio",
        code: "vpolio",
        name: "Pol3 Coverage",
        target_disease: "Polio",
    },
    VaccineIndicator {
        key: "hepatitisb",
        code: "WHS7_102",
        name: "HepB3 Coverage",
        target_disease: "Hepatitis B",
    },
    VaccineIndicator {
        key: "dtp",
        code: "WHS4_544",
        name: "DTP3 Coverage",
        target_disease: "Diphtheria-Tetanus-Pertussis",
    },
    VaccineIndicator {
        key: "rubella",
        code: "WHS9_86",
        name: "RCV1 Coverage",
        target_disease: "Rubella",
    },
    VaccineIndicator {
        key: "hib",
        code: "WHS5_89",
        name: "Hib3 Coverage",
        target_disease: "Haemophilus influenzae type B",
    },
    VaccineIndicator {
        key: "pneumococcal",
        code: "WHS10_93",
        name: "PCV3 Coverage",
        target_disease: "Pneumococcal disease",
    },
    VaccineIndicator {
        key: "rotavirus",
        code: "WHS11_95",
        name: "RotaC Coverage",
        target_disease: "Rotavirus",
    },
    VaccineIndicator {
        key: "yellowfever",
        code: "IMMUNIZATION_YFV",
        name: "YFV Coverage",
        target_disease: "Yellow Fever",
    },
    VaccineIndicator {
        key: "meningococcal",
        code: "WHS13_99",
        name: "MenA Coverage",
        target_disease: "Meningococcal disease",
    },
    VaccineIndicator {
        key: "bcg",
        code: "WHS8_110",
        name: "BCG Coverage",
        target_disease: "Tuberculosis",
    },
];

/// Look up a supported vaccine by request key
pub fn vaccine_indicator(key: &str) -> Option<&'static VaccineIndicator> {
    VACCINE_INDICATORS.iter().find(|v| v.key == key)
}

/// Keys of all supported vaccines, in display order
pub fn vaccine_keys() -> Vec<&'static str> {
    VACCINE_INDICATORS.iter().map(|v| v.key).collect()
}

/// Properties of one coverage map feature
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageProperties {
    pub country: String,
    pub country_code: String,
    /// Coverage percentage (GHO NumericValue)
    pub coverage: Option<f64>,
    /// Raw GHO Value, passed through for display
    pub cases: Value,
    pub year: Value,
    pub vaccine: String,
    pub indicator: String,
    pub target_disease: String,
}

/// Reshape GHO rows into coverage features: one per country row whose
/// spatial code is in the supported ISO-3 set; everything else is dropped.
/// Geometry is a `[0,0]` point — the map styles by country code.
pub fn coverage_features(
    rows: &[Value],
    vaccine: &str,
    info: &VaccineIndicator,
) -> Vec<Feature<CoverageProperties>> {
    rows.iter()
        .filter_map(|row| {
            if row.get("SpatialDimType").and_then(Value::as_str) != Some("COUNTRY") {
                return None;
            }
            let country = row.get("SpatialDim").and_then(Value::as_str)?;
            let country_code = geo::iso3(country)?;

            Some(Feature::point(
                CoverageProperties {
                    country: country.to_string(),
                    country_code: country_code.to_string(),
                    coverage: row.get("NumericValue").and_then(Value::as_f64),
                    cases: row.get("Value").cloned().unwrap_or(Value::Null),
                    year: row.get("TimeDim").cloned().unwrap_or(Value::Null),
                    vaccine: vaccine.to_string(),
                    indicator: info.code.to_string(),
                    target_disease: info.target_disease.to_string(),
                },
                [0.0, 0.0],
            ))
        })
        .collect()
}

/// Indicator-code prefixes considered vaccine-related in the catalogue
const VACCINE_CODE_PREFIXES: [&str; 5] = ["MCV", "DTP", "POL", "HEP", "ROT"];

/// Catalogue entry summary returned by the vaccine-data list mode
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSummary {
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Filter the GHO catalogue down to vaccine-related indicators
pub fn vaccine_related_indicators(indicators: &[GhoIndicator]) -> Vec<IndicatorSummary> {
    indicators
        .iter()
        .filter_map(|indicator| {
            let code = indicator.code.as_ref()?;
            if !VACCINE_CODE_PREFIXES.iter().any(|p| code.starts_with(p)) {
                return None;
            }
            Some(IndicatorSummary {
                code: code.clone(),
                name: indicator.name.clone(),
                description: indicator.description.clone(),
            })
        })
        .collect()
}

/// Properties of one indicator-value map feature
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorValueProperties {
    /// Spatial dimension code (country or region)
    pub name: String,
    pub coverage: f64,
    pub year: Value,
    pub vaccine: String,
    pub source: String,
    pub metadata: IndicatorValueMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorValueMetadata {
    pub data_type: Value,
    pub value_type: Value,
    pub parent_location: Value,
}

/// Reshape GHO rows for an arbitrary indicator into map features. Rows whose
/// Value does not parse to a finite number, or that lack a spatial or time
/// dimension, are dropped.
pub fn indicator_value_features(
    rows: &[Value],
    indicator: &str,
) -> Vec<Feature<IndicatorValueProperties>> {
    rows.iter()
        .filter_map(|row| {
            let coverage = parse_value_number(row.get("Value"))?;
            let name = row.get("SpatialDim").and_then(Value::as_str)?;
            let year = row.get("TimeDim").filter(|v| !v.is_null())?.clone();

            Some(Feature::point(
                IndicatorValueProperties {
                    name: name.to_string(),
                    coverage,
                    year,
                    vaccine: indicator.to_string(),
                    source: row
                        .get("DataSource")
                        .and_then(Value::as_str)
                        .unwrap_or("WHO")
                        .to_string(),
                    metadata: IndicatorValueMetadata {
                        data_type: row.get("DataType").cloned().unwrap_or(Value::Null),
                        value_type: row.get("ValueType").cloned().unwrap_or(Value::Null),
                        parent_location: row.get("ParentLocation").cloned().unwrap_or(Value::Null),
                    },
                },
                [0.0, 0.0],
            ))
        })
        .collect()
}

fn parse_value_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
