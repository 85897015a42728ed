//! GeoJSON Shapes and Country Tables
//!
//! Minimal GeoJSON types for the map-facing responses, plus the country
//! tables the reshaping code joins against: the ISO-3 allowlist for the
//! coverage layer and rough centroids for the outbreak layer.

use serde::Serialize;

/// GeoJSON feature collection
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection<P> {
    pub features: Vec<Feature<P>>,
}

impl<P> FeatureCollection<P> {
    pub fn new(features: Vec<Feature<P>>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// GeoJSON feature
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature<P> {
    pub properties: P,
    pub geometry: Geometry,
}

impl<P> Feature<P> {
    /// Point feature at `[lon, lat]`
    pub fn point(properties: P, coordinates: [f64; 2]) -> Self {
        Self {
            properties,
            geometry: Geometry::Point { coordinates },
        }
    }
}

/// GeoJSON geometry
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

/// ISO-3 codes the coverage map can style; sorted for binary search
const MAPPED_COUNTRIES: &[&str] = &[
    "AGO", "ALB", "ARE", "ARG", "ARM", "AUS", "AUT", "AZE", "BDI", "BEL", "BEN", "BFA", "BGD",
    "BGR", "BHR", "BIH", "BLR", "BOL", "BRA", "BRN", "BTN", "BWA", "CAF", "CAN", "CHE", "CHL",
    "CHN", "CIV", "CMR", "COD", "COG", "COK", "COL", "COM", "CPV", "CYP", "CZE", "DEU", "DJI",
    "DNK", "DZA", "ECU", "EGY", "ERI", "ESH", "ESP", "ETH", "FIN", "FJI", "FRA", "GAB", "GBR",
    "GEO", "GHA", "GIN", "GMB", "GNB", "GNQ", "GRC", "GUF", "GUY", "HKG", "HRV", "HUN", "IDN",
    "IND", "IRL", "IRQ", "ISL", "ISR", "ITA", "JOR", "JPN", "KEN", "KHM", "KIR", "KOR", "KOS",
    "KWT", "LAO", "LBN", "LBR", "LBY", "LKA", "LSO", "MAR", "MDA", "MDG", "MDV", "MEX", "MKD",
    "MLI", "MLT", "MMR", "MNE", "MNG", "MOZ", "MRT", "MUS", "MWI", "MYS", "NAM", "NCL", "NER",
    "NGA", "NIU", "NLD", "NOR", "NPL", "NZL", "OMN", "PAK", "PER", "PHL", "PNG", "POL", "PRK",
    "PRT", "PRY", "PYF", "QAT", "ROU", "RUS", "RWA", "SAU", "SDN", "SEN", "SGP", "SLB", "SLE",
    "SOM", "SRB", "SSD", "STP", "SUR", "SVK", "SVN", "SWE", "SWZ", "SYC", "SYR", "TCD", "TGO",
    "THA", "TLS", "TON", "TUN", "TUR", "TUV", "TWN", "TZA", "UGA", "UKR", "URY", "USA", "VEN",
    "VNM", "VUT", "WSM", "YEM", "ZAF", "ZMB", "ZWE",
];

/// Map a WHO spatial-dimension code to the ISO-3 code the front end styles
/// with; None for countries outside the supported set
pub fn iso3(code: &str) -> Option<&'static str> {
    MAPPED_COUNTRIES
        .binary_search(&code)
        .ok()
        .map(|i| MAPPED_COUNTRIES[i])
}

/// Rough country centroids (`[lon, lat]`) for outbreak map points; unknown
/// countries land at the null island origin
pub fn country_coordinates(country: &str) -> [f64; 2] {
    match country {
        "USA" => [-98.5795, 39.8283],
        "BRA" => [-51.9253, -14.2350],
        "IND" => [78.9629, 20.5937],
        "NGA" => [8.6753, 9.0820],
        "ZAF" => [22.9375, -30.5595],
        "KEN" => [37.9062, -0.0236],
        "IDN" => [113.9213, -0.7893],
        "PHL" => [121.7740, 12.8797],
        _ => [0.0, 0.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapped_countries_sorted() {
        let mut sorted = MAPPED_COUNTRIES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, MAPPED_COUNTRIES);
    }

    #[test]
    fn test_iso3_lookup() {
        assert_eq!(iso3("USA"), Some("USA"));
        assert_eq!(iso3("KOS"), Some("KOS"));
        assert_eq!(iso3("XYZ"), None);
        assert_eq!(iso3(""), None);
    }

    #[test]
    fn test_country_coordinates() {
        assert_eq!(country_coordinates("USA"), [-98.5795, 39.8283]);
        assert_eq!(country_coordinates("ATL"), [0.0, 0.0]);
    }

    #[test]
    fn test_geojson_serialization() {
        #[derive(Serialize)]
        struct Props {
            name: &'static str,
        }

        let collection =
            FeatureCollection::new(vec![Feature::point(Props { name: "x" }, [1.0, 2.0])]);
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Point");
        assert_eq!(
            value["features"][0]["geometry"]["coordinates"],
            json!([1.0, 2.0])
        );
        assert_eq!(value["features"][0]["properties"]["name"], "x");
    }
}
