// Static regional advisories, looked up by the city a user types in.

use super::alerts::model::Severity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub location: String,
    pub source: &'static str,
}

struct Region {
    keywords: &'static [&'static str],
    severity: Severity,
    title: &'static str,
    description: &'static str,
    source: &'static str,
}

const REGIONS: &[Region] = &[
    Region {
        keywords: &["mumbai", "maharashtra"],
        severity: Severity::Critical,
        title: "Heavy Rainfall Alert - Mumbai",
        description: "Intense rainfall expected in Mumbai region. Avoid low-lying areas and underpasses. Local trains may face delays.",
        source: "IMD Mumbai",
    },
    Region {
        keywords: &["delhi", "ncr"],
        severity: Severity::Warning,
        title: "Air Quality Advisory - Delhi NCR",
        description: "Air quality index expected to remain in 'Poor' category. Sensitive individuals should limit outdoor activities.",
        source: "CPCB Delhi",
    },
    Region {
        keywords: &["gujarat", "ahmedabad"],
        severity: Severity::Critical,
        title: "Heat Wave Warning - Gujarat",
        description: "Severe heat wave conditions expected. Temperature may reach 45°C. Stay hydrated and avoid outdoor activities during peak hours.",
        source: "IMD Ahmedabad",
    },
];

/// Advisories for a city. Blank input yields nothing; an unknown city gets a
/// generic weather advisory.
pub fn advisories_for_city(city: &str) -> Vec<Advisory> {
    let city = city.trim();
    if city.is_empty() {
        return Vec::new();
    }

    let lower = city.to_lowercase();
    let region = REGIONS
        .iter()
        .find(|r| r.keywords.iter().any(|k| lower.contains(k)));

    let advisory = match region {
        Some(region) => Advisory {
            severity: region.severity,
            title: region.title.to_string(),
            description: region.description.to_string(),
            location: city.to_string(),
            source: region.source,
        },
        None => Advisory {
            severity: Severity::Info,
            title: format!("Weather Advisory - {}", city),
            description: "No active weather warnings for your area. Stay updated with local authorities for any changes.".to_string(),
            location: city.to_string(),
            source: "Local Weather Service",
        },
    };
    vec![advisory]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions_match_case_insensitively() {
        let result = advisories_for_city("  Navi MUMBAI ");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, "IMD Mumbai");
        assert_eq!(result[0].location, "Navi MUMBAI");

        assert_eq!(advisories_for_city("New Delhi")[0].severity, Severity::Warning);
        assert_eq!(advisories_for_city("Ahmedabad")[0].title, "Heat Wave Warning - Gujarat");
    }

    #[test]
    fn test_unknown_city_gets_generic_advisory() {
        let result = advisories_for_city("Shillong");
        assert_eq!(result[0].title, "Weather Advisory - Shillong");
        assert_eq!(result[0].severity, Severity::Info);
    }

    #[test]
    fn test_blank_city_yields_nothing() {
        assert!(advisories_for_city("   ").is_empty());
    }
}
