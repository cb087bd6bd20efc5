// 🌍 Country metadata - ISO alpha-2 codes and currencies by country name

/// ISO 3166-1 alpha-2 code used when a country is not mapped
pub const UNKNOWN_COUNTRY_CODE: &str = "XX";

/// Currency placeholder used when a country is not mapped
pub const UNKNOWN_CURRENCY: &str = "Unknown";

// (name, alpha-2, currency)
const COUNTRIES: &[(&str, &str, &str)] = &[
    ("United States", "US", "USD"),
    ("United Kingdom", "GB", "GBP"),
    ("Canada", "CA", "CAD"),
    ("Australia", "AU", "AUD"),
    ("Germany", "DE", "EUR"),
    ("France", "FR", "EUR"),
    ("Japan", "JP", "JPY"),
    ("China", "CN", "CNY"),
    ("India", "IN", "INR"),
    ("Mexico", "MX", "MXN"),
    ("Brazil", "BR", "BRL"),
    ("Italy", "IT", "EUR"),
    ("Spain", "ES", "EUR"),
    ("South Korea", "KR", "KRW"),
    ("Russia", "RU", "RUB"),
];

fn find(country_name: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    COUNTRIES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(country_name.trim()))
}

/// Alpha-2 code for a country name, `XX` when unmapped
pub fn country_code(country_name: &str) -> &'static str {
    find(country_name)
        .map(|(_, code, _)| *code)
        .unwrap_or(UNKNOWN_COUNTRY_CODE)
}

/// Currency for a country name, `Unknown` when unmapped
pub fn currency_for(country_name: &str) -> &'static str {
    find(country_name)
        .map(|(_, _, currency)| *currency)
        .unwrap_or(UNKNOWN_CURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_countries() {
        assert_eq!(country_code("United States"), "US");
        assert_eq!(currency_for("United States"), "USD");
        assert_eq!(country_code("germany"), "DE");
        assert_eq!(currency_for("Japan"), "JPY");
    }

    #[test]
    fn test_unknown_country() {
        assert_eq!(country_code("Atlantis"), UNKNOWN_COUNTRY_CODE);
        assert_eq!(currency_for("International"), UNKNOWN_CURRENCY);
    }
}
