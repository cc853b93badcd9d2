//! Per-country search locale mapping.

/// Search parameters for one supported country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryLocale {
    /// Two-letter `gl` code sent to the search provider.
    pub gl: &'static str,
    /// Interface language for the country.
    pub hl: &'static str,
    pub google_domain: &'static str,
}

const COUNTRIES: &[(&str, &str)] = &[
    ("us", "google.com"),
    ("uk", "google.co.uk"),
    ("ca", "google.ca"),
    ("au", "google.com.au"),
    ("in", "google.co.in"),
    ("sg", "google.com.sg"),
    ("de", "google.de"),
    ("fr", "google.fr"),
    ("jp", "google.co.jp"),
    ("vn", "google.com.vn"),
    ("tw", "google.com.tw"),
];

fn language_for(gl: &str) -> &'static str {
    match gl {
        "vn" => "vi",
        "tw" => "zh-TW",
        _ => "en",
    }
}

/// Resolves a country code (case-insensitive); unknown codes fall back to `us`.
#[must_use]
pub fn country_locale(code: &str) -> CountryLocale {
    let code = code.trim().to_ascii_lowercase();
    let (gl, google_domain) = COUNTRIES
        .iter()
        .copied()
        .find(|(gl, _)| *gl == code)
        .unwrap_or(COUNTRIES[0]);

    CountryLocale {
        gl,
        hl: language_for(gl),
        google_domain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_country_resolves_domain() {
        let locale = country_locale("UK");
        assert_eq!(locale.gl, "uk");
        assert_eq!(locale.google_domain, "google.co.uk");
        assert_eq!(locale.hl, "en");
    }

    #[test]
    fn vietnam_and_taiwan_get_local_languages() {
        assert_eq!(country_locale("vn").hl, "vi");
        assert_eq!(country_locale("tw").hl, "zh-TW");
    }

    #[test]
    fn unknown_country_falls_back_to_us() {
        let locale = country_locale("zz");
        assert_eq!(locale.gl, "us");
        assert_eq!(locale.google_domain, "google.com");
    }
}
