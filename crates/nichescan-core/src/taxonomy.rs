//! Keyword tables driving domain classification and snippet analysis.
//!
//! The built-in [`Taxonomy::default`] mirrors the production tables. A YAML
//! file can override any subset of fields; omitted fields keep their defaults.
//!
//! ```yaml
//! trusted_domains: ["notion.so", "asana.com"]
//! forum: ["reddit", "quora", "lemmy"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    /// Domains forced into the app bucket ahead of every category check.
    pub trusted_domains: Vec<String>,
    pub forum: Vec<String>,
    pub public_doc: Vec<String>,
    pub review_giant: Vec<String>,
    pub tech_repo: Vec<String>,
    pub news: Vec<String>,
    pub pricing: PricingPhrases,
    /// Feature tags in emission order.
    pub features: Vec<FeatureTrigger>,
    pub top_rated_tag: String,
    pub top_rated_threshold: f64,
    pub audience: AudienceTriggers,
    pub template_keywords: Vec<String>,
    pub app_keywords: Vec<String>,
    /// Markers that make a displayed link or extension usable as thread meta.
    pub meta_markers: Vec<String>,
}

/// Pricing phrases, checked in field order; the first list with a hit wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPhrases {
    pub free: Vec<String>,
    pub free_trial: Vec<String>,
    pub freemium: Vec<String>,
    pub paid: Vec<String>,
    pub open_source: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTrigger {
    pub tag: String,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudienceTriggers {
    pub team_tag: String,
    pub team: Vec<String>,
    pub solo_tag: String,
    pub solo: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn feature(tag: &str, triggers: &[&str]) -> FeatureTrigger {
    FeatureTrigger {
        tag: tag.to_string(),
        triggers: strings(triggers),
    }
}

impl Default for PricingPhrases {
    fn default() -> Self {
        Self {
            free: strings(&["free forever", "100% free", "completely free", "totally free"]),
            free_trial: strings(&["free trial", "day trial", "try it free", "try free"]),
            freemium: strings(&[
                "free account",
                "sign up free",
                "sign up for free",
                "start for free",
                "get started free",
                "free plan",
                "free tier",
            ]),
            paid: strings(&["pricing", "buy", "subscribe", "plan"]),
            open_source: strings(&["open source", "open-source", "github"]),
        }
    }
}

impl Default for AudienceTriggers {
    fn default() -> Self {
        Self {
            team_tag: "For Teams".to_string(),
            team: strings(&["team", "enterprise", "business"]),
            solo_tag: "For Solo".to_string(),
            solo: strings(&["personal", "freelance", "solo"]),
        }
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            trusted_domains: Vec::new(),
            forum: strings(&[
                "reddit",
                "quora",
                "indiehackers",
                "ycombinator",
                "medium",
                "dev.to",
                "hashnode",
                "producthunt",
                "facebook",
                "twitter",
                "linkedin",
                "pinterest",
                "tiktok",
                "youtube",
                "instagram",
                "stackexchange",
                "stackoverflow",
                "discord",
                "slack",
            ]),
            public_doc: strings(&[
                "docs.google.com",
                "notion.site",
                "dropbox.com",
                "drive.google.com",
                "loom.com",
                "trello.com",
                "canva.com",
            ]),
            review_giant: strings(&[
                "g2.com",
                "capterra",
                "trustradius",
                "softwareadvice",
                "getapp",
                "trustpilot",
                "financesonline",
                "featuredcustomers",
                "forbes.com",
            ]),
            tech_repo: strings(&["github.com", "npmjs.com", "pypi.org", "gitlab.com"]),
            news: strings(&[
                "nytimes.com",
                "wsj.com",
                "wikipedia.org",
                "cafebiz.vn",
                "vnexpress.net",
                "techcrunch.com",
                "theverge.com",
                "businessinsider.com",
            ]),
            pricing: PricingPhrases::default(),
            features: vec![
                feature(
                    "AI Powered",
                    &["ai", "ai-powered", "gpt", "chatgpt", "artificial intelligence"],
                ),
                feature(
                    "No Code",
                    &["no code", "no-code", "nocode", "drag and drop", "drag-and-drop"],
                ),
                feature("Open Source", &["open source", "open-source"]),
                feature("Unlimited", &["unlimited"]),
                feature("iOS", &["ios", "iphone", "ipad"]),
                feature("Android", &["android"]),
                feature("macOS", &["macos", "mac"]),
                feature("Windows", &["windows"]),
                feature("Templates", &["template"]),
            ],
            top_rated_tag: "Top Rated".to_string(),
            top_rated_threshold: 4.5,
            audience: AudienceTriggers::default(),
            template_keywords: strings(&["template", "theme", "kit", "preset", "boilerplate"]),
            app_keywords: strings(&[
                "maker",
                "builder",
                "creator",
                "generator",
                "platform",
                "tool",
                "software",
                "app",
                "create",
                "build",
                "make",
                "generate",
                "design",
                "download",
            ]),
            meta_markers: strings(&["ago", "comment", "answer"]),
        }
    }
}

impl Taxonomy {
    /// Parses a YAML document, filling omitted fields from the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TaxonomyFileParse`] on malformed YAML and
    /// [`ConfigError::Validation`] when a keyword list contains blanks.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let taxonomy: Taxonomy = serde_yaml::from_str(content)?;
        taxonomy.validate()?;
        Ok(taxonomy.lowercased())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let lists: [(&str, &[String]); 16] = [
            ("trusted_domains", &self.trusted_domains),
            ("forum", &self.forum),
            ("public_doc", &self.public_doc),
            ("review_giant", &self.review_giant),
            ("tech_repo", &self.tech_repo),
            ("news", &self.news),
            ("pricing.free", &self.pricing.free),
            ("pricing.free_trial", &self.pricing.free_trial),
            ("pricing.freemium", &self.pricing.freemium),
            ("pricing.paid", &self.pricing.paid),
            ("pricing.open_source", &self.pricing.open_source),
            ("audience.team", &self.audience.team),
            ("audience.solo", &self.audience.solo),
            ("template_keywords", &self.template_keywords),
            ("app_keywords", &self.app_keywords),
            ("meta_markers", &self.meta_markers),
        ];

        for (name, list) in lists {
            if list.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "{name} contains an empty keyword"
                )));
            }
        }

        for trigger in &self.features {
            if trigger.tag.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "feature tag must be non-empty".to_string(),
                ));
            }
            if trigger.triggers.iter().any(|k| k.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "feature '{}' contains an empty trigger",
                    trigger.tag
                )));
            }
        }

        if let Some(entry) = self
            .trusted_domains
            .iter()
            .find(|d| normalize_host(d).is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "trusted domain '{entry}' has no host"
            )));
        }

        if !(0.0..=5.0).contains(&self.top_rated_threshold) {
            return Err(ConfigError::Validation(format!(
                "top_rated_threshold {} is outside 0..=5",
                self.top_rated_threshold
            )));
        }

        Ok(())
    }

    /// Matching runs on lowercase text, so keywords are stored lowercase.
    /// Trusted domains are reduced to bare hosts, the form they are compared
    /// against.
    fn lowercased(mut self) -> Self {
        let lower = |list: &mut Vec<String>| {
            for keyword in list.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
        };
        for domain in &mut self.trusted_domains {
            *domain = normalize_host(domain);
        }
        lower(&mut self.forum);
        lower(&mut self.public_doc);
        lower(&mut self.review_giant);
        lower(&mut self.tech_repo);
        lower(&mut self.news);
        lower(&mut self.pricing.free);
        lower(&mut self.pricing.free_trial);
        lower(&mut self.pricing.freemium);
        lower(&mut self.pricing.paid);
        lower(&mut self.pricing.open_source);
        lower(&mut self.audience.team);
        lower(&mut self.audience.solo);
        lower(&mut self.template_keywords);
        lower(&mut self.app_keywords);
        lower(&mut self.meta_markers);
        for trigger in &mut self.features {
            lower(&mut trigger.triggers);
        }
        self
    }
}

/// Lowercases a hostname or URL down to its host, without scheme, userinfo,
/// port, path, trailing dot or a leading `www.`.
#[must_use]
pub fn normalize_host(input: &str) -> String {
    let lower = input.trim().to_lowercase();
    let without_scheme = lower
        .split_once("://")
        .map_or(lower.as_str(), |(_, rest)| rest);
    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let host = host_port.split(':').next().unwrap_or_default();
    let host = host.trim_end_matches('.');
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Load and validate a taxonomy override file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TaxonomyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Taxonomy::from_yaml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_taxonomy_is_valid() {
        assert!(Taxonomy::default().validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_omitted_fields() {
        let taxonomy = Taxonomy::from_yaml("trusted_domains: [\"Asana.com\"]\n").unwrap();
        assert_eq!(taxonomy.trusted_domains, vec!["asana.com".to_string()]);
        assert_eq!(taxonomy.forum, Taxonomy::default().forum);
        assert_eq!(taxonomy.top_rated_tag, "Top Rated");
    }

    #[test]
    fn trusted_domains_are_reduced_to_hosts() {
        let taxonomy = Taxonomy::from_yaml(
            "trusted_domains: [\"www.Notion.so\", \"https://asana.com/pricing\", \"clickup.com.\"]\n",
        )
        .unwrap();
        assert_eq!(
            taxonomy.trusted_domains,
            vec!["notion.so", "asana.com", "clickup.com"]
        );
    }

    #[test]
    fn trusted_domain_without_host_is_rejected() {
        let err = Taxonomy::from_yaml("trusted_domains: [\"https://\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn yaml_can_replace_a_category_list() {
        let taxonomy = Taxonomy::from_yaml("forum: [lemmy, discourse]\n").unwrap();
        assert_eq!(taxonomy.forum, vec!["lemmy", "discourse"]);
    }

    #[test]
    fn empty_keyword_is_rejected() {
        let err = Taxonomy::from_yaml("news: [\"nytimes.com\", \"  \"]\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("news")),
            "expected validation error naming news, got: {err:?}"
        );
    }

    #[test]
    fn empty_feature_tag_is_rejected() {
        let yaml = "features:\n  - tag: \"\"\n    triggers: [ai]\n";
        let err = Taxonomy::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = Taxonomy::from_yaml("top_rated_threshold: 7.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("threshold")));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = Taxonomy::from_yaml("forum: {not: [a list\n").unwrap_err();
        assert!(matches!(err, ConfigError::TaxonomyFileParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_taxonomy(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::TaxonomyFileIo { .. }));
    }
}
