//! Shared domain model, keyword taxonomy and configuration for nichescan.

pub mod app_config;
pub mod config;
pub mod error;
pub mod locale;
pub mod model;
pub mod slug;
pub mod taxonomy;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use locale::{country_locale, CountryLocale};
pub use model::{
    AnalysisResult, AppItem, DomainCategory, ItemType, PricingModel, SeedingTarget, Verdict,
    VerdictColor,
};
pub use slug::{cache_key, slugify, unslugify};
pub use taxonomy::{
    load_taxonomy, normalize_host, AudienceTriggers, FeatureTrigger, PricingPhrases, Taxonomy,
};
