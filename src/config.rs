use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cloudant: CloudantConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which store answers the queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Cloudant,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// Exchange the API key for an IAM bearer token
    Iam,
    /// Legacy Cloudant credentials: username plus API key as password
    Basic,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudantConfig {
    pub backend: Backend,
    pub url: Option<String>,
    pub auth: AuthKind,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub iam_token_url: String,
    pub request_timeout_secs: u64,
    /// JSON file of `{"<db>": [docs]}` loaded into the memory backend
    pub seed_file: Option<String>,
}

/// The single endpoint set this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    DealershipSearch,
    DealershipList,
    Reviews,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub kind: ServiceKind,
    pub dealerships_db: String,
    pub reviews_db: String,
    pub find_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cloudant: CloudantConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for CloudantConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Cloudant,
            url: None,
            auth: AuthKind::Iam,
            api_key: None,
            username: None,
            iam_token_url: "https://iam.cloud.ibm.com/identity/token".to_string(),
            request_timeout_secs: 30,
            seed_file: None,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            kind: ServiceKind::DealershipSearch,
            dealerships_db: "dealerships".to_string(),
            reviews_db: "reviews".to_string(),
            find_limit: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        // DEALER__CLOUDANT__API_KEY -> cloudant.api_key
        config = config.add_source(
            config::Environment::with_prefix("DEALER")
                .separator("__")
                .prefix_separator("__"),
        );

        // Hosting platforms hand the listen port over as a bare PORT
        config = config.set_override_option("server.port", std::env::var("PORT").ok())?;

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Name of the database the configured variant reads from
    pub fn primary_database(&self) -> &str {
        match self.service.kind {
            ServiceKind::DealershipSearch | ServiceKind::DealershipList => {
                &self.service.dealerships_db
            }
            ServiceKind::Reviews => &self.service.reviews_db,
        }
    }

    /// The Cloudant service URL, required for the cloudant backend
    pub fn cloudant_url(&self) -> anyhow::Result<&str> {
        self.cloudant
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow::anyhow!("cloudant.url must be set (DEALER__CLOUDANT__URL)"))
    }

    /// The API key, required for the iam and basic auth modes
    pub fn api_key(&self) -> anyhow::Result<&str> {
        self.cloudant
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("cloudant.api_key must be set (DEALER__CLOUDANT__API_KEY)")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests that touch process environment run one at a time
    static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn test_defaults_match_hosted_service() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert_eq!(config.cloudant.auth, AuthKind::Iam);
        assert_eq!(config.service.find_limit, 10);
        assert_eq!(config.primary_database(), "dealerships");
    }

    #[test]
    fn test_primary_database_follows_service_kind() {
        let mut config = AppConfig::default();
        config.service.kind = ServiceKind::Reviews;
        assert_eq!(config.primary_database(), "reviews");

        config.service.kind = ServiceKind::DealershipList;
        assert_eq!(config.primary_database(), "dealerships");
    }

    #[test]
    fn test_missing_credentials_are_reported() {
        let mut config = AppConfig::default();
        assert!(config.cloudant_url().is_err());
        assert!(config.api_key().is_err());

        config.cloudant.url = Some(String::new());
        assert!(config.cloudant_url().is_err());

        config.cloudant.url = Some("https://example.cloudant.com".to_string());
        config.cloudant.api_key = Some("secret".to_string());
        assert_eq!(config.cloudant_url().unwrap(), "https://example.cloudant.com");
        assert_eq!(config.api_key().unwrap(), "secret");
    }

    #[test]
    fn test_kinds_deserialize_from_snake_case() {
        let kind: ServiceKind = serde_json::from_str("\"dealership_list\"").unwrap();
        assert_eq!(kind, ServiceKind::DealershipList);
        let backend: Backend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, Backend::Memory);
        let auth: AuthKind = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(auth, AuthKind::None);
    }

    #[test]
    fn test_load_reads_prefixed_env_and_bare_port() {
        let _guard = ENV_LOCK.lock();
        std::env::set_var("DEALER__SERVICE__KIND", "reviews");
        std::env::set_var("DEALER__CLOUDANT__API_KEY", "env-api-key");
        std::env::set_var("PORT", "4321");

        let loaded = AppConfig::load();

        std::env::remove_var("DEALER__SERVICE__KIND");
        std::env::remove_var("DEALER__CLOUDANT__API_KEY");
        std::env::remove_var("PORT");

        let config = loaded.unwrap();
        assert_eq!(config.service.kind, ServiceKind::Reviews);
        assert_eq!(config.api_key().unwrap(), "env-api-key");
        assert_eq!(config.server.port, 4321);
        assert_eq!(config.server_address(), "0.0.0.0:4321");
        assert_eq!(config.primary_database(), "reviews");
    }
}
