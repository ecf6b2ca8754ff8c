use s3g_core::{Result, S3StoreConfig, S3gError};
use std::fmt;

pub const GRPC_LISTEN_ADDR_KEY: &str = "GRPC_LISTEN_ADDR";
pub const HTTP_LISTEN_ADDR_KEY: &str = "HTTP_LISTEN_ADDR";
pub const S3_ADDR_KEY: &str = "S3_ADDR";
pub const S3_ACCESS_TOKEN_KEY: &str = "S3_ACCESS_TOKEN";
pub const S3_ACCESS_KEY_KEY: &str = "S3_ACCESS_KEY";
pub const S3_BUCKET_NAME_KEY: &str = "S3_BUCKET_NAME";
pub const S3_REGION_KEY: &str = "S3_REGION";
pub const S3_SECURE_KEY: &str = "S3_SECURE";

const REQUIRED_KEYS: [&str; 6] = [
    GRPC_LISTEN_ADDR_KEY,
    HTTP_LISTEN_ADDR_KEY,
    S3_ADDR_KEY,
    S3_ACCESS_TOKEN_KEY,
    S3_ACCESS_KEY_KEY,
    S3_BUCKET_NAME_KEY,
];

const DEFAULT_S3_REGION: &str = "us-east-1";

#[derive(Clone)]
pub struct Config {
    pub grpc_listen_addr: String,
    pub http_listen_addr: String,
    pub s3_addr: String,
    /// Secret half of the S3 credentials.
    pub s3_access_token: String,
    /// Access key id.
    pub s3_access_key: String,
    pub s3_bucket_name: String,
    pub s3_region: String,
    pub s3_secure: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("grpc_listen_addr", &self.grpc_listen_addr)
            .field("http_listen_addr", &self.http_listen_addr)
            .field("s3_addr", &self.s3_addr)
            .field("s3_access_token", &"<redacted>")
            .field("s3_access_key", &self.s3_access_key)
            .field("s3_bucket_name", &self.s3_bucket_name)
            .field("s3_region", &self.s3_region)
            .field("s3_secure", &self.s3_secure)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_environment(::config::Environment::default())
    }

    #[cfg(test)]
    pub fn from_vars(vars: std::collections::HashMap<String, String>) -> Result<Self> {
        Self::from_environment(::config::Environment::default().source(Some(vars)))
    }

    fn from_environment(environment: ::config::Environment) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(environment)
            .build()
            .map_err(|e| S3gError::Config(e.to_string()))?;

        let lookup = |key: &str| -> Option<String> {
            settings
                .get_string(&key.to_lowercase())
                .ok()
                .filter(|value| !value.trim().is_empty())
        };

        for key in REQUIRED_KEYS {
            if lookup(key).is_none() {
                return Err(S3gError::MissingConfig(key.to_string()));
            }
        }

        let required =
            |key: &str| lookup(key).ok_or_else(|| S3gError::MissingConfig(key.to_string()));

        let s3_secure = match lookup(S3_SECURE_KEY) {
            Some(_) => settings
                .get_bool(&S3_SECURE_KEY.to_lowercase())
                .map_err(|e| S3gError::Config(format!("{}: {}", S3_SECURE_KEY, e)))?,
            None => false,
        };

        Ok(Config {
            grpc_listen_addr: normalize_listen_addr(&required(GRPC_LISTEN_ADDR_KEY)?),
            http_listen_addr: normalize_listen_addr(&required(HTTP_LISTEN_ADDR_KEY)?),
            s3_addr: required(S3_ADDR_KEY)?,
            s3_access_token: required(S3_ACCESS_TOKEN_KEY)?,
            s3_access_key: required(S3_ACCESS_KEY_KEY)?,
            s3_bucket_name: required(S3_BUCKET_NAME_KEY)?,
            s3_region: lookup(S3_REGION_KEY).unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            s3_secure,
        })
    }

    pub fn s3_store_config(&self) -> S3StoreConfig {
        S3StoreConfig {
            endpoint: S3StoreConfig::endpoint_from_addr(&self.s3_addr, self.s3_secure),
            region: self.s3_region.clone(),
            access_key_id: self.s3_access_key.clone(),
            secret_access_key: self.s3_access_token.clone(),
        }
    }
}

/// Accepts the bare `:port` form and binds it on all interfaces.
pub fn normalize_listen_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_vars() -> HashMap<String, String> {
        [
            (GRPC_LISTEN_ADDR_KEY, ":9090"),
            (HTTP_LISTEN_ADDR_KEY, "127.0.0.1:8082"),
            (S3_ADDR_KEY, "minio:9000"),
            (S3_ACCESS_TOKEN_KEY, "secret"),
            (S3_ACCESS_KEY_KEY, "access"),
            (S3_BUCKET_NAME_KEY, "images"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_config_from_vars() {
        let config = Config::from_vars(full_vars()).unwrap();

        assert_eq!(config.grpc_listen_addr, "0.0.0.0:9090");
        assert_eq!(config.http_listen_addr, "127.0.0.1:8082");
        assert_eq!(config.s3_addr, "minio:9000");
        assert_eq!(config.s3_bucket_name, "images");
        assert_eq!(config.s3_region, DEFAULT_S3_REGION);
        assert!(!config.s3_secure);

        let store = config.s3_store_config();
        assert_eq!(store.endpoint, "http://minio:9000");
        assert_eq!(store.access_key_id, "access");
        assert_eq!(store.secret_access_key, "secret");
    }

    #[test]
    fn test_each_required_key_is_enforced() {
        for key in REQUIRED_KEYS {
            let mut vars = full_vars();
            vars.remove(key);

            match Config::from_vars(vars) {
                Err(S3gError::MissingConfig(missing)) => assert_eq!(missing, key),
                other => panic!("expected missing {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut vars = full_vars();
        vars.insert(S3_BUCKET_NAME_KEY.to_string(), "  ".to_string());

        let err = Config::from_vars(vars).unwrap_err();
        assert_eq!(err.to_string(), "missing key S3_BUCKET_NAME in env");
    }

    #[test]
    fn test_optional_keys() {
        let mut vars = full_vars();
        vars.insert(S3_REGION_KEY.to_string(), "eu-west-1".to_string());
        vars.insert(S3_SECURE_KEY.to_string(), "true".to_string());

        let config = Config::from_vars(vars).unwrap();
        assert_eq!(config.s3_region, "eu-west-1");
        assert!(config.s3_secure);
        assert_eq!(config.s3_store_config().endpoint, "https://minio:9000");

        let mut vars = full_vars();
        vars.insert(S3_SECURE_KEY.to_string(), "maybe".to_string());
        assert!(matches!(Config::from_vars(vars), Err(S3gError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config::from_vars(full_vars()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_normalize_listen_addr() {
        assert_eq!(normalize_listen_addr(":8082"), "0.0.0.0:8082");
        assert_eq!(normalize_listen_addr("127.0.0.1:9090"), "127.0.0.1:9090");
    }
}
