use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub ledger_rpc_url: String,
    pub contract_address: String,
    pub fhe_relayer_url: String,
    pub wallet_address: Option<String>,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let ledger_rpc_url = env_map
            .get("LEDGER_RPC_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("LEDGER_RPC_URL".to_string()))?;

        let contract_address = env_map
            .get("CONTRACT_ADDRESS")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("CONTRACT_ADDRESS".to_string()))?;
        if !contract_address.starts_with("0x") {
            return Err(ConfigError::InvalidValue(
                "CONTRACT_ADDRESS".to_string(),
                "must be a 0x-prefixed hex address".to_string(),
            ));
        }

        let fhe_relayer_url = env_map
            .get("FHE_RELAYER_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("FHE_RELAYER_URL".to_string()))?;

        let wallet_address = match env_map.get("WALLET_ADDRESS") {
            Some(addr) if !addr.starts_with("0x") => {
                return Err(ConfigError::InvalidValue(
                    "WALLET_ADDRESS".to_string(),
                    "must be a 0x-prefixed hex address".to_string(),
                ))
            }
            Some(addr) => Some(addr.clone()),
            None => None,
        };

        let request_timeout_ms = env_map
            .get("REQUEST_TIMEOUT_MS")
            .map(|s| s.as_str())
            .unwrap_or("30000")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "REQUEST_TIMEOUT_MS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        Ok(Config {
            ledger_rpc_url,
            contract_address,
            fhe_relayer_url,
            wallet_address,
            request_timeout_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "LEDGER_RPC_URL".to_string(),
            "http://localhost:8545".to_string(),
        );
        map.insert("CONTRACT_ADDRESS".to_string(), "0xabc123".to_string());
        map.insert(
            "FHE_RELAYER_URL".to_string(),
            "http://localhost:7077".to_string(),
        );
        map
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.ledger_rpc_url, "http://localhost:8545");
        assert_eq!(config.contract_address, "0xabc123");
        assert!(config.wallet_address.is_none());
        assert_eq!(config.request_timeout_ms, 30000);
    }

    #[test]
    fn test_missing_ledger_rpc_url() {
        let mut env_map = setup_required_env();
        env_map.remove("LEDGER_RPC_URL");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "LEDGER_RPC_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_contract_address() {
        let mut env_map = setup_required_env();
        env_map.remove("CONTRACT_ADDRESS");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "CONTRACT_ADDRESS"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_fhe_relayer_url() {
        let mut env_map = setup_required_env();
        env_map.remove("FHE_RELAYER_URL");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "FHE_RELAYER_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_contract_address() {
        let mut env_map = setup_required_env();
        env_map.insert("CONTRACT_ADDRESS".to_string(), "abc123".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "CONTRACT_ADDRESS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_wallet_address() {
        let mut env_map = setup_required_env();
        env_map.insert("WALLET_ADDRESS".to_string(), "not-hex".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "WALLET_ADDRESS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_timeout() {
        let mut env_map = setup_required_env();
        env_map.insert("REQUEST_TIMEOUT_MS".to_string(), "soon".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "REQUEST_TIMEOUT_MS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_wallet_address_accepted() {
        let mut env_map = setup_required_env();
        env_map.insert("WALLET_ADDRESS".to_string(), "0xdef456".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.wallet_address.as_deref(), Some("0xdef456"));
    }
}
