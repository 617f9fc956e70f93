//! 应用配置
//!
//! TOML 文件 + `PETCARE__` 前缀环境变量分层加载，环境变量优先。

use serde::{Deserialize, Serialize};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("配置验证失败: {0}")]
    Validation(String),
    #[error("配置解析失败: {0}")]
    Parse(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sweep: SweepConfig,
    pub telegram: TelegramConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// 提醒扫描周期，观察值为10秒
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    /// 通常经由 PETCARE__TELEGRAM__BOT_TOKEN 注入
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// HTTP邮件网关地址，为空则邮件通道视为未配置
    pub gateway_url: String,
    pub from_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            sweep: SweepConfig::default(),
            telegram: TelegramConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:petcare.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 10,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            from_address: "petcare@localhost".to_string(),
        }
    }
}

impl AppConfig {
    /// 加载配置：文件可缺省，环境变量覆盖文件
    pub fn load(config_path: &str) -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("PETCARE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Validation(
                "database.url 不能为空".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections 必须大于0".to_string(),
            ));
        }
        if self.sweep.interval_seconds == 0 {
            return Err(ConfigError::Validation(
                "sweep.interval_seconds 必须大于0".to_string(),
            ));
        }
        if self.telegram.api_base.is_empty() {
            return Err(ConfigError::Validation(
                "telegram.api_base 不能为空".to_string(),
            ));
        }
        if !self.email.from_address.contains('@') {
            return Err(ConfigError::Validation(
                "email.from_address 不是有效的邮件地址".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sweep.interval_seconds, 10);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    }

    #[test]
    fn zero_interval_fails_validation() {
        let mut config = AppConfig::default();
        config.sweep.interval_seconds = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("interval_seconds")
        ));
    }

    #[test]
    fn bad_from_address_fails_validation() {
        let mut config = AppConfig::default();
        config.email.from_address = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("/nonexistent/petcare.toml").unwrap();
        assert_eq!(config.sweep.interval_seconds, 10);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[sweep]\ninterval_seconds = 30\n\n[database]\nurl = \"sqlite:/tmp/test.db\"\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.sweep.interval_seconds, 30);
        assert_eq!(config.database.url, "sqlite:/tmp/test.db");
        // 未覆盖的字段保持默认值
        assert_eq!(config.email.from_address, "petcare@localhost");
    }
}
