use std::path::Path;

use crate::errors::{QrShortenError, Result};

use super::AppConfig;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀，例如 `QS__AUTH__JWT_SECRET`
pub const ENV_PREFIX: &str = "QS";

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML 文件 > 默认值
    /// ENV 前缀：QS，分隔符：__
    /// 示例：QS__SERVER__PORT=9999
    ///
    /// The result is validated before it is returned.
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("oauth.scopes")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| QrShortenError::config(format!("Failed to build config: {}", e)))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| QrShortenError::config(format!("Failed to deserialize config: {}", e)))?;

        if Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }

        config.validate()?;
        Ok(config)
    }

    /// 校验启动所必需的配置项
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(QrShortenError::config(
                "auth.jwt_secret must be set (QS__AUTH__JWT_SECRET)",
            ));
        }
        if self.auth.token_ttl_hours == 0 {
            return Err(QrShortenError::config(
                "auth.token_ttl_hours must be greater than zero",
            ));
        }
        if self.links.code_length == 0 {
            return Err(QrShortenError::config(
                "links.code_length must be greater than zero",
            ));
        }
        if self.links.max_code_attempts == 0 {
            return Err(QrShortenError::config(
                "links.max_code_attempts must be greater than zero",
            ));
        }
        if self.image_host.enabled && self.image_host.upload_url.trim().is_empty() {
            return Err(QrShortenError::config(
                "image_host.upload_url is required when image_host.enabled = true",
            ));
        }
        Ok(())
    }

    /// `base_url` 去掉结尾的 `/`
    pub fn public_base_url(&self) -> &str {
        self.server.base_url.trim_end_matches('/')
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let mut sample = Self::default();
        sample.auth.jwt_secret = "change-me".to_string();
        toml::to_string_pretty(&sample)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}
