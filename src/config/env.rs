use crate::config::toml_config::ServiceConfig;
use crate::utils::error::{Result, ScoutError};
use std::env;

/// 部署環境常用的環境變數覆蓋
pub const PORT_VAR: &str = "PORT";
pub const BIND_VAR: &str = "SCOUT_BIND";
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

impl ServiceConfig {
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_VAR) {
            self.server.port =
                port.trim()
                    .parse()
                    .map_err(|_| ScoutError::InvalidConfigValueError {
                        field: PORT_VAR.to_string(),
                        value: port.clone(),
                        reason: "PORT must be a number between 0 and 65535".to_string(),
                    })?;
        }

        if let Some(bind) = lookup(BIND_VAR).filter(|b| !b.trim().is_empty()) {
            self.server.bind = bind;
        }

        // 設定檔沒有 key 時才從環境變數補上
        if self.providers.gemini.api_key.is_none() {
            self.providers.gemini.api_key = lookup(GEMINI_KEY_VAR).filter(|k| !k.trim().is_empty());
        }

        Ok(())
    }
}
