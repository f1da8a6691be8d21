use crate::error::Result;
use crate::models::UserConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level configuration, loaded once before the user loop starts.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Outbound mail relay shared by all users' reports.
    pub email: EmailServerConfig,
    /// Portal endpoints; override only when pointing at a test server.
    #[serde(default)]
    pub portal: PortalConfig,
    /// Durable append-only log shared across runs.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Accounts to check in, in processing order.
    pub users: Vec<UserConfig>,
}

/// Outbound mail relay settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailServerConfig {
    pub from_email: String,
    /// SMTP auth code (most Chinese providers issue these instead of the
    /// account password).
    pub authcode: String,
    pub host: String,
}

/// The four portal URLs the client talks to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub login_url: String,
    pub pubkey_url: String,
    pub base_url: String,
    pub save_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: "https://zjuam.zju.edu.cn/cas/login?service=https%3A%2F%2Fhealthreport.zju.edu.cn%2Fa_zju%2Fapi%2Fsso%2Findex%3Fredirect%3Dhttps%253A%252F%252Fhealthreport.zju.edu.cn%252Fncov%252Fwap%252Fdefault%252Findex".to_string(),
            pubkey_url: "https://zjuam.zju.edu.cn/cas/v2/getPubKey".to_string(),
            base_url: "https://healthreport.zju.edu.cn/ncov/wap/default/index".to_string(),
            save_url: "https://healthreport.zju.edu.cn/ncov/wap/default/save".to_string(),
        }
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from("clock-in.log")
}

impl Settings {
    /// Loads settings from an optional `daka.{toml,json,yaml}` file in the
    /// working directory, overlaid with `DAKA_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("daka").required(false))
            .add_source(config::Environment::with_prefix("DAKA").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
