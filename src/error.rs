use thiserror::Error;

#[derive(Error, Debug)]
pub enum DakaError {
    #[error("Request to the portal failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("登录失败，请核实账号密码重新登录")]
    LoginFailed,

    #[error("Could not find the execution token on the login page")]
    TokenNotFound,

    #[error("Relative info not found in html with regex: {0}")]
    PatternNotFound(&'static str),

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Embedded `{0}` object is missing the `{1}` field")]
    FieldMissing(&'static str, &'static str),

    #[error("Invalid public key material: {0}")]
    PubKey(String),

    #[error("Area must look like \"省 市\" (single space), got `{0}`")]
    AreaFormat(String),

    #[error("Check-in info has not been fetched yet")]
    InfoNotFetched,

    #[error("Log file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Invalid mail address: {0}")]
    MailAddress(#[from] lettre::address::AddressError),

    #[error("Could not build mail message: {0}")]
    Mail(#[from] lettre::error::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, DakaError>;
