use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// The check-in submission payload: form field name -> value.
///
/// Values keep whatever JSON type the portal embedded them with (the
/// endpoint accepts numbers and strings interchangeably).
pub type FormState = Map<String, Value>;

/// Per-user display info merged into the payload and re-applied as overrides.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpecifiedInfo {
    /// Display name submitted in the `name` field.
    pub name: String,
    /// Free-text current address.
    pub address: String,
    /// "province city" with a single space separator, e.g. "浙江 杭州".
    pub area: String,
}

impl SpecifiedInfo {
    /// The override mapping handed to `DakaClient::set_info` after the
    /// payload has been built.
    pub fn as_overrides(&self) -> FormState {
        let mut overrides = FormState::new();
        overrides.insert("name".to_string(), Value::String(self.name.clone()));
        overrides.insert("address".to_string(), Value::String(self.address.clone()));
        overrides.insert("area".to_string(), Value::String(self.area.clone()));
        overrides
    }
}

/// One configured account. Configuration order is processing order.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserConfig {
    /// Human label for this account, used in diagnostics only.
    pub label: String,
    /// The platform account number (学号).
    pub username: String,
    /// The platform password, encrypted on the fly at login.
    pub password: String,
    /// Where this user's run report is mailed.
    pub to_email: String,
    /// Name/address/area applied to the payload.
    pub specified: SpecifiedInfo,
}

/// The `{modulus, exponent}` pair served by the CAS public-key endpoint,
/// both as hex strings.
#[derive(Debug, Deserialize, Clone)]
pub struct PubKey {
    pub modulus: String,
    pub exponent: String,
}

/// The JSON body returned by the submit endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct SubmitResponse {
    /// Result code; `"0"` means accepted. Arrives as a number or a string
    /// depending on the portal's mood.
    #[serde(default)]
    pub e: Value,
    /// Server-side message, meaningful on soft rejection.
    #[serde(default)]
    pub m: String,
    #[serde(flatten)]
    pub extra: FormState,
}

impl SubmitResponse {
    /// Normalizes `e` to a string so `0` and `"0"` compare equal.
    pub fn code(&self) -> String {
        match &self.e {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code() == "0"
    }
}

/// Outcome of one user's run, mapped to the mail subject and body marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn desc(&self) -> &'static str {
        match self {
            RunStatus::Success => "成功",
            RunStatus::Failure => "失败",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RunStatus::Success => "✔",
            RunStatus::Failure => "❌",
        }
    }
}

/// Fallback previous-submission state used when the check-in page carries
/// no `oldInfo` blob (an account that never checked in manually).
///
/// Every identity, date, and policy field in here is overwritten by the
/// payload builder; only the symptom/travel flags survive as-is.
pub fn default_old_info() -> FormState {
    let value = json!({
        "ismoved": 0,
        "jhfjrq": "",
        "jhfjjtgj": "",
        "jhfjhbcc": "",
        "sfxk": 0,
        "xkqy": "",
        "szgj": "",
        "zgfx14rfhsj": "",
        "sfzx": 1,
        "sfjcbh": 0,
        "sfcyglq": 0,
        "gllx": "",
        "glksrq": "",
        "sfcxtz": 0,
        "sfjcwhry": 0,
        "sfcxzysx": 0,
        "qksm": "",
        "remark": "",
        "sfyyjc": 0,
        "jcjgqr": 0,
        "jcjg": "",
        "sfjchbry": 0,
        "sfjcqz": "",
        "jcwhryfs": "",
        "jchbryfs": "",
        "uid": "",
        "date": "",
        "created": ""
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!("the fallback literal is an object"),
    }
}
