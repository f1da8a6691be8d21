use crate::error::{DakaError, Result};
use crate::models::{FormState, UserConfig};
use chrono::{Local, Utc};
use serde_json::Value;

/// Builds the submission payload: previous state, the fresh submission
/// `id`, the user's identity fields, today's date, and the fixed policy
/// flags, applied in that order. Overrides supplied later through
/// `DakaClient::set_info` win over everything here.
pub fn build_payload(old_info: FormState, id: Value, user: &UserConfig) -> Result<FormState> {
    let mut info = old_info;

    info.insert("id".to_string(), id);
    info.insert(
        "name".to_string(),
        Value::String(user.specified.name.clone()),
    );
    info.insert("number".to_string(), Value::String(user.username.clone()));
    info.insert("date".to_string(), Value::String(today()));
    info.insert("created".to_string(), Value::from(Utc::now().timestamp()));
    info.insert(
        "address".to_string(),
        Value::String(user.specified.address.clone()),
    );

    let (province, city) = split_area(&user.specified.area)?;
    info.insert(
        "area".to_string(),
        Value::String(user.specified.area.clone()),
    );
    info.insert("province".to_string(), Value::String(province.to_string()));
    info.insert("city".to_string(), Value::String(city.to_string()));

    // Form fields the portal added over time; values are fixed policy:
    // apply for the Hangzhou health card (green) and confirm truthfulness.
    info.insert("jrdqtlqk[]".to_string(), Value::from(0));
    info.insert("jrdqjcqk[]".to_string(), Value::from(0));
    info.insert("sfsqhzjkk".to_string(), Value::from(1));
    info.insert("sqhzjkkys".to_string(), Value::from(1));
    info.insert("sfqrxxss".to_string(), Value::from(1));
    info.insert("jcqzrq".to_string(), Value::String(String::new()));
    info.insert("gwszdd".to_string(), Value::String(String::new()));
    info.insert("szgjcs".to_string(), Value::String(String::new()));

    Ok(info)
}

/// Splits an `area` string into its province and city halves. The payload
/// cannot be built without both, so a missing separator fails here rather
/// than as an opaque server-side rejection.
pub fn split_area(area: &str) -> Result<(&str, &str)> {
    let mut parts = area.split(' ');
    let province = parts.next().unwrap_or_default();
    let city = parts
        .next()
        .ok_or_else(|| DakaError::AreaFormat(area.to_string()))?;
    Ok((province, city))
}

fn today() -> String {
    Local::now().format("%Y%m%d").to_string()
}
