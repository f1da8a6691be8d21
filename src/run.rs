use crate::client::DakaClient;
use crate::config::Settings;
use crate::error::Result;
use crate::models::{FormState, UserConfig};
use crate::reporter::{Notifier, RunLog};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Runs the whole check-in sequence for one user. Never propagates: any
/// failure ends up in the run log (and therefore in a failure email) so
/// the caller can move on to the next user.
pub async fn run_user(settings: &Settings, notifier: Arc<dyn Notifier>, user: &UserConfig) {
    info!(user = %user.label, "starting check-in run");

    let mut log = match RunLog::start(&settings.log_file, notifier, &user.to_email).await {
        Ok(log) => log,
        Err(err) => {
            error!(user = %user.label, error = %err, "could not open the run log");
            return;
        }
    };

    if let Err(err) = drive(settings, &mut log, user).await {
        // Something escaped the staged handling below (log file I/O, a
        // failed mail send). Trace it and make sure a failure report still
        // goes out if none has.
        error!(user = %user.label, error = %err, "check-in run aborted");
        if let Err(err) = log.error(&err.to_string()).await {
            error!(user = %user.label, error = %err, "failure report could not be delivered");
        }
    }
}

/// The fixed per-user sequence. Stage failures are logged (which mails)
/// and end the run early with `Ok`; only failures of the logging itself
/// bubble up to `run_user`.
async fn drive(settings: &Settings, log: &mut RunLog, user: &UserConfig) -> Result<()> {
    let mut client = DakaClient::new(user.clone(), settings.portal.clone());

    log.debug("----------开始打卡流程----------").await?;
    log.info("打卡任务启动").await?;

    log.info("登录到浙大统一身份认证平台...").await?;
    if let Err(err) = client.login().await {
        log.error(&err.to_string()).await?;
        return Ok(());
    }
    log.info("已登录到浙大统一身份认证平台").await?;

    log.info("正在获取个人信息...").await?;
    match client.get_info(None).await {
        Ok(_) => client.set_info(user.specified.as_overrides()),
        Err(err) => {
            log.error(&format!("获取信息失败，请手动打卡，更多信息: {err}"))
                .await?;
            return Ok(());
        }
    }
    log.info(&format!(
        "{} {}同学, 你好~",
        user.username, user.specified.name
    ))
    .await?;
    log.debug("一阶段完毕，准备提交").await?;

    match client.post().await {
        Ok(res) if res.is_success() => log.info("已为您打卡成功！").await?,
        Ok(res) => log.warning(&res.m).await?,
        Err(_) => {
            log.error("数据提交失败").await?;
            return Ok(());
        }
    }

    if let Some(info) = client.info() {
        log.info(&detail_block(info)).await?;
    }

    log.end_with_success().await?;
    log.debug("二阶段完毕，已发送通知").await
}

/// Human-readable recap appended to the success report, rendered from the
/// payload as submitted (overrides included).
fn detail_block(info: &FormState) -> String {
    let text = |key: &str| -> String {
        info.get(key)
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default()
    };

    let applied = match info.get("sfsqhzjkk").map(truthy) {
        Some(true) => "是",
        _ => "否",
    };
    let color = match info.get("sqhzjkkys").and_then(Value::as_i64) {
        Some(1) => "绿色",
        Some(2) => "红色",
        _ => "黄色",
    };

    format!(
        "-------------------------\n\
         detailed info:\n\
         地址: {} | {}\n\
         是否申请杭州健康卡: {}\n\
         杭州健康码颜色: {}\n",
        text("address"),
        text("area"),
        applied,
        color,
    )
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(true),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Null => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_block_renders_flags_and_color() {
        let mut info = FormState::new();
        info.insert("address".to_string(), json!("余杭塘路866号"));
        info.insert("area".to_string(), json!("浙江 杭州"));
        info.insert("sfsqhzjkk".to_string(), json!(1));
        info.insert("sqhzjkkys".to_string(), json!(1));

        let block = detail_block(&info);
        assert!(block.contains("地址: 余杭塘路866号 | 浙江 杭州"));
        assert!(block.contains("是否申请杭州健康卡: 是"));
        assert!(block.contains("杭州健康码颜色: 绿色"));
    }

    #[test]
    fn detail_block_handles_string_flags() {
        let mut info = FormState::new();
        info.insert("sfsqhzjkk".to_string(), json!("0"));
        info.insert("sqhzjkkys".to_string(), json!(2));

        let block = detail_block(&info);
        assert!(block.contains("是否申请杭州健康卡: 否"));
        assert!(block.contains("杭州健康码颜色: 红色"));
    }
}
