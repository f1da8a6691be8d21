// tests/session_test.rs

use daka_core::{DakaClient, DakaError, PortalConfig, SpecifiedInfo, UserConfig};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODULUS: &str = "b87e9e5a33b7df2c934ad0f83f5b1d70a4a1c0d8e2b65f7d1c3a9e8f0b2d4c6a\
                       8e0f1a3c5b7d9e1f2a4c6e8d0b3f5a7c9e1d3b5f7a9c0e2d4f6a8c0b2e4d6f91";

const LOGIN_PAGE: &str = r#"<html><body><form id="fm1">
    <input type="hidden" name="execution" value="e1s1"/>
    <input type="hidden" name="_eventId" value="submit"/>
</form></body></html>"#;

const HOME_PAGE: &str = r#"<html><script>
    oldInfo: {"sfzx":1,"szgj":""},
    def = {"id":"20260805","uid":"42"},
</script></html>"#;

fn portal(server: &MockServer) -> PortalConfig {
    PortalConfig {
        login_url: format!("{}/cas/login", server.uri()),
        pubkey_url: format!("{}/cas/v2/getPubKey", server.uri()),
        base_url: format!("{}/ncov/wap/default/index", server.uri()),
        save_url: format!("{}/ncov/wap/default/save", server.uri()),
    }
}

fn user() -> UserConfig {
    UserConfig {
        label: "alice".to_string(),
        username: "3190100001".to_string(),
        password: "hunter2".to_string(),
        to_email: "alice@example.com".to_string(),
        specified: SpecifiedInfo {
            name: "张三".to_string(),
            address: "浙江省杭州市西湖区余杭塘路866号".to_string(),
            area: "浙江 杭州".to_string(),
        },
    }
}

async fn mount_login_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cas/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cas/v2/getPubKey"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "modulus": MODULUS,
            "exponent": "10001",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_posts_credentials_and_replays_the_session_cookie() {
    let server = MockServer::start().await;
    mount_login_pages(&server).await;

    Mock::given(method("POST"))
        .and(path("/cas/login"))
        .and(body_string_contains("username=3190100001"))
        .and(body_string_contains("execution=e1s1"))
        .and(body_string_contains("_eventId=submit"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "iPlanetDirectoryPro=tok123; Path=/")
                .set_body_string("<html>redirecting...</html>"),
        )
        .mount(&server)
        .await;

    // The home page only answers when the login cookie comes back.
    Mock::given(method("GET"))
        .and(path("/ncov/wap/default/index"))
        .and(header("cookie", "iPlanetDirectoryPro=tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HOME_PAGE))
        .mount(&server)
        .await;

    let mut client = DakaClient::new(user(), portal(&server));
    client.login().await.expect("login should succeed");

    let payload = client.get_info(None).await.expect("home fetch should succeed");
    assert_eq!(payload.get("id"), Some(&serde_json::json!("20260805")));
}

#[tokio::test]
async fn banner_in_the_login_response_means_bad_credentials() {
    let server = MockServer::start().await;
    mount_login_pages(&server).await;

    Mock::given(method("POST"))
        .and(path("/cas/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><title>统一身份认证</title>密码错误</html>"),
        )
        .mount(&server)
        .await;

    let client = DakaClient::new(user(), portal(&server));
    assert!(matches!(client.login().await, Err(DakaError::LoginFailed)));
}

#[tokio::test]
async fn missing_execution_token_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cas/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = DakaClient::new(user(), portal(&server));
    assert!(matches!(
        client.login().await,
        Err(DakaError::TokenNotFound)
    ));
}

#[tokio::test]
async fn submit_returns_the_server_verdict_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ncov/wap/default/save"))
        .and(body_string_contains("number=3190100001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "e": 0,
            "m": "",
        })))
        .mount(&server)
        .await;

    let mut client = DakaClient::new(user(), portal(&server));
    client
        .get_info(Some(HOME_PAGE.to_string()))
        .await
        .expect("payload should build from supplied html");

    let res = client.post().await.expect("submit should succeed");
    assert!(res.is_success());
}

#[tokio::test]
async fn soft_rejection_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ncov/wap/default/save"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "e": 1,
            "m": "今日已提交",
        })))
        .mount(&server)
        .await;

    let mut client = DakaClient::new(user(), portal(&server));
    client.get_info(Some(HOME_PAGE.to_string())).await.unwrap();

    let res = client.post().await.expect("transport-level success");
    assert!(!res.is_success());
    assert_eq!(res.m, "今日已提交");
}

#[tokio::test]
async fn posting_before_get_info_is_an_error() {
    let server = MockServer::start().await;
    let client = DakaClient::new(user(), portal(&server));
    assert!(matches!(
        client.post().await,
        Err(DakaError::InfoNotFetched)
    ));
}
