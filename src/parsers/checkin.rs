use crate::error::{DakaError, Result};
use crate::models::FormState;
use regex::Regex;
use std::sync::LazyLock;

// The check-in page inlines its state as JavaScript literals; both blobs
// sit on a single line inside a <script> block.
static OLD_INFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"oldInfo: (\{[^\n]+\})").unwrap());
static DEF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"def = (\{[^\n]+\})").unwrap());

/// The single fragile primitive: pull the first capture of `re` out of the
/// raw page markup. Everything else in this module is plain JSON handling,
/// so an upstream markup change only ever breaks this seam.
fn extract_embedded_json<'a>(html: &'a str, re: &Regex) -> Option<&'a str> {
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The previous submission state (`oldInfo: {...}`). Absence is not an
/// error; first-time accounts simply have no cached submission and the
/// caller falls back to the compiled-in default.
pub fn parse_old_info(html: &str) -> Result<Option<FormState>> {
    match extract_embedded_json(html, &OLD_INFO_RE) {
        Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
        None => Ok(None),
    }
}

/// The session-bound identifiers (`def = {...}`). Required: this object
/// carries the submission `id` the portal expects back.
pub fn parse_def(html: &str) -> Result<FormState> {
    let raw =
        extract_embedded_json(html, &DEF_RE).ok_or(DakaError::PatternNotFound("def = {...}"))?;
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <script>
        var vm = new Vue({
            data: {
                oldInfo: {"a":1,"sfzx":1},
                def = {"id":"X","uid":"42"},
            }
        });
        </script>
    "#;

    #[test]
    fn extracts_both_blobs() {
        let old_info = parse_old_info(PAGE).unwrap().unwrap();
        assert_eq!(old_info.get("a"), Some(&serde_json::json!(1)));

        let def = parse_def(PAGE).unwrap();
        assert_eq!(def.get("id"), Some(&serde_json::json!("X")));
    }

    #[test]
    fn missing_old_info_is_not_an_error() {
        let html = r#"<script>def = {"id":"X"}</script>"#;
        assert!(parse_old_info(html).unwrap().is_none());
        assert_eq!(
            parse_def(html).unwrap().get("id"),
            Some(&serde_json::json!("X"))
        );
    }

    #[test]
    fn missing_def_is_pattern_not_found() {
        let html = r#"<script>oldInfo: {"a":1}</script>"#;
        assert!(matches!(
            parse_def(html),
            Err(DakaError::PatternNotFound(_))
        ));
    }

    #[test]
    fn malformed_def_is_decode_error() {
        let html = r#"<script>def = {not valid json}</script>"#;
        assert!(matches!(parse_def(html), Err(DakaError::Decode(_))));
    }

    #[test]
    fn malformed_old_info_is_decode_error() {
        let html = r#"<script>oldInfo: {broken}</script>"#;
        assert!(matches!(parse_old_info(html), Err(DakaError::Decode(_))));
    }
}
