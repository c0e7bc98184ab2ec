//! Caller parameter extraction and validation.
//!
//! # Responsibilities
//! - Read parameters from the query string first
//! - Fill missing ones from the body: JSON, then form-encoded
//! - Validate `limit`/`page` and `enddate` before any upstream call
//!
//! # Design Decisions
//! - Body parsers are tried in a fixed order; the first that accepts wins
//! - An empty value counts as absent, so the body can fill it
//! - A body that cannot be read or parsed contributes nothing

use std::collections::HashMap;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use serde_json::Value;
use url::form_urlencoded;

use crate::error::{GatewayError, Result};

pub const LIMIT_ERROR: &str = "Limit must be between 1 and 100";
pub const PAGE_ERROR: &str = "Page must be a positive integer";
pub const MISSING_ENDDATE_ERROR: &str = "Missing enddate parameter";
pub const ENDDATE_FORMAT_ERROR: &str = "Invalid enddate format. Must be yyyyMMdd";

const MAX_LIMIT: i64 = 100;

/// Validated parameters of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub search: String,
    pub limit: u32,
    pub page: u32,
}

impl SearchParams {
    pub const FIELDS: [&'static str; 3] = ["search", "limit", "page"];

    pub fn from_source(source: &ParamSource) -> Result<Self> {
        let search = source.get("search").unwrap_or_default().to_string();

        let limit = match source.get("limit") {
            Some(raw) => parse_int(raw)
                .filter(|n| (1..=MAX_LIMIT).contains(n))
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| GatewayError::validation(LIMIT_ERROR))?,
            None => 1,
        };

        let page = match source.get("page") {
            Some(raw) => parse_int(raw)
                .filter(|n| *n >= 1)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| GatewayError::validation(PAGE_ERROR))?,
            None => 1,
        };

        Ok(Self { search, limit, page })
    }
}

/// Validated `enddate` of a detail or view request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnddateParams {
    pub enddate: String,
}

impl EnddateParams {
    pub const FIELDS: [&'static str; 1] = ["enddate"];

    pub fn from_source(source: &ParamSource) -> Result<Self> {
        let enddate = source
            .get("enddate")
            .ok_or_else(|| GatewayError::validation(MISSING_ENDDATE_ERROR))?;

        if enddate.len() != 8 || !enddate.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GatewayError::validation(ENDDATE_FORMAT_ERROR));
        }

        Ok(Self {
            enddate: enddate.to_string(),
        })
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Body decoders, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyParser {
    Json,
    Form,
}

impl BodyParser {
    pub const ORDER: [BodyParser; 2] = [BodyParser::Json, BodyParser::Form];

    /// `None` means this parser does not accept the body.
    pub fn parse(self, body: &[u8]) -> Option<HashMap<String, String>> {
        match self {
            BodyParser::Json => {
                let value: Value = serde_json::from_slice(body).ok()?;
                // Valid JSON that is not an object yields no fields.
                let fields = match value {
                    Value::Object(map) => map
                        .into_iter()
                        .filter_map(|(key, value)| json_scalar(value).map(|v| (key, v)))
                        .collect(),
                    _ => HashMap::new(),
                };
                Some(fields)
            }
            BodyParser::Form => Some(first_values(form_urlencoded::parse(body))),
        }
    }
}

fn json_scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn first_values<'a, I>(pairs: I) -> HashMap<String, String>
where
    I: Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
{
    let mut fields = HashMap::new();
    for (key, value) in pairs {
        fields.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    fields
}

/// Decode a body with the first parser in [`BodyParser::ORDER`] that accepts it.
pub fn parse_body(body: &[u8]) -> HashMap<String, String> {
    BodyParser::ORDER
        .iter()
        .find_map(|parser| parser.parse(body))
        .unwrap_or_default()
}

/// Parameter values from the query string and, when read, the body.
#[derive(Debug, Clone, Default)]
pub struct ParamSource {
    query: HashMap<String, String>,
    body: HashMap<String, String>,
}

impl ParamSource {
    pub fn new(query: Option<&str>, body: Option<&[u8]>) -> Self {
        Self {
            query: query
                .map(|q| first_values(form_urlencoded::parse(q.as_bytes())))
                .unwrap_or_default(),
            body: body.map(parse_body).unwrap_or_default(),
        }
    }

    /// Non-empty value for `name`, query string first.
    pub fn get(&self, name: &str) -> Option<&str> {
        non_empty(&self.query, name).or_else(|| non_empty(&self.body, name))
    }

    fn satisfies(&self, fields: &[&str]) -> bool {
        fields.iter().all(|f| self.get(f).is_some())
    }
}

fn non_empty<'a>(fields: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    fields.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

fn may_have_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Collect `fields` from a request, reading the body only when needed.
pub async fn collect(request: Request<Body>, fields: &[&str], max_body_bytes: usize) -> ParamSource {
    let (parts, body) = request.into_parts();
    let query = parts.uri.query();
    let source = ParamSource::new(query, None);

    if !may_have_body(&parts.method) || source.satisfies(fields) {
        return source;
    }

    match to_bytes(body, max_body_bytes).await {
        Ok(bytes) => ParamSource::new(query, Some(&bytes[..])),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body, ignoring it");
            source
        }
    }
}

/// Extract and validate search parameters.
pub async fn extract_search(request: Request<Body>, max_body_bytes: usize) -> Result<SearchParams> {
    let source = collect(request, &SearchParams::FIELDS, max_body_bytes).await;
    SearchParams::from_source(&source)
}

/// Extract and validate the `enddate` parameter.
pub async fn extract_enddate(request: Request<Body>, max_body_bytes: usize) -> Result<EnddateParams> {
    let source = collect(request, &EnddateParams::FIELDS, max_body_bytes).await;
    EnddateParams::from_source(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(q: &str) -> ParamSource {
        ParamSource::new(Some(q), None)
    }

    fn validation_message(err: GatewayError) -> String {
        match err {
            GatewayError::Validation(message) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_search_defaults() {
        let params = SearchParams::from_source(&ParamSource::default()).unwrap();
        assert_eq!(
            params,
            SearchParams {
                search: String::new(),
                limit: 1,
                page: 1
            }
        );
    }

    #[test]
    fn test_limit_range() {
        assert_eq!(SearchParams::from_source(&query("limit=1")).unwrap().limit, 1);
        assert_eq!(SearchParams::from_source(&query("limit=100")).unwrap().limit, 100);
        assert_eq!(SearchParams::from_source(&query("limit=%2042%20")).unwrap().limit, 42);

        for bad in ["0", "101", "-3", "abc", "2.5", "99999999999999999999"] {
            let err = SearchParams::from_source(&query(&format!("limit={bad}"))).unwrap_err();
            assert_eq!(validation_message(err), LIMIT_ERROR, "limit={bad}");
        }
    }

    #[test]
    fn test_page_must_be_positive() {
        assert_eq!(SearchParams::from_source(&query("page=7")).unwrap().page, 7);

        for bad in ["0", "-1", "x", "4294967296"] {
            let err = SearchParams::from_source(&query(&format!("page={bad}"))).unwrap_err();
            assert_eq!(validation_message(err), PAGE_ERROR, "page={bad}");
        }
    }

    #[test]
    fn test_limit_checked_before_page() {
        let err = SearchParams::from_source(&query("limit=0&page=0")).unwrap_err();
        assert_eq!(validation_message(err), LIMIT_ERROR);
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let params = SearchParams::from_source(&query("search=&limit=&page=")).unwrap();
        assert_eq!((params.limit, params.page), (1, 1));
    }

    #[test]
    fn test_enddate_rules() {
        assert_eq!(
            EnddateParams::from_source(&query("enddate=20240101")).unwrap().enddate,
            "20240101"
        );

        for missing in ["", "enddate=", "other=1"] {
            let err = EnddateParams::from_source(&query(missing)).unwrap_err();
            assert_eq!(validation_message(err), MISSING_ENDDATE_ERROR);
        }

        for bad in ["2024011", "202401011", "2024-01-1", "abcdefgh", "%EF%BC%9120240101"] {
            let err = EnddateParams::from_source(&query(&format!("enddate={bad}"))).unwrap_err();
            assert_eq!(validation_message(err), ENDDATE_FORMAT_ERROR, "enddate={bad}");
        }
    }

    #[test]
    fn test_query_wins_over_body() {
        let source = ParamSource::new(
            Some("search=cat&limit="),
            Some(br#"{"search":"dog","limit":5,"page":"3"}"#),
        );
        assert_eq!(source.get("search"), Some("cat"));
        assert_eq!(source.get("limit"), Some("5"));
        assert_eq!(source.get("page"), Some("3"));
    }

    #[test]
    fn test_json_parser_is_tried_first() {
        assert_eq!(BodyParser::ORDER, [BodyParser::Json, BodyParser::Form]);

        // A JSON string body is accepted by the JSON parser, so form parsing
        // never sees it.
        let fields = parse_body(br#""enddate=20240101""#);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_form_fallback() {
        let fields = parse_body(b"enddate=20240101&enddate=19990101&limit=3");
        assert_eq!(fields.get("enddate").map(String::as_str), Some("20240101"));
        assert_eq!(fields.get("limit").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_json_non_scalars_are_absent() {
        let fields = parse_body(br#"{"enddate":null,"search":["a"],"page":true}"#);
        assert_eq!(fields.get("enddate"), None);
        assert_eq!(fields.get("search"), None);
        assert_eq!(fields.get("page").map(String::as_str), Some("true"));
    }

    #[tokio::test]
    async fn test_get_body_is_ignored() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/detail")
            .body(Body::from(r#"{"enddate":"20240101"}"#))
            .unwrap();

        let err = extract_enddate(request, 1024).await.unwrap_err();
        assert_eq!(validation_message(err), MISSING_ENDDATE_ERROR);
    }

    #[tokio::test]
    async fn test_post_form_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/search?page=2")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("search=sunset&limit=10&page=9"))
            .unwrap();

        let params = extract_search(request, 1024).await.unwrap();
        assert_eq!(
            params,
            SearchParams {
                search: "sunset".into(),
                limit: 10,
                page: 2
            }
        );
    }

    #[tokio::test]
    async fn test_oversized_body_is_treated_as_absent() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/view")
            .body(Body::from(r#"{"enddate":"20240101"}"#))
            .unwrap();

        let err = extract_enddate(request, 4).await.unwrap_err();
        assert_eq!(validation_message(err), MISSING_ENDDATE_ERROR);
    }
}
