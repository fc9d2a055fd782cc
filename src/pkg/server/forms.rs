use std::{collections::HashMap, fmt::Display, str::FromStr};

use axum::{
    extract::{Multipart, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header::ACCEPT},
};
use serde::{Deserialize, Deserializer};
use standard_error::{Interpolate, StandardError, Status};
use validator::Validate;

use crate::{conf::settings, pkg::internal::uploads::Upload, prelude::Result};

/// Form text with surrounding whitespace removed.
pub fn trimmed<'de, D>(deserializer: D) -> core::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// Blank or missing form fields become `None`; anything else must parse.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> core::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

pub fn validated<T: Validate>(input: T) -> Result<T> {
    input.validate().map_err(|e| {
        StandardError::new("ERR-VALIDATION")
            .interpolate_err(e.to_string())
            .code(StatusCode::UNPROCESSABLE_ENTITY)
    })?;
    Ok(input)
}

/// Script clients ask for JSON; plain form posts get redirected back to a page.
pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"))
}

fn bad_multipart(e: MultipartError) -> StandardError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("upload rejected: {}", e.body_text());
        return StandardError::new("ERR-UPLOAD-002")
            .interpolate_err(format!("{} MB", settings.max_upload_bytes / (1024 * 1024)))
            .code(StatusCode::PAYLOAD_TOO_LARGE);
    }
    StandardError::new("ERR-UPLOAD-003")
        .interpolate_err(e.body_text())
        .code(StatusCode::BAD_REQUEST)
}

/// Text fields plus at most one file from a multipart body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<Upload>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// Reads every part; `file_field` is kept as bytes, an empty file part counts as absent.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self> {
        let mut form = MultipartForm::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or("").to_string();
            if name == file_field {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(bad_multipart)?;
                if data.is_empty() {
                    continue;
                }
                tracing::debug!("received {} ({}, {} bytes)", &file_name, &content_type, data.len());
                form.file = Some(Upload {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            } else {
                let value = field.text().await.map_err(bad_multipart)?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        extract::DefaultBodyLimit,
        http::{Request, header::CONTENT_TYPE},
        routing::post,
    };
    use chrono::NaiveDate;
    use serde::Deserialize;
    use tower::ServiceExt;
    use validator::Validate;

    use super::*;

    const BOUNDARY: &str = "archinnection-boundary";

    fn upload_route(limit: usize) -> Router {
        Router::new()
            .route(
                "/upload",
                post(|multipart: Multipart| async move {
                    let form = MultipartForm::read(multipart, "file").await?;
                    Ok::<_, StandardError>(format!(
                        "{} {}",
                        form.text("caption"),
                        form.file.as_ref().map(|f| f.data.len()).unwrap_or(0)
                    ))
                }),
            )
            .layer(DefaultBodyLimit::max(limit))
    }

    fn upload_request(file_bytes: usize) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\nsite plan\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"plan.pdf\"\r\n\
             Content-Type: application/pdf\r\n\r\n{data}\r\n--{b}--\r\n",
            b = BOUNDARY,
            data = "x".repeat(file_bytes)
        );
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_multipart_form_reads_fields_and_file() {
        let response = upload_route(1024 * 1024)
            .oneshot(upload_request(512))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&body[..], b"site plan 512");
    }

    #[tokio::test]
    async fn test_body_over_the_limit_is_payload_too_large() {
        let response = upload_route(256)
            .oneshot(upload_request(4096))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[derive(Deserialize, Validate)]
    struct Sample {
        #[serde(deserialize_with = "trimmed")]
        #[validate(length(min = 2))]
        name: String,
        #[serde(default, deserialize_with = "empty_as_none")]
        until: Option<NaiveDate>,
        #[serde(default, deserialize_with = "empty_as_none")]
        note: Option<String>,
    }

    #[test]
    fn test_blank_fields_become_none() -> core::result::Result<(), serde_json::Error> {
        let s: Sample = serde_json::from_str(r#"{"name": "  Kahn ", "until": "", "note": "   "}"#)?;
        assert_eq!(s.name, "Kahn");
        assert_eq!(s.until, None);
        assert_eq!(s.note, None);
        let s: Sample = serde_json::from_str(r#"{"name": "Kahn", "until": "2020-02-29"}"#)?;
        assert_eq!(s.until, NaiveDate::from_ymd_opt(2020, 2, 29));
        Ok(())
    }

    #[test]
    fn test_wants_json_reads_accept_header() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));
        headers.insert(ACCEPT, "text/html,application/xhtml+xml".parse().unwrap());
        assert!(!wants_json(&headers));
        headers.insert(ACCEPT, "application/json".parse().unwrap());
        assert!(wants_json(&headers));
    }

    #[test]
    fn test_bad_dates_fail_to_deserialize() {
        let s: core::result::Result<Sample, _> =
            serde_json::from_str(r#"{"name": "Kahn", "until": "yesterday"}"#);
        assert!(s.is_err());
    }

    #[test]
    fn test_validation_runs_after_trimming() -> core::result::Result<(), serde_json::Error> {
        let s: Sample = serde_json::from_str(r#"{"name": "  K  "}"#)?;
        assert!(validated(s).is_err());
        let s: Sample = serde_json::from_str(r#"{"name": "Ko"}"#)?;
        assert!(validated(s).is_ok());
        Ok(())
    }
}
