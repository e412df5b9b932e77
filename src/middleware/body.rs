use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::ApiError;

/// Request body decoded from JSON or an urlencoded form, picked by `Content-Type`.
///
/// An empty body, or one with no recognised content type, decodes as `{}`,
/// so handlers whose fields are all optional still run.
#[derive(Debug, Clone)]
pub struct RequestBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for RequestBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mime = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match mime.as_str() {
            "application/x-www-form-urlencoded" => {
                let Form(value) = Form::<T>::from_request(req, state).await?;
                Ok(Self(value))
            }
            "application/json" => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|rejection| ApiError::validation_error(rejection.body_text(), None))?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return empty_object();
                }
                let Json(value) = Json::<T>::from_bytes(&bytes)?;
                Ok(Self(value))
            }
            _ => empty_object(),
        }
    }
}

fn empty_object<T: DeserializeOwned>() -> Result<RequestBody<T>, ApiError> {
    serde_json::from_value(json!({}))
        .map(RequestBody)
        .map_err(|e| ApiError::validation_error(e.to_string(), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Optional {
        name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Required {
        name: String,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = axum::http::Request::builder().method("PATCH").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn extract<T: DeserializeOwned + Send>(req: Request) -> Result<T, ApiError> {
        RequestBody::<T>::from_request(req, &()).await.map(|RequestBody(v)| v)
    }

    #[tokio::test]
    async fn decodes_json() {
        let value: Optional = extract(request(Some("application/json"), r#"{"name":"ada"}"#)).await.unwrap();
        assert_eq!(value.name.as_deref(), Some("ada"));
    }

    #[tokio::test]
    async fn decodes_form_with_charset() {
        let req = request(Some("application/x-www-form-urlencoded; charset=utf-8"), "name=bob");
        let value: Optional = extract(req).await.unwrap();
        assert_eq!(value.name.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn missing_or_empty_body_is_an_empty_object() {
        let value: Optional = extract(request(None, "")).await.unwrap();
        assert_eq!(value, Optional { name: None });

        let value: Optional = extract(request(Some("application/json"), "  ")).await.unwrap();
        assert_eq!(value, Optional { name: None });
    }

    #[tokio::test]
    async fn empty_body_still_enforces_required_fields() {
        let err = extract::<Required>(request(None, "")).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let err = extract::<Optional>(request(Some("application/json"), "{oops")).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
