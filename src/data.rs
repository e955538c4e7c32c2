//! Per-request client for the hosted data API (PostgREST).

use crate::error::UpstreamError;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Bound to one request: authorizes as the signed-in user, or as the anon
/// role when there is no session.
#[derive(Debug, Clone)]
pub struct DataClient {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
    bearer: String,
}

/// An upstream response reduced to what may reach the browser.
#[derive(Debug)]
pub struct Relayed {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: axum::body::Bytes,
}

pub fn filter_serialized_response_headers(name: &str) -> bool {
    crate::hang::SERIALIZED_RESPONSE_HEADERS.contains(&name)
}

fn serialized_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in upstream {
        if filter_serialized_response_headers(name.as_str()) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

impl DataClient {
    pub fn new(http: reqwest::Client, rest_url: String, anon_key: String, bearer: String) -> Self {
        DataClient {
            http,
            rest_url,
            anon_key,
            bearer,
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{table}", self.rest_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.bearer)
    }

    async fn read(response: reqwest::Response) -> Result<Relayed, UpstreamError> {
        let status = response.status();
        let headers = serialized_headers(response.headers());
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(Relayed {
            status,
            headers,
            body,
        })
    }

    fn select_request(&self, table: &str, query: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::GET, table)
            .query(query)
            .header("prefer", "count=exact")
    }

    /// `GET /{table}` with PostgREST parameters, e.g. `[("select", "*"), ("order", "name")]`.
    ///
    /// Values are percent-encoded, so a filter value can never add parameters.
    pub async fn select(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Relayed, UpstreamError> {
        let response = self.select_request(table, query).send().await?;
        Self::read(response).await
    }

    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, UpstreamError> {
        let mut query = query.to_vec();
        query.push(("limit", "1"));
        let relayed = self.select(table, &query).await?;
        let rows: Vec<T> = decode(&relayed.body)?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<R, UpstreamError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let relayed = Self::read(response).await?;
        let rows: Vec<R> = decode(&relayed.body)?;
        rows.into_iter().next().ok_or(UpstreamError::Status {
            status: StatusCode::BAD_GATEWAY.as_u16(),
            body: String::from("insert returned no rows"),
        })
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, UpstreamError> {
    serde_json::from_slice(body).map_err(|err| UpstreamError::Status {
        status: StatusCode::BAD_GATEWAY.as_u16(),
        body: format!("unreadable data api response: {err}"),
    })
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}
