//! Thin HTTP client for the pontod routes.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
}

/// Optional fields sent with a new employee.
#[derive(Debug, Default)]
pub struct EmployeeFields {
    pub name: String,
    pub document: Option<String>,
    pub email: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base: &str, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .context("no token; run `ponto login` and set PONTO_TOKEN")?;
        Ok(req.bearer_auth(token))
    }

    pub async fn health(&self) -> Result<Value> {
        let resp = self.http.get(self.url("/health")).send().await?;
        json(resp).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        let body: TokenBody = serde_json::from_value(json(resp).await?)?;
        Ok(body.access_token)
    }

    pub async fn enroll(&self, fields: EmployeeFields, selfie: &Path) -> Result<Value> {
        let mut form = Form::new().text("name", fields.name);
        if let Some(document) = fields.document {
            form = form.text("document", document);
        }
        if let Some(email) = fields.email {
            form = form.text("email", email);
        }
        let form = form.part("selfie", selfie_part(selfie).await?);
        let req = self.authorized(self.http.post(self.url("/employees")))?;
        json(req.multipart(form).send().await?).await
    }

    pub async fn re_enroll(&self, employee_id: i64, selfie: &Path) -> Result<Value> {
        let form = Form::new().part("selfie", selfie_part(selfie).await?);
        let req = self.authorized(self.http.post(self.url(&format!("/faces/enroll/{employee_id}"))))?;
        json(req.multipart(form).send().await?).await
    }

    pub async fn punch(
        &self,
        employee_id: i64,
        selfie: &Path,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<Value> {
        let mut form = Form::new().text("employee_id", employee_id.to_string());
        if let Some(lat) = lat {
            form = form.text("lat", lat.to_string());
        }
        if let Some(lon) = lon {
            form = form.text("lon", lon.to_string());
        }
        let form = form.part("selfie", selfie_part(selfie).await?);
        let req = self.authorized(self.http.post(self.url("/punches")))?;
        json(req.multipart(form).send().await?).await
    }

    pub async fn list(&self) -> Result<Value> {
        let req = self.authorized(self.http.get(self.url("/employees")))?;
        json(req.send().await?).await
    }

    pub async fn export_csv(&self) -> Result<String> {
        let req = self.authorized(self.http.get(self.url("/punches/export.csv")))?;
        let resp = checked(req.send().await?).await?;
        Ok(resp.text().await?)
    }
}

async fn selfie_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "selfie.jpg".to_string());
    Ok(Part::bytes(bytes).file_name(file_name))
}

async fn checked(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    bail!("{}", describe_failure(status.as_u16(), &text))
}

async fn json(resp: Response) -> Result<Value> {
    Ok(checked(resp).await?.json().await?)
}

/// Render an error response as `<status> <code>: <message>`.
fn describe_failure(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => format!("{status} {}: {}", err.code, err.message),
        Err(_) if body.is_empty() => format!("{status}"),
        Err(_) => format!("{status}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.url("/health"), "http://localhost:8000/health");
    }

    #[test]
    fn test_protected_call_without_token() {
        let client = ApiClient::new("http://localhost:8000", None).unwrap();
        let err = client
            .authorized(client.http.get(client.url("/employees")))
            .unwrap_err();
        assert!(err.to_string().contains("ponto login"));
    }

    #[test]
    fn test_describe_failure() {
        let body = r#"{"code":"RECOGNITION_FAILED","message":"face recognition failed (similarity=0.12)"}"#;
        assert_eq!(
            describe_failure(400, body),
            "400 RECOGNITION_FAILED: face recognition failed (similarity=0.12)"
        );
        assert_eq!(describe_failure(502, "bad gateway"), "502: bad gateway");
        assert_eq!(describe_failure(500, ""), "500");
    }
}
