//! HTTP client for the RGW admin API
//!
//! Requests are signed with AWS signature version 2:
//! 1. Build the string to sign from method, date and resource path
//! 2. Compute HMAC-SHA1(string_to_sign, access_secret)
//! 3. Send `Authorization: AWS <access_key>:<base64 signature>`

use super::{AdminApi, AdminError, BucketInfo, UserCap, UserRecord};
use crate::caps::{self, CapabilitySet, CapsVerb};
use crate::config::ConnectionConfig;
use crate::{CephmgrError, Secret, UserIdentity};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha1::Sha1;
use tracing::debug;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

const USER_PATH: &str = "/admin/user";
const USER_METADATA_PATH: &str = "/admin/metadata/user";
const BUCKET_PATH: &str = "/admin/bucket";

/// RGW admin API client
pub struct RgwAdminClient {
    client: Client,
    endpoint: Url,
    access_key: String,
    secret: Secret,
}

/// Error document RGW sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct RgwErrorBody {
    #[serde(rename = "Code")]
    code: String,
}

impl RgwAdminClient {
    /// Create a client for a validated connection configuration
    pub fn new(config: &ConnectionConfig) -> Result<Self, CephmgrError> {
        let endpoint = config.endpoint()?;

        let client = Client::builder()
            .user_agent(concat!("cephmgr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdminError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            access_key: config.access_key.clone(),
            secret: config.access_secret.clone(),
        })
    }

    /// Current time in RFC 1123 format for the `Date` header
    fn http_date() -> String {
        Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// Content-MD5 and Content-Type are always empty, no request has a body
    fn string_to_sign(method: &Method, date: &str, resource: &str) -> String {
        format!("{}\n\n\n{}\n{}", method.as_str(), date, resource)
    }

    fn compute_signature(data: &str, secret: &str) -> Result<String, AdminError> {
        let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
            .map_err(|e| AdminError::Http(format!("HMAC init failed: {}", e)))?;
        mac.update(data.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Build the query string. `subresource` is a bare key such as `caps`.
    fn build_query_string(subresource: Option<&str>, params: &[(&str, &str)]) -> String {
        let mut pairs: Vec<String> = Vec::with_capacity(params.len() + 2);
        if let Some(subresource) = subresource {
            pairs.push(subresource.to_string());
        }
        pairs.push("format=json".to_string());
        pairs.extend(
            params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))),
        );
        pairs.join("&")
    }

    fn url_for(&self, path: &str, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", base, path));
        url.set_query(Some(query));
        url
    }

    /// Send one signed request and return the body of a 2xx response
    async fn send(
        &self,
        method: Method,
        path: &str,
        subresource: Option<&str>,
        params: &[(&str, &str)],
    ) -> Result<Vec<u8>, AdminError> {
        let url = self.url_for(path, &Self::build_query_string(subresource, params));
        let date = Self::http_date();
        let signature = Self::compute_signature(
            &Self::string_to_sign(&method, &date, url.path()),
            self.secret.expose(),
        )?;

        debug!(method = %method, path = %url.path(), "RGW admin request");

        let response = self
            .client
            .request(method, url)
            .header("Date", date)
            .header("Authorization", format!("AWS {}:{}", self.access_key, signature))
            .send()
            .await
            .map_err(|e| AdminError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AdminError::Http(e.to_string()))?
            .to_vec();

        if !status.is_success() {
            let code = serde_json::from_slice::<RgwErrorBody>(&body)
                .map(|b| b.code)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown").to_string());
            debug!(status = status.as_u16(), code = %code, "RGW admin request failed");
            return Err(AdminError::Api {
                status: status.as_u16(),
                code,
            });
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, AdminError> {
        serde_json::from_slice(body).map_err(|e| AdminError::Decode(e.to_string()))
    }

    async fn change_caps(
        &self,
        verb: CapsVerb,
        uid: &str,
        caps: &CapabilitySet,
    ) -> Result<Vec<UserCap>, AdminError> {
        let method = match verb {
            CapsVerb::Add => Method::PUT,
            CapsVerb::Remove => Method::DELETE,
        };
        let spec = caps::compute(verb, caps);

        let body = self
            .send(method, USER_PATH, Some("caps"), &[("uid", uid), ("user-caps", spec.as_str())])
            .await?;
        Self::decode(&body)
    }
}

#[async_trait]
impl AdminApi for RgwAdminClient {
    async fn create_user(
        &self,
        user: &UserIdentity,
        caps: Option<&CapabilitySet>,
    ) -> Result<UserRecord, AdminError> {
        let spec = caps.map(caps::compute_add);

        let mut params = vec![
            ("uid", user.id.as_str()),
            ("display-name", user.display_name.as_str()),
        ];
        if let Some(email) = &user.email {
            params.push(("email", email.as_str()));
        }
        if let Some(spec) = &spec {
            params.push(("user-caps", spec.as_str()));
        }

        let body = self.send(Method::PUT, USER_PATH, None, &params).await?;
        Self::decode(&body)
    }

    async fn get_user(&self, uid: &str) -> Result<UserRecord, AdminError> {
        let body = self.send(Method::GET, USER_PATH, None, &[("uid", uid)]).await?;
        Self::decode(&body)
    }

    async fn list_users(&self) -> Result<Vec<String>, AdminError> {
        let body = self.send(Method::GET, USER_METADATA_PATH, None, &[]).await?;
        Self::decode(&body)
    }

    async fn delete_user(&self, uid: &str) -> Result<(), AdminError> {
        self.send(Method::DELETE, USER_PATH, None, &[("uid", uid)])
            .await
            .map(|_| ())
    }

    async fn add_user_caps(
        &self,
        uid: &str,
        caps: &CapabilitySet,
    ) -> Result<Vec<UserCap>, AdminError> {
        self.change_caps(CapsVerb::Add, uid, caps).await
    }

    async fn remove_user_caps(
        &self,
        uid: &str,
        caps: &CapabilitySet,
    ) -> Result<Vec<UserCap>, AdminError> {
        self.change_caps(CapsVerb::Remove, uid, caps).await
    }

    async fn list_buckets(&self) -> Result<Vec<String>, AdminError> {
        let body = self.send(Method::GET, BUCKET_PATH, None, &[]).await?;
        Self::decode(&body)
    }

    async fn get_bucket_info(&self, bucket: &str) -> Result<BucketInfo, AdminError> {
        let body = self
            .send(Method::GET, BUCKET_PATH, None, &[("bucket", bucket)])
            .await?;
        Self::decode(&body)
    }
}
