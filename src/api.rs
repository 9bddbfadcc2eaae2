// API client module: a small blocking HTTP client for the Pushbullet REST
// API. Every call authenticates with basic auth, the access token as the
// username and an empty password.

use crate::error::{PushError, Result};
use crate::push::PushRequest;
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use serde::Deserialize;
use std::fs::File;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.pushbullet.com";
pub const BASE_URL_ENV: &str = "PUSHBULLET_API_URL";

const DEVICES_PATH: &str = "/v2/devices";
const PUSHES_PATH: &str = "/api/pushes";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Holds a reqwest blocking client and the base URL of the service.
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// A device registered to the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub display_name: String,
}

#[derive(Deserialize, Debug)]
struct DeviceList {
    #[serde(default)]
    devices: Vec<RawDevice>,
}

#[derive(Deserialize, Debug)]
struct RawDevice {
    iden: String,
    #[serde(default)]
    nickname: Option<String>,
}

impl From<RawDevice> for Device {
    fn from(raw: RawDevice) -> Self {
        let display_name = raw
            .nickname
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| raw.iden.clone());
        Device {
            id: raw.iden,
            display_name,
        }
    }
}

impl ApiClient {
    /// Create a client for the URL in `PUSHBULLET_API_URL`, falling back
    /// to the public Pushbullet endpoint.
    pub fn from_env() -> Result<Self> {
        Self::new(base_url_from(std::env::var(BASE_URL_ENV).ok()))
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("pushbullet-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient { client, base_url })
    }

    #[cfg(test)]
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str, api_key: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.get(url).basic_auth(api_key, Some(""))
    }

    fn post(&self, path: &str, api_key: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.post(url).basic_auth(api_key, Some(""))
    }

    /// Fetch the account's devices in server order. Any failure (bad
    /// status, network error, unexpected body) yields an empty list.
    pub fn list_devices(&self, api_key: &str) -> Vec<Device> {
        debug!(url = %self.base_url, "listing devices");
        let res = match self.get(DEVICES_PATH, api_key).send() {
            Ok(res) => res,
            Err(err) => {
                warn!(error = %err, "device list request failed");
                return Vec::new();
            }
        };

        if res.status() != reqwest::StatusCode::OK {
            warn!(status = %res.status(), "device list request was rejected");
            return Vec::new();
        }

        match res.json::<DeviceList>() {
            Ok(list) => list.devices.into_iter().map(Device::from).collect(),
            Err(err) => {
                warn!(error = %err, "could not parse device list");
                Vec::new()
            }
        }
    }

    /// Send one push. `target` is a device id, or `None` to broadcast to
    /// every device on the account.
    pub fn send_push(
        &self,
        api_key: &str,
        target: Option<&str>,
        request: &PushRequest,
    ) -> Result<()> {
        let req = self.post(PUSHES_PATH, api_key);
        let req = match request {
            PushRequest::File { file_name, path } => {
                let file = File::open(path)?;
                let part = multipart::Part::reader(file).file_name(file_name.clone());
                let mut form = multipart::Form::new().text("type", "file");
                if let Some(device) = target {
                    form = form.text("device_iden", device.to_string());
                }
                req.multipart(form.part("file", part))
            }
            _ => req.json(&request.to_json(target)?),
        };

        debug!(
            kind = request.push_type().as_str(),
            device = target.unwrap_or("all devices"),
            "sending push"
        );
        let res = req.send()?;
        check_status(res)?;
        info!(
            kind = request.push_type().as_str(),
            device = target.unwrap_or("all devices"),
            "push sent"
        );
        Ok(())
    }
}

/// A set but blank override falls back to the public endpoint.
fn base_url_from(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.into())
}

fn check_status(res: Response) -> Result<Response> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let body = res.text().unwrap_or_else(|_| "".into());
    Err(PushError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn raw_device_maps_nickname() {
        let list: DeviceList = serde_json::from_str(
            r#"{"devices":[
                {"iden":"a1","nickname":"Phone","active":true},
                {"iden":"b2","nickname":""},
                {"iden":"c3"}
            ]}"#,
        )
        .unwrap();
        let devices: Vec<Device> = list.devices.into_iter().map(Device::from).collect();
        assert_eq!(
            devices,
            vec![
                Device {
                    id: "a1".into(),
                    display_name: "Phone".into()
                },
                Device {
                    id: "b2".into(),
                    display_name: "b2".into()
                },
                Device {
                    id: "c3".into(),
                    display_name: "c3".into()
                },
            ]
        );
    }

    #[test]
    fn blank_base_url_override_uses_default() {
        assert_eq!(base_url_from(None), DEFAULT_BASE_URL);
        assert_eq!(base_url_from(Some(String::new())), DEFAULT_BASE_URL);
        assert_eq!(base_url_from(Some("   ".into())), DEFAULT_BASE_URL);
        assert_eq!(
            base_url_from(Some("http://127.0.0.1:8080".into())),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let api = ApiClient::new("http://localhost:9000/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:9000");
    }
}
