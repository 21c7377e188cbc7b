use std::time::Duration;

use reqwest::blocking::Client;

use crate::libs::session::ConnectionConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One HTTPS client pointed at the controller's CGI root. Issues the
/// POST exchanges and hands back raw response bodies; holds no protocol
/// state beyond the target URL and the debug flag.
pub struct Transport {
    client: Client,
    base_url: String,
    debug: bool,
}

impl Transport {
    /// Builds a transport addressing `https://{host}:{port}`.
    ///
    /// TLS verification is off unless `verify_certs` is set: these
    /// controllers ship self-signed certificates, and the stock remote
    /// racadm client does not verify either.
    pub fn open(config: &ConnectionConfig) -> Result<Self, reqwest::Error> {
        let base_url = format!("https://{}:{}", config.host, config.port);
        Self::with_base_url(base_url, config)
    }

    /// Same client, arbitrary base URL. Lets tests target a plain-HTTP
    /// mock server with the production exchange path.
    pub fn with_base_url(
        base_url: String,
        config: &ConnectionConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_certs)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Transport {
            client,
            base_url,
            debug: config.debug,
        })
    }

    /// POSTs `body` to `/cgi-bin/{path}` and returns the raw response
    /// body. The session cookie is attached only when `token` is given.
    /// Any connect failure, timeout, or non-2xx status is an error; no
    /// body is returned for HTTP error statuses.
    pub fn exchange(
        &self,
        path: &str,
        body: &str,
        token: Option<&str>,
    ) -> Result<Vec<u8>, reqwest::Error> {
        let url = format!("{}/cgi-bin/{}", self.base_url, path);

        if self.debug {
            eprintln!("> POST {url}");
            if !body.is_empty() {
                eprintln!("> {body}");
            }
        }

        let mut request = self
            .client
            .post(&url)
            .header("Content-type", "text/xml")
            .header("Connection", "Keep-Alive")
            .body(body.to_string());

        if let Some(token) = token {
            request = request.header("Cookie", format!("sid={token}"));
        }

        let response = request.send()?.error_for_status()?;
        let data = response.bytes()?.to_vec();

        if self.debug {
            eprintln!("< {}", String::from_utf8_lossy(&data));
        }

        Ok(data)
    }
}
