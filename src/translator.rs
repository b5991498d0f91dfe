use crate::{Error, Result, Translator};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Translates through a LibreTranslate compatible service: `POST {endpoint}/translate`.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

impl HttpTranslator {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<HttpTranslator> {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::invalid(
                "endpoint",
                format!("{:?} is not an http(s) URL", endpoint),
            ));
        }
        let client = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("courtside/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| Error::Translation(format!("cannot build HTTP client: {}", err)))?;
        Ok(HttpTranslator {
            client,
            url: format!("{}/translate", endpoint.trim_end_matches('/')),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }
}

impl Translator for HttpTranslator {
    fn translate(&mut self, text: &str, from: &str, to: &str) -> Result<String> {
        let request = TranslateRequest {
            q: text,
            source: from,
            target: to,
            format: "text",
            api_key: self.api_key.as_deref(),
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .and_then(Response::error_for_status)
            .map_err(|err| Error::Translation(format!("{}: {}", self.url, err)))?;
        let body: TranslateResponse = response.json().map_err(|err| {
            Error::Translation(format!("unreadable reply from {}: {}", self.url, err))
        })?;
        debug!(from, to, chars = text.chars().count(), "translated text");
        Ok(body.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpTranslator;
    use crate::{Error, Translator};
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answers a single HTTP request with `status` and `body`, handing back the request line
    /// and request body it received.
    fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header.trim().is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request = vec![0; length];
            reader.read_exact(&mut request).unwrap();

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
            (request_line.trim().to_string(), String::from_utf8(request).unwrap())
        });
        (endpoint, handle)
    }

    #[test]
    fn posts_text_and_reads_translation() {
        let (endpoint, server) = serve_once("200 OK", r#"{"translatedText":"Derby ce soir"}"#);
        let mut translator =
            HttpTranslator::new(&format!("{}/", endpoint), Some("k3y".into())).unwrap();
        let text = translator.translate("Derby tonight", "en", "fr").unwrap();
        assert_eq!(text, "Derby ce soir");

        let (request_line, body) = server.join().unwrap();
        assert_eq!(request_line, "POST /translate HTTP/1.1");
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "q": "Derby tonight",
                "source": "en",
                "target": "fr",
                "format": "text",
                "api_key": "k3y",
            })
        );
    }

    #[test]
    fn server_errors_are_translation_failures() {
        let (endpoint, server) = serve_once("500 Internal Server Error", r#"{"error":"busy"}"#);
        let mut translator = HttpTranslator::new(&endpoint, None).unwrap();
        let err = translator.translate("Derby tonight", "en", "fr").unwrap_err();
        assert!(matches!(err, Error::Translation(_)), "{}", err);
        let (_, body) = server.join().unwrap();
        assert!(!body.contains("api_key"));
    }

    #[test]
    fn rejects_non_http_endpoints() {
        assert!(HttpTranslator::new("translate.test", None)
            .unwrap_err()
            .is_validation());
    }
}
