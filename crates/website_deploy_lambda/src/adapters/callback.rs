use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackReceipt {
    pub status_code: u16,
    pub status_message: String,
}

/// Delivers a serialized custom-resource response to its callback URL.
///
/// Implementations issue a single HTTP PUT with an empty `Content-Type` and a
/// `Content-Length` equal to the body length, and do not retry.
pub trait ResponseSender {
    fn send_response(&self, response_url: &str, body: &[u8]) -> Result<CallbackReceipt, String>;
}

pub struct HttpResponseSender {
    http_client: reqwest::Client,
}

impl HttpResponseSender {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl ResponseSender for HttpResponseSender {
    fn send_response(&self, response_url: &str, body: &[u8]) -> Result<CallbackReceipt, String> {
        let url = response_url.to_string();
        let body_bytes = body.to_vec();
        let client = self.http_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                // The presigned callback URL is signed with an empty content type.
                let response = client
                    .put(url)
                    .header(CONTENT_TYPE, "")
                    .header(CONTENT_LENGTH, body_bytes.len())
                    .body(body_bytes)
                    .send()
                    .await
                    .map_err(|error| format!("failed to send callback request: {error}"))?;

                let status = response.status();
                let receipt = CallbackReceipt {
                    status_code: status.as_u16(),
                    status_message: status.canonical_reason().unwrap_or_default().to_string(),
                };
                if status.is_success() {
                    Ok(receipt)
                } else {
                    Err(format!(
                        "callback rejected with status {} {}",
                        receipt.status_code, receipt.status_message
                    ))
                }
            })
        })
    }
}
