// Thin HTTP layer: sign the request, post it as the `xml_request` form
// field, decode the response document.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::auth::Credentials;
use crate::error::Error;
use crate::request::{
    self, Authorized, DeleteRequest, DeliveryRequest, StatusReportRequest, XmlRequest,
};
use crate::response::{self, DeleteResponse, DeliveryResponse, StatusReport, XmlResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Posts form-encoded documents to the provider.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, path: &str, form: &[(&str, String)]) -> Result<String, Error>;
}

/// Transport backed by `reqwest`.
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, form: &[(&str, String)]) -> Result<String, Error> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(%url, "posting XML request");
        let response = self.http.post(&url).form(form).send().await?;
        let body = response.error_for_status()?.text().await?;
        debug!(bytes = body.len(), "received response body");
        Ok(body)
    }
}

/// The provider client.
pub struct Client<T = HttpTransport> {
    transport: T,
    credentials: Credentials,
}

impl Client<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(config.base_url, config.timeout)?;
        Ok(Self {
            transport,
            credentials: config.credentials,
        })
    }
}

impl<T: Transport> Client<T> {
    /// Build a client over a custom transport.
    pub fn with_transport(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Sign and send a request, decoding the typed response.
    pub async fn send<R>(&self, mut request: R) -> Result<R::Response, Error>
    where
        R: XmlRequest + Authorized + Send,
    {
        request.sign(self.credentials.sign(Utc::now().date_naive()));
        let xml = request::encode(&request)?;
        let body = self
            .transport
            .post(R::PATH, &[("xml_request", xml)])
            .await?;
        if let Some(error) = response::provider_error(&body) {
            return Err(Error::Api {
                code: error.code,
                message: error.message,
            });
        }
        R::Response::from_xml(&body)
    }

    pub async fn new_orders(&self, request: DeliveryRequest) -> Result<DeliveryResponse, Error> {
        self.send(request).await
    }

    pub async fn delete_orders(&self, request: DeleteRequest) -> Result<DeleteResponse, Error> {
        self.send(request).await
    }

    pub async fn status_report(&self, request: StatusReportRequest) -> Result<StatusReport, Error> {
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingTransport {
        body: String,
        seen: Mutex<Option<(String, String)>>,
    }

    impl RecordingTransport {
        fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                seen: Mutex::new(None),
            }
        }

        fn seen(&self) -> (String, String) {
            self.seen.lock().unwrap().clone().expect("no request was sent")
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn post(&self, path: &str, form: &[(&str, String)]) -> Result<String, Error> {
            let xml = form
                .iter()
                .find(|(key, _)| *key == "xml_request")
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            *self.seen.lock().unwrap() = Some((path.to_string(), xml));
            Ok(self.body.clone())
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("account", "password")
    }

    #[tokio::test]
    async fn sends_signed_request_to_the_endpoint_path() {
        let transport = RecordingTransport::new(
            r#"<DeliveryResponse><Order Number="TEST-1" DispatchNumber="1000056"/></DeliveryResponse>"#,
        );
        let client = Client::with_transport(transport, credentials());

        let response = client
            .new_orders(DeliveryRequest::new("batch-1"))
            .await
            .unwrap();
        assert_eq!(response.orders[0].dispatch_number.as_deref(), Some("1000056"));

        let (path, xml) = client.transport.seen();
        assert_eq!(path, "/new_orders.php");
        assert!(xml.contains("Account=\"account\""));
        assert!(xml.contains("Secure=\""));
    }

    #[tokio::test]
    async fn provider_error_document_becomes_an_api_error() {
        let transport = RecordingTransport::new(
            r#"<response><Error ErrorCode="ERR_SECURE" Msg="Signature mismatch"/></response>"#,
        );
        let client = Client::with_transport(transport, credentials());

        let result = client.delete_orders(DeleteRequest::new("batch-1")).await;
        match result {
            Err(Error::Api { code, message }) => {
                assert_eq!(code, "ERR_SECURE");
                assert_eq!(message, "Signature mismatch");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_report_round_trip_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/status_report_h.php")
            .with_status(200)
            .with_body(
                r#"<StatusReport DateFirst="2019-06-01" DateLast="2019-06-30">
  <Order Number="2080965069" DeliveryDate="2019-06-03"/>
</StatusReport>"#,
            )
            .create_async()
            .await;

        let config = ClientConfig::new(server.url(), credentials());
        let client = Client::new(config).unwrap();
        let report = client
            .status_report(StatusReportRequest::new().show_history())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(report.orders.len(), 1);
        assert_eq!(
            report.orders[0]
                .delivery_date
                .unwrap()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            "2019-06-03 00:00:00"
        );
    }

    #[tokio::test]
    async fn http_failure_surfaces_as_a_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/new_orders.php")
            .with_status(500)
            .create_async()
            .await;

        let config = ClientConfig::new(server.url(), credentials());
        let client = Client::new(config).unwrap();
        let result = client.new_orders(DeliveryRequest::new("batch-1")).await;
        assert!(matches!(result, Err(Error::Http(_))), "got {result:?}");
    }
}
