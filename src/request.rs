// Outgoing request documents and the contracts the client relies on.
//
// Every request is a root element with PascalCase attributes, signed with
// the account/date/secure trio and posted as the `xml_request` form field.

use chrono::NaiveDate;
use serde::ser::Serializer;
use serde::Serialize;

use crate::auth::Signature;
use crate::datetime;
use crate::error::Error;
use crate::response::{DeleteResponse, DeliveryResponse, StatusReport, XmlResponse};

/// An XML document that can be posted to the provider.
pub trait XmlRequest: Serialize {
    /// Endpoint path the document is posted to.
    const PATH: &'static str;
    /// The response document this request is answered with.
    type Response: XmlResponse;
}

/// Requests carrying the account/date/secure attributes.
pub trait Authorized {
    fn sign(&mut self, signature: Signature);
}

pub(crate) fn encode<R: XmlRequest>(request: &R) -> Result<String, Error> {
    quick_xml::se::to_string(request).map_err(|e| Error::XmlWrite(e.to_string()))
}

/// Registers a batch of new orders.
#[derive(Debug, Default, Serialize)]
#[serde(rename = "DeliveryRequest")]
pub struct DeliveryRequest {
    #[serde(rename = "@Date", skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "@Account", skip_serializing_if = "Option::is_none")]
    account: Option<String>,
    #[serde(rename = "@Secure", skip_serializing_if = "Option::is_none")]
    secure: Option<String>,
    #[serde(rename = "@Number")]
    number: String,
    #[serde(rename = "@OrderCount")]
    order_count: usize,
    #[serde(rename = "Order")]
    orders: Vec<NewOrder>,
}

impl DeliveryRequest {
    /// `number` identifies the batch on the provider side.
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Self::default()
        }
    }

    pub fn add_order(mut self, order: NewOrder) -> Self {
        self.orders.push(order);
        // OrderCount is redundant on the wire but required by the schema.
        self.order_count = self.orders.len();
        self
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

impl XmlRequest for DeliveryRequest {
    const PATH: &'static str = "/new_orders.php";
    type Response = DeliveryResponse;
}

impl Authorized for DeliveryRequest {
    fn sign(&mut self, signature: Signature) {
        self.date = Some(signature.date);
        self.account = Some(signature.account);
        self.secure = Some(signature.secure);
    }
}

/// A single order inside a [`DeliveryRequest`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewOrder {
    #[serde(rename = "@Number")]
    pub number: String,
    #[serde(rename = "@RecipientName")]
    pub recipient_name: String,
    #[serde(rename = "@Phone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "@Comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "Address", skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(rename = "Package", skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Address {
    #[serde(rename = "@Street")]
    pub street: String,
    #[serde(rename = "@House")]
    pub house: String,
    #[serde(rename = "@Flat", skip_serializing_if = "Option::is_none")]
    pub flat: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Package {
    #[serde(rename = "@Number")]
    pub number: String,
    #[serde(rename = "@BarCode")]
    pub barcode: String,
    /// Weight in grams.
    #[serde(rename = "@Weight")]
    pub weight: u32,
}

/// Deletes previously registered orders.
#[derive(Debug, Default, Serialize)]
#[serde(rename = "DeleteRequest")]
pub struct DeleteRequest {
    #[serde(rename = "@Date", skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "@Account", skip_serializing_if = "Option::is_none")]
    account: Option<String>,
    #[serde(rename = "@Secure", skip_serializing_if = "Option::is_none")]
    secure: Option<String>,
    #[serde(rename = "@Number")]
    number: String,
    #[serde(rename = "@OrderCount")]
    order_count: usize,
    #[serde(rename = "Order")]
    orders: Vec<OrderRef>,
}

impl DeleteRequest {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Self::default()
        }
    }

    pub fn add_order(mut self, number: impl Into<String>) -> Self {
        self.orders.push(OrderRef {
            number: number.into(),
        });
        self.order_count = self.orders.len();
        self
    }
}

impl XmlRequest for DeleteRequest {
    const PATH: &'static str = "/delete_orders.php";
    type Response = DeleteResponse;
}

impl Authorized for DeleteRequest {
    fn sign(&mut self, signature: Signature) {
        self.date = Some(signature.date);
        self.account = Some(signature.account);
        self.secure = Some(signature.secure);
    }
}

/// Reference to an existing order by its number.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderRef {
    #[serde(rename = "@Number")]
    pub number: String,
}

/// Asks for status changes over a period or a set of orders.
#[derive(Debug, Default, Serialize)]
#[serde(rename = "StatusReport")]
pub struct StatusReportRequest {
    #[serde(rename = "@Date", skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "@Account", skip_serializing_if = "Option::is_none")]
    account: Option<String>,
    #[serde(rename = "@Secure", skip_serializing_if = "Option::is_none")]
    secure: Option<String>,
    #[serde(rename = "@ShowHistory", serialize_with = "flag")]
    show_history: bool,
    #[serde(rename = "ChangePeriod", skip_serializing_if = "Option::is_none")]
    change_period: Option<ChangePeriod>,
    #[serde(rename = "Order", skip_serializing_if = "Vec::is_empty")]
    orders: Vec<OrderRef>,
}

impl StatusReportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the per-order state history in the report.
    pub fn show_history(mut self) -> Self {
        self.show_history = true;
        self
    }

    pub fn with_period(mut self, first: NaiveDate, last: NaiveDate) -> Self {
        self.change_period = Some(ChangePeriod {
            date_first: Some(first),
            date_last: Some(last),
        });
        self
    }

    pub fn add_order(mut self, number: impl Into<String>) -> Self {
        self.orders.push(OrderRef {
            number: number.into(),
        });
        self
    }
}

impl XmlRequest for StatusReportRequest {
    const PATH: &'static str = "/status_report_h.php";
    type Response = StatusReport;
}

impl Authorized for StatusReportRequest {
    fn sign(&mut self, signature: Signature) {
        self.date = Some(signature.date);
        self.account = Some(signature.account);
        self.secure = Some(signature.secure);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangePeriod {
    #[serde(
        rename = "@DateFirst",
        serialize_with = "plain_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_first: Option<NaiveDate>,
    #[serde(
        rename = "@DateLast",
        serialize_with = "plain_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_last: Option<NaiveDate>,
}

fn flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

// The provider expects plain `%Y-%m-%d` dates on the request side;
// formatting is delegated to chrono with the shared pattern constant.
fn plain_date<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(date) => serializer.serialize_str(&date.format(datetime::DATE).to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;

    fn signature() -> Signature {
        Credentials::new("account", "password").sign(NaiveDate::from_ymd_opt(2019, 6, 1).unwrap())
    }

    #[test]
    fn delivery_request_serializes_orders_and_count() {
        let mut request = DeliveryRequest::new("batch-1")
            .add_order(NewOrder {
                number: "TEST-1".to_string(),
                recipient_name: "Jane Smith".to_string(),
                phone: Some("+15550100".to_string()),
                address: Some(Address {
                    street: "Main".to_string(),
                    house: "7".to_string(),
                    flat: Some("12".to_string()),
                }),
                packages: vec![Package {
                    number: "TEST-1-1".to_string(),
                    barcode: "TEST-1-1".to_string(),
                    weight: 500,
                }],
                ..NewOrder::default()
            })
            .add_order(NewOrder {
                number: "TEST-2".to_string(),
                recipient_name: "John Smith".to_string(),
                ..NewOrder::default()
            });
        request.sign(signature());

        let xml = encode(&request).unwrap();
        assert!(xml.starts_with("<DeliveryRequest"), "unexpected xml: {xml}");
        assert!(xml.contains("Date=\"2019-06-01\""));
        assert!(xml.contains("Account=\"account\""));
        assert!(xml.contains("Secure=\""));
        assert!(xml.contains("Number=\"batch-1\""));
        assert!(xml.contains("OrderCount=\"2\""));
        assert!(xml.contains("<Order Number=\"TEST-1\" RecipientName=\"Jane Smith\" Phone=\"+15550100\">"));
        assert!(xml.contains("<Address Street=\"Main\" House=\"7\" Flat=\"12\"/>"));
        assert!(xml.contains("<Package Number=\"TEST-1-1\" BarCode=\"TEST-1-1\" Weight=\"500\"/>"));
    }

    #[test]
    fn unsigned_request_has_no_auth_attributes() {
        let xml = encode(&DeliveryRequest::new("batch-1")).unwrap();
        assert!(!xml.contains("Account="));
        assert!(!xml.contains("Secure="));
        assert!(!xml.contains("Date="));
    }

    #[test]
    fn delete_request_references_orders_by_number() {
        let mut request = DeleteRequest::new("batch-1")
            .add_order("TEST-1")
            .add_order("TEST-2");
        request.sign(signature());

        let xml = encode(&request).unwrap();
        assert!(xml.starts_with("<DeleteRequest"), "unexpected xml: {xml}");
        assert!(xml.contains("OrderCount=\"2\""));
        assert!(xml.contains("<Order Number=\"TEST-1\"/>"));
        assert!(xml.contains("<Order Number=\"TEST-2\"/>"));
    }

    #[test]
    fn status_report_request_serializes_period_and_flag() {
        let mut request = StatusReportRequest::new()
            .show_history()
            .with_period(
                NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2019, 6, 30).unwrap(),
            )
            .add_order("TEST-1");
        request.sign(signature());

        let xml = encode(&request).unwrap();
        assert!(xml.starts_with("<StatusReport"), "unexpected xml: {xml}");
        assert!(xml.contains("ShowHistory=\"1\""));
        assert!(xml.contains("<ChangePeriod DateFirst=\"2019-06-01\" DateLast=\"2019-06-30\"/>"));
        assert!(xml.contains("<Order Number=\"TEST-1\"/>"));
    }

    #[test]
    fn status_report_request_defaults_to_no_history_and_no_period() {
        let xml = encode(&StatusReportRequest::new()).unwrap();
        assert!(xml.contains("ShowHistory=\"0\""));
        assert!(!xml.contains("ChangePeriod"));
    }
}
