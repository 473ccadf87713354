// Incoming response documents.
//
// Wire structs keep every dated attribute as the raw string it arrived as;
// conversion into the public types runs the lenient date parsing declared
// per attribute. Documents without dated attributes decode directly.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::datetime::{self, DateField};
use crate::error::{DeserializationError, Error};

/// A decoded provider response.
pub trait XmlResponse: Sized {
    fn from_xml(xml: &str) -> Result<Self, Error>;
}

// Accepted formats per dated attribute. First match wins.
const DATE_FIRST: DateField = DateField::new("DateFirst", &[datetime::DATE_TIME, datetime::DATE]);
const DATE_LAST: DateField = DateField::new("DateLast", &[datetime::DATE_TIME, datetime::DATE]);
const DELIVERY_DATE: DateField = DateField::new("DeliveryDate", &[datetime::DATE]);
const STATUS_DATE: DateField = DateField::new("Date", &[datetime::DATE_TIME, datetime::DATE]);
const REASON_DATE: DateField = DateField::new(
    "Date",
    &[datetime::DATE_TIME, datetime::DATE_TIME_PLAIN, datetime::DATE],
);

fn decode<T: DeserializeOwned>(xml: &str) -> Result<T, Error> {
    quick_xml::de::from_str(xml).map_err(|e| Error::Xml(e.to_string()))
}

/// Acknowledgement for a [`DeliveryRequest`](crate::request::DeliveryRequest).
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeliveryResponse {
    #[serde(rename = "Order")]
    pub orders: Vec<OrderAck>,
}

impl XmlResponse for DeliveryResponse {
    fn from_xml(xml: &str) -> Result<Self, Error> {
        decode(xml)
    }
}

/// Per-order acknowledgement: either a dispatch number or an error.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrderAck {
    #[serde(rename = "@Number")]
    pub number: String,
    #[serde(rename = "@DispatchNumber")]
    pub dispatch_number: Option<String>,
    #[serde(rename = "@ErrorCode")]
    pub error_code: Option<String>,
    #[serde(rename = "@Msg")]
    pub message: Option<String>,
}

impl OrderAck {
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Acknowledgement for a [`DeleteRequest`](crate::request::DeleteRequest).
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeleteResponse {
    #[serde(rename = "Order")]
    pub orders: Vec<OrderAck>,
    #[serde(rename = "Alarm")]
    pub alarms: Vec<String>,
}

impl XmlResponse for DeleteResponse {
    fn from_xml(xml: &str) -> Result<Self, Error> {
        decode(xml)
    }
}

/// Status report over a set of orders.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub date_first: Option<NaiveDateTime>,
    pub date_last: Option<NaiveDateTime>,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub dispatch_number: Option<String>,
    pub number: String,
    pub delivery_date: Option<NaiveDateTime>,
    pub recipient_name: Option<String>,
    pub status: Option<Status>,
    pub reason: Option<Reason>,
    pub delay_reason: Option<Reason>,
}

/// Latest known status of an order, with the state history when requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub date: Option<NaiveDateTime>,
    pub code: i32,
    pub description: String,
    pub city_code: Option<i32>,
    pub city_name: Option<String>,
    pub states: Vec<State>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub date: Option<NaiveDateTime>,
    pub code: i32,
    pub description: String,
    pub city_code: Option<i32>,
    pub city_name: Option<String>,
}

/// Delivery problem descriptor. The provider routinely sends these with
/// every attribute empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Reason {
    pub code: String,
    pub date: Option<NaiveDateTime>,
    pub description: String,
}

impl Reason {
    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.description.is_empty() && self.date.is_none()
    }
}

impl XmlResponse for StatusReport {
    fn from_xml(xml: &str) -> Result<Self, Error> {
        let raw: RawStatusReport = decode(xml)?;
        Ok(StatusReport::try_from(raw)?)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStatusReport {
    #[serde(rename = "@DateFirst")]
    date_first: Option<String>,
    #[serde(rename = "@DateLast")]
    date_last: Option<String>,
    #[serde(rename = "Order")]
    orders: Vec<RawOrder>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOrder {
    #[serde(rename = "@DispatchNumber")]
    dispatch_number: Option<String>,
    #[serde(rename = "@Number")]
    number: String,
    #[serde(rename = "@DeliveryDate")]
    delivery_date: Option<String>,
    #[serde(rename = "@RecipientName")]
    recipient_name: Option<String>,
    #[serde(rename = "Status")]
    status: Option<RawStatus>,
    #[serde(rename = "Reason")]
    reason: Option<RawReason>,
    #[serde(rename = "DelayReason")]
    delay_reason: Option<RawReason>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStatus {
    #[serde(rename = "@Date")]
    date: Option<String>,
    #[serde(rename = "@Code")]
    code: i32,
    #[serde(rename = "@Description")]
    description: String,
    #[serde(rename = "@CityCode")]
    city_code: Option<i32>,
    #[serde(rename = "@CityName")]
    city_name: Option<String>,
    #[serde(rename = "State")]
    states: Vec<RawState>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawState {
    #[serde(rename = "@Date")]
    date: Option<String>,
    #[serde(rename = "@Code")]
    code: i32,
    #[serde(rename = "@Description")]
    description: String,
    #[serde(rename = "@CityCode")]
    city_code: Option<i32>,
    #[serde(rename = "@CityName")]
    city_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawReason {
    #[serde(rename = "@Code")]
    code: String,
    #[serde(rename = "@Date")]
    date: Option<String>,
    #[serde(rename = "@Description")]
    description: String,
}

impl TryFrom<RawStatusReport> for StatusReport {
    type Error = DeserializationError;

    fn try_from(raw: RawStatusReport) -> Result<Self, DeserializationError> {
        Ok(Self {
            date_first: DATE_FIRST.parse(raw.date_first.as_deref())?,
            date_last: DATE_LAST.parse(raw.date_last.as_deref())?,
            orders: raw
                .orders
                .into_iter()
                .map(Order::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<RawOrder> for Order {
    type Error = DeserializationError;

    fn try_from(raw: RawOrder) -> Result<Self, DeserializationError> {
        Ok(Self {
            dispatch_number: raw.dispatch_number,
            number: raw.number,
            delivery_date: DELIVERY_DATE.parse(raw.delivery_date.as_deref())?,
            recipient_name: raw.recipient_name,
            status: raw.status.map(Status::try_from).transpose()?,
            reason: raw.reason.map(Reason::try_from).transpose()?,
            delay_reason: raw.delay_reason.map(Reason::try_from).transpose()?,
        })
    }
}

impl TryFrom<RawStatus> for Status {
    type Error = DeserializationError;

    fn try_from(raw: RawStatus) -> Result<Self, DeserializationError> {
        Ok(Self {
            date: STATUS_DATE.parse(raw.date.as_deref())?,
            code: raw.code,
            description: raw.description,
            city_code: raw.city_code,
            city_name: raw.city_name,
            states: raw
                .states
                .into_iter()
                .map(State::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<RawState> for State {
    type Error = DeserializationError;

    fn try_from(raw: RawState) -> Result<Self, DeserializationError> {
        Ok(Self {
            date: STATUS_DATE.parse(raw.date.as_deref())?,
            code: raw.code,
            description: raw.description,
            city_code: raw.city_code,
            city_name: raw.city_name,
        })
    }
}

impl TryFrom<RawReason> for Reason {
    type Error = DeserializationError;

    fn try_from(raw: RawReason) -> Result<Self, DeserializationError> {
        Ok(Self {
            code: raw.code,
            date: REASON_DATE.parse(raw.date.as_deref())?,
            description: raw.description,
        })
    }
}

/// Provider-level error element, e.g. on a bad signature.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderError {
    #[serde(rename = "@ErrorCode")]
    pub code: String,
    #[serde(rename = "@Msg")]
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
    #[serde(rename = "Error")]
    errors: Vec<ProviderError>,
}

// Any endpoint may answer with an error document instead of its normal
// response; the check runs before the typed decode.
pub(crate) fn provider_error(xml: &str) -> Option<ProviderError> {
    let envelope: ErrorEnvelope = quick_xml::de::from_str(xml).ok()?;
    envelope.errors.into_iter().next()
}
