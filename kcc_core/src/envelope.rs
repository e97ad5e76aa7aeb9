//! Locates the payload inside the upstream response envelope.
//!
//! The upstream answers in one of several shapes. [`Envelope::classify`] decides the shape once
//! and [`Envelope::into_raw_page`] extracts the raw records from it.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

static SUCCESS_CODE: &str = "00";
static UNKNOWN_CODE: &str = "UNKNOWN_ERROR";
static UNKNOWN_MESSAGE: &str = "알 수 없는 오류";
static SOAP_FAULT_MESSAGE: &str = "SOAP 오류가 발생했습니다";
static SERVICE_ERROR_ROOT: &str = "OpenAPI_ServiceResponse";

/// The known response shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `<response>` or `<Response>` with an optional header and body.
    Response {
        header: Option<Value>,
        body: Option<Value>,
    },
    /// `<soapenv:Envelope>` carrying a `<soapenv:Fault>`.
    SoapFault { fault: Value },
    /// The gateway's `<OpenAPI_ServiceResponse>`, sent e.g. for unregistered service keys.
    ServiceError { header: Value },
}

/// Paging counters reported in the response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub num_of_rows: Option<u32>,
    pub page_no: Option<u32>,
    pub total_count: Option<u32>,
}

/// The raw records of one response, in upstream order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    pub records: Vec<Value>,
    pub pagination: Pagination,
}

/// Classify and unwrap a parsed response in one go.
pub fn normalize(root: Value) -> Result<RawPage> {
    Envelope::classify(root)?.into_raw_page()
}

impl Envelope {
    /// Decide which shape a parsed document has.
    pub fn classify(root: Value) -> Result<Envelope> {
        let Value::Object(root) = root else {
            return Err(Error::MalformedPayload(String::from(
                "document is not an element",
            )));
        };
        let Some((name, mut content)) = root.into_iter().next() else {
            return Err(Error::MalformedPayload(String::from("empty document")));
        };
        match name.as_str() {
            "response" | "Response" => Ok(Envelope::Response {
                header: take_field(&mut content, &["header", "Header"]),
                body: take_field(&mut content, &["body", "Body"]),
            }),
            _ if local_name(&name) == "Envelope" => {
                let fault = take_local_field(&mut content, "Body")
                    .and_then(|mut body| take_local_field(&mut body, "Fault"));
                match fault {
                    Some(fault) => Ok(Envelope::SoapFault { fault }),
                    None => Err(Error::MalformedPayload(String::from(
                        "SOAP envelope without a fault",
                    ))),
                }
            }
            _ if name == SERVICE_ERROR_ROOT => Ok(Envelope::ServiceError {
                header: take_field(&mut content, &["cmmMsgHeader"]).unwrap_or(content),
            }),
            _ => Err(Error::MalformedPayload(format!(
                "unrecognized response envelope <{name}>"
            ))),
        }
    }

    /// Check the result code and extract the records.
    ///
    /// A response without items is an empty page, not an error.
    pub fn into_raw_page(self) -> Result<RawPage> {
        match self {
            Envelope::Response { header, body } => {
                if let Some(header) = header.filter(is_present) {
                    let code = text(header.get("resultCode"));
                    if code.as_deref() != Some(SUCCESS_CODE) {
                        return Err(Error::Upstream {
                            code: code.unwrap_or_else(|| String::from(UNKNOWN_CODE)),
                            message: text(header.get("resultMsg"))
                                .unwrap_or_else(|| String::from(UNKNOWN_MESSAGE)),
                        });
                    }
                }
                let Some(mut body) = body.filter(is_present) else {
                    debug!("response without body");
                    return Ok(RawPage::default());
                };
                let pagination = Pagination {
                    num_of_rows: number(body.get("numOfRows")),
                    page_no: number(body.get("pageNo")),
                    total_count: number(body.get("totalCount")),
                };
                let item = take_field(&mut body, &["items"])
                    .and_then(|mut items| take_field(&mut items, &["item"]))
                    .or_else(|| {
                        take_field(&mut body, &["Items"])
                            .and_then(|mut items| take_field(&mut items, &["Item"]))
                    });
                let records = match item.filter(is_present) {
                    None => vec![],
                    Some(Value::Array(records)) => records,
                    Some(record) => vec![record],
                };
                Ok(RawPage {
                    records,
                    pagination,
                })
            }
            Envelope::SoapFault { fault } => Err(Error::SoapFault {
                fault_string: text(fault.get("faultstring"))
                    .unwrap_or_else(|| String::from(SOAP_FAULT_MESSAGE)),
            }),
            Envelope::ServiceError { header } => Err(Error::Upstream {
                code: text(header.get("returnReasonCode"))
                    .unwrap_or_else(|| String::from(UNKNOWN_CODE)),
                message: text(header.get("returnAuthMsg"))
                    .or_else(|| text(header.get("errMsg")))
                    .unwrap_or_else(|| String::from(UNKNOWN_MESSAGE)),
            }),
        }
    }
}

/// Empty elements parse to `""`, which counts as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}

fn take_field(value: &mut Value, names: &[&str]) -> Option<Value> {
    let object = value.as_object_mut()?;
    names.iter().find_map(|name| object.remove(*name))
}

fn take_local_field(value: &mut Value, local: &str) -> Option<Value> {
    let object = value.as_object_mut()?;
    let key = object.keys().find(|key| local_name(key) == local)?.clone();
    object.remove(&key)
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(object) => text(object.get("_")),
        _ => None,
    }
}

fn number(value: Option<&Value>) -> Option<u32> {
    text(value)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{event::map_records, xml};

    fn parse(xml: &str) -> Value {
        xml::parse(xml).unwrap()
    }

    #[test]
    fn test_normalize_response() {
        let page = normalize(parse(include_str!("culture_client/tests/response.xml"))).unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.records[0]["seq"], json!("312345"));
        assert_eq!(page.records[2]["seq"], json!("312401"));
        assert_eq!(
            page.pagination,
            Pagination {
                num_of_rows: Some(10),
                page_no: Some(1),
                total_count: Some(3),
            }
        );
    }

    #[test]
    fn test_normalize_capitalized_single_item() {
        let root = parse(include_str!("culture_client/tests/response_single.xml"));
        let envelope = Envelope::classify(root).unwrap();
        assert!(matches!(envelope, Envelope::Response { .. }));
        let page = envelope.into_raw_page().unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0]["title"], json!("부산국제무용제"));
        assert_eq!(page.pagination.total_count, Some(1));
    }

    #[test]
    fn test_normalize_without_items() {
        let page = normalize(parse(include_str!("culture_client/tests/response_empty.xml"))).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.pagination.total_count, Some(0));

        let page = normalize(json!({ "response": { "header": { "resultCode": "00" } } })).unwrap();
        assert_eq!(page, RawPage::default());

        let page = normalize(json!({ "response": { "body": { "items": { "item": "" } } } })).unwrap();
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_normalize_result_code() {
        let err = normalize(parse(include_str!("culture_client/tests/response_error.xml"))).unwrap_err();
        match err {
            Error::Upstream { code, message } => {
                assert_eq!(code, "99");
                assert_eq!(message, "LIMITED NUMBER OF SERVICE REQUESTS EXCEEDS ERROR.");
            }
            err => panic!("unexpected error {err:?}"),
        }

        let err = normalize(json!({ "response": { "header": { "resultMsg": "?" } } })).unwrap_err();
        assert_eq!(err.upstream_code(), Some(UNKNOWN_CODE));
    }

    #[test]
    fn test_normalize_soap_fault() {
        let root = parse(include_str!("culture_client/tests/soap_fault.xml"));
        let envelope = Envelope::classify(root).unwrap();
        assert!(matches!(envelope, Envelope::SoapFault { .. }));
        match envelope.into_raw_page().unwrap_err() {
            Error::SoapFault { fault_string } => assert_eq!(fault_string, "Policy Falsified"),
            err => panic!("unexpected error {err:?}"),
        }

        let err = normalize(parse(
            "<soap:Envelope><soap:Body><soap:Fault/></soap:Body></soap:Envelope>",
        ))
        .unwrap_err();
        assert!(matches!(err, Error::SoapFault { fault_string } if fault_string == SOAP_FAULT_MESSAGE));
    }

    #[test]
    fn test_normalize_service_error() {
        let err = normalize(parse(include_str!("culture_client/tests/service_error.xml"))).unwrap_err();
        match err {
            Error::Upstream { code, message } => {
                assert_eq!(code, "30");
                assert_eq!(message, "SERVICE_KEY_IS_NOT_REGISTERED_ERROR");
            }
            err => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn test_normalize_unknown_envelope() {
        let err = normalize(parse("<html><body>502 Bad Gateway</body></html>")).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
        let err = normalize(parse("<soapenv:Envelope><soapenv:Body/></soapenv:Envelope>")).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let root = parse(include_str!("culture_client/tests/response.xml"));
        let first = map_records(&normalize(root.clone()).unwrap().records).unwrap();
        let second = map_records(&normalize(root).unwrap().records).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }
}
