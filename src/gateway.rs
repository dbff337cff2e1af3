//! Payment gateway client.
//!
//! The lifecycle only needs two calls: open a payment (returns an authority token the
//! visitor is redirected with) and verify it after the visitor comes back. Both calls
//! are made once per user action; nothing here retries.

use std::{future::Future, time::Duration};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::GatewayConfig;

/// Gateway status code meaning success.
pub const CODE_SUCCESS: i64 = 100;
/// Gateway status code for a payment that was already verified.
pub const CODE_ALREADY_VERIFIED: i64 = 101;

const API_BASE: &str = "https://api.zarinpal.com/pg/v4/payment";
const SANDBOX_API_BASE: &str = "https://sandbox.zarinpal.com/pg/v4/payment";
const WEBGATE: &str = "https://www.zarinpal.com/pg/StartPay/";
const SANDBOX_WEBGATE: &str = "https://sandbox.zarinpal.com/pg/StartPay/";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment rejected ({code:?}): {message}")]
    Rejected { code: Option<i64>, message: String },

    #[error("malformed gateway response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Message safe to show to the payer.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            _ => "could not reach the payment gateway, please try again".to_string(),
        }
    }
}

/// What the shop asks the gateway to charge.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount: i64,
    pub description: String,
    pub email: String,
    pub mobile: String,
}

pub trait PaymentGateway {
    /// Open a payment and return the gateway's authority token.
    fn request_payment(
        &self,
        request: &PaymentRequest,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Confirm a payment for exactly `amount` and return the gateway reference id.
    fn verify_payment(
        &self,
        authority: &str,
        amount: i64,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Where to send the visitor to complete the payment.
    fn payment_url(&self, authority: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct ZarinpalGateway {
    client: reqwest::Client,
    merchant_id: String,
    callback_url: String,
    api_base: &'static str,
    webgate: &'static str,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    merchant_id: &'a str,
    amount: i64,
    description: &'a str,
    callback_url: &'a str,
    metadata: Metadata<'a>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    email: &'a str,
    mobile: &'a str,
}

#[derive(Serialize)]
struct VerifyBody<'a> {
    merchant_id: &'a str,
    amount: i64,
    authority: &'a str,
}

impl ZarinpalGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let (api_base, webgate) = if config.sandbox {
            (SANDBOX_API_BASE, SANDBOX_WEBGATE)
        } else {
            (API_BASE, WEBGATE)
        };
        Ok(Self {
            client,
            merchant_id: config.merchant_id.clone(),
            callback_url: config.callback_url.clone(),
            api_base,
            webgate,
        })
    }

    async fn post_json<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<Value, GatewayError> {
        let url = format!("{}/{endpoint}", self.api_base);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        // Rejections come back as 4xx with a JSON body, so the body is parsed either way.
        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Malformed(format!("status {status}: {e}")))
    }
}

impl PaymentGateway for ZarinpalGateway {
    async fn request_payment(&self, request: &PaymentRequest) -> Result<String, GatewayError> {
        let body = RequestBody {
            merchant_id: &self.merchant_id,
            amount: request.amount,
            description: &request.description,
            callback_url: &self.callback_url,
            metadata: Metadata {
                email: &request.email,
                mobile: &request.mobile,
            },
        };
        let value = self.post_json("request.json", &body).await?;
        parse_request_response(&value)
    }

    async fn verify_payment(&self, authority: &str, amount: i64) -> Result<String, GatewayError> {
        let body = VerifyBody {
            merchant_id: &self.merchant_id,
            amount,
            authority,
        };
        let value = self.post_json("verify.json", &body).await?;
        parse_verify_response(&value)
    }

    fn payment_url(&self, authority: &str) -> String {
        format!("{}{authority}", self.webgate)
    }
}

/// Extract the authority from a payment-request response.
pub fn parse_request_response(value: &Value) -> Result<String, GatewayError> {
    let data = success_data(value, &[CODE_SUCCESS])?;
    data.get("authority")
        .and_then(Value::as_str)
        .filter(|authority| !authority.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GatewayError::Malformed("missing authority".into()))
}

/// Extract the reference id from a verify response. `ref_id` may be a number or a string.
pub fn parse_verify_response(value: &Value) -> Result<String, GatewayError> {
    let data = success_data(value, &[CODE_SUCCESS, CODE_ALREADY_VERIFIED])?;
    match data.get("ref_id") {
        Some(Value::String(ref_id)) if !ref_id.is_empty() => Ok(ref_id.clone()),
        Some(Value::Number(ref_id)) => Ok(ref_id.to_string()),
        _ => Err(GatewayError::Malformed("missing ref_id".into())),
    }
}

fn success_data<'a>(value: &'a Value, accepted: &[i64]) -> Result<&'a Value, GatewayError> {
    let data = value.get("data").filter(|data| data.is_object());
    let code = data.and_then(|data| data.get("code")).and_then(Value::as_i64);

    match (data, code) {
        (Some(data), Some(code)) if accepted.contains(&code) => Ok(data),
        _ => {
            let errors = value.get("errors");
            let message = errors
                .and_then(|errors| errors.get("message"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let code = code.or_else(|| errors.and_then(|e| e.get("code")).and_then(Value::as_i64));
            Err(GatewayError::Rejected { code, message })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_success_yields_authority() {
        let body = json!({
            "data": { "code": 100, "message": "Success", "authority": "A0000000001" },
            "errors": []
        });
        assert_eq!(parse_request_response(&body).ok().as_deref(), Some("A0000000001"));
    }

    #[test]
    fn request_error_carries_gateway_message() {
        let body = json!({
            "data": [],
            "errors": { "code": -9, "message": "The input params invalid, validation error." }
        });
        match parse_request_response(&body) {
            Err(GatewayError::Rejected { code, message }) => {
                assert_eq!(code, Some(-9));
                assert!(message.contains("validation error"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_success_code_is_rejected() {
        let body = json!({ "data": { "code": -51, "authority": "A1" }, "errors": [] });
        assert!(matches!(
            parse_request_response(&body),
            Err(GatewayError::Rejected { code: Some(-51), .. })
        ));
    }

    #[test]
    fn verify_accepts_numeric_and_string_ref_ids() {
        let numeric = json!({ "data": { "code": 100, "ref_id": 201 }, "errors": [] });
        assert_eq!(parse_verify_response(&numeric).ok().as_deref(), Some("201"));

        let text = json!({ "data": { "code": 101, "ref_id": "R1" }, "errors": [] });
        assert_eq!(parse_verify_response(&text).ok().as_deref(), Some("R1"));
    }

    #[test]
    fn sandbox_config_switches_webgate() {
        let gateway = ZarinpalGateway::new(&GatewayConfig {
            merchant_id: "merchant".into(),
            sandbox: true,
            callback_url: "http://localhost:3000/api/orders/payment/callback".into(),
            timeout_secs: 5,
        })
        .expect("client builds");
        assert_eq!(
            gateway.payment_url("A1"),
            "https://sandbox.zarinpal.com/pg/StartPay/A1"
        );
    }
}
