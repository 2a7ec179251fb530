//! WiZ JSON-over-UDP payloads

use crate::Result;
use ambilight_core::ColorCommand;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// UDP port fixtures listen on for commands and discovery
pub const DEFAULT_PORT: u16 = 38899;

/// Broadcast query every fixture answers with its system config
pub const DISCOVERY_QUERY: &str = r#"{"method":"getSystemConfig","params":{}}"#;

const SET_STATE: &str = "setState";
const REQUEST_ID: u32 = 1;

/// `setState` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetStateRequest {
    /// Always `setState`
    pub method: String,
    /// Request id; fixtures echo it but nobody reads the reply
    pub id: u32,
    /// New state
    pub params: SetStateParams,
}

/// Parameters of a `setState` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStateParams {
    /// Light on
    pub state: bool,
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Dimming level
    pub dimming: u8,
}

impl From<&ColorCommand> for SetStateRequest {
    fn from(command: &ColorCommand) -> Self {
        Self {
            method: SET_STATE.to_string(),
            id: REQUEST_ID,
            params: SetStateParams {
                state: true,
                r: command.r,
                g: command.g,
                b: command.b,
                dimming: command.brightness,
            },
        }
    }
}

/// Serialize a command into a datagram payload
pub fn encode_command(command: &ColorCommand) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&SetStateRequest::from(command))?)
}

/// Why a discovery response was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// Not valid UTF-8 JSON
    NotJson,
    /// JSON, but not an object
    NotObject,
    /// `result` present but not an object
    BadResult,
}

/// Extract a display name from a `getSystemConfig` response
///
/// The name is the first non-empty of `result.moduleName` and `result.mac`,
/// or empty if neither is set. A response without `result` still names a
/// device, with an empty name.
pub fn parse_discovery_response(payload: &[u8]) -> std::result::Result<String, ResponseError> {
    let value: Value = serde_json::from_slice(payload).map_err(|_| ResponseError::NotJson)?;
    let object = value.as_object().ok_or(ResponseError::NotObject)?;

    let result = match object.get("result") {
        None => return Ok(String::new()),
        Some(Value::Object(result)) => result,
        Some(_) => return Err(ResponseError::BadResult),
    };

    let name = ["moduleName", "mac"]
        .iter()
        .filter_map(|key| result.get(*key))
        .find_map(non_empty_text)
        .unwrap_or_default();
    Ok(name)
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_state_wire_format() {
        let payload = encode_command(&ColorCommand::new([255, 10, 0], 200)).unwrap();
        assert_eq!(
            String::from_utf8(payload).unwrap(),
            r#"{"method":"setState","id":1,"params":{"state":true,"r":255,"g":10,"b":0,"dimming":200}}"#
        );
    }

    #[test]
    fn test_query_is_valid_json() {
        let value: Value = serde_json::from_str(DISCOVERY_QUERY).unwrap();
        assert_eq!(value["method"], "getSystemConfig");
        assert!(value["params"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_name_prefers_module_name() {
        let name = parse_discovery_response(
            br#"{"method":"getSystemConfig","result":{"mac":"a8bb50aabbcc","moduleName":"ESP01_SHRGB1C_31"}}"#,
        );
        assert_eq!(name.as_deref(), Ok("ESP01_SHRGB1C_31"));
    }

    #[test]
    fn test_name_falls_back_to_mac() {
        let name = parse_discovery_response(br#"{"result":{"mac":"a8bb50aabbcc","moduleName":""}}"#);
        assert_eq!(name.as_deref(), Ok("a8bb50aabbcc"));
    }

    #[test]
    fn test_name_defaults_to_empty() {
        assert_eq!(parse_discovery_response(br#"{"result":{}}"#).as_deref(), Ok(""));
        assert_eq!(parse_discovery_response(br#"{"id":1}"#).as_deref(), Ok(""));
    }

    #[test]
    fn test_malformed_responses() {
        assert_eq!(parse_discovery_response(b"garbage"), Err(ResponseError::NotJson));
        assert_eq!(parse_discovery_response(&[0xff, 0xfe]), Err(ResponseError::NotJson));
        assert_eq!(parse_discovery_response(b"[1,2]"), Err(ResponseError::NotObject));
        assert_eq!(
            parse_discovery_response(br#"{"result":null}"#),
            Err(ResponseError::BadResult)
        );
        assert_eq!(
            parse_discovery_response(br#"{"result":"ok"}"#),
            Err(ResponseError::BadResult)
        );
    }
}
