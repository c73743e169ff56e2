//! Builds Alexa smart-home response envelopes: discovery catalogs, state
//! reports, control acknowledgements, and error responses. No I/O and no
//! semantic validation; structure rules only.

use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

/// Header and envelope fields for one response. Field defaults mirror the
/// protocol defaults: namespace `Alexa`, name `Response`, payload version 3.
pub struct ResponseConfig {
    pub namespace: String,
    pub name: String,
    pub payload_version: String,
    pub endpoint_id: Option<String>,
    pub token: Option<String>,
    pub correlation_token: Option<String>,
    pub cookie: Option<Value>,
    pub payload: Option<Value>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            namespace: "Alexa".to_string(),
            name: "Response".to_string(),
            payload_version: "3".to_string(),
            endpoint_id: None,
            token: None,
            correlation_token: None,
            cookie: None,
            payload: None,
        }
    }
}

/// One capability block for a discovery response. `supported` and
/// `configuration` are omitted from the output entirely when empty/unset.
pub struct CapabilityConfig {
    pub interface: String,
    pub version: String,
    pub supported: Vec<String>,
    pub retrievable: bool,
    pub proactively_reported: bool,
    pub configuration: Option<Value>,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            interface: "Alexa".to_string(),
            version: "3".to_string(),
            supported: Vec::new(),
            retrievable: false,
            proactively_reported: false,
            configuration: None,
        }
    }
}

/// One endpoint descriptor for a discovery response.
pub struct DiscoveredEndpoint {
    pub friendly_name: String,
    pub endpoint_id: String,
    pub manufacturer_name: String,
    pub description: String,
    pub display_categories: Vec<String>,
    pub capabilities: Vec<Value>,
    pub additional_attributes: Value,
}

pub struct AlexaResponse {
    event: Value,
    context_properties: Vec<Value>,
    payload_endpoints: Vec<Value>,
}

impl AlexaResponse {
    pub fn new(config: ResponseConfig) -> Self {
        let ResponseConfig {
            namespace,
            name,
            payload_version,
            endpoint_id,
            token,
            correlation_token,
            cookie,
            payload,
        } = config;

        let mut header = json!({
            "namespace": namespace,
            "name": name,
            "messageId": Uuid::new_v4().to_string(),
            "payloadVersion": payload_version,
        });
        if let Some(ct) = correlation_token {
            header["correlationToken"] = Value::String(ct);
        }

        let mut event = json!({
            "header": header,
            "payload": payload.unwrap_or_else(|| json!({})),
        });

        // AcceptGrant.Response and Discover.Response carry no endpoint
        // block; neither does any response built without an endpoint id.
        let endpoint_less =
            matches!(event["header"]["name"].as_str(), Some("AcceptGrant.Response" | "Discover.Response"));
        if !endpoint_less && let Some(id) = endpoint_id {
            let mut endpoint = json!({
                "scope": {
                    "type": "BearerToken",
                    "token": token.unwrap_or_else(|| "INVALID".to_string()),
                },
                "endpointId": id,
            });
            if let Some(cookie) = cookie {
                endpoint["cookie"] = cookie;
            }
            event["endpoint"] = endpoint;
        }

        Self {
            event,
            context_properties: Vec::new(),
            payload_endpoints: Vec::new(),
        }
    }

    /// Shaped error response. Uses the same envelope as success responses;
    /// the endpoint block is present only when an endpoint id is known.
    pub fn error(error_type: &str, message: &str, endpoint_id: Option<String>) -> Self {
        Self::new(ResponseConfig {
            name: "ErrorResponse".to_string(),
            endpoint_id,
            payload: Some(json!({
                "type": error_type,
                "message": message,
            })),
            ..Default::default()
        })
    }

    /// Append a timestamped context property. No dedup.
    pub fn add_context_property(
        &mut self,
        namespace: &str,
        name: &str,
        value: Value,
        uncertainty_ms: u64,
    ) {
        self.context_properties.push(json!({
            "namespace": namespace,
            "name": name,
            "value": value,
            "timeOfSample": utc_timestamp(),
            "uncertaintyInMilliseconds": uncertainty_ms,
        }));
    }

    /// Append one endpoint descriptor to the discovery payload.
    pub fn add_discovered_endpoint(&mut self, endpoint: DiscoveredEndpoint) {
        self.payload_endpoints.push(json!({
            "endpointId": endpoint.endpoint_id,
            "friendlyName": endpoint.friendly_name,
            "manufacturerName": endpoint.manufacturer_name,
            "description": endpoint.description,
            "displayCategories": endpoint.display_categories,
            "capabilities": endpoint.capabilities,
            "additionalAttributes": endpoint.additional_attributes,
        }));
    }

    /// Build one capability block. `properties` and `configuration` keys
    /// are absent (never null or empty) when not supplied.
    pub fn capability(config: CapabilityConfig) -> Value {
        let mut cap = json!({
            "type": "AlexaInterface",
            "interface": config.interface,
            "version": config.version,
        });
        if !config.supported.is_empty() {
            let supported: Vec<Value> = config
                .supported
                .iter()
                .map(|name| json!({ "name": name }))
                .collect();
            cap["properties"] = json!({
                "supported": supported,
                "proactivelyReported": config.proactively_reported,
                "retrievable": config.retrievable,
            });
        }
        if let Some(configuration) = config.configuration {
            cap["configuration"] = configuration;
        }
        cap
    }

    /// Finalize into the complete response object. The `context` wrapper
    /// appears only if at least one property was added; `payload.endpoints`
    /// only if at least one endpoint was added.
    pub fn finalize(mut self) -> Value {
        if !self.payload_endpoints.is_empty() {
            self.event["payload"]["endpoints"] = Value::Array(self.payload_endpoints);
        }
        if self.context_properties.is_empty() {
            json!({ "event": self.event })
        } else {
            json!({
                "context": { "properties": self.context_properties },
                "event": self.event,
            })
        }
    }
}

/// Current UTC instant as ISO-8601 `YYYY-MM-DDThh:mm:ssZ`.
fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_response_has_header_and_empty_payload() {
        let response = AlexaResponse::new(ResponseConfig::default()).finalize();
        assert_eq!(response["event"]["header"]["namespace"], "Alexa");
        assert_eq!(response["event"]["header"]["name"], "Response");
        assert_eq!(response["event"]["header"]["payloadVersion"], "3");
        assert!(!response["event"]["header"]["messageId"].as_str().unwrap().is_empty());
        assert!(response["event"]["payload"].as_object().unwrap().is_empty());
        assert!(response.get("context").is_none());
    }

    #[test]
    fn discover_response_omits_endpoint() {
        let response = AlexaResponse::new(ResponseConfig {
            namespace: "Alexa.Discovery".to_string(),
            name: "Discover.Response".to_string(),
            endpoint_id: Some("WS21B12345:0".to_string()),
            ..Default::default()
        })
        .finalize();
        assert!(response["event"].get("endpoint").is_none());
    }

    #[test]
    fn accept_grant_response_omits_endpoint() {
        let response = AlexaResponse::new(ResponseConfig {
            namespace: "Alexa.Authorization".to_string(),
            name: "AcceptGrant.Response".to_string(),
            ..Default::default()
        })
        .finalize();
        assert!(response["event"].get("endpoint").is_none());
    }

    #[test]
    fn endpoint_block_present_with_endpoint_id() {
        let response = AlexaResponse::new(ResponseConfig {
            name: "StateReport".to_string(),
            endpoint_id: Some("WS21B12345:0".to_string()),
            token: Some("access-token".to_string()),
            ..Default::default()
        })
        .finalize();
        let endpoint = &response["event"]["endpoint"];
        assert_eq!(endpoint["endpointId"], "WS21B12345:0");
        assert_eq!(endpoint["scope"]["type"], "BearerToken");
        assert_eq!(endpoint["scope"]["token"], "access-token");
    }

    #[test]
    fn error_response_without_endpoint_id_has_no_endpoint_block() {
        let response = AlexaResponse::error("INVALID_DIRECTIVE", "missing directive", None).finalize();
        assert_eq!(response["event"]["header"]["name"], "ErrorResponse");
        assert_eq!(response["event"]["payload"]["type"], "INVALID_DIRECTIVE");
        assert!(response["event"].get("endpoint").is_none());
    }

    #[test]
    fn correlation_token_echoed_when_present() {
        let response = AlexaResponse::new(ResponseConfig {
            correlation_token: Some("corr-123".to_string()),
            endpoint_id: Some("WS21B12345:0".to_string()),
            ..Default::default()
        })
        .finalize();
        assert_eq!(response["event"]["header"]["correlationToken"], "corr-123");
    }

    #[test]
    fn context_wrapper_only_with_properties() {
        let mut builder = AlexaResponse::new(ResponseConfig {
            name: "StateReport".to_string(),
            endpoint_id: Some("WS21B12345:0".to_string()),
            ..Default::default()
        });
        builder.add_context_property(
            "Alexa.TemperatureSensor",
            "temperature",
            json!({ "value": 70.0, "scale": "FAHRENHEIT" }),
            0,
        );
        let response = builder.finalize();
        let props = response["context"]["properties"].as_array().unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0]["namespace"], "Alexa.TemperatureSensor");
        assert_eq!(props[0]["value"]["value"], 70.0);
        assert_eq!(props[0]["uncertaintyInMilliseconds"], 0);
        // timeOfSample is second-resolution UTC with Z suffix
        let ts = props[0]["timeOfSample"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2026-01-01T00:00:00Z".len());
    }

    #[test]
    fn capability_without_supported_omits_properties() {
        let cap = AlexaResponse::capability(CapabilityConfig::default());
        assert_eq!(cap["type"], "AlexaInterface");
        assert_eq!(cap["interface"], "Alexa");
        assert_eq!(cap["version"], "3");
        assert!(cap.get("properties").is_none());
        assert!(cap.get("configuration").is_none());
    }

    #[test]
    fn capability_with_supported_and_configuration() {
        let cap = AlexaResponse::capability(CapabilityConfig {
            interface: "Alexa.ThermostatController".to_string(),
            version: "3.2".to_string(),
            supported: vec!["targetSetpoint".to_string(), "thermostatMode".to_string()],
            retrievable: true,
            configuration: Some(json!({ "supportedModes": ["OFF", "HEAT"] })),
            ..Default::default()
        });
        assert_eq!(cap["properties"]["retrievable"], true);
        assert_eq!(cap["properties"]["proactivelyReported"], false);
        assert_eq!(cap["properties"]["supported"][0]["name"], "targetSetpoint");
        assert_eq!(cap["configuration"]["supportedModes"][0], "OFF");
    }

    #[test]
    fn discovery_endpoints_land_in_payload() {
        let mut builder = AlexaResponse::new(ResponseConfig {
            namespace: "Alexa.Discovery".to_string(),
            name: "Discover.Response".to_string(),
            ..Default::default()
        });
        builder.add_discovered_endpoint(DiscoveredEndpoint {
            friendly_name: "Upstairs".to_string(),
            endpoint_id: "WS21B12345:1".to_string(),
            manufacturer_name: "Lennox".to_string(),
            description: "Wi-Fi Thermostat by Lennox".to_string(),
            display_categories: vec!["THERMOSTAT".to_string()],
            capabilities: vec![AlexaResponse::capability(CapabilityConfig::default())],
            additional_attributes: json!({ "serialNumber": "WS21B12345" }),
        });
        let response = builder.finalize();
        let endpoints = response["event"]["payload"]["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0]["endpointId"], "WS21B12345:1");
        assert_eq!(endpoints[0]["friendlyName"], "Upstairs");
        assert_eq!(endpoints[0]["additionalAttributes"]["serialNumber"], "WS21B12345");
    }
}
