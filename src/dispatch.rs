//! Routes inbound Alexa directives to handlers and shapes the replies.
//! Each invocation is synchronous end-to-end: read state, decide, write
//! state, report. Nothing is cached across invocations.

use serde_json::{Value, json};
use tracing::debug;

use crate::gateway::IComfortGateway;
use crate::policy;
use crate::response::{AlexaResponse, CapabilityConfig, DiscoveredEndpoint, ResponseConfig};
use crate::types::{Endpoint, OperationMode};
use crate::{Error, Result};

const MANUFACTURER: &str = "Lennox";
const DESCRIPTION: &str = "Wi-Fi Thermostat by Lennox";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectiveKind {
    AcceptGrant,
    Discover,
    ReportState,
    SetTargetTemperature,
    AdjustTargetTemperature,
    SetThermostatMode,
    ResumeSchedule,
    Unsupported,
}

impl DirectiveKind {
    fn from_parts(namespace: &str, name: &str) -> Self {
        match (namespace, name) {
            ("Alexa.Authorization", "AcceptGrant") => Self::AcceptGrant,
            ("Alexa.Discovery", "Discover") => Self::Discover,
            ("Alexa", "ReportState") => Self::ReportState,
            ("Alexa.ThermostatController", "SetTargetTemperature") => Self::SetTargetTemperature,
            ("Alexa.ThermostatController", "AdjustTargetTemperature") => {
                Self::AdjustTargetTemperature
            }
            ("Alexa.ThermostatController", "SetThermostatMode") => Self::SetThermostatMode,
            ("Alexa.ThermostatController", "ResumeSchedule") => Self::ResumeSchedule,
            _ => Self::Unsupported,
        }
    }
}

/// Envelope fields echoed back in responses.
struct DirectiveContext {
    endpoint_id: Option<String>,
    token: Option<String>,
    correlation_token: Option<String>,
}

impl DirectiveContext {
    fn from_directive(directive: &Value) -> Self {
        let field = |ptr: &str| {
            directive
                .pointer(ptr)
                .and_then(|v| v.as_str())
                .map(String::from)
        };
        Self {
            endpoint_id: field("/endpoint/endpointId"),
            token: field("/endpoint/scope/token"),
            correlation_token: field("/header/correlationToken"),
        }
    }

    fn require_endpoint_id(&self) -> Result<&str> {
        self.endpoint_id
            .as_deref()
            .ok_or_else(|| Error::MissingField("endpoint.endpointId".to_string()))
    }
}

pub struct DirectiveDispatcher {
    gateway: IComfortGateway,
}

impl DirectiveDispatcher {
    pub fn new(gateway: IComfortGateway) -> Self {
        Self { gateway }
    }

    /// Handle one inbound request. Always produces a shaped response,
    /// except for `ResumeSchedule` which is a recognized no-op.
    pub async fn handle(&self, request: &Value) -> Option<Value> {
        let Some(directive) = request.get("directive") else {
            return Some(
                AlexaResponse::error(
                    "INVALID_DIRECTIVE",
                    "Missing key: directive. Is the request a valid Alexa directive?",
                    None,
                )
                .finalize(),
            );
        };

        let payload_version = match directive.pointer("/header/payloadVersion") {
            Some(Value::String(s)) => s.parse::<f64>().ok(),
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        };
        if payload_version.is_none_or(|v| v < 3.0) {
            return Some(
                AlexaResponse::error(
                    "INTERNAL_ERROR",
                    "This skill only supports Smart Home API version 3",
                    None,
                )
                .finalize(),
            );
        }

        let namespace = directive
            .pointer("/header/namespace")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let name = directive
            .pointer("/header/name")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let kind = DirectiveKind::from_parts(namespace, name);
        debug!(namespace, name, ?kind, "routing directive");

        let ctx = DirectiveContext::from_directive(directive);
        let payload = directive.get("payload").cloned().unwrap_or_else(|| json!({}));

        let result = match kind {
            DirectiveKind::AcceptGrant => Ok(accept_grant()),
            DirectiveKind::Discover => self.discover().await,
            DirectiveKind::ReportState => self.report_state(&ctx).await,
            DirectiveKind::SetTargetTemperature => {
                self.set_target_temperature(&ctx, &payload).await
            }
            DirectiveKind::AdjustTargetTemperature => {
                self.adjust_target_temperature(&ctx, &payload).await
            }
            DirectiveKind::SetThermostatMode => self.set_thermostat_mode(&ctx, &payload).await,
            DirectiveKind::ResumeSchedule => return None,
            DirectiveKind::Unsupported => Ok(AlexaResponse::error(
                "INVALID_DIRECTIVE",
                &format!("unsupported directive: {namespace}::{name}"),
                ctx.endpoint_id.clone(),
            )
            .finalize()),
        };

        Some(result.unwrap_or_else(|err| error_response(&err, ctx.endpoint_id)))
    }

    /// All enabled zones across all account systems, one endpoint each.
    /// Single-zone systems are named after the system, multi-zone systems
    /// after the individual zone.
    async fn discover(&self) -> Result<Value> {
        let mut response = AlexaResponse::new(ResponseConfig {
            namespace: "Alexa.Discovery".to_string(),
            name: "Discover.Response".to_string(),
            ..Default::default()
        });

        let capabilities = thermostat_capabilities();
        for system in self.gateway.list_systems().await? {
            for zone in self.gateway.list_zones(&system.gateway_serial).await? {
                if !zone.enabled {
                    continue;
                }
                let friendly_name = if zone.zones_installed > 1 {
                    zone.zone_name.clone()
                } else {
                    system.system_name.clone()
                };
                response.add_discovered_endpoint(DiscoveredEndpoint {
                    friendly_name,
                    endpoint_id: zone.endpoint().to_string(),
                    manufacturer_name: MANUFACTURER.to_string(),
                    description: DESCRIPTION.to_string(),
                    display_categories: vec![
                        "THERMOSTAT".to_string(),
                        "TEMPERATURE_SENSOR".to_string(),
                    ],
                    capabilities: capabilities.clone(),
                    additional_attributes: json!({
                        "serialNumber": &system.gateway_serial,
                        "firmwareVersion": &system.firmware_version,
                        "customIdentifier": system.system_id.to_string(),
                    }),
                });
            }
        }
        Ok(response.finalize())
    }

    async fn report_state(&self, ctx: &DirectiveContext) -> Result<Value> {
        self.state_report("StateReport", ctx).await
    }

    async fn set_target_temperature(
        &self,
        ctx: &DirectiveContext,
        payload: &Value,
    ) -> Result<Value> {
        let endpoint = Endpoint::parse(ctx.require_endpoint_id()?)?;
        let mut state = self.gateway.read_zone_state(&endpoint).await?;

        // A single value is ambiguous in AUTO; the policy picks the side.
        // Two values set both bounds directly.
        let new_pair = if let Some(target) =
            payload.pointer("/targetSetpoint/value").and_then(|v| v.as_f64())
        {
            policy::set_absolute(
                state.operation_mode,
                state.setpoints(),
                state.indoor_temperature,
                target,
            )
        } else {
            let low = payload
                .pointer("/lowerSetpoint/value")
                .and_then(|v| v.as_f64())
                .ok_or_else(|| Error::MissingField("payload.lowerSetpoint.value".to_string()))?;
            let high = payload
                .pointer("/upperSetpoint/value")
                .and_then(|v| v.as_f64())
                .ok_or_else(|| Error::MissingField("payload.upperSetpoint.value".to_string()))?;
            policy::set_pair(low, high)
        };

        debug!(low = new_pair.low, high = new_pair.high, %endpoint, "writing setpoints");
        state.apply_setpoints(new_pair);
        self.gateway.write_zone_state(&state).await?;
        self.state_report("Response", ctx).await
    }

    async fn adjust_target_temperature(
        &self,
        ctx: &DirectiveContext,
        payload: &Value,
    ) -> Result<Value> {
        let endpoint = Endpoint::parse(ctx.require_endpoint_id()?)?;
        let delta = payload
            .pointer("/targetSetpointDelta/value")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| Error::MissingField("payload.targetSetpointDelta.value".to_string()))?;

        let mut state = self.gateway.read_zone_state(&endpoint).await?;
        let new_pair = policy::adjust_by_delta(state.operation_mode, state.setpoints(), delta);

        debug!(delta, low = new_pair.low, high = new_pair.high, %endpoint, "adjusting setpoints");
        state.apply_setpoints(new_pair);
        self.gateway.write_zone_state(&state).await?;
        self.state_report("Response", ctx).await
    }

    async fn set_thermostat_mode(&self, ctx: &DirectiveContext, payload: &Value) -> Result<Value> {
        let endpoint = Endpoint::parse(ctx.require_endpoint_id()?)?;
        let mode_str = payload
            .pointer("/thermostatMode/value")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::MissingField("payload.thermostatMode.value".to_string()))?;
        let mode = OperationMode::from_alexa_str(mode_str)
            .ok_or_else(|| Error::InvalidMode(mode_str.to_string()))?;

        let mut state = self.gateway.read_zone_state(&endpoint).await?;
        debug!(from = state.operation_mode.as_alexa_str(), to = mode.as_alexa_str(), %endpoint, "setting mode");
        state.operation_mode = mode;
        self.gateway.write_zone_state(&state).await?;
        self.state_report("Response", ctx).await
    }

    /// Fetch a fresh snapshot and report it. HEAT and COOL report a single
    /// `targetSetpoint`; other modes report both bounds.
    async fn state_report(&self, name: &str, ctx: &DirectiveContext) -> Result<Value> {
        let endpoint_id = ctx.require_endpoint_id()?;
        let endpoint = Endpoint::parse(endpoint_id)?;
        let state = self.gateway.read_zone_state(&endpoint).await?;
        let scale = state.temperature_units.as_alexa_scale();

        let mut response = AlexaResponse::new(ResponseConfig {
            name: name.to_string(),
            endpoint_id: Some(endpoint_id.to_string()),
            token: ctx.token.clone(),
            correlation_token: ctx.correlation_token.clone(),
            ..Default::default()
        });
        response.add_context_property(
            "Alexa.EndpointHealth",
            "connectivity",
            json!({ "value": "OK" }),
            0,
        );
        response.add_context_property(
            "Alexa.TemperatureSensor",
            "temperature",
            json!({ "value": state.indoor_temperature, "scale": scale }),
            0,
        );
        response.add_context_property(
            "Alexa.ThermostatController",
            "thermostatMode",
            json!({ "value": state.operation_mode.as_alexa_str() }),
            0,
        );
        match state.operation_mode {
            OperationMode::Cool => response.add_context_property(
                "Alexa.ThermostatController",
                "targetSetpoint",
                json!({ "value": state.cool_setpoint, "scale": scale }),
                0,
            ),
            OperationMode::Heat => response.add_context_property(
                "Alexa.ThermostatController",
                "targetSetpoint",
                json!({ "value": state.heat_setpoint, "scale": scale }),
                0,
            ),
            OperationMode::Auto | OperationMode::Off => {
                response.add_context_property(
                    "Alexa.ThermostatController",
                    "lowerSetpoint",
                    json!({ "value": state.heat_setpoint, "scale": scale }),
                    0,
                );
                response.add_context_property(
                    "Alexa.ThermostatController",
                    "upperSetpoint",
                    json!({ "value": state.cool_setpoint, "scale": scale }),
                    0,
                );
            }
        }
        Ok(response.finalize())
    }
}

/// Grants are accepted unconditionally; no token exchange is performed.
fn accept_grant() -> Value {
    AlexaResponse::new(ResponseConfig {
        namespace: "Alexa.Authorization".to_string(),
        name: "AcceptGrant.Response".to_string(),
        ..Default::default()
    })
    .finalize()
}

/// Fixed capability declaration, emitted verbatim on every discovery
/// response.
fn thermostat_capabilities() -> Vec<Value> {
    vec![
        AlexaResponse::capability(CapabilityConfig::default()),
        AlexaResponse::capability(CapabilityConfig {
            interface: "Alexa.EndpointHealth".to_string(),
            version: "3.2".to_string(),
            supported: vec!["connectivity".to_string()],
            retrievable: true,
            ..Default::default()
        }),
        AlexaResponse::capability(CapabilityConfig {
            interface: "Alexa.TemperatureSensor".to_string(),
            supported: vec!["temperature".to_string()],
            retrievable: true,
            ..Default::default()
        }),
        AlexaResponse::capability(CapabilityConfig {
            interface: "Alexa.ThermostatController".to_string(),
            version: "3.2".to_string(),
            supported: vec![
                "targetSetpoint".to_string(),
                "lowerSetpoint".to_string(),
                "upperSetpoint".to_string(),
                "thermostatMode".to_string(),
            ],
            retrievable: true,
            configuration: Some(json!({
                "supportedModes": ["OFF", "HEAT", "COOL", "AUTO", "ECO"],
            })),
            ..Default::default()
        }),
    ]
}

fn error_response(err: &Error, endpoint_id: Option<String>) -> Value {
    let error_type = match err {
        Error::Http(_) | Error::Json(_) | Error::Gateway(_) => "ENDPOINT_UNREACHABLE",
        Error::InvalidEndpoint(_) | Error::MissingField(_) => "INVALID_DIRECTIVE",
        Error::InvalidMode(_) => "INVALID_VALUE",
    };
    AlexaResponse::error(error_type, &err.to_string(), endpoint_id).finalize()
}
