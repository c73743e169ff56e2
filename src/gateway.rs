//! Client for the myicomfort cloud API (`DBAcessService.svc`). Fetches
//! account systems and zone state, and pushes complete zone-state writes.

use serde::{Deserialize, Deserializer, de};
use serde_json::{Value, json};
use tracing::debug;

use crate::types::*;
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://services.myicomfort.com/DBAcessService.svc";

/// Gateway credentials and endpoint, injected at construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl GatewayConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

pub struct IComfortGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl IComfortGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// All thermostat systems in the account.
    pub async fn list_systems(&self) -> Result<Vec<SystemInfo>> {
        let url = format!(
            "{}/GetSystemsInfo?userid={}",
            self.config.base_url, self.config.username
        );
        debug!(url = %url, "fetching systems");
        let body: SystemsInfoResponse = self.get_json(&url).await?;
        Ok(body
            .systems
            .into_iter()
            .map(|s| SystemInfo {
                system_id: s.system_id,
                system_name: s.system_name,
                gateway_serial: s.gateway_serial,
                firmware_version: s.firmware_version,
            })
            .collect())
    }

    /// All zones behind one gateway, enabled or not.
    pub async fn list_zones(&self, gateway_serial: &str) -> Result<Vec<ZoneInfo>> {
        let url = format!(
            "{}/GetTStatInfoList?gatewaysn={gateway_serial}&tempunit=&Cancel_Away=-1",
            self.config.base_url
        );
        debug!(url = %url, "fetching zone list");
        let body: TStatInfoResponse = self.get_json(&url).await?;
        Ok(body
            .t_stat_info
            .into_iter()
            .map(|z| ZoneInfo {
                gateway_serial: z.gateway_serial,
                zone_name: z.zone_name,
                zone_number: z.zone_number,
                zones_installed: z.zones_installed,
                enabled: z.zone_enabled == 1,
            })
            .collect())
    }

    /// Current state snapshot for one zone.
    pub async fn read_zone_state(&self, endpoint: &Endpoint) -> Result<ThermostatState> {
        let url = format!(
            "{}/GetTStatInfoList?gatewaysn={}&tempunit=&Cancel_Away=-1&Zone_number={}",
            self.config.base_url, endpoint.gateway_serial, endpoint.zone_number
        );
        debug!(url = %url, "fetching zone state");
        let body: TStatInfoResponse = self.get_json(&url).await?;
        let zone = body
            .t_stat_info
            .into_iter()
            .next()
            .ok_or_else(|| Error::Gateway(format!("no tStatInfo for {endpoint}")))?;

        Ok(ThermostatState {
            gateway_serial: zone.gateway_serial,
            zone_number: zone.zone_number,
            indoor_temperature: zone.indoor_temp,
            heat_setpoint: zone.heat_set_point,
            cool_setpoint: zone.cool_set_point,
            operation_mode: OperationMode::from_icomfort(zone.operation_mode).ok_or_else(|| {
                Error::Gateway(format!("unknown Operation_Mode {}", zone.operation_mode))
            })?,
            fan_mode: FanMode::from_icomfort(zone.fan_mode)
                .ok_or_else(|| Error::Gateway(format!("unknown Fan_Mode {}", zone.fan_mode)))?,
            temperature_units: TemperatureUnits::from_icomfort(zone.pref_temp_units)
                .ok_or_else(|| {
                    Error::Gateway(format!("unknown Pref_Temp_Units {}", zone.pref_temp_units))
                })?,
        })
    }

    /// Push a complete state record for one zone. The vendor API requires
    /// every field each time; unchanged fields come from the snapshot.
    pub async fn write_zone_state(&self, state: &ThermostatState) -> Result<()> {
        let url = format!("{}/SetTStatInfo", self.config.base_url);
        let body = json!({
            "GatewaySN": state.gateway_serial,
            "Zone_Number": state.zone_number,
            "Cool_Set_Point": state.cool_setpoint,
            "Heat_Set_Point": state.heat_setpoint,
            "Fan_Mode": state.fan_mode.icomfort_index(),
            "Operation_Mode": state.operation_mode.icomfort_index(),
            "Pref_Temp_Units": state.temperature_units.icomfort_index(),
        });
        debug!(url = %url, body = %body, "writing zone state");
        self.http
            .put(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self
            .http
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}

// -- Vendor wire shapes --

#[derive(Deserialize)]
struct SystemsInfoResponse {
    #[serde(rename = "Systems", default)]
    systems: Vec<WireSystem>,
}

#[derive(Deserialize)]
struct WireSystem {
    #[serde(rename = "SystemID", deserialize_with = "flex_int", default)]
    system_id: i64,
    #[serde(rename = "System_Name")]
    system_name: String,
    #[serde(rename = "Gateway_SN")]
    gateway_serial: String,
    #[serde(rename = "Firmware_Ver", default)]
    firmware_version: String,
}

#[derive(Deserialize)]
struct TStatInfoResponse {
    #[serde(rename = "tStatInfo", default)]
    t_stat_info: Vec<WireZone>,
}

#[derive(Deserialize)]
struct WireZone {
    #[serde(rename = "GatewaySN")]
    gateway_serial: String,
    #[serde(rename = "Zone_Name", default)]
    zone_name: String,
    #[serde(rename = "Zone_Number", deserialize_with = "flex_u8", default)]
    zone_number: u8,
    #[serde(rename = "Zones_Installed", deserialize_with = "flex_u8", default)]
    zones_installed: u8,
    #[serde(rename = "Zone_Enabled", deserialize_with = "flex_int", default)]
    zone_enabled: i64,
    #[serde(rename = "Indoor_Temp", default)]
    indoor_temp: f64,
    #[serde(rename = "Heat_Set_Point", default)]
    heat_set_point: f64,
    #[serde(rename = "Cool_Set_Point", default)]
    cool_set_point: f64,
    #[serde(rename = "Operation_Mode", deserialize_with = "flex_int", default)]
    operation_mode: i64,
    #[serde(rename = "Fan_Mode", deserialize_with = "flex_int", default)]
    fan_mode: i64,
    #[serde(rename = "Pref_Temp_Units", deserialize_with = "flex_int", default)]
    pref_temp_units: i64,
}

/// The service is inconsistent about numeric fields: some arrive as JSON
/// numbers, some as strings ("0"). Accept both.
fn flex_int<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| de::Error::custom("not an integer")),
        Value::String(s) => s.trim().parse().map_err(de::Error::custom),
        other => Err(de::Error::custom(format!("expected number or string, got {other}"))),
    }
}

fn flex_u8<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let v = flex_int(deserializer)?;
    u8::try_from(v).map_err(de::Error::custom)
}
