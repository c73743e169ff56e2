use std::fmt;

use crate::{Error, Result};

/// One controllable zone, addressed as `"<gatewaySerial>:<zoneNumber>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub gateway_serial: String,
    pub zone_number: u8,
}

impl Endpoint {
    pub fn parse(id: &str) -> Result<Self> {
        let (serial, zone) = id
            .split_once(':')
            .ok_or_else(|| Error::InvalidEndpoint(id.to_string()))?;
        if serial.is_empty() {
            return Err(Error::InvalidEndpoint(id.to_string()));
        }
        let zone_number = zone
            .parse()
            .map_err(|_| Error::InvalidEndpoint(id.to_string()))?;
        Ok(Self {
            gateway_serial: serial.to_string(),
            zone_number,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.gateway_serial, self.zone_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    Off,
    Heat,
    Cool,
    Auto,
}

impl OperationMode {
    /// Decode the iComfort `Operation_Mode` index.
    pub fn from_icomfort(index: i64) -> Option<Self> {
        match index {
            0 => Some(OperationMode::Off),
            1 => Some(OperationMode::Heat),
            2 => Some(OperationMode::Cool),
            3 => Some(OperationMode::Auto),
            _ => None,
        }
    }

    pub fn icomfort_index(&self) -> i64 {
        match self {
            OperationMode::Off => 0,
            OperationMode::Heat => 1,
            OperationMode::Cool => 2,
            OperationMode::Auto => 3,
        }
    }

    pub fn as_alexa_str(&self) -> &'static str {
        match self {
            OperationMode::Off => "OFF",
            OperationMode::Heat => "HEAT",
            OperationMode::Cool => "COOL",
            OperationMode::Auto => "AUTO",
        }
    }

    /// ECO is declared in discovery but has no iComfort encoding, so it
    /// is rejected here along with anything else unrecognized.
    pub fn from_alexa_str(s: &str) -> Option<Self> {
        match s {
            "OFF" => Some(OperationMode::Off),
            "HEAT" => Some(OperationMode::Heat),
            "COOL" => Some(OperationMode::Cool),
            "AUTO" => Some(OperationMode::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanMode {
    Auto,
    On,
    Circulate,
}

impl FanMode {
    pub fn from_icomfort(index: i64) -> Option<Self> {
        match index {
            0 => Some(FanMode::Auto),
            1 => Some(FanMode::On),
            2 => Some(FanMode::Circulate),
            _ => None,
        }
    }

    pub fn icomfort_index(&self) -> i64 {
        match self {
            FanMode::Auto => 0,
            FanMode::On => 1,
            FanMode::Circulate => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnits {
    Fahrenheit,
    Celsius,
}

impl TemperatureUnits {
    pub fn from_icomfort(index: i64) -> Option<Self> {
        match index {
            0 => Some(TemperatureUnits::Fahrenheit),
            1 => Some(TemperatureUnits::Celsius),
            _ => None,
        }
    }

    pub fn icomfort_index(&self) -> i64 {
        match self {
            TemperatureUnits::Fahrenheit => 0,
            TemperatureUnits::Celsius => 1,
        }
    }

    pub fn as_alexa_scale(&self) -> &'static str {
        match self {
            TemperatureUnits::Fahrenheit => "FAHRENHEIT",
            TemperatureUnits::Celsius => "CELSIUS",
        }
    }
}

/// Heat/cool setpoint bounds. `low` is the heat setpoint, `high` the cool
/// setpoint; `low <= high` always holds for pairs produced by the policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetpointPair {
    pub low: f64,
    pub high: f64,
}

impl SetpointPair {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Snapshot of one zone, fetched fresh per directive and never cached.
/// Carries the identity fields the vendor write API needs passed back.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermostatState {
    pub gateway_serial: String,
    pub zone_number: u8,
    pub indoor_temperature: f64,
    pub heat_setpoint: f64,
    pub cool_setpoint: f64,
    pub operation_mode: OperationMode,
    pub fan_mode: FanMode,
    pub temperature_units: TemperatureUnits,
}

impl ThermostatState {
    pub fn setpoints(&self) -> SetpointPair {
        SetpointPair::new(self.heat_setpoint, self.cool_setpoint)
    }

    pub fn apply_setpoints(&mut self, pair: SetpointPair) {
        self.heat_setpoint = pair.low;
        self.cool_setpoint = pair.high;
    }
}

/// One thermostat system as listed by `GetSystemsInfo`.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub system_id: i64,
    pub system_name: String,
    pub gateway_serial: String,
    pub firmware_version: String,
}

/// One zone as listed by `GetTStatInfoList`.
#[derive(Debug, Clone)]
pub struct ZoneInfo {
    pub gateway_serial: String,
    pub zone_name: String,
    pub zone_number: u8,
    pub zones_installed: u8,
    pub enabled: bool,
}

impl ZoneInfo {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            gateway_serial: self.gateway_serial.clone(),
            zone_number: self.zone_number,
        }
    }
}
