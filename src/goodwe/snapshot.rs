use chrono::{DateTime, Local};
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::Serialize;

pub const DC_CHANNELS: usize = 4;
pub const AC_PHASES: usize = 3;

// Status {{{
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromPrimitive, IntoPrimitive, Serialize)]
#[repr(u16)]
pub enum Status {
    Waiting = 0,
    Normal = 1,
    Error = 2,
    Checking = 3,
    #[num_enum(catch_all)]
    Unknown(u16),
}

impl Status {
    pub fn is_known(&self) -> bool {
        !matches!(self, Status::Unknown(_))
    }
}
// }}}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DcChannel {
    pub voltage: f64,
    pub current: f64,
    /// voltage * current, not transmitted by the inverter
    pub power: f64,
}

impl DcChannel {
    pub fn new(voltage: f64, current: f64) -> Self {
        Self {
            voltage,
            current,
            power: voltage * current,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AcPhase {
    pub voltage: f64,
    pub current: f64,
    pub frequency: f64,
}

/// One decoded inverter reading. Only ever built from a payload that passed
/// length, header, CRC and plausibility checks.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub sample_time: DateTime<Local>,
    pub dc_channels: [DcChannel; DC_CHANNELS],
    pub ac_phases: [AcPhase; AC_PHASES],
    pub ac_power: f64,
    pub status: Status,
    pub temperature: f64,
    /// kWh
    pub yield_today: f64,
    /// kWh
    pub yield_total: f64,
    pub working_hours: f64,
}
