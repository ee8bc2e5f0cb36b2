use crate::error::ExchangeError;
use crate::goodwe::crc;
use crate::goodwe::decode::{self, Width};
use crate::goodwe::snapshot::*;

use log::{debug, warn};

pub const HEADER: [u8; 2] = [0xAA, 0x55];
pub const PAYLOAD_LEN: usize = 149;
/// header + payload + checksum
pub const RESPONSE_LEN: usize = HEADER.len() + PAYLOAD_LEN + 2;

/// Raw-max voltage reported by phases that are not wired.
pub const SENTINEL_VOLTAGE: f64 = 6553.5;

/// kWh
pub const MAX_YIELD_TODAY: f64 = 6500.0;
/// kWh
pub const MAX_YIELD_TOTAL: f64 = 4_000_000.0;

// Field table {{{
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    DcVoltage(usize),
    DcCurrent(usize),
    AcVoltage(usize),
    AcCurrent(usize),
    AcFrequency(usize),
    AcPower,
    StatusCode,
    Temperature,
    YieldToday,
    YieldTotal,
    WorkingHours,
}

#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    /// byte offset within the payload
    pub offset: usize,
    pub width: Width,
    pub exponent: i32,
    pub target: Target,
}

const fn field(
    name: &'static str,
    offset: usize,
    width: Width,
    exponent: i32,
    target: Target,
) -> Field {
    Field {
        name,
        offset,
        width,
        exponent,
        target,
    }
}

use Target::*;
use Width::*;

static DT_FIELDS: [Field; 23] = [
    field("v_pv_1", 9, U16, -1, DcVoltage(0)),
    field("i_pv_1", 11, U16, -1, DcCurrent(0)),
    field("v_pv_2", 13, U16, -1, DcVoltage(1)),
    field("i_pv_2", 15, U16, -1, DcCurrent(1)),
    field("v_pv_3", 17, U16, -1, DcVoltage(2)),
    field("i_pv_3", 19, U16, -1, DcCurrent(2)),
    field("v_pv_4", 21, U16, -1, DcVoltage(3)),
    field("i_pv_4", 23, U16, -1, DcCurrent(3)),
    field("v_ac_1", 39, U16, -1, AcVoltage(0)),
    field("v_ac_2", 41, U16, -1, AcVoltage(1)),
    field("v_ac_3", 43, U16, -1, AcVoltage(2)),
    field("i_ac_1", 45, U16, -1, AcCurrent(0)),
    field("i_ac_2", 47, U16, -1, AcCurrent(1)),
    field("i_ac_3", 49, U16, -1, AcCurrent(2)),
    field("f_ac_1", 51, U16, -2, AcFrequency(0)),
    field("f_ac_2", 53, U16, -2, AcFrequency(1)),
    field("f_ac_3", 55, U16, -2, AcFrequency(2)),
    field("p_ac", 59, U16, 0, AcPower),
    field("status", 61, U16, 0, StatusCode),
    field("temperature", 85, U16, -1, Temperature),
    field("e_day", 91, U16, -1, YieldToday),
    field("e_total", 93, U32, 0, YieldTotal),
    field("h_total", 99, U16, 0, WorkingHours),
];
// }}}

// Model {{{
/// Inverter families this crate knows how to talk to. Each one owns its
/// discovery command and payload layout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Model {
    /// Three-phase units answering the register read at 0x7594.
    #[default]
    Dt,
}

impl Model {
    pub fn command(&self) -> &'static [u8] {
        match self {
            Model::Dt => &[0x7F, 0x03, 0x75, 0x94, 0x00, 0x49],
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self {
            Model::Dt => &DT_FIELDS,
        }
    }

    /// The discovery command with its checksum appended.
    pub fn request(&self) -> Vec<u8> {
        crc::with_checksum(self.command())
    }
}
// }}}

/// Checks length, header and checksum of a raw response and returns the
/// payload between header and checksum.
pub fn verify_response(response: &[u8]) -> Result<&[u8], ExchangeError> {
    if response.len() != RESPONSE_LEN {
        return Err(ExchangeError::Framing(format!(
            "bad response size: got {}, want {}",
            response.len(),
            RESPONSE_LEN
        )));
    }

    if response[0..2] != HEADER {
        return Err(ExchangeError::Framing(format!(
            "invalid header: {:02x?}",
            &response[0..2]
        )));
    }

    let payload = &response[2..2 + PAYLOAD_LEN];
    let suffix = &response[2 + PAYLOAD_LEN..];
    if !crc::verify(payload, suffix) {
        return Err(ExchangeError::Integrity {
            expected: crc::checksum(payload),
            got: [suffix[0], suffix[1]],
        });
    }

    Ok(payload)
}

pub fn parse(payload: &[u8]) -> Result<TelemetrySnapshot, ExchangeError> {
    parse_with(Model::default(), payload)
}

pub fn parse_with(model: Model, payload: &[u8]) -> Result<TelemetrySnapshot, ExchangeError> {
    if payload.len() != PAYLOAD_LEN {
        return Err(ExchangeError::Framing(format!(
            "payload is {} bytes, want {}",
            payload.len(),
            PAYLOAD_LEN
        )));
    }

    let mut dc_v = [0.0; DC_CHANNELS];
    let mut dc_i = [0.0; DC_CHANNELS];
    let mut ac = [AcPhase::default(); AC_PHASES];
    let mut ac_power = 0.0;
    let mut status = Status::Waiting;
    let mut temperature = 0.0;
    let mut yield_today = 0.0;
    let mut yield_total = 0.0;
    let mut working_hours = 0.0;

    for f in model.fields() {
        let (raw, value) = decode::read_scaled(payload, f.offset, f.width, f.exponent)?;

        match f.target {
            DcVoltage(i) => dc_v[i] = value,
            DcCurrent(i) => dc_i[i] = value,
            AcVoltage(i) => ac[i].voltage = value,
            AcCurrent(i) => ac[i].current = value,
            AcFrequency(i) => ac[i].frequency = value,
            AcPower => ac_power = value,
            StatusCode => {
                // u16 field, the cast cannot truncate
                status = Status::from(raw as u16);
                if !status.is_known() {
                    warn!("unknown inverter status code {}", raw);
                }
            }
            Temperature => temperature = value,
            YieldToday => yield_today = value,
            YieldTotal => yield_total = value,
            WorkingHours => working_hours = value,
        }
    }

    // phase 1 always reports; 2 and 3 carry the sentinel when absent
    for (i, phase) in ac.iter_mut().enumerate().skip(1) {
        if phase.voltage == SENTINEL_VOLTAGE {
            debug!("AC phase {} not reporting, zeroing", i + 1);
            *phase = AcPhase::default();
        }
    }

    check_plausible(yield_today, yield_total)?;

    let dc_channels = std::array::from_fn(|i| DcChannel::new(dc_v[i], dc_i[i]));

    Ok(TelemetrySnapshot {
        sample_time: chrono::Local::now(),
        dc_channels,
        ac_phases: ac,
        ac_power,
        status,
        temperature,
        yield_today,
        yield_total,
        working_hours,
    })
}

fn check_plausible(yield_today: f64, yield_total: f64) -> Result<(), ExchangeError> {
    if yield_today > MAX_YIELD_TODAY {
        return Err(ExchangeError::Validation(format!(
            "yield today {} kWh exceeds {}",
            yield_today, MAX_YIELD_TODAY
        )));
    }
    if yield_total > MAX_YIELD_TOTAL {
        return Err(ExchangeError::Validation(format!(
            "yield total {} kWh exceeds {}",
            yield_total, MAX_YIELD_TOTAL
        )));
    }
    Ok(())
}
