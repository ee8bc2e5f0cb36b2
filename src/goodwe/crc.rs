/// CRC16/MODBUS (poly 0xA001 reflected, init 0xFFFF) over `data`, returned
/// low byte first as it appears on the wire.
pub fn checksum(data: &[u8]) -> [u8; 2] {
    crc16::State::<crc16::MODBUS>::calculate(data).to_le_bytes()
}

/// Appends the checksum of `data` to itself.
pub fn with_checksum(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    out.extend_from_slice(data);
    out.extend_from_slice(&checksum(data));
    out
}

/// True when `suffix` is the checksum of `data`.
pub fn verify(data: &[u8], suffix: &[u8]) -> bool {
    checksum(data) == suffix
}
