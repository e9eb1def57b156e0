//! # CRC8-DVB-S2
//!
//! Checksum over the modem bridge envelope (length, sequence and payload).
//!
//! **Polynomial**: 0xD5, **Initial Value**: 0x00

const CRC8_POLY: u8 = 0xD5;

const CRC8_TABLE: [u8; 256] = generate_crc8_table();

const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            crc = if (crc & 0x80) != 0 { (crc << 1) ^ CRC8_POLY } else { crc << 1 };
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Table-driven CRC8-DVB-S2 of `data`
pub fn crc8_dvb_s2(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &byte| CRC8_TABLE[(crc ^ byte) as usize])
}
