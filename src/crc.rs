/// Reflected CRC-32 table for the zlib/IEEE 802.3 polynomial, built at compile time.
const CRC_TABLE: [u32; 256] = {
    let mut table = [0; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut i = 0;
        while i < 8 {
            if c & 1 != 0 {
                c = 0xedb88320 ^ (c >> 1);
            } else {
                c >>= 1;
            }
            i += 1;
        }
        table[n as usize] = c;
        n += 1;
    }
    table
};

/// Feeds `data` through a running (not yet complemented) CRC register.
pub fn update_crc<I: IntoIterator<Item = u8>>(crc: u32, data: I) -> u32 {
    let mut new_crc = crc;
    for b in data.into_iter() {
        let index = (new_crc ^ b as u32) & 0xff;
        new_crc = CRC_TABLE[index as usize] ^ (new_crc >> 8);
    }
    new_crc
}

pub(crate) fn calculate_crc<I: IntoIterator<Item = u8>>(data: I) -> u32 {
    update_crc(0xffffffff, data) ^ 0xffffffff
}

/// CRC-32 of a complete byte sequence, as stored in a PNG chunk trailer.
pub fn checksum(bytes: &[u8]) -> u32 {
    calculate_crc(bytes.iter().copied())
}

/// CRC-32 over `chunk_type ++ data` without concatenating them first.
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let crc = update_crc(0xffffffff, chunk_type.iter().copied());
    update_crc(crc, data.iter().copied()) ^ 0xffffffff
}
