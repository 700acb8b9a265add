use nom::{
    combinator::all_consuming,
    number::complete::{be_u16, be_u32},
};

type NomError<'a> = nom::error::Error<&'a [u8]>;

pub struct Utils;
impl Utils {
    pub fn u16_to_bytes(value: u16) -> [u8; 2] {
        value.to_be_bytes()
    }

    /// Decodes a big-endian u16. `input` must be exactly 2 bytes long.
    pub fn u16_from_bytes(input: &[u8]) -> Option<u16> {
        all_consuming(be_u16::<_, NomError>)(input)
            .ok()
            .map(|(_, value)| value)
    }

    /// Decodes a big-endian u32. `input` must be exactly 4 bytes long.
    pub fn u32_from_bytes(input: &[u8]) -> Option<u32> {
        all_consuming(be_u32::<_, NomError>)(input)
            .ok()
            .map(|(_, value)| value)
    }

    pub fn u16_at(data: &[u8], offset: usize) -> Option<u16> {
        data.get(offset..offset.checked_add(2)?)
            .and_then(Self::u16_from_bytes)
    }

    pub fn u32_at(data: &[u8], offset: usize) -> Option<u32> {
        data.get(offset..offset.checked_add(4)?)
            .and_then(Self::u32_from_bytes)
    }

    /// Additive checksum, accumulated in 16 bits with silent wraparound.
    pub fn checksum(body: &[u8]) -> u16 {
        body.iter()
            .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
    }

    pub fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02X}", b)).collect()
    }

    pub fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
        let input = input.trim().trim_start_matches("0x").trim_start_matches("0X");
        if input.len() % 2 != 0 {
            return Err(format!("hex string {} has an odd number of digits", input));
        }

        (0..input.len())
            .step_by(2)
            .map(|i| {
                input
                    .get(i..i + 2)
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or_else(|| format!("invalid hex digits in {}", input))
            })
            .collect()
    }
}
