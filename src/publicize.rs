use crate::arsc::{ArscDecoder, FlagsOffset};
use crate::error::Result;
use crate::DecodeOptions;

/// The "public" bit lives in byte 3 of each little-endian u32 flag word.
pub const SPEC_PUBLIC_BYTE: u8 = 0x40;

/// Toggle the public bit on every entry of the given flag regions. The
/// operation is idempotent; no byte outside the regions is touched.
pub fn publicize_resources(arsc: &mut [u8], flags_offsets: &[FlagsOffset]) {
    for region in flags_offsets {
        let mut offset = region.offset as usize + 3;
        let end = offset + 4 * region.count as usize;
        while offset < end {
            if let Some(byte) = arsc.get_mut(offset) {
                *byte |= SPEC_PUBLIC_BYTE;
            }
            offset += 4;
        }
    }
}

/// Decode the image leniently to discover its flag regions, then patch
/// them in place.
pub fn publicize_arsc(arsc: &mut [u8]) -> Result<()> {
    let options = DecodeOptions {
        keep_broken: true,
        ..DecodeOptions::default()
    };
    let data = ArscDecoder::decode(arsc, &options)?;
    publicize_resources(arsc, &data.flags_offsets);
    Ok(())
}
