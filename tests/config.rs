mod common;

use resdec::config::{
    ConfigFlags, DENSITY_HIGH, SCREENLONG_YES, SCREENSIZE_LARGE, UI_MODE_NIGHT_YES,
};
use resdec::error::Error;
use resdec::stream::ByteCursor;

fn parse(bytes: &[u8]) -> ConfigFlags {
    let mut cursor = ByteCursor::new(bytes);
    ConfigFlags::parse(&mut cursor, bytes.len() as u64).unwrap()
}

fn zero_config(size: u32) -> Vec<u8> {
    let mut bytes = size.to_le_bytes().to_vec();
    bytes.resize(size as usize, 0);
    bytes
}

#[test]
fn default_config_is_default() {
    let cfg = parse(&common::config_default());
    assert!(cfg.is_default());
    assert_eq!(cfg.qualifiers(), "");
    assert_eq!(cfg.to_string(), "[DEFAULT]");
}

#[test]
fn padded_default_equals_empty_default() {
    // Same all-zero content written with different struct sizes.
    assert_eq!(parse(&zero_config(28)), ConfigFlags::default());
    assert_eq!(parse(&zero_config(36)), ConfigFlags::default());
    assert_eq!(parse(&zero_config(56)), ConfigFlags::default());
    assert_eq!(parse(&zero_config(64)), ConfigFlags::default());
}

#[test]
fn nonzero_tail_is_preserved_and_compared() {
    let mut bytes = zero_config(64);
    bytes[61] = 0x7c;
    let cfg = parse(&bytes);

    assert_ne!(cfg, ConfigFlags::default());
    assert_eq!(cfg.unknown, vec![0, 0x7c, 0, 0]);
}

#[test]
fn language_qualifier() {
    let cfg = parse(&common::config_lang("fr"));
    assert_eq!(cfg.qualifiers(), "-fr");
}

#[test]
fn language_and_region_qualifier() {
    let mut bytes = common::config_lang("fr");
    bytes[10] = b'F';
    bytes[11] = b'R';
    let cfg = parse(&bytes);
    assert_eq!(cfg.qualifiers(), "-fr-rFR");
}

#[test]
fn density_and_sdk_qualifiers() {
    let cfg = ConfigFlags {
        density: DENSITY_HIGH,
        sdk_version: 21,
        ..ConfigFlags::default()
    };
    assert_eq!(cfg.qualifiers(), "-hdpi-v21");
}

#[test]
fn qualifier_ordering_matches_directory_naming() {
    let cfg = ConfigFlags {
        mcc: 310,
        language: [b'e', b'n'],
        screen_layout: SCREENSIZE_LARGE | SCREENLONG_YES,
        ui_mode: UI_MODE_NIGHT_YES,
        density: DENSITY_HIGH,
        sdk_version: 13,
        ..ConfigFlags::default()
    };
    assert_eq!(cfg.qualifiers(), "-mcc310-en-large-long-night-hdpi-v13");
}

#[test]
fn qualifiers_round_trip() {
    let configs = [
        ConfigFlags::default(),
        parse(&common::config_lang("fr")),
        ConfigFlags {
            language: [b'e', b'n'],
            region: [b'G', b'B'],
            density: DENSITY_HIGH,
            sdk_version: 23,
            ..ConfigFlags::default()
        },
        ConfigFlags {
            mcc: 310,
            mnc: 4,
            smallest_screen_width_dp: 600,
            screen_width_dp: 720,
            ..ConfigFlags::default()
        },
        ConfigFlags {
            orientation: 2, // land
            screen_width: 1280,
            screen_height: 720,
            ..ConfigFlags::default()
        },
    ];

    for cfg in configs {
        let round = ConfigFlags::from_qualifiers(&cfg.qualifiers()).unwrap();
        assert_eq!(round, cfg, "round trip failed for {:?}", cfg.qualifiers());
    }
}

#[test]
fn bcp47_form_for_scripted_locale() {
    let mut cfg = ConfigFlags {
        language: [b'z', b'h'],
        region: [b'C', b'N'],
        ..ConfigFlags::default()
    };
    cfg.locale_script.copy_from_slice(b"Hans");

    assert_eq!(cfg.qualifiers(), "-b+zh+Hans+CN");
    let round = ConfigFlags::from_qualifiers(&cfg.qualifiers()).unwrap();
    assert_eq!(round, cfg);
}

#[test]
fn config_size_beyond_chunk_is_invalid() {
    let bytes = zero_config(64);
    let mut cursor = ByteCursor::new(&bytes);
    // Claim the chunk ends at byte 28.
    match ConfigFlags::parse(&mut cursor, 28) {
        Err(Error::InvalidConfig { size, .. }) => assert_eq!(size, 64),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn parse_consumes_declared_size() {
    let bytes = zero_config(36);
    let mut cursor = ByteCursor::new(&bytes);
    ConfigFlags::parse(&mut cursor, 36).unwrap();
    assert_eq!(cursor.pos(), 36);
}
