/*
    Copyright (C) 2025 fieryhenry

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

// Field layout follows ResTable_config in
// https://android.googlesource.com/platform/frameworks/base/+/master/libs/androidfw/include/androidfw/ResourceTypes.h

use std::fmt::{Display, Write as _};

use crate::error::{Error, Result};
use crate::stream::ByteCursor;

pub const ORIENTATION_PORT: u8 = 1;
pub const ORIENTATION_LAND: u8 = 2;
pub const ORIENTATION_SQUARE: u8 = 3;

pub const TOUCHSCREEN_NOTOUCH: u8 = 1;
pub const TOUCHSCREEN_STYLUS: u8 = 2;
pub const TOUCHSCREEN_FINGER: u8 = 3;

pub const DENSITY_LOW: u16 = 120;
pub const DENSITY_MEDIUM: u16 = 160;
pub const DENSITY_TV: u16 = 213;
pub const DENSITY_HIGH: u16 = 240;
pub const DENSITY_XHIGH: u16 = 320;
pub const DENSITY_XXHIGH: u16 = 480;
pub const DENSITY_XXXHIGH: u16 = 640;
pub const DENSITY_ANY: u16 = 0xfffe;
pub const DENSITY_NONE: u16 = 0xffff;

pub const KEYBOARD_NOKEYS: u8 = 1;
pub const KEYBOARD_QWERTY: u8 = 2;
pub const KEYBOARD_12KEY: u8 = 3;

pub const NAVIGATION_NONAV: u8 = 1;
pub const NAVIGATION_DPAD: u8 = 2;
pub const NAVIGATION_TRACKBALL: u8 = 3;
pub const NAVIGATION_WHEEL: u8 = 4;

pub const MASK_KEYSHIDDEN: u8 = 0x03;
pub const KEYSHIDDEN_NO: u8 = 1;
pub const KEYSHIDDEN_YES: u8 = 2;
pub const KEYSHIDDEN_SOFT: u8 = 3;

pub const MASK_NAVHIDDEN: u8 = 0x0c;
pub const NAVHIDDEN_NO: u8 = 0x04;
pub const NAVHIDDEN_YES: u8 = 0x08;

pub const MASK_SCREENSIZE: u8 = 0x0f;
pub const SCREENSIZE_SMALL: u8 = 1;
pub const SCREENSIZE_NORMAL: u8 = 2;
pub const SCREENSIZE_LARGE: u8 = 3;
pub const SCREENSIZE_XLARGE: u8 = 4;

pub const MASK_SCREENLONG: u8 = 0x30;
pub const SCREENLONG_NO: u8 = 0x10;
pub const SCREENLONG_YES: u8 = 0x20;

pub const MASK_LAYOUTDIR: u8 = 0xc0;
pub const LAYOUTDIR_LTR: u8 = 0x40;
pub const LAYOUTDIR_RTL: u8 = 0x80;

pub const MASK_SCREENROUND: u8 = 0x03;
pub const SCREENROUND_NO: u8 = 1;
pub const SCREENROUND_YES: u8 = 2;

pub const MASK_WIDE_COLOR_GAMUT: u8 = 0x03;
pub const WIDE_COLOR_GAMUT_NO: u8 = 1;
pub const WIDE_COLOR_GAMUT_YES: u8 = 2;

pub const MASK_HDR: u8 = 0x0c;
pub const HDR_NO: u8 = 0x04;
pub const HDR_YES: u8 = 0x08;

pub const MASK_UI_MODE_TYPE: u8 = 0x0f;
pub const UI_MODE_TYPE_DESK: u8 = 2;
pub const UI_MODE_TYPE_CAR: u8 = 3;
pub const UI_MODE_TYPE_TELEVISION: u8 = 4;
pub const UI_MODE_TYPE_APPLIANCE: u8 = 5;
pub const UI_MODE_TYPE_WATCH: u8 = 6;
pub const UI_MODE_TYPE_VR_HEADSET: u8 = 7;

pub const MASK_UI_MODE_NIGHT: u8 = 0x30;
pub const UI_MODE_NIGHT_NO: u8 = 0x10;
pub const UI_MODE_NIGHT_YES: u8 = 0x20;

pub const GRAMMATICAL_GENDER_FEMININE: u8 = 1;
pub const GRAMMATICAL_GENDER_MASCULINE: u8 = 2;
pub const GRAMMATICAL_GENDER_NEUTER: u8 = 3;

pub const MNC_ZERO: u16 = 0xffff;

/// A resource qualifier set: the full tuple that selects one variant of a
/// resource. Equality and hashing are bit-for-bit over every parsed field
/// plus the preserved unknown tail, so future config extensions survive a
/// decode untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfigFlags {
    pub mcc: u16,
    pub mnc: u16,
    pub language: [u8; 2],
    pub region: [u8; 2],
    pub orientation: u8,
    pub touchscreen: u8,
    pub density: u16,
    pub keyboard: u8,
    pub navigation: u8,
    pub input_flags: u8,
    pub grammatical_inflection: u8,
    pub screen_width: u16,
    pub screen_height: u16,
    pub sdk_version: u16,
    pub minor_version: u16,
    pub screen_layout: u8,
    pub ui_mode: u8,
    pub smallest_screen_width_dp: u16,
    pub screen_width_dp: u16,
    pub screen_height_dp: u16,
    pub locale_script: [u8; 4],
    pub locale_variant: [u8; 8],
    pub screen_layout2: u8,
    pub color_mode: u8,
    pub screen_config_pad: u16,
    pub locale_numbering_system: [u8; 8],
    /// Bytes past the last known field, preserved for equality. An all-zero
    /// tail is dropped so that padded default configs compare equal to the
    /// empty default.
    pub unknown: Vec<u8>,
}

impl ConfigFlags {
    /// Parse a variable-length config block. `limit` is the end of the
    /// containing chunk; a size prefix reaching past it is `InvalidConfig`.
    pub fn parse(cursor: &mut ByteCursor, limit: u64) -> Result<Self> {
        let start = cursor.pos();
        let size = cursor.read_u32()?;

        if size < 4 || start + size as u64 > limit {
            return Err(Error::InvalidConfig { pos: start, size });
        }

        let mut cfg = ConfigFlags::default();
        let have = |end: u32| size >= end;

        if have(8) {
            cfg.mcc = cursor.read_u16()?;
            cfg.mnc = cursor.read_u16()?;
        }
        if have(12) {
            cfg.language = [cursor.read_u8()?, cursor.read_u8()?];
            cfg.region = [cursor.read_u8()?, cursor.read_u8()?];
        }
        if have(16) {
            cfg.orientation = cursor.read_u8()?;
            cfg.touchscreen = cursor.read_u8()?;
            cfg.density = cursor.read_u16()?;
        }
        if have(20) {
            cfg.keyboard = cursor.read_u8()?;
            cfg.navigation = cursor.read_u8()?;
            cfg.input_flags = cursor.read_u8()?;
            cfg.grammatical_inflection = cursor.read_u8()?;
        }
        if have(24) {
            cfg.screen_width = cursor.read_u16()?;
            cfg.screen_height = cursor.read_u16()?;
        }
        if have(28) {
            cfg.sdk_version = cursor.read_u16()?;
            cfg.minor_version = cursor.read_u16()?;
        }
        if have(32) {
            cfg.screen_layout = cursor.read_u8()?;
            cfg.ui_mode = cursor.read_u8()?;
            cfg.smallest_screen_width_dp = cursor.read_u16()?;
        }
        if have(36) {
            cfg.screen_width_dp = cursor.read_u16()?;
            cfg.screen_height_dp = cursor.read_u16()?;
        }
        if have(40) {
            let b = cursor.read_bytes(4)?;
            cfg.locale_script.copy_from_slice(&b);
        }
        if have(48) {
            let b = cursor.read_bytes(8)?;
            cfg.locale_variant.copy_from_slice(&b);
        }
        if have(52) {
            cfg.screen_layout2 = cursor.read_u8()?;
            cfg.color_mode = cursor.read_u8()?;
            cfg.screen_config_pad = cursor.read_u16()?;
        }
        if have(60) {
            let b = cursor.read_bytes(8)?;
            cfg.locale_numbering_system.copy_from_slice(&b);
        }

        let consumed = cursor.pos() - start;
        if (size as u64) > consumed {
            let tail = cursor.read_bytes((size as u64 - consumed) as usize)?;
            if tail.iter().any(|&b| b != 0) {
                cfg.unknown = tail;
            }
        }

        cursor.seek_to(start + size as u64);
        Ok(cfg)
    }

    /// The unqualified configuration.
    pub fn is_default(&self) -> bool {
        *self == ConfigFlags::default()
    }

    /// The canonical `values-<qualifier>` suffix, empty for the default
    /// configuration.
    pub fn qualifiers(&self) -> String {
        let mut out = String::new();

        if self.mcc != 0 {
            let _ = write!(out, "-mcc{:03}", self.mcc);
            if self.mnc != 0 {
                if self.mnc == MNC_ZERO {
                    out.push_str("-mnc00");
                } else {
                    let _ = write!(out, "-mnc{}", self.mnc);
                }
            }
        }

        self.append_locale(&mut out);

        match self.grammatical_inflection {
            GRAMMATICAL_GENDER_FEMININE => out.push_str("-feminine"),
            GRAMMATICAL_GENDER_MASCULINE => out.push_str("-masculine"),
            GRAMMATICAL_GENDER_NEUTER => out.push_str("-neuter"),
            _ => {}
        }

        match self.screen_layout & MASK_LAYOUTDIR {
            LAYOUTDIR_LTR => out.push_str("-ldltr"),
            LAYOUTDIR_RTL => out.push_str("-ldrtl"),
            _ => {}
        }

        if self.smallest_screen_width_dp != 0 {
            let _ = write!(out, "-sw{}dp", self.smallest_screen_width_dp);
        }
        if self.screen_width_dp != 0 {
            let _ = write!(out, "-w{}dp", self.screen_width_dp);
        }
        if self.screen_height_dp != 0 {
            let _ = write!(out, "-h{}dp", self.screen_height_dp);
        }

        match self.screen_layout & MASK_SCREENSIZE {
            SCREENSIZE_SMALL => out.push_str("-small"),
            SCREENSIZE_NORMAL => out.push_str("-normal"),
            SCREENSIZE_LARGE => out.push_str("-large"),
            SCREENSIZE_XLARGE => out.push_str("-xlarge"),
            _ => {}
        }
        match self.screen_layout & MASK_SCREENLONG {
            SCREENLONG_NO => out.push_str("-notlong"),
            SCREENLONG_YES => out.push_str("-long"),
            _ => {}
        }
        match self.screen_layout2 & MASK_SCREENROUND {
            SCREENROUND_NO => out.push_str("-notround"),
            SCREENROUND_YES => out.push_str("-round"),
            _ => {}
        }
        match self.color_mode & MASK_WIDE_COLOR_GAMUT {
            WIDE_COLOR_GAMUT_NO => out.push_str("-nowidecg"),
            WIDE_COLOR_GAMUT_YES => out.push_str("-widecg"),
            _ => {}
        }
        match self.color_mode & MASK_HDR {
            HDR_NO => out.push_str("-lowdr"),
            HDR_YES => out.push_str("-highdr"),
            _ => {}
        }

        match self.orientation {
            ORIENTATION_PORT => out.push_str("-port"),
            ORIENTATION_LAND => out.push_str("-land"),
            ORIENTATION_SQUARE => out.push_str("-square"),
            _ => {}
        }

        match self.ui_mode & MASK_UI_MODE_TYPE {
            UI_MODE_TYPE_DESK => out.push_str("-desk"),
            UI_MODE_TYPE_CAR => out.push_str("-car"),
            UI_MODE_TYPE_TELEVISION => out.push_str("-television"),
            UI_MODE_TYPE_APPLIANCE => out.push_str("-appliance"),
            UI_MODE_TYPE_WATCH => out.push_str("-watch"),
            UI_MODE_TYPE_VR_HEADSET => out.push_str("-vrheadset"),
            _ => {}
        }
        match self.ui_mode & MASK_UI_MODE_NIGHT {
            UI_MODE_NIGHT_NO => out.push_str("-notnight"),
            UI_MODE_NIGHT_YES => out.push_str("-night"),
            _ => {}
        }

        match self.density {
            0 => {}
            DENSITY_LOW => out.push_str("-ldpi"),
            DENSITY_MEDIUM => out.push_str("-mdpi"),
            DENSITY_TV => out.push_str("-tvdpi"),
            DENSITY_HIGH => out.push_str("-hdpi"),
            DENSITY_XHIGH => out.push_str("-xhdpi"),
            DENSITY_XXHIGH => out.push_str("-xxhdpi"),
            DENSITY_XXXHIGH => out.push_str("-xxxhdpi"),
            DENSITY_ANY => out.push_str("-anydpi"),
            DENSITY_NONE => out.push_str("-nodpi"),
            d => {
                let _ = write!(out, "-{d}dpi");
            }
        }

        match self.touchscreen {
            TOUCHSCREEN_NOTOUCH => out.push_str("-notouch"),
            TOUCHSCREEN_STYLUS => out.push_str("-stylus"),
            TOUCHSCREEN_FINGER => out.push_str("-finger"),
            _ => {}
        }

        match self.input_flags & MASK_KEYSHIDDEN {
            KEYSHIDDEN_NO => out.push_str("-keysexposed"),
            KEYSHIDDEN_YES => out.push_str("-keyshidden"),
            KEYSHIDDEN_SOFT => out.push_str("-keyssoft"),
            _ => {}
        }
        match self.keyboard {
            KEYBOARD_NOKEYS => out.push_str("-nokeys"),
            KEYBOARD_QWERTY => out.push_str("-qwerty"),
            KEYBOARD_12KEY => out.push_str("-12key"),
            _ => {}
        }
        match self.input_flags & MASK_NAVHIDDEN {
            NAVHIDDEN_NO => out.push_str("-navexposed"),
            NAVHIDDEN_YES => out.push_str("-navhidden"),
            _ => {}
        }
        match self.navigation {
            NAVIGATION_NONAV => out.push_str("-nonav"),
            NAVIGATION_DPAD => out.push_str("-dpad"),
            NAVIGATION_TRACKBALL => out.push_str("-trackball"),
            NAVIGATION_WHEEL => out.push_str("-wheel"),
            _ => {}
        }

        if self.screen_width != 0 || self.screen_height != 0 {
            let _ = write!(out, "-{}x{}", self.screen_width, self.screen_height);
        }

        if self.sdk_version != 0 {
            let _ = write!(out, "-v{}", self.sdk_version);
        }

        out
    }

    fn append_locale(&self, out: &mut String) {
        let Some(lang) = unpack_locale_part(self.language, b'a') else {
            return;
        };
        let region = unpack_locale_part(self.region, b'0');
        let script = ascii_str(&self.locale_script);
        let variant = ascii_str(&self.locale_variant);

        if script.is_none() && variant.is_none() {
            let _ = write!(out, "-{lang}");
            if let Some(region) = region {
                let _ = write!(out, "-r{region}");
            }
            return;
        }

        // Script or variant forces the BCP 47 directory form.
        let _ = write!(out, "-b+{lang}");
        if let Some(script) = script {
            let _ = write!(out, "+{script}");
        }
        if let Some(region) = region {
            let _ = write!(out, "+{region}");
        }
        if let Some(variant) = variant {
            let _ = write!(out, "+{variant}");
        }
    }

    /// Parse a canonical qualifier suffix (as produced by
    /// [`ConfigFlags::qualifiers`]) back into a config.
    pub fn from_qualifiers(qualifiers: &str) -> Result<Self> {
        let mut cfg = ConfigFlags::default();

        for part in qualifiers.split('-').filter(|p| !p.is_empty()) {
            if !cfg.apply_qualifier(part) {
                return Err(Error::UnsupportedFeature {
                    what: format!("unrecognized qualifier \"{part}\""),
                });
            }
        }

        Ok(cfg)
    }

    fn apply_qualifier(&mut self, part: &str) -> bool {
        match part {
            "feminine" => self.grammatical_inflection = GRAMMATICAL_GENDER_FEMININE,
            "masculine" => self.grammatical_inflection = GRAMMATICAL_GENDER_MASCULINE,
            "neuter" => self.grammatical_inflection = GRAMMATICAL_GENDER_NEUTER,
            "ldltr" => self.screen_layout |= LAYOUTDIR_LTR,
            "ldrtl" => self.screen_layout |= LAYOUTDIR_RTL,
            "small" => self.screen_layout |= SCREENSIZE_SMALL,
            "normal" => self.screen_layout |= SCREENSIZE_NORMAL,
            "large" => self.screen_layout |= SCREENSIZE_LARGE,
            "xlarge" => self.screen_layout |= SCREENSIZE_XLARGE,
            "notlong" => self.screen_layout |= SCREENLONG_NO,
            "long" => self.screen_layout |= SCREENLONG_YES,
            "notround" => self.screen_layout2 |= SCREENROUND_NO,
            "round" => self.screen_layout2 |= SCREENROUND_YES,
            "nowidecg" => self.color_mode |= WIDE_COLOR_GAMUT_NO,
            "widecg" => self.color_mode |= WIDE_COLOR_GAMUT_YES,
            "lowdr" => self.color_mode |= HDR_NO,
            "highdr" => self.color_mode |= HDR_YES,
            "port" => self.orientation = ORIENTATION_PORT,
            "land" => self.orientation = ORIENTATION_LAND,
            "square" => self.orientation = ORIENTATION_SQUARE,
            "desk" => self.ui_mode |= UI_MODE_TYPE_DESK,
            "car" => self.ui_mode |= UI_MODE_TYPE_CAR,
            "television" => self.ui_mode |= UI_MODE_TYPE_TELEVISION,
            "appliance" => self.ui_mode |= UI_MODE_TYPE_APPLIANCE,
            "watch" => self.ui_mode |= UI_MODE_TYPE_WATCH,
            "vrheadset" => self.ui_mode |= UI_MODE_TYPE_VR_HEADSET,
            "notnight" => self.ui_mode |= UI_MODE_NIGHT_NO,
            "night" => self.ui_mode |= UI_MODE_NIGHT_YES,
            "ldpi" => self.density = DENSITY_LOW,
            "mdpi" => self.density = DENSITY_MEDIUM,
            "tvdpi" => self.density = DENSITY_TV,
            "hdpi" => self.density = DENSITY_HIGH,
            "xhdpi" => self.density = DENSITY_XHIGH,
            "xxhdpi" => self.density = DENSITY_XXHIGH,
            "xxxhdpi" => self.density = DENSITY_XXXHIGH,
            "anydpi" => self.density = DENSITY_ANY,
            "nodpi" => self.density = DENSITY_NONE,
            "notouch" => self.touchscreen = TOUCHSCREEN_NOTOUCH,
            "stylus" => self.touchscreen = TOUCHSCREEN_STYLUS,
            "finger" => self.touchscreen = TOUCHSCREEN_FINGER,
            "keysexposed" => self.input_flags |= KEYSHIDDEN_NO,
            "keyshidden" => self.input_flags |= KEYSHIDDEN_YES,
            "keyssoft" => self.input_flags |= KEYSHIDDEN_SOFT,
            "nokeys" => self.keyboard = KEYBOARD_NOKEYS,
            "qwerty" => self.keyboard = KEYBOARD_QWERTY,
            "12key" => self.keyboard = KEYBOARD_12KEY,
            "navexposed" => self.input_flags |= NAVHIDDEN_NO,
            "navhidden" => self.input_flags |= NAVHIDDEN_YES,
            "nonav" => self.navigation = NAVIGATION_NONAV,
            "dpad" => self.navigation = NAVIGATION_DPAD,
            "trackball" => self.navigation = NAVIGATION_TRACKBALL,
            "wheel" => self.navigation = NAVIGATION_WHEEL,
            _ => return self.apply_parameterized(part),
        }
        true
    }

    fn apply_parameterized(&mut self, part: &str) -> bool {
        if let Some(rest) = part.strip_prefix("mcc") {
            return rest.parse().map(|v| self.mcc = v).is_ok();
        }
        if let Some(rest) = part.strip_prefix("mnc") {
            if rest == "00" {
                self.mnc = MNC_ZERO;
                return true;
            }
            return rest.parse().map(|v| self.mnc = v).is_ok();
        }
        if let Some(rest) = part.strip_prefix("b+") {
            return self.apply_bcp47(rest);
        }
        if let Some(rest) = part.strip_prefix("sw").and_then(|r| r.strip_suffix("dp")) {
            return rest.parse().map(|v| self.smallest_screen_width_dp = v).is_ok();
        }
        if let Some(rest) = part.strip_prefix('w').and_then(|r| r.strip_suffix("dp")) {
            return rest.parse().map(|v| self.screen_width_dp = v).is_ok();
        }
        if let Some(rest) = part.strip_prefix('h').and_then(|r| r.strip_suffix("dp")) {
            return rest.parse().map(|v| self.screen_height_dp = v).is_ok();
        }
        if let Some(rest) = part.strip_suffix("dpi") {
            return rest.parse().map(|v| self.density = v).is_ok();
        }
        if let Some(rest) = part.strip_prefix('v') {
            if let Ok(v) = rest.parse() {
                self.sdk_version = v;
                return true;
            }
        }
        if let Some(rest) = part.strip_prefix('r') {
            if rest.len() == 2 && rest.bytes().all(|b| b.is_ascii_alphanumeric()) {
                self.region = pack_locale_part(rest.as_bytes(), b'0');
                return true;
            }
        }
        if let Some((w, h)) = part.split_once('x') {
            if let (Ok(w), Ok(h)) = (w.parse(), h.parse()) {
                self.screen_width = w;
                self.screen_height = h;
                return true;
            }
        }
        if (2..=3).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_lowercase()) {
            self.language = pack_locale_part(part.as_bytes(), b'a');
            return true;
        }
        false
    }

    fn apply_bcp47(&mut self, rest: &str) -> bool {
        let mut parts = rest.split('+');
        let Some(lang) = parts.next() else {
            return false;
        };
        if lang.is_empty() {
            return false;
        }
        self.language = pack_locale_part(lang.as_bytes(), b'a');
        for sub in parts {
            if sub.len() == 4 && sub.as_bytes()[0].is_ascii_uppercase() {
                self.locale_script.copy_from_slice(sub.as_bytes());
            } else if sub.len() <= 3 && sub.bytes().all(|b| b.is_ascii_alphanumeric()) {
                self.region = pack_locale_part(sub.as_bytes(), b'0');
            } else if sub.len() <= 8 {
                self.locale_variant.fill(0);
                self.locale_variant[..sub.len()].copy_from_slice(sub.as_bytes());
            } else {
                return false;
            }
        }
        true
    }
}

impl Display for ConfigFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_default() {
            write!(f, "[DEFAULT]")
        } else {
            write!(f, "{}", self.qualifiers())
        }
    }
}

/// Decode a two-byte language or region field: two plain ASCII characters,
/// or a packed three-character code when the high bit is set.
fn unpack_locale_part(data: [u8; 2], base: u8) -> Option<String> {
    if data == [0, 0] {
        return None;
    }
    if data[0] & 0x80 != 0 {
        let first = data[1] & 0x1f;
        let second = ((data[1] & 0xe0) >> 5) | ((data[0] & 0x03) << 3);
        let third = (data[0] & 0x7c) >> 2;
        let chars = [base + first, base + second, base + third];
        return Some(String::from_utf8_lossy(&chars).into_owned());
    }
    Some(String::from_utf8_lossy(&data).into_owned())
}

fn pack_locale_part(code: &[u8], base: u8) -> [u8; 2] {
    if code.len() == 2 {
        return [code[0], code[1]];
    }
    let first = (code[0] - base) & 0x7f;
    let second = (code[1] - base) & 0x7f;
    let third = (code[2] - base) & 0x7f;
    [0x80 | (third << 2) | (second >> 3), (second << 5) | first]
}

fn ascii_str(data: &[u8]) -> Option<&str> {
    if data[0] == 0 {
        return None;
    }
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    std::str::from_utf8(&data[..end]).ok()
}
