//! Callsign, Maidenhead grid, and power-level packings.
//!
//! Standard callsigns compress into 28 bits using the classic amateur
//! mixed-radix layout (37 * 36 * 10 * 27 * 27 * 27). Values above that
//! range are reserved for special addresses such as `@ALLCALL` and the
//! relay placeholder `<....>`.

use once_cell::sync::Lazy;

use crate::alphabet::{char_alphanumeric, index_alphanumeric};

/// Number of packings consumed by standard callsigns; reserved addresses
/// start one past this.
pub const NBASECALL: u32 = 37 * 36 * 10 * 27 * 27 * 27;

/// Highest grid value that decodes to a Maidenhead locator.
pub const NBASEGRID: u16 = 180 * 180;
/// First value of the command band carried in the grid field.
pub const NUSERGRID: u16 = NBASEGRID + 1;
/// Sentinel meaning "no grid".
pub const NMAXGRID: u16 = (1 << 15) - 1;

/// Reserved addresses, in packing order.
pub static BASE_CALLS: Lazy<Vec<(&'static str, u32)>> = Lazy::new(|| {
    const KEYS: &[&str] = &[
        "<....>", "@ALLCALL", "@JS8NET", "@DX/NA", "@DX/SA", "@DX/EU", "@DX/AS",
        "@DX/AF", "@DX/OC", "@DX/AN", "@REGION/1", "@REGION/2", "@REGION/3",
        "@GROUP/0", "@GROUP/1", "@GROUP/2", "@GROUP/3", "@GROUP/4", "@GROUP/5",
        "@GROUP/6", "@GROUP/7", "@GROUP/8", "@GROUP/9", "@COMMAND", "@CONTROL",
        "@NET", "@NTS", "@RESERVE/0", "@RESERVE/1", "@RESERVE/2", "@RESERVE/3",
        "@RESERVE/4", "@APRSIS", "@RAGCHEW", "@JS8", "@EMCOMM", "@ARES", "@MARS",
        "@AMRRON", "@RACES", "@RAYNET", "@RADAR", "@SKYWARN", "@CQ", "@HB",
        "@QSO", "@QSOPARTY", "@CONTEST", "@FIELDDAY", "@SOTA", "@IOTA", "@POTA",
        "@QRP", "@QRO",
    ];
    KEYS.iter()
        .enumerate()
        .map(|(i, &k)| (k, NBASECALL + i as u32 + 1))
        .collect()
});

pub fn base_call_value(callsign: &str) -> Option<u32> {
    BASE_CALLS
        .iter()
        .find(|(k, _)| *k == callsign)
        .map(|&(_, v)| v)
}

pub fn is_group_allowed(group: &str) -> bool {
    base_call_value(group).is_some()
}

pub fn is_compound_callsign(callsign: &str) -> bool {
    callsign.contains('/')
}

/// Loose validity check: the callsign is made of the characters a station
/// identifier may carry. Compound status is simply slash presence.
pub fn is_valid_callsign(callsign: &str) -> (bool, bool) {
    let valid = !callsign.is_empty()
        && callsign
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '/' || c == '@');
    (valid, is_compound_callsign(callsign))
}

fn class_match(perm: &[char]) -> bool {
    perm.len() == 6
        && (perm[0] == ' ' || perm[0].is_ascii_digit() || perm[0].is_ascii_uppercase())
        && (perm[1].is_ascii_digit() || perm[1].is_ascii_uppercase())
        && perm[2].is_ascii_digit()
        && perm[3..].iter().all(|&c| c == ' ' || c.is_ascii_uppercase())
}

/// Packs a standard callsign into 28 bits; the `/P` suffix is stripped and
/// returned as an out-of-band flag. Reserved addresses pack to their table
/// value. Returns `None` when the callsign does not fit the layout.
pub fn pack_callsign(value: &str) -> Option<(u32, bool)> {
    if let Some(v) = base_call_value(value) {
        return Some((v, false));
    }

    let mut callsign = value.to_owned();
    let mut portable = false;
    if callsign.len() > 2 && callsign.ends_with("/P") {
        callsign.truncate(callsign.len() - 2);
        portable = true;
    }

    // Swaziland and Guinea prefixes take shorter aliases.
    if callsign.starts_with("3DA0") {
        callsign = format!("3D0{}", &callsign[4..]);
    }
    if callsign.starts_with("3X")
        && callsign.len() > 2
        && callsign.as_bytes()[2].is_ascii_alphabetic()
    {
        callsign = format!("Q{}", &callsign[2..]);
    }

    if callsign.len() < 2 || callsign.len() > 6 {
        return None;
    }

    let mut permutations = vec![callsign.clone()];
    match callsign.len() {
        2 => permutations.push(format!(" {callsign}   ")),
        3 => {
            permutations.push(format!(" {callsign}  "));
            permutations.push(format!("{callsign}   "));
        }
        4 => {
            permutations.push(format!(" {callsign} "));
            permutations.push(format!("{callsign}  "));
        }
        5 => {
            permutations.push(format!(" {callsign}"));
            permutations.push(format!("{callsign} "));
        }
        _ => {}
    }

    let matched: Vec<char> = permutations
        .iter()
        .map(|p| p.chars().collect::<Vec<char>>())
        .find(|p| class_match(p))?;

    let idx = |i: usize| index_alphanumeric(matched[i]).unwrap_or(0) as u32;
    let mut packed = idx(0);
    packed = 36 * packed + idx(1);
    packed = 10 * packed + idx(2);
    packed = 27 * packed + idx(3) - 10;
    packed = 27 * packed + idx(4) - 10;
    packed = 27 * packed + idx(5) - 10;
    Some((packed, portable))
}

/// Inverse of [`pack_callsign`].
pub fn unpack_callsign(value: u32, portable: bool) -> String {
    if let Some(&(key, _)) = BASE_CALLS.iter().find(|&&(_, v)| v == value) {
        return key.to_owned();
    }

    let mut value = u64::from(value);
    let mut word = [' '; 6];
    word[5] = char_alphanumeric(value % 27 + 10);
    value /= 27;
    word[4] = char_alphanumeric(value % 27 + 10);
    value /= 27;
    word[3] = char_alphanumeric(value % 27 + 10);
    value /= 27;
    word[2] = char_alphanumeric(value % 10);
    value /= 10;
    word[1] = char_alphanumeric(value % 36);
    value /= 36;
    word[0] = char_alphanumeric(value % 39);

    let mut callsign: String = word.iter().collect();
    if callsign.starts_with("3D0") {
        callsign = format!("3DA0{}", &callsign[3..]);
    }
    if callsign.starts_with('Q')
        && callsign.len() > 1
        && callsign.as_bytes()[1].is_ascii_alphabetic()
    {
        callsign = format!("3X{}", &callsign[1..]);
    }

    let mut trimmed = callsign.trim().to_owned();
    if portable {
        trimmed.push_str("/P");
    }
    trimmed
}

/// Converts degrees longitude/latitude to a 6-character Maidenhead locator.
pub fn deg2grid(mut dlong: f32, dlat: f32) -> String {
    if dlong < -180.0 {
        dlong += 360.0;
    }
    if dlong > 180.0 {
        dlong -= 360.0;
    }

    let mut grid = [' '; 6];
    let nlong = (60.0 * (180.0 - dlong) / 5.0) as i32;
    let n1 = nlong / 240;
    let n2 = (nlong - 240 * n1) / 24;
    let n3 = nlong - 240 * n1 - 24 * n2;
    grid[0] = (b'A' + n1 as u8) as char;
    grid[2] = (b'0' + n2 as u8) as char;
    grid[4] = (b'a' + n3 as u8) as char;

    let nlat = (60.0 * (dlat + 90.0) / 2.5) as i32;
    let n1 = nlat / 240;
    let n2 = (nlat - 240 * n1) / 24;
    let n3 = nlat - 240 * n1 - 24 * n2;
    grid[1] = (b'A' + n1 as u8) as char;
    grid[3] = (b'0' + n2 as u8) as char;
    grid[5] = (b'a' + n3 as u8) as char;

    grid.iter().collect()
}

/// Converts a Maidenhead locator (4 or 6 characters) to degrees.
pub fn grid2deg(grid: &str) -> (f32, f32) {
    let mut g: Vec<char> = grid.chars().take(6).collect();
    while g.len() < 6 {
        g.push('m');
    }
    g[0] = g[0].to_ascii_uppercase();
    g[1] = g[1].to_ascii_uppercase();
    g[4] = g[4].to_ascii_lowercase();
    g[5] = g[5].to_ascii_lowercase();

    let nlong = 180 - 20 * (g[0] as i32 - 'A' as i32);
    let n20d = 2 * (g[2] as i32 - '0' as i32);
    let xminlong = 5.0 * (g[4] as i32 - 'a' as i32) as f32 + 2.5;
    let dlong = (nlong - n20d) as f32 - xminlong / 60.0;

    let nlat = -90 + 10 * (g[1] as i32 - 'A' as i32) + (g[3] as i32 - '0' as i32);
    let xminlat = 2.5 * ((g[5] as i32 - 'a' as i32) as f32 + 0.5);
    let dlat = nlat as f32 + xminlat / 60.0;
    (dlong, dlat)
}

/// Packs a 4-character grid into 16 bits; [`NMAXGRID`] when absent.
pub fn pack_grid(value: &str) -> u16 {
    let grid = value.trim();
    if grid.len() < 4 {
        return NMAXGRID;
    }
    let (dlong, dlat) = grid2deg(&grid[..4]);
    let ilong = dlong as i32;
    let ilat = (dlat + 90.0) as i32;
    (((ilong + 180) / 2) * 180 + ilat) as u16
}

/// Inverse of [`pack_grid`]; empty when the value is out of the grid band.
pub fn unpack_grid(value: u16) -> String {
    if value > NBASEGRID {
        return String::new();
    }
    let dlat = (i32::from(value) % 180 - 90) as f32;
    let dlong = (i32::from(value) / 180 * 2 - 180 + 2) as f32;
    deg2grid(dlong, dlat)[..4].to_owned()
}

/// Packs a signed number into the 7-bit numeric field; valid range is
/// -31..=31.
pub fn pack_num(num: &str) -> Option<u8> {
    let val: i32 = num.trim().parse().ok()?;
    if !(-31..=31).contains(&val) {
        return None;
    }
    Some(((val + 64) & 0x7F) as u8)
}

const DBM2MW: &[(i32, i32)] = &[
    (0, 1),
    (3, 2),
    (7, 5),
    (10, 10),
    (13, 20),
    (17, 50),
    (20, 100),
    (23, 200),
    (27, 500),
    (30, 1000),
    (33, 2000),
    (37, 5000),
    (40, 10_000),
    (43, 20_000),
    (47, 50_000),
    (50, 100_000),
    (53, 200_000),
    (57, 500_000),
    (60, 1_000_000),
];

/// Rounds a milliwatt figure up to the nearest reportable dBm step.
pub fn mwatts_to_dbm(mwatts: i32) -> i32 {
    for &(dbm, mw) in DBM2MW {
        if mw >= mwatts {
            return dbm;
        }
    }
    DBM2MW[DBM2MW.len() - 1].0
}

/// Maps a dBm step to milliwatts, rounding up between steps.
pub fn dbm_to_mwatts(dbm: i32) -> i32 {
    for &(d, mw) in DBM2MW {
        if d >= dbm {
            return mw;
        }
    }
    DBM2MW[DBM2MW.len() - 1].1
}

/// Packs a dBm power report into the 8-bit extra field.
pub fn pack_pwr(pwr: &str) -> Option<u8> {
    let dbm: i32 = pwr.trim().parse().ok()?;
    Some(dbm_to_mwatts(dbm) as u8)
}
