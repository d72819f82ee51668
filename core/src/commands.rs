//! Directed command vocabulary and its wire packing.
//!
//! Commands ride in a 5-bit field plus a 2-bit numeric argument. A few
//! commands change how the surrounding message is handled: buffered
//! commands carry follow-on text, checksummed commands append a packed
//! CRC, SNR commands format their argument as a signed report.

/// Key text to wire value mapping. Table order resolves aliases when
/// mapping a wire value back to text; key matching is longest-first and
/// does not depend on this order.
pub static DIRECTED_CMDS: &[(&str, i8)] = &[
    (" HEARTBEAT", -1),
    (" HB", -1),
    (" CQ", -1),
    (" SNR?", 0),
    ("?", 0),
    (" DIT DIT", 1),
    (" HEARING?", 3),
    (" GRID?", 4),
    (">", 5),
    (" STATUS?", 6),
    (" STATUS", 7),
    (" HEARING", 8),
    (" MSG", 9),
    (" MSG TO:", 10),
    (" QUERY", 11),
    (" QUERY MSGS", 12),
    (" QUERY MSGS?", 12),
    (" QUERY CALL", 13),
    (" GRID", 15),
    (" INFO?", 16),
    (" INFO", 17),
    (" FB", 18),
    (" HW CPY?", 19),
    (" SK", 20),
    (" RR", 21),
    (" QSL?", 22),
    (" QSL", 23),
    (" CMD", 24),
    (" SNR", 25),
    (" NO", 26),
    (" YES", 27),
    (" 73", 28),
    (" NACK", 2),
    (" ACK", 14),
    (" HEARTBEAT SNR", 29),
    (" AGN?", 30),
    ("  ", 31),
    (" ", 31),
];

const AUTOREPLY_CMDS: &[i8] = &[0, 2, 3, 4, 6, 9, 10, 11, 12, 13, 14, 16, 30];
const BUFFERED_CMDS: &[i8] = &[5, 9, 10, 11, 12, 13, 15, 24];
const SNR_CMDS: &[i8] = &[25, 29];
const CHECKSUM_CMDS: &[(i8, u8)] = &[
    (5, 16),
    (9, 16),
    (10, 16),
    (11, 16),
    (12, 16),
    (13, 16),
    (15, 0),
    (24, 16),
];

/// Alternate heartbeat (CQ) flavors, selected by the low heartbeat bits.
pub static CQS: &[(u8, &str)] = &[
    (0, "CQ CQ CQ"),
    (1, "CQ DX"),
    (2, "CQ QRP"),
    (3, "CQ CONTEST"),
    (4, "CQ FIELD"),
    (5, "CQ FD"),
    (6, "CQ CQ"),
    (7, "CQ"),
];

pub fn cq_text(number: u8) -> &'static str {
    CQS.iter()
        .find(|&&(n, _)| n == number)
        .map(|&(_, t)| t)
        .unwrap_or("CQ")
}

/// Heartbeats have a single flavor regardless of number.
pub fn hb_text(_number: u8) -> &'static str {
    "HB"
}

pub fn cmd_value(cmd: &str) -> Option<i8> {
    DIRECTED_CMDS
        .iter()
        .find(|&&(k, _)| k == cmd)
        .map(|&(_, v)| v)
}

/// First key for a wire value; table order resolves aliases.
pub fn cmd_text(value: i8) -> Option<&'static str> {
    DIRECTED_CMDS
        .iter()
        .find(|&&(_, v)| v == value)
        .map(|&(k, _)| k)
}

pub fn is_snr_command(cmd: &str) -> bool {
    cmd_value(cmd).is_some_and(|v| SNR_CMDS.contains(&v))
}

pub fn is_command_buffered(cmd: &str) -> bool {
    cmd_value(cmd).is_some_and(|v| BUFFERED_CMDS.contains(&v))
}

pub fn is_command_autoreply(cmd: &str) -> bool {
    cmd_value(cmd).is_some_and(|v| AUTOREPLY_CMDS.contains(&v))
}

pub fn is_command_allowed(cmd: &str) -> bool {
    cmd_value(cmd).is_some()
}

/// Checksum width the command's buffered text carries; 0 for none.
pub fn command_checksum_size(cmd: &str) -> u8 {
    cmd_value(cmd)
        .and_then(|v| CHECKSUM_CMDS.iter().find(|&&(c, _)| c == v))
        .map(|&(_, size)| size)
        .unwrap_or(0)
}

/// Packs a command and the low two numeric bits into the 7-bit band
/// carried by compound-directed frames.
pub fn pack_cmd(cmd: u8, num: u8) -> u8 {
    ((cmd & 0x1F) << 2) | (num & 0x03)
}

pub fn unpack_cmd(value: u8) -> (u8, u8) {
    ((value >> 2) & 0x1F, value & 0x03)
}

/// Clamps and offsets a numeric argument into the 6-bit extra field.
pub fn pack_num_clamped(num: &str) -> Option<u8> {
    let val: i32 = num.trim().parse().ok()?;
    Some((val.clamp(-30, 31) + 31) as u8)
}

/// Formats an SNR report with an explicit sign.
pub fn format_snr(snr: i32) -> String {
    if snr >= 0 {
        format!("+{snr}")
    } else {
        snr.to_string()
    }
}
