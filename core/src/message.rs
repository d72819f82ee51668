//! Message-level packing: free text in, 72-bit frames out, and back.
//!
//! Outgoing text is consumed left to right. Each step tries the frame
//! kinds in priority order (heartbeat, compound, directed, data) and
//! emits the highest-priority kind that matches a prefix. Heartbeat and
//! compound matches consume the whole line; directed matches consume
//! only the address and command, leaving any buffered text for data
//! frames.

use crate::callsign::{
    is_compound_callsign, is_valid_callsign, pack_callsign, pack_grid, unpack_callsign,
    unpack_grid, NBASEGRID, NMAXGRID, NUSERGRID,
};
use crate::checksum::{checksum16, checksum32};
use crate::commands::{
    self, cmd_text, cmd_value, command_checksum_size, format_snr, is_command_allowed,
    is_command_buffered, is_snr_command, pack_num_clamped, unpack_cmd, CQS,
};
use crate::frame::{
    pack_compound_frame, pack_data_frame, pack_directed_frame, pack_fast_data_frame,
    unpack_compound_frame, unpack_directed_frame, DirectedFrame, FrameType,
};

/// Frame flag bits attached by [`build_message_frames`].
pub const FRAME_FLAG_FIRST: u8 = 1;
pub const FRAME_FLAG_LAST: u8 = 2;
pub const FRAME_FLAG_FAST: u8 = 4;

/// Details of the directed portion of a built message, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageInfo {
    pub dir_to: String,
    pub dir_cmd: String,
    pub dir_num: String,
}

fn is_grid_token(token: &str) -> bool {
    let b = token.as_bytes();
    let head = b.len() >= 4
        && b[0].is_ascii_uppercase()
        && b[0] <= b'R'
        && b[1].is_ascii_uppercase()
        && b[1] <= b'R'
        && b[2].is_ascii_digit()
        && b[3].is_ascii_digit();
    match b.len() {
        4 => head,
        6 => {
            head && b[4].is_ascii_uppercase()
                && b[4] <= b'X'
                && b[5].is_ascii_uppercase()
                && b[5] <= b'X'
        }
        _ => false,
    }
}

fn leading_ws(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

fn callsign_token(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '/' || c == '@'))
        .unwrap_or(text.len());
    &text[..end]
}

/// Longest directed-command key prefixing `text`, respecting word
/// boundaries for alphabetic commands.
fn match_cmd_prefix(text: &str) -> Option<(&'static str, i8)> {
    let mut keys: Vec<&(&str, i8)> = commands::DIRECTED_CMDS.iter().collect();
    keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    for &&(key, value) in &keys {
        if !text.starts_with(key) {
            continue;
        }
        let rest = &text[key.len()..];
        let word_cmd = key
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphanumeric());
        if word_cmd {
            if rest.is_empty() || rest.starts_with(' ') {
                return Some((key, value));
            }
        } else {
            return Some((key, value));
        }
    }
    None
}

fn numeric_token(text: &str) -> &str {
    let trimmed = &text[leading_ws(text)..];
    let mut len = 0;
    let b = trimmed.as_bytes();
    if b.first() == Some(&b'+') || b.first() == Some(&b'-') {
        len = 1;
    }
    let mut digits = 0;
    while len < b.len() && b[len].is_ascii_digit() && digits < 3 {
        len += 1;
        digits += 1;
    }
    if digits == 0 {
        return "";
    }
    &text[..leading_ws(text) + len]
}

const HEARTBEAT_TYPES: &[&str] = &[
    "CQ CQ CQ", "CQ DX", "CQ QRP", "CQ CONTEST", "CQ FIELD", "CQ FD", "CQ CQ", "CQ",
    "HB ALT", "HB", "HEARTBEAT",
];

struct HeartbeatMatch {
    kind: &'static str,
    grid: Option<String>,
}

fn parse_heartbeat(text: &str) -> Option<HeartbeatMatch> {
    let mut rest = text.trim_start();

    for prefix in ["@ALLCALL", "@HB"] {
        if let Some(after) = rest.strip_prefix(prefix) {
            if after.starts_with(' ') {
                rest = after.trim_start();
                break;
            }
        }
    }

    let kind = HEARTBEAT_TYPES
        .iter()
        .find(|&&t| rest.starts_with(t))
        .copied()?;
    rest = &rest[kind.len()..];

    // "HEARTBEAT SNR" is a directed command, not a heartbeat.
    if kind == "HEARTBEAT" && rest.trim_start().starts_with("SNR") && rest.starts_with(' ') {
        return None;
    }

    let mut grid = None;
    if rest.starts_with(' ') {
        let token: String = rest
            .trim_start()
            .chars()
            .take(4)
            .collect();
        if is_grid_token(&token) {
            grid = Some(token);
        }
    }

    Some(HeartbeatMatch { kind, grid })
}

/// Packs a heartbeat or CQ line. The whole line is consumed on success.
pub fn pack_heartbeat_message(text: &str, callsign: &str) -> Option<(String, usize)> {
    let m = parse_heartbeat(text)?;
    if callsign.is_empty() {
        return None;
    }

    let is_alt = m.kind.starts_with("CQ");
    let mut packed_extra = NMAXGRID;
    if let Some(ref grid) = m.grid {
        packed_extra = pack_grid(grid);
    }

    let mut cq_number = 0u8;
    if is_alt {
        if let Some(&(n, _)) = CQS.iter().find(|&&(_, t)| t == m.kind) {
            cq_number = n;
        }
        packed_extra |= 1 << 15;
    }

    let frame = pack_compound_frame(callsign, FrameType::Heartbeat, packed_extra, cq_number)?;
    Some((frame, text.len()))
}

/// Decoded heartbeat, as display parts: callsign, grid, flavor bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatMessage {
    pub callsign: String,
    pub grid: String,
    pub is_alt: bool,
    pub bits3: u8,
}

pub fn unpack_heartbeat_message(text: &str) -> Option<HeartbeatMessage> {
    let frame = unpack_compound_frame(text)?;
    if frame.frame_type != FrameType::Heartbeat {
        return None;
    }
    Some(HeartbeatMessage {
        callsign: frame.callsign,
        grid: unpack_grid(frame.num & ((1 << 15) - 1)),
        is_alt: frame.num & (1 << 15) != 0,
        bits3: frame.bits3,
    })
}

struct CompoundMatch {
    callsign: String,
    grid: Option<String>,
    cmd: Option<&'static str>,
    num: String,
}

fn parse_compound(text: &str) -> Option<CompoundMatch> {
    let mut rest = text.trim_start();
    rest = rest.strip_prefix('`').unwrap_or(rest);

    let callsign = callsign_token(rest);
    if callsign.is_empty() {
        return None;
    }
    rest = &rest[callsign.len()..];

    // Grid branch: a bare locator after the callsign.
    if rest.starts_with(' ') {
        let token = rest.trim_start();
        let word_end = token.find(' ').unwrap_or(token.len());
        let word = &token[..word_end];
        if is_grid_token(word) && token[word_end..].trim().is_empty() {
            return Some(CompoundMatch {
                callsign: callsign.to_owned(),
                grid: Some(word.to_owned()),
                cmd: None,
                num: String::new(),
            });
        }
    }

    // Command branch: a directed command with an optional number.
    if let Some((key, _)) = match_cmd_prefix(rest) {
        let after = &rest[key.len()..];
        let num = numeric_token(after);
        let tail = &after[num.len()..];
        if tail.trim().is_empty() {
            return Some(CompoundMatch {
                callsign: callsign.to_owned(),
                grid: None,
                cmd: Some(key),
                num: num.trim_start().to_owned(),
            });
        }
    }

    None
}

/// Packs a compound callsign announcement (grid or command form). The
/// whole line is consumed on success.
pub fn pack_compound_message(text: &str) -> Option<(String, usize)> {
    let m = parse_compound(text)?;

    let (frame_type, extra) = match m.cmd {
        Some(key) if is_command_allowed(key) => {
            let value = cmd_value(key)? as u8;
            let inum = pack_num_clamped(&m.num).unwrap_or(0);
            (
                FrameType::CompoundDirected,
                NUSERGRID + u16::from(commands::pack_cmd(value, inum)),
            )
        }
        _ => match m.grid {
            Some(ref grid) => (FrameType::Compound, pack_grid(grid)),
            None => return None,
        },
    };

    let frame = pack_compound_frame(&m.callsign, frame_type, extra, 0)?;
    Some((frame, text.len()))
}

/// Decoded compound announcement as display parts: the callsign followed
/// by its grid or command suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundMessage {
    pub parts: Vec<String>,
    pub frame_type: FrameType,
    pub num: u16,
    pub bits3: u8,
}

pub fn unpack_compound_message(text: &str) -> Option<CompoundMessage> {
    let frame = unpack_compound_frame(text)?;
    if !matches!(
        frame.frame_type,
        FrameType::Compound | FrameType::CompoundDirected
    ) {
        return None;
    }

    let mut parts = vec![frame.callsign.clone(), String::new()];
    if frame.num <= NBASEGRID {
        parts.push(format!(" {}", unpack_grid(frame.num)));
    } else if (NUSERGRID..NMAXGRID).contains(&frame.num) {
        let (cmd, num) = unpack_cmd((frame.num - NUSERGRID) as u8);
        if let Some(key) = cmd_text(cmd as i8) {
            parts.push(key.to_owned());
            if is_snr_command(key) {
                parts.push(format_snr(i32::from(num) - 31));
            }
        }
    }

    Some(CompoundMessage {
        parts,
        frame_type: frame.frame_type,
        num: frame.num,
        bits3: frame.bits3,
    })
}

/// Parsed directed prefix plus the packed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectedParts {
    pub frame: String,
    pub to: String,
    pub to_compound: bool,
    pub cmd: String,
    pub num: String,
    pub consumed: usize,
}

/// Packs the directed prefix of a line: `TO[CMD][ NUM]`. Unlike the
/// heartbeat and compound packers this consumes only the matched prefix,
/// leaving buffered text behind.
pub fn pack_directed_message(text: &str, mycall: &str) -> Option<DirectedParts> {
    let ws = leading_ws(text);
    let to = callsign_token(&text[ws..]);
    if to.is_empty() {
        return None;
    }
    let mut pos = ws + to.len();
    if text[pos..].starts_with(':') {
        pos += 1;
    }

    let (cmd, _) = match_cmd_prefix(&text[pos..])?;
    pos += cmd.len();

    let num = numeric_token(&text[pos..]);
    pos += num.len();

    let (valid_to, to_compound) = is_valid_callsign(to);
    if !valid_to || to == mycall {
        return None;
    }
    if !is_command_allowed(cmd) && !is_command_allowed(cmd.trim_start()) {
        return None;
    }

    let wire_to = if to_compound { "<....>" } else { to };
    let wire_from = if is_compound_callsign(mycall) {
        "<....>"
    } else {
        mycall
    };
    let (packed_from, portable_from) = pack_callsign(wire_from)?;
    let (packed_to, portable_to) = pack_callsign(wire_to)?;

    let packed_cmd = cmd_value(cmd)
        .or_else(|| cmd_value(&format!(" {}", cmd.trim_start())))
        .unwrap_or(0) as u8;
    let inum = pack_num_clamped(num).unwrap_or(0);

    let frame = pack_directed_frame(DirectedFrame {
        from: packed_from,
        to: packed_to,
        cmd: packed_cmd,
        num: inum,
        portable_from,
        portable_to,
    });

    Some(DirectedParts {
        frame,
        to: to.to_owned(),
        to_compound,
        cmd: cmd.to_owned(),
        num: num.trim_start().to_owned(),
        consumed: pos,
    })
}

/// Unpacks a directed frame into display parts: from, to, command, and
/// the numeric argument when present.
pub fn unpack_directed_message(text: &str) -> Option<Vec<String>> {
    let frame = unpack_directed_frame(text)?;

    let from = unpack_callsign(frame.from, frame.portable_from);
    let to = unpack_callsign(frame.to, frame.portable_to);
    let cmd = cmd_text((frame.cmd % 32) as i8);

    let mut out = Vec::new();
    if !from.is_empty() {
        out.push(from);
    }
    if !to.is_empty() {
        out.push(to);
    }
    if let Some(cmd) = cmd {
        out.push(cmd.to_owned());
    }
    if frame.num != 0 {
        let value = i32::from(frame.num) - 31;
        match cmd {
            Some(c) if is_snr_command(c) => out.push(format_snr(value)),
            _ => out.push(value.to_string()),
        }
    }
    Some(out)
}

/// Escapes non-ASCII characters as `\uXXXX` sequences.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if (c as u32) < 0x80 {
            out.push(c);
        } else {
            out.push_str(&format!("\\U{:04x}", (c as u32) & 0xFFFF));
        }
    }
    out
}

/// Inverse of [`escape`]; non-ASCII codepoints are dropped.
pub fn unescape(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        let is_escape = bytes[i] == b'\\'
            && i + 6 <= bytes.len()
            && (bytes[i + 1] == b'u' || bytes[i + 1] == b'U')
            && bytes[i + 2..i + 6].iter().all(u8::is_ascii_hexdigit);
        if is_escape {
            if let Ok(code) = u32::from_str_radix(&text[i + 2..i + 6], 16) {
                if code < 0x80 {
                    if let Some(c) = char::from_u32(code) {
                        out.push(c);
                    }
                }
            }
            i += 6;
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

/// Splits a free-text message into a flagged frame sequence.
///
/// Flags per frame: bit 0 first, bit 1 last, bit 2 fast data. A nonzero
/// submode selects fast data frames for the text portions.
pub fn build_message_frames(
    mycall: &str,
    mygrid: &str,
    selected_call: &str,
    text: &str,
    force_identify: bool,
    force_data: bool,
    submode_id: u32,
) -> (Vec<(String, u8)>, MessageInfo) {
    let mycall_compound = is_compound_callsign(mycall);
    let mut info = MessageInfo::default();
    let mut frames: Vec<(String, u8)> = Vec::new();

    let mut line = text.to_owned();
    let mut has_directed = false;
    let mut has_data = force_data;

    // Strip our own callsign prefix.
    if line.starts_with(&format!("{mycall}:")) || line.starts_with(&format!("{mycall} ")) {
        line = line[mycall.len() + 1..].trim_start().to_owned();
    }

    // Address the selected station unless the line already does.
    if !selected_call.is_empty()
        && !line.starts_with(selected_call)
        && !line.starts_with('`')
        && !force_data
    {
        let starts_with_base =
            line.starts_with("@ALLCALL") || line.starts_with("CQ") || line.starts_with("HB");
        if !starts_with_base {
            let sep = if line.starts_with(' ') { "" } else { " " };
            line = format!("{selected_call}{sep}{line}");
        }
    }

    while !line.is_empty() {
        let bcn = if !has_directed && !has_data {
            pack_heartbeat_message(&line, mycall)
        } else {
            None
        };
        let cmp = if !has_directed && !has_data {
            pack_compound_message(&line)
        } else {
            None
        };
        let dir = if !has_directed && !has_data {
            pack_directed_message(&line, mycall)
        } else {
            None
        };

        if force_identify
            && frames.is_empty()
            && selected_call.is_empty()
            && dir.is_none()
            && bcn.is_none()
            && cmp.is_none()
            && !line.contains(mycall)
        {
            line = format!("{mycall}: {line}");
            continue;
        }

        if let Some((frame, consumed)) = bcn {
            frames.push((frame, 0));
            line = line[consumed..].to_owned();
            continue;
        }
        if let Some((frame, consumed)) = cmp {
            frames.push((frame, 0));
            line = line[consumed..].to_owned();
            continue;
        }
        if let Some(parts) = dir {
            has_directed = true;
            if mycall_compound || parts.to_compound {
                // Compound callsigns do not fit the 28-bit field, so the
                // exchange is announced with two compound frames instead.
                let de_msg = format!("`{mycall} {mygrid}");
                if let Some((frame, _)) = pack_compound_message(&de_msg) {
                    frames.push((frame, 0));
                }
                let dir_msg = format!("`{}{}{}", parts.to, parts.cmd, parts.num);
                if let Some((frame, _)) = pack_compound_message(&dir_msg) {
                    frames.push((frame, 0));
                }
            } else {
                frames.push((parts.frame.clone(), 0));
            }
            line = line[parts.consumed..].to_owned();

            if is_command_buffered(&parts.cmd) && !line.is_empty() {
                line = line.trim_start().to_owned();
                match command_checksum_size(&parts.cmd) {
                    32 => line = format!("{line} {}", checksum32(&line)),
                    16 => line = format!("{line} {}", checksum16(&line)),
                    _ => {}
                }
            }

            info.dir_to = parts.to;
            info.dir_cmd = parts.cmd;
            info.dir_num = parts.num;
            continue;
        }

        let fast = submode_id != 0;
        let (frame, consumed) = if fast {
            pack_fast_data_frame(&line)
        } else {
            pack_data_frame(&line)
        };
        if consumed == 0 {
            break;
        }
        has_data = true;
        frames.push((frame, if fast { FRAME_FLAG_FAST } else { 0 }));
        line = line[consumed..].to_owned();
    }

    if let Some(first) = frames.first_mut() {
        first.1 |= FRAME_FLAG_FIRST;
    }
    if let Some(last) = frames.last_mut() {
        last.1 |= FRAME_FLAG_LAST;
    }

    (frames, info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_round_trip_with_grid() {
        let (frame, consumed) = pack_heartbeat_message("HB EM73", "KN4CRD").unwrap();
        assert_eq!(consumed, 7);
        let hb = unpack_heartbeat_message(&frame).unwrap();
        assert_eq!(hb.callsign, "KN4CRD");
        assert_eq!(hb.grid, "EM73");
        assert!(!hb.is_alt);
    }

    #[test]
    fn cq_flavors_set_alt_flag() {
        let (frame, _) = pack_heartbeat_message("CQ DX FN31", "KN4CRD").unwrap();
        let hb = unpack_heartbeat_message(&frame).unwrap();
        assert!(hb.is_alt);
        assert_eq!(hb.bits3, 1);
        assert_eq!(hb.grid, "FN31");
    }

    #[test]
    fn heartbeat_without_grid_uses_sentinel() {
        let (frame, _) = pack_heartbeat_message("HEARTBEAT", "KN4CRD").unwrap();
        let hb = unpack_heartbeat_message(&frame).unwrap();
        assert_eq!(hb.grid, "");
    }

    #[test]
    fn heartbeat_snr_is_not_a_heartbeat() {
        assert!(pack_heartbeat_message("HEARTBEAT SNR +10", "KN4CRD").is_none());
    }

    #[test]
    fn compound_grid_round_trip() {
        let (frame, _) = pack_compound_message("KN4CRD/QRP EM73").unwrap();
        let msg = unpack_compound_message(&frame).unwrap();
        assert_eq!(msg.frame_type, FrameType::Compound);
        assert_eq!(msg.parts[0], "KN4CRD/QRP");
        assert_eq!(msg.parts[2], " EM73");
    }

    #[test]
    fn compound_directed_round_trip() {
        let (frame, _) = pack_compound_message("`VE3/KN4CRD SNR -10").unwrap();
        let msg = unpack_compound_message(&frame).unwrap();
        assert_eq!(msg.frame_type, FrameType::CompoundDirected);
        assert_eq!(msg.parts[0], "VE3/KN4CRD");
        assert_eq!(msg.parts[2], " SNR");
        // Only the low two bits of the number ride along.
        assert_eq!(msg.parts[3], format_snr((-10i32 + 31) % 4 - 31));
    }

    #[test]
    fn compound_requires_grid_or_command() {
        assert!(pack_compound_message("KN4CRD/QRP").is_none());
        assert!(pack_compound_message("KN4CRD/QRP NOTACMD").is_none());
    }

    #[test]
    fn directed_round_trip() {
        let parts = pack_directed_message("VE7ABC SNR? ", "KN4CRD").unwrap();
        assert_eq!(parts.to, "VE7ABC");
        assert_eq!(parts.cmd, " SNR?");
        let out = unpack_directed_message(&parts.frame).unwrap();
        assert_eq!(out, vec!["KN4CRD", "VE7ABC", " SNR?"]);
    }

    #[test]
    fn directed_snr_report_formats_number() {
        let parts = pack_directed_message("VE7ABC SNR -15", "KN4CRD").unwrap();
        let out = unpack_directed_message(&parts.frame).unwrap();
        assert_eq!(out, vec!["KN4CRD", "VE7ABC", " SNR", "-15"]);
    }

    #[test]
    fn directed_to_self_rejected() {
        assert!(pack_directed_message("KN4CRD SNR?", "KN4CRD").is_none());
    }

    #[test]
    fn directed_consumes_only_prefix() {
        let parts = pack_directed_message("VE7ABC MSG HELLO THERE", "KN4CRD").unwrap();
        assert_eq!(&"VE7ABC MSG HELLO THERE"[parts.consumed..], " HELLO THERE");
    }

    #[test]
    fn build_plain_message_sets_first_and_last() {
        let (frames, _) = build_message_frames(
            "KN4CRD",
            "EM73",
            "",
            "KN4CRD: HELLO WORLD",
            false,
            false,
            0,
        );
        assert!(!frames.is_empty());
        assert_eq!(frames.first().unwrap().1 & FRAME_FLAG_FIRST, FRAME_FLAG_FIRST);
        assert_eq!(frames.last().unwrap().1 & FRAME_FLAG_LAST, FRAME_FLAG_LAST);
        for (frame, _) in &frames {
            assert_eq!(frame.len(), 12);
        }
    }

    #[test]
    fn build_directed_with_buffered_text_appends_checksum() {
        let (frames, info) = build_message_frames(
            "KN4CRD",
            "EM73",
            "",
            "VE7ABC MSG HELLO",
            false,
            false,
            0,
        );
        assert_eq!(info.dir_cmd, " MSG");
        assert_eq!(info.dir_to, "VE7ABC");
        assert!(frames.len() >= 2);

        // Reassemble the data portion and verify the appended checksum.
        let mut data = String::new();
        for (frame, flags) in &frames[1..] {
            assert_eq!(flags & FRAME_FLAG_FAST, 0);
            data.push_str(&crate::frame::unpack_data_frame(frame).unwrap());
        }
        let (text, check) = data.rsplit_once(' ').unwrap();
        assert_eq!(text, "HELLO");
        assert!(crate::checksum::checksum16_valid(check, text));
    }

    #[test]
    fn build_fast_data_sets_fast_flag() {
        let (frames, _) =
            build_message_frames("KN4CRD", "EM73", "", "HELLO", false, true, 2);
        assert!(!frames.is_empty());
        for (_, flags) in &frames {
            assert_eq!(flags & FRAME_FLAG_FAST, FRAME_FLAG_FAST);
        }
    }

    #[test]
    fn build_compound_callsign_uses_announcement_frames() {
        let (frames, info) = build_message_frames(
            "VE3/KN4CRD",
            "EM73",
            "",
            "VE7ABC ACK",
            false,
            false,
            0,
        );
        assert_eq!(info.dir_cmd, " ACK");
        // Two compound frames replace the single directed frame.
        assert_eq!(frames.len(), 2);
        for (frame, _) in &frames {
            assert!(unpack_compound_message(frame).is_some());
        }
    }

    #[test]
    fn selected_call_is_prepended() {
        let (frames, info) =
            build_message_frames("KN4CRD", "EM73", "VE7ABC", "SNR?", false, false, 0);
        assert_eq!(info.dir_to, "VE7ABC");
        assert!(!frames.is_empty());
    }

    #[test]
    fn escape_round_trip() {
        assert_eq!(escape("HELLO"), "HELLO");
        let escaped = escape("caf\u{e9}");
        assert_eq!(escaped, "caf\\U00e9");
        assert_eq!(unescape("ABC\\u0041"), "ABCA");
        assert_eq!(unescape("no escapes"), "no escapes");
    }
}
