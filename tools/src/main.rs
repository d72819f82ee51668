// Packs representative messages into wire frames and unpacks them again,
// printing each stage. Handy for eyeballing frame contents and for
// spotting codec regressions from the command line.

use std::env;
use std::process::ExitCode;

use tonelink_core::frame::{unpack_data_frame, FrameType};
use tonelink_core::message::{
    build_message_frames, unpack_compound_message, unpack_directed_message,
    unpack_heartbeat_message, FRAME_FLAG_FAST, FRAME_FLAG_FIRST, FRAME_FLAG_LAST,
};

const SAMPLES: &[&str] = &[
    "CQ CQ CQ EM73",
    "HB EM73",
    "VE7ABC SNR?",
    "VE7ABC MSG HELLO FROM THE ROUND TRIP TOOL",
    "KN4CRD: THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG",
];

fn flags_text(flags: u8) -> String {
    let mut parts = Vec::new();
    if flags & FRAME_FLAG_FIRST != 0 {
        parts.push("first");
    }
    if flags & FRAME_FLAG_LAST != 0 {
        parts.push("last");
    }
    if flags & FRAME_FLAG_FAST != 0 {
        parts.push("fast");
    }
    parts.join("+")
}

fn describe(frame: &str) -> String {
    if let Some(hb) = unpack_heartbeat_message(frame) {
        return format!("heartbeat {} {}", hb.callsign, hb.grid);
    }
    if let Some(msg) = unpack_compound_message(frame) {
        let kind = if msg.frame_type == FrameType::Compound {
            "compound"
        } else {
            "compound-directed"
        };
        return format!("{kind} {}", msg.parts.join("")).trim_end().to_string();
    }
    if let Some(parts) = unpack_directed_message(frame) {
        return format!("directed {}", parts.join(" "));
    }
    if let Some(text) = unpack_data_frame(frame) {
        return format!("data {text:?}");
    }
    "unreadable".to_string()
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let inputs: Vec<&str> = if args.is_empty() {
        SAMPLES.to_vec()
    } else {
        args.iter().map(String::as_str).collect()
    };

    let mut failures = 0;
    for text in inputs {
        println!("message: {text:?}");
        let (frames, info) = build_message_frames("KN4CRD", "EM73", "", text, false, false, 0);
        if frames.is_empty() {
            println!("  no frames produced");
            failures += 1;
            continue;
        }
        if !info.dir_to.is_empty() {
            println!("  directed to {} cmd {:?}", info.dir_to, info.dir_cmd);
        }
        for (frame, flags) in &frames {
            println!("  {frame}  [{}]  {}", flags_text(*flags), describe(frame));
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
