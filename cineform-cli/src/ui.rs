// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

//! Human-readable printing for sample headers, effective metadata, and session stats: the CLI's
//! equivalent of a container demuxer's format/track dump.

use cineform::StatsSnapshot;
use cineform_container::sample::SampleHeader;
use cineform_core::frame::EncodedFormat;
use cineform_metadata::CfhdData;

const PAD: usize = 22;

fn print_header(title: &str) {
    println!("+ {title}");
}

fn print_pair(key: &str, value: impl std::fmt::Display) {
    println!("  {key:<PAD$}{value}");
}

fn encoded_format_name(format: EncodedFormat) -> &'static str {
    match format {
        EncodedFormat::Gray => "Gray",
        EncodedFormat::Yuv422 => "YUV 4:2:2",
        EncodedFormat::Rgb => "RGB 4:4:4",
        EncodedFormat::Rgba => "RGBA 4:4:4:4",
        EncodedFormat::Bayer4 => "Bayer (G/R-G/B-G/dG)",
    }
}

pub fn print_sample_header(header: &SampleHeader, byte_len: usize) {
    print_header("Sample");
    print_pair("Encoded format:", encoded_format_name(header.format));
    print_pair("Dimensions:", format!("{}x{}", header.width, header.height));
    print_pair("Display height:", header.display_height);
    print_pair("Wavelet levels:", header.level_count);
    print_pair("Channels:", header.channel_count);
    print_pair("Frame kind:", if header.is_keyframe { "key" } else { "difference" });
    print_pair("Sample bytes:", byte_len);
}

pub fn print_metadata(data: &CfhdData) {
    print_header("Effective metadata");
    print_pair("Clip GUID:", hex_guid(&data.clip_guid));
    print_pair("Encode curve:", data.encode_curve);
    print_pair("Decode curve:", data.decode_curve);
    print_pair("White balance:", format!("{:?}", data.white_balance));
    print_pair("Gamma tweaks:", format!("{:?}", data.gamma_tweaks));
    print_pair("Process flags:", format!("{:?}", data.process_path_flags));
    print_pair("Framing zoom:", data.framing.zoom);
    print_pair("Timecode:", if data.timecode.is_empty() { "-" } else { &data.timecode });
}

pub fn print_stats(stats: &StatsSnapshot) {
    print_header("Session stats");
    print_pair("Samples encoded:", stats.samples_encoded);
    print_pair("Samples decoded:", stats.samples_decoded);
    print_pair("Bytes written:", stats.bytes_written);
    print_pair("Peaks emitted:", stats.peaks_emitted);
    print_pair("FSM cache hits:", stats.fsm_cache_hits);
    print_pair("FSM cache misses:", stats.fsm_cache_misses);
}

fn hex_guid(guid: &[u8; 16]) -> String {
    guid.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join("")
}
