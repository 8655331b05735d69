use std::fmt::Write;

use ptable_core::{ChecksumCheck, DecodedPattern, FrameLayout, Schema};

fn status(check: &ChecksumCheck) -> &'static str {
    if check.is_match() { "OK" } else { "ERROR" }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Human-readable dump of a decoded pattern table.
///
/// With `summary` set, per-frame colors are omitted and only one status line
/// per frame is printed.
pub fn render_text(pattern: &DecodedPattern, schema: Schema, summary: bool) -> String {
    let mut out = String::new();
    let control = &pattern.control;
    let file = &control.file;
    let channels = &file.channels;

    let _ = writeln!(out, "=== control.dat ===");
    let _ = writeln!(out, "Version: {}", file.version);
    match schema {
        Schema::Fixed {
            of_channels,
            strips,
        } => {
            let _ = writeln!(
                out,
                "Schema: fixed ({} OF slots, {} strip slots)",
                of_channels, strips
            );
        }
        Schema::Variable => {
            let _ = writeln!(out, "Schema: {}", schema.name());
        }
    }
    let _ = writeln!(out, "Enabled OF: {}", channels.of_count());
    let _ = writeln!(out, "Enabled Strip: {}", channels.active_strips());
    let _ = writeln!(out, "LED_num[]: {}", join(&channels.strip_led_counts));
    let _ = writeln!(out, "Total LED: {}", channels.total_leds());
    let _ = writeln!(out, "Frame num: {}", file.frame_count());
    let _ = writeln!(out, "time_stamp[]: {}", join(&file.timestamps));
    let _ = writeln!(
        out,
        "Checksum: {:08X} ({})",
        control.checksum.stored,
        status(&control.checksum)
    );
    if control.trailing_bytes > 0 {
        let _ = writeln!(out, "Trailing bytes: {}", control.trailing_bytes);
    }

    let layout = channels.layout();
    let of_indices: Vec<usize> = channels
        .of_enabled
        .iter()
        .enumerate()
        .filter(|(_, enabled)| **enabled)
        .map(|(index, _)| index)
        .collect();

    let _ = writeln!(out);
    let _ = writeln!(out, "=== frame.dat ===");
    let _ = writeln!(out, "Version: {}", file.version);
    let _ = writeln!(out, "Frame size: {} bytes", pattern.record_len);

    for (index, frame) in pattern.frames.frames.iter().enumerate() {
        let record = &frame.record;
        if summary {
            let _ = writeln!(
                out,
                "Frame{}: start_time={} fade={} checksum={}",
                index,
                record.start_time,
                record.fade,
                status(&frame.checksum)
            );
            continue;
        }
        let _ = writeln!(out, "Frame{}:", index);
        let _ = writeln!(out, "  start_time: {}", record.start_time);
        let _ = writeln!(out, "  fade: {}", if record.fade { "True" } else { "False" });
        let _ = writeln!(out, "  OF colors:");
        for (channel, color) in of_indices.iter().zip(&record.of_colors) {
            let _ = writeln!(
                out,
                "      OF[{}]: G={:03}, R={:03}, B={:03}",
                channel, color.g, color.r, color.b
            );
        }
        let _ = writeln!(out, "  LED colors:");
        render_strips(&mut out, record, &layout);
        let _ = writeln!(
            out,
            "  Checksum: stored={:08X}, calculated={:08X} {}",
            frame.checksum.stored,
            frame.checksum.computed,
            status(&frame.checksum)
        );
    }

    let stream = &pattern.frames;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "total frames: {}/{}",
        stream.frames.len(),
        stream.expected
    );
    if stream.is_partial() {
        let _ = writeln!(out, "WARNING: frame file ends early");
    }
    if stream.leftover_bytes > 0 {
        let _ = writeln!(out, "WARNING: {} unconsumed bytes", stream.leftover_bytes);
    }
    if let Some(index) = file.first_non_monotonic() {
        let _ = writeln!(out, "WARNING: timestamp {} goes backwards", index);
    }
    out
}

fn render_strips(out: &mut String, record: &ptable_core::FrameRecord, layout: &FrameLayout) {
    for strip in 0..layout.led_counts.len() {
        let Some(colors) = record.strip(layout, strip) else {
            continue;
        };
        if colors.is_empty() {
            continue;
        }
        let _ = writeln!(out, "    strip{}:", strip);
        for (led, color) in colors.iter().enumerate() {
            let _ = writeln!(
                out,
                "      LED[{}][{}]: G={:03}, R={:03}, B={:03}",
                strip, led, color.g, color.r, color.b
            );
        }
    }
}
