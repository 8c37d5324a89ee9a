//! Criterion benchmarks for the report hot path.
//!
//! Measures applying a raw event to the device state tracker (which includes
//! key translation and report encoding) and formatting an echo line.  Both
//! run once per forwarded event and must stay far below the 1 ms budget a
//! USB full-speed polling interval leaves.
//!
//! Run with:
//! ```bash
//! cargo bench --package pikb-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pikb_core::domain::input::{REL_X, REL_Y};
use pikb_core::report::format_report_line;
use pikb_core::{decode, DeviceKind, DeviceStateTracker, HidReport, MacroEvent, RawInputEvent};

// ── Event fixtures ────────────────────────────────────────────────────────────

const KEY_A: u16 = 30;
const KEY_LEFTSHIFT: u16 = 42;

fn keyboard_cycle() -> [RawInputEvent; 4] {
    [
        RawInputEvent::key_down(KEY_LEFTSHIFT),
        RawInputEvent::key_down(KEY_A),
        RawInputEvent::key_up(KEY_A),
        RawInputEvent::key_up(KEY_LEFTSHIFT),
    ]
}

fn mouse_frame() -> [RawInputEvent; 3] {
    [
        RawInputEvent::relative(REL_X, 7),
        RawInputEvent::relative(REL_Y, -4),
        RawInputEvent::Sync,
    ]
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_tracker(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker_apply");

    let keys = keyboard_cycle();
    group.bench_function("keyboard_cycle", |b| {
        let mut tracker = DeviceStateTracker::new();
        b.iter(|| {
            for event in &keys {
                black_box(tracker.apply(DeviceKind::Keyboard, black_box(event)));
            }
        })
    });

    let frame = mouse_frame();
    group.bench_function("mouse_frame", |b| {
        let mut tracker = DeviceStateTracker::new();
        b.iter(|| {
            for event in &frame {
                black_box(tracker.apply(DeviceKind::Mouse, black_box(event)));
            }
        })
    });

    group.finish();
}

fn bench_echo_and_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_output");
    let report = HidReport::Keyboard([0x02, 0, 0x04, 0x05, 0, 0, 0, 0]);

    group.bench_function("format_plain", |b| {
        b.iter(|| format_report_line(black_box(&report), false))
    });
    group.bench_function("format_annotated", |b| {
        b.iter(|| format_report_line(black_box(&report), true))
    });
    group.bench_function("decode", |b| {
        b.iter(|| decode(black_box(report.as_bytes()), DeviceKind::Keyboard).unwrap())
    });
    group.bench_function("macro_line", |b| {
        b.iter(|| MacroEvent::new(black_box(&report), black_box(42)).to_line().unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_tracker, bench_echo_and_record);
criterion_main!(benches);
