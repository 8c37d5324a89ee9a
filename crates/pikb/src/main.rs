//! pikb entry point.
//!
//! Resolves the configuration, wires a source, a sink and an echo into the
//! [`ForwardingEngine`], and runs it until the exit chord or a signal.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config() + CLI overrides -> DeviceConfig
//!  └─ source:  LiveSource (evdev)   | RecordedSource (--play)
//!  └─ sink:    GadgetSink (/dev/hidg*) | NullSink (--no-usb)
//!  └─ echo:    TerminalEcho (stdout)   | SilentEcho (--hide-events)
//!  └─ ForwardingEngine::run(shutdown on SIGINT/SIGTERM)
//! ```
//!
//! # Hotkeys (for beginners)
//!
//! While running, two chords on the local keyboard control the forwarder:
//!
//! - **Ctrl + Meta** toggles capture.  While capture is off, reports are
//!   still printed (and recorded) but nothing reaches the other computer,
//!   and the local desktop gets its keyboard and mouse back.
//! - **Ctrl + Shift + Meta** exits.  All keys are released on the other
//!   computer first, so nothing stays stuck down.
//!
//! The process exits with status 0 after a clean stop and 1 on any error.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pikb::application::forward_input::{ForwardingEngine, InputSource, OutputSink, ReportEcho};
use pikb::application::record_macro::MacroRecorder;
use pikb::application::replay_macro::RecordedSource;
use pikb::infrastructure::echo::{SilentEcho, TerminalEcho};
use pikb::infrastructure::output_sink::null::NullSink;
use pikb::infrastructure::storage::config::{
    load_config, parse_id, AppConfig, CliOverrides, DeviceOverride, GadgetPaths, ModelPreset,
    SpoofOverride,
};
use pikb::infrastructure::storage::macro_file::{load_macro, open_recording};
use pikb_core::report::{KEYBOARD_REPORT_DESCRIPTOR, MOUSE_REPORT_DESCRIPTOR};
use pikb_core::{DeviceConfig, DeviceKind};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Forward a Raspberry Pi 400/500 keyboard and mouse to another computer.
///
/// The board's USB port must already be configured as a HID gadget with a
/// keyboard function and a mouse function.
#[derive(Debug, Parser)]
#[command(name = "pikb", version)]
struct Cli {
    /// Keyboard-computer model whose device IDs and paths to start from.
    #[arg(long, value_enum, env = "PIKB_PRESET")]
    preset: Option<ModelPreset>,

    /// TOML config file layered between the preset and these flags.
    #[arg(long, env = "PIKB_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (`error`, `warn`, `info`, `debug`, `trace`).  `RUST_LOG`
    /// takes precedence when set.
    #[arg(long)]
    log_level: Option<String>,

    /// Keyboard USB vendor ID (`0x04d9` or decimal).
    #[arg(long, value_parser = parse_id)]
    keyboard_vid: Option<u16>,

    /// Keyboard USB product ID.
    #[arg(long, value_parser = parse_id)]
    keyboard_pid: Option<u16>,

    /// Keyboard evdev path.
    #[arg(long)]
    keyboard_dev: Option<PathBuf>,

    /// Mouse USB vendor ID.
    #[arg(long, value_parser = parse_id)]
    mouse_vid: Option<u16>,

    /// Mouse USB product ID.
    #[arg(long, value_parser = parse_id)]
    mouse_pid: Option<u16>,

    /// Mouse evdev path.
    #[arg(long)]
    mouse_dev: Option<PathBuf>,

    /// Vendor ID the gadget presents.  Defaults to the keyboard's.
    #[arg(long, value_parser = parse_id)]
    spoof_vid: Option<u16>,

    /// Product ID the gadget presents.  Defaults to the keyboard's.
    #[arg(long, value_parser = parse_id)]
    spoof_pid: Option<u16>,

    /// Device revision (`bcdDevice`) the gadget presents.
    #[arg(long, value_parser = parse_id)]
    spoof_revision: Option<u16>,

    /// Keyboard gadget character file.
    #[arg(long)]
    keyboard_gadget: Option<PathBuf>,

    /// Mouse gadget character file.
    #[arg(long)]
    mouse_gadget: Option<PathBuf>,

    /// Do not write to the gadget; only print the reports.
    #[arg(long)]
    no_usb: bool,

    /// Do not print reports.
    #[arg(long)]
    hide_events: bool,

    /// Append the decoded modifiers and keys to each printed report.
    #[arg(long)]
    annotate: bool,

    /// Leave the local devices shared with the desktop while capturing.
    #[arg(long)]
    no_grab: bool,

    /// Record emitted reports to a macro file.
    #[arg(long, value_name = "FILE", conflicts_with = "play")]
    record: Option<PathBuf>,

    /// Play a macro file instead of reading the local devices.
    #[arg(long, value_name = "FILE")]
    play: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the gadget identity and report descriptors, then exit.
    Describe,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            preset: self.preset,
            log_level: self.log_level.clone(),
            keyboard: DeviceOverride {
                vid: self.keyboard_vid,
                pid: self.keyboard_pid,
                dev: self.keyboard_dev.clone(),
            },
            mouse: DeviceOverride {
                vid: self.mouse_vid,
                pid: self.mouse_pid,
                dev: self.mouse_dev.clone(),
            },
            spoof: SpoofOverride {
                vid: self.spoof_vid,
                pid: self.spoof_pid,
                revision: self.spoof_revision,
            },
            gadget: GadgetPaths {
                keyboard: self.keyboard_gadget.clone(),
                mouse: self.mouse_gadget.clone(),
            },
            no_usb: self.no_usb,
            hide_events: self.hide_events,
            annotate: self.annotate,
            no_grab: self.no_grab,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("pikb: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut app = load_config(cli.config.as_deref())
        .with_context(|| format!("loading config {:?}", cli.config))?;
    app.apply_cli(cli.overrides());

    // Logs go to stderr so stdout carries only the report lines.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(app.log_level.as_str())),
        )
        .init();

    let config = app.resolve().context("resolving device configuration")?;

    if let Some(Command::Describe) = cli.command {
        describe(&config);
        return Ok(());
    }

    info!(
        preset = ?app.preset,
        keyboard = %config.keyboard,
        mouse = %config.mouse,
        spoof = %config.spoof,
        "pikb starting"
    );
    for kind in DeviceKind::ALL {
        if AppConfig::is_unconfigured(&config, kind) {
            warn!(%kind, "no IDs or path known for this model; pass --{kind}-vid/--{kind}-pid or --{kind}-dev");
        }
    }

    let source: Box<dyn InputSource> = match &cli.play {
        Some(path) => {
            let events = load_macro(path)?;
            Box::new(RecordedSource::new(events).context("preparing playback")?)
        }
        None => live_source(&config)?,
    };
    let sink = open_sink(&config)?;
    let echo: Box<dyn ReportEcho> = if config.hide_events {
        Box::new(SilentEcho)
    } else {
        Box::new(TerminalEcho::stdout(app.output.annotate))
    };

    let mut engine = ForwardingEngine::new(source, sink, echo);
    if let Some(path) = &cli.record {
        engine = engine.with_recorder(MacroRecorder::new(open_recording(path)?));
    }

    let summary = engine.run(shutdown_signal()).await?;
    info!(
        reports = summary.reports_emitted,
        sent = summary.reports_sent,
        "pikb stopped"
    );
    Ok(())
}

// ── Wiring ────────────────────────────────────────────────────────────────────

#[cfg(target_os = "linux")]
fn live_source(config: &DeviceConfig) -> anyhow::Result<Box<dyn InputSource>> {
    use pikb::infrastructure::input_source::live::LiveSource;

    let source = LiveSource::open(config).context("opening input devices")?;
    Ok(Box::new(source))
}

#[cfg(not(target_os = "linux"))]
fn live_source(_config: &DeviceConfig) -> anyhow::Result<Box<dyn InputSource>> {
    anyhow::bail!("reading local input devices requires Linux evdev; use --play on this platform")
}

#[cfg(target_os = "linux")]
fn open_sink(config: &DeviceConfig) -> anyhow::Result<Box<dyn OutputSink>> {
    use pikb::infrastructure::output_sink::gadget::GadgetSink;

    if config.no_usb {
        return Ok(Box::new(NullSink));
    }
    let sink = GadgetSink::open(config).context("opening USB HID gadget (try --no-usb)")?;
    Ok(Box::new(sink))
}

#[cfg(not(target_os = "linux"))]
fn open_sink(config: &DeviceConfig) -> anyhow::Result<Box<dyn OutputSink>> {
    if !config.no_usb {
        anyhow::bail!("USB HID gadget output requires Linux; pass --no-usb");
    }
    Ok(Box::new(NullSink))
}

/// Resolves when SIGINT or SIGTERM arrives.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!("cannot listen for SIGTERM: {e}");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("SIGINT received"),
        _ = term.recv() => info!("SIGTERM received"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Prints what an installation script needs to configure the gadget.
fn describe(config: &DeviceConfig) {
    println!("id_vendor=0x{:04x}", config.spoof.vendor_id);
    println!("id_product=0x{:04x}", config.spoof.product_id);
    println!("bcd_device=0x{:04x}", config.spoof.revision);
    println!("keyboard_gadget={}", config.keyboard_gadget.display());
    println!("mouse_gadget={}", config.mouse_gadget.display());
    println!("keyboard_report_length={}", pikb_core::report::descriptor::keyboard_input_len());
    println!("keyboard_report_desc={}", hex::encode(KEYBOARD_REPORT_DESCRIPTOR));
    println!("mouse_report_length={}", pikb_core::report::descriptor::mouse_input_len());
    println!("mouse_report_desc={}", hex::encode(MOUSE_REPORT_DESCRIPTOR));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
