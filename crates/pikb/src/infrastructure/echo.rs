//! Terminal echo of emitted reports.
//!
//! Every report is printed as one line, tagged `K:` or `M:`:
//!
//! ```text
//! K: 01 00 04 00 00 00 00 00
//! M: 01 05 fd 00
//! ```
//!
//! With annotation on, the decoded form follows in parentheses, e.g.
//! `K: 01 00 04 00 00 00 00 00  (mods=LCtrl keys=[KeyA])`.  Lines go to
//! stdout; logs go to stderr, so the two can be redirected separately.

use std::io::{self, Write};

use pikb_core::report::format_report_line;
use pikb_core::HidReport;

use crate::application::forward_input::ReportEcho;

/// Prints each report through a line callback.
pub struct TerminalEcho {
    annotate: bool,
    out: Box<dyn FnMut(&str) + Send>,
}

impl TerminalEcho {
    /// Echo to stdout.  Write errors (a closed pipe) are ignored.
    pub fn stdout(annotate: bool) -> Self {
        Self::with_callback(annotate, |line| {
            let _ = writeln!(io::stdout().lock(), "{line}");
        })
    }

    pub fn with_callback(annotate: bool, out: impl FnMut(&str) + Send + 'static) -> Self {
        Self {
            annotate,
            out: Box::new(out),
        }
    }
}

impl ReportEcho for TerminalEcho {
    fn report(&mut self, report: &HidReport) {
        let line = format_report_line(report, self.annotate);
        (self.out)(&line);
    }
}

/// Echo that prints nothing (`--hide-events`).
#[derive(Debug, Default)]
pub struct SilentEcho;

impl ReportEcho for SilentEcho {
    fn report(&mut self, _report: &HidReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn capture(annotate: bool) -> (TerminalEcho, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let echo = TerminalEcho::with_callback(annotate, move |line| {
            sink.lock().unwrap().push(line.to_string());
        });
        (echo, lines)
    }

    #[test]
    fn test_plain_lines_are_tagged_hex() {
        let (mut echo, lines) = capture(false);

        echo.report(&HidReport::Keyboard([0x01, 0, 0x04, 0, 0, 0, 0, 0]));
        echo.report(&HidReport::Mouse([0x01, 0x05, 0xFD, 0x00]));

        assert_eq!(
            *lines.lock().unwrap(),
            vec!["K: 01 00 04 00 00 00 00 00", "M: 01 05 fd 00"]
        );
    }

    #[test]
    fn test_annotated_line_appends_decoded_report() {
        let (mut echo, lines) = capture(true);

        echo.report(&HidReport::Keyboard([0x01, 0, 0x04, 0, 0, 0, 0, 0]));

        let lines = lines.lock().unwrap();
        assert!(lines[0].starts_with("K: 01 00 04 00 00 00 00 00  ("));
        assert!(lines[0].contains("KeyA"));
    }
}
