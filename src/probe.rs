//! Topology probing
//!
//! Runs the topology reporter (`xrandr -q --verbose`) and parses its
//! line-oriented output into connectors. The parser only has to be right
//! about four line classes (screen banner, connector header, mode line,
//! EDID block); everything else is logged and skipped, because the verbose
//! report contains plenty of per-mode detail we do not care about.

use std::process::Command;

use tracing::{info, warn};

use crate::constants::{connectors, report};
use crate::error::SetupError;
use crate::topology::Connector;
use crate::types::Resolution;

/// Runs the topology reporter and parses its output.
pub fn run() -> Result<Vec<Connector>, SetupError> {
    let output = Command::new(report::COMMAND).args(report::ARGS).output()?;
    if !output.status.success() {
        return Err(SetupError::Process {
            command: format!("{} {}", report::COMMAND, report::ARGS.join(" ")),
            status: output.status,
        });
    }
    let connectors = parse(&String::from_utf8_lossy(&output.stdout))?;
    info!(count = connectors.len(), "probed display connectors");
    Ok(connectors)
}

/// Parses a topology report into connectors, in first-seen order.
///
/// While an "EDID:" marker is active, indented all-hex lines accumulate
/// into the current connector's identification blob; the first line that
/// does not match ends the block and is classified normally.
pub fn parse(report: &str) -> Result<Vec<Connector>, SetupError> {
    let mut parsed: Vec<Connector> = Vec::new();
    let mut current: Option<usize> = None;
    let mut in_edid_block = false;

    for line in report.lines() {
        if in_edid_block {
            let trimmed = line.trim();
            if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
                if let Some(idx) = current {
                    parsed[idx].append_edid(trimmed);
                }
                continue;
            }
            in_edid_block = false;
            // this line was not part of the blob; classify it normally
        }

        if is_screen_banner(line) {
            current = None;
            continue;
        }

        if let Some(name) = parse_connector_header(line) {
            if parsed.iter().any(|c| c.name == name) {
                return Err(SetupError::ProtocolViolation(format!(
                    "connector {name} listed twice in topology report"
                )));
            }
            parsed.push(Connector::new(name));
            current = Some(parsed.len() - 1);
            continue;
        }

        if let Some((resolution, preferred)) = parse_mode_line(line) {
            let Some(idx) = current else {
                return Err(SetupError::ProtocolViolation(format!(
                    "mode line outside of any connector block: {}",
                    line.trim()
                )));
            };
            parsed[idx].add_resolution(resolution);
            if preferred {
                parsed[idx].mark_preferred(resolution);
            }
            continue;
        }

        if line.trim() == "EDID:" {
            in_edid_block = true;
            continue;
        }

        warn!(line, "skipping unrecognized topology report line");
    }

    // virtual outputs are parsed so duplicate detection still sees them,
    // but they never take part in configuration
    Ok(parsed
        .into_iter()
        .filter(|c| !c.name.starts_with(connectors::VIRTUAL_PREFIX))
        .collect())
}

/// "Screen 0: minimum 8 x 8, current ..." lines delimit X screens.
fn is_screen_banner(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("Screen ") else {
        return false;
    };
    let Some((number, _)) = rest.split_once(':') else {
        return false;
    };
    !number.is_empty() && number.chars().all(|c| c.is_ascii_digit())
}

/// "eDP-1 connected primary 1920x1080+0+0 ..." or "HDMI-1 disconnected ...".
/// Both start a connector block; connection state is read off the
/// resolution list later.
fn parse_connector_header(line: &str) -> Option<String> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    match tokens.next()? {
        "connected" | "disconnected" => {}
        _ => return None,
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }
    Some(name.to_string())
}

/// "  1920x1080 (0x47) 152.840MHz ... +preferred" mode lines; only the
/// size and the preferred marker matter.
fn parse_mode_line(line: &str) -> Option<(Resolution, bool)> {
    if !line.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = line.split_whitespace();
    let resolution = Resolution::from_mode_string(tokens.next()?)?;
    let preferred = tokens.any(|t| t == "+preferred");
    Some((resolution, preferred))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Screen 0: minimum 8 x 8, current 1920 x 1080, maximum 32767 x 32767
eDP-1 connected primary 1920x1080+0+0 (0x47) normal (normal left inverted right x axis y axis) 344mm x 194mm
\tIdentifier: 0x42
\tTimestamp:  75724741
\tEDID:
\t\t00ffffffffffff0006af3d5700000000
\t\t001a0104951f117802a8959e57549226
\t\t0f505400000001010101010101010101
  1920x1080 (0x47) 152.840MHz -HSync -VSync *current +preferred
        h: width  1920 start 1968 end 2000 total 2226 skew    0 clock  68.66KHz
        v: height 1080 start 1083 end 1088 total 1142           clock  60.12Hz
  1400x1050 (0x48) 121.750MHz +HSync -VSync
  1024x768 (0x49) 65.000MHz -HSync -VSync
HDMI-1 disconnected (normal left inverted right x axis y axis)
DP-1 connected (normal left inverted right x axis y axis)
\tEDID:
\t\t00ffffffffffff0010acb8a042443930
  1920x1080 (0x4a) 148.500MHz +HSync +VSync +preferred
  1280x720 (0x4b) 74.250MHz +HSync +VSync
";

    #[test]
    fn test_connectors_in_first_seen_order() {
        let connectors = parse(REPORT).unwrap();
        let names: Vec<&str> = connectors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["eDP-1", "HDMI-1", "DP-1"]);
    }

    #[test]
    fn test_resolutions_attached_to_their_connector() {
        let connectors = parse(REPORT).unwrap();
        assert_eq!(connectors[0].resolutions().len(), 3);
        assert!(connectors[0]
            .resolutions()
            .contains(&Resolution::new(1400, 1050)));
        assert_eq!(connectors[2].resolutions().len(), 2);
    }

    #[test]
    fn test_disconnected_connector_has_no_resolutions() {
        let connectors = parse(REPORT).unwrap();
        assert!(!connectors[1].is_connected());
        assert!(connectors[0].is_connected());
        assert!(connectors[2].is_connected());
    }

    #[test]
    fn test_preferred_marker() {
        let connectors = parse(REPORT).unwrap();
        assert_eq!(connectors[0].preferred(), Some(Resolution::new(1920, 1080)));
        assert_eq!(connectors[2].preferred(), Some(Resolution::new(1920, 1080)));
    }

    #[test]
    fn test_edid_accumulated_across_lines() {
        let connectors = parse(REPORT).unwrap();
        let edid = connectors[0].edid.as_deref().unwrap();
        assert_eq!(edid.len(), 96);
        assert!(edid.starts_with("00ffffffffffff0006af3d57"));
        assert_eq!(connectors[1].edid, None);
    }

    #[test]
    fn test_edid_block_terminator_is_reclassified() {
        // DP-1's EDID block is ended by a mode line, which must still be
        // recorded as a resolution
        let connectors = parse(REPORT).unwrap();
        assert!(connectors[2]
            .resolutions()
            .contains(&Resolution::new(1920, 1080)));
        assert_eq!(connectors[2].edid.as_deref().unwrap().len(), 32);
    }

    #[test]
    fn test_duplicate_connector_is_protocol_violation() {
        let report = "\
eDP-1 connected 1366x768+0+0
  1366x768 (0x47) 69.30MHz
eDP-1 connected 1366x768+0+0
  1366x768 (0x47) 69.30MHz
";
        let err = parse(report).unwrap_err();
        assert!(matches!(err, SetupError::ProtocolViolation(_)));
    }

    #[test]
    fn test_mode_line_before_any_connector_is_protocol_violation() {
        let err = parse("  1366x768 (0x47) 69.30MHz\n").unwrap_err();
        assert!(matches!(err, SetupError::ProtocolViolation(_)));
    }

    #[test]
    fn test_screen_banner_resets_connector_context() {
        let report = "\
eDP-1 connected 1366x768+0+0
  1366x768 (0x47) 69.30MHz
Screen 1: minimum 8 x 8, current 1024 x 768, maximum 32767 x 32767
  1024x768 (0x49) 65.000MHz
";
        let err = parse(report).unwrap_err();
        assert!(matches!(err, SetupError::ProtocolViolation(_)));
    }

    #[test]
    fn test_virtual_connectors_are_skipped() {
        let report = "\
eDP-1 connected 1366x768+0+0
  1366x768 (0x47) 69.30MHz
VIRTUAL1 disconnected (normal left inverted right x axis y axis)
";
        let connectors = parse(report).unwrap();
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].name, "eDP-1");
    }

    #[test]
    fn test_unrecognized_lines_are_not_fatal() {
        let report = "\
eDP-1 connected 1366x768+0+0
\tGamma:      1.0:1.0:1.0
\tBrightness: 1.0
\tCRTC:       0
  1366x768 (0x47) 69.30MHz *current +preferred
";
        let connectors = parse(report).unwrap();
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].resolutions().len(), 1);
    }

    #[test]
    fn test_duplicate_mode_lines_collapse() {
        // the same size shows up once per refresh rate in verbose output
        let report = "\
eDP-1 connected 1366x768+0+0
  1920x1080 (0x47) 148.500MHz
  1920x1080 (0x48) 120.000MHz
  1280x720 (0x49) 74.250MHz
";
        let connectors = parse(report).unwrap();
        assert_eq!(connectors[0].resolutions().len(), 2);
    }

    #[test]
    fn test_empty_report_parses_to_no_connectors() {
        assert!(parse("").unwrap().is_empty());
    }
}
