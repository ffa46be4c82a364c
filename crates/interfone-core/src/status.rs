// ── Status collector ──
//
// Parsers over the two line-oriented telemetry feeds from the exchange
// control interface, and the collection cycle that joins them into a
// full-replacement snapshot. Malformed lines are a visible parse
// outcome (`Skipped`), never an abort; an unreachable control
// interface degrades to empty maps.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::exchange::ControlInterface;
use crate::model::{RegistrationState, StatusEntry};

/// Control-interface query returning contact/registration lines.
pub const SHOW_CONTACTS: &str = "pjsip show contacts";

/// Control-interface query returning concise channel lines.
pub const SHOW_CHANNELS: &str = "core show channels concise";

/// Channel names in the concise report start with this protocol prefix.
const CHANNEL_PREFIX: &str = "PJSIP/";

// ── Registration parser ─────────────────────────────────────────────

/// Tagged outcome of parsing one contact-report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactLine<'a> {
    Matched {
        identity: &'a str,
        state: RegistrationState,
    },
    Skipped,
}

/// Parse one line of the contact report.
///
/// The identity is the substring before the first `/` of the line's
/// first whitespace-separated token (`1011/sip:1011@host:5060 ...`);
/// the state is the first recognized state token on the line. Anything
/// else is `Skipped`.
pub fn parse_contact_line(line: &str) -> ContactLine<'_> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(head) = tokens.first() else {
        return ContactLine::Skipped;
    };
    let Some((identity, _)) = head.split_once('/') else {
        return ContactLine::Skipped;
    };
    if identity.is_empty() {
        return ContactLine::Skipped;
    }
    for token in &tokens {
        let state = match *token {
            "Avail" => RegistrationState::Available,
            "Unavail" => RegistrationState::Unavailable,
            "Unknown" => RegistrationState::Unknown,
            _ => continue,
        };
        return ContactLine::Matched { identity, state };
    }
    ContactLine::Skipped
}

/// Fold a whole contact report into identity → registration state.
pub fn parse_contacts(report: &str) -> HashMap<String, RegistrationState> {
    let mut states = HashMap::new();
    for line in report.lines() {
        if let ContactLine::Matched { identity, state } = parse_contact_line(line) {
            states.insert(identity.to_owned(), state);
        }
    }
    states
}

// ── Channel census parser ───────────────────────────────────────────

/// Count busy channels per identity from a concise channel report.
///
/// Channel names look like `PJSIP/1011-0000000a`; the identity is the
/// part between the protocol prefix and the instance suffix. Lines
/// without the prefix are ignored.
pub fn parse_channels(report: &str) -> HashMap<String, u32> {
    let mut busy = HashMap::new();
    for line in report.lines() {
        let channel = line.split('!').next().unwrap_or(line);
        let Some(rest) = channel.strip_prefix(CHANNEL_PREFIX) else {
            continue;
        };
        let identity = rest.split('-').next().unwrap_or(rest);
        if identity.is_empty() {
            continue;
        }
        *busy.entry(identity.to_owned()).or_insert(0) += 1;
    }
    busy
}

// ── Collection cycle ────────────────────────────────────────────────

/// Live status for the whole exchange at one instant.
///
/// Recomputed every cycle as a full replacement -- never merged with
/// the previous snapshot.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    pub registrations: HashMap<String, RegistrationState>,
    pub busy: HashMap<String, u32>,
    pub collected_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    /// The pre-first-collection snapshot: everything unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Join both feeds for a single identity.
    pub fn entry(&self, identity: &str) -> StatusEntry {
        StatusEntry {
            registration: self
                .registrations
                .get(identity)
                .copied()
                .unwrap_or_default(),
            busy_channels: self.busy.get(identity).copied().unwrap_or(0),
        }
    }
}

/// Run both telemetry queries and parse them into a snapshot.
///
/// A failed or timed-out query degrades that feed to an empty map for
/// this cycle; it never fails the cycle itself.
pub async fn collect(control: &dyn ControlInterface) -> StatusSnapshot {
    let registrations = match control.run(SHOW_CONTACTS).await {
        Ok(report) => parse_contacts(&report),
        Err(err) => {
            warn!(error = %err, "contact query failed; registrations unknown this cycle");
            HashMap::new()
        }
    };

    let busy = match control.run(SHOW_CHANNELS).await {
        Ok(report) => parse_channels(&report),
        Err(err) => {
            warn!(error = %err, "channel query failed; busy counts unknown this cycle");
            HashMap::new()
        }
    };

    StatusSnapshot {
        registrations,
        busy,
        collected_at: Some(Utc::now()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn contact_line_extracts_identity_and_state() {
        let line = "  1011/sip:1011@203.0.113.7:5060   b4c1a2   Avail   32.123";
        assert_eq!(
            parse_contact_line(line),
            ContactLine::Matched {
                identity: "1011",
                state: RegistrationState::Available,
            }
        );
    }

    #[test]
    fn contact_report_skips_garbage_lines() {
        let report = "\
Contact:  <Aor/ContactUri>                      <Hash>  <Status>  <RTT(ms)>
==========================================================================
  1011/sip:1011@203.0.113.7:5060   b4c1a2   Avail   32.123
  garbage line with no separator
  1012/sip:1012@203.0.113.9:5060   9f00aa
Objects found: 2
";
        let states = parse_contacts(report);
        // One well-formed line, everything else skipped, no error.
        assert_eq!(states.len(), 1);
        assert_eq!(states["1011"], RegistrationState::Available);
    }

    #[test]
    fn contact_report_maps_all_state_tokens() {
        let report = "\
1011/sip:1011@a   x  Avail  1.0
1012/sip:1012@b   x  Unavail  -
1013/sip:1013@c   x  Unknown  -
";
        let states = parse_contacts(report);
        assert_eq!(states["1011"], RegistrationState::Available);
        assert_eq!(states["1012"], RegistrationState::Unavailable);
        assert_eq!(states["1013"], RegistrationState::Unknown);
    }

    #[test]
    fn empty_report_yields_empty_map() {
        assert!(parse_contacts("").is_empty());
        assert!(parse_channels("").is_empty());
    }

    #[test]
    fn channel_census_counts_per_identity() {
        let report = "\
PJSIP/1011-0000000a!interfone-ctx!101!1!Up!Dial!PJSIP/1011!1001!!!3!17!
PJSIP/1011-0000000b!interfone-ctx!101!1!Up!Dial!PJSIP/1011!1001!!!3!17!
PJSIP/1012-00000001!interfone-ctx!102!1!Ring!!!!!!2!4!
Local/99@default-0000;1!default!!1!Up!!!!!!0!0!
0 active calls
";
        let busy = parse_channels(report);
        assert_eq!(busy["1011"], 2);
        assert_eq!(busy["1012"], 1);
        assert_eq!(busy.len(), 2);
    }

    #[test]
    fn truncated_channel_lines_are_ignored() {
        let busy = parse_channels("PJSIP/\nPJSIP\n!!!\n");
        assert!(busy.is_empty());
    }

    #[test]
    fn snapshot_entry_joins_both_feeds() {
        let mut snapshot = StatusSnapshot::empty();
        snapshot
            .registrations
            .insert("1011".into(), RegistrationState::Available);
        snapshot.busy.insert("1011".into(), 2);

        let entry = snapshot.entry("1011");
        assert!(entry.is_online());
        assert!(entry.is_busy());
        assert_eq!(entry.busy_channels, 2);

        let unseen = snapshot.entry("9999");
        assert_eq!(unseen.registration, RegistrationState::Unknown);
        assert!(!unseen.is_busy());
    }
}
