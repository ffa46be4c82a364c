// ── Config synthesizer ──
//
// Pure translation of a directory snapshot into the two text artifacts
// the exchange consumes: the credential/address file (one auth/aor/
// endpoint triad per resident) and the routing file (one rule per
// apartment plus a direct-dial rule per resident).
//
// Determinism contract: identical snapshots produce byte-identical
// artifacts -- canonical ordering only, no timestamps, no randomness.

use std::fmt::Write;

use crate::model::{Apartment, MIN_RING_SECONDS, Resident, RingStrategy};

/// Endpoint block constants, applied to every resident.
const MAX_CONTACTS: u32 = 1;
const QUALIFY_FREQUENCY: u32 = 30;
const TRANSPORT: &str = "transport-udp";
const CODECS: &str = "ulaw,alaw,opus";

/// Terminal "nobody picked up" announcement.
const UNAVAILABLE_SOUND: &str = "vm-nobodyavail";

/// Knobs that vary per deployment but not per invocation.
#[derive(Debug, Clone)]
pub struct SynthOptions {
    /// Dialplan context the generated endpoints land in.
    pub dial_context: String,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            dial_context: "interfone-ctx".into(),
        }
    }
}

/// The two exchange-consumable text artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Credential/address artifact (auth + aor + endpoint triads).
    pub endpoints: String,
    /// Routing artifact (apartment rules + direct-dial rules).
    pub dialplan: String,
}

/// Synthesize both artifacts from a directory snapshot.
///
/// The snapshot must already be in canonical order (as handed out by
/// the directory repository); the synthesizer adds no ordering of its
/// own beyond iterating it.
pub fn synthesize(apartments: &[Apartment], options: &SynthOptions) -> Artifacts {
    Artifacts {
        endpoints: render_endpoints(apartments, options),
        dialplan: render_dialplan(apartments),
    }
}

/// Ring time each resident gets under the sequential strategy: the
/// total sliced evenly, clamped to the minimum.
pub fn per_resident_seconds(ring_seconds: u32, residents: usize) -> u32 {
    let count = u32::try_from(residents.max(1)).unwrap_or(u32::MAX);
    (ring_seconds / count).max(MIN_RING_SECONDS)
}

fn banner(out: &mut String, file_label: &str) {
    out.push_str("; =====================================\n");
    let _ = writeln!(out, "; generated by interfone -- {file_label}");
    out.push_str("; do not edit: overwritten on every apply\n");
    out.push_str("; =====================================\n\n");
}

/// Strip characters that would break the quoted caller id / comment
/// grammar of the generated files.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '"' | '\\')).collect()
}

// ── Credential / address artifact ───────────────────────────────────

fn render_endpoints(apartments: &[Apartment], options: &SynthOptions) -> String {
    let mut out = String::new();
    banner(&mut out, "endpoint credentials");

    for apartment in apartments {
        for resident in &apartment.residents {
            render_triad(&mut out, apartment, resident, options);
        }
    }
    out
}

fn render_triad(out: &mut String, apartment: &Apartment, resident: &Resident, options: &SynthOptions) {
    let identity = &resident.sip_identity;
    let _ = writeln!(
        out,
        "; --- {} / {} :: {} / {}",
        apartment.extension,
        sanitize(&apartment.label),
        identity,
        sanitize(&resident.name),
    );

    let _ = writeln!(out, "[{identity}]");
    out.push_str("type=auth\n");
    out.push_str("auth_type=userpass\n");
    let _ = writeln!(out, "username={identity}");
    let _ = writeln!(out, "password={}", resident.secret);
    out.push('\n');

    let _ = writeln!(out, "[{identity}]");
    out.push_str("type=aor\n");
    let _ = writeln!(out, "max_contacts={MAX_CONTACTS}");
    out.push_str("remove_existing=yes\n");
    let _ = writeln!(out, "qualify_frequency={QUALIFY_FREQUENCY}");
    out.push('\n');

    let _ = writeln!(out, "[{identity}]");
    out.push_str("type=endpoint\n");
    let _ = writeln!(out, "transport={TRANSPORT}");
    let _ = writeln!(out, "context={}", options.dial_context);
    out.push_str("disallow=all\n");
    let _ = writeln!(out, "allow={CODECS}");
    out.push_str("direct_media=no\n");
    out.push_str("rtp_symmetric=yes\n");
    out.push_str("force_rport=yes\n");
    out.push_str("rewrite_contact=yes\n");
    let _ = writeln!(out, "aors={identity}");
    let _ = writeln!(out, "auth={identity}");
    let _ = writeln!(
        out,
        "callerid=\"{} ({})\" <{identity}>",
        sanitize(&resident.name),
        sanitize(&apartment.label),
    );
    out.push('\n');
}

// ── Routing artifact ────────────────────────────────────────────────

fn render_dialplan(apartments: &[Apartment]) -> String {
    let mut out = String::new();
    banner(&mut out, "apartment routing");

    for apartment in apartments {
        render_apartment_rule(&mut out, apartment);
    }

    out.push_str("; ===== direct resident extensions =====\n");
    for apartment in apartments {
        for resident in &apartment.residents {
            render_direct_rule(&mut out, apartment, resident);
        }
    }
    out
}

fn render_apartment_rule(out: &mut String, apartment: &Apartment) {
    let ext = &apartment.extension;
    let _ = writeln!(
        out,
        "; ===== apartment {ext} - {} (strategy={}) =====",
        sanitize(&apartment.label),
        apartment.strategy,
    );
    let _ = writeln!(
        out,
        "exten => {ext},1,NoOp(interfone apartment {ext} strategy={})",
        apartment.strategy,
    );

    if apartment.residents.is_empty() {
        // Nothing to ring: announce and terminate, never a dial step.
        let _ = writeln!(out, " same => n,Playback({UNAVAILABLE_SOUND})");
        out.push_str(" same => n,Hangup()\n\n");
        return;
    }

    let ring_total = apartment.ring_seconds.max(MIN_RING_SECONDS);
    match apartment.strategy {
        RingStrategy::Parallel => {
            let targets: Vec<String> = apartment
                .residents
                .iter()
                .map(|r| format!("PJSIP/{}", r.sip_identity))
                .collect();
            let _ = writeln!(out, " same => n,Dial({},{ring_total})", targets.join("&"));
            out.push_str(" same => n,Hangup()\n\n");
        }
        RingStrategy::Sequential => {
            let per = per_resident_seconds(ring_total, apartment.residents.len());
            let total = apartment.residents.len();
            for (n, resident) in apartment.residents.iter().enumerate() {
                let _ = writeln!(
                    out,
                    " same => n,NoOp(attempt {}/{total} -> {} {})",
                    n + 1,
                    resident.sip_identity,
                    sanitize(&resident.name),
                );
                let _ = writeln!(out, " same => n,Dial(PJSIP/{},{per})", resident.sip_identity);
                out.push_str(" same => n,GotoIf($[\"${DIALSTATUS}\"=\"ANSWER\"]?done)\n");
            }
            let _ = writeln!(out, " same => n,Playback({UNAVAILABLE_SOUND})");
            out.push_str(" same => n,Hangup()\n");
            out.push_str(" same => n(done),Hangup()\n\n");
        }
    }
}

fn render_direct_rule(out: &mut String, apartment: &Apartment, resident: &Resident) {
    let identity = &resident.sip_identity;
    let _ = writeln!(
        out,
        "exten => {identity},1,NoOp(interfone resident {identity} ({}) apartment {})",
        sanitize(&resident.name),
        apartment.extension,
    );
    let _ = writeln!(
        out,
        " same => n,Dial(PJSIP/{identity},{})",
        apartment.ring_seconds.max(MIN_RING_SECONDS),
    );
    out.push_str(" same => n,Hangup()\n\n");
}
