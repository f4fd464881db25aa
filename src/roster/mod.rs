//! Line-oriented agent roster persistence
//!
//! Format: the first line is the record count, each following line is
//! `<kind-code> <name> <x> <y>`. Loading is partial-success: a malformed
//! record is skipped with a warning and the rest of the file still loads.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::agent::Agent;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentKind, Position};

/// One parsed roster line, validated but not yet an [`Agent`]
///
/// Records carry exactly the four serializable agent fields; identity is
/// assigned by whoever admits the record into a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRecord {
    pub kind: AgentKind,
    pub name: String,
    pub x: i32,
    pub y: i32,
}

impl RosterRecord {
    /// Parse one `<kind-code> <name> <x> <y>` line
    fn parse(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();
        let mut next = || {
            fields
                .next()
                .ok_or_else(|| SimError::MalformedRecord(line.to_string()))
        };
        let code: i32 = parse_field(next()?)?;
        let name = next()?.to_string();
        let x: i32 = parse_field(next()?)?;
        let y: i32 = parse_field(next()?)?;

        let kind = AgentKind::from_code(code)?;
        if !Position::in_bounds(x, y) {
            return Err(SimError::InvalidCoordinates { x, y });
        }
        Ok(Self { kind, name, x, y })
    }
}

fn parse_field<T: std::str::FromStr>(field: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| SimError::MalformedRecord(field.to_string()))
}

/// Save agents to `path`, dead or alive, in registry order
pub fn save(path: &Path, agents: &[Arc<Agent>]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", agents.len())?;
    for agent in agents {
        let pos = agent.position();
        writeln!(out, "{} {} {} {}", agent.kind().code(), agent.name(), pos.x, pos.y)?;
    }
    out.flush()?;
    Ok(())
}

/// Load records from `path`
///
/// An unopenable file or an unreadable count header is an error; bad
/// individual records are skipped and the valid remainder is returned.
pub fn load(path: &Path) -> Result<Vec<RosterRecord>> {
    let mut lines = BufReader::new(File::open(path)?).lines();

    let header = lines
        .next()
        .ok_or_else(|| SimError::MalformedRecord("empty roster file".into()))??;
    let count: usize = header
        .trim()
        .parse()
        .map_err(|_| SimError::MalformedRecord(format!("bad count header: {header}")))?;

    let mut records = Vec::with_capacity(count);
    for line in lines.take(count) {
        let line = line?;
        match RosterRecord::parse(&line) {
            Ok(record) => records.push(record),
            Err(err) => warn!(%err, %line, "skipping malformed roster record"),
        }
    }
    Ok(records)
}
