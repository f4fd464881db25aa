//! Kill-event observers
//!
//! Observers are the external logging collaborators: each successful kill
//! is reported to every subscriber of the winning agent. Sinks serialize
//! their own writes; combat resolution is never blocked or failed by a
//! sink that has gone bad after construction.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::agent::Agent;
use crate::core::error::Result;

/// Receiver of fight notifications
///
/// `won == true` means `attacker` killed `defender`. Implementations must
/// tolerate concurrent invocation from multiple combat consumers.
pub trait FightObserver: Send + Sync {
    fn on_fight(&self, attacker: &Agent, defender: &Agent, won: bool);
}

/// The one report line both sinks agree on
fn kill_line(attacker: &Agent, defender: &Agent) -> String {
    format!(
        "{} \"{}\" killed {} \"{}\"",
        attacker.kind(),
        attacker.name(),
        defender.kind(),
        defender.name()
    )
}

/// Writes kill lines to stdout
///
/// `println!` holds the stdout lock for the whole line, so concurrent
/// kills from several consumers never interleave mid-line.
pub struct ConsoleObserver;

impl FightObserver for ConsoleObserver {
    fn on_fight(&self, attacker: &Agent, defender: &Agent, won: bool) {
        if won {
            println!("{}", kill_line(attacker, defender));
        }
    }
}

/// Appends kill lines to a log file
pub struct FileObserver {
    sink: Mutex<BufWriter<File>>,
}

impl FileObserver {
    /// Open (or create) the log file in append mode
    ///
    /// Failing to open the file is fatal here, at construction time; any
    /// write failure afterwards is absorbed in `on_fight`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            sink: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl FightObserver for FileObserver {
    fn on_fight(&self, attacker: &Agent, defender: &Agent, won: bool) {
        if !won {
            return;
        }
        let mut sink = self.sink.lock();
        // A sink that fails mid-run (disk full, file deleted) must not
        // propagate into the combat loop.
        let _ = writeln!(sink, "{}", kill_line(attacker, defender));
        let _ = sink.flush();
    }
}
