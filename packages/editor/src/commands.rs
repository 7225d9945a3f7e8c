//! # Edge-Triggered Commands
//!
//! Copy, download and import-start are requested through counters owned by
//! the host. Each counter is a single-slot command channel: the host bumps
//! it once per user action, and the controller acts once per observed
//! increase. Re-delivering the same counter values (e.g. on every re-render)
//! performs nothing.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    Copy,
    Download,
    Import,
}

impl CommandKind {
    pub const ALL: [CommandKind; 3] = [CommandKind::Copy, CommandKind::Download, CommandKind::Import];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Copy => "copy",
            CommandKind::Download => "download",
            CommandKind::Import => "import",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-side sequence numbers, one per channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCounters {
    pub copy: u64,
    pub download: u64,
    pub import: u64,
}

impl CommandCounters {
    pub fn get(&self, kind: CommandKind) -> u64 {
        match kind {
            CommandKind::Copy => self.copy,
            CommandKind::Download => self.download,
            CommandKind::Import => self.import,
        }
    }

    /// Request one more `kind` action
    pub fn bump(&mut self, kind: CommandKind) -> &mut Self {
        let counter = match kind {
            CommandKind::Copy => &mut self.copy,
            CommandKind::Download => &mut self.download,
            CommandKind::Import => &mut self.import,
        };
        *counter += 1;
        self
    }
}

/// Last-seen sequence number of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandChannel {
    kind: CommandKind,
    last_seen: u64,
}

impl CommandChannel {
    pub fn new(kind: CommandKind) -> Self {
        Self { kind, last_seen: 0 }
    }

    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }

    /// Record `sequence`; true exactly when it advances the channel.
    pub fn observe(&mut self, sequence: u64) -> bool {
        if sequence > self.last_seen {
            self.last_seen = sequence;
            return true;
        }

        if sequence < self.last_seen {
            warn!(
                command = %self.kind,
                sequence,
                last_seen = self.last_seen,
                "Ignoring command counter that went backwards"
            );
        }
        false
    }
}

/// The three channels the sync controller listens on
#[derive(Debug, Clone)]
pub struct CommandChannels {
    channels: [CommandChannel; 3],
}

impl CommandChannels {
    pub fn new() -> Self {
        Self {
            channels: CommandKind::ALL.map(CommandChannel::new),
        }
    }

    /// Commands whose counters advanced, in copy, download, import order
    pub fn observe(&mut self, counters: &CommandCounters) -> Vec<CommandKind> {
        self.channels
            .iter_mut()
            .filter_map(|channel| channel.observe(counters.get(channel.kind)).then_some(channel.kind))
            .collect()
    }

    pub fn last_seen(&self) -> CommandCounters {
        CommandCounters {
            copy: self.channels[0].last_seen,
            download: self.channels[1].last_seen,
            import: self.channels[2].last_seen,
        }
    }
}

impl Default for CommandChannels {
    fn default() -> Self {
        Self::new()
    }
}
