//! Command channel between the network side and the control loop.
//!
//! Uses an `embassy-sync` bounded channel so the web handler can queue
//! commands without allocating or blocking; the control loop drains it
//! once per tick.
//!
//! ```text
//! ┌──────────────┐  LightCommand  ┌──────────────┐
//! │ Web handler  │──────────────▶│ Control loop │
//! └──────────────┘                └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use super::commands::LightCommand;

/// Channel depth for queued commands.
pub const COMMAND_DEPTH: usize = 8;

/// Bounded multi-producer queue of [`LightCommand`]s.
pub struct CommandQueue {
    channel: Channel<CriticalSectionRawMutex, LightCommand, COMMAND_DEPTH>,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Queue a command.  When the queue is full the command is handed back.
    pub fn submit(&self, cmd: LightCommand) -> Result<(), LightCommand> {
        self.channel.try_send(cmd).map_err(|TrySendError::Full(cmd)| cmd)
    }

    /// Next pending command, if any.
    pub fn try_next(&self) -> Option<LightCommand> {
        self.channel.try_receive().ok()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands from the web handler to the control loop.
pub static COMMANDS: CommandQueue = CommandQueue::new();
