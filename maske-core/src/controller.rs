//! Controller: Store, Persistence Scheduler und Connection State Machine
//!
//! Das eine Objekt, das zwischen Command-Kontext und Render-Tick geteilt
//! wird. In der Firmware liegt es hinter einem Mutex.

use core::fmt;

use crate::command::{Command, ParseError};
use crate::connection::ConnectionMonitor;
use crate::persistence::PersistenceScheduler;
use crate::status::write_status;
use crate::store::{StoreError, StripStore};

/// Fehler bei der Verarbeitung einer Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    Parse(ParseError),
    Store(StoreError),
    /// Antwortpuffer zu klein für das Status-Dokument
    Response,
}

impl From<ParseError> for CommandError {
    fn from(e: ParseError) -> Self {
        CommandError::Parse(e)
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        CommandError::Store(e)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Parse(e) => write!(f, "parse error: {e}"),
            CommandError::Store(e) => write!(f, "store error: {e}"),
            CommandError::Response => f.write_str("response buffer too small"),
        }
    }
}

/// Ergebnis einer erfolgreich verarbeiteten Nachricht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Store wurde verändert - sofort neu rendern
    Updated,
    /// Status-Dokument mit dieser Länge liegt im Antwortpuffer
    Status(usize),
}

#[derive(Debug, Clone)]
pub struct Controller<const N: usize> {
    pub store: StripStore<N>,
    pub scheduler: PersistenceScheduler,
    pub connection: ConnectionMonitor,
}

impl<const N: usize> Controller<N> {
    pub fn new(store: StripStore<N>, now_ms: u64) -> Self {
        Self {
            store,
            scheduler: PersistenceScheduler::new(now_ms),
            connection: ConnectionMonitor::new(),
        }
    }

    /// Dekodiert und verarbeitet eine Nachricht vom Transport
    ///
    /// Bei `GET_CONFIG` landet das Status-Dokument in `response`.
    pub fn handle_message(
        &mut self,
        message: &[u8],
        now_ms: u64,
        response: &mut [u8],
    ) -> Result<Reply, CommandError> {
        let command = Command::parse(message)?;
        self.apply(command, now_ms, response)
    }

    pub fn apply(
        &mut self,
        command: Command,
        now_ms: u64,
        response: &mut [u8],
    ) -> Result<Reply, CommandError> {
        let result = match command {
            Command::GetConfig => {
                return write_status(&self.store, response)
                    .map(Reply::Status)
                    .map_err(|_| CommandError::Response);
            }
            Command::SetColor(color) => {
                self.store.update_all(|c| c.color = color);
                Ok(())
            }
            Command::SetStripColor { index, color } => {
                self.store.update(index, |c| c.color = color)
            }
            Command::SetMode(mode) => {
                self.store.update_all(|c| c.mode = mode);
                Ok(())
            }
            Command::SetMasked { mask, config } => {
                self.store.set_all(mask, config);
                Ok(())
            }
        };

        if self.store.take_dirty() {
            self.scheduler.mark_dirty(now_ms);
        }
        result?;
        Ok(Reply::Updated)
    }
}
