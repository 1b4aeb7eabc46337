//! Maske Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert Strip-Modell, Text-Protokoll, Rendering, Persistenz-Logik
//! und die Traits für Pixel-Ausgang und Key/Value Speicher.

#![no_std]

pub mod command;
pub mod connection;
pub mod controller;
pub mod logic;
pub mod noise;
pub mod persistence;
pub mod render;
pub mod status;
pub mod store;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use command::{Command, ParseError};
pub use connection::{ConnectionMonitor, LinkAction, LinkState, READVERTISE_GRACE_MS};
pub use controller::{CommandError, Controller, Reply};
pub use logic::{breath_level, scale_color};
pub use noise::noise2d;
pub use persistence::{CommitTicket, Loaded, PersistenceScheduler, SAVE_INTERVAL_MS, SaveState};
pub use render::{Frame, Renderer, render_frame, render_strip};
pub use status::{status_capacity, write_status};
pub use store::{StoreError, StripStore};
pub use traits::{FrameSink, KeyValueStorage, LedError, StorageError};
pub use types::{DEFAULT_BRIGHTNESS, Mode, STRIP_COUNT, StripConfig};
