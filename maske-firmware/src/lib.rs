// Library-Root: Firmware-Module und gemeinsam genutzte Typen
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Heap (picoserve Antworten, WiFi)
extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod tasks;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::signal::Signal;
use maske_core::{CommitTicket, Controller, StripConfig};

use crate::config::{COMMIT_QUEUE_DEPTH, STRIP_COUNT};

// ============================================================================
// Geteilter Zustand
// ============================================================================
//
// Render- und Control-Task greifen auf denselben Controller zu. Der Lock wird
// nur synchron gehalten (nie über ein .await hinweg).

/// Store + Persistence Scheduler + Verbindungs-Zustand
pub type SharedController = Mutex<CriticalSectionRawMutex, RefCell<Controller<STRIP_COUNT>>>;

/// Weckt den Render-Task vorzeitig (nach einer erfolgreichen Mutation)
pub type RenderSignal = Signal<CriticalSectionRawMutex, ()>;

/// Löst eine unaufgeforderte mDNS-Ankündigung aus
pub type AnnounceSignal = Signal<CriticalSectionRawMutex, ()>;

/// Auftrag an den Persistenz-Task: Ticket + Snapshot zum Zeitpunkt des Tickets
pub struct CommitJob {
    pub ticket: CommitTicket,
    pub strips: [StripConfig; STRIP_COUNT],
}

/// Channel für Commit-Aufträge (Render → Persistenz)
pub type CommitChannel = Channel<CriticalSectionRawMutex, CommitJob, COMMIT_QUEUE_DEPTH>;

/// Sender für Commit-Aufträge (Render-Task)
pub type CommitSender = Sender<'static, CriticalSectionRawMutex, CommitJob, COMMIT_QUEUE_DEPTH>;

/// Receiver für Commit-Aufträge (Persistenz-Task)
pub type CommitReceiver =
    Receiver<'static, CriticalSectionRawMutex, CommitJob, COMMIT_QUEUE_DEPTH>;

/// Monotone Uhr in Millisekunden seit Boot
pub fn now_ms() -> u64 {
    embassy_time::Instant::now().as_millis()
}
