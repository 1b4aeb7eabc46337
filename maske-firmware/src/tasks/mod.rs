// Task-Modul: Enthält alle Embassy Tasks
//
// Render-, Control- und Persistenz-Task teilen sich den Controller über einen
// Mutex. Commit-Aufträge laufen über einen Channel, Render- und
// Announce-Wakeups über Signale.

pub mod control;
pub mod mdns;
pub mod persistence;
pub mod render;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use control::control_server_task;
pub use mdns::mdns_responder_task;
pub use persistence::persistence_task;
pub use render::render_task;
pub use wifi::{connection_task, dhcp_task, net_task};
