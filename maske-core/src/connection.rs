//! Connection State Machine
//!
//! Verfolgt Connect/Disconnect des Steuer-Links. Nach dem Übergang
//! CONNECTED → DISCONNECTED wird nach einer kurzen Karenzzeit die
//! Erreichbarkeit neu angekündigt, damit sich ein neuer Client verbinden kann.

/// Karenzzeit bis zur erneuten Ankündigung
pub const READVERTISE_GRACE_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Disconnected,
    Connected,
}

/// Aktion die der Transport ausführen soll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkAction {
    RestartAdvertising,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionMonitor {
    state: LinkState,
    readvertise_at: Option<u64>,
    grace_ms: u64,
}

impl ConnectionMonitor {
    pub const fn new() -> Self {
        Self::with_grace(READVERTISE_GRACE_MS)
    }

    pub const fn with_grace(grace_ms: u64) -> Self {
        Self {
            state: LinkState::Disconnected,
            readvertise_at: None,
            grace_ms,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Client hat sich verbunden; eine noch ausstehende Ankündigung entfällt
    pub fn on_connect(&mut self) {
        self.state = LinkState::Connected;
        self.readvertise_at = None;
    }

    /// Client hat die Verbindung getrennt
    pub fn on_disconnect(&mut self, now_ms: u64) {
        if self.state == LinkState::Connected {
            self.readvertise_at = Some(now_ms.saturating_add(self.grace_ms));
        }
        self.state = LinkState::Disconnected;
    }

    /// Zeitprüfung pro Tick
    pub fn poll(&mut self, now_ms: u64) -> Option<LinkAction> {
        match self.readvertise_at {
            Some(due) if now_ms >= due => {
                self.readvertise_at = None;
                Some(LinkAction::RestartAdvertising)
            }
            _ => None,
        }
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_disconnected() {
        let mut monitor = ConnectionMonitor::new();
        assert_eq!(monitor.state(), LinkState::Disconnected);
        assert_eq!(monitor.poll(10_000), None);
    }

    #[test]
    fn test_readvertise_after_grace() {
        let mut monitor = ConnectionMonitor::new();
        monitor.on_connect();
        assert!(monitor.is_connected());

        monitor.on_disconnect(1_000);
        assert_eq!(monitor.poll(1_499), None);
        assert_eq!(monitor.poll(1_500), Some(LinkAction::RestartAdvertising));
        // Nur einmal pro Übergang
        assert_eq!(monitor.poll(1_510), None);
    }

    #[test]
    fn test_disconnect_without_connect_is_not_an_edge() {
        let mut monitor = ConnectionMonitor::new();
        monitor.on_disconnect(0);
        assert_eq!(monitor.poll(5_000), None);
    }

    #[test]
    fn test_reconnect_cancels_pending_readvertise() {
        let mut monitor = ConnectionMonitor::new();
        monitor.on_connect();
        monitor.on_disconnect(0);
        monitor.on_connect();
        assert_eq!(monitor.poll(1_000), None);
    }
}
