// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

use maske_core::status_capacity;

// ============================================================================
// LED / Strip Konfiguration
// ============================================================================

/// Anzahl der Strips auf der Maske
pub const STRIP_COUNT: usize = maske_core::STRIP_COUNT;

/// Pixel pro Strip (Reihenfolge = Verkettung an der Datenleitung)
pub const STRIP_LENGTHS: [usize; STRIP_COUNT] = [11; STRIP_COUNT];

/// Längster Strip, bestimmt die Frame-Breite
pub const MAX_STRIP_PIXELS: usize = 11;

/// Summe aller Pixel an der Datenleitung
pub const TOTAL_PIXELS: usize = 99;

// Längen-Tabelle und abgeleitete Konstanten müssen zusammenpassen
const _: () = {
    let mut sum = 0;
    let mut i = 0;
    while i < STRIP_COUNT {
        assert!(STRIP_LENGTHS[i] <= MAX_STRIP_PIXELS);
        sum += STRIP_LENGTHS[i];
        i += 1;
    }
    assert!(sum == TOTAL_PIXELS);
};

/// Zonen der Maske, Index = Strip-Index (nur für Logs)
pub const ZONE_NAMES: [&str; STRIP_COUNT] = [
    "temple top",
    "brows",
    "forehead",
    "left eye",
    "chin",
    "beak",
    "cheek",
    "right eye",
    "temple",
];

/// GPIO-Pin der WS2812 Datenleitung
pub const LED_GPIO_PIN: u8 = 8;

/// RMT Taktfrequenz in MHz
/// 80 MHz ist optimal für WS2812 LED-Timing
pub const RMT_CLOCK_MHZ: u32 = 80;

/// Render-Tick in Millisekunden (~100 Hz)
pub const TICK_MS: u64 = 10;

// ============================================================================
// Persistenz
// ============================================================================

/// Offset des Settings-Sektors im Flash
/// Liegt hinter der App-Partition, muss 4 KiB-aligned sein
pub const SETTINGS_FLASH_OFFSET: u32 = 0x3F_0000;

/// Größe eines Flash-Sektors
pub const FLASH_SECTOR_SIZE: usize = 4096;

/// Maximale Anzahl Schlüssel im Settings-Sektor (3 pro Strip + Reserve)
pub const SETTINGS_MAX_KEYS: usize = 48;

/// Tiefe der Commit-Queue (Render → Persistenz)
pub const COMMIT_QUEUE_DEPTH: usize = 1;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Heap-Größe für WiFi (Bytes)
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

/// Wartezeit nach WiFi-Fehler vor erneutem Versuch
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

// ============================================================================
// mDNS-Konfiguration
// ============================================================================

/// mDNS Hostname (ohne .local suffix)
/// Optional über MASKE_HOSTNAME zur Build-Zeit überschreibbar
pub const MDNS_HOSTNAME: &str = match option_env!("MASKE_HOSTNAME") {
    Some(name) => name,
    None => "maske",
};

/// mDNS TTL (Time To Live) in Sekunden
pub const MDNS_TTL_SECS: u32 = 120;

/// mDNS Reconnect Delay in Sekunden
pub const MDNS_RECONNECT_DELAY_SECS: u64 = 5;

/// mDNS Port (Standard: 5353, RFC 6762)
pub const MDNS_PORT: u16 = 5353;

/// mDNS IPv4 Multicast-Adresse (224.0.0.251)
pub const MDNS_MULTICAST_ADDR: [u8; 4] = [224, 0, 0, 251];

/// UDP Buffer-Größen für mDNS (TX, RX in Bytes)
pub const MDNS_UDP_BUFFER_SIZE: usize = 512;

/// mDNS Receive/Send Buffer-Größen in Bytes
/// 1500 Bytes = Standard MTU für Ethernet/WiFi
pub const MDNS_PACKET_BUFFER_SIZE: usize = 1500;

// ============================================================================
// HTTP / WebSocket Konfiguration
// ============================================================================

/// HTTP Port für Steuerkanal und GET /config
pub const HTTP_PORT: u16 = 80;

/// Anzahl paralleler HTTP Server-Tasks
/// Einer davon hält den Steuer-WebSocket, die anderen beantworten 503 / GET /config
pub const HTTP_TASK_COUNT: usize = 2;

/// HTTP Buffer-Größe in Bytes
pub const HTTP_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// WebSocket Message Buffer-Größe in Bytes
/// Längstes Kommando ist `MASK:<mask>:<rrggbb>:<brightness>:<mode>`
pub const WEBSOCKET_BUFFER_SIZE: usize = 256;

/// Buffer für das Status-Dokument (GET_CONFIG)
pub const STATUS_BUFFER_SIZE: usize = status_capacity(STRIP_COUNT);
