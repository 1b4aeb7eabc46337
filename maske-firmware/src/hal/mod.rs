// Hardware Abstraction Layer (HAL) Module
//
// Implementiert die Traits aus maske-core für die echte Hardware:
// RMT Pixel-Ausgang und Flash-Sektor als Key/Value Speicher.

pub mod flash_kv;
pub mod frame_writer;

pub use flash_kv::FlashKvStorage;
pub use frame_writer::{RMT_BUFFER_SIZE, RmtFrameWriter};
