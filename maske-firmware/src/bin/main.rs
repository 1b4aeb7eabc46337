// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

use core::cell::RefCell;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_storage::FlashStorage;
use static_cell::StaticCell;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

use esp_led_maske::config::{
    EXTRA_HEAP_SIZE, HTTP_TASK_COUNT, SETTINGS_FLASH_OFFSET, STRIP_COUNT, STRIP_LENGTHS,
    WIFI_HEAP_SIZE, ZONE_NAMES,
};
use esp_led_maske::hal::FlashKvStorage;
use esp_led_maske::tasks::{
    connection_task, control_server_task, dhcp_task, mdns_responder_task, net_task,
    persistence_task, render_task,
};
use esp_led_maske::{AnnounceSignal, CommitChannel, RenderSignal, SharedController, now_ms};
use maske_core::{Controller, persistence};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
esp_bootloader_esp_idf::esp_app_desc!();

static CONTROLLER: StaticCell<SharedController> = StaticCell::new();
static RENDER_SIGNAL: RenderSignal = RenderSignal::new();
static ANNOUNCE_SIGNAL: AnnounceSignal = AnnounceSignal::new();
static COMMIT_CHANNEL: CommitChannel = CommitChannel::new();

/// Main Entry Point
///
/// Initialisiert Hardware, lädt die gespeicherten Strip-Einstellungen,
/// startet WiFi und spawnt alle Tasks. Danach schläft main().
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // Einstellungen laden - ein Lesefehler blockiert den Start nie
    let mut storage = FlashKvStorage::new(FlashStorage::new(peripherals.FLASH), SETTINGS_FLASH_OFFSET);
    let loaded = persistence::load::<_, STRIP_COUNT>(&mut storage);
    if let Some(e) = loaded.error {
        warn!("Persist: Loading settings failed ({}), using defaults where needed", e);
    }
    for (index, strip) in loaded.store.iter().enumerate() {
        info!(
            "Persist: Strip {} ({}, {} px): {}",
            index, ZONE_NAMES[index], STRIP_LENGTHS[index], strip
        );
    }

    let controller: &'static SharedController = CONTROLLER.init(Mutex::new(RefCell::new(
        Controller::new(loaded.store, now_ms()),
    )));

    // WiFi Hardware initialisieren
    static RADIO_INIT: StaticCell<esp_radio::Controller> = StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Sockets: HTTP-Listener (HTTP_TASK_COUNT) + mDNS (1) + DHCP/DNS
    static RESOURCES: StaticCell<StackResources<6>> = StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    static STACK: StaticCell<Stack<'static>> = StaticCell::new();
    let stack = &*STACK.init(stack);

    // Render Task (Pixel-Ausgang, Scheduler- und Verbindungs-Ticks)
    spawner
        .spawn(render_task(
            peripherals.GPIO8,
            peripherals.RMT,
            controller,
            &RENDER_SIGNAL,
            &ANNOUNCE_SIGNAL,
            COMMIT_CHANNEL.sender(),
        ))
        .expect("Failed to spawn render task");

    // Persistenz Task (einziger Flash-Besitzer ab hier)
    spawner
        .spawn(persistence_task(
            storage,
            controller,
            COMMIT_CHANNEL.receiver(),
        ))
        .expect("Failed to spawn persistence task");

    // WiFi Tasks
    spawner
        .spawn(connection_task(wifi_controller))
        .expect("Failed to spawn WiFi task");
    spawner.spawn(net_task(runner)).expect("Failed to spawn net task");
    spawner.spawn(dhcp_task(stack)).expect("Failed to spawn DHCP task");

    // Steuerkanal (WebSocket + GET /config)
    for task_id in 0..HTTP_TASK_COUNT {
        spawner
            .spawn(control_server_task(
                task_id,
                stack,
                controller,
                &RENDER_SIGNAL,
            ))
            .expect("Failed to spawn control task");
    }

    // Advertising (Hostname + Neu-Ankündigung nach Trennung)
    spawner
        .spawn(mdns_responder_task(stack, &ANNOUNCE_SIGNAL))
        .expect("Failed to spawn mDNS task");

    info!("Main: All tasks running");

    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
