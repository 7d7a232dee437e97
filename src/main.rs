//! Panel firmware entry point (nRF52840).
//!
//! Three periodic tasks only set flags: button sampling, the refresh
//! tick and the one-second tick. A fourth task collects reply lines from
//! the motion controller. The main task owns the panel, the display and
//! the machine link, and polls the panel in a loop.

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::{bind_interrupts, peripherals, twim, uarte};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Ticker, Timer};
use heapless::String;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use motion_panel::config::{
    BUTTON_SAMPLE_HZ, COMMAND_LINE_LEN, REFRESH_HZ, REPLY_LINE_LEN, REPLY_QUEUE_CAPACITY,
    STATUS_POLL_SECS,
};
use motion_panel::files::FileSystem;
use motion_panel::link::{MachineLink, STATUS_REQUESTS};
use motion_panel::machine::Machine;
use motion_panel::panel::{menus, ButtonLevels, Panel, Sampler, Signals};
use motion_panel::queue::Outputs;
use motion_panel::settings::PreheatSettings;
use motion_panel::storage::FlashConfig;
use motion_panel::ui::display;

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

/// Flags between the periodic tasks and the main loop.
static SIGNALS: Signals = Signals::new();

static MENU_TREE: StaticCell<menus::MenuTree> = StaticCell::new();

type ReplyLine = String<REPLY_LINE_LEN>;

/// Complete reply lines from the motion controller.
static REPLIES: Channel<CriticalSectionRawMutex, ReplyLine, REPLY_QUEUE_CAPACITY> = Channel::new();

/// Pause between main-loop passes.
const MAIN_LOOP_PERIOD_MS: u64 = 5;

/// Command channel to the motion controller over UART, one line per
/// command.
struct UartMachine {
    tx: uarte::UarteTx<'static, peripherals::UARTE0>,
}

impl Machine for UartMachine {
    fn submit(&mut self, command: &str) {
        // EasyDMA reads from RAM only; static script lines live in flash.
        let bytes = command.as_bytes();
        let len = bytes.len().min(COMMAND_LINE_LEN);
        let mut line = [0u8; COMMAND_LINE_LEN + 1];
        line[..len].copy_from_slice(&bytes[..len]);
        line[len] = b'\n';

        if let Err(e) = self.tx.blocking_write(&line[..=len]) {
            warn!("UART write failed: {:?}", e);
        }
    }
}

/// This board has no card slot; the browser shows only `..`.
struct NoCard;

impl FileSystem for NoCard {
    fn list(&self, _folder: &str, _visit: &mut dyn FnMut(&str)) -> bool {
        false
    }

    fn is_folder(&self, _path: &str) -> bool {
        false
    }
}

#[embassy_executor::task]
async fn button_task(up: Input<'static>, down: Input<'static>, select: Input<'static>) -> ! {
    let mut sampler = Sampler::new();
    let mut ticker = Ticker::every(Duration::from_hz(BUTTON_SAMPLE_HZ));
    loop {
        // Active-low with internal pull-up.
        let levels = ButtonLevels {
            up: up.is_low(),
            down: down.is_low(),
            select: select.is_low(),
        };
        sampler.button_tick(levels, &SIGNALS);
        ticker.next().await;
    }
}

#[embassy_executor::task]
async fn refresh_task() -> ! {
    let mut ticker = Ticker::every(Duration::from_hz(REFRESH_HZ));
    loop {
        SIGNALS.refresh_tick();
        ticker.next().await;
    }
}

#[embassy_executor::task]
async fn second_task() -> ! {
    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        ticker.next().await;
        SIGNALS.second_tick();
    }
}

#[embassy_executor::task]
async fn reply_task(mut rx: uarte::UarteRx<'static, peripherals::UARTE0>) -> ! {
    let mut line = ReplyLine::new();
    let mut overflow = false;
    loop {
        let mut byte = [0u8; 1];
        if let Err(e) = rx.read(&mut byte).await {
            warn!("UART read failed: {:?}", e);
            continue;
        }
        match byte[0] {
            b'\n' => {
                if !overflow && !line.is_empty() && REPLIES.try_send(line.clone()).is_err() {
                    warn!("reply queue full - dropping line");
                }
                line.clear();
                overflow = false;
            }
            b'\r' => {}
            b => {
                if line.push(char::from(b)).is_err() {
                    overflow = true;
                }
            }
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("motion panel starting");

    let mut flash = BlockingAsync::new(Nvmc::new(p.NVMC));
    let mut config = FlashConfig::new();
    config.load_from_flash(&mut flash).await;
    let settings = PreheatSettings::load(&config);

    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    let mut oled = display::init(i2c);

    let mut uart_config = uarte::Config::default();
    uart_config.baudrate = uarte::Baudrate::BAUD115200;
    let uart = uarte::Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, uart_config);
    let (tx, rx) = uart.split();
    let mut machine = UartMachine { tx };
    let mut link = MachineLink::new();
    let fs = NoCard;

    let tree = match menus::build() {
        Ok(tree) => MENU_TREE.init(tree),
        Err(e) => defmt::panic!("menu tree rejected: {}", e),
    };
    let mut panel = match Panel::new(&tree.graph, tree.start(), tree.home(), settings) {
        Ok(panel) => panel,
        Err(e) => defmt::panic!("panel setup failed: {}", e),
    };

    let up = Input::new(p.P0_11, Pull::Up);
    let down = Input::new(p.P0_12, Pull::Up);
    let select = Input::new(p.P0_24, Pull::Up);
    defmt::unwrap!(spawner.spawn(button_task(up, down, select)));
    defmt::unwrap!(spawner.spawn(refresh_task()));
    defmt::unwrap!(spawner.spawn(second_task()));
    defmt::unwrap!(spawner.spawn(reply_task(rx)));

    let status_period = Duration::from_secs(STATUS_POLL_SECS);
    let mut next_status = Instant::now();
    loop {
        while let Ok(reply) = REPLIES.try_receive() {
            link.on_line(&reply);
        }
        if Instant::now() >= next_status {
            for request in STATUS_REQUESTS {
                machine.submit(request);
            }
            next_status += status_period;
        }

        let mut out = Outputs {
            machine: &mut machine,
            registry: &mut link,
        };
        if let Err(e) = panel.poll(&SIGNALS, &mut out, &fs, &mut oled) {
            error!("panel: {}", e);
        }
        link.flush(&mut machine);

        Timer::after(Duration::from_millis(MAIN_LOOP_PERIOD_MS)).await;
    }
}
