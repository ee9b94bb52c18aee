#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::{error, info};
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use panic_halt as _;
use segclock::registers::MemoryMappedGpio;
use segclock::{Config, Controller};

/// MSI clock after reset.
const CORE_HZ: u32 = 2_097_000;

/// Busy-wait delay calibrated against the reset clock.
struct SpinDelay;

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = (u64::from(ns) * u64::from(CORE_HZ) / 1_000_000_000) as u32;
        cortex_m::asm::delay(cycles.max(1));
    }
}

#[entry]
fn main() -> ! {
    info!("segclock starting");

    // SAFETY: nothing else in this binary touches RCC or the GPIO ports.
    let gpio = unsafe { MemoryMappedGpio::stm32l053() };

    let mut clock = match Controller::new(gpio, SpinDelay, Config::default()) {
        Ok(clock) => clock,
        Err(e) => {
            error!("bad config: {}", e);
            loop {
                cortex_m::asm::wfi();
            }
        }
    };

    if let Err(e) = clock.init() {
        error!("init failed: {}", defmt::Debug2Format(&e));
    } else if let Err(e) = clock.run() {
        error!("gpio failed: {}", defmt::Debug2Format(&e));
    }
    loop {
        cortex_m::asm::wfi();
    }
}
