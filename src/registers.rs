//! Memory-mapped GPIO backend for STM32L0 register blocks.
//!
//! This module contains the register layouts the controller needs (RCC up to
//! `IOPENR`, and the GPIO port block) and [`MemoryMappedGpio`], which
//! implements [`Gpio`] and [`GpioSetup`] with volatile register access.
//!
//! Pin writes go through `BSRR`, so setting or clearing pins never needs a
//! read-modify-write of `ODR`.

use core::convert::Infallible;
use core::ptr::{addr_of, addr_of_mut, NonNull};

use bitfield::bitfield;
use paste::paste;

use crate::hardware::{Bank, Gpio, GpioSetup, Pull};

/// Base of the peripheral address space.
pub const PERIPHERAL_BASE: usize = 0x4000_0000;
/// AHB bus base.
pub const AHB_BASE: usize = PERIPHERAL_BASE + 0x0002_0000;
/// RCC register block.
pub const RCC_BASE: usize = AHB_BASE + 0x0000_1000;
/// IOPORT base; GPIOA sits here, later banks follow at [`GPIO_BANK_STRIDE`].
pub const IOPORT_BASE: usize = PERIPHERAL_BASE + 0x1000_0000;
/// Distance between consecutive GPIO banks.
pub const GPIO_BANK_STRIDE: usize = 0x400;

/// MODER field value for general purpose output.
const MODE_OUTPUT: u32 = 0b01;

/// GPIO port register block.
#[repr(C)]
#[derive(Debug, Default)]
pub struct GpioRegisters {
    pub moder: u32,
    pub otyper: u32,
    pub ospeedr: u32,
    pub pupdr: u32,
    pub idr: u32,
    pub odr: u32,
    pub bsrr: u32,
    pub lckr: u32,
    pub afr: [u32; 2],
    pub brr: u32,
}

/// RCC register block, up to the I/O port clock enable register.
#[repr(C)]
#[derive(Debug, Default)]
pub struct RccRegisters {
    pub cr: u32,
    pub icscr: u32,
    pub crrcr: u32,
    pub cfgr: u32,
    pub cier: u32,
    pub cifr: u32,
    pub cicr: u32,
    pub ioprstr: u32,
    pub ahbrstr: u32,
    pub apb2rstr: u32,
    pub apb1rstr: u32,
    /// I/O port clock enable; bit n enables bank n.
    pub iopenr: u32,
}

bitfield! {
    /// A `BSRR` write: pins in the lower half are set, pins in the upper half are reset.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct SetReset(u32);
    impl Debug;
    pub u16, set_bits, set_set_bits: 15, 0;
    pub u16, reset_bits, set_reset_bits: 31, 16;
}

impl From<SetReset> for u32 {
    fn from(v: SetReset) -> Self {
        v.0
    }
}

// Generates `read_<reg>`/`write_<reg>` volatile accessors for a register block.
macro_rules! register_access {
    ($block:ident { $($reg:ident),+ $(,)? }) => {
        paste! {
            $(
                #[allow(dead_code)]
                fn [<read_ $reg>](block: NonNull<$block>) -> u32 {
                    // SAFETY: blocks only come from `MemoryMappedGpio`, whose
                    // constructors require them to be valid for volatile access.
                    unsafe { addr_of!((*block.as_ptr()).$reg).read_volatile() }
                }

                #[allow(dead_code)]
                fn [<write_ $reg>](block: NonNull<$block>, value: u32) {
                    // SAFETY: see `read_` above.
                    unsafe { addr_of_mut!((*block.as_ptr()).$reg).write_volatile(value) }
                }
            )+
        }
    };
}

register_access!(GpioRegisters { moder, otyper, pupdr, idr, bsrr });
register_access!(RccRegisters { iopenr });

/// Pin numbers present in `mask`.
fn pins(mask: u16) -> impl Iterator<Item = u32> {
    (0..16u32).filter(move |n| u32::from(mask) & (1 << n) != 0)
}

/// Replaces the two-bit field of every pin in `mask` with `value`.
fn with_two_bit_fields(register: u32, mask: u16, value: u32) -> u32 {
    pins(mask).fold(register, |acc, n| {
        (acc & !(0b11 << (n * 2))) | ((value & 0b11) << (n * 2))
    })
}

/// GPIO banks A-C and their clock gate, accessed through raw register blocks.
#[derive(Debug)]
pub struct MemoryMappedGpio {
    rcc: NonNull<RccRegisters>,
    banks: [NonNull<GpioRegisters>; 3],
}

impl MemoryMappedGpio {
    /// The STM32L053 register map.
    ///
    /// # Safety
    /// Must run on an STM32L0 device, and nothing else may access RCC `IOPENR`
    /// or GPIOA-C while the returned value is alive.
    pub unsafe fn stm32l053() -> Self {
        Self {
            rcc: NonNull::new_unchecked(RCC_BASE as *mut RccRegisters),
            banks: [
                NonNull::new_unchecked(IOPORT_BASE as *mut GpioRegisters),
                NonNull::new_unchecked((IOPORT_BASE + GPIO_BANK_STRIDE) as *mut GpioRegisters),
                NonNull::new_unchecked((IOPORT_BASE + 2 * GPIO_BANK_STRIDE) as *mut GpioRegisters),
            ],
        }
    }

    /// Uses caller-provided register blocks. Returns `None` if any pointer is null.
    ///
    /// # Safety
    /// Every pointer must be valid for volatile reads and writes, and not be
    /// accessed through any other path, for as long as the returned value is used.
    pub unsafe fn from_raw(
        rcc: *mut RccRegisters,
        banks: [*mut GpioRegisters; 3],
    ) -> Option<Self> {
        Some(Self {
            rcc: NonNull::new(rcc)?,
            banks: [
                NonNull::new(banks[0])?,
                NonNull::new(banks[1])?,
                NonNull::new(banks[2])?,
            ],
        })
    }

    fn bank(&self, bank: Bank) -> NonNull<GpioRegisters> {
        self.banks[bank.index()]
    }

    /// Whether the peripheral clock of `bank` is on.
    pub fn clock_enabled(&self, bank: Bank) -> bool {
        read_iopenr(self.rcc) & (1 << bank.index()) != 0
    }
}

impl Gpio for MemoryMappedGpio {
    type Error = Infallible;

    fn set_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        let mut word = SetReset::default();
        word.set_set_bits(mask);
        write_bsrr(self.bank(bank), word.into());
        Ok(())
    }

    fn clear_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        let mut word = SetReset::default();
        word.set_reset_bits(mask);
        write_bsrr(self.bank(bank), word.into());
        Ok(())
    }

    fn read_input(&mut self, bank: Bank) -> Result<u16, Self::Error> {
        Ok((read_idr(self.bank(bank)) & 0xFFFF) as u16)
    }
}

impl GpioSetup for MemoryMappedGpio {
    fn enable_clock(&mut self, bank: Bank) -> Result<(), Self::Error> {
        let iopenr = read_iopenr(self.rcc);
        write_iopenr(self.rcc, iopenr | (1 << bank.index()));
        Ok(())
    }

    fn configure_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        let block = self.bank(bank);
        write_moder(block, with_two_bit_fields(read_moder(block), mask, MODE_OUTPUT));
        // push-pull
        write_otyper(block, read_otyper(block) & !u32::from(mask));
        write_pupdr(block, with_two_bit_fields(read_pupdr(block), mask, 0b00));
        Ok(())
    }

    fn configure_input(&mut self, bank: Bank, mask: u16, pull: Pull) -> Result<(), Self::Error> {
        let block = self.bank(bank);
        write_moder(block, with_two_bit_fields(read_moder(block), mask, 0b00));
        let pull_bits = match pull {
            Pull::None => 0b00,
            Pull::Up => 0b01,
            Pull::Down => 0b10,
        };
        write_pupdr(block, with_two_bit_fields(read_pupdr(block), mask, pull_bits));
        Ok(())
    }
}
