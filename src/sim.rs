//! Recording GPIO backend for host tests.

extern crate alloc;

use alloc::vec::Vec;
use core::convert::Infallible;

use crate::hardware::{Bank, Gpio, GpioSetup, Pin, Pull};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Set(Bank, u16),
    Clear(Bank, u16),
    Read(Bank),
    EnableClock(Bank),
    Output(Bank, u16),
    Input(Bank, u16, Pull),
}

/// Output latches, input levels and a log of every call.
#[derive(Debug, Default)]
pub(crate) struct SimGpio {
    pub outputs: [u16; 3],
    pub inputs: [u16; 3],
    pub ops: Vec<Op>,
}

impl SimGpio {
    pub fn output(&self, bank: Bank) -> u16 {
        self.outputs[bank.index()]
    }

    pub fn is_high(&self, pin: Pin) -> bool {
        self.output(pin.bank) & pin.mask != 0
    }

    /// Sets or clears input pins as the next reads will see them.
    pub fn drive_input(&mut self, pin: Pin, high: bool) {
        if high {
            self.inputs[pin.bank.index()] |= pin.mask;
        } else {
            self.inputs[pin.bank.index()] &= !pin.mask;
        }
    }

    pub fn clock_enables(&self, bank: Bank) -> usize {
        self.ops
            .iter()
            .filter(|op| **op == Op::EnableClock(bank))
            .count()
    }
}

impl Gpio for SimGpio {
    type Error = Infallible;

    fn set_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        self.ops.push(Op::Set(bank, mask));
        self.outputs[bank.index()] |= mask;
        Ok(())
    }

    fn clear_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        self.ops.push(Op::Clear(bank, mask));
        self.outputs[bank.index()] &= !mask;
        Ok(())
    }

    fn read_input(&mut self, bank: Bank) -> Result<u16, Self::Error> {
        self.ops.push(Op::Read(bank));
        Ok(self.inputs[bank.index()])
    }
}

impl GpioSetup for SimGpio {
    fn enable_clock(&mut self, bank: Bank) -> Result<(), Self::Error> {
        self.ops.push(Op::EnableClock(bank));
        Ok(())
    }

    fn configure_output(&mut self, bank: Bank, mask: u16) -> Result<(), Self::Error> {
        self.ops.push(Op::Output(bank, mask));
        Ok(())
    }

    fn configure_input(&mut self, bank: Bank, mask: u16, pull: Pull) -> Result<(), Self::Error> {
        self.ops.push(Op::Input(bank, mask, pull));
        Ok(())
    }
}

/// Backend whose bus is gone: every call fails.
#[derive(Debug, Default)]
pub(crate) struct DeadGpio;

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BusFault;

impl Gpio for DeadGpio {
    type Error = BusFault;

    fn set_output(&mut self, _bank: Bank, _mask: u16) -> Result<(), Self::Error> {
        Err(BusFault)
    }

    fn clear_output(&mut self, _bank: Bank, _mask: u16) -> Result<(), Self::Error> {
        Err(BusFault)
    }

    fn read_input(&mut self, _bank: Bank) -> Result<u16, Self::Error> {
        Err(BusFault)
    }
}
