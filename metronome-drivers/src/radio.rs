//! MRF24J40 radio transport
//!
//! Pin and SPI plumbing the MRF24J40 driver sits on: chip select, hard
//! reset, wake, interrupt gating and raw byte transfers. No register map
//! or frame handling lives here.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::spi::SpiBus;

/// Errors from the radio transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// SPI transfer failed
    Spi,
    /// A control pin could not be driven
    Pin,
}

/// External interrupt line wired to the radio's INT pin
pub trait IrqLine {
    /// Whether the interrupt is currently enabled
    fn is_enabled(&self) -> bool;

    /// Enable the interrupt
    fn enable(&mut self);

    /// Disable the interrupt
    fn disable(&mut self);

    /// Acknowledge a pending interrupt
    fn clear_flag(&mut self);
}

/// Control pins for the transceiver
pub struct RadioPins<CS, RST, WAKE> {
    /// Chip select, active low
    pub cs: CS,
    /// Hard reset, active low
    pub reset: RST,
    /// Wake input
    pub wake: WAKE,
}

/// MRF24J40 SPI and pin transport
pub struct Mrf24j40Transport<SPI, CS, RST, WAKE, IRQ> {
    spi: SPI,
    pins: RadioPins<CS, RST, WAKE>,
    irq: IRQ,
}

impl<SPI, CS, RST, WAKE, IRQ> Mrf24j40Transport<SPI, CS, RST, WAKE, IRQ>
where
    SPI: SpiBus,
    CS: OutputPin,
    RST: OutputPin,
    WAKE: OutputPin,
    IRQ: IrqLine,
{
    /// Create the transport from an SPI bus already clocked for the radio
    pub fn new(spi: SPI, pins: RadioPins<CS, RST, WAKE>, irq: IRQ) -> Self {
        Self { spi, pins, irq }
    }

    /// Drive every control line to idle
    ///
    /// Deselected, out of reset, not waking, interrupt disabled with any
    /// stale flag cleared.
    pub fn init(&mut self) -> Result<(), RadioError> {
        self.irq.disable();
        self.irq.clear_flag();
        self.deselect()?;
        self.hard_reset(false)?;
        self.wake_pin(false)
    }

    /// Drive the WAKE pin
    pub fn wake_pin(&mut self, high: bool) -> Result<(), RadioError> {
        self.pins
            .wake
            .set_state(PinState::from(high))
            .map_err(|_| RadioError::Pin)
    }

    /// Hold (`true`) or release (`false`) the radio in hard reset
    pub fn hard_reset(&mut self, asserted: bool) -> Result<(), RadioError> {
        let result = if asserted {
            self.pins.reset.set_low()
        } else {
            self.pins.reset.set_high()
        };
        result.map_err(|_| RadioError::Pin)
    }

    /// Assert chip select
    pub fn select(&mut self) -> Result<(), RadioError> {
        self.pins.cs.set_low().map_err(|_| RadioError::Pin)
    }

    /// Release chip select
    pub fn deselect(&mut self) -> Result<(), RadioError> {
        self.pins.cs.set_high().map_err(|_| RadioError::Pin)
    }

    pub fn is_irq_enabled(&self) -> bool {
        self.irq.is_enabled()
    }

    pub fn irq_enable(&mut self) {
        self.irq.enable();
    }

    pub fn irq_disable(&mut self) {
        self.irq.disable();
    }

    /// Write bytes; chip select is the caller's job
    pub fn spi_write(&mut self, data: &[u8]) -> Result<(), RadioError> {
        self.spi.write(data).map_err(|_| RadioError::Spi)?;
        self.spi.flush().map_err(|_| RadioError::Spi)
    }

    /// Read bytes; chip select is the caller's job
    pub fn spi_read(&mut self, buf: &mut [u8]) -> Result<(), RadioError> {
        self.spi.read(buf).map_err(|_| RadioError::Spi)
    }

    /// Radio interrupt body: run `handler`, then acknowledge the line
    pub fn on_interrupt<F: FnOnce(&mut Self)>(&mut self, handler: F) {
        handler(self);
        self.irq.clear_flag();
    }
}
