//! USART serial port abstractions
//!
//! Provides the register-level operations an interrupt-driven console
//! needs, without exposing any specific peripheral layout.

/// Interrupt-driven serial port
///
/// Status queries reflect the live peripheral flags. `send` and `recv`
/// move exactly one byte and never block.
pub trait UsartPort {
    /// Apply frame format and baud rate
    fn configure(&mut self, config: &UartConfig);

    /// Enable the peripheral
    fn enable(&mut self);

    /// Enable the receive-not-empty interrupt
    fn enable_rx_interrupt(&mut self);

    /// Enable the transmit-empty interrupt
    fn enable_tx_interrupt(&mut self);

    /// Disable the transmit-empty interrupt
    fn disable_tx_interrupt(&mut self);

    /// Transmit data register is empty
    fn tx_empty(&self) -> bool;

    /// Receive data register holds a byte
    fn rx_ready(&self) -> bool;

    /// Write one byte to the transmit data register
    fn send(&mut self, byte: u8);

    /// Read one byte from the receive data register
    fn recv(&mut self) -> u8;
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// Hardware flow control
    pub flow_control: FlowControl,
    /// Enabled directions
    pub mode: Mode,
}

impl UartConfig {
    /// 8N1, no flow control, both directions
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            mode: Mode::TxRx,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::with_baudrate(115200)
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Hardware flow control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    None,
    RtsCts,
}

/// Enabled transfer directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Tx,
    Rx,
    TxRx,
}
