//! Interrupt-driven debug console
//!
//! Output is queued in a small ring buffer and drained by the USART
//! interrupt one byte per TX-empty event. Input bytes are handed to a
//! registered handler straight from the interrupt.
//!
//! The buffer and the port live behind one critical-section mutex, shared
//! by thread-mode writers and the interrupt.

use core::cell::RefCell;
use core::convert::Infallible;
use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;
use metronome_core::ActivityMonitor;
use metronome_hal::{UartConfig, UsartPort};

/// Transmit ring buffer capacity in bytes
pub const TX_BUFFER_SIZE: usize = 128;

/// Input byte callback, run in interrupt context
///
/// Returns `true` when the byte should wake the system from low power.
pub type InputHandler = fn(u8) -> bool;

struct Inner<P> {
    port: P,
    tx: Deque<u8, TX_BUFFER_SIZE>,
    input: Option<InputHandler>,
}

/// Buffered console over a [`UsartPort`]
pub struct Console<P, A> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner<P>>>,
    activity: A,
}

impl<P: UsartPort, A: ActivityMonitor> Console<P, A> {
    /// Wrap a port; nothing is touched until [`init`](Self::init)
    pub const fn new(port: P, activity: A) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                port,
                tx: Deque::new(),
                input: None,
            })),
            activity,
        }
    }

    /// Configure the port as 8N1 at `baudrate` and start receiving
    pub fn init(&self, baudrate: u32) {
        let config = UartConfig::with_baudrate(baudrate);
        self.with_inner(|inner| {
            inner.tx.clear();
            inner.port.configure(&config);
            inner.port.enable_rx_interrupt();
            inner.port.enable();
        });
    }

    /// Register (or clear) the input handler
    pub fn set_input(&self, handler: Option<InputHandler>) {
        self.with_inner(|inner| inner.input = handler);
    }

    /// Queue one byte, spinning while the buffer is full
    ///
    /// `\n` goes out as `\r\n`. Must not be called from the console
    /// interrupt itself.
    pub fn put_char(&self, c: u8) {
        if c == b'\n' {
            self.put_char(b'\r');
        }

        loop {
            let queued = self.with_inner(|inner| {
                if inner.tx.push_back(c).is_err() {
                    return false;
                }
                inner.port.enable_tx_interrupt();
                true
            });
            if queued {
                return;
            }
            core::hint::spin_loop();
        }
    }

    /// Queue every byte of `bytes`
    pub fn write_bytes(&self, bytes: &[u8]) {
        for &c in bytes {
            self.put_char(c);
        }
    }

    /// Bytes waiting to be transmitted
    pub fn pending(&self) -> usize {
        self.with_inner(|inner| inner.tx.len())
    }

    /// USART interrupt body
    ///
    /// Returns `true` if the input handler asked for a wakeup.
    pub fn on_interrupt(&self) -> bool {
        self.activity.irq_enter();

        let (received, handler) = self.with_inner(|inner| {
            if inner.port.tx_empty() {
                match inner.tx.pop_front() {
                    Some(c) => inner.port.send(c),
                    None => inner.port.disable_tx_interrupt(),
                }
            }

            if inner.port.rx_ready() {
                (Some(inner.port.recv()), inner.input)
            } else {
                (None, None)
            }
        });

        // Outside the lock so the handler may echo through put_char
        let wake = match (received, handler) {
            (Some(c), Some(handler)) => handler(c),
            _ => false,
        };

        self.activity.irq_exit();
        wake
    }

    /// Writer handle for `core::fmt` and `embedded-io`
    pub fn writer(&self) -> ConsoleWriter<'_, P, A> {
        ConsoleWriter { console: self }
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner<P>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Borrowed console writer
pub struct ConsoleWriter<'a, P, A> {
    console: &'a Console<P, A>,
}

impl<P: UsartPort, A: ActivityMonitor> fmt::Write for ConsoleWriter<'_, P, A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.console.write_bytes(s.as_bytes());
        Ok(())
    }
}

impl<P, A> embedded_io::ErrorType for ConsoleWriter<'_, P, A> {
    type Error = Infallible;
}

impl<P: UsartPort, A: ActivityMonitor> embedded_io::Write for ConsoleWriter<'_, P, A> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.console.write_bytes(buf);
        Ok(buf.len())
    }

    /// Spins until the interrupt has drained the buffer
    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.console.pending() > 0 {
            core::hint::spin_loop();
        }
        Ok(())
    }
}
