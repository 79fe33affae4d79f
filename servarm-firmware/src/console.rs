//! Line console on a blocking UART
//!
//! Echoes typed characters, handles backspace, and turns `\n` in replies
//! into `\r\n` for serial terminals.

use core::fmt;

use embassy_rp::uart::{self, Blocking, Uart};
use heapless::String;

/// Longest accepted command line
pub const MAX_LINE: usize = 96;

/// Console read errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LineError {
    /// UART reported a framing, parity or overrun error
    Uart(uart::Error),
    /// Line did not fit in [`MAX_LINE`] characters and was dropped
    TooLong,
}

/// Serial console
pub struct Console<'d> {
    uart: Uart<'d, Blocking>,
}

impl<'d> Console<'d> {
    pub fn new(uart: Uart<'d, Blocking>) -> Self {
        Self { uart }
    }

    /// Block until a non-empty line has been typed
    pub fn read_line(&mut self, line: &mut String<MAX_LINE>) -> Result<(), LineError> {
        line.clear();
        let mut overflow = false;

        loop {
            let mut byte = [0u8; 1];
            self.uart.blocking_read(&mut byte).map_err(LineError::Uart)?;

            match byte[0] {
                b'\r' | b'\n' => {
                    if line.is_empty() && !overflow {
                        continue;
                    }
                    self.echo(b"\r\n");
                    if overflow {
                        return Err(LineError::TooLong);
                    }
                    return Ok(());
                }
                // Backspace / DEL
                0x08 | 0x7F => {
                    if line.pop().is_some() {
                        self.echo(b"\x08 \x08");
                    }
                }
                b if b.is_ascii_graphic() || b == b' ' => {
                    if line.push(b as char).is_err() {
                        overflow = true;
                    } else {
                        self.echo(&byte);
                    }
                }
                _ => {}
            }
        }
    }

    fn echo(&mut self, bytes: &[u8]) {
        let _ = self.uart.blocking_write(bytes);
    }
}

impl fmt::Write for Console<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut parts = s.split('\n');
        if let Some(first) = parts.next() {
            self.uart
                .blocking_write(first.as_bytes())
                .map_err(|_| fmt::Error)?;
        }
        for part in parts {
            self.uart.blocking_write(b"\r\n").map_err(|_| fmt::Error)?;
            self.uart
                .blocking_write(part.as_bytes())
                .map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}
