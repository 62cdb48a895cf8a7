use std::cell::RefCell;
use std::io::{self, Read as _, Write as _};
use std::time::Duration;

use embedded_hal::serial::{Read, Write};
use serialport::SerialPort;

// The host OS serial port stands in for the UART, so it needs the
// embedded-hal read/write interfaces. Both halves share one port.

#[allow(missing_debug_implementations)]
pub struct SerialReader<'a>(pub &'a RefCell<Box<dyn SerialPort>>);
#[allow(missing_debug_implementations)]
pub struct SerialWriter<'a>(pub &'a RefCell<Box<dyn SerialPort>>);

/// Opens `port_name` at `baud_rate` with a blocking read `timeout`.
pub fn open(port_name: &str, baud_rate: u32, timeout: Duration) -> serialport::Result<Box<dyn SerialPort>> {
    serialport::new(port_name, baud_rate).timeout(timeout).open()
}

impl Read<u8> for SerialReader<'_> {
    type Error = io::Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        loop {
            match self.0.borrow_mut().read(&mut buf) {
                Ok(1) => return Ok(buf[0]),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(nb::Error::Other(e)),
            }
        }
    }
}

impl Write<u8> for SerialWriter<'_> {
    type Error = io::Error;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        loop {
            match self.0.borrow_mut().write(&[word]) {
                Ok(1) => return Ok(()),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(nb::Error::Other(e)),
            }
        }
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.0.borrow_mut().flush().map_err(nb::Error::Other)
    }
}
