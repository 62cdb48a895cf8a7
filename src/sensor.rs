//! The boundary between the console and whatever fingerprint module driver
//! sits underneath it.

use std::fmt;
use std::ops::RangeInclusive;

use embedded_hal::serial::{Read, Write};

use crate::commands::Command;
use crate::driver::R502;
use crate::responses::{
    DeletCharStatus, GenImgStatus, Img2TzStatus, ReadIndexTableStatus, RegModelStatus, Reply, SearchResult,
    StoreStatus, TemplateNumStatus,
};
use crate::utils::Error;

/// One of the module's two character buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharBuffer {
    One,
    Two,
}

impl CharBuffer {
    pub fn id(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// A library location chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot(u16);

impl Slot {
    /// Parses user input, accepting only values inside `bounds`.
    pub fn parse(input: &str, bounds: &RangeInclusive<u16>) -> Option<Self> {
        let value = input.trim().parse::<u16>().ok()?;
        bounds.contains(&value).then_some(Self(value))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occupied library locations, as reported by the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateIndex {
    pub confirmation_code: ReadIndexTableStatus,
    pub templates: Vec<u16>,
}

/// High level operations the console needs from a fingerprint module.
pub trait FingerprintSensor {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Captures a fingerprint image into the image buffer.
    fn capture_image(&mut self) -> Result<GenImgStatus, Self::Error>;

    /// Turns the captured image into a template in `buffer`.
    fn image_to_template(&mut self, buffer: CharBuffer) -> Result<Img2TzStatus, Self::Error>;

    /// Combines both character buffers into a model.
    fn create_model(&mut self) -> Result<RegModelStatus, Self::Error>;

    /// Stores the model at `slot`.
    fn store_model(&mut self, slot: Slot) -> Result<StoreStatus, Self::Error>;

    fn delete_model(&mut self, slot: Slot) -> Result<DeletCharStatus, Self::Error>;

    /// Searches the whole library for the template in buffer 1.
    fn search(&mut self) -> Result<SearchResult, Self::Error>;

    fn read_templates(&mut self) -> Result<TemplateIndex, Self::Error>;

    fn template_count(&mut self) -> Result<(TemplateNumStatus, u16), Self::Error>;
}

impl<TX, RX, E> FingerprintSensor for R502<TX, RX>
where
    TX: Write<u8, Error = E>,
    RX: Read<u8, Error = E>,
    E: fmt::Debug + Send + Sync + 'static,
{
    type Error = Error<E>;

    fn capture_image(&mut self) -> Result<GenImgStatus, Self::Error> {
        match self.send_command(Command::GenImg)? {
            Reply::GenImg(result) => Ok(result.confirmation_code),
            _ => Err(Error::UnexpectedReply),
        }
    }

    fn image_to_template(&mut self, buffer: CharBuffer) -> Result<Img2TzStatus, Self::Error> {
        match self.send_command(Command::Img2Tz { buffer: buffer.id() })? {
            Reply::Img2Tz(result) => Ok(result.confirmation_code),
            _ => Err(Error::UnexpectedReply),
        }
    }

    fn create_model(&mut self) -> Result<RegModelStatus, Self::Error> {
        match self.send_command(Command::RegModel)? {
            Reply::RegModel(result) => Ok(result.confirmation_code),
            _ => Err(Error::UnexpectedReply),
        }
    }

    fn store_model(&mut self, slot: Slot) -> Result<StoreStatus, Self::Error> {
        let cmd = Command::Store {
            buffer: CharBuffer::One.id(),
            index: slot.get(),
        };
        match self.send_command(cmd)? {
            Reply::Store(result) => Ok(result.confirmation_code),
            _ => Err(Error::UnexpectedReply),
        }
    }

    fn delete_model(&mut self, slot: Slot) -> Result<DeletCharStatus, Self::Error> {
        let cmd = Command::DeletChar {
            start_index: slot.get(),
            num_to_delete: 1,
        };
        match self.send_command(cmd)? {
            Reply::DeletChar(result) => Ok(result.confirmation_code),
            _ => Err(Error::UnexpectedReply),
        }
    }

    fn search(&mut self) -> Result<SearchResult, Self::Error> {
        let cmd = Command::Search {
            buffer: CharBuffer::One.id(),
            start_index: 0,
            num_to_search: self.library_size()?,
        };
        match self.send_command(cmd)? {
            Reply::Search(result) => Ok(result),
            _ => Err(Error::UnexpectedReply),
        }
    }

    fn read_templates(&mut self) -> Result<TemplateIndex, Self::Error> {
        // One index page per 256 library entries
        let pages = ((self.library_size()? as u32 + 255) / 256).clamp(1, 256);
        let mut templates = Vec::new();
        for page in (0..pages).map(|page| page as u8) {
            match self.send_command(Command::ReadIndexTable { page })? {
                Reply::ReadIndexTable(result) if result.confirmation_code == ReadIndexTableStatus::Success => {
                    templates.extend(result.used_indices(page));
                }
                Reply::ReadIndexTable(result) => {
                    return Ok(TemplateIndex {
                        confirmation_code: result.confirmation_code,
                        templates,
                    })
                }
                _ => return Err(Error::UnexpectedReply),
            }
        }
        Ok(TemplateIndex {
            confirmation_code: ReadIndexTableStatus::Success,
            templates,
        })
    }

    fn template_count(&mut self) -> Result<(TemplateNumStatus, u16), Self::Error> {
        match self.send_command(Command::TemplateNum)? {
            Reply::TemplateNum(result) => Ok((result.confirmation_code, result.template_num)),
            _ => Err(Error::UnexpectedReply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::tests::ack;
    use crate::utils::checksum;
    use embedded_hal_mock::serial::{Mock as SerialMock, Transaction as SerialTransaction};

    fn command(payload: &[u8]) -> Vec<u8> {
        let length = (payload.len() + 2) as u16;
        let mut packet = vec![0xEF, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        packet.extend_from_slice(&length.to_be_bytes());
        packet.extend_from_slice(payload);
        let chk = checksum(&packet[6..]);
        packet.extend_from_slice(&chk.to_be_bytes());
        packet
    }

    fn exchange(request: &[u8], reply: &[u8]) -> [SerialTransaction<u8>; 3] {
        [
            SerialTransaction::write_many(command(request)),
            SerialTransaction::flush(),
            SerialTransaction::read_many(ack(reply)),
        ]
    }

    fn sys_para(library_size: u16) -> Vec<u8> {
        let mut payload = vec![0x00, 0x00, 0x04, 0x00, 0x09];
        payload.extend_from_slice(&library_size.to_be_bytes());
        payload.extend_from_slice(&[0x00, 0x03, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x02, 0x00, 0x06]);
        payload
    }

    #[test]
    fn slot_parsing() {
        let bounds = 1..=127;
        assert_eq!(Slot::parse("5\n", &bounds).map(Slot::get), Some(5));
        assert_eq!(Slot::parse("127", &bounds).map(Slot::get), Some(127));
        assert_eq!(Slot::parse("0", &bounds), None);
        assert_eq!(Slot::parse("128", &bounds), None);
        assert_eq!(Slot::parse("five", &bounds), None);
        assert_eq!(Slot::parse("-3", &bounds), None);
    }

    #[test]
    fn store_uses_buffer_one() {
        let expectations = exchange(&[0x06, 0x01, 0x00, 0x2A], &[0x0B]);
        let mut serial = SerialMock::new(&expectations);
        let mut r502 = R502::new(serial.clone(), serial.clone(), 0xFFFF_FFFF);
        let status = r502.store_model(Slot(42)).unwrap();
        assert_eq!(status, StoreStatus::BadLocation);
        serial.done();
    }

    #[test]
    fn search_covers_the_whole_library() {
        let mut expectations = Vec::new();
        expectations.extend(exchange(&[0x0F], &sys_para(200)));
        expectations.extend(exchange(&[0x04, 0x01, 0x00, 0x00, 0x00, 0xC8], &[0x09, 0x00, 0x00, 0x00, 0x00]));
        let mut serial = SerialMock::new(&expectations);
        let mut r502 = R502::new(serial.clone(), serial.clone(), 0xFFFF_FFFF);
        let result = r502.search().unwrap();
        assert_eq!(result.confirmation_code, crate::responses::SearchStatus::NotFound);
        serial.done();
    }

    #[test]
    fn template_index_spans_pages() {
        let mut first = vec![0x00; 33];
        first[1] = 0b0000_0110;
        let mut second = vec![0x00; 33];
        second[32] = 0b1000_0000;

        let mut expectations = Vec::new();
        expectations.extend(exchange(&[0x0F], &sys_para(300)));
        expectations.extend(exchange(&[0x1F, 0x00], &first));
        expectations.extend(exchange(&[0x1F, 0x01], &second));
        let mut serial = SerialMock::new(&expectations);
        let mut r502 = R502::new(serial.clone(), serial.clone(), 0xFFFF_FFFF);
        let index = r502.read_templates().unwrap();
        assert_eq!(index.confirmation_code, ReadIndexTableStatus::Success);
        assert_eq!(index.templates, [1, 2, 511]);
        serial.done();
    }

    #[test]
    fn template_index_failure_is_reported() {
        let mut expectations = Vec::new();
        expectations.extend(exchange(&[0x0F], &sys_para(200)));
        expectations.extend(exchange(&[0x1F, 0x00], &[0x01]));
        let mut serial = SerialMock::new(&expectations);
        let mut r502 = R502::new(serial.clone(), serial.clone(), 0xFFFF_FFFF);
        let index = r502.read_templates().unwrap();
        assert_eq!(index.confirmation_code, ReadIndexTableStatus::PacketError);
        assert!(index.templates.is_empty());
        serial.done();
    }
}
