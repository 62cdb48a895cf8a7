use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::responses::{PasswordVerificationState, ReadSysParaStatus};

/// Errors talking to the R502. `E` is the error type of the underlying serial port.
#[derive(Debug, Error)]
pub enum Error<E> {
    #[error("serial link error: {0:?}")]
    Serial(E),

    #[error("reply does not start with 0xEF01 (got {0:#06x})")]
    BadStartCode(u16),

    #[error("expected an acknowledgement packet, got packet id {0:#04x}")]
    UnexpectedPacket(u8),

    #[error("reply declares a {0} byte packet, which does not fit the receive buffer")]
    PacketLength(u16),

    #[error("checksum mismatch: computed {computed:#06x}, received {received:#06x}")]
    ChecksumMismatch { computed: u16, received: u16 },

    #[error("reply payload is too short for the command sent")]
    Truncated,

    #[error("reply does not belong to the command sent")]
    UnexpectedReply,

    #[error("password rejected by the sensor: {0:?}")]
    PasswordRejected(PasswordVerificationState),

    #[error("could not read system parameters: {0:?}")]
    SystemParameters(ReadSysParaStatus),
}

/// Decodes a reply payload (confirmation code first, checksum stripped).
pub trait FromPayload: Sized {
    fn from_payload(address: u32, payload: &[u8]) -> Option<Self>;
}

pub trait CommandWriter {
    fn write_cmd_bytes(&mut self, bytes: &[u8]);
}

pub trait ToPayload {
    fn to_payload(&self, writer: &mut dyn CommandWriter);
}

/// Sum of all bytes, wrapping at 16 bits. The R502 checksums the packet
/// identifier, the length and the payload this way.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, byte| sum.wrapping_add(u16::from(*byte)))
}

pub(crate) fn read_u16(payload: &[u8], at: usize) -> Option<u16> {
    payload.get(at..at + 2).map(BigEndian::read_u16)
}

pub(crate) fn read_u32(payload: &[u8], at: usize) -> Option<u32> {
    payload.get(at..at + 4).map(BigEndian::read_u32)
}
