use arrayvec::ArrayVec;
use embedded_hal::serial::{Read, Write};
use nb::block;
use tracing::{debug, trace};

use crate::commands::Command;
use crate::responses::{
    DeletCharResult, GenImgResult, Img2TzResult, PasswordVerificationState, ReadIndexTableResult,
    ReadSysParaResult, ReadSysParaStatus, RegModelResult, Reply, SearchResult, StoreResult,
    SystemParameters, TemplateNumResult, VfyPwdResult,
};
use crate::utils::{checksum, read_u16, read_u32, CommandWriter, Error, FromPayload, ToPayload};

// Packet layout, both directions:
// headr  | 0xEF 0x01 [2]
// addr   | address [4]
// ident  | packet id [1]
// length | payload + checksum length [2]
// data   | payload [length - 2]
// chksum | checksum [2]
const START_CODE: u16 = 0xEF01;
const PID_COMMAND: u8 = 0x01;
const PID_ACK: u8 = 0x07;
const HEADER_LEN: usize = 9;
const CHECKSUM_LEN: usize = 2;

// The largest reply decoded here is ReadIndexTable: 1 + 32 payload bytes.
const RECEIVE_CAPACITY: usize = 64;
const COMMAND_CAPACITY: usize = 32;

/// Represents a R502 device connected to a U(S)ART.
#[derive(Debug)]
pub struct R502<TX, RX> {
    tx: TX,
    rx: RX,
    address: u32,
    received: ArrayVec<u8, RECEIVE_CAPACITY>,
    cmd_buffer: ArrayVec<u8, COMMAND_CAPACITY>,
    library_size: Option<u16>,
}

impl<TX, RX, E> R502<TX, RX>
where
    TX: Write<u8, Error = E>,
    RX: Read<u8, Error = E>,
{
    /// Creates a new driver. `address` is the module address, `0xffffffff` unless it was changed.
    pub fn new(tx: TX, rx: RX, address: u32) -> Self {
        Self {
            tx,
            rx,
            address,
            received: ArrayVec::new(),
            cmd_buffer: ArrayVec::new(),
            library_size: None,
        }
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    /// Sends a command to the R502 and then blocks waiting for the reply.
    pub fn send_command(&mut self, cmd: Command) -> Result<Reply, Error<E>> {
        self.prepare_cmd(&cmd);
        debug!(?cmd, "sending command");
        trace!(bytes = ?&self.cmd_buffer[..], "write");

        for byte in self.cmd_buffer.iter() {
            block!(self.tx.write(*byte)).map_err(Error::Serial)?;
        }
        block!(self.tx.flush()).map_err(Error::Serial)?;

        self.receive()?;
        trace!(bytes = ?&self.received[..], "read");

        let reply = self.parse_reply(&cmd)?;
        debug!(?reply, "received reply");
        Ok(reply)
    }

    /// Verifies the password, then reads and caches the system parameters.
    pub fn handshake(&mut self, password: u32) -> Result<SystemParameters, Error<E>> {
        match self.send_command(Command::VfyPwd { password })? {
            Reply::VfyPwd(VfyPwdResult {
                confirmation_code: PasswordVerificationState::Correct,
                ..
            }) => {}
            Reply::VfyPwd(result) => return Err(Error::PasswordRejected(result.confirmation_code)),
            _ => return Err(Error::UnexpectedReply),
        }
        self.read_system_parameters()
    }

    pub fn read_system_parameters(&mut self) -> Result<SystemParameters, Error<E>> {
        match self.send_command(Command::ReadSysPara)? {
            Reply::ReadSysPara(ReadSysParaResult {
                confirmation_code: ReadSysParaStatus::Success,
                system_parameters,
                ..
            }) => {
                self.library_size = Some(system_parameters.finger_library_size);
                Ok(system_parameters)
            }
            Reply::ReadSysPara(result) => Err(Error::SystemParameters(result.confirmation_code)),
            _ => Err(Error::UnexpectedReply),
        }
    }

    /// Capacity of the finger library, read from the module on first use.
    pub fn library_size(&mut self) -> Result<u16, Error<E>> {
        match self.library_size {
            Some(size) => Ok(size),
            None => self
                .read_system_parameters()
                .map(|params| params.finger_library_size),
        }
    }

    fn prepare_cmd(&mut self, cmd: &Command) {
        self.cmd_buffer.clear();
        self.cmd_buffer.write_cmd_bytes(&START_CODE.to_be_bytes()[..]);
        self.cmd_buffer.write_cmd_bytes(&self.address.to_be_bytes()[..]);
        self.cmd_buffer.write_cmd_bytes(&[PID_COMMAND]);
        // Length is patched in once the payload is known
        self.cmd_buffer.write_cmd_bytes(&[0x00, 0x00]);
        cmd.to_payload(&mut self.cmd_buffer);

        let length = (self.cmd_buffer.len() - HEADER_LEN + CHECKSUM_LEN) as u16;
        self.cmd_buffer[7..9].copy_from_slice(&length.to_be_bytes()[..]);

        let chk = checksum(&self.cmd_buffer[6..]);
        self.cmd_buffer.write_cmd_bytes(&chk.to_be_bytes()[..]);
    }

    fn read_byte(&mut self) -> Result<u8, Error<E>> {
        block!(self.rx.read()).map_err(Error::Serial)
    }

    fn receive(&mut self) -> Result<(), Error<E>> {
        self.received.clear();
        for _ in 0..HEADER_LEN {
            let byte = self.read_byte()?;
            self.received.push(byte);
        }

        let start = read_u16(&self.received, 0).ok_or(Error::Truncated)?;
        if start != START_CODE {
            return Err(Error::BadStartCode(start));
        }
        let pid = self.received[6];
        if pid != PID_ACK {
            return Err(Error::UnexpectedPacket(pid));
        }

        let length = read_u16(&self.received, 7).ok_or(Error::Truncated)?;
        if (length as usize) < CHECKSUM_LEN + 1 {
            return Err(Error::Truncated);
        }
        if HEADER_LEN + length as usize > RECEIVE_CAPACITY {
            return Err(Error::PacketLength(length));
        }
        for _ in 0..length {
            let byte = self.read_byte()?;
            self.received.push(byte);
        }

        let checksum_at = self.received.len() - CHECKSUM_LEN;
        let computed = checksum(&self.received[6..checksum_at]);
        let received = read_u16(&self.received, checksum_at).ok_or(Error::Truncated)?;
        if computed != received {
            return Err(Error::ChecksumMismatch { computed, received });
        }
        Ok(())
    }

    fn parse_reply(&self, cmd: &Command) -> Result<Reply, Error<E>> {
        let address = read_u32(&self.received, 2).ok_or(Error::Truncated)?;
        let payload = &self.received[HEADER_LEN..self.received.len() - CHECKSUM_LEN];

        // Replies don't repeat the instruction, so they are decoded according
        // to the command that was sent.
        let reply = match cmd {
            Command::ReadSysPara => ReadSysParaResult::from_payload(address, payload).map(Reply::ReadSysPara),
            Command::VfyPwd { .. } => VfyPwdResult::from_payload(address, payload).map(Reply::VfyPwd),
            Command::GenImg => GenImgResult::from_payload(address, payload).map(Reply::GenImg),
            Command::Img2Tz { .. } => Img2TzResult::from_payload(address, payload).map(Reply::Img2Tz),
            Command::RegModel => RegModelResult::from_payload(address, payload).map(Reply::RegModel),
            Command::Store { .. } => StoreResult::from_payload(address, payload).map(Reply::Store),
            Command::DeletChar { .. } => DeletCharResult::from_payload(address, payload).map(Reply::DeletChar),
            Command::Search { .. } => SearchResult::from_payload(address, payload).map(Reply::Search),
            Command::TemplateNum => TemplateNumResult::from_payload(address, payload).map(Reply::TemplateNum),
            Command::ReadIndexTable { .. } => {
                ReadIndexTableResult::from_payload(address, payload).map(Reply::ReadIndexTable)
            }
        };
        reply.ok_or(Error::Truncated)
    }
}

impl<const N: usize> CommandWriter for ArrayVec<u8, N> {
    fn write_cmd_bytes(&mut self, bytes: &[u8]) {
        // Commands are at most 17 bytes long, well inside the buffer.
        self.extend(bytes.iter().copied());
    }
}
