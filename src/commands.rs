use crate::utils::{CommandWriter, ToPayload};
//# Naming conventions etc follow the R502 datasheet, see:
//# https://www.dropbox.com/sh/epucei8lmoz7xpp/AAAmon04b1DiSOeh1q4nAhzAa?dl=0&preview=R502+fingerprint+module+user+manual-V1.2.pdf

/// Enum for commands one can send to the R502. Names match the datasheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reads system status and basic configuration
    ReadSysPara,

    /// Performs a handshake with the device to verify the password.
    /// The default password on the R502 is 0x00000000.
    VfyPwd {
        /// The device password.
        password: u32,
    },

    /// Captures an image of the fingerprint
    GenImg,

    /// Processes an image into a _character buffer_
    Img2Tz {
        /// Which buffer to store the processed fingerprint data into (there are 2).
        ///
        /// **Note:** The buffers are named **1** and **2**. Any other value defaults to 2.
        buffer: u8,
    },

    /// Combines both character buffers into a template, stored back in both buffers.
    RegModel,

    /// Stores a character buffer into the flash library.
    Store {
        /// Source buffer, **1** or **2**.
        buffer: u8,

        /// Library location to write to.
        index: u16,
    },

    /// Deletes `num_to_delete` templates starting at `start_index`.
    DeletChar { start_index: u16, num_to_delete: u16 },

    /// Matches the captured fingerprint against a number of stored templates.
    Search {
        /// Which buffer holds the processed fingerprint data (there are 2).
        ///
        /// **Note:** The buffers are named **1** and **2**. Any other value defaults to 2.
        buffer: u8,

        /// First library index to search
        start_index: u16,

        /// How many library entries to search, starting at `start_index`
        num_to_search: u16,
    },

    /// Number of valid templates in the library
    TemplateNum,

    /// Reads one page of the library occupancy bitmap. Each page covers 256 entries.
    ReadIndexTable { page: u8 },
}

impl Command {
    /// The instruction code, as listed in the datasheet.
    pub fn instruction(&self) -> u8 {
        match self {
            Self::GenImg => 0x01,
            Self::Img2Tz { .. } => 0x02,
            Self::Search { .. } => 0x04,
            Self::RegModel => 0x05,
            Self::Store { .. } => 0x06,
            Self::DeletChar { .. } => 0x0C,
            Self::ReadSysPara => 0x0F,
            Self::VfyPwd { .. } => 0x13,
            Self::TemplateNum => 0x1D,
            Self::ReadIndexTable { .. } => 0x1F,
        }
    }
}

impl ToPayload for Command {
    // Only the payload is written here - instruction followed by its
    // parameters. Header, address, packet id, length and checksum are the
    // driver's business.
    fn to_payload(&self, writer: &mut dyn CommandWriter) {
        writer.write_cmd_bytes(&[self.instruction()]);
        match self {
            Self::ReadSysPara | Self::GenImg | Self::RegModel | Self::TemplateNum => {}

            // passwd | cmd.password [4]
            Self::VfyPwd { password } => {
                writer.write_cmd_bytes(&password.to_be_bytes()[..]);
            }

            // bufid | buffer [1]
            Self::Img2Tz { buffer } => {
                writer.write_cmd_bytes(&[*buffer]);
            }

            // bufid | buffer [1]
            // pageid | index [2]
            Self::Store { buffer, index } => {
                writer.write_cmd_bytes(&[*buffer]);
                writer.write_cmd_bytes(&index.to_be_bytes()[..]);
            }

            // pageid | start_index [2]
            // n      | num_to_delete [2]
            Self::DeletChar {
                start_index,
                num_to_delete,
            } => {
                writer.write_cmd_bytes(&start_index.to_be_bytes()[..]);
                writer.write_cmd_bytes(&num_to_delete.to_be_bytes()[..]);
            }

            // bufid  | buffer [1]
            // sstart | start_index [2]
            // snum   | num_to_search [2]
            Self::Search {
                buffer,
                start_index,
                num_to_search,
            } => {
                writer.write_cmd_bytes(&[*buffer]);
                writer.write_cmd_bytes(&start_index.to_be_bytes()[..]);
                writer.write_cmd_bytes(&num_to_search.to_be_bytes()[..]);
            }

            // page | page [1]
            Self::ReadIndexTable { page } => {
                writer.write_cmd_bytes(&[*page]);
            }
        }
    }
}
