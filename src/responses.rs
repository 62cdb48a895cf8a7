use crate::utils::{read_u16, read_u32, FromPayload};

/// Responses to commands returned by the R502. Names are the same as commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Contains system status and configuration information
    ReadSysPara(ReadSysParaResult),

    VfyPwd(VfyPwdResult),

    GenImg(GenImgResult),

    Img2Tz(Img2TzResult),

    RegModel(RegModelResult),

    Store(StoreResult),

    DeletChar(DeletCharResult),

    Search(SearchResult),

    TemplateNum(TemplateNumResult),

    ReadIndexTable(ReadIndexTableResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSysParaResult {
    pub address: u32,
    pub confirmation_code: ReadSysParaStatus,
    pub system_parameters: SystemParameters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfyPwdResult {
    pub address: u32,
    /// Handshake result
    pub confirmation_code: PasswordVerificationState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenImgResult {
    pub address: u32,
    pub confirmation_code: GenImgStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Img2TzResult {
    pub address: u32,
    pub confirmation_code: Img2TzStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegModelResult {
    pub address: u32,
    pub confirmation_code: RegModelStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreResult {
    pub address: u32,
    pub confirmation_code: StoreStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletCharResult {
    pub address: u32,
    pub confirmation_code: DeletCharStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub address: u32,
    pub confirmation_code: SearchStatus,
    /// Library index of the best match. Only meaningful on success.
    pub match_id: u16,
    /// Confidence of the match. Only meaningful on success.
    pub match_score: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNumResult {
    pub address: u32,
    pub confirmation_code: TemplateNumStatus,
    pub template_num: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadIndexTableResult {
    pub address: u32,
    pub confirmation_code: ReadIndexTableStatus,
    /// Occupancy bitmap for one page of 256 library entries. Bit `b` of byte
    /// `i` is set when entry `i * 8 + b` holds a template.
    pub index_page: [u8; 32],
}

/// System status and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemParameters {
    /// Status information. Use instance methods of SystemParameters to get to individual bits.
    pub status_register: u16,

    /// System identifier code, whatever that means - datasheet says this has a constant value of
    /// 0x0009
    pub system_identifier_code: u16,

    /// Finger library size.
    pub finger_library_size: u16,

    /// Security level [1-5]
    pub security_level: u16,

    /// Device address
    pub device_address: u32,

    /// Packet size. Actually a size code [0-3]:\
    /// 0 = 32 bytes\
    /// 1 = 64 bytes\
    /// 2 = 128 bytes (the default)\
    /// 3 = 256 bytes
    pub packet_size: u16,

    /// Baud setting. To get actual baud value, multiply by 9600.
    ///
    /// The default value is 6 for 57,600 baud.
    pub baud_setting: u16,
}

impl SystemParameters {
    /// True if the R502 is busy executing another command.
    ///
    /// *Busy* in the datasheet.
    pub fn busy(&self) -> bool {
        self.status_register & (1u16 << 0) != 0
    }

    /// True if the module found a matching finger - however you should
    /// always check the response to the actual matching request.
    ///
    /// *Pass* in the datasheet.
    pub fn has_finger_match(&self) -> bool {
        self.status_register & (1u16 << 1) != 0
    }

    /// True if the password given in the handshake is correct.
    ///
    /// *PWD* in the datasheet.
    pub fn password_ok(&self) -> bool {
        self.status_register & (1u16 << 2) != 0
    }

    /// True if the image buffer contains a valid image.
    ///
    /// *ImgBufStat* in the datasheet.
    pub fn has_valid_image(&self) -> bool {
        self.status_register & (1u16 << 3) != 0
    }

    /// Baud rate the module is configured for.
    pub fn baud_rate(&self) -> u32 {
        u32::from(self.baud_setting) * 9600
    }

    fn from_block(payload: &[u8]) -> Option<Self> {
        // Sizes in the datasheet are a mix of bytes and 16-bit words. The
        // block is 16 bytes.
        Some(SystemParameters {
            status_register: read_u16(payload, 0)?,
            system_identifier_code: read_u16(payload, 2)?,
            finger_library_size: read_u16(payload, 4)?,
            security_level: read_u16(payload, 6)?,
            device_address: read_u32(payload, 8)?,
            packet_size: read_u16(payload, 12)?,
            baud_setting: read_u16(payload, 14)?,
        })
    }
}

/// Enum for the password handshake result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerificationState {
    Correct,
    Incorrect,
    Error,
    Other(u8),
}

impl From<u8> for PasswordVerificationState {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Correct,
            0x13 => Self::Incorrect,
            0x01 => Self::Error,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSysParaStatus {
    Success,
    PacketError,
    Other(u8),
}

impl From<u8> for ReadSysParaStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenImgStatus {
    Success,
    PacketError,
    FingerNotDetected,
    ImageNotCaptured,
    Other(u8),
}

impl From<u8> for GenImgStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            0x02 => Self::FingerNotDetected,
            0x03 => Self::ImageNotCaptured,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Img2TzStatus {
    Success,
    PacketError,
    /// Image too disordered to extract features from
    ImageTooMessy,
    /// Too few feature points, or the image is too small
    FeatureFail,
    /// No valid primary image in the image buffer
    InvalidImage,
    Other(u8),
}

impl From<u8> for Img2TzStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            0x06 => Self::ImageTooMessy,
            0x07 => Self::FeatureFail,
            0x15 => Self::InvalidImage,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegModelStatus {
    Success,
    PacketError,
    /// The two character buffers are not from the same finger
    EnrollMismatch,
    Other(u8),
}

impl From<u8> for RegModelStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            0x0A => Self::EnrollMismatch,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Success,
    PacketError,
    /// Index beyond the finger library
    BadLocation,
    FlashError,
    Other(u8),
}

impl From<u8> for StoreStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            0x0B => Self::BadLocation,
            0x18 => Self::FlashError,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletCharStatus {
    Success,
    PacketError,
    DeleteFailed,
    Other(u8),
}

impl From<u8> for DeletCharStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            0x10 => Self::DeleteFailed,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Success,
    PacketError,
    /// No matching template in the searched range
    NotFound,
    Other(u8),
}

impl From<u8> for SearchStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            0x09 => Self::NotFound,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateNumStatus {
    Success,
    PacketError,
    Other(u8),
}

impl From<u8> for TemplateNumStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadIndexTableStatus {
    Success,
    PacketError,
    Other(u8),
}

impl From<u8> for ReadIndexTableStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Success,
            0x01 => Self::PacketError,
            other => Self::Other(other),
        }
    }
}

impl FromPayload for ReadSysParaResult {
    // confrm | code [1]
    // params | system parameters [16]
    fn from_payload(address: u32, payload: &[u8]) -> Option<Self> {
        Some(Self {
            address,
            confirmation_code: (*payload.first()?).into(),
            system_parameters: SystemParameters::from_block(payload.get(1..17)?)?,
        })
    }
}

impl FromPayload for SearchResult {
    // confrm | code [1]
    // pageid | match_id [2]
    // score  | match_score [2]
    fn from_payload(address: u32, payload: &[u8]) -> Option<Self> {
        let confirmation_code = SearchStatus::from(*payload.first()?);
        if payload.len() == 1 && confirmation_code != SearchStatus::Success {
            return Some(Self {
                address,
                confirmation_code,
                match_id: 0,
                match_score: 0,
            });
        }
        Some(Self {
            address,
            confirmation_code,
            match_id: read_u16(payload, 1)?,
            match_score: read_u16(payload, 3)?,
        })
    }
}

impl FromPayload for TemplateNumResult {
    // confrm | code [1]
    // num    | template_num [2]
    fn from_payload(address: u32, payload: &[u8]) -> Option<Self> {
        Some(Self {
            address,
            confirmation_code: (*payload.first()?).into(),
            template_num: read_u16(payload, 1)?,
        })
    }
}

impl FromPayload for ReadIndexTableResult {
    // confrm | code [1]
    // index  | bitmap [32]
    fn from_payload(address: u32, payload: &[u8]) -> Option<Self> {
        let confirmation_code = ReadIndexTableStatus::from(*payload.first()?);
        let mut index_page = [0u8; 32];
        // Some firmware answers failures with the code alone
        if payload.len() > 1 || confirmation_code == ReadIndexTableStatus::Success {
            index_page.copy_from_slice(payload.get(1..33)?);
        }
        Some(Self {
            address,
            confirmation_code,
            index_page,
        })
    }
}

impl ReadIndexTableResult {
    /// Library indices marked as used on this page, given the page number.
    pub fn used_indices(&self, page: u8) -> impl Iterator<Item = u16> + '_ {
        let base = u16::from(page) * 256;
        self.index_page
            .iter()
            .enumerate()
            .flat_map(move |(i, byte)| {
                (0..8u16)
                    .filter(move |bit| byte & (1u8 << *bit) != 0)
                    .map(move |bit| base + (i as u16) * 8 + bit)
            })
    }
}

/// Replies that carry nothing but the confirmation code.
macro_rules! code_only_reply {
    ($($result:ident),*) => {
        $(
            impl FromPayload for $result {
                fn from_payload(address: u32, payload: &[u8]) -> Option<Self> {
                    Some(Self {
                        address,
                        confirmation_code: (*payload.first()?).into(),
                    })
                }
            }
        )*
    };
}

code_only_reply!(VfyPwdResult, GenImgResult, Img2TzResult, RegModelResult, StoreResult, DeletCharResult);
