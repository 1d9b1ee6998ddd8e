use std::io;

use derive_more::Display;

use crate::ClusterStatus;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Display)]
pub enum Error {
    /* 结构错误 */
    /// 目录项必须恰好32字节
    #[display(fmt = "directory entry must be 32 bytes, got {}", _0)]
    EntrySize(usize),

    /// 镜像在读取某区域时提前结束
    #[display(fmt = "image ended inside the {} ({} bytes expected)", region, expected)]
    Truncated {
        region: &'static str,
        expected: usize,
    },

    /// 每簇扇区数或每扇区字节数为0
    #[display(fmt = "volume has zero-sized clusters")]
    EmptyCluster,

    #[display(fmt = "I/O error: {}", _0)]
    Io(io::Error),

    #[display(fmt = "malformed header: {}", _0)]
    Decode(binrw::Error),

    /* 参数校验错误 */
    #[display(fmt = "file name can't be blank")]
    BlankName,

    #[display(fmt = "file name can't be longer than 8 bytes: {:?}", _0)]
    NameTooLong(String),

    #[display(fmt = "file extension can't be longer than 3 bytes: {:?}", _0)]
    ExtensionTooLong(String),

    #[display(fmt = "OEM name can't be longer than 8 bytes: {:?}", _0)]
    OemNameTooLong(String),

    #[display(fmt = "{:?} can't be represented in the single-byte encoding", _0)]
    Unencodable(String),

    #[display(fmt = "{} must have {} entries, got {}", field, expected, actual)]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[display(fmt = "undefined status value {:#04x}", _0)]
    UndefinedStatus(u8),

    /// `InUse`只能通过改写名称首字节得到
    #[display(fmt = "InUse can't be set directly, set the first character of the name instead")]
    InUseStatus,

    /* 语义/范围错误 */
    #[display(fmt = "cluster {} is outside the cluster map ({} entries)", cluster, len)]
    ClusterOutOfRange { cluster: u16, len: usize },

    /// 簇链只能从`Occupied`或`Eof`簇开始
    #[display(fmt = "cluster {} is {:?} and can't start a chain", cluster, status)]
    UnusableStart {
        cluster: u16,
        status: ClusterStatus,
    },

    #[display(fmt = "cluster chain starting at {} never terminates", _0)]
    ChainCycle(u16),

    #[display(fmt = "file size {} is too large for FAT12, the entry is likely corrupted", _0)]
    FileTooLarge(u32),

    #[display(fmt = "only files and directories can be read")]
    UnsupportedAttributes,

    #[display(fmt = "{:?} is not a directory", _0)]
    NotADirectory(String),

    #[display(fmt = "{:?} not found", _0)]
    NotFound(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<binrw::Error> for Error {
    fn from(e: binrw::Error) -> Self {
        Error::Decode(e)
    }
}
