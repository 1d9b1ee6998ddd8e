//! 根目录区与数据区中的目录。
//!
//! 根目录紧跟在FAT区之后，大小固定；子目录存放在数据区，通过簇链重建。

mod dir_entry;

pub use self::dir_entry::*;
use crate::volume::DIR_ENTRY_BYTES;
use crate::Result;

/// 按顺序解码一整块目录区域，长度必须是32的倍数
pub fn parse_directory(raw: &[u8]) -> Result<Vec<FatDirectoryEntry>> {
    raw.chunks(DIR_ENTRY_BYTES)
        .map(FatDirectoryEntry::from_bytes)
        .collect()
}
