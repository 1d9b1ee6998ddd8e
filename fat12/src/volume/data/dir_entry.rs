//! 目录项，每项32字节，根目录与子目录格式相同。
//!
//! 名称首字节兼作状态标记，所以状态总是由名称推导，从不单独保存。

use std::io::Cursor;
use std::time::Duration;

use binrw::BinRead;
use derive_more::Display;
use enumflags2::{bitflags, BitFlags};

use crate::util::{decode_text, encode_padded, encode_text};
use crate::volume::DIR_ENTRY_BYTES;
use crate::{Error, Result};

pub const NAME_BYTES: usize = 8;

pub const EXTENSION_BYTES: usize = 3;

#[derive(Debug, Default, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct FatDirectoryEntry {
    name: [u8; NAME_BYTES],

    extension: [u8; EXTENSION_BYTES],

    #[br(map = |bits: u8| BitFlags::from_bits_truncate(bits))]
    pub attributes: BitFlags<Attribute>,

    /// 由操作系统自行解释
    pub additional_attributes: u8,

    /// 删除前的首字符，或创建时间的细粒度部分
    pub undelete_or_fine_time: u8,

    /// Creation time, granularity is 2 seconds
    create_time: u16,

    /// Creation date
    create_date: u16,

    /// Last access date
    access_date: u16,

    pub extended_attributes: u16,

    /// Last modification time
    modify_time: u16,

    /// Last modification date
    modify_date: u16,

    /// First data cluster of the file/directory described by this entry
    pub first_cluster: u16,

    /// Quantity containing size in bytes
    /// of file/directory described by this entry
    pub file_size: u32,
}

impl FatDirectoryEntry {
    /// 创建一个只有名称的目录项，其余字段为0
    pub fn new(name: &str, extension: &str) -> Result<Self> {
        let mut entry = Self::default();
        entry.set_name(name)?;
        entry.set_extension(extension)?;
        Ok(entry)
    }

    /// 从恰好32字节的记录中解码
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != DIR_ENTRY_BYTES {
            return Err(Error::EntrySize(bytes.len()));
        }
        Ok(Self::read(&mut Cursor::new(bytes))?)
    }

    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_BYTES] {
        let mut bytes = [0; DIR_ENTRY_BYTES];
        bytes[..8].copy_from_slice(&self.name);
        bytes[8..11].copy_from_slice(&self.extension);
        bytes[11] = self.attributes.bits();
        bytes[12] = self.additional_attributes;
        bytes[13] = self.undelete_or_fine_time;
        bytes[14..16].copy_from_slice(&self.create_time.to_le_bytes());
        bytes[16..18].copy_from_slice(&self.create_date.to_le_bytes());
        bytes[18..20].copy_from_slice(&self.access_date.to_le_bytes());
        bytes[20..22].copy_from_slice(&self.extended_attributes.to_le_bytes());
        bytes[22..24].copy_from_slice(&self.modify_time.to_le_bytes());
        bytes[24..26].copy_from_slice(&self.modify_date.to_le_bytes());
        bytes[26..28].copy_from_slice(&self.first_cluster.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.file_size.to_le_bytes());
        bytes
    }

    pub fn name(&self) -> String {
        decode_text(&self.name)
    }

    pub fn extension(&self) -> String {
        decode_text(&self.extension)
    }

    /// `NAME.EXT`，无扩展名时为`NAME`
    pub fn full_name(&self) -> String {
        let name = self.name();
        let extension = self.extension();
        if extension.is_empty() {
            name
        } else {
            format!("{name}.{extension}")
        }
    }

    /// 名称不能为空白，且编码后不超过8字节
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::BlankName);
        }
        self.name = encode_segment::<NAME_BYTES>(name)?
            .ok_or_else(|| Error::NameTooLong(name.to_owned()))?;
        Ok(())
    }

    /// 扩展名可以为空，编码后不超过3字节
    pub fn set_extension(&mut self, extension: &str) -> Result<()> {
        self.extension = encode_segment::<EXTENSION_BYTES>(extension)?
            .ok_or_else(|| Error::ExtensionTooLong(extension.to_owned()))?;
        Ok(())
    }

    pub fn status(&self) -> EntryStatus {
        match self.name[0] {
            0x00 => EntryStatus::Empty,
            0x05 => EntryStatus::PendingDelete,
            0xE5 => EntryStatus::Deleted,
            b'.' => EntryStatus::DotEntry,
            _ => EntryStatus::InUse,
        }
    }

    /// 改写名称首字节。
    /// [`EntryStatus::InUse`]不能直接设置，应当改写名称。
    pub fn set_status(&mut self, status: EntryStatus) -> Result<()> {
        if status == EntryStatus::InUse {
            return Err(Error::InUseStatus);
        }
        self.name[0] = status as u8;
        Ok(())
    }

    pub fn is_directory(&self) -> bool {
        self.attributes.contains(Attribute::Directory)
    }

    pub fn create_time(&self) -> Duration {
        parse_timestamp(self.create_time)
    }

    /// 不支持修改时间，调用不产生任何效果
    pub fn set_create_time(&mut self, _time: Duration) {}

    pub fn create_date(&self) -> FatDate {
        parse_date(self.create_date)
    }

    pub fn access_date(&self) -> FatDate {
        parse_date(self.access_date)
    }

    pub fn modify_time(&self) -> Duration {
        parse_timestamp(self.modify_time)
    }

    /// 不支持修改时间，调用不产生任何效果
    pub fn set_modify_time(&mut self, _time: Duration) {}

    pub fn modify_date(&self) -> FatDate {
        parse_date(self.modify_date)
    }
}

/// 逐字符转为大写并以空格填充至`N`字节。
/// 超长时返回`Ok(None)`，由调用者报告是名称还是扩展名超长。
fn encode_segment<const N: usize>(segment: &str) -> Result<Option<[u8; N]>> {
    if encode_text(segment).is_none() {
        return Err(Error::Unencodable(segment.to_owned()));
    }
    let upper: String = segment.chars().map(to_single_byte_uppercase).collect();
    Ok(encode_padded(&upper, N).and_then(|bytes| bytes.try_into().ok()))
}

/// 大写形式不是单个单字节字符时（如`ß`、`µ`、`ÿ`）保持原样，编码后的长度不变
fn to_single_byte_uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if u8::try_from(u).is_ok() => u,
        _ => c,
    }
}

/// 8.3名称中允许出现的字符（0xE5除外的高位字节均合法）
const VALID_ASCII: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 !#$%&'()-@^_`{}~";

/// 检查名称片段是否只含合法字符
pub fn is_valid_name_segment(segment: &str) -> bool {
    segment.chars().all(|c| match u8::try_from(c) {
        Ok(b) if b.is_ascii() => VALID_ASCII.contains(&b),
        Ok(b) => b != 0xE5,
        Err(_) => false,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[bitflags]
#[repr(u8)]
pub enum Attribute {
    ReadOnly = 0b0000_0001,
    Hidden = 0b0000_0010,
    /// The corresponding file is tagged as a component of the operating system
    System = 0b0000_0100,
    /// The corresponding entry contains the volume label
    VolumeLabel = 0b0000_1000,
    Directory = 0b0001_0000,
    /// Indicates that properties of the associated file have been modified
    Archive = 0b0010_0000,
    Device = 0b0100_0000,
    /// Must stay 0
    Reserved = 0b1000_0000,
}

/// 由名称首字节推导的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryStatus {
    /// name[0] == 0，此条目后的条目皆为空
    Empty = 0x00,
    PendingDelete = 0x05,
    /// `.`与`..`
    DotEntry = 0x2E,
    Deleted = 0xE5,
    InUse = 0xFF,
}

impl TryFrom<u8> for EntryStatus {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0x00 => Ok(Self::Empty),
            0x05 => Ok(Self::PendingDelete),
            0x2E => Ok(Self::DotEntry),
            0xE5 => Ok(Self::Deleted),
            0xFF => Ok(Self::InUse),
            code => Err(Error::UndefinedStatus(code)),
        }
    }
}

/// 日期，不做合法性检查
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{:04}-{:02}-{:02}", year, month, day)]
pub struct FatDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl FatDate {
    /// 表示“没有日期”
    pub const MIN: Self = Self::new(1, 1, 1);

    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

/// Bitmap: `yyyyyyym mmmddddd`，年份自1980起
pub const fn parse_date(date: u16) -> FatDate {
    if date == 0 {
        return FatDate::MIN;
    }
    FatDate {
        year: 1980 + (date >> 9),
        month: ((date >> 5) & 0x0F) as u8,
        day: (date & 0x1F) as u8,
    }
}

/// Bitmap: `hhhhhmmm mmmsssss`，秒以2秒为单位
pub const fn parse_timestamp(time: u16) -> Duration {
    let seconds = (time & 0x1F) as u64 * 2;
    let minutes = ((time >> 5) & 0x3F) as u64;
    let hours = (time >> 11) as u64;
    Duration::from_secs(hours * 3600 + minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_entry(first: u8) -> [u8; DIR_ENTRY_BYTES] {
        let mut bytes = [0; DIR_ENTRY_BYTES];
        bytes[..11].copy_from_slice(b"README  TXT");
        bytes[0] = first;
        bytes
    }

    #[test]
    fn layout() {
        let mut bytes = raw_entry(b'R');
        bytes[11] = 0x21;
        bytes[14..16].copy_from_slice(&0x0843u16.to_le_bytes());
        bytes[16..18].copy_from_slice(&0x0A6Au16.to_le_bytes());
        bytes[26..28].copy_from_slice(&7u16.to_le_bytes());
        bytes[28..32].copy_from_slice(&1234u32.to_le_bytes());

        let entry = FatDirectoryEntry::from_bytes(&bytes).unwrap();
        assert_eq!("README", entry.name());
        assert_eq!("TXT", entry.extension());
        assert_eq!("README.TXT", entry.full_name());
        assert_eq!(Attribute::ReadOnly | Attribute::Archive, entry.attributes);
        assert_eq!(7, entry.first_cluster);
        assert_eq!(1234, entry.file_size);
        assert_eq!(Duration::from_secs(3600 + 2 * 60 + 6), entry.create_time());
        assert_eq!(FatDate::new(1985, 3, 10), entry.create_date());
        assert_eq!(FatDate::MIN, entry.modify_date());
        assert_eq!(bytes, entry.to_bytes());
    }

    #[test]
    fn wrong_size() {
        assert!(matches!(
            FatDirectoryEntry::from_bytes(&[0; 31]),
            Err(Error::EntrySize(31))
        ));
        assert!(matches!(
            FatDirectoryEntry::from_bytes(&[0; 33]),
            Err(Error::EntrySize(33))
        ));
    }

    #[test]
    fn status() {
        let status = |first| FatDirectoryEntry::from_bytes(&raw_entry(first)).unwrap().status();
        assert_eq!(EntryStatus::Empty, status(0x00));
        assert_eq!(EntryStatus::PendingDelete, status(0x05));
        assert_eq!(EntryStatus::Deleted, status(0xE5));
        assert_eq!(EntryStatus::DotEntry, status(b'.'));
        assert_eq!(EntryStatus::InUse, status(b'R'));
        assert_eq!(EntryStatus::InUse, status(0xFF));
    }

    #[test]
    fn set_status() {
        let mut entry = FatDirectoryEntry::new("readme", "txt").unwrap();
        entry.set_status(EntryStatus::Deleted).unwrap();
        assert_eq!(EntryStatus::Deleted, entry.status());
        assert!(matches!(
            entry.set_status(EntryStatus::InUse),
            Err(Error::InUseStatus)
        ));
        assert!(matches!(
            EntryStatus::try_from(0x42),
            Err(Error::UndefinedStatus(0x42))
        ));
        assert_eq!(EntryStatus::DotEntry, EntryStatus::try_from(b'.').unwrap());
    }

    #[test]
    fn names() {
        let mut entry = FatDirectoryEntry::new("TEST", "TXT").unwrap();
        assert_eq!("TEST.TXT", entry.full_name());

        entry.set_extension("").unwrap();
        assert_eq!("TEST", entry.full_name());

        entry.set_name("lower").unwrap();
        entry.set_extension("rs").unwrap();
        assert_eq!("LOWER.RS", entry.full_name());
        assert_eq!(b"LOWER   RS ", &entry.to_bytes()[..11]);

        entry.set_name("\u{e9}t\u{e9}").unwrap();
        assert_eq!("\u{c9}T\u{c9}", entry.name());
    }

    #[test]
    fn uppercase_keeps_byte_length() {
        let mut entry = FatDirectoryEntry::new("KEEP", "ME").unwrap();

        // µ的大写是希腊字母Μ，不在单字节编码内
        entry.set_name("\u{b5}").unwrap();
        assert_eq!("\u{b5}", entry.name());
        assert_eq!(0xB5, entry.to_bytes()[0]);

        // ß的大写是两个字符SS
        entry.set_name("gro\u{df}fu\u{df}").unwrap();
        assert_eq!("GRO\u{df}FU\u{df}", entry.name());

        entry.set_name("a").unwrap();
        entry.set_extension("\u{df}").unwrap();
        assert_eq!("A.\u{df}", entry.full_name());
        assert_eq!(b"A       \xDF  ", &entry.to_bytes()[..11]);

        entry.set_extension("\u{ff}").unwrap();
        assert_eq!("\u{ff}", entry.extension());

        assert!(matches!(
            entry.set_name("\u{df}\u{df}\u{df}\u{df}\u{df}\u{df}\u{df}\u{df}\u{df}"),
            Err(Error::NameTooLong(_))
        ));
    }

    #[test]
    fn rejected_names() {
        let mut entry = FatDirectoryEntry::new("KEEP", "ME").unwrap();
        assert!(matches!(entry.set_name(""), Err(Error::BlankName)));
        assert!(matches!(entry.set_name("   "), Err(Error::BlankName)));
        assert!(matches!(
            entry.set_name("LONGNAME1"),
            Err(Error::NameTooLong(_))
        ));
        assert!(matches!(
            entry.set_extension("TEXT"),
            Err(Error::ExtensionTooLong(_))
        ));
        assert!(matches!(
            entry.set_name("\u{20ac}"),
            Err(Error::Unencodable(_))
        ));
        assert_eq!("KEEP.ME", entry.full_name());
    }

    #[test]
    fn valid_segments() {
        assert!(is_valid_name_segment("COMMAND"));
        assert!(is_valid_name_segment("A~1"));
        assert!(is_valid_name_segment("\u{b5}"));
        assert!(!is_valid_name_segment("lower"));
        assert!(!is_valid_name_segment("A.B"));
        assert!(!is_valid_name_segment("\u{e5}"));
    }

    #[test]
    fn dates() {
        assert_eq!(FatDate::MIN, parse_date(0));
        assert_eq!(FatDate::new(1985, 3, 10), parse_date((5 << 9) | (3 << 5) | 10));
        assert_eq!("1985-03-10", parse_date((5 << 9) | (3 << 5) | 10).to_string());
        assert_eq!(FatDate::new(2107, 12, 31), parse_date((127 << 9) | (12 << 5) | 31));
    }

    #[test]
    fn timestamps() {
        assert_eq!(
            Duration::from_secs(3600 + 2 * 60 + 6),
            parse_timestamp((1 << 11) | (2 << 5) | 3)
        );
        assert_eq!(
            Duration::from_secs(23 * 3600 + 59 * 60 + 58),
            parse_timestamp((23 << 11) | (59 << 5) | 29)
        );
        assert_eq!(Duration::ZERO, parse_timestamp(0));
    }

    #[test]
    fn setting_time_is_a_no_op() {
        let mut bytes = raw_entry(b'R');
        bytes[22..24].copy_from_slice(&0x0843u16.to_le_bytes());
        let mut entry = FatDirectoryEntry::from_bytes(&bytes).unwrap();

        entry.set_modify_time(Duration::from_secs(42));
        entry.set_create_time(Duration::from_secs(42));
        assert_eq!(Duration::from_secs(3600 + 2 * 60 + 6), entry.modify_time());
        assert_eq!(Duration::ZERO, entry.create_time());
    }
}
