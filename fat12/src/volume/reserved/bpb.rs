use binrw::BinRead;

use crate::util::{decode_text, encode_text};
use crate::volume::DIR_ENTRY_BYTES;
use crate::{Error, Result};

/// 启动代码的字节数
pub const BOOT_CODE_BYTES: usize = 448;

/// 启动扇区，位于卷的最开头，共512字节。
///
/// 除BPB与EBPB外的字段只做透传，不作解释，也不校验签名。
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct BootSector {
    /// 跳转至启动代码的指令
    jump: [u8; 3],

    /// 一般用于记录什么系统格式化此卷
    #[br(map = |bytes: [u8; 8]| decode_text(&bytes))]
    oem_name: String,

    bpb: BiosParameterBlock,

    ebpb: ExtendedBiosParameterBlock,

    #[br(count = BOOT_CODE_BYTES)]
    boot_code: Vec<u8>,

    /// [0x55, 0xAA]
    signature: [u8; 2],
}

impl BootSector {
    pub const BYTES: usize = 512;

    pub const DEFAULT_JUMP: [u8; 3] = [0xEB, 0x3C, 0x90];

    pub const DEFAULT_OEM_NAME: &'static str = "MSDOS5.0";

    pub const fn jump(&self) -> [u8; 3] {
        self.jump
    }

    pub fn oem_name(&self) -> &str {
        &self.oem_name
    }

    pub const fn bpb(&self) -> &BiosParameterBlock {
        &self.bpb
    }

    pub const fn ebpb(&self) -> &ExtendedBiosParameterBlock {
        &self.ebpb
    }

    pub fn boot_code(&self) -> &[u8] {
        &self.boot_code
    }

    pub const fn signature(&self) -> [u8; 2] {
        self.signature
    }

    pub fn set_jump(&mut self, jump: &[u8]) -> Result<()> {
        self.jump = jump.try_into().map_err(|_| Error::LengthMismatch {
            field: "boot jump instructions",
            expected: 3,
            actual: jump.len(),
        })?;
        Ok(())
    }

    /// OEM名称最长8字节
    pub fn set_oem_name(&mut self, name: &str) -> Result<()> {
        let bytes = encode_text(name).ok_or_else(|| Error::Unencodable(name.to_owned()))?;
        if bytes.len() > 8 {
            return Err(Error::OemNameTooLong(name.to_owned()));
        }
        self.oem_name = decode_text(&bytes);
        Ok(())
    }
}

/// BIOS Parameter Block BIOS参数块
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct BiosParameterBlock {
    /// 一个扇区的字节量，一般为512
    bytes_per_sector: u16,

    /// 一个簇的扇区数
    sectors_per_cluster: u8,

    /// 保留区的扇区数，包括启动扇区在内，所以至少为1
    reserved_sectors: u16,

    /// FAT副本数量，一般为2
    fat_count: u8,

    /// 根目录的目录项数量
    root_entries: u16,

    /// 扇区总数，为0时使用`large_sectors`
    small_sectors: u16,

    /// 物理媒介的类型，0xF8表示硬盘
    media: u8,

    /// 每个FAT占用的扇区数
    sectors_per_fat: u16,

    /// 中断0x13模式下，轨道的扇区数
    sectors_per_track: u16,

    /// 中断0x13模式下，头数量
    heads: u16,

    hidden_sectors: u32,

    large_sectors: u32,
}

impl BiosParameterBlock {
    pub const BYTES: usize = 25;

    pub const fn bytes_per_sector(&self) -> u16 {
        self.bytes_per_sector
    }

    pub const fn sectors_per_cluster(&self) -> u8 {
        self.sectors_per_cluster
    }

    pub const fn reserved_sectors(&self) -> u16 {
        self.reserved_sectors
    }

    pub const fn fat_count(&self) -> u8 {
        self.fat_count
    }

    pub const fn root_entries(&self) -> u16 {
        self.root_entries
    }

    pub const fn small_sectors(&self) -> u16 {
        self.small_sectors
    }

    pub const fn media(&self) -> u8 {
        self.media
    }

    pub const fn sectors_per_fat(&self) -> u16 {
        self.sectors_per_fat
    }

    pub const fn sectors_per_track(&self) -> u16 {
        self.sectors_per_track
    }

    pub const fn heads(&self) -> u16 {
        self.heads
    }

    pub const fn hidden_sectors(&self) -> u32 {
        self.hidden_sectors
    }

    pub const fn large_sectors(&self) -> u32 {
        self.large_sectors
    }

    pub const fn total_sectors(&self) -> u32 {
        if self.small_sectors != 0 {
            self.small_sectors as u32
        } else {
            self.large_sectors
        }
    }

    /// 一个簇的字节量
    pub const fn cluster_bytes(&self) -> usize {
        self.sectors_per_cluster as usize * self.bytes_per_sector as usize
    }

    /// 一份FAT的字节量
    pub const fn fat_bytes(&self) -> usize {
        self.bytes_per_sector as usize * self.sectors_per_fat as usize
    }

    /// 根目录的字节量
    pub const fn root_dir_bytes(&self) -> usize {
        self.root_entries as usize * DIR_ENTRY_BYTES
    }
}

/// Extended BIOS Parameter Block
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct ExtendedBiosParameterBlock {
    /// 中断0x13驱动号
    disk_number: u8,

    /// 未使用
    current_head: u8,

    /// 应为0x28或0x29，但不作校验
    signature: u8,

    serial_number: u32,

    #[br(map = |bytes: [u8; 11]| decode_text(&bytes))]
    volume_label: String,

    /// 只用来做告示，不应信赖此字段。
    #[br(map = |bytes: [u8; 8]| decode_text(&bytes))]
    system_id: String,
}

impl ExtendedBiosParameterBlock {
    pub const BYTES: usize = 26;

    pub const fn disk_number(&self) -> u8 {
        self.disk_number
    }

    pub const fn current_head(&self) -> u8 {
        self.current_head
    }

    pub const fn signature(&self) -> u8 {
        self.signature
    }

    pub const fn has_valid_signature(&self) -> bool {
        matches!(self.signature, 0x28 | 0x29)
    }

    pub const fn serial_number(&self) -> u32 {
        self.serial_number
    }

    pub fn volume_label(&self) -> &str {
        &self.volume_label
    }

    pub fn system_id(&self) -> &str {
        &self.system_id
    }
}
