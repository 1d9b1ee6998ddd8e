use std::io::{self, Cursor, Read, Seek, SeekFrom};

use binrw::BinRead;
use enumflags2::BitFlags;

use crate::volume::data::{self, Attribute, EntryStatus, FatDirectoryEntry};
use crate::volume::fat;
use crate::volume::reserved::{BiosParameterBlock, BootSector, ExtendedBiosParameterBlock};
use crate::{ClusterEntry, ClusterStatus, Error, Result};

/// 解码后的FAT12卷。
///
/// 构造完成后卷的几何结构即固定，替换数组时长度必须与原先一致。
/// 读取文件需要另行提供可随机访问的数据源。
#[derive(Debug, Clone)]
pub struct Volume {
    boot: BootSector,
    cluster_map: Vec<ClusterEntry>,
    root_directory: Vec<FatDirectoryEntry>,
}

impl Volume {
    /// 从卷的起始处顺序读取：启动扇区、第一份FAT、其余FAT副本（跳过）、根目录。
    pub fn new<R: Read>(reader: &mut R) -> Result<Self> {
        let sector = read_region(reader, BootSector::BYTES, "boot sector")?;
        let boot = BootSector::read(&mut Cursor::new(sector))?;
        let bpb = boot.bpb();
        log::debug!(
            "bytes/sector={} sectors/cluster={} fats={} sectors/fat={} root entries={} total sectors={}",
            bpb.bytes_per_sector(),
            bpb.sectors_per_cluster(),
            bpb.fat_count(),
            bpb.sectors_per_fat(),
            bpb.root_entries(),
            bpb.total_sectors()
        );
        if !boot.ebpb().has_valid_signature() {
            log::warn!("unexpected extended BPB signature {:#04x}", boot.ebpb().signature());
        }

        let fat = read_region(reader, bpb.fat_bytes(), "file allocation table")?;
        let cluster_map = fat::decode(&fat);

        // 默认各副本一致，不作比对
        for _ in 1..bpb.fat_count() {
            skip_region(reader, bpb.fat_bytes(), "file allocation table copy")?;
        }

        let root = read_region(reader, bpb.root_dir_bytes(), "root directory")?;
        let root_directory = data::parse_directory(&root)?;

        Ok(Self {
            boot,
            cluster_map,
            root_directory,
        })
    }

    pub const fn boot_sector(&self) -> &BootSector {
        &self.boot
    }

    pub const fn bpb(&self) -> &BiosParameterBlock {
        self.boot.bpb()
    }

    pub const fn ebpb(&self) -> &ExtendedBiosParameterBlock {
        self.boot.ebpb()
    }

    pub fn oem_name(&self) -> &str {
        self.boot.oem_name()
    }

    pub fn set_oem_name(&mut self, name: &str) -> Result<()> {
        self.boot.set_oem_name(name)
    }

    pub fn set_boot_jump(&mut self, jump: &[u8]) -> Result<()> {
        self.boot.set_jump(jump)
    }

    pub fn cluster_map(&self) -> &[ClusterEntry] {
        &self.cluster_map
    }

    /// 每个簇的状态，供外部渲染
    pub fn cluster_statuses(&self) -> Vec<ClusterStatus> {
        self.cluster_map.iter().map(ClusterEntry::status).collect()
    }

    /// 与解码时相同，0号与1号簇总是保留，原始值照旧保存
    pub fn set_cluster_map(&mut self, mut cluster_map: Vec<ClusterEntry>) -> Result<()> {
        check_len("cluster map", self.cluster_map.len(), cluster_map.len())?;
        fat::reserve_header(&mut cluster_map);
        self.cluster_map = cluster_map;
        Ok(())
    }

    pub fn root_directory(&self) -> &[FatDirectoryEntry] {
        &self.root_directory
    }

    pub fn set_root_directory(&mut self, root_directory: Vec<FatDirectoryEntry>) -> Result<()> {
        check_len("root directory", self.root_directory.len(), root_directory.len())?;
        self.root_directory = root_directory;
        Ok(())
    }
}

impl Volume {
    /// 簇数据在卷中的字节偏移。
    ///
    /// 根目录紧接在全部FAT之后；`cluster`应不小于2。
    pub fn cluster_offset(&self, cluster: u16) -> u64 {
        let bpb = self.bpb();
        bpb.cluster_bytes() as u64 * u64::from(cluster).saturating_sub(1)
            + u64::from(bpb.fat_count()) * bpb.fat_bytes() as u64
            + bpb.root_dir_bytes() as u64
    }

    /// 从`start`开始沿FAT获取整条簇链（含首尾）。
    ///
    /// 簇链只能从`Occupied`或`Eof`簇开始；遇到第一个非`Occupied`的簇即停止，
    /// 不要求它一定是`Eof`。
    pub fn cluster_chain(&self, start: u16) -> Result<Vec<u16>> {
        let mut current = self.entry(start)?;
        let status = current.status();
        if matches!(
            status,
            ClusterStatus::Reserved | ClusterStatus::Damaged | ClusterStatus::Empty
        ) {
            return Err(Error::UnusableStart {
                cluster: start,
                status,
            });
        }

        let mut chain = vec![start];
        while let Some(next) = current.next() {
            if chain.len() >= self.cluster_map.len() {
                return Err(Error::ChainCycle(start));
            }
            current = self.entry(next)?;
            chain.push(next);
        }

        if current.status() != ClusterStatus::Eof {
            log::warn!(
                "chain from cluster {} ends on a {:?} cluster",
                start,
                current.status()
            );
        }
        log::trace!("chain from cluster {start}: {chain:?}");

        Ok(chain)
    }

    /// 依次读取簇链上每个簇的完整内容
    pub fn read_clusters<S: Read + Seek>(&self, chain: &[u16], source: &mut S) -> Result<Vec<u8>> {
        let cluster_bytes = self.bpb().cluster_bytes();
        if cluster_bytes == 0 {
            return Err(Error::EmptyCluster);
        }
        let mut data = vec![0; chain.len() * cluster_bytes];
        for (&cluster, buf) in chain.iter().zip(data.chunks_exact_mut(cluster_bytes)) {
            let offset = self.cluster_offset(cluster);
            log::trace!("reading cluster {cluster} at {offset:#x}");
            source.seek(SeekFrom::Start(offset))?;
            source.read_exact(buf).map_err(|e| truncated(e, "data area", cluster_bytes))?;
        }
        Ok(data)
    }

    /// 读取簇链，并截去最后一个簇中超出`size`的部分
    pub fn read_chain<S: Read + Seek>(
        &self,
        chain: &[u16],
        size: usize,
        source: &mut S,
    ) -> Result<Vec<u8>> {
        let mut data = self.read_clusters(chain, source)?;
        data.truncate(size);
        Ok(data)
    }

    /// 读取文件内容。
    ///
    /// 大小为0且首簇为0的普通文件直接返回空内容，不会因0号簇保留而报错；
    /// 其余情况下簇链必须从可用的簇开始。
    /// 目录项记录的大小为0，读取目录应使用[`Volume::read_directory`]。
    pub fn read_file<S: Read + Seek>(
        &self,
        entry: &FatDirectoryEntry,
        source: &mut S,
    ) -> Result<Vec<u8>> {
        check_readable(entry)?;
        let size = i32::try_from(entry.file_size)
            .map_err(|_| Error::FileTooLarge(entry.file_size))? as usize;

        // 新建的空文件没有分配簇
        if size == 0 && entry.first_cluster == 0 && !entry.is_directory() {
            return Ok(Vec::new());
        }

        let chain = self.cluster_chain(entry.first_cluster)?;
        self.read_chain(&chain, size, source)
    }

    /// 重建子目录，可用于递归遍历
    pub fn read_directory<S: Read + Seek>(
        &self,
        entry: &FatDirectoryEntry,
        source: &mut S,
    ) -> Result<Vec<FatDirectoryEntry>> {
        check_readable(entry)?;
        if !entry.is_directory() {
            return Err(Error::NotADirectory(entry.full_name()));
        }

        let chain = self.cluster_chain(entry.first_cluster)?;
        let raw = self.read_clusters(&chain, source)?;
        data::parse_directory(&raw)
    }

    /// 从根目录出发按路径查找目录项，分隔符为`/`或`\`，不区分大小写
    pub fn lookup<S: Read + Seek>(&self, path: &str, source: &mut S) -> Result<FatDirectoryEntry> {
        let mut components = path
            .split(['/', '\\'])
            .filter(|component| !component.is_empty())
            .peekable();

        let mut directory = self.root_directory.clone();
        while let Some(component) = components.next() {
            let entry = directory
                .iter()
                .filter(|entry| {
                    matches!(entry.status(), EntryStatus::InUse | EntryStatus::DotEntry)
                })
                .filter(|entry| !entry.attributes.contains(Attribute::VolumeLabel))
                .find(|entry| entry.full_name().eq_ignore_ascii_case(component))
                .cloned()
                .ok_or_else(|| Error::NotFound(path.to_owned()))?;

            if components.peek().is_none() {
                return Ok(entry);
            }
            // `..`指向根目录时簇编号为0
            directory = if entry.status() == EntryStatus::DotEntry && entry.first_cluster == 0 {
                self.root_directory.clone()
            } else {
                self.read_directory(&entry, source)?
            };
        }

        Err(Error::NotFound(path.to_owned()))
    }
}

impl Volume {
    fn entry(&self, cluster: u16) -> Result<ClusterEntry> {
        self.cluster_map
            .get(usize::from(cluster))
            .copied()
            .ok_or(Error::ClusterOutOfRange {
                cluster,
                len: self.cluster_map.len(),
            })
    }
}

/// 只有普通文件与目录可以读取
fn check_readable(entry: &FatDirectoryEntry) -> Result<()> {
    let unsupported: BitFlags<Attribute> =
        Attribute::Device | Attribute::Reserved | Attribute::VolumeLabel;
    if entry.attributes.intersects(unsupported) {
        return Err(Error::UnsupportedAttributes);
    }
    Ok(())
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn truncated(e: io::Error, region: &'static str, expected: usize) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Truncated { region, expected }
    } else {
        Error::Io(e)
    }
}

fn read_region<R: Read>(reader: &mut R, len: usize, region: &'static str) -> Result<Vec<u8>> {
    let mut buf = vec![0; len];
    reader
        .read_exact(&mut buf)
        .map_err(|e| truncated(e, region, len))?;
    Ok(buf)
}

fn skip_region<R: Read>(reader: &mut R, len: usize, region: &'static str) -> Result<()> {
    let skipped = io::copy(&mut reader.by_ref().take(len as u64), &mut io::sink())?;
    if skipped < len as u64 {
        return Err(Error::Truncated {
            region,
            expected: len,
        });
    }
    Ok(())
}
