//! FAT区，每个条目12位，两个条目挤在三个字节里：
//!
//! ```text
//! byte:   b0        b1        b2
//! bits: [ a7..a0 ][ b3..b0 a11..a8 ][ b11..b4 ]
//! ```

use crate::{ClusterEntry, ClusterStatus};

/// 将三个字节拆成两个12位条目
pub const fn unpack(triple: [u8; 3]) -> (u16, u16) {
    let (b0, b1, b2) = (triple[0] as u16, triple[1] as u16, triple[2] as u16);
    let first = b0 | ((b1 & 0x0F) << 8);
    let second = (b2 << 4) | (b1 >> 4);
    (first, second)
}

/// [`unpack`]的逆运算，超出12位的部分被截去
pub const fn pack(first: u16, second: u16) -> [u8; 3] {
    let first = first & ClusterEntry::MASK;
    let second = second & ClusterEntry::MASK;
    [
        first as u8,
        ((first >> 8) as u8) | ((second as u8 & 0x0F) << 4),
        (second >> 4) as u8,
    ]
}

/// 条目数量：每三个字节两个条目，不足三字节的尾部被忽略
pub const fn entry_count(fat_bytes: usize) -> usize {
    fat_bytes / 3 * 2
}

/// 解码一份FAT，前两个条目总是保留
pub fn decode(fat: &[u8]) -> Vec<ClusterEntry> {
    let mut entries: Vec<ClusterEntry> = fat
        .chunks_exact(3)
        .flat_map(|triple| {
            let (first, second) = unpack([triple[0], triple[1], triple[2]]);
            [ClusterEntry::new(first), ClusterEntry::new(second)]
        })
        .collect();

    reserve_header(&mut entries);

    log::trace!(
        "decoded {} FAT entries, {} free",
        entries.len(),
        entries
            .iter()
            .filter(|entry| entry.status() == ClusterStatus::Empty)
            .count()
    );

    entries
}

/// 0号与1号条目存放介质描述符与保留标记，无论值为何，都视为保留
pub(crate) fn reserve_header(entries: &mut [ClusterEntry]) {
    for entry in entries.iter_mut().take(2) {
        *entry = ClusterEntry::reserved(entry.raw());
    }
}
