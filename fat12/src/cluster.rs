use crate::Error;

/// 簇的状态，由FAT条目的12位值推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClusterStatus {
    /// 未分配
    Empty = 0,
    /// 保留，不得分配或遍历
    Reserved = 1,
    /// 簇链中间的一环，值指向下一个簇
    Occupied = 2,
    /// 坏簇，不得读取
    Damaged = 3,
    /// 簇链上最后一个簇
    Eof = 4,
}

impl ClusterStatus {
    pub const fn classify(raw: u16) -> Self {
        match raw {
            0 => Self::Empty,
            1 | 0xFF6 => Self::Reserved,
            0x002..=0xFEF | 0xFF0 => Self::Occupied,
            0xFF7 => Self::Damaged,
            _ => Self::Eof,
        }
    }
}

impl TryFrom<u8> for ClusterStatus {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Empty),
            1 => Ok(Self::Reserved),
            2 => Ok(Self::Occupied),
            3 => Ok(Self::Damaged),
            4 => Ok(Self::Eof),
            code => Err(Error::UndefinedStatus(code)),
        }
    }
}

/// FAT中的一个条目。
///
/// `status`总是由`raw`决定，唯一的例外是0号与1号簇，
/// 它们存放介质描述符与保留标记，一律视为[`ClusterStatus::Reserved`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterEntry {
    raw: u16,
    status: ClusterStatus,
}

impl ClusterEntry {
    pub const MASK: u16 = 0x0FFF;

    pub const fn new(raw: u16) -> Self {
        let raw = raw & Self::MASK;
        Self {
            raw,
            status: ClusterStatus::classify(raw),
        }
    }

    pub(crate) const fn reserved(raw: u16) -> Self {
        Self {
            raw: raw & Self::MASK,
            status: ClusterStatus::Reserved,
        }
    }

    pub const fn raw(&self) -> u16 {
        self.raw
    }

    pub const fn status(&self) -> ClusterStatus {
        self.status
    }

    /// 若为簇链中间的一环，返回下一个簇编号
    pub fn next(&self) -> Option<u16> {
        (self.status == ClusterStatus::Occupied).then_some(self.raw)
    }
}

impl From<u16> for ClusterEntry {
    fn from(raw: u16) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify() {
        assert_eq!(ClusterStatus::Empty, ClusterStatus::classify(0));
        assert_eq!(ClusterStatus::Reserved, ClusterStatus::classify(1));
        assert_eq!(ClusterStatus::Reserved, ClusterStatus::classify(0xFF6));
        assert_eq!(ClusterStatus::Eof, ClusterStatus::classify(0xFFF));
        assert_eq!(ClusterStatus::Eof, ClusterStatus::classify(0xFF8));
        assert_eq!(ClusterStatus::Damaged, ClusterStatus::classify(0xFF7));
        assert_eq!(ClusterStatus::Occupied, ClusterStatus::classify(0x002));
        assert_eq!(ClusterStatus::Occupied, ClusterStatus::classify(0xFEF));
        assert_eq!(ClusterStatus::Occupied, ClusterStatus::classify(0xFF0));
    }

    #[test]
    fn reserved_range_between_ff1_and_ff5_is_eof() {
        for raw in 0xFF1..=0xFF5 {
            assert_eq!(ClusterStatus::Eof, ClusterStatus::classify(raw));
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(Ok(ClusterStatus::Eof), ClusterStatus::try_from(4).map_err(|_| ()));
        assert!(matches!(
            ClusterStatus::try_from(5),
            Err(Error::UndefinedStatus(5))
        ));
    }

    #[test]
    fn entry() {
        let entry = ClusterEntry::new(0x003);
        assert_eq!(Some(3), entry.next());
        assert_eq!(None, ClusterEntry::new(0xFFF).next());
        assert_eq!(ClusterStatus::Reserved, ClusterEntry::reserved(0xFF0).status());
        assert_eq!(0x234, ClusterEntry::new(0x1234).raw());
    }
}
