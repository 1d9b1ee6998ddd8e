use std::fmt::Write;

use fat12::ClusterStatus;

pub fn glyph(status: ClusterStatus) -> char {
    match status {
        ClusterStatus::Damaged => 'B',
        ClusterStatus::Eof => '░',
        ClusterStatus::Occupied => '█',
        ClusterStatus::Reserved => 'R',
        ClusterStatus::Empty => '.',
    }
}

/// ANSI前景色
pub fn color(status: ClusterStatus) -> u8 {
    match status {
        ClusterStatus::Damaged => 31,
        ClusterStatus::Eof => 32,
        ClusterStatus::Occupied => 34,
        ClusterStatus::Reserved => 36,
        ClusterStatus::Empty => 97,
    }
}

/// 渲染簇图，`width`为每行簇数，`None`表示不换行
pub fn cluster_map(statuses: &[ClusterStatus], width: Option<usize>) -> String {
    let width = width.filter(|&w| w > 0).unwrap_or(usize::MAX);
    let mut out = String::new();
    for (i, &status) in statuses.iter().enumerate() {
        if i > 0 && i % width == 0 {
            out.push('\n');
        }
        // 写入String不会失败
        let _ = write!(out, "\u{1B}[{}m{}", color(status), glyph(status));
    }
    out.push_str("\u{1B}[0m");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs() {
        let statuses = [
            ClusterStatus::Reserved,
            ClusterStatus::Reserved,
            ClusterStatus::Occupied,
            ClusterStatus::Eof,
            ClusterStatus::Damaged,
            ClusterStatus::Empty,
        ];
        let plain: String = statuses.iter().map(|&s| glyph(s)).collect();
        assert_eq!("RR█░B.", plain);
    }

    #[test]
    fn wraps_rows() {
        let statuses = [ClusterStatus::Empty; 5];
        let map = cluster_map(&statuses, Some(2));
        assert_eq!(2, map.matches('\n').count());
        assert!(map.ends_with("\u{1B}[0m"));

        let map = cluster_map(&statuses, None);
        assert_eq!(0, map.matches('\n').count());
        assert_eq!(5, map.matches("\u{1B}[97m.").count());
    }
}
