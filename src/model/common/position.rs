/// The council positions, in order of seniority. A member's position is
/// normally one of these, but free text is accepted too.
pub const POSITIONS: [&str; 20] = [
    "นายกสโมสรนักศึกษา",
    "อุปนายกกิจการภายใน",
    "อุปนายกกิจการภายนอก",
    "เลขานุการ",
    "เหรัญญิก",
    "ประธานฝ่ายประชาสัมพันธ์",
    "ประธานฝ่ายสวัสดิการ",
    "ประธานฝ่ายพัสดุ",
    "ประธานฝ่ายกีฬา",
    "ประธานฝ่ายวิชาการ",
    "ประธานฝ่ายศิลปวัฒนธรรม",
    "ประธานฝ่ายข้อมูลกิจการนักศึกษา",
    "ประธานฝ่ายเทคโนโลยีสารสนเทศ",
    "ประธานฝ่ายประเมินผล",
    "ประธานฝ่ายกิจกรรม",
    "ประธานฝ่ายกราฟิกดีไซน์",
    "ประธานฝ่ายพิธีการ",
    "ประธานฝ่ายครีเอทีฟและสันทนาการ",
    "ประธานฝ่ายสถานที่",
    "ประธานฝ่ายสาธารณสุข",
];

/// Rank given to positions outside [`POSITIONS`].
pub const FREE_TEXT_RANK: u32 = 999;

/// The 1-based rank of a position, or [`FREE_TEXT_RANK`].
pub fn position_rank(position: &str) -> u32 {
    POSITIONS
        .iter()
        .position(|p| *p == position)
        .map_or(FREE_TEXT_RANK, |index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks() {
        assert_eq!(position_rank(POSITIONS[0]), 1);
        assert_eq!(position_rank("เหรัญญิก"), 5);
        assert_eq!(position_rank(POSITIONS[19]), 20);
        assert_eq!(position_rank("Mascot"), FREE_TEXT_RANK);
        assert_eq!(position_rank(""), FREE_TEXT_RANK);
    }
}
