/// Bytes shared by every B+Tree page: discriminant, current slot count, and
/// the max slot count used to decide when a node must split.
pub const PAGE_HEADER_SIZE: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BPlusTreePageKind {
    Invalid,
    Leaf,
    Internal,
}

impl BPlusTreePageKind {
    fn from_i32(v: i32) -> Self {
        match v {
            1 => BPlusTreePageKind::Leaf,
            2 => BPlusTreePageKind::Internal,
            _ => BPlusTreePageKind::Invalid,
        }
    }

    fn as_i32(self) -> i32 {
        match self {
            BPlusTreePageKind::Invalid => 0,
            BPlusTreePageKind::Leaf => 1,
            BPlusTreePageKind::Internal => 2,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BPlusTreePageHeader {
    pub kind: BPlusTreePageKind,
    pub size: usize,
    pub max_size: usize,
}

impl BPlusTreePageHeader {
    pub fn read(data: &[u8]) -> Self {
        let kind = BPlusTreePageKind::from_i32(i32::from_le_bytes(data[0..4].try_into().unwrap()));
        let size = i32::from_le_bytes(data[4..8].try_into().unwrap()) as usize;
        let max_size = i32::from_le_bytes(data[8..12].try_into().unwrap()) as usize;
        Self { kind, size, max_size }
    }

    pub fn write(&self, data: &mut [u8]) {
        data[0..4].copy_from_slice(&self.kind.as_i32().to_le_bytes());
        data[4..8].copy_from_slice(&(self.size as i32).to_le_bytes());
        data[8..12].copy_from_slice(&(self.max_size as i32).to_le_bytes());
    }
}
