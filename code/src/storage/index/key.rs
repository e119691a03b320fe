use crate::common::config::PageId;

/// A fixed-width, byte-encodable index key. `ENCODED_LEN` bytes of `encode`'s
/// output must round-trip through `decode` exactly, since page layouts are
/// computed from it.
pub trait IndexKey: Clone + Copy + Sized + std::fmt::Debug {
    const ENCODED_LEN: usize;

    fn encode(&self, buf: &mut [u8]);
    fn decode(buf: &[u8]) -> Self;
}

/// A fixed-width, byte-encodable index value (what a leaf maps a key to).
pub trait IndexValue: Clone + Copy + Sized + std::fmt::Debug {
    const ENCODED_LEN: usize;

    fn encode(&self, buf: &mut [u8]);
    fn decode(buf: &[u8]) -> Self;
}

/// The only key type this engine ships: a plain signed 64-bit integer,
/// equivalent to the course's `GenericKey<8>` under an integer comparator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Int64Key(pub i64);

impl IndexKey for Int64Key {
    const ENCODED_LEN: usize = 8;

    fn encode(&self, buf: &mut [u8]) {
        buf[..8].copy_from_slice(&self.0.to_le_bytes());
    }

    fn decode(buf: &[u8]) -> Self {
        Self(i64::from_le_bytes(buf[..8].try_into().unwrap()))
    }
}

impl From<i64> for Int64Key {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// A record id: which page a tuple lives on and its slot within that page.
/// Stands in for the heap-file pointer a leaf would otherwise store.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Rid {
    pub page_id: PageId,
    pub slot_num: u32,
}

impl Rid {
    pub fn new(page_id: PageId, slot_num: u32) -> Self {
        Self { page_id, slot_num }
    }
}

impl IndexValue for Rid {
    const ENCODED_LEN: usize = 12;

    fn encode(&self, buf: &mut [u8]) {
        buf[0..8].copy_from_slice(&self.page_id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.slot_num.to_le_bytes());
    }

    fn decode(buf: &[u8]) -> Self {
        let page_id = PageId::from_le_bytes(buf[0..8].try_into().unwrap());
        let slot_num = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        Self { page_id, slot_num }
    }
}
