use std::sync::Arc;

use crate::buffer::{BufferPoolManager, FrameData, FrameReadGuard, FrameWriteGuard};
use crate::common::config::{FrameId, PageId};

/// The pin/frame bookkeeping shared by every flavor of basic guard. Kept in
/// its own `Option` slot so `upgrade_read`/`upgrade_write` can move it out of
/// a `BasicPageGuard` without running that guard's `Drop` (which would unpin
/// the very page the new guard is about to take over).
struct GuardState {
    bpm: Arc<BufferPoolManager>,
    page_id: PageId,
    frame_id: FrameId,
    frame: FrameData,
    dirty: bool,
}

/// Owns a pin on a page but no latch. Cheapest guard; callers reach the bytes
/// through `with_data`/`with_data_mut` rather than a borrow, since nothing
/// stops a concurrent writer otherwise.
pub struct BasicPageGuard {
    state: Option<GuardState>,
}

impl BasicPageGuard {
    pub(crate) fn new(bpm: Arc<BufferPoolManager>, page_id: PageId, frame_id: FrameId, frame: FrameData) -> Self {
        Self {
            state: Some(GuardState {
                bpm,
                page_id,
                frame_id,
                frame,
                dirty: false,
            }),
        }
    }

    fn state(&self) -> &GuardState {
        self.state.as_ref().expect("guard state already taken")
    }

    pub fn page_id(&self) -> PageId {
        self.state().page_id
    }

    pub fn with_data<T>(&self, f: impl FnOnce(&[u8]) -> T) -> T {
        let data = self.state().frame.read();
        f(&data[..])
    }

    pub fn with_data_mut<T>(&mut self, f: impl FnOnce(&mut [u8]) -> T) -> T {
        self.state.as_mut().expect("guard state already taken").dirty = true;
        let mut data = self.state().frame.write();
        f(&mut data[..])
    }

    /// Drop the pin-only guard and re-acquire it as a shared-latched one.
    /// Takes the pin/frame state out of `self` instead of cloning it, so the
    /// new guard inherits the original's `Arc` ownership rather than adding
    /// to it; `self`'s `Drop` then finds nothing left to unpin.
    pub fn upgrade_read(mut self) -> ReadPageGuard {
        let state = self.state.take().expect("guard state already taken");
        let latch = state.frame.read_arc();
        ReadPageGuard {
            bpm: state.bpm,
            page_id: state.page_id,
            frame_id: state.frame_id,
            latch: Some(latch),
        }
    }

    /// Same idea as `upgrade_read`, but for the exclusive latch.
    pub fn upgrade_write(mut self) -> WritePageGuard {
        let state = self.state.take().expect("guard state already taken");
        let latch = state.frame.write_arc();
        WritePageGuard {
            bpm: state.bpm,
            page_id: state.page_id,
            frame_id: state.frame_id,
            latch: Some(latch),
            dirty: state.dirty,
        }
    }
}

impl Drop for BasicPageGuard {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.bpm.unpin_page(state.page_id, state.dirty);
        }
    }
}

/// Pins a page and holds its shared latch for the guard's lifetime.
pub struct ReadPageGuard {
    bpm: Arc<BufferPoolManager>,
    page_id: PageId,
    #[allow(dead_code)]
    frame_id: FrameId,
    latch: Option<FrameReadGuard>,
}

impl ReadPageGuard {
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn data(&self) -> &[u8] {
        &self.latch.as_ref().expect("latch released before use")[..]
    }
}

impl Drop for ReadPageGuard {
    fn drop(&mut self) {
        // Release the latch before the pin, matching the crabbing protocol's
        // "unlatch, then unpin" ordering.
        self.latch = None;
        self.bpm.unpin_page(self.page_id, false);
    }
}

/// Pins a page and holds its exclusive latch for the guard's lifetime.
pub struct WritePageGuard {
    bpm: Arc<BufferPoolManager>,
    page_id: PageId,
    #[allow(dead_code)]
    frame_id: FrameId,
    latch: Option<FrameWriteGuard>,
    dirty: bool,
}

impl WritePageGuard {
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn data(&self) -> &[u8] {
        &self.latch.as_ref().expect("latch released before use")[..]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.dirty = true;
        &mut self.latch.as_mut().expect("latch released before use")[..]
    }
}

impl Drop for WritePageGuard {
    fn drop(&mut self) {
        self.latch = None;
        self.bpm.unpin_page(self.page_id, self.dirty);
    }
}
