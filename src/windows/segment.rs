//! Link segment mapping aligned with the game's consumer contract

use std::ptr::NonNull;
use tracing::{debug, trace, warn};
use windows::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::System::Memory::{
    CreateFileMappingW, FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, PAGE_READWRITE,
    UnmapViewOfFile,
};
use windows::core::PCWSTR;

use crate::link::{LINK_BYTES, LinkData, SEGMENT_SIZE};
use crate::{LinkError, Result};

/// Byte offset of the tick counter within the segment.
const TICK_OFFSET: usize = 4;

/// Read-only view of the named link segment
///
/// The handle is held for the process lifetime and released on drop. The
/// segment itself is owned by the writing game process once it attaches;
/// abrupt consumer termination leaves it intact.
pub struct SharedSegment {
    mapping: HANDLE,
    base: NonNull<u8>,
}

impl SharedSegment {
    /// Create (or reuse) the named segment at its full footprint and map a
    /// read-only view of it.
    pub fn open(name: &str) -> Result<Self> {
        trace!(name, size = SEGMENT_SIZE, "Mapping link segment");

        // Create rather than open: the game refuses to write telemetry into
        // an undersized region, so the consumer allocates the full footprint
        // up front. If the game (or another consumer) created it first, the
        // existing mapping is reused.
        let mapping = unsafe {
            let wide_name = wide_string(name);
            CreateFileMappingW(
                INVALID_HANDLE_VALUE,
                None,
                PAGE_READWRITE,
                0,
                SEGMENT_SIZE as u32,
                PCWSTR::from_raw(wide_name.as_ptr()),
            )
            .map_err(|e| LinkError::windows_api_error("CreateFileMappingW", e))?
        };

        let base = unsafe {
            let ptr = MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, 0);
            NonNull::new(ptr.Value as *mut u8).ok_or_else(|| {
                let win_err = windows::core::Error::from_thread();
                let _ = CloseHandle(mapping);
                LinkError::windows_api_error("MapViewOfFile", win_err)
            })?
        };

        debug!(name, size = SEGMENT_SIZE, "Mapped link segment");
        Ok(Self { mapping, base })
    }

    /// Decode the current segment contents.
    ///
    /// Uses a double-read on the tick counter to avoid handing out a frame
    /// torn by a concurrent game write; a still-moving tick after one retry
    /// is accepted as-is (the next poll replaces it).
    pub fn read_link(&self) -> LinkData {
        let mut buf = [0u8; LINK_BYTES];

        for attempt in 0..2 {
            let tick_before = self.tick();
            unsafe {
                std::ptr::copy_nonoverlapping(self.base.as_ptr(), buf.as_mut_ptr(), LINK_BYTES);
            }
            let tick_after = self.tick();

            if tick_before == tick_after {
                break;
            }
            trace!(attempt, tick_before, tick_after, "Tick moved mid-copy, re-reading");
            if attempt == 1 {
                warn!("Tick still moving after re-read, accepting possibly torn frame");
            }
        }

        LinkData::decode(&buf)
    }

    fn tick(&self) -> u32 {
        let bytes = unsafe {
            std::slice::from_raw_parts(self.base.as_ptr().add(TICK_OFFSET), 4)
        };
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl Drop for SharedSegment {
    fn drop(&mut self) {
        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: self.base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
            let _ = CloseHandle(self.mapping);
        }
    }
}

// SAFETY: The segment holds a Windows mapping handle and a read-only view
// pointer; both are safe to move and share between threads for our
// read-only use case
unsafe impl Send for SharedSegment {}
unsafe impl Sync for SharedSegment {}

/// Convert string to null-terminated wide string for Windows APIs
fn wide_string(s: &str) -> Vec<u16> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;
    use windows::Win32::System::Memory::FILE_MAP_WRITE;

    #[test]
    fn fresh_segment_reads_as_not_live() {
        let segment =
            SharedSegment::open("WaymarkTestFresh").expect("test segment should map");
        let link = segment.read_link();

        // A freshly created segment is zero-filled: no telemetry yet.
        assert_eq!(link.ui_tick, 0);
        assert_eq!(link.context.map_id, 0);
    }

    #[test]
    fn reads_back_bytes_written_through_a_second_view() {
        let segment =
            SharedSegment::open("WaymarkTestRoundtrip").expect("test segment should map");

        // Map a writable view of the same segment, standing in for the game.
        let write_base = unsafe {
            let ptr = MapViewOfFile(segment.mapping, FILE_MAP_WRITE, 0, 0, 0);
            NonNull::new(ptr.Value as *mut u8).expect("writable view should map")
        };

        unsafe {
            let base = write_base.as_ptr();
            base.add(4).cast::<u32>().write_unaligned(42u32.to_le());
            base.add(8).cast::<u32>().write_unaligned(10.0f32.to_bits().to_le());
            base.add(16).cast::<u32>().write_unaligned(20.0f32.to_bits().to_le());
            base.add(1136).cast::<u32>().write_unaligned(15u32.to_le());
        }

        let link = segment.read_link();
        assert_eq!(link.ui_tick, 42);
        assert_eq!(link.avatar_position.x, 10.0);
        assert_eq!(link.avatar_position.z, 20.0);
        assert_eq!(link.context.map_id, 15);

        unsafe {
            let addr = MEMORY_MAPPED_VIEW_ADDRESS { Value: write_base.as_ptr() as *mut _ };
            let _ = UnmapViewOfFile(addr);
        }
    }
}
