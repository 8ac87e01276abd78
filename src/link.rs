//! MumbleLink layout and decoding
//!
//! Defines the fixed byte layout of the MumbleLink shared memory segment and
//! provides an explicit field-by-field decoder, independent of platform
//! struct-packing rules.
//!
//! ## Segment structure
//!
//! The segment is one known schema version with no padding beyond what is
//! declared:
//!
//! 1. **Link header** (1108 bytes) - version, tick, avatar/camera vectors,
//!    UTF-16 name and identity strings, context length
//! 2. **Context region** (256 bytes) - game-specific block; Guild Wars 2
//!    fills the first 85 bytes (server address, map/shard/instance ids,
//!    compass and minimap state, mount index)
//! 3. **Description tail** (4096 bytes) - always empty, never read
//!
//! The game refuses to begin writing telemetry into an undersized region, so
//! the consumer must allocate the full footprint including the unused tail.
//!
//! Decoding is total: any byte pattern decodes to *some* [`LinkData`], and
//! out-of-range reads yield zeroed fields. Validity is judged by `ui_tick`
//! (zero means no telemetry has arrived yet).

use glam::Vec3;

/// Default name of the shared memory segment.
pub const MUMBLE_LINK_NAME: &str = "MumbleLink";

/// Size of the link header in bytes.
pub const LINK_HEADER_SIZE: usize = 1108;
/// Size of the context region in bytes.
pub const CONTEXT_SIZE: usize = 256;
/// Size of the trailing description area in bytes (2048 UTF-16 code units).
pub const DESCRIPTION_SIZE: usize = 4096;
/// Total segment footprint the consumer must allocate.
pub const SEGMENT_SIZE: usize = LINK_HEADER_SIZE + CONTEXT_SIZE + DESCRIPTION_SIZE;
/// Bytes actually decoded on each poll (header + context region).
pub const LINK_BYTES: usize = LINK_HEADER_SIZE + CONTEXT_SIZE;

// Link header offsets (bytes from segment start, little-endian).
const OFF_VERSION: usize = 0;
const OFF_TICK: usize = 4;
const OFF_AVATAR_POSITION: usize = 8;
const OFF_AVATAR_FRONT: usize = 20;
const OFF_AVATAR_TOP: usize = 32;
const OFF_NAME: usize = 44;
const OFF_CAMERA_POSITION: usize = 556;
const OFF_CAMERA_FRONT: usize = 568;
const OFF_CAMERA_TOP: usize = 580;
const OFF_IDENTITY: usize = 592;
const OFF_CONTEXT_LEN: usize = 1104;
const OFF_CONTEXT: usize = 1108;

/// Length of the name and identity fields in UTF-16 code units.
const TEXT_UNITS: usize = 256;

// Context offsets relative to the start of the context region.
const CTX_SERVER_ADDRESS: usize = 0;
const CTX_SERVER_ADDRESS_LEN: usize = 28;
const CTX_MAP_ID: usize = 28;
const CTX_MAP_TYPE: usize = 32;
const CTX_SHARD_ID: usize = 36;
const CTX_INSTANCE: usize = 40;
const CTX_BUILD_ID: usize = 44;
const CTX_UI_STATE: usize = 48;
const CTX_COMPASS_WIDTH: usize = 52;
const CTX_COMPASS_HEIGHT: usize = 54;
const CTX_COMPASS_ROTATION: usize = 56;
const CTX_PLAYER_X: usize = 60;
const CTX_PLAYER_Y: usize = 64;
const CTX_MAP_CENTER_X: usize = 68;
const CTX_MAP_CENTER_Y: usize = 72;
const CTX_MAP_SCALE: usize = 76;
const CTX_PROCESS_ID: usize = 80;
const CTX_MOUNT_INDEX: usize = 84;

/// Game-specific context block.
///
/// Only `map_id` feeds the marker-geometry core; the remaining fields are
/// carried through for completeness.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkContext {
    /// Opaque sockaddr of the map server (28 bytes).
    pub server_address: [u8; CTX_SERVER_ADDRESS_LEN],
    pub map_id: u32,
    pub map_type: u32,
    pub shard_id: u32,
    pub instance: u32,
    pub build_id: u32,
    /// UI state bitfield (map open, compass orientation, ...).
    pub ui_state: u32,
    pub compass_width: u16,
    pub compass_height: u16,
    pub compass_rotation: f32,
    pub player_x: f32,
    pub player_y: f32,
    pub map_center_x: f32,
    pub map_center_y: f32,
    pub map_scale: f32,
    pub process_id: u32,
    pub mount_index: u8,
}

impl Default for LinkContext {
    fn default() -> Self {
        Self::decode(&[])
    }
}

impl LinkContext {
    /// Decode a context region. Short buffers decode to zeroed fields.
    pub fn decode(ctx: &[u8]) -> Self {
        let mut server_address = [0u8; CTX_SERVER_ADDRESS_LEN];
        for (i, byte) in server_address.iter_mut().enumerate() {
            *byte = u8_at(ctx, CTX_SERVER_ADDRESS + i);
        }

        Self {
            server_address,
            map_id: u32_at(ctx, CTX_MAP_ID),
            map_type: u32_at(ctx, CTX_MAP_TYPE),
            shard_id: u32_at(ctx, CTX_SHARD_ID),
            instance: u32_at(ctx, CTX_INSTANCE),
            build_id: u32_at(ctx, CTX_BUILD_ID),
            ui_state: u32_at(ctx, CTX_UI_STATE),
            compass_width: u16_at(ctx, CTX_COMPASS_WIDTH),
            compass_height: u16_at(ctx, CTX_COMPASS_HEIGHT),
            compass_rotation: f32_at(ctx, CTX_COMPASS_ROTATION),
            player_x: f32_at(ctx, CTX_PLAYER_X),
            player_y: f32_at(ctx, CTX_PLAYER_Y),
            map_center_x: f32_at(ctx, CTX_MAP_CENTER_X),
            map_center_y: f32_at(ctx, CTX_MAP_CENTER_Y),
            map_scale: f32_at(ctx, CTX_MAP_SCALE),
            process_id: u32_at(ctx, CTX_PROCESS_ID),
            mount_index: u8_at(ctx, CTX_MOUNT_INDEX),
        }
    }
}

/// Fully decoded link telemetry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkData {
    pub ui_version: u32,
    /// Monotonic frame counter; zero until the game starts writing.
    pub ui_tick: u32,
    pub avatar_position: Vec3,
    pub avatar_front: Vec3,
    pub avatar_top: Vec3,
    /// Name of the writing application ("Guild Wars 2").
    pub name: String,
    pub camera_position: Vec3,
    pub camera_front: Vec3,
    pub camera_top: Vec3,
    /// Game-serialized identity payload (JSON); passed through undecoded.
    pub identity: String,
    pub context_len: u32,
    pub context: LinkContext,
}

impl LinkData {
    /// Decode a raw segment buffer.
    ///
    /// Total over any input: garbage values propagate as implausible fields
    /// and short buffers decode as zeroes. Callers judge validity by
    /// [`ui_tick`](Self::ui_tick).
    pub fn decode(buf: &[u8]) -> Self {
        let ctx = buf.get(OFF_CONTEXT..).unwrap_or(&[]);

        Self {
            ui_version: u32_at(buf, OFF_VERSION),
            ui_tick: u32_at(buf, OFF_TICK),
            avatar_position: vec3_at(buf, OFF_AVATAR_POSITION),
            avatar_front: vec3_at(buf, OFF_AVATAR_FRONT),
            avatar_top: vec3_at(buf, OFF_AVATAR_TOP),
            name: utf16_at(buf, OFF_NAME, TEXT_UNITS),
            camera_position: vec3_at(buf, OFF_CAMERA_POSITION),
            camera_front: vec3_at(buf, OFF_CAMERA_FRONT),
            camera_top: vec3_at(buf, OFF_CAMERA_TOP),
            identity: utf16_at(buf, OFF_IDENTITY, TEXT_UNITS),
            context_len: u32_at(buf, OFF_CONTEXT_LEN),
            context: LinkContext::decode(ctx),
        }
    }
}

// Total byte accessors: out-of-range reads yield zero.
fn u8_at(buf: &[u8], offset: usize) -> u8 {
    buf.get(offset).copied().unwrap_or(0)
}

fn u16_at(buf: &[u8], offset: usize) -> u16 {
    match buf.get(offset..offset + 2) {
        Some(b) => u16::from_le_bytes([b[0], b[1]]),
        None => 0,
    }
}

fn u32_at(buf: &[u8], offset: usize) -> u32 {
    match buf.get(offset..offset + 4) {
        Some(b) => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        None => 0,
    }
}

fn f32_at(buf: &[u8], offset: usize) -> f32 {
    f32::from_bits(u32_at(buf, offset))
}

fn vec3_at(buf: &[u8], offset: usize) -> Vec3 {
    Vec3::new(f32_at(buf, offset), f32_at(buf, offset + 4), f32_at(buf, offset + 8))
}

/// Extract a NUL-terminated UTF-16 string of at most `units` code units.
fn utf16_at(buf: &[u8], offset: usize, units: usize) -> String {
    let mut codes = Vec::with_capacity(units);
    for i in 0..units {
        let unit = u16_at(buf, offset + i * 2);
        if unit == 0 {
            break;
        }
        codes.push(unit);
    }
    String::from_utf16_lossy(&codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Build a segment buffer with the given tick, avatar position and map id.
    fn craft_buffer(tick: u32, avatar: [f32; 3], map_id: u32) -> Vec<u8> {
        let mut buf = vec![0u8; LINK_BYTES];
        buf[OFF_VERSION..OFF_VERSION + 4].copy_from_slice(&2u32.to_le_bytes());
        buf[OFF_TICK..OFF_TICK + 4].copy_from_slice(&tick.to_le_bytes());
        for (i, coord) in avatar.iter().enumerate() {
            let at = OFF_AVATAR_POSITION + i * 4;
            buf[at..at + 4].copy_from_slice(&coord.to_le_bytes());
        }
        let map_at = OFF_CONTEXT + CTX_MAP_ID;
        buf[map_at..map_at + 4].copy_from_slice(&map_id.to_le_bytes());
        buf
    }

    fn write_utf16(buf: &mut [u8], offset: usize, text: &str) {
        for (i, unit) in text.encode_utf16().enumerate() {
            let at = offset + i * 2;
            buf[at..at + 2].copy_from_slice(&unit.to_le_bytes());
        }
    }

    #[test]
    fn layout_constants_match_known_schema() {
        assert_eq!(LINK_HEADER_SIZE, 1108);
        assert_eq!(SEGMENT_SIZE, 5460);
        assert_eq!(OFF_CONTEXT + CTX_MAP_ID, 1136);
        assert_eq!(MUMBLE_LINK_NAME, "MumbleLink");
    }

    #[test]
    fn decodes_crafted_buffer() {
        let buf = craft_buffer(42, [10.0, 0.0, 20.0], 15);
        let link = LinkData::decode(&buf);

        assert_eq!(link.ui_version, 2);
        assert_eq!(link.ui_tick, 42);
        assert_eq!(link.avatar_position, Vec3::new(10.0, 0.0, 20.0));
        assert_eq!(link.context.map_id, 15);
    }

    #[test]
    fn decodes_text_fields_up_to_nul() {
        let mut buf = vec![0u8; LINK_BYTES];
        write_utf16(&mut buf, OFF_NAME, "Guild Wars 2");
        write_utf16(&mut buf, OFF_IDENTITY, "{\"name\":\"Sindrener\",\"map_id\":15}");

        let link = LinkData::decode(&buf);
        assert_eq!(link.name, "Guild Wars 2");
        assert_eq!(link.identity, "{\"name\":\"Sindrener\",\"map_id\":15}");
    }

    #[test]
    fn decodes_full_context_block() {
        let mut buf = vec![0u8; LINK_BYTES];
        let ctx = OFF_CONTEXT;
        buf[ctx + CTX_MAP_ID..ctx + CTX_MAP_ID + 4].copy_from_slice(&1206u32.to_le_bytes());
        buf[ctx + CTX_MAP_TYPE..ctx + CTX_MAP_TYPE + 4].copy_from_slice(&4u32.to_le_bytes());
        buf[ctx + CTX_SHARD_ID..ctx + CTX_SHARD_ID + 4].copy_from_slice(&0x0400_0002u32.to_le_bytes());
        buf[ctx + CTX_BUILD_ID..ctx + CTX_BUILD_ID + 4].copy_from_slice(&150_000u32.to_le_bytes());
        buf[ctx + CTX_COMPASS_WIDTH..ctx + CTX_COMPASS_WIDTH + 2].copy_from_slice(&362u16.to_le_bytes());
        buf[ctx + CTX_MAP_SCALE..ctx + CTX_MAP_SCALE + 4].copy_from_slice(&1.5f32.to_le_bytes());
        buf[ctx + CTX_MOUNT_INDEX] = 7;

        let context = LinkData::decode(&buf).context;
        assert_eq!(context.map_id, 1206);
        assert_eq!(context.map_type, 4);
        assert_eq!(context.shard_id, 0x0400_0002);
        assert_eq!(context.build_id, 150_000);
        assert_eq!(context.compass_width, 362);
        assert_eq!(context.map_scale, 1.5);
        assert_eq!(context.mount_index, 7);
    }

    #[test]
    fn zeroed_buffer_decodes_to_default() {
        let link = LinkData::decode(&vec![0u8; SEGMENT_SIZE]);
        assert_eq!(link.ui_tick, 0);
        assert_eq!(link, LinkData::default());
    }

    #[test]
    fn empty_and_truncated_buffers_decode() {
        assert_eq!(LinkData::decode(&[]).ui_tick, 0);

        // Cut mid-field: the intact prefix decodes, the rest zero-fills.
        let buf = craft_buffer(42, [10.0, 0.0, 20.0], 15);
        let link = LinkData::decode(&buf[..10]);
        assert_eq!(link.ui_tick, 42);
        assert_eq!(link.avatar_position, Vec3::ZERO);
        assert_eq!(link.context.map_id, 0);
    }

    proptest! {
        #[test]
        fn decode_is_total_over_arbitrary_bytes(
            bytes in prop::collection::vec(any::<u8>(), 0..SEGMENT_SIZE)
        ) {
            // Any byte pattern decodes to some LinkData without panicking.
            let link = LinkData::decode(&bytes);
            prop_assert!(link.name.encode_utf16().count() <= TEXT_UNITS);
            prop_assert!(link.identity.encode_utf16().count() <= TEXT_UNITS);
        }

        #[test]
        fn numeric_fields_roundtrip(tick in any::<u32>(), x in any::<f32>(), z in any::<f32>(), map_id in any::<u32>()) {
            let buf = craft_buffer(tick, [x, 0.0, z], map_id);
            let link = LinkData::decode(&buf);
            prop_assert_eq!(link.ui_tick, tick);
            prop_assert_eq!(link.avatar_position.x.to_bits(), x.to_bits());
            prop_assert_eq!(link.avatar_position.z.to_bits(), z.to_bits());
            prop_assert_eq!(link.context.map_id, map_id);
        }
    }
}
