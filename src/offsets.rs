//! Offset tables for one specific Telegram Desktop build's C++ struct
//! layout. Adapting the carver to a different build means constructing a
//! different [`Offsets`], not touching the engine.

/// Byte offset of a field within some C++ object, as observed for the target
/// build.
pub type Offset = usize;

#[derive(Debug, Clone, Copy)]
pub struct PeerOffsets {
    pub id: Offset,
    pub name: Offset,
    pub data_session: Offset,
    pub is_blocked: Offset,
}

#[derive(Debug, Clone, Copy)]
pub struct UserOffsets {
    pub firstname: Offset,
    pub lastname: Offset,
    pub username: Offset,
    pub is_bot: Offset,
    pub phone: Offset,
    pub is_contact: Offset,
    pub bytes_above_phone: usize,
    pub bytes_below_phone: usize,
}

impl UserOffsets {
    /// Total size of the `UserData` neighbourhood window carved around the
    /// phone-number `QString` pointer.
    pub fn subpattern_size(&self) -> usize {
        self.bytes_above_phone + self.bytes_below_phone
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MessageOffsets {
    pub history: Offset,
    pub from: Offset,
    pub text: Offset,
    pub media: Offset,
    pub date: Offset,
    pub timetext: Offset,
}

#[derive(Debug, Clone, Copy)]
pub struct HistoryOffsets {
    pub peer: Offset,
}

#[derive(Debug, Clone, Copy)]
pub struct FileOffsets {
    /// Offset, within a `MediaFile` object, of the pointer to its
    /// `DocumentData`. `filename`/`filetype` are offsets within that
    /// *dereferenced* `DocumentData`, not within the `MediaFile` itself.
    pub document: Offset,
    pub filename: Offset,
    pub filetype: Offset,
}

#[derive(Debug, Clone, Copy)]
pub struct SharedContactOffsets {
    pub firstname: Offset,
    pub lastname: Offset,
    pub phone_number: Offset,
}

#[derive(Debug, Clone, Copy)]
pub struct MediaLocationOffsets {
    pub latitude: Offset,
    pub longitude: Offset,
    pub title: Offset,
    pub description: Offset,
}

/// Full offset table for one Telegram Desktop build, plus the structural
/// constants (inter-user stride, message window size) that go with it.
#[derive(Debug, Clone, Copy)]
pub struct Offsets {
    pub peer: PeerOffsets,
    pub user: UserOffsets,
    pub message: MessageOffsets,
    pub history: HistoryOffsets,
    pub file: FileOffsets,
    pub shared_contact: SharedContactOffsets,
    pub media_location: MediaLocationOffsets,
    /// Distance, in bytes, between the same field of two `UserData` objects
    /// allocated next to each other.
    pub user_stride: usize,
    /// Size of the window read around a `HistoryMessage` candidate, relative
    /// to the `_timeText` QString pointer reference.
    pub message_window_above: usize,
    pub message_window_below: usize,
}

impl Default for Offsets {
    /// The build this spec targets, per spec.md §3.
    fn default() -> Self {
        Offsets {
            peer: PeerOffsets { id: 8, name: 16, data_session: 48, is_blocked: 352 },
            user: UserOffsets {
                firstname: 384,
                lastname: 392,
                username: 400,
                is_bot: 480,
                phone: 560,
                is_contact: 568,
                bytes_above_phone: 35 * 16,
                bytes_below_phone: 16,
            },
            message: MessageOffsets { history: 8, from: 16, text: 48, media: 120, date: 128, timetext: 160 },
            history: HistoryOffsets { peer: 192 },
            file: FileOffsets { document: 16, filename: 80, filetype: 88 },
            shared_contact: SharedContactOffsets { firstname: 24, lastname: 32, phone_number: 40 },
            media_location: MediaLocationOffsets { latitude: 16, longitude: 24, title: 48, description: 56 },
            user_stride: 592,
            message_window_above: 10 * 16,
            message_window_below: 16,
        }
    }
}
