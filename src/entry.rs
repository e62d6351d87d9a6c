use std::path::PathBuf;

pub const PLACEHOLDER_COUNT: usize = 10;

pub const PLACEHOLDER_PALETTE: [u32; 10] = [
    0x2c5aa0, 0xc41e3a, 0x2d8659, 0x8b4513, 0x4b0082, 0xff6347, 0x20b2aa, 0xdaa520, 0x9370db,
    0x1e90ff,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Image { path: PathBuf, name: String },
    Placeholder { color: u32, label: String },
}

/// A single card in the draw. `id` is unique within one loaded set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub id: usize,
    pub kind: EntryKind,
}

impl Entry {
    pub fn image(id: usize, path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            id,
            kind: EntryKind::Image {
                path: path.into(),
                name: name.into(),
            },
        }
    }

    pub fn placeholder(id: usize) -> Self {
        Self {
            id,
            kind: EntryKind::Placeholder {
                color: PLACEHOLDER_PALETTE[id % PLACEHOLDER_PALETTE.len()],
                label: format!("Guest {}", id + 1),
            },
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            EntryKind::Image { name, .. } => name,
            EntryKind::Placeholder { label, .. } => label,
        }
    }
}
