//! Synthetic DLC files assembled byte by byte.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use furby_dlc::{dlc::HEADER_LEN, ActionCode, ActionMap, SectionId};

pub const TERMINATOR: u16 = 0xFFFF;
pub const PALETTES: usize = 6;
pub const CELS: usize = 18;
pub const SEQUENCES: usize = 51;
pub const TRACK_LENGTHS: [usize; 3] = [200, 96, 40];

pub const HELLO: ActionCode = ActionCode::new(75, 0, 0, 3);
pub const GIGGLE: ActionCode = ActionCode::new(75, 0, 4, 4);
pub const SNORE: ActionCode = ActionCode::new(75, 0, 3, 4);

fn u16s(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

pub fn pal_section(count: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for p in 0..count {
        for c in 0..64u8 {
            out.extend([c, p as u8, c.wrapping_mul(3), 0]);
        }
    }
    out
}

pub fn cel_section(count: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for c in 0..count {
        let fill = match c {
            0 => 0,
            1 => 1,
            _ => (c % 64) as u8,
        };
        out.extend(vec![fill; 4096]);
    }
    out
}

/// Three frames and two playlists.
pub fn spr_section() -> Vec<u8> {
    let frames: [[u16; 8]; 3] = [
        [2, 0, 3, 0, 4, 1, 5, 1],
        [6, 2, 7, 2, 8, 3, 9, 3],
        [1, 0, 1, 0, 0, 0, 0, 0],
    ];
    let mut words = vec![frames.len() as u16, 2];
    for frame in frames {
        words.extend(frame);
    }
    words.extend([3, 0, 1, 2]);
    words.extend([2, 1, 1]);
    u16s(&words)
}

pub fn seq_section(terminator: u16, count: usize) -> Vec<u8> {
    let mut words = vec![count as u16, terminator];
    for i in 0..count {
        match i % 3 {
            0 => words.extend([0x8401, i as u16]),
            1 => words.extend([0x20]),
            _ => {}
        }
        words.push(terminator);
    }
    u16s(&words)
}

pub fn amf_section(lengths: &[usize]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend((lengths.len() as u32).to_le_bytes());
    for &len in lengths {
        out.extend((len as u32).to_le_bytes());
    }
    for (i, &len) in lengths.iter().enumerate() {
        out.extend((0..len).map(|b| (b as u8).wrapping_add(i as u8 * 40)));
    }
    out
}

pub fn sample_sections() -> [Vec<u8>; 9] {
    [
        pal_section(PALETTES),
        spr_section(),
        cel_section(CELS),
        b"xls-table".to_vec(),
        amf_section(&TRACK_LENGTHS),
        vec![0xA0; 12],
        vec![0x1F; 7],
        seq_section(TERMINATOR, SEQUENCES),
        b"MTR!".to_vec(),
    ]
}

/// Header plus sections, with `gap` padding bytes before each section and `tail` after.
pub fn assemble(sections: &[Vec<u8>; 9], gap: usize, tail: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(*b"DLC\0");
    out.extend(2u32.to_le_bytes());

    let mut offset = HEADER_LEN;
    for (id, bytes) in SectionId::ALL.iter().zip(sections) {
        offset += gap;
        out.extend(id.tag());
        out.extend((offset as u32).to_le_bytes());
        out.extend((bytes.len() as u32).to_le_bytes());
        offset += bytes.len();
    }
    for bytes in sections {
        out.extend(vec![0xCC; gap]);
        out.extend(bytes);
    }
    out.extend(tail);
    out
}

pub fn sample_bytes() -> Vec<u8> {
    assemble(&sample_sections(), 0, &[])
}

pub fn sample_actions() -> ActionMap {
    let mut actions = ActionMap::new();
    actions.insert(HELLO, 22);
    actions.insert(GIGGLE, 15);
    actions.insert(SNORE, 50);
    actions
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
