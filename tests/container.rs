mod common;

use std::fs;

use furby_dlc::{
    dlc::{HEADER_LEN, SECTION_COUNT},
    formats::{
        cel::{BLANK_CEL, TRANSPARENT_CEL},
        spr::{Frame, Quadrant},
    },
    Dlc, DlcError, SectionId,
};

use common::*;

#[test]
fn untouched_file_rebuilds_identically() {
    let dir = tempfile::tempdir().unwrap();
    let source = sample_bytes();
    let input = write(dir.path(), "in.dlc", &source);
    let output = dir.path().join("out.dlc");

    let dlc = Dlc::load(&input).unwrap();
    dlc.build(&output).unwrap();

    let rebuilt = fs::read(&output).unwrap();
    assert_eq!(rebuilt.len(), source.len());
    assert_eq!(rebuilt, source);
    assert_eq!(Dlc::load(&output).unwrap().section_ids(), dlc.section_ids());
}

#[test]
fn padding_and_tail_survive_a_rebuild() {
    let source = assemble(&sample_sections(), 4, b"tail");
    let dlc = Dlc::from_bytes(&source).unwrap();
    assert_eq!(dlc.to_bytes().unwrap(), source);
}

#[test]
fn loaded_document_has_nine_sections_in_order() {
    let dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    let ids = dlc.section_ids();

    assert_eq!(ids.len(), SECTION_COUNT);
    assert_eq!(ids, SectionId::ALL.to_vec());
    let names: Vec<String> = ids.iter().map(ToString::to_string).collect();
    assert_eq!(
        names,
        ["PAL", "SPR", "CEL", "XLS", "AMF", "APL", "LPS", "SEQ", "MTR"]
    );
}

#[test]
fn typed_sections_are_decoded() {
    let dlc = Dlc::from_bytes(&sample_bytes()).unwrap();

    assert_eq!(dlc.palettes().unwrap().len(), PALETTES);
    assert_eq!(dlc.cels().unwrap().len(), CELS);
    assert_eq!(dlc.sprites().unwrap().frames.len(), 3);
    assert_eq!(dlc.sprites().unwrap().playlist_frames(0).unwrap(), &[0, 1, 2]);
    assert_eq!(dlc.sequences().unwrap().len(), SEQUENCES);
    assert_eq!(dlc.sequences().unwrap().terminator, TERMINATOR);
    assert_eq!(dlc.audio().unwrap().len(), TRACK_LENGTHS.len());
    assert_eq!(dlc.header().unwrap().version(), 2);
}

#[test]
fn empty_sections_of_opaque_kind_are_accepted() {
    let mut sections = sample_sections();
    sections[3].clear();
    sections[8].clear();
    sections[2].clear();
    // Frames would dangle without cels
    sections[1] = vec![0, 0, 0, 0];

    let source = assemble(&sections, 0, &[]);
    let dlc = Dlc::from_bytes(&source).unwrap();
    assert!(dlc.cels().unwrap().is_empty());
    assert!(dlc.cels().unwrap().cel(TRANSPARENT_CEL).is_err());
    assert_eq!(dlc.to_bytes().unwrap(), source);
}

#[test]
fn structural_errors_abort_the_load() {
    let good = sample_bytes();

    let mut bad_magic = good.clone();
    bad_magic[..4].copy_from_slice(b"NOPE");
    assert!(matches!(
        Dlc::from_bytes(&bad_magic),
        Err(DlcError::MalformedHeader(_))
    ));

    let mut unknown = good.clone();
    unknown[8 + 12 * 5..][..4].copy_from_slice(b"WAT\0");
    assert!(matches!(
        Dlc::from_bytes(&unknown),
        Err(DlcError::UnknownSectionId { slot: 5, .. })
    ));

    assert!(matches!(
        Dlc::from_bytes(&good[..good.len() - 1]),
        Err(DlcError::TruncatedSection { id: SectionId::Mtr, .. })
    ));

    assert!(matches!(
        Dlc::from_bytes(&good[..HEADER_LEN - 10]),
        Err(DlcError::MalformedHeader(_))
    ));
}

#[test]
fn malformed_section_contents_abort_the_load() {
    let mut sections = sample_sections();
    sections[0].truncate(300);
    assert!(matches!(
        Dlc::from_bytes(&assemble(&sections, 0, &[])),
        Err(DlcError::MalformedSection { id: SectionId::Pal, .. })
    ));

    let mut sections = sample_sections();
    sections[7].clear();
    assert!(matches!(
        Dlc::from_bytes(&assemble(&sections, 0, &[])),
        Err(DlcError::MalformedSection { id: SectionId::Seq, .. })
    ));
}

#[test]
fn minify_rejects_unaligned_lengths_without_mutation() {
    let mut dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    let before = dlc.to_bytes().unwrap();

    assert!(matches!(dlc.minify(100), Err(DlcError::InvalidAlignment(100))));
    assert_eq!(dlc.to_bytes().unwrap(), before);

    dlc.minify(96).unwrap();
    let tracks = &dlc.audio().unwrap().tracks;
    assert!(tracks.iter().all(|t| t.len() <= 96));
    assert_eq!(tracks[1].len(), 96);
    assert_eq!(tracks[2].len(), 40);
}

#[test]
fn minified_file_shrinks_and_reloads() {
    let source = sample_bytes();
    let mut dlc = Dlc::from_bytes(&source).unwrap();
    dlc.minify(64).unwrap();

    let rebuilt = dlc.to_bytes().unwrap();
    assert_eq!(rebuilt.len(), source.len() - (200 - 64) - (96 - 64));

    let reloaded = Dlc::from_bytes(&rebuilt).unwrap();
    assert_eq!(reloaded.audio().unwrap().tracks[0].len(), 64);
    let amf = reloaded.header().unwrap().entry(SectionId::Amf);
    let seq = reloaded.header().unwrap().entry(SectionId::Seq);
    assert!(seq.offset > amf.offset);
}

#[test]
fn dangling_cel_reference_fails_build_and_keeps_destination() {
    let dir = tempfile::tempdir().unwrap();
    let output = write(dir.path(), "out.dlc", b"previous build");

    let mut dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    // Rebuild the cel list as the two reserved slots only
    dlc.cels_mut().unwrap().truncate(BLANK_CEL + 1);

    assert!(matches!(
        dlc.build(&output),
        Err(DlcError::DanglingReference { owner: "frame", target: "cel", .. })
    ));
    assert_eq!(fs::read(&output).unwrap(), b"previous build");
    assert!(!dir.path().join("out.dlc.tmp").exists());
}

#[test]
fn failed_replace_leaves_destination_and_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    // A directory in the way makes the final rename fail after the temp file is written
    let output = dir.path().join("out.dlc");
    fs::create_dir(&output).unwrap();
    let inner = write(&output, "keep.txt", b"still here");

    let dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    assert!(matches!(dlc.build(&output), Err(DlcError::Io(_))));

    assert!(output.is_dir());
    assert_eq!(fs::read(&inner).unwrap(), b"still here");
    assert!(!dir.path().join("out.dlc.tmp").exists());
}

#[test]
fn rebuild_replaces_an_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = write(dir.path(), "out.dlc", b"previous build");

    let dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    dlc.build(&output).unwrap();

    assert_eq!(fs::read(&output).unwrap(), sample_bytes());
    assert!(!dir.path().join("out.dlc.tmp").exists());
}

#[test]
fn dangling_palette_and_playlist_references_fail_build() {
    let mut dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    dlc.sprites_mut()
        .unwrap()
        .set_frame(0, Frame::uniform(2, PALETTES as u16).quadrants)
        .unwrap();
    assert!(matches!(
        dlc.to_bytes(),
        Err(DlcError::DanglingReference { target: "palette", .. })
    ));

    let mut dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    dlc.sprites_mut().unwrap().set_playlist_frame(1, 0, 3).unwrap();
    assert!(matches!(
        dlc.to_bytes(),
        Err(DlcError::DanglingReference { owner: "playlist", .. })
    ));
}

#[test]
fn cel_alias_and_frame_edits_rebuild() {
    let mut dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    dlc.cels_mut().unwrap().alias(BLANK_CEL, 17).unwrap();

    let sprites = dlc.sprites_mut().unwrap();
    let touched = sprites
        .retarget_playlist(0, 1..3, Frame::from_cel_run(14, 5).unwrap().quadrants)
        .unwrap();
    assert_eq!(touched, 2);
    assert_eq!(sprites.palettes_in_use(), vec![0, 1, 5]);

    let reloaded = Dlc::from_bytes(&dlc.to_bytes().unwrap()).unwrap();
    assert_eq!(
        reloaded.cels().unwrap().cel(BLANK_CEL).unwrap(),
        reloaded.cels().unwrap().cel(17).unwrap()
    );
    let frame = reloaded.sprites().unwrap().frame(2).unwrap();
    assert_eq!(frame.quadrants[3], Quadrant::new(17, 5));
}

#[test]
fn fingerprints_follow_section_changes() {
    let mut dlc = Dlc::from_bytes(&sample_bytes()).unwrap();
    let before = dlc.fingerprints().unwrap();
    assert_eq!(before.len(), SECTION_COUNT);

    dlc.minify(8).unwrap();
    let after = dlc.fingerprints().unwrap();
    for ((id, a), (_, b)) in before.iter().zip(&after) {
        assert_eq!(a == b, *id != SectionId::Amf, "{}", id);
    }
}

#[test]
fn new_document_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let dlc = Dlc::new();
    assert!(dlc.section_ids().is_empty());
    assert!(dlc.header().is_none());
    assert!(matches!(
        dlc.build(dir.path().join("x.dlc")),
        Err(DlcError::NotLoaded)
    ));
    assert!(!dir.path().join("x.dlc").exists());
}
