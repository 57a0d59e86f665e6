//! The nine decoded sections of a DLC file, held in fixed order.

use tracing::debug;

use crate::{
    error::{DlcError, Result},
    formats::{
        amf::AudioStore, cel::CelStore, opaque::OpaqueSection, pal::PaletteTable,
        seq::SequenceTable, spr::SpriteGraph,
    },
};

use super::header::{Header, SectionId, SECTION_COUNT};

/// Borrowed view of one section, tagged by kind.
#[derive(Debug, Clone, Copy)]
pub enum Section<'a> {
    Pal(&'a PaletteTable),
    Spr(&'a SpriteGraph),
    Cel(&'a CelStore),
    Xls(&'a OpaqueSection),
    Amf(&'a AudioStore),
    Apl(&'a OpaqueSection),
    Lps(&'a OpaqueSection),
    Seq(&'a SequenceTable),
    Mtr(&'a OpaqueSection),
}

impl Section<'_> {
    pub fn id(&self) -> SectionId {
        match self {
            Section::Pal(_) => SectionId::Pal,
            Section::Spr(_) => SectionId::Spr,
            Section::Cel(_) => SectionId::Cel,
            Section::Xls(_) => SectionId::Xls,
            Section::Amf(_) => SectionId::Amf,
            Section::Apl(_) => SectionId::Apl,
            Section::Lps(_) => SectionId::Lps,
            Section::Seq(_) => SectionId::Seq,
            Section::Mtr(_) => SectionId::Mtr,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Section::Pal(s) => s.to_bytes(),
            Section::Spr(s) => s.to_bytes(),
            Section::Cel(s) => s.to_bytes(),
            Section::Amf(s) => s.to_bytes(),
            Section::Seq(s) => s.to_bytes(),
            Section::Xls(s) | Section::Apl(s) | Section::Lps(s) | Section::Mtr(s) => s.to_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sections {
    pub pal: PaletteTable,
    pub spr: SpriteGraph,
    pub cel: CelStore,
    pub xls: OpaqueSection,
    pub amf: AudioStore,
    pub apl: OpaqueSection,
    pub lps: OpaqueSection,
    pub seq: SequenceTable,
    pub mtr: OpaqueSection,
}

impl Sections {
    /// Decode every section named by `header` out of the whole file `data`.
    ///
    /// Each typed section must re-encode to exactly its source bytes; anything else is
    /// reported as malformed so that an unmodified document always rebuilds identically.
    pub fn decode(header: &Header, data: &[u8]) -> Result<Self> {
        let slice = |id: SectionId| {
            let entry = header.entry(id);
            &data[entry.start()..entry.end()]
        };

        let sections = Sections {
            pal: PaletteTable::from_bytes(slice(SectionId::Pal))?,
            spr: SpriteGraph::from_bytes(slice(SectionId::Spr))?,
            cel: CelStore::from_bytes(slice(SectionId::Cel))?,
            xls: OpaqueSection::from_bytes(slice(SectionId::Xls)),
            amf: AudioStore::from_bytes(slice(SectionId::Amf))?,
            apl: OpaqueSection::from_bytes(slice(SectionId::Apl)),
            lps: OpaqueSection::from_bytes(slice(SectionId::Lps)),
            seq: SequenceTable::from_bytes(slice(SectionId::Seq))?,
            mtr: OpaqueSection::from_bytes(slice(SectionId::Mtr)),
        };

        for section in sections.iter() {
            let source = slice(section.id());
            if section.to_bytes() != source {
                return Err(DlcError::MalformedSection {
                    id: section.id(),
                    reason: "section does not re-encode to its source bytes".to_string(),
                });
            }
            debug!("{}: {} bytes", section.id(), source.len());
        }

        Ok(sections)
    }

    /// All sections in file order.
    pub fn iter(&self) -> impl Iterator<Item = Section<'_>> {
        let all: [Section<'_>; SECTION_COUNT] = [
            Section::Pal(&self.pal),
            Section::Spr(&self.spr),
            Section::Cel(&self.cel),
            Section::Xls(&self.xls),
            Section::Amf(&self.amf),
            Section::Apl(&self.apl),
            Section::Lps(&self.lps),
            Section::Seq(&self.seq),
            Section::Mtr(&self.mtr),
        ];
        all.into_iter()
    }

    pub fn get(&self, id: SectionId) -> Section<'_> {
        match id {
            SectionId::Pal => Section::Pal(&self.pal),
            SectionId::Spr => Section::Spr(&self.spr),
            SectionId::Cel => Section::Cel(&self.cel),
            SectionId::Xls => Section::Xls(&self.xls),
            SectionId::Amf => Section::Amf(&self.amf),
            SectionId::Apl => Section::Apl(&self.apl),
            SectionId::Lps => Section::Lps(&self.lps),
            SectionId::Seq => Section::Seq(&self.seq),
            SectionId::Mtr => Section::Mtr(&self.mtr),
        }
    }

    /// Cross-section reference checks run before every build.
    pub fn validate(&self) -> Result<()> {
        self.spr.validate(self.cel.len(), self.pal.len())?;
        self.seq.validate(self.amf.len())
    }
}
