use crate::abbrev::AbbrevTable;
use crate::entry::{Entry, EntryRef};
use crate::error::{DwarfError, Result};
use crate::forms::{decode_value, Attribute, FormContext};
use crate::image::Image;
use crate::reader::SliceReader;
use crate::sections::{SECTION_DEBUG_ABBREV, SECTION_DEBUG_INFO, SECTION_DEBUG_STR};
use std::collections::HashMap;
use std::path::Path;

const DWARF64_SENTINEL: u32 = 0xffff_ffff;
const DW_UT_COMPILE: u8 = 0x01;

/// One `.debug_info` compilation unit: header fields plus its entry arena.
///
/// Entries are stored in decode order, which for DWARF's serialization is
/// preorder; index 0 is always the unit root and the root's parent is none.
pub struct CompilationUnit {
    /// Section offset of the unit header.
    pub offset: u64,
    pub version: u16,
    pub address_size: u8,
    pub abbrev_offset: u64,
    end: u64,
    entries: Vec<Entry>,
    by_offset: HashMap<u64, usize>,
}

impl CompilationUnit {
    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub(crate) fn index_of(&self, offset: u64) -> Option<usize> {
        self.by_offset.get(&offset).copied()
    }

    pub(crate) fn contains(&self, offset: u64) -> bool {
        offset >= self.offset && offset < self.end
    }
}

/// The parsed DWARF data of one image.
///
/// Immutable after [`DwarfInfo::parse`]; safe to share across threads.
pub struct DwarfInfo {
    image: Image,
    units: Vec<CompilationUnit>,
}

impl DwarfInfo {
    /// Parses every compilation unit of the image's `.debug_info` section.
    ///
    /// Fails with `SectionNotFound` when the image carries no debug info
    /// and with `Format` on any malformed unit; no partial result is
    /// returned.
    pub fn parse(image: Image) -> Result<Self> {
        let mut units = Vec::new();
        {
            let debug_info = image.require_section(SECTION_DEBUG_INFO)?;
            let debug_abbrev = image.require_section(SECTION_DEBUG_ABBREV)?;
            let debug_str = image.section(SECTION_DEBUG_STR);

            let mut r = SliceReader::new(debug_info);
            while r.remaining() > 0 {
                units.push(parse_unit(&mut r, debug_abbrev, debug_str)?);
            }
        }
        log::info!(
            "parsed {} compilation unit(s) from {}",
            units.len(),
            image
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string())
        );
        Ok(DwarfInfo { image, units })
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn path(&self) -> Option<&Path> {
        self.image.path()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn units(&self) -> impl Iterator<Item = UnitRef<'_>> {
        (0..self.units.len()).map(move |index| UnitRef { dwarf: self, index })
    }

    /// Looks up an entry by `.debug_info` section offset, in any unit.
    pub fn entry_at(&self, offset: u64) -> Option<EntryRef<'_>> {
        let unit = self.units.iter().position(|u| u.contains(offset))?;
        let index = self.units[unit].index_of(offset)?;
        Some(EntryRef {
            dwarf: self,
            unit,
            index,
        })
    }

    pub(crate) fn unit(&self, index: usize) -> &CompilationUnit {
        &self.units[index]
    }

    pub(crate) fn entry_in_unit(&self, unit: usize, offset: u64) -> Option<EntryRef<'_>> {
        let index = self.units[unit].index_of(offset)?;
        Some(EntryRef {
            dwarf: self,
            unit,
            index,
        })
    }
}

/// A handle to one compilation unit of a [`DwarfInfo`].
#[derive(Clone, Copy)]
pub struct UnitRef<'a> {
    pub(crate) dwarf: &'a DwarfInfo,
    pub(crate) index: usize,
}

impl<'a> UnitRef<'a> {
    fn unit(&self) -> &'a CompilationUnit {
        self.dwarf.unit(self.index)
    }

    /// The unit's root entry (its `DW_TAG_compile_unit` DIE).
    pub fn root(&self) -> EntryRef<'a> {
        EntryRef {
            dwarf: self.dwarf,
            unit: self.index,
            index: 0,
        }
    }

    pub fn offset(&self) -> u64 {
        self.unit().offset
    }

    pub fn version(&self) -> u16 {
        self.unit().version
    }

    pub fn address_size(&self) -> u8 {
        self.unit().address_size
    }

    pub fn entry_count(&self) -> usize {
        self.unit().entries().len()
    }

    /// All entries of the unit in preorder (on-disk) order.
    pub fn entries(&self) -> impl Iterator<Item = EntryRef<'a>> + 'a {
        let dwarf = self.dwarf;
        let unit = self.index;
        (0..self.unit().entries().len()).map(move |index| EntryRef { dwarf, unit, index })
    }

    /// Convenience: the root's name attribute (the source file path).
    pub fn name(&self) -> Option<&'a str> {
        self.root().name()
    }
}

fn parse_unit(
    r: &mut SliceReader,
    debug_abbrev: &[u8],
    debug_str: Option<&[u8]>,
) -> Result<CompilationUnit> {
    let unit_start = r.pos() as u64;
    let unit_length = r.read_u32()?;
    if unit_length == DWARF64_SENTINEL {
        return Err(DwarfError::format("64-bit DWARF format is not supported"));
    }
    let unit_end = r.pos() + unit_length as usize;
    if unit_length as usize > r.remaining() {
        return Err(DwarfError::format(format!(
            "unit at {unit_start:#x} overruns .debug_info"
        )));
    }

    let version = r.read_u16()?;
    if !(2..=5).contains(&version) {
        return Err(DwarfError::format(format!(
            "unsupported DWARF version {version}"
        )));
    }
    let (abbrev_offset, address_size) = if version >= 5 {
        let unit_type = r.read_u8()?;
        if unit_type != DW_UT_COMPILE {
            return Err(DwarfError::format(format!(
                "unsupported unit type {unit_type:#x}"
            )));
        }
        let address_size = r.read_u8()?;
        let abbrev_offset = u64::from(r.read_u32()?);
        (abbrev_offset, address_size)
    } else {
        let abbrev_offset = u64::from(r.read_u32()?);
        let address_size = r.read_u8()?;
        (abbrev_offset, address_size)
    };

    let abbrevs = AbbrevTable::parse(debug_abbrev, abbrev_offset)?;
    let ctx = FormContext {
        version,
        address_size,
        unit_start,
        debug_str,
    };

    let mut entries: Vec<Entry> = Vec::new();
    let mut by_offset = HashMap::new();
    // Indices of entries whose children are still being decoded.
    let mut parents: Vec<usize> = Vec::new();

    while r.pos() < unit_end {
        let die_offset = r.pos() as u64;
        let code = r.read_uleb128()?;
        if code == 0 {
            // Null entry: pop one level of the tree.
            if parents.pop().is_none() {
                return Err(DwarfError::format(format!(
                    "null entry outside any parent at {die_offset:#x}"
                )));
            }
            continue;
        }
        if parents.is_empty() && !entries.is_empty() {
            return Err(DwarfError::format(format!(
                "second root entry at {die_offset:#x}"
            )));
        }

        let decl = abbrevs.get(code).ok_or_else(|| {
            DwarfError::format(format!(
                "abbreviation code {code} at {die_offset:#x} has no table entry"
            ))
        })?;

        let mut attrs = Vec::with_capacity(decl.attrs.len());
        for spec in &decl.attrs {
            let value = decode_value(r, spec, &ctx)?;
            attrs.push(Attribute {
                name: spec.name,
                form: spec.form,
                value,
            });
        }
        if r.pos() > unit_end {
            return Err(DwarfError::format(format!(
                "entry at {die_offset:#x} overruns its unit"
            )));
        }

        let index = entries.len();
        let parent = parents.last().copied();
        if let Some(p) = parent {
            entries[p].children.push(index);
        }
        entries.push(Entry {
            offset: die_offset,
            tag: decl.tag,
            parent,
            children: Vec::new(),
            attrs,
        });
        by_offset.insert(die_offset, index);
        if decl.has_children {
            parents.push(index);
        }
    }

    if entries.is_empty() {
        return Err(DwarfError::format(format!(
            "unit at {unit_start:#x} has no entries"
        )));
    }
    if !parents.is_empty() {
        return Err(DwarfError::format(format!(
            "unit at {unit_start:#x} ends inside an entry's children"
        )));
    }

    Ok(CompilationUnit {
        offset: unit_start,
        version,
        address_size,
        abbrev_offset,
        end: unit_end as u64,
        entries,
        by_offset,
    })
}
