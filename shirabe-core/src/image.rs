use crate::error::{DwarfError, Result};
use crate::reader::SliceReader;
use crate::sections::Section;
use std::path::{Path, PathBuf};

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;

/// The fields of the ELF file header this reader cares about.
///
/// Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)
#[derive(Debug, Clone, Copy)]
pub struct ElfHeader {
    /// True for `ELFCLASS64` images, false for `ELFCLASS32`.
    pub is_64: bool,
    /// Object file type (relocatable, executable, shared, core).
    pub e_type: u16,
    /// Target architecture identifier.
    pub e_machine: u16,
    /// Virtual address of the program entry point.
    pub e_entry: u64,
    /// File offset of the section header table.
    pub e_shoff: u64,
    /// Size of one section header table entry.
    pub e_shentsize: u16,
    /// Number of section header table entries.
    pub e_shnum: u16,
    /// Index of the section name string table.
    pub e_shstrndx: u16,
}

impl ElfHeader {
    fn from_reader(r: &mut SliceReader) -> Result<Self> {
        let ident = r.read_bytes(16)?;
        if ident[..4] != ELF_MAGIC {
            return Err(DwarfError::format("bad ELF magic"));
        }
        let is_64 = match ident[4] {
            ELFCLASS32 => false,
            ELFCLASS64 => true,
            class => {
                return Err(DwarfError::format(format!("bad ELF class {class:#x}")));
            }
        };
        if ident[5] != ELFDATA2LSB {
            return Err(DwarfError::format(
                "big-endian images are not supported",
            ));
        }

        let e_type = r.read_u16()?;
        let e_machine = r.read_u16()?;
        let _e_version = r.read_u32()?;
        let (e_entry, _e_phoff, e_shoff) = if is_64 {
            (r.read_u64()?, r.read_u64()?, r.read_u64()?)
        } else {
            (
                u64::from(r.read_u32()?),
                u64::from(r.read_u32()?),
                u64::from(r.read_u32()?),
            )
        };
        let _e_flags = r.read_u32()?;
        let _e_ehsize = r.read_u16()?;
        let _e_phentsize = r.read_u16()?;
        let _e_phnum = r.read_u16()?;
        let e_shentsize = r.read_u16()?;
        let e_shnum = r.read_u16()?;
        let e_shstrndx = r.read_u16()?;

        Ok(ElfHeader {
            is_64,
            e_type,
            e_machine,
            e_entry,
            e_shoff,
            e_shentsize,
            e_shnum,
            e_shstrndx,
        })
    }
}

/// Raw section header fields, before name resolution.
struct RawShdr {
    sh_name: u32,
    sh_type: u32,
    sh_flags: u64,
    sh_addr: u64,
    sh_offset: u64,
    sh_size: u64,
}

impl RawShdr {
    fn from_reader(r: &mut SliceReader, is_64: bool) -> Result<Self> {
        let sh_name = r.read_u32()?;
        let sh_type = r.read_u32()?;
        let (sh_flags, sh_addr, sh_offset, sh_size) = if is_64 {
            (r.read_u64()?, r.read_u64()?, r.read_u64()?, r.read_u64()?)
        } else {
            (
                u64::from(r.read_u32()?),
                u64::from(r.read_u32()?),
                u64::from(r.read_u32()?),
                u64::from(r.read_u32()?),
            )
        };
        // link, info, addralign, entsize are not used here
        if is_64 {
            r.skip(4 + 4 + 8 + 8)?;
        } else {
            r.skip(4 + 4 + 4 + 4)?;
        }
        Ok(RawShdr {
            sh_name,
            sh_type,
            sh_flags,
            sh_addr,
            sh_offset,
            sh_size,
        })
    }
}

/// An opened binary image: the raw file bytes plus the parsed section table.
///
/// Immutable after construction. Debug sections are exposed as byte slices
/// borrowed from the image's own buffer.
pub struct Image {
    path: Option<PathBuf>,
    data: Vec<u8>,
    header: ElfHeader,
    sections: Vec<Section>,
}

impl Image {
    /// Reads and parses the ELF image at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| DwarfError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut image = Self::parse(data)?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    /// Parses an ELF image already loaded into memory.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let header;
        let mut sections = Vec::new();
        {
            let mut r = SliceReader::new(&data);
            header = ElfHeader::from_reader(&mut r)?;

            let shentsize = usize::from(header.e_shentsize);
            let min_shentsize = if header.is_64 { 64 } else { 40 };
            if header.e_shnum > 0 && shentsize < min_shentsize {
                return Err(DwarfError::format(format!(
                    "section header entry size {shentsize} too small"
                )));
            }

            let mut raw = Vec::with_capacity(usize::from(header.e_shnum));
            for i in 0..usize::from(header.e_shnum) {
                r.seek(header.e_shoff as usize + i * shentsize)?;
                raw.push(RawShdr::from_reader(&mut r, header.is_64)?);
            }

            let shstrtab = match raw.get(usize::from(header.e_shstrndx)) {
                Some(s) if usize::from(header.e_shstrndx) > 0 => {
                    let start = s.sh_offset as usize;
                    let end = start
                        .checked_add(s.sh_size as usize)
                        .filter(|&e| e <= data.len())
                        .ok_or_else(|| {
                            DwarfError::format("section name table out of bounds")
                        })?;
                    &data[start..end]
                }
                _ => &[][..],
            };

            for s in &raw {
                let name = section_name(shstrtab, s.sh_name)?.to_string();
                let section = Section {
                    name,
                    sh_type: s.sh_type,
                    flags: s.sh_flags,
                    addr: s.sh_addr,
                    file_offset: s.sh_offset,
                    size: s.sh_size,
                };
                if let Some(range) = section.file_range() {
                    if range.end > data.len() {
                        return Err(DwarfError::format(format!(
                            "section {} extends past end of file",
                            section.name
                        )));
                    }
                }
                sections.push(section);
            }
        }

        Ok(Image {
            path: None,
            data,
            header,
            sections,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the bytes of the named section, or `None` if the image does
    /// not carry it (or it has no file data).
    pub fn section(&self, name: &str) -> Option<&[u8]> {
        let section = self.sections.iter().find(|s| s.name == name)?;
        let range = section.file_range()?;
        self.data.get(range)
    }

    /// Like [`Image::section`] but fails with `SectionNotFound` when absent.
    pub fn require_section(&self, name: &str) -> Result<&[u8]> {
        self.section(name)
            .ok_or_else(|| DwarfError::SectionNotFound(name.to_string()))
    }
}

fn section_name(shstrtab: &[u8], sh_name: u32) -> Result<&str> {
    let start = sh_name as usize;
    if start >= shstrtab.len() {
        // Index 0 with an empty string table is the null section.
        if start == 0 {
            return Ok("");
        }
        return Err(DwarfError::format(format!(
            "section name offset {start:#x} out of bounds"
        )));
    }
    let rest = &shstrtab[start..];
    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| DwarfError::format("unterminated section name"))?;
    std::str::from_utf8(&rest[..nul])
        .map_err(|_| DwarfError::format("section name is not valid utf-8"))
}
