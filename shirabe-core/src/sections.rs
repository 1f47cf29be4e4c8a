/// A named section of an ELF image.
///
/// Holds the header fields plus the byte range the section occupies in the
/// image file. `SHT_NOBITS` sections (`.bss`) carry no file bytes; their
/// range is empty.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub sh_type: u32,
    pub flags: u64,
    pub addr: u64,
    pub file_offset: u64,
    pub size: u64,
}

pub const SHT_NOBITS: u32 = 8;

pub const SECTION_DEBUG_INFO: &str = ".debug_info";
pub const SECTION_DEBUG_ABBREV: &str = ".debug_abbrev";
pub const SECTION_DEBUG_STR: &str = ".debug_str";
pub const SECTION_DEBUG_LINE: &str = ".debug_line";

impl Section {
    /// True if the section occupies bytes in the image file.
    pub fn has_file_data(&self) -> bool {
        self.sh_type != SHT_NOBITS
    }

    pub(crate) fn file_range(&self) -> Option<std::ops::Range<usize>> {
        if !self.has_file_data() {
            return None;
        }
        let start = self.file_offset as usize;
        let end = start.checked_add(self.size as usize)?;
        Some(start..end)
    }
}
