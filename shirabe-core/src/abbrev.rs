use crate::consts::{DwAt, DwForm, DwTag, DW_FORM_implicit_const};
use crate::error::{DwarfError, Result};
use crate::reader::SliceReader;
use std::collections::HashMap;

/// One (attribute name, form) pair of an abbreviation declaration.
#[derive(Debug, Clone, Copy)]
pub struct AttrSpec {
    pub name: DwAt,
    pub form: DwForm,
    /// Only set for `DW_FORM_implicit_const`: the value lives in the
    /// abbreviation table, not the entry's byte stream.
    pub implicit_const: Option<i64>,
}

/// A decoded abbreviation: the template one abbreviation code expands to.
#[derive(Debug, Clone)]
pub struct AbbrevDecl {
    pub code: u64,
    pub tag: DwTag,
    pub has_children: bool,
    pub attrs: Vec<AttrSpec>,
}

/// The abbreviation table of one compilation unit.
#[derive(Debug, Default)]
pub struct AbbrevTable {
    decls: HashMap<u64, AbbrevDecl>,
}

impl AbbrevTable {
    /// Parses the table starting at `offset` into `.debug_abbrev`, up to its
    /// terminating null code.
    pub fn parse(debug_abbrev: &[u8], offset: u64) -> Result<Self> {
        let mut r = SliceReader::new(debug_abbrev);
        r.seek(offset as usize)?;

        let mut decls = HashMap::new();
        loop {
            let code = r.read_uleb128()?;
            if code == 0 {
                break;
            }
            let tag = DwTag(r.read_uleb128()?);
            let has_children = match r.read_u8()? {
                0 => false,
                1 => true,
                other => {
                    return Err(DwarfError::format(format!(
                        "bad has-children byte {other:#x} in abbreviation {code}"
                    )));
                }
            };

            let mut attrs = Vec::new();
            loop {
                let name = r.read_uleb128()?;
                let form = r.read_uleb128()?;
                if name == 0 && form == 0 {
                    break;
                }
                let form = DwForm(form);
                let implicit_const = if form == DW_FORM_implicit_const {
                    Some(r.read_sleb128()?)
                } else {
                    None
                };
                attrs.push(AttrSpec {
                    name: DwAt(name),
                    form,
                    implicit_const,
                });
            }

            if decls.insert(code, AbbrevDecl {
                code,
                tag,
                has_children,
                attrs,
            })
            .is_some()
            {
                return Err(DwarfError::format(format!(
                    "duplicate abbreviation code {code} at offset {offset:#x}"
                )));
            }
        }

        Ok(AbbrevTable { decls })
    }

    pub fn get(&self, code: u64) -> Option<&AbbrevDecl> {
        self.decls.get(&code)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
