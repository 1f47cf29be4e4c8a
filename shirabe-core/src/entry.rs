use crate::consts::*;
use crate::error::{DwarfError, Result};
use crate::forms::{AttrValue, Attribute};
use crate::info::{DwarfInfo, UnitRef};

/// Tags whose names contribute to an entry's scope string.
const SCOPE_TAGS: [DwTag; 4] = [
    DW_TAG_namespace,
    DW_TAG_structure_type,
    DW_TAG_class_type,
    DW_TAG_union_type,
];

/// One debugging information entry, stored in its unit's arena.
///
/// Parent and children are arena indices rather than owning links, so the
/// back-pointer graph stays cycle-free.
pub struct Entry {
    /// `.debug_info` section offset; unique within the image and stable
    /// for the lifetime of the owning [`DwarfInfo`].
    pub offset: u64,
    pub tag: DwTag,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) attrs: Vec<Attribute>,
}

impl Entry {
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn attr(&self, name: DwAt) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

/// A cheap handle to an entry within a [`DwarfInfo`].
#[derive(Clone, Copy)]
pub struct EntryRef<'a> {
    pub(crate) dwarf: &'a DwarfInfo,
    pub(crate) unit: usize,
    pub(crate) index: usize,
}

impl<'a> EntryRef<'a> {
    fn entry(&self) -> &'a Entry {
        &self.dwarf.unit(self.unit).entries()[self.index]
    }

    pub fn tag(&self) -> DwTag {
        self.entry().tag
    }

    pub fn offset(&self) -> u64 {
        self.entry().offset
    }

    pub fn unit(&self) -> UnitRef<'a> {
        UnitRef {
            dwarf: self.dwarf,
            index: self.unit,
        }
    }

    pub fn attrs(&self) -> &'a [Attribute] {
        &self.entry().attrs
    }

    pub fn attr(&self, name: DwAt) -> Option<&'a Attribute> {
        self.entry().attr(name)
    }

    /// The entry's `DW_AT_name`, when present and string-valued.
    pub fn name(&self) -> Option<&'a str> {
        match &self.attr(DW_AT_name)?.value {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<EntryRef<'a>> {
        let parent = self.entry().parent?;
        Some(EntryRef {
            dwarf: self.dwarf,
            unit: self.unit,
            index: parent,
        })
    }

    /// The entry's children in on-disk declaration order.
    pub fn children(&self) -> Children<'a> {
        Children {
            dwarf: self.dwarf,
            unit: self.unit,
            ids: self.entry().children.iter(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.entry().children.is_empty()
    }

    /// The enclosing namespace/struct/class/union names joined with `::`,
    /// outermost first. Empty when no such ancestor exists; ancestors
    /// without a name attribute are skipped.
    pub fn scope(&self) -> String {
        let mut parts = Vec::new();
        let mut current = self.parent();
        while let Some(entry) = current {
            if SCOPE_TAGS.contains(&entry.tag()) {
                if let Some(name) = entry.name() {
                    parts.push(name);
                }
            }
            current = entry.parent();
        }
        parts.reverse();
        parts.join("::")
    }

    /// Resolves a reference-form attribute of this entry to its target.
    ///
    /// Unit-relative forms resolve within the defining unit; `ref_addr`
    /// resolves by absolute section offset across units. Fails with
    /// `Reference` when no entry exists at the target offset.
    pub fn referenced_entry(&self, attr: &Attribute) -> Result<EntryRef<'a>> {
        match attr.value {
            AttrValue::UnitRef(offset) => self
                .dwarf
                .entry_in_unit(self.unit, offset)
                .ok_or(DwarfError::Reference { offset }),
            AttrValue::SectionRef(offset) => self
                .dwarf
                .entry_at(offset)
                .ok_or(DwarfError::Reference { offset }),
            _ => Err(DwarfError::format(format!(
                "attribute {} ({}) is not a reference",
                attr.name, attr.form
            ))),
        }
    }
}

/// Lazy iterator over an entry's owned children.
pub struct Children<'a> {
    dwarf: &'a DwarfInfo,
    unit: usize,
    ids: std::slice::Iter<'a, usize>,
}

impl<'a> Iterator for Children<'a> {
    type Item = EntryRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.ids.next()?;
        Some(EntryRef {
            dwarf: self.dwarf,
            unit: self.unit,
            index,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}
