//! Attribute value decoding, one decoder per on-disk form.
//!
//! The policy for forms this reader does not interpret is uniform: when the
//! encoded width is known the bytes are consumed, a diagnostic is logged,
//! and the attribute decodes to [`AttrValue::Absent`]. That covers the GNU
//! alt-file forms too (they need a second image this reader does not
//! track). Only a form whose width cannot be determined aborts the unit,
//! since the cursor cannot advance past it.

use crate::abbrev::AttrSpec;
use crate::consts::*;
use crate::error::{DwarfError, Result};
use crate::reader::SliceReader;

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// `DW_FORM_addr`: a target address.
    Address(u64),
    /// The arithmetic data forms, sign-extended.
    Signed(i64),
    /// `DW_FORM_udata` and section offsets.
    Unsigned(u64),
    /// Inline or `.debug_str` string, owned.
    Str(String),
    /// Unit-relative reference, stored as a `.debug_info` section offset.
    /// Resolved lazily via [`crate::EntryRef::referenced_entry`].
    UnitRef(u64),
    /// `DW_FORM_ref_addr`: a `.debug_info` section offset, possibly in
    /// another unit. Resolved lazily.
    SectionRef(u64),
    /// Flag forms.
    Flag(bool),
    /// A form this reader consumed but does not interpret.
    Absent,
}

/// A decoded attribute of a debugging information entry.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: DwAt,
    pub form: DwForm,
    pub value: AttrValue,
}

/// Per-unit state the form decoders need.
pub(crate) struct FormContext<'a> {
    pub version: u16,
    pub address_size: u8,
    /// Section offset of the owning unit's header.
    pub unit_start: u64,
    pub debug_str: Option<&'a [u8]>,
}

/// Decodes one attribute value from the entry byte stream.
///
/// `r` is positioned at the value's first byte; on return it is positioned
/// past the value regardless of whether the form was interpreted.
pub(crate) fn decode_value(
    r: &mut SliceReader,
    spec: &AttrSpec,
    ctx: &FormContext,
) -> Result<AttrValue> {
    decode_form(r, spec.name, spec.form, spec.implicit_const, ctx, 0)
}

fn decode_form(
    r: &mut SliceReader,
    name: DwAt,
    form: DwForm,
    implicit_const: Option<i64>,
    ctx: &FormContext,
    depth: u8,
) -> Result<AttrValue> {
    let value = match form {
        DW_FORM_addr => AttrValue::Address(read_address(r, ctx)?),

        DW_FORM_data1 => AttrValue::Signed(i64::from(r.read_u8()? as i8)),
        DW_FORM_data2 => AttrValue::Signed(i64::from(r.read_u16()? as i16)),
        DW_FORM_data4 => AttrValue::Signed(i64::from(r.read_u32()? as i32)),
        DW_FORM_data8 => AttrValue::Signed(r.read_u64()? as i64),
        DW_FORM_sdata => AttrValue::Signed(r.read_sleb128()?),
        DW_FORM_udata => AttrValue::Unsigned(r.read_uleb128()?),
        DW_FORM_implicit_const => {
            let value = implicit_const.ok_or_else(|| {
                DwarfError::format("implicit_const form without a table value")
            })?;
            AttrValue::Signed(value)
        }

        DW_FORM_string => AttrValue::Str(r.read_cstr()?.to_string()),
        DW_FORM_strp => read_strp(r, ctx)?,

        DW_FORM_ref1 => AttrValue::UnitRef(ctx.unit_start + u64::from(r.read_u8()?)),
        DW_FORM_ref2 => AttrValue::UnitRef(ctx.unit_start + u64::from(r.read_u16()?)),
        DW_FORM_ref4 => AttrValue::UnitRef(ctx.unit_start + u64::from(r.read_u32()?)),
        DW_FORM_ref8 => AttrValue::UnitRef(ctx.unit_start + r.read_u64()?),
        DW_FORM_ref_udata => AttrValue::UnitRef(ctx.unit_start + r.read_uleb128()?),
        DW_FORM_ref_addr => {
            // Offset-sized from DWARF 3 on; address-sized in DWARF 2.
            let offset = if ctx.version >= 3 {
                u64::from(r.read_u32()?)
            } else {
                read_address(r, ctx)?
            };
            AttrValue::SectionRef(offset)
        }

        DW_FORM_flag_present => AttrValue::Flag(true),
        DW_FORM_flag => AttrValue::Flag(r.read_u8()? != 0),

        DW_FORM_sec_offset => AttrValue::Unsigned(u64::from(r.read_u32()?)),

        DW_FORM_indirect => {
            if depth > 0 {
                return Err(DwarfError::format("nested DW_FORM_indirect"));
            }
            let real = DwForm(r.read_uleb128()?);
            return decode_form(r, name, real, None, ctx, depth + 1);
        }

        // Block and expression forms: length-prefixed, skipped.
        DW_FORM_exprloc | DW_FORM_block => {
            let len = r.read_uleb128()? as usize;
            r.skip(len)?;
            unhandled(name, form)
        }
        DW_FORM_block1 => {
            let len = usize::from(r.read_u8()?);
            r.skip(len)?;
            unhandled(name, form)
        }
        DW_FORM_block2 => {
            let len = usize::from(r.read_u16()?);
            r.skip(len)?;
            unhandled(name, form)
        }
        DW_FORM_block4 => {
            let len = r.read_u32()? as usize;
            r.skip(len)?;
            unhandled(name, form)
        }

        // Alt-file references need a second image this reader does not track.
        DW_FORM_GNU_ref_alt | DW_FORM_GNU_strp_alt => {
            r.skip(4)?;
            unhandled(name, form)
        }

        // Known-width forms this reader does not interpret.
        DW_FORM_line_strp | DW_FORM_strp_sup | DW_FORM_ref_sup4 => {
            r.skip(4)?;
            unhandled(name, form)
        }
        DW_FORM_ref_sig8 | DW_FORM_ref_sup8 => {
            r.skip(8)?;
            unhandled(name, form)
        }
        DW_FORM_data16 => {
            r.skip(16)?;
            unhandled(name, form)
        }
        DW_FORM_strx | DW_FORM_addrx | DW_FORM_loclistx | DW_FORM_rnglistx => {
            r.read_uleb128()?;
            unhandled(name, form)
        }
        DW_FORM_strx1 | DW_FORM_addrx1 => {
            r.skip(1)?;
            unhandled(name, form)
        }
        DW_FORM_strx2 | DW_FORM_addrx2 => {
            r.skip(2)?;
            unhandled(name, form)
        }
        DW_FORM_strx3 | DW_FORM_addrx3 => {
            r.skip(3)?;
            unhandled(name, form)
        }
        DW_FORM_strx4 | DW_FORM_addrx4 => {
            r.skip(4)?;
            unhandled(name, form)
        }

        // Unknown width: the cursor cannot advance past this.
        other => {
            return Err(DwarfError::format(format!(
                "unknown form {other} for attribute {name}"
            )));
        }
    };
    Ok(value)
}

fn unhandled(name: DwAt, form: DwForm) -> AttrValue {
    log::warn!("no handler for form {form} in attribute {name}");
    AttrValue::Absent
}

fn read_address(r: &mut SliceReader, ctx: &FormContext) -> Result<u64> {
    match ctx.address_size {
        8 => r.read_u64(),
        4 => r.read_u32().map(u64::from),
        2 => r.read_u16().map(u64::from),
        other => Err(DwarfError::format(format!(
            "unsupported address size {other}"
        ))),
    }
}

fn read_strp(r: &mut SliceReader, ctx: &FormContext) -> Result<AttrValue> {
    let offset = r.read_u32()? as usize;
    let Some(debug_str) = ctx.debug_str else {
        log::warn!("strp attribute but image has no .debug_str section");
        return Ok(AttrValue::Absent);
    };
    if offset >= debug_str.len() {
        return Err(DwarfError::format(format!(
            "string offset {offset:#x} past end of .debug_str"
        )));
    }
    let mut sr = SliceReader::new(debug_str);
    sr.seek(offset)?;
    Ok(AttrValue::Str(sr.read_cstr()?.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(debug_str: Option<&'a [u8]>) -> FormContext<'a> {
        FormContext {
            version: 4,
            address_size: 8,
            unit_start: 0x100,
            debug_str,
        }
    }

    fn spec(form: DwForm) -> AttrSpec {
        AttrSpec {
            name: DW_AT_name,
            form,
            implicit_const: None,
        }
    }

    fn decode_one(form: DwForm, bytes: &[u8]) -> AttrValue {
        let mut r = SliceReader::new(bytes);
        decode_value(&mut r, &spec(form), &ctx(None)).unwrap()
    }

    #[test]
    fn flag_present_is_true_without_consuming_bytes() {
        let mut r = SliceReader::new(&[0xff]);
        let v = decode_value(&mut r, &spec(DW_FORM_flag_present), &ctx(None)).unwrap();
        assert_eq!(v, AttrValue::Flag(true));
        assert_eq!(r.pos(), 0);
    }

    #[test]
    fn flag_is_false_only_for_zero() {
        assert_eq!(decode_one(DW_FORM_flag, &[0]), AttrValue::Flag(false));
        assert_eq!(decode_one(DW_FORM_flag, &[1]), AttrValue::Flag(true));
        assert_eq!(decode_one(DW_FORM_flag, &[0x80]), AttrValue::Flag(true));
    }

    #[test]
    fn data_forms_sign_extend() {
        assert_eq!(decode_one(DW_FORM_data1, &[0xff]), AttrValue::Signed(-1));
        assert_eq!(decode_one(DW_FORM_data1, &[0x7f]), AttrValue::Signed(127));
        assert_eq!(
            decode_one(DW_FORM_data2, &[0xfe, 0xff]),
            AttrValue::Signed(-2)
        );
        assert_eq!(
            decode_one(DW_FORM_data4, &[0x2a, 0, 0, 0]),
            AttrValue::Signed(42)
        );
    }

    #[test]
    fn udata_stays_unsigned() {
        assert_eq!(
            decode_one(DW_FORM_udata, &[0xe5, 0x8e, 0x26]),
            AttrValue::Unsigned(624_485)
        );
    }

    #[test]
    fn refs_are_unit_relative() {
        assert_eq!(
            decode_one(DW_FORM_ref4, &[0x10, 0, 0, 0]),
            AttrValue::UnitRef(0x110)
        );
        assert_eq!(
            decode_one(DW_FORM_ref_addr, &[0x44, 0, 0, 0]),
            AttrValue::SectionRef(0x44)
        );
    }

    #[test]
    fn inline_and_indirect_strings() {
        assert_eq!(
            decode_one(DW_FORM_string, b"hi\0"),
            AttrValue::Str("hi".into())
        );

        let debug_str = b"zero\0one\0";
        let mut r = SliceReader::new(&[5, 0, 0, 0]);
        let v = decode_value(&mut r, &spec(DW_FORM_strp), &ctx(Some(debug_str))).unwrap();
        assert_eq!(v, AttrValue::Str("one".into()));
    }

    #[test]
    fn alt_file_forms_decode_to_absent() {
        assert_eq!(
            decode_one(DW_FORM_GNU_ref_alt, &[1, 2, 3, 4]),
            AttrValue::Absent
        );
        assert_eq!(
            decode_one(DW_FORM_GNU_strp_alt, &[1, 2, 3, 4]),
            AttrValue::Absent
        );
    }

    #[test]
    fn exprloc_is_skipped_whole() {
        let mut r = SliceReader::new(&[2, 0x91, 0x00, 0xaa]);
        let v = decode_value(&mut r, &spec(DW_FORM_exprloc), &ctx(None)).unwrap();
        assert_eq!(v, AttrValue::Absent);
        assert_eq!(r.pos(), 3);
    }

    #[test]
    fn unknown_form_is_a_hard_error() {
        let mut r = SliceReader::new(&[0]);
        assert!(decode_value(&mut r, &spec(DwForm(0x6666)), &ctx(None)).is_err());
    }
}
