//! DWARF tag, attribute and form constants.
//!
//! The numeric values follow the published DWARF standard (and the GNU
//! vendor range for the `DW_FORM_GNU_*` alt-file forms), so callers written
//! against the standard's numbering interoperate unchanged. Each code is a
//! plain newtype over its numeric value; unknown codes round-trip without
//! loss and render numerically.

#![allow(non_upper_case_globals)]

use std::fmt;

macro_rules! dw_constants {
    ($(#[$meta:meta])* $ty:ident($inner:ty) { $($name:ident = $value:expr,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $ty(pub $inner);

        $(pub const $name: $ty = $ty($value);)+

        impl $ty {
            /// The standard spelling of this code, if it is a known one.
            pub fn static_name(self) -> Option<&'static str> {
                match self {
                    $($name => Some(stringify!($name)),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.static_name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}({:#x})", stringify!($ty), self.0),
                }
            }
        }
    };
}

dw_constants! {
    /// A debugging-information-entry kind.
    DwTag(u64) {
        DW_TAG_array_type = 0x01,
        DW_TAG_class_type = 0x02,
        DW_TAG_enumeration_type = 0x04,
        DW_TAG_formal_parameter = 0x05,
        DW_TAG_lexical_block = 0x0b,
        DW_TAG_member = 0x0d,
        DW_TAG_pointer_type = 0x0f,
        DW_TAG_reference_type = 0x10,
        DW_TAG_compile_unit = 0x11,
        DW_TAG_structure_type = 0x13,
        DW_TAG_subroutine_type = 0x15,
        DW_TAG_typedef = 0x16,
        DW_TAG_union_type = 0x17,
        DW_TAG_unspecified_parameters = 0x18,
        DW_TAG_inheritance = 0x1c,
        DW_TAG_subrange_type = 0x21,
        DW_TAG_base_type = 0x24,
        DW_TAG_const_type = 0x26,
        DW_TAG_enumerator = 0x28,
        DW_TAG_subprogram = 0x2e,
        DW_TAG_template_type_parameter = 0x2f,
        DW_TAG_template_value_parameter = 0x30,
        DW_TAG_variable = 0x34,
        DW_TAG_volatile_type = 0x35,
        DW_TAG_restrict_type = 0x37,
        DW_TAG_namespace = 0x39,
        DW_TAG_unspecified_type = 0x3b,
        DW_TAG_rvalue_reference_type = 0x42,
    }
}

dw_constants! {
    /// An attribute name.
    DwAt(u64) {
        DW_AT_sibling = 0x01,
        DW_AT_location = 0x02,
        DW_AT_name = 0x03,
        DW_AT_byte_size = 0x0b,
        DW_AT_bit_size = 0x0d,
        DW_AT_stmt_list = 0x10,
        DW_AT_low_pc = 0x11,
        DW_AT_high_pc = 0x12,
        DW_AT_language = 0x13,
        DW_AT_comp_dir = 0x1b,
        DW_AT_const_value = 0x1c,
        DW_AT_containing_type = 0x1d,
        DW_AT_inline = 0x20,
        DW_AT_producer = 0x25,
        DW_AT_prototyped = 0x27,
        DW_AT_upper_bound = 0x2f,
        DW_AT_abstract_origin = 0x31,
        DW_AT_accessibility = 0x32,
        DW_AT_artificial = 0x34,
        DW_AT_count = 0x37,
        DW_AT_data_member_location = 0x38,
        DW_AT_decl_file = 0x3a,
        DW_AT_decl_line = 0x3b,
        DW_AT_declaration = 0x3c,
        DW_AT_encoding = 0x3e,
        DW_AT_external = 0x3f,
        DW_AT_frame_base = 0x40,
        DW_AT_specification = 0x47,
        DW_AT_type = 0x49,
        DW_AT_ranges = 0x55,
        DW_AT_linkage_name = 0x6e,
    }
}

dw_constants! {
    /// An attribute value encoding.
    DwForm(u64) {
        DW_FORM_addr = 0x01,
        DW_FORM_block2 = 0x03,
        DW_FORM_block4 = 0x04,
        DW_FORM_data2 = 0x05,
        DW_FORM_data4 = 0x06,
        DW_FORM_data8 = 0x07,
        DW_FORM_string = 0x08,
        DW_FORM_block = 0x09,
        DW_FORM_block1 = 0x0a,
        DW_FORM_data1 = 0x0b,
        DW_FORM_flag = 0x0c,
        DW_FORM_sdata = 0x0d,
        DW_FORM_strp = 0x0e,
        DW_FORM_udata = 0x0f,
        DW_FORM_ref_addr = 0x10,
        DW_FORM_ref1 = 0x11,
        DW_FORM_ref2 = 0x12,
        DW_FORM_ref4 = 0x13,
        DW_FORM_ref8 = 0x14,
        DW_FORM_ref_udata = 0x15,
        DW_FORM_indirect = 0x16,
        DW_FORM_sec_offset = 0x17,
        DW_FORM_exprloc = 0x18,
        DW_FORM_flag_present = 0x19,
        DW_FORM_strx = 0x1a,
        DW_FORM_addrx = 0x1b,
        DW_FORM_ref_sup4 = 0x1c,
        DW_FORM_strp_sup = 0x1d,
        DW_FORM_data16 = 0x1e,
        DW_FORM_line_strp = 0x1f,
        DW_FORM_ref_sig8 = 0x20,
        DW_FORM_implicit_const = 0x21,
        DW_FORM_loclistx = 0x22,
        DW_FORM_rnglistx = 0x23,
        DW_FORM_ref_sup8 = 0x24,
        DW_FORM_strx1 = 0x25,
        DW_FORM_strx2 = 0x26,
        DW_FORM_strx3 = 0x27,
        DW_FORM_strx4 = 0x28,
        DW_FORM_addrx1 = 0x29,
        DW_FORM_addrx2 = 0x2a,
        DW_FORM_addrx3 = 0x2b,
        DW_FORM_addrx4 = 0x2c,
        DW_FORM_GNU_ref_alt = 0x1f20,
        DW_FORM_GNU_strp_alt = 0x1f21,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_render_standard_names() {
        assert_eq!(DW_TAG_namespace.to_string(), "DW_TAG_namespace");
        assert_eq!(DW_AT_byte_size.to_string(), "DW_AT_byte_size");
        assert_eq!(DW_FORM_flag_present.to_string(), "DW_FORM_flag_present");
    }

    #[test]
    fn unknown_codes_render_numerically() {
        assert_eq!(DwTag(0x4090).to_string(), "DwTag(0x4090)");
        assert!(DwForm(0x7777).static_name().is_none());
    }

    #[test]
    fn numbering_matches_the_standard() {
        assert_eq!(DW_TAG_compile_unit.0, 0x11);
        assert_eq!(DW_AT_name.0, 0x03);
        assert_eq!(DW_FORM_ref4.0, 0x13);
        assert_eq!(DW_FORM_GNU_ref_alt.0, 0x1f20);
    }
}
