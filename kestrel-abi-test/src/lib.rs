//! ABI compatibility checks for the kestrel tree types
//!
//! C code embeds `struct rb_node` and walks it directly, so the Rust layout is
//! part of the contract. `assert_layout!` fails the build on a mismatch; the
//! runtime helper reports every mismatch of one struct at once.

use core::mem::{align_of, size_of};

use kestrel_rbtree::{RbColor, RbEntry, RbNode, RbRoot};

/// Fail the build unless `$ty` has the given size and alignment, and each
/// listed field sits at its offset.
#[macro_export]
macro_rules! assert_layout {
    ($ty:ty, size = $size:expr, align = $align:expr $(, $field:ident @ $offset:expr)*) => {
        const _: () = {
            assert!(
                ::core::mem::size_of::<$ty>() == $size,
                concat!("size of ", stringify!($ty)),
            );
            assert!(
                ::core::mem::align_of::<$ty>() == $align,
                concat!("alignment of ", stringify!($ty)),
            );
            $(
                assert!(
                    ::memoffset::offset_of!($ty, $field) == $offset,
                    concat!("offset of ", stringify!($ty), "::", stringify!($field)),
                );
            )*
        };
    };
}

const WORD: usize = size_of::<usize>();

assert_layout!(RbNode, size = 4 * WORD, align = WORD,
    rb_parent @ 0, rb_color @ WORD, rb_child @ 2 * WORD);
assert_layout!(RbRoot, size = WORD, align = WORD, rb_node @ 0);
assert_layout!(
    RbColor,
    size = size_of::<core::ffi::c_int>(),
    align = align_of::<core::ffi::c_int>()
);
assert_layout!(RbEntry<usize>, size = 5 * WORD, align = WORD);

/// Outcome of comparing one Rust struct against its C counterpart
#[derive(Debug, PartialEq, Eq)]
pub struct AbiCompatResult {
    pub struct_name: &'static str,
    pub size_match: bool,
    pub align_match: bool,
    /// Index of the first field whose offset differs, if any
    pub field_mismatch: Option<usize>,
}

impl AbiCompatResult {
    pub fn is_compatible(&self) -> bool {
        self.size_match && self.align_match && self.field_mismatch.is_none()
    }
}

/// Compare `T` against a C layout
///
/// `fields` pairs each Rust field offset with the offset C reports for it.
pub fn verify_struct_layout<T>(
    name: &'static str,
    expected_size: usize,
    expected_align: usize,
    fields: &[(usize, usize)],
) -> AbiCompatResult {
    AbiCompatResult {
        struct_name: name,
        size_match: size_of::<T>() == expected_size,
        align_match: align_of::<T>() == expected_align,
        field_mismatch: fields.iter().position(|(rust, c)| rust != c),
    }
}

/// Rust-side field offsets of `RbNode`: parent, color, children
pub fn rb_node_field_offsets() -> [usize; 3] {
    [
        memoffset::offset_of!(RbNode, rb_parent),
        memoffset::offset_of!(RbNode, rb_color),
        memoffset::offset_of!(RbNode, rb_child),
    ]
}
