//! Build script for ABI compatibility testing
//!
//! Compiles a C translation unit declaring the tree structures the way a C
//! caller of `kestrel-linux-compat` would, and exports their sizes, offsets
//! and constants for the `c_reference_compat` tests.

use std::env;
use std::path::{Path, PathBuf};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    generate_reference_c_code(&out_dir);

    println!("cargo:rerun-if-changed=build.rs");
}

fn generate_reference_c_code(out_dir: &Path) {
    let c_code = r#"
#include <stddef.h>

/* C view of the kestrel red-black tree */

enum rb_color {
    RB_RED = 0,
    RB_BLACK = 1,
};

struct rb_node {
    struct rb_node *rb_parent;
    enum rb_color rb_color;
    struct rb_node *rb_child[2];
};

struct rb_root {
    struct rb_node *rb_node;
};

/* An element embedding its node first, like RbEntry<unsigned long> */
struct rb_entry_ulong {
    struct rb_node node;
    unsigned long value;
};

size_t rb_node_size(void) { return sizeof(struct rb_node); }
size_t rb_node_align(void) { return _Alignof(struct rb_node); }
size_t rb_node_parent_offset(void) { return offsetof(struct rb_node, rb_parent); }
size_t rb_node_color_offset(void) { return offsetof(struct rb_node, rb_color); }
size_t rb_node_child_offset(void) { return offsetof(struct rb_node, rb_child); }

size_t rb_root_size(void) { return sizeof(struct rb_root); }
size_t rb_root_align(void) { return _Alignof(struct rb_root); }

size_t rb_color_size(void) { return sizeof(enum rb_color); }

size_t rb_entry_ulong_size(void) { return sizeof(struct rb_entry_ulong); }
size_t rb_entry_ulong_value_offset(void) { return offsetof(struct rb_entry_ulong, value); }

unsigned int VERIFY_RB_RED = RB_RED;
unsigned int VERIFY_RB_BLACK = RB_BLACK;

/* Error codes from include/uapi/asm-generic/errno-base.h */
int VERIFY_EPERM = 1;
int VERIFY_ENOENT = 2;
int VERIFY_EFAULT = 14;
int VERIFY_EINVAL = 22;
"#;

    let c_file = out_dir.join("rbtree_reference.c");
    std::fs::write(&c_file, c_code).expect("Failed to write C reference code");

    cc::Build::new()
        .file(&c_file)
        .warnings(false)
        .static_flag(true)
        .compile("rbtree_reference");
}
