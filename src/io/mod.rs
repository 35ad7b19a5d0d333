//! Artifact packaging and stream helpers
//!
//! - `archive` - zip packing of directory trees and byte streams, and extraction
//! - `stream` - buffered copy and read-to-end helpers
//! - `tree` - directory enumeration capability consumed by the packer

pub mod archive;
pub mod stream;
pub mod tree;

pub use archive::{
    pack_directory_into_zip, pack_directory_into_zip_with_config, pack_stream_into_zip,
    pack_stream_into_zip_with_config, pack_tree_into_zip, unzip, unzip_file,
};
pub use stream::{copy_stream, read_fully, BUFFER_SIZE};
pub use tree::{EntryKind, FsTree, MemoryTree, TreeEntry, TreeSource};
