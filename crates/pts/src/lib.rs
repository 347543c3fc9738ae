#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod entry;
mod expand;

pub use crate::entry::{DirectoryEntry, EntryKind, PtsId};
pub use crate::expand::{ExpandError, SupergroupExpansion};
