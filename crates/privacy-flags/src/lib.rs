#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod flags;

pub use crate::flags::{
    InvalidFlagCharacter, PrivacyFlags, privacy_flags_to_string, string_to_privacy_flags,
};
