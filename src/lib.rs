//! # libbaduk
//!
//! A Go (Weiqi/Baduk) rules engine. It contains four sub-modules: `game` holds the board, the
//! region partition, move execution, and the legality rules; `tree` holds the game tree of nodes
//! and the current variation; `archive` holds the persisted-state layout; and `oracle` holds the
//! interface to an external dead-stone estimator.

#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

pub mod archive;
pub mod events;
pub mod game;
pub mod oracle;
pub mod tree;
