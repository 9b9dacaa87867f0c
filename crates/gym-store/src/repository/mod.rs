//! # Repository Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LocalRepository<T>          implements gym_core::Repository<T>         │
//! │  ├── get_all / get_by_id     read + decode the collection key           │
//! │  ├── create / update / ...   read-modify-write under a per-key lock     │
//! │  └── batch_*                 one write per batch                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  KvRepository                get / set / remove / keys                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kv_store table                                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`kv::KvRepository`] - Raw text values by key
//! - [`local::LocalRepository`] - One entity collection stored under one key

pub mod kv;
pub mod local;
