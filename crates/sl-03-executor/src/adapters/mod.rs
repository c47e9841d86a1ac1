//! Adapters: the reference shard, a storage-backed view and fault injection.

pub mod faulty;
pub mod kv_shard;
pub mod snapshot_view;
