pub mod http_snapshot_source;
