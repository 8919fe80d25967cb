pub mod snapshot_client;
