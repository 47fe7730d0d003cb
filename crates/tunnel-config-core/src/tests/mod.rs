//! Unit tests for `tunnel_config_core` types.
