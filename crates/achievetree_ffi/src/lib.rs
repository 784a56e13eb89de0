//! Flutter-facing bindings for the achievement tree editor core.

pub mod api;
