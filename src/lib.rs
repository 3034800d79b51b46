//! DataNexus: upload a tabular dataset, profile it, clean it and chart it.
//!
//! The library holds everything except the egui shell: the [`data`] layer
//! (model, loader, profiler, transformer, chart builder, exporter), the
//! per-user [`session::Session`], the [`color`] palette and the shell's
//! [`config`].

pub mod color;
pub mod config;
pub mod data;
pub mod session;
