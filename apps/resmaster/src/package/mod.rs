// Packaging: deterministic names, the delivery archive, and the run manifest.
pub mod bundle;
pub mod manifest;
pub mod naming;
