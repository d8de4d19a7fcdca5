// Line budget: simulated wrapping that keeps every bullet within two lines.

pub mod contract;
