//! SMS platform clients.

pub mod haozhu;
