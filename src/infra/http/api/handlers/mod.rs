//! API handlers organized by resource.

mod items;
mod system;

pub use items::*;
pub use system::*;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ItemListQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GreetingQuery {
    pub name: Option<String>,
}
