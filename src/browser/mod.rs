mod session;
mod state;
pub mod view;

pub use session::{fetch_detail, fetch_listing, Browser};
pub use state::{
    BrowserState, DetailRequest, ListRequest, Listing, ScrollMetrics, Theme, SCROLL_THRESHOLD,
};
