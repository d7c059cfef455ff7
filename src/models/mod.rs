mod click;
mod url;

pub use click::{ClickContext, ClickEvent, DIRECT_REFERRER};
pub use url::{CreateUrlRequest, CreateUrlResponse, CreatedUrl, UrlRecord, UrlStats};
