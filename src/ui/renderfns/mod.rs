mod footer;
mod header;
mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use utils::{rating_color, status_color};
