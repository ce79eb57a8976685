mod ugly_url;

pub use ugly_url::{redirect_handler, uglify_handler};
