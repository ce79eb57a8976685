mod query_params;
mod ugly_url;

pub use query_params::{QueryParams, QueryValue};
pub use ugly_url::{UglifyRequestDto, UglifyResponseDto, UglinessLevel};
