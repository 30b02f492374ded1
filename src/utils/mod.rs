pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use string_utils::{
    is_ascii_ws, is_html_space, skip_spaces, slice_from, space_len_at,
    starts_with_ignore_ascii_case, strip_prefix_ignore_ascii_case,
};
pub use url_utils::{extension_of, is_http_url, logical_key, path_segments};
