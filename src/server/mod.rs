pub mod core;
pub mod request;

pub use self::core::RequestView;
pub use request::{parse_cookies, parse_parameter_map, ParsedRequest, MAX_BRACKET_DEPTH};
