pub mod util;

pub use util::{parse_gift_key, parse_ids};
