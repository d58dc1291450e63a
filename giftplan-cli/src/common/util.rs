use anyhow::{Context, Result};
use giftplan_core::GiftKey;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated list of character ids.
pub fn parse_ids(s: &str) -> Result<Vec<u32>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<u32>()
                .with_context(|| format!("invalid character id {token:?}"))
        })
        .collect()
}

/// Parse a `rarity-id` gift key such as `ssr-42`.
pub fn parse_gift_key(s: &str) -> Result<GiftKey> {
    s.parse::<GiftKey>()
        .with_context(|| format!("invalid gift key {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn parse_ids_reports_bad_tokens() {
        assert_eq!(parse_ids("3, 1,2").unwrap(), vec![3, 1, 2]);
        assert!(parse_ids("").unwrap().is_empty());
        let err = parse_ids("1,x").unwrap_err();
        assert!(format!("{err:#}").contains("\"x\""));
    }

    #[test]
    fn parse_gift_key_accepts_both_rarities() {
        assert_eq!(parse_gift_key("sr-2").unwrap(), GiftKey::sr(2));
        assert_eq!(parse_gift_key("ssr-9").unwrap(), GiftKey::ssr(9));
        assert!(parse_gift_key("9").is_err());
    }
}
