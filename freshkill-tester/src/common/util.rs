pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated seed list; every entry must be a plain integer.
pub fn parse_seeds(s: &str) -> anyhow::Result<Vec<u64>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .map_err(|err| anyhow::anyhow!("invalid seed {token:?}: {err}"))
        })
        .collect()
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
    fn parse_seeds_rejects_words() {
        assert_eq!(parse_seeds("1, 42").unwrap(), vec![1, 42]);
        assert!(parse_seeds("1,moon").is_err());
    }
}
