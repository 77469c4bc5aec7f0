use anyhow::{Context, Result, bail};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Resolve seed tokens: decimal, `0x` hex, or `random` for a fresh entropy seed.
pub fn resolve_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.eq_ignore_ascii_case("random") {
            seeds.push(rand::random::<u64>());
            continue;
        }
        let seed = if let Some(hex) = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
        {
            u64::from_str_radix(&hex.replace('_', ""), 16)
                .with_context(|| format!("invalid hex seed {token}"))?
        } else {
            token
                .replace('_', "")
                .parse::<u64>()
                .with_context(|| format!("invalid seed {token}"))?
        };
        seeds.push(seed);
    }
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    Ok(seeds)
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
    fn seeds_accept_decimal_and_hex() {
        let seeds = resolve_seeds(&split_csv("1337, 0xFF, 1_000")).unwrap();
        assert_eq!(seeds, vec![1337, 255, 1000]);
    }

    #[test]
    fn random_seed_expands() {
        assert_eq!(resolve_seeds(&split_csv("random")).unwrap().len(), 1);
    }

    #[test]
    fn bad_seeds_rejected() {
        assert!(resolve_seeds(&split_csv("orange")).is_err());
        assert!(resolve_seeds(&[]).is_err());
    }
}
