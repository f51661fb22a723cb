use std::{env, str::FromStr};

use tracing::warn;

/// Reads `key` from the environment, falling back to `default` when the
/// variable is unset or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

pub fn max_board_cells() -> usize {
    env_or("MAX_BOARD_CELLS", 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_uses_default() {
        assert_eq!(env_or("SWEEP_TEST_SURELY_UNSET_VARIABLE", 42u64), 42);
    }
}
