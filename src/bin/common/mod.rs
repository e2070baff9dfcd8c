//! Helpers shared by the utility binaries

/// Value following `name` in `args`, or `default` when absent or unparsable
pub fn arg<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> T {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_arg_parses_value() {
        let argv = args(&["seed", "--total", "25"]);
        assert_eq!(arg(&argv, "--total", 1u32), 25);
    }

    #[test]
    fn test_arg_falls_back_to_default() {
        assert_eq!(arg(&args(&["seed"]), "--total", 1u32), 1);
        assert_eq!(arg(&args(&["seed", "--total"]), "--total", 1u32), 1);
        assert_eq!(arg(&args(&["seed", "--total", "many"]), "--total", 1u32), 1);
    }
}
