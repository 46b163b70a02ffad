use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Split a wallet list into identifiers, one per line.
///
/// Blank (or whitespace-only) lines are dropped and file order is kept.
/// Addresses are not validated and duplicates are preserved.
pub fn parse_wallets(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read the wallet list at `path`.
pub fn load_wallets(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read wallet list {}", path.display()))?;
    let wallets = parse_wallets(&contents);
    debug!("Loaded {} wallet(s) from {}", wallets.len(), path.display());
    Ok(wallets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_file_order() {
        let w = parse_wallets("0xaaa\n0xbbb\n0xccc\n");
        assert_eq!(w, vec!["0xaaa", "0xbbb", "0xccc"]);
    }

    #[test]
    fn drops_blank_lines() {
        let w = parse_wallets("\n0xaaa\n\n   \n0xbbb\n\n");
        assert_eq!(w, vec!["0xaaa", "0xbbb"]);
    }

    #[test]
    fn handles_crlf() {
        let w = parse_wallets("0xaaa\r\n0xbbb\r\n");
        assert_eq!(w, vec!["0xaaa", "0xbbb"]);
    }

    #[test]
    fn keeps_duplicates() {
        let w = parse_wallets("0xaaa\n0xaaa\n");
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn empty_source() {
        assert!(parse_wallets("").is_empty());
        assert!(parse_wallets("\n\n").is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_wallets(Path::new("no/such/data.txt")).unwrap_err();
        assert!(format!("{err:#}").contains("no/such/data.txt"));
    }

    #[test]
    fn reads_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "layeredge-heartbeat-wallets-{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, "0x01\n\n0x02\n").expect("write temp wallets");
        let wallets = load_wallets(&path).expect("wallets load");
        let _ = std::fs::remove_file(&path);
        assert_eq!(wallets, vec!["0x01", "0x02"]);
    }
}
