//! Ticker and contract file discovery.
//!
//! Layout: `<root>/<ticker>/<SESSION>/<contract>_<anything>.<ext>`.

use std::path::{Path, PathBuf};

use tickstitch_core::{ContractCode, Result};

/// One raw export belonging to a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFile {
    /// Contract code from the file-name prefix.
    pub contract: ContractCode,
    /// Full path.
    pub path: PathBuf,
}

/// Ticker folders directly under `root`, sorted by name.
pub fn list_tickers(root: &Path) -> Result<Vec<String>> {
    let mut tickers = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            tickers.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    tickers.sort();
    Ok(tickers)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Contract files under the session folders of one ticker, sorted by path.
///
/// Session folders are matched case-insensitively; absent ones are skipped.
pub fn find_contract_files(
    ticker_dir: &Path,
    sessions: &[String],
    extension: &str,
) -> Result<Vec<ContractFile>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(ticker_dir)? {
        let entry = entry?;
        let session = entry.file_name().to_string_lossy().to_string();
        if !entry.file_type()?.is_dir()
            || !sessions.iter().any(|s| s.eq_ignore_ascii_case(&session))
        {
            continue;
        }

        for file in std::fs::read_dir(entry.path())? {
            let file = file?;
            let path = file.path();
            if !file.file_type()?.is_file() || !has_extension(&path, extension) {
                continue;
            }
            let name = file.file_name().to_string_lossy().to_string();
            files.push(ContractFile {
                contract: ContractCode::from_file_name(&name),
                path,
            });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
