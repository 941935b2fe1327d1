use serde_json::Value;
use std::{fs, path::Path, path::PathBuf, str::FromStr};
use subxt_signer::{sr25519::Keypair, SecretUri};

use crate::commands::Error;

/// Environment variable consulted before prompting for the passphrase
pub const PASSWORD_ENV: &str = "PAYOUT_PASSWORD";

/// Where the signing keypair comes from
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Polkadot-JS encrypted account export
    AccountJson(PathBuf),
    /// Secret URI such as `//Alice`, for development chains
    Suri(String),
}

/// Account export with the fields the payout needs checked
#[derive(Debug, Clone)]
pub struct AccountFile {
    pub address: String,
    pub raw: String,
}

/// Read an account export and check it has `encoded` and `address`
pub fn load_account_json(path: &Path) -> Result<AccountFile, Error> {
    let raw = fs::read_to_string(path)?;
    parse_account_json(raw)
}

fn parse_account_json(raw: String) -> Result<AccountFile, Error> {
    let json: Value = serde_json::from_str(&raw)
        .map_err(|e| Error::InvalidAccountJson(format!("Error decoding JSON: {}", e)))?;

    if json.get("encoded").is_none() {
        return Err(Error::InvalidAccountJson("missing `encoded` field".to_string()));
    }
    let address = json
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidAccountJson("missing `address` field".to_string()))?
        .to_string();

    Ok(AccountFile { address, raw })
}

/// Load the signing keypair, prompting for the passphrase when needed
pub fn load_keypair(source: &CredentialSource) -> Result<Keypair, Error> {
    match source {
        CredentialSource::AccountJson(path) => {
            let account = load_account_json(path)?;
            println!("Account address: {}", account.address);

            let password = match std::env::var(PASSWORD_ENV) {
                Ok(password) if !password.is_empty() => password,
                _ => prompt_password(&format!("Enter password for {}: ", account.address))?,
            };

            subxt_signer::polkadot_js_compat::decrypt_json(&account.raw, &password)
                .map_err(|e| Error::Crypto(format!("Failed to decode the keypair: {}", e)))
        }
        CredentialSource::Suri(suri) => {
            let uri = SecretUri::from_str(suri)
                .map_err(|e| Error::Crypto(format!("Invalid secret URI: {}", e)))?;
            Keypair::from_uri(&uri)
                .map_err(|e| Error::Crypto(format!("Failed to derive keypair: {}", e)))
        }
    }
}

// Helper function to prompt for password
fn prompt_password(prompt: &str) -> Result<String, Error> {
    use rpassword::read_password;
    print!("{}", prompt);
    std::io::Write::flush(&mut std::io::stdout())?;
    let password = read_password()?;
    Ok(password)
}
