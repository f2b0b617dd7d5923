//! Key management commands.
//!
//! `anchor keys generate` - Generate a new random signing secret.

use anchor_credentials::SigningSecret;
use std::fs;
use std::path::PathBuf;

/// Generate a new signing secret.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let secret = SigningSecret::generate();

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, secret.to_text())?;

        println!("✔ Generated signing secret ({} bytes):", secret.len());
        println!("  {}", path.display());
        println!();
        println!("⚠️  Keep it secure! Never commit it to version control.");
        println!();
        println!("Reference it from anchor.toml, e.g.:");
        println!("  access_secret_file = \"{}\"", path.display());
        println!();
        println!("Access and refresh credentials need two different secrets.");
    } else {
        println!("{}", secret.to_text());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generate_secret_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("keys").join("access.secret");
        generate(Some(path.clone())).unwrap();

        let secret = fs::read_to_string(&path).unwrap();
        // 32 random bytes, base64url without padding
        assert_eq!(secret.len(), 43);
        assert!(
            secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generated_secrets_differ() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.secret");
        let b = dir.path().join("b.secret");
        generate(Some(a.clone())).unwrap();
        generate(Some(b.clone())).unwrap();

        assert_ne!(
            fs::read_to_string(a).unwrap(),
            fs::read_to_string(b).unwrap()
        );
    }
}
