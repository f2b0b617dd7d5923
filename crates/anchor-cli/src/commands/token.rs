//! Token commands.
//!
//! `anchor token issue` - Mint a credential pair for a subject.
//! `anchor token inspect` - Show a token's claims without verification.
//! `anchor token verify` - Verify a token against the configured secrets.

use super::{load_settings, read_token_arg};
use anchor_credentials::{
    ClaimCodec, Claims, CredentialKind, CredentialService, TokenPair, inspect_unverified,
};
use anyhow::Context;
use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};

/// Credential kind as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Access,
    Refresh,
}

impl From<KindArg> for CredentialKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Access => CredentialKind::Access,
            KindArg::Refresh => CredentialKind::Refresh,
        }
    }
}

/// Mint a pair in a fresh lineage.
///
/// The ledger lives only for this process, so the refresh credential cannot
/// be rotated against a running server. Useful for checking configuration.
pub fn issue(config: &Path, subject: String, output: Option<PathBuf>) -> anyhow::Result<()> {
    let pair = issue_pair(config, &subject)?;
    let rendered = serde_json::to_string_pretty(&pair)?;

    if let Some(path) = output {
        fs::write(&path, &rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✔ Credential pair written to: {}", path.display());
    } else {
        println!("{}", rendered);
    }

    Ok(())
}

fn issue_pair(config: &Path, subject: &str) -> anyhow::Result<TokenPair> {
    if subject.trim().is_empty() {
        anyhow::bail!("--subject must not be empty");
    }
    let settings = load_settings(config)?;
    let service = CredentialService::new(&settings);
    let pair = service.login(subject)?;
    tracing::debug!(subject, "issued credential pair");
    Ok(pair)
}

/// Print a token's claims without checking its signature or expiry.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token = read_token_arg(token)?;
    let claims = inspect_unverified(&token).context("Failed to decode token")?;

    println!("Token Information (unverified):");
    print_claims(&claims);
    Ok(())
}

/// Verify a token as the given kind and print its claims.
///
/// On failure the precise cause (expired, bad signature, issuer or audience
/// mismatch, malformed) is reported as the error.
pub fn verify(config: &Path, token: String, kind: KindArg) -> anyhow::Result<()> {
    let claims = verify_token(config, token, kind)?;

    println!("✔ Token is a valid {} credential", CredentialKind::from(kind));
    println!();
    print_claims(&claims);
    Ok(())
}

fn verify_token(config: &Path, token: String, kind: KindArg) -> anyhow::Result<Claims> {
    let settings = load_settings(config)?;
    let token = read_token_arg(token)?;
    let codec = ClaimCodec::new(settings.keys, settings.issuer, settings.audience);
    let expected = CredentialKind::from(kind);

    let claims = codec
        .decode(&token, expected)
        .map_err(|e| anyhow::anyhow!("✖ Token verification failed: {}", e))?;

    if claims.kind != expected {
        anyhow::bail!(
            "✖ Token verification failed: expected a {} credential, got {}",
            expected,
            claims.kind
        );
    }
    Ok(claims)
}

fn print_claims(claims: &Claims) {
    println!("  Kind:      {}", claims.kind);
    println!("  Subject:   {}", claims.sub);
    println!("  Issuer:    {}", claims.iss);
    println!("  Audience:  {}", claims.aud);
    println!("  ID:        {}", claims.jti);
    println!("  Issued:    {}", claims.issued_at().to_rfc3339());
    println!("  Expires:   {}", claims.expires_at().to_rfc3339());
}
