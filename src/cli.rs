//! Offline helpers for members: config templates, proposal ids and signed
//! ballots.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use collector_dao::crypto::Hash;
use collector_dao::governance::config::default_config_toml;
use collector_dao::governance::{GovernanceConfig, GovernanceConfigToml, ProposalDraft, Support};
use collector_dao::types::Address;
use collector_dao::wallet::Wallet;

use crate::flag_value;

/// `config [PATH]`: write the default TOML config
pub fn write_config(args: &[String]) -> Result<()> {
    let path = args
        .first()
        .map_or_else(|| PathBuf::from("collector-dao.toml"), PathBuf::from);
    default_config_toml().save_to_file(&path)?;
    info!(path = %path.display(), "Wrote default config");
    println!("Wrote {}", path.display());
    Ok(())
}

/// `proposal-id <FILE>`: print the digest and id of a JSON proposal draft
pub fn proposal_id(args: &[String]) -> Result<()> {
    let path = args
        .first()
        .ok_or_else(|| anyhow!("usage: collector-dao proposal-id <FILE>"))?;
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading proposal draft {path}"))?;
    let draft: ProposalDraft = serde_json::from_str(&contents).context("parsing proposal draft")?;

    if draft.targets.is_empty() {
        println!("warning: proposal has no calls and will be rejected");
    } else if draft.values.len() != draft.targets.len() || draft.call_payloads.len() != draft.targets.len() {
        println!("warning: targets, values and call_payloads differ in length and will be rejected");
    }

    let id = draft.proposal_id().context("decoding call payloads")?;
    println!("Description digest: {}", draft.description_digest());
    println!("Proposal id:        {id}");
    Ok(())
}

/// `sign-ballot --dao ADDR --proposal ID --support N [--config PATH] [--wallet PATH]`
pub fn sign_ballot(args: &[String]) -> Result<()> {
    let dao = flag_value(args, "--dao").ok_or_else(|| anyhow!("missing --dao"))?;
    let dao = Address::from_hex(dao).context("parsing --dao")?;
    let proposal = flag_value(args, "--proposal").ok_or_else(|| anyhow!("missing --proposal"))?;
    let proposal = Hash::from_hex(proposal).context("parsing --proposal")?;
    let support: u8 = flag_value(args, "--support")
        .ok_or_else(|| anyhow!("missing --support (0 = against, 1 = abstain, 2 = for)"))?
        .parse()
        .context("parsing --support")?;
    Support::from_code(support)?;

    let config = match flag_value(args, "--config") {
        Some(path) => load_config(Path::new(path))?,
        None => GovernanceConfig::default(),
    };
    let wallet = match flag_value(args, "--wallet") {
        Some(path) => Wallet::load(path)?,
        None => Wallet::load_default().context("no --wallet given and default wallet unavailable")?,
    };

    let domain = collector_dao::crypto::SigningDomain::new(config.name, config.chain_id, dao);
    debug!(separator = %domain.separator(), "Signing domain");
    let signed = wallet.sign_ballot(proposal, support, &domain);
    info!(voter = %wallet.address(), %proposal, support, "Signed ballot");

    println!("{}", serde_json::to_string_pretty(&signed)?);
    Ok(())
}

fn load_config(path: &Path) -> Result<GovernanceConfig> {
    let toml = GovernanceConfigToml::load_from_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;
    Ok(toml.into_config()?)
}
