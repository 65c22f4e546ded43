//! Command definitions shared by the REPL and one-shot `--cmd` mode.

use anyhow::bail;

use crate::actions::ActionKind;
use crate::display;
use crate::error::Result;
use crate::metadata::AssetKind;
use crate::session::{AssetSession, Phase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show asset metadata: details coin|fa
    Details(AssetKind),
    /// Show the connected account's balance: balance coin|fa
    Balance(AssetKind),
    /// Mint, burn, or transfer: <action> coin|fa [recipient] [amount]
    Action {
        kind: AssetKind,
        action: ActionKind,
        recipient: Option<String>,
        amount: Option<String>,
    },
    /// Convert the account's Coin holdings to the fungible store: migrate
    Migrate,
    /// Set the pending recipient: recipient <address>
    Recipient(String),
    /// Set the pending amount: amount <decimal>
    Amount(String),
    /// Show or switch the connected account: account [address]
    Account(Option<String>),
    /// Re-read a representation's balance: refresh coin|fa
    Refresh(AssetKind),
    /// Full session reset (drops cached metadata)
    Reset,
    /// Print help
    Help,
    /// Exit the console
    Exit,
}

fn parse_kind(arg: Option<&str>, usage: &str) -> anyhow::Result<AssetKind> {
    let raw = arg.ok_or_else(|| anyhow::anyhow!("Missing asset kind. Usage: {usage}"))?;
    raw.parse::<AssetKind>().map_err(|e| anyhow::anyhow!(e))
}

impl Command {
    /// Parse a command from a raw input string.
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("No command entered. Type 'help' for a list of commands.");
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();
        let arg = |i: usize| args.get(i).copied();

        match cmd.as_str() {
            "details" | "info" => Ok(Command::Details(parse_kind(arg(0), "details coin|fa")?)),

            "balance" | "bal" => Ok(Command::Balance(parse_kind(arg(0), "balance coin|fa")?)),

            "mint" | "burn" | "transfer" | "send" => {
                let action = match cmd.as_str() {
                    "mint" => ActionKind::Mint,
                    "burn" => ActionKind::Burn,
                    _ => ActionKind::Transfer,
                };
                let kind = parse_kind(arg(0), "mint|burn|transfer coin|fa [recipient] [amount]")?;
                Ok(Command::Action {
                    kind,
                    action,
                    recipient: arg(1).map(str::to_string),
                    amount: arg(2).map(str::to_string),
                })
            }

            "migrate" | "convert" => Ok(Command::Migrate),

            "recipient" => {
                let addr = arg(0)
                    .ok_or_else(|| anyhow::anyhow!("Missing address. Usage: recipient <address>"))?;
                Ok(Command::Recipient(addr.to_string()))
            }

            "amount" => {
                let amount = arg(0)
                    .ok_or_else(|| anyhow::anyhow!("Missing amount. Usage: amount <decimal>"))?;
                Ok(Command::Amount(amount.to_string()))
            }

            "account" | "connect" => Ok(Command::Account(arg(0).map(str::to_string))),

            "refresh" => Ok(Command::Refresh(parse_kind(arg(0), "refresh coin|fa")?)),

            "reset" => Ok(Command::Reset),

            "help" | "?" => Ok(Command::Help),

            "exit" | "quit" | "q" => Ok(Command::Exit),

            other => bail!("Unknown command '{other}'. Type 'help' for a list of commands."),
        }
    }

    /// Run the command against a session and return the text to print.
    pub async fn execute(&self, session: &AssetSession) -> Result<String> {
        match self {
            Command::Details(kind) => {
                ensure_loaded(session, *kind).await?;
                let panel = session.panel(*kind).await;
                Ok(display::format_panel(&panel, session.account().await.as_deref()))
            }

            Command::Balance(kind) => {
                ensure_loaded(session, *kind).await?;
                let panel = session.panel(*kind).await;
                Ok(display::format_balance_line(&panel))
            }

            Command::Action {
                kind,
                action,
                recipient,
                amount,
            } => {
                if let Some(r) = recipient {
                    session.set_recipient(r.clone()).await;
                }
                if let Some(a) = amount {
                    session.set_amount(a).await?;
                }
                ensure_loaded(session, *kind).await?;
                let receipt = session.execute(*kind, *action).await?;
                let panel = session.panel(*kind).await;
                Ok(display::format_receipt(*action, &receipt, &panel))
            }

            Command::Migrate => {
                ensure_loaded(session, AssetKind::Coin).await?;
                let receipt = session.execute(AssetKind::Coin, ActionKind::Migrate).await?;
                let coin = session.panel(AssetKind::Coin).await;
                let fa = session.panel(AssetKind::FungibleAsset).await;
                Ok(format!(
                    "{}\n{}\n{}",
                    display::format_receipt(ActionKind::Migrate, &receipt, &coin),
                    display::format_balance_line(&coin),
                    display::format_balance_line(&fa),
                ))
            }

            Command::Recipient(addr) => {
                session.set_recipient(addr.clone()).await;
                Ok(format!("Recipient set to {addr}"))
            }

            Command::Amount(amount) => {
                session.set_amount(amount).await?;
                Ok(format!("Amount set to {amount}"))
            }

            Command::Account(None) => Ok(match session.account().await {
                Some(addr) => format!("Connected account: {addr}"),
                None => "No account connected.".to_string(),
            }),

            Command::Account(Some(addr)) => {
                session.set_account(Some(addr.clone())).await;
                let mut lines = vec![format!("Connected account: {addr}")];
                for kind in AssetKind::ALL {
                    match session.load(kind).await {
                        Ok(()) => {
                            lines.push(display::format_balance_line(&session.panel(kind).await));
                        }
                        Err(e) => lines.push(format!("{kind}: load failed: {e}")),
                    }
                }
                Ok(lines.join("\n"))
            }

            Command::Refresh(kind) => {
                session.refresh(*kind).await?;
                let panel = session.panel(*kind).await;
                Ok(display::format_balance_line(&panel))
            }

            Command::Reset => {
                session.reset().await;
                Ok("Session reset.".to_string())
            }

            Command::Help => Ok(display::help_text()),

            Command::Exit => Ok(String::new()),
        }
    }
}

/// Lazy-load a panel the first time a command touches it.
async fn ensure_loaded(session: &AssetSession, kind: AssetKind) -> Result<()> {
    if session.panel(kind).await.phase == Phase::Unloaded {
        session.load(kind).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_commands() {
        assert_eq!(
            Command::parse("details coin").unwrap(),
            Command::Details(AssetKind::Coin)
        );
        assert_eq!(
            Command::parse("bal fa").unwrap(),
            Command::Balance(AssetKind::FungibleAsset)
        );
        assert_eq!(
            Command::parse("refresh coin").unwrap(),
            Command::Refresh(AssetKind::Coin)
        );
    }

    #[test]
    fn parses_actions_with_optional_overrides() {
        assert_eq!(
            Command::parse("mint coin").unwrap(),
            Command::Action {
                kind: AssetKind::Coin,
                action: ActionKind::Mint,
                recipient: None,
                amount: None,
            }
        );
        assert_eq!(
            Command::parse("transfer fa 0xabc 1.5").unwrap(),
            Command::Action {
                kind: AssetKind::FungibleAsset,
                action: ActionKind::Transfer,
                recipient: Some("0xabc".to_string()),
                amount: Some("1.5".to_string()),
            }
        );
    }

    #[test]
    fn parses_session_commands() {
        assert_eq!(Command::parse("migrate").unwrap(), Command::Migrate);
        assert_eq!(Command::parse("account").unwrap(), Command::Account(None));
        assert_eq!(
            Command::parse("account 0x1").unwrap(),
            Command::Account(Some("0x1".to_string()))
        );
        assert_eq!(Command::parse("exit").unwrap(), Command::Exit);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("balance").is_err());
        assert!(Command::parse("balance gold").is_err());
        assert!(Command::parse("frobnicate").is_err());
        let err = Command::parse("recipient").unwrap_err().to_string();
        assert!(err.contains("Usage: recipient"), "got: {err}");
    }
}
