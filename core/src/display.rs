//! Output formatting for the REPL — label/value panels and balance lines.

use crate::actions::{ActionKind, ActionReceipt};
use crate::metadata::AssetKind;
use crate::session::{Panel, Phase};
use crate::units;

/// Render a panel's metadata and balance as aligned label/value lines.
#[must_use]
pub fn format_panel(panel: &Panel, account: Option<&str>) -> String {
    let Some(descriptor) = &panel.descriptor else {
        return match &panel.last_error {
            Some(e) => format!("Not loaded: {e}"),
            None => format!("Not loaded ({}).", panel.phase),
        };
    };

    let mut lines = vec![format!("{} Details", descriptor.name)];
    lines.push(format!("  {:<18}{}", "Connected:", account.unwrap_or("-")));
    lines.push(format!("  {:<18}{}", "Symbol:", descriptor.symbol));
    lines.push(format!("  {:<18}{}", "Decimals:", descriptor.decimals));
    if let Some(icon) = &descriptor.icon_uri {
        lines.push(format!("  {:<18}{icon}", "Icon:"));
    }
    if let Some(project) = &descriptor.project_uri {
        lines.push(format!("  {:<18}{project}", "Project:"));
    }
    lines.push(format!("  {:<18}{}", "Balance:", balance_value(panel)));
    if descriptor.kind == AssetKind::Coin {
        let migrated = panel.state.as_ref().map(|s| s.migrated).unwrap_or(false);
        lines.push(format!("  {:<18}{migrated}", "Migrated to FA:"));
    }
    if let Some(e) = &panel.last_error {
        lines.push(format!("  {:<18}{e}", "Last error:"));
    }
    lines.join("\n")
}

fn balance_value(panel: &Panel) -> String {
    match (&panel.state, &panel.descriptor) {
        (Some(state), Some(descriptor)) => format!(
            "{} {}",
            units::format_subunits(state.balance_subunits, descriptor.decimals),
            descriptor.symbol
        ),
        _ => "-".to_string(),
    }
}

/// One-line balance summary: `coin: 1.50000000 TC (migrated: false)`.
#[must_use]
pub fn format_balance_line(panel: &Panel) -> String {
    let Some(descriptor) = &panel.descriptor else {
        return format!("not loaded ({})", panel.phase);
    };
    let mut line = format!("{}: {}", descriptor.kind, balance_value(panel));
    if descriptor.kind == AssetKind::Coin {
        if let Some(state) = &panel.state {
            line.push_str(&format!(" (migrated: {})", state.migrated));
        }
    }
    if panel.phase != Phase::Ready {
        line.push_str(&format!(" [{}]", panel.phase));
    }
    line
}

/// Confirmation line for a finalized action.
#[must_use]
pub fn format_receipt(action: ActionKind, receipt: &ActionReceipt, panel: &Panel) -> String {
    let symbol = panel
        .descriptor
        .as_ref()
        .map(|d| d.symbol.as_str())
        .unwrap_or("?");
    format!("{action} {symbol} committed: {}", receipt.hash)
}

#[must_use]
pub fn help_text() -> String {
    "Commands:
  details coin|fa                       Show asset metadata and balance
  balance coin|fa                       Show the connected account's balance
  mint coin|fa [recipient] [amount]     Mint to the pending (or given) recipient
  burn coin|fa [recipient] [amount]     Burn from the pending (or given) recipient
  transfer coin|fa [recipient] [amount] Transfer to the pending (or given) recipient
  migrate                               Convert Coin holdings to the fungible store
  recipient <address>                   Set the pending recipient
  amount <decimal>                      Set the pending amount
  account [address]                     Show or switch the connected account
  refresh coin|fa                       Re-read a balance from the chain
  reset                                 Full session reset (drops cached metadata)
  help                                  Show this help
  exit                                  Leave the console"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::AccountAssetState;
    use crate::metadata::AssetDescriptor;

    fn coin_panel() -> Panel {
        Panel {
            phase: Phase::Ready,
            descriptor: Some(AssetDescriptor {
                kind: AssetKind::Coin,
                name: "Test Coin".into(),
                symbol: "TC".into(),
                decimals: 8,
                icon_uri: None,
                project_uri: None,
            }),
            state: Some(AccountAssetState {
                kind: AssetKind::Coin,
                account: "0x1".into(),
                balance_subunits: 150_000_000,
                balance_display: 1.5,
                migrated: false,
            }),
            last_error: None,
        }
    }

    #[test]
    fn balance_line_shows_exact_amount_and_flag() {
        let line = format_balance_line(&coin_panel());
        assert_eq!(line, "coin: 1.50000000 TC (migrated: false)");
    }

    #[test]
    fn panel_includes_migration_row_for_coin() {
        let text = format_panel(&coin_panel(), Some("0x1"));
        assert!(text.contains("Test Coin Details"));
        assert!(text.contains("Migrated to FA:"));
        assert!(text.contains("1.50000000 TC"));
    }

    #[test]
    fn unloaded_panel_renders_placeholder() {
        let panel = Panel {
            phase: Phase::Unloaded,
            descriptor: None,
            state: None,
            last_error: None,
        };
        assert!(format_panel(&panel, None).contains("Not loaded"));
    }
}
