use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::{Args, Subcommand};

use crate::config::{AppConfig, ConfigOverrides, StoredConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the effective configuration and where it came from.
    Show,
}

pub fn run(command: ConfigCommand, explicit_path: Option<&Path>) -> AppResult<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match command {
        ConfigCommand::Init => run_init(explicit_path, &mut stdin.lock(), &mut stdout),
        ConfigCommand::Show => run_show(explicit_path, &mut stdout),
    }
}

fn run_init<R: BufRead, W: Write>(
    explicit_path: Option<&Path>,
    input: &mut R,
    output: &mut W,
) -> AppResult<()> {
    let path = config_file_path(explicit_path);
    let mut cfg = StoredConfig::load(&path)?;

    writeln!(output, "Configuring ticketdesk.")?;
    writeln!(output, "Press Enter to keep the current value, '-' to clear it.")?;
    writeln!(output)?;

    let fields: [(&str, &mut Option<String>); 4] = [
        ("Status scheme (assistance/resolution)", &mut cfg.scheme),
        ("Rating policy (terminal-only/lenient)", &mut cfg.rating_policy),
        ("Id strategy (sequential/clock/uuid)", &mut cfg.ids),
        ("Track priority (on/off)", &mut cfg.priority),
    ];
    for (label, slot) in fields {
        edit_field(input, output, label, slot)?;
    }

    AppConfig::resolve(&cfg, |_| None, &ConfigOverrides::default())?;
    cfg.save(&path)?;

    writeln!(output, "\nConfiguration saved to {}", path.display())?;
    Ok(())
}

fn run_show<W: Write>(explicit_path: Option<&Path>, output: &mut W) -> AppResult<()> {
    let path = config_file_path(explicit_path);
    let stored = StoredConfig::load(&path)?;
    let effective = AppConfig::load(explicit_path, &ConfigOverrides::default())?;

    writeln!(output, "Configuration file: {}", path.display())?;
    writeln!(output, "Stored scheme: {}", display_value(stored.scheme.as_deref()))?;
    writeln!(output, "Stored rating policy: {}", display_value(stored.rating_policy.as_deref()))?;
    writeln!(output, "Stored id strategy: {}", display_value(stored.ids.as_deref()))?;
    writeln!(output, "Stored priority: {}", display_value(stored.priority.as_deref()))?;
    writeln!(output)?;
    write_effective(output, &effective)?;
    Ok(())
}

fn write_effective<W: Write>(output: &mut W, config: &AppConfig) -> io::Result<()> {
    let statuses = config
        .status_scheme
        .statuses()
        .iter()
        .map(|status| status.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(
        output,
        "Status scheme: {} ({statuses}; terminal: {})",
        config.status_scheme.as_str(),
        config.status_scheme.terminal()
    )?;
    writeln!(output, "Rating policy: {}", config.rating_policy.as_str())?;
    writeln!(output, "Id strategy: {}", config.id_strategy.as_str())?;
    writeln!(
        output,
        "Priority: {}",
        if config.track_priority { "on" } else { "off" }
    )
}

/// Asks for one stored value and applies the reply to `slot` in place.
fn edit_field<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    slot: &mut Option<String>,
) -> AppResult<()> {
    match slot.as_deref() {
        Some(value) => write!(output, "{label} [{value}] (Enter to keep, '-' to clear): ")?,
        None => write!(output, "{label} (Enter to skip): ")?,
    }
    output.flush()?;

    let mut reply = String::new();
    input.read_line(&mut reply)?;
    match PromptAction::from_reply(&reply) {
        PromptAction::Keep => {}
        PromptAction::Clear => *slot = None,
        PromptAction::Set(value) => *slot = Some(value.to_string()),
    }
    Ok(())
}

fn display_value(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("<not set>")
}

enum PromptAction<'a> {
    Keep,
    Clear,
    Set(&'a str),
}

impl<'a> PromptAction<'a> {
    fn from_reply(reply: &'a str) -> Self {
        match reply.trim() {
            "" => PromptAction::Keep,
            "-" => PromptAction::Clear,
            value => PromptAction::Set(value),
        }
    }
}
