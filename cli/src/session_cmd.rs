use crate::CliContext;
use crate::drive_until_settled;
use crate::render;
use anyhow::Result;
use clap::Parser;
use marquee_search::NavKey;
use marquee_search::OverlayAction;
use marquee_search::OverlayController;
use marquee_search::OverlayEventSender;
use marquee_search::OverlayOptions;
use marquee_search::TypeTag;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;

/// Line-driven overlay session. Plain lines replace the input text; lines
/// starting with `:` are commands (`:down`, `:up`, `:enter`, `:esc`,
/// `:open`, `:type <tag|all>`, `:scope <id|none>`, `:retry`,
/// `:clear-recent`).
#[derive(Debug, Parser)]
pub struct SessionCommand {
    /// Tenant scope to start in.
    #[arg(long = "scope")]
    pub scope: Option<String>,

    /// Override the configured search endpoint.
    #[arg(long = "endpoint")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Text(String),
    Key(NavKey),
    Open,
    Filter(Option<TypeTag>),
    Scope(Option<String>),
    Retry,
    ClearRecent,
}

pub fn parse_line(line: &str) -> Result<SessionInput, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(SessionInput::Text(line.to_string()));
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };
    match name {
        "down" => Ok(SessionInput::Key(NavKey::Down)),
        "up" => Ok(SessionInput::Key(NavKey::Up)),
        "enter" => Ok(SessionInput::Key(NavKey::Enter)),
        "esc" => Ok(SessionInput::Key(NavKey::Escape)),
        "open" => Ok(SessionInput::Open),
        "retry" => Ok(SessionInput::Retry),
        "clear-recent" => Ok(SessionInput::ClearRecent),
        "type" => match arg {
            "" => Err(":type needs a result type or `all`".to_string()),
            "all" => Ok(SessionInput::Filter(None)),
            tag => tag
                .parse::<TypeTag>()
                .map(|tag| SessionInput::Filter(Some(tag)))
                .map_err(|err| format!("{err}")),
        },
        "scope" => match arg {
            "" => Err(":scope needs a scope id or `none`".to_string()),
            "none" => Ok(SessionInput::Scope(None)),
            scope => Ok(SessionInput::Scope(Some(scope.to_string()))),
        },
        other => Err(format!("unknown command :{other}")),
    }
}

impl SessionCommand {
    pub async fn run(self) -> Result<()> {
        let ctx = CliContext::load(self.endpoint)?;
        let backend = ctx.backend()?;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut overlay = OverlayController::new(
            OverlayOptions::from(&ctx.config),
            backend,
            ctx.cache(),
            Some(ctx.recent_store()),
            OverlayEventSender::new(tx),
        );
        overlay.set_scope(self.scope);
        overlay.open();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut shown = String::new();
        show(&overlay, &mut shown);
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    match parse_line(&line) {
                        Ok(input) => apply(&mut overlay, input),
                        Err(msg) => eprintln!("{msg}"),
                    }
                    // One line is one settled edit; wait for its outcome
                    // before reading the next.
                    drive_until_settled(&mut overlay, &mut rx).await;
                    show(&overlay, &mut shown);
                }
                Some(event) = rx.recv() => {
                    overlay.handle_event(event);
                    show(&overlay, &mut shown);
                }
            }
        }
        Ok(())
    }
}

fn apply(overlay: &mut OverlayController, input: SessionInput) {
    match input {
        SessionInput::Text(text) => overlay.set_input(&text),
        SessionInput::Key(key) => match overlay.handle_key(key) {
            OverlayAction::Navigate(result) => println!("navigate: {}", result.href),
            OverlayAction::Closed | OverlayAction::None => {}
        },
        SessionInput::Open => overlay.open(),
        SessionInput::Filter(filter) => overlay.set_type_filter(filter),
        SessionInput::Scope(scope) => overlay.set_scope(scope),
        SessionInput::Retry => overlay.retry(),
        SessionInput::ClearRecent => overlay.clear_recent(),
    }
}

/// Prints the overlay when it differs from what was last printed.
fn show(overlay: &OverlayController, shown: &mut String) {
    let snapshot = render::snapshot(overlay);
    if snapshot != *shown {
        println!("{snapshot}");
        *shown = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_lines_are_input() {
        assert_eq!(
            parse_line("jazz tonight"),
            Ok(SessionInput::Text("jazz tonight".to_string()))
        );
        assert_eq!(parse_line(""), Ok(SessionInput::Text(String::new())));
    }

    #[test]
    fn navigation_commands() {
        assert_eq!(parse_line(":down"), Ok(SessionInput::Key(NavKey::Down)));
        assert_eq!(parse_line(":up"), Ok(SessionInput::Key(NavKey::Up)));
        assert_eq!(parse_line(":enter"), Ok(SessionInput::Key(NavKey::Enter)));
        assert_eq!(parse_line(":esc"), Ok(SessionInput::Key(NavKey::Escape)));
    }

    #[test]
    fn filter_and_scope_arguments() {
        assert_eq!(
            parse_line(":type Venue"),
            Ok(SessionInput::Filter(Some(TypeTag::Venue)))
        );
        assert_eq!(parse_line(":type all"), Ok(SessionInput::Filter(None)));
        assert!(parse_line(":type music").is_err());
        assert!(parse_line(":type").is_err());
        assert_eq!(
            parse_line(":scope tenant-a"),
            Ok(SessionInput::Scope(Some("tenant-a".to_string())))
        );
        assert_eq!(parse_line(":scope none"), Ok(SessionInput::Scope(None)));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(
            parse_line(":frobnicate"),
            Err("unknown command :frobnicate".to_string())
        );
    }
}
