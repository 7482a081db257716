//! Command-line interface and REPL
//!
//! Stands in for the companion UI: reads commands, drives the service and
//! prints notices as they arrive.

use anyhow::{Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::bridge::{BridgeEvent, MediaEvent, NavigationEvent};
use crate::notice::{Notice, NoticeLevel};
use crate::service::DeviceService;
use crate::state::{Button, DeviceStatePatch, WidgetCategory};

const PROMPT: &str = "phototag> ";

const HELP: &str = "\
Commands:
  connect                      connect to the device
  disconnect                   disconnect from the device
  status                       show device and preview state
  preview                      show the preview state only
  set <json>                   edit the preview (partial state, camelCase keys)
  widget <category> <id|none>  pick the preview widget for a category
  widgets                      list widget categories and ids
  apply                        push the preview to the device
  press <play_pause|next|prev> simulate a device button
  media <json>                 feed a phone media notification
  nav <json>                   feed a phone navigation notification
  help                         show this help
  exit | quit                  leave";

/// One parsed REPL command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Connect,
    Disconnect,
    Status,
    Preview,
    Set(DeviceStatePatch),
    Widget(WidgetCategory, Option<String>),
    Widgets,
    Apply,
    Press(Button),
    Bridge(BridgeEvent),
    Help,
    Exit,
}

/// Whether the REPL keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "connect" => Command::Connect,
        "disconnect" => Command::Disconnect,
        "status" => Command::Status,
        "preview" => Command::Preview,
        "set" => {
            let patch: DeviceStatePatch =
                serde_json::from_str(rest).context("set expects a JSON object, e.g. {\"theme\":\"light\"}")?;
            Command::Set(patch)
        }
        "widget" => {
            let mut parts = rest.split_whitespace();
            let category = parts
                .next()
                .and_then(WidgetCategory::parse)
                .context("widget expects a category: clock, weather, battery, music, directions")?;
            let id = parts.next().context("widget expects a widget id or 'none'")?;
            if id.eq_ignore_ascii_case("none") {
                Command::Widget(category, None)
            } else {
                if !id.starts_with(category.id_prefix()) {
                    anyhow::bail!("'{}' is not a {} widget", id, category);
                }
                Command::Widget(category, Some(id.to_string()))
            }
        }
        "widgets" => Command::Widgets,
        "apply" => Command::Apply,
        "press" => {
            let button = Button::parse(rest).context("press expects play_pause, next or prev")?;
            Command::Press(button)
        }
        "media" => {
            let event: MediaEvent =
                serde_json::from_str(rest).context("media expects {\"title\",\"isPlaying\",...}")?;
            Command::Bridge(BridgeEvent::Media(event))
        }
        "nav" => {
            let event: NavigationEvent = serde_json::from_str(rest)
                .context("nav expects {\"isNavigating\",\"direction\",\"distance\",\"eta\"}")?;
            Command::Bridge(BridgeEvent::Navigation(event))
        }
        "help" | "?" => Command::Help,
        "exit" | "quit" => Command::Exit,
        other => anyhow::bail!("Unknown command '{}' (try 'help')", other),
    };

    Ok(Some(command))
}

/// Run one command against the service
///
/// Link operations run as background tasks so the prompt stays responsive;
/// their outcome shows up as notices.
pub async fn execute(service: &DeviceService, command: Command) -> Result<Flow> {
    match command {
        Command::Connect => {
            let svc = service.clone();
            tokio::spawn(async move {
                if let Err(e) = svc.connect().await {
                    warn!("connect failed: {}", e);
                }
            });
        }
        Command::Disconnect => {
            let svc = service.clone();
            tokio::spawn(async move {
                if let Err(e) = svc.disconnect().await {
                    warn!("disconnect failed: {}", e);
                }
            });
        }
        Command::Apply => {
            let svc = service.clone();
            tokio::spawn(async move {
                if let Err(e) = svc.apply_preview().await {
                    warn!("apply failed: {}", e);
                }
            });
        }
        Command::Status => {
            println!(
                "{} {} (link: {})",
                "Device:".bold(),
                service.driver_name().cyan(),
                service.link_status()
            );
            println!("{}", "Physical:".bold());
            println!("{}", serde_json::to_string_pretty(&service.physical_state())?);
            println!("{}", "Preview:".bold());
            println!("{}", serde_json::to_string_pretty(&service.preview_state())?);
        }
        Command::Preview => {
            println!("{}", serde_json::to_string_pretty(&service.preview_state())?);
        }
        Command::Set(patch) => {
            let fields = patch.field_names();
            service.update_app_preview_state(patch);
            println!("Preview updated: {}", fields.join(", ").green());
        }
        Command::Widget(category, id) => {
            service.select_preview_widget(category, id.as_deref());
            println!(
                "Preview widgets: {}",
                service.preview_state().widgets.join(", ").green()
            );
        }
        Command::Widgets => {
            for category in WidgetCategory::all() {
                println!("  {}", category.to_string().yellow());
                for (id, name) in category.options() {
                    println!("    {:<22} {}", id, name.dimmed());
                }
            }
        }
        Command::Press(button) => {
            service.simulate_device_button_press(button);
        }
        Command::Bridge(event) => {
            service.ingest_bridge_event(event);
        }
        Command::Help => println!("{}", HELP),
        Command::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

/// Print one notice, coloured by level
pub fn print_notice(notice: &Notice) {
    let stamp = notice.at.format("%H:%M:%S%.3f").to_string();
    let message = match notice.level {
        NoticeLevel::Loading => notice.message.yellow(),
        NoticeLevel::Success => notice.message.green(),
        NoticeLevel::Info => notice.message.cyan(),
        NoticeLevel::Error => notice.message.red(),
    };
    println!("[{}] {}", stamp.dimmed(), message);
}

/// Read lines on a blocking thread and forward them to the async side
///
/// The channel closes on EOF, Ctrl-D or Ctrl-C at the prompt.
fn spawn_line_reader() -> Result<mpsc::Receiver<String>> {
    let mut rl = DefaultEditor::new()?;
    let (tx, rx) = mpsc::channel(16);

    std::thread::spawn(move || loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                warn!("readline error: {}", e);
                break;
            }
        }
    });

    Ok(rx)
}

/// Interactive loop until `exit`, end of input or `shutdown`
pub async fn run_repl(
    service: DeviceService,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let mut lines = spawn_line_reader()?;
    let mut notices = BroadcastStream::new(service.notices().subscribe());
    tokio::pin!(shutdown);

    println!("Type {} for commands.", "help".bold());

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    debug!("Input closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(command)) => {
                        if execute(&service, command).await? == Flow::Exit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{} {:#}", "error:".red().bold(), e),
                }
            }
            Some(notice) = notices.next() => {
                match notice {
                    Ok(notice) => print_notice(&notice),
                    Err(e) => debug!("Notice stream lagged: {}", e),
                }
            }
            _ = &mut shutdown => {
                break;
            }
        }
    }

    Ok(())
}
