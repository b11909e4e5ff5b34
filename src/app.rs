use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::core::{
    advisory,
    alerts::{dispatch::Toast, feed, model::Alert, store::AlertStore},
    center::{self, AlertCenter},
    config::{self, ConfigManager},
    notify::{desktop::DesktopHost, gate::PermissionGate, PermissionState},
    session,
    view,
};

const HELP: &str = "\
Commands:
  list             show alerts
  read <id>        mark an alert as read
  dismiss <id>     remove an alert
  notify           enable push notifications
  city <name>      advisories for a city
  help             this text
  quit             exit";

/// How long teardown waits for blocking work, such as an unanswered consent prompt
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Read(String),
    Dismiss(String),
    Notify,
    City(String),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    Some(match (verb.to_lowercase().as_str(), arg) {
        ("list" | "ls", _) => Command::List,
        ("read", id) if !id.is_empty() => Command::Read(id.to_string()),
        ("dismiss" | "rm", id) if !id.is_empty() => Command::Dismiss(id.to_string()),
        ("notify", _) => Command::Notify,
        ("city", name) if !name.is_empty() => Command::City(name.to_string()),
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Also installs the `log` bridge, so `log::` records from the library show up
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Logging already initialized: {}", e);
    }
}

fn print_alerts(alerts: &[Alert], authenticated: bool) {
    if let Some(text) = view::render_alerts(alerts, authenticated) {
        println!("{}", text);
    }
}

/// Tracks the last permission answer so the "enabled" notice only shows on a change.
struct PermissionWatch {
    last: PermissionState,
}

impl PermissionWatch {
    /// `remembered` is the answer saved by an earlier session.
    fn new(remembered: PermissionState) -> Self {
        Self { last: remembered }
    }

    fn observe(&mut self, state: PermissionState) -> Option<Toast> {
        if state == self.last {
            return None;
        }
        self.last = state;
        center::permission_notice(state)
    }
}

fn spawn_permission_request(gate: Arc<PermissionGate>, tx: mpsc::UnboundedSender<PermissionState>, startup: bool) {
    tokio::spawn(async move {
        let state = if startup {
            gate.initialize().await
        } else {
            gate.request_permission().await
        };
        let _ = tx.send(state);
    });
}

async fn serve() -> io::Result<()> {
    let config_manager = ConfigManager::new(config::default_config_dir());
    let mut settings = config_manager.load();

    // The alert feed is only mounted for a signed-in user
    let user = session::signed_in_user(&settings.data_dir);
    let authenticated = user.is_some();
    let Some(user) = user else {
        println!("Sign in to Beacon to receive disaster alerts.");
        return Ok(());
    };
    log::info!("Signed in as {} ({:?})", user.name, user.role);

    let (activation_tx, mut activation_rx) = mpsc::unbounded_channel();
    let host = Arc::new(DesktopHost::new(settings.notification_permission, activation_tx));
    let mut center = AlertCenter::new(
        AlertStore::new(settings.data_dir.clone()),
        host,
        settings.dispatch_policy(),
        settings.seed_demo_alerts,
    );

    let (permission_tx, mut permission_rx) = mpsc::unbounded_channel();
    let mut permission_watch = PermissionWatch::new(settings.notification_permission);
    spawn_permission_request(center.gate(), permission_tx.clone(), true);

    print_alerts(center.list(), authenticated);
    println!("{}", HELP);

    let (feed_tx, mut feed_rx) = mpsc::channel(16);
    let feed = feed::spawn(settings.feed_config(), feed_tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            Some(alert) = feed_rx.recv() => {
                if let Some(delivery) = center.ingest(alert) {
                    println!("{}", view::render_toast(&delivery.toast));
                }
            }
            Some(state) = permission_rx.recv() => {
                if let Some(notice) = permission_watch.observe(state) {
                    println!("{}", view::render_toast(&notice));
                }
            }
            Some(tag) = activation_rx.recv() => {
                // Clicked push: bring that alert to the front
                match center.get(&tag) {
                    Some(alert) => print_alerts(std::slice::from_ref(alert), authenticated),
                    None => log::debug!("Activated alert {} is no longer listed", tag),
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    let Some(command) = parse_command(&line) else {
                        continue;
                    };
                    match command {
                        Command::List => print_alerts(center.list(), authenticated),
                        Command::Read(id) => {
                            center.mark_read(&id);
                            println!("{} unread", center.unread_count());
                        }
                        Command::Dismiss(id) => {
                            center.dismiss(&id);
                            println!("{} unread", center.unread_count());
                        }
                        Command::Notify => spawn_permission_request(center.gate(), permission_tx.clone(), false),
                        Command::City(name) => print!("{}", view::render_advisories(&advisory::advisories_for_city(&name))),
                        Command::Help => println!("{}", HELP),
                        Command::Quit => break,
                        Command::Unknown(line) => println!("Unknown command: {} (try `help`)", line),
                    }
                }
                Ok(None) => {
                    log::info!("Input closed, running until interrupted");
                    stdin_open = false;
                }
                Err(e) => {
                    log::error!("Failed to read input: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    drop(feed_rx);
    feed.stop().await;

    settings.notification_permission = center.permission();
    config_manager.save(&settings)
}

pub fn run() {
    init_logging();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("error while starting the tokio runtime");

    if let Err(e) = runtime.block_on(serve()) {
        log::error!("Beacon exited with an error: {}", e);
    }
    shutdown(runtime);
}

fn shutdown(runtime: tokio::runtime::Runtime) {
    // Dropping the runtime would wait on blocking tasks without limit
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("list"), Some(Command::List));
        assert_eq!(parse_command("READ 42"), Some(Command::Read("42".to_string())));
        assert_eq!(parse_command("dismiss  a-b "), Some(Command::Dismiss("a-b".to_string())));
        assert_eq!(parse_command("city New Delhi"), Some(Command::City("New Delhi".to_string())));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn test_missing_argument_is_unknown() {
        assert_eq!(parse_command("read"), Some(Command::Unknown("read".to_string())));
        assert_eq!(parse_command("city"), Some(Command::Unknown("city".to_string())));
    }

    #[test]
    fn test_remembered_grant_shows_no_notice() {
        let mut watch = PermissionWatch::new(PermissionState::Granted);
        assert!(watch.observe(PermissionState::Granted).is_none());
    }

    #[test]
    fn test_new_grant_shows_notice_once() {
        let mut watch = PermissionWatch::new(PermissionState::Unasked);
        assert!(watch.observe(PermissionState::Unasked).is_none());
        let notice = watch.observe(PermissionState::Granted).unwrap();
        assert_eq!(notice.title, "Notifications Enabled");
        assert!(watch.observe(PermissionState::Granted).is_none());
        assert!(watch.observe(PermissionState::Denied).is_none());
    }

    #[test]
    fn test_shutdown_does_not_wait_on_stuck_blocking_task() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let (hold_tx, hold_rx) = std::sync::mpsc::channel::<()>();
        runtime.spawn_blocking(move || {
            let _ = hold_rx.recv();
        });

        let started = std::time::Instant::now();
        shutdown(runtime);
        assert!(started.elapsed() < Duration::from_secs(10));
        drop(hold_tx);
    }
}
