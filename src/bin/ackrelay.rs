//! ackrelay binary
//!
//! `ackrelay server <port>` runs the relay; `ackrelay client <server_ip>
//! <server_port>` reads movement commands from stdin and delivers them.

use std::io::BufRead;
use std::net::{IpAddr, SocketAddr};

use ackrelay::client::{Client, Console, InputEvent};
use ackrelay::network;
use ackrelay::server::Shutdown;
use ackrelay::{BroadcastPolicy, Config, Server};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// Reliable command relay over UDP
#[derive(Parser, Debug)]
#[command(name = "ackrelay")]
#[command(about = "Reliable command delivery over UDP with broadcast fan-out")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run the relay server
    Server {
        /// UDP port to listen on (1-65535)
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        /// Local IP to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind_ip: IpAddr,

        /// Registry slots
        #[arg(long, default_value = "100")]
        capacity: usize,

        /// Do not echo a command back to its sender
        #[arg(long)]
        exclude_sender: bool,
    },

    /// Send commands to a relay server
    Client {
        /// Server host or IP
        server_ip: String,

        /// Server UDP port (1-65535)
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        server_port: u16,

        /// Transmissions per command
        #[arg(long, default_value = "3")]
        attempts: u32,

        /// Per-attempt ACK timeout in milliseconds
        #[arg(long, default_value = "2000")]
        timeout_ms: u64,

        /// Greeting sent before any input
        #[arg(long)]
        handshake: Option<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ackrelay=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("ackrelay v{}", ackrelay::VERSION);

    match args.mode {
        Mode::Server {
            port,
            bind_ip,
            capacity,
            exclude_sender,
        } => {
            let policy = if exclude_sender {
                BroadcastPolicy::ExcludeSender
            } else {
                BroadcastPolicy::IncludeSender
            };
            let config = Config::builder()
                .listen_addr(SocketAddr::new(bind_ip, port).to_string())
                .registry_capacity(capacity)
                .broadcast_policy(policy)
                .build();
            run_server(config);
        }
        Mode::Client {
            server_ip,
            server_port,
            attempts,
            timeout_ms,
            handshake,
        } => {
            let mut builder = Config::builder()
                .max_attempts(attempts)
                .ack_timeout_ms(timeout_ms);
            if let Some(text) = handshake {
                builder = builder.handshake(text);
            }
            run_client(&server_ip, server_port, builder.build());
        }
    }
}

fn run_server(config: Config) {
    let mut server = match Server::bind(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    println!("To stop the server:");
    println!("\tCtrl+C: sends SIGINT to the process.");
    println!("\tCtrl+\\: sends SIGQUIT to the process.");
    println!("\tkill <pid>: sends SIGTERM to the process.");

    if let Err(e) = install_shutdown_handler(server.shutdown_handle()) {
        tracing::warn!("Could not install signal handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Trigger `shutdown` on interrupt, terminate, hangup or quit
#[cfg(unix)]
fn install_shutdown_handler(shutdown: Shutdown) -> std::io::Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGQUIT])?;
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::info!("Received signal {}, server shutting down...", signal);
                shutdown.trigger();
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
fn install_shutdown_handler(shutdown: Shutdown) -> std::io::Result<()> {
    ctrlc::set_handler(move || {
        tracing::info!("Received shutdown signal, server shutting down...");
        shutdown.trigger();
    })
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
}

fn run_client(server_ip: &str, server_port: u16, config: Config) {
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    let socket = match network::resolve(server_ip, server_port).and_then(network::connect) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to reach server: {}", e);
            std::process::exit(1);
        }
    };

    let (events_tx, events_rx) = crossbeam::channel::unbounded();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for token in line.split_whitespace() {
                let event = InputEvent::from_token(token);
                if events_tx.send(event).is_err() || event == InputEvent::Quit {
                    return;
                }
            }
        }
    });

    println!("Type up/down/left/right (or w/s/a/d) and press Enter. 'q' to quit.");

    let mut client = Client::new(socket, &config);
    let mut console = StdoutConsole;
    if let Err(e) = client.run(&events_rx, &mut console) {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

/// Prints status lines and broadcasts to stdout
struct StdoutConsole;

impl Console for StdoutConsole {
    fn status(&mut self, line: &str) {
        println!("{}", line);
    }

    fn broadcast(&mut self, text: &str) {
        println!("<< {}", text);
    }
}
