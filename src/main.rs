#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use battleships::{
    init_logging,
    transport::{InMemoryTransport, Multiplexer, TcpTransport},
    AutoPlayer, Coordinator, CoordinatorConfig, GameStatus, PlayerNode, Server, ServerConfig,
    DEFAULT_PORT,
};

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use log::LevelFilter;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the session server and arbitrate games between two clients.
    Server {
        #[arg(long, default_value_t = format!("0.0.0.0:{}", DEFAULT_PORT))]
        bind: String,
        #[arg(long, help = "Halt a game when a peer stalls longer than this many seconds")]
        handoff_timeout_secs: Option<u64>,
        #[arg(long, help = "Log every frame")]
        debug: bool,
    },
    /// Join a server as an automatic player.
    Client {
        #[arg(long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
        connect: String,
        #[arg(long, help = "Player name (defaults to $USER)")]
        name: Option<String>,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "Log every frame")]
        debug: bool,
    },
    /// Play two automatic players against each other through an in-process server.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
fn level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            bind,
            handoff_timeout_secs,
            debug,
        } => {
            init_logging(level(debug));
            let config = ServerConfig {
                handoff_timeout: handoff_timeout_secs.map(Duration::from_secs),
                ..ServerConfig::with_bind(&bind)
            };
            let server = Server::bind(&config).await?;
            server.run_until_ctrl_c().await?;
        }
        Commands::Client {
            connect,
            name,
            seed,
            debug,
        } => {
            init_logging(level(debug));
            let name = name
                .or_else(|| std::env::var("USER").ok())
                .unwrap_or_else(|| "player".to_string());
            println!("Connecting to {} as {}...", connect, name);
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let transport = TcpTransport::connect(&connect).await?;
            let mut rng = make_rng(seed);
            let mut node = PlayerNode::new(Box::new(AutoPlayer::new()), Box::new(transport));
            let status = node.run(&mut rng, &name).await;
            println!("\nYour board:\n{}", node.own_board());
            println!("Enemy view:\n{}", node.enemy_view());
            match status? {
                GameStatus::Won => println!("Victory after {} shots!", node.shots()),
                GameStatus::Lost => println!("Defeat: all your ships have been sunk."),
                GameStatus::InProgress => {}
            }
        }
        Commands::Local { seed } => {
            init_logging(LevelFilter::Warn);
            println!("Starting local game between two automatic players...");
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let mut rng1 = make_rng(seed);
            let mut rng2 = make_rng(seed.map(|s| s.wrapping_add(1)));

            let mux = Multiplexer::new();
            let handle = mux.handle();
            let coordinator = Coordinator::new(CoordinatorConfig::default(), mux.handle());
            let server = tokio::spawn(coordinator.run(mux));

            let (c1, s1) = InMemoryTransport::pair();
            let (c2, s2) = InMemoryTransport::pair();
            handle.attach(s1);
            handle.attach(s2);

            let mut node1 = PlayerNode::new(Box::new(AutoPlayer::new()), Box::new(c1));
            let mut node2 = PlayerNode::new(Box::new(AutoPlayer::new()), Box::new(c2));
            // Seat 0 goes to whoever logs in first.
            let (r1, r2) = tokio::try_join!(
                node1.run(&mut rng1, "player-1"),
                node2.run(&mut rng2, "player-2"),
            )?;
            server.abort();

            println!("\nplayer-1 ({:?}):\n{}", r1, node1.own_board());
            println!("player-2 ({:?}):\n{}", r2, node2.own_board());
        }
    }
    Ok(())
}
