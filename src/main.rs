//! Collector DAO member tool
//!
//! Subcommands:
//!   collector-dao keygen        - Create a member wallet
//!   collector-dao config        - Write the default governance config
//!   collector-dao proposal-id   - Compute the id of a proposal draft
//!   collector-dao sign-ballot   - Sign a ballot for relaying

mod cli;
mod keygen;

use tracing_subscriber::FmtSubscriber;

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Logging error: {e}");
    }

    let args: Vec<String> = std::env::args().collect();
    let rest = args.get(2..).unwrap_or_default();

    let result = match args.get(1).map(String::as_str) {
        Some("keygen") => keygen::run(rest),
        Some("config") => cli::write_config(rest),
        Some("proposal-id") => cli::proposal_id(rest),
        Some("sign-ballot") => cli::sign_ballot(rest),
        Some("--version" | "-V") => {
            println!("collector-dao {}", collector_dao::VERSION);
            Ok(())
        }
        _ => {
            print_help();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging() -> anyhow::Result<()> {
    // Initialize logging with EnvFilter to support RUST_LOG
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Value following `flag` in `args`
pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn print_help() {
    println!("Collector DAO v{}", collector_dao::VERSION);
    println!("Member tool for the collectors' club DAO");
    println!();
    println!("USAGE:");
    println!("    collector-dao <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    keygen        Generate a member wallet");
    println!("                    --out PATH    Wallet file (default ~/.collector-dao/wallets/default.json)");
    println!("    config        Write the default governance config");
    println!("                    [PATH]        Output file (default collector-dao.toml)");
    println!("    proposal-id   Print the description digest and id of a JSON proposal draft");
    println!("                    <FILE>");
    println!("    sign-ballot   Sign a ballot and print it as JSON");
    println!("                    --dao ADDR --proposal ID --support 0|1|2");
    println!("                    [--config PATH] [--wallet PATH]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help      Print help");
    println!("    -V, --version   Print version");
    println!();
    println!("EXAMPLES:");
    println!("    collector-dao keygen");
    println!("    collector-dao proposal-id buy-punk.json");
    println!("    collector-dao sign-ballot --dao 0x.. --proposal 0x.. --support 2");
}
