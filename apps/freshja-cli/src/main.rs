//! FreshJA CLI
//!
//! Browse produce, keep a cart and likes, and place orders from the terminal.
//! Works offline: changes are kept in the data directory and pushed on the
//! next `sync` or `login`.

use clap::{Parser, Subcommand};
use core_config::FromEnv;
use core_config::tracing::{init_cli_tracing, install_color_eyre};
use eyre::Result;
use freshja_client::{ClientConfig, FreshJa};
use std::path::PathBuf;
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "freshja")]
#[command(about = "Shop the FreshJA marketplace from the command line")]
struct Cli {
    /// API base URL including `/api` (defaults to EXPO_PUBLIC_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for the session, cart and queued changes
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and push queued changes
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(short, long)]
        password: String,
        /// customer, farmer or delivery
        #[arg(short, long)]
        role: Option<String>,
        /// Farm license number (farmers)
        #[arg(long, requires_all = ["trn", "permit"])]
        license: Option<String>,
        /// Tax registration number (farmers)
        #[arg(long, requires_all = ["license", "permit"])]
        trn: Option<String>,
        /// Farm permit number (farmers)
        #[arg(long, requires_all = ["license", "trn"])]
        permit: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Browse products
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Manage the cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },

    /// Manage liked products
    Likes {
        #[command(subcommand)]
        command: LikeCommands,
    },

    /// Place and track orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },

    /// Push queued cart, like and order changes
    Sync,

    /// Password reset by emailed code
    Reset {
        #[command(subcommand)]
        command: ResetCommands,
    },
}

#[derive(Subcommand)]
enum ProductCommands {
    /// List products, newest first
    List {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        page: Option<u64>,
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Search names, titles, descriptions and categories
    Search { term: String },
    /// Featured products
    Featured,
    /// Show one product
    Show { id: Uuid },
}

#[derive(Subcommand)]
enum CartCommands {
    /// Show cart lines
    List,
    /// Add a product
    Add {
        product_id: Uuid,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 removes it)
    Update { product_id: Uuid, quantity: u32 },
    /// Remove a line
    Remove { product_id: Uuid },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum LikeCommands {
    /// Show liked products
    List,
    /// Like or unlike a product
    Toggle { product_id: Uuid },
}

#[derive(Subcommand)]
enum OrderCommands {
    /// Check out the current cart
    Create {
        #[arg(long)]
        payment_method: Option<String>,
        #[arg(long)]
        time_slot: Option<String>,
    },
    /// List your orders, including ones not yet sent
    List,
    /// Show one order
    Show { id: String },
    /// Cancel a pending order
    Cancel { id: String },
}

#[derive(Subcommand)]
enum ResetCommands {
    /// Email a reset code
    Forgot { email: String },
    /// Check a code without using it
    Verify { user_id: Uuid, code: String },
    /// Set a new password with a valid code
    Password {
        user_id: Uuid,
        code: String,
        new_password: String,
    },
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.api_url {
            Some(url) => ClientConfig::new(url.as_str()),
            None => ClientConfig::from_env()?,
        };
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    init_cli_tracing(cli.verbose);

    let config = cli.client_config()?;
    tracing::debug!(base_url = %config.base_url, data_dir = ?config.data_dir, "Opening client");
    let client = FreshJa::open(&config).await?;

    commands::run(&client, cli.command).await
}
