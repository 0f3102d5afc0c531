//! CLI argument definitions.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | Search listings of one source |
//! | `sources` | List registered sources |
//! | `login` | Log in explicitly and print the stored profile |
//! | `geocode` | Resolve an address to coordinates |
//!
//! Configuration comes from `ALQUILERES_*` environment variables;
//! `--api-url` overrides the backend base URL.
//!
//! ```bash
//! alquileres search --source mendozaprop --province Mendoza --city "Godoy Cruz" --pretty
//! alquileres geocode "Peatonal Sarmiento 100"
//! ```

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "alquileres",
    author,
    version,
    about = "Property listing search over the alquileres backend"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log at debug level to stderr (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Backend base URL, overriding ALQUILERES_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search listings of one source.
    Search(SearchArgs),
    /// List registered sources.
    Sources,
    /// Log in and print the stored profile.
    Login(LoginArgs),
    /// Resolve an address to coordinates.
    Geocode(GeocodeArgs),
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Source name (inmoup, mendozaprop).
    #[arg(long)]
    pub source: String,

    #[arg(long)]
    pub province: Option<String>,

    /// City to include; repeat for several.
    #[arg(long = "city")]
    pub cities: Vec<String>,

    /// Property type, "Departamentos" when omitted.
    #[arg(long)]
    pub property_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Defaults to the configured service username.
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    #[arg(long, requires = "username")]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct GeocodeArgs {
    pub address: String,
}
