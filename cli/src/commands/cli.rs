use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "preload-cli", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file; defaults to `$PRELOAD_CONFIG`, then `./preload.toml`.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanSource {
    /// Routing plan (TOML) describing routes, components and simulated load tasks.
    #[arg(long)]
    pub plan: String,

    /// Run as the server runtime (server-side rendering).
    #[arg(long, default_value_t = false)]
    pub server: bool,

    /// Client only: the first location was already preloaded by the server,
    /// so its initial pass runs client-only tasks.
    #[arg(long, default_value_t = false, conflicts_with = "server")]
    pub hydrated: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub source: PlanSource,

    /// Locations to navigate to, in order. The first one is the initial navigation.
    #[arg(required = true)]
    pub locations: Vec<String>,

    /// Launch navigations this many milliseconds apart without waiting for
    /// the previous one to settle, so later ones supersede earlier ones.
    #[arg(long)]
    pub stagger_ms: Option<u64>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: PlanSource,

    /// Location to resolve.
    pub location: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run navigations against the plan, printing every dispatched action as JSON.
    Simulate(SimulateArgs),
    /// Print the stage layout a navigation would execute, without running it.
    Plan(PlanArgs),
}
