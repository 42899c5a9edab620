use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use plugin_console::api::{FrontendPack, LoginRequest, auth, plugins, tags};
use plugin_console::config::ConfigError;
use plugin_console::console::ConsoleError;
use plugin_console::files::{self, FilesError};
use plugin_console::http::Download;
use plugin_console::router::{ADMIN, HOME, LOGIN};
use plugin_console::{ApiError, Console, ConsoleConfig};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Files(#[from] FilesError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "plugin-console", about = "Plugin platform admin console")]
struct Cli {
    /// `standalone` or `embedded`; overrides PLUGIN_CONSOLE_DEPLOYMENT_MODE.
    #[arg(long)]
    mode: Option<String>,

    /// Backend origin; overrides PLUGIN_CONSOLE_API_BASE_URL.
    #[arg(long)]
    api_base_url: Option<String>,

    /// Session state file; overrides PLUGIN_CONSOLE_STATE_FILE.
    #[arg(long)]
    state_file: Option<PathBuf>,

    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in through the login view.
    Login {
        #[arg(long, env = "PLUGIN_CONSOLE_USERNAME")]
        username: String,
        #[arg(long, env = "PLUGIN_CONSOLE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Ask the server whether the stored session is still valid.
    Status,
    /// Navigate to a console path through the route guard.
    Open {
        path: String,
    },
    Plugins(PluginsCommand),
    Pack(PackCommand),
    Tags(TagsCommand),
}

#[derive(Args, Debug)]
struct PluginsCommand {
    #[command(subcommand)]
    command: PluginsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PluginsSubcommand {
    List,
    /// Print the absolute frontend entry URL of a plugin.
    Entry {
        id: String,
    },
    Enable {
        id: String,
    },
    Disable {
        id: String,
    },
    Reload {
        id: String,
    },
    Uninstall {
        id: String,
    },
    Install {
        file: PathBuf,
    },
    Download {
        id: String,
        #[arg(long)]
        ext: Option<String>,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct PackCommand {
    #[command(subcommand)]
    command: PackSubcommand,
}

#[derive(Subcommand, Debug)]
enum PackSubcommand {
    /// Upload a built frontend bundle with its plugin metadata.
    Frontend {
        #[arg(long)]
        metadata: PathBuf,
        #[arg(long)]
        dir: PathBuf,
        #[arg(long, default_value_t = false)]
        import: bool,
    },
    Download {
        file_name: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    Import {
        file_name: String,
        #[arg(long, default_value_t = false)]
        enable: bool,
    },
}

#[derive(Args, Debug)]
struct TagsCommand {
    #[command(subcommand)]
    command: TagsSubcommand,
}

#[derive(Subcommand, Debug)]
enum TagsSubcommand {
    All,
    List {
        id: String,
    },
    Add {
        id: String,
        tag: String,
    },
    /// Replace all tags of a plugin; no tags clears them.
    Set {
        id: String,
        tags: Vec<String>,
    },
    Remove {
        id: String,
        tag: String,
    },
    /// Plugins carrying every given tag.
    Search {
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

impl Cli {
    fn config(&self) -> Result<ConsoleConfig, CliError> {
        let mut config = ConsoleConfig::from_env()?;
        config.apply_overrides(self.mode.as_deref(), self.api_base_url.as_deref(), self.state_file.as_deref())?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    let config = cli.config()?;
    let console = Console::from_config(&config)?;
    let result = run(&console, cli.command).await;
    console.finish().await;
    result
}

async fn run(console: &Console, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { username, password } => run_login(console, LoginRequest { username, password }).await,
        Command::Logout => {
            auth::logout(console.client()).await?;
            print_json(&json!({ "authenticated": false }))
        }
        Command::Status => {
            let authenticated = auth::check_auth_status(console.client()).await?;
            print_json(&json!({ "authenticated": authenticated }))
        }
        Command::Open { path } => {
            let route = console.open(&path).await?;
            print_json(&json!({ "route": route.name, "path": route.path }))
        }
        Command::Plugins(command) => run_plugins(console, command).await,
        Command::Pack(pack) => run_pack(console, pack).await,
        Command::Tags(command) => run_tags(console, command).await,
    }
}

async fn run_login(console: &Console, credentials: LoginRequest) -> Result<(), CliError> {
    let landed = console.open(LOGIN.path).await?;
    if landed != LOGIN {
        eprintln!("already signed in");
        return print_json(&json!({ "authenticated": true }));
    }
    auth::login(console.client(), &credentials).await?;
    console.open(ADMIN.path).await?;
    print_json(&json!({ "authenticated": true }))
}

async fn run_plugins(console: &Console, command: PluginsCommand) -> Result<(), CliError> {
    let client = console.client();
    match command.command {
        PluginsSubcommand::List => {
            console.enter(HOME).await?;
            let list = plugins::list(client).await?;
            print_json(&serde_json::to_value(list)?)
        }
        PluginsSubcommand::Entry { id } => {
            console.enter(HOME).await?;
            let list = plugins::list(client).await?;
            let plugin = list.iter().find(|p| p.id == id).ok_or(ApiError::NotFound)?;
            let url = plugins::frontend_entry_url(console.backend_base_url(), plugin);
            print_json(&json!({ "id": plugin.id, "frontendEntry": url }))
        }
        PluginsSubcommand::Enable { id } => {
            console.enter(ADMIN).await?;
            plugins::enable(client, &id).await?;
            print_json(&json!({ "id": id, "action": "enable" }))
        }
        PluginsSubcommand::Disable { id } => {
            console.enter(ADMIN).await?;
            plugins::disable(client, &id).await?;
            print_json(&json!({ "id": id, "action": "disable" }))
        }
        PluginsSubcommand::Reload { id } => {
            console.enter(ADMIN).await?;
            plugins::reload(client, &id).await?;
            print_json(&json!({ "id": id, "action": "reload" }))
        }
        PluginsSubcommand::Uninstall { id } => {
            console.enter(ADMIN).await?;
            plugins::uninstall(client, &id).await?;
            print_json(&json!({ "id": id, "action": "uninstall" }))
        }
        PluginsSubcommand::Install { file } => {
            console.enter(ADMIN).await?;
            let bytes = files::read_file(&file)?;
            let summary = plugins::install(client, &files::file_name_of(&file), bytes).await?;
            print_json(&json!({ "result": summary }))
        }
        PluginsSubcommand::Download { id, ext, output } => {
            console.enter(ADMIN).await?;
            let download = plugins::download(client, &id, ext.as_deref()).await?;
            let fallback = match ext.as_deref() {
                Some(ext) => format!("{id}.{ext}"),
                None => format!("{id}.jar"),
            };
            save_download(&download, output, &fallback)
        }
    }
}

async fn run_pack(console: &Console, pack: PackCommand) -> Result<(), CliError> {
    let client = console.client();
    console.enter(ADMIN).await?;
    match pack.command {
        PackSubcommand::Frontend { metadata, dir, import } => {
            let metadata: Value = serde_json::from_slice(&files::read_file(&metadata)?)?;
            let bundle = files::collect_bundle(&dir)?;
            eprintln!("packing {} files from {}", bundle.len(), dir.display());
            let result = plugins::pack_frontend(client, FrontendPack { metadata, files: bundle, import }).await?;
            print_json(&result)
        }
        PackSubcommand::Download { file_name, output } => {
            let download = plugins::download_pack(client, &file_name).await?;
            save_download(&download, output, &file_name)
        }
        PackSubcommand::Import { file_name, enable } => {
            let result = plugins::import_pack(client, &file_name, enable).await?;
            print_json(&result)
        }
    }
}

async fn run_tags(console: &Console, command: TagsCommand) -> Result<(), CliError> {
    let client = console.client();
    match command.command {
        TagsSubcommand::All => {
            console.enter(HOME).await?;
            print_json(&json!(tags::all_tags(client).await?))
        }
        TagsSubcommand::List { id } => {
            console.enter(HOME).await?;
            print_json(&json!(tags::plugin_tags(client, &id).await?))
        }
        TagsSubcommand::Add { id, tag } => {
            console.enter(ADMIN).await?;
            tags::add_tag(client, &id, &tag).await?;
            print_json(&json!(tags::plugin_tags(client, &id).await?))
        }
        TagsSubcommand::Set { id, tags: requested } => {
            console.enter(ADMIN).await?;
            let applied = tags::set_tags(client, &id, &requested).await?;
            print_json(&json!({ "id": id, "tags": applied }))
        }
        TagsSubcommand::Remove { id, tag } => {
            console.enter(ADMIN).await?;
            tags::remove_tag(client, &id, &tag).await?;
            print_json(&json!(tags::plugin_tags(client, &id).await?))
        }
        TagsSubcommand::Search { tags: requested } => {
            console.enter(HOME).await?;
            let found = match requested.as_slice() {
                [single] => tags::search_by_tag(client, single).await?,
                many => tags::search_by_tags(client, many).await?,
            };
            print_json(&serde_json::to_value(found)?)
        }
    }
}

// =============================================================================
// FILES
// =============================================================================

fn save_download(download: &Download, output: Option<PathBuf>, fallback: &str) -> Result<(), CliError> {
    let path = files::download_path(download, output, fallback);
    files::save(download, &path)?;
    eprintln!("wrote {} bytes to {}", download.bytes.len(), path.display());
    print_json(&json!({
        "file": path.display().to_string(),
        "bytes": download.bytes.len(),
        "contentType": download.content_type,
    }))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
