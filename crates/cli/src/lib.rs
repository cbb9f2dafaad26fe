use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use config::InsightsConfig;
use flags::{RankOrderFlag, SchemaKindFlag};
use insights_browser::{InsightBrowser, SessionStore};
use insights_engine::{rank_all, write_tsv, InsightRanker};
use insights_protocol::{
    corpus_schema, input_schema, load_json_file, parse_json, serialize_json, Corpus,
    InsightsInput, CORPUS_SCHEMA_VERSION,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;
mod flags;
mod http_api;
mod server_security;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "insights")]
#[command(about = "Mine pairwise feature insights and browse them adaptively", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML or JSON config file (env: INSIGHTS_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank feature pairs of every realm by information gain
    Rank(RankArgs),

    /// Serve a ranked corpus over HTTP
    Serve(ServeArgs),

    /// Print the JSON Schema of an input or corpus document
    Schema(SchemaArgs),
}

#[derive(Args)]
struct RankArgs {
    /// Realm input document (`-` reads stdin)
    input: PathBuf,

    /// Dirichlet prior added to every cell (0 disables smoothing)
    #[arg(long)]
    prior: Option<f64>,

    /// Minimum information gain for a pair to be kept
    #[arg(long)]
    gain_threshold: Option<f64>,

    /// Output order of the kept pairs
    #[arg(long, value_enum)]
    order: Option<RankOrderFlag>,

    /// Keep pairs whose features share a tag
    #[arg(long)]
    keep_same_tag: bool,

    /// Write a JSON corpus here instead of TSV on stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Realm (0-based) to write with --output
    #[arg(long, default_value_t = 0)]
    realm: usize,
}

#[derive(Args)]
struct ServeArgs {
    /// Ranked corpus to browse
    #[arg(long, default_value = "data/insights.json")]
    corpus: PathBuf,

    /// Bind address, e.g. 127.0.0.1:3000
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Allow binding to non-loopback addresses
    #[arg(long)]
    public: bool,

    /// Scheme and authority used in generated links
    #[arg(long)]
    url_prefix: Option<String>,

    /// Route the browser is mounted on, e.g. /insights/
    #[arg(long)]
    route: Option<String>,

    /// Query parameter carrying the session id
    #[arg(long)]
    id_key: Option<String>,

    /// Insights per session whose action tokens stay valid
    #[arg(long)]
    token_retention: Option<usize>,
}

#[derive(Args)]
struct SchemaArgs {
    #[arg(value_enum)]
    kind: SchemaKindFlag,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = InsightsConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Rank(args) => run_rank(args, config)?,
        Commands::Serve(args) => run_serve(args, config).await?,
        Commands::Schema(args) => run_schema(args)?,
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<InsightsInput> {
    if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read input from stdin")?;
        return parse_json(&raw).context("Malformed input on stdin");
    }
    load_json_file(path).with_context(|| format!("Malformed input {}", path.display()))
}

fn run_rank(args: RankArgs, config: InsightsConfig) -> Result<()> {
    let mut engine = config.engine;
    if let Some(prior) = args.prior {
        engine.smoothing_prior = prior;
    }
    if let Some(threshold) = args.gain_threshold {
        engine.gain_threshold = threshold;
    }
    if let Some(order) = args.order {
        engine.order = order.as_domain();
    }
    if args.keep_same_tag {
        engine.skip_same_tag = false;
    }

    let input = read_input(&args.input)?;

    let Some(path) = args.output else {
        let ranked = rank_all(&input, engine)?;
        let mut stdout = io::stdout().lock();
        for realm in &ranked {
            if let Err(err) = write_tsv(&realm.candidates, &mut stdout) {
                if err.kind() == io::ErrorKind::BrokenPipe {
                    return Ok(());
                }
                return Err(err.into());
            }
        }
        return Ok(());
    };

    let realm = input.realms.get(args.realm).with_context(|| {
        format!(
            "Realm {} out of range, input has {} realm(s)",
            args.realm,
            input.realms.len()
        )
    })?;
    let corpus = InsightRanker::new(engine)?.rank(realm)?.into_corpus();
    let json = serialize_json(&corpus)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write corpus {}", path.display()))?;
    log::info!("Wrote {} insights to {}", corpus.len(), path.display());
    Ok(())
}

async fn run_serve(args: ServeArgs, config: InsightsConfig) -> Result<()> {
    let addr = server_security::resolve_bind_addr(&args.bind, args.public).await?;

    let mut browser_config = config.browser;
    if let Some(prefix) = args.url_prefix {
        browser_config.url_prefix = prefix;
    }
    if let Some(route) = args.route {
        browser_config.route = route;
    }
    if let Some(id_key) = args.id_key {
        browser_config.session_id_parameter_name = id_key;
    }
    if let Some(retention) = args.token_retention {
        browser_config.action_token_retention = retention;
    }

    let corpus: Corpus = load_json_file(&args.corpus)
        .with_context(|| format!("Failed to load corpus {}", args.corpus.display()))?;
    log::info!(
        "Loaded {} insights from {}",
        corpus.len(),
        args.corpus.display()
    );

    let store = Arc::new(SessionStore::from_config(&browser_config));
    let browser = InsightBrowser::new(Arc::new(corpus), store, browser_config)?;
    let route = browser.config().route.clone();
    let app = http_api::router(Arc::new(browser));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    print_stdout(&format!("Serving insights: http://{local_addr}{route}"))?;
    print_stdout(&format!("Adaptive browsing: http://{local_addr}{route}smart"))?;

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_schema(args: SchemaArgs) -> Result<()> {
    let schema = match args.kind {
        SchemaKindFlag::Input => input_schema(),
        SchemaKindFlag::Corpus => corpus_schema(),
    };
    let output = serde_json::json!({
        "schema_version": CORPUS_SCHEMA_VERSION,
        "kind": args.kind.as_str(),
        "schema": schema,
    });
    print_stdout(&serialize_json(&output)?)
}
