//! webglean CLI - read web pages and search the web from the command line

mod mcp;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use webglean::{
    FetchRequest, OutputMode, RendererKind, SearchRequest, SearchResponse, Tool,
    DEFAULT_SEARCH_RESULTS, TOOL_LLMTXT,
};

/// Output representation for the fetch subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputArg {
    /// Rendered HTML as loaded
    Html,
    /// Readable plain text
    #[default]
    Text,
    /// Markdown
    Md,
}

impl From<OutputArg> for OutputMode {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Html => OutputMode::Html,
            OutputArg::Text => OutputMode::Text,
            OutputArg::Md => OutputMode::Markdown,
        }
    }
}

/// Page loader
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum RendererArg {
    /// Headless Chromium
    #[default]
    Browser,
    /// Plain HTTP GET, no JavaScript
    Http,
}

impl From<RendererArg> for RendererKind {
    fn from(arg: RendererArg) -> Self {
        match arg {
            RendererArg::Browser => RendererKind::Browser,
            RendererArg::Http => RendererKind::Http,
        }
    }
}

/// webglean - read rendered web pages and search the web
#[derive(Parser, Debug)]
#[command(name = "webglean")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalArgs,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// How pages are loaded
    #[arg(long, global = true, value_enum, default_value_t = RendererArg::Browser)]
    renderer: RendererArg,

    /// Chrome/Chromium executable
    #[arg(long, global = true, env = "WEBGLEAN_BROWSER_PATH")]
    browser_path: Option<PathBuf>,

    /// Navigation timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Custom User-Agent
    #[arg(long, global = true)]
    user_agent: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Fetch a page and print its content
    Fetch {
        /// URL to fetch
        url: String,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputArg::Text)]
        output: OutputArg,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search the web
    Search {
        /// Search query
        query: String,

        /// Number of results
        #[arg(long, short, default_value_t = DEFAULT_SEARCH_RESULTS)]
        results: usize,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    let tool = build_tool(&cli.global);

    match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server(tool).await;
        }
        Some(Commands::Fetch { url, output, json }) => {
            run_fetch(&tool, &url, output.into(), json).await;
        }
        Some(Commands::Search {
            query,
            results,
            json,
        }) => {
            run_search(&tool, &query, results, json).await;
        }
        None => {
            eprintln!("Usage: webglean fetch <URL>");
            eprintln!("   or: webglean search <QUERY>");
            eprintln!("   or: webglean mcp");
            eprintln!("   or: webglean --help");
            std::process::exit(1);
        }
    }
}

fn build_tool(args: &GlobalArgs) -> Tool {
    let mut builder = Tool::builder()
        .renderer(args.renderer.into())
        .navigation_timeout(Duration::from_secs(args.timeout));

    if let Some(path) = &args.browser_path {
        builder = builder.browser_path(path.clone());
    }
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua.clone());
    }

    builder.build()
}

async fn run_fetch(tool: &Tool, url: &str, output: OutputMode, json: bool) {
    let request = FetchRequest::new(url).output(output);

    match tool.execute_fetch(request).await {
        Ok(response) if json => print_json(&response),
        Ok(response) => writeln_safe(&response.content),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_search(tool: &Tool, query: &str, results: usize, json: bool) {
    let request = SearchRequest::new(query).num_results(results);

    match tool.execute_search(request).await {
        Ok(response) if json => print_json(&response),
        Ok(response) if response.results.is_empty() => {
            eprintln!("No results found for query: {}", query);
        }
        Ok(response) => writeln_safe(&format_search_results(&response)),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    });
    writeln_safe(&json);
}

/// Numbered result blocks separated by blank lines
fn format_search_results(response: &SearchResponse) -> String {
    let mut output = String::new();

    for (i, result) in response.results.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&format!("Result {}:\n", i + 1));
        output.push_str(&format!("URL: {}\n", result.url));
        output.push_str(&format!("Title: {}\n", result.title));
        output.push_str(&format!("Description: {}\n", result.snippet));
        if let Some(date) = &result.date {
            output.push_str(&format!("Date: {date}\n"));
        }
    }

    output
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
