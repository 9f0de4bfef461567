use bytes::Bytes;
use clap::{Parser, Subcommand};
use ldp_core::{Encoding, Store, StoreConfig, StoreDecorator};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ldp")]
#[command(about = "LDP resource store CLI")]
struct Cli {
    /// Data directory of the filesystem store
    #[arg(long, default_value = "ldp_data")]
    data_dir: PathBuf,
    /// Public root URL resources are resolved against
    #[arg(long, default_value = "http://localhost:3000/")]
    root_url: String,
    /// Partition the data directory by request host
    #[arg(long)]
    include_host: bool,
    /// Use an empty in-memory store instead of the data directory
    #[arg(long)]
    memory: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the children of a container
    Ls {
        /// Container path, e.g. /a/
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print the content of a resource
    Cat {
        /// Resource path
        path: String,
    },
    /// Store a local file as a resource
    Put {
        /// Resource path
        path: String,
        /// Local file to upload
        source: PathBuf,
    },
    /// Delete a resource, or a container with everything below it
    Rm {
        /// Resource path
        path: String,
    },
    /// Run a GET (or HEAD) through the store's request handling
    Fetch {
        /// Resource path
        path: String,
        /// Accept header to send
        #[arg(long)]
        accept: Option<String>,
        /// Send HEAD instead of GET
        #[arg(long)]
        head: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    let config = StoreConfig::new(&cli.root_url)?.with_include_host(cli.include_host);
    let store = if cli.memory {
        StoreDecorator::in_memory(config)
    } else {
        StoreDecorator::on_filesystem(&cli.data_dir, config)?
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(&store, command))
}

async fn run(store: &StoreDecorator, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Ls { path } => {
            let children = store.list(path.as_str().into()).await?;
            if children.is_empty() {
                println!("No resources found.");
            }
            for child in children {
                println!(
                    "{}\t{}\t{}\t{}",
                    child.uri,
                    store.get_content_type(&child),
                    child.size,
                    child.modified.to_rfc3339()
                );
            }
        }
        Commands::Cat { path } => {
            let content = store.get(path.into(), Encoding::Binary).await?;
            std::io::stdout().write_all(content.as_bytes())?;
        }
        Commands::Put { path, source } => {
            let bytes = tokio::fs::read(&source).await?;
            let size = bytes.len();
            store.put(path.as_str().into(), bytes.into()).await?;
            println!("Stored {} bytes at {}", size, path);
        }
        Commands::Rm { path } => {
            store.delete(path.as_str().into()).await?;
            println!("Deleted {}", path);
        }
        Commands::Fetch { path, accept, head } => {
            let method = if head { http::Method::HEAD } else { http::Method::GET };
            let mut request = http::Request::builder().method(method).uri(path.as_str());
            if let Some(accept) = accept {
                request = request.header(http::header::ACCEPT, accept);
            }
            let response = store.handle_request(&request.body(Bytes::new())?).await?;

            println!("{}", response.status());
            for (name, value) in response.headers() {
                println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
            println!();
            std::io::stdout().write_all(response.body())?;
        }
    }
    Ok(())
}
